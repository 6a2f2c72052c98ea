use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rust_embed::Embed;

use crate::error::LoadError;
use crate::words::Word;

#[derive(Embed)]
#[folder = "assets/lists/"]
struct BundledLists;

/// Something that can produce the words of a difficulty list.
pub trait ListSource {
    fn load(&self, list_id: &str) -> Result<Vec<Word>, LoadError>;
}

/// Resolves a list identifier to a URL, a file path, a list in the user list
/// directory, or a list bundled into the binary, in that order.
#[derive(Clone, Debug)]
pub struct ListResolver {
    list_dir: PathBuf,
}

impl ListResolver {
    pub fn new(list_dir: PathBuf) -> Self {
        Self { list_dir }
    }

    fn read_body(&self, list_id: &str) -> Result<String, LoadError> {
        if is_url(list_id) {
            return fetch_url(list_id);
        }

        let direct = Path::new(list_id);
        if direct.is_file() {
            return read_file(direct);
        }

        let user_list = self.list_dir.join(format!("{list_id}.json"));
        if user_list.is_file() {
            return read_file(&user_list);
        }

        let file = BundledLists::get(&format!("{list_id}.json"))
            .ok_or_else(|| LoadError::NotFound(list_id.to_string()))?;
        String::from_utf8(file.data.into_owned()).map_err(|e| LoadError::Parse(e.to_string()))
    }
}

impl ListSource for ListResolver {
    fn load(&self, list_id: &str) -> Result<Vec<Word>, LoadError> {
        let body = self.read_body(list_id)?;
        let words = parse_word_list(list_id, &body)?;
        info!("loaded {} words from '{list_id}'", words.len());
        Ok(words)
    }
}

/// Parse a JSON array of word records. Entries that are not usable words are
/// skipped with a warning; an array with no usable words is an error.
pub fn parse_word_list(list_id: &str, body: &str) -> Result<Vec<Word>, LoadError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| LoadError::Parse(e.to_string()))?;

    let mut words = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Word>(entry) {
            Ok(w) if !w.word.is_empty() => words.push(w),
            Ok(_) => warn!("skipping entry {i} of '{list_id}': empty word"),
            Err(e) => warn!("skipping entry {i} of '{list_id}': {e}"),
        }
    }

    if words.is_empty() {
        return Err(LoadError::Empty(list_id.to_string()));
    }
    Ok(words)
}

/// Names of the bundled lists plus `*.json` files in the user list directory.
pub fn available_lists(list_dir: &Path) -> Vec<String> {
    let mut names: BTreeSet<String> = BundledLists::iter()
        .filter_map(|f| f.strip_suffix(".json").map(|n| n.to_string()))
        .collect();

    if let Ok(entries) = fs::read_dir(list_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.insert(stem.to_string());
            }
        }
    }

    names.into_iter().collect()
}

fn is_url(list_id: &str) -> bool {
    list_id.starts_with("http://") || list_id.starts_with("https://")
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(feature = "network")]
fn fetch_url(url: &str) -> Result<String, LoadError> {
    let transport = |e: reqwest::Error| LoadError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(transport)?;
    let response = client.get(url).send().map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }
    response.text().map_err(transport)
}

#[cfg(not(feature = "network"))]
fn fetch_url(_url: &str) -> Result<String, LoadError> {
    Err(LoadError::NetworkDisabled)
}

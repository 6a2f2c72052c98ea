pub mod pool;
pub mod source;

use serde::{Deserialize, Serialize};

pub use pool::derive_practice_pool;
pub use source::{ListResolver, ListSource, available_lists};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default, alias = "koreanPronunciation")]
    pub korean_pronunciation: Option<String>,
}

impl Word {
    pub fn new(word: &str) -> Self {
        Self {
            word: word.to_string(),
            meaning: String::new(),
            pronunciation: String::new(),
            korean_pronunciation: None,
        }
    }

    pub fn chars(&self) -> Vec<char> {
        self.word.chars().collect()
    }
}

/// A loaded difficulty list.
#[derive(Clone, Debug)]
pub struct WordList {
    pub id: String,
    pub words: Vec<Word>,
}

impl WordList {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::scoring::DEFAULT_POINTS_PER_WORD;
use crate::engine::selector::DEFAULT_RESET_PENALTY;
use crate::engine::word_stats::DEFAULT_RESET_THRESHOLD;
use crate::session::{RecordPolicy, SessionSettings};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_session_secs")]
    pub session_secs: u32,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default)]
    pub full_pool: bool,
    #[serde(default = "default_repeat_words")]
    pub repeat_words: bool,
    #[serde(default = "default_reset_threshold")]
    pub reset_threshold: u32,
    #[serde(default = "default_reset_penalty")]
    pub reset_penalty: f64,
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    #[serde(default = "default_points_per_word")]
    pub points_per_word: u32,
    #[serde(default)]
    pub record_appearance: RecordPolicy,
    #[serde(default = "default_list")]
    pub default_list: String,
    #[serde(default = "default_list_dir")]
    pub list_dir: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub narration_command: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_session_secs() -> u32 {
    300
}
fn default_pool_size() -> usize {
    100
}
fn default_repeat_words() -> bool {
    true
}
fn default_reset_threshold() -> u32 {
    DEFAULT_RESET_THRESHOLD
}
fn default_reset_penalty() -> f64 {
    DEFAULT_RESET_PENALTY
}
fn default_advance_delay_ms() -> u64 {
    500
}
fn default_points_per_word() -> u32 {
    DEFAULT_POINTS_PER_WORD
}
fn default_list() -> String {
    "beginner".to_string()
}
fn default_list_dir() -> String {
    data_dir().join("lists").to_string_lossy().to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_file() -> String {
    data_dir().join("tajamaster.log").to_string_lossy().to_string()
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tajamaster")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_secs: default_session_secs(),
            pool_size: default_pool_size(),
            full_pool: false,
            repeat_words: default_repeat_words(),
            reset_threshold: default_reset_threshold(),
            reset_penalty: default_reset_penalty(),
            advance_delay_ms: default_advance_delay_ms(),
            points_per_word: default_points_per_word(),
            record_appearance: RecordPolicy::default(),
            default_list: default_list(),
            list_dir: default_list_dir(),
            theme: default_theme(),
            narration_command: None,
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tajamaster")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Replace values the session cannot run with by their defaults.
    pub fn normalize(&mut self) {
        if self.reset_threshold == 0 {
            warn!("reset_threshold must be at least 1, using 1");
            self.reset_threshold = 1;
        }
        if !self.reset_penalty.is_finite() || self.reset_penalty < 0.0 {
            warn!("invalid reset_penalty {}, using default", self.reset_penalty);
            self.reset_penalty = default_reset_penalty();
        }
        if self.pool_size == 0 {
            warn!("pool_size must be at least 1, using default");
            self.pool_size = default_pool_size();
        }
        if self.session_secs == 0 {
            warn!("session_secs must be at least 1, using default");
            self.session_secs = default_session_secs();
        }
    }

    pub fn list_dir(&self) -> PathBuf {
        PathBuf::from(&self.list_dir)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            session_secs: self.session_secs,
            pool_size: if self.full_pool {
                None
            } else {
                Some(self.pool_size)
            },
            repeat_words: self.repeat_words,
            reset_threshold: self.reset_threshold,
            reset_penalty: self.reset_penalty,
            advance_delay: Duration::from_millis(self.advance_delay_ms),
            points_per_word: self.points_per_word,
            record_policy: self.record_appearance,
        }
    }
}

use std::fs;
use std::path::Path;

use log::warn;
use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_correct: String,
    pub text_incorrect: String,
    pub text_incorrect_bg: String,
    pub text_pending: String,
    pub text_cursor_bg: String,
    pub text_cursor_fg: String,
    pub accent: String,
    pub muted: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// Look in the user theme directory first, then the bundled themes.
    pub fn load(name: &str) -> Option<Self> {
        Self::load_from(&Config::config_dir().join("themes"), name)
    }

    pub fn load_from(user_dir: &Path, name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        if let Ok(content) = fs::read_to_string(user_dir.join(&filename)) {
            match toml::from_str::<Theme>(&content) {
                Ok(theme) => return Some(theme),
                Err(e) => warn!("ignoring malformed theme {filename}: {e}"),
            }
        }

        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn load_or_default(name: &str) -> Self {
        Self::load_or_default_from(&Config::config_dir().join("themes"), name)
    }

    /// Unknown names fall back to the default theme with a warning naming the
    /// bundled ones.
    pub fn load_or_default_from(user_dir: &Path, name: &str) -> Self {
        Self::load_from(user_dir, name).unwrap_or_else(|| {
            warn!(
                "unknown theme '{name}', available: {}",
                Self::available_themes().join(", ")
            );
            Self::default()
        })
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("catppuccin-mocha").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            text_correct: "#a6e3a1".to_string(),
            text_incorrect: "#f38ba8".to_string(),
            text_incorrect_bg: "#45273a".to_string(),
            text_pending: "#585b70".to_string(),
            text_cursor_bg: "#f5e0dc".to_string(),
            text_cursor_fg: "#1e1e2e".to_string(),
            accent: "#89b4fa".to_string(),
            muted: "#6c7086".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            bar_filled: "#89b4fa".to_string(),
            bar_empty: "#313244".to_string(),
            error: "#f38ba8".to_string(),
            warning: "#f9e2af".to_string(),
            success: "#a6e3a1".to_string(),
        }
    }
}

macro_rules! color_accessors {
    ($($field:ident),* $(,)?) => {
        $(pub fn $field(&self) -> Color { Self::parse_color(&self.$field) })*
    };
}

impl ThemeColors {
    /// `#rrggbb` to an RGB colour; anything else falls back to white.
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    color_accessors!(
        bg,
        fg,
        text_correct,
        text_incorrect,
        text_incorrect_bg,
        text_pending,
        text_cursor_bg,
        text_cursor_fg,
        accent,
        muted,
        border,
        border_focused,
        header_bg,
        header_fg,
        bar_filled,
        bar_empty,
        error,
        warning,
        success,
    );
}

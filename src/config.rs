//! User-level editor configuration.
//!
//! A tiny JSON file; a missing or unreadable one silently falls back to
//! defaults so the editor always starts.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Write the document on quit instead of asking about unsaved changes.
    pub autosave: bool,
    /// Ask before deleting the selected node or edge.
    pub confirm_delete: bool,
    /// Preferred editor for `dlgedit edit`; falls back to $VISUAL/$EDITOR.
    pub editor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave: false,
            confirm_delete: true,
            editor: None,
        }
    }
}

/// `$DLGEDIT_CONFIG` > `$XDG_CONFIG_HOME/dlgedit.json` >
/// `$HOME/.config/dlgedit.json` > a file beside the current directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = env::var_os("DLGEDIT_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(dir).join("dlgedit.json");
    }
    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".config").join("dlgedit.json");
    }
    PathBuf::from("dlgedit.json")
}

pub fn load() -> Config {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> Config {
    fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}

pub fn save(config: &Config) -> Result<()> {
    save_to(config, &config_path())
}

pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let mut text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

use crate::theme::Theme;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "docnav";
const CONFIG_FILE: &str = "config.json";
const STATE_FILE: &str = "state.json";
const LOG_FILE: &str = "docnav.log";

/// Overrides the app data directory (used by tests and portable setups)
pub const DATA_DIR_ENV: &str = "DOCNAV_DATA_DIR";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quiet period after the last keystroke before a search runs
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Shorter queries (after trimming) never search
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Target length of the context shown around a match
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,

    /// Maximum number of results displayed
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Fixed header height kept clear when navigating, in layout units
    #[serde(default = "default_header_offset")]
    pub header_offset: u32,

    /// Scroll position (layout units) after which the scroll-to-top control shows
    #[serde(default = "default_scroll_top_threshold")]
    pub scroll_top_threshold: u32,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_chars() -> usize {
    2
}

fn default_context_chars() -> usize {
    100
}

fn default_max_results() -> usize {
    10
}

fn default_header_offset() -> u32 {
    crate::document::HEADER_OFFSET
}

fn default_scroll_top_threshold() -> u32 {
    crate::viewport::SCROLL_TOP_THRESHOLD
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_chars: default_min_query_chars(),
            context_chars: default_context_chars(),
            max_results: default_max_results(),
            header_offset: default_header_offset(),
            scroll_top_threshold: default_scroll_top_threshold(),
        }
    }
}

impl AppConfig {
    /// Load config from `dir`, or return default if not found
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let config: AppConfig = serde_json::from_str(&content)
                .context("Failed to parse config file")?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

/// Viewer state remembered between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    #[serde(default)]
    pub theme: Theme,
}

impl UiState {
    /// Load the saved state; anything unreadable falls back to defaults
    pub fn load_from(dir: &Path) -> Self {
        fs::read_to_string(dir.join(STATE_FILE))
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize state")?;
        fs::write(dir.join(STATE_FILE), content)
            .context("Failed to write state file")?;
        Ok(())
    }
}

/// Get the path of the log file used while the TUI owns the terminal
pub fn get_log_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(LOG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let app_dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base = if cfg!(target_os = "macos") {
                dirs::home_dir()
                    .map(|h| h.join("Library").join("Application Support"))
            } else if cfg!(target_os = "windows") {
                dirs::data_local_dir()
            } else {
                // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
                dirs::data_dir()
            };

            let base = base.context("Could not determine app data directory")?;
            base.join(APP_NAME)
        }
    };

    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create {}", app_dir.display()))?;
    Ok(app_dir)
}

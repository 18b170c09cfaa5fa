use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKCHAT_CONFIG_PATH";
const APP_DIR_NAME: &str = "taskchat";

pub const DEFAULT_USER_ID: &str = "demo_user_id";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Colours role labels: assistant replies use the accent, the user's own
/// lines are muted. Empty codes mean plain output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
}

const RESET: &str = "\x1b[0m";

impl Palette {
    pub const PLAIN: Palette = Palette {
        accent: "",
        muted: "",
    };

    pub fn accentize(&self, text: &str) -> String {
        paint(self.accent, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        paint(self.muted, text)
    }
}

fn paint(code: &str, text: &str) -> String {
    if code.is_empty() {
        text.to_string()
    } else {
        format!("{code}{text}{RESET}")
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    let name = theme.and_then(canonical_theme_name);
    match name.as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
        },
        _ => Palette::PLAIN,
    }
}

/// Lowercases `raw` and collapses every run of non-alphanumerics into one
/// `_`, so `Dark-Mode`, `dark mode` and `DARK_MODE` compare equal. `None` when
/// nothing alphanumeric is left.
pub fn canonical_key(raw: &str) -> Option<String> {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
        } else if !cleaned.is_empty() && !cleaned.ends_with('_') {
            cleaned.push('_');
        }
    }

    let trimmed = cleaned.trim_end_matches('_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Maps theme spellings onto the palette names; blank means `default`.
pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let name = match canonical_key(raw).as_deref() {
        None | Some("vanilla" | "light") => "default".to_string(),
        Some("dark" | "dark_mode" | "darkmode") => "noir".to_string(),
        Some(other) => other.to_string(),
    };
    Some(name)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Artificial pause before each reply is shown.
    #[serde(default)]
    pub reply_delay_ms: u64,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl Config {
    /// Whole-line alias lookup; anything that is not an alias passes through.
    pub fn expand_alias<'a>(&'a self, line: &'a str) -> &'a str {
        self.aliases
            .get(line.trim())
            .map(String::as_str)
            .unwrap_or(line)
    }

    pub fn user_id(&self) -> &str {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_USER_ID)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub aliases: HashMap<String, String>,
    pub reply_delay_ms: Option<u64>,
    pub user_id: Option<String>,
    pub api_base_url: Option<String>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => {
            tracing::warn!(error = %err, "config path unavailable, using defaults");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "invalid config, using defaults");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    Ok(normalize_config_theme(config))
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = normalize_theme_value(config.theme);
    config
}

fn normalize_theme_value(value: Option<String>) -> Option<String> {
    value.and_then(|name| canonical_theme_name(&name))
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref() {
        if let Some(normalized) = canonical_theme_name(theme) {
            merged.theme = Some(normalized);
        }
    }

    for (alias, value) in overrides.aliases.iter() {
        merged.aliases.insert(alias.clone(), value.clone());
    }

    if let Some(delay) = overrides.reply_delay_ms {
        merged.reply_delay_ms = delay;
    }
    if let Some(user_id) = overrides.user_id.as_ref() {
        merged.user_id = Some(user_id.clone());
    }
    if let Some(base_url) = overrides.api_base_url.as_ref() {
        merged.api_base_url = Some(base_url.clone());
    }

    merged
}

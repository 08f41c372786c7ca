use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub greeting: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            greeting: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base: Option<String>,
    greeting: Option<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api base '{value}': {reason}")]
    InvalidApiBase { value: String, reason: String },
}

/// Defaults, then the TOML file (if present), then the process environment.
pub fn load_settings(config_path: &Path) -> Result<Settings, SettingsError> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    match fs::read_to_string(config_path) {
        Ok(raw) => {
            let file_cfg: FileSettings =
                toml::from_str(&raw).map_err(|source| SettingsError::Parse {
                    path: config_path.to_path_buf(),
                    source,
                })?;
            if let Some(v) = file_cfg.api_base {
                settings.api_base = v;
            }
            if let Some(v) = file_cfg.greeting {
                settings.greeting = Some(v);
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(SettingsError::Read {
                path: config_path.to_path_buf(),
                source,
            })
        }
    }

    if let Some(v) = env("API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__GREETING") {
        settings.greeting = Some(v);
    }

    if settings.api_base.trim().is_empty() {
        settings.api_base = DEFAULT_API_BASE.into();
    }
    if settings
        .greeting
        .as_deref()
        .is_some_and(|g| g.trim().is_empty())
    {
        settings.greeting = None;
    }

    Ok(settings)
}

/// Checks that `raw` is an absolute http(s) URL and strips trailing slashes.
pub fn validate_api_base(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: &str| SettingsError::InvalidApiBase {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(trimmed).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }

    Ok(trimmed.to_string())
}

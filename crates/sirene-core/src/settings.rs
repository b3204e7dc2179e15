//! Shared configuration, constructed once and passed by reference into the
//! client and the store. No ambient globals.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{name} is not set in the environment")]
    MissingVar { name: &'static str },
}

/// Runtime configuration for the registry client and data store.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Registry base URL, no trailing slash.
    pub base_url: String,
    /// Bearer token for the registry, if the deployment requires one.
    pub api_token: Option<String>,
    /// Root of the categorized data directories.
    pub data_dir: PathBuf,
}

impl Settings {
    pub fn new(base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: None,
            data_dir: data_dir.into(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Read settings from `SIRENE_BASE_URL`, `SIRENE_API_TOKEN`, and
    /// `SIRENE_DATA_DIR`. The base URL is required; the data directory
    /// defaults to `./data`.
    pub fn from_env() -> Result<Self, SettingsError> {
        let base_url = env::var("SIRENE_BASE_URL").map_err(|_| SettingsError::MissingVar {
            name: "SIRENE_BASE_URL",
        })?;
        let data_dir = env::var("SIRENE_DATA_DIR").unwrap_or_else(|_| "data".to_string());

        let mut settings = Self::new(base_url, data_dir);
        if let Ok(token) = env::var("SIRENE_API_TOKEN") {
            settings.api_token = Some(token);
        }
        Ok(settings)
    }
}

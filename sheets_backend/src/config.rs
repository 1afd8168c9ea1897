//! # Backend Configuration
//!
//! The backend serves exactly one datasource. Its instance settings come from a
//! JSON file shaped like the host's datasource record:
//!
//! ```json
//! {
//!   "id": 1,
//!   "uid": "sheets",
//!   "name": "Google Sheets",
//!   "type": "google-sheets-datasource",
//!   "jsonData": { "authType": "key", "apiKey": "..." }
//! }
//! ```
//!
//! Without a file, a key-auth datasource with id `1` is assumed. In both cases
//! an empty API key is filled from `GOOGLE_SHEETS_API_KEY`.

use crate::error::{BackendError, Result};
use crate::googlesheets::GoogleEndpoints;
use sheets_common::{AuthType, DataSourceInstanceSettings, SheetsSourceOptions};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info};

pub const API_KEY_ENV_VAR: &str = "GOOGLE_SHEETS_API_KEY";
pub const PLUGIN_TYPE: &str = "google-sheets-datasource";

pub type SheetsSettings = DataSourceInstanceSettings<SheetsSourceOptions>;

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Use port 0 to bind to a random available port.
    pub bind_addr: SocketAddr,
    pub settings: SheetsSettings,
    pub endpoints: GoogleEndpoints,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            settings: default_settings(1),
            endpoints: GoogleEndpoints::default(),
        }
    }
}

pub fn default_settings(id: u64) -> SheetsSettings {
    DataSourceInstanceSettings {
        id,
        uid: String::new(),
        name: "Google Sheets".to_string(),
        plugin_type: PLUGIN_TYPE.to_string(),
        json_data: SheetsSourceOptions::default(),
    }
}

/// Reads instance settings from a JSON file.
pub fn load_settings(path: &Path) -> Result<SheetsSettings> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        BackendError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let settings: SheetsSettings = serde_json::from_str(&contents)?;
    info!(
        path = %path.display(),
        id = settings.id,
        auth_type = ?settings.json_data.auth_type,
        "Loaded datasource settings"
    );
    Ok(settings)
}

/// Fills a missing API key from the environment value, if any.
pub fn apply_api_key_fallback(settings: &mut SheetsSettings, env_value: Option<String>) {
    let options = &mut settings.json_data;
    let missing = options
        .api_key
        .as_deref()
        .is_none_or(|key| key.trim().is_empty());
    if options.auth_type == AuthType::Key
        && missing
        && let Some(key) = env_value.filter(|k| !k.trim().is_empty())
    {
        debug!("Using API key from {}", API_KEY_ENV_VAR);
        options.api_key = Some(key);
    }
}

/// Settings from `path` (or the defaults for `datasource_id`) with the
/// environment fallback applied.
pub fn resolve_settings(path: Option<&Path>, datasource_id: u64) -> Result<SheetsSettings> {
    let mut settings = match path {
        Some(path) => load_settings(path)?,
        None => default_settings(datasource_id),
    };
    apply_api_key_fallback(&mut settings, std::env::var(API_KEY_ENV_VAR).ok());
    Ok(settings)
}

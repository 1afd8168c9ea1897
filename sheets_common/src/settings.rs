use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("API key authentication selected but no API key is configured")]
    MissingApiKey,
    #[error("JWT authentication selected but no service account key is configured")]
    MissingJwt,
}

/// How the backend authenticates against the Google APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Key,
    Jwt,
}

/// Plugin-specific part of the settings (`jsonData` on the host side).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsSourceOptions {
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Service account key file contents (JSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

impl SheetsSourceOptions {
    /// Checks that the credential required by `auth_type` is present.
    pub fn validate(&self) -> Result<(), SettingsError> {
        match self.auth_type {
            AuthType::Key if is_blank(self.api_key.as_deref()) => Err(SettingsError::MissingApiKey),
            AuthType::Jwt if is_blank(self.jwt.as_deref()) => Err(SettingsError::MissingJwt),
            _ => Ok(()),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

// Credentials never end up in logs.
impl fmt::Debug for SheetsSourceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsSourceOptions")
            .field("auth_type", &self.auth_type)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("jwt", &self.jwt.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Settings the host hands to a datasource instance once, at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInstanceSettings<T> {
    pub id: u64,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub plugin_type: String,
    pub json_data: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_host_settings() {
        let settings: DataSourceInstanceSettings<SheetsSourceOptions> =
            serde_json::from_value(json!({
                "id": 7,
                "uid": "abc",
                "name": "Google Sheets",
                "type": "google-sheets-datasource",
                "jsonData": { "authType": "key", "apiKey": "abc123" }
            }))
            .unwrap();
        assert_eq!(settings.id, 7);
        assert_eq!(settings.plugin_type, "google-sheets-datasource");
        assert_eq!(settings.json_data.auth_type, AuthType::Key);
        assert_eq!(settings.json_data.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn auth_type_defaults_to_key() {
        let options: SheetsSourceOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options.auth_type, AuthType::Key);
    }

    #[test]
    fn validate_requires_matching_credential() {
        let mut options = SheetsSourceOptions::default();
        assert_eq!(options.validate(), Err(SettingsError::MissingApiKey));

        options.api_key = Some("  ".into());
        assert_eq!(options.validate(), Err(SettingsError::MissingApiKey));

        options.api_key = Some("abc123".into());
        assert!(options.validate().is_ok());

        options.auth_type = AuthType::Jwt;
        assert_eq!(options.validate(), Err(SettingsError::MissingJwt));
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let options = SheetsSourceOptions {
            auth_type: AuthType::Key,
            api_key: Some("super-secret".into()),
            jwt: None,
        };
        let debug = format!("{:?}", options);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}

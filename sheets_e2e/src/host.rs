//! The host surfaces a scenario drives: its UI and its HTTP API.

use crate::error::{E2eError, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Page-object view of the host UI. Implemented by whatever drives the
/// browser.
#[async_trait]
pub trait HostUi: Send {
    async fn visit_add_data_source(&mut self) -> Result<()>;

    /// Clicks the plugin tile named `plugin` on the add-data-source page.
    async fn select_data_source_plugin(&mut self, plugin: &str) -> Result<()>;

    /// Clears the data source name input and types `name`.
    async fn set_data_source_name(&mut self, name: &str) -> Result<()>;

    async fn fill_by_placeholder(&mut self, placeholder: &str, value: &str) -> Result<()>;

    async fn save_and_test(&mut self) -> Result<()>;

    /// Text of the alert shown after save & test. Errors when none is shown.
    async fn alert_message(&mut self) -> Result<String>;

    async fn current_url(&mut self) -> Result<String>;

    /// Creates and saves a new dashboard, returning its title.
    async fn add_and_save_dashboard(&mut self) -> Result<String>;

    async fn open_dashboard(&mut self, uid: &str) -> Result<()>;

    /// Toolbar "Add panel", then "Add Query".
    async fn add_panel(&mut self) -> Result<()>;

    /// Opens the data source picker and chooses `name`.
    async fn pick_data_source(&mut self, name: &str) -> Result<()>;

    async fn open_visualization_tab(&mut self) -> Result<()>;
}

/// Plain HTTP access to the host API.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// JSON body of a `GET`, whatever the response status.
    async fn get_json(&self, url: &Url) -> Result<Value>;
}

/// `HostApi` over reqwest, optionally with basic auth.
#[derive(Debug, Clone, Default)]
pub struct HttpHostApi {
    client: reqwest::Client,
    basic_auth: Option<(String, String)>,
}

impl HttpHostApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic_auth(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.basic_auth = Some((user.into(), password.into()));
        self
    }
}

#[async_trait]
impl HostApi for HttpHostApi {
    async fn get_json(&self, url: &Url) -> Result<Value> {
        debug!(%url, "Fetching");
        let mut request = self.client.get(url.clone());
        if let Some((user, password)) = &self.basic_auth {
            request = request.basic_auth(user, Some(password));
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|_| E2eError::InvalidBody {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

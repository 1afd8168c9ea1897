use crate::error::BackendSrvError;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// The host's backend-request abstraction.
///
/// Paths are absolute on the host (`/api/...`). Each call issues exactly one
/// request and returns the decoded JSON body; an empty body decodes as
/// `Value::Null`.
#[async_trait::async_trait]
pub trait BackendSrv: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, BackendSrvError>;

    async fn post(&self, path: &str, body: &Value) -> Result<Value, BackendSrvError>;
}

/// `BackendSrv` over plain HTTP against a running host.
#[derive(Debug, Clone)]
pub struct HttpBackendSrv {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackendSrv {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Authenticate every request with a host service-account token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path` to the base URL, keeping any sub-path the host is
    /// served under.
    pub fn url_for(&self, path: &str) -> Result<Url, BackendSrvError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, BackendSrvError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let res = request.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).ok();
            warn!(%status, has_body = body.is_some(), "Backend request failed");
            return Err(BackendSrvError::Status { status, body });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl BackendSrv for HttpBackendSrv {
    async fn get(&self, path: &str) -> Result<Value, BackendSrvError> {
        let url = self.url_for(path)?;
        debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, BackendSrvError> {
        let url = self.url_for(path)?;
        debug!(%url, "POST");
        self.send(self.client.post(url).json(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srv(base: &str) -> HttpBackendSrv {
        HttpBackendSrv::new(Url::parse(base).unwrap())
    }

    #[test]
    fn url_for_appends_to_root() {
        let url = srv("http://localhost:3000").url_for("/api/health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/health");
    }

    #[test]
    fn url_for_keeps_sub_path() {
        let url = srv("https://example.com/grafana/")
            .url_for("/api/datasources/3/health")
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/grafana/api/datasources/3/health");
    }

    #[test]
    fn url_for_accepts_relative_path() {
        let url = srv("http://localhost:3000/").url_for("api/ds/query").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/ds/query");
    }
}

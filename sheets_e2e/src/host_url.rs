use crate::error::{E2eError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub const BASE_URL_ENV_VAR: &str = "BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

fn dashboard_uid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/d/(.*)/").expect("dashboard uid regex must compile"))
}

fn data_source_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/edit/(.*)/").expect("data source id regex must compile"))
}

/// Picks the host base URL: the environment value, then the configured one,
/// then `http://localhost:3000`. Blank values are skipped.
pub fn resolve_base_url(env_value: Option<String>, configured: Option<&str>) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.filter(|v| !v.trim().is_empty()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// `path` appended to the host base URL (`BASE_URL` wins over `configured`).
pub fn from_base_url(path: &str, configured: Option<&str>) -> Result<Url> {
    let base = resolve_base_url(std::env::var(BASE_URL_ENV_VAR).ok(), configured);
    join_base(&base, path)
}

pub fn join_base(base: &str, path: &str) -> Result<Url> {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// Dashboard uid from a `/d/<uid>/<slug>` URL.
pub fn dashboard_uid(url: &str) -> Result<String> {
    dashboard_uid_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| E2eError::DashboardUid(url.to_string()))
}

/// Data source id from a `/datasources/edit/<id>/` URL.
pub fn data_source_id(url: &str) -> Result<String> {
    data_source_id_pattern()
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| E2eError::DataSourceId(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_precedence() {
        assert_eq!(
            resolve_base_url(Some("http://env:1".into()), Some("http://cfg:2")),
            "http://env:1"
        );
        assert_eq!(resolve_base_url(None, Some("http://cfg:2")), "http://cfg:2");
        assert_eq!(resolve_base_url(Some(" ".into()), None), DEFAULT_BASE_URL);
        assert_eq!(resolve_base_url(None, None), DEFAULT_BASE_URL);
    }

    #[test]
    fn join_avoids_double_slashes() {
        let url = join_base("http://localhost:3000/", "/api/datasources/4/health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/datasources/4/health");
    }

    #[test]
    fn join_keeps_base_sub_path() {
        let url = join_base("http://host/grafana", "api/health").unwrap();
        assert_eq!(url.as_str(), "http://host/grafana/api/health");
    }

    #[test]
    fn parses_ids_from_host_urls() {
        assert_eq!(
            dashboard_uid("http://localhost:3000/d/AbC12/new-dashboard?orgId=1").unwrap(),
            "AbC12"
        );
        assert_eq!(
            data_source_id("http://localhost:3000/datasources/edit/17/").unwrap(),
            "17"
        );
    }

    #[test]
    fn unparseable_urls_are_errors() {
        let err = dashboard_uid("http://localhost:3000/dashboard/new").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Couldn't parse uid from http://localhost:3000/dashboard/new"
        );
        assert!(matches!(
            data_source_id("http://localhost:3000/datasources/new"),
            Err(E2eError::DataSourceId(_))
        ));
    }
}

use super::auth::{ServiceAccount, TokenSource};
use super::model::{ApiErrorEnvelope, DriveFile, DriveFileList, Spreadsheet};
use crate::error::SheetsError;
use sheets_common::{AuthType, SheetsSourceOptions};
use tracing::{debug, warn};
use url::Url;

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const DRIVE_PAGE_SIZE: &str = "1000";

/// Base URLs of the Google APIs. Overridable so tests can point the client at
/// a mock server.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub sheets: Url,
    pub drive: Url,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            sheets: Url::parse("https://sheets.googleapis.com/v4").expect("static URL"),
            drive: Url::parse("https://www.googleapis.com/drive/v3").expect("static URL"),
        }
    }
}

/// Calls the backend makes against Google.
#[async_trait::async_trait]
pub trait SheetsApi: Send + Sync {
    /// Proves the configured credentials are usable.
    async fn authenticate(&self) -> Result<(), SheetsError>;

    /// Spreadsheet metadata plus grid data for `range` (whole first sheet when
    /// `range` is empty).
    async fn get_spreadsheet(&self, id: &str, range: &str) -> Result<Spreadsheet, SheetsError>;

    /// Every spreadsheet file visible to the credentials.
    async fn list_spreadsheet_files(&self) -> Result<Vec<DriveFile>, SheetsError>;
}

enum Auth {
    ApiKey(String),
    ServiceAccount(TokenSource),
}

/// `SheetsApi` over the public Google REST endpoints.
pub struct GoogleClient {
    http: reqwest::Client,
    auth: Auth,
    endpoints: GoogleEndpoints,
}

impl GoogleClient {
    /// Validates the datasource options and prepares the credentials. No
    /// network traffic happens here.
    pub fn new(
        options: &SheetsSourceOptions,
        endpoints: GoogleEndpoints,
    ) -> Result<Self, SheetsError> {
        options.validate()?;
        let auth = match options.auth_type {
            AuthType::Key => Auth::ApiKey(options.api_key.clone().unwrap_or_default()),
            AuthType::Jwt => {
                let key = options.jwt.as_deref().unwrap_or_default();
                let account = ServiceAccount::try_from_str(key)?;
                Auth::ServiceAccount(TokenSource::new(account))
            }
        };

        Ok(Self {
            http: reqwest::Client::new(),
            auth,
            endpoints,
        })
    }

    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(format!("cannot append path to {base}")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T>(&self, mut url: Url) -> Result<T, SheetsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let bearer = match &self.auth {
            Auth::ApiKey(key) => {
                url.query_pairs_mut().append_pair("key", key);
                None
            }
            Auth::ServiceAccount(tokens) => Some(tokens.access_token(&self.http).await?),
        };

        debug!(path = url.path(), "Google API request");
        let mut request = self.http.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let res = request.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            warn!(%status, %message, "Google API request failed");
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl SheetsApi for GoogleClient {
    async fn authenticate(&self) -> Result<(), SheetsError> {
        match &self.auth {
            Auth::ApiKey(_) => Ok(()),
            Auth::ServiceAccount(tokens) => tokens.access_token(&self.http).await.map(|_| ()),
        }
    }

    async fn get_spreadsheet(&self, id: &str, range: &str) -> Result<Spreadsheet, SheetsError> {
        let mut url = Self::endpoint(&self.endpoints.sheets, &["spreadsheets", id])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("includeGridData", "true");
            if !range.is_empty() {
                pairs.append_pair("ranges", range);
            }
        }
        self.get_json(url).await
    }

    async fn list_spreadsheet_files(&self) -> Result<Vec<DriveFile>, SheetsError> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = Self::endpoint(&self.endpoints.drive, &["files"])?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs
                    .append_pair("q", &format!("mimeType='{SPREADSHEET_MIME_TYPE}'"))
                    .append_pair("fields", "nextPageToken, files(id, name)")
                    .append_pair("pageSize", DRIVE_PAGE_SIZE);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: DriveFileList = self.get_json(url).await?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }
}

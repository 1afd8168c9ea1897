//! HTTP surface of the plugin backend

use crate::config::{BackendConfig, SheetsSettings};
use crate::error::{BackendError, Result, SheetsError};
use crate::googlesheets::client::SheetsApi;
use crate::googlesheets::{GoogleClient, GoogleSheets};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Map, Value, json};
use sheets_common::{
    DataFrame, DataResponse, HealthCheckResult, HealthStatus, QueryDataRequest, QueryDataResponse,
    QueryType, SheetsQuery,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared state: the one datasource this process serves.
pub struct AppState {
    settings: SheetsSettings,
    /// `Err` holds the reason the configured credentials are unusable.
    sheets: std::result::Result<GoogleSheets, String>,
}

impl AppState {
    pub fn new(settings: SheetsSettings, client: Arc<dyn SheetsApi>) -> Self {
        Self {
            settings,
            sheets: Ok(GoogleSheets::new(client)),
        }
    }

    /// Builds the Google client from the settings. Invalid credentials do not
    /// stop the server; health checks and queries report them instead.
    pub fn from_config(config: &BackendConfig) -> Self {
        let sheets = GoogleClient::new(&config.settings.json_data, config.endpoints.clone())
            .map(|client| GoogleSheets::new(Arc::new(client)))
            .map_err(|e| {
                warn!("Datasource is not usable: {}", e);
                e.to_string()
            });
        Self {
            settings: config.settings.clone(),
            sheets,
        }
    }

    fn serves(&self, id: &str) -> bool {
        id == self.settings.id.to_string()
            || (!self.settings.uid.is_empty() && id == self.settings.uid)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(liveness))
        .route("/api/datasources/{id}/health", get(datasource_health))
        .route(
            "/api/datasources/{id}/resources/spreadsheets",
            get(list_spreadsheets),
        )
        .route("/api/ds/query", post(query_data))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the backend until Ctrl-C.
pub async fn start_server(config: BackendConfig) -> Result<()> {
    info!("Starting Google Sheets backend on {}", config.bind_addr);

    let state = Arc::new(AppState::from_config(&config));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| BackendError::HttpServer(format!("Failed to bind: {}", e)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| BackendError::HttpServer(format!("Failed to get local addr: {}", e)))?;

    info!(
        datasource_id = config.settings.id,
        "Backend listening on http://{}", local_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BackendError::HttpServer(format!("Server error: {}", e)))?;

    info!("Backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn not_found(id: &str) -> Response {
    debug!(id, "Unknown datasource");
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Data source not found" })),
    )
        .into_response()
}

/// `GET /api/datasources/{id}/health`
///
/// 200 with status `OK` when the credentials work, 503 with status `ERROR`
/// otherwise.
async fn datasource_health(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    if !state.serves(&id) {
        return not_found(&id);
    }

    let outcome = match &state.sheets {
        Ok(sheets) => sheets.check_credentials().await.map_err(|e| e.to_string()),
        Err(reason) => Err(reason.clone()),
    };

    let mut details = Map::new();
    details.insert(
        "authType".into(),
        json!(state.settings.json_data.auth_type),
    );

    let result = match outcome {
        Ok(()) => HealthCheckResult::ok("Success"),
        Err(message) => {
            warn!(datasource_id = %id, %message, "Health check failed");
            HealthCheckResult::error(message)
        }
    }
    .with_details(details);

    let status = match result.status {
        HealthStatus::Ok => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(result)).into_response()
}

/// `GET /api/datasources/{id}/resources/spreadsheets`
async fn list_spreadsheets(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    if !state.serves(&id) {
        return not_found(&id);
    }

    let listed = match &state.sheets {
        Ok(sheets) => sheets
            .list_spreadsheets()
            .await
            .map_err(|e| format!("Could not get all files: {e}")),
        Err(reason) => Err(reason.clone()),
    };

    match listed {
        Ok(files) => {
            let spreadsheets: Map<String, Value> = files
                .into_iter()
                .map(|file| (file.id, Value::String(file.name)))
                .collect();
            Json(json!({ "spreadsheets": spreadsheets })).into_response()
        }
        Err(message) => {
            error!(%message, "Listing spreadsheets failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response()
        }
    }
}

/// `POST /api/ds/query`
///
/// Every query gets an entry under its `refId`; a failing query does not stop
/// the others.
async fn query_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryDataRequest>,
) -> Json<QueryDataResponse> {
    let mut response = QueryDataResponse::default();
    for query in &request.queries {
        let result = match &state.sheets {
            Ok(sheets) => run_query(sheets, query).await.map_err(|e| e.to_string()),
            Err(reason) => Err(reason.clone()),
        };

        let data = match result {
            Ok(frame) => DataResponse {
                frames: vec![frame],
                error: None,
            },
            Err(message) => {
                debug!(ref_id = %query.ref_id, %message, "Query failed");
                let mut custom = Map::new();
                custom.insert("error".into(), json!(message));
                DataResponse {
                    frames: vec![DataFrame::new(query.ref_id.clone()).with_custom_meta(custom)],
                    error: Some(message),
                }
            }
        };
        response.results.insert(query.ref_id.clone(), data);
    }
    Json(response)
}

async fn run_query(
    sheets: &GoogleSheets,
    query: &SheetsQuery,
) -> std::result::Result<DataFrame, QueryError> {
    match query.parsed_query_type() {
        Some(QueryType::TestApi) => Ok(sheets.test_api(&query.ref_id).await?),
        Some(QueryType::Query) => Ok(sheets.query(query).await?),
        None => Err(QueryError::InvalidType(
            query.query_type.clone().unwrap_or_default(),
        )),
    }
}

#[derive(Debug, thiserror::Error)]
enum QueryError {
    #[error("Invalid query type: {0}")]
    InvalidType(String),
    #[error(transparent)]
    Sheets(#[from] SheetsError),
}

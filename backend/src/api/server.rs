//! HTTP server for the logbook API.
//!
//! # API Endpoints
//!
//! | Method | Path                            | Description                         |
//! |--------|---------------------------------|-------------------------------------|
//! | GET    | `/health`                       | Health check                        |
//! | POST   | `/api/logbooks/{name}/upload`   | Upload a logbook file (multipart)   |
//! | GET    | `/api/logbooks/{name}/flights`  | Filtered, sorted flights and totals |
//! | POST   | `/api/logbooks/{name}/flights`  | Add a flight by hand                |
//! | DELETE | `/api/logbooks/{name}/flights`  | Clear the logbook                   |
//! | POST   | `/api/airports`                 | Register a missing airport          |
//! | GET    | `/api/logs`                     | SSE stream for real-time logs       |

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, Method},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::types::{AirportResponse, FlightsResponse, ImportResponse};
use crate::config::AppConfig;
use crate::directory::{AirportDirectory, ManualAirport};
use crate::error::{ServerError, ServerResult};
use crate::logbook::{FlightQuery, ManualFlight, Workspace};
use crate::models::FlightRecord;
use crate::parser::SourceFormat;
use crate::pipeline::{import_bytes, ImportOptions};
use crate::resolve::AirportResolver;

/// Shared server state.
///
/// Imports resolve against a snapshot of the directory; registering an airport
/// swaps in an extended copy.
pub struct AppState {
    directory: RwLock<Arc<AirportDirectory>>,
    workspace: RwLock<Workspace>,
    config: AppConfig,
}

/// One uploaded file with its optional column assignment.
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub from_column: Option<usize>,
    pub to_column: Option<usize>,
}

impl AppState {
    pub fn new(directory: AirportDirectory, config: AppConfig) -> Self {
        Self {
            directory: RwLock::new(Arc::new(directory)),
            workspace: RwLock::new(Workspace::new()),
            config,
        }
    }

    pub async fn resolver(&self) -> AirportResolver {
        let directory = Arc::clone(&*self.directory.read().await);
        AirportResolver::new(directory, self.config.bias.clone())
    }

    /// Import an upload into the named logbook, creating it if needed.
    pub async fn import_upload(&self, name: &str, upload: Upload) -> ServerResult<ImportResponse> {
        let format = SourceFormat::from_path(&upload.file_name)
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        let options = ImportOptions {
            from_column: upload.from_column,
            to_column: upload.to_column,
            batch_size: self.config.batch_size,
        };

        // the logbook is only created once the import succeeds
        let distances = self
            .workspace
            .read()
            .await
            .get(name)
            .map(|logbook| logbook.session().distances())
            .unwrap_or_default();
        let resolver = self.resolver().await;
        let outcome = import_bytes(&upload.bytes, format, &resolver, distances, options).await?;

        let mut workspace = self.workspace.write().await;
        let logbook = workspace.get_or_create(name);
        logbook.apply_import(&outcome);
        Ok(ImportResponse::new(outcome, logbook))
    }

    pub async fn flights(&self, name: &str, query: &FlightQuery) -> ServerResult<FlightsResponse> {
        let resolver = self.resolver().await;
        let workspace = self.workspace.read().await;
        let logbook = workspace.get(name)?;
        Ok(FlightsResponse::new(logbook, logbook.view(query, &resolver)))
    }

    pub async fn add_flight(&self, name: &str, input: &ManualFlight) -> ServerResult<FlightRecord> {
        let resolver = self.resolver().await;
        let mut workspace = self.workspace.write().await;
        let flight = workspace.get_or_create(name).add_manual_flight(input, &resolver)?;
        Ok(flight.clone())
    }

    /// Returns the number of flights removed.
    pub async fn clear(&self, name: &str) -> ServerResult<usize> {
        let mut workspace = self.workspace.write().await;
        let logbook = workspace.get_mut(name)?;
        let removed = logbook.flights().len();
        logbook.clear();
        Ok(removed)
    }

    pub async fn register_airport(&self, input: &ManualAirport) -> ServerResult<AirportResponse> {
        let airport = {
            let mut directory = self.directory.write().await;
            Arc::make_mut(&mut *directory).add_manual_airport(input)?
        };
        let resolved_codes = input.codes();
        self.workspace.write().await.forget_missing(&resolved_codes);
        log_success(format!("Registered airport {}", airport.display_code()));
        Ok(AirportResponse {
            airport,
            resolved_codes,
        })
    }
}

/// Routes over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/logbooks/{name}/upload", post(upload_logbook))
        .route(
            "/api/logbooks/{name}/flights",
            get(list_flights).post(add_flight).delete(clear_flights),
        )
        .route("/api/airports", post(register_airport))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(
    config: AppConfig,
    directory: AirportDirectory,
) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let app = router(Arc::new(AppState::new(directory, config)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Logmap server running on http://localhost:{}", port);
    println!("   POST   /api/logbooks/{{name}}/upload  - Upload logbook file");
    println!("   GET    /api/logbooks/{{name}}/flights - List flights");
    println!("   POST   /api/logbooks/{{name}}/flights - Add flight");
    println!("   DELETE /api/logbooks/{{name}}/flights - Clear logbook");
    println!("   POST   /api/airports                - Register airport");
    println!("   GET    /api/logs                    - SSE log stream");
    println!("   GET    /health                      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let airports = state.directory.read().await.len();
    Json(json!({
        "status": "ok",
        "service": "logmap",
        "version": env!("CARGO_PKG_VERSION"),
        "airports": airports,
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers drop entries instead of closing the stream.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn upload_logbook(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> ServerResult<Json<ImportResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut from_column = None;
    let mut to_column = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.csv").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            "fromColumn" | "toColumn" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                let column = parse_column(&field_name, &text)?;
                if field_name == "fromColumn" {
                    from_column = column;
                } else {
                    to_column = column;
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ServerError::BadRequest("No file provided".into()))?;

    println!("\n{}", "=".repeat(70));
    log_info(format!("📄 NEW UPLOAD to {}: {} ({} bytes)", name, file_name, bytes.len()));
    println!("{}\n", "=".repeat(70));

    let upload = Upload {
        file_name,
        bytes,
        from_column,
        to_column,
    };
    Ok(Json(state.import_upload(&name, upload).await?))
}

fn parse_column(field: &str, text: &str) -> ServerResult<Option<usize>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .map_err(|_| ServerError::BadRequest(format!("{} must be a column index, got '{}'", field, text)))
}

async fn list_flights(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(query): Query<FlightQuery>,
) -> ServerResult<Json<FlightsResponse>> {
    Ok(Json(state.flights(&name, &query).await?))
}

async fn add_flight(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(input): Json<ManualFlight>,
) -> ServerResult<Json<FlightRecord>> {
    Ok(Json(state.add_flight(&name, &input).await?))
}

async fn clear_flights(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ServerResult<Json<Value>> {
    let removed = state.clear(&name).await?;
    Ok(Json(json!({ "logbook": name, "removed": removed })))
}

async fn register_airport(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ManualAirport>,
) -> ServerResult<Json<AirportResponse>> {
    Ok(Json(state.register_airport(&input).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixtures::fixture_directory;
    use crate::error::LogbookError;
    use crate::pipeline::ImportStatus;

    fn state() -> AppState {
        AppState::new(fixture_directory(), AppConfig::default())
    }

    fn upload(name: &str, content: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            bytes: content.as_bytes().to_vec(),
            from_column: None,
            to_column: None,
        }
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let state = state();
        let csv = "Date,From,To,Time\n10/25/2023,JFK,LAX,2:30\n10/26/2023,LAX,QQQ,1.0\n";
        let response = state.import_upload("Logbook 1", upload("book.csv", csv)).await.unwrap();

        assert_eq!(response.status, ImportStatus::Imported);
        assert_eq!(response.flights.len(), 1);
        assert_eq!(response.missing_airports, vec!["QQQ"]);

        let view = state.flights("Logbook 1", &FlightQuery::default()).await.unwrap();
        assert_eq!(view.flights.len(), 1);
        assert_eq!(view.stats.total_time, 2.5);
    }

    #[tokio::test]
    async fn test_failed_upload_creates_no_logbook() {
        let state = state();
        let err = state
            .import_upload("c", upload("book.csv", "  \n  "))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        let err = state.flights("c", &FlightQuery::default()).await.unwrap_err();
        assert!(matches!(err, ServerError::Logbook(LogbookError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_bad_request() {
        let err = state()
            .import_upload("x", upload("book.pdf", "%PDF"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_registering_airport_clears_missing_and_resolves() {
        let state = state();
        let csv = "Date,From,To,Time\n10/26/2023,LAX,QQQ,1.0\n";
        let first = state.import_upload("a", upload("book.csv", csv)).await.unwrap();
        assert!(first.flights.is_empty());
        assert!(matches!(first.status, ImportStatus::NeedsColumnMapping { .. }));

        let input = ManualAirport {
            iata: Some("qqq".into()),
            lat: 34.0,
            lon: -118.0,
            ..Default::default()
        };
        let registered = state.register_airport(&input).await.unwrap();
        assert_eq!(registered.resolved_codes, vec!["QQQ"]);

        let view = state.flights("a", &FlightQuery::default()).await.unwrap();
        assert!(view.missing_airports.is_empty());

        let second = state.import_upload("a", upload("book.csv", csv)).await.unwrap();
        assert_eq!(second.flights.len(), 1);
        assert_eq!(second.flights[0].arrival, "QQQ");
    }

    #[tokio::test]
    async fn test_manual_flight_and_clear() {
        let state = state();
        let flight = state
            .add_flight(
                "b",
                &ManualFlight {
                    departure: "SAN".into(),
                    arrival: "MYF".into(),
                    notes: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(flight.route_key(), "SAN-MYF");

        assert_eq!(state.clear("b").await.unwrap(), 1);
        let err = state.clear("nope").await.unwrap_err();
        assert!(matches!(err, ServerError::Logbook(LogbookError::NotFound(_))));
    }

    #[test]
    fn test_parse_column() {
        assert_eq!(parse_column("fromColumn", " 2 ").unwrap(), Some(2));
        assert_eq!(parse_column("fromColumn", "").unwrap(), None);
        assert!(parse_column("toColumn", "B").is_err());
    }
}

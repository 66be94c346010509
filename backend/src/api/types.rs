//! REST API types.
//!
//! Every body is camelCase JSON. Import and error bodies carry a `jobId` so a
//! client can match them with the log stream.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::logs::log_error;
use crate::error::{DirectoryError, ImportError, IngestError, LogbookError, ServerError};
use crate::logbook::{Logbook, LogbookStats};
use crate::models::{Airport, FlightRecord};
use crate::pipeline::{ImportOutcome, ImportStatus, SourceInfo};

/// Response to a logbook upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub job_id: String,
    pub logbook: String,
    /// `imported`, or `needsColumnMapping` with a row preview
    pub status: ImportStatus,
    /// Flights of this upload only
    pub flights: Vec<FlightRecord>,
    pub rows_processed: usize,
    pub rows_skipped: usize,
    pub source: SourceInfo,
    /// Every unresolved code of the logbook so far
    pub missing_airports: Vec<String>,
    pub stats: LogbookStats,
}

impl ImportResponse {
    pub fn new(outcome: ImportOutcome, logbook: &Logbook) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            logbook: logbook.name().to_string(),
            status: outcome.status,
            flights: outcome.flights,
            rows_processed: outcome.rows_processed,
            rows_skipped: outcome.rows_skipped,
            source: outcome.source,
            missing_airports: logbook.session().missing_airports(),
            stats: logbook.stats(),
        }
    }
}

/// A filtered view of a logbook.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightsResponse {
    pub logbook: String,
    pub flights: Vec<FlightRecord>,
    /// Totals over the listed flights
    pub stats: LogbookStats,
    pub missing_airports: Vec<String>,
}

impl FlightsResponse {
    pub fn new(logbook: &Logbook, flights: Vec<&FlightRecord>) -> Self {
        Self {
            logbook: logbook.name().to_string(),
            stats: LogbookStats::from_flights(flights.iter().copied()),
            flights: flights.into_iter().cloned().collect(),
            missing_airports: logbook.session().missing_airports(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportResponse {
    pub airport: Arc<Airport>,
    /// Codes removed from the missing lists
    pub resolved_codes: Vec<String>,
}

/// Error body.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Import(ImportError::Ingest(IngestError::IoError(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Import(ImportError::Ingest(_)) => StatusCode::BAD_REQUEST,
            ServerError::Import(ImportError::InvalidBatchSize) => StatusCode::BAD_REQUEST,
            ServerError::Import(ImportError::Directory(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Directory(DirectoryError::InvalidAirport { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Logbook(LogbookError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Logbook(LogbookError::UnknownAirport(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log_error(self.to_string());
        }
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body() {
        let body = error_response("No file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "No file provided");
        assert!(Uuid::parse_str(body["jobId"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_status_codes() {
        let empty: ServerError = ImportError::Ingest(IngestError::EmptyInput).into();
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

        let missing: ServerError = LogbookError::NotFound("Logbook 3".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let invalid: ServerError = DirectoryError::InvalidAirport { errors: vec![] }.into();
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let internal = ServerError::Internal("lock".into());
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_flights_response_stats_cover_listed_flights() {
        let book = Logbook::new("Logbook 1");
        let body = serde_json::to_value(FlightsResponse::new(&book, vec![])).unwrap();
        assert_eq!(body["logbook"], "Logbook 1");
        assert_eq!(body["stats"]["flights"], 0);
        assert_eq!(body["missingAirports"], json!([]));
    }
}

//! # Logmap - pilot logbook import with airport resolution
//!
//! Logmap turns messy pilot logbooks (CSV exports, OCR text, PDF text rows)
//! into flight records anchored to resolved airports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Logbook    │────▶│   Parser    │────▶│  Assembler   │────▶│  Flight      │
//! │ csv/txt/pdf │     │ (auto-enc)  │     │ (strategies) │     │  records     │
//! └─────────────┘     └─────────────┘     └──────┬───────┘     └──────────────┘
//!                                                │
//!                               classify ─ resolve ─ extract
//!                                           │
//!                                   Airport directory
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use logmap::{import_file, AirportDirectory, AirportResolver, ImportOptions, Logbook, RegionalBias};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = Arc::new(AirportDirectory::load("data/airports.json")?);
//!     let resolver = AirportResolver::new(directory, RegionalBias::default());
//!     let mut logbook = Logbook::new("Logbook 1");
//!
//!     let outcome = import_file("logbook.csv".as_ref(), &resolver, logbook.session().distances(), ImportOptions::default()).await?;
//!     logbook.apply_import(&outcome);
//!     println!("{} flights", logbook.flights().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Airports, flight records, dates
//! - [`directory`] - Airport directory and code index
//! - [`validation`] - JSON schema validation of airport entries
//! - [`classify`] - Airport code and row classification
//! - [`resolve`] - Airport resolver and distances
//! - [`extract`] - Date, duration, time category and aircraft extraction
//! - [`assemble`] - Record assembler and its route strategies
//! - [`parser`] - Row ingestion with auto-detection
//! - [`session`] - Per-logbook accumulated state
//! - [`pipeline`] - Batched concurrent import
//! - [`logbook`] - Logbooks, views and stats
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Reference data
pub mod directory;
pub mod validation;

// Extraction engine
pub mod assemble;
pub mod classify;
pub mod extract;
pub mod resolve;

// Ingestion
pub mod parser;
pub mod pipeline;

// State
pub mod logbook;
pub mod session;

pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, DirectoryError, ImportError, IngestError, LogbookError, ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Airport, CategoryTimes, Coordinates, FlightDate, FlightRecord, Row, TimeCategory};

// =============================================================================
// Re-exports - Directory & validation
// =============================================================================

pub use directory::{AirportDataset, AirportDirectory, CodeIndex, CsvConversion, ManualAirport};
pub use validation::{validate_airport_entry, validate_manual_airport};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use assemble::{
    ColumnLayout, ColumnPair, RecordAssembler, RouteStrategy, RowDisposition, RowOutcome,
};
pub use classify::{classify_row, is_airport_code, is_likely_header, is_summary_row, RowKind};
pub use extract::{find_date, find_duration, RowFields};
pub use resolve::{great_circle_km, AirportResolver, DistanceCache, RegionalBias, ScoredCandidate};

// =============================================================================
// Re-exports - Parsing & pipeline
// =============================================================================

pub use parser::{parse_bytes, parse_file, ParseResult, RowGroup, SourceFormat};
pub use pipeline::{
    import_bytes, import_file, import_parsed, ImportOptions, ImportOutcome, ImportStatus,
    SourceInfo,
};

// =============================================================================
// Re-exports - Logbooks
// =============================================================================

pub use config::AppConfig;
pub use logbook::{FlightQuery, Logbook, LogbookStats, ManualFlight, SortOrder, Workspace};
pub use session::Session;

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}

//! Domain models for logbook import.
//!
//! - [`Airport`] - One entry of the airport directory
//! - [`Coordinates`] - Latitude/longitude pair, serialized as `[lat, lon]`
//! - [`FlightRecord`] - One resolved leg, ready for display and aggregation
//! - [`FlightDate`] - Calendar date of a leg, or the unknown-date sentinel
//! - [`TimeCategory`] - Named flight-time columns (cross country, night, ...)
//! - [`Row`] - Trimmed cells of one source line

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Trimmed string cells of one source line.
pub type Row = Vec<String>;

// =============================================================================
// Airport
// =============================================================================

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both finite and within [-90, 90] x [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from(pair: [f64; 2]) -> Self {
        Self { lat: pair[0], lon: pair[1] }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lon]
    }
}

fn unknown_country() -> String {
    "Unknown".to_string()
}

fn unknown_airport_name() -> String {
    "Unknown Airport".to_string()
}

/// An airport of the reference directory.
///
/// `identifier` is the canonical code, chosen IATA > ICAO > GPS code > local code.
/// Unknown dataset fields are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Position in the directory, assigned at load.
    #[serde(default)]
    pub id: usize,

    #[serde(default)]
    pub iata: Option<String>,

    #[serde(default)]
    pub icao: Option<String>,

    #[serde(default)]
    pub identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gps_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_code: Option<String>,

    /// ISO 3166 alpha-2 or "Unknown".
    #[serde(default = "unknown_country")]
    pub country: String,

    /// ISO 3166-2 region such as "US-CA".
    #[serde(default, alias = "iso_region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    pub coords: Coordinates,

    #[serde(default = "unknown_airport_name")]
    pub name: String,
}

impl Airport {
    /// Canonical code by precedence IATA > ICAO > GPS code > local code.
    pub fn canonical_code(&self) -> Option<&str> {
        self.iata
            .as_deref()
            .or(self.icao.as_deref())
            .or(self.gps_code.as_deref())
            .or(self.local_code.as_deref())
    }

    /// Code shown on flight records: IATA, else the canonical identifier.
    pub fn display_code(&self) -> &str {
        self.iata
            .as_deref()
            .or(self.identifier.as_deref())
            .or_else(|| self.canonical_code())
            .unwrap_or("")
    }

    /// Every non-null code field, identifier first.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        [
            &self.identifier,
            &self.gps_code,
            &self.icao,
            &self.local_code,
            &self.iata,
        ]
        .into_iter()
        .filter_map(|c| c.as_deref())
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.codes().any(|c| c == code)
    }
}

// =============================================================================
// Flight Date
// =============================================================================

/// Date of a flight, or the sentinel for rows where no date was found.
///
/// Serialized as `YYYY-MM-DD`, the sentinel as `N/A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FlightDate {
    Logged(NaiveDate),
    Unknown,
}

impl FlightDate {
    pub const UNKNOWN_LABEL: &'static str = "N/A";

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FlightDate::Logged(d) => Some(*d),
            FlightDate::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, FlightDate::Logged(_))
    }
}

impl fmt::Display for FlightDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightDate::Logged(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FlightDate::Unknown => f.write_str(Self::UNKNOWN_LABEL),
        }
    }
}

impl From<FlightDate> for String {
    fn from(date: FlightDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for FlightDate {
    type Error = chrono::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == Self::UNKNOWN_LABEL {
            return Ok(FlightDate::Unknown);
        }
        NaiveDate::parse_from_str(&value, "%Y-%m-%d").map(FlightDate::Logged)
    }
}

// =============================================================================
// Time Categories
// =============================================================================

/// Named flight-time breakdowns found as `label, value` cell pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeCategory {
    CrossCountry,
    Night,
    Solo,
    ActualInstrument,
}

impl TimeCategory {
    pub const ALL: [TimeCategory; 4] = [
        TimeCategory::CrossCountry,
        TimeCategory::Night,
        TimeCategory::Solo,
        TimeCategory::ActualInstrument,
    ];

    /// Lowercase label searched for inside cells.
    pub fn label(&self) -> &'static str {
        match self {
            TimeCategory::CrossCountry => "cross country",
            TimeCategory::Night => "night",
            TimeCategory::Solo => "solo",
            TimeCategory::ActualInstrument => "actual ifr",
        }
    }
}

/// Hours logged per [`TimeCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTimes {
    pub cross_country: f64,
    pub night: f64,
    pub solo: f64,
    pub actual_instrument: f64,
}

impl CategoryTimes {
    pub fn get(&self, category: TimeCategory) -> f64 {
        match category {
            TimeCategory::CrossCountry => self.cross_country,
            TimeCategory::Night => self.night,
            TimeCategory::Solo => self.solo,
            TimeCategory::ActualInstrument => self.actual_instrument,
        }
    }

    pub fn set(&mut self, category: TimeCategory, hours: f64) {
        match category {
            TimeCategory::CrossCountry => self.cross_country = hours,
            TimeCategory::Night => self.night = hours,
            TimeCategory::Solo => self.solo = hours,
            TimeCategory::ActualInstrument => self.actual_instrument = hours,
        }
    }
}

// =============================================================================
// Flight Record
// =============================================================================

/// One resolved leg.
///
/// Carries the resolved airports themselves so consumers can draw coordinates
/// without resolving codes again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// Display code of the departure airport.
    pub departure: String,
    /// Display code of the arrival airport.
    pub arrival: String,
    pub dep_airport: Arc<Airport>,
    pub arr_airport: Arc<Airport>,
    pub date: FlightDate,
    /// Great-circle distance in kilometres.
    pub distance: f64,
    /// Hours.
    pub duration: f64,
    #[serde(flatten)]
    pub times: CategoryTimes,
    pub aircraft_type: String,
    pub registration: String,
    pub notes: String,
    pub is_local: bool,
}

impl FlightRecord {
    /// Key used by route frequency counters, `DEP-ARR`.
    pub fn route_key(&self) -> String {
        format!("{}-{}", self.departure, self.arrival)
    }
}

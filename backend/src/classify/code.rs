//! Airport code classifier.
//!
//! A token is an airport code when it is three or four letters, is not one of
//! the aviation acronyms that look like codes (ILS, CRJ, PIC, ...), and is a key
//! of the code index.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::directory::AirportDirectory;

static CODE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3,4}$").expect("valid regex"));

/// Procedure, aircraft type and training acronyms that are never airports.
pub const EXCLUDED_TERMS: &[&str] = &[
    "ILS", "LOC", "VOR", "NDB", "GPS", "DME", "RNAV", "TACAN", "CRJ", "FAA", "A320", "B737",
    "B747", "B757", "B767", "B777", "B787", "E170", "E175", "E190", "E195", "FRASCA", "AVENGER",
    "SIM", "FTD", "DAY", "NIGHT", "TYPE", "TOTAL", "OUT", "IN", "PIC", "SIC", "SOLO", "CFI", "DPE",
    "MEI", "VMC", "PPL", "AND",
];

/// First letters (or letter pairs) of ICAO location indicators accepted in remarks.
pub const ICAO_REGION_PREFIXES: &[&str] = &[
    "K", "C", "EG", "L", "E", "Y", "Z", "V", "W", "T", "U", "O", "F", "S", "R", "M", "N", "B",
    "D", "G", "H", "I", "P", "A",
];

pub fn is_excluded_term(token: &str) -> bool {
    let upper = token.to_uppercase();
    EXCLUDED_TERMS.contains(&upper.as_str())
}

/// Shape and exclusion check only, no directory lookup.
///
/// Used to decide whether an unresolved token is worth reporting as missing.
pub fn looks_like_code(token: &str) -> bool {
    let upper = token.trim().to_uppercase();
    CODE_SHAPE.is_match(&upper) && !EXCLUDED_TERMS.contains(&upper.as_str())
}

/// Full classifier: plausible shape, not excluded, present in the index.
pub fn is_airport_code(token: &str, directory: &AirportDirectory) -> bool {
    looks_like_code(token) && directory.contains_code(&token.trim().to_uppercase())
}

pub fn has_region_prefix(code: &str) -> bool {
    ICAO_REGION_PREFIXES.iter().any(|p| code.starts_with(p))
}

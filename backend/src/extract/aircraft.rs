//! Aircraft type and registration extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Type designators recognized inside a cell.
const AIRCRAFT_TERMS: &[&str] = &[
    "CRJ", "A320", "B737", "E170", "E175", "FRASCA", "AVENGER", "FAA", "P28A",
];

/// Simulator and device names, kept as written.
const DEVICE_TERMS: &[&str] = &["FRASCA", "AVENGER", "FAA"];

static GENERIC_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][0-9]+$").expect("valid regex"));

static TAIL_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^N\d+[A-Z]+$").expect("valid regex"));

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftInfo {
    pub aircraft_type: String,
    pub registration: String,
}

impl Default for AircraftInfo {
    fn default() -> Self {
        Self {
            aircraft_type: UNKNOWN.to_string(),
            registration: UNKNOWN.to_string(),
        }
    }
}

fn adjacent_registration(row: &[String], i: usize) -> Option<String> {
    let before = i.checked_sub(1).and_then(|j| row.get(j));
    let after = row.get(i + 1);
    before
        .into_iter()
        .chain(after)
        .find(|cell| TAIL_NUMBER.is_match(cell))
        .cloned()
}

/// First cell naming an aircraft, and the tail number next to it.
pub fn find_aircraft(row: &[String]) -> AircraftInfo {
    let mut info = AircraftInfo::default();

    for (i, cell) in row.iter().enumerate() {
        let upper = cell.to_uppercase();
        let aircraft_type = if let Some(term) = AIRCRAFT_TERMS.iter().find(|t| upper.contains(*t)) {
            if DEVICE_TERMS.iter().any(|d| upper.contains(d)) {
                cell.clone()
            } else {
                term.to_string()
            }
        } else if GENERIC_TYPE.is_match(&upper) {
            upper
        } else {
            continue;
        };

        info.aircraft_type = aircraft_type;
        if let Some(reg) = adjacent_registration(row, i) {
            info.registration = reg;
        }
        break;
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_known_type_with_registration_before() {
        let info = find_aircraft(&row(&["10/25/2023", "N512RJ", "CRJ700", "KSAN"]));
        assert_eq!(info.aircraft_type, "CRJ");
        assert_eq!(info.registration, "N512RJ");
    }

    #[test]
    fn test_known_type_with_registration_after() {
        let info = find_aircraft(&row(&["P28A", "N4321X", "KMYF"]));
        assert_eq!(info.aircraft_type, "P28A");
        assert_eq!(info.registration, "N4321X");
    }

    #[test]
    fn test_simulator_keeps_cell_text() {
        let info = find_aircraft(&row(&["Frasca 142", "KSAN"]));
        assert_eq!(info.aircraft_type, "Frasca 142");
        assert_eq!(info.registration, UNKNOWN);
    }

    #[test]
    fn test_generic_type() {
        let info = find_aircraft(&row(&["c172", "N738XY"]));
        assert_eq!(info.aircraft_type, "C172");
        assert_eq!(info.registration, "N738XY");
    }

    #[test]
    fn test_defaults_when_nothing_found() {
        assert_eq!(find_aircraft(&row(&["KSAN", "KLAX", "1.5"])), AircraftInfo::default());
    }
}

//! Airport codes mentioned in the free text of a row.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{has_region_prefix, is_airport_code};
use crate::directory::AirportDirectory;

static FOUR_LETTER_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{4}\b").expect("valid regex"));

/// A remarks code must be followed by one of these, or end the text.
fn is_route_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '-' | '→')
}

/// Four-letter codes written as a route (`KSAN, KLAX - KSAN`), in order.
///
/// Each must be a known code with an ICAO region prefix. Repeats are kept, so
/// an out-and-back lists the origin twice.
pub fn find_remarks_codes(row: &[String], directory: &AirportDirectory) -> Vec<String> {
    let text = row.join(" ").to_uppercase();
    FOUR_LETTER_WORD
        .find_iter(&text)
        .filter(|m| text[m.end()..].chars().next().map_or(true, is_route_separator))
        .map(|m| m.as_str())
        .filter(|code| is_airport_code(code, directory) && has_region_prefix(code))
        .map(String::from)
        .collect()
}

/// Swap a three-letter code for the remarks code it abbreviates (`SAN` to `KSAN`).
pub fn normalize_code(code: &str, remarks: &[String]) -> String {
    if code.len() == 3 {
        if let Some(full) = remarks.iter().find(|r| r.get(1..) == Some(code)) {
            return full.clone();
        }
    }
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixtures::fixture_directory;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_route_in_remarks() {
        let dir = fixture_directory();
        let codes = find_remarks_codes(&row(&["10/25/2023", "ksan, klax - ksan"]), &dir);
        assert_eq!(codes, vec!["KSAN", "KLAX", "KSAN"]);
    }

    #[test]
    fn test_arrow_separator() {
        let dir = fixture_directory();
        let codes = find_remarks_codes(&row(&["KMYF→KSEE"]), &dir);
        assert_eq!(codes, vec!["KMYF", "KSEE"]);
    }

    #[test]
    fn test_other_followers_rejected() {
        let dir = fixture_directory();
        assert!(find_remarks_codes(&row(&["KSAN.", "KLAX/"]), &dir).is_empty());
    }

    #[test]
    fn test_unknown_or_unprefixed_codes_dropped() {
        let dir = fixture_directory();
        // QQQQ is not indexed, RNAV is excluded
        assert!(find_remarks_codes(&row(&["QQQQ RNAV"]), &dir).is_empty());
    }

    #[test]
    fn test_normalize_code() {
        let remarks = vec!["KSAN".to_string(), "KLAX".to_string()];
        assert_eq!(normalize_code("LAX", &remarks), "KLAX");
        assert_eq!(normalize_code("JFK", &remarks), "JFK");
        assert_eq!(normalize_code("KJFK", &remarks), "KJFK");
        assert_eq!(normalize_code("LAX", &[]), "LAX");
    }
}

//! Row classifier: header rows, totals rows and totals pages.

use serde::{Deserialize, Serialize};

use super::code::is_airport_code;
use crate::directory::AirportDirectory;

/// Column titles seen in logbook headers.
pub const HEADER_KEYWORDS: &[&str] = &[
    "DATE", "AIRCRAFT", "FROM", "TO", "ROUTE", "TYPE", "REGISTRATION", "PILOT", "COMMAND",
    "FLIGHT", "NUMBER", "MULTI", "ASEL", "ASES", "AMEL", "AMES", "JET", "TURBO", "PROP", "ROTOR",
    "TAKEOFFS", "LANDINGS", "DAY", "NIGHT", "D", "A", "Y", "N", "I", "G", "H", "T", "DD.MMM.YY",
    "OUT", "IN", "DEP", "ARR", "DEPARTURE", "ARRIVAL",
];

/// Terms that only appear in headers which also name route columns.
const ROUTE_HEADER_TERMS: &[&str] = &["FROM", "TO", "OUT", "IN", "ROUTE"];

/// Cells marking page totals and report footers.
const SUMMARY_MARKERS: &[&str] = &[
    "TOTAL", "FORWARDED", "PAGE", "THIS", "REPORT", "SUBTOTAL", "CARRIED FORWARD", "CERTIFICATES",
];

/// Cells marking a whole page of totals (PDF logbooks).
const SUMMARY_PAGE_MARKERS: &[&str] =
    &["CONDITIONS OF FLIGHT", "SIMULATED", "CROSS COUNTRY", "CERTIFICATES"];

/// What a row is, for the purpose of record extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Summary,
    Header,
    Data,
}

pub fn is_header_keyword(cell: &str) -> bool {
    let upper = cell.trim().to_uppercase();
    HEADER_KEYWORDS.contains(&upper.as_str())
}

/// Header heuristic.
///
/// A header has (two keywords, or one keyword plus a route term in a row of at
/// most ten cells), contains no real airport code, and either has no digits or
/// is written entirely in uppercase.
pub fn is_likely_header(row: &[String], directory: &AirportDirectory) -> bool {
    let mut keyword_count = 0;
    let mut has_airport_code = false;
    let mut all_uppercase = true;
    let mut has_digits = false;
    let mut has_route_term = false;

    for cell in row {
        let upper = cell.to_uppercase();
        if HEADER_KEYWORDS.contains(&upper.as_str()) {
            keyword_count += 1;
        }
        if ROUTE_HEADER_TERMS.contains(&upper.as_str()) {
            has_route_term = true;
        }
        if is_airport_code(cell, directory) {
            has_airport_code = true;
        }
        if *cell != upper {
            all_uppercase = false;
        }
        if cell.chars().any(|c| c.is_ascii_digit()) {
            has_digits = true;
        }
    }

    let keyword_signal =
        keyword_count >= 2 || (keyword_count >= 1 && has_route_term && row.len() <= 10);
    keyword_signal && !has_airport_code && (!has_digits || all_uppercase)
}

/// Totals and footer rows.
pub fn is_summary_row(row: &[String]) -> bool {
    row.iter()
        .any(|cell| SUMMARY_MARKERS.contains(&cell.trim().to_uppercase().as_str()))
}

/// Whole pages of totals, skipped entirely.
pub fn is_summary_page(rows: &[Vec<String>]) -> bool {
    rows.iter().flatten().any(|cell| {
        SUMMARY_PAGE_MARKERS.contains(&cell.trim().to_uppercase().as_str())
    })
}

/// Summary wins over header.
pub fn classify_row(row: &[String], directory: &AirportDirectory) -> RowKind {
    if is_summary_row(row) {
        RowKind::Summary
    } else if is_likely_header(row, directory) {
        RowKind::Header
    } else {
        RowKind::Data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixtures::fixture_directory;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_typical_header() {
        let dir = fixture_directory();
        assert!(is_likely_header(&row(&["DATE", "AIRCRAFT", "FROM", "TO", "REMARKS"]), &dir));
        assert!(is_likely_header(&row(&["Date", "From", "To", "Duration"]), &dir));
    }

    #[test]
    fn test_single_keyword_with_route_term() {
        let dir = fixture_directory();
        assert!(is_likely_header(&row(&["ROUTE", "Remarks"]), &dir));
        let wide: Vec<String> = std::iter::once("ROUTE".to_string())
            .chain((0..10).map(|i| format!("col{}", i)))
            .collect();
        assert!(!is_likely_header(&wide, &dir));
    }

    #[test]
    fn test_header_with_airport_code_is_data() {
        let dir = fixture_directory();
        assert!(!is_likely_header(&row(&["FROM", "TO", "KSAN"]), &dir));
    }

    #[test]
    fn test_mixed_case_with_digits_is_not_header() {
        let dir = fixture_directory();
        assert!(!is_likely_header(&row(&["Date", "From", "To", "Leg 1"]), &dir));
        assert!(is_likely_header(&row(&["DATE", "FROM", "TO", "LEG 1"]), &dir));
    }

    #[test]
    fn test_data_row_is_not_header() {
        let dir = fixture_directory();
        assert!(!is_likely_header(&row(&["10/25/2023", "JFK", "LAX", "2:30"]), &dir));
    }

    #[test]
    fn test_summary_rows() {
        assert!(is_summary_row(&row(&["TOTAL", "FORWARDED", "42:00"])));
        assert!(is_summary_row(&row(&["Page", "3"])));
        assert!(is_summary_row(&row(&["AMOUNTS", "carried forward", "12.0"])));
        assert!(!is_summary_row(&row(&["10/25/2023", "JFK", "LAX"])));
    }

    #[test]
    fn test_summary_page() {
        let page = vec![row(&["CONDITIONS OF FLIGHT", "x"]), row(&["SAN", "LAX"])];
        assert!(is_summary_page(&page));
        assert!(!is_summary_page(&[row(&["SAN", "LAX"])]));
    }

    #[test]
    fn test_classify_summary_wins() {
        let dir = fixture_directory();
        assert_eq!(classify_row(&row(&["TOTAL", "FROM", "TO"]), &dir), RowKind::Summary);
        assert_eq!(classify_row(&row(&["FROM", "TO", "DATE"]), &dir), RowKind::Header);
        assert_eq!(classify_row(&row(&["KSAN", "KLAX"]), &dir), RowKind::Data);
    }
}

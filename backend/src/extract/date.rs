//! Date extraction.
//!
//! Rules are tried in this order, per cell:
//!
//! | # | Shape | Example |
//! |---|-------|---------|
//! | 1 | `d.MMM.yy` | `5.Oct.23` |
//! | 2 | `M/d/yyyy` | `10/25/2023` |
//! | 3 | `M/d/yy` | `10/25/23` |
//! | 4 | `M-d-yy` | `10-25-23` |
//! | 5 | `yyyy-M-d` | `2023-10-25` |
//! | 6 | `yyyy/M/d` | `2023/10/25` |
//! | 7 | `d-M-yyyy` | `25-10-2023` |
//! | 8 | `MMM d, yyyy` | `Oct 25, 2023` |
//! | 9 | `d MMM yyyy` | `25 Oct 2023` |
//! | 10 | `yyyy.M.d` | `2023.10.25` |
//! | 11 | `M.d.yyyy` | `10.25.2023` |
//!
//! Two-digit years below 50 are 20xx, the rest 19xx. A match that is not a
//! real calendar date falls through to the next rule.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FlightDate;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const MONTH_ALT: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

/// One date shape: a pattern with three captures and which capture is which.
struct DateRule {
    pattern: Regex,
    year: usize,
    month: usize,
    day: usize,
}

impl DateRule {
    fn new(pattern: &str, year: usize, month: usize, day: usize) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("valid date pattern"),
            year,
            month,
            day,
        }
    }

    fn parse(&self, cell: &str) -> Option<NaiveDate> {
        let caps = self.pattern.captures(cell)?;
        let year = expand_year(caps.get(self.year)?.as_str())?;
        let month = month_number(caps.get(self.month)?.as_str())?;
        let day: u32 = caps.get(self.day)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

static DATE_RULES: Lazy<Vec<DateRule>> = Lazy::new(|| {
    vec![
        DateRule::new(r"^(\d{1,2})\.([A-Za-z]{3})\.(\d{2})$", 3, 2, 1),
        DateRule::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$", 3, 1, 2),
        DateRule::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$", 3, 1, 2),
        DateRule::new(r"^(\d{1,2})-(\d{1,2})-(\d{2})$", 3, 1, 2),
        DateRule::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$", 1, 2, 3),
        DateRule::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$", 1, 2, 3),
        DateRule::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})$", 3, 2, 1),
        DateRule::new(&format!(r"(?i)^({})\s+(\d{{1,2}}),\s+(\d{{4}})$", MONTH_ALT), 3, 1, 2),
        DateRule::new(&format!(r"(?i)^(\d{{1,2}})\s+({})\s+(\d{{4}})$", MONTH_ALT), 3, 2, 1),
        DateRule::new(r"^(\d{4})\.(\d{1,2})\.(\d{1,2})$", 1, 2, 3),
        DateRule::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})$", 3, 1, 2),
    ]
});

fn expand_year(text: &str) -> Option<i32> {
    let value: i32 = text.parse().ok()?;
    Some(match text.len() {
        2 if value < 50 => 2000 + value,
        2 => 1900 + value,
        _ => value,
    })
}

/// Numeric month or three-letter English abbreviation.
fn month_number(text: &str) -> Option<u32> {
    if let Ok(n) = text.parse::<u32>() {
        return Some(n);
    }
    let lower = text.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

/// First rule producing a valid calendar date for this cell.
pub fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_RULES.iter().find_map(|rule| rule.parse(cell))
}

/// Date of a row: the `preferred` cell first (a known date column), then
/// every cell in order. [`FlightDate::Unknown`] when nothing parses.
pub fn find_date(row: &[String], preferred: Option<usize>) -> FlightDate {
    preferred
        .and_then(|i| row.get(i))
        .and_then(|cell| parse_date_cell(cell))
        .or_else(|| row.iter().find_map(|cell| parse_date_cell(cell)))
        .map(FlightDate::Logged)
        .unwrap_or(FlightDate::Unknown)
}

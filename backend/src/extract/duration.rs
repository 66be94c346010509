//! Duration and named time-category extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{CategoryTimes, TimeCategory};

static HOURS_MINUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2})$").expect("valid regex"));

static DECIMAL_HOURS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(\.\d*)?|\.\d+)$").expect("valid regex"));

/// Hours in a single cell: `H:MM`, else a positive decimal.
///
/// Cells with trailing text (`10/25/2023`, `1.5h`) are not durations.
pub fn parse_duration_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if let Some(caps) = HOURS_MINUTES.captures(cell) {
        let hours: f64 = caps[1].parse().ok()?;
        let minutes: f64 = caps[2].parse().ok()?;
        return Some(hours + minutes / 60.0);
    }
    if DECIMAL_HOURS.is_match(cell) {
        let value: f64 = cell.parse().ok()?;
        if value > 0.0 {
            return Some(value);
        }
    }
    None
}

/// First duration-looking cell of the row, else 0.
pub fn find_duration(row: &[String]) -> f64 {
    row.iter()
        .find_map(|cell| parse_duration_cell(cell))
        .unwrap_or(0.0)
}

/// Value of the cell following the first cell that mentions `category`.
pub fn find_category_time(row: &[String], category: TimeCategory) -> f64 {
    let label = category.label();
    row.iter()
        .enumerate()
        .filter(|(_, cell)| cell.to_lowercase().contains(label))
        .find_map(|(i, _)| row.get(i + 1).and_then(|next| parse_duration_cell(next)))
        .unwrap_or(0.0)
}

pub fn find_category_times(row: &[String]) -> CategoryTimes {
    let mut times = CategoryTimes::default();
    for category in TimeCategory::ALL {
        times.set(category, find_category_time(row, category));
    }
    times
}

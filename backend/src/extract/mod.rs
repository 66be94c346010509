//! Field extractors: pure functions of one row.
//!
//! - [`date`] - Multi-format date detection
//! - [`duration`] - Total time and named time categories
//! - [`aircraft`] - Aircraft type and tail number

pub mod aircraft;
pub mod date;
pub mod duration;

use serde::Serialize;

use crate::models::{CategoryTimes, FlightDate};

pub use aircraft::{find_aircraft, AircraftInfo};
pub use date::{find_date, parse_date_cell};
pub use duration::{find_category_time, find_category_times, find_duration, parse_duration_cell};

/// Every non-route field of a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFields {
    pub date: FlightDate,
    pub duration: f64,
    pub times: CategoryTimes,
    pub aircraft: AircraftInfo,
}

impl RowFields {
    pub fn extract(row: &[String], date_column: Option<usize>) -> Self {
        Self {
            date: find_date(row, date_column),
            duration: find_duration(row),
            times: find_category_times(row),
            aircraft: find_aircraft(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_extract_all_fields() {
        let row: Vec<String> = ["10/25/2023", "B737", "N100AA", "JFK", "LAX", "2:30", "night", "1.0"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let fields = RowFields::extract(&row, None);

        assert_eq!(
            fields.date,
            FlightDate::Logged(NaiveDate::from_ymd_opt(2023, 10, 25).unwrap())
        );
        assert_eq!(fields.duration, 2.5);
        assert_eq!(fields.times.night, 1.0);
        assert_eq!(fields.aircraft.aircraft_type, "B737");
        assert_eq!(fields.aircraft.registration, "N100AA");
    }
}

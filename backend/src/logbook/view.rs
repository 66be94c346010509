//! Non-destructive views over a logbook: filters, ordering, totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::{FlightDate, FlightRecord};
use crate::resolve::AirportResolver;
use crate::session::Session;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    DateAsc,
    DateDesc,
    DistanceAsc,
    DistanceDesc,
    /// Most flown route first.
    FrequencyDesc,
}

/// Filter and order applied when listing flights.
///
/// A date bound excludes flights with an unknown date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub hide_local: bool,
    pub sort: SortOrder,
}

/// Airport filter: the resolved airport, or the raw code when it resolves to nothing.
enum AirportFilter {
    Airport(usize),
    Code(String),
}

impl AirportFilter {
    fn new(code: &str, resolver: &AirportResolver) -> Self {
        match resolver.resolve(code, &[]) {
            Some(airport) => AirportFilter::Airport(airport.id),
            None => AirportFilter::Code(code.trim().to_uppercase()),
        }
    }

    fn matches(&self, code: &str, airport_id: usize) -> bool {
        match self {
            AirportFilter::Airport(id) => *id == airport_id,
            AirportFilter::Code(c) => c == code,
        }
    }
}

impl FlightQuery {
    fn in_range(&self, date: FlightDate) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(d) = date.as_date() else { return false };
        self.start.map_or(true, |s| d >= s) && self.end.map_or(true, |e| d <= e)
    }

    /// Matching flights in the requested order.
    pub fn apply<'a>(
        &self,
        flights: &'a [FlightRecord],
        resolver: &AirportResolver,
        session: &Session,
    ) -> Vec<&'a FlightRecord> {
        let departure = self.departure.as_deref().map(|c| AirportFilter::new(c, resolver));
        let arrival = self.arrival.as_deref().map(|c| AirportFilter::new(c, resolver));

        let mut selected: Vec<&FlightRecord> = flights
            .iter()
            .filter(|f| !(self.hide_local && f.is_local))
            .filter(|f| self.in_range(f.date))
            .filter(|f| {
                departure
                    .as_ref()
                    .map_or(true, |d| d.matches(&f.departure, f.dep_airport.id))
            })
            .filter(|f| {
                arrival
                    .as_ref()
                    .map_or(true, |a| a.matches(&f.arrival, f.arr_airport.id))
            })
            .collect();

        sort_flights(&mut selected, self.sort, session);
        selected
    }
}

/// Unknown dates sort after every known date, in both directions.
fn by_date(a: &FlightRecord, b: &FlightRecord) -> Ordering {
    match (a.date.as_date(), b.date.as_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_flights(flights: &mut [&FlightRecord], order: SortOrder, session: &Session) {
    match order {
        SortOrder::DateAsc => flights.sort_by(|a, b| by_date(a, b)),
        SortOrder::DateDesc => flights.sort_by(|a, b| match (a.date.is_known(), b.date.is_known()) {
            (true, true) => by_date(b, a),
            _ => by_date(a, b),
        }),
        SortOrder::DistanceAsc => flights.sort_by(|a, b| a.distance.total_cmp(&b.distance)),
        SortOrder::DistanceDesc => flights.sort_by(|a, b| b.distance.total_cmp(&a.distance)),
        SortOrder::FrequencyDesc => flights.sort_by(|a, b| {
            session
                .route_frequency(&b.route_key())
                .cmp(&session.route_frequency(&a.route_key()))
                .then_with(|| by_date(a, b))
        }),
    }
}

/// Totals over a set of flights.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogbookStats {
    pub flights: usize,
    pub unique_airports: usize,
    /// Kilometres.
    pub total_distance: f64,
    /// Hours, likewise below.
    pub total_time: f64,
    pub cross_country: f64,
    pub night: f64,
    pub solo: f64,
    pub actual_instrument: f64,
}

impl LogbookStats {
    pub fn from_flights<'a, I>(flights: I) -> Self
    where
        I: IntoIterator<Item = &'a FlightRecord>,
    {
        let mut stats = Self::default();
        let mut airports = BTreeSet::new();
        for f in flights {
            stats.flights += 1;
            airports.insert(f.dep_airport.id);
            airports.insert(f.arr_airport.id);
            stats.total_distance += f.distance;
            stats.total_time += f.duration;
            stats.cross_country += f.times.cross_country;
            stats.night += f.times.night;
            stats.solo += f.times.solo;
            stats.actual_instrument += f.times.actual_instrument;
        }
        stats.unique_airports = airports.len();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixtures::fixture_directory;
    use crate::models::CategoryTimes;
    use crate::resolve::RegionalBias;
    use std::sync::Arc;

    fn resolver() -> AirportResolver {
        AirportResolver::new(Arc::new(fixture_directory()), RegionalBias::default())
    }

    fn flight(r: &AirportResolver, dep: &str, arr: &str, date: Option<(i32, u32, u32)>, distance: f64) -> FlightRecord {
        let a = r.resolve(dep, &[]).unwrap();
        let b = r.resolve(arr, &[]).unwrap();
        FlightRecord {
            departure: a.display_code().to_string(),
            arrival: b.display_code().to_string(),
            dep_airport: a,
            arr_airport: b,
            date: date
                .and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
                .map_or(FlightDate::Unknown, FlightDate::Logged),
            distance,
            duration: 1.0,
            times: CategoryTimes { night: 0.5, ..Default::default() },
            aircraft_type: "C172".into(),
            registration: "N738XY".into(),
            notes: String::new(),
            is_local: dep == arr,
        }
    }

    fn book(r: &AirportResolver) -> Vec<FlightRecord> {
        vec![
            flight(r, "SAN", "LAX", Some((2023, 10, 25)), 180.0),
            flight(r, "MYF", "MYF", Some((2023, 1, 2)), 0.0),
            flight(r, "JFK", "LAX", None, 3980.0),
            flight(r, "SAN", "LAX", Some((2023, 11, 1)), 180.0),
        ]
    }

    fn routes(flights: &[&FlightRecord]) -> Vec<String> {
        flights.iter().map(|f| f.route_key()).collect()
    }

    #[test]
    fn test_default_query_sorts_by_date_unknown_last() {
        let r = resolver();
        let flights = book(&r);
        let view = FlightQuery::default().apply(&flights, &r, &Session::new());
        assert_eq!(routes(&view), vec!["MYF-MYF", "SAN-LAX", "SAN-LAX", "JFK-LAX"]);
    }

    #[test]
    fn test_date_desc_keeps_unknown_last() {
        let r = resolver();
        let flights = book(&r);
        let query = FlightQuery { sort: SortOrder::DateDesc, ..Default::default() };
        let view = query.apply(&flights, &r, &Session::new());
        assert_eq!(view[0].date.to_string(), "2023-11-01");
        assert_eq!(view[3].date, FlightDate::Unknown);
    }

    #[test]
    fn test_date_range_excludes_unknown() {
        let r = resolver();
        let flights = book(&r);
        let query = FlightQuery {
            start: NaiveDate::from_ymd_opt(2023, 10, 1),
            ..Default::default()
        };
        assert_eq!(query.apply(&flights, &r, &Session::new()).len(), 2);
    }

    #[test]
    fn test_airport_filter_accepts_icao() {
        let r = resolver();
        let flights = book(&r);
        let query = FlightQuery {
            departure: Some("ksan".into()),
            ..Default::default()
        };
        assert_eq!(query.apply(&flights, &r, &Session::new()).len(), 2);
    }

    #[test]
    fn test_hide_local_and_distance_sort() {
        let r = resolver();
        let flights = book(&r);
        let query = FlightQuery {
            hide_local: true,
            sort: SortOrder::DistanceDesc,
            ..Default::default()
        };
        let view = query.apply(&flights, &r, &Session::new());
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].route_key(), "JFK-LAX");
    }

    #[test]
    fn test_frequency_sort() {
        let r = resolver();
        let flights = book(&r);
        let mut session = Session::new();
        for f in &flights {
            session.record_flight(f);
        }
        let query = FlightQuery { sort: SortOrder::FrequencyDesc, ..Default::default() };
        let view = query.apply(&flights, &r, &session);
        assert_eq!(routes(&view)[..2], ["SAN-LAX", "SAN-LAX"]);
    }

    #[test]
    fn test_stats() {
        let r = resolver();
        let flights = book(&r);
        let stats = LogbookStats::from_flights(&flights);
        assert_eq!(stats.flights, 4);
        assert_eq!(stats.unique_airports, 4);
        assert_eq!(stats.total_distance, 4340.0);
        assert_eq!(stats.total_time, 4.0);
        assert_eq!(stats.night, 2.0);
    }

    #[test]
    fn test_query_from_json() {
        let query: FlightQuery =
            serde_json::from_str(r#"{"hideLocal": true, "sort": "distance-desc", "start": "2023-01-01"}"#).unwrap();
        assert!(query.hide_local);
        assert_eq!(query.sort, SortOrder::DistanceDesc);
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2023, 1, 1));
    }
}

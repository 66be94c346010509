//! Session state of one logbook.
//!
//! Everything that accumulates across imports lives here instead of in
//! process-wide globals, so logbooks import independently:
//!
//! - unresolved codes seen so far
//! - how often each airport and each route was flown
//! - the distance memo

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::classify::is_header_keyword;
use crate::models::FlightRecord;
use crate::resolve::DistanceCache;

#[derive(Debug, Clone, Default)]
pub struct Session {
    missing: BTreeSet<String>,
    airport_frequency: BTreeMap<String, usize>,
    route_frequency: BTreeMap<String, usize>,
    distances: Arc<DistanceCache>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one flown leg.
    pub fn record_flight(&mut self, flight: &FlightRecord) {
        *self.airport_frequency.entry(flight.departure.clone()).or_default() += 1;
        *self.airport_frequency.entry(flight.arrival.clone()).or_default() += 1;
        *self.route_frequency.entry(flight.route_key()).or_default() += 1;
    }

    pub fn record_missing<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing.extend(codes.into_iter().map(Into::into));
    }

    /// Unresolved codes worth showing, sorted, header vocabulary removed.
    pub fn missing_airports(&self) -> Vec<String> {
        self.missing
            .iter()
            .filter(|code| !is_header_keyword(code))
            .cloned()
            .collect()
    }

    /// Drop codes that have since been registered.
    pub fn forget_codes(&mut self, codes: &[String]) {
        for code in codes {
            self.missing.remove(&code.to_uppercase());
        }
    }

    pub fn airport_frequency(&self, code: &str) -> usize {
        self.airport_frequency.get(code).copied().unwrap_or(0)
    }

    pub fn route_frequency(&self, route_key: &str) -> usize {
        self.route_frequency.get(route_key).copied().unwrap_or(0)
    }

    /// Shared handle on the distance memo, for import tasks.
    pub fn distances(&self) -> Arc<DistanceCache> {
        Arc::clone(&self.distances)
    }

    pub fn clear(&mut self) {
        self.missing.clear();
        self.airport_frequency.clear();
        self.route_frequency.clear();
        self.distances.clear();
    }
}

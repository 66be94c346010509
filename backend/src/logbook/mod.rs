//! Named logbooks.
//!
//! A [`Logbook`] owns its flights and its [`Session`]; a [`Workspace`] holds
//! several of them so imports into one never touch another's counters.

pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LogbookError, LogbookResult};
use crate::extract::aircraft::UNKNOWN as UNKNOWN_AIRCRAFT;
use crate::models::{CategoryTimes, FlightDate, FlightRecord};
use crate::pipeline::ImportOutcome;
use crate::resolve::AirportResolver;
use crate::session::Session;

pub use view::{sort_flights, FlightQuery, LogbookStats, SortOrder};

/// Flight typed in by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualFlight {
    pub departure: String,
    pub arrival: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct Logbook {
    name: String,
    flights: Vec<FlightRecord>,
    session: Session,
}

impl Logbook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flights(&self) -> &[FlightRecord] {
        &self.flights
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Append an import's flights and remember its missing airports.
    /// Returns the number of flights added.
    pub fn apply_import(&mut self, outcome: &ImportOutcome) -> usize {
        self.session.record_missing(outcome.missing_airports.iter().cloned());
        self.add_flights(outcome.flights.iter().cloned())
    }

    pub fn add_flights<I>(&mut self, flights: I) -> usize
    where
        I: IntoIterator<Item = FlightRecord>,
    {
        let before = self.flights.len();
        for flight in flights {
            self.session.record_flight(&flight);
            self.flights.push(flight);
        }
        self.flights.len() - before
    }

    /// Add a flight by its two codes. The date is unknown and all times zero.
    ///
    /// The flight is local when the two entered codes are the same.
    pub fn add_manual_flight(
        &mut self,
        input: &ManualFlight,
        resolver: &AirportResolver,
    ) -> LogbookResult<&FlightRecord> {
        let resolve = |code: &str| {
            resolver
                .resolve(code, &[])
                .ok_or_else(|| LogbookError::UnknownAirport(code.trim().to_uppercase()))
        };
        let dep = resolve(&input.departure)?;
        let arr = resolve(&input.arrival)?;

        let flight = FlightRecord {
            departure: dep.display_code().to_string(),
            arrival: arr.display_code().to_string(),
            distance: self.session.distances().distance(dep.coords, arr.coords),
            is_local: input.departure.trim().eq_ignore_ascii_case(input.arrival.trim()),
            dep_airport: dep,
            arr_airport: arr,
            date: FlightDate::Unknown,
            duration: 0.0,
            times: CategoryTimes::default(),
            aircraft_type: UNKNOWN_AIRCRAFT.to_string(),
            registration: UNKNOWN_AIRCRAFT.to_string(),
            notes: input.notes.clone(),
        };
        self.add_flights([flight]);
        Ok(&self.flights[self.flights.len() - 1])
    }

    /// Drop every flight and reset the session.
    pub fn clear(&mut self) {
        self.flights.clear();
        self.session.clear();
    }

    pub fn stats(&self) -> LogbookStats {
        LogbookStats::from_flights(&self.flights)
    }

    pub fn view(&self, query: &FlightQuery, resolver: &AirportResolver) -> Vec<&FlightRecord> {
        query.apply(&self.flights, resolver, &self.session)
    }

    /// Airports by number of visits, most visited first.
    pub fn airport_visits(&self) -> Vec<(String, usize)> {
        let mut codes: Vec<&str> = self
            .flights
            .iter()
            .flat_map(|f| [f.departure.as_str(), f.arrival.as_str()])
            .collect();
        codes.sort_unstable();
        codes.dedup();

        let mut visits: Vec<(String, usize)> = codes
            .into_iter()
            .map(|c| (c.to_string(), self.session.airport_frequency(c)))
            .collect();
        visits.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        visits
    }
}

/// Logbooks by name, plus the one new imports go to by default.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    logbooks: BTreeMap<String, Logbook>,
    current: Option<String>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `Logbook N` with the first free N and make it current.
    pub fn create(&mut self) -> &mut Logbook {
        let name = (1..)
            .map(|n| format!("Logbook {}", n))
            .find(|name| !self.logbooks.contains_key(name))
            .unwrap_or_default();
        self.get_or_create(&name)
    }

    /// The named logbook, created if needed; it becomes current.
    pub fn get_or_create(&mut self, name: &str) -> &mut Logbook {
        self.current = Some(name.to_string());
        self.logbooks
            .entry(name.to_string())
            .or_insert_with(|| Logbook::new(name))
    }

    pub fn get(&self, name: &str) -> LogbookResult<&Logbook> {
        self.logbooks
            .get(name)
            .ok_or_else(|| LogbookError::NotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> LogbookResult<&mut Logbook> {
        self.logbooks
            .get_mut(name)
            .ok_or_else(|| LogbookError::NotFound(name.to_string()))
    }

    pub fn current(&self) -> Option<&Logbook> {
        self.current.as_deref().and_then(|n| self.logbooks.get(n))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.logbooks.keys().map(String::as_str)
    }

    /// Newly registered codes are no longer missing anywhere.
    pub fn forget_missing(&mut self, codes: &[String]) {
        for logbook in self.logbooks.values_mut() {
            logbook.session.forget_codes(codes);
        }
    }
}

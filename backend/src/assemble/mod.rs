//! Record assembler: one row in, zero or more flight records out.
//!
//! ```text
//! row ──▶ classify ──▶ remarks ──▶ strategies ──▶ resolve legs ──▶ FlightRecord*
//!          (skip summary/header)     (first strategy with a resolved leg wins)
//! ```
//!
//! The row's duration is split evenly across the planned legs. Category times,
//! date and aircraft are copied to every leg.

pub mod layout;
pub mod remarks;
pub mod strategies;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::classify::{classify_row, RowKind};
use crate::extract::RowFields;
use crate::models::FlightRecord;
use crate::resolve::{AirportResolver, DistanceCache};

pub use layout::{ColumnLayout, ColumnPair};
pub use remarks::{find_remarks_codes, normalize_code};
pub use strategies::{LegNote, LegPlan, PartialRoute, RouteStrategy, RowScan, STRATEGIES};

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "strategy")]
pub enum RowDisposition {
    Summary,
    Header,
    NoRoute,
    Imported(RouteStrategy),
}

/// Records of one row plus the unresolved codes met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub flights: Vec<FlightRecord>,
    pub missing: BTreeSet<String>,
    pub disposition: RowDisposition,
}

impl RowOutcome {
    fn skipped(disposition: RowDisposition) -> Self {
        Self {
            flights: Vec::new(),
            missing: BTreeSet::new(),
            disposition,
        }
    }
}

/// Turns rows of one source group into flight records.
///
/// Holds a directory snapshot, so it can be shared by concurrent row tasks.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    resolver: AirportResolver,
    layout: ColumnLayout,
    assigned: Option<ColumnPair>,
    distances: Arc<DistanceCache>,
}

impl RecordAssembler {
    pub fn new(
        resolver: AirportResolver,
        layout: ColumnLayout,
        assigned: Option<ColumnPair>,
        distances: Arc<DistanceCache>,
    ) -> Self {
        Self {
            resolver,
            layout,
            assigned,
            distances,
        }
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn process_row(&self, row: &[String]) -> RowOutcome {
        let directory = self.resolver.directory();
        match classify_row(row, directory) {
            RowKind::Summary => return RowOutcome::skipped(RowDisposition::Summary),
            RowKind::Header => return RowOutcome::skipped(RowDisposition::Header),
            RowKind::Data => {}
        }

        let scan = RowScan::new(row, directory, &self.layout, self.assigned);
        let fields = RowFields::extract(row, self.layout.date);
        let mut missing = BTreeSet::new();
        let mut partial = PartialRoute::default();

        for (strategy, run) in STRATEGIES {
            let Some(plans) = run(&scan, &mut partial) else { continue };
            let flights = self.finalize(&plans, &fields, &scan.remarks, &mut missing);
            if !flights.is_empty() {
                return RowOutcome {
                    flights,
                    missing,
                    disposition: RowDisposition::Imported(strategy),
                };
            }
        }

        for code in scan.designated_codes() {
            self.resolver.resolve_tracked(&code, &scan.remarks, &mut missing);
        }
        RowOutcome {
            flights: Vec::new(),
            missing,
            disposition: RowDisposition::NoRoute,
        }
    }

    /// Resolve each planned leg; legs with an unresolved side are dropped.
    fn finalize(
        &self,
        plans: &[LegPlan],
        fields: &RowFields,
        remarks: &[String],
        missing: &mut BTreeSet<String>,
    ) -> Vec<FlightRecord> {
        let duration = fields.duration / plans.len().max(1) as f64;
        let mut flights = Vec::with_capacity(plans.len());

        for plan in plans {
            let dep = self.resolver.resolve_tracked(&plan.departure, remarks, missing);
            let arr = self.resolver.resolve_tracked(&plan.arrival, remarks, missing);
            let (Some(dep), Some(arr)) = (dep, arr) else { continue };

            let notes = match plan.note {
                LegNote::Remarks => format!("From remarks: {} to {}", plan.departure, plan.arrival),
                LegNote::Segment(n) => format!("Segment {}: {} to {}", n, plan.departure, plan.arrival),
                LegNote::Pair if remarks.is_empty() => String::new(),
                LegNote::Pair => format!("From remarks: {}", remarks.join(", ")),
            };

            flights.push(FlightRecord {
                departure: dep.display_code().to_string(),
                arrival: arr.display_code().to_string(),
                distance: self.distances.distance(dep.coords, arr.coords),
                dep_airport: dep,
                arr_airport: arr,
                date: fields.date,
                duration,
                times: fields.times,
                aircraft_type: fields.aircraft.aircraft_type.clone(),
                registration: fields.aircraft.registration.clone(),
                notes,
                is_local: plan.is_local(),
            });
        }

        flights
    }
}

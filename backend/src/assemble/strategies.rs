//! Route strategies, tried in order until one yields a leg that resolves.
//!
//! | Strategy | Source of the codes |
//! |----------|---------------------|
//! | `Remarks` | two or more route codes written in the free text |
//! | `AssignedColumns` | FROM/TO columns chosen by the user |
//! | `DetectedColumns` | FROM/TO or ROUTE columns found in a header |
//! | `CellScan` | every cell, in column order |
//!
//! A strategy that finds only one side leaves it in the [`PartialRoute`] for
//! the strategies after it.

use serde::{Deserialize, Serialize};

use super::layout::{ColumnLayout, ColumnPair};
use super::remarks::{find_remarks_codes, normalize_code};
use crate::classify::is_airport_code;
use crate::directory::AirportDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteStrategy {
    Remarks,
    AssignedColumns,
    DetectedColumns,
    CellScan,
}

/// Where a planned leg came from; decides its notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegNote {
    Remarks,
    /// 1-based segment number of a dash-separated route.
    Segment(usize),
    Pair,
}

/// A leg before resolution: two codes as found in the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegPlan {
    pub departure: String,
    pub arrival: String,
    pub note: LegNote,
}

impl LegPlan {
    pub fn pair(departure: impl Into<String>, arrival: impl Into<String>) -> Self {
        Self {
            departure: departure.into(),
            arrival: arrival.into(),
            note: LegNote::Pair,
        }
    }

    pub fn is_local(&self) -> bool {
        self.departure == self.arrival
    }
}

/// Consecutive pairs of `codes`.
fn chain(codes: &[String], note: impl Fn(usize) -> LegNote) -> Vec<LegPlan> {
    codes
        .windows(2)
        .enumerate()
        .map(|(i, w)| LegPlan {
            departure: w[0].clone(),
            arrival: w[1].clone(),
            note: note(i + 1),
        })
        .collect()
}

/// One side of a route found by an earlier strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRoute {
    pub departure: Option<String>,
    pub arrival: Option<String>,
}

/// A data row prepared for the strategies.
pub struct RowScan<'a> {
    pub row: &'a [String],
    /// Trimmed, uppercased cells.
    pub upper: Vec<String>,
    pub remarks: Vec<String>,
    pub directory: &'a AirportDirectory,
    pub layout: &'a ColumnLayout,
    pub assigned: Option<ColumnPair>,
}

impl<'a> RowScan<'a> {
    pub fn new(
        row: &'a [String],
        directory: &'a AirportDirectory,
        layout: &'a ColumnLayout,
        assigned: Option<ColumnPair>,
    ) -> Self {
        Self {
            row,
            upper: row.iter().map(|c| c.trim().to_uppercase()).collect(),
            remarks: find_remarks_codes(row, directory),
            directory,
            layout,
            assigned,
        }
    }

    fn is_code(&self, token: &str) -> bool {
        is_airport_code(token, self.directory)
    }

    fn normalized(&self, code: &str) -> String {
        normalize_code(code.trim(), &self.remarks)
    }

    /// Normalized code in column `col`, when it is a known airport code.
    fn code_at(&self, col: usize) -> Option<String> {
        let code = self.normalized(self.upper.get(col)?);
        self.is_code(&code).then_some(code)
    }

    /// Codes in the assigned and detected route columns, dash-split.
    ///
    /// Used to report unresolved codes of rows that produced nothing.
    pub fn designated_codes(&self) -> Vec<String> {
        let columns = [
            self.assigned.map(|p| p.from),
            self.assigned.map(|p| p.to),
            self.layout.from,
            self.layout.to,
        ];
        let mut codes: Vec<String> = Vec::new();
        for col in columns.into_iter().flatten() {
            let Some(cell) = self.upper.get(col) else { continue };
            for part in cell.split('-').map(str::trim).filter(|p| !p.is_empty()) {
                if !codes.iter().any(|c| c == part) {
                    codes.push(part.to_string());
                }
            }
        }
        codes
    }
}

pub type StrategyFn = fn(&RowScan<'_>, &mut PartialRoute) -> Option<Vec<LegPlan>>;

pub const STRATEGIES: [(RouteStrategy, StrategyFn); 4] = [
    (RouteStrategy::Remarks, remarks_route),
    (RouteStrategy::AssignedColumns, assigned_columns),
    (RouteStrategy::DetectedColumns, detected_columns),
    (RouteStrategy::CellScan, cell_scan),
];

fn remarks_route(scan: &RowScan<'_>, _: &mut PartialRoute) -> Option<Vec<LegPlan>> {
    if scan.remarks.len() < 2 {
        return None;
    }
    Some(chain(&scan.remarks, |_| LegNote::Remarks))
}

fn assigned_columns(scan: &RowScan<'_>, _: &mut PartialRoute) -> Option<Vec<LegPlan>> {
    let cols = scan.assigned?;
    if scan.row.len() <= cols.max() {
        return None;
    }
    let departure = scan.code_at(cols.from)?;
    let arrival = scan.code_at(cols.to)?;
    Some(vec![LegPlan::pair(departure, arrival)])
}

fn detected_columns(scan: &RowScan<'_>, partial: &mut PartialRoute) -> Option<Vec<LegPlan>> {
    let cols = scan.layout.route()?;
    if scan.row.len() <= cols.max() {
        return None;
    }

    if cols.from != cols.to {
        partial.departure = scan.code_at(cols.from);
        partial.arrival = scan.code_at(cols.to);
        return match (&partial.departure, &partial.arrival) {
            (Some(dep), Some(arr)) => Some(vec![LegPlan::pair(dep.clone(), arr.clone())]),
            _ => None,
        };
    }

    let parts: Vec<&str> = scan.upper[cols.from].split('-').map(str::trim).collect();
    match parts.as_slice() {
        [first, second, ..] if scan.is_code(first) && scan.is_code(second) => {
            let codes: Vec<String> = parts.iter().map(|p| scan.normalized(p)).collect();
            if codes.len() > 2 {
                Some(chain(&codes, LegNote::Segment))
            } else {
                Some(vec![LegPlan::pair(codes[0].clone(), codes[1].clone())])
            }
        }
        [single] if scan.is_code(single) => {
            let arrival = scan.normalized(single);
            let departure = scan
                .layout
                .departure_label
                .filter(|&col| col != cols.from)
                .and_then(|col| scan.code_at(col))
                .unwrap_or_else(|| arrival.clone());
            Some(vec![LegPlan::pair(departure, arrival)])
        }
        _ => None,
    }
}

fn cell_scan(scan: &RowScan<'_>, partial: &mut PartialRoute) -> Option<Vec<LegPlan>> {
    let mut found: Vec<String> = Vec::new();
    let mut segments: Vec<String> = Vec::new();

    for cell in &scan.upper {
        if cell.contains('-') {
            for part in cell.split('-').map(str::trim) {
                if scan.is_code(part) {
                    let code = scan.normalized(part);
                    found.push(code.clone());
                    segments.push(code);
                }
            }
        } else if scan.is_code(cell) {
            found.push(scan.normalized(cell));
        }
    }

    if segments.len() >= 2 {
        return Some(chain(&segments, LegNote::Segment));
    }

    let mut pool = found.iter().chain(scan.remarks.iter());
    let (departure, arrival) = match (partial.departure.clone(), partial.arrival.clone()) {
        (Some(dep), Some(arr)) => (dep, arr),
        (Some(dep), None) => {
            let arr = pool.find(|c| **c != dep)?.clone();
            (dep, arr)
        }
        (None, Some(arr)) => {
            let dep = pool.find(|c| **c != arr)?.clone();
            (dep, arr)
        }
        (None, None) => {
            let dep = pool.next()?.clone();
            let arr = pool.find(|c| **c != dep)?.clone();
            (dep, arr)
        }
    };
    Some(vec![LegPlan::pair(departure, arrival)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixtures::fixture_directory;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn codes(plans: &[LegPlan]) -> Vec<(String, String)> {
        plans
            .iter()
            .map(|p| (p.departure.clone(), p.arrival.clone()))
            .collect()
    }

    fn pair(dep: &str, arr: &str) -> (String, String) {
        (dep.to_string(), arr.to_string())
    }

    #[test]
    fn test_remarks_needs_two_codes() {
        let dir = fixture_directory();
        let layout = ColumnLayout::default();
        let r = row(&["KSAN, KLAX"]);
        let scan = RowScan::new(&r, &dir, &layout, None);
        let plans = remarks_route(&scan, &mut PartialRoute::default()).unwrap();
        assert_eq!(codes(&plans), vec![pair("KSAN", "KLAX")]);
        assert_eq!(plans[0].note, LegNote::Remarks);

        let r = row(&["KSAN"]);
        let scan = RowScan::new(&r, &dir, &layout, None);
        assert!(remarks_route(&scan, &mut PartialRoute::default()).is_none());
    }

    #[test]
    fn test_assigned_columns_require_both_codes() {
        let dir = fixture_directory();
        let layout = ColumnLayout::default();
        let r = row(&["10/25/2023", "jfk", "QQQ"]);
        let scan = RowScan::new(&r, &dir, &layout, Some(ColumnPair::new(1, 2)));
        assert!(assigned_columns(&scan, &mut PartialRoute::default()).is_none());

        let short = row(&["JFK"]);
        let scan = RowScan::new(&short, &dir, &layout, Some(ColumnPair::new(0, 1)));
        assert!(assigned_columns(&scan, &mut PartialRoute::default()).is_none());
    }

    #[test]
    fn test_detected_distinct_columns_seed_partial() {
        let dir = fixture_directory();
        let layout = ColumnLayout { from: Some(0), to: Some(1), ..Default::default() };
        let r = row(&["MYF", "QQQ", "SEE"]);
        let scan = RowScan::new(&r, &dir, &layout, None);
        let mut partial = PartialRoute::default();
        assert!(detected_columns(&scan, &mut partial).is_none());
        assert_eq!(partial.departure.as_deref(), Some("MYF"));

        let plans = cell_scan(&scan, &mut partial).unwrap();
        assert_eq!(codes(&plans), vec![pair("MYF", "SEE")]);
    }

    #[test]
    fn test_detected_single_code_route_is_local() {
        let dir = fixture_directory();
        let layout = ColumnLayout { from: Some(1), to: Some(1), ..Default::default() };
        let r = row(&["10/25/2023", "MYF", "1.2"]);
        let scan = RowScan::new(&r, &dir, &layout, None);
        let plans = detected_columns(&scan, &mut PartialRoute::default()).unwrap();
        assert_eq!(codes(&plans), vec![pair("MYF", "MYF")]);
        assert!(plans[0].is_local());
    }

    #[test]
    fn test_cell_scan_first_two_distinct_codes() {
        let dir = fixture_directory();
        let layout = ColumnLayout::default();
        let r = row(&["MYF", "MYF", "ILS", "SEE", "LAX"]);
        let scan = RowScan::new(&r, &dir, &layout, None);
        let plans = cell_scan(&scan, &mut PartialRoute::default()).unwrap();
        assert_eq!(codes(&plans), vec![pair("MYF", "SEE")]);
    }

    #[test]
    fn test_cell_scan_dash_segments() {
        let dir = fixture_directory();
        let layout = ColumnLayout::default();
        let r = row(&["10/25/2023", "MYF-SEE-CLD", "2.0"]);
        let scan = RowScan::new(&r, &dir, &layout, None);
        let plans = cell_scan(&scan, &mut PartialRoute::default()).unwrap();
        assert_eq!(codes(&plans), vec![pair("MYF", "SEE"), pair("SEE", "CLD")]);
        assert_eq!(plans[1].note, LegNote::Segment(2));
    }

    #[test]
    fn test_cell_scan_nothing_found() {
        let dir = fixture_directory();
        let layout = ColumnLayout::default();
        let r = row(&["10/25/2023", "MYF", "1.0"]);
        let scan = RowScan::new(&r, &dir, &layout, None);
        assert!(cell_scan(&scan, &mut PartialRoute::default()).is_none());
    }

    #[test]
    fn test_designated_codes() {
        let dir = fixture_directory();
        let layout = ColumnLayout { from: Some(1), to: Some(1), ..Default::default() };
        let r = row(&["x", "QQQ-LAX", "ZZZ"]);
        let scan = RowScan::new(&r, &dir, &layout, Some(ColumnPair::new(2, 1)));
        assert_eq!(scan.designated_codes(), vec!["ZZZ", "QQQ", "LAX"]);
    }
}

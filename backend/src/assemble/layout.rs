//! Column layout: which columns hold departure, arrival and date.

use serde::{Deserialize, Serialize};

use crate::classify::{is_airport_code, is_likely_header};
use crate::directory::AirportDirectory;
use crate::models::Row;

const DEPARTURE_NAMES: &[&str] = &["from", "departure", "dep", "route"];
const ARRIVAL_NAMES: &[&str] = &["to", "arrival", "arr", "route"];

const DEPARTURE_LABELS: &[&str] = &["FROM", "DEP", "DEPARTURE", "ROUTE"];
const ARRIVAL_LABELS: &[&str] = &["TO", "ARR", "ARRIVAL", "ROUTE"];
const FROM_ONLY_LABELS: &[&str] = &["FROM", "DEP", "DEPARTURE"];

/// Explicit FROM/TO columns assigned by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub from: usize,
    pub to: usize,
}

impl ColumnPair {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Both columns, when both are given.
    pub fn from_options(from: Option<usize>, to: Option<usize>) -> Option<Self> {
        from.zip(to).map(|(f, t)| Self::new(f, t))
    }

    pub fn max(&self) -> usize {
        self.from.max(self.to)
    }
}

/// Detected layout. `from == to` means a combined route column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLayout {
    pub from: Option<usize>,
    pub to: Option<usize>,
    /// Column labelled FROM/DEP/DEPARTURE, paired with a single-code route.
    pub departure_label: Option<usize>,
    pub date: Option<usize>,
}

impl ColumnLayout {
    pub fn route(&self) -> Option<ColumnPair> {
        ColumnPair::from_options(self.from, self.to)
    }

    pub fn is_combined(&self) -> bool {
        matches!(self.route(), Some(p) if p.from == p.to)
    }

    /// Layout from a delimited file's first line.
    ///
    /// Exact column names first, then substring matches.
    pub fn from_header(header: &[String]) -> Self {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let exact = |wanted: &[&str]| names.iter().position(|n| wanted.contains(&n.as_str()));
        let partial = |wanted: &[&str]| {
            names
                .iter()
                .position(|n| wanted.iter().any(|w| n.contains(w)))
        };

        let mut from = exact(DEPARTURE_NAMES);
        let mut to = exact(ARRIVAL_NAMES);
        if from.is_none() || to.is_none() {
            from = partial(&["from", "dep", "route"]);
            to = partial(&["to", "arr", "route"]);
        }
        let date = exact(&["date"]).or_else(|| partial(&["date"]));

        Self {
            from,
            to,
            departure_label: exact(&["from", "departure", "dep"]),
            date,
        }
    }

    /// Layout of a delimited group: header line if it names the route
    /// columns, else the same detection as free text.
    pub fn for_delimited(rows: &[Row], directory: &AirportDirectory) -> (Self, Vec<usize>) {
        if let Some(first) = rows.first() {
            let layout = Self::from_header(first);
            if layout.route().is_some() {
                return (layout, vec![0]);
            }
        }
        Self::detect(rows, directory)
    }

    /// Layout of free text or PDF rows.
    ///
    /// Returns the layout and the indices of the leading header rows. A label
    /// pair over distinct columns is kept only when the following row has
    /// airport codes in both columns.
    pub fn detect(rows: &[Row], directory: &AirportDirectory) -> (Self, Vec<usize>) {
        let header_rows: Vec<usize> = rows
            .iter()
            .take_while(|row| is_likely_header(row, directory))
            .enumerate()
            .map(|(i, _)| i)
            .collect();

        let labelled = rows.iter().enumerate().filter(|(i, row)| {
            header_rows.contains(i) || (has_cell(row, "FROM") && has_cell(row, "TO"))
        });

        for (i, row) in labelled {
            let upper: Vec<String> = row.iter().map(|c| c.trim().to_uppercase()).collect();
            let find = |labels: &[&str]| upper.iter().position(|c| labels.contains(&c.as_str()));

            let (Some(from), Some(to)) = (find(DEPARTURE_LABELS), find(ARRIVAL_LABELS)) else {
                continue;
            };

            let confirmed = from == to
                || match rows.get(i + 1) {
                    None => true,
                    Some(next) => {
                        let code_at = |col: usize| {
                            next.get(col).map_or(false, |c| is_airport_code(c, directory))
                        };
                        code_at(from) && code_at(to)
                    }
                };
            if !confirmed {
                continue;
            }

            let layout = Self {
                from: Some(from),
                to: Some(to),
                departure_label: find(FROM_ONLY_LABELS),
                date: upper.iter().position(|c| c.contains("DATE")),
            };
            return (layout, header_rows);
        }

        (Self::default(), header_rows)
    }
}

fn has_cell(row: &[String], label: &str) -> bool {
    row.iter().any(|c| c.trim().eq_ignore_ascii_case(label))
}

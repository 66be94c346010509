//! Airport directory: reference airports plus a multi-valued code index.
//!
//! The dataset file has the shape
//!
//! ```text
//! {
//!   "airports":           [ { "id", "iata", "icao", "identifier", "country", "coords", "name" }, ... ],
//!   "code_to_airport_id": { "SAN": 0, "KSAN": 0, "PAL": 6, "PAL_7": 7, ... },
//!   "duplicates":         { "PAL": [6, 7] }
//! }
//! ```
//!
//! A code claimed by more than one airport is stored once under its bare form
//! and once per extra airport as `"<code>_<id>"`, so no candidate is lost.
//! When `code_to_airport_id` is absent the index is rebuilt from the airports.
//! Malformed code fields are nulled before validation (see [`codes`]).
//! [`ourairports`] builds the same dataset from the OurAirports CSV export.
//!
//! The directory is read-only during extraction. Manual registration goes
//! through [`AirportDirectory::add_manual_airport`] on an owned copy.

pub mod codes;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ourairports;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{Airport, Coordinates};
use crate::validation::{validate_airport_entry, validate_manual_airport};

pub use codes::{clean_code, clean_country, sanitize_entry, CodeField};
pub use ourairports::{CsvConversion, AIRPORT_TYPES};

// =============================================================================
// Code Index
// =============================================================================

/// Code string to airport ids.
///
/// `keys` mirrors the dataset's `code_to_airport_id` (bare and suffixed keys).
/// `candidates` groups every id reachable from a bare code, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct CodeIndex {
    keys: HashMap<String, usize>,
    candidates: HashMap<String, Vec<usize>>,
}

impl CodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw dataset key (`"SAN"` or `"SAN_12"`).
    fn insert_key(&mut self, key: &str, id: usize) {
        self.keys.insert(key.to_string(), id);
        let ids = self.candidates.entry(base_code(key).to_string()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Map `code` to `id`, falling back to a suffixed key on collision.
    ///
    /// Collisions are recorded in `duplicates` (first owner first).
    pub fn map_code(
        &mut self,
        code: &str,
        id: usize,
        duplicates: &mut BTreeMap<String, Vec<usize>>,
    ) {
        match self.keys.get(code).copied() {
            None => self.insert_key(code, id),
            Some(owner) if owner == id => {}
            Some(owner) => {
                let dup = duplicates.entry(code.to_string()).or_insert_with(|| vec![owner]);
                if !dup.contains(&id) {
                    dup.push(id);
                }
                self.insert_key(&format!("{}_{}", code, id), id);
            }
        }
    }

    /// Give a bare key to codes only reachable through suffixed keys.
    ///
    /// Happens when the bare key pointed at an entry rejected at load.
    fn promote_orphans(&mut self) {
        for (code, ids) in &self.candidates {
            if let Some(&first) = ids.first() {
                self.keys.entry(code.clone()).or_insert(first);
            }
        }
    }

    /// Exact key lookup.
    pub fn contains(&self, code: &str) -> bool {
        self.keys.contains_key(code)
    }

    /// Ids whose key is `code` or `"<code>_<id>"`, in insertion order.
    pub fn candidates(&self, code: &str) -> &[usize] {
        self.candidates.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in the dataset's `code_to_airport_id` form, sorted.
    pub fn to_key_map(&self) -> BTreeMap<String, usize> {
        self.keys.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

fn base_code(key: &str) -> &str {
    key.split('_').next().unwrap_or(key)
}

/// Sort position of a dataset key: bare key first, then suffixed keys by id.
fn key_order(key: &str, id: usize) -> (String, bool, usize) {
    let suffixed = key.contains('_');
    (base_code(key).to_string(), suffixed, id)
}

// =============================================================================
// Dataset
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawDataset {
    airports: Vec<Value>,
    #[serde(default)]
    code_to_airport_id: Option<BTreeMap<String, usize>>,
}

/// Dataset shape written by [`AirportDirectory::to_dataset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportDataset {
    pub airports: Vec<Airport>,
    pub code_to_airport_id: BTreeMap<String, usize>,
    pub duplicates: BTreeMap<String, Vec<usize>>,
}

// =============================================================================
// Manual Airport
// =============================================================================

/// Airport typed in by the user for a code the dataset lacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAirport {
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: Option<String>,
}

impl ManualAirport {
    /// Uppercase and trim codes, drop blanks.
    fn normalized(&self) -> Self {
        let clean = |v: &Option<String>| {
            v.as_ref()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
        };
        Self {
            iata: clean(&self.iata),
            icao: clean(&self.icao),
            identifier: clean(&self.identifier),
            country: clean(&self.country),
            lat: self.lat,
            lon: self.lon,
            name: self
                .name
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    /// Codes this entry introduces.
    pub fn codes(&self) -> Vec<String> {
        let n = self.normalized();
        [n.iata, n.icao, n.identifier].into_iter().flatten().collect()
    }
}

// =============================================================================
// Airport Directory
// =============================================================================

/// Reference airports and their code index.
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    airports: Vec<Arc<Airport>>,
    index: CodeIndex,
    duplicates: BTreeMap<String, Vec<usize>>,
    rejected: usize,
}

impl AirportDirectory {
    /// Load the dataset JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> DirectoryResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Parse a dataset from its JSON text.
    pub fn from_json_str(content: &str) -> DirectoryResult<Self> {
        let raw: RawDataset = serde_json::from_str(content)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawDataset) -> DirectoryResult<Self> {
        let mut directory = Self::default();
        // dataset id -> load position
        let mut remap: HashMap<usize, usize> = HashMap::new();

        for (position, mut entry) in raw.airports.into_iter().enumerate() {
            sanitize_entry(&mut entry);
            if validate_airport_entry(&entry).is_err() {
                directory.rejected += 1;
                continue;
            }
            let dataset_id = entry
                .get("id")
                .and_then(Value::as_u64)
                .map(|v| v as usize)
                .unwrap_or(position);
            let mut airport: Airport = match serde_json::from_value(entry) {
                Ok(a) => a,
                Err(_) => {
                    directory.rejected += 1;
                    continue;
                }
            };
            let id = directory.airports.len();
            remap.entry(dataset_id).or_insert(id);
            airport.id = id;
            if airport.identifier.is_none() {
                airport.identifier = airport.canonical_code().map(String::from);
            }
            directory.airports.push(Arc::new(airport));
        }

        if directory.airports.is_empty() {
            return Err(DirectoryError::NoAirports { rejected: directory.rejected });
        }

        match raw.code_to_airport_id {
            Some(keys) => {
                let mut entries: Vec<(String, usize)> = keys
                    .into_iter()
                    .filter_map(|(key, old)| remap.get(&old).map(|&id| (key, id)))
                    .collect();
                entries.sort_by_key(|(key, id)| key_order(key, *id));
                for (key, id) in entries {
                    directory.index.insert_key(&key, id);
                    if key.contains('_') {
                        let base = base_code(&key).to_string();
                        let first = directory.index.keys.get(&base).copied();
                        let dup = directory.duplicates.entry(base).or_default();
                        if let Some(first) = first {
                            if !dup.contains(&first) {
                                dup.insert(0, first);
                            }
                        }
                        if !dup.contains(&id) {
                            dup.push(id);
                        }
                    }
                }
                directory.index.promote_orphans();
                directory.duplicates.retain(|_, ids| ids.len() > 1);
            }
            None => {
                for i in 0..directory.airports.len() {
                    directory.index_airport(i);
                }
            }
        }

        Ok(directory)
    }

    /// Build a directory from bare airport records.
    ///
    /// Ids are reassigned to positions; identifiers are derived when absent.
    pub fn from_airports(airports: Vec<Airport>) -> Self {
        let mut directory = Self::default();
        for mut airport in airports {
            if !airport.coords.is_valid() || airport.canonical_code().is_none() {
                directory.rejected += 1;
                continue;
            }
            airport.id = directory.airports.len();
            if airport.identifier.is_none() {
                airport.identifier = airport.canonical_code().map(String::from);
            }
            directory.airports.push(Arc::new(airport));
            directory.index_airport(directory.airports.len() - 1);
        }
        directory
    }

    /// Index identifier, GPS code, ICAO, local code and IATA of one airport.
    fn index_airport(&mut self, id: usize) {
        let airport = Arc::clone(&self.airports[id]);
        let identifier = airport.identifier.as_deref();
        if let Some(code) = identifier {
            self.index.map_code(code, id, &mut self.duplicates);
        }
        for code in [
            airport.gps_code.as_deref(),
            airport.icao.as_deref(),
            airport.local_code.as_deref(),
            airport.iata.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            if Some(code) != identifier {
                self.index.map_code(code, id, &mut self.duplicates);
            }
        }
    }

    /// Register a user-entered airport and index it immediately.
    ///
    /// Existing keys are never overwritten: a taken code gets a suffixed key.
    pub fn add_manual_airport(&mut self, input: &ManualAirport) -> DirectoryResult<Arc<Airport>> {
        let manual = input.normalized();
        let value = serde_json::to_value(&manual)?;
        validate_manual_airport(&value)
            .map_err(|errors| DirectoryError::InvalidAirport { errors })?;

        let coords = Coordinates::new(manual.lat, manual.lon);
        if !coords.is_valid() {
            return Err(DirectoryError::InvalidAirport {
                errors: vec![format!("coordinates out of range: {}, {}", manual.lat, manual.lon)],
            });
        }

        let label = manual
            .iata
            .clone()
            .or_else(|| manual.icao.clone())
            .or_else(|| manual.identifier.clone())
            .unwrap_or_default();
        let id = self.airports.len();
        let airport = Airport {
            id,
            identifier: manual
                .identifier
                .clone()
                .or_else(|| manual.iata.clone())
                .or_else(|| manual.icao.clone()),
            iata: manual.iata,
            icao: manual.icao,
            gps_code: None,
            local_code: None,
            country: manual.country.unwrap_or_else(|| "Unknown".to_string()),
            region: None,
            coords,
            name: manual
                .name
                .unwrap_or_else(|| format!("Custom Airport ({})", label)),
        };

        let airport = Arc::new(airport);
        self.airports.push(Arc::clone(&airport));
        self.index_airport(id);
        Ok(airport)
    }

    pub fn get(&self, id: usize) -> Option<&Arc<Airport>> {
        self.airports.get(id)
    }

    pub fn airports(&self) -> impl Iterator<Item = &Arc<Airport>> {
        self.airports.iter()
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Whether `code` is a key of the code index.
    pub fn contains_code(&self, code: &str) -> bool {
        self.index.contains(code)
    }

    /// Airports reachable from `code`, bare key first.
    pub fn candidates<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a Arc<Airport>> + 'a {
        let ids = self.index.candidates(code).to_vec();
        ids.into_iter().filter_map(move |id| self.airports.get(id))
    }

    pub fn index(&self) -> &CodeIndex {
        &self.index
    }

    /// Codes claimed by more than one airport.
    pub fn duplicates(&self) -> &BTreeMap<String, Vec<usize>> {
        &self.duplicates
    }

    /// Dataset entries rejected at load.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Dataset form of this directory.
    pub fn to_dataset(&self) -> AirportDataset {
        AirportDataset {
            airports: self.airports.iter().map(|a| (**a).clone()).collect(),
            code_to_airport_id: self.index.to_key_map(),
            duplicates: self.duplicates.clone(),
        }
    }
}

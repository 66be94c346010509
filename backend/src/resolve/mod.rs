//! Airport resolver: pick one airport for a code that may have several.
//!
//! Every candidate reachable from the code is scored and the first candidate
//! with the highest score wins, provided the score is positive.
//!
//! ```text
//! ICAO field equals code                 +100
//! canonical identifier equals code        +80
//! IATA field equals code                  +50
//! US, code is K + 3 letters               +30   (else US: +20)
//! in the bias region (US-CA)              +10
//! within bias radius of reference point   +50 / (distance_km + 1)
//! one of its codes appears in the remarks +70
//! ```
//!
//! The regional terms break ties between otherwise equal candidates; the
//! reference point and region come from [`RegionalBias`].

pub mod distance;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::classify::looks_like_code;
use crate::directory::AirportDirectory;
use crate::models::{Airport, Coordinates};

pub use distance::{great_circle_km, DistanceCache, EARTH_RADIUS_KM};

const ICAO_MATCH: f64 = 100.0;
const IDENTIFIER_MATCH: f64 = 80.0;
const IATA_MATCH: f64 = 50.0;
const US_K_CODE: f64 = 30.0;
const US_AIRPORT: f64 = 20.0;
const REGION_MATCH: f64 = 10.0;
const PROXIMITY_WEIGHT: f64 = 50.0;
const CONTEXT_MATCH: f64 = 70.0;

/// Region the proximity and region terms favour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalBias {
    pub reference: Coordinates,
    pub radius_km: f64,
    pub region: String,
}

impl Default for RegionalBias {
    /// Montgomery-Gibbs Executive (KMYF), San Diego.
    fn default() -> Self {
        Self {
            reference: Coordinates::new(32.8157, -117.1396),
            radius_km: 1000.0,
            region: "US-CA".to_string(),
        }
    }
}

/// A candidate with its score breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub airport: Arc<Airport>,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Resolves codes against a directory snapshot.
#[derive(Debug, Clone)]
pub struct AirportResolver {
    directory: Arc<AirportDirectory>,
    bias: RegionalBias,
}

impl AirportResolver {
    pub fn new(directory: Arc<AirportDirectory>, bias: RegionalBias) -> Self {
        Self { directory, bias }
    }

    pub fn directory(&self) -> &AirportDirectory {
        &self.directory
    }

    pub fn bias(&self) -> &RegionalBias {
        &self.bias
    }

    /// Score one candidate for `code` (uppercase).
    pub fn score(&self, airport: &Arc<Airport>, code: &str, context: &[String]) -> ScoredCandidate {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        if airport.icao.as_deref() == Some(code) {
            score += ICAO_MATCH;
            reasons.push("ICAO match".to_string());
        }
        if airport.identifier.as_deref() == Some(code) {
            score += IDENTIFIER_MATCH;
            reasons.push("Identifier match".to_string());
        }
        if airport.iata.as_deref() == Some(code) {
            score += IATA_MATCH;
            reasons.push("IATA match".to_string());
        }
        if airport.country == "US" && code.len() == 4 && code.starts_with('K') {
            score += US_K_CODE;
            reasons.push("US airport with 4-letter code".to_string());
        } else if airport.country == "US" {
            score += US_AIRPORT;
            reasons.push("US airport".to_string());
        }
        if airport.region.as_deref() == Some(self.bias.region.as_str()) {
            score += REGION_MATCH;
            reasons.push(format!("In region {}", self.bias.region));
        }

        let distance = great_circle_km(airport.coords, self.bias.reference);
        if distance < self.bias.radius_km {
            score += PROXIMITY_WEIGHT / (distance + 1.0);
            reasons.push(format!("Near reference point ({:.2} km)", distance));
        }

        if context.iter().any(|c| airport.has_code(c)) {
            score += CONTEXT_MATCH;
            reasons.push("Found in remarks".to_string());
        }

        ScoredCandidate {
            airport: Arc::clone(airport),
            score,
            reasons,
        }
    }

    /// All candidates of `code`, scored, in index order.
    pub fn rank(&self, code: &str, context: &[String]) -> Vec<ScoredCandidate> {
        let code = code.trim().to_uppercase();
        self.directory
            .candidates(&code)
            .map(|a| self.score(a, &code, context))
            .collect()
    }

    /// First candidate with the highest score, when that score is positive.
    pub fn best(&self, code: &str, context: &[String]) -> Option<ScoredCandidate> {
        let mut best: Option<ScoredCandidate> = None;
        for candidate in self.rank(code, context) {
            match &best {
                Some(b) if candidate.score <= b.score => {}
                _ => best = Some(candidate),
            }
        }
        best.filter(|b| b.score > 0.0)
    }

    pub fn resolve(&self, code: &str, context: &[String]) -> Option<Arc<Airport>> {
        self.best(code, context).map(|b| b.airport)
    }

    /// Like [`resolve`](Self::resolve), recording plausible unresolved codes.
    pub fn resolve_tracked(
        &self,
        code: &str,
        context: &[String],
        missing: &mut BTreeSet<String>,
    ) -> Option<Arc<Airport>> {
        let found = self.resolve(code, context);
        if found.is_none() && looks_like_code(code) {
            missing.insert(code.trim().to_uppercase());
        }
        found
    }
}

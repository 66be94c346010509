//! Code field rules shared by dataset loading and CSV conversion.
//!
//! A malformed code field is dropped, not the airport. An airport is only
//! lost when no code survives or its coordinates are unusable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static IATA_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid regex"));

static OTHER_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{3,4}$").expect("valid regex"));

static COUNTRY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").expect("valid regex"));

/// Code fields of a dataset entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeField {
    Iata,
    Icao,
    Identifier,
    GpsCode,
    LocalCode,
}

impl CodeField {
    pub const ALL: [CodeField; 5] = [
        CodeField::Iata,
        CodeField::Icao,
        CodeField::Identifier,
        CodeField::GpsCode,
        CodeField::LocalCode,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CodeField::Iata => "iata",
            CodeField::Icao => "icao",
            CodeField::Identifier => "identifier",
            CodeField::GpsCode => "gps_code",
            CodeField::LocalCode => "local_code",
        }
    }

    pub fn accepts(&self, code: &str) -> bool {
        match self {
            CodeField::Iata => IATA_CODE.is_match(code),
            _ => OTHER_CODE.is_match(code),
        }
    }
}

/// Trimmed code when it fits `field`, else `None`.
///
/// Matching is case-sensitive: `"san"` is not an IATA code.
pub fn clean_code(field: CodeField, raw: &str) -> Option<String> {
    let code = raw.trim();
    field.accepts(code).then(|| code.to_string())
}

/// Two-letter country, else `"Unknown"`.
pub fn clean_country(raw: &str) -> String {
    let country = raw.trim();
    if COUNTRY_CODE.is_match(country) {
        country.to_string()
    } else {
        "Unknown".to_string()
    }
}

/// Null out code fields that do not fit their pattern and replace a bad
/// country with `"Unknown"`, in place.
pub fn sanitize_entry(entry: &mut Value) {
    let Some(object) = entry.as_object_mut() else { return };

    for field in CodeField::ALL {
        let Some(value) = object.get_mut(field.key()) else { continue };
        let cleaned = value.as_str().and_then(|raw| clean_code(field, raw));
        *value = cleaned.map(Value::String).unwrap_or(Value::Null);
    }

    if let Some(country) = object.get_mut("country") {
        let cleaned = country.as_str().map(clean_country).unwrap_or_else(|| "Unknown".to_string());
        *country = Value::String(cleaned);
    }
}

//! JSON Schema validation at the airport data boundary.
//!
//! Two embedded Draft 7 schemas, compiled once:
//!
//! - `schemas/airport.json` - one entry of the reference dataset
//!   (code patterns, coordinates in range, at least one code)
//! - `schemas/manual-airport.json` - an airport typed in by the user
//!   (3-letter IATA, 4-letter ICAO, optional 3-4 char identifier, lat/lon)
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use logmap::validation::validate_airport_entry;
//!
//! let entry = json!({ "icao": "KMYF", "coords": [32.8157, -117.1396] });
//! assert!(validate_airport_entry(&entry).is_ok());
//! ```

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

static AIRPORT_SCHEMA: Lazy<Validator> =
    Lazy::new(|| compile(include_str!("../../schemas/airport.json")));

static MANUAL_AIRPORT_SCHEMA: Lazy<Validator> =
    Lazy::new(|| compile(include_str!("../../schemas/manual-airport.json")));

fn compile(source: &str) -> Validator {
    let schema: Value = serde_json::from_str(source).expect("Invalid embedded schema");
    jsonschema::draft7::new(&schema).expect("Invalid embedded schema")
}

fn collect_errors(validator: &Validator, data: &Value) -> Result<(), Vec<String>> {
    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a JSON value against an arbitrary schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;
    collect_errors(&validator, data)
}

/// Boolean form of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one airport entry of the reference dataset.
pub fn validate_airport_entry(data: &Value) -> Result<(), Vec<String>> {
    collect_errors(&AIRPORT_SCHEMA, data)
}

/// Quick check of a dataset entry.
pub fn is_valid_airport_entry(data: &Value) -> bool {
    AIRPORT_SCHEMA.is_valid(data)
}

/// Validate a manually entered airport.
pub fn validate_manual_airport(data: &Value) -> Result<(), Vec<String>> {
    collect_errors(&MANUAL_AIRPORT_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_entry() {
        let entry = json!({
            "id": 0,
            "iata": "MYF",
            "icao": "KMYF",
            "identifier": "MYF",
            "country": "US",
            "coords": [32.8157, -117.1396],
            "name": "Montgomery-Gibbs Executive"
        });
        assert!(is_valid_airport_entry(&entry));
    }

    #[test]
    fn test_entry_without_codes_rejected() {
        let entry = json!({ "coords": [10.0, 10.0], "name": "Nowhere" });
        assert!(!is_valid_airport_entry(&entry));
    }

    #[test]
    fn test_entry_with_bad_coordinates_rejected() {
        let entry = json!({ "icao": "KMYF", "coords": [132.0, -117.0] });
        let errors = validate_airport_entry(&entry).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_entry_with_null_codes_but_one_real() {
        let entry = json!({ "iata": null, "icao": null, "local_code": "CA12", "coords": [33.0, -117.0] });
        assert!(is_valid_airport_entry(&entry));
    }

    #[test]
    fn test_heliport_type_rejected() {
        let entry = json!({ "icao": "KXYZ", "type": "heliport", "coords": [33.0, -117.0] });
        assert!(!is_valid_airport_entry(&entry));
    }

    #[test]
    fn test_manual_airport_rules() {
        assert!(validate_manual_airport(&json!({ "iata": "ZZZ", "lat": 1.0, "lon": 2.0 })).is_ok());
        assert!(validate_manual_airport(&json!({ "iata": "ZZZZ", "lat": 1.0, "lon": 2.0 })).is_err());
        assert!(validate_manual_airport(&json!({ "icao": "KZZZ", "lat": 1.0 })).is_err());
        assert!(validate_manual_airport(&json!({ "lat": 1.0, "lon": 2.0 })).is_err());
        assert!(validate_manual_airport(&json!({ "icao": "KZZZ", "country": "usa", "lat": 1.0, "lon": 2.0 })).is_err());
    }

    #[test]
    fn test_generic_validate() {
        let schema = json!({ "type": "object", "required": ["name"] });
        assert!(validate(&schema, &json!({ "name": "x" })).is_ok());
        assert!(!is_valid(&schema, &json!({})));
    }
}

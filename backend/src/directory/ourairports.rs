//! Directory built from the OurAirports `airports.csv` export.
//!
//! | Column | Use |
//! |--------|-----|
//! | `type` | only `small_airport`, `medium_airport`, `large_airport` are kept |
//! | `latitude_deg`, `longitude_deg` | required, in range |
//! | `iata_code`, `icao_code`, `gps_code`, `local_code` | malformed codes become null |
//! | `iso_country` | two letters, else `Unknown` |
//! | `iso_region` | region used by the regional bias |
//! | `name` | `Unknown Airport` when blank |
//!
//! Other columns are ignored. Codes are indexed in the same order as
//! [`AirportDirectory::from_airports`], so shared codes get `<code>_<id>` keys.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::codes::{clean_code, clean_country, CodeField};
use super::AirportDirectory;
use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{Airport, Coordinates};

/// Airport types kept from the export.
pub const AIRPORT_TYPES: &[&str] = &["small_airport", "medium_airport", "large_airport"];

#[derive(Debug, Deserialize)]
struct OurAirportsRow {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    latitude_deg: String,
    #[serde(default)]
    longitude_deg: String,
    #[serde(default)]
    iso_country: String,
    #[serde(default)]
    iso_region: String,
    #[serde(default)]
    gps_code: String,
    #[serde(default)]
    icao_code: String,
    #[serde(default)]
    iata_code: String,
    #[serde(default)]
    local_code: String,
}

impl OurAirportsRow {
    /// `None` when coordinates are unusable or no code survives cleaning.
    fn into_airport(self) -> Option<Airport> {
        let lat: f64 = self.latitude_deg.trim().parse().ok()?;
        let lon: f64 = self.longitude_deg.trim().parse().ok()?;
        let coords = Coordinates::new(lat, lon);
        if !coords.is_valid() {
            return None;
        }

        let iata = clean_code(CodeField::Iata, &self.iata_code);
        let icao = clean_code(CodeField::Icao, &self.icao_code);
        let gps_code = clean_code(CodeField::GpsCode, &self.gps_code);
        let local_code = clean_code(CodeField::LocalCode, &self.local_code);
        let identifier = iata
            .clone()
            .or_else(|| icao.clone())
            .or_else(|| gps_code.clone())
            .or_else(|| local_code.clone())?;

        let name = self.name.trim();
        let region = self.iso_region.trim();
        Some(Airport {
            id: 0,
            iata,
            icao,
            identifier: Some(identifier),
            gps_code,
            local_code,
            country: clean_country(&self.iso_country),
            region: (!region.is_empty()).then(|| region.to_string()),
            coords,
            name: if name.is_empty() {
                "Unknown Airport".to_string()
            } else {
                name.to_string()
            },
        })
    }
}

/// Result of a CSV conversion.
#[derive(Debug)]
pub struct CsvConversion {
    pub directory: AirportDirectory,
    /// Rows dropped for their airport type (heliports, closed fields, ...).
    pub skipped_by_type: usize,
}

impl AirportDirectory {
    /// Build a directory from an OurAirports CSV stream.
    ///
    /// Rows of other types are counted in `skipped_by_type`; rows without
    /// usable coordinates or codes are counted in [`AirportDirectory::rejected`].
    ///
    /// # Errors
    /// [`DirectoryError::CsvError`] for malformed CSV, and
    /// [`DirectoryError::NoAirports`] when nothing survives.
    pub fn from_ourairports_csv<R: Read>(reader: R) -> DirectoryResult<CsvConversion> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut airports = Vec::new();
        let mut skipped_by_type = 0;
        let mut rejected = 0;

        for record in reader.deserialize::<OurAirportsRow>() {
            let row = record?;
            if !AIRPORT_TYPES.contains(&row.kind.as_str()) {
                skipped_by_type += 1;
                continue;
            }
            match row.into_airport() {
                Some(airport) => airports.push(airport),
                None => rejected += 1,
            }
        }

        let mut directory = Self::from_airports(airports);
        directory.rejected += rejected;
        if directory.is_empty() {
            return Err(DirectoryError::NoAirports {
                rejected: directory.rejected,
            });
        }

        Ok(CsvConversion {
            directory,
            skipped_by_type,
        })
    }

    /// Read an OurAirports CSV file.
    pub fn convert_ourairports<P: AsRef<Path>>(path: P) -> DirectoryResult<CsvConversion> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_ourairports_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\"id\",\"ident\",\"type\",\"name\",\"latitude_deg\",\"longitude_deg\",\"elevation_ft\",\"iso_country\",\"iso_region\",\"gps_code\",\"icao_code\",\"iata_code\",\"local_code\"";

    fn convert(rows: &[&str]) -> DirectoryResult<CsvConversion> {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        AirportDirectory::from_ourairports_csv(csv.as_bytes())
    }

    #[test]
    fn test_type_filter() {
        let conversion = convert(&[
            "1,KSAN,large_airport,San Diego International,32.7336,-117.1897,17,US,US-CA,KSAN,KSAN,SAN,SAN",
            "2,CA12,heliport,Hospital Helipad,32.75,-117.16,300,US,US-CA,CA12,,,CA12",
            "3,KXXX,closed,Old Field,33.0,-117.0,10,US,US-CA,KXXX,,,",
            "4,KMYF,medium_airport,Montgomery-Gibbs Executive,32.8157,-117.1396,427,US,US-CA,KMYF,KMYF,MYF,MYF",
        ])
        .unwrap();

        assert_eq!(conversion.skipped_by_type, 2);
        let dir = conversion.directory;
        assert_eq!(dir.len(), 2);
        assert!(dir.contains_code("SAN"));
        assert!(dir.contains_code("KMYF"));
        assert!(!dir.contains_code("CA12"));
        assert_eq!(dir.get(0).unwrap().region.as_deref(), Some("US-CA"));
    }

    #[test]
    fn test_malformed_code_is_nulled_not_fatal() {
        let conversion = convert(&[
            "1,US-0012,small_airport,Ranch Strip,34.1,-117.5,900,US,US-CA,,,SAN,US-0012",
            "2,ZZ,small_airport,,35.0,-118.0,0,usa,,,,,",
        ])
        .unwrap();

        let dir = conversion.directory;
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.rejected(), 1);
        let strip = dir.get(0).unwrap();
        assert_eq!(strip.local_code, None);
        assert_eq!(strip.identifier.as_deref(), Some("SAN"));
    }

    #[test]
    fn test_defaults_for_country_and_name() {
        let conversion = convert(&["1,XABC,small_airport,,10.0,10.0,0,usa,,XABC,,,"]).unwrap();
        let airport = conversion.directory.get(0).unwrap().clone();
        assert_eq!(airport.country, "Unknown");
        assert_eq!(airport.name, "Unknown Airport");
        assert_eq!(airport.identifier.as_deref(), Some("XABC"));
    }

    #[test]
    fn test_shared_codes_get_suffixed_keys() {
        let conversion = convert(&[
            "1,SKPQ,small_airport,Palestina,4.45,-75.76,0,CO,CO-CAL,SKPQ,SKPQ,PAL,",
            "2,RPLN,small_airport,Palanan,17.0654,122.427,0,PH,PH-ISA,RPLN,RPLN,PAL,",
        ])
        .unwrap();

        let dataset = conversion.directory.to_dataset();
        assert_eq!(dataset.code_to_airport_id["PAL"], 0);
        assert_eq!(dataset.code_to_airport_id["PAL_1"], 1);
        assert_eq!(dataset.duplicates["PAL"], vec![0, 1]);

        let reloaded =
            AirportDirectory::from_json_str(&serde_json::to_string(&dataset).unwrap()).unwrap();
        assert_eq!(reloaded.candidates("PAL").count(), 2);
    }

    #[test]
    fn test_nothing_usable_is_an_error() {
        let err = convert(&["1,X,heliport,Pad,1.0,1.0,0,US,,,,,"]).unwrap_err();
        assert!(matches!(err, DirectoryError::NoAirports { .. }));
    }

    #[test]
    fn test_bad_coordinates_rejected() {
        let conversion = convert(&[
            "1,KSAN,large_airport,San Diego,,-117.1897,17,US,US-CA,KSAN,KSAN,SAN,",
            "2,KMYF,medium_airport,Montgomery,95.0,-117.1396,427,US,US-CA,KMYF,KMYF,MYF,",
            "3,KSEE,small_airport,Gillespie,32.8262,-116.9724,388,US,US-CA,KSEE,KSEE,SEE,",
        ])
        .unwrap();
        assert_eq!(conversion.directory.len(), 1);
        assert_eq!(conversion.directory.rejected(), 2);
    }
}

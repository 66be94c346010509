//! Small directory shared by unit tests.
//!
//! Holds the San Diego fields, a few airline airports and two deliberate
//! collisions: `PAL` (same code, both outside the US) and `KAVX` (Virginia
//! listed before Catalina, both US).

use super::AirportDirectory;
use crate::models::{Airport, Coordinates};

pub(crate) fn airport(
    id: usize,
    iata: Option<&str>,
    icao: Option<&str>,
    country: &str,
    lat: f64,
    lon: f64,
) -> Airport {
    Airport {
        id,
        iata: iata.map(String::from),
        icao: icao.map(String::from),
        identifier: iata.or(icao).map(String::from),
        gps_code: None,
        local_code: None,
        country: country.to_string(),
        region: None,
        coords: Coordinates::new(lat, lon),
        name: format!("{} Airport", iata.or(icao).unwrap_or("Unknown")),
    }
}

fn in_region(mut a: Airport, region: &str, name: &str) -> Airport {
    a.region = Some(region.to_string());
    a.name = name.to_string();
    a
}

pub(crate) fn fixture_airports() -> Vec<Airport> {
    vec![
        in_region(airport(0, Some("SAN"), Some("KSAN"), "US", 32.7336, -117.1897), "US-CA", "San Diego International"),
        in_region(airport(0, Some("MYF"), Some("KMYF"), "US", 32.8157, -117.1396), "US-CA", "Montgomery-Gibbs Executive"),
        in_region(airport(0, Some("JFK"), Some("KJFK"), "US", 40.6398, -73.7789), "US-NY", "John F Kennedy International"),
        in_region(airport(0, Some("LAX"), Some("KLAX"), "US", 33.9425, -118.4081), "US-CA", "Los Angeles International"),
        in_region(airport(0, Some("SEE"), Some("KSEE"), "US", 32.8262, -116.9724), "US-CA", "Gillespie Field"),
        in_region(airport(0, Some("CLD"), Some("KCRQ"), "US", 33.1283, -117.2800), "US-CA", "McClellan-Palomar"),
        airport(0, Some("PAL"), Some("SKPQ"), "CO", 4.4500, -75.7600),
        airport(0, Some("PAL"), Some("RPLN"), "PH", 17.0654, 122.4270),
        in_region(airport(0, None, Some("KAVX"), "US", 38.0300, -78.4500), "US-VA", "Virginia Field"),
        in_region(airport(0, None, Some("KAVX"), "US", 33.4049, -118.4158), "US-CA", "Catalina"),
        airport(0, Some("LHR"), Some("EGLL"), "GB", 51.4706, -0.4619),
        airport(0, Some("CDG"), Some("LFPG"), "FR", 49.0097, 2.5479),
    ]
}

pub(crate) fn fixture_directory() -> AirportDirectory {
    AirportDirectory::from_airports(fixture_airports())
}

/// Id of the airport whose ICAO code is `icao`.
pub(crate) fn id_of(directory: &AirportDirectory, icao: &str) -> usize {
    directory
        .airports()
        .find(|a| a.icao.as_deref() == Some(icao))
        .map(|a| a.id)
        .unwrap_or_else(|| panic!("no fixture airport {}", icao))
}

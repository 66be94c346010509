//! Configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LOGMAP_AIRPORTS` | `data/airports.json` |
//! | `LOGMAP_PORT` | `3000` |
//! | `LOGMAP_BATCH_SIZE` | `20` |
//! | `LOGMAP_BIAS_LAT` / `LOGMAP_BIAS_LON` | `32.8157` / `-117.1396` |
//! | `LOGMAP_BIAS_RADIUS_KM` | `1000` |
//! | `LOGMAP_BIAS_REGION` | `US-CA` |

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::models::Coordinates;
use crate::resolve::RegionalBias;

const DEFAULT_AIRPORTS: &str = "data/airports.json";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Airport reference dataset.
    pub airports_path: PathBuf,
    pub port: u16,
    /// Rows per concurrent import batch, at least 1.
    pub batch_size: usize,
    pub bias: RegionalBias,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            airports_path: PathBuf::from(DEFAULT_AIRPORTS),
            port: DEFAULT_PORT,
            batch_size: DEFAULT_BATCH_SIZE,
            bias: RegionalBias::default(),
        }
    }
}

impl AppConfig {
    /// Read the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset variables take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let batch_size = parse_or(&lookup, "LOGMAP_BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            return Err(invalid("LOGMAP_BATCH_SIZE", "0"));
        }

        let lat = parse_or(&lookup, "LOGMAP_BIAS_LAT", defaults.bias.reference.lat)?;
        let lon = parse_or(&lookup, "LOGMAP_BIAS_LON", defaults.bias.reference.lon)?;
        let reference = Coordinates::new(lat, lon);
        if !reference.is_valid() {
            return Err(invalid("LOGMAP_BIAS_LAT/LOGMAP_BIAS_LON", &format!("{},{}", lat, lon)));
        }

        let radius_km: f64 = parse_or(&lookup, "LOGMAP_BIAS_RADIUS_KM", defaults.bias.radius_km)?;
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(invalid("LOGMAP_BIAS_RADIUS_KM", &radius_km.to_string()));
        }

        Ok(Self {
            airports_path: lookup("LOGMAP_AIRPORTS")
                .map(PathBuf::from)
                .unwrap_or(defaults.airports_path),
            port: parse_or(&lookup, "LOGMAP_PORT", defaults.port)?,
            batch_size,
            bias: RegionalBias {
                reference,
                radius_km,
                region: lookup("LOGMAP_BIAS_REGION")
                    .map(|r| r.trim().to_uppercase())
                    .unwrap_or(defaults.bias.region),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| invalid(name, &raw)),
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

//! Great-circle distance with a directional memo.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres.
pub fn great_circle_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

type CacheKey = (u64, u64, u64, u64);

fn key(from: Coordinates, to: Coordinates) -> CacheKey {
    (from.lat.to_bits(), from.lon.to_bits(), to.lat.to_bits(), to.lon.to_bits())
}

/// Memo of computed distances, keyed by the ordered coordinate pair.
///
/// `(A, B)` and `(B, A)` are separate entries. Safe to share between row tasks.
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: Mutex<HashMap<CacheKey, f64>>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(&self, from: Coordinates, to: Coordinates) -> f64 {
        let k = key(from, to);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        *entries.entry(k).or_insert_with(|| great_circle_km(from, to))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = great_circle_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 1.0));
        assert!((d - 111.195).abs() < 0.2);
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = Coordinates::new(32.8157, -117.1396);
        assert_eq!(great_circle_km(p, p), 0.0);
    }

    #[test]
    fn test_cache_is_idempotent() {
        let cache = DistanceCache::new();
        let san = Coordinates::new(32.7336, -117.1897);
        let jfk = Coordinates::new(40.6398, -73.7789);

        let first = cache.distance(san, jfk);
        let second = cache.distance(san, jfk);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_key_is_directional() {
        let cache = DistanceCache::new();
        let a = Coordinates::new(32.7336, -117.1897);
        let b = Coordinates::new(33.9425, -118.4081);
        cache.distance(a, b);
        cache.distance(b, a);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}

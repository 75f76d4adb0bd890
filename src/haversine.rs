//! Great-circle travel estimates (fallback when routing services are unavailable).
//!
//! Straight-line distance is inflated by a per-mode route factor to
//! approximate real paths, then divided by a per-mode average speed.
//! Less accurate than a routing service but needs nothing except coordinates.

use crate::model::{Coordinates, TravelMode};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Shortest estimate ever returned, in minutes.
pub const MIN_TRAVEL_MINUTES: u32 = 5;

/// Calculate haversine distance between two points in kilometers.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Route inflation factor and average speed for one travel mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedModel {
    /// Multiplier from straight-line to route length.
    pub route_factor: f64,
    /// Average speed in km/h.
    pub speed_kmh: f64,
}

impl SpeedModel {
    pub fn for_mode(mode: TravelMode) -> Self {
        match mode {
            TravelMode::Walk => Self::new(1.2, 4.0),
            TravelMode::Drive => Self::new(1.4, 25.0),
            TravelMode::Transit => Self::new(1.3, 20.0),
            TravelMode::Bike => Self::default(),
        }
    }

    pub fn new(route_factor: f64, speed_kmh: f64) -> Self {
        Self {
            route_factor,
            speed_kmh,
        }
    }

    /// Convert straight-line distance in km to travel minutes.
    pub fn km_to_minutes(&self, km: f64) -> u32 {
        let hours = km * self.route_factor / self.speed_kmh;
        ((hours * 60.0).round() as u32).max(MIN_TRAVEL_MINUTES)
    }

    pub fn minutes_between(&self, from: Coordinates, to: Coordinates) -> u32 {
        self.km_to_minutes(haversine_km(from, to))
    }
}

impl Default for SpeedModel {
    fn default() -> Self {
        Self::new(1.3, 20.0)
    }
}

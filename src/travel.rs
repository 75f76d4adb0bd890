//! Travel time estimation with tiered fallback.
//!
//! Tiers are tried in order and the first usable answer wins:
//! matrix service, directions service (drive only), coordinate heuristic,
//! and finally the static region matrix, which always answers. No tier
//! failure ever escapes the estimator.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::haversine::{MIN_TRAVEL_MINUTES, SpeedModel};
use crate::model::{Coordinates, TravelMode};
use crate::regions;
use crate::traits::{Directions, DistanceMatrix, Geocoder};

/// One strategy in the fallback chain.
pub trait TravelTier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Minutes from `origin` to `destination`, or `None` to defer to the next tier.
    fn estimate(&self, origin: &str, destination: &str, mode: TravelMode) -> Option<u32>;
}

pub struct MatrixTier {
    matrix: Arc<dyn DistanceMatrix>,
}

impl MatrixTier {
    pub fn new(matrix: Arc<dyn DistanceMatrix>) -> Self {
        Self { matrix }
    }
}

impl TravelTier for MatrixTier {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn estimate(&self, origin: &str, destination: &str, mode: TravelMode) -> Option<u32> {
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return None;
        }
        match self.matrix.minutes(origin, destination, mode) {
            Ok(minutes) => minutes.map(|m| m.max(MIN_TRAVEL_MINUTES)),
            Err(err) => {
                debug!(error = %err, "matrix tier failed");
                None
            }
        }
    }
}

pub struct DirectionsTier {
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn Directions>,
}

impl DirectionsTier {
    pub fn new(geocoder: Arc<dyn Geocoder>, directions: Arc<dyn Directions>) -> Self {
        Self {
            geocoder,
            directions,
        }
    }
}

impl TravelTier for DirectionsTier {
    fn name(&self) -> &'static str {
        "directions"
    }

    fn estimate(&self, origin: &str, destination: &str, mode: TravelMode) -> Option<u32> {
        if mode != TravelMode::Drive {
            return None;
        }
        let (from, to) = geocode_pair(self.geocoder.as_ref(), origin, destination)?;
        match self.directions.minutes(from, to, mode) {
            Ok(minutes) => minutes.map(|m| m.max(MIN_TRAVEL_MINUTES)),
            Err(err) => {
                debug!(error = %err, "directions tier failed");
                None
            }
        }
    }
}

pub struct HeuristicTier {
    geocoder: Arc<dyn Geocoder>,
}

impl HeuristicTier {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

impl TravelTier for HeuristicTier {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn estimate(&self, origin: &str, destination: &str, mode: TravelMode) -> Option<u32> {
        let (from, to) = geocode_pair(self.geocoder.as_ref(), origin, destination)?;
        Some(SpeedModel::for_mode(mode).minutes_between(from, to))
    }
}

pub struct StaticTier;

impl TravelTier for StaticTier {
    fn name(&self) -> &'static str {
        "static"
    }

    fn estimate(&self, origin: &str, destination: &str, mode: TravelMode) -> Option<u32> {
        Some(regions::static_minutes(origin, destination, mode))
    }
}

/// Geocodes both ends concurrently.
fn geocode_pair(geocoder: &dyn Geocoder, origin: &str, destination: &str) -> Option<(Coordinates, Coordinates)> {
    let lookup = |address: &str| -> Option<Coordinates> {
        if address.trim().is_empty() {
            return None;
        }
        match geocoder.geocode(address) {
            Ok(coordinates) => coordinates,
            Err(err) => {
                debug!(error = %err, address, "geocoding failed");
                None
            }
        }
    };
    let (from, to) = rayon::join(|| lookup(origin), || lookup(destination));
    Some((from?, to?))
}

pub struct TravelTimeEstimator {
    tiers: Vec<Box<dyn TravelTier>>,
}

impl TravelTimeEstimator {
    /// Uses `tiers` in order. The static matrix still answers when they all
    /// defer.
    pub fn new(tiers: Vec<Box<dyn TravelTier>>) -> Self {
        Self { tiers }
    }

    /// Static matrix only.
    pub fn offline() -> Self {
        Self::new(vec![Box::new(StaticTier)])
    }

    /// Standard chain over whichever services are available.
    pub fn with_services(
        matrix: Option<Arc<dyn DistanceMatrix>>,
        directions: Option<Arc<dyn Directions>>,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        let mut tiers: Vec<Box<dyn TravelTier>> = Vec::new();
        if let Some(matrix) = matrix {
            tiers.push(Box::new(MatrixTier::new(matrix)));
        }
        if let (Some(geocoder), Some(directions)) = (geocoder.clone(), directions) {
            tiers.push(Box::new(DirectionsTier::new(geocoder, directions)));
        }
        if let Some(geocoder) = geocoder {
            tiers.push(Box::new(HeuristicTier::new(geocoder)));
        }
        tiers.push(Box::new(StaticTier));
        Self::new(tiers)
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    pub fn estimate(&self, origin: &str, destination: &str, mode: TravelMode) -> u32 {
        if origin.trim() == destination.trim() {
            return MIN_TRAVEL_MINUTES;
        }

        for tier in &self.tiers {
            if let Some(minutes) = tier.estimate(origin, destination, mode) {
                trace!(tier = tier.name(), minutes, origin, destination, "travel time estimated");
                return minutes;
            }
        }
        regions::static_minutes(origin, destination, mode)
    }

    /// Estimates every pair concurrently; results keep the input order.
    pub fn estimate_pairs(&self, pairs: &[(String, String)], mode: TravelMode) -> Vec<u32> {
        pairs
            .par_iter()
            .map(|(origin, destination)| self.estimate(origin, destination, mode))
            .collect()
    }
}

impl Default for TravelTimeEstimator {
    fn default() -> Self {
        Self::offline()
    }
}

//! In-process stand-ins for the network collaborators.
//!
//! Every mock counts its calls so tests can assert when a service must not
//! be reached.

use std::sync::atomic::{AtomicUsize, Ordering};

use itinerary_planner::error::{ClientError, ClientResult};
use itinerary_planner::model::{Coordinates, Schedule, TravelMode};
use itinerary_planner::traits::{
    DistanceMatrix, Extractor, Geocoder, PlaceCandidate, PlaceQuery, PlaceSearch,
};

use super::seoul_locations::by_address;

/// Distance matrix that is always down.
#[derive(Default)]
pub struct FailingMatrix {
    pub calls: AtomicUsize,
}

impl FailingMatrix {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DistanceMatrix for FailingMatrix {
    fn minutes(&self, _origin: &str, _destination: &str, _mode: TravelMode) -> ClientResult<Option<u32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClientError::Status {
            service: "distance matrix",
            status: 503,
        })
    }
}

/// Distance matrix answering a constant.
pub struct ConstantMatrix {
    pub minutes: u32,
    pub calls: AtomicUsize,
}

impl ConstantMatrix {
    pub fn new(minutes: u32) -> Self {
        Self {
            minutes,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DistanceMatrix for ConstantMatrix {
    fn minutes(&self, _origin: &str, _destination: &str, _mode: TravelMode) -> ClientResult<Option<u32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.minutes))
    }
}

/// Geocodes fixture addresses; anything else is unknown.
#[derive(Default)]
pub struct FixtureGeocoder {
    pub calls: AtomicUsize,
}

impl FixtureGeocoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for FixtureGeocoder {
    fn geocode(&self, address: &str) -> ClientResult<Option<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(by_address(address).map(|location| location.coords()))
    }
}

/// Returns the same ranked candidates for every query.
pub struct StubSearch {
    pub candidates: Vec<PlaceCandidate>,
    pub calls: AtomicUsize,
}

impl StubSearch {
    pub fn new(candidates: Vec<PlaceCandidate>) -> Self {
        Self {
            candidates,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PlaceSearch for StubSearch {
    fn search(&self, _query: &PlaceQuery) -> ClientResult<Vec<PlaceCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

/// Place search that is always down.
pub struct FailingSearch;

impl PlaceSearch for FailingSearch {
    fn search(&self, _query: &PlaceQuery) -> ClientResult<Vec<PlaceCandidate>> {
        Err(ClientError::NotConfigured { service: "place search" })
    }
}

/// Extractor that hands back a prepared draft.
pub struct ScriptedExtractor(pub Schedule);

impl Extractor for ScriptedExtractor {
    fn extract(&self, _text: &str) -> ClientResult<Schedule> {
        Ok(self.0.clone())
    }
}

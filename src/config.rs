//! Planner configuration.
//!
//! Everything has a working default. Values can be loaded from JSON (missing
//! fields keep their defaults) and overridden from `ITINERARY_*` environment
//! variables.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};
use crate::model::{Coordinates, DEFAULT_COORDINATES, TravelMode};
use crate::options::OptionGeneratorConfig;
use crate::osrm::OsrmConfig;
use crate::time_resolver::TimeResolverOptions;

const USER_AGENT: &str = concat!("itinerary-planner/", env!("CARGO_PKG_VERSION"));

/// Endpoint, credentials and timeout of one HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Blocking HTTP client bounded by this service's timeout.
    pub fn http_client(&self, service: &'static str) -> ClientResult<reqwest::blocking::Client> {
        build_client(service, self.timeout())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new("", 15)
    }
}

pub(crate) fn build_client(service: &'static str, timeout: Duration) -> ClientResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| ClientError::http(service, err))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Distance matrix service (traffic-aware for driving).
    pub matrix: ServiceConfig,
    /// Routing service for the drive-only directions tier.
    pub directions: OsrmConfig,
    pub geocoder: ServiceConfig,
    /// Mode used when checking gaps between consecutive items.
    pub travel_mode: TravelMode,
    pub conflict_buffer_minutes: i64,
    /// Gap after every slot the time resolver hands out.
    pub slot_buffer_minutes: i64,
    /// Distance kept from the reference item for before/after statements.
    pub relationship_offset_minutes: i64,
    pub promotion_threshold: f32,
    pub option_count: usize,
    pub search_radius_m: u32,
    /// Latitude degrees detour options are pushed off the direct line.
    pub detour_offset: f64,
    /// Where searches are centered before any item has a location.
    pub default_coordinates: Coordinates,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            matrix: ServiceConfig::new(
                "https://maps.googleapis.com/maps/api/distancematrix/json",
                15,
            ),
            directions: OsrmConfig::default(),
            geocoder: ServiceConfig::new("https://nominatim.openstreetmap.org", 5),
            travel_mode: TravelMode::Transit,
            conflict_buffer_minutes: 10,
            slot_buffer_minutes: 30,
            relationship_offset_minutes: 30,
            promotion_threshold: 0.8,
            option_count: 5,
            search_radius_m: 3_000,
            detour_offset: 0.01,
            default_coordinates: DEFAULT_COORDINATES,
        }
    }
}

impl PlannerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `ITINERARY_*` overrides found through `lookup`. Unparseable
    /// values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("ITINERARY_MATRIX_URL") {
            self.matrix.base_url = url;
        }
        if let Some(key) = lookup("ITINERARY_MATRIX_KEY") {
            self.matrix.api_key = Some(key);
        }
        if let Some(url) = lookup("ITINERARY_DIRECTIONS_URL") {
            self.directions.base_url = url;
        }
        if let Some(url) = lookup("ITINERARY_GEOCODER_URL") {
            self.geocoder.base_url = url;
        }
        if let Some(mode) = lookup("ITINERARY_TRAVEL_MODE").and_then(|value| TravelMode::parse(&value)) {
            self.travel_mode = mode;
        }
        if let Some(count) = lookup("ITINERARY_OPTION_COUNT").and_then(|value| value.parse().ok()) {
            self.option_count = count;
        }
        if let Some(radius) = lookup("ITINERARY_SEARCH_RADIUS_M").and_then(|value| value.parse().ok()) {
            self.search_radius_m = radius;
        }
        self
    }

    pub fn time_resolver_options(&self) -> TimeResolverOptions {
        TimeResolverOptions {
            buffer_minutes: self.slot_buffer_minutes,
            promotion_threshold: self.promotion_threshold,
        }
    }

    pub fn option_generator_config(&self) -> OptionGeneratorConfig {
        OptionGeneratorConfig {
            option_count: self.option_count,
            search_radius_m: self.search_radius_m,
            detour_offset: self.detour_offset,
        }
    }
}

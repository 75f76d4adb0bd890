//! OSRM HTTP adapter for point-to-point route durations.

use serde::Deserialize;

use crate::config::build_client;
use crate::error::{ClientError, ClientResult};
use crate::model::{Coordinates, TravelMode};
use crate::traits::Directions;

const SERVICE: &str = "osrm";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> ClientResult<Self> {
        let client = build_client(SERVICE, std::time::Duration::from_secs(config.timeout_secs))?;
        Ok(Self { config, client })
    }

    fn route_url(&self, profile: &str, from: Coordinates, to: Coordinates) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=false",
            self.config.base_url.trim_end_matches('/'),
            profile,
            from.1,
            from.0,
            to.1,
            to.0
        )
    }
}

/// OSRM profile serving a travel mode. OSRM has no transit profile.
fn profile_for(mode: TravelMode) -> Option<&'static str> {
    match mode {
        TravelMode::Drive => Some("car"),
        TravelMode::Walk => Some("foot"),
        TravelMode::Bike => Some("bike"),
        TravelMode::Transit => None,
    }
}

impl Directions for OsrmClient {
    fn minutes(&self, from: Coordinates, to: Coordinates, mode: TravelMode) -> ClientResult<Option<u32>> {
        let Some(profile) = profile_for(mode) else {
            return Ok(None);
        };

        let body = self
            .client
            .get(self.route_url(profile, from, to))
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())
            .map_err(|err| ClientError::http(SERVICE, err))?;

        body.minutes()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Seconds.
    duration: f64,
}

impl OsrmRouteResponse {
    fn minutes(&self) -> ClientResult<Option<u32>> {
        match self.code.as_str() {
            "Ok" => Ok(self
                .routes
                .first()
                .map(|route| (route.duration / 60.0).round() as u32)),
            "NoRoute" | "NoSegment" => Ok(None),
            other => Err(ClientError::malformed(SERVICE, format!("response code {other}"))),
        }
    }
}

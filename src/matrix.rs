//! Distance-matrix HTTP adapter (Google Distance Matrix response format).
//!
//! One origin, one destination per request. Driving asks for a departure of
//! "now" so the service can report a traffic-adjusted duration, which is
//! preferred when present.

use serde::Deserialize;

use crate::config::ServiceConfig;
use crate::error::{ClientError, ClientResult};
use crate::model::TravelMode;
use crate::traits::DistanceMatrix;

const SERVICE: &str = "distance matrix";

pub struct MatrixClient {
    config: ServiceConfig,
    client: reqwest::blocking::Client,
}

impl MatrixClient {
    pub fn new(config: ServiceConfig) -> ClientResult<Self> {
        let client = config.http_client(SERVICE)?;
        Ok(Self { config, client })
    }
}

fn mode_param(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walk => "walking",
        TravelMode::Drive => "driving",
        TravelMode::Transit => "transit",
        TravelMode::Bike => "bicycling",
    }
}

impl DistanceMatrix for MatrixClient {
    fn minutes(&self, origin: &str, destination: &str, mode: TravelMode) -> ClientResult<Option<u32>> {
        let (Some(key), false) = (self.config.api_key.as_deref(), self.config.base_url.is_empty()) else {
            return Err(ClientError::NotConfigured { service: SERVICE });
        };

        let mut params = vec![
            ("origins", origin),
            ("destinations", destination),
            ("mode", mode_param(mode)),
            ("language", "ko"),
            ("key", key),
        ];
        if mode == TravelMode::Drive {
            params.push(("departure_time", "now"));
        }

        let body = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<MatrixResponse>())
            .map_err(|err| ClientError::http(SERVICE, err))?;

        body.minutes(mode)
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    duration: Option<MatrixValue>,
    duration_in_traffic: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    /// Seconds.
    value: f64,
}

impl MatrixResponse {
    fn minutes(&self, mode: TravelMode) -> ClientResult<Option<u32>> {
        if self.status != "OK" {
            return Err(ClientError::malformed(SERVICE, format!("status {}", self.status)));
        }
        let Some(element) = self.rows.first().and_then(|row| row.elements.first()) else {
            return Err(ClientError::malformed(SERVICE, "no elements"));
        };
        if element.status != "OK" {
            return Ok(None);
        }

        let traffic = match mode {
            TravelMode::Drive => element.duration_in_traffic.as_ref(),
            _ => None,
        };
        Ok(traffic
            .or(element.duration.as_ref())
            .map(|duration| (duration.value / 60.0).round() as u32))
    }
}

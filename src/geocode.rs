//! Nominatim geocoding adapter.

use serde::Deserialize;

use crate::config::ServiceConfig;
use crate::error::{ClientError, ClientResult};
use crate::model::Coordinates;
use crate::traits::Geocoder;

const SERVICE: &str = "geocoder";

pub struct NominatimGeocoder {
    config: ServiceConfig,
    client: reqwest::blocking::Client,
}

impl NominatimGeocoder {
    pub fn new(config: ServiceConfig) -> ClientResult<Self> {
        let client = config.http_client(SERVICE)?;
        Ok(Self { config, client })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str) -> ClientResult<Option<Coordinates>> {
        if self.config.base_url.is_empty() {
            return Err(ClientError::NotConfigured { service: SERVICE });
        }
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let places = self
            .client
            .get(self.search_url())
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<NominatimPlace>>())
            .map_err(|err| ClientError::http(SERVICE, err))?;

        first_coordinates(&places)
    }
}

/// Nominatim reports coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

fn first_coordinates(places: &[NominatimPlace]) -> ClientResult<Option<Coordinates>> {
    let Some(place) = places.first() else {
        return Ok(None);
    };
    let lat = place.lat.parse::<f64>();
    let lon = place.lon.parse::<f64>();
    match (lat, lon) {
        (Ok(lat), Ok(lon)) => Ok(Some((lat, lon))),
        _ => Err(ClientError::malformed(
            SERVICE,
            format!("unparseable coordinates `{}`, `{}`", place.lat, place.lon),
        )),
    }
}

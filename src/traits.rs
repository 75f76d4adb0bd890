//! Interfaces for the planner's external collaborators.
//!
//! These are intentionally minimal. Concrete providers (HTTP services,
//! language models, fixtures) implement them; the planner stages only ever
//! see the traits.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::model::{Coordinates, Schedule, TravelMode};

/// Turns free text into a first-draft schedule.
pub trait Extractor: Send + Sync {
    fn extract(&self, text: &str) -> ClientResult<Schedule>;
}

/// A place returned by a search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<f32>,
    /// Provider that produced the candidate.
    pub source: String,
}

impl PlaceCandidate {
    pub fn coordinates(&self) -> Coordinates {
        (self.latitude, self.longitude)
    }
}

/// Start and end of the route a search is made for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteContext {
    pub start: Coordinates,
    pub end: Coordinates,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    pub query: String,
    /// Search center, if any.
    pub near: Option<Coordinates>,
    pub radius_m: u32,
    pub route: Option<RouteContext>,
}

impl PlaceQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            near: None,
            radius_m: 3_000,
            route: None,
        }
    }

    pub fn near(mut self, point: Coordinates, radius_m: u32) -> Self {
        self.near = Some(point);
        self.radius_m = radius_m;
        self
    }

    pub fn along(mut self, route: RouteContext) -> Self {
        self.route = Some(route);
        self
    }
}

/// Ranked place search. Providers are interchangeable.
pub trait PlaceSearch: Send + Sync {
    fn search(&self, query: &PlaceQuery) -> ClientResult<Vec<PlaceCandidate>>;
}

/// Resolves an address to coordinates.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> ClientResult<Option<Coordinates>>;
}

/// Address-to-address travel time service.
pub trait DistanceMatrix: Send + Sync {
    fn minutes(&self, origin: &str, destination: &str, mode: TravelMode) -> ClientResult<Option<u32>>;
}

/// Coordinate-to-coordinate routing service.
pub trait Directions: Send + Sync {
    fn minutes(&self, from: Coordinates, to: Coordinates, mode: TravelMode) -> ClientResult<Option<u32>>;
}

/// Sequencing meaning a phrase carries instead of a clock window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencingHint {
    /// "the next one": goes after everything assigned so far.
    Next,
    /// "in the middle": resolved later from relationships.
    Middle,
    /// Explicit ordering offset ("first" = 1, "then" = 2, ...).
    Order(i32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhraseHint {
    Window {
        start: NaiveTime,
        end: NaiveTime,
        confidence: f32,
    },
    Sequencing(SequencingHint),
}

/// Phrase to hint mappings, in the order they should be tried.
pub type PhraseHints = Vec<(String, PhraseHint)>;

/// Optional language-model assistance. Stages work without it.
pub trait LanguageUnderstanding: Send + Sync {
    fn analyze(&self, text: &str, context: &str) -> ClientResult<PhraseHints>;
}

const LANGUAGE_SERVICE: &str = "language understanding";

/// Validates a language-model payload of the form
/// `{"phrases": {"lunch": {"start": "12:00", "end": "13:30", "confidence": 0.9},
/// "then": {"order": 2}, "the next one": {"hint": "next"}}}`.
///
/// Entries that are not objects or carry unknown hints make the whole
/// payload malformed; callers fall back to their static tables.
pub fn parse_phrase_hints(payload: &Value) -> ClientResult<PhraseHints> {
    let phrases = payload
        .get("phrases")
        .and_then(Value::as_object)
        .ok_or_else(|| ClientError::malformed(LANGUAGE_SERVICE, "missing `phrases` object"))?;

    let mut hints = Vec::with_capacity(phrases.len());
    for (phrase, entry) in phrases {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            continue;
        }
        hints.push((phrase, parse_hint(entry)?));
    }
    Ok(hints)
}

fn parse_hint(entry: &Value) -> ClientResult<PhraseHint> {
    if let Some(hint) = entry.get("hint").and_then(Value::as_str) {
        return match hint {
            "next" => Ok(PhraseHint::Sequencing(SequencingHint::Next)),
            "middle" => Ok(PhraseHint::Sequencing(SequencingHint::Middle)),
            other => Err(ClientError::malformed(
                LANGUAGE_SERVICE,
                format!("unknown hint `{other}`"),
            )),
        };
    }

    if let Some(order) = entry.get("order").and_then(Value::as_i64) {
        let order = i32::try_from(order)
            .map_err(|_| ClientError::malformed(LANGUAGE_SERVICE, "order out of range"))?;
        return Ok(PhraseHint::Sequencing(SequencingHint::Order(order)));
    }

    let start = parse_clock(entry.get("start"))?;
    let end = parse_clock(entry.get("end"))?;
    if end <= start {
        return Err(ClientError::malformed(LANGUAGE_SERVICE, "window ends before it starts"));
    }
    let confidence = entry
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.5)
        .clamp(0.0, 1.0) as f32;

    Ok(PhraseHint::Window {
        start,
        end,
        confidence,
    })
}

fn parse_clock(value: Option<&Value>) -> ClientResult<NaiveTime> {
    let text = value
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::malformed(LANGUAGE_SERVICE, "window without start/end"))?;
    NaiveTime::parse_from_str(text, "%H:%M")
        .map_err(|err| ClientError::malformed(LANGUAGE_SERVICE, format!("bad time `{text}`: {err}")))
}

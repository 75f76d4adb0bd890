//! itinerary-planner core
//!
//! Turns a free-text description of a day into time-stamped, conflict-free
//! itineraries, with alternative routes for brand and category stops.

pub mod error;
pub mod model;
pub mod traits;
pub mod lexicon;
pub mod time_resolver;
pub mod priority;
pub mod relationship;
pub mod haversine;
pub mod regions;
pub mod travel;
pub mod conflict;
pub mod places;
pub mod options;
pub mod pipeline;
pub mod osrm;
pub mod matrix;
pub mod geocode;
pub mod config;

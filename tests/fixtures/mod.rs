//! Test fixtures for itinerary-planner.
//!
//! Provides realistic test data including:
//! - Real Seoul locations (from OpenStreetMap)
//! - Counting mocks for the network collaborators
//! - Time helpers and tracing setup

#![allow(dead_code)]

pub mod mocks;
pub mod seoul_locations;

pub use mocks::*;
pub use seoul_locations::*;

use chrono::{NaiveDate, NaiveDateTime};

/// Routes planner logs to the test harness output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// `hour:minute` on the fixture day.
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 4)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid fixture time")
}

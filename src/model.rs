//! Schedule data model shared by every planner stage.
//!
//! Stages take a [`Schedule`] by value and hand back a new one; nothing is
//! shared between stages besides the values flowing through them.

use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A (latitude, longitude) pair.
pub type Coordinates = (f64, f64);

/// Placeholder coordinates carried by items until a location is resolved
/// (Seoul City Hall).
pub const DEFAULT_COORDINATES: Coordinates = (37.5665, 126.9780);

/// Placeholder priority the extractor gives items it could not rank.
pub const DEFAULT_PRIORITY: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Has a concrete, binding time window.
    Fixed,
    /// Time window not yet determined.
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walk,
    Drive,
    #[default]
    Transit,
    Bike,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walk => "walk",
            TravelMode::Drive => "drive",
            TravelMode::Transit => "transit",
            TravelMode::Bike => "bike",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "walk" | "walking" => Some(TravelMode::Walk),
            "drive" | "driving" | "car" => Some(TravelMode::Drive),
            "transit" => Some(TravelMode::Transit),
            "bike" | "bicycling" | "bicycle" => Some(TravelMode::Bike),
            _ => None,
        }
    }
}

/// One activity of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: i64,
    pub priority: i32,
    pub location: String,
    pub coordinates: Coordinates,
}

impl ScheduleItem {
    pub fn fixed(
        id: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Fixed,
            start_time: Some(start),
            end_time: Some(start + Duration::minutes(duration_minutes)),
            duration_minutes,
            priority: DEFAULT_PRIORITY,
            location: String::new(),
            coordinates: DEFAULT_COORDINATES,
        }
    }

    pub fn flexible(id: impl Into<String>, name: impl Into<String>, duration_minutes: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ItemKind::Flexible,
            start_time: None,
            end_time: None,
            duration_minutes,
            priority: DEFAULT_PRIORITY,
            location: String::new(),
            coordinates: DEFAULT_COORDINATES,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>, coordinates: Coordinates) -> Self {
        self.location = location.into();
        self.coordinates = coordinates;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_fixed(&self) -> bool {
        self.kind == ItemKind::Fixed
    }

    pub fn is_timed(&self) -> bool {
        self.start_time.is_some()
    }

    /// Moves the item to `start`, keeping its duration.
    pub fn schedule_at(&mut self, start: NaiveDateTime) {
        self.start_time = Some(start);
        self.end_time = Some(start + Duration::minutes(self.duration_minutes));
    }

    /// Moves the item to `start`, keeping the length of its current window.
    pub fn shift_to(&mut self, start: NaiveDateTime) {
        let length = match (self.start_time, self.end_time) {
            (Some(old_start), Some(old_end)) => old_end - old_start,
            _ => Duration::minutes(self.duration_minutes),
        };
        self.start_time = Some(start);
        self.end_time = Some(start + length);
    }

    /// End time, derived from the duration when only a start is known.
    pub fn effective_end(&self) -> Option<NaiveDateTime> {
        self.end_time
            .or_else(|| self.start_time.map(|start| start + Duration::minutes(self.duration_minutes)))
    }

    pub fn promote(&mut self) {
        self.kind = ItemKind::Fixed;
    }
}

/// A day's items, split into time-ordered fixed items and the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub fixed_items: Vec<ScheduleItem>,
    pub flexible_items: Vec<ScheduleItem>,
}

impl Schedule {
    pub fn new(fixed_items: Vec<ScheduleItem>, flexible_items: Vec<ScheduleItem>) -> Self {
        Self {
            fixed_items,
            flexible_items,
        }
    }

    /// Partitions items by their current kind, preserving relative order.
    pub fn from_items(items: Vec<ScheduleItem>) -> Self {
        let (fixed_items, flexible_items) = items.into_iter().partition(ScheduleItem::is_fixed);
        Self {
            fixed_items,
            flexible_items,
        }
    }

    /// Fixed items first, then flexible items.
    pub fn into_items(self) -> Vec<ScheduleItem> {
        let mut items = self.fixed_items;
        items.extend(self.flexible_items);
        items
    }

    pub fn items(&self) -> impl Iterator<Item = &ScheduleItem> {
        self.fixed_items.iter().chain(self.flexible_items.iter())
    }

    pub fn len(&self) -> usize {
        self.fixed_items.len() + self.flexible_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn latest_fixed_end(&self) -> Option<NaiveDateTime> {
        self.fixed_items.iter().filter_map(ScheduleItem::effective_end).max()
    }

    pub fn sort_fixed_by_time(&mut self) {
        self.fixed_items.sort_by_key(|item| item.start_time);
    }

    pub fn sort_by_priority(&mut self) {
        self.fixed_items.sort_by_key(|item| item.priority);
        self.flexible_items.sort_by_key(|item| item.priority);
    }
}

/// One fully materialized itinerary variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOption {
    pub option_id: usize,
    pub fixed_schedules: Vec<ScheduleItem>,
    pub flexible_schedules: Vec<ScheduleItem>,
}

impl ScheduleOption {
    pub fn from_schedule(option_id: usize, schedule: Schedule) -> Self {
        Self {
            option_id,
            fixed_schedules: schedule.fixed_items,
            flexible_schedules: schedule.flexible_items,
        }
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.fixed_schedules.clone(), self.flexible_schedules.clone())
    }

    /// Replaces every item id with a fresh one qualified by this option.
    pub fn refresh_ids(&mut self) {
        let stamp = Utc::now().timestamp_millis();
        let option_id = self.option_id;
        for (index, item) in self
            .fixed_schedules
            .iter_mut()
            .chain(self.flexible_schedules.iter_mut())
            .enumerate()
        {
            item.id = format!("{stamp}-{option_id}-{index}");
        }
    }
}

/// The set of itinerary variants handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSet {
    pub options: Vec<ScheduleOption>,
}

impl OptionSet {
    pub fn single(schedule: Schedule) -> Self {
        Self {
            options: vec![ScheduleOption::from_schedule(1, schedule)],
        }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 4)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid time")
    }

    #[test]
    fn test_schedule_at_keeps_duration() {
        let mut item = ScheduleItem::flexible("a", "cafe", 45);
        item.schedule_at(at(10, 0));
        assert_eq!(item.start_time, Some(at(10, 0)));
        assert_eq!(item.end_time, Some(at(10, 45)));
    }

    #[test]
    fn test_shift_to_keeps_window_length() {
        let mut item = ScheduleItem::fixed("a", "movie", at(13, 0), 30);
        item.end_time = Some(at(15, 10));
        item.shift_to(at(14, 0));
        assert_eq!(item.end_time, Some(at(16, 10)));
    }

    #[test]
    fn test_from_items_partitions_by_kind() {
        let mut promoted = ScheduleItem::flexible("b", "lunch", 60);
        promoted.schedule_at(at(12, 0));
        promoted.promote();
        let items = vec![
            ScheduleItem::flexible("a", "walk", 30),
            promoted,
            ScheduleItem::fixed("c", "meeting", at(9, 0), 30),
        ];

        let schedule = Schedule::from_items(items);
        let fixed: Vec<_> = schedule.fixed_items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(fixed, vec!["b", "c"]);
        assert_eq!(schedule.flexible_items.len(), 1);
    }

    #[test]
    fn test_latest_fixed_end() {
        let schedule = Schedule::new(
            vec![
                ScheduleItem::fixed("a", "x", at(9, 0), 30),
                ScheduleItem::fixed("b", "y", at(14, 0), 90),
            ],
            vec![],
        );
        assert_eq!(schedule.latest_fixed_end(), Some(at(15, 30)));
    }

    #[test]
    fn test_refresh_ids_are_unique_within_option() {
        let schedule = Schedule::new(
            vec![ScheduleItem::fixed("a", "x", at(9, 0), 30)],
            vec![ScheduleItem::flexible("b", "y", 30)],
        );
        let mut option = ScheduleOption::from_schedule(3, schedule);
        option.refresh_ids();
        assert_ne!(option.fixed_schedules[0].id, option.flexible_schedules[0].id);
        assert!(option.fixed_schedules[0].id.ends_with("-3-0"));
        assert!(option.flexible_schedules[0].id.ends_with("-3-1"));
    }

    #[test]
    fn test_travel_mode_parse() {
        assert_eq!(TravelMode::parse("Driving"), Some(TravelMode::Drive));
        assert_eq!(TravelMode::parse("bicycling"), Some(TravelMode::Bike));
        assert_eq!(TravelMode::parse("boat"), None);
    }

    #[test]
    fn test_option_serializes_camel_case() {
        let set = OptionSet::single(Schedule::default());
        let json = serde_json::to_string(&set).expect("serialize");
        assert!(json.contains("\"optionId\":1"));
        assert!(json.contains("\"fixedSchedules\""));
        assert!(json.contains("\"flexibleSchedules\""));
    }
}

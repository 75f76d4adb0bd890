//! Real Seoul locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Addresses are road-name
//! addresses so the static region matrix can classify them.

use chrono::NaiveDateTime;
use itinerary_planner::model::ScheduleItem;
use itinerary_planner::traits::PlaceCandidate;

/// A named location with coordinates and a street address.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// Search result for this place as reported by `source`.
    pub fn candidate(&self, source: &str) -> PlaceCandidate {
        PlaceCandidate {
            name: self.name.to_string(),
            address: self.address.to_string(),
            latitude: self.lat,
            longitude: self.lng,
            rating: Some(4.2),
            source: source.to_string(),
        }
    }

    /// Fixed item at this place.
    pub fn fixed(&self, id: &str, name: &str, start: NaiveDateTime, minutes: i64) -> ScheduleItem {
        ScheduleItem::fixed(id, name, start, minutes).with_location(self.address, self.coords())
    }

    /// Flexible item at this place.
    pub fn flexible(&self, id: &str, name: &str, minutes: i64) -> ScheduleItem {
        ScheduleItem::flexible(id, name, minutes).with_location(self.address, self.coords())
    }
}

// ============================================================================
// Stations and landmarks
// ============================================================================

pub const SEOUL_STATION: Location = Location::new("서울역", "서울 용산구 한강대로 405", 37.5547, 126.9707);
pub const CITY_HALL: Location = Location::new("서울시청", "서울 중구 세종대로 110", 37.5665, 126.9780);
pub const GWANGHWAMUN: Location = Location::new("광화문", "서울 종로구 세종대로 172", 37.5759, 126.9768);
pub const GANGNAM_STATION: Location = Location::new("강남역", "서울 강남구 강남대로 396", 37.4979, 127.0276);
pub const COEX: Location = Location::new("코엑스", "서울 강남구 영동대로 513", 37.5118, 127.0593);
pub const HONGIK_STATION: Location = Location::new("홍대입구역", "서울 마포구 양화로 160", 37.5571, 126.9245);
pub const JAMSIL_STATION: Location = Location::new("잠실역", "서울 송파구 올림픽로 265", 37.5133, 127.1001);
pub const HAEUNDAE: Location = Location::new("해운대해수욕장", "부산 해운대구 우동 1394", 35.1587, 129.1604);

pub const LANDMARKS: &[Location] = &[
    SEOUL_STATION,
    CITY_HALL,
    GWANGHWAMUN,
    GANGNAM_STATION,
    COEX,
    HONGIK_STATION,
    JAMSIL_STATION,
    HAEUNDAE,
];

// ============================================================================
// Starbucks branches between Seoul Station and Gwanghwamun
// ============================================================================

pub const STARBUCKS_BRANCHES: &[Location] = &[
    Location::new("스타벅스 서울역점", "서울 중구 한강대로 405 서울역사 2층", 37.5558, 126.9716),
    Location::new("스타벅스 남대문로점", "서울 중구 남대문로 81", 37.5618, 126.9812),
    Location::new("스타벅스 시청점", "서울 중구 세종대로 101", 37.5652, 126.9769),
    Location::new("스타벅스 광화문점", "서울 종로구 세종대로 167", 37.5713, 126.9766),
    Location::new("스타벅스 명동점", "서울 중구 명동길 56", 37.5636, 126.9857),
    Location::new("스타벅스 을지로국제빌딩점", "서울 중구 을지로 170", 37.5664, 126.9910),
];

// ============================================================================
// Independent cafes
// ============================================================================

pub const CAFES: &[Location] = &[
    Location::new("커피한약방", "서울 중구 삼일대로12길 16-6", 37.5665, 126.9886),
    Location::new("블루보틀 삼청", "서울 종로구 북촌로5길 76", 37.5810, 126.9818),
    Location::new("테라로사 광화문", "서울 종로구 종로 1", 37.5703, 126.9779),
];

/// Every fixture location as a single list.
pub fn all_locations() -> Vec<Location> {
    LANDMARKS
        .iter()
        .chain(STARBUCKS_BRANCHES)
        .chain(CAFES)
        .cloned()
        .collect()
}

/// Looks a fixture up by street address.
pub fn by_address(address: &str) -> Option<Location> {
    all_locations()
        .into_iter()
        .find(|location| location.address == address.trim())
}

//! Administrative-division lookup and the hand-curated travel matrix.
//!
//! Addresses are classified by substring match, first metro then district.
//! The matrix only knows coarse bands: same district, same metro, and a
//! table of metro pairs.

use crate::haversine::MIN_TRAVEL_MINUTES;
use crate::model::TravelMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metro {
    Seoul,
    Gyeonggi,
    Incheon,
    Busan,
    Daegu,
    Daejeon,
    Gwangju,
    Jeju,
}

/// A classified address. `district` is `None` when only the metro matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub metro: Metro,
    pub district: Option<&'static str>,
}

struct District {
    metro: Metro,
    name: &'static str,
    aliases: &'static [&'static str],
}

const METROS: &[(Metro, &[&str])] = &[
    (Metro::Seoul, &["서울", "seoul"]),
    (Metro::Gyeonggi, &["경기", "gyeonggi"]),
    (Metro::Incheon, &["인천", "incheon"]),
    (Metro::Busan, &["부산", "busan"]),
    (Metro::Daegu, &["대구", "daegu"]),
    (Metro::Daejeon, &["대전", "daejeon"]),
    (Metro::Gwangju, &["광주광역시", "gwangju-si", "gwangju"]),
    (Metro::Jeju, &["제주", "jeju"]),
];

const DISTRICTS: &[District] = &[
    District { metro: Metro::Seoul, name: "강남구", aliases: &["강남구", "강남", "gangnam"] },
    District { metro: Metro::Seoul, name: "서초구", aliases: &["서초구", "서초", "seocho"] },
    District { metro: Metro::Seoul, name: "송파구", aliases: &["송파구", "잠실", "songpa", "jamsil"] },
    District { metro: Metro::Seoul, name: "마포구", aliases: &["마포구", "홍대", "mapo", "hongdae"] },
    District { metro: Metro::Seoul, name: "종로구", aliases: &["종로구", "종로", "jongno"] },
    District { metro: Metro::Seoul, name: "용산구", aliases: &["용산구", "이태원", "yongsan", "itaewon"] },
    District { metro: Metro::Seoul, name: "영등포구", aliases: &["영등포구", "여의도", "yeongdeungpo", "yeouido"] },
    District { metro: Metro::Seoul, name: "성동구", aliases: &["성동구", "성수", "seongdong", "seongsu"] },
    District { metro: Metro::Seoul, name: "광진구", aliases: &["광진구", "건대", "gwangjin"] },
    District { metro: Metro::Seoul, name: "강서구", aliases: &["강서구", "마곡", "gangseo"] },
    District { metro: Metro::Seoul, name: "중구", aliases: &["중구", "명동", "jung-gu", "myeongdong"] },
    District { metro: Metro::Gyeonggi, name: "성남시", aliases: &["성남시", "분당", "판교", "seongnam", "bundang", "pangyo"] },
    District { metro: Metro::Gyeonggi, name: "수원시", aliases: &["수원시", "수원", "suwon"] },
    District { metro: Metro::Gyeonggi, name: "고양시", aliases: &["고양시", "일산", "goyang", "ilsan"] },
    District { metro: Metro::Gyeonggi, name: "용인시", aliases: &["용인시", "용인", "yongin"] },
    District { metro: Metro::Gyeonggi, name: "부천시", aliases: &["부천시", "부천", "bucheon"] },
    District { metro: Metro::Gyeonggi, name: "안양시", aliases: &["안양시", "안양", "anyang"] },
    District { metro: Metro::Incheon, name: "연수구", aliases: &["연수구", "송도", "yeonsu", "songdo"] },
    District { metro: Metro::Incheon, name: "부평구", aliases: &["부평구", "부평", "bupyeong"] },
    District { metro: Metro::Incheon, name: "남동구", aliases: &["남동구", "namdong"] },
    District { metro: Metro::Busan, name: "해운대구", aliases: &["해운대구", "해운대", "haeundae"] },
    District { metro: Metro::Busan, name: "부산진구", aliases: &["부산진구", "서면", "busanjin", "seomyeon"] },
    District { metro: Metro::Busan, name: "수영구", aliases: &["수영구", "광안리", "suyeong"] },
    District { metro: Metro::Busan, name: "중구", aliases: &["중구", "남포", "jung-gu", "nampo"] },
    District { metro: Metro::Busan, name: "강서구", aliases: &["강서구", "gangseo"] },
];

/// Base minutes between two different metros, by pair.
const METRO_PAIRS: &[(Metro, Metro, u32)] = &[
    (Metro::Seoul, Metro::Gyeonggi, 60),
    (Metro::Seoul, Metro::Incheon, 70),
    (Metro::Gyeonggi, Metro::Incheon, 70),
    (Metro::Seoul, Metro::Daejeon, 120),
    (Metro::Gyeonggi, Metro::Daejeon, 110),
    (Metro::Seoul, Metro::Daegu, 180),
    (Metro::Seoul, Metro::Gwangju, 180),
    (Metro::Seoul, Metro::Busan, 200),
    (Metro::Daejeon, Metro::Daegu, 90),
    (Metro::Daegu, Metro::Busan, 70),
];

pub const SAME_DISTRICT_MINUTES: u32 = 15;
pub const SAME_METRO_MINUTES: u32 = 35;
pub const UNKNOWN_REGION_MINUTES: u32 = 30;
pub const INTER_METRO_MINUTES: u32 = 180;
pub const ISLAND_MINUTES: u32 = 240;

pub fn classify(address: &str) -> Option<Region> {
    let address = address.to_lowercase();
    if address.trim().is_empty() {
        return None;
    }

    let metro = METROS
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| address.contains(alias)))
        .map(|(metro, _)| *metro);

    let district = DISTRICTS
        .iter()
        .filter(|district| metro.is_none_or(|metro| district.metro == metro))
        .find(|district| district.aliases.iter().any(|alias| address.contains(alias)));

    match (metro, district) {
        (_, Some(district)) => Some(Region {
            metro: district.metro,
            district: Some(district.name),
        }),
        (Some(metro), None) => Some(Region {
            metro,
            district: None,
        }),
        (None, None) => None,
    }
}

pub fn base_minutes(origin: Option<Region>, destination: Option<Region>) -> u32 {
    let (Some(origin), Some(destination)) = (origin, destination) else {
        return UNKNOWN_REGION_MINUTES;
    };

    if origin.metro == destination.metro {
        return match (origin.district, destination.district) {
            (Some(a), Some(b)) if a == b => SAME_DISTRICT_MINUTES,
            _ => SAME_METRO_MINUTES,
        };
    }

    if origin.metro == Metro::Jeju || destination.metro == Metro::Jeju {
        return ISLAND_MINUTES;
    }

    METRO_PAIRS
        .iter()
        .find(|(a, b, _)| {
            (*a == origin.metro && *b == destination.metro)
                || (*a == destination.metro && *b == origin.metro)
        })
        .map(|(_, _, minutes)| *minutes)
        .unwrap_or(INTER_METRO_MINUTES)
}

pub fn mode_multiplier(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Walk => 2.5,
        TravelMode::Drive => 1.0,
        TravelMode::Transit => 1.3,
        TravelMode::Bike => 0.6,
    }
}

/// Static estimate between two addresses. Always answers.
pub fn static_minutes(origin: &str, destination: &str, mode: TravelMode) -> u32 {
    let base = base_minutes(classify(origin), classify(destination));
    let minutes = (f64::from(base) * mode_multiplier(mode)).round() as u32;
    minutes.max(MIN_TRAVEL_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_seoul_district() {
        let region = classify("서울특별시 강남구 테헤란로 152").expect("region");
        assert_eq!(region.metro, Metro::Seoul);
        assert_eq!(region.district, Some("강남구"));
    }

    #[test]
    fn test_classify_prefers_metro_for_shared_names() {
        let region = classify("부산광역시 강서구 공항진입로 108").expect("region");
        assert_eq!(region.metro, Metro::Busan);
        assert_eq!(region.district, Some("강서구"));
    }

    #[test]
    fn test_classify_romanized() {
        let region = classify("Bundang-gu, Seongnam").expect("region");
        assert_eq!(region.metro, Metro::Gyeonggi);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("somewhere nice"), None);
    }

    #[test]
    fn test_base_minute_bands() {
        let gangnam = classify("서울 강남구");
        let seocho = classify("서울 서초구");
        let haeundae = classify("부산 해운대구");
        assert_eq!(base_minutes(gangnam, gangnam), SAME_DISTRICT_MINUTES);
        assert_eq!(base_minutes(gangnam, seocho), SAME_METRO_MINUTES);
        assert_eq!(base_minutes(gangnam, haeundae), 200);
        assert_eq!(base_minutes(None, seocho), UNKNOWN_REGION_MINUTES);
    }

    #[test]
    fn test_static_minutes_scale_by_mode() {
        let a = "서울 마포구 양화로 45";
        let b = "서울 종로구 세종대로 175";
        assert_eq!(static_minutes(a, b, TravelMode::Drive), 35);
        assert_eq!(static_minutes(a, b, TravelMode::Walk), 88);
        assert_eq!(static_minutes(a, b, TravelMode::Transit), 46);
        assert_eq!(static_minutes(a, b, TravelMode::Bike), 21);
    }

    #[test]
    fn test_static_minutes_never_below_floor() {
        let a = "서울 강남구 역삼동";
        let b = "서울 강남구 삼성동";
        assert_eq!(static_minutes(a, b, TravelMode::Bike), 9);
        assert!(static_minutes("", "", TravelMode::Bike) >= MIN_TRAVEL_MINUTES);
    }
}

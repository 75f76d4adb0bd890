//! Invariants every planning stage must uphold, checked against realistic
//! Seoul schedules.

mod fixtures;

use std::sync::Arc;

use fixtures::*;
use itinerary_planner::conflict::ConflictResolver;
use itinerary_planner::haversine::MIN_TRAVEL_MINUTES;
use itinerary_planner::model::{ItemKind, Schedule, ScheduleItem, TravelMode};
use itinerary_planner::priority::PriorityAssigner;
use itinerary_planner::relationship::RelationshipEnhancer;
use itinerary_planner::time_resolver::{TimeExpressionResolver, TimeResolverOptions};
use itinerary_planner::travel::TravelTimeEstimator;

const ALL_MODES: [TravelMode; 4] = [TravelMode::Walk, TravelMode::Drive, TravelMode::Transit, TravelMode::Bike];

fn busy_day() -> Schedule {
    Schedule::new(
        vec![
            GANGNAM_STATION.fixed("g", "강남역 미팅", at(15, 0), 60),
            CITY_HALL.fixed("h", "시청 회의", at(10, 0), 60),
            COEX.fixed("x", "코엑스 전시", at(13, 0), 90),
        ],
        vec![
            ScheduleItem::flexible("c", "카페", 30),
            ScheduleItem::flexible("b", "서점", 45).with_priority(5),
            ScheduleItem::flexible("p", "약국", 15).with_priority(5),
            ScheduleItem::flexible("y", "헬스장", 60),
            ScheduleItem::flexible("w", "공원 산책", 40),
        ],
    )
}

// ============================================================================
// PriorityAssigner
// ============================================================================

#[test]
fn priorities_are_a_permutation() {
    init_tracing();
    let texts = [
        "",
        "먼저 카페 가고, 그 다음 공원 산책, 마지막 서점",
        "약국 들렀다가 헬스장, 그리고 카페",
        "first the gym, then coffee, finally the bookstore",
        "서점 서점 서점 카페 다음 다음 다음",
    ];

    for text in texts {
        let assigned = PriorityAssigner::new().assign(busy_day(), text);
        let mut priorities: Vec<i32> = assigned.items().map(|item| item.priority).collect();
        priorities.sort_unstable();
        let expected: Vec<i32> = (1..=busy_day().len() as i32).collect();
        assert_eq!(priorities, expected, "text: {text:?}");
    }
}

#[test]
fn fixed_items_keep_time_order_at_the_top() {
    let assigned = PriorityAssigner::new().assign(busy_day(), "먼저 카페");
    let fixed: Vec<(&str, i32)> = assigned
        .fixed_items
        .iter()
        .map(|item| (item.id.as_str(), item.priority))
        .collect();
    assert_eq!(fixed, vec![("h", 1), ("x", 2), ("g", 3)]);
    assert!(assigned.flexible_items.iter().all(|item| item.priority > 3));
}

#[test]
fn then_cafe_follows_the_fixed_item() {
    let schedule = Schedule::new(
        vec![CITY_HALL.fixed("a", "회의", at(10, 0), 60)],
        vec![ScheduleItem::flexible("c", "카페", 30)],
    );

    let assigned = PriorityAssigner::new().assign(schedule, "다음에 카페");

    let meeting = &assigned.fixed_items[0];
    let cafe = &assigned.flexible_items[0];
    assert_eq!(meeting.priority, 1);
    assert!(cafe.priority > 1);
    assert_ne!(cafe.priority, meeting.priority);
}

// ============================================================================
// TimeExpressionResolver
// ============================================================================

#[test]
fn lunch_becomes_a_fixed_midday_window() {
    init_tracing();
    let schedule = Schedule::new(
        vec![SEOUL_STATION.fixed("a", "서울역 도착", at(9, 0), 30)],
        vec![ScheduleItem::flexible("l", "lunch", 90)],
    );

    let resolved =
        TimeExpressionResolver::new(TimeResolverOptions::default()).resolve(schedule, "lunch", at(7, 0));

    let lunch = resolved
        .fixed_items
        .iter()
        .find(|item| item.id == "l")
        .expect("lunch promoted");
    assert_eq!(lunch.kind, ItemKind::Fixed);
    assert_eq!(lunch.start_time, Some(at(12, 0)));
    assert_eq!(lunch.end_time, Some(at(13, 30)));
}

// ============================================================================
// RelationshipEnhancer
// ============================================================================

#[test]
fn between_lands_on_the_midpoint() {
    init_tracing();
    let schedule = Schedule::new(
        vec![GWANGHWAMUN.fixed("m", "미팅", at(14, 0), 60).with_priority(1)],
        vec![
            ScheduleItem::flexible("c", "카페", 30).with_priority(2),
            ScheduleItem::flexible("b", "서점", 30).with_priority(3),
        ],
    );

    let enhanced = RelationshipEnhancer::default().enhance(schedule, "미팅 전에 카페, 그 사이에 서점");

    assert!(enhanced.flexible_items.is_empty());
    let find = |id: &str| {
        enhanced
            .fixed_items
            .iter()
            .find(|item| item.id == id)
            .expect("item present")
    };
    let (meeting, cafe, bookstore) = (find("m"), find("c"), find("b"));

    assert_eq!(cafe.start_time, Some(at(13, 0)));
    assert_eq!(cafe.end_time, Some(at(13, 30)));
    assert_eq!(bookstore.kind, ItemKind::Fixed);
    assert_eq!(bookstore.start_time, Some(at(13, 45)));
    assert_eq!(meeting.start_time, Some(at(14, 0)));

    let ids: Vec<&str> = enhanced.fixed_items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "m"]);
}

// ============================================================================
// ConflictResolver
// ============================================================================

fn crowded_day() -> Schedule {
    Schedule::new(
        vec![
            SEOUL_STATION.fixed("a", "서울역 도착", at(9, 0), 60).with_priority(1),
            CITY_HALL.fixed("b", "시청 회의", at(9, 30), 60).with_priority(2),
            GANGNAM_STATION.fixed("c", "강남역 점심", at(10, 0), 90).with_priority(3),
            HAEUNDAE.fixed("d", "해운대 산책", at(12, 0), 60).with_priority(4),
            COEX.fixed("e", "코엑스 전시", at(11, 0), 60).with_priority(5),
        ],
        vec![ScheduleItem::flexible("f", "헬스장", 60).with_priority(6)],
    )
}

#[test]
fn consecutive_items_leave_room_to_travel() {
    init_tracing();
    let estimator = TravelTimeEstimator::offline();

    for mode in ALL_MODES {
        let resolved = ConflictResolver::new(&estimator)
            .with_mode(mode)
            .resolve(crowded_day());

        let mut timed: Vec<&ScheduleItem> = resolved.items().filter(|item| item.is_timed()).collect();
        timed.sort_by_key(|item| item.start_time);
        assert_eq!(timed.len(), 5);

        for pair in timed.windows(2) {
            let (previous, next) = (pair[0], pair[1]);
            let gap = next.start_time.expect("timed") - previous.end_time.expect("end filled in");
            let travel = estimator.estimate(&previous.location, &next.location, mode);
            assert!(
                gap.num_minutes() >= i64::from(travel) + 10,
                "{mode:?}: {} -> {} gap {} travel {travel}",
                previous.id,
                next.id,
                gap.num_minutes()
            );
        }
    }
}

#[test]
fn conflict_resolution_is_idempotent() {
    let estimator = TravelTimeEstimator::offline();
    for mode in ALL_MODES {
        let resolver = ConflictResolver::new(&estimator).with_mode(mode);
        let once = resolver.resolve(crowded_day());
        let twice = resolver.resolve(once.clone());
        assert_eq!(once, twice, "{mode:?}");
    }
}

#[test]
fn untimed_items_are_left_alone() {
    let estimator = TravelTimeEstimator::offline();
    let resolved = ConflictResolver::new(&estimator).resolve(crowded_day());
    assert_eq!(resolved.flexible_items.len(), 1);
    assert_eq!(resolved.flexible_items[0].id, "f");
    assert!(resolved.fixed_items.iter().all(|item| item.kind == ItemKind::Fixed));
}

// ============================================================================
// TravelTimeEstimator
// ============================================================================

#[test]
fn failing_matrix_falls_back_to_heuristic() {
    init_tracing();
    let matrix = Arc::new(FailingMatrix::default());
    let geocoder = Arc::new(FixtureGeocoder::default());
    let estimator = TravelTimeEstimator::with_services(Some(matrix.clone()), None, Some(geocoder.clone()));

    let branch = &STARBUCKS_BRANCHES[0];
    for mode in ALL_MODES {
        let near = estimator.estimate(SEOUL_STATION.address, branch.address, mode);
        assert_eq!(near, MIN_TRAVEL_MINUTES, "{mode:?}");

        let far = estimator.estimate(SEOUL_STATION.address, GANGNAM_STATION.address, mode);
        assert!(far >= MIN_TRAVEL_MINUTES, "{mode:?}");
    }

    assert_eq!(matrix.calls(), 8);
    assert_eq!(geocoder.calls(), 16);
}

#[test]
fn heuristic_ranks_modes_by_speed() {
    let estimator = TravelTimeEstimator::with_services(None, None, Some(Arc::new(FixtureGeocoder::default())));
    let walk = estimator.estimate(CITY_HALL.address, GANGNAM_STATION.address, TravelMode::Walk);
    let drive = estimator.estimate(CITY_HALL.address, GANGNAM_STATION.address, TravelMode::Drive);
    assert!(walk > drive, "walk {walk} drive {drive}");
}

#[test]
fn identical_addresses_never_reach_a_service() {
    let matrix = Arc::new(ConstantMatrix::new(99));
    let geocoder = Arc::new(FixtureGeocoder::default());
    let estimator = TravelTimeEstimator::with_services(Some(matrix.clone()), None, Some(geocoder.clone()));

    for mode in ALL_MODES {
        assert_eq!(estimator.estimate(COEX.address, COEX.address, mode), MIN_TRAVEL_MINUTES);
        assert_eq!(estimator.estimate("", "", mode), MIN_TRAVEL_MINUTES);
    }

    assert_eq!(matrix.calls(), 0);
    assert_eq!(geocoder.calls(), 0);
}

#[test]
fn matrix_answer_wins_when_available() {
    let matrix = Arc::new(ConstantMatrix::new(27));
    let estimator = TravelTimeEstimator::with_services(Some(matrix.clone()), None, None);
    let minutes = estimator.estimate(HONGIK_STATION.address, JAMSIL_STATION.address, TravelMode::Transit);
    assert_eq!(minutes, 27);
    assert_eq!(matrix.calls(), 1);
}

//! Alternative itineraries built by relocating brand/category stops.
//!
//! Each option searches around a different point on the straight line from
//! the first to the last fixed stop (two of them pushed off the line) and
//! picks, per variable stop, the unused candidate that bends the route the
//! least. Options that cannot find a fresh place end the search.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::haversine::haversine_km;
use crate::lexicon::{self, PlaceCategory};
use crate::model::{Coordinates, OptionSet, Schedule, ScheduleItem, ScheduleOption};
use crate::places::normalize_address;
use crate::traits::{PlaceCandidate, PlaceQuery, PlaceSearch, RouteContext};

/// Position along the route and direction of the latitude nudge, per option.
const SEARCH_POINTS: [(f64, f64); 5] = [(0.2, 0.0), (0.5, 0.0), (0.8, 0.0), (0.5, 1.0), (0.3, -1.0)];

#[derive(Debug, Clone)]
pub struct OptionGeneratorConfig {
    pub option_count: usize,
    pub search_radius_m: u32,
    /// Latitude degrees added to or removed from detour search points.
    pub detour_offset: f64,
}

impl Default for OptionGeneratorConfig {
    fn default() -> Self {
        Self {
            option_count: 5,
            search_radius_m: 3_000,
            detour_offset: 0.01,
        }
    }
}

/// Addresses already committed to some option.
#[derive(Debug, Default)]
pub struct UsedLocations {
    addresses: HashSet<String>,
}

impl UsedLocations {
    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(&normalize_address(address))
    }

    pub fn insert(&mut self, address: &str) -> bool {
        self.addresses.insert(normalize_address(address))
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// A fixed item that can be moved to another branch of the same brand or
/// category.
struct VariableItem {
    index: usize,
    category: &'static PlaceCategory,
}

pub struct RouteOptionGenerator<'a> {
    search: &'a dyn PlaceSearch,
    config: OptionGeneratorConfig,
}

impl<'a> RouteOptionGenerator<'a> {
    pub fn new(search: &'a dyn PlaceSearch, config: OptionGeneratorConfig) -> Self {
        Self { search, config }
    }

    pub fn generate(&self, schedule: &Schedule) -> OptionSet {
        let variables: Vec<VariableItem> = schedule
            .fixed_items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                lexicon::find_category(&item.name).map(|category| VariableItem { index, category })
            })
            .collect();

        let (Some(first), Some(last)) = (schedule.fixed_items.first(), schedule.fixed_items.last()) else {
            return OptionSet::single(schedule.clone());
        };
        if schedule.fixed_items.len() < 2 || variables.is_empty() {
            debug!(variables = variables.len(), "nothing to vary, single option");
            return OptionSet::single(schedule.clone());
        }

        let route = RouteContext {
            start: first.coordinates,
            end: last.coordinates,
        };
        let count = self.config.option_count.clamp(1, SEARCH_POINTS.len());
        let mut used = UsedLocations::default();
        let mut drafts: Vec<Schedule> = Vec::with_capacity(count);

        for option_index in 0..count {
            let point = self.search_point(route, option_index);
            let (draft, modified) = self.materialize(schedule, &variables, route, point, &mut used);
            if !modified && option_index > 0 {
                info!(option_index, "no fresh candidates left, stopping option search");
                break;
            }
            drafts.push(draft);
        }

        let options = dedupe(drafts)
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                let mut option = ScheduleOption::from_schedule(index + 1, draft);
                option.refresh_ids();
                option
            })
            .collect::<Vec<_>>();

        debug!(options = options.len(), used = used.len(), "route options generated");
        OptionSet { options }
    }

    fn search_point(&self, route: RouteContext, option_index: usize) -> Coordinates {
        let (ratio, nudge) = SEARCH_POINTS[option_index % SEARCH_POINTS.len()];
        let (start_lat, start_lng) = route.start;
        let (end_lat, end_lng) = route.end;
        (
            start_lat + (end_lat - start_lat) * ratio + nudge * self.config.detour_offset,
            start_lng + (end_lng - start_lng) * ratio,
        )
    }

    /// Copies `template` and moves every variable item to the best unused
    /// candidate near `point`. Returns the copy and whether anything moved.
    fn materialize(
        &self,
        template: &Schedule,
        variables: &[VariableItem],
        route: RouteContext,
        point: Coordinates,
        used: &mut UsedLocations,
    ) -> (Schedule, bool) {
        let found: Vec<Vec<PlaceCandidate>> = variables
            .par_iter()
            .map(|variable| {
                let query = PlaceQuery::new(variable.category.query)
                    .near(point, self.config.search_radius_m)
                    .along(route);
                self.search.search(&query).unwrap_or_else(|err| {
                    warn!(error = %err, query = %query.query, "place search failed");
                    Vec::new()
                })
            })
            .collect();

        let mut draft = template.clone();
        let mut modified = false;
        for (variable, candidates) in variables.iter().zip(found) {
            let Some(best) = best_candidate(&candidates, route, used) else {
                continue;
            };
            used.insert(&best.address);
            relocate(&mut draft.fixed_items[variable.index], best);
            modified = true;
        }
        (draft, modified)
    }
}

fn relocate(item: &mut ScheduleItem, candidate: &PlaceCandidate) {
    item.name = candidate.name.clone();
    item.location = candidate.address.clone();
    item.coordinates = candidate.coordinates();
}

/// Direct distance over the distance through `waypoint`: 1.0 on the
/// straight line, smaller the further the detour.
pub fn route_efficiency(start: Coordinates, end: Coordinates, waypoint: Coordinates) -> f64 {
    let detour = haversine_km(start, waypoint) + haversine_km(waypoint, end);
    if detour <= f64::EPSILON {
        return 1.0;
    }
    (haversine_km(start, end) / detour).min(1.0)
}

/// Highest-scoring unused candidate; earlier ranks win ties.
fn best_candidate<'c>(
    candidates: &'c [PlaceCandidate],
    route: RouteContext,
    used: &UsedLocations,
) -> Option<&'c PlaceCandidate> {
    let mut best: Option<(f64, &PlaceCandidate)> = None;
    for candidate in candidates.iter().filter(|c| !used.contains(&c.address)) {
        let score = route_efficiency(route.start, route.end, candidate.coordinates());
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// `name@location` of every fixed item, in order. Well-known brands are
/// keyed on location alone since their branches carry different names.
pub fn option_signature(schedule: &Schedule) -> String {
    schedule
        .fixed_items
        .iter()
        .map(|item| match lexicon::find_category(&item.name) {
            Some(category) if category.well_known_brand => {
                format!("{}@{}", category.keyword, normalize_address(&item.location))
            }
            _ => format!("{}@{}", item.name, normalize_address(&item.location)),
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn dedupe(drafts: Vec<Schedule>) -> Vec<Schedule> {
    let mut seen = HashSet::new();
    drafts
        .into_iter()
        .filter(|draft| seen.insert(option_signature(draft)))
        .collect()
}

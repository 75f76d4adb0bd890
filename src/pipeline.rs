//! End-to-end planning: free text in, itinerary options out.
//!
//! Stages run in a fixed order, each consuming the previous schedule:
//! time resolution, priority assignment, relationship placement, location
//! enrichment, conflict resolution and option generation.

use std::sync::Arc;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::conflict::ConflictResolver;
use crate::geocode::NominatimGeocoder;
use crate::lexicon;
use crate::matrix::MatrixClient;
use crate::model::{Coordinates, OptionSet, Schedule, ScheduleItem};
use crate::options::RouteOptionGenerator;
use crate::osrm::OsrmClient;
use crate::priority::PriorityAssigner;
use crate::relationship::RelationshipEnhancer;
use crate::time_resolver::TimeExpressionResolver;
use crate::traits::{
    Directions, DistanceMatrix, Extractor, Geocoder, LanguageUnderstanding, PlaceQuery, PlaceSearch,
};
use crate::travel::TravelTimeEstimator;

pub struct Planner {
    extractor: Arc<dyn Extractor>,
    places: Arc<dyn PlaceSearch>,
    language: Option<Arc<dyn LanguageUnderstanding>>,
    estimator: TravelTimeEstimator,
    config: PlannerConfig,
}

impl Planner {
    /// Planner with default tunables and the offline travel estimator.
    pub fn new(extractor: Arc<dyn Extractor>, places: Arc<dyn PlaceSearch>) -> Self {
        Self {
            extractor,
            places,
            language: None,
            estimator: TravelTimeEstimator::offline(),
            config: PlannerConfig::default(),
        }
    }

    /// Builds the HTTP travel services described by `config`. A service
    /// whose client cannot be built is left out of the estimator chain.
    pub fn from_config(
        config: PlannerConfig,
        extractor: Arc<dyn Extractor>,
        places: Arc<dyn PlaceSearch>,
    ) -> Self {
        let matrix: Option<Arc<dyn DistanceMatrix>> = if config.matrix.api_key.is_some() {
            MatrixClient::new(config.matrix.clone())
                .map_err(|err| warn!(error = %err, "distance matrix disabled"))
                .ok()
                .map(|client| Arc::new(client) as Arc<dyn DistanceMatrix>)
        } else {
            info!("no distance matrix key, skipping matrix tier");
            None
        };
        let directions = OsrmClient::new(config.directions.clone())
            .map_err(|err| warn!(error = %err, "directions disabled"))
            .ok()
            .map(|client| Arc::new(client) as Arc<dyn Directions>);
        let geocoder = NominatimGeocoder::new(config.geocoder.clone())
            .map_err(|err| warn!(error = %err, "geocoder disabled"))
            .ok()
            .map(|client| Arc::new(client) as Arc<dyn Geocoder>);

        let estimator = TravelTimeEstimator::with_services(matrix, directions, geocoder);
        debug!(tiers = ?estimator.tier_names(), "travel estimator ready");

        Self::new(extractor, places)
            .with_estimator(estimator)
            .with_config(config)
    }

    pub fn with_language(mut self, language: Arc<dyn LanguageUnderstanding>) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_estimator(mut self, estimator: TravelTimeEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Extracts a draft from `text` and plans it. An extraction failure
    /// yields a single empty option.
    pub fn plan(&self, text: &str, now: NaiveDateTime) -> OptionSet {
        match self.extractor.extract(text) {
            Ok(draft) => self.plan_draft(draft, text, now),
            Err(err) => {
                warn!(error = %err, "extraction failed, returning empty itinerary");
                OptionSet::single(Schedule::default())
            }
        }
    }

    pub fn plan_draft(&self, draft: Schedule, text: &str, now: NaiveDateTime) -> OptionSet {
        let language = self.language.as_deref();
        info!(items = draft.len(), "planning itinerary");

        let schedule = TimeExpressionResolver::new(self.config.time_resolver_options())
            .with_language(language)
            .resolve(draft, text, now);
        let schedule = PriorityAssigner::new()
            .with_language(language)
            .assign(schedule, text);
        let schedule = RelationshipEnhancer::new(self.config.relationship_offset_minutes).enhance(schedule, text);
        let schedule = self.enrich_locations(schedule);
        let schedule = ConflictResolver::new(&self.estimator)
            .with_mode(self.config.travel_mode)
            .with_buffer(self.config.conflict_buffer_minutes)
            .resolve(schedule);

        let options = RouteOptionGenerator::new(self.places.as_ref(), self.config.option_generator_config())
            .generate(&schedule);
        info!(options = options.len(), "planning done");
        options
    }

    /// Fills in missing locations from the top place search candidate. Each
    /// search is centered on the closest preceding located item, or the
    /// default coordinates.
    pub fn enrich_locations(&self, schedule: Schedule) -> Schedule {
        let Schedule {
            fixed_items,
            flexible_items,
        } = schedule;
        let fixed_count = fixed_items.len();
        let mut items = fixed_items;
        items.extend(flexible_items);

        let centers = search_centers(&items, self.config.default_coordinates);
        let radius_m = self.config.search_radius_m;

        let found: Vec<_> = items
            .par_iter()
            .zip(centers)
            .map(|(item, center)| {
                if !item.location.trim().is_empty() {
                    return None;
                }
                let query = lexicon::find_category(&item.name)
                    .map(|category| category.query.to_string())
                    .unwrap_or_else(|| item.name.clone());
                let query = PlaceQuery::new(query).near(center, radius_m);
                match self.places.search(&query) {
                    Ok(candidates) => candidates.into_iter().next(),
                    Err(err) => {
                        warn!(error = %err, item = %item.name, "location lookup failed");
                        None
                    }
                }
            })
            .collect();

        let mut enriched = 0;
        for (item, candidate) in items.iter_mut().zip(found) {
            if let Some(candidate) = candidate {
                item.location = candidate.address.clone();
                item.coordinates = candidate.coordinates();
                enriched += 1;
            }
        }
        debug!(enriched, "locations enriched");

        let flexible_items = items.split_off(fixed_count);
        Schedule::new(items, flexible_items)
    }
}

fn search_centers(items: &[ScheduleItem], fallback: Coordinates) -> Vec<Coordinates> {
    let mut center = fallback;
    items
        .iter()
        .map(|item| {
            let current = center;
            if !item.location.trim().is_empty() {
                center = item.coordinates;
            }
            current
        })
        .collect()
}

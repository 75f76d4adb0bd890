//! Fan-out over several place search providers.

use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::warn;

use crate::error::ClientResult;
use crate::traits::{PlaceCandidate, PlaceQuery, PlaceSearch};

/// Queries every provider concurrently and merges their answers.
///
/// Candidates keep provider order, then provider rank. The first candidate
/// seen for an address wins. A failing provider is skipped; the search only
/// fails when every provider does.
#[derive(Clone, Default)]
pub struct FederatedSearch {
    providers: Vec<Arc<dyn PlaceSearch>>,
}

impl FederatedSearch {
    pub fn new(providers: Vec<Arc<dyn PlaceSearch>>) -> Self {
        Self { providers }
    }

    pub fn with_provider(mut self, provider: Arc<dyn PlaceSearch>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl PlaceSearch for FederatedSearch {
    fn search(&self, query: &PlaceQuery) -> ClientResult<Vec<PlaceCandidate>> {
        let answers: Vec<ClientResult<Vec<PlaceCandidate>>> = self
            .providers
            .par_iter()
            .map(|provider| provider.search(query))
            .collect();

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut last_error = None;
        let mut answered = false;

        for answer in answers {
            match answer {
                Ok(candidates) => {
                    answered = true;
                    for candidate in candidates {
                        if seen.insert(normalize_address(&candidate.address)) {
                            merged.push(candidate);
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, query = %query.query, "place provider failed");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if !answered => Err(err),
            _ => Ok(merged),
        }
    }
}

/// Lowercased address with whitespace collapsed.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

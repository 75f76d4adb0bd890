//! Strict priority ordering across fixed and flexible items.
//!
//! Fixed items keep their time order and take priorities `1..=K`. Flexible
//! items are ranked by sequencing keywords, then by order of first mention,
//! then by item order. A final compaction renumbers everything to `1..=N`;
//! only the compacted numbers are meaningful to later stages.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::lexicon::{self, SEQUENCING_KEYWORDS};
use crate::model::{DEFAULT_PRIORITY, Schedule, ScheduleItem};
use crate::traits::{LanguageUnderstanding, PhraseHint, SequencingHint};

#[derive(Default)]
pub struct PriorityAssigner<'a> {
    language: Option<&'a dyn LanguageUnderstanding>,
}

impl<'a> PriorityAssigner<'a> {
    pub fn new() -> Self {
        Self { language: None }
    }

    pub fn with_language(mut self, language: Option<&'a dyn LanguageUnderstanding>) -> Self {
        self.language = language;
        self
    }

    pub fn assign(&self, schedule: Schedule, text: &str) -> Schedule {
        let lowered = text.to_lowercase();
        let keywords = self.sequencing_keywords(text);

        let Schedule {
            mut fixed_items,
            mut flexible_items,
        } = schedule;

        fixed_items.sort_by_key(|item| item.start_time);
        let fixed_count = fixed_items.len() as i32;
        for (rank, item) in fixed_items.iter_mut().enumerate() {
            item.priority = rank as i32 + 1;
        }

        let mut claims = PriorityClaims::seeded(1..=fixed_count);
        let mut resolved = vec![false; flexible_items.len()];

        // Sequencing keywords.
        for (index, item) in flexible_items.iter_mut().enumerate() {
            if let Some(offset) = keyword_offset(&lowered, &item.name, &keywords) {
                item.priority = claims.claim(fixed_count + offset);
                resolved[index] = true;
            }
        }

        // Priorities the extractor already chose.
        for (index, item) in flexible_items.iter_mut().enumerate() {
            if !resolved[index] && item.priority != DEFAULT_PRIORITY {
                item.priority = claims.claim(item.priority);
                resolved[index] = true;
            }
        }

        // Order of first mention.
        let mut mentioned: Vec<(usize, usize)> = flexible_items
            .iter()
            .enumerate()
            .filter(|(index, _)| !resolved[*index])
            .filter_map(|(index, item)| {
                lexicon::first_mention(&lowered, &item.name).map(|position| (position, index))
            })
            .collect();
        mentioned.sort_unstable();
        for (rank, (_, index)) in mentioned.into_iter().enumerate() {
            flexible_items[index].priority = claims.claim(fixed_count + rank as i32 + 1);
            resolved[index] = true;
        }

        // Whatever is left, in item order.
        for (index, item) in flexible_items.iter_mut().enumerate() {
            if !resolved[index] {
                item.priority = claims.claim(fixed_count + 1);
            }
        }

        let mut items = fixed_items;
        items.extend(flexible_items);
        compact(&mut items);
        debug!(items = items.len(), "priorities assigned");

        let mut schedule = Schedule::from_items(items);
        schedule.sort_by_priority();
        schedule
    }

    /// Language-model ordering phrases first, then the static keywords.
    fn sequencing_keywords(&self, text: &str) -> Vec<(String, i32)> {
        let mut keywords = Vec::new();
        if let Some(language) = self.language {
            match language.analyze(text, "sequence") {
                Ok(hints) => keywords.extend(hints.into_iter().filter_map(|(phrase, hint)| match hint {
                    PhraseHint::Sequencing(SequencingHint::Order(offset)) => Some((phrase, offset)),
                    _ => None,
                })),
                Err(err) => warn!(error = %err, "sequence analysis failed, ranking by mention order"),
            }
        }
        keywords.extend(
            SEQUENCING_KEYWORDS
                .iter()
                .map(|(keyword, offset)| (keyword.to_string(), *offset)),
        );
        keywords
    }
}

/// Priorities handed out so far; collisions move up to the next free value.
#[derive(Debug, Default)]
struct PriorityClaims {
    taken: BTreeSet<i32>,
}

impl PriorityClaims {
    fn seeded(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            taken: values.into_iter().collect(),
        }
    }

    fn claim(&mut self, candidate: i32) -> i32 {
        let mut value = candidate.max(1);
        while !self.taken.insert(value) {
            value += 1;
        }
        value
    }
}

/// Offset of the sequencing keyword closest before a mention of the item.
fn keyword_offset(lowered_text: &str, name: &str, keywords: &[(String, i32)]) -> Option<i32> {
    let mentions = lexicon::mention_positions(lowered_text, name);
    if mentions.is_empty() {
        return None;
    }

    let mut best: Option<(usize, i32)> = None;
    for (keyword, offset) in keywords {
        for position in lexicon::keyword_positions(lowered_text, keyword) {
            let after = position + keyword.len();
            let Some(mention) = mentions.iter().find(|&&mention| mention >= after) else {
                continue;
            };
            let distance = mention - after;
            if best.is_none_or(|(closest, _)| distance < closest) {
                best = Some((distance, *offset));
            }
        }
    }
    best.map(|(_, offset)| offset)
}

/// Renumbers priorities to `1..=N`, keeping their relative order. Ties go to
/// the earlier start time, untimed items last.
pub fn compact(items: &mut [ScheduleItem]) {
    items.sort_by_key(|item| (item.priority, item.start_time.is_none(), item.start_time));
    for (rank, item) in items.iter_mut().enumerate() {
        item.priority = rank as i32 + 1;
    }
}

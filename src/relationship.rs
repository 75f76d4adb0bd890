//! Repositions items using "between", "before" and "after" statements.
//!
//! Matching is a best-effort text search for item names around relational
//! keywords, not a parse. A relationship whose anchors cannot be found or
//! lack times is dropped without touching any item.

use chrono::Duration;
use tracing::debug;

use crate::lexicon::{self, RELATION_PHRASES, RelationKeyword, RelationPhrase, SubjectSide};
use crate::model::{Schedule, ScheduleItem};
use crate::priority;

/// Fewer items than this cannot relate to each other.
const MIN_ITEMS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    Before { reference: String },
    After { reference: String },
    Between { first: String, second: String },
}

/// A pairwise statement found in the text, keyed by item ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub subject: String,
    pub kind: RelationKind,
}

#[derive(Debug, Clone)]
pub struct RelationshipEnhancer {
    /// Distance kept from the reference item for before/after.
    pub offset_minutes: i64,
}

impl Default for RelationshipEnhancer {
    fn default() -> Self {
        Self { offset_minutes: 30 }
    }
}

impl RelationshipEnhancer {
    pub fn new(offset_minutes: i64) -> Self {
        Self { offset_minutes }
    }

    pub fn enhance(&self, schedule: Schedule, text: &str) -> Schedule {
        if schedule.len() < MIN_ITEMS {
            return schedule;
        }

        let lowered = text.to_lowercase();
        let mut items = schedule.into_items();
        items.sort_by_key(|item| item.priority);

        let relationships = analyze(&lowered, &items);
        let mut applied = 0;
        for relationship in &relationships {
            if self.apply(&mut items, relationship) {
                applied += 1;
            }
        }
        debug!(found = relationships.len(), applied, "relationships applied");

        priority::compact(&mut items);
        let mut schedule = Schedule::from_items(items);
        schedule.sort_fixed_by_time();
        schedule
    }

    fn apply(&self, items: &mut [ScheduleItem], relationship: &Relationship) -> bool {
        let Some(subject) = position_of(items, &relationship.subject) else {
            return false;
        };
        let max_priority = items.len() as i32;
        let offset = Duration::minutes(self.offset_minutes);

        let (start, priority) = match &relationship.kind {
            RelationKind::Before { reference } => {
                let Some(reference) = position_of(items, reference).map(|index| &items[index]) else {
                    return false;
                };
                let Some(reference_start) = reference.start_time else {
                    return false;
                };
                let end = reference_start - offset;
                (
                    end - Duration::minutes(items[subject].duration_minutes),
                    reference.priority - 1,
                )
            }
            RelationKind::After { reference } => {
                let Some(reference) = position_of(items, reference).map(|index| &items[index]) else {
                    return false;
                };
                let Some(reference_end) = reference.effective_end() else {
                    return false;
                };
                (reference_end + offset, reference.priority + 1)
            }
            RelationKind::Between { first, second } => {
                let (Some(first), Some(second)) = (position_of(items, first), position_of(items, second))
                else {
                    return false;
                };
                let (first, second) = (&items[first], &items[second]);
                let (Some(first_end), Some(second_start)) = (first.effective_end(), second.start_time)
                else {
                    return false;
                };
                let midpoint = first_end + (second_start - first_end) / 2;
                let mean = f64::from(first.priority + second.priority) / 2.0;
                (midpoint, mean.round() as i32)
            }
        };

        let item = &mut items[subject];
        item.schedule_at(start);
        item.priority = priority.clamp(1, max_priority);
        item.promote();
        true
    }
}

fn position_of(items: &[ScheduleItem], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id == id)
}

/// Finds relationships in `text` (already lowercased), in text order.
pub fn analyze(text: &str, items: &[ScheduleItem]) -> Vec<Relationship> {
    let mut found: Vec<(usize, Relationship)> = Vec::new();

    for phrase in RELATION_PHRASES {
        for position in lexicon::keyword_positions(text, phrase.keyword) {
            if phrase.not_after.is_some_and(|prefix| text[..position].ends_with(prefix)) {
                continue;
            }
            if let Some(relationship) = relationship_at(text, items, phrase, position) {
                found.push((position, relationship));
            }
        }
    }

    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, relationship)| relationship).collect()
}

fn relationship_at(
    text: &str,
    items: &[ScheduleItem],
    phrase: &RelationPhrase,
    position: usize,
) -> Option<Relationship> {
    let keyword_end = position + phrase.keyword.len();
    let nearest_before = |exclude: &[&str]| nearest_mention_before(text, items, position, exclude);
    let nearest_after = |exclude: &[&str]| nearest_mention_after(text, items, keyword_end, exclude);

    let (subject, anchor) = match phrase.subject {
        SubjectSide::AfterKeyword => {
            let subject = nearest_after(&[])?;
            (subject, nearest_before(&[subject.id.as_str()])?)
        }
        SubjectSide::BeforeKeyword => {
            let subject = nearest_before(&[])?;
            (subject, nearest_after(&[subject.id.as_str()])?)
        }
    };

    let kind = match phrase.relation {
        RelationKeyword::Before => RelationKind::Before {
            reference: anchor.id.clone(),
        },
        RelationKeyword::After => RelationKind::After {
            reference: anchor.id.clone(),
        },
        RelationKeyword::Between => {
            // Any other timed item serves as the second anchor, even when the
            // text names one explicitly.
            let second = items.iter().find(|item| {
                item.id != subject.id && item.id != anchor.id && item.is_timed()
            })?;
            RelationKind::Between {
                first: anchor.id.clone(),
                second: second.id.clone(),
            }
        }
    };

    Some(Relationship {
        subject: subject.id.clone(),
        kind,
    })
}

fn nearest_mention_before<'i>(
    text: &str,
    items: &'i [ScheduleItem],
    limit: usize,
    exclude: &[&str],
) -> Option<&'i ScheduleItem> {
    items
        .iter()
        .filter(|item| !exclude.contains(&item.id.as_str()))
        .filter_map(|item| {
            lexicon::mention_positions(text, &item.name)
                .into_iter()
                .filter(|&mention| mention < limit)
                .max()
                .map(|mention| (mention, item))
        })
        .max_by_key(|(mention, _)| *mention)
        .map(|(_, item)| item)
}

fn nearest_mention_after<'i>(
    text: &str,
    items: &'i [ScheduleItem],
    from: usize,
    exclude: &[&str],
) -> Option<&'i ScheduleItem> {
    items
        .iter()
        .filter(|item| !exclude.contains(&item.id.as_str()))
        .filter_map(|item| {
            lexicon::mention_positions(text, &item.name)
                .into_iter()
                .find(|&mention| mention >= from)
                .map(|mention| (mention, item))
        })
        .min_by_key(|(mention, _)| *mention)
        .map(|(_, item)| item)
}

//! Resolves vague time phrases ("lunch", "the next one", ...) into windows.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::lexicon::{self, MIDDLE_CONFIDENCE, NEXT_CONFIDENCE};
use crate::model::{Schedule, ScheduleItem};
use crate::traits::{LanguageUnderstanding, PhraseHint, PhraseHints, SequencingHint};

#[derive(Debug, Clone)]
pub struct TimeResolverOptions {
    /// Gap left after every assigned slot.
    pub buffer_minutes: i64,
    /// Items strictly above this confidence become fixed.
    pub promotion_threshold: f32,
}

impl Default for TimeResolverOptions {
    fn default() -> Self {
        Self {
            buffer_minutes: 30,
            promotion_threshold: 0.8,
        }
    }
}

pub struct TimeExpressionResolver<'a> {
    language: Option<&'a dyn LanguageUnderstanding>,
    options: TimeResolverOptions,
}

impl<'a> TimeExpressionResolver<'a> {
    pub fn new(options: TimeResolverOptions) -> Self {
        Self {
            language: None,
            options,
        }
    }

    pub fn with_language(mut self, language: Option<&'a dyn LanguageUnderstanding>) -> Self {
        self.language = language;
        self
    }

    /// Gives every flexible item a time window.
    ///
    /// The reference instant is the end of the latest fixed item, or `now`
    /// when there are none.
    pub fn resolve(&self, schedule: Schedule, text: &str, now: NaiveDateTime) -> Schedule {
        let reference = schedule.latest_fixed_end().unwrap_or(now);
        let hints = self.phrase_hints(text);
        let lowered = text.to_lowercase();
        let names: Vec<String> = schedule.items().map(|item| item.name.to_lowercase()).collect();

        let Schedule {
            fixed_items,
            flexible_items,
        } = schedule;

        let mut cursor = SlotCursor::new(reference, Duration::minutes(self.options.buffer_minutes));
        let mut items = fixed_items;
        let mut promoted = 0;

        for mut item in flexible_items {
            let hint = matching_hint(&hints, &item.name, &lowered, &names);
            let confidence = assign_slot(&mut item, hint, reference.date(), &mut cursor);
            if confidence > self.options.promotion_threshold {
                item.promote();
                promoted += 1;
            }
            items.push(item);
        }

        debug!(promoted, cursor = %cursor.next, "time expressions resolved");

        let mut schedule = Schedule::from_items(items);
        schedule.sort_fixed_by_time();
        schedule
    }

    /// Language-model hints first, then the static lexicon.
    fn phrase_hints(&self, text: &str) -> PhraseHints {
        let mut hints = PhraseHints::new();
        if let Some(language) = self.language {
            match language.analyze(text, "time") {
                Ok(proposed) => hints.extend(proposed),
                Err(err) => warn!(error = %err, "time phrase analysis failed, using static lexicon"),
            }
        }
        hints.extend(lexicon::static_time_hints());
        hints
    }
}

/// Running "last assigned" position. Only ever moves forward.
struct SlotCursor {
    next: NaiveDateTime,
    latest_end: NaiveDateTime,
    buffer: Duration,
}

impl SlotCursor {
    fn new(start: NaiveDateTime, buffer: Duration) -> Self {
        Self {
            next: start,
            latest_end: start,
            buffer,
        }
    }

    /// Start for "the next one": strictly after everything assigned so far.
    fn after_latest(&self) -> NaiveDateTime {
        self.latest_end + self.buffer.max(Duration::minutes(1))
    }

    fn advance_past(&mut self, end: NaiveDateTime) {
        self.latest_end = self.latest_end.max(end);
        self.next = self.next.max(end + self.buffer);
    }
}

/// Hint for one item. Phrases in the item's own name win. Otherwise the
/// clause mentioning the item is searched (the whole message if it is never
/// named), skipping phrases that belong to another item's name. Sequencing
/// phrases only bind when they precede the item's mention.
fn matching_hint(
    hints: &PhraseHints,
    name: &str,
    lowered_text: &str,
    all_names: &[String],
) -> Option<PhraseHint> {
    let own = name.to_lowercase();
    let usable = || {
        hints
            .iter()
            .filter(|(_, hint)| !matches!(hint, PhraseHint::Sequencing(SequencingHint::Order(_))))
    };

    if let Some((_, hint)) = usable().find(|(phrase, _)| own.contains(phrase.as_str())) {
        return Some(*hint);
    }

    let clause = lexicon::clause_mentioning(lowered_text, name).unwrap_or(lowered_text);
    let mention = lexicon::first_mention(clause, name);
    usable()
        .filter(|(phrase, _)| {
            !all_names
                .iter()
                .any(|other| *other != own && other.contains(phrase.as_str()))
        })
        .find(|(phrase, hint)| match hint {
            PhraseHint::Window { .. } => clause.contains(phrase.as_str()),
            PhraseHint::Sequencing(_) => mention.is_some_and(|at| clause[..at].contains(phrase.as_str())),
        })
        .map(|(_, hint)| *hint)
}

/// Assigns a window to `item` and returns the confidence of that choice.
fn assign_slot(item: &mut ScheduleItem, hint: Option<PhraseHint>, day: NaiveDate, cursor: &mut SlotCursor) -> f32 {
    let confidence = match hint {
        Some(PhraseHint::Window {
            start,
            end,
            confidence,
        }) => {
            let start_at = day.and_time(start);
            if item.duration_minutes > 0 {
                item.schedule_at(start_at);
            } else {
                item.duration_minutes = (end - start).num_minutes();
                item.start_time = Some(start_at);
                item.end_time = Some(day.and_time(end));
            }
            confidence
        }
        Some(PhraseHint::Sequencing(SequencingHint::Next)) => {
            item.schedule_at(cursor.after_latest());
            NEXT_CONFIDENCE
        }
        Some(PhraseHint::Sequencing(SequencingHint::Middle)) => {
            item.schedule_at(cursor.next);
            MIDDLE_CONFIDENCE
        }
        Some(PhraseHint::Sequencing(SequencingHint::Order(_))) | None => {
            if !item.is_timed() {
                item.schedule_at(cursor.next);
            } else if item.end_time.is_none() {
                item.end_time = item.effective_end();
            }
            0.0
        }
    };

    if let Some(end) = item.effective_end() {
        cursor.advance_past(end);
    }
    confidence
}

//! Keyword tables consulted by the planner stages.
//!
//! Every table is plain data scanned in order, first match wins. Korean and
//! English phrasings sit side by side; more specific phrases come before the
//! generic ones they contain.

use chrono::NaiveTime;

use crate::traits::{PhraseHint, SequencingHint};

// ============================================================================
// Time phrases
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeEffect {
    /// Clock window on the reference day.
    Window {
        start: (u32, u32),
        end: (u32, u32),
        confidence: f32,
    },
    Next,
    Middle,
}

#[derive(Debug, Clone, Copy)]
pub struct TimePhrase {
    pub keyword: &'static str,
    pub effect: TimeEffect,
}

const fn window(keyword: &'static str, start: (u32, u32), end: (u32, u32), confidence: f32) -> TimePhrase {
    TimePhrase {
        keyword,
        effect: TimeEffect::Window {
            start,
            end,
            confidence,
        },
    }
}

const fn hint(keyword: &'static str, effect: TimeEffect) -> TimePhrase {
    TimePhrase { keyword, effect }
}

/// Confidence attached to "next" anchoring.
pub const NEXT_CONFIDENCE: f32 = 0.85;
/// Confidence attached to "middle" placeholders.
pub const MIDDLE_CONFIDENCE: f32 = 0.5;

pub const TIME_PHRASES: &[TimePhrase] = &[
    hint("the next one", TimeEffect::Next),
    hint("다음 일정", TimeEffect::Next),
    hint("그 다음", TimeEffect::Next),
    hint("다음", TimeEffect::Next),
    hint("next", TimeEffect::Next),
    window("breakfast", (8, 0), (9, 0), 0.9),
    window("아침", (8, 0), (9, 0), 0.85),
    window("brunch", (10, 30), (12, 0), 0.9),
    window("브런치", (10, 30), (12, 0), 0.9),
    window("lunch", (12, 0), (13, 30), 0.9),
    window("점심", (12, 0), (13, 30), 0.9),
    window("dinner", (18, 0), (19, 30), 0.9),
    window("저녁", (18, 0), (19, 30), 0.85),
    window("morning", (9, 0), (12, 0), 0.7),
    window("오전", (9, 0), (12, 0), 0.7),
    window("afternoon", (14, 0), (17, 0), 0.7),
    window("오후", (14, 0), (17, 0), 0.7),
    window("evening", (18, 0), (21, 0), 0.7),
    window("night", (20, 0), (22, 0), 0.6),
    window("밤", (20, 0), (22, 0), 0.6),
    hint("in the middle", TimeEffect::Middle),
    hint("중간에", TimeEffect::Middle),
    hint("사이에", TimeEffect::Middle),
];

impl TimePhrase {
    pub fn hint(&self) -> Option<PhraseHint> {
        match self.effect {
            TimeEffect::Window {
                start,
                end,
                confidence,
            } => Some(PhraseHint::Window {
                start: NaiveTime::from_hms_opt(start.0, start.1, 0)?,
                end: NaiveTime::from_hms_opt(end.0, end.1, 0)?,
                confidence,
            }),
            TimeEffect::Next => Some(PhraseHint::Sequencing(SequencingHint::Next)),
            TimeEffect::Middle => Some(PhraseHint::Sequencing(SequencingHint::Middle)),
        }
    }
}

/// The static time lexicon as phrase hints.
pub fn static_time_hints() -> Vec<(String, PhraseHint)> {
    TIME_PHRASES
        .iter()
        .filter_map(|phrase| phrase.hint().map(|hint| (phrase.keyword.to_string(), hint)))
        .collect()
}

// ============================================================================
// Sequencing keywords
// ============================================================================

/// Keyword -> priority offset past the fixed items.
pub const SEQUENCING_KEYWORDS: &[(&str, i32)] = &[
    ("first", 1),
    ("먼저", 1),
    ("처음", 1),
    ("우선", 1),
    ("after that", 3),
    ("그 후", 3),
    ("then", 2),
    ("next", 2),
    ("다음", 2),
    ("finally", 99),
    ("lastly", 99),
    ("마지막", 99),
];

// ============================================================================
// Relational keywords
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKeyword {
    Between,
    Before,
    After,
}

/// Which side of the keyword names the item being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectSide {
    BeforeKeyword,
    AfterKeyword,
}

#[derive(Debug, Clone, Copy)]
pub struct RelationPhrase {
    pub keyword: &'static str,
    pub relation: RelationKeyword,
    pub subject: SubjectSide,
    /// Text that, directly before the keyword, turns it into another word.
    pub not_after: Option<&'static str>,
}

const fn relation(keyword: &'static str, relation: RelationKeyword, subject: SubjectSide) -> RelationPhrase {
    RelationPhrase {
        keyword,
        relation,
        subject,
        not_after: None,
    }
}

// "X와 Y 사이에 Z", "X 전에 Y": Korean names the moved item after the keyword.
// "Z between X and Y", "Y before X": English names it first.
pub const RELATION_PHRASES: &[RelationPhrase] = &[
    relation("사이", RelationKeyword::Between, SubjectSide::AfterKeyword),
    relation("between", RelationKeyword::Between, SubjectSide::BeforeKeyword),
    RelationPhrase {
        not_after: Some("오"),
        ..relation("전에", RelationKeyword::Before, SubjectSide::AfterKeyword)
    },
    relation("before", RelationKeyword::Before, SubjectSide::BeforeKeyword),
    RelationPhrase {
        not_after: Some("오"),
        ..relation("후에", RelationKeyword::After, SubjectSide::AfterKeyword)
    },
    relation("뒤에", RelationKeyword::After, SubjectSide::AfterKeyword),
    relation("다음에", RelationKeyword::After, SubjectSide::AfterKeyword),
    relation("after", RelationKeyword::After, SubjectSide::BeforeKeyword),
    relation("next", RelationKeyword::After, SubjectSide::AfterKeyword),
];

// ============================================================================
// Brands and categories
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct PlaceCategory {
    pub keyword: &'static str,
    /// What to send to place search.
    pub query: &'static str,
    /// Branches share one display name, so only the address tells them apart.
    pub well_known_brand: bool,
}

const fn brand(keyword: &'static str, query: &'static str) -> PlaceCategory {
    PlaceCategory {
        keyword,
        query,
        well_known_brand: true,
    }
}

const fn category(keyword: &'static str, query: &'static str) -> PlaceCategory {
    PlaceCategory {
        keyword,
        query,
        well_known_brand: false,
    }
}

pub const PLACE_CATEGORIES: &[PlaceCategory] = &[
    brand("스타벅스", "스타벅스"),
    brand("starbucks", "Starbucks"),
    category("이디야", "이디야커피"),
    category("투썸", "투썸플레이스"),
    category("메가커피", "메가커피"),
    category("맥도날드", "맥도날드"),
    category("mcdonald", "McDonald's"),
    category("gs25", "GS25"),
    category("세븐일레븐", "세븐일레븐"),
    category("편의점", "편의점"),
    category("convenience store", "convenience store"),
    category("카페", "카페"),
    category("커피", "카페"),
    category("cafe", "cafe"),
    category("coffee", "coffee"),
    category("베이커리", "베이커리"),
    category("빵집", "베이커리"),
    category("bakery", "bakery"),
    category("점심", "맛집"),
    category("저녁", "맛집"),
    category("식당", "식당"),
    category("lunch", "restaurant"),
    category("dinner", "restaurant"),
    category("restaurant", "restaurant"),
    category("약국", "약국"),
    category("pharmacy", "pharmacy"),
];

pub fn find_category(name: &str) -> Option<&'static PlaceCategory> {
    let name = name.to_lowercase();
    PLACE_CATEGORIES
        .iter()
        .find(|category| name.contains(category.keyword))
}

// ============================================================================
// Text matching
// ============================================================================

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "at", "in", "to", "of", "a", "an", "에서", "하기", "가기",
];

/// Lowercased words of an item name that are worth searching for.
pub fn name_tokens(name: &str) -> Vec<String> {
    let lowered = name.to_lowercase();
    let tokens: Vec<String> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2 && !STOPWORDS.contains(token))
        .map(str::to_string)
        .collect();

    if tokens.is_empty() && !lowered.trim().is_empty() {
        return vec![lowered.trim().to_string()];
    }
    tokens
}

/// Byte offsets in `text` (already lowercased) where any name token occurs.
pub fn mention_positions(text: &str, name: &str) -> Vec<usize> {
    let mut positions: Vec<usize> = name_tokens(name)
        .iter()
        .flat_map(|token| text.match_indices(token.as_str()).map(|(pos, _)| pos))
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

/// First place `name` is mentioned in `text` (already lowercased).
pub fn first_mention(text: &str, name: &str) -> Option<usize> {
    mention_positions(text, name).into_iter().next()
}

/// Clause of `text` (already lowercased) that mentions `name`, if any.
pub fn clause_mentioning<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let position = first_mention(text, name)?;
    let start = text[..position]
        .rfind(is_clause_break)
        .map(|index| index + 1)
        .unwrap_or(0);
    let end = text[position..]
        .find(is_clause_break)
        .map(|index| position + index)
        .unwrap_or(text.len());
    Some(&text[start..end])
}

/// Byte offsets of `keyword` in `text` (already lowercased). ASCII keywords
/// must stand as whole words; Korean keywords may carry attached particles.
pub fn keyword_positions(text: &str, keyword: &str) -> Vec<usize> {
    let whole_word = keyword.is_ascii();
    text.match_indices(keyword)
        .map(|(position, _)| position)
        .filter(|&position| {
            if !whole_word {
                return true;
            }
            let before = text[..position].chars().next_back();
            let after = text[position + keyword.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .collect()
}

fn is_clause_break(c: char) -> bool {
    matches!(c, ',' | '.' | ';' | '\n' | '!' | '?')
}

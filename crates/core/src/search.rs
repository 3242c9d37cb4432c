//! Search & discovery constants and helpers.
//!
//! Sort option parsing, list-filter parsing, and the ranking used by
//! autocomplete suggestions. SQL construction lives in the repository
//! layer; this module only decides *what* to ask for.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum accepted length of a free-text search query.
pub const MAX_QUERY_LENGTH: usize = 100;

/// Default number of autocomplete suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: i64 = 8;

/// Maximum number of autocomplete suggestions.
pub const MAX_SUGGESTION_LIMIT: i64 = 20;

/// Queries shorter than this return no suggestions.
pub const MIN_SUGGESTION_QUERY_LENGTH: usize = 2;

/// Default number of popular categories returned.
pub const DEFAULT_CATEGORY_LIMIT: i64 = 10;

/// Maximum number of popular categories returned.
pub const MAX_CATEGORY_LIMIT: i64 = 50;

/// Default number of suggested professionals.
pub const DEFAULT_SUGGESTED_LIMIT: i64 = 6;

/// Maximum number of suggested professionals.
pub const MAX_SUGGESTED_LIMIT: i64 = 20;

// ---------------------------------------------------------------------------
// Sort options
// ---------------------------------------------------------------------------

text_enum! {
    /// Ordering for professional search. Ties always break by newest first.
    ProfessionalSort("sort option") {
        RateLow => "rate_low",
        RateHigh => "rate_high",
        Rating => "rating",
        Newest => "newest",
        Relevance => "relevance",
    }
}

impl Default for ProfessionalSort {
    fn default() -> Self {
        ProfessionalSort::Relevance
    }
}

text_enum! {
    /// Ordering for event search. Ties always break by newest first.
    EventSort("sort option") {
        Date => "date",
        Budget => "budget",
        Relevance => "relevance",
        Newest => "newest",
    }
}

impl Default for EventSort {
    fn default() -> Self {
        EventSort::Date
    }
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Trim a free-text query; blank input means "no text filter".
///
/// Overlong input is cut at [`MAX_QUERY_LENGTH`] characters.
pub fn normalize_query(query: Option<&str>) -> Option<String> {
    let trimmed = query?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_QUERY_LENGTH).collect())
}

/// Split a comma-separated query parameter (`?skills=a,b`) into values.
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Like [`parse_list`] but upper-cases values, for enum-tag filters such as
/// categories and required roles.
pub fn parse_tag_list(raw: Option<&str>) -> Vec<String> {
    parse_list(raw)
        .into_iter()
        .map(|v| v.to_uppercase())
        .collect()
}

/// Which end of a date filter a bare `YYYY-MM-DD` value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// Midnight at the start of the day.
    Start,
    /// The last instant of the day, so the whole day is included.
    End,
}

/// Parse a date filter given as RFC 3339 or a bare calendar date.
pub fn parse_date_bound(raw: &str, bound: DateBound) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("Invalid date '{raw}'")))?;
    let time = match bound {
        DateBound::Start => date.and_hms_opt(0, 0, 0),
        DateBound::End => date.and_hms_milli_opt(23, 59, 59, 999),
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| CoreError::Validation(format!("Invalid date '{raw}'")))
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

text_enum! {
    SuggestionKind("suggestion kind") {
        Professional => "professional",
        Event => "event",
        Skill => "skill",
        Location => "location",
    }
}

/// A raw suggestion candidate pulled from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionCandidate {
    pub kind: SuggestionKind,
    pub text: String,
    pub entity_id: Option<DbId>,
}

/// A ranked suggestion returned to autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub text: String,
    pub entity_id: Option<DbId>,
    pub score: u8,
}

/// Score how well `text` matches `query` (both compared case-insensitively).
///
/// - 2: the text, or one of its words, starts with the query
/// - 1: the query appears anywhere else
/// - 0: no match
pub fn match_score(query: &str, text: &str) -> u8 {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return 0;
    }
    let t = text.to_lowercase();
    if t.starts_with(&q)
        || t
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.starts_with(&q))
    {
        2
    } else if t.contains(&q) {
        1
    } else {
        0
    }
}

/// Rank candidates for autocomplete.
///
/// Drops non-matches and duplicates (same kind and case-insensitive text),
/// then orders by score, shorter text, and alphabetically.
pub fn rank_suggestions(
    query: &str,
    candidates: Vec<SuggestionCandidate>,
    limit: usize,
) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<Suggestion> = candidates
        .into_iter()
        .filter_map(|c| {
            let score = match_score(query, &c.text);
            if score == 0 || !seen.insert((c.kind, c.text.to_lowercase())) {
                return None;
            }
            Some(Suggestion {
                kind: c.kind,
                text: c.text,
                entity_id: c.entity_id,
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.text.chars().count().cmp(&b.text.chars().count()))
            .then_with(|| compare_ignore_case(&a.text, &b.text))
    });
    ranked.truncate(limit);
    ranked
}

fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

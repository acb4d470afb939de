//! Tiered lexical relevance scoring for local suggestion candidates.
//!
//! Tiers are mutually exclusive and evaluated in priority order, so a higher
//! tier ALWAYS beats a lower one regardless of visit count:
//!
//! 1. naked URL prefix (300, +2000 for root URLs)
//! 2. title leading-boundary prefix (200, +2000 for root URLs)
//! 3. domain substring, queries longer than 2 chars (150)
//! 4. title word prefix, queries longer than 2 chars (100)
//! 5. every query token matches a word (10, +70/+50 first-token boost)
//!
//! A matching score is then scaled by [`TIER_SCALE`] and the visit count is
//! added, making visits a tiebreaker within a tier.

use crate::urls;
use url::Url;

const URL_PREFIX_SCORE: i64 = 300;
const TITLE_PREFIX_SCORE: i64 = 200;
const DOMAIN_SUBSTRING_SCORE: i64 = 150;
const TITLE_WORD_SCORE: i64 = 100;
const ALL_TOKENS_SCORE: i64 = 10;
const FIRST_TOKEN_URL_BOOST: i64 = 70;
const FIRST_TOKEN_TITLE_BOOST: i64 = 50;
const ROOT_URL_BOOST: i64 = 2000;

/// Queries must be longer than this (in chars) for substring tiers
const MIN_SUBSTRING_QUERY_LEN: usize = 2;

/// Visit counts are assumed to stay well below this value
pub const TIER_SCALE: i64 = 1000;

/// Split a query on whitespace, dropping empty tokens
pub fn tokenize(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_string).collect()
}

/// Match at the very start of `text`, or once surrounding non-alphanumeric
/// characters are trimmed. `"\"Cats and Dogs"` leading-boundary starts with `"cats"`
/// once lowercased.
pub fn leading_boundary_starts_with(text: &str, prefix: &str) -> bool {
    text.starts_with(prefix) || text.trim_matches(|c: char| !c.is_alphanumeric()).starts_with(prefix)
}

/// Score one candidate against an already lowercased and trimmed query.
///
/// `query_tokens`, when given, must equal `tokenize(lowercased_query)`; it
/// lets callers scoring many candidates tokenize once.
pub fn score(
    title: Option<&str>,
    url: &Url,
    visit_count: i64,
    lowercased_query: &str,
    query_tokens: Option<&[String]>,
) -> i64 {
    let computed;
    let tokens = match query_tokens {
        Some(tokens) => tokens,
        None => {
            computed = tokenize(lowercased_query);
            &computed
        }
    };
    debug_assert!(tokens.iter().all(|t| !t.is_empty()));

    let lowercased_title = title.map(str::to_lowercase).unwrap_or_default();
    let query_len = lowercased_query.chars().count();
    let domain = urls::domain(url);
    let naked_url = urls::naked_string(url);

    let mut score = 0;
    if naked_url.starts_with(lowercased_query) {
        score += URL_PREFIX_SCORE;
        if urls::is_root(url) {
            score += ROOT_URL_BOOST;
        }
    } else if leading_boundary_starts_with(&lowercased_title, lowercased_query) {
        score += TITLE_PREFIX_SCORE;
        if urls::is_root(url) {
            score += ROOT_URL_BOOST;
        }
    } else if query_len > MIN_SUBSTRING_QUERY_LEN && domain.contains(lowercased_query) {
        score += DOMAIN_SUBSTRING_SCORE;
    } else if query_len > MIN_SUBSTRING_QUERY_LEN && lowercased_title.contains(&format!(" {lowercased_query}")) {
        score += TITLE_WORD_SCORE;
    } else if tokens.len() > 1 {
        let matches_all_tokens = tokens.iter().all(|token| {
            leading_boundary_starts_with(&lowercased_title, token)
                || lowercased_title.contains(&format!(" {token}"))
                || naked_url.starts_with(token.as_str())
        });

        if matches_all_tokens {
            score += ALL_TOKENS_SCORE;
            let first = tokens[0].as_str();
            if naked_url.starts_with(first) {
                score += FIRST_TOKEN_URL_BOOST;
            } else if leading_boundary_starts_with(&lowercased_title, first) {
                score += FIRST_TOKEN_TITLE_BOOST;
            }
        }
    }

    if score > 0 {
        score.saturating_mul(TIER_SCALE).saturating_add(visit_count)
    } else {
        0
    }
}

//! Per-source scoring adapters.
//!
//! Every local source (bookmarks, open tabs, history, internal pages) turns
//! into a [`ScoredSuggestion`] through [`LocalCandidate::scored`]. The query is
//! normalized once into a [`NormalizedQuery`] so tokenization is shared across
//! all candidates of one call.

use crate::interface::{Bookmark, BrowserTab, HistorySuggestion, InternalPage};
use crate::models::{Kind, ScoredSuggestion};
use crate::scoring;
use crate::urls;
use url::Url;

/// A query trimmed, lowercased and tokenized once per ranking call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    lowercased: String,
    tokens: Vec<String>,
}

impl NormalizedQuery {
    pub fn new(raw: &str) -> Self {
        let lowercased = raw.trim().to_lowercase();
        let tokens = scoring::tokenize(&lowercased);
        Self { lowercased, tokens }
    }

    pub fn as_str(&self) -> &str {
        &self.lowercased
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.lowercased.is_empty()
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.lowercased.chars().count()
    }

    pub fn score(&self, title: Option<&str>, url: &Url, visit_count: i64) -> i64 {
        scoring::score(title, url, visit_count, &self.lowercased, Some(&self.tokens))
    }
}

/// A local source record that can be scored against a query
pub trait LocalCandidate {
    /// `None` when the URL is malformed, ignored, or nothing matched
    fn scored(&self, query: &NormalizedQuery, is_url_ignored: &dyn Fn(&Url) -> bool) -> Option<ScoredSuggestion>;
}

/// Shared gate: parse, apply the ignore policy, score, drop non-matches
fn score_url(
    raw_url: &str,
    title: Option<&str>,
    visit_count: i64,
    query: &NormalizedQuery,
    is_url_ignored: &dyn Fn(&Url) -> bool,
) -> Option<(Url, i64)> {
    let url = urls::parse(raw_url)?;
    if is_url_ignored(&url) {
        return None;
    }
    let score = query.score(title, &url, visit_count);
    (score > 0).then_some((url, score))
}

impl LocalCandidate for Bookmark {
    fn scored(&self, query: &NormalizedQuery, is_url_ignored: &dyn Fn(&Url) -> bool) -> Option<ScoredSuggestion> {
        let (url, score) = score_url(&self.url, Some(&self.title), 0, query, is_url_ignored)?;
        let kind = if self.is_favorite { Kind::Favorite } else { Kind::Bookmark };
        Some(ScoredSuggestion::new(kind, url, self.title.clone(), score))
    }
}

impl LocalCandidate for HistorySuggestion {
    fn scored(&self, query: &NormalizedQuery, is_url_ignored: &dyn Fn(&Url) -> bool) -> Option<ScoredSuggestion> {
        let (url, score) = score_url(
            &self.url,
            self.title.as_deref(),
            self.number_of_visits,
            query,
            is_url_ignored,
        )?;
        let mut suggestion =
            ScoredSuggestion::new(Kind::HistoryEntry, url, self.title.clone().unwrap_or_default(), score);
        suggestion.visit_count = self.number_of_visits;
        suggestion.failed_to_load = self.failed_to_load;
        Some(suggestion)
    }
}

impl LocalCandidate for InternalPage {
    fn scored(&self, query: &NormalizedQuery, is_url_ignored: &dyn Fn(&Url) -> bool) -> Option<ScoredSuggestion> {
        let (url, score) = score_url(&self.url, Some(&self.title), 0, query, is_url_ignored)?;
        Some(ScoredSuggestion::new(Kind::InternalPage, url, self.title.clone(), score))
    }
}

impl LocalCandidate for BrowserTab {
    fn scored(&self, query: &NormalizedQuery, is_url_ignored: &dyn Fn(&Url) -> bool) -> Option<ScoredSuggestion> {
        let (url, score) = score_url(&self.url, Some(&self.title), 0, query, is_url_ignored)?;
        let mut suggestion = ScoredSuggestion::new(Kind::BrowserTab, url, self.title.clone(), score);
        suggestion.tab_id = self.tab_id.clone();
        Some(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn never(_: &Url) -> bool {
        false
    }

    #[test]
    fn test_normalized_query() {
        let q = NormalizedQuery::new("  Duck  Tails \n");
        assert_eq!(q.as_str(), "duck  tails");
        assert_eq!(q.tokens(), ["duck", "tails"]);
        assert_eq!(q.len(), 11);
        assert!(NormalizedQuery::new(" \t").is_empty());
    }

    #[test]
    fn test_bookmark_kind_follows_favorite_flag() {
        let q = NormalizedQuery::new("duck");
        let favorite = Bookmark { title: "DuckDuckGo".into(), url: "http://duckduckgo.com".into(), is_favorite: true };
        let plain = Bookmark { is_favorite: false, ..favorite.clone() };
        assert_eq!(favorite.scored(&q, &never).unwrap().kind, Kind::Favorite);
        assert_eq!(plain.scored(&q, &never).unwrap().kind, Kind::Bookmark);
    }

    #[test]
    fn test_relative_bookmark_url_is_dropped() {
        let q = NormalizedQuery::new("spread");
        let bookmark = Bookmark { title: "Spread Privacy".into(), url: "spreadprivacy.com".into(), is_favorite: false };
        assert!(bookmark.scored(&q, &never).is_none());
    }

    #[test]
    fn test_history_carries_visits_and_failure() {
        let q = NormalizedQuery::new("duck");
        let entry = HistorySuggestion {
            title: None,
            url: "http://www.ducktails.com".into(),
            number_of_visits: 100,
            failed_to_load: true,
        };
        let scored = entry.scored(&q, &never).unwrap();
        assert_eq!(scored.kind, Kind::HistoryEntry);
        assert_eq!(scored.visit_count, 100);
        assert!(scored.failed_to_load);
        assert_eq!(scored.score, 2_300_100);
        assert_eq!(scored.title, "");
    }

    #[test]
    fn test_tab_keeps_tab_id() {
        let q = NormalizedQuery::new("duck");
        let tab = BrowserTab { title: "Duck".into(), url: "https://duck.com".into(), tab_id: Some("t1".into()) };
        let scored = tab.scored(&q, &never).unwrap();
        assert_eq!(scored.tab_id.as_deref(), Some("t1"));
        assert_eq!(scored.visit_count, 0);
    }

    #[test]
    fn test_ignored_urls_are_dropped() {
        let q = NormalizedQuery::new("duck");
        let page = InternalPage { title: "Duck Settings".into(), url: "duck://settings".into() };
        assert!(page.scored(&q, &never).is_some());
        assert!(page.scored(&q, &|u: &Url| u.scheme() == "duck").is_none());
    }

    #[test]
    fn test_non_matching_candidate_is_dropped() {
        let q = NormalizedQuery::new("duck");
        let page = InternalPage { title: "Settings".into(), url: "duck://settings".into() };
        assert!(page.scored(&q, &never).is_none());
    }
}

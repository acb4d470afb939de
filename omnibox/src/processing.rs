//! Suggestion ordering and filtering pipeline
//!
//! Takes a query plus history, bookmarks, internal pages, open tabs and an
//! optional remote result, and produces a [`SuggestionResult`]:
//!
//! 1. remote phrases/websites are extracted (ignored URLs dropped)
//! 2. remote websites become top-hit-only candidates
//! 3. local sources are scored, sorted, capped
//! 4. local candidates are deduplicated by naked URL
//! 5. the navigational list is local (by score) followed by remote websites
//! 6-8. top hits are selected, the open-tab case is split, and materialized
//! 9-11. local and search buckets fill the remaining budget
//!
//! Nothing here fails: malformed or unmatched input just contributes nothing.

use crate::candidate::{LocalCandidate, NormalizedQuery};
use crate::config::{BudgetPolicy, DefaultBudgetPolicy, RankingLimits};
use crate::interface::{Bookmark, BrowserTab, HistorySuggestion, InternalPage, Platform, Suggestion, SuggestionResult};
use crate::models::{DedupedSuggestion, Kind, KindSet, ScoredSuggestion};
use crate::remote::RemoteResult;
use crate::urls;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

/// Kinds that may surface as top hits on every platform
const TOP_HIT_KINDS: [Kind; 3] = [Kind::Website, Kind::Favorite, Kind::HistoryEntry];

/// Kinds that, merged with an open tab, trigger the top-hit split
const SPLITTABLE_KINDS: [Kind; 3] = [Kind::HistoryEntry, Kind::Bookmark, Kind::Favorite];

/// Kinds eligible for the "other local suggestions" bucket
const LOCAL_KINDS: [Kind; 5] = [
    Kind::HistoryEntry,
    Kind::Bookmark,
    Kind::Favorite,
    Kind::BrowserTab,
    Kind::InternalPage,
];

pub type UrlIgnoredFn = dyn Fn(&Url) -> bool + Send + Sync;

/// Encapsulates the whole ordering and filtering algorithm for one platform
#[derive(Clone)]
pub struct SuggestionProcessing {
    platform: Platform,
    is_url_ignored: Arc<UrlIgnoredFn>,
    limits: RankingLimits,
    budget: Arc<dyn BudgetPolicy>,
}

impl std::fmt::Debug for SuggestionProcessing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionProcessing")
            .field("platform", &self.platform)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl SuggestionProcessing {
    pub fn new(platform: Platform, is_url_ignored: impl Fn(&Url) -> bool + Send + Sync + 'static) -> Self {
        Self {
            platform,
            is_url_ignored: Arc::new(is_url_ignored),
            limits: RankingLimits::default(),
            budget: Arc::new(DefaultBudgetPolicy),
        }
    }

    /// Processing with no URL ignore policy
    pub fn for_platform(platform: Platform) -> Self {
        Self::new(platform, |_| false)
    }

    pub fn with_limits(mut self, limits: RankingLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_budget_policy(mut self, budget: impl BudgetPolicy + 'static) -> Self {
        self.budget = Arc::new(budget);
        self
    }

    pub fn is_url_ignored(&self, url: &Url) -> bool {
        (self.is_url_ignored)(url)
    }

    pub fn result(
        &self,
        query: &str,
        history: &[HistorySuggestion],
        bookmarks: &[Bookmark],
        internal_pages: &[InternalPage],
        open_tabs: &[BrowserTab],
        remote_result: Option<&RemoteResult>,
    ) -> SuggestionResult {
        let query = NormalizedQuery::new(query);
        if query.is_empty() {
            return SuggestionResult::empty();
        }
        let is_url_ignored = |url: &Url| self.is_url_ignored(url);

        // STEP 1: remote phrases and websites
        let remote_suggestions = remote_result
            .map(|r| r.suggestions(&is_url_ignored))
            .unwrap_or_default();

        // STEP 2: remote websites, eligible for top hits only
        let remote_websites: Vec<DedupedSuggestion> = remote_suggestions
            .iter()
            .filter_map(|s| match s {
                Suggestion::Website { url } => urls::parse(url),
                _ => None,
            })
            .map(|url| DedupedSuggestion::single(ScoredSuggestion::website(url)))
            .collect();

        // STEP 3: best ordered local matches
        let local = self.score_local(&query, history, bookmarks, internal_pages, open_tabs);

        // STEP 4: one representative per URL
        let mut navigational = remove_duplicates(local);

        // STEP 5: local by score, then remote websites unsorted
        navigational.sort_by(|a, b| b.suggestion.score.cmp(&a.suggestion.score));
        navigational.extend(remote_websites);

        // STEP 6: top hits
        let top_hit_entries = self.select_top_hits(&navigational);

        // STEP 7: split a merged open-tab top hit
        let final_top_hits = self.handle_top_hits_open_tab_case(&top_hit_entries);

        // STEP 8: materialize
        let top_hits: Vec<Suggestion> = final_top_hits.iter().map(ScoredSuggestion::to_suggestion).collect();
        let mut taken_keys: HashSet<String> = final_top_hits.iter().map(ScoredSuggestion::dedup_key).collect();

        // STEP 9: budget for the local bucket
        let local_budget = self.budget.local_budget(&self.limits, top_hits.len(), query.len());

        // STEP 10: history, bookmarks, open tabs and internal pages
        let local_entries: Vec<&DedupedSuggestion> = navigational
            .iter()
            .filter(|entry| entry.kinds.intersects(&LOCAL_KINDS))
            .filter(|entry| {
                !taken_keys.contains(&entry.suggestion.dedup_key())
                    && !top_hits.contains(&entry.suggestion.to_suggestion())
            })
            .take(local_budget)
            .collect();
        taken_keys.extend(local_entries.iter().map(|entry| entry.suggestion.dedup_key()));
        let local_suggestions: Vec<Suggestion> =
            local_entries.iter().map(|entry| entry.suggestion.to_suggestion()).collect();

        // STEP 11: remote suggestions not already shown
        let search_budget = self
            .limits
            .maximum_number_of_suggestions
            .saturating_sub(top_hits.len() + local_suggestions.len());
        let search_suggestions: Vec<Suggestion> = remote_suggestions
            .into_iter()
            .filter(|s| !top_hits.contains(s))
            .filter(|s| match s.url().and_then(urls::parse) {
                Some(url) => taken_keys.insert(urls::dedup_key(&url)),
                None => true,
            })
            .take(search_budget)
            .collect();

        tracing::debug!(
            query_len = query.len(),
            navigational = navigational.len(),
            top_hits = top_hits.len(),
            local = local_suggestions.len(),
            search = search_suggestions.len(),
            "ranked suggestions"
        );

        // STEP 12
        SuggestionResult {
            top_hits,
            search_suggestions,
            local_suggestions,
        }
    }

    /// Score every local source, keep matches, order by score, cap the list
    fn score_local(
        &self,
        query: &NormalizedQuery,
        history: &[HistorySuggestion],
        bookmarks: &[Bookmark],
        internal_pages: &[InternalPage],
        open_tabs: &[BrowserTab],
    ) -> Vec<ScoredSuggestion> {
        let is_url_ignored = |url: &Url| self.is_url_ignored(url);
        let mut scored: Vec<ScoredSuggestion> = Vec::new();
        scored.extend(bookmarks.iter().filter_map(|b| b.scored(query, &is_url_ignored)));
        scored.extend(open_tabs.iter().filter_map(|t| t.scored(query, &is_url_ignored)));
        scored.extend(history.iter().filter_map(|h| h.scored(query, &is_url_ignored)));
        scored.extend(internal_pages.iter().filter_map(|p| p.scored(query, &is_url_ignored)));

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.limits.maximum_local_candidates);
        scored
    }

    /// Whether a deduplicated entry may be shown as a top hit
    fn is_top_hit(&self, entry: &DedupedSuggestion) -> bool {
        let kinds = entry.kinds;
        let allowed = kinds.intersects(&TOP_HIT_KINDS)
            || (self.platform == Platform::Mobile && kinds.contains(Kind::Bookmark));
        if !allowed {
            return false;
        }

        // History alone only counts for root domains or frequently visited pages
        if kinds.is_only(Kind::HistoryEntry) {
            let s = &entry.suggestion;
            return !s.failed_to_load && (s.visit_count > 3 || urls::is_root(&s.url));
        }

        if kinds.is_only(Kind::BrowserTab) {
            return false;
        }

        true
    }

    /// First eligible entries in list order, one per URL
    fn select_top_hits<'a>(&self, navigational: &'a [DedupedSuggestion]) -> Vec<&'a DedupedSuggestion> {
        let mut seen = HashSet::new();
        navigational
            .iter()
            .filter(|entry| self.is_top_hit(entry))
            .filter(|entry| seen.insert(entry.suggestion.dedup_key()))
            .take(self.limits.maximum_number_of_top_hits)
            .collect()
    }

    /// If the best top hit is an open tab that is also a visited or saved page,
    /// show both variants, with the navigable non-tab one first.
    fn handle_top_hits_open_tab_case(&self, top_hits: &[&DedupedSuggestion]) -> Vec<ScoredSuggestion> {
        let mut result: Vec<ScoredSuggestion> = top_hits.iter().map(|entry| entry.suggestion.clone()).collect();

        let Some(top_hit) = top_hits.first() else {
            return result;
        };
        if !top_hit.kinds.contains(Kind::BrowserTab) || !top_hit.kinds.intersects(&SPLITTABLE_KINDS) {
            return result;
        }

        let new_kind = if top_hit.suggestion.kind == Kind::BrowserTab {
            top_hit.kinds.best_excluding(Kind::BrowserTab).unwrap_or(Kind::BrowserTab)
        } else {
            Kind::BrowserTab
        };

        let mut split = top_hit.suggestion.clone();
        split.kind = new_kind;
        let index = if new_kind == Kind::BrowserTab { 1 } else { 0 };
        result.insert(index, split);
        result.truncate(self.limits.maximum_number_of_top_hits);
        result
    }
}

/// Group candidates by normalized URL in first-seen order and keep the
/// highest-quality member of each group. Among equal quality the first
/// encountered wins. The representative takes the group's best score, the
/// summed history visit count, and the tab id of any open-tab member.
pub fn remove_duplicates(suggestions: Vec<ScoredSuggestion>) -> Vec<DedupedSuggestion> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<ScoredSuggestion>> = HashMap::new();
    for suggestion in suggestions {
        let key = suggestion.dedup_key();
        groups
            .entry(key)
            .or_insert_with_key(|key| {
                order.push(key.clone());
                Vec::new()
            })
            .push(suggestion);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter_map(merge_group)
        .collect()
}

fn merge_group(group: Vec<ScoredSuggestion>) -> Option<DedupedSuggestion> {
    let kinds: KindSet = group.iter().map(|s| s.kind).collect();
    let visit_count = group
        .iter()
        .filter(|s| s.kind == Kind::HistoryEntry)
        .fold(0i64, |total, s| total.saturating_add(s.visit_count));
    let tab_id = group
        .iter()
        .find(|s| s.kind == Kind::BrowserTab)
        .and_then(|s| s.tab_id.clone());
    let max_score = group.iter().map(|s| s.score).max().unwrap_or(0);

    // `max_by_key` would keep the last maximum
    let mut representative = group
        .into_iter()
        .reduce(|best, s| if s.quality() > best.quality() { s } else { best })?;
    representative.score = max_score;
    representative.visit_count = visit_count;
    representative.tab_id = tab_id;

    Some(DedupedSuggestion {
        suggestion: representative,
        kinds,
    })
}

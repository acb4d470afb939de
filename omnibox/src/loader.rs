//! Asynchronous suggestion loading
//!
//! Reads one snapshot of local sources from a [`SuggestionDataSource`], waits
//! for the remote fetch (at most once per query), and runs the ranking pipeline.
//! The tab the query is typed in is never offered as a switch-to-tab target.
//! A failed fetch only removes remote suggestions; local results still come back.

use crate::config::RankingLimits;
use crate::interface::{BrowserTab, SuggestionDataSource, SuggestionError, SuggestionResult};
use crate::processing::SuggestionProcessing;
use crate::remote::RemoteResult;
use crate::urls;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct SuggestionLoader {
    data_source: Arc<dyn SuggestionDataSource>,
    limits: RankingLimits,
}

impl SuggestionLoader {
    pub fn new(data_source: Arc<dyn SuggestionDataSource>) -> Self {
        Self {
            data_source,
            limits: RankingLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RankingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Load and rank suggestions for `query`.
    ///
    /// Returns `Cancelled` if `token` fires before ranking starts. An empty
    /// query never reaches the remote service.
    pub async fn get_suggestions(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<SuggestionResult, SuggestionError> {
        if token.is_cancelled() {
            return Err(SuggestionError::Cancelled);
        }
        if query.trim().is_empty() {
            return Ok(SuggestionResult::empty());
        }

        let remote = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(SuggestionError::Cancelled),
            fetched = self.data_source.remote_suggestions(query.to_string()) => match fetched {
                Ok(items) => Some(RemoteResult::new(items)),
                Err(e) => {
                    tracing::warn!(error = %e, "remote suggestions unavailable, ranking local sources only");
                    None
                }
            },
        };

        if token.is_cancelled() {
            return Err(SuggestionError::Cancelled);
        }

        #[cfg(feature = "perf-log")]
        let t0 = std::time::Instant::now();

        let source = Arc::clone(&self.data_source);
        let processing = SuggestionProcessing::new(self.data_source.platform(), move |url| {
            source.is_url_ignored(url.as_str().to_string())
        })
        .with_limits(self.limits);

        let history = self.data_source.history();
        let bookmarks = self.data_source.bookmarks();
        let internal_pages = self.data_source.internal_pages();
        let selected_tab_id = self.data_source.selected_tab_id();
        let open_tabs = candidate_tabs(self.data_source.open_tabs(), selected_tab_id.as_deref());

        tracing::debug!(
            history = history.len(),
            bookmarks = bookmarks.len(),
            internal_pages = internal_pages.len(),
            open_tabs = open_tabs.len(),
            remote = remote.as_ref().map_or(0, |r| r.items.len()),
            "loaded suggestion sources"
        );

        let result = processing.result(
            query,
            &history,
            &bookmarks,
            &internal_pages,
            &open_tabs,
            remote.as_ref(),
        );

        #[cfg(feature = "perf-log")]
        eprintln!(
            "[perf] rank={:.1}ms candidates={} results={}",
            t0.elapsed().as_secs_f64() * 1000.0,
            history.len() + bookmarks.len() + internal_pages.len() + open_tabs.len(),
            result.count(),
        );

        Ok(result)
    }
}

/// Open tabs worth suggesting: one per naked URL (first occurrence wins),
/// without the selected tab or other tabs showing the same page.
/// Unparseable URLs pass through.
pub fn candidate_tabs(tabs: Vec<BrowserTab>, selected_tab_id: Option<&str>) -> Vec<BrowserTab> {
    let is_selected = |tab: &BrowserTab| selected_tab_id.is_some() && tab.tab_id.as_deref() == selected_tab_id;
    let mut seen: HashSet<String> = tabs
        .iter()
        .filter(|tab| is_selected(tab))
        .filter_map(|tab| urls::parse(&tab.url))
        .map(|url| urls::dedup_key(&url))
        .collect();
    tabs.into_iter()
        .filter(|tab| !is_selected(tab))
        .filter(|tab| match urls::parse(&tab.url) {
            Some(url) => seen.insert(urls::dedup_key(&url)),
            None => true,
        })
        .collect()
}

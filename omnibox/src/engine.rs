//! SuggestionEngine - Main API for Swift interop
//!
//! Async Cancellation Architecture:
//! When Swift cancels an async Task, UniFFI drops the Rust Future. We intercept this
//! via a DropGuard that triggers a CancellationToken, which aborts a pending
//! remote fetch. Ranking itself is synchronous and short, so it runs inline on
//! whichever executor polls the future; no tokio runtime is required.

use crate::config::RankingLimits;
use crate::interface::{
    Bookmark, BrowserTab, HistorySuggestion, InternalPage, Platform, RemoteSuggestion, SuggestionDataSource,
    SuggestionError, SuggestionResult,
};
use crate::loader::SuggestionLoader;
use crate::processing::SuggestionProcessing;
use crate::remote::RemoteResult;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// RAII guard that cancels a token when dropped.
/// When Swift cancels an async Task, UniFFI drops the Future, which drops this guard,
/// which triggers the cancellation token.
struct DropGuard {
    token: CancellationToken,
}

impl DropGuard {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Address bar suggestion engine bound to one host data source
#[derive(uniffi::Object)]
pub struct SuggestionEngine {
    loader: SuggestionLoader,
}

#[uniffi::export]
impl SuggestionEngine {
    #[uniffi::constructor]
    pub fn new(data_source: Arc<dyn SuggestionDataSource>) -> Self {
        Self {
            loader: SuggestionLoader::new(data_source),
        }
    }

    /// Engine with size limits given as JSON, e.g. `{"maximumNumberOfTopHits": 3}`
    #[uniffi::constructor]
    pub fn with_limits_json(
        data_source: Arc<dyn SuggestionDataSource>,
        limits_json: String,
    ) -> Result<Self, SuggestionError> {
        let limits =
            RankingLimits::from_json(&limits_json).map_err(|e| SuggestionError::InvalidInput(e.to_string()))?;
        Ok(Self {
            loader: SuggestionLoader::new(data_source).with_limits(limits),
        })
    }

    /// Ranked suggestions for the current query.
    ///
    /// Cancelling the calling Task drops this future and aborts the remote fetch.
    pub async fn suggestions(&self, query: String) -> Result<SuggestionResult, SuggestionError> {
        let token = CancellationToken::new();
        let _guard = DropGuard::new(token.clone());
        self.loader.get_suggestions(&query, &token).await
    }
}

/// Rank already-collected sources without a data source.
/// `remote_suggestions` is `None` when the remote service was unavailable.
#[uniffi::export]
pub fn rank_suggestions(
    query: String,
    platform: Platform,
    history: Vec<HistorySuggestion>,
    bookmarks: Vec<Bookmark>,
    internal_pages: Vec<InternalPage>,
    open_tabs: Vec<BrowserTab>,
    remote_suggestions: Option<Vec<RemoteSuggestion>>,
) -> SuggestionResult {
    let remote = remote_suggestions.map(RemoteResult::new);
    SuggestionProcessing::for_platform(platform).result(
        &query,
        &history,
        &bookmarks,
        &internal_pages,
        &open_tabs,
        remote.as_ref(),
    )
}

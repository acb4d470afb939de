//! Omnibox FFI Interface Definition
//!
//! This file defines the public interface exposed to Swift via UniFFI.
//! It acts as the source of truth for shared types.
//!
//! URLs cross the boundary as their absolute string form. Inside the crate
//! they are parsed with the `url` crate; anything that fails to parse simply
//! contributes no suggestion.

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Host platform. Changes whether plain (non-favorite) bookmarks may be top hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, uniffi::Enum)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mobile,
    #[default]
    Desktop,
}

/// A single suggestion as presented to the address bar UI
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum Suggestion {
    Phrase {
        phrase: String,
    },
    Website {
        url: String,
    },
    Bookmark {
        title: String,
        url: String,
        is_favorite: bool,
        score: i64,
    },
    HistoryEntry {
        title: Option<String>,
        url: String,
        score: i64,
    },
    InternalPage {
        title: String,
        url: String,
        score: i64,
    },
    OpenTab {
        title: String,
        url: String,
        tab_id: Option<String>,
        score: i64,
    },
    /// Reserved for external decoders, never produced by ranking
    Unknown {
        value: String,
    },
}

impl Suggestion {
    /// The navigable URL, for variants that carry one
    pub fn url(&self) -> Option<&str> {
        match self {
            Suggestion::Website { url }
            | Suggestion::Bookmark { url, .. }
            | Suggestion::HistoryEntry { url, .. }
            | Suggestion::InternalPage { url, .. }
            | Suggestion::OpenTab { url, .. } => Some(url),
            Suggestion::Phrase { .. } | Suggestion::Unknown { .. } => None,
        }
    }

    /// The display title. Phrases and websites carry none.
    pub fn title(&self) -> Option<&str> {
        match self {
            Suggestion::HistoryEntry { title, .. } => title.as_deref(),
            Suggestion::Bookmark { title, .. }
            | Suggestion::InternalPage { title, .. }
            | Suggestion::OpenTab { title, .. } => Some(title),
            Suggestion::Phrase { .. } | Suggestion::Website { .. } | Suggestion::Unknown { .. } => None,
        }
    }

    pub fn is_history_entry(&self) -> bool {
        matches!(self, Suggestion::HistoryEntry { .. })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// A saved bookmark. `url` is kept as the raw stored string.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct Bookmark {
    pub title: String,
    pub url: String,
    pub is_favorite: bool,
}

/// A browsing history entry
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct HistorySuggestion {
    pub title: Option<String>,
    pub url: String,
    pub number_of_visits: i64,
    pub failed_to_load: bool,
}

/// An application-internal page (settings, bookmarks manager, ...)
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct InternalPage {
    pub title: String,
    pub url: String,
}

/// A currently open browser tab
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct BrowserTab {
    pub title: String,
    pub url: String,
    pub tab_id: Option<String>,
}

/// One item of the remote suggestion service response
#[derive(Debug, Clone, PartialEq, Eq, Default, uniffi::Record)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RemoteSuggestion {
    #[serde(default)]
    pub phrase: Option<String>,
    #[serde(default, rename = "isNav")]
    pub is_nav: Option<bool>,
}

/// Final ranked output, split into presentation buckets
#[derive(Debug, Clone, PartialEq, Eq, Default, uniffi::Record)]
pub struct SuggestionResult {
    pub top_hits: Vec<Suggestion>,
    pub search_suggestions: Vec<Suggestion>,
    pub local_suggestions: Vec<Suggestion>,
}

impl SuggestionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.top_hits.is_empty() && self.search_suggestions.is_empty() && self.local_suggestions.is_empty()
    }

    /// Total number of suggestions across all buckets
    pub fn count(&self) -> usize {
        self.top_hits.len() + self.search_suggestions.len() + self.local_suggestions.len()
    }

    /// All suggestions in presentation order
    pub fn all(&self) -> impl Iterator<Item = &Suggestion> {
        self.top_hits
            .iter()
            .chain(self.search_suggestions.iter())
            .chain(self.local_suggestions.iter())
    }
}

/// Error type for Omnibox operations
#[derive(Debug, Error, uniffi::Error)]
pub enum SuggestionError {
    #[error("Remote suggestions error: {0}")]
    RemoteFetch(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Operation cancelled")]
    Cancelled,
}

// ═══════════════════════════════════════════════════════════════════════════════
// DATA SOURCE INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// Candidate sources and policies supplied by the host application.
/// Implemented in Swift; the engine reads one snapshot per query.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait SuggestionDataSource: Send + Sync {
    fn platform(&self) -> Platform;

    fn history(&self) -> Vec<HistorySuggestion>;

    fn bookmarks(&self) -> Vec<Bookmark>;

    fn internal_pages(&self) -> Vec<InternalPage>;

    fn open_tabs(&self) -> Vec<BrowserTab>;

    /// Tab the query is typed in. It is never offered as a tab to switch to.
    fn selected_tab_id(&self) -> Option<String>;

    /// Malware/blocklist policy for a candidate URL
    fn is_url_ignored(&self, url: String) -> bool;

    /// Fetch remote phrase/navigation suggestions. Called at most once per query.
    async fn remote_suggestions(&self, query: String) -> Result<Vec<RemoteSuggestion>, SuggestionError>;
}

impl From<crate::remote::RemoteDecodeError> for SuggestionError {
    fn from(e: crate::remote::RemoteDecodeError) -> Self {
        SuggestionError::RemoteFetch(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A_URL: &str = "https://www.duckduckgo.com/";

    #[test]
    fn test_only_url_carrying_variants_expose_url() {
        let phrase = Suggestion::Phrase { phrase: "phrase".into() };
        let website = Suggestion::Website { url: A_URL.into() };
        let bookmark = Suggestion::Bookmark { title: "Title".into(), url: A_URL.into(), is_favorite: true, score: 0 };
        let history = Suggestion::HistoryEntry { title: Some("Title".into()), url: A_URL.into(), score: 0 };
        let unknown = Suggestion::Unknown { value: "phrase".into() };

        assert_eq!(phrase.url(), None);
        assert_eq!(website.url(), Some(A_URL));
        assert_eq!(bookmark.url(), Some(A_URL));
        assert_eq!(history.url(), Some(A_URL));
        assert_eq!(unknown.url(), None);
    }

    #[test]
    fn test_only_titled_variants_expose_title() {
        let phrase = Suggestion::Phrase { phrase: "phrase".into() };
        let website = Suggestion::Website { url: A_URL.into() };
        let tab = Suggestion::OpenTab { title: "Tab".into(), url: A_URL.into(), tab_id: Some("tab123".into()), score: 10 };
        let page = Suggestion::InternalPage { title: "Settings".into(), url: "duck://settings".into(), score: 5 };

        assert_eq!(phrase.title(), None);
        assert_eq!(website.title(), None);
        assert_eq!(tab.title(), Some("Tab"));
        assert_eq!(page.title(), Some("Settings"));
    }

    #[test]
    fn test_history_entry_with_nil_title() {
        let suggestion = Suggestion::HistoryEntry { title: None, url: A_URL.into(), score: 7 };
        assert_eq!(suggestion.title(), None);
        assert!(suggestion.is_history_entry());
        assert!(!Suggestion::Unknown { value: "x".into() }.is_history_entry());
    }

    #[test]
    fn test_favorite_flag_distinguishes_bookmarks() {
        let favorite = Suggestion::Bookmark { title: "Fav".into(), url: A_URL.into(), is_favorite: true, score: 15 };
        let regular = Suggestion::Bookmark { title: "Fav".into(), url: A_URL.into(), is_favorite: false, score: 15 };
        assert_ne!(favorite, regular);
    }

    #[test]
    fn test_result_count_and_order() {
        let result = SuggestionResult {
            top_hits: vec![Suggestion::Website { url: A_URL.into() }],
            search_suggestions: vec![Suggestion::Phrase { phrase: "duck".into() }],
            local_suggestions: vec![],
        };
        assert_eq!(result.count(), 2);
        assert!(!result.is_empty());
        assert!(SuggestionResult::empty().is_empty());
        let urls: Vec<_> = result.all().map(|s| s.url()).collect();
        assert_eq!(urls, vec![Some(A_URL), None]);
    }
}

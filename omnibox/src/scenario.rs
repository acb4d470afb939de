//! JSON reference scenarios
//!
//! A scenario file describes the local sources a browser holds, the remote
//! service response, and the suggestions the address bar should show. Used
//! by the integration tests and the `omnibox-scenarios` binary.

use crate::interface::{Bookmark, BrowserTab, HistorySuggestion, Platform, RemoteSuggestion, Suggestion};
use crate::loader::candidate_tabs;
use crate::processing::SuggestionProcessing;
use crate::remote::RemoteResult;
use crate::urls;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub platform: Platform,
    #[serde(default)]
    pub description: String,
    pub input: ScenarioInput,
    pub expectations: Expectations,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    pub query: String,
    #[serde(default)]
    pub bookmarks: Vec<ScenarioBookmark>,
    #[serde(default)]
    pub history: Vec<ScenarioHistoryEntry>,
    #[serde(default)]
    pub pinned_tabs: Vec<ScenarioTab>,
    #[serde(default)]
    pub windows: Vec<ScenarioWindow>,
    #[serde(default)]
    pub api_suggestions: ApiSuggestions,
    #[serde(default)]
    pub ignored_uris: Option<HashSet<String>>,
    #[serde(default)]
    pub tab_id_initiating_search: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioBookmark {
    pub title: String,
    pub uri: String,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioHistoryEntry {
    #[serde(default)]
    pub title: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub visit_count: i64,
    #[serde(default)]
    pub failed_to_load: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum WindowType {
    #[default]
    #[serde(rename = "fullyFeatured")]
    Regular,
    #[serde(rename = "fireWindow")]
    Fire,
    #[serde(rename = "popup")]
    Popup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioWindow {
    #[serde(rename = "type", default)]
    pub window_type: WindowType,
    #[serde(default)]
    pub tabs: Vec<ScenarioTab>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioTab {
    pub tab_id: String,
    pub title: String,
    pub uri: String,
}

/// Remote response: either the suggestion items or an HTTP error
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiSuggestions {
    Suggestions(Vec<RemoteSuggestion>),
    #[serde(rename_all = "camelCase")]
    Error { status_code: u16 },
}

impl Default for ApiSuggestions {
    fn default() -> Self {
        ApiSuggestions::Suggestions(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionType {
    Phrase,
    Website,
    Bookmark,
    Favorite,
    HistoryEntry,
    OpenTab,
    InternalPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedSuggestion {
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    pub score: i64,
}

impl ExpectedSuggestion {
    /// Presentation form of a ranked suggestion; `Unknown` has none
    pub fn from_suggestion(suggestion: &Suggestion) -> Option<Self> {
        let expected = |suggestion_type, title: &str, uri: Option<&str>, tab_id: Option<&String>, score| Self {
            suggestion_type,
            title: title.to_string(),
            subtitle: String::new(),
            uri: uri.map(str::to_string),
            tab_id: tab_id.cloned(),
            score,
        };
        Some(match suggestion {
            Suggestion::Phrase { phrase } => expected(SuggestionType::Phrase, phrase, None, None, 0),
            Suggestion::Website { url } => {
                expected(SuggestionType::Website, strip_scheme(url), Some(url.as_str()), None, 0)
            }
            Suggestion::Bookmark { title, url, is_favorite, score } => {
                let suggestion_type = if *is_favorite { SuggestionType::Favorite } else { SuggestionType::Bookmark };
                expected(suggestion_type, title, Some(url.as_str()), None, *score)
            }
            Suggestion::HistoryEntry { title, url, score } => expected(
                SuggestionType::HistoryEntry,
                title.as_deref().unwrap_or_default(),
                Some(url.as_str()),
                None,
                *score,
            ),
            Suggestion::InternalPage { title, url, score } => {
                expected(SuggestionType::InternalPage, title, Some(url.as_str()), None, *score)
            }
            Suggestion::OpenTab { title, url, tab_id, score } => {
                expected(SuggestionType::OpenTab, title, Some(url.as_str()), tab_id.as_ref(), *score)
            }
            Suggestion::Unknown { .. } => return None,
        })
    }
}

fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectations {
    #[serde(default)]
    pub top_hits: Vec<ExpectedSuggestion>,
    #[serde(default)]
    pub search_suggestions: Vec<ExpectedSuggestion>,
    #[serde(default)]
    pub local_suggestions: Vec<ExpectedSuggestion>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Rank the scenario input on its own platform
    pub fn run(&self) -> Expectations {
        self.run_on(self.platform)
    }

    /// Rank the scenario input as if it came from `platform`
    pub fn run_on(&self, platform: Platform) -> Expectations {
        self.run_with(self.processing(platform))
    }

    pub fn run_with(&self, processing: SuggestionProcessing) -> Expectations {
        let input = &self.input;
        let result = processing.result(
            &input.query,
            &input.history(),
            &input.bookmarks(),
            &[],
            &input.open_tabs(),
            input.remote_result().as_ref(),
        );
        let convert = |suggestions: &[Suggestion]| -> Vec<ExpectedSuggestion> {
            suggestions.iter().filter_map(ExpectedSuggestion::from_suggestion).collect()
        };
        Expectations {
            top_hits: convert(&result.top_hits),
            search_suggestions: convert(&result.search_suggestions),
            local_suggestions: convert(&result.local_suggestions),
        }
    }

    /// Processing configured with this scenario's ignore list
    pub fn processing(&self, platform: Platform) -> SuggestionProcessing {
        let ignored = self.input.ignored_uris.clone().unwrap_or_default();
        SuggestionProcessing::new(platform, move |url| ignored.contains(&urls::naked_string(url)))
    }

    pub fn passes(&self) -> bool {
        self.run() == self.expectations
    }
}

impl ScenarioInput {
    /// Bookmarks ordered by URL, then title, for stable results
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        let mut bookmarks: Vec<Bookmark> = self
            .bookmarks
            .iter()
            .map(|b| Bookmark {
                title: b.title.clone(),
                url: b.uri.clone(),
                is_favorite: b.is_favorite,
            })
            .collect();
        bookmarks.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.title.cmp(&b.title)));
        bookmarks
    }

    pub fn history(&self) -> Vec<HistorySuggestion> {
        self.history
            .iter()
            .map(|h| HistorySuggestion {
                title: h.title.clone(),
                url: h.uri.clone(),
                number_of_visits: h.visit_count,
                failed_to_load: h.failed_to_load.unwrap_or(false),
            })
            .collect()
    }

    /// Pinned tabs followed by window tabs; fire-window tabs are private and
    /// skipped, as is the tab the search was started from
    pub fn open_tabs(&self) -> Vec<BrowserTab> {
        let window_tabs = self
            .windows
            .iter()
            .filter(|w| w.window_type != WindowType::Fire)
            .flat_map(|w| w.tabs.iter());
        let tabs = self
            .pinned_tabs
            .iter()
            .chain(window_tabs)
            .map(|tab| BrowserTab {
                title: tab.title.clone(),
                url: tab.uri.clone(),
                tab_id: Some(tab.tab_id.clone()),
            })
            .collect();
        candidate_tabs(tabs, self.tab_id_initiating_search.as_deref())
    }

    pub fn remote_result(&self) -> Option<RemoteResult> {
        match &self.api_suggestions {
            ApiSuggestions::Suggestions(items) => Some(RemoteResult::new(items.clone())),
            ApiSuggestions::Error { status_code } => {
                tracing::debug!(status_code, "scenario remote service error");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "platform": "mobile",
        "description": "open tab and bookmark for the same page",
        "input": {
            "query": "Duck Tails",
            "tabIdInitiatingSearch": "00000000-0000-0000-0000-000000000000",
            "bookmarks": [{"title": "Duck Tails", "uri": "http://ducktails.com", "isFavorite": false}],
            "history": [],
            "pinnedTabs": [],
            "windows": [{"type": "fullyFeatured", "tabs": [
                {"tabId": "A1", "title": "DuckDuckGo", "uri": "http://duckduckgo.com"},
                {"tabId": "B2", "title": "Duck Tails", "uri": "http://ducktails.com"}
            ]}],
            "apiSuggestions": []
        },
        "expectations": {
            "topHits": [
                {"type": "bookmark", "title": "Duck Tails", "uri": "http://ducktails.com/", "score": 2200000},
                {"type": "openTab", "title": "Duck Tails", "uri": "http://ducktails.com/", "tabId": "B2", "score": 2200000}
            ],
            "searchSuggestions": [],
            "localSuggestions": []
        }
    }"#;

    #[test]
    fn test_decode_and_run_scenario() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        assert_eq!(scenario.platform, Platform::Mobile);
        assert_eq!(scenario.run(), scenario.expectations);
        assert!(scenario.passes());
    }

    #[test]
    fn test_desktop_drops_plain_bookmark_top_hit() {
        let scenario = Scenario::from_json(SCENARIO).unwrap();
        let desktop = scenario.run_on(Platform::Desktop);
        // The bookmark/tab pair is no top hit on desktop
        assert!(desktop.top_hits.is_empty());
        assert_eq!(desktop.local_suggestions.len(), 1);
        assert_eq!(desktop.local_suggestions[0].suggestion_type, SuggestionType::Bookmark);
        assert_eq!(desktop.local_suggestions[0].tab_id, None);
    }

    #[test]
    fn test_api_error_means_no_remote() {
        let json = r#"{"statusCode": 500}"#;
        let api: ApiSuggestions = serde_json::from_str(json).unwrap();
        assert!(matches!(api, ApiSuggestions::Error { status_code: 500 }));

        let api: ApiSuggestions = serde_json::from_str(r#"[{"phrase": "duck", "isNav": false}]"#).unwrap();
        assert!(matches!(api, ApiSuggestions::Suggestions(ref items) if items.len() == 1));
    }

    #[test]
    fn test_ignored_uris_match_naked_url() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.input.ignored_uris = Some(["ducktails.com".to_string()].into_iter().collect());
        let actual = scenario.run();
        assert!(actual.top_hits.is_empty());
        assert!(actual.local_suggestions.is_empty());
    }

    #[test]
    fn test_fire_window_tabs_are_skipped() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.input.windows[0].window_type = WindowType::Fire;
        assert!(scenario.input.open_tabs().is_empty());
    }

    #[test]
    fn test_initiating_tab_is_not_suggested() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        assert_eq!(scenario.input.open_tabs().len(), 2);

        scenario.input.tab_id_initiating_search = Some("B2".into());
        let tabs = scenario.input.open_tabs();
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].tab_id.as_deref(), Some("A1"));

        let actual = scenario.run();
        assert_eq!(actual.top_hits.len(), 1);
        assert_eq!(actual.top_hits[0].suggestion_type, SuggestionType::Bookmark);
        assert!(actual.local_suggestions.is_empty());
    }

    #[test]
    fn test_same_page_as_initiating_tab_is_not_suggested() {
        let mut scenario = Scenario::from_json(SCENARIO).unwrap();
        scenario.input.pinned_tabs.push(ScenarioTab {
            tab_id: "P1".into(),
            title: "Duck Tails".into(),
            uri: "https://www.ducktails.com/".into(),
        });
        scenario.input.tab_id_initiating_search = Some("B2".into());
        let ids: Vec<_> = scenario.input.open_tabs().into_iter().filter_map(|t| t.tab_id).collect();
        assert_eq!(ids, vec!["A1"]);
    }

    #[test]
    fn test_website_title_drops_scheme() {
        let website = Suggestion::Website { url: "http://www.example.com/".into() };
        let expected = ExpectedSuggestion::from_suggestion(&website).unwrap();
        assert_eq!(expected.title, "www.example.com/");
        assert_eq!(expected.score, 0);
        assert!(ExpectedSuggestion::from_suggestion(&Suggestion::Unknown { value: "x".into() }).is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::from_path(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}

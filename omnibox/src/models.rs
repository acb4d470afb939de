//! Internal working records for the ranking pipeline
//!
//! These types are not exported via FFI. A `ScoredSuggestion` is created per
//! candidate per source, rewritten only during deduplication, and turned into
//! an immutable [`Suggestion`] at the end of the pipeline.

use crate::interface::Suggestion;
use url::Url;

// ─────────────────────────────────────────────────────────────────────────────
// KIND
// ─────────────────────────────────────────────────────────────────────────────

/// Source classification of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Phrase,
    Website,
    Bookmark,
    Favorite,
    HistoryEntry,
    InternalPage,
    BrowserTab,
}

impl Kind {
    pub const ALL: [Kind; 7] = [
        Kind::Phrase,
        Kind::Website,
        Kind::Bookmark,
        Kind::Favorite,
        Kind::HistoryEntry,
        Kind::InternalPage,
        Kind::BrowserTab,
    ];

    /// Precedence when several sources describe the same URL (higher wins)
    pub fn quality(self) -> u8 {
        match self {
            Kind::Phrase => 1,
            Kind::Website | Kind::InternalPage => 2,
            Kind::HistoryEntry => 3,
            Kind::BrowserTab => 4,
            Kind::Bookmark => 5,
            Kind::Favorite => 6,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of all kinds merged into one deduplicated suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u8);

impl KindSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn only(kind: Kind) -> Self {
        Self(kind.bit())
    }

    pub fn insert(&mut self, kind: Kind) {
        self.0 |= kind.bit();
    }

    pub fn contains(&self, kind: Kind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn intersects(&self, kinds: &[Kind]) -> bool {
        kinds.iter().any(|k| self.contains(*k))
    }

    /// Exactly `{kind}`
    pub fn is_only(&self, kind: Kind) -> bool {
        self.0 == kind.bit()
    }

    pub fn iter(&self) -> impl Iterator<Item = Kind> + '_ {
        Kind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    /// Highest-quality member other than `excluded`
    pub fn best_excluding(&self, excluded: Kind) -> Option<Kind> {
        self.iter().filter(|k| *k != excluded).max_by_key(|k| k.quality())
    }
}

impl FromIterator<Kind> for KindSet {
    fn from_iter<I: IntoIterator<Item = Kind>>(iter: I) -> Self {
        let mut set = KindSet::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SCORED SUGGESTION
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSuggestion {
    pub kind: Kind,
    pub url: Url,
    pub title: String,
    pub score: i64,
    pub visit_count: i64,
    pub tab_id: Option<String>,
    pub failed_to_load: bool,
}

impl ScoredSuggestion {
    pub fn new(kind: Kind, url: Url, title: String, score: i64) -> Self {
        Self {
            kind,
            url,
            title,
            score,
            visit_count: 0,
            tab_id: None,
            failed_to_load: false,
        }
    }

    /// Remote navigational suggestion; titled with its own URL
    pub fn website(url: Url) -> Self {
        let title = url.as_str().to_string();
        Self::new(Kind::Website, url, title, 0)
    }

    pub fn quality(&self) -> u8 {
        self.kind.quality()
    }

    pub fn dedup_key(&self) -> String {
        crate::urls::dedup_key(&self.url)
    }

    /// Presentation value. History titles come through as `None` when empty.
    pub fn to_suggestion(&self) -> Suggestion {
        let url = self.url.as_str().to_string();
        match self.kind {
            Kind::Phrase => Suggestion::Phrase { phrase: self.title.clone() },
            Kind::Website => Suggestion::Website { url },
            Kind::Bookmark => Suggestion::Bookmark {
                title: self.title.clone(),
                url,
                is_favorite: false,
                score: self.score,
            },
            Kind::Favorite => Suggestion::Bookmark {
                title: self.title.clone(),
                url,
                is_favorite: true,
                score: self.score,
            },
            Kind::HistoryEntry => Suggestion::HistoryEntry {
                title: Some(self.title.clone()).filter(|t| !t.is_empty()),
                url,
                score: self.score,
            },
            Kind::InternalPage => Suggestion::InternalPage {
                title: self.title.clone(),
                url,
                score: self.score,
            },
            Kind::BrowserTab => Suggestion::OpenTab {
                title: self.title.clone(),
                url,
                tab_id: self.tab_id.clone(),
                score: self.score,
            },
        }
    }
}

/// A deduplicated representative together with every kind merged into it
#[derive(Debug, Clone, PartialEq)]
pub struct DedupedSuggestion {
    pub suggestion: ScoredSuggestion,
    pub kinds: KindSet,
}

impl DedupedSuggestion {
    pub fn single(suggestion: ScoredSuggestion) -> Self {
        let kinds = KindSet::only(suggestion.kind);
        Self { suggestion, kinds }
    }
}

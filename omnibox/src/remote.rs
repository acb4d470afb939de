//! Remote suggestion service payload
//!
//! The service answers with a JSON array of `{"phrase": "...", "isNav": true}`
//! items. Some hosts wrap it as `{"items": [...]}`; both shapes decode.

use crate::interface::{RemoteSuggestion, Suggestion};
use crate::urls;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum RemoteDecodeError {
    #[error("Malformed remote suggestions payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Already-resolved remote suggestion response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteResult {
    pub items: Vec<RemoteSuggestion>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Items(Vec<RemoteSuggestion>),
    Wrapped { items: Vec<RemoteSuggestion> },
}

impl RemoteResult {
    pub fn new(items: Vec<RemoteSuggestion>) -> Self {
        Self { items }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, RemoteDecodeError> {
        let items = match serde_json::from_slice::<Payload>(bytes)? {
            Payload::Items(items) | Payload::Wrapped { items } => items,
        };
        Ok(Self { items })
    }

    /// Phrase and website suggestions in service order.
    /// Items without a phrase are skipped; navigational items become
    /// `http://` websites unless the URL is malformed or ignored.
    pub fn suggestions(&self, is_url_ignored: &dyn Fn(&Url) -> bool) -> Vec<Suggestion> {
        self.items
            .iter()
            .filter_map(|item| {
                let phrase = item.phrase.as_deref()?;
                if item.is_nav == Some(true) {
                    let url = urls::navigational_url(phrase)?;
                    if is_url_ignored(&url) {
                        return None;
                    }
                    Some(Suggestion::Website { url: url.into() })
                } else {
                    Some(Suggestion::Phrase { phrase: phrase.to_string() })
                }
            })
            .collect()
    }
}

//! Omnibox Core - Rust suggestion ranking for the browser address bar
//!
//! This library merges history, bookmarks, open tabs, internal pages and remote
//! search suggestions into three ranked buckets: top hits, search suggestions
//! and other local suggestions. Candidates are scored with tiered lexical
//! matching and deduplicated by naked URL.
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum)]).

pub(crate) mod candidate;
pub mod config;
mod engine;
pub mod interface;
pub mod loader;
pub mod models;
pub mod processing;
pub mod remote;
pub mod scenario;
pub mod scoring;
pub mod urls;

pub use engine::{rank_suggestions, SuggestionEngine};
pub use interface::*;

uniffi::setup_scaffolding!("omnibox");

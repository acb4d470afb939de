//! Reference scenarios under tests/fixtures, run end to end

use omnibox::scenario::{Expectations, Scenario, SuggestionType};
use omnibox::Platform;
use std::collections::HashSet;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> Scenario {
    Scenario::from_path(fixtures_dir().join(name)).unwrap()
}

fn all_fixtures() -> Vec<(String, Scenario)> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(fixtures_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    paths
        .into_iter()
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            (name, Scenario::from_path(&p).unwrap())
        })
        .collect()
}

fn pretty(expectations: &Expectations) -> String {
    serde_json::to_string_pretty(expectations).unwrap()
}

#[test]
fn test_all_fixture_scenarios_pass() {
    let fixtures = all_fixtures();
    assert!(fixtures.len() >= 6);
    for (name, scenario) in fixtures {
        let actual = scenario.run();
        assert_eq!(
            actual, scenario.expectations,
            "{name}: {}\nactual:\n{}",
            scenario.description,
            pretty(&actual)
        );
    }
}

#[test]
fn test_fixture_buckets_are_bounded_and_disjoint() {
    for (name, scenario) in all_fixtures() {
        for platform in [Platform::Mobile, Platform::Desktop] {
            let actual = scenario.run_on(platform);
            let total = actual.top_hits.len() + actual.search_suggestions.len() + actual.local_suggestions.len();
            assert!(actual.top_hits.len() <= 2, "{name}");
            assert!(total <= 12, "{name}");

            let top: HashSet<_> = actual.top_hits.iter().filter_map(|s| s.uri.clone()).collect();
            let local: Vec<_> = actual.local_suggestions.iter().filter_map(|s| s.uri.clone()).collect();
            assert!(local.iter().all(|uri| !top.contains(uri)), "{name}: local repeats a top hit");
            assert_eq!(local.iter().collect::<HashSet<_>>().len(), local.len(), "{name}: duplicate local");
        }
    }
}

#[test]
fn test_plain_bookmark_top_hit_depends_on_platform() {
    let scenario = fixture("open-tab-bookmark-mobile.json");
    let mobile = scenario.run_on(Platform::Mobile);
    assert_eq!(mobile.top_hits[0].suggestion_type, SuggestionType::Bookmark);

    let desktop = scenario.run_on(Platform::Desktop);
    assert!(desktop.top_hits.is_empty());
    assert_eq!(desktop.local_suggestions.len(), 1);
}

#[test]
fn test_remote_error_only_drops_search_suggestions() {
    let scenario = fixture("open-tab-history-split.json");
    assert!(scenario.input.remote_result().is_none());
    let actual = scenario.run();
    assert!(actual.search_suggestions.is_empty());
    assert_eq!(actual.top_hits.len(), 2);
}

#[test]
fn test_scores_are_monotonic_within_local_bucket() {
    for (name, scenario) in all_fixtures() {
        let scores: Vec<i64> = scenario.run().local_suggestions.iter().map(|s| s.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{name}: {scores:?}");
    }
}

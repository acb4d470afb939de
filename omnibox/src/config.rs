//! Result-size limits and the local-bucket budget policy

use serde::{Deserialize, Serialize};

pub const MAXIMUM_NUMBER_OF_SUGGESTIONS: usize = 12;
pub const MAXIMUM_NUMBER_OF_TOP_HITS: usize = 2;
pub const MINIMUM_NUMBER_IN_SUGGESTION_GROUP: usize = 5;

/// Cap on scored local candidates kept before deduplication
pub const MAXIMUM_LOCAL_CANDIDATES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingLimits {
    pub maximum_number_of_suggestions: usize,
    pub maximum_number_of_top_hits: usize,
    pub minimum_number_in_suggestion_group: usize,
    pub maximum_local_candidates: usize,
}

impl Default for RankingLimits {
    fn default() -> Self {
        Self {
            maximum_number_of_suggestions: MAXIMUM_NUMBER_OF_SUGGESTIONS,
            maximum_number_of_top_hits: MAXIMUM_NUMBER_OF_TOP_HITS,
            minimum_number_in_suggestion_group: MINIMUM_NUMBER_IN_SUGGESTION_GROUP,
            maximum_local_candidates: MAXIMUM_LOCAL_CANDIDATES,
        }
    }
}

impl RankingLimits {
    /// Parse limits from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// How many history/bookmark/open-tab suggestions to show below the top hits
pub trait BudgetPolicy: Send + Sync {
    fn local_budget(&self, limits: &RankingLimits, top_hit_count: usize, query_len: usize) -> usize;
}

/// Shrinks with more top hits, grows with query length:
/// `min(max - (top_hits + min_group), query_len + 1 - top_hits)`, floored at 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBudgetPolicy;

impl BudgetPolicy for DefaultBudgetPolicy {
    fn local_budget(&self, limits: &RankingLimits, top_hit_count: usize, query_len: usize) -> usize {
        let by_space = limits.maximum_number_of_suggestions as i64
            - (top_hit_count + limits.minimum_number_in_suggestion_group) as i64;
        let by_query = query_len as i64 + 1 - top_hit_count as i64;
        by_space.min(by_query).max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_grows_with_query_length() {
        let limits = RankingLimits::default();
        let policy = DefaultBudgetPolicy;
        assert_eq!(policy.local_budget(&limits, 0, 1), 2);
        assert_eq!(policy.local_budget(&limits, 0, 3), 4);
        assert_eq!(policy.local_budget(&limits, 0, 20), 7);
    }

    #[test]
    fn test_budget_shrinks_with_top_hits() {
        let limits = RankingLimits::default();
        let policy = DefaultBudgetPolicy;
        assert_eq!(policy.local_budget(&limits, 2, 4), 3);
        assert_eq!(policy.local_budget(&limits, 2, 20), 5);
        assert_eq!(policy.local_budget(&limits, 1, 20), 6);
    }

    #[test]
    fn test_budget_never_negative() {
        let limits = RankingLimits {
            maximum_number_of_suggestions: 4,
            ..RankingLimits::default()
        };
        assert_eq!(DefaultBudgetPolicy.local_budget(&limits, 2, 10), 0);
        assert_eq!(DefaultBudgetPolicy.local_budget(&RankingLimits::default(), 2, 0), 0);
    }

    #[test]
    fn test_limits_from_partial_json() {
        let limits = RankingLimits::from_json(r#"{"maximumNumberOfTopHits": 3}"#).unwrap();
        assert_eq!(limits.maximum_number_of_top_hits, 3);
        assert_eq!(limits.maximum_number_of_suggestions, 12);
        assert_eq!(limits.maximum_local_candidates, 100);
    }
}

//! Settlement configuration

use serde::{Deserialize, Serialize};

/// How losers are matched to winners
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Largest debtor pays largest creditor until one side runs out
    #[default]
    Greedy,

    /// Settle equal and opposite positions pairwise first, then run greedy
    /// on whatever is left
    ExactMatchFirst,
}

/// Configuration for settlement behavior
///
/// # Example
/// ```
/// use stac_ledger_core::settlement::{MatchingStrategy, SettlementConfig};
///
/// let config = SettlementConfig::from_json(r#"{"strategy": "exact_match_first"}"#).unwrap();
/// assert_eq!(config.strategy, MatchingStrategy::ExactMatchFirst);
/// assert_eq!(config.mismatch_tolerance, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Matching strategy used to build transfers
    pub strategy: MatchingStrategy,

    /// Largest |mismatch| (cents) still reported as balanced
    pub mismatch_tolerance: i64,
}

impl SettlementConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_strategy(mut self, strategy: MatchingStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

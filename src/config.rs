//! Configuration for grammar construction and matching.
//!
//! [`GrammarOptions`] is fixed when a grammar is built (terminals are compiled
//! against it). [`MatchConfig`] is chosen per parser and can change between
//! parse calls without rebuilding the grammar. Both deserialize from YAML or
//! JSON so host applications can keep them next to their own settings.

use serde::{Deserialize, Serialize};

use crate::errors::{invalid_config, VakyaError};

// ============================================================================
// GRAMMAR OPTIONS
// ============================================================================

/// How terminals compare token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    #[default]
    Insensitive,
    Sensitive,
}

/// Options baked into a grammar at build time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrammarOptions {
    pub case: CaseSensitivity,
}

impl GrammarOptions {
    pub fn case_sensitive() -> Self {
        Self {
            case: CaseSensitivity::Sensitive,
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, VakyaError> {
        serde_yaml::from_str(content).map_err(|e| invalid_config("yaml", content, e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, VakyaError> {
        serde_json::from_str(content).map_err(|e| invalid_config("json", content, e.to_string()))
    }
}

// ============================================================================
// MATCH CONFIG
// ============================================================================

/// Maximum number of noise tokens skipped before any single terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipBudget {
    /// The whole remainder of the input may be skipped.
    #[default]
    Unlimited,
    Limited(usize),
}

impl SkipBudget {
    /// Last position (exclusive) a terminal starting its search at `pos` may test.
    pub fn search_limit(self, pos: usize, len: usize) -> usize {
        match self {
            SkipBudget::Unlimited => len,
            SkipBudget::Limited(n) => pos.saturating_add(n).saturating_add(1).min(len),
        }
    }
}

/// Tie-break between alternatives of a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceOrder {
    /// Alternatives are preferred in the order they were declared.
    #[default]
    Declared,
    /// Alternatives consuming more input come first; declared order breaks ties.
    Longest,
}

/// Whether `Parser::parse` stops at the first root match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    #[default]
    First,
    /// Prefer the root match covering the most input, then the earliest.
    Widest,
}

/// Per-parser matching configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    pub skip_budget: SkipBudget,
    pub choice_order: ChoiceOrder,
    pub mode: ParseMode,
    /// Upper bound on parses yielded by `Parser::parse_all`.
    pub max_parses: Option<usize>,
    /// Upper bound on memoized `(element, position)` entries for one call.
    pub max_memo_entries: Option<usize>,
}

impl MatchConfig {
    pub fn with_skip_budget(mut self, budget: SkipBudget) -> Self {
        self.skip_budget = budget;
        self
    }

    pub fn with_choice_order(mut self, order: ChoiceOrder) -> Self {
        self.choice_order = order;
        self
    }

    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_parses(mut self, max: usize) -> Self {
        self.max_parses = Some(max);
        self
    }

    pub fn with_max_memo_entries(mut self, max: usize) -> Self {
        self.max_memo_entries = Some(max);
        self
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, VakyaError> {
        serde_yaml::from_str(content).map_err(|e| invalid_config("yaml", content, e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, VakyaError> {
        serde_json::from_str(content).map_err(|e| invalid_config("json", content, e.to_string()))
    }
}

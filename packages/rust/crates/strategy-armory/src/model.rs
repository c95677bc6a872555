//! Data model for award configuration and probability tables.
//!
//! Records mirror the persistence-side row shapes; candidates and rules are
//! the slimmer shapes the assembler consumes. Conversions are explicit `From`
//! impls because both field sets are static.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ArmoryError, Result};
use crate::weight_rule::{ParsedWeightRule, parse_weight_rule};

/// Rule model name under which weight rules are configured.
pub const DEFAULT_WEIGHT_RULE_MODEL: &str = "rule_weight";

/// One award eligible for a strategy, with its draw probability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardCandidate {
    /// Award identifier written into table slots.
    pub award_id: i32,
    /// Probability in percent (`0.6` means 0.6%). Must be positive.
    #[serde(alias = "award_rate")]
    pub probability_percent: Decimal,
    /// Free-form rule tags; not interpreted by the assembler.
    #[serde(default, alias = "rule_models", skip_serializing_if = "Option::is_none")]
    pub weight_tags: Option<String>,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_title: Option<String>,
    /// Display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i32>,
}

impl AwardCandidate {
    /// Create a candidate with no tags or display metadata.
    #[must_use]
    pub fn new(award_id: i32, probability_percent: Decimal) -> Self {
        Self {
            award_id,
            probability_percent,
            weight_tags: None,
            award_title: None,
            sort: None,
        }
    }

    /// Reject non-positive probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`ArmoryError::InvalidProbability`] when `probability_percent <= 0`.
    pub fn validate(&self, strategy_id: i64) -> Result<()> {
        if self.probability_percent <= Decimal::ZERO {
            return Err(ArmoryError::InvalidProbability {
                strategy_id,
                award_id: self.award_id,
                rate: self.probability_percent,
            });
        }
        Ok(())
    }
}

/// Strategy award row as persisted by the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrategyAwardRecord {
    /// Owning strategy.
    pub strategy_id: i64,
    /// Award identifier.
    pub award_id: i32,
    /// Award title.
    #[serde(default)]
    pub award_title: Option<String>,
    /// Award subtitle.
    #[serde(default)]
    pub award_subtitle: Option<String>,
    /// Total stock.
    #[serde(default)]
    pub award_count: Option<i32>,
    /// Remaining stock.
    #[serde(default)]
    pub award_count_surplus: Option<i32>,
    /// Probability in percent.
    pub award_rate: Decimal,
    /// Rule models attached to the award.
    #[serde(default)]
    pub rule_models: Option<String>,
    /// Display order.
    #[serde(default)]
    pub sort: Option<i32>,
}

impl From<StrategyAwardRecord> for AwardCandidate {
    fn from(record: StrategyAwardRecord) -> Self {
        Self {
            award_id: record.award_id,
            probability_percent: record.award_rate,
            weight_tags: record.rule_models,
            award_title: record.award_title,
            sort: record.sort,
        }
    }
}

/// Strategy rule row as persisted by the configuration store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StrategyRuleRecord {
    /// Owning strategy.
    pub strategy_id: i64,
    /// Award the rule is scoped to, if any.
    #[serde(default)]
    pub award_id: Option<i32>,
    /// 1 = strategy rule, 2 = award rule.
    #[serde(default)]
    pub rule_type: Option<i32>,
    /// Rule model name (`rule_weight`, `rule_lock`, ...).
    pub rule_model: String,
    /// Raw rule value.
    pub rule_value: String,
    /// Human description.
    #[serde(default)]
    pub rule_desc: Option<String>,
}

/// Weight rule for a strategy: raw `"<key>:<id,id> <key>:<id,...>"` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRule {
    /// Owning strategy.
    pub strategy_id: i64,
    /// Rule model name the rule was stored under.
    pub rule_model: String,
    /// Raw encoded weight groups.
    pub rule_value: String,
}

impl WeightRule {
    /// Create a weight rule under [`DEFAULT_WEIGHT_RULE_MODEL`].
    #[must_use]
    pub fn new(strategy_id: i64, rule_value: impl Into<String>) -> Self {
        Self {
            strategy_id,
            rule_model: DEFAULT_WEIGHT_RULE_MODEL.to_string(),
            rule_value: rule_value.into(),
        }
    }

    /// Parse the encoded groups; malformed segments are reported, not fatal.
    #[must_use]
    pub fn groups(&self) -> ParsedWeightRule {
        parse_weight_rule(&self.rule_value)
    }
}

impl From<StrategyRuleRecord> for WeightRule {
    fn from(record: StrategyRuleRecord) -> Self {
        Self {
            strategy_id: record.strategy_id,
            rule_model: record.rule_model,
            rule_value: record.rule_value,
        }
    }
}

/// Assembled lookup table: slot `n` (1-based) resolves to `slots[n - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbabilityTable {
    slots: Vec<i32>,
}

impl ProbabilityTable {
    /// Wrap an already ordered slot list.
    #[must_use]
    pub fn from_slots(slots: Vec<i32>) -> Self {
        Self { slots }
    }

    /// Total number of slots (the persisted rate range).
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Check if the table has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Award at a 1-based slot.
    #[must_use]
    pub fn award_at(&self, slot: usize) -> Option<i32> {
        slot.checked_sub(1).and_then(|idx| self.slots.get(idx)).copied()
    }

    /// Iterate `(slot, award_id)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, award_id)| (idx + 1, *award_id))
    }

    /// Number of slots held by each award.
    #[must_use]
    pub fn slot_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for award_id in &self.slots {
            *counts.entry(*award_id).or_insert(0) += 1;
        }
        counts
    }
}

//! Cache key layout shared with existing deployments.
//!
//! Formats are fixed; a changed key breaks interoperability with tables
//! assembled by other writers.

/// Baseline slot count: `strategy#<id>#raterange`.
#[must_use]
pub fn rate_range_key(strategy_id: i64) -> String {
    format!("strategy#{strategy_id}#raterange")
}

/// Baseline slot value: `strategy#<id>#assemble#<slot>`.
#[must_use]
pub fn slot_key(strategy_id: i64, slot: u32) -> String {
    format!("strategy#{strategy_id}#assemble#{slot}")
}

/// Weight-tier slot count: `strategy#<id>#raterange#weight#<key>`.
#[must_use]
pub fn rate_range_weight_key(strategy_id: i64, weight_key: &str) -> String {
    format!("strategy#{strategy_id}#raterange#weight#{weight_key}")
}

/// Weight-tier slot value: `strategy#<id>#assemble#weight#<key>#<slot>`.
#[must_use]
pub fn slot_weight_key(strategy_id: i64, weight_key: &str, slot: u32) -> String {
    format!("strategy#{strategy_id}#assemble#weight#{weight_key}#{slot}")
}

/// Award list read-through cache: `strategy#<id>#awardlist`.
#[must_use]
pub fn award_list_key(strategy_id: i64) -> String {
    format!("strategy#{strategy_id}#awardlist")
}

/// Strategy rule cache: `strategy#<id>#rule#<rule_model>`.
#[must_use]
pub fn rule_key(strategy_id: i64, rule_model: &str) -> String {
    format!("strategy#{strategy_id}#rule#{rule_model}")
}

/// Weight tiers assembled by the last assembly: `strategy#<id>#weightkeys`.
///
/// Holds the tier keys separated by spaces; weight keys never contain
/// whitespace.
#[must_use]
pub fn weight_keys_key(strategy_id: i64) -> String {
    format!("strategy#{strategy_id}#weightkeys")
}

/// Key pair addressing one probability table.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TableKeys<'a> {
    Baseline { strategy_id: i64 },
    Weighted { strategy_id: i64, weight_key: &'a str },
}

impl TableKeys<'_> {
    pub(crate) fn strategy_id(self) -> i64 {
        match self {
            Self::Baseline { strategy_id } | Self::Weighted { strategy_id, .. } => strategy_id,
        }
    }

    pub(crate) fn rate_range(self) -> String {
        match self {
            Self::Baseline { strategy_id } => rate_range_key(strategy_id),
            Self::Weighted {
                strategy_id,
                weight_key,
            } => rate_range_weight_key(strategy_id, weight_key),
        }
    }

    pub(crate) fn slot(self, slot: u32) -> String {
        match self {
            Self::Baseline { strategy_id } => slot_key(strategy_id, slot),
            Self::Weighted {
                strategy_id,
                weight_key,
            } => slot_weight_key(strategy_id, weight_key, slot),
        }
    }
}

//! Error types for strategy assembly and dispatch.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::cache::CacheError;

/// Errors surfaced by the assembler, the dispatcher and award sources.
///
/// Malformed weight-rule segments and unassembled tables are not errors:
/// the former are skipped during assembly, the latter yield `None` draws.
#[derive(Error, Debug)]
pub enum ArmoryError {
    /// The award source returned no candidates for the strategy.
    #[error("no award configuration for strategy {strategy_id}")]
    EmptyConfiguration {
        /// Strategy being assembled.
        strategy_id: i64,
    },

    /// A candidate probability is zero or negative.
    #[error("award {award_id} of strategy {strategy_id} has non-positive probability {rate}")]
    InvalidProbability {
        /// Strategy being assembled.
        strategy_id: i64,
        /// Offending award.
        award_id: i32,
        /// Offending probability (percent).
        rate: Decimal,
    },

    /// The computed slot count exceeds [`crate::MAX_SLOT_COUNT`] or the slot index space.
    #[error("rate range {value} of strategy {strategy_id} exceeds the slot limit")]
    RateRangeOverflow {
        /// Strategy being assembled.
        strategy_id: i64,
        /// Computed slot count.
        value: Decimal,
    },

    /// A persisted table has a hole inside its rate range.
    #[error("table of strategy {strategy_id} is missing `{missing_key}`")]
    IncompleteTable {
        /// Strategy read.
        strategy_id: i64,
        /// First missing slot key.
        missing_key: String,
    },

    /// A cache-store call failed.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(#[from] CacheError),

    /// The award source failed to produce configuration.
    #[error("award source failed: {0:#}")]
    AwardSource(anyhow::Error),
}

/// Result type for armory operations.
pub type Result<T> = std::result::Result<T, ArmoryError>;

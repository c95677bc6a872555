//! strategy-armory - Probability table assembly and award dispatch for lottery strategies.
//!
//! Turns a strategy's `(award, probability)` configuration into a shuffled,
//! integer-indexed slot table stored in a key-value cache, then serves
//! uniformly random draws against that table in O(1):
//! - Baseline tables per strategy
//! - Weight-tier tables per `(strategy, weight key)` with rescaled probabilities
//! - Fallback from an unassembled weight tier to the baseline table
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │   StrategyAssembler  │        │  StrategyDispatcher  │
//! │  (per config change) │        │  (per draw request)  │
//! └──────────┬───────────┘        └──────────┬───────────┘
//!            │ AwardSource                   │
//!            ▼                               ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                CacheStore (local / valkey)              │
//! │  strategy#<id>#raterange   strategy#<id>#assemble#<n>   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rust_decimal::Decimal;
//! use strategy_armory::{
//!     AwardCandidate, InMemoryAwardSource, LocalCacheStore, StrategyArmory,
//! };
//!
//! let source = Arc::new(InMemoryAwardSource::new());
//! source.put_awards(
//!     100_001,
//!     vec![
//!         AwardCandidate::new(101, Decimal::new(20, 0)),
//!         AwardCandidate::new(102, Decimal::new(80, 0)),
//!     ],
//! );
//! let armory = StrategyArmory::new(Arc::new(LocalCacheStore::new()), source);
//!
//! let report = armory.assemble(100_001).unwrap();
//! assert_eq!(report.baseline_slots, 5);
//! let award_id = armory.draw(100_001).unwrap();
//! assert!(matches!(award_id, Some(101 | 102)));
//! ```

// ============================================================================
// Core modules
// ============================================================================

mod armory;
mod assembler;
mod cache;
mod dispatcher;
mod error;
mod keys;
mod model;
mod rate;
mod source;
mod weight_rule;

// ============================================================================
// Public exports
// ============================================================================

pub use armory::StrategyArmory;
pub use assembler::{AssemblyReport, SkippedWeightGroup, StrategyAssembler, WeightTierReport};
#[cfg(feature = "valkey")]
pub use cache::ValkeyCacheStore;
pub use cache::{CacheError, CacheStore, LocalCacheStore};
pub use dispatcher::StrategyDispatcher;
pub use error::{ArmoryError, Result};
pub use keys::{
    award_list_key, rate_range_key, rate_range_weight_key, rule_key, slot_key, slot_weight_key,
    weight_keys_key,
};
pub use model::{
    AwardCandidate, DEFAULT_WEIGHT_RULE_MODEL, ProbabilityTable, StrategyAwardRecord,
    StrategyRuleRecord, WeightRule,
};
pub use rate::{MAX_SLOT_COUNT, RateSpace, build_search_table, rescale_to_hundred};
pub use source::{AwardSource, CachedAwardSource, DEFAULT_AWARD_LIST_TTL, InMemoryAwardSource};
pub use weight_rule::{MalformedWeightRule, ParsedWeightRule, WeightGroup, parse_weight_rule};

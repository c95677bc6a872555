//! Shared test fixtures for strategy-armory.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use strategy_armory::{
    AwardCandidate, CacheError, CacheStore, InMemoryAwardSource, LocalCacheStore, StrategyArmory,
    WeightRule,
};

/// Strategy with the four-award baseline (1% / 4% / 15% / 80%).
pub const BASELINE_STRATEGY: i64 = 100_001;
/// Strategy with nine awards and a two-tier weight rule.
pub const WEIGHTED_STRATEGY: i64 = 100_002;
/// Weight rule configured for [`WEIGHTED_STRATEGY`].
pub const WEIGHT_RULE_VALUE: &str = "4000:102,103 6000:102,103,104,105,106,107,108,109";

pub fn rate(value: &str) -> Decimal {
    value.parse().expect("decimal literal")
}

pub fn candidates(pairs: &[(i32, &str)]) -> Vec<AwardCandidate> {
    pairs
        .iter()
        .map(|(award_id, value)| AwardCandidate::new(*award_id, rate(value)))
        .collect()
}

pub fn baseline_candidates() -> Vec<AwardCandidate> {
    candidates(&[(101, "1"), (102, "4"), (103, "15"), (104, "80")])
}

pub fn weighted_candidates() -> Vec<AwardCandidate> {
    candidates(&[
        (101, "1"),
        (102, "2"),
        (103, "3"),
        (104, "4"),
        (105, "10"),
        (106, "10"),
        (107, "20"),
        (108, "20"),
        (109, "30"),
    ])
}

/// Local cache, in-memory source, and an armory over both.
pub struct Fixture {
    pub cache: Arc<LocalCacheStore>,
    pub source: Arc<InMemoryAwardSource>,
    pub armory: StrategyArmory,
}

pub fn fixture() -> Fixture {
    let cache = Arc::new(LocalCacheStore::new());
    let source = Arc::new(InMemoryAwardSource::new());
    source.put_awards(BASELINE_STRATEGY, baseline_candidates());
    source.put_awards(WEIGHTED_STRATEGY, weighted_candidates());
    source.put_rule(WeightRule::new(WEIGHTED_STRATEGY, WEIGHT_RULE_VALUE));
    let armory = StrategyArmory::new(cache.clone(), source.clone());
    Fixture {
        cache,
        source,
        armory,
    }
}

/// Cache store whose every call fails.
pub struct UnavailableCacheStore;

impl UnavailableCacheStore {
    fn error() -> CacheError {
        CacheError::Unavailable {
            backend: "unavailable",
            reason: "connection refused".to_string(),
        }
    }
}

impl CacheStore for UnavailableCacheStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    fn set_int(&self, _key: &str, _value: i64) -> Result<(), CacheError> {
        Err(Self::error())
    }

    fn get_int(&self, _key: &str) -> Result<Option<i64>, CacheError> {
        Err(Self::error())
    }

    fn set_text(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Err(Self::error())
    }

    fn get_text(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(Self::error())
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(Self::error())
    }
}

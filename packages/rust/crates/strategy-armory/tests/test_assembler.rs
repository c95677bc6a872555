//! StrategyAssembler tests.

mod common;

use std::sync::Arc;

use common::{
    BASELINE_STRATEGY, UnavailableCacheStore, WEIGHTED_STRATEGY, baseline_candidates, candidates,
    fixture, weighted_candidates,
};
use strategy_armory::{
    ArmoryError, CacheStore, InMemoryAwardSource, LocalCacheStore, StrategyArmory, WeightRule,
    rate_range_key, rate_range_weight_key, slot_key, weight_keys_key,
};

#[test]
fn test_assemble_baseline_persists_rate_range_and_slots() {
    let fx = fixture();

    let report = fx.armory.assemble(BASELINE_STRATEGY).unwrap();

    assert_eq!(report.baseline_slots, 100);
    assert!(!report.has_weight_rule);
    assert!(report.weight_tiers.is_empty());
    assert_eq!(
        fx.cache.get_int(&rate_range_key(BASELINE_STRATEGY)).unwrap(),
        Some(100)
    );
    for slot in 1..=100 {
        let award_id = fx.cache.get_int(&slot_key(BASELINE_STRATEGY, slot)).unwrap();
        assert!(matches!(award_id, Some(101..=104)), "slot {slot}: {award_id:?}");
    }
    assert_eq!(fx.cache.get_int(&slot_key(BASELINE_STRATEGY, 101)).unwrap(), None);
}

#[test]
fn test_loaded_table_keeps_slot_counts() {
    let fx = fixture();
    fx.armory.assemble(BASELINE_STRATEGY).unwrap();

    let table = fx.armory.load_table(BASELINE_STRATEGY, None).unwrap().unwrap();
    let counts = table.slot_counts();

    assert_eq!(table.slot_count(), 100);
    assert_eq!(counts.get(&101), Some(&1));
    assert_eq!(counts.get(&102), Some(&4));
    assert_eq!(counts.get(&103), Some(&15));
    assert_eq!(counts.get(&104), Some(&80));
}

#[test]
fn test_assemble_weighted_tiers() {
    let fx = fixture();

    let report = fx.armory.assemble(WEIGHTED_STRATEGY).unwrap();

    assert_eq!(report.baseline_slots, 100);
    assert!(report.has_weight_rule);
    assert!(report.skipped.is_empty());
    // 4000: {102: 40%, 103: 60%} -> range 3, slots ceil(1.2) + ceil(1.8)
    assert_eq!(report.tier_slots("4000"), Some(4));
    assert!(report.tier_slots("6000").is_some());
    assert_eq!(
        fx.cache
            .get_int(&rate_range_weight_key(WEIGHTED_STRATEGY, "4000"))
            .unwrap(),
        Some(4)
    );

    let tier = fx
        .armory
        .load_table(WEIGHTED_STRATEGY, Some("4000"))
        .unwrap()
        .unwrap();
    let counts = tier.slot_counts();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts.get(&102), Some(&2));
    assert_eq!(counts.get(&103), Some(&2));

    let wide = fx
        .armory
        .load_table(WEIGHTED_STRATEGY, Some("6000"))
        .unwrap()
        .unwrap();
    let ids: Vec<i32> = wide.slot_counts().into_keys().collect();
    assert_eq!(ids, vec![102, 103, 104, 105, 106, 107, 108, 109]);
}

#[test]
fn test_empty_configuration_writes_nothing() {
    let fx = fixture();

    let error = fx.armory.assemble(999_999).unwrap_err();

    assert!(matches!(
        error,
        ArmoryError::EmptyConfiguration {
            strategy_id: 999_999
        }
    ));
    assert!(fx.cache.is_empty());
}

#[test]
fn test_invalid_probability_writes_nothing() {
    let fx = fixture();
    fx.source
        .put_awards(7, candidates(&[(1, "50"), (2, "0"), (3, "50")]));

    let error = fx.armory.assemble(7).unwrap_err();

    assert!(matches!(
        error,
        ArmoryError::InvalidProbability {
            strategy_id: 7,
            award_id: 2,
            ..
        }
    ));
    assert!(fx.cache.keys_with_prefix("strategy#7#").is_empty());
}

#[test]
fn test_oversized_rate_range_writes_nothing() {
    let fx = fixture();
    fx.source
        .put_awards(10, candidates(&[(1, "0.0000001"), (2, "100")]));

    let error = fx.armory.assemble(10).unwrap_err();

    assert!(matches!(
        error,
        ArmoryError::RateRangeOverflow {
            strategy_id: 10,
            ..
        }
    ));
    assert!(fx.cache.keys_with_prefix("strategy#10#").is_empty());
}

#[test]
fn test_assembled_tiers_are_recorded() {
    let fx = fixture();

    fx.armory.assemble(WEIGHTED_STRATEGY).unwrap();

    assert_eq!(
        fx.cache
            .get_text(&weight_keys_key(WEIGHTED_STRATEGY))
            .unwrap()
            .as_deref(),
        Some("4000 6000")
    );
    fx.armory.assemble(BASELINE_STRATEGY).unwrap();
    assert_eq!(
        fx.cache
            .get_text(&weight_keys_key(BASELINE_STRATEGY))
            .unwrap(),
        None
    );
}

#[test]
fn test_malformed_and_unmatched_groups_are_skipped() {
    let fx = fixture();
    fx.source.put_awards(8, weighted_candidates());
    fx.source
        .put_rule(WeightRule::new(8, "4000:102,103 bogus 5000:abc 7000:900,901"));

    let report = fx.armory.assemble(8).unwrap();

    assert_eq!(report.weight_tiers.len(), 1);
    assert_eq!(report.tier_slots("4000"), Some(4));
    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.weight_key.as_str()).collect();
    assert_eq!(skipped, vec!["bogus", "5000:abc", "7000"]);
    assert_eq!(
        fx.cache.get_int(&rate_range_weight_key(8, "7000")).unwrap(),
        None
    );
}

#[test]
fn test_custom_weight_rule_model() {
    let cache = Arc::new(LocalCacheStore::new());
    let source = Arc::new(InMemoryAwardSource::new());
    source.put_awards(9, weighted_candidates());
    source.put_rule(WeightRule {
        strategy_id: 9,
        rule_model: "rule_points".to_string(),
        rule_value: "4000:102,103".to_string(),
    });

    let default_model = StrategyArmory::new(cache.clone(), source.clone());
    assert!(!default_model.assemble(9).unwrap().has_weight_rule);

    let custom = StrategyArmory::new(cache, source).with_weight_rule_model("rule_points");
    let report = custom.assemble(9).unwrap();
    assert!(report.has_weight_rule);
    assert_eq!(report.tier_slots("4000"), Some(4));
}

#[test]
fn test_reassembly_keeps_slot_counts() {
    let fx = fixture();

    fx.armory.assemble(BASELINE_STRATEGY).unwrap();
    let first = fx.armory.load_table(BASELINE_STRATEGY, None).unwrap().unwrap();
    fx.armory.assemble(BASELINE_STRATEGY).unwrap();
    let second = fx.armory.load_table(BASELINE_STRATEGY, None).unwrap().unwrap();

    assert_eq!(first.slot_count(), second.slot_count());
    assert_eq!(first.slot_counts(), second.slot_counts());
}

#[test]
fn test_reassembly_replaces_rate_range() {
    let fx = fixture();
    fx.armory.assemble(BASELINE_STRATEGY).unwrap();

    fx.source
        .put_awards(BASELINE_STRATEGY, candidates(&[(201, "50"), (202, "50")]));
    let report = fx.armory.assemble(BASELINE_STRATEGY).unwrap();

    assert_eq!(report.baseline_slots, 2);
    let table = fx.armory.load_table(BASELINE_STRATEGY, None).unwrap().unwrap();
    let ids: Vec<i32> = table.slot_counts().into_keys().collect();
    assert_eq!(ids, vec![201, 202]);
}

#[test]
fn test_cache_failure_is_surfaced() {
    let source = Arc::new(InMemoryAwardSource::new());
    source.put_awards(BASELINE_STRATEGY, baseline_candidates());
    let armory = StrategyArmory::new(Arc::new(UnavailableCacheStore), source);

    let error = armory.assemble(BASELINE_STRATEGY).unwrap_err();

    assert!(matches!(error, ArmoryError::CacheUnavailable(_)));
}

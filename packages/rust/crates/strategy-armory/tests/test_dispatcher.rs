//! StrategyDispatcher tests.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{
    BASELINE_STRATEGY, UnavailableCacheStore, WEIGHTED_STRATEGY, candidates, fixture,
    weighted_candidates,
};
use strategy_armory::{
    ArmoryError, CacheStore, StrategyDispatcher, WeightRule, rate_range_key,
    rate_range_weight_key, slot_key, slot_weight_key,
};

const DRAWS: usize = 1_000;

fn drawn(mut draw: impl FnMut() -> Option<i32>) -> BTreeSet<i32> {
    (0..DRAWS)
        .map(|_| draw().expect("assembled table yields an award"))
        .collect()
}

#[test]
fn test_unassembled_strategy_draws_none() {
    let fx = fixture();

    assert_eq!(fx.armory.draw(999_999).unwrap(), None);
    assert_eq!(fx.armory.draw_weighted(999_999, "4000").unwrap(), None);
    assert_eq!(fx.armory.load_table(999_999, None).unwrap(), None);
    assert_eq!(fx.armory.dispatcher().slot_count(999_999, None).unwrap(), 0);
}

#[test]
fn test_baseline_draws_stay_in_configured_awards() {
    let fx = fixture();
    fx.armory.assemble(BASELINE_STRATEGY).unwrap();

    let ids = drawn(|| fx.armory.draw(BASELINE_STRATEGY).unwrap());

    assert!(ids.iter().all(|id| (101..=104).contains(id)), "{ids:?}");
    // 80% of the table; missing it in 1000 draws is practically impossible.
    assert!(ids.contains(&104));
}

#[test]
fn test_weight_tiers_restrict_draws() {
    let fx = fixture();
    fx.armory.assemble(WEIGHTED_STRATEGY).unwrap();

    let narrow = drawn(|| fx.armory.draw_weighted(WEIGHTED_STRATEGY, "4000").unwrap());
    assert_eq!(narrow, BTreeSet::from([102, 103]));

    let wide = drawn(|| fx.armory.draw_weighted(WEIGHTED_STRATEGY, "6000").unwrap());
    assert!(wide.iter().all(|id| (102..=109).contains(id)), "{wide:?}");
    assert!(!wide.contains(&101));
}

#[test]
fn test_unknown_weight_key_falls_back_to_baseline() {
    let fx = fixture();
    fx.armory.assemble(WEIGHTED_STRATEGY).unwrap();

    let ids = drawn(|| fx.armory.draw_weighted(WEIGHTED_STRATEGY, "9999").unwrap());

    assert!(ids.iter().all(|id| (101..=109).contains(id)), "{ids:?}");
    // 105..=109 hold 90% of the baseline table between them.
    for award_id in 105..=109 {
        assert!(ids.contains(&award_id), "award {award_id} never drawn");
    }
    assert_eq!(
        fx.armory
            .dispatcher()
            .slot_count(WEIGHTED_STRATEGY, Some("9999"))
            .unwrap(),
        0
    );
}

#[test]
fn test_skipped_group_falls_back_to_baseline() {
    let fx = fixture();
    fx.source.put_awards(11, weighted_candidates());
    fx.source
        .put_rule(WeightRule::new(11, "4000:102,103 7000:900"));
    let report = fx.armory.assemble(11).unwrap();
    assert_eq!(report.skipped.len(), 1);

    let ids = drawn(|| fx.armory.draw_weighted(11, "7000").unwrap());

    assert!(ids.iter().any(|id| !(102..=103).contains(id)), "{ids:?}");
}

#[test]
fn test_tier_skipped_on_reassembly_falls_back_to_baseline() {
    let fx = fixture();
    fx.source.put_awards(21, weighted_candidates());
    fx.source.put_rule(WeightRule::new(21, "4000:102,103"));
    fx.armory.assemble(21).unwrap();
    let narrow = drawn(|| fx.armory.draw_weighted(21, "4000").unwrap());
    assert_eq!(narrow, BTreeSet::from([102, 103]));

    fx.source.put_rule(WeightRule::new(21, "4000:900"));
    let report = fx.armory.assemble(21).unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].weight_key, "4000");

    assert_eq!(fx.armory.dispatcher().slot_count(21, Some("4000")).unwrap(), 0);
    let ids = drawn(|| fx.armory.draw_weighted(21, "4000").unwrap());
    assert!(ids.iter().any(|id| !(102..=103).contains(id)), "{ids:?}");
}

#[test]
fn test_removed_rule_retires_weight_tiers() {
    let fx = fixture();
    fx.source.put_awards(22, weighted_candidates());
    fx.source.put_rule(WeightRule::new(22, "4000:102,103"));
    fx.armory.assemble(22).unwrap();

    fx.source.remove_rule(22, "rule_weight");
    let report = fx.armory.assemble(22).unwrap();
    assert!(!report.has_weight_rule);

    assert_eq!(fx.armory.dispatcher().slot_count(22, Some("4000")).unwrap(), 0);
    let ids = drawn(|| fx.armory.draw_weighted(22, "4000").unwrap());
    assert!(ids.iter().any(|id| !(102..=103).contains(id)), "{ids:?}");
}

#[test]
fn test_tier_dropped_from_rule_is_retired() {
    let fx = fixture();
    fx.source.put_awards(23, weighted_candidates());
    fx.source
        .put_rule(WeightRule::new(23, "4000:102,103 6000:107,108"));
    fx.armory.assemble(23).unwrap();

    fx.source.put_rule(WeightRule::new(23, "6000:107,108"));
    let report = fx.armory.assemble(23).unwrap();
    assert!(report.skipped.is_empty());

    let dispatcher = fx.armory.dispatcher();
    assert_eq!(dispatcher.slot_count(23, Some("4000")).unwrap(), 0);
    assert!(dispatcher.slot_count(23, Some("6000")).unwrap() > 0);
    let kept = drawn(|| fx.armory.draw_weighted(23, "6000").unwrap());
    assert_eq!(kept, BTreeSet::from([107, 108]));
}

#[test]
fn test_single_award_always_wins() {
    let fx = fixture();
    fx.source.put_awards(12, candidates(&[(501, "0.5")]));
    let report = fx.armory.assemble(12).unwrap();
    assert_eq!(report.baseline_slots, 1);

    let ids = drawn(|| fx.armory.draw(12).unwrap());

    assert_eq!(ids, BTreeSet::from([501]));
}

#[test]
fn test_partial_table_yields_none_and_incomplete_error() {
    let fx = fixture();
    fx.cache.set_int(&rate_range_key(13), 3).unwrap();

    assert_eq!(fx.armory.draw(13).unwrap(), None);
    let error = fx.armory.load_table(13, None).unwrap_err();
    assert!(matches!(
        error,
        ArmoryError::IncompleteTable { strategy_id: 13, ref missing_key }
            if missing_key == &slot_key(13, 1)
    ));
}

#[test]
fn test_weighted_table_reads_independent_keys() {
    let fx = fixture();
    fx.cache
        .set_int(&rate_range_weight_key(14, "100"), 2)
        .unwrap();
    fx.cache.set_int(&slot_weight_key(14, "100", 1), 7).unwrap();
    fx.cache.set_int(&slot_weight_key(14, "100", 2), 7).unwrap();

    assert_eq!(fx.armory.draw_weighted(14, "100").unwrap(), Some(7));
    let table = fx.armory.load_table(14, Some("100")).unwrap().unwrap();
    assert_eq!(table.slot_count(), 2);
    // Baseline was never written.
    assert_eq!(fx.armory.load_table(14, None).unwrap(), None);
}

#[test]
fn test_non_integer_slot_is_a_cache_error() {
    let fx = fixture();
    fx.cache.set_int(&rate_range_key(15), 1).unwrap();
    fx.cache
        .set_text(&slot_key(15, 1), "not-an-award", None)
        .unwrap();

    let error = fx.armory.draw(15).unwrap_err();

    assert!(matches!(error, ArmoryError::CacheUnavailable(_)));
}

#[test]
fn test_cache_failure_is_surfaced() {
    let dispatcher = StrategyDispatcher::new(Arc::new(UnavailableCacheStore));

    assert!(matches!(
        dispatcher.draw(BASELINE_STRATEGY),
        Err(ArmoryError::CacheUnavailable(_))
    ));
    assert!(matches!(
        dispatcher.draw_weighted(BASELINE_STRATEGY, "4000"),
        Err(ArmoryError::CacheUnavailable(_))
    ));
}

//! Command bodies; each returns the text printed on stdout.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::Result;
use rust_decimal::Decimal;
use strategy_armory::{AssemblyReport, StrategyArmory, StrategyDispatcher};

const NO_AWARD: &str = "no award";

/// `assemble`: build and persist every table of a strategy.
///
/// # Errors
///
/// Propagates assembly errors.
pub fn assemble(armory: &StrategyArmory, strategy_id: i64) -> Result<String> {
    let report = armory.assemble(strategy_id)?;
    render_report(&report)
}

/// `draw`: `count` draws; a single award id, or a histogram when `count > 1`.
///
/// # Errors
///
/// Propagates cache failures.
pub fn draw(
    dispatcher: &StrategyDispatcher,
    strategy_id: i64,
    weight_key: Option<&str>,
    count: usize,
) -> Result<String> {
    let mut outcomes: BTreeMap<Option<i32>, usize> = BTreeMap::new();
    for _ in 0..count.max(1) {
        let award_id = match weight_key {
            Some(weight_key) => dispatcher.draw_weighted(strategy_id, weight_key)?,
            None => dispatcher.draw(strategy_id)?,
        };
        *outcomes.entry(award_id).or_insert(0) += 1;
    }

    if count <= 1 {
        let award_id = outcomes.keys().next().copied().flatten();
        return Ok(award_id.map_or_else(|| NO_AWARD.to_string(), |id| id.to_string()));
    }
    if outcomes.keys().all(Option::is_none) {
        return Ok(NO_AWARD.to_string());
    }
    render_histogram(&outcomes, count)
}

/// `inspect`: slot count and per-award slot histogram of a persisted table.
///
/// # Errors
///
/// Propagates cache failures and incomplete tables.
pub fn inspect(
    dispatcher: &StrategyDispatcher,
    strategy_id: i64,
    weight_key: Option<&str>,
) -> Result<String> {
    let Some(table) = dispatcher.load_table(strategy_id, weight_key)? else {
        return Ok(match weight_key {
            Some(weight_key) => {
                format!("strategy {strategy_id} weight tier {weight_key} is not assembled")
            }
            None => format!("strategy {strategy_id} is not assembled"),
        });
    };

    let mut out = String::new();
    writeln!(out, "slots: {}", table.slot_count())?;
    let counts: BTreeMap<Option<i32>, usize> = table
        .slot_counts()
        .into_iter()
        .map(|(award_id, slots)| (Some(award_id), slots))
        .collect();
    out.push_str(&render_histogram(&counts, table.slot_count())?);
    Ok(out)
}

/// `simulate`: assemble, then draw `draws` times in-process.
///
/// # Errors
///
/// Propagates assembly and cache errors.
pub fn simulate(
    armory: &StrategyArmory,
    strategy_id: i64,
    weight_key: Option<&str>,
    draws: usize,
) -> Result<String> {
    let mut out = assemble(armory, strategy_id)?;
    writeln!(out, "draws: {draws}")?;
    out.push_str(&draw(armory.dispatcher(), strategy_id, weight_key, draws.max(2))?);
    Ok(out)
}

fn render_report(report: &AssemblyReport) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "strategy {}", report.strategy_id)?;
    writeln!(out, "baseline: {} slots", report.baseline_slots)?;
    if !report.has_weight_rule {
        writeln!(out, "weight rule: none")?;
    }
    for tier in &report.weight_tiers {
        writeln!(out, "weight {}: {} slots", tier.weight_key, tier.slots)?;
    }
    for skipped in &report.skipped {
        writeln!(out, "skipped {}: {}", skipped.weight_key, skipped.reason)?;
    }
    Ok(out)
}

fn render_histogram(counts: &BTreeMap<Option<i32>, usize>, total: usize) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{:>10}  {:>8}  {:>8}", "award", "count", "share")?;
    for (award_id, count) in counts {
        let label = award_id.map_or_else(|| NO_AWARD.to_string(), |id| id.to_string());
        writeln!(
            out,
            "{label:>10}  {count:>8}  {:>7}%",
            share_percent(*count, total).to_string()
        )?;
    }
    Ok(out)
}

fn share_percent(count: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    let mut share =
        (Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(2);
    share.rescale(2);
    share
}

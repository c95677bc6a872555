//! Table assembler: award probabilities to shuffled slot tables.
//!
//! Slot values are written before the rate range key. A reader can therefore
//! only observe a rate range whose slots have all been written by some
//! assembly; during reassembly it may still read a mix of old and new slot
//! values. Concurrent assemblies of the same strategy are not excluded and
//! can interleave slot writes, so callers must serialize them (e.g. a single
//! administrative path).
//!
//! Weight tiers that an assembly no longer produces (group skipped, key gone
//! from the rule, rule removed) lose their rate range key, so draws for them
//! fall back to the baseline table. Their slot keys are left behind and are
//! unreachable until the tier is assembled again.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;

use crate::cache::{CacheError, CacheStore};
use crate::error::{ArmoryError, Result};
use crate::keys::{TableKeys, weight_keys_key};
use crate::model::{AwardCandidate, DEFAULT_WEIGHT_RULE_MODEL, ProbabilityTable, WeightRule};
use crate::rate::{build_search_table, rescale_to_hundred};
use crate::source::AwardSource;
use crate::weight_rule::WeightGroup;

/// Outcome of one assembled weight tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTierReport {
    /// Tier key.
    pub weight_key: String,
    /// Persisted slot count.
    pub slots: usize,
}

/// A weight group that was skipped without failing assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWeightGroup {
    /// Tier key, or the raw segment when it could not be parsed.
    pub weight_key: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a successful `assemble` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Strategy assembled.
    pub strategy_id: i64,
    /// Persisted baseline slot count.
    pub baseline_slots: usize,
    /// Whether the strategy has a weight rule.
    pub has_weight_rule: bool,
    /// Weight tiers assembled, in rule order.
    pub weight_tiers: Vec<WeightTierReport>,
    /// Weight groups skipped (malformed or with no matching award).
    pub skipped: Vec<SkippedWeightGroup>,
}

impl AssemblyReport {
    /// Slot count of an assembled tier.
    #[must_use]
    pub fn tier_slots(&self, weight_key: &str) -> Option<usize> {
        self.weight_tiers
            .iter()
            .find(|tier| tier.weight_key == weight_key)
            .map(|tier| tier.slots)
    }
}

/// Builds and persists probability tables for strategies.
pub struct StrategyAssembler {
    cache: Arc<dyn CacheStore>,
    source: Arc<dyn AwardSource>,
    weight_rule_model: String,
}

impl StrategyAssembler {
    /// Create an assembler reading weight rules under `rule_weight`.
    pub fn new(cache: Arc<dyn CacheStore>, source: Arc<dyn AwardSource>) -> Self {
        Self {
            cache,
            source,
            weight_rule_model: DEFAULT_WEIGHT_RULE_MODEL.to_string(),
        }
    }

    /// Read weight rules under a different rule model name.
    #[must_use]
    pub fn with_weight_rule_model(mut self, rule_model: impl Into<String>) -> Self {
        self.weight_rule_model = rule_model.into();
        self
    }

    /// Assemble the baseline table and every weight tier of a strategy.
    ///
    /// Succeeds iff the baseline succeeds and every well-formed weight group
    /// with at least one matching award is assembled. Malformed segments and
    /// groups with no matching award are skipped and reported. Weight tiers
    /// assembled earlier but not by this call are retired, so draws for them
    /// fall back to the baseline table.
    ///
    /// # Errors
    ///
    /// - [`ArmoryError::EmptyConfiguration`] if the strategy has no awards;
    ///   nothing is written
    /// - [`ArmoryError::InvalidProbability`] / [`ArmoryError::RateRangeOverflow`]
    ///   for unusable probabilities
    /// - [`ArmoryError::CacheUnavailable`] / [`ArmoryError::AwardSource`] for
    ///   collaborator failures
    pub fn assemble(&self, strategy_id: i64) -> Result<AssemblyReport> {
        let candidates = self
            .source
            .list_awards(strategy_id)
            .map_err(source_error)?;
        if candidates.is_empty() {
            log::warn!("strategy {strategy_id} has no award configuration");
            return Err(ArmoryError::EmptyConfiguration { strategy_id });
        }
        log::info!(
            "assembling strategy {strategy_id} with {} awards",
            candidates.len()
        );

        let baseline_slots = self.assemble_baseline(strategy_id, &candidates)?;

        let rule = self
            .source
            .weight_rule(strategy_id, &self.weight_rule_model)
            .map_err(source_error)?;
        let mut report = AssemblyReport {
            strategy_id,
            baseline_slots,
            has_weight_rule: rule.is_some(),
            weight_tiers: Vec::new(),
            skipped: Vec::new(),
        };
        if let Some(rule) = rule {
            self.assemble_weight_rule(&rule, &candidates, &mut report)?;
        } else {
            log::info!("strategy {strategy_id} has no weight rule; skipping weight tiers");
        }
        self.retire_stale_tiers(&report)?;

        log::info!(
            "strategy {strategy_id} assembled: baseline {} slots, {} weight tiers, {} skipped",
            report.baseline_slots,
            report.weight_tiers.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Assemble and persist the unweighted table from `candidates`.
    ///
    /// Returns the persisted slot count.
    ///
    /// # Errors
    ///
    /// See [`StrategyAssembler::assemble`].
    pub fn assemble_baseline(
        &self,
        strategy_id: i64,
        candidates: &[AwardCandidate],
    ) -> Result<usize> {
        let table = build_table(strategy_id, candidates)?;
        self.persist(TableKeys::Baseline { strategy_id }, &table)?;
        Ok(table.slot_count())
    }

    /// Assemble one weight tier from the strategy's full candidate list.
    ///
    /// Candidates are filtered to the group's eligible ids and rescaled to
    /// sum to 100. Returns `None` when no candidate is eligible; nothing is
    /// written in that case.
    ///
    /// # Errors
    ///
    /// See [`StrategyAssembler::assemble`].
    pub fn assemble_weighted(
        &self,
        strategy_id: i64,
        group: &WeightGroup,
        candidates: &[AwardCandidate],
    ) -> Result<Option<usize>> {
        let mut eligible: Vec<AwardCandidate> = candidates
            .iter()
            .filter(|candidate| group.eligible_award_ids.contains(&candidate.award_id))
            .cloned()
            .collect();
        if eligible.is_empty() {
            return Ok(None);
        }
        rescale_to_hundred(&mut eligible);

        let table = build_table(strategy_id, &eligible)?;
        self.persist(
            TableKeys::Weighted {
                strategy_id,
                weight_key: &group.weight_key,
            },
            &table,
        )?;
        Ok(Some(table.slot_count()))
    }

    fn assemble_weight_rule(
        &self,
        rule: &WeightRule,
        candidates: &[AwardCandidate],
        report: &mut AssemblyReport,
    ) -> Result<()> {
        let strategy_id = report.strategy_id;
        let parsed = rule.groups();
        for malformed in parsed.malformed {
            log::warn!(
                "strategy {strategy_id}: skipping malformed weight segment `{}`: {}",
                malformed.segment,
                malformed.reason
            );
            report.skipped.push(SkippedWeightGroup {
                weight_key: malformed.segment,
                reason: malformed.reason.to_string(),
            });
        }

        for group in &parsed.groups {
            match self.assemble_weighted(strategy_id, group, candidates)? {
                Some(slots) => {
                    log::info!(
                        "strategy {strategy_id}: weight tier {} assembled with {slots} slots",
                        group.weight_key
                    );
                    report.weight_tiers.push(WeightTierReport {
                        weight_key: group.weight_key.clone(),
                        slots,
                    });
                }
                None => {
                    log::warn!(
                        "strategy {strategy_id}: weight tier {} matches no configured award",
                        group.weight_key
                    );
                    self.retire_tier(strategy_id, &group.weight_key)?;
                    report.skipped.push(SkippedWeightGroup {
                        weight_key: group.weight_key.clone(),
                        reason: "no configured award is eligible".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Retire tiers recorded by the previous assembly but absent from this
    /// one, then record the tiers this assembly produced.
    fn retire_stale_tiers(&self, report: &AssemblyReport) -> Result<()> {
        let strategy_id = report.strategy_id;
        let index_key = weight_keys_key(strategy_id);
        let previous: BTreeSet<String> = self
            .cache
            .get_text(&index_key)?
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let current: BTreeSet<String> = report
            .weight_tiers
            .iter()
            .map(|tier| tier.weight_key.clone())
            .collect();

        for weight_key in previous.difference(&current) {
            self.retire_tier(strategy_id, weight_key)?;
        }
        if current.is_empty() {
            self.cache.delete(&index_key)?;
        } else {
            let joined = current.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
            self.cache.set_text(&index_key, &joined, None)?;
        }
        Ok(())
    }

    fn retire_tier(&self, strategy_id: i64, weight_key: &str) -> Result<()> {
        let keys = TableKeys::Weighted {
            strategy_id,
            weight_key,
        };
        self.cache.delete(&keys.rate_range())?;
        log::info!(
            "strategy {strategy_id}: weight tier {weight_key} retired; draws use the baseline table"
        );
        Ok(())
    }

    fn persist(&self, keys: TableKeys<'_>, table: &ProbabilityTable) -> Result<()> {
        let slot_count =
            u32::try_from(table.slot_count()).map_err(|_| ArmoryError::RateRangeOverflow {
                strategy_id: keys.strategy_id(),
                value: Decimal::from(table.slot_count()),
            })?;
        let entries: Vec<(String, i64)> = (1..=slot_count)
            .zip(table.iter())
            .map(|(slot, (_, award_id))| (keys.slot(slot), i64::from(award_id)))
            .collect();
        self.cache.set_ints(&entries)?;
        self.cache
            .set_int(&keys.rate_range(), i64::from(slot_count))?;
        log::debug!(
            "persisted {slot_count} slots under {} ({})",
            keys.rate_range(),
            self.cache.backend_name()
        );
        Ok(())
    }
}

/// Compute, shuffle and index the table for a candidate set.
fn build_table(strategy_id: i64, candidates: &[AwardCandidate]) -> Result<ProbabilityTable> {
    let (space, mut slots) = build_search_table(strategy_id, candidates)?;
    log::debug!(
        "strategy {strategy_id}: min rate {}, total rate {}, rate range {}, realized {} slots",
        space.min_rate,
        space.total_rate,
        space.rate_range,
        slots.len()
    );
    slots.shuffle(&mut OsRng);
    Ok(ProbabilityTable::from_slots(slots))
}

fn source_error(error: anyhow::Error) -> ArmoryError {
    match error.downcast::<CacheError>() {
        Ok(cache_error) => ArmoryError::CacheUnavailable(cache_error),
        Err(error) => ArmoryError::AwardSource(error),
    }
}

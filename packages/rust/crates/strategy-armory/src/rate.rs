//! Probability math shared by baseline and weight-tier assembly.
//!
//! The smallest probability is the slot unit:
//! `rate_range = ceil(total / min)` and each award gets
//! `ceil(rate * rate_range / total)` slots. Both roundings go up, so the
//! realized table can be slightly larger than `rate_range`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ArmoryError, Result};
use crate::model::AwardCandidate;

/// Scale used when rescaling a weight tier to sum to 100.
const RESCALE_DECIMAL_PLACES: u32 = 4;

/// Largest rate range a candidate set may produce.
///
/// A `0.0001%` award next to `100%` needs about one million slots; ten times
/// that bounds the table at a few tens of megabytes.
pub const MAX_SLOT_COUNT: u32 = 10_000_000;

/// Probability space of one candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSpace {
    /// Smallest candidate probability.
    pub min_rate: Decimal,
    /// Sum of candidate probabilities.
    pub total_rate: Decimal,
    /// `ceil(total_rate / min_rate)`.
    pub rate_range: u32,
}

impl RateSpace {
    /// Compute the space for a validated, non-empty candidate list.
    ///
    /// # Errors
    ///
    /// - [`ArmoryError::EmptyConfiguration`] when `candidates` is empty
    /// - [`ArmoryError::InvalidProbability`] for any non-positive probability
    /// - [`ArmoryError::RateRangeOverflow`] when the range exceeds
    ///   [`MAX_SLOT_COUNT`]
    pub fn from_candidates(strategy_id: i64, candidates: &[AwardCandidate]) -> Result<Self> {
        for candidate in candidates {
            candidate.validate(strategy_id)?;
        }
        let min_rate = candidates
            .iter()
            .map(|c| c.probability_percent)
            .min()
            .ok_or(ArmoryError::EmptyConfiguration { strategy_id })?;
        let total_rate: Decimal = candidates.iter().map(|c| c.probability_percent).sum();
        let range = total_rate
            .checked_div(min_rate)
            .map(|quotient| quotient.ceil())
            .ok_or(ArmoryError::RateRangeOverflow {
                strategy_id,
                value: total_rate,
            })?;
        let rate_range = range
            .to_u32()
            .filter(|rate_range| *rate_range <= MAX_SLOT_COUNT)
            .ok_or(ArmoryError::RateRangeOverflow {
                strategy_id,
                value: range,
            })?;
        Ok(Self {
            min_rate,
            total_rate,
            rate_range,
        })
    }

    /// Slots allocated to one probability: `ceil(rate * rate_range / total)`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmoryError::RateRangeOverflow`] if the product overflows.
    pub fn slots_for(&self, strategy_id: i64, rate: Decimal) -> Result<u32> {
        let slots = rate
            .checked_mul(Decimal::from(self.rate_range))
            .and_then(|scaled| scaled.checked_div(self.total_rate))
            .map(|share| share.ceil());
        slots
            .and_then(|value| value.to_u32())
            .ok_or(ArmoryError::RateRangeOverflow {
                strategy_id,
                value: rate,
            })
    }
}

/// Build the unshuffled search table: each award id repeated by its slot count.
///
/// # Errors
///
/// Propagates the errors of [`RateSpace::from_candidates`] and
/// [`RateSpace::slots_for`], and fails with [`ArmoryError::RateRangeOverflow`]
/// if the realized table does not fit `u32` slot indices.
pub fn build_search_table(
    strategy_id: i64,
    candidates: &[AwardCandidate],
) -> Result<(RateSpace, Vec<i32>)> {
    let space = RateSpace::from_candidates(strategy_id, candidates)?;
    let mut table = Vec::with_capacity(space.rate_range as usize);
    for candidate in candidates {
        let slots = space.slots_for(strategy_id, candidate.probability_percent)?;
        log::debug!(
            "strategy {strategy_id}: award {} rate {}% -> {slots} slots",
            candidate.award_id,
            candidate.probability_percent
        );
        table.extend(std::iter::repeat_n(candidate.award_id, slots as usize));
    }
    if u32::try_from(table.len()).is_err() {
        return Err(ArmoryError::RateRangeOverflow {
            strategy_id,
            value: Decimal::from(table.len()),
        });
    }
    Ok((space, table))
}

/// Rescale probabilities so the subset sums to 100, rounded half-up to 4 places.
///
/// Each rate becomes `rate * 100 / sum(rates)`. Empty input is left untouched.
pub fn rescale_to_hundred(candidates: &mut [AwardCandidate]) {
    let total: Decimal = candidates.iter().map(|c| c.probability_percent).sum();
    if total <= Decimal::ZERO {
        return;
    }
    let hundred = Decimal::ONE_HUNDRED;
    for candidate in candidates {
        let scaled = candidate.probability_percent * hundred / total;
        candidate.probability_percent = scaled.round_dp_with_strategy(
            RESCALE_DECIMAL_PLACES,
            RoundingStrategy::MidpointAwayFromZero,
        );
    }
}

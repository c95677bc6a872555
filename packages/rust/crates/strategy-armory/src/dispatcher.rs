//! Dispatcher: one random draw against an assembled table.
//!
//! Pure read path: no local mutable state, safe to share across threads.

use std::sync::Arc;

use rand::Rng;
use rand::rngs::OsRng;

use crate::cache::{CacheError, CacheStore};
use crate::error::{ArmoryError, Result};
use crate::keys::TableKeys;
use crate::model::ProbabilityTable;
use crate::rate::MAX_SLOT_COUNT;

/// Draws award ids from persisted probability tables.
pub struct StrategyDispatcher {
    cache: Arc<dyn CacheStore>,
}

impl StrategyDispatcher {
    /// Create a dispatcher over `cache`.
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Draw from the baseline table.
    ///
    /// Returns `None` when the strategy has not been assembled, or when the
    /// drawn slot is missing (a partial table).
    ///
    /// # Errors
    ///
    /// Returns [`ArmoryError::CacheUnavailable`] if the cache cannot be read.
    pub fn draw(&self, strategy_id: i64) -> Result<Option<i32>> {
        let keys = TableKeys::Baseline { strategy_id };
        let rate_range = self.rate_range(keys)?;
        if rate_range == 0 {
            log::warn!("strategy {strategy_id} is not assembled");
            return Ok(None);
        }
        let award_id = self.draw_in(keys, rate_range)?;
        log::debug!("strategy {strategy_id}: drew {award_id:?} from {rate_range} slots");
        Ok(award_id)
    }

    /// Draw from a weight tier, falling back to the baseline table when the
    /// tier has not been assembled.
    ///
    /// # Errors
    ///
    /// Returns [`ArmoryError::CacheUnavailable`] if the cache cannot be read.
    pub fn draw_weighted(&self, strategy_id: i64, weight_key: &str) -> Result<Option<i32>> {
        let keys = TableKeys::Weighted {
            strategy_id,
            weight_key,
        };
        let rate_range = self.rate_range(keys)?;
        if rate_range == 0 {
            log::warn!(
                "strategy {strategy_id}: weight tier {weight_key} not assembled; using baseline"
            );
            return self.draw(strategy_id);
        }
        let award_id = self.draw_in(keys, rate_range)?;
        log::debug!(
            "strategy {strategy_id}: tier {weight_key} drew {award_id:?} from {rate_range} slots"
        );
        Ok(award_id)
    }

    /// Persisted slot count of a table; `0` when unassembled.
    ///
    /// # Errors
    ///
    /// Returns [`ArmoryError::CacheUnavailable`] if the cache cannot be read.
    pub fn slot_count(&self, strategy_id: i64, weight_key: Option<&str>) -> Result<u32> {
        self.rate_range(table_keys(strategy_id, weight_key))
    }

    /// Read a whole table back from the cache, for inspection.
    ///
    /// Returns `None` when the table has not been assembled. No fallback is
    /// applied for weight tiers.
    ///
    /// # Errors
    ///
    /// - [`ArmoryError::CacheUnavailable`] if the cache cannot be read
    /// - [`ArmoryError::IncompleteTable`] if a slot inside the range is missing
    pub fn load_table(
        &self,
        strategy_id: i64,
        weight_key: Option<&str>,
    ) -> Result<Option<ProbabilityTable>> {
        let keys = table_keys(strategy_id, weight_key);
        let rate_range = self.rate_range(keys)?;
        if rate_range == 0 {
            return Ok(None);
        }
        let mut slots = Vec::with_capacity(rate_range.min(MAX_SLOT_COUNT) as usize);
        for slot in 1..=rate_range {
            let key = keys.slot(slot);
            let award_id = self
                .award_at(&key)?
                .ok_or(ArmoryError::IncompleteTable {
                    strategy_id,
                    missing_key: key,
                })?;
            slots.push(award_id);
        }
        Ok(Some(ProbabilityTable::from_slots(slots)))
    }

    fn draw_in(&self, keys: TableKeys<'_>, rate_range: u32) -> Result<Option<i32>> {
        let slot = OsRng.gen_range(1..=rate_range);
        let key = keys.slot(slot);
        let award_id = self.award_at(&key)?;
        if award_id.is_none() {
            log::warn!("slot `{key}` is missing inside rate range {rate_range}");
        }
        Ok(award_id)
    }

    fn rate_range(&self, keys: TableKeys<'_>) -> Result<u32> {
        let raw = self.cache.get_int(&keys.rate_range())?;
        Ok(raw
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(0))
    }

    fn award_at(&self, key: &str) -> Result<Option<i32>> {
        let Some(raw) = self.cache.get_int(key)? else {
            return Ok(None);
        };
        let award_id = i32::try_from(raw).map_err(|_| CacheError::Decode {
            key: key.to_string(),
            value: raw.to_string(),
        })?;
        Ok(Some(award_id))
    }
}

fn table_keys(strategy_id: i64, weight_key: Option<&str>) -> TableKeys<'_> {
    match weight_key {
        Some(weight_key) => TableKeys::Weighted {
            strategy_id,
            weight_key,
        },
        None => TableKeys::Baseline { strategy_id },
    }
}

//! Award configuration sources.
//!
//! The assembler reads two things per strategy: the award candidates and an
//! optional weight rule. Sources may be a database, a catalog file or a
//! read-through cache in front of either.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dashmap::DashMap;

use crate::cache::CacheStore;
use crate::keys::{award_list_key, rule_key};
use crate::model::{AwardCandidate, WeightRule};

/// Expiry of the cached award list.
pub const DEFAULT_AWARD_LIST_TTL: Duration = Duration::from_secs(3_600);

/// Read contract for award configuration.
pub trait AwardSource: Send + Sync {
    /// Award candidates configured for a strategy (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn list_awards(&self, strategy_id: i64) -> Result<Vec<AwardCandidate>>;

    /// Rule stored for a strategy under `rule_model`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn weight_rule(&self, strategy_id: i64, rule_model: &str) -> Result<Option<WeightRule>>;
}

impl<S: AwardSource + ?Sized> AwardSource for Arc<S> {
    fn list_awards(&self, strategy_id: i64) -> Result<Vec<AwardCandidate>> {
        (**self).list_awards(strategy_id)
    }

    fn weight_rule(&self, strategy_id: i64, rule_model: &str) -> Result<Option<WeightRule>> {
        (**self).weight_rule(strategy_id, rule_model)
    }
}

/// Concurrent in-memory award registry.
#[derive(Debug, Default)]
pub struct InMemoryAwardSource {
    awards: DashMap<i64, Vec<AwardCandidate>>,
    rules: DashMap<(i64, String), WeightRule>,
}

impl InMemoryAwardSource {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidates of a strategy.
    pub fn put_awards(&self, strategy_id: i64, awards: Vec<AwardCandidate>) {
        self.awards.insert(strategy_id, awards);
    }

    /// Replace the rule stored under `rule.rule_model`.
    pub fn put_rule(&self, rule: WeightRule) {
        self.rules
            .insert((rule.strategy_id, rule.rule_model.clone()), rule);
    }

    /// Remove a rule.
    pub fn remove_rule(&self, strategy_id: i64, rule_model: &str) {
        self.rules.remove(&(strategy_id, rule_model.to_string()));
    }

    /// Strategy ids with configured awards, sorted.
    #[must_use]
    pub fn strategy_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.awards.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl AwardSource for InMemoryAwardSource {
    fn list_awards(&self, strategy_id: i64) -> Result<Vec<AwardCandidate>> {
        Ok(self
            .awards
            .get(&strategy_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    fn weight_rule(&self, strategy_id: i64, rule_model: &str) -> Result<Option<WeightRule>> {
        Ok(self
            .rules
            .get(&(strategy_id, rule_model.to_string()))
            .map(|entry| entry.value().clone()))
    }
}

/// Read-through cache in front of another source.
///
/// Award lists are cached as JSON under `strategy#<id>#awardlist` with a TTL;
/// rules under `strategy#<id>#rule#<model>` without expiry. Missing rules and
/// empty award lists are not cached.
pub struct CachedAwardSource<S> {
    inner: S,
    cache: Arc<dyn CacheStore>,
    award_list_ttl: Duration,
}

impl<S: AwardSource> CachedAwardSource<S> {
    /// Wrap `inner` with the default one hour award-list TTL.
    pub fn new(inner: S, cache: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(inner, cache, DEFAULT_AWARD_LIST_TTL)
    }

    /// Wrap `inner` with a custom award-list TTL.
    pub fn with_ttl(inner: S, cache: Arc<dyn CacheStore>, award_list_ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            award_list_ttl,
        }
    }

    fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(payload) = self
            .cache
            .get_text(key)
            .with_context(|| format!("failed to read `{key}` from cache"))?
        else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                log::warn!("discarding undecodable cache entry `{key}`: {error}");
                Ok(None)
            }
        }
    }
}

impl<S: AwardSource> AwardSource for CachedAwardSource<S> {
    fn list_awards(&self, strategy_id: i64) -> Result<Vec<AwardCandidate>> {
        let key = award_list_key(strategy_id);
        if let Some(awards) = self.cached::<Vec<AwardCandidate>>(&key)? {
            log::debug!("award list of strategy {strategy_id} served from cache");
            return Ok(awards);
        }

        let awards = self.inner.list_awards(strategy_id)?;
        if !awards.is_empty() {
            let payload =
                serde_json::to_string(&awards).context("failed to encode award list for cache")?;
            self.cache
                .set_text(&key, &payload, Some(self.award_list_ttl))
                .with_context(|| format!("failed to write `{key}` to cache"))?;
            log::info!(
                "cached award list of strategy {strategy_id} ({} awards)",
                awards.len()
            );
        }
        Ok(awards)
    }

    fn weight_rule(&self, strategy_id: i64, rule_model: &str) -> Result<Option<WeightRule>> {
        let key = rule_key(strategy_id, rule_model);
        if let Some(rule) = self.cached::<WeightRule>(&key)? {
            return Ok(Some(rule));
        }

        let Some(rule) = self.inner.weight_rule(strategy_id, rule_model)? else {
            return Ok(None);
        };
        let payload = serde_json::to_string(&rule).context("failed to encode rule for cache")?;
        self.cache
            .set_text(&key, &payload, None)
            .with_context(|| format!("failed to write `{key}` to cache"))?;
        Ok(Some(rule))
    }
}

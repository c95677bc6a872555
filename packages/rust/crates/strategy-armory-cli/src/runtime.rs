//! Runtime wiring: settings + env to a cache store and an armory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use strategy_armory::{
    CacheStore, CachedAwardSource, DEFAULT_AWARD_LIST_TTL, DEFAULT_WEIGHT_RULE_MODEL,
    InMemoryAwardSource, LocalCacheStore, StrategyArmory, award_list_key, rule_key,
};

use crate::config::RuntimeSettings;

/// Catalog used when neither `--catalog` nor `strategy.catalog_path` is set.
pub const DEFAULT_CATALOG_RELATIVE_PATH: &str = "packages/conf/catalog.yaml";

const CACHE_BACKEND_ENV: &str = "ARMORY_CACHE_BACKEND";
const VALKEY_URL_ENV: &str = "VALKEY_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendMode {
    Local,
    Valkey,
}

impl CacheBackendMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Valkey => "valkey",
        }
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ArmoryRuntimeConfig {
    pub backend: CacheBackendMode,
    pub valkey_url: Option<String>,
    pub award_list_ttl: Duration,
    pub weight_rule_model: String,
    /// Not yet resolved against the project root.
    pub catalog_path: PathBuf,
}

impl ArmoryRuntimeConfig {
    /// Resolve settings, with `ARMORY_CACHE_BACKEND` and `VALKEY_URL`
    /// taking precedence over their settings counterparts.
    ///
    /// # Errors
    ///
    /// Fails on an unknown backend name or a Valkey backend without a URL.
    pub fn from_settings(settings: &RuntimeSettings) -> Result<Self> {
        Self::from_settings_with_env(settings, non_empty_env)
    }

    #[doc(hidden)]
    pub fn from_settings_with_env(
        settings: &RuntimeSettings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let valkey_url = env(VALKEY_URL_ENV)
            .or_else(|| settings.cache.valkey_url.clone())
            .and_then(non_empty_string);

        let backend = match env(CACHE_BACKEND_ENV)
            .or_else(|| settings.cache.backend.clone())
            .and_then(non_empty_string)
        {
            Some(raw) => parse_backend_mode(&raw)?,
            None => CacheBackendMode::Local,
        };
        if backend == CacheBackendMode::Valkey && valkey_url.is_none() {
            bail!("cache backend is valkey but neither {VALKEY_URL_ENV} nor cache.valkey_url is set");
        }

        let award_list_ttl = match settings.cache.award_list_ttl_secs {
            Some(0) => bail!("cache.award_list_ttl_secs must be greater than 0 seconds"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_AWARD_LIST_TTL,
        };

        let weight_rule_model = settings
            .strategy
            .weight_rule_model
            .clone()
            .and_then(non_empty_string)
            .unwrap_or_else(|| DEFAULT_WEIGHT_RULE_MODEL.to_string());

        let catalog_path = settings
            .strategy
            .catalog_path
            .clone()
            .and_then(non_empty_string)
            .map_or_else(|| PathBuf::from(DEFAULT_CATALOG_RELATIVE_PATH), PathBuf::from);

        Ok(Self {
            backend,
            valkey_url,
            award_list_ttl,
            weight_rule_model,
            catalog_path,
        })
    }
}

/// Open the configured cache store.
///
/// # Errors
///
/// Fails if the Valkey URL is invalid or the binary was built without the
/// `valkey` feature.
pub fn build_cache_store(config: &ArmoryRuntimeConfig) -> Result<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match config.backend {
        CacheBackendMode::Local => Arc::new(LocalCacheStore::new()),
        CacheBackendMode::Valkey => open_valkey(config.valkey_url.as_deref().unwrap_or_default())?,
    };
    tracing::info!(backend = store.backend_name(), "cache store ready");
    Ok(store)
}

#[cfg(feature = "valkey")]
fn open_valkey(url: &str) -> Result<Arc<dyn CacheStore>> {
    Ok(Arc::new(strategy_armory::ValkeyCacheStore::new(url)?))
}

#[cfg(not(feature = "valkey"))]
fn open_valkey(_url: &str) -> Result<Arc<dyn CacheStore>> {
    bail!("cache backend valkey requires building with the `valkey` feature")
}

/// Armory reading awards from `source` through the cache's read-through layer.
pub fn build_armory(
    config: &ArmoryRuntimeConfig,
    cache: Arc<dyn CacheStore>,
    source: InMemoryAwardSource,
) -> StrategyArmory {
    let cached = CachedAwardSource::with_ttl(source, Arc::clone(&cache), config.award_list_ttl);
    StrategyArmory::new(cache, Arc::new(cached))
        .with_weight_rule_model(config.weight_rule_model.clone())
}

/// Drop the cached award list and weight rule of a strategy so the next
/// assembly reads them from the catalog again.
///
/// Rules are cached without a TTL, so a shared store would otherwise keep
/// serving the configuration of an earlier catalog.
pub fn evict_cached_config(
    cache: &dyn CacheStore,
    strategy_id: i64,
    rule_model: &str,
) -> Result<()> {
    cache.delete(&award_list_key(strategy_id))?;
    cache.delete(&rule_key(strategy_id, rule_model))?;
    tracing::debug!(strategy_id, rule_model, "cached award list and weight rule evicted");
    Ok(())
}

fn parse_backend_mode(raw: &str) -> Result<CacheBackendMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "local" | "memory" => Ok(CacheBackendMode::Local),
        "valkey" | "redis" => Ok(CacheBackendMode::Valkey),
        other => bail!("invalid cache backend `{other}`; expected local|valkey"),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(non_empty_string)
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

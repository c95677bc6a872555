//! strategy-armory-cli - runtime settings, award catalogs and store wiring
//! behind the `armory` binary.
//!
//! Logging: set `RUST_LOG=strategy_armory=debug` to see per-award slot
//! allocations and per-draw results on stderr.

#![allow(missing_docs)]

mod catalog;
pub mod commands;
mod config;
mod runtime;

pub use catalog::{AwardCatalog, CatalogAward, CatalogRule, CatalogStrategy};
pub use config::{
    CacheSettings, RuntimeSettings, StrategySettings, load_runtime_settings,
    load_runtime_settings_from_paths, project_root, resolve_project_path, runtime_settings_paths,
    set_config_home_override,
};
pub use runtime::{
    ArmoryRuntimeConfig, CacheBackendMode, DEFAULT_CATALOG_RELATIVE_PATH, build_armory,
    build_cache_store, evict_cached_config,
};

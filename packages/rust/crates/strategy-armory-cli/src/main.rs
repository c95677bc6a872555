//! armory CLI: assemble, draw, inspect, or simulate.
//!
//! Settings from `packages/conf/settings.yaml` merged with
//! `<PRJ_CONFIG_HOME>/strategy-armory/settings.yaml` (override with `--conf <dir>`).
//!
//! Logging: set `RUST_LOG=strategy_armory=info` (or `warn`, `debug`) to see logs on stderr.

mod cli;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use strategy_armory::StrategyDispatcher;
use strategy_armory_cli::{
    ArmoryRuntimeConfig, AwardCatalog, build_armory, build_cache_store, commands,
    evict_cached_config, load_runtime_settings, resolve_project_path, set_config_home_override,
};

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "strategy_armory=debug,strategy_armory_cli=debug,armory=debug"
        } else {
            "strategy_armory=info,strategy_armory_cli=info,armory=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = load_runtime_settings();
    let config =
        ArmoryRuntimeConfig::from_settings(&settings).context("invalid runtime settings")?;
    let cache = build_cache_store(&config)?;

    let output = match cli.command {
        Command::Assemble { strategy, catalog } => {
            if catalog.is_some() {
                evict_cached_config(cache.as_ref(), strategy, &config.weight_rule_model)?;
            }
            let source = load_catalog(&config, catalog)?.into_source();
            let armory = build_armory(&config, cache, source);
            commands::assemble(&armory, strategy)
                .with_context(|| format!("failed to assemble strategy {strategy}"))?
        }
        Command::Draw {
            strategy,
            weight,
            count,
        } => commands::draw(
            &StrategyDispatcher::new(cache),
            strategy,
            weight.as_deref(),
            count,
        )?,
        Command::Inspect { strategy, weight } => commands::inspect(
            &StrategyDispatcher::new(cache),
            strategy,
            weight.as_deref(),
        )?,
        Command::Simulate {
            strategy,
            catalog,
            weight,
            draws,
        } => {
            if catalog.is_some() {
                evict_cached_config(cache.as_ref(), strategy, &config.weight_rule_model)?;
            }
            let source = load_catalog(&config, catalog)?.into_source();
            let armory = build_armory(&config, cache, source);
            commands::simulate(&armory, strategy, weight.as_deref(), draws)
                .with_context(|| format!("failed to simulate strategy {strategy}"))?
        }
    };
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn load_catalog(
    config: &ArmoryRuntimeConfig,
    cli_path: Option<PathBuf>,
) -> anyhow::Result<AwardCatalog> {
    let path = resolve_project_path(cli_path.unwrap_or_else(|| config.catalog_path.clone()));
    tracing::debug!(path = %path.display(), "loading award catalog");
    AwardCatalog::load(&path)
}

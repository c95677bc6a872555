use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "armory")]
#[command(about = "Assemble lottery strategy probability tables and draw awards from them.")]
pub(crate) struct Cli {
    /// Override config directory (holds `strategy-armory/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build and persist the baseline table and every weight tier of a strategy.
    Assemble {
        #[arg(long)]
        strategy: i64,

        /// Award catalog (default: strategy.catalog_path, then packages/conf/catalog.yaml).
        /// Passing it evicts the strategy's cached awards and rule first; without it a
        /// shared store keeps serving what it cached from an earlier catalog.
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Draw award ids from an assembled table.
    Draw {
        #[arg(long)]
        strategy: i64,

        /// Weight tier key; falls back to the baseline table when not assembled.
        #[arg(long)]
        weight: Option<String>,

        /// Number of draws; more than one prints a histogram.
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Print slot count and per-award slot histogram of a persisted table.
    Inspect {
        #[arg(long)]
        strategy: i64,

        /// Weight tier key (no fallback).
        #[arg(long)]
        weight: Option<String>,
    },
    /// Assemble, then draw repeatedly in this process.
    Simulate {
        #[arg(long)]
        strategy: i64,

        /// Award catalog; evicts cached awards and rule like `assemble --catalog`.
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        weight: Option<String>,

        #[arg(long, default_value_t = 10_000)]
        draws: usize,
    },
}

//! Strategy armory: assembly and dispatch over shared collaborators.

use std::sync::Arc;

use crate::assembler::{AssemblyReport, StrategyAssembler};
use crate::cache::CacheStore;
use crate::dispatcher::StrategyDispatcher;
use crate::error::Result;
use crate::model::ProbabilityTable;
use crate::source::AwardSource;

/// Single entry point combining [`StrategyAssembler`] and [`StrategyDispatcher`].
pub struct StrategyArmory {
    assembler: StrategyAssembler,
    dispatcher: StrategyDispatcher,
}

impl StrategyArmory {
    /// Create an armory over a cache store and an award source.
    pub fn new(cache: Arc<dyn CacheStore>, source: Arc<dyn AwardSource>) -> Self {
        Self {
            assembler: StrategyAssembler::new(Arc::clone(&cache), source),
            dispatcher: StrategyDispatcher::new(cache),
        }
    }

    /// Read weight rules under a different rule model name.
    #[must_use]
    pub fn with_weight_rule_model(mut self, rule_model: impl Into<String>) -> Self {
        self.assembler = self.assembler.with_weight_rule_model(rule_model);
        self
    }

    /// The dispatcher half.
    #[must_use]
    pub fn dispatcher(&self) -> &StrategyDispatcher {
        &self.dispatcher
    }

    /// See [`StrategyAssembler::assemble`].
    ///
    /// # Errors
    ///
    /// Propagates assembler errors.
    pub fn assemble(&self, strategy_id: i64) -> Result<AssemblyReport> {
        self.assembler.assemble(strategy_id)
    }

    /// See [`StrategyDispatcher::draw`].
    ///
    /// # Errors
    ///
    /// Propagates cache failures.
    pub fn draw(&self, strategy_id: i64) -> Result<Option<i32>> {
        self.dispatcher.draw(strategy_id)
    }

    /// See [`StrategyDispatcher::draw_weighted`].
    ///
    /// # Errors
    ///
    /// Propagates cache failures.
    pub fn draw_weighted(&self, strategy_id: i64, weight_key: &str) -> Result<Option<i32>> {
        self.dispatcher.draw_weighted(strategy_id, weight_key)
    }

    /// See [`StrategyDispatcher::load_table`].
    ///
    /// # Errors
    ///
    /// Propagates cache failures and incomplete tables.
    pub fn load_table(
        &self,
        strategy_id: i64,
        weight_key: Option<&str>,
    ) -> Result<Option<ProbabilityTable>> {
        self.dispatcher.load_table(strategy_id, weight_key)
    }
}

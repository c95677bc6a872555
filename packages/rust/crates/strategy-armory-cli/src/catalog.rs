//! Award catalog files: YAML stand-in for the award configuration store.
//!
//! ```yaml
//! strategies:
//!   - strategy_id: 100001
//!     awards:
//!       - { award_id: 101, award_rate: 0.1, award_title: "first prize" }
//!     rules:
//!       - { rule_model: rule_weight, rule_value: "4000:101" }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use strategy_armory::{
    AwardCandidate, InMemoryAwardSource, StrategyAwardRecord, StrategyRuleRecord, WeightRule,
};

const STRATEGY_RULE_TYPE: i32 = 1;
const AWARD_RULE_TYPE: i32 = 2;

/// Parsed catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardCatalog {
    #[serde(default)]
    pub strategies: Vec<CatalogStrategy>,
}

/// One strategy's awards and rules.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogStrategy {
    pub strategy_id: i64,
    #[serde(default)]
    pub awards: Vec<CatalogAward>,
    #[serde(default)]
    pub rules: Vec<CatalogRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogAward {
    pub award_id: i32,
    pub award_rate: Decimal,
    #[serde(default)]
    pub award_title: Option<String>,
    #[serde(default)]
    pub award_count: Option<i32>,
    #[serde(default)]
    pub rule_models: Option<String>,
    #[serde(default)]
    pub sort: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRule {
    pub rule_model: String,
    pub rule_value: String,
    /// Set for award-scoped rules.
    #[serde(default)]
    pub award_id: Option<i32>,
    #[serde(default)]
    pub rule_desc: Option<String>,
}

impl AwardCatalog {
    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read award catalog {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("invalid award catalog {}", path.display()))
    }

    /// Parse catalog YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` does not match the catalog layout.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let catalog = serde_yaml::from_str::<Option<Self>>(raw)
            .context("failed to parse award catalog yaml")?;
        Ok(catalog.unwrap_or_default())
    }

    /// Register every strategy and its strategy-scoped rules into `source`;
    /// returns the number of strategy entries read.
    ///
    /// A strategy listed twice keeps the award list of its last entry.
    pub fn populate(&self, source: &InMemoryAwardSource) -> usize {
        for strategy in &self.strategies {
            if source.strategy_ids().contains(&strategy.strategy_id) {
                tracing::warn!(
                    strategy_id = strategy.strategy_id,
                    "strategy listed more than once in award catalog; last entry wins"
                );
            }
            let awards: Vec<AwardCandidate> = strategy
                .award_records()
                .into_iter()
                .map(AwardCandidate::from)
                .collect();
            source.put_awards(strategy.strategy_id, awards);
            // Award-scoped rules belong to the draw chain, not to table assembly.
            for record in strategy.rule_records() {
                if record.award_id.is_none() {
                    source.put_rule(WeightRule::from(record));
                }
            }
        }
        self.strategies.len()
    }

    /// Build an in-memory source holding the whole catalog.
    #[must_use]
    pub fn into_source(self) -> InMemoryAwardSource {
        let source = InMemoryAwardSource::new();
        let count = self.populate(&source);
        tracing::debug!(strategies = count, "award catalog loaded");
        source
    }
}

impl CatalogStrategy {
    /// Awards as configuration-store rows.
    #[must_use]
    pub fn award_records(&self) -> Vec<StrategyAwardRecord> {
        self.awards
            .iter()
            .map(|award| StrategyAwardRecord {
                strategy_id: self.strategy_id,
                award_id: award.award_id,
                award_title: award.award_title.clone(),
                award_count: award.award_count,
                award_count_surplus: award.award_count,
                award_rate: award.award_rate,
                rule_models: award.rule_models.clone(),
                sort: award.sort,
                ..StrategyAwardRecord::default()
            })
            .collect()
    }

    /// Rules as configuration-store rows.
    #[must_use]
    pub fn rule_records(&self) -> Vec<StrategyRuleRecord> {
        self.rules
            .iter()
            .map(|rule| StrategyRuleRecord {
                strategy_id: self.strategy_id,
                award_id: rule.award_id,
                rule_type: Some(if rule.award_id.is_some() {
                    AWARD_RULE_TYPE
                } else {
                    STRATEGY_RULE_TYPE
                }),
                rule_model: rule.rule_model.clone(),
                rule_value: rule.rule_value.clone(),
                rule_desc: rule.rule_desc.clone(),
            })
            .collect()
    }
}

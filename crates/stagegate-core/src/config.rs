// Rust guideline compliant 2026-10-14

//! Configuration management for Stagegate.

use crate::criteria::{CriteriaEvaluator, Rule};
use crate::limits::WipDefaults;
use crate::{Error, Gate, GateCatalog, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// Human-readable table format.
    #[default]
    Table,
    /// Plain text format.
    Plain,
}

/// WIP limit overrides, keyed by gate name.
///
/// Gates not listed keep their default limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipConfig {
    /// Per-pod limits applied to every pod.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub per_pod: BTreeMap<String, u32>,

    /// Cross-pod limits.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cross_pod: BTreeMap<String, u32>,

    /// Portfolio-wide limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<u32>,
}

/// Configuration for Stagegate behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Default output format for commands.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Limits used when scopes are initialized.
    #[serde(default)]
    pub wip: WipConfig,

    /// Review SLA in days, keyed by gate name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sla_days: BTreeMap<String, u32>,

    /// Additional or replacement criterion rules.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub criteria: BTreeMap<String, Rule>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            output_format: OutputFormat::default(),
            wip: WipConfig::default(),
            sla_days: BTreeMap::new(),
            criteria: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file at `.stagegate/config.toml`
    /// 3. Environment variables with `STAGEGATE_` prefix
    ///
    /// # Arguments
    ///
    /// * `stagegate_dir` - Path to the `.stagegate` directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file exists but cannot be read
    /// - Configuration file contains invalid TOML
    /// - Configuration values fail validation
    pub fn load(stagegate_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        let config_path = stagegate_dir.join("config.toml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            config = toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `STAGEGATE_LOG_LEVEL` - Log filter directive
    /// - `STAGEGATE_OUTPUT_FORMAT` - Output format (json/table/plain)
    /// - `STAGEGATE_PORTFOLIO_LIMIT` - Portfolio-wide WIP limit
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values are invalid.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("STAGEGATE_LOG_LEVEL") {
            self.log_level = val;
        }

        if let Ok(val) = std::env::var("STAGEGATE_OUTPUT_FORMAT") {
            self.output_format = match val.as_str() {
                "json" => OutputFormat::Json,
                "table" => OutputFormat::Table,
                "plain" => OutputFormat::Plain,
                _ => {
                    return Err(Error::Config(
                        "STAGEGATE_OUTPUT_FORMAT must be json, table, or plain".to_string(),
                    ))
                }
            };
        }

        if let Ok(val) = std::env::var("STAGEGATE_PORTFOLIO_LIMIT") {
            let limit = val.parse().map_err(|_| {
                Error::Config("STAGEGATE_PORTFOLIO_LIMIT must be a non-negative number".to_string())
            })?;
            self.wip.portfolio = Some(limit);
        }

        Ok(())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - log_level is empty
    /// - A gate name is unknown, or a terminal gate carries a WIP limit
    /// - An SLA is zero or set for KILLED
    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            return Err(Error::Config("log_level cannot be empty".to_string()));
        }

        self.wip_defaults()?.scopes()?;
        self.catalog()?;
        Ok(())
    }

    /// WIP defaults with configured overrides applied.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a gate name is unknown.
    pub fn wip_defaults(&self) -> Result<WipDefaults> {
        let mut defaults = WipDefaults::default();
        defaults.per_pod.extend(parse_gate_keys("wip.per_pod", &self.wip.per_pod)?);
        defaults
            .cross_pod
            .extend(parse_gate_keys("wip.cross_pod", &self.wip.cross_pod)?);
        if let Some(portfolio) = self.wip.portfolio {
            defaults.portfolio = portfolio;
        }
        Ok(defaults)
    }

    /// SLA overrides keyed by gate.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a gate name is unknown.
    pub fn sla_overrides(&self) -> Result<BTreeMap<Gate, u32>> {
        parse_gate_keys("sla_days", &self.sla_days)
    }

    /// The standard catalog with configured SLA overrides.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown gates, zero SLAs, or an SLA on KILLED.
    pub fn catalog(&self) -> Result<GateCatalog> {
        GateCatalog::standard().with_sla_overrides(&self.sla_overrides()?)
    }

    /// The standard evaluator extended with configured rules.
    #[must_use]
    pub fn evaluator(&self) -> CriteriaEvaluator {
        CriteriaEvaluator::standard().with_rules(&self.criteria)
    }

    /// Saves the configuration to a TOML file.
    ///
    /// # Arguments
    ///
    /// * `stagegate_dir` - Path to the `.stagegate` directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be created or written
    /// - Serialization fails
    pub fn save(&self, stagegate_dir: &Path) -> Result<()> {
        let config_path = stagegate_dir.join("config.toml");
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn parse_gate_keys(section: &str, table: &BTreeMap<String, u32>) -> Result<BTreeMap<Gate, u32>> {
    table
        .iter()
        .map(|(name, value)| {
            let gate = name
                .parse::<Gate>()
                .map_err(|_| Error::Config(format!("{}: unknown gate '{}'", section, name)))?;
            Ok((gate, *value))
        })
        .collect()
}

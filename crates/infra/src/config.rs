//! Configuration loading and representation.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use costbook_core::Money;
use costbook_observability::LogFormat;

/// Runtime configuration for the costbook binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostbookConfig {
    /// Log line format (`COSTBOOK_LOG_FORMAT`).
    pub log_format: LogFormat,

    /// Fewest transactions a bulk simulation generates (`COSTBOOK_SIMULATION_MIN`).
    pub simulation_min: usize,

    /// Most transactions a bulk simulation generates (`COSTBOOK_SIMULATION_MAX`).
    pub simulation_max: usize,

    /// Upper bound for a simulated purchase quantity (`COSTBOOK_MAX_PURCHASE_QUANTITY`).
    pub max_purchase_quantity: u64,

    /// Upper bound for a simulated unit cost (`COSTBOOK_MAX_UNIT_COST`).
    pub max_unit_cost: Money,

    /// Decimal places used when printing money (`COSTBOOK_DISPLAY_SCALE`).
    pub display_scale: u32,
}

impl Default for CostbookConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            simulation_min: 5,
            simulation_max: 10,
            max_purchase_quantity: 20,
            max_unit_cost: Money::from_cents(5000),
            display_scale: 2,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {0}")]
    InvalidValue(String),

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

impl CostbookConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            log_format: parse_or(&lookup, "COSTBOOK_LOG_FORMAT", defaults.log_format)?,
            simulation_min: parse_or(&lookup, "COSTBOOK_SIMULATION_MIN", defaults.simulation_min)?,
            simulation_max: parse_or(&lookup, "COSTBOOK_SIMULATION_MAX", defaults.simulation_max)?,
            max_purchase_quantity: parse_or(
                &lookup,
                "COSTBOOK_MAX_PURCHASE_QUANTITY",
                defaults.max_purchase_quantity,
            )?,
            max_unit_cost: parse_or(&lookup, "COSTBOOK_MAX_UNIT_COST", defaults.max_unit_cost)?,
            display_scale: parse_or(&lookup, "COSTBOOK_DISPLAY_SCALE", defaults.display_scale)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation_min == 0 {
            return Err(ConfigError::Inconsistent(
                "COSTBOOK_SIMULATION_MIN must be at least 1".to_string(),
            ));
        }
        if self.simulation_min > self.simulation_max {
            return Err(ConfigError::Inconsistent(format!(
                "COSTBOOK_SIMULATION_MIN ({}) exceeds COSTBOOK_SIMULATION_MAX ({})",
                self.simulation_min, self.simulation_max
            )));
        }
        if self.max_purchase_quantity == 0 {
            return Err(ConfigError::Inconsistent(
                "COSTBOOK_MAX_PURCHASE_QUANTITY must be at least 1".to_string(),
            ));
        }
        if self.max_unit_cost.is_negative() || self.max_unit_cost.is_zero() {
            return Err(ConfigError::Inconsistent(
                "COSTBOOK_MAX_UNIT_COST must be positive".to_string(),
            ));
        }
        if self.display_scale > 10 {
            return Err(ConfigError::Inconsistent(
                "COSTBOOK_DISPLAY_SCALE must be at most 10".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = CostbookConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CostbookConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = CostbookConfig::from_lookup(lookup(&[
            ("COSTBOOK_LOG_FORMAT", "pretty"),
            ("COSTBOOK_SIMULATION_MIN", "2"),
            ("COSTBOOK_SIMULATION_MAX", "3"),
            ("COSTBOOK_MAX_UNIT_COST", "12.75"),
            ("COSTBOOK_DISPLAY_SCALE", "4"),
        ]))
        .unwrap();

        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.simulation_min, 2);
        assert_eq!(config.simulation_max, 3);
        assert_eq!(config.max_unit_cost, Money::from_cents(1275));
        assert_eq!(config.display_scale, 4);
    }

    #[test]
    fn unparsable_value_names_the_variable() {
        let err = CostbookConfig::from_lookup(lookup(&[("COSTBOOK_SIMULATION_MAX", "many")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidValue("COSTBOOK_SIMULATION_MAX".to_string()));
    }

    #[test]
    fn rejects_inverted_simulation_range() {
        let err = CostbookConfig::from_lookup(lookup(&[
            ("COSTBOOK_SIMULATION_MIN", "9"),
            ("COSTBOOK_SIMULATION_MAX", "4"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn rejects_non_positive_unit_cost_bound() {
        let err = CostbookConfig::from_lookup(lookup(&[("COSTBOOK_MAX_UNIT_COST", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }
}

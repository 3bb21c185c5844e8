use std::path::Path;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DEFAULT_PARAMETER_CEILING;

/// Errors raised while loading or checking a [`GenerationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Target sizes and windows for one generation run.
///
/// Built once at start-up and shared read-only by every populator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub products: usize,
    pub customers: usize,
    pub branches: usize,
    pub employees: usize,
    pub sales_rows: usize,
    pub satisfaction_rows: usize,
    /// Survey dates are drawn from the trailing window of this many years.
    pub satisfaction_years: u32,
    pub finance_years: u32,
    pub web_metrics_months: u32,
    pub time_window_years: u32,
    /// Upper bound on rows per insert; further reduced to honor the ceiling.
    pub batch_size: usize,
    pub parameter_ceiling: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Last day of the historical window. Defaults to today (UTC).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_date: Option<NaiveDate>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            products: 2_000,
            customers: 50_000,
            branches: 20,
            employees: 2_000,
            sales_rows: 894_083,
            satisfaction_rows: 50_000,
            satisfaction_years: 2,
            finance_years: 3,
            web_metrics_months: 36,
            time_window_years: 3,
            batch_size: 100,
            parameter_ceiling: DEFAULT_PARAMETER_CEILING,
            seed: None,
            anchor_date: None,
        }
    }
}

impl GenerationConfig {
    pub fn anchor(&self) -> NaiveDate {
        self.anchor_date.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parameter_ceiling < 2 {
            return Err(ConfigError::Invalid(format!(
                "parameter_ceiling must be >= 2, got {}",
                self.parameter_ceiling
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be > 0".to_string()));
        }
        if self.time_window_years == 0 {
            return Err(ConfigError::Invalid(
                "time_window_years must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Fact windows that reach past the time dimension, by name.
    ///
    /// Rows landing outside the window are dropped or fall back to the
    /// primary date, so these are worth a warning but are not fatal.
    pub fn windows_exceeding_time_dimension(&self) -> Vec<&'static str> {
        let mut exceeding = Vec::new();
        if self.finance_years > self.time_window_years {
            exceeding.push("finance_years");
        }
        if self.satisfaction_years > self.time_window_years {
            exceeding.push("satisfaction_years");
        }
        if self.web_metrics_months > self.time_window_years * 12 {
            exceeding.push("web_metrics_months");
        }
        exceeding
    }

    /// Proportionally reduced copy; dimension counts never drop below one.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |value: usize| ((value as f64) * factor).round().max(1.0) as usize;
        let scale_fact = |value: usize| ((value as f64) * factor).round().max(0.0) as usize;
        Self {
            products: scale(self.products),
            customers: scale(self.customers),
            branches: scale(self.branches),
            employees: scale(self.employees),
            sales_rows: scale_fact(self.sales_rows),
            satisfaction_rows: scale_fact(self.satisfaction_rows),
            ..self.clone()
        }
    }
}

/// Load a configuration from a TOML file; missing keys take defaults.
pub fn load_config(path: &Path) -> Result<GenerationConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: GenerationConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GenerationConfig = toml::from_str(
            r#"
            branches = 5
            sales_rows = 1000
            anchor_date = "2024-06-30"
            "#,
        )
        .expect("parse config");

        assert_eq!(config.branches, 5);
        assert_eq!(config.sales_rows, 1000);
        assert_eq!(config.products, 2_000);
        assert_eq!(config.parameter_ceiling, DEFAULT_PARAMETER_CEILING);
        assert_eq!(config.anchor(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let config = GenerationConfig {
            batch_size: 0,
            ..GenerationConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn scaling_keeps_dimensions_non_empty() {
        let config = GenerationConfig::default().scaled(0.01);
        assert_eq!(config.branches, 1);
        assert_eq!(config.products, 20);
        assert_eq!(config.sales_rows, 8_941);
        assert_eq!(config.time_window_years, 3);
    }

    #[test]
    fn flags_fact_windows_longer_than_time_dimension() {
        let config = GenerationConfig {
            time_window_years: 1,
            finance_years: 1,
            satisfaction_years: 2,
            web_metrics_months: 12,
            ..GenerationConfig::default()
        };
        assert_eq!(
            config.windows_exceeding_time_dimension(),
            vec!["satisfaction_years"]
        );
    }
}

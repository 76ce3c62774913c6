//! Throttle Configuration
//!
//! ## ThrottleConfig
//!
//! - **name**: Label attached to every rate report (default: "producer")
//! - **limit_per_second**: Messages allowed per one-second window (default: 1000)
//! - **report_interval_ms**: Sampling period of the rate reporter (default: 1000)
//!
//! ## Environment
//!
//! [`ThrottleConfig::from_env`] overlays these variables on the defaults:
//!
//! - `STREAMFORGE_REPORTER_NAME`
//! - `STREAMFORGE_RATE_LIMIT`
//! - `STREAMFORGE_REPORT_INTERVAL_MS`

use crate::error::{Result, ThrottleError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Reporter label
    #[serde(default = "default_name")]
    pub name: String,

    /// Maximum messages per one-second window
    #[serde(default = "default_limit_per_second")]
    pub limit_per_second: u64,

    /// Rate sampling period in milliseconds
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            limit_per_second: default_limit_per_second(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

impl ThrottleConfig {
    /// Build a config from `STREAMFORGE_*` environment variables.
    ///
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let name = std::env::var("STREAMFORGE_REPORTER_NAME").unwrap_or(defaults.name);

        let limit_per_second = std::env::var("STREAMFORGE_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.limit_per_second);

        let report_interval_ms = std::env::var("STREAMFORGE_REPORT_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.report_interval_ms);

        Self {
            name,
            limit_per_second,
            report_interval_ms,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit_per_second == 0 {
            return Err(ThrottleError::InvalidArgument(
                "limit_per_second must be greater than 0".to_string(),
            ));
        }
        if self.report_interval_ms == 0 {
            return Err(ThrottleError::InvalidArgument(
                "report_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_name() -> String {
    "producer".to_string()
}

fn default_limit_per_second() -> u64 {
    1000
}

fn default_report_interval_ms() -> u64 {
    1000
}

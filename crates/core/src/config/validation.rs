//! Sanity checks applied to a loaded [`AppConfig`].

use std::ops::RangeInclusive;

use crate::config::{AppConfig, NotifierKind};
use thiserror::Error;

const MAX_BYTES_RANGE: RangeInclusive<usize> = 1..=100 * 1024 * 1024;
const TIMEOUT_MS_RANGE: RangeInclusive<u64> = 100..=300_000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
}

impl AppConfig {
    /// Reject values the proxy cannot run with.
    ///
    /// Fetch limits must sit inside sane bounds (body cap up to 100MB,
    /// timeout between 100ms and 5 minutes), the listen address and user
    /// agent must be present, a configured base path must not be blank, and
    /// the GPIO notifier needs two distinct pins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !MAX_BYTES_RANGE.contains(&self.max_bytes) {
            return Err(invalid("max_bytes", format!("must be between 1 and {} bytes", MAX_BYTES_RANGE.end())));
        }

        if !TIMEOUT_MS_RANGE.contains(&self.timeout_ms) {
            return Err(invalid(
                "timeout_ms",
                format!("must be between {}ms and {}ms", TIMEOUT_MS_RANGE.start(), TIMEOUT_MS_RANGE.end()),
            ));
        }

        for (field, value) in [("bind_addr", &self.bind_addr), ("user_agent", &self.user_agent)] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        if self.base_path.is_some() && self.base_path().is_none() {
            return Err(invalid("base_path", "must not be blank when set"));
        }

        if self.notifier == NotifierKind::Gpio && self.success_pin == self.error_pin {
            return Err(invalid("error_pin", format!("must differ from success_pin ({})", self.success_pin)));
        }

        Ok(())
    }
}

//! Registry and point configuration.
//!
//! # Invariants
//! - Every field has a default, so `{}` is a valid configuration.
//! - Unknown keys are rejected to surface typos early.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How `Point::invoke` reacts when one extension method fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutPolicy {
    /// Log the failure and keep calling the remaining extensions.
    #[default]
    Isolate,
    /// Log the failure and skip every extension after the failing one.
    StopOnFirstError,
}

/// Per-point settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointConfig {
    pub fan_out: FanOutPolicy,
}

/// Registry-wide settings, applied to every point the registry creates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub point: PointConfig,
}

impl RegistryConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    /// - Returns `ConfigError::InvalidJson` for malformed input, unknown keys
    ///   or unsupported policy names.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|err| ConfigError::InvalidJson(err.to_string()))
    }
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidJson(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(message) => write!(f, "invalid registry config: {message}"),
        }
    }
}

impl Error for ConfigError {}

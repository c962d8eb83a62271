//! Configuration types and validation for resilience patterns.
//!
//! Each pattern keeps its own `serde`-deserializable config struct with a
//! `Default` impl next to the component it configures (see `RetryConfig` in
//! [`crate::patterns::retry`] and `CircuitBreakerConfig` in
//! [`crate::patterns::circuit_breaker`]) rather than routing through a
//! monolithic configuration crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Error returned when a resilience configuration fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Build a validation error with the given message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid resilience configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Result alias for configuration validation.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Base configuration trait for resilience patterns.
pub trait ResilienceConfig: Send + Sync + Serialize + for<'de> Deserialize<'de> + Clone {
    /// Validate configuration, returning a [`ConfigError`] on the first
    /// violated constraint.
    fn validate(&self) -> ConfigResult<()>;

    /// Get default configuration.
    fn default_config() -> Self
    where
        Self: Sized;

    /// Merge with another configuration, preferring fields present on `other`.
    fn merge(&mut self, other: Self)
    where
        Self: Sized;
}

/// Common configuration parameters shared by every pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonConfig {
    /// Operation timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Enable metrics collection.
    pub metrics_enabled: bool,

    /// Enable debug logging.
    pub debug_enabled: bool,

    /// Service name, used in metrics and log fields.
    pub service_name: String,

    /// Deployment environment.
    pub environment: Environment,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            metrics_enabled: true,
            debug_enabled: false,
            service_name: "default".to_string(),
            environment: Environment::Production,
        }
    }
}

impl ResilienceConfig for CommonConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(timeout) = self.timeout {
            if timeout.as_millis() == 0 {
                return Err(ConfigError::validation("timeout must be greater than 0"));
            }
            if timeout.as_secs() > 3600 {
                return Err(ConfigError::validation("timeout cannot exceed 1 hour"));
            }
        }

        if self.service_name.is_empty() {
            return Err(ConfigError::validation("service name cannot be empty"));
        }

        if self.service_name.len() > 256 {
            return Err(ConfigError::validation(
                "service name too long (max 256 chars)",
            ));
        }

        if !self
            .service_name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(ConfigError::validation(
                "service name contains invalid characters",
            ));
        }

        Ok(())
    }

    fn default_config() -> Self {
        Self::default()
    }

    fn merge(&mut self, other: Self) {
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        self.metrics_enabled = other.metrics_enabled;
        self.debug_enabled = other.debug_enabled;
        if !other.service_name.is_empty() {
            self.service_name = other.service_name;
        }
        self.environment = other.environment;
    }
}

/// Environment enumeration for configuration context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment with relaxed constraints.
    Development,
    /// Staging environment for testing.
    Staging,
    /// Production environment with strict settings.
    #[default]
    Production,
}

/// Configurable trait for resilience patterns that can be reconfigured
/// at runtime.
pub trait Configurable {
    /// Configuration type for this pattern.
    type Config: ResilienceConfig;

    /// Apply configuration.
    fn configure(&mut self, config: Self::Config) -> ConfigResult<()>;

    /// Get current configuration.
    fn configuration(&self) -> &Self::Config;
}

/// Macro for resilience configuration validation.
#[macro_export]
macro_rules! validate_resilience_config {
    ($config:expr, $($field:ident : $validator:expr),* $(,)?) => {{
        $(
            if let Err(e) = $validator(&$config.$field) {
                return Err($crate::core::config::ConfigError::validation(
                    format!("field '{}': {}", stringify!($field), e)
                ));
            }
        )*
        Ok(())
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_config_validates_defaults() {
        assert!(CommonConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_service_name_is_rejected() {
        let mut cfg = CommonConfig::default();
        cfg.service_name.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn merge_prefers_other_fields() {
        let mut cfg = CommonConfig::default();
        let other = CommonConfig {
            service_name: "overridden".into(),
            ..CommonConfig::default()
        };
        cfg.merge(other);
        assert_eq!(cfg.service_name, "overridden");
    }
}

//! Builds and installs the global `tracing` subscriber.

use gridflow_error::{GridflowError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{Config, Format};

/// Guard returned by [`LoggerBuilder::build`]; dropping it has no effect
/// today (there is no non-blocking writer to flush) but callers are
/// expected to hold it for the process lifetime, matching the usual
/// `tracing` idiom of binding `_guard` in `main`.
#[must_use = "dropping the guard early does not un-install the subscriber, but holding it documents intent"]
pub struct LoggerGuard {
    _private: (),
}

impl LoggerGuard {
    pub(crate) fn noop() -> Self {
        Self { _private: () }
    }
}

/// Fluent builder over [`Config`].
#[derive(Debug, Clone, Default)]
pub struct LoggerBuilder {
    config: Config,
}

impl LoggerBuilder {
    /// Start from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing [`Config`].
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Select [`Format::Json`] or [`Format::Text`].
    #[must_use]
    pub fn json(mut self, json: bool) -> Self {
        self.config.format = if json { Format::Json } else { Format::Text };
        self
    }

    /// Enable or disable ANSI color codes.
    #[must_use]
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.config.ansi = ansi;
        self
    }

    /// Set the `EnvFilter` directive string.
    #[must_use]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.config.env_filter = directives.into();
        self
    }

    /// Install the subscriber as the global default.
    ///
    /// # Errors
    /// Returns an error if the filter directives fail to parse or a
    /// global subscriber has already been installed.
    pub fn init(self) -> Result<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.env_filter).map_err(|e| {
            GridflowError::config(format!("invalid env_filter '{}': {e}", self.config.env_filter))
        })?;

        let registry = Registry::default().with(filter);

        let result = match self.config.format {
            Format::Json => {
                let layer = tracing_subscriber::fmt::layer().json().with_ansi(false);
                registry.with(layer).try_init()
            }
            Format::Text => {
                let layer = tracing_subscriber::fmt::layer().with_ansi(self.config.ansi);
                registry.with(layer).try_init()
            }
        };

        result.map_err(|e| GridflowError::internal(format!("logger already initialized: {e}")))?;

        Ok(LoggerGuard { _private: () })
    }
}

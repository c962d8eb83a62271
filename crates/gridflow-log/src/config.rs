//! Configuration for the logging subscriber.

/// Output encoding for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable, single-line-per-event text.
    #[default]
    Text,
    /// Newline-delimited JSON, suitable for log aggregators.
    Json,
}

/// Thin, serde-free configuration for [`crate::LoggerBuilder`].
///
/// There is deliberately no file rotation, Sentry, or `OpenTelemetry`
/// exporter here — a full observability stack is out of scope for an
/// orchestration core; those concerns belong to whatever deploys it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output encoding.
    pub format: Format,
    /// Emit ANSI color codes (ignored when `format` is [`Format::Json`]).
    pub ansi: bool,
    /// `tracing_subscriber::EnvFilter` directive string, e.g. `"gridflow=debug,info"`.
    pub env_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Format::Text,
            ansi: true,
            env_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Colorized text output at `debug` for the crate, `info` otherwise.
    #[must_use]
    pub fn development() -> Self {
        Self {
            format: Format::Text,
            ansi: true,
            env_filter: "gridflow=debug,info".to_string(),
        }
    }

    /// JSON output with no ANSI codes, `info` level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            format: Format::Json,
            ansi: false,
            env_filter: "info".to_string(),
        }
    }

    /// Read `env_filter` from `RUST_LOG`/`GRIDFLOW_LOG`, falling back to `"info"`.
    #[must_use]
    pub fn from_env() -> Self {
        let env_filter = std::env::var("GRIDFLOW_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        Self {
            env_filter,
            ..Self::default()
        }
    }

    /// Quiet text output used by [`crate::init_test`].
    #[cfg(test)]
    #[must_use]
    pub fn test() -> Self {
        Self {
            format: Format::Text,
            ansi: false,
            env_filter: "warn".to_string(),
        }
    }
}

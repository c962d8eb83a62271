//! # Gridflow Log
//!
//! Thin `tracing` + `tracing-subscriber` initialization shared by every
//! crate in the workspace. There is no file rotation, no Sentry, no
//! `OpenTelemetry` exporter here — those are genuinely out of scope for
//! an orchestration core and are left to whatever deploys it; every other
//! crate instruments its public operations with `tracing::instrument`
//! and structured `info!`/`warn!`/`error!`/`debug!` fields directly.
//!
//! ## Quick start
//!
//! ```no_run
//! use gridflow_log::prelude::*;
//!
//! fn main() -> gridflow_error::Result<()> {
//!     let _guard = gridflow_log::auto_init()?;
//!     info!(port = 8080, "server starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod macros;
mod timing;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, Format};
pub use timing::{Timed, Timer, TimerGuard};

// Re-export the tracing macros so callers only need this one crate.
pub use tracing::{debug, error, info, instrument, span, trace, warn};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{Timed, Timer, debug, error, info, instrument, span, trace, warn};
    pub use tracing::{Span, field};
}

#[cfg(test)]
static TEST_INIT: std::sync::OnceLock<()> = std::sync::OnceLock::new();

/// Auto-detect and install the best configuration for the current environment.
///
/// Reads `GRIDFLOW_LOG` or `RUST_LOG` if set; otherwise uses
/// [`Config::development`] in debug builds and [`Config::production`] in
/// release builds.
///
/// # Errors
/// See [`LoggerBuilder::init`].
pub fn auto_init() -> gridflow_error::Result<LoggerGuard> {
    #[cfg(test)]
    {
        TEST_INIT.get_or_init(|| ());
        if tracing::dispatcher::has_been_set() {
            return Ok(LoggerGuard::noop());
        }
    }

    if std::env::var("GRIDFLOW_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Install the subscriber with [`Config::default`].
///
/// # Errors
/// See [`LoggerBuilder::init`].
pub fn init() -> gridflow_error::Result<LoggerGuard> {
    init_with(Config::default())
}

/// Install the subscriber with a caller-supplied [`Config`].
///
/// # Errors
/// See [`LoggerBuilder::init`].
pub fn init_with(config: Config) -> gridflow_error::Result<LoggerGuard> {
    LoggerBuilder::from_config(config).init()
}

/// Install a quiet subscriber for tests, idempotently.
///
/// # Errors
/// See [`LoggerBuilder::init`].
#[cfg(test)]
pub fn init_test() -> gridflow_error::Result<LoggerGuard> {
    TEST_INIT.get_or_init(|| ());
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggerGuard::noop());
    }
    init_with(Config::test())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_text_with_ansi() {
        let config = Config::default();
        assert_eq!(config.format, Format::Text);
        assert!(config.ansi);
        assert_eq!(config.env_filter, "info");
    }

    #[test]
    fn production_config_disables_ansi_and_uses_json() {
        let config = Config::production();
        assert_eq!(config.format, Format::Json);
        assert!(!config.ansi);
    }

    #[test]
    fn builder_rejects_invalid_env_filter() {
        let result = LoggerBuilder::new().env_filter("not a valid directive===").init();
        assert!(result.is_err());
    }

    #[test]
    fn auto_init_is_idempotent_within_a_process() {
        let _first = init_test().expect("first init succeeds");
        let _second = init_test().expect("second init is a no-op, not an error");
    }
}

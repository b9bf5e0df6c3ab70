//! Tracing setup.
//!
//! The log level follows the `Debug` field of the active [`Config`]: info by
//! default, debug when the flag is set. CLI verbosity can raise it further.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// Picks the log level for a config and CLI verbosity.
pub fn level_for(config: &Config, verbosity: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbosity {
        0 if config.is_debug() => Level::DEBUG,
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber. `RUST_LOG` directives are honored on top
/// of the chosen level.
pub fn init(config: &Config, verbosity: u8, quiet: bool) -> anyhow::Result<()> {
    let level = level_for(config, verbosity, quiet);

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(level_for(&Config::default(), 0, false), Level::INFO);
    }

    #[test]
    fn test_debug_flag_raises_level() {
        let config = Config::new().with_debug(true);
        assert_eq!(level_for(&config, 0, false), Level::DEBUG);

        let config = Config::new().with_debug(false);
        assert_eq!(level_for(&config, 0, false), Level::INFO);
    }

    #[test]
    fn test_verbosity_and_quiet() {
        let config = Config::new().with_debug(true);
        assert_eq!(level_for(&config, 2, false), Level::TRACE);
        assert_eq!(level_for(&config, 0, true), Level::ERROR);
    }
}

//! Logging setup for ipenforcer.
//!
//! Library code logs through the `log` facade. This module picks the
//! verbosity and installs an `env_logger` backend writing to stderr.

use std::env;
use std::fmt;

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Environment variable selecting the log level.
pub const ENV_LOG_MODE: &str = "IPENFORCER_LOG_MODE";

/// Logging level for controlling output verbosity.
///
/// Log levels are ordered from least verbose (Quiet) to most verbose (Verbose).
///
/// # Examples
///
/// ```
/// use ipenforcer::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Errors only.
    Quiet,
    /// Plans, attempts, deletions and failures.
    Normal,
    /// Everything, including request and polling detail.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl LogLevel {
    /// Parses a log level from a string.
    ///
    /// Recognizes: "quiet", "normal", "verbose" (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipenforcer::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("quiet").unwrap(), LogLevel::Quiet);
    /// assert_eq!(LogLevel::parse("VERBOSE").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("invalid").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }

    /// Returns the `log` filter for this level.
    #[must_use]
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::Error,
            Self::Normal => LevelFilter::Info,
            Self::Verbose => LevelFilter::Debug,
        }
    }
}

/// Picks the log level from CLI flags and the environment.
///
/// The priority order is:
/// 1. CLI flags (verbose/quiet)
/// 2. `IPENFORCER_LOG_MODE` environment variable
/// 3. Default (Normal)
///
/// If both `verbose` and `quiet` are true, `verbose` takes precedence.
#[must_use]
pub fn resolve_level(verbose: bool, quiet: bool) -> LogLevel {
    if verbose {
        return LogLevel::Verbose;
    }
    if quiet {
        return LogLevel::Quiet;
    }

    env::var(ENV_LOG_MODE)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok())
        .unwrap_or(LogLevel::Normal)
}

/// Installs the stderr logger and returns the chosen level.
///
/// `RUST_LOG` directives are applied on top of the chosen level. Calling this
/// more than once keeps the first logger.
///
/// # Examples
///
/// ```
/// use ipenforcer::{init_logger, LogLevel};
///
/// let level = init_logger(false, true);
/// assert_eq!(level, LogLevel::Quiet);
/// ```
pub fn init_logger(verbose: bool, quiet: bool) -> LogLevel {
    let level = resolve_level(verbose, quiet);

    let mut builder = Builder::new();
    builder
        .target(Target::Stderr)
        .filter_level(level.filter())
        .format_target(level == LogLevel::Verbose);
    if let Ok(directives) = env::var("RUST_LOG") {
        builder.parse_filters(&directives);
    }
    if builder.try_init().is_err() {
        log::debug!("logger already initialised, keeping existing configuration");
    }

    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Quiet < LogLevel::Normal);
        assert!(LogLevel::Normal < LogLevel::Verbose);
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(format!("{}", LogLevel::Quiet), "quiet");
        assert_eq!(format!("{}", LogLevel::Normal), "normal");
        assert_eq!(format!("{}", LogLevel::Verbose), "verbose");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("Normal").unwrap(), LogLevel::Normal);
        assert!(LogLevel::parse("").is_err());
    }

    #[test]
    fn test_filters() {
        assert_eq!(LogLevel::Quiet.filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Normal.filter(), LevelFilter::Info);
        assert_eq!(LogLevel::Verbose.filter(), LevelFilter::Debug);
    }

    #[test]
    #[serial]
    fn test_resolve_defaults() {
        env::remove_var(ENV_LOG_MODE);
        assert_eq!(resolve_level(false, false), LogLevel::Normal);
    }

    #[test]
    fn test_resolve_flags() {
        assert_eq!(resolve_level(true, false), LogLevel::Verbose);
        assert_eq!(resolve_level(false, true), LogLevel::Quiet);
        assert_eq!(resolve_level(true, true), LogLevel::Verbose);
    }

    #[test]
    #[serial]
    fn test_resolve_from_env() {
        env::set_var(ENV_LOG_MODE, "verbose");
        assert_eq!(resolve_level(false, false), LogLevel::Verbose);

        env::set_var(ENV_LOG_MODE, "invalid");
        assert_eq!(resolve_level(false, false), LogLevel::Normal);

        env::set_var(ENV_LOG_MODE, "normal");
        assert_eq!(resolve_level(false, true), LogLevel::Quiet);

        env::remove_var(ENV_LOG_MODE);
    }
}

//! Logging setup
//!
//! All crates log through the `log` facade. [`logger_init`] installs a `fern` backend which
//! writes every record to stdout, with coloured level tags, and to the session's log file without
//! colours. Each line is prefixed with the seconds elapsed since the session epoch.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error opening the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be `INFO` or more verbose, so that start-up information is never lost. Only
/// one logger can be set per process, so this fails if called twice.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_line(coloured_level(record.level()), message, record)))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_line(record.level().as_str(), message, record)))
        })
        .chain(log_file);

    fern::Dispatch::new()
        .level(min_level)
        .chain(stdout)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single log line. Debug and trace lines include the target module.
fn format_line<L: std::fmt::Display>(level: L, message: &Arguments, record: &Record) -> String {
    if record.level() > Level::Info {
        format!(
            "[{:10.6} {:>5}] {}: {}",
            session::get_elapsed_seconds(),
            level,
            record.target(),
            message
        )
    } else {
        format!(
            "[{:10.6} {:>5}] {}",
            session::get_elapsed_seconds(),
            level,
            message
        )
    }
}

fn coloured_level(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRACE".dimmed().italic(),
        Level::Debug => "DEBUG".dimmed(),
        Level::Info => "INFO".normal(),
        Level::Warn => "WARN".yellow(),
        Level::Error => "ERROR".red().bold(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Format a line for a record with the given level and target. The record borrows its
    /// arguments so it is built and used in a single expression.
    fn line_for(level: Level, target: &str) -> String {
        format_line(
            level.as_str(),
            &format_args!("cycle {}", 3),
            &Record::builder()
                .args(format_args!("cycle {}", 3))
                .level(level)
                .target(target)
                .build(),
        )
    }

    #[test]
    fn test_format_line() {
        assert!(line_for(Level::Debug, "wpt_lib::wpt_updater")
            .ends_with("DEBUG] wpt_lib::wpt_updater: cycle 3"));
        assert!(line_for(Level::Warn, "wpt_lib::wpt_updater").ends_with(" WARN] cycle 3"));
    }
}

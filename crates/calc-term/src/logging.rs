#![forbid(unsafe_code)]

//! Tracing subscriber setup for the `calc` binary.
//!
//! Logging is off unless a log file is given: the interactive panel owns
//! the terminal, so events are never written to stdout or stderr.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Failure to install the subscriber.
#[derive(Debug)]
pub enum LogInitError {
    Open { path: PathBuf, source: io::Error },
    Filter(tracing_subscriber::filter::ParseError),
    Install(TryInitError),
}

impl fmt::Display for LogInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open log file {}: {source}", path.display())
            }
            Self::Filter(e) => write!(f, "invalid log filter: {e}"),
            Self::Install(e) => write!(f, "cannot install log subscriber: {e}"),
        }
    }
}

impl std::error::Error for LogInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Filter(e) => Some(e),
            Self::Install(e) => Some(e),
        }
    }
}

/// Open `path` for appending, creating it if needed.
fn open_log_file(path: &Path) -> Result<File, LogInitError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogInitError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Install a global fmt subscriber writing to `path`, filtered by
/// `directives` (`EnvFilter` syntax).
///
/// Does nothing when `path` is `None`.
pub fn init(path: Option<&Path>, directives: &str) -> Result<(), LogInitError> {
    let Some(path) = path else {
        return Ok(());
    };
    let filter = EnvFilter::try_new(directives).map_err(LogInitError::Filter)?;
    let file = open_log_file(path)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(LogInitError::Install)?;
    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_is_a_no_op() {
        assert!(init(None, "this is not consulted").is_ok());
    }

    #[test]
    fn open_creates_missing_file() {
        let path = std::env::temp_dir().join(format!("calc-log-test-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);
        assert!(open_log_file(&path).is_ok());
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn open_failure_names_the_path() {
        let path = std::env::temp_dir()
            .join("calc-missing-dir-for-log-test")
            .join("calc.log");
        let err = open_log_file(&path).unwrap_err();
        assert!(err.to_string().contains("calc-missing-dir-for-log-test"));
        assert!(std::error::Error::source(&err).is_some());
    }
}

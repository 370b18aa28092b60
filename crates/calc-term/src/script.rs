#![forbid(unsafe_code)]

//! Non-interactive key scripts.
//!
//! A script is a whitespace-separated list of tokens. A token is either a
//! run of key characters (`12+3=`) or `sleep=MS`, which advances the
//! session's virtual clock. Scripts never touch the terminal and never
//! sleep for real, so inactivity resets are reproducible.

use std::fmt;
use std::time::Duration;

use calc_core::event::KeyIdentity;
use calc_engine::{EngineConfig, SessionSimulator, UnknownKey};

/// One parsed script token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Keys(Vec<KeyIdentity>),
    Sleep(Duration),
}

/// Script parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    UnknownKey(UnknownKey),
    InvalidSleep(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(e) => write!(f, "script: {e}"),
            Self::InvalidSleep(token) => write!(f, "script: invalid pause {token:?}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownKey(e) => Some(e),
            Self::InvalidSleep(_) => None,
        }
    }
}

impl From<UnknownKey> for ScriptError {
    fn from(e: UnknownKey) -> Self {
        Self::UnknownKey(e)
    }
}

/// Parse a script into steps.
pub fn parse(script: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    script
        .split_whitespace()
        .map(|token| {
            if let Some(ms) = token.strip_prefix("sleep=") {
                let ms: u64 = ms
                    .parse()
                    .map_err(|_| ScriptError::InvalidSleep(token.to_string()))?;
                return Ok(ScriptStep::Sleep(Duration::from_millis(ms)));
            }
            let keys = token
                .chars()
                .map(|c| KeyIdentity::from_char(c).ok_or(UnknownKey(c)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ScriptStep::Keys(keys))
        })
        .collect()
}

/// Run a script on a fresh simulated session.
pub fn run(script: &str, config: EngineConfig) -> Result<SessionSimulator, ScriptError> {
    let steps = parse(script)?;
    tracing::debug!(steps = steps.len(), "running key script");

    let mut session = SessionSimulator::with_config(config);
    for step in &steps {
        match step {
            ScriptStep::Keys(keys) => {
                session.press_all(keys);
            }
            ScriptStep::Sleep(pause) => {
                session.advance(*pause);
            }
        }
    }
    Ok(session)
}

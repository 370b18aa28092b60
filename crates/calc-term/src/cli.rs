#![forbid(unsafe_code)]

//! Command-line argument parsing for the `calc` binary.
//!
//! Args are parsed by hand. Environment variables with the `CALC_` prefix
//! supply defaults that explicit flags override.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use calc_core::format::{NumberFormat, detect_locale};
use calc_core::inactivity::DEFAULT_INACTIVITY_TIMEOUT;
use calc_engine::EngineConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
calc: a two-register pocket calculator for the terminal

USAGE:
    calc [OPTIONS]

OPTIONS:
    --timeout-ms=N       Inactivity reset after N milliseconds (default: 5000)
    --locale=TAG         Number grouping locale, e.g. en, de, fr (default: from LC_ALL/LANG)
    --log-file=PATH      Write tracing output to PATH (default: no logging)
    --script=KEYS        Run KEYS without a terminal and print the display
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    0-9 .            Digits and decimal point
    + - * /          Operators (x also multiplies)
    %                Percent
    n / ~            Toggle sign
    = / Enter        Equals
    c / Backspace    Clear (C) or all clear (AC)
    q / Esc / Ctrl+C Quit

SCRIPTS:
    Space-separated tokens. Each token is a run of key characters or
    sleep=MS, which advances a virtual clock by MS milliseconds.
    Example: calc --script='12+3= sleep=6000 7*6='

ENVIRONMENT VARIABLES:
    CALC_TIMEOUT_MS      Override --timeout-ms
    CALC_LOCALE          Override --locale
    CALC_LOG             Tracing filter directives (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Inactivity timeout in milliseconds.
    pub timeout_ms: u64,
    /// Explicit locale tag; detected from the environment when absent.
    pub locale: Option<String>,
    /// Destination for tracing output; logging is off when absent.
    pub log_file: Option<PathBuf>,
    /// Filter directives for the tracing subscriber.
    pub log_filter: String,
    /// Key script to run instead of the interactive terminal.
    pub script: Option<String>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_INACTIVITY_TIMEOUT.as_millis() as u64,
            locale: None,
            log_file: None,
            log_filter: "info".into(),
            script: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(Opts),
    Help,
    Version,
}

/// Command-line parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment, exiting on `--help`,
    /// `--version`, or a bad argument.
    pub fn parse() -> Self {
        let args: Vec<String> = env::args().skip(1).collect();
        match Self::parse_from(&args, |key| env::var(key).ok()) {
            Ok(CliAction::Run(opts)) => opts,
            Ok(CliAction::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(CliAction::Version) => {
                println!("calc {VERSION}");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `lookup` as the environment.
    ///
    /// Unparseable environment values are ignored; unparseable flag values
    /// are errors.
    pub fn parse_from<F>(args: &[String], lookup: F) -> Result<CliAction, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = lookup("CALC_TIMEOUT_MS")
            && let Ok(n) = val.parse()
        {
            opts.timeout_ms = n;
        }
        if let Some(val) = lookup("CALC_LOCALE")
            && !val.is_empty()
        {
            opts.locale = Some(val);
        }
        if let Some(val) = lookup("CALC_LOG")
            && !val.is_empty()
        {
            opts.log_filter = val;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(CliAction::Help),
                "--version" | "-V" => return Ok(CliAction::Version),
                other => {
                    if let Some(val) = other.strip_prefix("--timeout-ms=") {
                        opts.timeout_ms = val.parse().map_err(|_| CliError::InvalidValue {
                            flag: "--timeout-ms",
                            value: val.to_string(),
                        })?;
                    } else if let Some(val) = other.strip_prefix("--locale=") {
                        opts.locale = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        if val.is_empty() {
                            return Err(CliError::InvalidValue {
                                flag: "--log-file",
                                value: val.to_string(),
                            });
                        }
                        opts.log_file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--script=") {
                        opts.script = Some(val.to_string());
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(CliAction::Run(opts))
    }

    /// Engine configuration implied by these options.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::with_timeout(Duration::from_millis(self.timeout_ms))
    }

    /// Display number format for the chosen or detected locale.
    #[must_use]
    pub fn number_format(&self) -> NumberFormat {
        match &self.locale {
            Some(tag) => NumberFormat::for_locale(tag),
            None => NumberFormat::for_locale(&detect_locale()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run(action: Result<CliAction, CliError>) -> Opts {
        match action {
            Ok(CliAction::Run(opts)) => opts,
            other => panic!("expected run options, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert_eq!(opts.timeout_ms, 5000);
        assert_eq!(opts.locale, None);
        assert_eq!(opts.log_file, None);
        assert_eq!(opts.log_filter, "info");
        assert_eq!(opts.script, None);
    }

    #[test]
    fn version_string_nonempty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn help_text_lists_flags_and_env() {
        for needle in [
            "--timeout-ms",
            "--locale",
            "--log-file",
            "--script",
            "CALC_TIMEOUT_MS",
            "CALC_LOCALE",
            "CALC_LOG",
        ] {
            assert!(HELP_TEXT.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn flags_are_parsed() {
        let opts = run(Opts::parse_from(
            &args(&[
                "--timeout-ms=250",
                "--locale=de",
                "--log-file=/tmp/calc.log",
                "--script=1+1=",
            ]),
            no_env,
        ));
        assert_eq!(opts.timeout_ms, 250);
        assert_eq!(opts.locale.as_deref(), Some("de"));
        assert_eq!(opts.log_file, Some(PathBuf::from("/tmp/calc.log")));
        assert_eq!(opts.script.as_deref(), Some("1+1="));
    }

    #[test]
    fn env_supplies_defaults() {
        let env = |key: &str| match key {
            "CALC_TIMEOUT_MS" => Some("1000".to_string()),
            "CALC_LOCALE" => Some("fr".to_string()),
            "CALC_LOG" => Some("calc_engine=debug".to_string()),
            _ => None,
        };
        let opts = run(Opts::parse_from(&[], env));
        assert_eq!(opts.timeout_ms, 1000);
        assert_eq!(opts.locale.as_deref(), Some("fr"));
        assert_eq!(opts.log_filter, "calc_engine=debug");
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| (key == "CALC_TIMEOUT_MS").then(|| "1000".to_string());
        let opts = run(Opts::parse_from(&args(&["--timeout-ms=20"]), env));
        assert_eq!(opts.timeout_ms, 20);
    }

    #[test]
    fn bad_env_value_is_ignored() {
        let env = |key: &str| (key == "CALC_TIMEOUT_MS").then(|| "soon".to_string());
        let opts = run(Opts::parse_from(&[], env));
        assert_eq!(opts.timeout_ms, 5000);
    }

    #[test]
    fn bad_flag_value_is_rejected() {
        let err = Opts::parse_from(&args(&["--timeout-ms=soon"]), no_env).unwrap_err();
        assert_eq!(
            err,
            CliError::InvalidValue {
                flag: "--timeout-ms",
                value: "soon".into()
            }
        );
        assert_eq!(err.to_string(), "Invalid --timeout-ms value: soon");
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let err = Opts::parse_from(&args(&["--turbo"]), no_env).unwrap_err();
        assert_eq!(err, CliError::UnknownArgument("--turbo".into()));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(
            Opts::parse_from(&args(&["-h", "--turbo"]), no_env),
            Ok(CliAction::Help)
        );
        assert_eq!(
            Opts::parse_from(&args(&["--version"]), no_env),
            Ok(CliAction::Version)
        );
    }

    #[test]
    fn engine_config_uses_timeout() {
        let opts = Opts {
            timeout_ms: 1234,
            ..Opts::default()
        };
        assert_eq!(
            opts.engine_config().inactivity_timeout,
            Duration::from_millis(1234)
        );
    }

    #[test]
    fn explicit_locale_selects_format() {
        let opts = Opts {
            locale: Some("de".into()),
            ..Opts::default()
        };
        assert_eq!(opts.number_format(), NumberFormat::for_locale("de"));
    }
}

#![forbid(unsafe_code)]

//! Core: key model, decimal arithmetic, display formatting, and the
//! inactivity timer policy shared by every calculator layer.

pub mod decimal;
pub mod event;
pub mod format;
pub mod inactivity;
pub mod logging;

pub use decimal::{DecimalArithmetic, DecimalError, ExactDecimal, is_zero_literal};
pub use event::{BinaryOperator, KEYPAD, KeyCategory, KeyEvent, KeyEventError, KeyIdentity};
pub use format::NumberFormat;
pub use inactivity::{DEFAULT_INACTIVITY_TIMEOUT, InactivityTimer};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, warn};

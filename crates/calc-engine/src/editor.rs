#![forbid(unsafe_code)]

//! Operand editor: per-keystroke editing of the operand being typed.
//!
//! The editor folds key events into an [`OperandEditState`] and publishes the
//! operand's canonical decimal string whenever a transition is *visible*.
//! Operator and Enter keys reset the editor silently; the sequencer treats
//! them as boundaries, so the editor must not re-display `"0"` there.
//!
//! # Design
//!
//! ## Invariants
//! 1. `value` is always a valid decimal literal: optional `-`, at least one
//!    digit, optional point with an optional fraction. It is never empty.
//! 2. Transforms are pure: [`OperandEditState::apply`] returns a new state.
//! 3. The clear-button label is recomputed on every transition, visible or not.
//!
//! ## Failure Modes
//! - If the arithmetic collaborator rejects a percent conversion, the state is
//!   left as it was and the transition is not published. A value past the
//!   collaborator's capacity is a warning; any other rejection is an error.

use std::time::{Duration, Instant};

use calc_core::decimal::{DecimalArithmetic, DecimalError, is_zero_literal};
use calc_core::event::{KeyEvent, KeyIdentity};
use calc_core::inactivity::InactivityTimer;
use tracing::{debug, error, warn};

/// How the next digit key is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Integer digits are being typed.
    #[default]
    Decimal,
    /// The value was just scaled by `%`; the next digit starts over.
    Percent,
    /// A decimal point has been typed; digits extend the fraction.
    Point,
}

/// Edit state of the operand currently being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandEditState {
    pub input_mode: InputMode,
    pub value: String,
    /// Whether this transition is published downstream.
    pub visible: bool,
}

impl Default for OperandEditState {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Decimal,
            value: "0".to_string(),
            visible: true,
        }
    }
}

/// One editor transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTransform {
    /// Operator or Enter: silent reset.
    Reset,
    /// Clear key: visible reset.
    Clear,
    Percent,
    Point,
    PlusMinus,
    Digit(u8),
    /// Inactivity timeout: silent reset.
    Timeout,
}

impl EditTransform {
    /// Transform selected by a key event.
    ///
    /// The identity alone decides; a [`KeyEvent`]'s category always agrees
    /// with it.
    #[must_use]
    pub fn for_key(key: KeyEvent) -> Self {
        use KeyIdentity as K;
        match key.identity() {
            K::Add | K::Subtract | K::Multiply | K::Divide | K::Enter => Self::Reset,
            K::Clear => Self::Clear,
            K::Percent => Self::Percent,
            K::Point => Self::Point,
            K::PlusMinus => Self::PlusMinus,
            K::Zero => Self::Digit(0),
            K::One => Self::Digit(1),
            K::Two => Self::Digit(2),
            K::Three => Self::Digit(3),
            K::Four => Self::Digit(4),
            K::Five => Self::Digit(5),
            K::Six => Self::Digit(6),
            K::Seven => Self::Digit(7),
            K::Eight => Self::Digit(8),
            K::Nine => Self::Digit(9),
        }
    }
}

/// Typed text that extends the current value.
#[derive(Debug, Clone, Copy)]
enum Append {
    Digit(u8),
    Point,
}

impl OperandEditState {
    fn reset(visible: bool) -> Self {
        Self {
            visible,
            ..Self::default()
        }
    }

    /// Apply one transform, returning the next state.
    #[must_use]
    pub fn apply<A: DecimalArithmetic>(&self, transform: EditTransform, arithmetic: &A) -> Self {
        match transform {
            EditTransform::Reset | EditTransform::Timeout => Self::reset(false),
            EditTransform::Clear => Self::reset(true),
            EditTransform::Percent => match arithmetic.percent(&self.value) {
                Ok(value) => Self {
                    input_mode: InputMode::Percent,
                    value,
                    visible: true,
                },
                Err(err) => {
                    if err == DecimalError::Overflow {
                        warn!(digits = self.value.len(), "percent result exceeds capacity");
                    } else {
                        error!(value = %self.value, %err, "percent conversion failed");
                    }
                    Self {
                        visible: false,
                        ..self.clone()
                    }
                }
            },
            EditTransform::PlusMinus => {
                let value = match self.value.strip_prefix('-') {
                    Some(positive) => positive.to_string(),
                    None => format!("-{}", self.value),
                };
                Self {
                    input_mode: self.input_mode,
                    value,
                    visible: true,
                }
            }
            EditTransform::Point => match self.input_mode {
                InputMode::Decimal => self.append(Append::Point),
                InputMode::Percent => Self {
                    input_mode: InputMode::Point,
                    value: "0.".to_string(),
                    visible: true,
                },
                InputMode::Point => Self {
                    visible: true,
                    ..self.clone()
                },
            },
            EditTransform::Digit(d) => match self.input_mode {
                InputMode::Decimal | InputMode::Point => self.append(Append::Digit(d)),
                InputMode::Percent => Self {
                    input_mode: InputMode::Decimal,
                    value: d.to_string(),
                    visible: true,
                },
            },
        }
    }

    /// Shared digit/point sub-case: extend the value in place.
    ///
    /// In `Decimal` mode a placeholder zero (`"0"`/`"-0"`) is replaced by an
    /// incoming digit; the sign is kept.
    fn append(&self, append: Append) -> Self {
        let mut value = self.value.clone();
        let input_mode = match append {
            Append::Digit(d) => {
                if self.input_mode == InputMode::Decimal && is_zero_literal(&value) {
                    value.pop();
                }
                value.push(char::from(b'0' + d));
                self.input_mode
            }
            Append::Point => {
                value.push('.');
                InputMode::Point
            }
        };
        Self {
            input_mode,
            value,
            visible: true,
        }
    }
}

/// Label of the clear key: `AC` clears everything, `C` clears the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearLabel {
    #[default]
    AllClear,
    Clear,
}

impl ClearLabel {
    /// Label for an operand's raw value.
    #[must_use]
    pub fn for_value(value: &str) -> Self {
        if is_zero_literal(value) {
            Self::AllClear
        } else {
            Self::Clear
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllClear => "AC",
            Self::Clear => "C",
        }
    }
}

impl std::fmt::Display for ClearLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one editor transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Published value, present only for visible transitions.
    pub value: Option<String>,
    pub clear_label: ClearLabel,
}

/// Stateful editor layer: the fold plus its inactivity timer.
#[derive(Debug, Clone)]
pub struct OperandEditor {
    state: OperandEditState,
    timer: InactivityTimer,
}

impl OperandEditor {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: OperandEditState::default(),
            timer: InactivityTimer::new(timeout),
        }
    }

    #[must_use]
    pub fn state(&self) -> &OperandEditState {
        &self.state
    }

    #[must_use]
    pub fn clear_label(&self) -> ClearLabel {
        ClearLabel::for_value(&self.state.value)
    }

    #[must_use]
    pub fn timer(&self) -> &InactivityTimer {
        &self.timer
    }

    /// Cancel the pending timeout (any key event does this).
    pub fn cancel_timeout(&mut self) {
        self.timer.cancel();
    }

    /// Apply the transform for `key` and re-arm the timer.
    pub fn handle_key<A: DecimalArithmetic>(
        &mut self,
        key: KeyEvent,
        arithmetic: &A,
        now: Instant,
    ) -> EditOutcome {
        let outcome = self.transition(EditTransform::for_key(key), arithmetic);
        self.timer.restart(now);
        outcome
    }

    /// Fire the timeout reset if the deadline has passed.
    pub fn poll_timeout<A: DecimalArithmetic>(
        &mut self,
        arithmetic: &A,
        now: Instant,
    ) -> Option<EditOutcome> {
        if !self.timer.poll_expired(now) {
            return None;
        }
        debug!("operand editor idle, resetting entry");
        Some(self.transition(EditTransform::Timeout, arithmetic))
    }

    fn transition<A: DecimalArithmetic>(
        &mut self,
        transform: EditTransform,
        arithmetic: &A,
    ) -> EditOutcome {
        self.state = self.state.apply(transform, arithmetic);
        debug!(
            ?transform,
            mode = ?self.state.input_mode,
            value = %self.state.value,
            visible = self.state.visible,
            "operand edit"
        );
        EditOutcome {
            value: self.state.visible.then(|| self.state.value.clone()),
            clear_label: self.clear_label(),
        }
    }
}

impl Default for OperandEditor {
    fn default() -> Self {
        Self::new(calc_core::inactivity::DEFAULT_INACTIVITY_TIMEOUT)
    }
}

#![forbid(unsafe_code)]

//! Expression sequencer: two operand registers, a pending operator, and the
//! step machine that decides which register is live.
//!
//! ```text
//!                 operand       operator      enter
//!  WaitFirst    ChangeFirst   WaitSecond   WaitFirst
//!  ChangeFirst       -        WaitSecond   WaitFirst
//!  WaitSecond   ChangeSecond  WaitSecond   WaitFirst
//!  ChangeSecond      -        WaitSecond   WaitFirst
//! ```
//!
//! Enter computes `first = first op second`; from `WaitSecond` it first
//! copies `first` into `second`, so `5 × =` squares. Repeated Enter re-applies
//! the last operator with the last second operand. An operator pressed while
//! the second register is being edited folds `first op second` with the
//! newly pressed operator before selecting it (no precedence).
//!
//! Clear on a zero live register is `AC`: everything resets and the operand
//! edit queued behind the same key is skipped. Clear on a non-zero register
//! changes nothing here; the editor's visible `"0"` clears the entry instead.

use std::time::{Duration, Instant};

use calc_core::decimal::{DecimalArithmetic, DecimalError, is_zero_literal};
use calc_core::event::{BinaryOperator, KeyCategory, KeyEvent};
use calc_core::inactivity::InactivityTimer;
use tracing::{debug, info, warn};

/// Which register is live and whether it has been edited this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    WaitFirst,
    ChangeFirst,
    WaitSecond,
    ChangeSecond,
}

impl Step {
    /// True while the first register is live.
    #[must_use]
    pub const fn is_first_active(self) -> bool {
        matches!(self, Self::WaitFirst | Self::ChangeFirst)
    }
}

/// Complete calculator state published to the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorSnapshot {
    pub step: Step,
    pub first: String,
    pub second: String,
    pub operator: BinaryOperator,
    /// Discards the next operand edit, then clears itself.
    pub skip_operand: bool,
    /// Set when the last computation failed; cleared by the next transform.
    pub error: Option<DecimalError>,
}

impl Default for CalculatorSnapshot {
    fn default() -> Self {
        Self {
            step: Step::WaitFirst,
            first: "0".to_string(),
            second: "0".to_string(),
            operator: BinaryOperator::Add,
            skip_operand: false,
            error: None,
        }
    }
}

/// One sequencer transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerTransform {
    /// A visible edit from the operand editor.
    Operand(String),
    Operator(BinaryOperator),
    Enter,
    Clear,
    /// Inactivity timeout: full reset.
    Timeout,
}

impl SequencerTransform {
    /// Control transform for `key`; `None` for number-category keys, which
    /// reach the sequencer only through the editor.
    #[must_use]
    pub fn for_key(key: KeyEvent) -> Option<Self> {
        match key.category() {
            KeyCategory::Number => None,
            KeyCategory::Clear => Some(Self::Clear),
            KeyCategory::Enter => Some(Self::Enter),
            KeyCategory::Operator => BinaryOperator::try_from(key.identity())
                .map(Self::Operator)
                .ok(),
        }
    }
}

impl CalculatorSnapshot {
    /// The live register's raw value.
    #[must_use]
    pub fn active_value(&self) -> &str {
        if self.step.is_first_active() {
            &self.first
        } else {
            &self.second
        }
    }

    /// Apply one transform, returning the next snapshot.
    ///
    /// Arithmetic failures do not propagate: the result is a reset snapshot
    /// carrying the error.
    #[must_use]
    pub fn apply<A: DecimalArithmetic>(&self, transform: &SequencerTransform, arithmetic: &A) -> Self {
        let mut next = Self {
            error: None,
            ..self.clone()
        };
        let computed = match transform {
            SequencerTransform::Operand(value) => {
                next.take_operand(value);
                Ok(())
            }
            SequencerTransform::Operator(op) => next.select_operator(*op, arithmetic),
            SequencerTransform::Enter => next.evaluate(arithmetic),
            SequencerTransform::Clear => {
                next.clear();
                Ok(())
            }
            SequencerTransform::Timeout => return Self::default(),
        };
        match computed {
            Ok(()) => next,
            Err(err) => {
                warn!(
                    %err,
                    first = %self.first,
                    second = %self.second,
                    operator = ?self.operator,
                    "computation failed"
                );
                Self {
                    error: Some(err),
                    ..Self::default()
                }
            }
        }
    }

    fn take_operand(&mut self, value: &str) {
        if self.skip_operand {
            self.skip_operand = false;
            return;
        }
        match self.step {
            Step::WaitFirst | Step::ChangeFirst => {
                self.step = Step::ChangeFirst;
                self.first = value.to_string();
            }
            Step::WaitSecond | Step::ChangeSecond => {
                self.step = Step::ChangeSecond;
                self.second = value.to_string();
            }
        }
    }

    fn select_operator<A: DecimalArithmetic>(
        &mut self,
        op: BinaryOperator,
        arithmetic: &A,
    ) -> Result<(), DecimalError> {
        if self.step == Step::ChangeSecond {
            self.first = arithmetic.apply(op, &self.first, &self.second)?;
        }
        self.step = Step::WaitSecond;
        self.operator = op;
        Ok(())
    }

    fn evaluate<A: DecimalArithmetic>(&mut self, arithmetic: &A) -> Result<(), DecimalError> {
        if self.step == Step::WaitSecond {
            self.second = self.first.clone();
        }
        self.first = arithmetic.apply(self.operator, &self.first, &self.second)?;
        self.step = Step::WaitFirst;
        Ok(())
    }

    fn clear(&mut self) {
        if is_zero_literal(self.active_value()) {
            *self = Self {
                skip_operand: true,
                ..Self::default()
            };
        }
    }
}

/// Stateful sequencer layer: the fold plus its inactivity timer.
#[derive(Debug, Clone)]
pub struct ExpressionSequencer {
    snapshot: CalculatorSnapshot,
    timer: InactivityTimer,
}

impl ExpressionSequencer {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            snapshot: CalculatorSnapshot::default(),
            timer: InactivityTimer::new(timeout),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &CalculatorSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn timer(&self) -> &InactivityTimer {
        &self.timer
    }

    /// Cancel the pending timeout (any key event does this).
    pub fn cancel_timeout(&mut self) {
        self.timer.cancel();
    }

    /// Apply `transform`, re-arm the timer, and return the new snapshot.
    pub fn handle<A: DecimalArithmetic>(
        &mut self,
        transform: &SequencerTransform,
        arithmetic: &A,
        now: Instant,
    ) -> &CalculatorSnapshot {
        self.snapshot = self.snapshot.apply(transform, arithmetic);
        self.timer.restart(now);
        debug!(
            ?transform,
            step = ?self.snapshot.step,
            first = %self.snapshot.first,
            second = %self.snapshot.second,
            operator = ?self.snapshot.operator,
            "sequencer transition"
        );
        &self.snapshot
    }

    /// Fire the full reset if the deadline has passed.
    pub fn poll_timeout<A: DecimalArithmetic>(
        &mut self,
        arithmetic: &A,
        now: Instant,
    ) -> Option<&CalculatorSnapshot> {
        if !self.timer.poll_expired(now) {
            return None;
        }
        info!("inactivity timeout, expression reset");
        self.snapshot = self.snapshot.apply(&SequencerTransform::Timeout, arithmetic);
        Some(&self.snapshot)
    }
}

impl Default for ExpressionSequencer {
    fn default() -> Self {
        Self::new(calc_core::inactivity::DEFAULT_INACTIVITY_TIMEOUT)
    }
}

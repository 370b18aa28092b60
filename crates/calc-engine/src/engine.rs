#![forbid(unsafe_code)]

//! Single ordered dispatcher for both state machines.
//!
//! The [`Engine`] is the one place key events enter. Each event is delivered
//! exactly once to every consumer, in arrival order:
//!
//! 1. timers whose deadline has already passed fire first (the timer won the
//!    race against this key);
//! 2. both timers are cancelled;
//! 3. the sequencer applies its control transform (operator, enter, clear);
//! 4. the editor applies its transform and reports the clear-button label;
//! 5. a visible edit is forwarded to the sequencer as an operand transform.
//!
//! Every transform re-arms the timer of the layer that applied it.
//!
//! # Example
//!
//! ```
//! use calc_core::event::{KeyEvent, KeyIdentity};
//! use calc_engine::engine::Engine;
//! use std::time::Instant;
//!
//! let mut engine = Engine::with_defaults();
//! let t = Instant::now();
//! for key in [KeyIdentity::One, KeyIdentity::Add, KeyIdentity::One, KeyIdentity::Enter] {
//!     engine.feed(KeyEvent::new(key), t);
//! }
//! assert_eq!(engine.snapshot().first, "2");
//! ```

use std::time::{Duration, Instant};

use calc_core::decimal::{DecimalArithmetic, ExactDecimal};
use calc_core::event::KeyEvent;
use calc_core::inactivity::DEFAULT_INACTIVITY_TIMEOUT;
use tracing::trace;

use crate::editor::{ClearLabel, OperandEditor};
use crate::sequencer::{CalculatorSnapshot, ExpressionSequencer, SequencerTransform};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Idle window after which both layers reset (default: 5000ms).
    pub inactivity_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Create a config with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            inactivity_timeout: timeout,
        }
    }
}

/// Something the display should know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutput {
    /// A full calculator snapshot.
    Snapshot(CalculatorSnapshot),
    /// The clear key's label after an editor transition.
    ClearLabel(ClearLabel),
}

/// Key-event interpretation engine.
pub struct Engine<A: DecimalArithmetic = ExactDecimal> {
    config: EngineConfig,
    arithmetic: A,
    editor: OperandEditor,
    sequencer: ExpressionSequencer,
}

impl<A: DecimalArithmetic> std::fmt::Debug for Engine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("editor", self.editor.state())
            .field("snapshot", self.sequencer.snapshot())
            .finish()
    }
}

impl Engine<ExactDecimal> {
    /// Create an engine backed by [`ExactDecimal`].
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_arithmetic(config, ExactDecimal)
    }

    /// Create an engine with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<A: DecimalArithmetic> Engine<A> {
    /// Create an engine with a custom arithmetic collaborator.
    pub fn with_arithmetic(config: EngineConfig, arithmetic: A) -> Self {
        Self {
            editor: OperandEditor::new(config.inactivity_timeout),
            sequencer: ExpressionSequencer::new(config.inactivity_timeout),
            config,
            arithmetic,
        }
    }

    /// Initial output: the default snapshot and label, before any key.
    #[must_use]
    pub fn start(&self) -> Vec<EngineOutput> {
        vec![
            EngineOutput::Snapshot(self.sequencer.snapshot().clone()),
            EngineOutput::ClearLabel(self.editor.clear_label()),
        ]
    }

    /// Process one key event observed at `now`.
    pub fn feed(&mut self, key: KeyEvent, now: Instant) -> Vec<EngineOutput> {
        let mut outputs = Vec::with_capacity(3);
        self.fire_expired(now, &mut outputs);

        trace!(category = ?key.category(), identity = ?key.identity(), "key event");
        self.editor.cancel_timeout();
        self.sequencer.cancel_timeout();

        if let Some(transform) = SequencerTransform::for_key(key) {
            let snapshot = self.sequencer.handle(&transform, &self.arithmetic, now);
            outputs.push(EngineOutput::Snapshot(snapshot.clone()));
        }

        let edit = self.editor.handle_key(key, &self.arithmetic, now);
        outputs.push(EngineOutput::ClearLabel(edit.clear_label));

        if let Some(value) = edit.value {
            let transform = SequencerTransform::Operand(value);
            let snapshot = self.sequencer.handle(&transform, &self.arithmetic, now);
            outputs.push(EngineOutput::Snapshot(snapshot.clone()));
        }

        outputs
    }

    /// Fire any inactivity reset whose deadline is at or before `now`.
    pub fn check_timeout(&mut self, now: Instant) -> Vec<EngineOutput> {
        let mut outputs = Vec::new();
        self.fire_expired(now, &mut outputs);
        outputs
    }

    /// Time until the nearest pending deadline, `None` when idle-reset already.
    #[must_use]
    pub fn time_until_timeout(&self, now: Instant) -> Option<Duration> {
        let editor = self.editor.timer().time_until_expiry(now);
        let sequencer = self.sequencer.timer().time_until_expiry(now);
        match (editor, sequencer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn fire_expired(&mut self, now: Instant, outputs: &mut Vec<EngineOutput>) {
        if let Some(edit) = self.editor.poll_timeout(&self.arithmetic, now) {
            outputs.push(EngineOutput::ClearLabel(edit.clear_label));
        }
        if let Some(snapshot) = self.sequencer.poll_timeout(&self.arithmetic, now) {
            outputs.push(EngineOutput::Snapshot(snapshot.clone()));
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &CalculatorSnapshot {
        self.sequencer.snapshot()
    }

    #[must_use]
    pub fn clear_label(&self) -> ClearLabel {
        self.editor.clear_label()
    }

    #[must_use]
    pub fn editor(&self) -> &OperandEditor {
        &self.editor
    }

    #[must_use]
    pub fn sequencer(&self) -> &ExpressionSequencer {
        &self.sequencer
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Step;
    use calc_core::event::KeyIdentity as K;
    use tracing_test::traced_test;

    const MS_100: Duration = Duration::from_millis(100);

    fn key(k: K) -> KeyEvent {
        KeyEvent::new(k)
    }

    fn snapshots(outputs: &[EngineOutput]) -> Vec<&CalculatorSnapshot> {
        outputs
            .iter()
            .filter_map(|o| match o {
                EngineOutput::Snapshot(s) => Some(s),
                EngineOutput::ClearLabel(_) => None,
            })
            .collect()
    }

    #[test]
    fn start_reports_defaults() {
        let engine = Engine::with_defaults();
        assert_eq!(
            engine.start(),
            vec![
                EngineOutput::Snapshot(CalculatorSnapshot::default()),
                EngineOutput::ClearLabel(ClearLabel::AllClear),
            ]
        );
    }

    #[test]
    fn digit_produces_label_then_snapshot() {
        let mut engine = Engine::with_defaults();
        let out = engine.feed(key(K::Three), Instant::now());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], EngineOutput::ClearLabel(ClearLabel::Clear));
        assert!(matches!(&out[1], EngineOutput::Snapshot(s) if s.first == "3"));
    }

    #[test]
    fn operator_produces_snapshot_then_silent_label() {
        let mut engine = Engine::with_defaults();
        let t = Instant::now();
        engine.feed(key(K::Three), t);
        let out = engine.feed(key(K::Add), t);
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[0], EngineOutput::Snapshot(s) if s.step == Step::WaitSecond));
        assert_eq!(out[1], EngineOutput::ClearLabel(ClearLabel::AllClear));
    }

    #[test]
    fn clear_key_is_seen_by_both_layers() {
        let mut engine = Engine::with_defaults();
        let t = Instant::now();
        engine.feed(key(K::Seven), t);
        let out = engine.feed(key(K::Clear), t);
        let snaps = snapshots(&out);
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0].first, "7");
        assert_eq!(snaps[1].first, "0");
        assert_eq!(snaps[1].step, Step::ChangeFirst);
    }

    #[test]
    fn nearest_deadline_reported() {
        let mut engine = Engine::new(EngineConfig::with_timeout(MS_100));
        let t = Instant::now();
        assert_eq!(engine.time_until_timeout(t), None);

        engine.feed(key(K::One), t);
        assert_eq!(
            engine.time_until_timeout(t + Duration::from_millis(30)),
            Some(Duration::from_millis(70))
        );
    }

    #[test]
    fn expired_deadline_fires_before_late_key() {
        let mut engine = Engine::new(EngineConfig::with_timeout(MS_100));
        let t = Instant::now();
        engine.feed(key(K::Four), t);
        engine.feed(key(K::Add), t);

        let out = engine.feed(key(K::Two), t + Duration::from_millis(150));
        let snaps = snapshots(&out);
        assert_eq!(*snaps[0], CalculatorSnapshot::default());
        assert_eq!(snaps[1].first, "2");
        assert_eq!(snaps[1].step, Step::ChangeFirst);
    }

    #[test]
    fn timeout_fires_once() {
        let mut engine = Engine::new(EngineConfig::with_timeout(MS_100));
        let t = Instant::now();
        engine.feed(key(K::Four), t);

        assert!(engine.check_timeout(t + Duration::from_millis(99)).is_empty());
        let out = engine.check_timeout(t + MS_100);
        assert_eq!(
            out,
            vec![
                EngineOutput::ClearLabel(ClearLabel::AllClear),
                EngineOutput::Snapshot(CalculatorSnapshot::default()),
            ]
        );
        assert!(engine.check_timeout(t + Duration::from_secs(10)).is_empty());
        assert_eq!(engine.time_until_timeout(t + Duration::from_secs(10)), None);
    }

    #[traced_test]
    #[test]
    fn timeout_reset_is_logged() {
        let mut engine = Engine::new(EngineConfig::with_timeout(MS_100));
        let t = Instant::now();
        engine.feed(key(K::Four), t);
        engine.check_timeout(t + MS_100);
        assert!(logs_contain("inactivity timeout, expression reset"));
    }

    #[traced_test]
    #[test]
    fn division_by_zero_is_logged() {
        let mut engine = Engine::with_defaults();
        let t = Instant::now();
        for k in [K::One, K::Divide, K::Zero, K::Enter] {
            engine.feed(key(k), t);
        }
        assert!(engine.snapshot().error.is_some());
        assert!(logs_contain("computation failed"));
    }

    #[test]
    fn debug_format() {
        let engine = Engine::with_defaults();
        let dbg = format!("{engine:?}");
        assert!(dbg.contains("Engine"));
    }
}

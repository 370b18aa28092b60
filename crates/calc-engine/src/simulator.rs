#![forbid(unsafe_code)]

//! Deterministic session simulator for testing and scripted runs.
//!
//! `SessionSimulator` drives an [`Engine`] on a virtual clock: keys are
//! pressed at the current virtual instant and [`advance`](SessionSimulator::advance)
//! moves the clock forward, firing any inactivity reset that falls due.
//! Nothing sleeps, so timeout behavior is reproducible.
//!
//! # Example
//!
//! ```
//! use calc_engine::simulator::SessionSimulator;
//! use std::time::Duration;
//!
//! let mut sim = SessionSimulator::new();
//! sim.type_str("12+3=").unwrap();
//! assert_eq!(sim.snapshot().first, "15");
//!
//! sim.advance(Duration::from_millis(5000));
//! assert_eq!(sim.snapshot().first, "0");
//! ```

use std::time::{Duration, Instant};

use calc_core::decimal::{DecimalArithmetic, ExactDecimal};
use calc_core::event::{KeyEvent, KeyIdentity};

use crate::editor::ClearLabel;
use crate::engine::{Engine, EngineConfig, EngineOutput};
use crate::sequencer::CalculatorSnapshot;

/// A character in a typed key string that has no key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownKey(pub char);

impl std::fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no calculator key bound to {:?}", self.0)
    }
}

impl std::error::Error for UnknownKey {}

/// Virtual-clock driver for an [`Engine`].
pub struct SessionSimulator<A: DecimalArithmetic = ExactDecimal> {
    engine: Engine<A>,
    now: Instant,
    outputs: Vec<EngineOutput>,
}

impl SessionSimulator<ExactDecimal> {
    /// Simulator with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(Engine::with_defaults())
    }

    /// Simulator with a custom configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_engine(Engine::new(config))
    }
}

impl Default for SessionSimulator<ExactDecimal> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: DecimalArithmetic> SessionSimulator<A> {
    /// Wrap an existing engine; its start outputs are recorded.
    pub fn with_engine(engine: Engine<A>) -> Self {
        let outputs = engine.start();
        Self {
            engine,
            now: Instant::now(),
            outputs,
        }
    }

    /// Press one key at the current virtual instant.
    pub fn press(&mut self, key: KeyIdentity) -> &mut Self {
        let out = self.engine.feed(KeyEvent::new(key), self.now);
        self.outputs.extend(out);
        self
    }

    /// Press several keys at the current virtual instant.
    pub fn press_all(&mut self, keys: &[KeyIdentity]) -> &mut Self {
        for key in keys {
            self.press(*key);
        }
        self
    }

    /// Press the keys bound to each character of `keys` (whitespace ignored).
    pub fn type_str(&mut self, keys: &str) -> Result<&mut Self, UnknownKey> {
        let identities = keys
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| KeyIdentity::from_char(c).ok_or(UnknownKey(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.press_all(&identities))
    }

    /// Move the virtual clock forward, firing any reset that falls due.
    pub fn advance(&mut self, by: Duration) -> &mut Self {
        self.now += by;
        let out = self.engine.check_timeout(self.now);
        self.outputs.extend(out);
        self
    }

    #[must_use]
    pub fn snapshot(&self) -> &CalculatorSnapshot {
        self.engine.snapshot()
    }

    #[must_use]
    pub fn clear_label(&self) -> ClearLabel {
        self.engine.clear_label()
    }

    /// Editor's current raw value.
    #[must_use]
    pub fn editor_value(&self) -> &str {
        &self.engine.editor().state().value
    }

    /// Every output so far, including the start outputs.
    #[must_use]
    pub fn outputs(&self) -> &[EngineOutput] {
        &self.outputs
    }

    /// Every snapshot pushed so far, in order.
    pub fn snapshots(&self) -> impl Iterator<Item = &CalculatorSnapshot> {
        self.outputs.iter().filter_map(|o| match o {
            EngineOutput::Snapshot(s) => Some(s),
            EngineOutput::ClearLabel(_) => None,
        })
    }

    /// Discard recorded outputs.
    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
    }

    #[must_use]
    pub fn engine(&self) -> &Engine<A> {
        &self.engine
    }

    /// Current virtual instant.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_start_outputs() {
        let sim = SessionSimulator::new();
        assert_eq!(sim.outputs().len(), 2);
        assert_eq!(sim.snapshots().count(), 1);
    }

    #[test]
    fn type_str_rejects_unbound_characters() {
        let mut sim = SessionSimulator::new();
        let err = sim.type_str("1+q").err().unwrap();
        assert_eq!(err, UnknownKey('q'));
        assert!(err.to_string().contains("'q'"));
        // Nothing is pressed when the string is rejected.
        assert_eq!(sim.snapshot().first, "0");
    }

    #[test]
    fn advance_moves_virtual_clock() {
        let mut sim = SessionSimulator::with_config(EngineConfig::with_timeout(
            Duration::from_millis(10),
        ));
        let start = sim.now();
        sim.press(KeyIdentity::Nine);
        sim.advance(Duration::from_millis(10));
        assert_eq!(sim.now() - start, Duration::from_millis(10));
        assert_eq!(sim.snapshot().first, "0");
    }

    #[test]
    fn clear_outputs_empties_log() {
        let mut sim = SessionSimulator::new();
        sim.press(KeyIdentity::One);
        sim.clear_outputs();
        assert!(sim.outputs().is_empty());
        assert_eq!(sim.editor_value(), "1");
    }
}

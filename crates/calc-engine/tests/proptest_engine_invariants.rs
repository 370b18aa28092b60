//! Property-based invariant tests for the interpretation engine.
//!
//! 1. Digits typed with no operator display as their concatenation with
//!    leading zeros removed.
//! 2. PlusMinus twice restores the editor value.
//! 3. `%` twice divides by 10 000.
//! 4. Registers and the editor value stay well-formed decimal literals for
//!    any key sequence, and no sequence panics.
//! 5. Pauses shorter than the timeout never change the outcome.
//! 6. A pause of at least the timeout always yields the default snapshot.

use std::time::Duration;

use calc_core::decimal::{DecimalArithmetic, ExactDecimal};
use calc_core::event::KeyIdentity as K;
use calc_engine::{CalculatorSnapshot, SessionSimulator};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const ALL_KEYS: [K; 19] = [
    K::Zero,
    K::One,
    K::Two,
    K::Three,
    K::Four,
    K::Five,
    K::Six,
    K::Seven,
    K::Eight,
    K::Nine,
    K::Point,
    K::PlusMinus,
    K::Percent,
    K::Add,
    K::Subtract,
    K::Multiply,
    K::Divide,
    K::Clear,
    K::Enter,
];

fn any_key() -> impl Strategy<Value = K> {
    proptest::sample::select(ALL_KEYS.to_vec())
}

fn digit_key() -> impl Strategy<Value = K> {
    (0u8..10).prop_map(|d| K::digit(d).unwrap())
}

fn edit_key() -> impl Strategy<Value = K> {
    prop_oneof![digit_key(), Just(K::Point), Just(K::Percent), Just(K::PlusMinus)]
}

fn is_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (unsigned, ""),
    };
    !int.is_empty()
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit())
}

fn run(keys: &[K]) -> SessionSimulator {
    let mut sim = SessionSimulator::new();
    sim.press_all(keys);
    sim
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Digit concatenation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn digits_concatenate(digits in proptest::collection::vec(0u8..10, 1..12)) {
        let keys: Vec<K> = digits.iter().map(|d| K::digit(*d).unwrap()).collect();
        let sim = run(&keys);

        let typed: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
        let trimmed = typed.trim_start_matches('0');
        let expected = if trimmed.is_empty() { "0" } else { trimmed };
        prop_assert_eq!(&sim.snapshot().first, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Sign toggle is an involution
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn plus_minus_twice_restores(keys in proptest::collection::vec(edit_key(), 0..10)) {
        let mut sim = run(&keys);
        let before = sim.editor_value().to_string();
        sim.press_all(&[K::PlusMinus, K::PlusMinus]);
        prop_assert_eq!(sim.editor_value(), before.as_str());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Percent compounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn percent_twice_divides_by_ten_thousand(
        digits in proptest::collection::vec(digit_key(), 1..8)
    ) {
        let mut sim = run(&digits);
        let typed = sim.editor_value().to_string();
        sim.press_all(&[K::Percent, K::Percent]);
        let expected = ExactDecimal.divide(&typed, "10000").unwrap();
        prop_assert_eq!(sim.editor_value(), expected.as_str());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Well-formed state for arbitrary sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn state_stays_well_formed(keys in proptest::collection::vec(any_key(), 0..40)) {
        let mut sim = SessionSimulator::new();
        for key in keys {
            sim.press(key);
            let snap = sim.snapshot();
            prop_assert!(is_literal(&snap.first), "first {:?}", snap.first);
            prop_assert!(is_literal(&snap.second), "second {:?}", snap.second);
            prop_assert!(is_literal(sim.editor_value()), "editor {:?}", sim.editor_value());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Short pauses are invisible
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn short_pauses_do_not_matter(
        steps in proptest::collection::vec((any_key(), 0u64..5000), 0..25)
    ) {
        let mut paused = SessionSimulator::new();
        let mut fast = SessionSimulator::new();
        for (key, pause_ms) in steps {
            paused.advance(Duration::from_millis(pause_ms));
            paused.press(key);
            fast.press(key);
        }
        prop_assert_eq!(paused.snapshot(), fast.snapshot());
        prop_assert_eq!(paused.editor_value(), fast.editor_value());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Long pauses always reset
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn long_pause_resets(
        keys in proptest::collection::vec(any_key(), 1..25),
        extra_ms in 0u64..60_000,
    ) {
        let mut sim = run(&keys);
        sim.advance(Duration::from_millis(5000 + extra_ms));
        prop_assert_eq!(sim.snapshot(), &CalculatorSnapshot::default());
        prop_assert_eq!(sim.editor_value(), "0");
    }
}

#![forbid(unsafe_code)]

//! Rendering projection: what the display adapter draws for a snapshot.
//!
//! This is a pure function of the snapshot, the clear-button label, and the
//! number format. It never mutates the snapshot.

use calc_core::format::NumberFormat;

use crate::editor::ClearLabel;
use crate::sequencer::CalculatorSnapshot;

/// Text shown in place of the active register after a failed computation.
pub const ERROR_TEXT: &str = "Error";

/// Display-ready view of the calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    /// Grouped first register.
    pub first: String,
    /// Grouped second register.
    pub second: String,
    pub operator_glyph: &'static str,
    /// True while the first register is live.
    pub active_first: bool,
    pub clear_label: ClearLabel,
    pub error: bool,
}

impl DisplayModel {
    /// Project a snapshot for display.
    #[must_use]
    pub fn project(
        snapshot: &CalculatorSnapshot,
        clear_label: ClearLabel,
        format: &NumberFormat,
    ) -> Self {
        let error = snapshot.error.is_some();
        let active_first = snapshot.step.is_first_active();
        let first = if error && active_first {
            ERROR_TEXT.to_string()
        } else {
            format.format(&snapshot.first)
        };
        Self {
            first,
            second: format.format(&snapshot.second),
            operator_glyph: snapshot.operator.glyph(),
            active_first,
            clear_label,
            error,
        }
    }

    /// The value in the live register.
    #[must_use]
    pub fn active(&self) -> &str {
        if self.active_first {
            &self.first
        } else {
            &self.second
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::Step;
    use calc_core::decimal::DecimalError;
    use calc_core::event::BinaryOperator;

    #[test]
    fn projects_active_side_and_glyph() {
        let snapshot = CalculatorSnapshot {
            step: Step::ChangeSecond,
            first: "1234".into(),
            second: "56.7".into(),
            operator: BinaryOperator::Multiply,
            ..CalculatorSnapshot::default()
        };
        let view = DisplayModel::project(&snapshot, ClearLabel::Clear, &NumberFormat::default());
        assert_eq!(view.first, "1,234");
        assert_eq!(view.second, "56.7");
        assert_eq!(view.operator_glyph, "×");
        assert!(!view.active_first);
        assert_eq!(view.active(), "56.7");
        assert_eq!(view.clear_label, ClearLabel::Clear);
    }

    #[test]
    fn error_replaces_first_register() {
        let snapshot = CalculatorSnapshot {
            error: Some(DecimalError::DivisionByZero),
            ..CalculatorSnapshot::default()
        };
        let view =
            DisplayModel::project(&snapshot, ClearLabel::AllClear, &NumberFormat::default());
        assert!(view.error);
        assert_eq!(view.active(), ERROR_TEXT);
    }

    #[test]
    fn projection_leaves_snapshot_untouched() {
        let snapshot = CalculatorSnapshot {
            first: "1000000".into(),
            ..CalculatorSnapshot::default()
        };
        let before = snapshot.clone();
        let view = DisplayModel::project(&snapshot, ClearLabel::Clear, &NumberFormat::for_locale("de"));
        assert_eq!(view.first, "1.000.000");
        assert_eq!(snapshot, before);
    }
}

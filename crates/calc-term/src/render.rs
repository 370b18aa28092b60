#![forbid(unsafe_code)]

//! Text rendering of a [`DisplayModel`] and the keypad.
//!
//! The panel is a fixed-width box: two register lines above a 5×4 keypad
//! grid. Rendering is pure so the script runner and the tests share it
//! with the interactive terminal.

use calc_core::event::{KEYPAD, KeyIdentity};
use calc_engine::DisplayModel;
use calc_engine::editor::ClearLabel;

/// Character width of one keypad cell.
const CELL_WIDTH: usize = 5;

/// Inner width of the panel: four cells plus three separators.
pub const PANEL_WIDTH: usize = CELL_WIDTH * 4 + 3;

/// Render the register lines only.
///
/// The upper line shows the first register and the operator while the second
/// register is live; the lower line always shows the live register.
#[must_use]
pub fn display_lines(view: &DisplayModel) -> [String; 2] {
    let upper = if view.active_first {
        String::new()
    } else {
        format!("{} {}", view.first, view.operator_glyph)
    };
    [fit(&upper, PANEL_WIDTH), fit(view.active(), PANEL_WIDTH)]
}

/// Render the full boxed panel, one string per terminal row.
#[must_use]
pub fn panel(view: &DisplayModel) -> Vec<String> {
    let mut lines = Vec::with_capacity(4 + KEYPAD.len() * 2);
    lines.push(format!("┌{}┐", "─".repeat(PANEL_WIDTH)));
    for line in display_lines(view) {
        lines.push(format!("│{line}│"));
    }
    let mut upper = None;
    for row in &KEYPAD {
        lines.push(rule(upper, Some(row), '├', '┤'));
        lines.push(keypad_row(row, view.clear_label));
        upper = Some(row);
    }
    lines.push(rule(upper, None, '└', '┘'));
    lines
}

/// Right-align `value` in `width` columns, eliding its leading digits when
/// it does not fit.
fn fit(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len <= width {
        return format!("{value:>width$}");
    }
    let tail: String = value.chars().skip(len - (width - 1)).collect();
    format!("…{tail}")
}

fn center(label: &str, width: usize) -> String {
    format!("{label:^width$}")
}

/// Group a keypad row into `(key, span)` runs of identical keys.
fn spans(row: &[KeyIdentity; 4]) -> Vec<(KeyIdentity, usize)> {
    let mut out: Vec<(KeyIdentity, usize)> = Vec::with_capacity(row.len());
    for key in row {
        match out.last_mut() {
            Some((last, span)) if last == key => *span += 1,
            _ => out.push((*key, 1)),
        }
    }
    out
}

fn keypad_row(row: &[KeyIdentity; 4], clear_label: ClearLabel) -> String {
    let mut out = String::from("│");
    for (key, span) in spans(row) {
        let label = if key == KeyIdentity::Clear {
            clear_label.as_str()
        } else {
            key.label()
        };
        out.push_str(&center(label, CELL_WIDTH * span + span - 1));
        out.push('│');
    }
    out
}

/// True after cell `i` when the next cell holds a different key.
fn boundary(row: Option<&[KeyIdentity; 4]>, i: usize) -> bool {
    row.is_some_and(|r| r[i] != r[i + 1])
}

/// Horizontal rule between two keypad rows; junctions follow the cell
/// boundaries of both.
fn rule(
    upper: Option<&[KeyIdentity; 4]>,
    lower: Option<&[KeyIdentity; 4]>,
    left: char,
    right: char,
) -> String {
    let mut out = String::new();
    out.push(left);
    for i in 0..4 {
        out.push_str(&"─".repeat(CELL_WIDTH));
        if i < 3 {
            out.push(match (boundary(upper, i), boundary(lower, i)) {
                (true, true) => '┼',
                (true, false) => '┴',
                (false, true) => '┬',
                (false, false) => '─',
            });
        }
    }
    out.push(right);
    out
}

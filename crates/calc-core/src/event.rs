#![forbid(unsafe_code)]

//! Canonical calculator key types.
//!
//! Every physical activation on the keypad becomes one [`KeyEvent`]: an
//! immutable `(KeyCategory, KeyIdentity)` pair. The category is redundant with
//! the identity but is kept because the editing layer filters by category
//! before it looks at the identity.
//!
//! # Design Notes
//!
//! - [`KeyEvent::new`] derives the category, so events built in-process are
//!   always consistent.
//! - [`KeyEvent::from_parts`] is the entry point for hosts that deliver both
//!   halves; a mismatched pair is rejected rather than guessed at.
//! - The operator register is typed as [`BinaryOperator`], so an arithmetic
//!   dispatch on a non-operator identity cannot be expressed.

#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// Coarse key grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCategory {
    /// Digits, decimal point, sign toggle, and percent.
    Number,
    /// The four binary operators.
    Operator,
    /// The `AC`/`C` key.
    Clear,
    /// The `=` key.
    Enter,
}

/// Identity of a single calculator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIdentity {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Point,
    PlusMinus,
    Percent,
    Add,
    Subtract,
    Multiply,
    Divide,
    Clear,
    Enter,
}

const DIGITS: [KeyIdentity; 10] = [
    KeyIdentity::Zero,
    KeyIdentity::One,
    KeyIdentity::Two,
    KeyIdentity::Three,
    KeyIdentity::Four,
    KeyIdentity::Five,
    KeyIdentity::Six,
    KeyIdentity::Seven,
    KeyIdentity::Eight,
    KeyIdentity::Nine,
];

impl KeyIdentity {
    /// The category this identity belongs to.
    #[must_use]
    pub const fn category(self) -> KeyCategory {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide => KeyCategory::Operator,
            Self::Clear => KeyCategory::Clear,
            Self::Enter => KeyCategory::Enter,
            _ => KeyCategory::Number,
        }
    }

    /// Digit key for `n`, or `None` if `n > 9`.
    #[must_use]
    pub fn digit(n: u8) -> Option<Self> {
        DIGITS.get(usize::from(n)).copied()
    }

    /// Numeric value of a digit key.
    #[must_use]
    pub fn digit_value(self) -> Option<u8> {
        DIGITS.iter().position(|d| *d == self).map(|i| i as u8)
    }

    /// Static key-cap label.
    ///
    /// The Clear key reports `"AC"` here; its live label is derived from the
    /// editor state (see the engine's `ClearLabel`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Point => ".",
            Self::PlusMinus => "±",
            Self::Percent => "%",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "÷",
            Self::Clear => "AC",
            Self::Enter => "=",
        }
    }

    /// Keyboard binding used by the terminal front end and by key scripts.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        if let Some(d) = c.to_digit(10) {
            return Self::digit(d as u8);
        }
        match c {
            '.' | ',' => Some(Self::Point),
            '~' | 'n' | '±' => Some(Self::PlusMinus),
            '%' => Some(Self::Percent),
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' | 'x' | '×' => Some(Self::Multiply),
            '/' | '÷' => Some(Self::Divide),
            'c' | 'C' => Some(Self::Clear),
            '=' | '\n' | '\r' => Some(Self::Enter),
            _ => None,
        }
    }
}

/// Physical keypad arrangement, row by row.
///
/// `=` occupies the last two cells of the bottom row.
pub const KEYPAD: [[KeyIdentity; 4]; 5] = [
    [
        KeyIdentity::Clear,
        KeyIdentity::PlusMinus,
        KeyIdentity::Percent,
        KeyIdentity::Divide,
    ],
    [
        KeyIdentity::Seven,
        KeyIdentity::Eight,
        KeyIdentity::Nine,
        KeyIdentity::Multiply,
    ],
    [
        KeyIdentity::Four,
        KeyIdentity::Five,
        KeyIdentity::Six,
        KeyIdentity::Subtract,
    ],
    [
        KeyIdentity::One,
        KeyIdentity::Two,
        KeyIdentity::Three,
        KeyIdentity::Add,
    ],
    [
        KeyIdentity::Zero,
        KeyIdentity::Point,
        KeyIdentity::Enter,
        KeyIdentity::Enter,
    ],
];

/// A binary operator held in the operator register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BinaryOperator {
    #[default]
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// Display glyph.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }
}

impl TryFrom<KeyIdentity> for BinaryOperator {
    type Error = KeyEventError;

    fn try_from(identity: KeyIdentity) -> Result<Self, Self::Error> {
        match identity {
            KeyIdentity::Add => Ok(Self::Add),
            KeyIdentity::Subtract => Ok(Self::Subtract),
            KeyIdentity::Multiply => Ok(Self::Multiply),
            KeyIdentity::Divide => Ok(Self::Divide),
            other => Err(KeyEventError::NotAnOperator(other)),
        }
    }
}

impl From<BinaryOperator> for KeyIdentity {
    fn from(op: BinaryOperator) -> Self {
        match op {
            BinaryOperator::Add => Self::Add,
            BinaryOperator::Subtract => Self::Subtract,
            BinaryOperator::Multiply => Self::Multiply,
            BinaryOperator::Divide => Self::Divide,
        }
    }
}

/// Rejected key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventError {
    /// The category does not match the identity.
    CategoryMismatch {
        category: KeyCategory,
        identity: KeyIdentity,
    },
    /// An operator was required but another key was supplied.
    NotAnOperator(KeyIdentity),
}

impl std::fmt::Display for KeyEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CategoryMismatch { category, identity } => {
                write!(f, "key {identity:?} does not belong to category {category:?}")
            }
            Self::NotAnOperator(identity) => write!(f, "key {identity:?} is not an operator"),
        }
    }
}

impl std::error::Error for KeyEventError {}

/// One key activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    category: KeyCategory,
    identity: KeyIdentity,
}

impl KeyEvent {
    /// Create the event for `identity`.
    #[must_use]
    pub const fn new(identity: KeyIdentity) -> Self {
        Self {
            category: identity.category(),
            identity,
        }
    }

    /// Build an event from a host-supplied pair.
    pub fn from_parts(category: KeyCategory, identity: KeyIdentity) -> Result<Self, KeyEventError> {
        if identity.category() == category {
            Ok(Self { category, identity })
        } else {
            crate::error!(?category, ?identity, "rejected key with mismatched category");
            Err(KeyEventError::CategoryMismatch { category, identity })
        }
    }

    #[must_use]
    pub const fn category(&self) -> KeyCategory {
        self.category
    }

    #[must_use]
    pub const fn identity(&self) -> KeyIdentity {
        self.identity
    }

    /// Map a crossterm key press to a calculator key.
    ///
    /// Release and repeat events, modified keys (other than Shift), and keys
    /// without a binding map to `None`.
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: &cte::KeyEvent) -> Option<Self> {
        if event.kind != cte::KeyEventKind::Press {
            return None;
        }
        let allowed = cte::KeyModifiers::SHIFT | cte::KeyModifiers::NONE;
        if !allowed.contains(event.modifiers) {
            return None;
        }
        let identity = match event.code {
            cte::KeyCode::Char(c) => KeyIdentity::from_char(c)?,
            cte::KeyCode::Enter => KeyIdentity::Enter,
            cte::KeyCode::Backspace | cte::KeyCode::Delete => KeyIdentity::Clear,
            _ => return None,
        };
        Some(Self::new(identity))
    }
}

impl From<KeyIdentity> for KeyEvent {
    fn from(identity: KeyIdentity) -> Self {
        Self::new(identity)
    }
}

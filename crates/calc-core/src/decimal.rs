#![forbid(unsafe_code)]

//! Exact decimal arithmetic on canonical decimal strings.
//!
//! The engine never touches floating point. Every numeric operation goes
//! through a [`DecimalArithmetic`] implementation that takes decimal strings
//! and returns a canonical decimal string, which is then the only source of
//! numeric truth.
//!
//! # Canonical form
//!
//! Inputs may be anything the operand editor produces: an optional leading
//! `-`, digits, and an optional point with or without a fraction (`"12."`,
//! `"-0"`, `"-0.5"`). Outputs carry no trailing fractional zeros and zero is
//! always `"0"`.

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, Zero};

use crate::event::BinaryOperator;

/// Fraction digits kept by a division whose quotient does not terminate.
pub const DIVISION_SCALE: i64 = 32;

/// Largest number of plain-notation digits a value may occupy.
///
/// Repeated squaring (`× =` chained) doubles the length each step; values
/// past this bound are reported as [`DecimalError::Overflow`].
pub const MAX_DIGITS: u64 = 1000;

/// Failure reported by the arithmetic collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// Divisor was zero.
    DivisionByZero,
    /// Operand or result longer than [`MAX_DIGITS`].
    Overflow,
    /// Input was not a decimal literal.
    Malformed(String),
}

impl std::fmt::Display for DecimalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::Malformed(input) => write!(f, "malformed decimal: {input:?}"),
        }
    }
}

impl std::error::Error for DecimalError {}

/// Arithmetic over canonical decimal strings.
pub trait DecimalArithmetic {
    fn add(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError>;
    fn subtract(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError>;
    fn multiply(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError>;
    fn divide(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError>;

    /// `value / 100`.
    fn percent(&self, value: &str) -> Result<String, DecimalError>;

    /// Dispatch on a typed operator.
    fn apply(&self, op: BinaryOperator, lhs: &str, rhs: &str) -> Result<String, DecimalError> {
        match op {
            BinaryOperator::Add => self.add(lhs, rhs),
            BinaryOperator::Subtract => self.subtract(lhs, rhs),
            BinaryOperator::Multiply => self.multiply(lhs, rhs),
            BinaryOperator::Divide => self.divide(lhs, rhs),
        }
    }
}

/// True for the raw zero literals `"0"` and `"-0"`.
///
/// This is a string test, not a numeric one: `"0."` or `"0.0"` are
/// considered edits in progress.
#[must_use]
pub fn is_zero_literal(value: &str) -> bool {
    value == "0" || value == "-0"
}

/// Default collaborator backed by `bigdecimal`.
///
/// Addition, subtraction, multiplication, and percent are exact. Division
/// is exact when the quotient terminates within [`DIVISION_SCALE`] fraction
/// digits and rounded half-even there otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactDecimal;

impl ExactDecimal {
    fn parse(input: &str) -> Result<BigDecimal, DecimalError> {
        let trimmed = input.strip_suffix('.').unwrap_or(input);
        let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
        let well_formed = !digits.is_empty()
            && !digits.starts_with('.')
            && !digits.ends_with('.')
            && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
            && digits.matches('.').count() <= 1;
        if !well_formed {
            crate::error!(input, "malformed decimal literal");
            return Err(DecimalError::Malformed(input.to_string()));
        }
        let value = BigDecimal::from_str(trimmed).map_err(|_| {
            crate::error!(input, "malformed decimal literal");
            DecimalError::Malformed(input.to_string())
        })?;
        Self::within_capacity(value)
    }

    /// Reject values whose plain rendering would exceed [`MAX_DIGITS`].
    fn within_capacity(value: BigDecimal) -> Result<BigDecimal, DecimalError> {
        let value = value.normalized();
        let (_, scale) = value.as_bigint_and_exponent();
        if value.digits() + scale.unsigned_abs() > MAX_DIGITS {
            crate::warn!(digits = value.digits(), scale, "decimal exceeds capacity");
            return Err(DecimalError::Overflow);
        }
        Ok(value)
    }

    fn render(value: BigDecimal) -> Result<String, DecimalError> {
        let value = Self::within_capacity(value)?;
        if value.is_zero() {
            return Ok("0".to_string());
        }
        Ok(value.to_plain_string())
    }

    /// `dividend / divisor` at [`DIVISION_SCALE`], rounded half-even.
    ///
    /// Computed on the unscaled integers so operands of any length keep
    /// every digit of the quotient.
    fn quotient(dividend: &BigDecimal, divisor: &BigDecimal) -> BigDecimal {
        let (a, a_scale) = dividend.as_bigint_and_exponent();
        let (b, b_scale) = divisor.as_bigint_and_exponent();
        let shift = DIVISION_SCALE + b_scale - a_scale;
        let ten = BigInt::from(10u32);
        let (num, den) = if shift >= 0 {
            (a * ten.pow(shift as u32), b)
        } else {
            (a, b * ten.pow(shift.unsigned_abs() as u32))
        };

        let mut q = &num / &den;
        let r = &num % &den;
        let round_away = match (r.magnitude() * 2u32).cmp(den.magnitude()) {
            Ordering::Greater => true,
            Ordering::Equal => q.magnitude().bit(0),
            Ordering::Less => false,
        };
        if round_away {
            if (num.sign() == Sign::Minus) != (den.sign() == Sign::Minus) {
                q -= 1u32;
            } else {
                q += 1u32;
            }
        }
        BigDecimal::new(q, DIVISION_SCALE)
    }

    fn binary(
        lhs: &str,
        rhs: &str,
        op: impl FnOnce(&BigDecimal, &BigDecimal) -> BigDecimal,
    ) -> Result<String, DecimalError> {
        let lhs = Self::parse(lhs)?;
        let rhs = Self::parse(rhs)?;
        Self::render(op(&lhs, &rhs))
    }
}

impl DecimalArithmetic for ExactDecimal {
    fn add(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError> {
        Self::binary(lhs, rhs, |a, b| a + b)
    }

    fn subtract(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError> {
        Self::binary(lhs, rhs, |a, b| a - b)
    }

    fn multiply(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError> {
        Self::binary(lhs, rhs, |a, b| a * b)
    }

    fn divide(&self, lhs: &str, rhs: &str) -> Result<String, DecimalError> {
        let divisor = Self::parse(rhs)?;
        if divisor.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        let dividend = Self::parse(lhs)?;
        Self::render(Self::quotient(&dividend, &divisor))
    }

    fn percent(&self, value: &str) -> Result<String, DecimalError> {
        let hundredth = BigDecimal::new(BigInt::from(1), 2);
        Self::render(Self::parse(value)? * hundredth)
    }
}

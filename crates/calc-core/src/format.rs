#![forbid(unsafe_code)]

//! Display formatting for canonical decimal strings.
//!
//! Only the integer part is grouped; the fraction (including a trailing
//! point while the user is still typing) is passed through verbatim. The
//! formatter works on the string itself so no digit is ever lost to a
//! numeric round trip.

use std::env;

const NBSP: char = '\u{a0}';

/// Locale-dependent separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    /// Inserted between groups of three integer digits.
    pub group_separator: char,
    /// Replaces the `.` of the canonical form.
    pub decimal_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            group_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl NumberFormat {
    /// Separators for a BCP-47-ish tag such as `"de"`, `"fr_FR.UTF-8"`, or `"en-US"`.
    ///
    /// Unknown languages use the default (`,` grouping, `.` decimal point).
    #[must_use]
    pub fn for_locale(tag: &str) -> Self {
        match language(tag).as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" | "da" => Self {
                group_separator: '.',
                decimal_separator: ',',
            },
            "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "uk" => Self {
                group_separator: NBSP,
                decimal_separator: ',',
            },
            _ => Self::default(),
        }
    }

    /// Format a canonical decimal string for display.
    #[must_use]
    pub fn format(&self, value: &str) -> String {
        let (sign, unsigned) = match value.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", value),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (unsigned, None),
        };

        let mut out = String::with_capacity(value.len() + integer.len() / 3 + 1);
        out.push_str(sign);
        let len = integer.chars().count();
        for (i, c) in integer.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(c);
        }
        if let Some(fraction) = fraction {
            out.push(self.decimal_separator);
            out.push_str(fraction);
        }
        out
    }
}

/// Language subtag, lowercased.
fn language(tag: &str) -> String {
    tag.split(['_', '-', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Detect the locale tag from the environment.
///
/// Preference order: `LC_ALL`, then `LANG`. Falls back to `"en"` when unset
/// or set to the POSIX locale.
#[must_use]
pub fn detect_locale() -> String {
    let lc_all = env::var("LC_ALL").ok();
    let lang = env::var("LANG").ok();
    detect_locale_from(lc_all.as_deref(), lang.as_deref())
}

/// Locale detection with explicit inputs.
#[must_use]
pub fn detect_locale_from(lc_all: Option<&str>, lang: Option<&str>) -> String {
    [lc_all, lang]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty() && *v != "C" && *v != "POSIX")
        .map_or_else(|| "en".to_string(), str::to_string)
}

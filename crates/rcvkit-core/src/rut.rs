//! The Chilean tax identifier (RUT).
//!
//! A [`Rut`] is the national identifier used for persons and entities:
//! a sequence of up to eight digits plus a single check character
//! (`0`-`9` or `K`). Parsing normalizes dotted, zero-padded, and
//! lowercase renditions to a canonical `DIGITS-DV` form; check-digit
//! verification is opt-in via [`Rut::verify`].
//!
//! # Examples
//!
//! ```
//! use rcvkit_core::Rut;
//!
//! let rut: Rut = "9.687.403-0".parse().unwrap();
//! assert_eq!(rut.canonical(), "9687403-0");
//! assert!(rut.verify().is_ok());
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest digit portion a RUT can carry (eight digits).
pub const MAX_RUT_NUMBER: u32 = 99_999_999;

/// Errors from RUT parsing and verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RutError {
    /// The input does not have the `DIGITS-DV` shape.
    #[error("invalid RUT '{0}'")]
    InvalidShape(String),
    /// The supplied check digit does not match the computed one.
    #[error("RUT check digit mismatch: found '{found}', computed '{computed}'")]
    ChecksumMismatch {
        /// The check digit present in the parsed value.
        found: char,
        /// The check digit the modulo-11 scheme yields.
        computed: char,
    },
}

/// A normalized Chilean RUT.
///
/// Equality and hashing compare the canonical form (digit portion plus
/// check digit); ordering compares the numeric digit portion first.
/// Construction validates the syntactic shape only; call
/// [`Rut::verify`] to check the check digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rut {
    number: u32,
    check_digit: char,
}

impl Rut {
    /// Parse a RUT from a string.
    ///
    /// Accepts dotted thousands separators, surrounding whitespace,
    /// leading zeros, and a lowercase `k`; anything else outside the
    /// strict `1-8 digits, dash, check symbol` shape is rejected.
    pub fn parse(input: &str) -> Result<Self, RutError> {
        let bad = || RutError::InvalidShape(input.to_string());

        let cleaned: String = input.trim().replace('.', "");
        let (digits, check) = cleaned.split_once('-').ok_or_else(bad)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }

        // Leading zeros are stripped before the length check; an
        // all-zero digit portion keeps a single "0".
        let digits = match digits.trim_start_matches('0') {
            "" => "0",
            stripped => stripped,
        };
        if digits.len() > 8 {
            return Err(bad());
        }

        let mut chars = check.chars();
        let check_digit = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => c,
            (Some('K' | 'k'), None) => 'K',
            _ => return Err(bad()),
        };

        let number: u32 = digits.parse().map_err(|_| bad())?;

        Ok(Self {
            number,
            check_digit,
        })
    }

    /// The numeric digit portion.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// The check character (`0`-`9` or `K`).
    #[must_use]
    pub const fn check_digit(&self) -> char {
        self.check_digit
    }

    /// Compute the check digit for a digit portion.
    ///
    /// Modulo-11 scheme: digits are weighted from least to most
    /// significant by the cycle 2, 3, 4, 5, 6, 7; the result of
    /// `11 - (sum % 11)` maps 10 to `K` and 11 to `0`.
    #[must_use]
    pub const fn compute_check_digit(number: u32) -> char {
        let mut n = number;
        let mut factor = 2u32;
        let mut sum = 0u32;
        loop {
            sum += (n % 10) * factor;
            factor = if factor == 7 { 2 } else { factor + 1 };
            n /= 10;
            if n == 0 {
                break;
            }
        }
        match 11 - (sum % 11) {
            10 => 'K',
            11 => '0',
            d => (b'0' + d as u8) as char,
        }
    }

    /// Verify the check digit against the modulo-11 computation.
    pub fn verify(&self) -> Result<(), RutError> {
        let computed = Self::compute_check_digit(self.number);
        if self.check_digit == computed {
            Ok(())
        } else {
            Err(RutError::ChecksumMismatch {
                found: self.check_digit,
                computed,
            })
        }
    }

    /// The canonical `DIGITS-DV` rendering.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}-{}", self.number, self.check_digit)
    }

    /// Render with dotted thousands separators, e.g. `9.687.403-0`.
    #[must_use]
    pub fn format_with_dots(&self) -> String {
        let digits = self.number.to_string();
        let mut out = String::with_capacity(digits.len() + 5);
        let lead = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - lead) % 3 == 0 {
                out.push('.');
            }
            out.push(c);
        }
        out.push('-');
        out.push(self.check_digit);
        out
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.number, self.check_digit)
    }
}

impl FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for Rut {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.check_digit.cmp(&other.check_digit))
    }
}

impl PartialOrd for Rut {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Rut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for Rut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_canonical() {
        let rut = Rut::parse("96874030-K").unwrap();
        assert_eq!(rut.number(), 96_874_030);
        assert_eq!(rut.check_digit(), 'K');
        assert_eq!(rut.canonical(), "96874030-K");
    }

    #[test]
    fn test_parse_normalizes_dots_case_and_zeros() {
        // Dots in odd places, lowercase check char
        let messy = Rut::parse("9.68.7403.0-k").unwrap();
        let clean = Rut::parse("96874030-K").unwrap();
        assert_eq!(messy, clean);

        let padded = Rut::parse("  0009687403-0 ").unwrap();
        assert_eq!(padded.canonical(), "9687403-0");

        // The 8-digit limit applies after zero-stripping, so a padded
        // spelling may exceed eight raw characters.
        let long_pad = Rut::parse("00096874030-K").unwrap();
        assert_eq!(long_pad.canonical(), "96874030-K");
        assert_eq!(Rut::parse("0000-0").unwrap().canonical(), "0-0");

        // Nine significant digits stay out of range however padded.
        assert!(Rut::parse("0968740301-0").is_err());
    }

    #[test]
    fn test_parse_zero() {
        let rut = Rut::parse("0-0").unwrap();
        assert_eq!(rut.number(), 0);
        assert!(rut.verify().is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for input in [
            "",
            "-",
            "-0",
            "9687403",
            "9687403-",
            "9687403-00",
            "9687403-X",
            "968740301-0", // nine digits
            "96a7403-0",
            "9687403_0",
        ] {
            assert!(Rut::parse(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_compute_check_digit() {
        assert_eq!(Rut::compute_check_digit(96_874_030), 'K');
        assert_eq!(Rut::compute_check_digit(9_687_403), '0');
        assert_eq!(Rut::compute_check_digit(60_910_000), '1');
        assert_eq!(Rut::compute_check_digit(0), '0');
    }

    #[test]
    fn test_verify() {
        assert!(Rut::parse("96874030-K").unwrap().verify().is_ok());

        let err = Rut::parse("96874030-1").unwrap().verify().unwrap_err();
        assert_eq!(
            err,
            RutError::ChecksumMismatch {
                found: '1',
                computed: 'K',
            }
        );
    }

    #[test]
    fn test_ordering_by_number() {
        let a = Rut::parse("9687403-0").unwrap();
        let b = Rut::parse("96874030-K").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_format_with_dots() {
        assert_eq!(
            Rut::parse("96874030-K").unwrap().format_with_dots(),
            "96.874.030-K"
        );
        assert_eq!(
            Rut::parse("9687403-0").unwrap().format_with_dots(),
            "9.687.403-0"
        );
        assert_eq!(Rut::parse("12-4").unwrap().format_with_dots(), "12-4");
    }

    #[test]
    fn test_serde_round_trip() {
        let rut = Rut::parse("96874030-K").unwrap();
        let json = serde_json::to_string(&rut).unwrap();
        assert_eq!(json, "\"96874030-K\"");
        let back: Rut = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rut);
    }

    proptest! {
        #[test]
        fn prop_check_digit_is_pure(n in 0u32..=MAX_RUT_NUMBER) {
            prop_assert_eq!(Rut::compute_check_digit(n), Rut::compute_check_digit(n));
        }

        #[test]
        fn prop_computed_check_digit_verifies(n in 0u32..=MAX_RUT_NUMBER) {
            let dv = Rut::compute_check_digit(n);
            let rut = Rut::parse(&format!("{n}-{dv}")).unwrap();
            prop_assert!(rut.verify().is_ok());
        }

        #[test]
        fn prop_altered_check_digit_fails(n in 0u32..=MAX_RUT_NUMBER) {
            let dv = Rut::compute_check_digit(n);
            let wrong = if dv == '5' { '6' } else { '5' };
            let rut = Rut::parse(&format!("{n}-{wrong}")).unwrap();
            prop_assert!(rut.verify().is_err());
        }
    }
}

//! RUT (Rol Único Tributario) parsing, check-digit validation and formatting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::group_thousands;

/// Longest RUT body (without check digit) accepted.
const MAX_BODY_DIGITS: usize = 9;

/// Error returned when a RUT cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RutError {
    /// The input is not shaped like a RUT at all.
    #[error("invalid RUT '{value}': {reason}")]
    InvalidFormat { value: String, reason: &'static str },

    /// The input is well-formed but its check digit is wrong.
    #[error("invalid RUT '{value}': check digit should be {expected}, got {found}")]
    InvalidChecksum {
        value: String,
        expected: char,
        found: char,
    },
}

/// A validated Chilean tax identifier.
///
/// The only way to obtain a `Rut` is through a constructor that verifies the
/// check digit, so holding one means the identifier is valid.
///
/// ```
/// use dte::core::Rut;
///
/// let rut: Rut = "77.117.239-3".parse().unwrap();
/// assert_eq!(rut.format(false), "77117239-3");
/// assert_eq!(rut.format(true), "77.117.239-3");
/// assert!("12345678-9".parse::<Rut>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rut {
    body: u32,
    check: char,
}

impl Rut {
    /// Parse a RUT in any common notation ("77.117.239-3", "77117239-3", "771172393").
    pub fn parse(raw: &str) -> Result<Self, RutError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| *c != '.' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        if cleaned.chars().count() < 2 {
            return Err(RutError::InvalidFormat {
                value: raw.into(),
                reason: "too short",
            });
        }

        let Some((split, found)) = cleaned.char_indices().last() else {
            return Err(RutError::InvalidFormat {
                value: raw.into(),
                reason: "too short",
            });
        };
        let digits = &cleaned[..split];

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(RutError::InvalidFormat {
                value: raw.into(),
                reason: "body must be numeric",
            });
        }
        if !(found.is_ascii_digit() || found == 'K') {
            return Err(RutError::InvalidFormat {
                value: raw.into(),
                reason: "check digit must be 0-9 or K",
            });
        }
        if digits.trim_start_matches('0').len() > MAX_BODY_DIGITS {
            return Err(RutError::InvalidFormat {
                value: raw.into(),
                reason: "body has too many digits",
            });
        }

        let body: u32 = digits.parse().map_err(|_| RutError::InvalidFormat {
            value: raw.into(),
            reason: "body has too many digits",
        })?;

        let expected = check_digit(body);
        if expected != found {
            return Err(RutError::InvalidChecksum {
                value: raw.into(),
                expected,
                found,
            });
        }

        Ok(Self { body, check: found })
    }

    /// Build a RUT from its numeric body, computing the check digit.
    pub fn from_body(body: u32) -> Result<Self, RutError> {
        if body > 999_999_999 {
            return Err(RutError::InvalidFormat {
                value: body.to_string(),
                reason: "body has too many digits",
            });
        }
        Ok(Self {
            body,
            check: check_digit(body),
        })
    }

    /// The numeric body without check digit.
    pub fn body(&self) -> u32 {
        self.body
    }

    /// The check character ('0'-'9' or 'K').
    pub fn check_digit(&self) -> char {
        self.check
    }

    /// Render as "77.117.239-3" (`with_separators`) or "77117239-3".
    pub fn format(&self, with_separators: bool) -> String {
        let digits = self.body.to_string();
        if with_separators {
            format!("{}-{}", group_thousands(&digits, '.'), self.check)
        } else {
            format!("{digits}-{}", self.check)
        }
    }
}

/// Compute the modulo-11 check character for a RUT body.
///
/// Digits are weighted 2,3,4,5,6,7,2,3,... starting from the least
/// significant one.
pub fn check_digit(body: u32) -> char {
    let mut n = body;
    let mut weight = 2;
    let mut sum = 0u32;
    while n > 0 {
        sum += (n % 10) * weight;
        weight = if weight == 7 { 2 } else { weight + 1 };
        n /= 10;
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

/// Whether `raw` is a valid RUT in any common notation.
pub fn is_valid_rut(raw: &str) -> bool {
    Rut::parse(raw).is_ok()
}

impl fmt::Display for Rut {
    /// Compact SII notation, e.g. "77117239-3".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check)
    }
}

impl FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Rut {
    type Error = RutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rut> for String {
    fn from(rut: Rut) -> Self {
        rut.to_string()
    }
}

//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains a character other than digits (or a leading `+`).
    #[error("phone number may only contain digits and an optional leading +")]
    InvalidCharacter,
    /// Too few digits.
    #[error("phone number must have at least {min} digits")]
    TooShort {
        /// Minimum number of digits.
        min: usize,
    },
    /// Too many digits.
    #[error("phone number must have at most {max} digits")]
    TooLong {
        /// Maximum number of digits.
        max: usize,
    },
}

/// A phone number.
///
/// Accepts an optional leading `+` followed by 8-15 digits. No attempt is
/// made at regional formats; the bound matches E.164 plus short national
/// numbers.
///
/// ## Examples
///
/// ```
/// use packshop_core::Phone;
///
/// assert!(Phone::parse("+989121234567").is_ok());
/// assert!(Phone::parse("02188776655").is_ok());
///
/// assert!(Phone::parse("").is_err());         // empty
/// assert!(Phone::parse("12-34-56").is_err()); // separators
/// assert!(Phone::parse("1234567").is_err());  // too short
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits.
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string.
    ///
    /// Surrounding whitespace is trimmed; the stored form is the trimmed
    /// input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains anything other than
    /// digits (with an optional leading `+`), or has a digit count outside
    /// 8-15.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = s.strip_prefix('+').unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacter);
        }

        if digits.len() < Self::MIN_DIGITS {
            return Err(PhoneError::TooShort {
                min: Self::MIN_DIGITS,
            });
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

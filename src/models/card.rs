//! Payment card value objects.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static CARD_NUMBER_RE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"^\d[\d -]*\d$").expect("valid regex"));

static EXPIRY_RE: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"^(0[1-9]|1[0-2])/(\d{2})$").expect("valid regex"));

/// A card number of 15 or 16 digits.
///
/// Digits may be grouped with `-` or spaces. No checksum is applied; the
/// provider validates the card itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CardNumber {
    digits: String,
}

impl CardNumber {
    pub fn new(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !CARD_NUMBER_RE.is_match(raw) {
            return Err(Error::validation(
                "Invalid card number: only digits, '-' and spaces are allowed",
            ));
        }
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if !matches!(digits.len(), 15 | 16) {
            return Err(Error::validation(format!(
                "Invalid card number: expected 15 or 16 digits, got {}",
                digits.len()
            )));
        }
        Ok(Self { digits })
    }

    /// Digits only.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Grouped form sent to the provider: `dddd-dddd-dddd-dddd`, or
    /// `dddd-dddddd-ddddd` for 15-digit cards.
    pub fn formatted(&self) -> String {
        let d = &self.digits;
        if d.len() == 15 {
            format!("{}-{}-{}", &d[..4], &d[4..10], &d[10..])
        } else {
            format!("{}-{}-{}-{}", &d[..4], &d[4..8], &d[8..12], &d[12..])
        }
    }

    /// Last four digits.
    pub fn last4(&self) -> &str {
        &self.digits[self.digits.len() - 4..]
    }
}

impl FromStr for CardNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardNumber(****{})", self.last4())
    }
}

/// Card expiry in `MM/YY` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardExpiry {
    month: u8,
    year: u16,
}

impl CardExpiry {
    pub fn new(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let caps = EXPIRY_RE.captures(raw).ok_or_else(|| {
            Error::validation(format!("Invalid card expiry '{}': expected MM/YY", raw))
        })?;
        let month = caps[1]
            .parse::<u8>()
            .map_err(|_| Error::validation(format!("Invalid card expiry month in '{}'", raw)))?;
        let yy = caps[2]
            .parse::<u16>()
            .map_err(|_| Error::validation(format!("Invalid card expiry year in '{}'", raw)))?;
        Ok(Self {
            month,
            year: 2000 + yy,
        })
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// Four-digit year.
    pub fn year(&self) -> u16 {
        self.year
    }

    /// `YYYY-MM`, the form Iamport expects.
    pub fn to_api_format(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CardExpiry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year % 100)
    }
}

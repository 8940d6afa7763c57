//! Fixed-point product prices.
//!
//! Prices are held as a [`Decimal`] and always written as the normalized
//! decimal string: no thousands separators, `.` as the decimal point, at most
//! two fractional digits and no trailing fractional zeros. That form reads
//! back without any ambiguity between thousands and decimal separators.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PriceError;

/// Maximum fractional digits kept on a price.
const MAX_SCALE: u32 = 2;

/// Currency symbols stripped from admin input.
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₡', '₲', '₱', '₹'];

/// A non-negative product price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// The zero price, used for legacy records whose price cannot be read.
    pub const ZERO: Price = Price(Decimal::ZERO);

    /// Parse a price typed by an admin.
    ///
    /// Strips currency decoration and thousands separators and requires a
    /// strictly positive amount.
    ///
    /// ```
    /// use vitrina_types::price::Price;
    ///
    /// assert_eq!(Price::parse_input("$1,500.00").unwrap().to_string(), "1500");
    /// assert_eq!(Price::parse_input("150.000").unwrap().to_string(), "150000");
    /// assert_eq!(Price::parse_input("19,99").unwrap().to_string(), "19.99");
    /// assert!(Price::parse_input("abc").is_err());
    /// ```
    pub fn parse_input(input: &str) -> Result<Self, PriceError> {
        let amount = parse_amount(input)?;
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive(input.trim().to_string()));
        }
        Ok(Self(amount))
    }

    /// Parse a price read back from the persisted document. Zero is allowed.
    pub fn parse_stored(input: &str) -> Result<Self, PriceError> {
        let amount = parse_amount(input)?;
        if amount < Decimal::ZERO {
            return Err(PriceError::NotPositive(input.trim().to_string()));
        }
        Ok(Self(amount))
    }

    /// Build a price from a decimal, normalizing its scale.
    pub fn from_decimal(value: Decimal) -> Result<Self, PriceError> {
        if value < Decimal::ZERO {
            return Err(PriceError::NotPositive(value.to_string()));
        }
        Ok(Self(normalize(value)))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Price::parse_stored(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a price as a decimal string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        Price::parse_stored(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Price::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        Price::from_decimal(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        let value = Decimal::try_from(v).map_err(|e| E::custom(e.to_string()))?;
        Price::from_decimal(value).map_err(E::custom)
    }
}

fn normalize(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(MAX_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Strip decoration, resolve separators and parse into a normalized decimal.
fn parse_amount(input: &str) -> Result<Decimal, PriceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PriceError::Empty);
    }
    let invalid = || PriceError::Invalid(trimmed.to_string());

    // Currency codes ("COP 1500", "1500 USD") only at the edges.
    let core: String = trimmed
        .trim_matches(|c: char| c.is_ascii_alphabetic() || c.is_whitespace())
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect();

    let (negative, digits) = match core.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, core.as_str()),
    };
    if digits.is_empty()
        || !digits.chars().any(|c| c.is_ascii_digit())
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    {
        return Err(invalid());
    }

    let canonical = resolve_separators(digits).ok_or_else(invalid)?;
    let value = Decimal::from_str(&canonical).map_err(|_| invalid())?;
    let value = if negative { -value } else { value };
    Ok(normalize(value))
}

/// Rewrite `digits` (only ASCII digits, `,` and `.`) with `.` as the sole
/// decimal point. Returns `None` when the separators cannot be interpreted.
fn resolve_separators(digits: &str) -> Option<String> {
    let last_comma = digits.rfind(',');
    let last_dot = digits.rfind('.');

    let (thousands, decimal) = match (last_comma, last_dot) {
        (None, None) => return Some(digits.to_string()),
        (Some(c), Some(d)) => {
            if c > d {
                ('.', Some(','))
            } else {
                (',', Some('.'))
            }
        }
        (Some(_), None) => single_separator(digits, ','),
        (None, Some(_)) => single_separator(digits, '.'),
    };

    if let Some(dec) = decimal {
        if digits.matches(dec).count() > 1 {
            return None;
        }
        if let Some(pos) = digits.rfind(dec) {
            if digits[..pos].contains(dec) || digits[pos + 1..].contains(thousands) {
                return None;
            }
        }
    }

    let rewritten: String = digits
        .chars()
        .filter(|c| *c != thousands)
        .map(|c| if Some(c) == decimal { '.' } else { c })
        .collect();
    if rewritten.starts_with('.') || rewritten.ends_with('.') {
        return None;
    }
    Some(rewritten)
}

/// Decide whether a lone separator kind groups thousands or marks decimals.
fn single_separator(digits: &str, sep: char) -> (char, Option<char>) {
    let count = digits.matches(sep).count();
    if count > 1 {
        return (sep, None);
    }
    let pos = digits.find(sep).unwrap_or_default();
    let integer = &digits[..pos];
    let fraction = &digits[pos + 1..];
    if fraction.len() == 3 && !integer.is_empty() && integer != "0" {
        (sep, None)
    } else {
        // Placeholder thousands char that never occurs after filtering.
        ('\u{0}', Some(sep))
    }
}

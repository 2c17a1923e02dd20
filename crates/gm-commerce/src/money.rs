//! Money type for representing monetary values.
//!
//! Uses an integer count of minor units (paise, cents) to avoid
//! floating-point precision issues. Prices on the wire are plain decimal
//! numbers in major units; [`Money::parse`] and [`Money::to_json_number`]
//! convert at that boundary.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
        }
    }

    /// Number of decimal places in the minor unit.
    pub fn decimal_places(&self) -> u32 {
        2
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money {
    /// Amount in minor units.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a Money value from minor units.
    pub const fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub const fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Create a Money value from whole major units.
    pub fn from_major(amount: i64, currency: Currency) -> Result<Self, CommerceError> {
        amount
            .checked_mul(currency.minor_per_major())
            .map(|minor| Self::new(minor, currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Parse a non-negative decimal price such as `"499"` or `"12.50"`.
    ///
    /// At most as many fractional digits as the currency has decimal places.
    ///
    /// ```
    /// use gm_commerce::money::{Currency, Money};
    /// let price = Money::parse("49.9", Currency::INR).unwrap();
    /// assert_eq!(price.amount_minor, 4990);
    /// ```
    pub fn parse(input: &str, currency: Currency) -> Result<Self, CommerceError> {
        let s = input.trim();
        let invalid = || {
            CommerceError::invalid(format!("price must be a non-negative number, got {input:?}"))
        };

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        let places = currency.decimal_places() as usize;
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
            || (s.contains('.') && frac.is_empty())
        {
            return Err(invalid());
        }
        if frac.len() > places {
            return Err(CommerceError::invalid(format!(
                "price {input:?} has more than {places} decimal places"
            )));
        }

        let whole: i64 = whole.parse().map_err(|_| CommerceError::Overflow)?;
        let mut frac_minor: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| invalid())?
        };
        for _ in frac.len()..places {
            frac_minor *= 10;
        }

        whole
            .checked_mul(currency.minor_per_major())
            .and_then(|m| m.checked_add(frac_minor))
            .map(|minor| Self::new(minor, currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Read a JSON number in major units, e.g. `499` or `12.5`.
    pub fn from_json_number(
        number: &serde_json::Number,
        currency: Currency,
    ) -> Result<Self, CommerceError> {
        let text = number.to_string();
        if let Ok(value) = Self::parse(&text, currency) {
            return Ok(value);
        }
        // Floats with binary noise ("12.300000000000001") round to the minor unit.
        match number.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 => {
                let minor = (f * currency.minor_per_major() as f64).round();
                if minor > i64::MAX as f64 {
                    Err(CommerceError::Overflow)
                } else {
                    Ok(Self::new(minor as i64, currency))
                }
            }
            _ => Err(CommerceError::invalid(format!(
                "price must be a non-negative number, got {text}"
            ))),
        }
    }

    /// The amount as a JSON number in major units.
    ///
    /// Whole amounts are written as integers.
    pub fn to_json_number(&self) -> serde_json::Number {
        let per = self.currency.minor_per_major();
        if self.amount_minor % per == 0 {
            serde_json::Number::from(self.amount_minor / per)
        } else {
            serde_json::Number::from_f64(self.amount_minor as f64 / per as f64)
                .unwrap_or_else(|| serde_json::Number::from(self.amount_minor / per))
        }
    }

    /// The amount as a form-field string in major units (`"499"`, `"12.50"`).
    pub fn to_field(&self) -> String {
        let per = self.currency.minor_per_major();
        if self.amount_minor % per == 0 {
            (self.amount_minor / per).to_string()
        } else {
            self.display_amount()
        }
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Format as a display string (e.g., "₹49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let per = self.currency.minor_per_major();
        let places = self.currency.decimal_places() as usize;
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        format!(
            "{sign}{}.{:0places$}",
            abs / per as u64,
            abs % per as u64
        )
    }

    /// Add another Money value, returning None on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by a quantity, returning None on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum Money values, returning None on currency mismatch or overflow.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// The price after taking `percent` off, rounded half-up to the minor unit.
    ///
    /// Percentages above 100 are treated as 100. For non-negative amounts
    /// the result never exceeds `self`.
    ///
    /// ```
    /// use gm_commerce::money::{Currency, Money};
    /// let price = Money::from_major(500, Currency::INR).unwrap();
    /// assert_eq!(price.discounted(10).display_amount(), "450.00");
    /// ```
    pub fn discounted(&self, percent: u8) -> Money {
        let keep = i128::from(100 - percent.min(100));
        let scaled = i128::from(self.amount_minor) * keep;
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        // |rounded| <= |amount_minor|, so this always fits.
        Money::new(rounded as i64, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(s: &str) -> Money {
        Money::parse(s, Currency::INR).unwrap()
    }

    #[test]
    fn test_parse_accepts_decimal_prices() {
        assert_eq!(inr("499").amount_minor, 49900);
        assert_eq!(inr(" 12.5 ").amount_minor, 1250);
        assert_eq!(inr("0.05").amount_minor, 5);
        assert_eq!(inr("0").amount_minor, 0);
    }

    #[test]
    fn test_parse_rejects_bad_prices() {
        for bad in ["", "  ", "-1", "abc", "1.234", "1.", ".5", "1e3", "4 99", "+3"] {
            let err = Money::parse(bad, Currency::INR).unwrap_err();
            assert!(
                matches!(err, CommerceError::InvalidArgument(_)),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_parse_overflow() {
        let huge = "99999999999999999999";
        assert_eq!(Money::parse(huge, Currency::INR), Err(CommerceError::Overflow));
    }

    #[test]
    fn test_discounted_examples() {
        let price = Money::from_major(500, Currency::INR).unwrap();
        assert_eq!(price.discounted(10), inr("450"));
        assert_eq!(price.discounted(0), price);
        assert_eq!(price.discounted(100), Money::zero(Currency::INR));
        assert_eq!(price.discounted(250), Money::zero(Currency::INR));
    }

    #[test]
    fn test_discounted_rounds_half_up() {
        // 0.05 * 0.9 = 0.045 -> 0.05
        assert_eq!(inr("0.05").discounted(10).amount_minor, 5);
        // 9.99 * 0.67 = 6.6933 -> 6.69
        assert_eq!(inr("9.99").discounted(33).amount_minor, 669);
    }

    #[test]
    fn test_discounted_never_exceeds_price() {
        for minor in [0_i64, 1, 3, 49, 99, 101, 4999, 123_457] {
            let price = Money::new(minor, Currency::INR);
            for pct in 0..=100u8 {
                assert!(price.discounted(pct) <= price, "{minor} at {pct}%");
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(inr("49.9").display(), "\u{20b9}49.90");
        assert_eq!(Money::new(-5, Currency::USD).display(), "$-0.05");
        assert_eq!(inr("450").to_string(), "\u{20b9}450.00");
    }

    #[test]
    fn test_json_numbers() {
        let whole: serde_json::Number = serde_json::from_str("499").unwrap();
        let frac: serde_json::Number = serde_json::from_str("12.3").unwrap();
        assert_eq!(Money::from_json_number(&whole, Currency::INR).unwrap(), inr("499"));
        assert_eq!(Money::from_json_number(&frac, Currency::INR).unwrap(), inr("12.30"));

        assert_eq!(inr("499").to_json_number().to_string(), "499");
        assert_eq!(inr("12.5").to_json_number().to_string(), "12.5");

        let negative: serde_json::Number = serde_json::from_str("-1").unwrap();
        assert!(Money::from_json_number(&negative, Currency::INR).is_err());
    }

    #[test]
    fn test_field_format() {
        assert_eq!(inr("499").to_field(), "499");
        assert_eq!(inr("12.5").to_field(), "12.50");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = inr("10");
        let b = inr("5");
        assert_eq!(a.try_add(&b), Some(inr("15")));
        assert_eq!(a.try_multiply(3), Some(inr("30")));
        assert_eq!(Money::new(i64::MAX, Currency::INR).try_multiply(2), None);
        assert_eq!(a.try_add(&Money::new(1, Currency::USD)), None);
        assert_eq!(
            Money::try_sum([a, b].iter(), Currency::INR),
            Some(inr("15"))
        );
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("inr"), Some(Currency::INR));
        assert_eq!(Currency::from_code("XYZ"), None);
        assert_eq!(Currency::default(), Currency::INR);
    }
}

//! Currency codes and price formatting using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The display symbol for this currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "\u{20ac}",
            Self::GBP => "\u{a3}",
        }
    }

    /// The ISO 4217 code for this currency.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Parse a currency from its ISO 4217 code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "CAD" => Some(Self::CAD),
            "AUD" => Some(Self::AUD),
            _ => None,
        }
    }
}

/// Format a decimal amount for display (e.g., "$19.99").
///
/// Pure function: the input amount is copied, never mutated. Amounts are
/// rendered with exactly two fraction digits.
#[must_use]
pub fn format_price(amount: Decimal, currency: CurrencyCode) -> String {
    format!("{}{:.2}", currency.symbol(), amount.round_dp(2))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_two_fraction_digits() {
        assert_eq!(
            format_price(Decimal::new(1999, 2), CurrencyCode::USD),
            "$19.99"
        );
        assert_eq!(format_price(Decimal::new(6, 0), CurrencyCode::USD), "$6.00");
        assert_eq!(format_price(Decimal::ZERO, CurrencyCode::USD), "$0.00");
    }

    #[test]
    fn test_format_symbols() {
        let amount = Decimal::new(150, 2);
        assert_eq!(format_price(amount, CurrencyCode::EUR), "\u{20ac}1.50");
        assert_eq!(format_price(amount, CurrencyCode::GBP), "\u{a3}1.50");
        assert_eq!(format_price(amount, CurrencyCode::CAD), "$1.50");
    }

    #[test]
    fn test_format_does_not_mutate_input() {
        let amount = Decimal::new(12345, 3);
        let _ = format_price(amount, CurrencyCode::USD);
        assert_eq!(amount, Decimal::new(12345, 3));
    }

    #[test]
    fn test_from_code_roundtrip() {
        for currency in [
            CurrencyCode::USD,
            CurrencyCode::EUR,
            CurrencyCode::GBP,
            CurrencyCode::CAD,
            CurrencyCode::AUD,
        ] {
            assert_eq!(CurrencyCode::from_code(currency.code()), Some(currency));
        }
        assert_eq!(CurrencyCode::from_code("JPY"), None);
    }
}

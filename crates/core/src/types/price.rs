//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Brazilian reais.
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }

    /// Format for display using the currency's locale conventions.
    ///
    /// BRL uses `.` for thousands and `,` for decimals: `R$ 1.234,50`.
    /// The other currencies use `,` for thousands and `.` for decimals.
    #[must_use]
    pub fn display(&self) -> String {
        let (thousands, decimal) = match self.currency_code {
            CurrencyCode::BRL | CurrencyCode::EUR => ('.', ','),
            CurrencyCode::USD => (',', '.'),
        };

        let rounded = format!("{:.2}", self.amount.abs().round_dp(2));
        let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, c) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(thousands);
            }
            grouped.push(c);
        }

        let sign = if self.amount.is_sign_negative() && !self.amount.is_zero() {
            "-"
        } else {
            ""
        };

        format!(
            "{sign}{} {grouped}{decimal}{cents}",
            self.currency_code.symbol()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol used when rendering prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_brl() {
        assert_eq!(Price::brl(Decimal::new(3990, 2)).display(), "R$ 39,90");
    }

    #[test]
    fn test_display_brl_thousands() {
        assert_eq!(
            Price::brl(Decimal::new(123_456_789, 2)).display(),
            "R$ 1.234.567,89"
        );
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::brl(Decimal::new(19_999, 3)).display(), "R$ 20,00");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(Price::brl(Decimal::ZERO).display(), "R$ 0,00");
    }

    #[test]
    fn test_display_usd() {
        let price = Price::new(Decimal::new(150_050, 2), CurrencyCode::USD);
        assert_eq!(price.display(), "$ 1,500.50");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Price::brl(Decimal::new(-500, 2)).display(), "-R$ 5,00");
    }
}

//! Currency definitions and conversions between human and base-unit amounts

use crate::error::{Result, RouterError};

/// Represents a token with its display metadata and decimal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// Symbol/ticker (e.g., "USDC")
    pub symbol: &'static str,
    /// Full name (e.g., "USD Coin")
    pub name: &'static str,
    /// Number of decimal places
    pub decimals: u8,
    /// Divisor for converting atomic units to human-readable (10^decimals)
    pub divisor: u64,
}

impl Currency {
    /// Create a new currency with calculated divisor
    pub const fn new(symbol: &'static str, name: &'static str, decimals: u8) -> Self {
        let divisor = 10u64.pow(decimals as u32);
        Self {
            symbol,
            name,
            decimals,
            divisor,
        }
    }

    /// Convert a human-readable amount to atomic units.
    ///
    /// Any remainder below one atomic unit is truncated. The conversion goes
    /// through the shortest decimal representation of the float so values like
    /// `0.57` map to `570000` rather than `569999`.
    pub fn to_atomic(&self, amount: f64) -> Result<u64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(RouterError::InvalidAmount(amount.to_string()));
        }

        let repr = amount.to_string();
        let (whole, frac) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

        let whole: u64 = whole
            .parse()
            .map_err(|_| RouterError::InvalidAmount(repr.clone()))?;

        let decimals = self.decimals as usize;
        let mut frac_digits: String = frac.chars().take(decimals).collect();
        while frac_digits.len() < decimals {
            frac_digits.push('0');
        }
        let frac: u64 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits
                .parse()
                .map_err(|_| RouterError::InvalidAmount(repr.clone()))?
        };

        whole
            .checked_mul(self.divisor)
            .and_then(|w| w.checked_add(frac))
            .ok_or(RouterError::InvalidAmount(repr))
    }

    /// Convert atomic units to a human-readable amount
    pub fn from_atomic(&self, atomic: u64) -> f64 {
        atomic as f64 / self.divisor as f64
    }
}

/// Predefined currencies
pub mod currencies {
    use super::Currency;

    /// USD Coin (6 decimals)
    pub const USDC: Currency = Currency::new("USDC", "USD Coin", 6);
}

/// Format a USDC amount for display (`$0.5000`)
pub fn format_usdc(amount: f64) -> String {
    format!("${amount:.4}")
}

use serde::{Deserialize, Serialize};

/// Absolute and annualized return for one holding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitResult {
    /// Market value minus purchase amount
    pub absolute: f64,
    /// Annualized return as a percentage (already multiplied by 100)
    pub annualized: f64,
}

impl ProfitResult {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Both figures rounded to 2 decimal places, for currency-style display.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            absolute: round2(self.absolute),
            annualized: round2(self.annualized),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate figures across every holding in a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub holdings: usize,
    pub valid_holdings: usize,
    pub total_purchase_amount: f64,
    pub total_market_value: f64,
    pub total_profit: f64,
}

use chrono::NaiveDate;

use crate::models::holding::Holding;
use crate::models::profit::{PortfolioTotals, ProfitResult};

/// Computes absolute and annualized returns for holdings.
///
/// Pure arithmetic over holding fields, no I/O.
pub struct ProfitCalculator;

impl ProfitCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Profit of a single holding at its current NAV.
    pub fn calculate(&self, holding: &Holding) -> ProfitResult {
        Self::compute(
            holding.current_nav,
            holding.purchase_shares,
            holding.purchase_amount,
            holding.purchase_date,
            holding.nav_date,
        )
    }

    /// Absolute profit and annualized return (%).
    ///
    /// Returns `{0, 0}` unless `purchase_shares > 0`, `current_nav >= 0` and
    /// `purchase_amount > 0`. Holding days are counted on calendar dates,
    /// inclusive of both ends; with no positive holding period the annualized
    /// figure is 0 while the absolute profit is still reported.
    pub fn compute(
        current_nav: f64,
        purchase_shares: f64,
        purchase_amount: f64,
        purchase_date: NaiveDate,
        nav_date: NaiveDate,
    ) -> ProfitResult {
        if !(purchase_shares > 0.0 && current_nav >= 0.0 && purchase_amount > 0.0) {
            return ProfitResult::zero();
        }

        let absolute = current_nav * purchase_shares - purchase_amount;

        let holding_days = Self::holding_days(purchase_date, nav_date);
        let annualized = if holding_days > 0 {
            (absolute / purchase_amount) / holding_days as f64 * 365.0 * 100.0
        } else {
            0.0
        };

        ProfitResult {
            absolute,
            annualized,
        }
    }

    /// Inclusive calendar-day count between purchase and NAV date.
    pub fn holding_days(purchase_date: NaiveDate, nav_date: NaiveDate) -> i64 {
        (nav_date - purchase_date).num_days() + 1
    }

    /// Totals across a set of holdings.
    pub fn totals(&self, holdings: &[Holding]) -> PortfolioTotals {
        let mut totals = PortfolioTotals {
            holdings: holdings.len(),
            ..PortfolioTotals::default()
        };
        for holding in holdings {
            if holding.is_valid {
                totals.valid_holdings += 1;
            }
            totals.total_purchase_amount += holding.purchase_amount;
            totals.total_market_value += holding.total_value();
            totals.total_profit += self.calculate(holding).absolute;
        }
        totals
    }
}

impl Default for ProfitCalculator {
    fn default() -> Self {
        Self::new()
    }
}

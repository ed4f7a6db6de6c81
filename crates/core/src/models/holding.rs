use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// A client's position in one fund purchase lot.
///
/// Purchase fields belong to the client record and are never touched by a
/// refresh. Market fields (`fund_name`, `current_nav`, `nav_date`, `is_valid`
/// and the trailing returns) are only written by a successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique ID for this holding
    pub id: Uuid,

    /// Fund code used as the fetch key (e.g., "000001")
    pub fund_code: String,

    /// Fund display name as reported by the provider
    #[serde(default)]
    pub fund_name: String,

    pub client_name: String,

    /// Money paid for the lot, must be > 0
    pub purchase_amount: f64,

    /// Shares received for the lot, must be > 0
    pub purchase_shares: f64,

    pub purchase_date: NaiveDate,

    /// Latest net asset value per share
    #[serde(default)]
    pub current_nav: f64,

    /// Date the NAV was published
    pub nav_date: NaiveDate,

    /// Whether the last fetch for this holding succeeded
    #[serde(default)]
    pub is_valid: bool,

    #[serde(default)]
    pub return_1m: Option<f64>,
    #[serde(default)]
    pub return_3m: Option<f64>,
    #[serde(default)]
    pub return_6m: Option<f64>,
    #[serde(default)]
    pub return_1y: Option<f64>,
}

impl Holding {
    /// Create a holding that has never been refreshed.
    ///
    /// The NAV starts at 0 with `nav_date == purchase_date` and `is_valid == false`
    /// until the first successful refresh.
    pub fn new(
        fund_code: impl Into<String>,
        client_name: impl Into<String>,
        purchase_amount: f64,
        purchase_shares: f64,
        purchase_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            fund_code: fund_code.into().trim().to_string(),
            fund_name: String::new(),
            client_name: client_name.into(),
            purchase_amount,
            purchase_shares,
            purchase_date,
            current_nav: 0.0,
            nav_date: purchase_date,
            is_valid: false,
            return_1m: None,
            return_3m: None,
            return_6m: None,
            return_1y: None,
        }
    }

    /// Current market value: `current_nav * purchase_shares`, or 0 if either is negative.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        if self.current_nav < 0.0 || self.purchase_shares < 0.0 {
            return 0.0;
        }
        self.current_nav * self.purchase_shares
    }

    /// Check the purchase invariants (non-empty code, positive, finite amounts).
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fund_code.is_empty() {
            return Err(CoreError::ValidationError("Fund code must not be empty".into()));
        }
        if !self.purchase_amount.is_finite() || self.purchase_amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Purchase amount must be positive, got {}",
                self.purchase_amount
            )));
        }
        if !self.purchase_shares.is_finite() || self.purchase_shares <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Purchase shares must be positive, got {}",
                self.purchase_shares
            )));
        }
        if !self.current_nav.is_finite() || self.current_nav < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Current NAV must be non-negative, got {}",
                self.current_nav
            )));
        }
        Ok(())
    }

    /// Return a copy with freshly fetched market data applied and `is_valid` set.
    #[must_use]
    pub fn with_market_data(&self, current: &CurrentInfo, returns: &TrailingReturns) -> Self {
        let mut updated = self.clone();
        updated.fund_name = current.fund_name.clone();
        updated.current_nav = current.current_nav;
        updated.nav_date = current.nav_date;
        updated.is_valid = true;
        updated.return_1m = returns.return_1m;
        updated.return_3m = returns.return_3m;
        updated.return_6m = returns.return_6m;
        updated.return_1y = returns.return_1y;
        updated
    }

    /// Copy only the market fields from `source`, leaving client-owned fields alone.
    pub fn merge_market_data(&mut self, source: &Holding) {
        self.fund_name = source.fund_name.clone();
        self.current_nav = source.current_nav;
        self.nav_date = source.nav_date;
        self.is_valid = source.is_valid;
        self.return_1m = source.return_1m;
        self.return_3m = source.return_3m;
        self.return_6m = source.return_6m;
        self.return_1y = source.return_1y;
    }
}

/// Current valuation data returned by a fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentInfo {
    pub fund_name: String,
    pub current_nav: f64,
    pub nav_date: NaiveDate,
    /// `false` when the provider did not find the fund or returned unusable data
    pub is_valid: bool,
}

impl CurrentInfo {
    pub fn new(fund_name: impl Into<String>, current_nav: f64, nav_date: NaiveDate) -> Self {
        Self {
            fund_name: fund_name.into(),
            current_nav,
            nav_date,
            is_valid: true,
        }
    }

    /// A "not found" answer: the call completed but carries no usable data.
    pub fn not_found(nav_date: NaiveDate) -> Self {
        Self {
            fund_name: String::new(),
            current_nav: 0.0,
            nav_date,
            is_valid: false,
        }
    }
}

/// Trailing-return percentages. Providers may not publish every horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrailingReturns {
    #[serde(default)]
    pub return_1m: Option<f64>,
    #[serde(default)]
    pub return_3m: Option<f64>,
    #[serde(default)]
    pub return_6m: Option<f64>,
    #[serde(default)]
    pub return_1y: Option<f64>,
}

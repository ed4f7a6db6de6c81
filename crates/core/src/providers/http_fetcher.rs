use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::traits::FundDataFetcher;
use crate::errors::CoreError;
use crate::models::holding::{CurrentInfo, TrailingReturns};
use crate::models::settings::ProviderSettings;

const PROVIDER_NAME: &str = "HttpFundData";

/// Fund data fetcher backed by a JSON HTTP service.
///
/// - `GET {base_url}/funds/{code}` returns `{found, fund_name, nav, nav_date}`.
///   A 404 or `found: false` is a "not found" answer, not an error.
/// - `GET {base_url}/funds/{code}/returns` returns the optional
///   `return_1m`, `return_3m`, `return_6m`, `return_1y` percentages.
///
/// Every request carries the configured timeout; the coordinator adds none.
pub struct HttpFundDataFetcher {
    client: Client,
    base_url: String,
}

impl HttpFundDataFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(&settings.base_url, Duration::from_secs(settings.timeout_secs))
    }

    fn api_error(message: String) -> CoreError {
        CoreError::Api {
            provider: PROVIDER_NAME.into(),
            message,
        }
    }
}

// ── Response types ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct CurrentResponse {
    #[serde(default = "default_found")]
    found: bool,
    #[serde(default)]
    fund_name: String,
    #[serde(default)]
    nav: Option<f64>,
    #[serde(default)]
    nav_date: Option<String>,
}

fn default_found() -> bool {
    true
}

#[derive(Deserialize)]
struct ReturnsResponse {
    return_1m: Option<f64>,
    return_3m: Option<f64>,
    return_6m: Option<f64>,
    return_1y: Option<f64>,
}

#[async_trait]
impl FundDataFetcher for HttpFundDataFetcher {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_current(&self, fund_code: &str) -> Result<CurrentInfo, CoreError> {
        let url = format!("{}/funds/{fund_code}", self.base_url);
        let today = chrono::Utc::now().date_naive();

        let resp = self.client.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(fund_code, "provider reports fund not found");
            return Ok(CurrentInfo::not_found(today));
        }
        if !resp.status().is_success() {
            return Err(Self::api_error(format!(
                "Current data request for {fund_code} failed: {}",
                resp.status()
            )));
        }

        let body: CurrentResponse = resp.json().await.map_err(|e| {
            Self::api_error(format!("Failed to parse current data for {fund_code}: {e}"))
        })?;

        if !body.found {
            return Ok(CurrentInfo::not_found(today));
        }

        // A response without a usable NAV or date is reported as not found
        // so the coordinator retries it like any other invalid answer.
        let nav = match body.nav {
            Some(nav) if nav.is_finite() && nav >= 0.0 => nav,
            _ => return Ok(CurrentInfo::not_found(today)),
        };
        let nav_date = match body
            .nav_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        {
            Some(date) => date,
            None => return Ok(CurrentInfo::not_found(today)),
        };

        Ok(CurrentInfo::new(body.fund_name, nav, nav_date))
    }

    async fn fetch_trailing_returns(&self, fund_code: &str) -> Result<TrailingReturns, CoreError> {
        let url = format!("{}/funds/{fund_code}/returns", self.base_url);

        let resp = self.client.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::FundNotFound(fund_code.to_string()));
        }
        if !resp.status().is_success() {
            return Err(Self::api_error(format!(
                "Returns request for {fund_code} failed: {}",
                resp.status()
            )));
        }

        let body: ReturnsResponse = resp.json().await.map_err(|e| {
            Self::api_error(format!("Failed to parse returns for {fund_code}: {e}"))
        })?;

        Ok(TrailingReturns {
            return_1m: body.return_1m.filter(|v| v.is_finite()),
            return_3m: body.return_3m.filter(|v| v.is_finite()),
            return_6m: body.return_6m.filter(|v| v.is_finite()),
            return_1y: body.return_1y.filter(|v| v.is_finite()),
        })
    }
}

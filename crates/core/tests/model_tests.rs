// ═══════════════════════════════════════════════════════════════════
// Model Tests — Holding, CurrentInfo, RefreshProgress, ProfitResult,
// Settings
// ═══════════════════════════════════════════════════════════════════

use chrono::NaiveDate;

use fund_refresh_core::errors::CoreError;
use fund_refresh_core::models::holding::{CurrentInfo, Holding, TrailingReturns};
use fund_refresh_core::models::profit::ProfitResult;
use fund_refresh_core::models::refresh::{
    CompletionKind, RefreshOutcome, RefreshProgress, RefreshReport,
};
use fund_refresh_core::models::settings::{
    ProviderSettings, RefreshSettings, Settings, ViewCacheSettings,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_holding() -> Holding {
    Holding::new(" 000001 ", "Alice", 10_000.0, 5_000.0, date(2024, 1, 1))
}

// ═══════════════════════════════════════════════════════════════════
//  Holding
// ═══════════════════════════════════════════════════════════════════

mod holding {
    use super::*;

    #[test]
    fn new_holding_starts_unrefreshed() {
        let h = sample_holding();
        assert_eq!(h.fund_code, "000001");
        assert_eq!(h.current_nav, 0.0);
        assert_eq!(h.nav_date, h.purchase_date);
        assert!(!h.is_valid);
        assert!(h.fund_name.is_empty());
        assert_eq!(h.return_1y, None);
    }

    #[test]
    fn new_holdings_get_distinct_ids() {
        assert_ne!(sample_holding().id, sample_holding().id);
    }

    #[test]
    fn total_value_is_nav_times_shares() {
        let mut h = sample_holding();
        h.current_nav = 2.5;
        assert_eq!(h.total_value(), 12_500.0);
    }

    #[test]
    fn total_value_is_zero_for_negative_inputs() {
        let mut h = sample_holding();
        h.current_nav = -1.0;
        assert_eq!(h.total_value(), 0.0);

        let mut h = sample_holding();
        h.current_nav = 2.0;
        h.purchase_shares = -10.0;
        assert_eq!(h.total_value(), 0.0);
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(sample_holding().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_purchase_fields() {
        let mut empty_code = sample_holding();
        empty_code.fund_code = String::new();

        let mut zero_amount = sample_holding();
        zero_amount.purchase_amount = 0.0;

        let mut nan_shares = sample_holding();
        nan_shares.purchase_shares = f64::NAN;

        let mut negative_nav = sample_holding();
        negative_nav.current_nav = -0.01;

        for h in [empty_code, zero_amount, nan_shares, negative_nav] {
            assert!(matches!(h.validate(), Err(CoreError::ValidationError(_))));
        }
    }

    #[test]
    fn with_market_data_leaves_purchase_fields_alone() {
        let h = sample_holding();
        let current = CurrentInfo::new("Growth Fund", 2.5, date(2024, 6, 30));
        let returns = TrailingReturns {
            return_1m: Some(1.0),
            return_3m: None,
            return_6m: Some(-2.0),
            return_1y: Some(8.5),
        };

        let updated = h.with_market_data(&current, &returns);

        assert_eq!(updated.id, h.id);
        assert_eq!(updated.client_name, "Alice");
        assert_eq!(updated.purchase_amount, 10_000.0);
        assert_eq!(updated.purchase_date, date(2024, 1, 1));
        assert_eq!(updated.fund_name, "Growth Fund");
        assert_eq!(updated.current_nav, 2.5);
        assert_eq!(updated.nav_date, date(2024, 6, 30));
        assert!(updated.is_valid);
        assert_eq!(updated.return_3m, None);
        assert_eq!(updated.return_6m, Some(-2.0));
    }

    #[test]
    fn merge_market_data_ignores_client_fields() {
        let mut stored = sample_holding();
        let mut incoming = stored.with_market_data(
            &CurrentInfo::new("Growth Fund", 3.0, date(2024, 7, 1)),
            &TrailingReturns::default(),
        );
        incoming.client_name = "Mallory".into();
        incoming.purchase_amount = 1.0;

        stored.merge_market_data(&incoming);

        assert_eq!(stored.client_name, "Alice");
        assert_eq!(stored.purchase_amount, 10_000.0);
        assert_eq!(stored.current_nav, 3.0);
        assert!(stored.is_valid);
    }

    #[test]
    fn deserializes_without_market_fields() {
        let json = r#"{
            "id": "5f1d7c2e-8a43-4b36-9c5e-0d6a2b1f3e47",
            "fund_code": "110011",
            "client_name": "Bob",
            "purchase_amount": 2000.0,
            "purchase_shares": 1500.0,
            "purchase_date": "2023-09-15",
            "nav_date": "2023-09-15"
        }"#;
        let h: Holding = serde_json::from_str(json).unwrap();
        assert_eq!(h.fund_code, "110011");
        assert_eq!(h.current_nav, 0.0);
        assert!(!h.is_valid);
        assert!(h.fund_name.is_empty());
        assert_eq!(h.return_1m, None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  CurrentInfo
// ═══════════════════════════════════════════════════════════════════

mod current_info {
    use super::*;

    #[test]
    fn new_is_valid() {
        let info = CurrentInfo::new("Fund", 1.23, date(2024, 6, 30));
        assert!(info.is_valid);
    }

    #[test]
    fn not_found_is_invalid_and_empty() {
        let info = CurrentInfo::not_found(date(2024, 6, 30));
        assert!(!info.is_valid);
        assert_eq!(info.current_nav, 0.0);
        assert!(info.fund_name.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Refresh models
// ═══════════════════════════════════════════════════════════════════

mod refresh {
    use super::*;

    #[test]
    fn progress_advances_and_clamps() {
        let mut p = RefreshProgress::start(2);
        assert_eq!(p, RefreshProgress { current: 0, total: 2 });
        assert!(!p.is_complete());
        p.advance();
        assert_eq!(p.fraction(), 0.5);
        p.advance();
        p.advance();
        assert_eq!(p.current, 2);
        assert!(p.is_complete());
    }

    #[test]
    fn empty_progress_is_complete() {
        let p = RefreshProgress::start(0);
        assert!(p.is_complete());
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn outcome_reports_its_holding() {
        let h = sample_holding();
        let id = h.id;
        let outcomes = [
            RefreshOutcome::Updated(h),
            RefreshOutcome::Failed {
                holding_id: id,
                fund_code: "000001".into(),
                attempts: 3,
                reason: "Fund not found: 000001".into(),
            },
            RefreshOutcome::Cancelled { holding_id: id },
        ];
        assert!(outcomes.iter().all(|o| o.holding_id() == id));
    }

    #[test]
    fn empty_report() {
        let report = RefreshReport::empty();
        assert!(report.updated.is_empty());
        assert_eq!(report.summary.completion, CompletionKind::Empty);
        assert_eq!(report.progress, RefreshProgress::start(0));
    }

    #[test]
    fn completion_kind_display() {
        assert_eq!(CompletionKind::Finished.to_string(), "Finished");
        assert_eq!(CompletionKind::Empty.to_string(), "Empty");
        assert_eq!(CompletionKind::Cancelled.to_string(), "Cancelled");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  ProfitResult
// ═══════════════════════════════════════════════════════════════════

#[test]
fn profit_result_rounds_to_cents() {
    let r = ProfitResult {
        absolute: 2500.004,
        annualized: 50.13736,
    };
    assert_eq!(
        r.rounded(),
        ProfitResult {
            absolute: 2500.0,
            annualized: 50.14
        }
    );
    assert_eq!(ProfitResult::zero(), ProfitResult::default());
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.refresh.concurrency_limit, 3);
        assert_eq!(s.refresh.max_attempts, 3);
        assert_eq!(s.refresh.backoff_step(), Duration::from_millis(500));
        assert_eq!(s.view_cache.capacity, 20);
        assert_eq!(s.view_cache.evict_count, 10);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let s = Settings::from_json(r#"{ "refresh": { "concurrency_limit": 8 } }"#).unwrap();
        assert_eq!(s.refresh.concurrency_limit, 8);
        assert_eq!(s.refresh.max_attempts, 3);
        assert_eq!(s.provider, ProviderSettings::default());
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            Settings::from_json("{ refresh: "),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn zero_values_rejected() {
        let cases = [
            r#"{ "refresh": { "concurrency_limit": 0 } }"#,
            r#"{ "refresh": { "max_attempts": 0 } }"#,
            r#"{ "provider": { "base_url": "  " } }"#,
            r#"{ "provider": { "timeout_secs": 0 } }"#,
            r#"{ "view_cache": { "capacity": 0 } }"#,
        ];
        for json in cases {
            assert!(
                matches!(Settings::from_json(json), Err(CoreError::InvalidConfig(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn evict_count_must_fit_capacity() {
        let too_many = ViewCacheSettings {
            capacity: 5,
            evict_count: 6,
        };
        let err = too_many.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: view_cache.evict_count must be between 1 and 5, got 6"
        );

        let whole = ViewCacheSettings {
            capacity: 5,
            evict_count: 5,
        };
        assert!(whole.validate().is_ok());
    }

    #[test]
    fn zero_backoff_is_allowed() {
        let s = RefreshSettings {
            backoff_step_ms: 0,
            ..RefreshSettings::default()
        };
        assert!(s.validate().is_ok());
        assert_eq!(s.backoff_step(), Duration::ZERO);
    }
}

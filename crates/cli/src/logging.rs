use tracing_subscriber::{
    fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = build_filter(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .with(filter)
        .init();
}

/// `RUST_LOG` directives as given, otherwise warn (debug with `verbose`) for
/// our own crates and nothing from dependencies.
fn build_filter(verbose: bool, rust_log: Option<String>) -> EnvFilter {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => {
            let level = if verbose { "debug" } else { "warn" };
            EnvFilter::new(format!("fund_refresh_core={level},fund_refresh={level}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_under(filter: EnvFilter) -> (bool, bool, bool) {
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            (
                tracing::enabled!(target: "fund_refresh_core", Level::DEBUG),
                tracing::enabled!(target: "fund_refresh_core", Level::WARN),
                tracing::enabled!(target: "reqwest", Level::DEBUG),
            )
        })
    }

    #[test]
    fn rust_log_enables_core_debug_without_verbose() {
        let filter = build_filter(false, Some("fund_refresh_core=debug,reqwest=debug".into()));
        assert_eq!(enabled_under(filter), (true, true, true));
    }

    #[test]
    fn defaults_to_warn_for_own_crates_only() {
        assert_eq!(enabled_under(build_filter(false, None)), (false, true, false));
    }

    #[test]
    fn verbose_enables_core_debug() {
        assert_eq!(enabled_under(build_filter(true, None)), (true, true, false));
    }

    #[test]
    fn blank_rust_log_falls_back_to_verbose_flag() {
        assert_eq!(
            enabled_under(build_filter(true, Some("  ".into()))),
            (true, true, false)
        );
    }
}

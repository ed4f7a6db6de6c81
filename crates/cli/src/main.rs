mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use fund_refresh_core::models::refresh::RefreshEvent;
use fund_refresh_core::models::settings::Settings;
use fund_refresh_core::services::view_service::SortKey;
use fund_refresh_core::storage::json_file::JsonFileHoldingsStore;
use fund_refresh_core::FundTracker;
use logging::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to an optional JSON settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch fresh market data for every holding in the file
    Refresh(RefreshArgs),
    /// Print absolute and annualized profit per holding
    Profit(ProfitArgs),
}

#[derive(Args)]
struct RefreshArgs {
    /// JSON file with the holdings to refresh
    #[arg(long)]
    holdings: PathBuf,

    /// Override the provider base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override how many holdings are fetched at once
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Args)]
struct ProfitArgs {
    /// JSON file with the holdings
    #[arg(long)]
    holdings: PathBuf,

    /// Only show holdings of this client
    #[arg(long)]
    client: Option<String>,

    #[arg(long, value_enum, default_value_t = SortArg::Profit)]
    sort: SortArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Client,
    Code,
    Value,
    Profit,
    Annualized,
    NavDate,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> SortKey {
        match arg {
            SortArg::Client => SortKey::ClientName,
            SortArg::Code => SortKey::FundCode,
            SortArg::Value => SortKey::TotalValue,
            SortArg::Profit => SortKey::Profit,
            SortArg::Annualized => SortKey::AnnualizedReturn,
            SortArg::NavDate => SortKey::NavDate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let settings = load_settings(cli.config.as_deref())?;
    match cli.command {
        Commands::Refresh(args) => refresh(args, settings).await,
        Commands::Profit(args) => profit(args, settings),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    Settings::from_json(&json)
        .with_context(|| format!("Invalid settings in {}", path.display()))
}

async fn refresh(args: RefreshArgs, mut settings: Settings) -> Result<()> {
    if let Some(base_url) = args.base_url {
        settings.provider.base_url = base_url;
    }
    if let Some(limit) = args.concurrency {
        settings.refresh.concurrency_limit = limit;
    }

    let store = JsonFileHoldingsStore::open(&args.holdings)?;
    let mut tracker = FundTracker::with_http_fetcher(Box::new(store), settings)?;

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight fetches");
            ctrl_c_token.cancel();
        }
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let RefreshEvent::Progress(p) = event {
                eprint!("\rRefreshing {}/{}", p.current, p.total);
                let _ = std::io::stderr().flush();
            }
        }
        eprintln!();
    });

    let summary = tracker.refresh_all(&tx, &cancel).await;
    drop(tx);
    let _ = printer.await;
    let summary = summary?;

    println!(
        "{}: {} updated, {} failed (of {})",
        summary.completion, summary.success_count, summary.failure_count, summary.total
    );
    Ok(())
}

fn profit(args: ProfitArgs, settings: Settings) -> Result<()> {
    let store = JsonFileHoldingsStore::open(&args.holdings)?;
    let mut tracker = FundTracker::with_http_fetcher(Box::new(store), settings)?;

    let holdings = tracker.sorted_holdings(args.sort.into(), args.client.as_deref())?;
    if holdings.is_empty() {
        println!("No holdings found.");
        return Ok(());
    }

    println!(
        "{:<16} {:<10} {:>12} {:>12} {:>10}",
        "Client", "Fund", "Value", "Profit", "Annual %"
    );
    for holding in &holdings {
        let profit = tracker.profit_for(holding.id)?.rounded();
        let stale = if holding.is_valid { "" } else { " *" };
        println!(
            "{:<16} {:<10} {:>12.2} {:>12.2} {:>10.2}{stale}",
            holding.client_name,
            holding.fund_code,
            holding.total_value(),
            profit.absolute,
            profit.annualized
        );
    }

    let totals = tracker.portfolio_totals()?;
    println!(
        "\nTotal value {:.2}, total profit {:.2} ({} of {} holdings up to date)",
        totals.total_market_value, totals.total_profit, totals.valid_holdings, totals.holdings
    );
    Ok(())
}

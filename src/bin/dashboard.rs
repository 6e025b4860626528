//! FinSight Dashboard
//!
//! Polls the FinSight API and logs the gated signal feed, watchlist and market
//! snapshot. Commands are read from stdin:
//!
//! - `show [MARKET|SIGNAL]...` render the feed, optionally filtered
//! - `add TICKER [NAME]` / `remove TICKER` edit the watchlist
//! - `enroll PLAN NAME EMAIL` then `code 123456` activate a tier
//! - `reset` restart enrollment

use dotenvy::dotenv;
use finsight::config::{self, DashboardConfig};
use finsight::core::{tier_cell, Dashboard};
use finsight::enrollment::EnrollmentFlow;
use finsight::logging;
use finsight::metrics::Metrics;
use finsight::models::{Market, SignalKind, Tier};
use finsight::services::{DashboardApi, HttpDashboardApi};
use finsight::signals::{FeedFilter, GatedSignal};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

const SUMMARY_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = DashboardConfig::from_env();
    let env = config::get_environment();
    info!("Starting FinSight Dashboard");
    info!(environment = %env, api = %config.api_base_url, "Environment");

    let metrics = Arc::new(Metrics::new()?);
    let api: Arc<dyn DashboardApi> =
        Arc::new(HttpDashboardApi::new(&config.api_base_url, config.http_timeout)?);

    let (tier_writer, tier_reader) = tier_cell(config.initial_tier);
    let enrollment = EnrollmentFlow::new(api.clone(), tier_writer).with_metrics(metrics.clone());
    let dashboard = Dashboard::new(api, tier_reader, &config, Some(metrics.clone()));

    dashboard.start().await;

    let mut summary = interval(SUMMARY_INTERVAL);
    summary.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    info!("Dashboard started, waiting for commands or shutdown signal...");
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Shutting down dashboard...");
                break;
            }
            _ = summary.tick() => {
                log_summary(&dashboard, FeedFilter::all()).await;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => handle_command(line.trim(), &dashboard, &enrollment).await,
                // stdin closed; keep polling until Ctrl-C
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!(error = %e, "Failed to read command");
                    stdin_open = false;
                }
            },
        }
    }

    dashboard.stop().await;
    match metrics.export() {
        Ok(text) => info!(metrics = %text, "Final poll metrics"),
        Err(e) => error!(error = %e, "Failed to export metrics"),
    }
    info!("Dashboard stopped");
    Ok(())
}

async fn handle_command(line: &str, dashboard: &Dashboard, enrollment: &EnrollmentFlow) {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return;
    };
    let args: Vec<&str> = parts.collect();

    match command {
        "show" => log_summary(dashboard, parse_filter(&args)).await,
        "add" => match args.split_first() {
            Some((ticker, name)) => {
                if let Err(e) = dashboard.watchlist().add(ticker, &name.join(" ")).await {
                    warn!(error = %e, "Could not add {}", ticker);
                }
            }
            None => warn!("Usage: add TICKER [NAME]"),
        },
        "remove" => match args.first() {
            Some(ticker) => {
                if let Err(e) = dashboard.watchlist().remove(ticker).await {
                    warn!(error = %e, "Could not remove {}", ticker);
                }
            }
            None => warn!("Usage: remove TICKER"),
        },
        "enroll" => {
            if args.len() < 3 {
                warn!("Usage: enroll PLAN NAME EMAIL");
                return;
            }
            let plan: Tier = match args[0].parse() {
                Ok(plan) => plan,
                Err(e) => {
                    warn!(error = %e, "Unknown plan");
                    return;
                }
            };
            let email = args[args.len() - 1];
            let name = args[1..args.len() - 1].join(" ");

            enrollment.open();
            let outcome = match enrollment.choose_tier(plan) {
                Ok(()) => {
                    let _ = enrollment.set_name(&name);
                    let _ = enrollment.set_email(email);
                    enrollment.submit_details().await
                }
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => info!(email = %email, "Check your inbox, then enter: code 123456"),
                Err(e) => warn!(error = %e, "Enrollment: {}", enrollment.session().error.unwrap_or_default()),
            }
        }
        "code" => {
            let input = args.join("");
            if let Err(e) = enrollment.input_code(&input) {
                warn!(error = %e, "Start with: enroll PLAN NAME EMAIL");
                return;
            }
            match enrollment.submit_code().await {
                Ok(tier) => {
                    info!(tier = %tier, "Plan activated");
                    enrollment.dismiss();
                }
                Err(e) => warn!(error = %e, "Verification: {}", enrollment.session().error.unwrap_or_default()),
            }
        }
        "reset" => enrollment.reset(),
        other => warn!(command = %other, "Unknown command"),
    }
}

fn parse_filter(args: &[&str]) -> FeedFilter {
    let mut filter = FeedFilter::all();
    for arg in args {
        match arg.to_uppercase().as_str() {
            "ASX" => filter = filter.with_market(Market::Asx),
            "US" => filter = filter.with_market(Market::Us),
            "CRYPTO" => filter = filter.with_market(Market::Crypto),
            "COMMODITY" => filter = filter.with_market(Market::Commodity),
            "BUY" => filter = filter.with_signal(SignalKind::Buy),
            "SELL" => filter = filter.with_signal(SignalKind::Sell),
            "AVOID" => filter = filter.with_signal(SignalKind::Avoid),
            "WATCH" => filter = filter.with_signal(SignalKind::Watch),
            other => warn!(filter = %other, "Ignoring unknown filter"),
        }
    }
    filter
}

async fn log_summary(dashboard: &Dashboard, filter: FeedFilter) {
    let view = dashboard.feed_view(filter).await;
    info!(
        tier = %view.tier,
        loading = view.loading,
        total = view.stats.total,
        buy = view.stats.count(SignalKind::Buy),
        sell = view.stats.count(SignalKind::Sell),
        avoid = view.stats.count(SignalKind::Avoid),
        watch = view.stats.count(SignalKind::Watch),
        avg_confidence = view.stats.avg_confidence,
        "Signal feed"
    );

    for gated in view.gated() {
        match gated {
            GatedSignal::Visible(entry) => {
                let marker = if view.is_highlighted(entry.id) { "NEW " } else { "" };
                info!(
                    "  {}{} [{}] {} ({:.0}%)",
                    marker,
                    entry.signal,
                    entry.tickers.join(","),
                    entry.title,
                    entry.confidence * 100.0
                );
            }
            GatedSignal::Obscured(placeholder) => {
                info!("  {} ░░░ {} (upgrade to unlock)", placeholder.signal, placeholder.teaser);
            }
        }
    }

    for item in dashboard.watchlist().items() {
        match (item.price, item.change_pct) {
            (Some(price), change) => info!(
                "  {} {:.2} {} ({:+.2}%)",
                item.ticker,
                price,
                item.currency.as_deref().unwrap_or("USD"),
                change.unwrap_or(0.0)
            ),
            (None, _) => info!("  {} loading...", item.ticker),
        }
    }

    let markets = dashboard.market_overview();
    if let Some(overview) = markets.data {
        info!(instruments = overview.instrument_count(), "Market overview");
    }
    if let Some(points) = dashboard.chart_data().data {
        let latest = points.last().map(|p| p.total()).unwrap_or(0);
        info!(buckets = points.len(), latest = latest, "Signal activity");
    }
}

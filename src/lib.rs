pub mod cli;
pub mod core;
pub mod export;
pub mod providers;
pub mod store;

use crate::cli::ui;
use crate::core::config::AppConfig;
use crate::core::{DateRange, Dashboard, Lookback, QuoteSource, Universe};
use crate::export::chart::{BitmapChartRenderer, render_charts, select_charts};
use crate::export::{ExportFormat, Report};
use crate::providers::{CachingQuoteSource, YahooQuoteSource};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Top-level actions available to the binary
pub enum AppCommand {
    /// Render the dashboard in the terminal, optionally every `refresh` seconds
    Show { refresh: Option<u64> },
    /// Write report files
    Export {
        formats: Vec<ExportFormat>,
        output_dir: Option<PathBuf>,
    },
}

/// Fetches price history for the whole universe and computes every table.
pub async fn build_dashboard(
    source: &dyn QuoteSource,
    universe: &Universe,
    lookbacks: &[Lookback],
    history_days: i64,
    as_of: NaiveDate,
) -> Result<Dashboard> {
    let symbols = universe.all_tickers();
    let range = DateRange::trailing(as_of, history_days);

    let pb = ui::new_spinner(&format!("Fetching {} symbols...", symbols.len()));
    let prices = source.fetch_history(&symbols, range).await;
    pb.finish_and_clear();

    Ok(Dashboard::build(prices?, universe, lookbacks, as_of))
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    lookbacks: Option<Vec<Lookback>>,
) -> Result<()> {
    info!("Market Trends starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let lookbacks = lookbacks.unwrap_or_else(|| config.lookbacks.clone());
    let source = CachingQuoteSource::new(
        YahooQuoteSource::new(config.yahoo_base_url())?,
        config.cache_ttl(),
    );
    let universe = Universe::default();

    match command {
        AppCommand::Show { refresh } => {
            show(&source, &universe, &lookbacks, &config, refresh).await
        }
        AppCommand::Export {
            formats,
            output_dir,
        } => {
            let dashboard = build_dashboard(
                &source,
                &universe,
                &lookbacks,
                config.history_days,
                Local::now().date_naive(),
            )
            .await?;
            let dir = output_dir.unwrap_or_else(|| config.output_dir());
            export_reports(&dashboard, &formats, &dir, &config)
        }
    }
}

async fn show(
    source: &dyn QuoteSource,
    universe: &Universe,
    lookbacks: &[Lookback],
    config: &AppConfig,
    refresh: Option<u64>,
) -> Result<()> {
    loop {
        let now = Local::now();
        let dashboard = build_dashboard(
            source,
            universe,
            lookbacks,
            config.history_days,
            now.date_naive(),
        )
        .await?;
        cli::dashboard::display(&dashboard, &now.format("%Y-%m-%d %H:%M:%S").to_string());

        let Some(secs) = refresh else {
            return Ok(());
        };
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(secs.max(1))) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping refresh");
                return Ok(());
            }
        }
    }
}

/// Writes each requested format into `dir`. Fails if any format failed.
pub fn export_reports(
    dashboard: &Dashboard,
    formats: &[ExportFormat],
    dir: &std::path::Path,
    config: &AppConfig,
) -> Result<()> {
    let mut report = Report::from_dashboard(dashboard, Local::now().naive_local());
    if formats.contains(&ExportFormat::Pdf) {
        let requests = select_charts(dashboard, config.charts.per_group, config.charts.points);
        let renderer = BitmapChartRenderer::new(config.charts.width, config.charts.height);
        report = report.with_charts(render_charts(&renderer, &requests));
    }

    let mut failed = Vec::new();
    for (format, result) in export::write_reports(&report, formats, dir) {
        match result {
            Ok(path) => println!("{format} report saved: {}", path.display()),
            Err(e) => {
                eprintln!(
                    "{}",
                    ui::style_text(&format!("{format} export failed: {e:#}"), ui::StyleType::Error)
                );
                failed.push(format.to_string());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Export failed for: {}", failed.join(", "));
    }
    Ok(())
}

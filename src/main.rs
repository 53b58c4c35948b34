use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use serde::Serialize;

use rusty_listings::app::RustyListingsApp;
use rusty_listings::config::Config;
use rusty_listings::data::aggregate::Aggregates;
use rusty_listings::data::filter::{FilterCriteria, PriceRange, filter};
use rusty_listings::data::{DatasetSource, GroupedSummary, Listing, PriceHistogram, SummaryMetrics};
use rusty_listings::state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    if config.summary {
        return print_summary(&config);
    }

    let mut state = AppState::new(config.presentation());
    state.open(&config.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Listings – Rental Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyListingsApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[derive(Serialize)]
struct Report<'a> {
    listings_loaded: usize,
    price_range: [f64; 2],
    metrics: SummaryMetrics,
    mean_price_by_room_type: &'a GroupedSummary,
    histogram: &'a PriceHistogram,
    preview: Vec<&'a Listing>,
}

/// Headless mode: the dashboard's default selection, as JSON on stdout.
fn print_summary(config: &Config) -> Result<()> {
    let source = DatasetSource::new(&config.data);
    let dataset = source.load()?;
    let options = config.presentation();

    let criteria = FilterCriteria::defaults_for(&dataset);
    let view = filter(&dataset, &criteria);
    let aggregates = Aggregates::compute(&view, options.histogram_bins);
    let PriceRange { min, max } = criteria.price_range;

    let report = Report {
        listings_loaded: dataset.len(),
        price_range: [min, max],
        metrics: aggregates.summary,
        mean_price_by_room_type: &aggregates.by_room_type,
        histogram: &aggregates.histogram,
        preview: view.iter().take(options.preview_rows).collect(),
    };
    let json = serde_json::to_string_pretty(&report).context("serialising summary")?;
    println!("{json}");
    Ok(())
}

use std::path::PathBuf;

use clap::Parser;

use crate::data::aggregate::DEFAULT_HISTOGRAM_BINS;
use crate::view::{MAX_PREVIEW_ROWS, PresentationOptions};

/// Command-line configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "rusty-listings", version, about = "Explore short-term rental listings")]
pub struct Config {
    /// Listings file to open at startup (.csv, .json or .parquet).
    #[arg(long, env = "RUSTY_LISTINGS_DATA", default_value = "AB_NYC_2019.csv")]
    pub data: PathBuf,

    /// Rows shown in the raw data preview (at most 100).
    #[arg(long, default_value_t = MAX_PREVIEW_ROWS)]
    pub preview_rows: usize,

    /// Bins in the price histogram.
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    pub histogram_bins: usize,

    /// Print the default selection's metrics as JSON and exit instead of
    /// opening a window.
    #[arg(long)]
    pub summary: bool,
}

impl Config {
    pub fn presentation(&self) -> PresentationOptions {
        if self.preview_rows > MAX_PREVIEW_ROWS {
            log::warn!(
                "--preview-rows {} exceeds the limit, showing {MAX_PREVIEW_ROWS}",
                self.preview_rows
            );
        }
        if self.histogram_bins == 0 {
            log::warn!("--histogram-bins 0 is not usable, using 1");
        }
        PresentationOptions {
            preview_rows: self.preview_rows.min(MAX_PREVIEW_ROWS),
            histogram_bins: self.histogram_bins.max(1),
        }
    }
}

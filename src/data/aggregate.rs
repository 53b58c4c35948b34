use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredView;

/// Number of bins in the price histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Scalar summary
// ---------------------------------------------------------------------------

/// Headline numbers for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub count: usize,
    /// `None` when the selection is empty.
    pub mean_price: Option<f64>,
    pub total_reviews: u64,
}

pub fn summarize(view: &FilteredView<'_>) -> SummaryMetrics {
    let (sum, total_reviews) = view
        .iter()
        .fold((0.0_f64, 0_u64), |(sum, reviews), l| {
            (sum + l.price, reviews.saturating_add(l.number_of_reviews))
        });
    let count = view.len();
    SummaryMetrics {
        count,
        mean_price: (count > 0).then(|| sum / count as f64),
        total_reviews,
    }
}

// ---------------------------------------------------------------------------
// Grouped summary
// ---------------------------------------------------------------------------

/// room_type → mean price, only for room types present in the view.
pub type GroupedSummary = BTreeMap<String, f64>;

pub fn group_by_room_type(view: &FilteredView<'_>) -> GroupedSummary {
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for l in view.iter() {
        let entry = acc.entry(l.room_type.as_str()).or_insert((0.0, 0));
        entry.0 += l.price;
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(room_type, (sum, n))| (room_type.to_string(), sum / n as f64))
        .collect()
}

// ---------------------------------------------------------------------------
// Price histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub left: f64,
    pub right: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Equal-width bins spanning the selection's min..=max price.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceHistogram {
    pub bins: Vec<HistogramBin>,
}

impl PriceHistogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Bin the view's prices into `bins` equal-width bins.  Every bin is
/// half-open except the last, which also holds the maximum.
pub fn price_histogram(view: &FilteredView<'_>, bins: usize) -> PriceHistogram {
    let bins = bins.max(1);
    let mut prices = view.iter().map(|l| l.price);
    let Some(first) = prices.next() else {
        return PriceHistogram::default();
    };
    let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));

    if max - min < 1e-10 {
        // All prices equal.
        return PriceHistogram {
            bins: vec![HistogramBin {
                left: min,
                right: max,
                count: view.len(),
            }],
        };
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            left: min + i as f64 * width,
            right: if i == bins - 1 {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for l in view.iter() {
        let slot = (((l.price - min) / width) as usize).min(bins - 1);
        out[slot].count += 1;
    }

    PriceHistogram { bins: out }
}

// ---------------------------------------------------------------------------
// Everything the dashboard shows, computed once per interaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub summary: SummaryMetrics,
    pub by_room_type: GroupedSummary,
    pub histogram: PriceHistogram,
}

impl Aggregates {
    pub fn compute(view: &FilteredView<'_>, histogram_bins: usize) -> Self {
        Aggregates {
            summary: summarize(view),
            by_room_type: group_by_room_type(view),
            histogram: price_histogram(view, histogram_bins),
        }
    }
}

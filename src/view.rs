//! Presentation adapter: turns a [`FilteredView`] and its [`Aggregates`]
//! into chart- and table-ready structures.
//!
//! Nothing here filters or aggregates again; every number shown comes from
//! `data::filter` and `data::aggregate`.  The structures are toolkit-free so
//! the egui layer in `ui` only has to draw them.

use std::collections::BTreeMap;

use crate::data::aggregate::{Aggregates, DEFAULT_HISTOGRAM_BINS, PriceHistogram};
use crate::data::filter::FilteredView;
use crate::data::model::Listing;

/// Hard cap on raw rows shown in the preview table.
pub const MAX_PREVIEW_ROWS: usize = 100;

/// Number of colour buckets used for the price colour scale on the map.
pub const COLOR_LEVELS: usize = 12;

/// Number of marker sizes used for review counts on the map.
pub const SIZE_LEVELS: usize = 6;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationOptions {
    /// Preview length; anything above [`MAX_PREVIEW_ROWS`] is capped.
    pub preview_rows: usize,
    pub histogram_bins: usize,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            preview_rows: MAX_PREVIEW_ROWS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
}

/// Everything one render pass needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub metrics: [MetricCard; 3],
    pub map: MapView,
    pub histogram: PriceHistogram,
    pub room_type_bars: Vec<RoomTypeBar>,
    pub preview: PreviewTable,
}

impl Dashboard {
    pub fn build(
        view: &FilteredView<'_>,
        aggregates: &Aggregates,
        options: &PresentationOptions,
    ) -> Self {
        let summary = &aggregates.summary;
        let metrics = [
            MetricCard {
                label: "Total Listings",
                value: thousands(summary.count as u64),
            },
            MetricCard {
                label: "Average Price",
                value: currency(summary.mean_price),
            },
            MetricCard {
                label: "Total Reviews",
                value: thousands(summary.total_reviews),
            },
        ];

        let room_type_bars = aggregates
            .by_room_type
            .iter()
            .map(|(room_type, &mean_price)| RoomTypeBar {
                room_type: room_type.clone(),
                mean_price,
                label: si_label(mean_price),
            })
            .collect();

        Dashboard {
            metrics,
            map: MapView::build(view, &aggregates.histogram),
            histogram: aggregates.histogram.clone(),
            room_type_bars,
            preview: PreviewTable::build(view, options.preview_rows),
        }
    }

    /// True when the selection matched nothing.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint {
    /// Position of the listing in the dataset, for hover lookups.
    pub row: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    pub reviews: u64,
}

/// Points sharing one colour and one marker size, drawable as one series.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    /// Position on the price colour scale, 0 (cheapest) to 1 (dearest).
    pub color_level: f64,
    /// 0 for the fewest reviews, `SIZE_LEVELS - 1` for the most.
    pub size_level: usize,
    pub points: Vec<MapPoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapView {
    pub layers: Vec<MapLayer>,
    /// (min, max) price behind the colour scale.
    pub price_scale: Option<(f64, f64)>,
    /// Mean latitude / longitude of the selection, `[lon, lat]`.
    pub center: Option<[f64; 2]>,
}

impl MapView {
    /// Colour = price, size = review count.  The price scale is the span of
    /// the histogram so both charts agree.
    fn build(view: &FilteredView<'_>, histogram: &PriceHistogram) -> Self {
        let price_scale = match (histogram.bins.first(), histogram.bins.last()) {
            (Some(first), Some(last)) => Some((first.left, last.right)),
            _ => None,
        };
        let Some((lo, hi)) = price_scale else {
            return MapView::default();
        };
        let max_reviews = view.iter().map(|l| l.number_of_reviews).max().unwrap_or(0);

        let mut buckets: BTreeMap<(usize, usize), Vec<MapPoint>> = BTreeMap::new();
        let (mut lat_sum, mut lon_sum) = (0.0, 0.0);
        for (&row, l) in view.indices().iter().zip(view.iter()) {
            let color = level(l.price - lo, hi - lo, COLOR_LEVELS);
            let size = level(l.number_of_reviews as f64, max_reviews as f64, SIZE_LEVELS);
            buckets.entry((size, color)).or_default().push(MapPoint {
                row,
                latitude: l.latitude,
                longitude: l.longitude,
                price: l.price,
                reviews: l.number_of_reviews,
            });
            lat_sum += l.latitude;
            lon_sum += l.longitude;
        }

        let n = view.len() as f64;
        MapView {
            // Small markers first so the big ones stay on top.
            layers: buckets
                .into_iter()
                .map(|((size_level, color), points)| MapLayer {
                    color_level: color as f64 / (COLOR_LEVELS - 1) as f64,
                    size_level,
                    points,
                })
                .collect(),
            price_scale,
            center: Some([lon_sum / n, lat_sum / n]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.layers.iter().map(|l| l.points.len()).sum()
    }
}

/// Bucket `value / span` into `levels` steps; a zero span maps to 0.
fn level(value: f64, span: f64, levels: usize) -> usize {
    if span <= 0.0 {
        return 0;
    }
    let t = (value / span).clamp(0.0, 1.0);
    ((t * (levels - 1) as f64).round() as usize).min(levels - 1)
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RoomTypeBar {
    pub room_type: String,
    pub mean_price: f64,
    /// Two significant digits with an SI suffix, e.g. `150`, `1.2k`.
    pub label: String,
}

// ---------------------------------------------------------------------------
// Preview table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows in the selection, of which `rows` is the head.
    pub total_rows: usize,
}

impl PreviewTable {
    fn build(view: &FilteredView<'_>, limit: usize) -> Self {
        let limit = limit.min(MAX_PREVIEW_ROWS);
        let extra = &view.dataset().extra_columns;
        let mut columns: Vec<String> = [
            "name",
            "neighbourhood_group",
            "neighbourhood",
            "latitude",
            "longitude",
            "room_type",
            "price",
            "number_of_reviews",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        columns.extend(extra.iter().cloned());

        let rows = view
            .iter()
            .take(limit)
            .map(|l| preview_row(l, extra))
            .collect();

        PreviewTable {
            columns,
            rows,
            total_rows: view.len(),
        }
    }
}

fn preview_row(l: &Listing, extra: &[String]) -> Vec<String> {
    let mut row = vec![
        l.name.clone(),
        l.neighbourhood_group.clone(),
        l.neighbourhood.clone(),
        format!("{:.5}", l.latitude),
        format!("{:.5}", l.longitude),
        l.room_type.clone(),
        format!("{}", l.price),
        l.number_of_reviews.to_string(),
    ];
    row.extend(
        extra
            .iter()
            .map(|c| l.extra.get(c).map(|v| v.to_string()).unwrap_or_default()),
    );
    row
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `48884` → `"48,884"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `Some(1234.5)` → `"$1234.50"` (no separator), `None` → `"n/a"`.
pub fn currency(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("${v:.2}"),
        None => "n/a".to_string(),
    }
}

/// Two significant digits with an SI prefix, like d3's `.2s`.
pub fn si_label(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let mut exp = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(exp - 1);
    let rounded = (value / scale).round() * scale;
    // 99.6 rounds up to 100
    if rounded.abs() >= 10f64.powi(exp + 1) {
        exp += 1;
    }
    let prefix_exp = (exp.div_euclid(3) * 3).clamp(-3, 9);
    let prefix = match prefix_exp {
        -3 => "m",
        3 => "k",
        6 => "M",
        9 => "G",
        _ => "",
    };
    let decimals = (1 - (exp - prefix_exp)).max(0) as usize;
    format!("{:.*}{prefix}", decimals, rounded / 10f64.powi(prefix_exp))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::{FilterCriteria, PriceRange, filter};
    use crate::data::model::tests::listing;
    use crate::data::model::{CellValue, Dataset};

    fn dataset(rows: usize) -> Dataset {
        let listings = (0..rows)
            .map(|i| {
                let mut l = listing(
                    if i % 2 == 0 { "Brooklyn" } else { "Queens" },
                    if i % 3 == 0 { "Private room" } else { "Entire home/apt" },
                    40.0 + i as f64,
                    i as u64,
                );
                l.extra.insert("minimum_nights".into(), CellValue::Integer(2));
                l
            })
            .collect();
        Dataset::from_listings(listings, vec!["minimum_nights".into()])
    }

    fn dashboard(ds: &Dataset, criteria: &FilterCriteria, options: &PresentationOptions) -> Dashboard {
        let view = filter(ds, criteria);
        let aggregates = Aggregates::compute(&view, options.histogram_bins);
        Dashboard::build(&view, &aggregates, options)
    }

    #[test]
    fn formats_numbers_like_the_metric_cards() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(48884), "48,884");
        assert_eq!(thousands(1_138_005), "1,138,005");
        assert_eq!(currency(Some(65.0)), "$65.00");
        assert_eq!(currency(Some(152.7206)), "$152.72");
        assert_eq!(currency(Some(1234.5)), "$1234.50");
        assert_eq!(currency(Some(1000.0)), "$1000.00");
        assert_eq!(currency(None), "n/a");
    }

    #[test]
    fn si_labels_keep_two_significant_digits() {
        assert_eq!(si_label(65.0), "65");
        assert_eq!(si_label(150.57), "150");
        assert_eq!(si_label(211.79), "210");
        assert_eq!(si_label(99.6), "100");
        assert_eq!(si_label(1234.0), "1.2k");
        assert_eq!(si_label(7.26), "7.3");
        assert_eq!(si_label(0.0), "0");
    }

    #[test]
    fn preview_is_capped_at_one_hundred_rows() {
        let ds = dataset(250);
        let options = PresentationOptions {
            preview_rows: 5000,
            ..Default::default()
        };
        let dash = dashboard(&ds, &FilterCriteria::everything(&ds), &options);

        assert_eq!(dash.preview.rows.len(), MAX_PREVIEW_ROWS);
        assert_eq!(dash.preview.total_rows, 250);
        assert_eq!(dash.preview.columns.last().map(String::as_str), Some("minimum_nights"));
        assert_eq!(dash.preview.rows[0].last().map(String::as_str), Some("2"));
        // Metrics still cover the whole selection.
        assert_eq!(dash.metrics[0].value, "250");
    }

    #[test]
    fn empty_selection_renders_empty_state() {
        let ds = dataset(10);
        let criteria = FilterCriteria {
            neighbourhood_groups: BTreeSet::new(),
            ..FilterCriteria::everything(&ds)
        };
        let dash = dashboard(&ds, &criteria, &PresentationOptions::default());

        assert!(dash.is_empty());
        assert_eq!(dash.metrics[0].value, "0");
        assert_eq!(dash.metrics[1].value, "n/a");
        assert_eq!(dash.metrics[2].value, "0");
        assert!(dash.histogram.is_empty());
        assert!(dash.room_type_bars.is_empty());
        assert!(dash.preview.rows.is_empty());
        assert_eq!(dash.map.center, None);
    }

    #[test]
    fn bars_follow_grouped_summary() {
        let ds = dataset(12);
        let criteria = FilterCriteria {
            room_types: BTreeSet::from(["Private room".to_string()]),
            ..FilterCriteria::everything(&ds)
        };
        let dash = dashboard(&ds, &criteria, &PresentationOptions::default());

        assert_eq!(dash.room_type_bars.len(), 1);
        assert_eq!(dash.room_type_bars[0].room_type, "Private room");
        // rows 0, 3, 6, 9 → prices 40, 43, 46, 49
        assert_eq!(dash.room_type_bars[0].mean_price, 44.5);
        assert_eq!(dash.room_type_bars[0].label, "45");
    }

    #[test]
    fn map_keeps_every_point_and_spans_the_colour_scale() {
        let ds = dataset(40);
        let criteria = FilterCriteria {
            price_range: PriceRange::new(0.0, 1000.0),
            ..FilterCriteria::defaults_for(&ds)
        };
        let dash = dashboard(&ds, &criteria, &PresentationOptions::default());

        assert_eq!(dash.map.point_count(), 40);
        assert_eq!(dash.map.price_scale, Some((40.0, 79.0)));
        let levels: Vec<f64> = dash.map.layers.iter().map(|l| l.color_level).collect();
        assert!(levels.contains(&0.0));
        assert!(levels.contains(&1.0));
        assert!(dash.map.layers.iter().all(|l| l.size_level < SIZE_LEVELS));

        let cheapest = dash
            .map
            .layers
            .iter()
            .flat_map(|l| &l.points)
            .find(|p| p.row == 0)
            .unwrap();
        assert_eq!(cheapest.price, 40.0);
        assert_eq!(cheapest.reviews, 0);
    }
}

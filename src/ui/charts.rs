use eframe::egui::{self, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::color::{HISTOGRAM_COLOR, price_color};
use crate::data::model::Dataset;
use crate::state::AppState;
use crate::view::{Dashboard, MapView};

const CHART_HEIGHT: f32 = 380.0;

/// Marker radius for the smallest and largest review-count bucket.
const MIN_RADIUS: f32 = 1.5;
const MAX_RADIUS: f32 = 7.5;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render metrics, charts and the raw data preview.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(dash)) = (&state.dataset, &state.dashboard) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to begin  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Key Metrics");
            metrics(ui, dash);
            if dash.is_empty() {
                ui.label(RichText::new("No listings match the current filters.").italics());
            }
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                let width = ui.available_width();
                ui.vertical(|ui: &mut Ui| {
                    ui.strong("Listing locations");
                    map(ui, &dash.map, dataset, width * 0.64);
                });
                ui.vertical(|ui: &mut Ui| {
                    ui.strong("Price distribution");
                    let width = ui.available_width();
                    histogram(ui, dash, width);
                });
            });

            ui.separator();
            ui.strong("Average price per room type");
            room_type_bars(ui, dash, state);

            ui.separator();
            egui::CollapsingHeader::new(format!(
                "Raw data (first {} of {})",
                dash.preview.rows.len(),
                dash.preview.total_rows
            ))
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                super::table::preview(ui, &dash.preview);
            });
        });
}

fn metrics(ui: &mut Ui, dash: &Dashboard) {
    ui.columns(dash.metrics.len(), |cols| {
        for (col, card) in cols.iter_mut().zip(&dash.metrics) {
            col.vertical(|ui: &mut Ui| {
                ui.label(card.label);
                ui.label(RichText::new(&card.value).size(28.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Map: longitude/latitude scatter, colour = price, size = reviews
// ---------------------------------------------------------------------------

fn map(ui: &mut Ui, map: &MapView, dataset: &Dataset, width: f32) {
    // Degrees of longitude shrink with latitude.
    let aspect = map
        .center
        .map(|[_, lat]| 1.0 / lat.to_radians().cos().max(0.1))
        .unwrap_or(1.0);

    let response = Plot::new("listing_map")
        .width(width)
        .height(CHART_HEIGHT)
        .data_aspect(aspect as f32)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for layer in &map.layers {
                let points: PlotPoints = layer
                    .points
                    .iter()
                    .map(|p| [p.longitude, p.latitude])
                    .collect();
                let step = (MAX_RADIUS - MIN_RADIUS)
                    / (crate::view::SIZE_LEVELS - 1) as f32;
                plot_ui.points(
                    Points::new(points)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(MIN_RADIUS + step * layer.size_level as f32)
                        .color(price_color(layer.color_level)),
                );
            }
            let tolerance = plot_ui.plot_bounds().width() * 0.005;
            plot_ui.pointer_coordinate().map(|p| (p, tolerance))
        });

    // Hover: nearest listing under the pointer.
    let Some((pointer, tolerance)) = response.inner else {
        return;
    };
    let nearest = map
        .layers
        .iter()
        .flat_map(|l| &l.points)
        .map(|p| {
            let d = (p.longitude - pointer.x).hypot(p.latitude - pointer.y);
            (d, p)
        })
        .filter(|(d, _)| *d <= tolerance)
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((_, point)) = nearest {
        if let Some(listing) = dataset.listings.get(point.row) {
            let _ = response.response.on_hover_text(format!(
                "{}\n{}\nprice: ${}\nreviews: {}",
                listing.name, listing.neighbourhood, listing.price, listing.number_of_reviews
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, dash: &Dashboard, width: f32) {
    let bars: Vec<Bar> = dash
        .histogram
        .bins
        .iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(b.width().max(f64::EPSILON))
                .fill(HISTOGRAM_COLOR)
        })
        .collect();

    Plot::new("price_histogram")
        .width(width)
        .height(CHART_HEIGHT)
        .x_axis_label("price")
        .y_axis_label("count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(HISTOGRAM_COLOR).name("price"));
        });
}

// ---------------------------------------------------------------------------
// Mean price per room type
// ---------------------------------------------------------------------------

fn room_type_bars(ui: &mut Ui, dash: &Dashboard, state: &AppState) {
    let names: Vec<String> = dash
        .room_type_bars
        .iter()
        .map(|b| b.room_type.clone())
        .collect();

    Plot::new("room_type_bars")
        .height(CHART_HEIGHT * 0.75)
        .legend(Legend::default())
        .y_axis_label("mean price (USD)")
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            names.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (i, bar) in dash.room_type_bars.iter().enumerate() {
                let color = state.room_type_colors.color_for(&bar.room_type);
                let chart = BarChart::new(vec![
                    Bar::new(i as f64, bar.mean_price)
                        .width(0.6)
                        .name(format!("{}: {}", bar.room_type, bar.label))
                        .fill(color),
                ])
                .color(color)
                .name(&bar.room_type);
                plot_ui.bar_chart(chart);
            }
        });
}

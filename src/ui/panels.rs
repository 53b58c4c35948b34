use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::state::{AppState, Category};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Data");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multi_select(ui, state, Category::NeighbourhoodGroup);
            multi_select(ui, state, Category::RoomType);
            ui.separator();
            price_range(ui, state);
            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

/// Checkbox list with All / None shortcuts.
fn multi_select(ui: &mut Ui, state: &mut AppState, category: Category) {
    let choices = state.choices(category);
    let selected = state.selected(category).clone();
    let header_text = format!(
        "{}  ({}/{})",
        category.label(),
        selected.len(),
        choices.len()
    );

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(category.label())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(category);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(category);
                }
            });

            for value in &choices {
                let mut text = RichText::new(value);
                if category == Category::RoomType {
                    text = text.color(state.room_type_colors.color_for(value));
                }
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_value(category, value);
                }
            }
        });
}

/// Two integer sliders behaving like one range control: the handles
/// push each other instead of crossing.
fn price_range(ui: &mut Ui, state: &mut AppState) {
    let Some(bounds) = state.price_bounds() else {
        return;
    };
    ui.strong("Price range (USD)");

    let mut lo = state.criteria.price_range.min;
    let mut hi = state.criteria.price_range.max;
    let lo_changed = ui
        .add(Slider::new(&mut lo, bounds.clone()).integer().text("from"))
        .changed();
    let hi_changed = ui
        .add(Slider::new(&mut hi, bounds).integer().text("to"))
        .changed();

    if lo_changed && lo > hi {
        hi = lo;
    }
    if hi_changed && hi < lo {
        lo = hi;
    }
    if lo_changed || hi_changed {
        state.set_price_range(lo, hi);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(dash)) = (&state.dataset, &state.dashboard) {
            ui.label(format!(
                "{} listings loaded, {} selected",
                ds.len(),
                dash.preview.total_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

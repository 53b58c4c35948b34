use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use crate::color::CategoryColors;
use crate::data::aggregate::Aggregates;
use crate::data::filter::{FilterCriteria, PriceRange, filter, price_slider_bounds};
use crate::data::loader::DatasetSource;
use crate::data::model::Dataset;
use crate::view::{Dashboard, PresentationOptions};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The two multi-select controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    NeighbourhoodGroup,
    RoomType,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::NeighbourhoodGroup => "Neighbourhood group",
            Category::RoomType => "Room type",
        }
    }
}

/// The full UI state, independent of rendering.
///
/// Every handler that changes the selection recomputes the dashboard
/// before returning, so the next frame always draws fresh numbers.
pub struct AppState {
    /// Where the current dataset came from, with its load-once cache.
    pub source: Option<DatasetSource>,

    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Arc<Dataset>>,

    /// Current control selection.
    pub criteria: FilterCriteria,

    pub options: PresentationOptions,

    /// Output of the last recomputation.
    pub dashboard: Option<Dashboard>,

    /// Stable colours for room types, across all selections.
    pub room_type_colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PresentationOptions::default())
    }
}

impl AppState {
    pub fn new(options: PresentationOptions) -> Self {
        Self {
            source: None,
            dataset: None,
            criteria: FilterCriteria {
                neighbourhood_groups: BTreeSet::new(),
                room_types: BTreeSet::new(),
                price_range: PriceRange::new(0.0, 0.0),
            },
            options,
            dashboard: None,
            room_type_colors: CategoryColors::default(),
            status_message: None,
        }
    }

    /// Load `path`, reusing the cached dataset when it is the current source.
    pub fn open(&mut self, path: &Path) {
        let reuse = self
            .source
            .as_ref()
            .is_some_and(|s| s.path() == path && s.is_loaded());
        if !reuse {
            self.source = Some(DatasetSource::new(path));
        }
        let Some(source) = &self.source else {
            return;
        };

        match source.load() {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the controls to defaults.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.criteria = FilterCriteria::defaults_for(&dataset);
        self.room_type_colors = CategoryColors::new(&dataset.room_types);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute view → aggregates → dashboard for the current criteria.
    pub fn refresh(&mut self) {
        let Some(ds) = &self.dataset else {
            self.dashboard = None;
            return;
        };
        let view = filter(ds, &self.criteria);
        let aggregates = Aggregates::compute(&view, self.options.histogram_bins);
        log::debug!(
            "Recomputed dashboard: {} listings, mean price {:?}",
            aggregates.summary.count,
            aggregates.summary.mean_price
        );
        self.dashboard = Some(Dashboard::build(&view, &aggregates, &self.options));
    }

    /// Every value the control for `category` offers.
    pub fn choices(&self, category: Category) -> BTreeSet<String> {
        match (&self.dataset, category) {
            (Some(ds), Category::NeighbourhoodGroup) => ds.neighbourhood_groups.clone(),
            (Some(ds), Category::RoomType) => ds.room_types.clone(),
            (None, _) => BTreeSet::new(),
        }
    }

    pub fn selected(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::NeighbourhoodGroup => &self.criteria.neighbourhood_groups,
            Category::RoomType => &self.criteria.room_types,
        }
    }

    fn selected_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::NeighbourhoodGroup => &mut self.criteria.neighbourhood_groups,
            Category::RoomType => &mut self.criteria.room_types,
        }
    }

    /// Toggle a single value in a multi-select.
    pub fn toggle_value(&mut self, category: Category, value: &str) {
        let selected = self.selected_mut(category);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refresh();
    }

    /// Select all values of a multi-select.
    pub fn select_all(&mut self, category: Category) {
        let all = self.choices(category);
        *self.selected_mut(category) = all;
        self.refresh();
    }

    /// Deselect all values of a multi-select.
    pub fn select_none(&mut self, category: Category) {
        self.selected_mut(category).clear();
        self.refresh();
    }

    /// Bounds of the price control, `None` before a dataset is loaded.
    pub fn price_bounds(&self) -> Option<RangeInclusive<f64>> {
        self.dataset.as_deref().map(price_slider_bounds)
    }

    /// Set the price selection, clamped to the control's bounds.
    pub fn set_price_range(&mut self, min: f64, max: f64) {
        let Some(bounds) = self.price_bounds() else {
            return;
        };
        let clamp = |v: f64| v.clamp(*bounds.start(), *bounds.end());
        self.criteria.price_range = PriceRange::new(clamp(min), clamp(max));
        self.refresh();
    }

    /// Restore every control to its default.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria = FilterCriteria::defaults_for(ds);
            self.refresh();
        }
    }
}

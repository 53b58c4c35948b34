use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::model::{Dataset, Listing};

// ---------------------------------------------------------------------------
// Price control limits
// ---------------------------------------------------------------------------

/// Upper end of the price control, whatever the real maximum price is.
/// Listings above it can never be selected through the control.
pub const PRICE_SLIDER_CEILING: f64 = 1000.0;

/// Upper end of the default price selection.
pub const DEFAULT_PRICE_CEILING: f64 = 500.0;

/// Range offered by the price control: `[floor(min price), 1000]`.
///
/// The ceiling is raised to the minimum when every listing costs more than
/// 1000, so the range never inverts.
pub fn price_slider_bounds(dataset: &Dataset) -> RangeInclusive<f64> {
    let lo = dataset.min_price().floor();
    lo..=PRICE_SLIDER_CEILING.max(lo)
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Closed price interval `[min, max]`.  `min > max` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, price: f64) -> bool {
        self.min <= price && price <= self.max
    }

    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }
}

/// The user's current selection.  Rebuilt on every interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub neighbourhood_groups: BTreeSet<String>,
    pub room_types: BTreeSet<String>,
    pub price_range: PriceRange,
}

impl FilterCriteria {
    /// Control defaults: every group, every room type, `[min price, 500]`.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        let bounds = price_slider_bounds(dataset);
        let lo = *bounds.start();
        FilterCriteria {
            neighbourhood_groups: dataset.neighbourhood_groups.clone(),
            room_types: dataset.room_types.clone(),
            price_range: PriceRange::new(lo, DEFAULT_PRICE_CEILING.max(lo)),
        }
    }

    /// Selects everything the dataset holds, including prices above the
    /// control ceiling.  Not reachable from the controls.
    pub fn everything(dataset: &Dataset) -> Self {
        FilterCriteria {
            neighbourhood_groups: dataset.neighbourhood_groups.clone(),
            room_types: dataset.room_types.clone(),
            price_range: PriceRange::new(dataset.min_price(), dataset.max_price()),
        }
    }

    /// All three conditions, ANDed.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.neighbourhood_groups.contains(&listing.neighbourhood_group)
            && self.room_types.contains(&listing.room_type)
            && self.price_range.contains(listing.price)
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// The rows of a [`Dataset`] that satisfy some [`FilterCriteria`], in
/// source order.  Holds indices only; never mutated after construction.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row of `dataset`.
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Positions of the selected rows within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Listing> + '_ {
        let listings = &self.dataset.listings;
        self.indices.iter().map(move |&i| &listings[i])
    }
}

/// Select the rows that pass all criteria.
///
/// * Empty group or room-type selection → empty view.
/// * Inverted price range → empty view.
pub fn filter<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let indices = if criteria.price_range.is_empty()
        || criteria.neighbourhood_groups.is_empty()
        || criteria.room_types.is_empty()
    {
        Vec::new()
    } else {
        dataset
            .listings
            .iter()
            .enumerate()
            .filter(|(_, l)| criteria.matches(l))
            .map(|(i, _)| i)
            .collect()
    };

    log::debug!("Filter kept {} of {} listings", indices.len(), dataset.len());
    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::data::model::tests::listing;

    fn three_rows() -> Dataset {
        Dataset::from_listings(
            vec![
                listing("Brooklyn", "Private room", 50.0, 10),
                listing("Brooklyn", "Entire home/apt", 200.0, 4),
                listing("Manhattan", "Private room", 80.0, 7),
            ],
            Vec::new(),
        )
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn private_rooms_under_100() {
        let ds = three_rows();
        let criteria = FilterCriteria {
            neighbourhood_groups: ds.neighbourhood_groups.clone(),
            room_types: set(&["Private room"]),
            price_range: PriceRange::new(0.0, 100.0),
        };
        let view = filter(&ds, &criteria);
        assert_eq!(view.indices(), &[0, 2]);
        let prices: Vec<f64> = view.iter().map(|l| l.price).collect();
        assert_eq!(prices, [50.0, 80.0]);
    }

    #[test]
    fn empty_group_selection_is_empty() {
        let ds = three_rows();
        let criteria = FilterCriteria {
            neighbourhood_groups: BTreeSet::new(),
            ..FilterCriteria::everything(&ds)
        };
        assert!(filter(&ds, &criteria).is_empty());
    }

    #[test]
    fn empty_room_type_selection_is_empty() {
        let ds = three_rows();
        let criteria = FilterCriteria {
            room_types: BTreeSet::new(),
            ..FilterCriteria::everything(&ds)
        };
        assert!(filter(&ds, &criteria).is_empty());
    }

    #[test]
    fn inverted_range_is_empty_not_a_panic() {
        let ds = three_rows();
        let criteria = FilterCriteria {
            price_range: PriceRange::new(300.0, 10.0),
            ..FilterCriteria::everything(&ds)
        };
        assert!(filter(&ds, &criteria).is_empty());
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let ds = three_rows();
        let criteria = FilterCriteria {
            price_range: PriceRange::new(50.0, 80.0),
            ..FilterCriteria::everything(&ds)
        };
        assert_eq!(filter(&ds, &criteria).indices(), &[0, 2]);
    }

    #[test]
    fn everything_returns_whole_dataset() {
        let ds = three_rows();
        let view = filter(&ds, &FilterCriteria::everything(&ds));
        assert_eq!(view.len(), ds.len());
        assert_eq!(view.indices(), FilteredView::all(&ds).indices());
    }

    #[test]
    fn slider_ceiling_hides_expensive_listings() {
        let ds = Dataset::from_listings(
            vec![
                listing("Manhattan", "Entire home/apt", 650.0, 1),
                listing("Manhattan", "Entire home/apt", 5000.0, 1),
            ],
            Vec::new(),
        );
        let criteria = FilterCriteria {
            price_range: PriceRange::new(600.0, *price_slider_bounds(&ds).end()),
            ..FilterCriteria::defaults_for(&ds)
        };
        assert_eq!(criteria.price_range.max, PRICE_SLIDER_CEILING);
        let view = filter(&ds, &criteria);
        assert_eq!(view.indices(), &[0]);
    }

    #[test]
    fn defaults_select_all_categories_and_min_to_500() {
        let ds = three_rows();
        let criteria = FilterCriteria::defaults_for(&ds);
        assert_eq!(criteria.neighbourhood_groups, ds.neighbourhood_groups);
        assert_eq!(criteria.room_types, ds.room_types);
        assert_eq!(criteria.price_range, PriceRange::new(50.0, 500.0));
    }

    #[test]
    fn slider_bounds_floor_the_minimum() {
        let ds = Dataset::from_listings(
            vec![listing("Queens", "Shared room", 10.5, 0)],
            Vec::new(),
        );
        assert_eq!(price_slider_bounds(&ds), 10.0..=1000.0);
    }

    #[test]
    fn slider_bounds_never_invert() {
        let ds = Dataset::from_listings(
            vec![listing("Manhattan", "Entire home/apt", 1500.0, 0)],
            Vec::new(),
        );
        assert_eq!(price_slider_bounds(&ds), 1500.0..=1500.0);
        let criteria = FilterCriteria::defaults_for(&ds);
        assert_eq!(criteria.price_range, PriceRange::new(1500.0, 1500.0));
        assert_eq!(filter(&ds, &criteria).len(), 1);
    }

    const GROUPS: [&str; 3] = ["Bronx", "Brooklyn", "Queens"];
    const ROOMS: [&str; 2] = ["Private room", "Shared room"];

    #[quickcheck]
    fn filtered_rows_satisfy_every_criterion(
        rows: Vec<(u8, u8, u16)>,
        group_mask: u8,
        room_mask: u8,
        lo: u16,
        hi: u16,
    ) -> bool {
        let ds = Dataset::from_listings(
            rows.iter()
                .map(|&(g, r, p)| {
                    listing(
                        GROUPS[g as usize % GROUPS.len()],
                        ROOMS[r as usize % ROOMS.len()],
                        p as f64 + 1.0,
                        0,
                    )
                })
                .collect(),
            Vec::new(),
        );
        let pick = |names: &[&str], mask: u8| -> BTreeSet<String> {
            names
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, n)| n.to_string())
                .collect()
        };
        let criteria = FilterCriteria {
            neighbourhood_groups: pick(&GROUPS, group_mask),
            room_types: pick(&ROOMS, room_mask),
            price_range: PriceRange::new(lo as f64, hi as f64),
        };
        let view = filter(&ds, &criteria);

        let strictly_increasing = view.indices().windows(2).all(|w| w[0] < w[1]);
        let all_match = view.iter().all(|l| {
            criteria.neighbourhood_groups.contains(&l.neighbourhood_group)
                && criteria.room_types.contains(&l.room_type)
                && lo as f64 <= l.price
                && l.price <= hi as f64
        });
        let complete = ds
            .listings
            .iter()
            .filter(|l| criteria.matches(l))
            .count()
            == view.len();
        strictly_increasing && all_match && complete
    }
}

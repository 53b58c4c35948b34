use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single passthrough cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell for the columns the dashboard does not interpret
/// (`host_id`, `minimum_nights`, `reviews_per_month`, ...).
/// Kept `Ord` so values can be collected into `BTreeSet`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    #[default]
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the cell as a number, accepting integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Best-effort typing of a raw text cell, as read from CSV.
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        // "NaN" / "inf" stay text: listing names can be anything.
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the dataset
// ---------------------------------------------------------------------------

/// A single rental listing after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub name: String,
    /// Borough / district, e.g. "Manhattan".
    pub neighbourhood_group: String,
    pub neighbourhood: String,
    pub latitude: f64,
    pub longitude: f64,
    /// "Entire home/apt", "Private room", "Shared room", ...
    pub room_type: String,
    /// Nightly price; always > 0 once loaded.
    pub price: f64,
    pub number_of_reviews: u64,
    /// Passthrough columns: column_name → value.
    #[serde(flatten)]
    pub extra: BTreeMap<String, CellValue>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned table
// ---------------------------------------------------------------------------

/// The full cleaned dataset with pre-computed category indices.
/// Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All listings in source order.
    pub listings: Vec<Listing>,
    /// Passthrough column names in source order.
    pub extra_columns: Vec<String>,
    /// Sorted distinct neighbourhood groups.
    pub neighbourhood_groups: BTreeSet<String>,
    /// Sorted distinct room types.
    pub room_types: BTreeSet<String>,
    /// (min, max) price over all listings, `None` when empty.
    pub price_bounds: Option<(f64, f64)>,
}

impl Dataset {
    /// Build category indices and price bounds from cleaned listings.
    pub fn from_listings(listings: Vec<Listing>, extra_columns: Vec<String>) -> Self {
        let mut neighbourhood_groups = BTreeSet::new();
        let mut room_types = BTreeSet::new();
        let mut price_bounds: Option<(f64, f64)> = None;

        for listing in &listings {
            if !neighbourhood_groups.contains(&listing.neighbourhood_group) {
                neighbourhood_groups.insert(listing.neighbourhood_group.clone());
            }
            if !room_types.contains(&listing.room_type) {
                room_types.insert(listing.room_type.clone());
            }
            price_bounds = Some(match price_bounds {
                None => (listing.price, listing.price),
                Some((lo, hi)) => (lo.min(listing.price), hi.max(listing.price)),
            });
        }

        Dataset {
            listings,
            extra_columns,
            neighbourhood_groups,
            room_types,
            price_bounds,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Cheapest listing price, or 0 for an empty dataset.
    pub fn min_price(&self) -> f64 {
        self.price_bounds.map_or(0.0, |(lo, _)| lo)
    }

    /// Most expensive listing price, or 0 for an empty dataset.
    pub fn max_price(&self) -> f64 {
        self.price_bounds.map_or(0.0, |(_, hi)| hi)
    }
}

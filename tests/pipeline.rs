use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use approx::assert_relative_eq;
use rusty_listings::data::aggregate::{Aggregates, group_by_room_type, summarize};
use rusty_listings::data::filter::{
    FilterCriteria, PRICE_SLIDER_CEILING, PriceRange, filter, price_slider_bounds,
};
use rusty_listings::data::loader::load_file;
use rusty_listings::data::{DatasetSource, LoadError};
use rusty_listings::view::{Dashboard, PresentationOptions};

const HEADER: &str = "id,name,host_id,host_name,neighbourhood_group,neighbourhood,latitude,longitude,room_type,price,minimum_nights,number_of_reviews,last_review,reviews_per_month,calculated_host_listings_count,availability_365";

fn csv_file(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

fn three_listings() -> tempfile::NamedTempFile {
    csv_file(&[
        "1,Cozy room,10,Ann,Brooklyn,Bushwick,40.70,-73.92,Private room,50,1,12,2019-06-01,0.5,1,100",
        "2,Whole loft,11,Ben,Brooklyn,Williamsburg,40.71,-73.95,Entire home/apt,200,2,3,2019-05-01,0.1,1,200",
        "3,Sunny room,12,Cat,Brooklyn,Bushwick,40.69,-73.91,Private room,80,1,5,2019-04-01,0.2,2,300",
    ])
}

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn private_rooms_up_to_100() {
    let file = three_listings();
    let ds = load_file(file.path()).unwrap();

    let criteria = FilterCriteria {
        neighbourhood_groups: ds.neighbourhood_groups.clone(),
        room_types: names(&["Private room"]),
        price_range: PriceRange::new(0.0, 100.0),
    };
    let view = filter(&ds, &criteria);
    let prices: Vec<f64> = view.iter().map(|l| l.price).collect();
    assert_eq!(prices, [50.0, 80.0]);

    let metrics = summarize(&view);
    assert_eq!(metrics.count, 2);
    assert_relative_eq!(metrics.mean_price.unwrap(), 65.0);
    assert_eq!(metrics.total_reviews, 17);

    let grouped = group_by_room_type(&view);
    assert_eq!(grouped.keys().collect::<Vec<_>>(), ["Private room"]);
    assert_relative_eq!(grouped["Private room"], 65.0);

    let aggregates = Aggregates::compute(&view, 30);
    let dash = Dashboard::build(&view, &aggregates, &PresentationOptions::default());
    assert_eq!(dash.metrics[1].value, "$65.00");
    assert_eq!(dash.metrics[2].value, "17");
}

#[test]
fn empty_group_selection_empties_everything() {
    let file = three_listings();
    let ds = load_file(file.path()).unwrap();

    let criteria = FilterCriteria {
        neighbourhood_groups: BTreeSet::new(),
        room_types: ds.room_types.clone(),
        price_range: PriceRange::new(0.0, 1_000_000.0),
    };
    let view = filter(&ds, &criteria);
    assert!(view.is_empty());

    let metrics = summarize(&view);
    assert_eq!(metrics.count, 0);
    assert_eq!(metrics.total_reviews, 0);
    assert_eq!(metrics.mean_price, None);
}

#[test]
fn listings_above_the_slider_ceiling_are_unreachable() {
    let file = csv_file(&[
        "1,Penthouse,10,Ann,Manhattan,Midtown,40.75,-73.98,Entire home/apt,5000,3,1,2019-06-01,0.1,1,10",
        "2,Loft,11,Ben,Manhattan,Midtown,40.75,-73.98,Entire home/apt,700,3,4,2019-06-01,0.3,1,10",
        "3,Room,12,Cat,Manhattan,Harlem,40.80,-73.94,Private room,90,1,9,2019-06-01,0.9,1,10",
    ]);
    let ds = load_file(file.path()).unwrap();
    let bounds = price_slider_bounds(&ds);
    assert_eq!(*bounds.end(), PRICE_SLIDER_CEILING);

    let criteria = FilterCriteria {
        price_range: PriceRange::new(600.0, *bounds.end()),
        ..FilterCriteria::defaults_for(&ds)
    };
    let view = filter(&ds, &criteria);
    let prices: Vec<f64> = view.iter().map(|l| l.price).collect();
    assert_eq!(prices, [700.0]);
}

#[test]
fn full_criteria_return_the_cleaned_dataset() {
    let file = csv_file(&[
        "1,Free,10,Ann,Queens,Astoria,40.76,-73.92,Private room,0,1,0,,,1,0",
        "2,Room,11,Ben,Queens,Astoria,40.76,-73.92,Private room,45,1,2,2019-01-01,0.1,1,30",
        "3,Flat,12,Cat,Bronx,Fordham,40.86,-73.89,Entire home/apt,120,2,8,2019-02-01,0.4,1,60",
    ]);
    let ds = load_file(file.path()).unwrap();
    assert_eq!(ds.len(), 2);

    let view = filter(&ds, &FilterCriteria::everything(&ds));
    assert_eq!(view.len(), ds.len());
    for (listing, source_row) in view.iter().zip(&ds.listings) {
        assert_eq!(listing, source_row);
    }
}

#[test]
fn loading_twice_is_identical() {
    let file = three_listings();
    let first = load_file(file.path()).unwrap();
    let second = load_file(file.path()).unwrap();
    assert_eq!(first, second);

    let source = DatasetSource::new(file.path());
    let a = source.load().unwrap();
    let b = source.load().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*a, first);
}

#[test]
fn absent_columns_are_a_schema_mismatch() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "id,name,neighbourhood_group,price").unwrap();
    writeln!(file, "1,Room,Queens,40").unwrap();

    let err = load_file(file.path()).unwrap_err();
    let LoadError::SchemaMismatch { missing, .. } = &err else {
        panic!("expected schema mismatch, got {err:?}");
    };
    assert_eq!(
        missing,
        &[
            "host_name",
            "neighbourhood",
            "latitude",
            "longitude",
            "room_type",
            "number_of_reviews",
            "last_review"
        ]
    );
    assert!(err.to_string().contains("missing column(s) host_name, neighbourhood"));
}

#[test]
fn ragged_csv_is_unavailable() {
    let file = csv_file(&["1,Room,10,Ann,Queens"]);
    assert!(matches!(
        load_file(file.path()),
        Err(LoadError::DataUnavailable { .. })
    ));
}

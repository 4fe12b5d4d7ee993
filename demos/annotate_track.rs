//! Annotate a synthetic alpine track against a fixed set of features.
//!
//! Run with: cargo run --example annotate_track

use route_landmarks::{
    annotate_route_with_store, FeatureStore, FilteredResult, FnObserver, LandmarkConfig, OsmElement,
    TrackPoint,
};

fn main() {
    // 40 points heading north, ~1 km apart, climbing to a summit at point 15
    let points: Vec<TrackPoint> = (0..40)
        .map(|i| {
            let elevation = 1500.0 - 40.0 * (i as f64 - 15.0).abs();
            TrackPoint::new(46.40 + i as f64 * 0.009, 8.57, elevation)
        })
        .collect();

    let elements = vec![
        OsmElement::way(10, 46.427, 8.57, &[("waterway", "river"), ("name", "Ticino")]),
        OsmElement::node(11, 46.535, 8.57, &[("place", "village"), ("name", "Hospental")]),
        OsmElement::node(
            12,
            46.598,
            8.57,
            &[("place", "town"), ("name", "Andermatt"), ("population", "1,500")],
        ),
        OsmElement::node(13, 46.652, 8.57, &[("mountain_pass", "yes")]),
        OsmElement::node(14, 46.742, 8.57, &[("place", "village"), ("name", "Amsteg")]),
    ];
    let store = FeatureStore::from_elements(&elements);

    let observer = FnObserver::new(
        |processed, total| {
            if processed == total {
                println!("Classified {} markers", total);
            }
        },
        |result: &FilteredResult| println!("Found {} landmarks\n", result.len()),
    );

    let config = LandmarkConfig::default();
    match annotate_route_with_store(&points, &store, &config, &observer) {
        Ok(result) => {
            for entry in result.values() {
                println!("{:>5} km  {:<6} {}", entry.km, entry.kind, entry.name);
            }
        }
        Err(e) => eprintln!("Error: {}", e),
    }
}

mod common;

use spectrum_core::{build_scene, SpectrumLabels};

#[test]
fn spectrum_ends_and_center_map_to_margins_and_midpoint() {
    let chart = common::chart_from_fixture("positions_spectrum_ends.json", 600.0).expect("chart");
    let layout = chart.layout();

    let xs: Vec<(&str, f64)> = layout
        .placements
        .iter()
        .map(|placement| (placement.entity.id.as_str(), placement.x))
        .collect();
    assert_eq!(xs.len(), 3);
    for ((id, x), (expected_id, expected_x)) in xs
        .iter()
        .zip([("L000001", 50.0), ("C000002", 300.0), ("R000003", 550.0)])
    {
        assert_eq!(*id, expected_id);
        assert!((x - expected_x).abs() < 1e-9, "{id} at {x}, expected {expected_x}");
    }

    // 250px apart: nobody needs to move off the center row.
    assert!(layout.placements.iter().all(|p| p.attempts == 0 && !p.saturated));
    let row = layout.placements[0].y;
    assert!(layout.placements.iter().all(|p| p.y == row));
    assert_eq!(layout.height, 300.0);
    assert_eq!(row, 150.0);
}

#[test]
fn identical_scores_stack_around_the_shared_center() {
    let chart = common::chart_from_fixture("positions_identical_scores.json", 600.0).expect("chart");
    let layout = chart.layout();
    let center = layout.height / 2.0;

    let mut placements: Vec<_> = layout.placements.iter().collect();
    assert!(placements.iter().all(|p| (p.x - 300.0).abs() < 1e-9));

    placements.sort_by_key(|p| p.rank);
    let offsets: Vec<f64> = placements.iter().map(|p| (p.y - center).abs()).collect();
    assert_eq!(offsets[0], 0.0);
    assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));

    let mut ys: Vec<f64> = placements.iter().map(|p| p.y).collect();
    ys.sort_by(f64::total_cmp);
    ys.dedup();
    assert_eq!(ys.len(), 3, "markers must not share a row");
    for pair in ys.windows(2) {
        assert!(pair[1] - pair[0] >= 20.0 - 1e-9);
    }
}

#[test]
fn processing_order_decides_who_keeps_the_center() {
    let chart = common::chart_with_order("positions_identical_scores.json", 600.0, vec![2, 0, 1])
        .expect("chart");
    let layout = chart.layout();
    let center = layout.height / 2.0;
    let first = layout.find("C000003").expect("C placed");
    assert_eq!(first.rank, 0);
    assert_eq!(first.y, center);
    assert_eq!(layout.find("A000001").map(|p| p.rank), Some(1));
}

#[test]
fn selected_marker_stays_opaque_while_others_dim() {
    let mut chart = common::chart_from_fixture("positions_identical_scores.json", 600.0).expect("chart");
    let config = chart.config().clone();
    let request = chart.select(common::id("B000002")).expect("detail request");
    assert_eq!(request.entity.as_str(), "B000002");

    let labels = SpectrumLabels::new("Free Trade", "Protectionist");
    let scene = build_scene(&chart.view(), &config, &labels);
    let opacity = |id: &str| scene.marker(id).map(|marker| marker.opacity);
    assert_eq!(opacity("B000002"), Some(1.0));
    assert_eq!(opacity("A000001"), Some(config.interaction.dimmed_opacity));
    assert_eq!(opacity("C000003"), Some(config.interaction.dimmed_opacity));
    assert!(scene.marker("B000002").is_some_and(|marker| marker.selected));

    chart.close();
    let scene = build_scene(&chart.view(), &config, &labels);
    assert!(scene.markers().all(|marker| marker.opacity == 1.0 && !marker.selected));
    assert!(chart.detail().is_none());
}

#[test]
fn no_data_entries_are_not_placed() {
    let payload = common::load_positions("positions_spectrum_ends.json").expect("payload");
    assert_eq!(payload.no_data.len(), 1);
    assert_eq!(payload.stats.by_category.get("I"), Some(&1));
    let chart = common::chart_from_fixture("positions_spectrum_ends.json", 600.0).expect("chart");
    assert!(chart.layout().find("N000004").is_none());

    let empty = common::load_positions("positions_identical_scores.json").expect("payload");
    assert!(empty.no_data.is_empty());
}

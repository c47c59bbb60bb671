mod common;

use spectrum_core::{ChartModel, InputOrder};

#[test]
fn env_override_feeds_geometry_and_dimming() {
    let config = common::ensure_test_config();
    assert_eq!(config.geometry.radius, 6.0);
    assert_eq!(config.geometry.min_separation(), 14.0);
    // Unlisted fields keep their defaults.
    assert_eq!(config.geometry.horizontal_margin, 50.0);
    assert_eq!(config.interaction.dimmed_opacity, 0.25);

    let payload = common::load_positions("positions_identical_scores.json").expect("payload");
    let mut chart = ChartModel::new(config.clone(), Box::new(InputOrder));
    chart.resize(600.0);
    chart.set_entities(payload.positions);

    let layout = chart.layout();
    assert_eq!(layout.height, 240.0);
    let mut ys: Vec<f64> = layout.placements.iter().map(|p| p.y).collect();
    ys.sort_by(f64::total_cmp);
    for pair in ys.windows(2) {
        assert!(pair[1] - pair[0] >= config.geometry.min_separation() - 1e-9);
    }

    chart.select(common::id("A000001")).expect("request");
    let view = chart.view();
    let dimmed = view.emphasis(&common::id("C000003"), &config);
    assert_eq!(dimmed.opacity, 0.25);
}

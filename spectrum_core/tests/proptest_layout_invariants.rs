//! Property-based invariant tests for the placement engine.
//!
//! 1. Every pair of markers keeps the minimum separation unless the later one
//!    exhausted its attempt budget.
//! 2. The multiset of x-coordinates ignores input and processing order.
//! 3. Canvas height covers the minimum and the full vertical extent plus margin.
//! 4. Every x lies inside the margin-inset range.

use proptest::prelude::*;
use spectrum_core::schema::{Category, PositionEntity};
use spectrum_core::{layout, FixedOrder, GeometryConfig, InputOrder, Layout};

// ── Helpers ─────────────────────────────────────────────────────────────

fn entities_from(scores: &[f64]) -> Vec<PositionEntity> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| {
            let category = match i % 3 {
                0 => Category::Democrat,
                1 => Category::Republican,
                _ => Category::Independent,
            };
            PositionEntity::new(format!("E{i}"), format!("Entity {i}"), category, "ST", score)
        })
        .collect()
}

/// Scores drawn from a handful of tight clusters so collisions are common.
fn clustered_scores(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(
        prop_oneof![
            (-1.0f64..=1.0),
            (-0.52f64..=-0.48),
            (0.3f64..=0.31),
            Just(0.0),
        ],
        0..=max_len,
    )
}

fn width_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 40.0f64..=200.0, 200.0f64..=1600.0]
}

fn sorted_xs(layout: &Layout) -> Vec<f64> {
    let mut xs: Vec<f64> = layout.placements.iter().map(|p| p.x).collect();
    xs.sort_by(f64::total_cmp);
    xs
}

fn assert_separation(layout: &Layout, geometry: &GeometryConfig) -> Result<(), TestCaseError> {
    let min = geometry.min_separation();
    for (i, a) in layout.placements.iter().enumerate() {
        for b in &layout.placements[i + 1..] {
            let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
            let later = if a.rank > b.rank { a } else { b };
            prop_assert!(
                distance >= min - 1e-6 || later.saturated,
                "{} and {} are {distance} apart (min {min})",
                a.entity.id,
                b.entity.id
            );
        }
    }
    Ok(())
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn markers_never_overlap_unless_saturated(
        scores in clustered_scores(60),
        width in width_strategy(),
    ) {
        let geometry = GeometryConfig::default();
        let layout = layout(&entities_from(&scores), width, &geometry, &mut InputOrder);
        prop_assert_eq!(layout.len(), scores.len());
        assert_separation(&layout, &geometry)?;
    }

    #[test]
    fn tight_budgets_still_flag_every_overlap(
        scores in clustered_scores(40),
        attempts in 1u32..=6,
    ) {
        let geometry = GeometryConfig { max_attempts: attempts, ..GeometryConfig::default() };
        let layout = layout(&entities_from(&scores), 800.0, &geometry, &mut InputOrder);
        assert_separation(&layout, &geometry)?;
        for placement in layout.placements.iter().filter(|p| p.saturated) {
            prop_assert_eq!(placement.attempts, attempts);
        }
    }

    #[test]
    fn x_multiset_ignores_input_order(
        (scores, shuffled) in clustered_scores(40)
            .prop_flat_map(|scores| (Just(scores.clone()), Just(scores).prop_shuffle())),
        width in 100.0f64..=1400.0,
    ) {
        let geometry = GeometryConfig::default();
        let a = layout(&entities_from(&scores), width, &geometry, &mut InputOrder);
        let b = layout(&entities_from(&shuffled), width, &geometry, &mut InputOrder);
        prop_assert_eq!(sorted_xs(&a), sorted_xs(&b));
    }

    #[test]
    fn processing_order_only_moves_rows(
        (scores, order) in clustered_scores(40).prop_flat_map(|scores| {
            let len = scores.len();
            (Just(scores), Just((0..len).collect::<Vec<usize>>()).prop_shuffle())
        }),
    ) {
        let geometry = GeometryConfig::default();
        let entities = entities_from(&scores);
        let baseline = layout(&entities, 900.0, &geometry, &mut InputOrder);
        let permuted = layout(&entities, 900.0, &geometry, &mut FixedOrder(order));
        for (a, b) in baseline.placements.iter().zip(&permuted.placements) {
            prop_assert_eq!(&a.entity.id, &b.entity.id);
            prop_assert_eq!(a.x, b.x);
        }
        assert_separation(&permuted, &geometry)?;
    }

    #[test]
    fn canvas_covers_extent_and_minimum(
        scores in clustered_scores(80),
        width in width_strategy(),
    ) {
        let geometry = GeometryConfig::default();
        let layout = layout(&entities_from(&scores), width, &geometry, &mut InputOrder);
        prop_assert!(layout.height >= geometry.min_height);
        if let (Some(top), Some(bottom)) = (
            layout.placements.iter().map(|p| p.y).reduce(f64::min),
            layout.placements.iter().map(|p| p.y).reduce(f64::max),
        ) {
            let extent = bottom - top + 2.0 * geometry.clearance();
            prop_assert!(layout.height + 1e-6 >= extent + 2.0 * geometry.vertical_margin);
            prop_assert!(top - geometry.clearance() >= -1e-6);
            prop_assert!(bottom + geometry.clearance() <= layout.height + 1e-6);
        }
    }

    #[test]
    fn x_stays_inside_margins(
        scores in proptest::collection::vec(-3.0f64..=3.0, 0..=30),
        width in 100.0f64..=1600.0,
    ) {
        let geometry = GeometryConfig::default();
        let layout = layout(&entities_from(&scores), width, &geometry, &mut InputOrder);
        for placement in &layout.placements {
            prop_assert!(placement.x >= geometry.horizontal_margin - 1e-9);
            prop_assert!(placement.x <= width - geometry.horizontal_margin + 1e-9);
        }
    }
}

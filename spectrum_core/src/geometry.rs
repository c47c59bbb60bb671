//! Collision-avoiding placement of scored entities.
//!
//! Layout runs in two pure stages: [`place`] assigns every entity an x from the
//! scale and searches for a free y around the origin row, then
//! [`center_and_size`] measures the vertical extent, grows the canvas to fit it
//! and translates every y so the band sits in the middle.

use tracing::{debug, warn};

use spectrum_schema::PositionEntity;

use crate::chart_config::GeometryConfig;
use crate::draw_order::{is_permutation, DrawOrder};
use crate::scale::ScaleMapper;

/// Squared-distance slack so exact multiples of the step never read as collisions.
const SEPARATION_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub entity: PositionEntity,
    pub x: f64,
    pub y: f64,
    /// Position of this entity in the processing order.
    pub rank: usize,
    /// Candidates tried after the origin row.
    pub attempts: u32,
    /// The attempt ceiling was hit while the final candidate still collided.
    pub saturated: bool,
}

/// Output of [`place`]: y is relative to the origin row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLayout {
    pub placements: Vec<Placement>,
    pub scale: ScaleMapper,
    pub width: f64,
}

/// Final placements in surface-local pixels plus the canvas size they need.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub placements: Vec<Placement>,
    pub scale: ScaleMapper,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn empty(width: f64, geometry: &GeometryConfig) -> Self {
        Self {
            placements: Vec::new(),
            scale: ScaleMapper::for_container(width, geometry.horizontal_margin),
            width,
            height: geometry.min_height,
        }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|placement| placement.entity.id.as_str() == id)
    }

    /// Nearest placement whose center lies within `radius` of `(x, y)`.
    pub fn hit_test(&self, x: f64, y: f64, radius: f64) -> Option<&Placement> {
        let limit = radius * radius;
        self.placements
            .iter()
            .map(|placement| {
                let dx = placement.x - x;
                let dy = placement.y - y;
                (placement, dx * dx + dy * dy)
            })
            .filter(|(_, dist_sq)| *dist_sq <= limit)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(placement, _)| placement)
    }

    pub fn saturated_count(&self) -> usize {
        self.placements.iter().filter(|p| p.saturated).count()
    }
}

/// Assigns x from the scale and a collision-free y (where the search allows).
///
/// Placements come back in input order; `order` only decides which entity
/// claims a row first.
pub fn place(
    entities: &[PositionEntity],
    width: f64,
    geometry: &GeometryConfig,
    order: &mut dyn DrawOrder,
) -> RawLayout {
    let scale = ScaleMapper::for_container(width, geometry.horizontal_margin);
    let count = entities.len();

    let mut sequence = order.permutation(count);
    if !is_permutation(&sequence, count) {
        warn!(
            target: "spectrum::layout",
            len = count,
            "draw order returned an invalid permutation; using input order"
        );
        sequence = (0..count).collect();
    }

    let min_separation = geometry.min_separation();
    let step = geometry.search_step();
    let mut centers: Vec<(f64, f64)> = Vec::with_capacity(count);
    let mut slots: Vec<Option<Placement>> = vec![None; count];

    for (rank, &index) in sequence.iter().enumerate() {
        let entity = &entities[index];
        let x = scale.to_x(entity.score);

        let mut y = 0.0;
        let mut attempts = 0;
        let mut colliding = collides(x, y, &centers, min_separation);
        while colliding && attempts < geometry.max_attempts {
            attempts += 1;
            y = candidate_offset(attempts, step);
            colliding = collides(x, y, &centers, min_separation);
        }

        if colliding {
            debug!(
                target: "spectrum::layout",
                entity = %entity.id,
                attempts,
                "attempt ceiling reached; accepting overlapping candidate"
            );
        }

        centers.push((x, y));
        slots[index] = Some(Placement {
            entity: entity.clone(),
            x,
            y,
            rank,
            attempts,
            saturated: colliding,
        });
    }

    RawLayout {
        placements: slots.into_iter().flatten().collect(),
        scale,
        width,
    }
}

/// Grows the canvas to fit the placed band and centers it vertically.
pub fn center_and_size(raw: RawLayout, geometry: &GeometryConfig) -> Layout {
    let RawLayout {
        mut placements,
        scale,
        width,
    } = raw;

    let Some((min_y, max_y)) = vertical_extent(&placements) else {
        return Layout {
            placements,
            scale,
            width,
            height: geometry.min_height,
        };
    };

    let top = min_y - geometry.clearance();
    let bottom = max_y + geometry.clearance();
    let span = bottom - top;
    let height = geometry.min_height.max(span + 2.0 * geometry.vertical_margin);
    let offset = height / 2.0 - (top + bottom) / 2.0;

    for placement in &mut placements {
        placement.y += offset;
    }

    Layout {
        placements,
        scale,
        width,
        height,
    }
}

/// Runs both layout stages.
pub fn layout(
    entities: &[PositionEntity],
    width: f64,
    geometry: &GeometryConfig,
    order: &mut dyn DrawOrder,
) -> Layout {
    let layout = center_and_size(place(entities, width, geometry, order), geometry);
    let saturated = layout.saturated_count();
    if saturated > 0 {
        debug!(
            target: "spectrum::layout",
            saturated,
            total = layout.len(),
            "layout tolerated residual overlap"
        );
    }
    debug!(
        target: "spectrum::layout",
        entities = layout.len(),
        width = layout.width,
        height = layout.height,
        "layout.completed"
    );
    layout
}

/// Offset for the `attempt`-th candidate: above, below, then one step further out.
pub fn candidate_offset(attempt: u32, step: f64) -> f64 {
    if attempt == 0 {
        return 0.0;
    }
    let ring = attempt.div_ceil(2) as f64;
    if attempt % 2 == 1 {
        -ring * step
    } else {
        ring * step
    }
}

fn collides(x: f64, y: f64, centers: &[(f64, f64)], min_separation: f64) -> bool {
    let limit = min_separation * min_separation - SEPARATION_EPSILON;
    centers.iter().any(|&(cx, cy)| {
        let dx = cx - x;
        if dx.abs() >= min_separation {
            return false;
        }
        let dy = cy - y;
        dx * dx + dy * dy < limit
    })
}

fn vertical_extent(placements: &[Placement]) -> Option<(f64, f64)> {
    placements.iter().fold(None, |extent, placement| match extent {
        None => Some((placement.y, placement.y)),
        Some((lo, hi)) => Some((lo.min(placement.y), hi.max(placement.y))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw_order::{FixedOrder, InputOrder};
    use spectrum_schema::Category;

    fn entity(id: &str, score: f64) -> PositionEntity {
        PositionEntity::new(id, id, Category::Democrat, "CA", score)
    }

    fn min_pair_distance(layout: &Layout) -> f64 {
        let mut best = f64::INFINITY;
        for (i, a) in layout.placements.iter().enumerate() {
            for b in &layout.placements[i + 1..] {
                best = best.min(((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt());
            }
        }
        best
    }

    #[test]
    fn candidate_offsets_alternate_outward() {
        let offsets: Vec<f64> = (0..5).map(|k| candidate_offset(k, 18.0)).collect();
        assert_eq!(offsets, vec![0.0, -18.0, 18.0, -36.0, 36.0]);
    }

    #[test]
    fn empty_input_yields_minimum_canvas() {
        let geometry = GeometryConfig::default();
        let layout = layout(&[], 600.0, &geometry, &mut InputOrder);
        assert!(layout.is_empty());
        assert_eq!(layout.height, geometry.min_height);
    }

    #[test]
    fn spread_scores_stay_on_origin_row() {
        let geometry = GeometryConfig::default();
        let entities = vec![entity("a", -1.0), entity("b", 0.0), entity("c", 1.0)];
        let raw = place(&entities, 600.0, &geometry, &mut InputOrder);
        let xs: Vec<f64> = raw.placements.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![50.0, 300.0, 550.0]);
        assert!(raw.placements.iter().all(|p| p.y == 0.0 && p.attempts == 0));
    }

    #[test]
    fn identical_scores_stack_vertically() {
        let geometry = GeometryConfig::default();
        let entities: Vec<_> = (0..6).map(|i| entity(&format!("m{i}"), 0.25)).collect();
        let layout = layout(&entities, 800.0, &geometry, &mut InputOrder);
        let x0 = layout.placements[0].x;
        assert!(layout.placements.iter().all(|p| p.x == x0));
        assert!(min_pair_distance(&layout) >= geometry.min_separation());
        assert_eq!(layout.saturated_count(), 0);
    }

    #[test]
    fn canvas_grows_to_fit_tall_stacks() {
        let geometry = GeometryConfig::default();
        let entities: Vec<_> = (0..30).map(|i| entity(&format!("m{i}"), 0.0)).collect();
        let layout = layout(&entities, 600.0, &geometry, &mut InputOrder);
        assert!(layout.height > geometry.min_height);
        let top = layout
            .placements
            .iter()
            .map(|p| p.y)
            .fold(f64::INFINITY, f64::min);
        let bottom = layout
            .placements
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(top - geometry.clearance() >= geometry.vertical_margin - 1e-9);
        assert!(bottom + geometry.clearance() <= layout.height - geometry.vertical_margin + 1e-9);
        assert!(((top + bottom) / 2.0 - layout.height / 2.0).abs() < 1e-9);
    }

    #[test]
    fn attempt_ceiling_marks_saturated_placements() {
        let geometry = GeometryConfig {
            max_attempts: 2,
            ..GeometryConfig::default()
        };
        let entities: Vec<_> = (0..5).map(|i| entity(&format!("m{i}"), 0.0)).collect();
        let layout = layout(&entities, 600.0, &geometry, &mut InputOrder);
        assert_eq!(layout.len(), 5);
        assert!(layout.saturated_count() > 0);
        for placement in layout.placements.iter().filter(|p| p.saturated) {
            assert_eq!(placement.attempts, geometry.max_attempts);
        }
    }

    #[test]
    fn invalid_permutation_falls_back_to_input_order() {
        let geometry = GeometryConfig::default();
        let entities = vec![entity("a", 0.0), entity("b", 0.0)];
        let mut order = FixedOrder(vec![0, 0]);
        let raw = place(&entities, 600.0, &geometry, &mut order);
        assert_eq!(raw.placements[0].rank, 0);
        assert_eq!(raw.placements[1].rank, 1);
    }

    #[test]
    fn order_changes_rows_but_not_columns() {
        let geometry = GeometryConfig::default();
        let entities = vec![entity("a", 0.1), entity("b", 0.1), entity("c", -0.4)];
        let forward = place(&entities, 640.0, &geometry, &mut InputOrder);
        let reversed = place(&entities, 640.0, &geometry, &mut FixedOrder(vec![2, 1, 0]));
        for (a, b) in forward.placements.iter().zip(&reversed.placements) {
            assert_eq!(a.entity.id, b.entity.id);
            assert_eq!(a.x, b.x);
        }
        assert_eq!(forward.placements[0].y, 0.0);
        assert_ne!(reversed.placements[0].y, 0.0);
        assert_eq!(reversed.placements[1].y, 0.0);
    }

    #[test]
    fn hit_test_prefers_nearest_marker() {
        let geometry = GeometryConfig::default();
        let entities = vec![entity("a", -1.0), entity("b", 1.0)];
        let layout = layout(&entities, 600.0, &geometry, &mut InputOrder);
        let a = layout.find("a").expect("a placed");
        let hit = layout.hit_test(a.x + 3.0, a.y - 2.0, geometry.radius);
        assert_eq!(hit.map(|p| p.entity.id.as_str()), Some("a"));
        assert!(layout.hit_test(300.0, a.y, geometry.radius).is_none());
    }
}

//! Render surface: turns a [`ChartView`] into an ordered list of primitives.
//!
//! The scene is rebuilt from scratch for every frame. Backends (the SVG writer,
//! the terminal canvas) only paint what is listed here, in order.

use spectrum_schema::{EntityId, SCORE_MAX, SCORE_MIN};

use crate::chart::ChartView;
use crate::chart_config::{ChartConfig, Rgb};

const END_LABEL_Y: f64 = 16.0;
const TICK_LENGTH: f64 = 5.0;
const TICK_LABEL_GAP: f64 = 14.0;
const LABEL_SIZE: f64 = 12.0;
const TICK_LABEL_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub x: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    CenterLine,
    Gridline,
    Axis,
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPrimitive {
    pub entity: EntityId,
    pub center: Point,
    pub radius: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f64,
    pub opacity: f64,
    pub selected: bool,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScenePrimitive {
    Background {
        width: f64,
        height: f64,
        stops: Vec<GradientStop>,
    },
    Rule {
        kind: RuleKind,
        from: Point,
        to: Point,
        color: Rgb,
        width: f64,
        dash: Option<(f64, f64)>,
    },
    Text {
        at: Point,
        text: String,
        color: Rgb,
        size: f64,
        anchor: TextAnchor,
    },
    Marker(MarkerPrimitive),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub primitives: Vec<ScenePrimitive>,
}

impl Scene {
    pub fn markers(&self) -> impl Iterator<Item = &MarkerPrimitive> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            ScenePrimitive::Marker(marker) => Some(marker),
            _ => None,
        })
    }

    pub fn marker(&self, id: &str) -> Option<&MarkerPrimitive> {
        self.markers().find(|marker| marker.entity.as_str() == id)
    }

    pub fn rules(&self, kind: RuleKind) -> impl Iterator<Item = (&Point, &Point)> {
        self.primitives.iter().filter_map(move |primitive| match primitive {
            ScenePrimitive::Rule { kind: k, from, to, .. } if *k == kind => Some((from, to)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            ScenePrimitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Labels for the two domain extremes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpectrumLabels {
    pub left: String,
    pub right: String,
}

impl SpectrumLabels {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

pub fn build_scene(view: &ChartView, config: &ChartConfig, labels: &SpectrumLabels) -> Scene {
    let layout = &view.layout;
    let scale = layout.scale;
    let palette = &config.palette;
    let geometry = &config.geometry;
    let width = layout.width;
    let height = layout.height;
    let mut primitives = Vec::with_capacity(layout.len() + 24);

    primitives.push(ScenePrimitive::Background {
        width,
        height,
        stops: vec![
            GradientStop {
                x: scale.to_x(SCORE_MIN),
                color: palette.gradient_left,
            },
            GradientStop {
                x: scale.to_x(0.0),
                color: palette.gradient_center,
            },
            GradientStop {
                x: scale.to_x(SCORE_MAX),
                color: palette.gradient_right,
            },
        ],
    });

    let plot_top = geometry.vertical_margin / 2.0;
    let axis_y = (height - config.axis.axis_offset).max(plot_top);

    for &score in &config.axis.gridlines {
        if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
            continue;
        }
        let x = scale.to_x(score);
        primitives.push(ScenePrimitive::Rule {
            kind: RuleKind::Gridline,
            from: Point::new(x, plot_top),
            to: Point::new(x, axis_y),
            color: palette.gridline,
            width: 1.0,
            dash: None,
        });
    }

    let center_x = scale.to_x(0.0);
    primitives.push(ScenePrimitive::Rule {
        kind: RuleKind::CenterLine,
        from: Point::new(center_x, plot_top),
        to: Point::new(center_x, axis_y),
        color: palette.center_line,
        width: 1.0,
        dash: Some((4.0, 4.0)),
    });

    primitives.push(ScenePrimitive::Rule {
        kind: RuleKind::Axis,
        from: Point::new(scale.to_x(SCORE_MIN), axis_y),
        to: Point::new(scale.to_x(SCORE_MAX), axis_y),
        color: palette.axis,
        width: 1.0,
        dash: None,
    });

    for score in tick_values(config.axis.tick_step) {
        let x = scale.to_x(score);
        primitives.push(ScenePrimitive::Rule {
            kind: RuleKind::Tick,
            from: Point::new(x, axis_y),
            to: Point::new(x, axis_y + TICK_LENGTH),
            color: palette.axis,
            width: 1.0,
            dash: None,
        });
        primitives.push(ScenePrimitive::Text {
            at: Point::new(x, axis_y + TICK_LABEL_GAP),
            text: tick_label(score),
            color: palette.label,
            size: TICK_LABEL_SIZE,
            anchor: TextAnchor::Middle,
        });
    }

    primitives.push(ScenePrimitive::Text {
        at: Point::new(scale.to_x(SCORE_MIN), END_LABEL_Y),
        text: format!("\u{2190} {}", labels.left),
        color: palette.label,
        size: LABEL_SIZE,
        anchor: TextAnchor::Start,
    });
    primitives.push(ScenePrimitive::Text {
        at: Point::new(scale.to_x(SCORE_MAX), END_LABEL_Y),
        text: format!("{} \u{2192}", labels.right),
        color: palette.label,
        size: LABEL_SIZE,
        anchor: TextAnchor::End,
    });

    let mut markers: Vec<MarkerPrimitive> = layout
        .placements
        .iter()
        .map(|placement| {
            let emphasis = view.emphasis(&placement.entity.id, config);
            MarkerPrimitive {
                entity: placement.entity.id.clone(),
                center: Point::new(placement.x, placement.y),
                radius: geometry.radius + emphasis.radius_delta,
                fill: palette.fill_for(&placement.entity.category),
                stroke: if emphasis.selected {
                    palette.selected_stroke
                } else {
                    palette.stroke
                },
                stroke_width: emphasis.stroke_width,
                opacity: emphasis.opacity,
                selected: emphasis.selected,
                hovered: emphasis.hovered,
            }
        })
        .collect();
    // Emphasized markers paint last so they sit on top.
    markers.sort_by_key(|marker| (marker.selected, marker.hovered));
    primitives.extend(markers.into_iter().map(ScenePrimitive::Marker));

    Scene {
        width,
        height,
        primitives,
    }
}

/// Scores from `-1` to `1` at `step` intervals, endpoints included.
pub fn tick_values(step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0) {
        return vec![SCORE_MIN, SCORE_MAX];
    }
    let count = ((SCORE_MAX - SCORE_MIN) / step + 1e-9).floor() as usize;
    (0..=count)
        .map(|i| SCORE_MIN + i as f64 * step)
        .map(|score| if score.abs() < 1e-9 { 0.0 } else { score })
        .collect()
}

fn tick_label(score: f64) -> String {
    if score == 0.0 {
        "0".to_string()
    } else {
        format!("{score:+.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartModel;
    use crate::draw_order::InputOrder;
    use spectrum_schema::{Category, PositionEntity};

    fn chart() -> ChartModel {
        let mut chart = ChartModel::new(ChartConfig::builtin(), Box::new(InputOrder));
        chart.resize(600.0);
        chart.set_entities(vec![
            PositionEntity::new("A", "Alpha", Category::Democrat, "NY", -0.6),
            PositionEntity::new("B", "Bravo", Category::Republican, "TX", 0.2),
            PositionEntity::new("C", "Charlie", Category::Other("L".into()), "NV", 0.7),
        ]);
        chart
    }

    #[test]
    fn tick_values_cover_the_domain() {
        assert_eq!(tick_values(0.5), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(tick_values(0.0), vec![-1.0, 1.0]);
        let labels: Vec<String> = tick_values(0.5).into_iter().map(tick_label).collect();
        assert_eq!(labels, vec!["-1.0", "-0.5", "0", "+0.5", "+1.0"]);
    }

    #[test]
    fn scene_has_reference_structure_and_one_marker_per_placement() {
        let chart = chart();
        let config = ChartConfig::builtin();
        let scene = build_scene(&chart.view(), &config, &SpectrumLabels::new("Free Trade", "Protectionist"));

        assert!(matches!(scene.primitives[0], ScenePrimitive::Background { .. }));
        assert_eq!(scene.markers().count(), 3);
        assert_eq!(scene.rules(RuleKind::Gridline).count(), config.axis.gridlines.len());
        assert_eq!(scene.rules(RuleKind::Tick).count(), 5);
        let (top, bottom) = scene.rules(RuleKind::CenterLine).next().expect("center line");
        assert_eq!(top.x, 300.0);
        assert_eq!(bottom.x, 300.0);
        assert!(scene.texts().any(|text| text.contains("Free Trade")));
        assert!(scene.texts().any(|text| text.contains("Protectionist")));
    }

    #[test]
    fn markers_are_colored_by_category() {
        let chart = chart();
        let config = ChartConfig::builtin();
        let scene = build_scene(&chart.view(), &config, &SpectrumLabels::default());
        let palette = &config.palette;
        assert_eq!(scene.marker("A").map(|m| m.fill), Some(palette.fill_for(&Category::Democrat)));
        assert_eq!(scene.marker("B").map(|m| m.fill), Some(palette.fill_for(&Category::Republican)));
        assert_eq!(scene.marker("C").map(|m| m.fill), Some(palette.fallback));
    }

    #[test]
    fn selection_emphasizes_one_marker_and_dims_the_rest() {
        let mut chart = chart();
        chart.select(EntityId::from("B"));
        let config = ChartConfig::builtin();
        let scene = build_scene(&chart.view(), &config, &SpectrumLabels::default());

        let selected = scene.marker("B").expect("marker");
        assert_eq!(selected.opacity, 1.0);
        assert_eq!(selected.stroke, config.palette.selected_stroke);
        assert!(selected.radius > config.geometry.radius);
        for id in ["A", "C"] {
            let marker = scene.marker(id).expect("marker");
            assert_eq!(marker.opacity, config.interaction.dimmed_opacity);
            assert_eq!(marker.radius, config.geometry.radius);
        }
        let last = scene.markers().last().expect("markers");
        assert_eq!(last.entity.as_str(), "B");
    }

    #[test]
    fn hover_enlarges_without_dimming() {
        let mut chart = chart();
        let a = chart.layout().find("A").cloned().expect("placed");
        chart.pointer_move(a.x, a.y);
        let config = ChartConfig::builtin();
        let scene = build_scene(&chart.view(), &config, &SpectrumLabels::default());
        let hovered = scene.marker("A").expect("marker");
        assert_eq!(hovered.radius, config.geometry.radius + config.interaction.hover_radius_delta);
        assert!(scene.markers().all(|m| m.opacity == 1.0));
    }

    #[test]
    fn empty_layout_still_draws_axis() {
        let mut chart = ChartModel::new(ChartConfig::builtin(), Box::new(InputOrder));
        chart.resize(400.0);
        let config = ChartConfig::builtin();
        let scene = build_scene(&chart.view(), &config, &SpectrumLabels::default());
        assert_eq!(scene.markers().count(), 0);
        assert_eq!(scene.height, config.geometry.min_height);
        assert_eq!(scene.rules(RuleKind::Axis).count(), 1);
    }
}

//! Hover and selection state.
//!
//! Hover and selection are independent axes: hover never dims anything and
//! selection never depends on where the pointer is.

use tracing::trace;

use spectrum_schema::EntityId;

use crate::chart_config::InteractionConfig;
use crate::geometry::{Layout, Placement};

#[derive(Debug, Clone, PartialEq)]
pub struct HoverState {
    pub cursor_x: f64,
    pub cursor_y: f64,
    pub entity: EntityId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HoverTransition {
    Unchanged,
    Entered(EntityId),
    Left(EntityId),
    Switched { from: EntityId, to: EntityId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    Unchanged,
    Selected {
        previous: Option<EntityId>,
        current: EntityId,
    },
    Cleared(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverDirection {
    Next,
    Previous,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    hover: Option<HoverState>,
    selection: Option<EntityId>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }

    pub fn selection(&self) -> Option<&EntityId> {
        self.selection.as_ref()
    }

    pub fn hover_enter(&mut self, entity: EntityId, cursor_x: f64, cursor_y: f64) -> HoverTransition {
        let transition = match self.hover.as_ref() {
            Some(current) if current.entity == entity => HoverTransition::Unchanged,
            Some(current) => HoverTransition::Switched {
                from: current.entity.clone(),
                to: entity.clone(),
            },
            None => HoverTransition::Entered(entity.clone()),
        };
        self.hover = Some(HoverState {
            cursor_x,
            cursor_y,
            entity,
        });
        transition
    }

    pub fn hover_leave(&mut self) -> HoverTransition {
        match self.hover.take() {
            Some(previous) => HoverTransition::Left(previous.entity),
            None => HoverTransition::Unchanged,
        }
    }

    /// Derives enter/leave from a pointer position over `layout`.
    pub fn pointer_move(&mut self, layout: &Layout, x: f64, y: f64, hit_radius: f64) -> HoverTransition {
        match layout.hit_test(x, y, hit_radius) {
            Some(placement) => {
                let id = placement.entity.id.clone();
                self.hover_enter(id, x, y)
            }
            None => self.hover_leave(),
        }
    }

    /// Moves keyboard hover to the neighbouring marker, ordered by x then y.
    pub fn hover_step(&mut self, layout: &Layout, direction: HoverDirection) -> HoverTransition {
        let ordered = reading_order(layout);
        if ordered.is_empty() {
            return self.hover_leave();
        }
        let current = self
            .hover
            .as_ref()
            .and_then(|hover| ordered.iter().position(|p| p.entity.id == hover.entity));
        let next = match (current, direction) {
            (None, HoverDirection::Next) => 0,
            (None, HoverDirection::Previous) => ordered.len() - 1,
            (Some(index), HoverDirection::Next) => (index + 1) % ordered.len(),
            (Some(index), HoverDirection::Previous) => (index + ordered.len() - 1) % ordered.len(),
        };
        let target = ordered[next];
        self.hover_enter(target.entity.id.clone(), target.x, target.y)
    }

    /// Selecting a different entity replaces the current one outright.
    pub fn select(&mut self, entity: EntityId) -> SelectionChange {
        if self.selection.as_ref() == Some(&entity) {
            return SelectionChange::Unchanged;
        }
        let previous = self.selection.replace(entity.clone());
        trace!(target: "spectrum::interaction", entity = %entity, "selection.set");
        SelectionChange::Selected {
            previous,
            current: entity,
        }
    }

    pub fn activate_hovered(&mut self) -> SelectionChange {
        match self.hover.as_ref().map(|hover| hover.entity.clone()) {
            Some(entity) => self.select(entity),
            None => SelectionChange::Unchanged,
        }
    }

    pub fn close(&mut self) -> SelectionChange {
        match self.selection.take() {
            Some(previous) => {
                trace!(target: "spectrum::interaction", entity = %previous, "selection.cleared");
                SelectionChange::Cleared(previous)
            }
            None => SelectionChange::Unchanged,
        }
    }

    /// Drops hover and selection that point at entities missing from `layout`.
    pub fn retain_present(&mut self, layout: &Layout) {
        if let Some(hover) = &self.hover {
            if layout.find(hover.entity.as_str()).is_none() {
                self.hover = None;
            }
        }
        if let Some(selection) = &self.selection {
            if layout.find(selection.as_str()).is_none() {
                self.selection = None;
            }
        }
    }
}

fn reading_order(layout: &Layout) -> Vec<&Placement> {
    let mut ordered: Vec<&Placement> = layout.placements.iter().collect();
    ordered.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    ordered
}

/// Visual emphasis for one marker under the current hover and selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerEmphasis {
    pub opacity: f64,
    pub radius_delta: f64,
    pub stroke_width: f64,
    pub selected: bool,
    pub hovered: bool,
}

impl MarkerEmphasis {
    pub fn for_entity(
        id: &EntityId,
        selection: Option<&EntityId>,
        hover: Option<&HoverState>,
        config: &InteractionConfig,
    ) -> Self {
        let selected = selection == Some(id);
        let hovered = hover.is_some_and(|hover| &hover.entity == id);
        let opacity = match selection {
            Some(_) if !selected => config.dimmed_opacity,
            _ => 1.0,
        };
        let mut radius_delta = 0.0;
        if hovered {
            radius_delta += config.hover_radius_delta;
        }
        if selected {
            radius_delta += config.selected_radius_delta;
        }
        Self {
            opacity,
            radius_delta,
            stroke_width: if selected {
                config.selected_stroke_width
            } else {
                config.stroke_width
            },
            selected,
            hovered,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub entity: EntityId,
    pub lines: Vec<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
}

/// Tooltip for the hovered marker, kept inside the container's right edge.
pub fn tooltip_for(
    hover: &HoverState,
    layout: &Layout,
    container_width: f64,
    config: &InteractionConfig,
) -> Option<Tooltip> {
    let placement = layout.find(hover.entity.as_str())?;
    let entity = &placement.entity;

    let mut lines = vec![
        entity.display_name.clone(),
        format!("{}-{}", entity.category, entity.region),
        format!("Score: {:.2}", entity.score),
    ];
    if let Some(confidence) = entity.confidence {
        lines.push(format!("Confidence: {:.0}%", confidence * 100.0));
    }

    let width = config.tooltip_width;
    let max_x = (container_width - width).max(0.0);
    let x = (hover.cursor_x + config.tooltip_offset).clamp(0.0, max_x);
    let y = (hover.cursor_y + config.tooltip_offset).max(0.0);

    Some(Tooltip {
        entity: entity.id.clone(),
        lines,
        x,
        y,
        width,
    })
}

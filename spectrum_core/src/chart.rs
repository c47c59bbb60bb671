//! Chart state shared by the render surface, tooltip and detail panel.
//!
//! Every mutation replaces a whole value (entities, layout, selection, detail
//! record). Readers take a [`ChartView`] snapshot so a frame is always drawn
//! from one consistent set of inputs.

use std::fmt::Display;
use std::sync::Arc;

use tracing::{debug, info};

use spectrum_schema::{EntityId, MemberDetail, PositionEntity, StatementEvidence};

use crate::chart_config::ChartConfig;
use crate::detail::{Commit, DetailLoader, DetailRecord, DetailRequest};
use crate::draw_order::DrawOrder;
use crate::geometry::{layout, Layout};
use crate::interaction::{
    tooltip_for, HoverDirection, HoverState, HoverTransition, InteractionController, MarkerEmphasis,
    SelectionChange, Tooltip,
};
use crate::resize::ResizeObserver;

/// Immutable snapshot of everything a frame needs.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub layout: Arc<Layout>,
    pub selection: Option<EntityId>,
    pub hover: Option<HoverState>,
}

impl ChartView {
    pub fn emphasis(&self, id: &EntityId, config: &ChartConfig) -> MarkerEmphasis {
        MarkerEmphasis::for_entity(
            id,
            self.selection.as_ref(),
            self.hover.as_ref(),
            &config.interaction,
        )
    }

    pub fn tooltip(&self, config: &ChartConfig) -> Option<Tooltip> {
        let hover = self.hover.as_ref()?;
        tooltip_for(hover, &self.layout, self.layout.width, &config.interaction)
    }
}

#[derive(Debug, Clone)]
pub enum LayoutTrigger {
    Resize(f64),
    Data(Arc<[PositionEntity]>),
}

pub struct ChartModel {
    config: Arc<ChartConfig>,
    entities: Arc<[PositionEntity]>,
    resize: ResizeObserver,
    layout: Arc<Layout>,
    interaction: InteractionController,
    detail: DetailLoader,
    order: Box<dyn DrawOrder + Send>,
}

impl ChartModel {
    pub fn new(config: Arc<ChartConfig>, order: Box<dyn DrawOrder + Send>) -> Self {
        let layout = Arc::new(Layout::empty(0.0, &config.geometry));
        Self {
            config,
            entities: Arc::from(Vec::new()),
            resize: ResizeObserver::new(),
            layout,
            interaction: InteractionController::new(),
            detail: DetailLoader::new(),
            order,
        }
    }

    pub fn config(&self) -> &Arc<ChartConfig> {
        &self.config
    }

    pub fn entities(&self) -> &Arc<[PositionEntity]> {
        &self.entities
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn width(&self) -> f64 {
        self.resize.width().unwrap_or(0.0)
    }

    pub fn view(&self) -> ChartView {
        ChartView {
            layout: Arc::clone(&self.layout),
            selection: self.interaction.selection().cloned(),
            hover: self.interaction.hover().cloned(),
        }
    }

    pub fn detail(&self) -> Option<&DetailRecord> {
        self.detail.current()
    }

    /// Applies a layout trigger. Returns whether a relayout happened.
    pub fn apply(&mut self, trigger: LayoutTrigger) -> bool {
        match trigger {
            LayoutTrigger::Resize(width) => {
                if self.resize.observe(width).is_none() {
                    return false;
                }
                debug!(target: "spectrum::layout", width, "container.resized");
            }
            LayoutTrigger::Data(entities) => {
                info!(target: "spectrum::layout", entities = entities.len(), "positions.replaced");
                self.entities = entities;
            }
        }
        self.relayout();
        true
    }

    pub fn set_entities(&mut self, entities: Vec<PositionEntity>) -> bool {
        self.apply(LayoutTrigger::Data(Arc::from(entities)))
    }

    pub fn resize(&mut self, width: f64) -> bool {
        self.apply(LayoutTrigger::Resize(width))
    }

    /// Swaps the draw order and rebuilds the layout with it.
    pub fn set_draw_order(&mut self, order: Box<dyn DrawOrder + Send>) {
        self.order = order;
        self.relayout();
    }

    fn relayout(&mut self) {
        let width = self.width();
        let next = layout(
            &self.entities,
            width,
            &self.config.geometry,
            self.order.as_mut(),
        );
        self.layout = Arc::new(next);
        // Cursor coordinates refer to the previous layout.
        self.interaction.hover_leave();
        let had_selection = self.interaction.selection().cloned();
        self.interaction.retain_present(&self.layout);
        if let Some(previous) = had_selection {
            if self.interaction.selection().is_none() {
                debug!(target: "spectrum::layout", entity = %previous, "selection dropped with its entity");
                self.detail.close();
            }
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> HoverTransition {
        let radius = self.config.geometry.radius + self.config.interaction.hover_radius_delta;
        self.interaction.pointer_move(&self.layout, x, y, radius)
    }

    pub fn pointer_leave(&mut self) -> HoverTransition {
        self.interaction.hover_leave()
    }

    pub fn hover_step(&mut self, direction: HoverDirection) -> HoverTransition {
        self.interaction.hover_step(&self.layout, direction)
    }

    /// Activates the marker under `(x, y)`, if any.
    pub fn click(&mut self, x: f64, y: f64) -> Option<DetailRequest> {
        let radius = self.config.geometry.radius + self.config.interaction.hover_radius_delta;
        let id = self.layout.hit_test(x, y, radius)?.entity.id.clone();
        self.select(id)
    }

    /// Selects `id` and opens a fresh detail record for it.
    pub fn select(&mut self, id: EntityId) -> Option<DetailRequest> {
        if self.layout.find(id.as_str()).is_none() {
            debug!(target: "spectrum::interaction", entity = %id, "ignoring selection of unknown entity");
            return None;
        }
        let change = self.interaction.select(id);
        self.on_selection_change(change)
    }

    pub fn activate_hovered(&mut self) -> Option<DetailRequest> {
        let change = self.interaction.activate_hovered();
        self.on_selection_change(change)
    }

    pub fn close(&mut self) {
        let change = self.interaction.close();
        self.on_selection_change(change);
    }

    fn on_selection_change(&mut self, change: SelectionChange) -> Option<DetailRequest> {
        match change {
            SelectionChange::Selected { current, .. } => self.detail.select(current),
            SelectionChange::Cleared(_) => {
                self.detail.close();
                None
            }
            SelectionChange::Unchanged => None,
        }
    }

    pub fn complete_member<E: Display>(
        &mut self,
        requested: &DetailRequest,
        result: Result<MemberDetail, E>,
    ) -> Commit {
        self.detail.complete_member(requested, result)
    }

    pub fn complete_statements<E: Display>(
        &mut self,
        requested: &DetailRequest,
        result: Result<Vec<StatementEvidence>, E>,
    ) -> Commit {
        self.detail.complete_statements(requested, result)
    }
}

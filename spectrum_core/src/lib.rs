//! Position layout and interaction engine for the issue-spectrum chart.
//!
//! Scores in `[-1, 1]` are mapped onto a horizontal axis and nudged vertically
//! until no two markers overlap. [`ChartModel`] owns the resulting layout
//! together with hover, selection and per-selection evidence state, and
//! [`build_scene`] turns a snapshot of it into drawable primitives.

pub mod chart;
pub mod chart_config;
pub mod detail;
pub mod draw_order;
pub mod geometry;
pub mod interaction;
pub mod resize;
pub mod scale;
pub mod scene;
pub mod svg;

pub use chart::{ChartModel, ChartView, LayoutTrigger};
pub use chart_config::{
    load_chart_config, load_chart_config_from_env, ChartConfig, ChartConfigError, GeometryConfig,
    InteractionConfig, Rgb,
};
pub use detail::{Commit, DetailLoader, DetailRecord, DetailRequest, EvidenceSlot, MemberSummary};
pub use draw_order::{DrawOrder, FixedOrder, InputOrder, ShuffledOrder};
pub use geometry::{center_and_size, layout, place, Layout, Placement, RawLayout};
pub use interaction::{
    HoverDirection, HoverState, HoverTransition, InteractionController, MarkerEmphasis,
    SelectionChange, Tooltip,
};
pub use resize::ResizeObserver;
pub use scale::ScaleMapper;
pub use scene::{build_scene, Scene, ScenePrimitive, SpectrumLabels};
pub use svg::render_svg;

pub use spectrum_schema as schema;

//! Configuration for the spectrum chart.
//!
//! Loaded from `chart_config.json` with support for an environment variable override.

use std::{
    collections::HashMap,
    env, fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use spectrum_schema::Category;

pub const BUILTIN_CHART_CONFIG: &str = include_str!("data/chart_config.json");
pub const CHART_CONFIG_ENV: &str = "SPECTRUM_CHART_CONFIG_PATH";

/// Root configuration for layout, interaction, axis and palette.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub geometry: GeometryConfig,
    pub interaction: InteractionConfig,
    pub axis: AxisConfig,
    pub palette: PaletteConfig,
}

impl ChartConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_CHART_CONFIG).expect("builtin chart config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, ChartConfigError> {
        let config: ChartConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ChartConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ChartConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ChartConfig::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ChartConfigError> {
        let geometry = &self.geometry;
        if !(geometry.radius.is_finite() && geometry.radius > 0.0) {
            return Err(ChartConfigError::Invalid("geometry.radius must be positive"));
        }
        if !(geometry.padding.is_finite() && geometry.padding >= 0.0) {
            return Err(ChartConfigError::Invalid("geometry.padding must be non-negative"));
        }
        if geometry.max_attempts == 0 {
            return Err(ChartConfigError::Invalid("geometry.max_attempts must be at least 1"));
        }
        let non_negative = |value: f64| value.is_finite() && value >= 0.0;
        if !(non_negative(geometry.horizontal_margin) && non_negative(geometry.vertical_margin)) {
            return Err(ChartConfigError::Invalid("geometry margins must be non-negative"));
        }
        if !non_negative(geometry.min_height) {
            return Err(ChartConfigError::Invalid("geometry.min_height must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.interaction.dimmed_opacity) {
            return Err(ChartConfigError::Invalid("interaction.dimmed_opacity must be within [0, 1]"));
        }
        if !(self.axis.tick_step > 0.0) {
            return Err(ChartConfigError::Invalid("axis.tick_step must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ChartConfigError {
    #[error("failed to parse chart config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read chart config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid chart config: {0}")]
    Invalid(&'static str),
}

/// Marker size and the collision search bounds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub radius: f64,
    pub padding: f64,
    pub max_attempts: u32,
    pub horizontal_margin: f64,
    pub vertical_margin: f64,
    pub min_height: f64,
}

impl GeometryConfig {
    /// Minimum distance between two marker centers.
    pub fn min_separation(&self) -> f64 {
        2.0 * (self.radius + self.padding)
    }

    /// Vertical distance between successive search candidates.
    pub fn search_step(&self) -> f64 {
        2.0 * self.radius + self.padding
    }

    /// Half-extent a marker occupies around its center.
    pub fn clearance(&self) -> f64 {
        self.radius + self.padding
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            padding: 2.0,
            max_attempts: 50,
            horizontal_margin: 50.0,
            vertical_margin: 40.0,
            min_height: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub hover_radius_delta: f64,
    pub dimmed_opacity: f64,
    pub stroke_width: f64,
    pub selected_stroke_width: f64,
    pub selected_radius_delta: f64,
    pub tooltip_offset: f64,
    pub tooltip_width: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hover_radius_delta: 3.0,
            dimmed_opacity: 0.35,
            stroke_width: 1.0,
            selected_stroke_width: 3.0,
            selected_radius_delta: 2.0,
            tooltip_offset: 12.0,
            tooltip_width: 220.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub tick_step: f64,
    pub gridlines: Vec<f64>,
    /// Distance of the axis below the lowest marker band.
    pub axis_offset: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            tick_step: 0.5,
            gridlines: vec![-0.75, -0.5, -0.25, 0.25, 0.5, 0.75],
            axis_offset: 24.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub categories: HashMap<String, Rgb>,
    pub fallback: Rgb,
    pub stroke: Rgb,
    pub selected_stroke: Rgb,
    pub gradient_left: Rgb,
    pub gradient_center: Rgb,
    pub gradient_right: Rgb,
    pub center_line: Rgb,
    pub gridline: Rgb,
    pub axis: Rgb,
    pub label: Rgb,
}

impl PaletteConfig {
    pub fn fill_for(&self, category: &Category) -> Rgb {
        self.categories
            .get(category.tag())
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let mut categories = HashMap::new();
        categories.insert("D".to_string(), Rgb::new(0x25, 0x63, 0xeb));
        categories.insert("R".to_string(), Rgb::new(0xdc, 0x26, 0x26));
        categories.insert("I".to_string(), Rgb::new(0x7c, 0x3a, 0xed));
        Self {
            categories,
            fallback: Rgb::new(0x6b, 0x72, 0x80),
            stroke: Rgb::new(0xff, 0xff, 0xff),
            selected_stroke: Rgb::new(0x11, 0x18, 0x27),
            gradient_left: Rgb::new(0xdb, 0xea, 0xfe),
            gradient_center: Rgb::new(0xf9, 0xfa, 0xfb),
            gradient_right: Rgb::new(0xfe, 0xe2, 0xe2),
            center_line: Rgb::new(0x9c, 0xa3, 0xaf),
            gridline: Rgb::new(0xe5, 0xe7, 0xeb),
            axis: Rgb::new(0x37, 0x41, 0x51),
            label: Rgb::new(0x4b, 0x55, 0x63),
        }
    }
}

/// 24-bit color written as `#rrggbb` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&value).ok_or_else(|| format!("invalid color '{value}', expected #rrggbb"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Load chart configuration from the environment override or the builtin defaults.
pub fn load_chart_config_from_env() -> (Arc<ChartConfig>, Option<PathBuf>) {
    let override_path = env::var(CHART_CONFIG_ENV).ok().map(PathBuf::from);
    load_chart_config(override_path.as_deref())
}

/// Load chart configuration from `path`, falling back to the builtin config on failure.
pub fn load_chart_config(path: Option<&Path>) -> (Arc<ChartConfig>, Option<PathBuf>) {
    if let Some(path) = path {
        match ChartConfig::from_file(path) {
            Ok(config) => {
                tracing::info!(
                    target: "spectrum::config",
                    path = %path.display(),
                    "chart_config.loaded=file"
                );
                return (Arc::new(config), Some(path.to_path_buf()));
            }
            Err(err) => {
                tracing::warn!(
                    target: "spectrum::config",
                    path = %path.display(),
                    error = %err,
                    "chart_config.load_failed"
                );
            }
        }
    }

    let config = ChartConfig::builtin();
    tracing::info!(target: "spectrum::config", "chart_config.loaded=builtin");
    (config, None)
}

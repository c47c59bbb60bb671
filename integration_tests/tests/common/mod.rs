#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Once};

use anyhow::Context;
use spectrum_core::{load_chart_config_from_env, ChartConfig, ChartModel, FixedOrder, InputOrder};
use spectrum_runtime::{EntityId, PositionsResponse};

static INIT: Once = Once::new();

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Points `SPECTRUM_CHART_CONFIG_PATH` at the test override config.
pub fn ensure_test_config() -> Arc<ChartConfig> {
    INIT.call_once(|| {
        let config_path = fixture_path("test_chart_config.json");
        debug_assert!(
            config_path.exists(),
            "missing test chart config at {}",
            config_path.display()
        );
        std::env::set_var(spectrum_core::chart_config::CHART_CONFIG_ENV, &config_path);
    });
    let (config, path) = load_chart_config_from_env();
    assert!(path.is_some(), "test chart config should load from the env override");
    config
}

pub fn load_positions(name: &str) -> anyhow::Result<PositionsResponse> {
    let path = fixture_path(name);
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing fixture {}", path.display()))
}

/// Chart over `fixture` at `width`, processing entities in input order.
pub fn chart_from_fixture(name: &str, width: f64) -> anyhow::Result<ChartModel> {
    let payload = load_positions(name)?;
    let mut chart = ChartModel::new(ChartConfig::builtin(), Box::new(InputOrder));
    chart.resize(width);
    chart.set_entities(payload.positions);
    Ok(chart)
}

pub fn chart_with_order(name: &str, width: f64, order: Vec<usize>) -> anyhow::Result<ChartModel> {
    let payload = load_positions(name)?;
    let mut chart = ChartModel::new(ChartConfig::builtin(), Box::new(FixedOrder(order)));
    chart.resize(width);
    chart.set_entities(payload.positions);
    Ok(chart)
}

pub fn id(value: &str) -> EntityId {
    EntityId::from(value)
}

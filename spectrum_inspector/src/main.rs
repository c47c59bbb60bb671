use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use spectrum_core::{
    build_scene, load_chart_config, render_svg, ChartModel, DrawOrder, ShuffledOrder,
    SpectrumLabels,
};
use spectrum_runtime::{find_issue, spawn_detail_fetch, ApiClient, Chamber, DetailOutcome, IssueSummary};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{info, trace, warn};

mod app;
mod ui;

use app::{FetchCommand, InspectorApp, PositionsEvent, PositionsQuery};

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(text) = String::from_utf8(buf.to_vec()) {
            let _ = self.sender.send(text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal explorer for legislator positions on an issue spectrum", long_about = None)]
struct Cli {
    /// Base URL of the positions API.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    api_base: String,
    /// Issue slug to chart.
    #[arg(long, default_value = "trade-policy")]
    issue: String,
    /// Restrict to one chamber (senate or house).
    #[arg(long)]
    chamber: Option<Chamber>,
    /// Seed for the marker draw order; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Chart config JSON; falls back to SPECTRUM_CHART_CONFIG_PATH, then the builtin config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Render the chart to an SVG file and exit instead of opening the UI.
    #[arg(long)]
    export_svg: Option<PathBuf>,
    /// Container width in pixels for --export-svg.
    #[arg(long, default_value_t = 960.0)]
    width: f64,
    /// Print the issues the API knows about and exit.
    #[arg(long)]
    list_issues: bool,
}

impl Cli {
    fn draw_order(&self) -> Box<dyn DrawOrder + Send> {
        match self.seed {
            Some(seed) => Box::new(ShuffledOrder::seeded(seed)),
            None => Box::new(ShuffledOrder::from_entropy()),
        }
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            std::env::var(spectrum_core::chart_config::CHART_CONFIG_ENV)
                .ok()
                .map(PathBuf::from)
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.list_issues || cli.export_svg.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .with_writer(std::io::stderr)
            .init();
        let api = ApiClient::new(cli.api_base.clone())?;
        if let (false, Some(path)) = (cli.list_issues, cli.export_svg.clone()) {
            confirm_issue(&api, &cli.issue).await?;
            return export_svg(&cli, &api, path).await;
        }
        return list_issues(&api).await;
    }

    let (log_tx, log_rx) = mpsc::channel::<String>();
    let log_writer_tx = log_tx.clone();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_writer(move || ChannelWriter {
            sender: log_writer_tx.clone(),
        })
        .init();

    let (config, _) = load_chart_config(cli.config_path().as_deref());
    let api = Arc::new(ApiClient::new(cli.api_base.clone())?);
    confirm_issue(&api, &cli.issue).await?;
    info!("Loading positions for '{}' from {}", cli.issue, api.base_url());

    let (fetch_tx, fetch_rx) = unbounded_channel::<FetchCommand>();
    let (positions_tx, positions_rx) = unbounded_channel::<PositionsEvent>();
    let (detail_tx, detail_rx) = unbounded_channel::<DetailOutcome>();

    let query = PositionsQuery {
        issue: cli.issue.clone(),
        chamber: cli.chamber,
    };
    let chart = ChartModel::new(config, cli.draw_order());
    let ui_fetch_tx = fetch_tx.clone();
    let ui_handle = std::thread::spawn(move || -> color_eyre::Result<()> {
        let app = InspectorApp::new(chart, query, ui_fetch_tx, positions_rx, detail_rx, log_rx)?;
        app.run()
    });
    drop(fetch_tx);

    run_fetch_pump(api, fetch_rx, positions_tx, detail_tx).await;

    match ui_handle.join() {
        Ok(result) => result,
        Err(_) => Err(color_eyre::eyre::eyre!("inspector UI thread panicked")),
    }
}

/// Serves fetch commands from the UI thread until it hangs up.
async fn run_fetch_pump(
    api: Arc<ApiClient>,
    mut commands: UnboundedReceiver<FetchCommand>,
    positions: UnboundedSender<PositionsEvent>,
    details: UnboundedSender<DetailOutcome>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            FetchCommand::Positions(query) => {
                let api = Arc::clone(&api);
                let sender = positions.clone();
                tokio::spawn(async move {
                    let result = api.positions(&query.issue, query.chamber).await;
                    if let Err(err) = &result {
                        warn!(issue = %query.issue, "Failed to load positions: {}", err);
                    }
                    let _ = sender.send(PositionsEvent { query, result });
                });
            }
            FetchCommand::Detail(request) => {
                trace!(entity = %request.entity, "detail.command");
                spawn_detail_fetch(Arc::clone(&api), request, details.clone());
            }
            FetchCommand::Shutdown => {
                info!("Inspector requested shutdown");
                break;
            }
        }
    }
}

async fn list_issues(api: &ApiClient) -> Result<()> {
    let index = api
        .issues()
        .await
        .wrap_err_with(|| format!("failed to load the issue index from {}", api.base_url()))?;
    for issue in &index {
        println!("{}\t{}", issue.slug, issue.name);
    }
    Ok(())
}

/// Rejects an issue the index does not know. An unreachable index is only a warning;
/// the positions request reports its own failure.
async fn confirm_issue(api: &ApiClient, issue: &str) -> Result<()> {
    match api.issues().await {
        Ok(index) => check_issue(&index, issue),
        Err(err) => {
            warn!("Could not load the issue index, skipping the issue check: {}", err);
            Ok(())
        }
    }
}

fn check_issue(index: &[IssueSummary], issue: &str) -> Result<()> {
    if let Some(summary) = find_issue(index, issue) {
        info!(issue = %summary.slug, name = %summary.name, "issue.resolved");
        return Ok(());
    }
    if index.is_empty() {
        return Err(eyre!("unknown issue '{issue}'; the API lists no issues"));
    }
    let known: Vec<&str> = index.iter().map(|summary| summary.slug.as_str()).collect();
    Err(eyre!("unknown issue '{issue}'; known issues: {}", known.join(", ")))
}

async fn export_svg(cli: &Cli, api: &ApiClient, path: PathBuf) -> Result<()> {
    let (config, _) = load_chart_config(cli.config_path().as_deref());
    let payload = api
        .positions(&cli.issue, cli.chamber)
        .await
        .wrap_err_with(|| format!("failed to load positions for '{}'", cli.issue))?;

    let labels = SpectrumLabels::new(
        payload.issue.spectrum_left_label.clone(),
        payload.issue.spectrum_right_label.clone(),
    );
    let mut chart = ChartModel::new(Arc::clone(&config), cli.draw_order());
    chart.resize(cli.width);
    chart.set_entities(payload.positions);

    let scene = build_scene(&chart.view(), &config, &labels);
    std::fs::write(&path, render_svg(&scene))
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    info!(
        path = %path.display(),
        markers = chart.layout().len(),
        height = chart.layout().height,
        "svg.exported"
    );
    Ok(())
}

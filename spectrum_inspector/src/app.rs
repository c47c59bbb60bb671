use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use spectrum_core::{build_scene, ChartModel, DetailRequest, HoverDirection, ShuffledOrder};
use spectrum_runtime::{ApiResult, Chamber, DetailOutcome, PositionsResponse};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, trace, warn};

use crate::ui::{chart_inner, draw_ui, split_regions, surface_width, FrameContent, UiState};

const FRAME_INTERVAL: Duration = Duration::from_millis(50);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Which slice of positions the chart shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionsQuery {
    pub issue: String,
    pub chamber: Option<Chamber>,
}

impl PositionsQuery {
    fn next_chamber(&self) -> Self {
        let chamber = match self.chamber {
            None => Some(Chamber::Senate),
            Some(Chamber::Senate) => Some(Chamber::House),
            Some(Chamber::House) => None,
        };
        Self {
            issue: self.issue.clone(),
            chamber,
        }
    }
}

#[derive(Debug)]
pub struct PositionsEvent {
    pub query: PositionsQuery,
    pub result: ApiResult<PositionsResponse>,
}

#[derive(Debug, Clone)]
pub enum FetchCommand {
    Positions(PositionsQuery),
    Detail(DetailRequest),
    Shutdown,
}

/// Folds a positions response into the chart and header state.
///
/// Responses for a query other than `current` are dropped. A failed response
/// empties the chart so markers from the previous query never sit under the
/// error banner. Returns whether the event was applied.
fn apply_positions_event(
    chart: &mut ChartModel,
    ui_state: &mut UiState,
    current: &PositionsQuery,
    event: PositionsEvent,
) -> bool {
    if event.query != *current {
        debug!(issue = %event.query.issue, chamber = ?event.query.chamber, "Dropping positions for a superseded query");
        return false;
    }
    match event.result {
        Ok(payload) => {
            info!(
                "Loaded {} positions for '{}'",
                payload.positions.len(),
                event.query.issue
            );
            ui_state.set_positions(&payload);
            chart.set_entities(payload.positions);
        }
        Err(err) => {
            error!("Failed to load positions: {}", err);
            ui_state.set_failed(err.to_string());
            chart.set_entities(Vec::new());
        }
    }
    true
}

pub struct InspectorApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    chart: ChartModel,
    query: PositionsQuery,
    command_sender: UnboundedSender<FetchCommand>,
    positions: UnboundedReceiver<PositionsEvent>,
    details: UnboundedReceiver<DetailOutcome>,
    log_receiver: Receiver<String>,
}

impl InspectorApp {
    pub fn new(
        chart: ChartModel,
        query: PositionsQuery,
        command_sender: UnboundedSender<FetchCommand>,
        positions: UnboundedReceiver<PositionsEvent>,
        details: UnboundedReceiver<DetailOutcome>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let mut stdout = std::io::stdout();
        crossterm::terminal::enable_raw_mode()?;
        execute!(stdout, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            ui_state: UiState::default(),
            chart,
            query,
            command_sender,
            positions,
            details,
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        self.request_positions();
        let mut last_draw = Instant::now() - FRAME_INTERVAL;

        let outcome = loop {
            self.drain_channels();

            if last_draw.elapsed() >= FRAME_INTERVAL {
                if let Err(err) = self.draw() {
                    break Err(err);
                }
                last_draw = Instant::now();
            }

            match self.poll_input() {
                Ok(true) => break Ok(()),
                Ok(false) => {}
                Err(err) => break Err(err),
            }
        };

        execute!(self.terminal.backend_mut(), DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        let _ = self.command_sender.send(FetchCommand::Shutdown);
        outcome
    }

    fn drain_channels(&mut self) {
        while let Ok(event) = self.positions.try_recv() {
            self.apply_positions(event);
        }

        while let Ok(outcome) = self.details.try_recv() {
            outcome.commit(&mut self.chart);
        }

        while let Ok(line) = self.log_receiver.try_recv() {
            self.ui_state.push_log(line);
        }
    }

    fn apply_positions(&mut self, event: PositionsEvent) {
        apply_positions_event(&mut self.chart, &mut self.ui_state, &self.query, event);
    }

    fn draw(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        let chart_area = chart_inner(split_regions(size).chart);
        if self.chart.resize(surface_width(chart_area)) {
            trace!(width = self.chart.width(), "chart surface resized");
        }

        let config = self.chart.config().clone();
        let view = self.chart.view();
        let scene = build_scene(&view, &config, &self.ui_state.labels());
        let tooltip = view.tooltip(&config);
        self.ui_state.set_surface(chart_area, scene.height);

        let content = FrameContent {
            scene: &scene,
            tooltip: tooltip.as_ref(),
            detail: self.chart.detail(),
            query: &self.query,
        };
        let ui_state = &self.ui_state;
        self.terminal
            .draw(|frame| draw_ui(frame, ui_state, &content))?;
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn poll_input(&mut self) -> Result<bool> {
        if !event::poll(POLL_INTERVAL)? {
            return Ok(false);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(self.handle_key(key)),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                self.chart.close();
            }
            KeyCode::Right | KeyCode::Down => {
                self.chart.hover_step(HoverDirection::Next);
            }
            KeyCode::Left | KeyCode::Up => {
                self.chart.hover_step(HoverDirection::Previous);
            }
            KeyCode::Enter => {
                if let Some(request) = self.chart.activate_hovered() {
                    self.request_detail(request);
                }
            }
            KeyCode::Char('c') => {
                self.query = self.query.next_chamber();
                let label = self.query.chamber.map_or("all chambers", Chamber::as_query);
                self.ui_state.push_log(format!("Switched to {label}"));
                self.request_positions();
            }
            KeyCode::Char('s') => {
                self.chart
                    .set_draw_order(Box::new(ShuffledOrder::from_entropy()));
                self.ui_state.push_log("Reshuffled marker draw order");
            }
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = self.ui_state.cell_to_surface(mouse.column, mouse.row);
        match (mouse.kind, point) {
            (MouseEventKind::Moved, Some((x, y))) => {
                self.chart.pointer_move(x, y);
            }
            (MouseEventKind::Moved, None) => {
                self.chart.pointer_leave();
            }
            (MouseEventKind::Down(MouseButton::Left), Some((x, y))) => {
                if let Some(request) = self.chart.click(x, y) {
                    self.request_detail(request);
                }
            }
            _ => {}
        }
    }

    fn request_positions(&mut self) {
        self.ui_state.set_loading();
        if let Err(err) = self
            .command_sender
            .send(FetchCommand::Positions(self.query.clone()))
        {
            error!("Failed to request positions: {}", err);
            self.ui_state.set_failed("fetch worker is not running".to_string());
        }
    }

    fn request_detail(&self, request: DetailRequest) {
        let entity = request.entity.clone();
        if let Err(err) = self.command_sender.send(FetchCommand::Detail(request)) {
            warn!(entity = %entity, "Failed to request detail: {}", err);
        } else {
            trace!(entity = %entity, "Detail requested");
        }
    }
}

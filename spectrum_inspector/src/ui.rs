use std::collections::{BTreeMap, VecDeque};

use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use spectrum_core::scene::{MarkerPrimitive, TextAnchor};
use spectrum_core::{DetailRecord, Rgb, Scene, ScenePrimitive, SpectrumLabels, Tooltip};
use spectrum_runtime::{IssueHeader, PositionsResponse};

use crate::app::PositionsQuery;

/// Surface pixels covered by one terminal column.
pub const CELL_PX: f64 = 8.0;
/// Ring spacing used to fill marker discs on the braille canvas.
const FILL_STEP: f64 = 1.5;
const BLACK: Rgb = Rgb::new(0, 0, 0);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

pub struct UiState {
    pub logs: VecDeque<String>,
    pub max_logs: usize,
    pub issue: Option<IssueHeader>,
    pub total: usize,
    pub by_category: BTreeMap<String, u32>,
    pub status: LoadStatus,
    chart_area: Rect,
    surface_height: f64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            logs: VecDeque::new(),
            max_logs: 6,
            issue: None,
            total: 0,
            by_category: BTreeMap::new(),
            status: LoadStatus::Loading,
            chart_area: Rect::default(),
            surface_height: 0.0,
        }
    }
}

impl UiState {
    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn set_loading(&mut self) {
        self.status = LoadStatus::Loading;
    }

    /// Shows the error banner and forgets the previous issue's header stats.
    pub fn set_failed(&mut self, message: String) {
        self.issue = None;
        self.total = 0;
        self.by_category.clear();
        self.status = LoadStatus::Failed(message);
    }

    pub fn set_positions(&mut self, payload: &PositionsResponse) {
        self.issue = Some(payload.issue.clone());
        self.total = payload
            .stats
            .total
            .map_or(payload.positions.len(), |total| total as usize);
        self.by_category = payload.stats.by_category.clone();
        self.status = LoadStatus::Ready;
    }

    pub fn labels(&self) -> SpectrumLabels {
        self.issue
            .as_ref()
            .map(|issue| {
                SpectrumLabels::new(
                    issue.spectrum_left_label.clone(),
                    issue.spectrum_right_label.clone(),
                )
            })
            .unwrap_or_default()
    }

    /// Records where the chart is drawn and how tall its surface is.
    pub fn set_surface(&mut self, chart_area: Rect, surface_height: f64) {
        self.chart_area = chart_area;
        self.surface_height = surface_height;
    }

    /// Maps a terminal cell to the centre of the surface region it covers.
    pub fn cell_to_surface(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        let area = self.chart_area;
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let x = (f64::from(column - area.x) + 0.5) * CELL_PX;
        let y = (f64::from(row - area.y) + 0.5) / f64::from(area.height) * self.surface_height;
        Some((x, y))
    }

    fn surface_to_cell(&self, x: f64, y: f64) -> (u16, u16) {
        let area = self.chart_area;
        let column = (x / CELL_PX).floor().max(0.0) as u16;
        let row = if self.surface_height > 0.0 {
            (y / self.surface_height * f64::from(area.height)).floor().max(0.0) as u16
        } else {
            0
        };
        (area.x.saturating_add(column), area.y.saturating_add(row))
    }
}

/// Per-frame inputs taken from the chart model.
pub struct FrameContent<'a> {
    pub scene: &'a Scene,
    pub tooltip: Option<&'a Tooltip>,
    pub detail: Option<&'a DetailRecord>,
    pub query: &'a PositionsQuery,
}

pub struct Regions {
    pub header: Rect,
    pub chart: Rect,
    pub detail: Rect,
    pub logs: Rect,
}

pub fn split_regions(area: Rect) -> Regions {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(8),
        ])
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(rows[1]);
    Regions {
        header: rows[0],
        chart: body[0],
        detail: body[1],
        logs: rows[2],
    }
}

pub fn chart_inner(chart: Rect) -> Rect {
    chart.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    })
}

pub fn surface_width(area: Rect) -> f64 {
    f64::from(area.width) * CELL_PX
}

pub fn draw_ui(frame: &mut Frame, state: &UiState, content: &FrameContent<'_>) {
    let regions = split_regions(frame.size());
    draw_header(frame, regions.header, state, content.query);
    draw_chart(frame, regions.chart, content.scene);
    if let Some(tooltip) = content.tooltip {
        draw_tooltip(frame, state, tooltip);
    }
    draw_detail(frame, regions.detail, content.detail);
    draw_logs(frame, regions.logs, state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState, query: &PositionsQuery) {
    let title = state
        .issue
        .as_ref()
        .map(|issue| issue.name.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| query.issue.clone());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Issue Spectrum: {title}"));

    let chamber = query.chamber.map_or("all chambers", |chamber| chamber.as_query());
    let status = match &state.status {
        LoadStatus::Loading => Span::styled("Loading", Style::default().fg(Color::Yellow)),
        LoadStatus::Ready => Span::styled(
            format!("{} positions", state.total),
            Style::default().fg(Color::Green),
        ),
        LoadStatus::Failed(message) => Span::styled(
            format!("Failed to load positions: {message}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    let mut first = vec![status, Span::raw(format!(" | {chamber}"))];
    for (category, count) in &state.by_category {
        first.push(Span::raw(format!(" | {category} {count}")));
    }
    let hints = Line::from(vec![
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" hover  "),
        Span::styled("enter", Style::default().fg(Color::Yellow)),
        Span::raw(" select  "),
        Span::styled("esc", Style::default().fg(Color::Yellow)),
        Span::raw(" close  "),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(" chamber  "),
        Span::styled("s", Style::default().fg(Color::Yellow)),
        Span::raw(" reshuffle  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" exit"),
    ]);
    let text = Paragraph::new(vec![Line::from(first), hints]).wrap(Wrap { trim: true });
    frame.render_widget(block, area);
    frame.render_widget(
        text,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_chart(frame: &mut Frame, area: Rect, scene: &Scene) {
    let block = Block::default().borders(Borders::ALL).title("Positions");
    let width = scene.width.max(1.0);
    let height = scene.height.max(1.0);
    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for primitive in &scene.primitives {
                paint_primitive(ctx, primitive, height);
            }
        });
    frame.render_widget(canvas, area);
}

fn paint_primitive(ctx: &mut Context, primitive: &ScenePrimitive, height: f64) {
    match primitive {
        // The terminal has no gradient fill; the end labels carry the hint.
        ScenePrimitive::Background { .. } => {}
        ScenePrimitive::Rule {
            from,
            to,
            color,
            dash,
            ..
        } => {
            let segments = match dash {
                Some((on, off)) => dash_segments((from.x, from.y), (to.x, to.y), *on, *off),
                None => vec![((from.x, from.y), (to.x, to.y))],
            };
            for ((x1, y1), (x2, y2)) in segments {
                ctx.draw(&CanvasLine {
                    x1,
                    y1: height - y1,
                    x2,
                    y2: height - y2,
                    color: color_of(*color),
                });
            }
        }
        ScenePrimitive::Text {
            at,
            text,
            color,
            anchor,
            ..
        } => {
            let span = text.chars().count() as f64 * CELL_PX;
            let x = match anchor {
                TextAnchor::Start => at.x,
                TextAnchor::Middle => at.x - span / 2.0,
                TextAnchor::End => at.x - span,
            };
            ctx.print(
                x.max(0.0),
                height - at.y,
                Line::styled(text.clone(), Style::default().fg(color_of(*color))),
            );
        }
        ScenePrimitive::Marker(marker) => paint_marker(ctx, marker, height),
    }
}

fn paint_marker(ctx: &mut Context, marker: &MarkerPrimitive, height: f64) {
    let fill = color_of(marker.fill.mix(BLACK, 1.0 - marker.opacity));
    let y = height - marker.center.y;
    let mut radius = marker.radius;
    while radius > 0.0 {
        ctx.draw(&Circle {
            x: marker.center.x,
            y,
            radius,
            color: fill,
        });
        radius -= FILL_STEP;
    }
    if marker.selected || marker.hovered {
        ctx.draw(&Circle {
            x: marker.center.x,
            y,
            radius: marker.radius + marker.stroke_width,
            color: color_of(marker.stroke),
        });
    }
}

fn draw_tooltip(frame: &mut Frame, state: &UiState, tooltip: &Tooltip) {
    let bounds = frame.size();
    let (column, row) = state.surface_to_cell(tooltip.x, tooltip.y);
    let longest = tooltip
        .lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as u16;
    let width = ((tooltip.width / CELL_PX).round() as u16)
        .max(longest + 2)
        .min(bounds.width);
    let height = (tooltip.lines.len() as u16 + 2).min(bounds.height);
    let x = column.min(bounds.x + bounds.width.saturating_sub(width));
    let y = row.min(bounds.y + bounds.height.saturating_sub(height));
    let area = Rect::new(x, y, width, height);

    let lines: Vec<Line> = tooltip
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                Line::from(Span::styled(
                    line.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(line.clone())
            }
        })
        .collect();
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_detail(frame: &mut Frame, area: Rect, detail: Option<&DetailRecord>) {
    let block = Block::default().borders(Borders::ALL).title("Evidence");
    let lines = match detail {
        None => vec![Line::from(Span::styled(
            "Click a marker or press enter to see votes and statements.",
            Style::default().fg(Color::DarkGray),
        ))],
        Some(record) => detail_lines(record),
    };
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn detail_lines(record: &DetailRecord) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();

    match &record.member {
        Some(member) => {
            lines.push(Line::from(Span::styled(
                member.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            let chamber = member.chamber.map_or("", |chamber| chamber.as_query());
            lines.push(Line::from(format!(
                "{}-{} {}",
                member.party, member.state, chamber
            )));
        }
        None => lines.push(Line::from(record.entity.to_string())),
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Votes", heading)));
    if record.votes.is_loading {
        lines.push(Line::from(Span::styled("Loading votes...", muted)));
    } else if record.votes.is_empty_state() {
        lines.push(Line::from(Span::styled("No recorded votes on this issue.", muted)));
    } else {
        for vote in &record.votes.items {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", vote.vote.label()), vote_style(vote.vote)),
                Span::raw(format!("{} {}", vote.bill_id, vote.bill_title)),
            ]));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Statements", heading)));
    if record.statements.is_loading {
        lines.push(Line::from(Span::styled("Loading statements...", muted)));
    } else if record.statements.is_empty_state() {
        lines.push(Line::from(Span::styled("No statements found.", muted)));
    } else {
        for statement in &record.statements.items {
            let summary = statement
                .title
                .clone()
                .unwrap_or_else(|| statement.text.clone());
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", statement.source_date), muted),
                Span::raw(summary),
            ]));
        }
    }
    lines
}

fn vote_style(vote: spectrum_runtime::VoteChoice) -> Style {
    use spectrum_runtime::VoteChoice;
    match vote {
        VoteChoice::Yes => Style::default().fg(Color::Green),
        VoteChoice::No => Style::default().fg(Color::Red),
        VoteChoice::Abstain | VoteChoice::NotVoting => Style::default().fg(Color::DarkGray),
    }
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn color_of(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

type Segment = ((f64, f64), (f64, f64));

/// Splits a line into `on`-length dashes separated by `off`-length gaps.
fn dash_segments(from: (f64, f64), to: (f64, f64), on: f64, off: f64) -> Vec<Segment> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f64::EPSILON || on <= 0.0 || off < 0.0 {
        return vec![(from, to)];
    }
    let (ux, uy) = (dx / length, dy / length);
    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + on).min(length);
        segments.push((
            (from.0 + ux * start, from.1 + uy * start),
            (from.0 + ux * end, from.1 + uy * end),
        ));
        start = end + off;
    }
    segments
}

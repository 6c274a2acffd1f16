//! Ratatui-based terminal UI.
//!
//! The TUI renders the averaged trend chart for one region and lets the user
//! switch regions, change the lookback window, and inspect individual data
//! points with the mouse: a vertical crosshair tracks the pointer and a
//! tooltip reports the nearest averaged point across all parties.
//!
//! Fetches run on a worker thread and report back over a channel tagged with
//! a generation counter; a result from a superseded fetch (e.g. the user
//! switched regions while it was in flight) is discarded so stale data is
//! never shown under a newer region's label.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{self, ChartData};
use crate::chart::locate;
use crate::chart::scale::{self, LinearScale, TimeScale};
use crate::data::PollClient;
use crate::domain::{AveragedPoint, ChartExtent, Party, RawPoll, ViewConfig, ZoomLevel};
use crate::error::PollError;

mod plotters_chart;

use plotters_chart::{PartySeries, TrendPlottersChart};

/// Start the TUI.
pub fn run(config: ViewConfig) -> Result<(), PollError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| PollError::Terminal(format!("failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse
/// capture) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, PollError> {
        enable_raw_mode()
            .map_err(|e| PollError::Terminal(format!("failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(PollError::Terminal(format!(
                "failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Fetch lifecycle for the displayed region.
enum FetchState {
    /// Nothing fetched yet, or the store had no rows (placeholder text).
    NoData(String),
    Loading,
    Ready(ChartData),
    /// Terminal for this fetch attempt; no automatic retry.
    Error(String),
}

/// A completed background fetch.
struct FetchMessage {
    generation: u64,
    region: String,
    result: Result<Vec<RawPoll>, PollError>,
}

/// Cached zoom-filtered view, keyed on the inputs that invalidate it.
struct WindowCache {
    version: u64,
    zoom: ZoomLevel,
    view: pipeline::WindowView,
}

/// Geometry of the last drawn chart, kept for pointer lookups.
struct ChartLayout {
    rect: Rect,
    time: TimeScale,
}

struct App {
    config: ViewConfig,
    client: PollClient,
    regions: Vec<String>,
    region_idx: usize,
    state: FetchState,
    /// Current fetch generation; results tagged with an older value are stale.
    generation: u64,
    next_version: u64,
    /// Injected "now" for window cutoffs; refreshed when new data lands.
    today: NaiveDate,
    tx: Sender<FetchMessage>,
    rx: Receiver<FetchMessage>,
    window_cache: Option<WindowCache>,
    /// Index into the cached window's points under the crosshair.
    hover: Option<usize>,
    layout: Option<ChartLayout>,
    status: String,
}

impl App {
    fn new(config: ViewConfig) -> Self {
        let client = PollClient::from_env(config.api_base.as_deref());

        let mut regions = match client.fetch_regions() {
            Ok(regions) if !regions.is_empty() => regions,
            Ok(_) => vec![config.region.clone()],
            Err(err) => {
                log::warn!("region list unavailable: {err}");
                vec![config.region.clone()]
            }
        };
        let region_idx = match regions.iter().position(|r| r == &config.region) {
            Some(idx) => idx,
            None => {
                regions.push(config.region.clone());
                regions.len() - 1
            }
        };

        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            config,
            client,
            regions,
            region_idx,
            state: FetchState::NoData(String::new()),
            generation: 0,
            next_version: 0,
            today: Local::now().date_naive(),
            tx,
            rx,
            window_cache: None,
            hover: None,
            layout: None,
            status: String::new(),
        };
        app.start_fetch();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), PollError> {
        let mut needs_redraw = true;
        loop {
            // Drain completed fetches first so the redraw reflects them.
            while let Ok(msg) = self.rx.try_recv() {
                self.on_fetch_message(msg);
                needs_redraw = true;
            }

            if needs_redraw {
                self.ensure_window();
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| PollError::Terminal(format!("terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| PollError::Terminal(format!("event poll error: {e}")))?
            {
                continue;
            }

            match event::read()
                .map_err(|e| PollError::Terminal(format!("event read error: {e}")))?
            {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    if self.handle_mouse(mouse) {
                        needs_redraw = true;
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.cycle_region(-1),
            KeyCode::Right => self.cycle_region(1),
            KeyCode::Up => self.set_zoom(self.config.zoom.zoom_out()),
            KeyCode::Down => self.set_zoom(self.config.zoom.zoom_in()),
            KeyCode::Char('1') => self.set_zoom(ZoomLevel::OneMonth),
            KeyCode::Char('2') => self.set_zoom(ZoomLevel::ThreeMonths),
            KeyCode::Char('3') => self.set_zoom(ZoomLevel::SixMonths),
            KeyCode::Char('4') => self.set_zoom(ZoomLevel::OneYear),
            KeyCode::Char('5') => self.set_zoom(ZoomLevel::All),
            KeyCode::Char('r') => self.start_fetch(),
            _ => {}
        }
        false
    }

    /// Returns `true` when the crosshair state changed.
    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if !matches!(mouse.kind, MouseEventKind::Moved) {
            return false;
        }
        // Each move supersedes the previous one; only the latest result is
        // ever observable.
        let next = self.hover_at(mouse.column, mouse.row);
        if next != self.hover {
            self.hover = next;
            true
        } else {
            false
        }
    }

    /// Nearest windowed point under a terminal cell, `None` outside the plot.
    fn hover_at(&self, column: u16, row: u16) -> Option<usize> {
        let layout = self.layout.as_ref()?;
        let cache = self.window_cache.as_ref()?;
        let rect = layout.rect;
        let inside = column >= rect.x
            && column < rect.x + rect.width
            && row >= rect.y
            && row < rect.y + rect.height;
        if !inside {
            return None;
        }
        let pixel_x = f64::from(column - rect.x);
        locate::nearest_at_pixel(&cache.view.points, &layout.time, pixel_x)
    }

    fn set_zoom(&mut self, zoom: ZoomLevel) {
        if self.config.zoom == zoom {
            return;
        }
        // Changing zoom only invalidates the window view, never the series.
        self.config.zoom = zoom;
        self.hover = None;
        self.status = format!("window: {}", zoom.display_name());
    }

    fn cycle_region(&mut self, delta: i32) {
        if self.regions.len() < 2 {
            return;
        }
        let len = self.regions.len() as i32;
        self.region_idx = (self.region_idx as i32 + delta).rem_euclid(len) as usize;
        self.config.region = self.regions[self.region_idx].clone();
        self.start_fetch();
    }

    /// Kick off a background fetch for the current region, discarding any
    /// previously displayed series.
    fn start_fetch(&mut self) {
        self.generation += 1;
        self.state = FetchState::Loading;
        self.window_cache = None;
        self.hover = None;
        self.layout = None;
        self.status = format!("fetching polls for {}...", self.config.region);

        let tx = self.tx.clone();
        let client = self.client.clone();
        let region = self.config.region.clone();
        let generation = self.generation;
        thread::spawn(move || {
            let result = client.fetch_polls(&region);
            let _ = tx.send(FetchMessage {
                generation,
                region,
                result,
            });
        });
    }

    fn on_fetch_message(&mut self, msg: FetchMessage) {
        if msg.generation != self.generation {
            // A newer fetch (region switch or refresh) superseded this one.
            log::debug!("discarding stale fetch result for '{}'", msg.region);
            return;
        }

        self.window_cache = None;
        self.hover = None;

        match msg.result {
            Ok(raw) => {
                self.today = Local::now().date_naive();
                let version = self.next_version;
                match pipeline::build_chart_data(&msg.region, raw, self.config.alpha, version) {
                    Ok(data) => {
                        self.next_version += 1;
                        self.status =
                            format!("{} polls loaded for {}", data.raw.len(), data.region);
                        self.state = FetchState::Ready(data);
                    }
                    Err(err) => {
                        self.state = FetchState::Error(err.to_string());
                    }
                }
            }
            Err(PollError::EmptyDataset { region }) => {
                self.state = FetchState::NoData(format!("No polls published for '{region}' yet."));
                self.status = String::new();
            }
            Err(err) => {
                self.status = String::new();
                self.state = FetchState::Error(err.to_string());
            }
        }
    }

    /// Recompute the zoom-filtered view iff its inputs changed.
    fn ensure_window(&mut self) {
        let FetchState::Ready(data) = &self.state else {
            self.window_cache = None;
            return;
        };
        let key = (data.version, self.config.zoom);
        if self
            .window_cache
            .as_ref()
            .map(|c| (c.version, c.zoom))
            == Some(key)
        {
            return;
        }
        let view = pipeline::build_window_view(data, self.config.zoom, self.today);
        self.window_cache = Some(WindowCache {
            version: data.version,
            zoom: self.config.zoom,
            view,
        });
        self.hover = None;
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("polls", Style::default().fg(Color::Cyan)),
            Span::raw(" — election polling averages"),
        ]));

        let mut info = format!(
            "region: {} | window: {} | α = {:.2}",
            self.config.region,
            self.config.zoom.display_name(),
            self.config.alpha,
        );
        if let FetchState::Ready(data) = &self.state {
            info.push_str(&format!(" | polls: {}", data.raw.len()));
            if let (Some(first), Some(last)) = (data.averaged.first(), data.averaged.last()) {
                info.push_str(&format!(" | span: {} → {}", first.date, last.date));
            }
        }
        lines.push(Line::from(Span::styled(
            info,
            Style::default().fg(Color::Gray),
        )));

        if let FetchState::Ready(data) = &self.state {
            if let Some(latest) = crate::average::latest_summary(&data.averaged) {
                let leader = latest.values.leader();
                let (r, g, b) = leader.color();
                lines.push(Line::from(vec![
                    Span::raw("latest: "),
                    Span::styled(
                        format!(
                            "{} {}",
                            leader.display_name(),
                            crate::report::format_share(latest.values[leader])
                        ),
                        Style::default().fg(Color::Rgb(r, g, b)),
                    ),
                    Span::styled(
                        format!(" ({})", crate::report::format_change(latest.changes[leader])),
                        Style::default().fg(Color::Gray),
                    ),
                ]));
            }
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("Polling average — {}", self.config.region))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);
        self.layout = None;

        let placeholder: Option<(String, Color)> = match &self.state {
            FetchState::NoData(msg) if msg.is_empty() => {
                Some(("Waiting for data...".to_string(), Color::Gray))
            }
            FetchState::NoData(msg) => Some((msg.clone(), Color::Gray)),
            FetchState::Loading => Some(("Fetching polls...".to_string(), Color::Yellow)),
            FetchState::Error(msg) => Some((format!("Error: {msg}"), Color::Red)),
            FetchState::Ready(_) => None,
        };
        if let Some((text, color)) = placeholder {
            let msg = Paragraph::new(text).style(Style::default().fg(color));
            frame.render_widget(msg, inner);
            return;
        }

        let Some(cache) = self.window_cache.as_ref() else {
            return;
        };
        let view = &cache.view;
        // No chart on a zero-width domain: an empty window suppresses the
        // draw entirely.
        let Some(extent) = view.extent else {
            let msg = Paragraph::new("No polls in the selected window.")
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);

        let time = TimeScale::new(
            extent.start,
            extent.end,
            [0.0, f64::from(chart_rect.width.saturating_sub(1))],
        );
        let share = LinearScale::new(
            [0.0, extent.ceiling],
            [f64::from(chart_rect.height.saturating_sub(1)), 0.0],
        );

        let mut series = Vec::with_capacity(Party::COUNT);
        for party in Party::ALL {
            let line: Vec<(f64, f64)> = view
                .points
                .iter()
                .map(|p| (scale::date_days(p.date), p.shares[party]))
                .collect();
            let markers: Vec<(f64, f64)> = view
                .polls
                .iter()
                .map(|p| (scale::date_days(p.date), p.shares[party]))
                .collect();
            series.push(PartySeries {
                color: party.color(),
                line,
                markers,
            });
        }

        let mut x0 = scale::date_days(extent.start);
        let mut x1 = scale::date_days(extent.end);
        if x1 <= x0 {
            // Single-date window: pad so the degenerate chart still renders.
            x0 -= 1.0;
            x1 += 1.0;
        }

        let crosshair = self
            .hover
            .and_then(|idx| view.points.get(idx))
            .map(|p| scale::date_days(p.date));

        let widget = TrendPlottersChart {
            series: &series,
            x_bounds: [x0, x1],
            y_bounds: [0.0, extent.ceiling],
            majority: scale::shows_majority_line(extent.ceiling).then_some(scale::MAJORITY_SHARE),
            crosshair,
        };
        frame.render_widget(widget, chart_rect);

        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, &time, &share, &extent);
        }

        if let Some(point) = self.hover.and_then(|idx| view.points.get(idx)) {
            draw_tooltip(frame, chart_rect, &time, point);
        }

        self.layout = Some(ChartLayout {
            rect: chart_rect,
            time,
        });
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ region  ↑/↓ window  1-5 jump  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    time: &TimeScale,
    share: &LinearScale,
    extent: &ChartExtent,
) {
    let style = Style::default().fg(Color::Gray);

    // Dates label as "Mar 07" inside a year, "Mar 2024" across years.
    let span_days = (extent.end - extent.start).num_days();
    let fmt = if span_days > 370 { "%b %Y" } else { "%b %d" };

    for date in time.ticks(5) {
        let label = date.format(fmt).to_string();
        let label_len = label.len() as u16;
        let x = chart.x + time.apply(date).round() as u16;
        let start = x
            .saturating_sub(label_len / 2)
            .min((inner.x + inner.width).saturating_sub(label_len));
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height || start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for tick in scale::share_ticks(extent.ceiling) {
        let label = format!("{tick:.0}");
        let label_len = label.len() as u16;
        let y = chart.y + share.apply(tick).round() as u16;
        let x_end = inner.x + insets.left.saturating_sub(1);
        let start = x_end.saturating_sub(label_len);
        if start < inner.x || y >= inner.y + inner.height {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let y_label = Paragraph::new("share %")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    frame.render_widget(
        y_label,
        Rect {
            x: inner.x,
            y: inner.y,
            width: insets.left.saturating_sub(1).min(inner.width),
            height: 1,
        },
    );
}

/// Tooltip for the hovered point, placed beside the crosshair and flipped to
/// the other side near the right edge.
fn draw_tooltip(
    frame: &mut ratatui::Frame<'_>,
    chart: Rect,
    time: &TimeScale,
    point: &AveragedPoint,
) {
    let width: u16 = 23;
    let height: u16 = Party::COUNT as u16 + 3;
    if chart.width < width + 4 || chart.height < height {
        return;
    }

    let col = chart.x + time.apply(point.date).round() as u16;
    let x = if col + 2 + width < chart.x + chart.width {
        col + 2
    } else {
        col.saturating_sub(width + 2).max(chart.x)
    };
    let rect = Rect {
        x,
        y: chart.y + 1,
        width,
        height,
    };

    let mut lines = vec![Line::from(Span::styled(
        crate::report::tooltip_title(point.date),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (party, text) in crate::report::tooltip_lines(point) {
        let (r, g, b) = party.color();
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::Rgb(r, g, b)),
        )));
    }

    frame.render_widget(Clear, rect);
    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, rect);
}

//! Terminal host for the envelope editor.
//!
//! Draws the wave on a braille canvas with draggable handles, the playback bars,
//! the parameter panel and the render history. Terminal input is read on a
//! separate thread and translated into session events; session commands are
//! carried out here (playback, notifications).

use anyhow::{anyhow, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Padding, Paragraph,
    },
};
use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::drag::{hit_test, Pointer, SurfaceRect};
use crate::params::{HexColor, Parameter, VoicePreset};
use crate::playback::{PlaybackStatus, Player};
use crate::renderer::Renderer;
use crate::session::{
    EditorSession, EventSender, Notification, NotificationLevel, Scheduler, SessionCommand,
    SessionEvent,
};
use crate::wave::{Emotion, PathStyle, WaveGeometry, HANDLE_RADIUS};

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(206, 224, 220);
const DIM_FG: Color = Color::Rgb(100, 100, 100);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const ACTIVE_HANDLE: Color = Color::Rgb(255, 255, 255);

/// How long a notification stays on screen.
const NOTIFICATION_TTL: Duration = Duration::from_millis(3000);
const PLAYER_POLL: Duration = Duration::from_millis(100);
const INPUT_POLL: Duration = Duration::from_millis(50);
/// Bezier samples per segment when drawing.
const CURVE_STEPS: usize = 8;

enum Wake {
    Commands(Option<Vec<SessionCommand>>),
    Input(Option<Event>),
    PollPlayer,
}

/// Interactive editor screen.
pub struct EditorUi<B: Backend> {
    terminal: Terminal<B>,
    selected_parameter: Parameter,
    history_state: ListState,
    notification: Option<(Notification, Instant)>,
    canvas_area: Rect,
    history_area: Rect,
}

impl EditorUi<CrosstermBackend<Stdout>> {
    /// Enters the alternate screen with mouse capture.
    ///
    /// # Errors
    /// - If raw mode or the alternate screen cannot be entered
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let backend = CrosstermBackend::new(stdout);
        Ok(Self::with_terminal(Terminal::new(backend)?))
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If terminal mode cannot be restored
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl<B: Backend> EditorUi<B> {
    pub fn with_terminal(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            selected_parameter: Parameter::Speed,
            history_state: ListState::default(),
            notification: None,
            canvas_area: Rect::default(),
            history_area: Rect::default(),
        }
    }

    pub fn selected_parameter(&self) -> Parameter {
        self.selected_parameter
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref().map(|(n, _)| n)
    }

    /// Runs the editor until the user quits.
    ///
    /// # Errors
    /// - If drawing fails
    /// - If terminal input stops unexpectedly
    pub async fn run<R: Renderer>(
        &mut self,
        scheduler: &mut Scheduler<R>,
        player: &mut Player,
    ) -> Result<()> {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let reader = spawn_input_reader(input_tx, Arc::clone(&stop));
        let sender = scheduler.sender();
        let mut player_poll = tokio::time::interval(PLAYER_POLL);

        tracing::debug!("Editor started");

        let result = loop {
            self.expire_notification();
            if let Err(e) = self.draw(scheduler.session()) {
                break Err(e);
            }

            let wake = tokio::select! {
                commands = scheduler.step() => Wake::Commands(commands),
                input = input_rx.recv() => Wake::Input(input),
                _ = player_poll.tick() => Wake::PollPlayer,
            };

            match wake {
                Wake::Commands(None) => break Ok(()),
                Wake::Commands(Some(commands)) => self.execute(commands, player, &sender),
                Wake::Input(None) => break Err(anyhow!("Terminal input closed")),
                Wake::Input(Some(input)) => {
                    if let Some(event) = self.handle_input(input, scheduler.session()) {
                        sender.send(event);
                    }
                }
                Wake::PollPlayer => {
                    if player.poll() == PlaybackStatus::Finished {
                        sender.send(SessionEvent::PlaybackEnded);
                    }
                }
            }
        };

        stop.store(true, Ordering::Relaxed);
        if reader.join().is_err() {
            tracing::warn!("Input reader panicked");
        }
        player.stop();
        tracing::debug!("Editor closed");
        result
    }

    /// Carries out the commands a session handed back.
    pub fn execute(
        &mut self,
        commands: Vec<SessionCommand>,
        player: &mut Player,
        sender: &EventSender,
    ) {
        for command in commands {
            match command {
                SessionCommand::StartPlayback { asset } => {
                    self.start_playback(player, sender, &asset, Duration::ZERO);
                }
                SessionCommand::ResumePlayback { asset } => {
                    let from = player.position().unwrap_or_default();
                    self.start_playback(player, sender, &asset, from);
                }
                SessionCommand::StopPlayback => {
                    player.stop();
                    sender.send(SessionEvent::PlaybackPaused);
                }
                SessionCommand::Notify(notification) => self.show(notification),
                SessionCommand::Redraw => {}
                SessionCommand::SubmitRender { request_id, .. } => {
                    tracing::warn!("Render {} reached the host; the scheduler owns renders", request_id);
                }
            }
        }
    }

    fn start_playback(
        &mut self,
        player: &mut Player,
        sender: &EventSender,
        asset: &str,
        from: Duration,
    ) {
        match player.play_from(asset, from) {
            Ok(()) => {
                sender.send(SessionEvent::PlaybackStarted);
            }
            Err(e) => {
                tracing::error!("Playback failed: {}", e);
                self.show(Notification::new(NotificationLevel::Danger, e.to_string()));
                sender.send(SessionEvent::PlaybackEnded);
            }
        }
    }

    fn show(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    fn expire_notification(&mut self) {
        if let Some((_, shown_at)) = &self.notification {
            if shown_at.elapsed() >= NOTIFICATION_TTL {
                self.notification = None;
            }
        }
    }

    /// Translates terminal input into a session event.
    pub fn handle_input(&mut self, input: Event, session: &EditorSession) -> Option<SessionEvent> {
        match input {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, session),
            Event::Mouse(mouse) => self.handle_mouse(mouse, session),
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, session: &EditorSession) -> Option<SessionEvent> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                tracing::debug!("Editor exited via Escape/q");
                Some(SessionEvent::Shutdown)
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(SessionEvent::Shutdown)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                Emotion::all().get(index).copied().map(SessionEvent::ApplyEmotion)
            }
            KeyCode::Char('g') => Some(SessionEvent::GenerateRandom),
            KeyCode::Char('R') => Some(SessionEvent::Reset),
            KeyCode::Enter => Some(SessionEvent::Apply),
            KeyCode::Char(' ') => Some(SessionEvent::TogglePlayback),
            KeyCode::Char('x') => Some(SessionEvent::StopPlayback),
            KeyCode::Char('e') => Some(SessionEvent::CycleEffect),
            KeyCode::Up => {
                self.selected_parameter = self.selected_parameter.previous();
                None
            }
            KeyCode::Down => {
                self.selected_parameter = self.selected_parameter.next();
                None
            }
            KeyCode::Left => Some(SessionEvent::NudgeParameter {
                parameter: self.selected_parameter,
                steps: -1,
            }),
            KeyCode::Right => Some(SessionEvent::NudgeParameter {
                parameter: self.selected_parameter,
                steps: 1,
            }),
            KeyCode::F(n @ 1..=6) => VoicePreset::all()
                .get(n as usize - 1)
                .copied()
                .map(SessionEvent::ApplyVoicePreset),
            KeyCode::Char('[') => {
                self.select_history(session, -1);
                None
            }
            KeyCode::Char(']') => {
                self.select_history(session, 1);
                None
            }
            KeyCode::Char('p') => self.history_state.selected().map(SessionEvent::ReplayHistory),
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, session: &EditorSession) -> Option<SessionEvent> {
        let pointer = Pointer::new(f64::from(mouse.column) + 0.5, f64::from(mouse.row) + 0.5);
        let surface = surface_of(self.canvas_area);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.history_row(mouse.column, mouse.row, session) {
                    self.history_state.select(Some(index));
                    return Some(SessionEvent::ReplayHistory(index));
                }
                let wave = session.wave();
                let radius = grab_radius(self.canvas_area, wave.geometry());
                hit_test(pointer, &surface, wave, radius).map(SessionEvent::HandlePressed)
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                Some(SessionEvent::PointerMove { pointer, surface })
            }
            MouseEventKind::Up(MouseButton::Left) => Some(SessionEvent::PointerUp),
            MouseEventKind::ScrollUp => {
                self.select_history(session, -1);
                None
            }
            MouseEventKind::ScrollDown => {
                self.select_history(session, 1);
                None
            }
            _ => None,
        }
    }

    fn select_history(&mut self, session: &EditorSession, delta: isize) {
        let len = session.history().len();
        if len == 0 {
            self.history_state.select(None);
            return;
        }
        let current = self.history_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.history_state.select(Some(next));
    }

    /// History entry under a terminal cell, if any.
    fn history_row(&self, column: u16, row: u16, session: &EditorSession) -> Option<usize> {
        let area = self.history_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }
        let index = (row - area.y) as usize + self.history_state.offset();
        (index < session.history().len()).then_some(index)
    }

    /// Renders the whole screen.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, session: &EditorSession) -> Result<()> {
        let selected = self.selected_parameter;
        let notification = self.notification.as_ref().map(|(n, _)| n.clone());
        let history_state = &mut self.history_state;
        let mut canvas_area = Rect::default();
        let mut history_area = Rect::default();

        self.terminal.draw(|frame| {
            let area = frame.area();
            let page = Block::default()
                .padding(Padding::horizontal(1))
                .style(Style::default().bg(BG).fg(FG));
            frame.render_widget(&page, area);
            let inner = page.inner(area);

            let [header, wave_area, bars_area, bottom, notice, footer] = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(6),
                Constraint::Length(9),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(inner);

            render_header(frame, header, session);
            canvas_area = render_wave(frame, wave_area, session);
            render_bars(frame, bars_area, session);

            let [params_area, list_area] =
                Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .areas(bottom);
            render_parameters(frame, params_area, session, selected);
            history_area = render_history(frame, list_area, session, history_state);

            if let Some(notification) = &notification {
                render_notification(frame, notice, notification);
            }
            render_help(frame, footer);
        })?;

        self.canvas_area = canvas_area;
        self.history_area = history_area;
        Ok(())
    }
}

fn render_header(frame: &mut Frame, area: Rect, session: &EditorSession) {
    let state = if session.is_playing() {
        Span::styled("▶ playing", Style::default().fg(Color::Green))
    } else {
        Span::styled("■ stopped", Style::default().fg(DIM_FG))
    };
    let asset = session.current_asset().unwrap_or("no audio loaded");
    let mut spans = vec![
        Span::styled("wavesculpt ", Style::default().add_modifier(Modifier::BOLD)),
        state,
        Span::raw("  "),
        Span::styled(asset.to_string(), Style::default().fg(DIM_FG)),
    ];
    if session.pending_renders() > 0 {
        spans.push(Span::styled(
            format!("  processing ({})", session.pending_renders()),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draws the envelope and returns the canvas area used for pointer mapping.
fn render_wave(frame: &mut Frame, area: Rect, session: &EditorSession) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_FG))
        .title(" Envelope ");
    let canvas_area = block.inner(area);

    let geometry = *session.wave().geometry();
    let stroke = session.stroke_color();
    let foreground = color_of(stroke, PathStyle::Foreground.opacity());
    let background = color_of(stroke, PathStyle::Background.opacity());
    let polyline = session.path().flatten(CURVE_STEPS);
    let handles: Vec<(f64, f64)> = session
        .handles()
        .iter()
        .map(|p| (p.x, flip(p.y, &geometry)))
        .collect();
    let active = session
        .active_point()
        .and_then(|i| handles.get(i).copied());
    let center = flip(geometry.center_y(), &geometry);

    let canvas = Canvas::default()
        .block(block)
        .background_color(BG)
        .marker(Marker::Braille)
        .x_bounds([0.0, geometry.width()])
        .y_bounds([0.0, geometry.height()])
        .paint(move |ctx| {
            // Faded fill between the centre line and the curve
            for point in &polyline {
                ctx.draw(&CanvasLine::new(
                    point.x,
                    center,
                    point.x,
                    flip(point.y, &geometry),
                    background,
                ));
            }
            ctx.layer();
            for pair in polyline.windows(2) {
                ctx.draw(&CanvasLine::new(
                    pair[0].x,
                    flip(pair[0].y, &geometry),
                    pair[1].x,
                    flip(pair[1].y, &geometry),
                    foreground,
                ));
            }
            ctx.layer();
            ctx.draw(&Points {
                coords: &handles,
                color: FG,
            });
            if let Some(point) = active {
                ctx.draw(&Points {
                    coords: &[point],
                    color: ACTIVE_HANDLE,
                });
            }
        });
    frame.render_widget(canvas, area);
    canvas_area
}

fn render_bars(frame: &mut Frame, area: Rect, session: &EditorSession) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_FG))
        .title(" Preview ");
    let inner = block.inner(area);
    let heights = session.bars();
    let count = heights.len().max(1) as u16;
    let bar_width = (inner.width.saturating_sub(count.saturating_sub(1)) / count).max(1);
    let color = color_of(session.stroke_color(), 1.0);

    let bars: Vec<Bar> = heights
        .iter()
        .map(|h| {
            Bar::default()
                .value(h.round() as u64)
                .text_value(String::new())
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(100);
    frame.render_widget(chart, area);
}

fn render_parameters(frame: &mut Frame, area: Rect, session: &EditorSession, selected: Parameter) {
    let params = session.parameters();
    let mut lines: Vec<Line> = Parameter::all()
        .iter()
        .map(|p| {
            let marker = if *p == selected { "› " } else { "  " };
            let style = if *p == selected {
                Style::default().bg(HIGHLIGHT_BG).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{marker}{:<10}", p.label()), style),
                Span::styled(p.format(params.get(*p)), style),
            ])
        })
        .collect();
    lines.push(Line::from(vec![
        Span::raw(format!("  {:<10}", "Effect")),
        Span::raw(params.effect_type.to_string()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_FG))
        .title(" Parameters ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Draws the history list and returns its inner area for click mapping.
fn render_history(
    frame: &mut Frame,
    area: Rect,
    session: &EditorSession,
    state: &mut ListState,
) -> Rect {
    let history = session.history();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_FG))
        .title(format!(" History ({}/{}) ", history.len(), history.capacity()));
    let inner = block.inner(area);

    if state.selected().is_some_and(|i| i >= history.len()) {
        state.select(history.len().checked_sub(1));
    }

    let items: Vec<ListItem> = history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let label = history.version_label(i).unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(format!("{label:<10}"), Style::default().fg(FG)),
                Span::raw(entry.parameters().summary()),
                Span::styled(format!("  {}", entry.timestamp()), Style::default().fg(DIM_FG)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(HIGHLIGHT_BG).add_modifier(Modifier::BOLD));
    frame.render_stateful_widget(list, area, state);
    inner
}

fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let color = match notification.level {
        NotificationLevel::Info => Color::Cyan,
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Warning => Color::Yellow,
        NotificationLevel::Danger => Color::Red,
    };
    let text = Paragraph::new(notification.message.as_str()).style(Style::default().fg(color));
    frame.render_widget(text, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = "1-9 emotion  g random  F1-F6 voice  ↑↓←→ adjust  e effect  ⏎ apply  \
                space play  x stop  [ ] p history  R reset  q quit";
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(DIM_FG)),
        area,
    );
}

/// Converts a top-down wave y into the canvas's bottom-up space.
fn flip(y: f64, geometry: &WaveGeometry) -> f64 {
    geometry.height() - y
}

fn color_of(color: HexColor, opacity: f64) -> Color {
    let scale = |c: u8| (f64::from(c) * opacity).round() as u8;
    Color::Rgb(scale(color.r), scale(color.g), scale(color.b))
}

fn surface_of(area: Rect) -> SurfaceRect {
    SurfaceRect::new(
        f64::from(area.x),
        f64::from(area.y),
        f64::from(area.width),
        f64::from(area.height),
    )
}

/// Pick-up distance in logical units: about one and a half terminal cells.
fn grab_radius(area: Rect, geometry: &WaveGeometry) -> f64 {
    if area.width == 0 || area.height == 0 {
        return HANDLE_RADIUS;
    }
    let cell_width = geometry.width() / f64::from(area.width);
    let cell_height = geometry.height() / f64::from(area.height);
    (1.5 * cell_width.hypot(cell_height)).max(HANDLE_RADIUS)
}

/// Reads terminal events on a plain thread until `stop` is set or the receiver is gone.
fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(input) => {
                        if tx.send(input).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Failed to read terminal input: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Failed to poll terminal input: {}", e);
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionSettings;
    use crossterm::event::KeyEventState;
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;

    fn ui() -> EditorUi<TestBackend> {
        EditorUi::with_terminal(Terminal::new(TestBackend::new(120, 40)).unwrap())
    }

    fn session() -> EditorSession {
        EditorSession::new(SessionSettings {
            seed: Some(5),
            ..SessionSettings::default()
        })
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn screen_text(ui: &EditorUi<TestBackend>) -> String {
        ui.terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_shows_panels() {
        let mut ui = ui();
        let session = session();
        ui.draw(&session).unwrap();

        let text = screen_text(&ui);
        assert!(text.contains("Envelope"));
        assert!(text.contains("Parameters"));
        assert!(text.contains("History (0/5)"));
        assert!(text.contains("no audio loaded"));
        assert!(ui.canvas_area.width > 0);
    }

    #[test]
    fn test_keys_map_to_events() {
        let mut ui = ui();
        let session = session();

        assert_eq!(
            ui.handle_input(key(KeyCode::Char('4')), &session),
            Some(SessionEvent::ApplyEmotion(Emotion::Angry))
        );
        assert_eq!(
            ui.handle_input(key(KeyCode::F(2)), &session),
            Some(SessionEvent::ApplyVoicePreset(VoicePreset::Giant))
        );
        assert_eq!(
            ui.handle_input(key(KeyCode::Enter), &session),
            Some(SessionEvent::Apply)
        );
        assert_eq!(
            ui.handle_input(key(KeyCode::Char('q')), &session),
            Some(SessionEvent::Shutdown)
        );
    }

    #[test]
    fn test_parameter_selection_and_nudge() {
        let mut ui = ui();
        let session = session();

        assert_eq!(ui.handle_input(key(KeyCode::Down), &session), None);
        assert_eq!(ui.selected_parameter(), Parameter::Pitch);
        assert_eq!(
            ui.handle_input(key(KeyCode::Left), &session),
            Some(SessionEvent::NudgeParameter {
                parameter: Parameter::Pitch,
                steps: -1
            })
        );
    }

    #[test]
    fn test_press_on_handle_starts_drag() {
        let mut ui = ui();
        let session = session();
        ui.draw(&session).unwrap();

        // Terminal cell over control point 20
        let area = ui.canvas_area;
        let geometry = session.wave().geometry();
        let point = session.wave().point(20).unwrap();
        let column = area.x + (point.x() / geometry.width() * f64::from(area.width)) as u16;
        let row = area.y + (point.y() / geometry.height() * f64::from(area.height)) as u16;

        let event = ui.handle_input(mouse(MouseEventKind::Down(MouseButton::Left), column, row), &session);
        assert_eq!(event, Some(SessionEvent::HandlePressed(20)));
    }

    #[test]
    fn test_drag_and_release_events() {
        let mut ui = ui();
        let session = session();
        ui.draw(&session).unwrap();

        let moved = ui.handle_input(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 5), &session);
        assert!(matches!(moved, Some(SessionEvent::PointerMove { .. })));
        assert_eq!(
            ui.handle_input(mouse(MouseEventKind::Up(MouseButton::Left), 30, 5), &session),
            Some(SessionEvent::PointerUp)
        );
    }

    #[tokio::test]
    async fn test_notifications_are_shown() {
        let mut ui = ui();
        let mut session = session();
        let commands = session.handle(SessionEvent::Apply);

        let scheduler = Scheduler::new(session, NeverRenderer, Duration::from_millis(50));
        let mut player = Player::new(None, None);
        ui.execute(commands, &mut player, &scheduler.sender());

        assert_eq!(
            ui.notification().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
        ui.draw(scheduler.session()).unwrap();
        assert!(screen_text(&ui).contains("No audio file selected"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resume_keeps_the_player_running() {
        let mut ui = ui();
        let mut scheduler = Scheduler::new(session(), NeverRenderer, Duration::from_millis(50));
        let mut player = Player::new(Some("sleep".to_string()), None);
        let sender = scheduler.sender();

        ui.execute(
            vec![SessionCommand::StartPlayback {
                asset: "30".to_string(),
            }],
            &mut player,
            &sender,
        );
        assert_eq!(scheduler.next_event().await, Some(SessionEvent::PlaybackStarted));

        ui.execute(
            vec![SessionCommand::ResumePlayback {
                asset: "30".to_string(),
            }],
            &mut player,
            &sender,
        );
        assert_eq!(scheduler.next_event().await, Some(SessionEvent::PlaybackStarted));
        assert!(player.position().is_some());
        assert!(ui.notification().is_none());
        player.stop();
    }

    struct NeverRenderer;

    impl Renderer for NeverRenderer {
        async fn render(
            &self,
            _request: crate::renderer::RenderRequest,
        ) -> Result<String, crate::renderer::RendererError> {
            Err(crate::renderer::RendererError::Transport("offline".to_string()))
        }
    }

    #[test]
    fn test_grab_radius_scales_with_cells() {
        let geometry = WaveGeometry::default();
        let radius = grab_radius(Rect::new(0, 0, 100, 20), &geometry);
        assert!(radius > HANDLE_RADIUS);
        assert_eq!(grab_radius(Rect::default(), &geometry), HANDLE_RADIUS);
    }
}

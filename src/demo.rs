//! Ratatui-based interactive correction demo.
//!
//! Implements the burst → pause → correct rhythm: type freely, stop for a
//! moment, and the correction marker sweeps the interpreted text in. All
//! inference happens synchronously on the UI thread during idle gaps;
//! keeping the model calls off background threads keeps the local inference
//! runtime stable.

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};

use crate::engine::{CorrectionEngine, EngineConfig};
use crate::error::AppError;
use crate::infer::{CompletionClient, Interpreter};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const SWEEP_FRAMES: usize = 24;
const SWEEP_FRAME_DELAY: Duration = Duration::from_millis(18);

/// The correction marker's lifecycle. Rendered as braille glyphs built from
/// the middle 2×2 dot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerState {
    Idle,
    Listening,
    Thinking,
    Sweeping,
    Complete,
    Disabled,
    Error,
}

impl MarkerState {
    fn glyph(self) -> &'static str {
        match self {
            MarkerState::Idle => "⠤",
            MarkerState::Listening => "⠴",
            MarkerState::Thinking => "⠦",
            MarkerState::Sweeping => "⠶",
            MarkerState::Complete => "⠲",
            MarkerState::Disabled => "⠠",
            MarkerState::Error => "⠆",
        }
    }

    fn color(self) -> Color {
        match self {
            MarkerState::Idle | MarkerState::Disabled => Color::DarkGray,
            MarkerState::Listening => Color::Cyan,
            MarkerState::Thinking => Color::Yellow,
            MarkerState::Sweeping => Color::LightRed,
            MarkerState::Complete => Color::Green,
            MarkerState::Error => Color::Yellow,
        }
    }
}

/// Start the demo.
pub fn run(client: CompletionClient, config: EngineConfig, pause_ms: u64) -> Result<(), AppError> {
    let server_label = format!("{} | {}", client.base_url(), client.model());
    let engine = CorrectionEngine::new(client, config);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::failure(format!("Failed to initialize terminal: {e}")))?;

    let mut app = DemoApp::new(engine, server_label, Duration::from_millis(pause_ms));
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::failure(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::failure(format!(
                "Failed to enter alternate screen: {e}"
            )));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// An in-progress sweep: corrected text revealed left to right over the
/// original.
struct Sweep {
    original: String,
    corrected: String,
    progress: f64,
}

struct DemoApp<I> {
    engine: CorrectionEngine<I>,
    server_label: String,
    pause: Duration,
    text: String,
    state: MarkerState,
    status: String,
    enabled: bool,
    last_keystroke: Instant,
    correction_applied: bool,
    sweep: Option<Sweep>,
}

impl<I: Interpreter> DemoApp<I> {
    fn new(engine: CorrectionEngine<I>, server_label: String, pause: Duration) -> Self {
        Self {
            engine,
            server_label,
            pause,
            text: String::new(),
            state: MarkerState::Idle,
            status: String::new(),
            enabled: true,
            last_keystroke: Instant::now(),
            correction_applied: true,
            sweep: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        loop {
            terminal
                .draw(|f| self.draw(f))
                .map_err(|e| AppError::failure(format!("Terminal draw error: {e}")))?;

            let has_event = event::poll(POLL_INTERVAL)
                .map_err(|e| AppError::failure(format!("Event poll error: {e}")))?;

            if has_event {
                match event::read()
                    .map_err(|e| AppError::failure(format!("Event read error: {e}")))?
                {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key.code, key.modifiers, terminal)? {
                            return Ok(());
                        }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
                continue;
            }

            // Idle tick: trigger a correction after a typing pause.
            if self.enabled
                && !self.correction_applied
                && !self.text.trim().is_empty()
                && self.last_keystroke.elapsed() >= self.pause
            {
                self.correct(terminal)?;
            }
        }
    }

    fn handle_key<B: ratatui::backend::Backend>(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        terminal: &mut Terminal<B>,
    ) -> Result<bool, AppError> {
        match code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Tab => {
                self.enabled = !self.enabled;
                self.state = if self.enabled {
                    MarkerState::Idle
                } else {
                    MarkerState::Disabled
                };
                self.status.clear();
                return Ok(false);
            }
            _ => {}
        }

        if !self.enabled {
            return Ok(false);
        }

        self.last_keystroke = Instant::now();
        self.state = MarkerState::Listening;
        self.status.clear();
        self.correction_applied = false;

        match code {
            KeyCode::Backspace => {
                self.text.pop();
            }
            KeyCode::Enter => {
                if !self.text.trim().is_empty() {
                    self.correct(terminal)?;
                }
            }
            KeyCode::Char('w') if modifiers.contains(KeyModifiers::CONTROL) => {
                let words: Vec<&str> = self.text.split_whitespace().collect();
                let kept = words[..words.len().saturating_sub(1)].join(" ");
                self.text = kept;
            }
            KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.clear();
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.push(c);
            }
            _ => {}
        }

        Ok(false)
    }

    /// The "correct" phase: interpret, then sweep the result in (or surface
    /// the rejection reason).
    fn correct<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        self.state = MarkerState::Thinking;
        self.status = "interpreting...".to_string();
        terminal
            .draw(|f| self.draw(f))
            .map_err(|e| AppError::failure(format!("Terminal draw error: {e}")))?;

        let original = self.text.clone();
        let result = self.engine.correct(&original);
        self.correction_applied = true;

        if result.success {
            let corrected = result.text.unwrap_or(original.clone());
            if corrected == original {
                self.state = MarkerState::Complete;
                self.status = format!("{:.0}% (no changes)", result.confidence * 100.0);
                return Ok(());
            }

            self.animate_sweep(terminal, original, corrected)?;
            self.state = MarkerState::Complete;
            self.status = format!("{:.0}% confidence", result.confidence * 100.0);
        } else {
            // Keep the original text; the reason tells the user why.
            self.state = MarkerState::Error;
            self.status = result.reason;
        }
        Ok(())
    }

    /// Marker travels left to right, unveiling the corrected text behind it.
    fn animate_sweep<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        original: String,
        corrected: String,
    ) -> Result<(), AppError> {
        self.state = MarkerState::Sweeping;
        self.sweep = Some(Sweep {
            original,
            corrected: corrected.clone(),
            progress: 0.0,
        });

        for frame in 0..=SWEEP_FRAMES {
            if let Some(sweep) = &mut self.sweep {
                sweep.progress = frame as f64 / SWEEP_FRAMES as f64;
            }
            terminal
                .draw(|f| self.draw(f))
                .map_err(|e| AppError::failure(format!("Terminal draw error: {e}")))?;
            std::thread::sleep(SWEEP_FRAME_DELAY);
        }

        self.sweep = None;
        self.text = corrected;
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_input(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("mt", Style::default().fg(Color::Cyan)),
                Span::raw(" — fuzzy typing interpreter"),
            ]),
            Line::from(Span::styled(
                format!("server: {}", self.server_label),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                format!(
                    "pause: {}ms | burst → pause → correct",
                    self.pause.as_millis()
                ),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "⠤ idle  ⠴ listening  ⠦ thinking  ⠶ sweeping  ⠲ complete",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_input(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let marker = Span::styled(
            format!("{} ", self.state.glyph()),
            Style::default()
                .fg(self.state.color())
                .add_modifier(Modifier::BOLD),
        );

        let line = if let Some(sweep) = &self.sweep {
            let corrected: Vec<char> = sweep.corrected.chars().collect();
            let original: Vec<char> = sweep.original.chars().collect();
            let pos = ((corrected.len() as f64) * sweep.progress).round() as usize;
            let pos = pos.min(corrected.len());

            let revealed: String = corrected[..pos].iter().collect();
            let remaining: String = if pos < original.len() {
                original[pos..].iter().collect()
            } else {
                String::new()
            };

            Line::from(vec![
                marker,
                Span::styled(revealed, Style::default().fg(Color::Green)),
                Span::styled(remaining, Style::default().fg(Color::DarkGray)),
            ])
        } else if self.text.is_empty() {
            Line::from(vec![
                marker,
                Span::styled("Start typing...", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(vec![marker, Span::raw(self.text.clone())])
        };

        let p = Paragraph::new(line)
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Input").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Enter force  Tab toggle  Ctrl+W del word  Ctrl+U clear  Esc quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

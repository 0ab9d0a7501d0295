//! App: terminal init, frame loop, key/mouse handling, engine event draining.

use crate::game::{Engine, GameEvent, Mode};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::words::SAMPLE_TEXTS;
use crate::{GameConfig, Settings, ui};
use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// How long a HUD flash message stays up.
const FLASH_DURATION: Duration = Duration::from_millis(2000);

/// Setup-screen state: the text being typed and the last validation hiccup.
#[derive(Debug, Default)]
pub struct SetupState {
    pub buffer: String,
    pub error: Option<String>,
}

pub struct App {
    config: GameConfig,
    settings: Settings,
    theme: Theme,
    engine: Engine,
    setup: SetupState,
    /// Origin for the engine's millisecond timestamps.
    epoch: Instant,
    flash: Option<(String, Instant)>,
    /// TachyonFX fade for the end overlay (created when the overlay appears).
    end_fx: Option<Effect>,
    end_fx_time: Option<Instant>,
    frame_duration: Duration,
}

impl App {
    pub fn new(config: GameConfig, settings: Settings, theme: Theme) -> Self {
        let engine = Engine::new(config.lives, config.seed);
        let frame_duration = Duration::from_secs_f64(1.0 / config.frame_rate.max(1.0));
        Self {
            config,
            settings: settings.clamped(),
            theme,
            engine,
            setup: SetupState::default(),
            epoch: Instant::now(),
            flash: None,
            end_fx: None,
            end_fx_time: None,
            frame_duration,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        // A session supplied on the CLI skips the setup screen entirely.
        if let Some(text) = self.config.start_text.take() {
            if !self.engine.start(&text) {
                anyhow::bail!("input text contains no words");
            }
        }

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let frame_start = Instant::now();
            let now_ms = self.epoch.elapsed().as_secs_f64() * 1000.0;
            self.engine.tick(now_ms, &self.settings);
            for ev in self.engine.drain_events() {
                self.on_event(ev);
            }
            if self
                .flash
                .as_ref()
                .is_some_and(|(_, since)| since.elapsed() > FLASH_DURATION)
            {
                self.flash = None;
            }
            if !matches!(self.engine.mode, Mode::GameOver | Mode::Victory) {
                self.end_fx = None;
                self.end_fx_time = None;
            }

            let flash = self.flash.as_ref().map(|(msg, _)| msg.clone());
            terminal.draw(|f| {
                ui::draw(
                    f,
                    &self.engine,
                    &self.settings,
                    &self.theme,
                    &self.setup,
                    flash.as_deref(),
                    &mut self.end_fx,
                    &mut self.end_fx_time,
                    frame_start,
                )
            })?;

            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);

            let timeout = self.frame_duration.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse, area),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.engine.mode {
            Mode::Setup => return self.handle_setup_key(key),
            Mode::Playing | Mode::Paused => match key_to_action(key) {
                Action::Quit => return true,
                Action::Pause => self.engine.toggle_pause(),
                Action::Restart => self.engine.restart(),
                Action::SpeedUp => {
                    self.settings.speed = (self.settings.speed + 1).min(10);
                }
                Action::SpeedDown => {
                    self.settings.speed = self.settings.speed.saturating_sub(1).max(1);
                }
                Action::SizeUp => {
                    self.settings.text_size = (self.settings.text_size + 0.5).min(5.0);
                }
                Action::SizeDown => {
                    self.settings.text_size = (self.settings.text_size - 0.5).max(1.0);
                }
                Action::SpacingUp => {
                    self.settings.word_spacing = (self.settings.word_spacing + 1).min(20);
                }
                Action::SpacingDown => {
                    self.settings.word_spacing = self.settings.word_spacing.saturating_sub(1).max(1);
                }
                Action::None => {}
            },
            Mode::GameOver | Mode::Victory => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => {
                    self.engine.restart();
                }
                _ => {}
            },
        }
        false
    }

    /// Setup screen is a text box: printable keys type, Enter starts.
    fn handle_setup_key(&mut self, key: KeyEvent) -> bool {
        if !(key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT) {
            return false;
        }
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Enter => {
                if self.engine.start(&self.setup.buffer) {
                    self.setup.error = None;
                    self.flash = None;
                } else {
                    self.setup.error = Some("Wpisz najpierw jakieś słowa!".to_owned());
                }
            }
            KeyCode::F(n @ 1..=3) => {
                self.setup.buffer = SAMPLE_TEXTS[(n - 1) as usize].to_owned();
                self.setup.error = None;
            }
            KeyCode::Backspace => {
                self.setup.buffer.pop();
            }
            KeyCode::Char(c) => {
                self.setup.buffer.push(c);
                self.setup.error = None;
            }
            _ => {}
        }
        false
    }

    /// Pops are applied immediately on press; a tap landing after the word
    /// crossed the floor simply finds no target.
    fn handle_mouse(&mut self, mouse: MouseEvent, area: Rect) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if self.engine.mode != Mode::Playing {
            return;
        }
        let field = ui::field_inner(area);
        if let Some(id) = ui::hit_test(
            field,
            &self.engine,
            self.settings.text_size,
            mouse.column,
            mouse.row,
        ) {
            self.engine.pop(id);
        }
    }

    /// Engine events become HUD flashes; milestones and victory also ring
    /// the terminal bell.
    fn on_event(&mut self, ev: GameEvent) {
        match ev {
            GameEvent::StreakMilestone(streak) => {
                self.flash = Some((format!("Seria x{streak}!"), Instant::now()));
                ring_bell();
            }
            GameEvent::Miss => {
                self.flash = Some(("Oj! Słowo uciekło".to_owned(), Instant::now()));
            }
            GameEvent::Victory => ring_bell(),
            GameEvent::Pop { .. } | GameEvent::GameOver => {}
        }
    }
}

fn ring_bell() {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

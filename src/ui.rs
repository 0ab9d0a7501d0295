//! Layout and drawing: setup screen, play field, HUD, pause and end overlays.
//!
//! Layout helpers ([`field_inner`], [`word_rect`], [`hit_test`]) are pure so
//! the app can map mouse clicks to word ids with the exact same geometry the
//! renderer used.

use crate::game::{ActiveWord, Engine, Mode, WordId};
use crate::theme::Theme;
use crate::words;
use crate::{Settings, app::SetupState};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// HUD bar height (border + two content rows).
const HUD_HEIGHT: u16 = 4;

/// Duration of the end-overlay fade-in (TachyonFX) in ms.
const END_FADE_MS: u32 = 400;

/// Streak badge appears once the streak is worth bragging about.
const STREAK_BADGE_MIN: u32 = 3;

/// Split the whole terminal into (HUD bar, play field outer).
pub fn layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HUD_HEIGHT), Constraint::Fill(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Play field interior (inside the border); percent coordinates map onto this.
pub fn field_inner(area: Rect) -> Rect {
    let (_, outer) = layout(area);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: outer.width.saturating_sub(2),
        height: outer.height.saturating_sub(2),
    }
}

/// Terminal cell for a field-percent position; None while above the top edge.
fn cell_of(field: Rect, x_pct: f32, y_pct: f32) -> Option<(u16, u16)> {
    if y_pct < 0.0 || field.width == 0 || field.height == 0 {
        return None;
    }
    let cx = field.x + ((x_pct.clamp(0.0, 100.0) / 100.0) * f32::from(field.width)) as u16;
    let cy = field.y + ((y_pct.clamp(0.0, 100.0) / 100.0) * f32::from(field.height)) as u16;
    let cx = cx.min(field.x + field.width.saturating_sub(1));
    let cy = cy.min(field.y + field.height.saturating_sub(1));
    Some((cx, cy))
}

/// Screen rect of a word bubble: text plus padding, centred on the word's x.
/// None while the word is still sliding in above the field.
pub fn word_rect(field: Rect, word: &ActiveWord, text_size: f32) -> Option<Rect> {
    let (cx, cy) = cell_of(field, word.x, word.y)?;
    let pad = (text_size.round() as u16).max(1);
    let width = (word.text.chars().count() as u16 + pad * 2).min(field.width.max(1));
    let mut x = cx.saturating_sub(width / 2).max(field.x);
    let right = field.x + field.width;
    if x + width > right {
        x = right.saturating_sub(width).max(field.x);
    }
    Some(Rect {
        x,
        y: cy,
        width,
        height: 1,
    })
}

/// Topmost live word under a terminal cell (later spawns win, as they draw on top).
pub fn hit_test(
    field: Rect,
    engine: &Engine,
    text_size: f32,
    column: u16,
    row: u16,
) -> Option<WordId> {
    let pos = Position::new(column, row);
    engine
        .words
        .iter()
        .rev()
        .filter(|w| !w.is_popping())
        .find_map(|w| {
            word_rect(field, w, text_size)
                .filter(|r| r.contains(pos))
                .map(|_| w.id)
        })
}

/// Draw the current mode's screen. `flash` is a transient HUD message from
/// drained engine events; the end-overlay fade state lives in the app.
pub fn draw(
    frame: &mut Frame,
    engine: &Engine,
    settings: &Settings,
    theme: &Theme,
    setup: &SetupState,
    flash: Option<&str>,
    end_fx: &mut Option<Effect>,
    end_fx_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    match engine.mode {
        Mode::Setup => draw_setup(frame, theme, setup, area),
        Mode::Playing | Mode::Paused => {
            draw_game(frame, engine, settings, theme, flash, area);
            if engine.mode == Mode::Paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Mode::GameOver | Mode::Victory => {
            draw_game(frame, engine, settings, theme, None, area);
            let popup = draw_end_overlay(frame, engine, theme, area);
            apply_end_fade(frame, theme, popup, end_fx, end_fx_time, now);
        }
    }
}

fn draw_setup(frame: &mut Frame, theme: &Theme, setup: &SetupState, area: Rect) {
    let popup_w = 64u16.min(area.width);
    let popup_h = 18u16.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Magiczne Słowa ", Style::default().fg(theme.title).bold()));
    let inner = block.inner(popup);
    block.render(popup, frame.buffer_mut());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // prompt
            Constraint::Fill(1),   // text entry
            Constraint::Length(1), // word count / error
            Constraint::Length(2), // help
        ])
        .split(inner);

    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Wpisz tekst do czytania albo wybierz przykład:",
            Style::default().fg(theme.main_fg),
        )),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().bg(theme.bg))
    .render(chunks[0], frame.buffer_mut());

    let entry_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    let entry_inner = entry_block.inner(chunks[1]);
    entry_block.render(chunks[1], frame.buffer_mut());
    let entry_text = if setup.buffer.is_empty() {
        Span::styled(
            "Tutaj wpisz tekst...",
            Style::default().fg(theme.div_line).italic(),
        )
    } else {
        Span::styled(setup.buffer.as_str(), Style::default().fg(theme.main_fg))
    };
    Paragraph::new(Line::from(entry_text))
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(theme.bg))
        .render(entry_inner, frame.buffer_mut());

    let status = if let Some(err) = &setup.error {
        Line::from(Span::styled(err.as_str(), Style::default().fg(Color::Red).bold()))
    } else {
        let count = words::split_words(&setup.buffer).len();
        Line::from(Span::styled(
            format!("Słowa: {count}"),
            Style::default().fg(theme.main_fg),
        ))
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .render(chunks[2], frame.buffer_mut());

    Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" F1/F2/F3 ", Style::default().fg(theme.title)),
            Span::styled("przykłady  ", Style::default().fg(theme.main_fg)),
            Span::styled(" Enter ", Style::default().fg(theme.title)),
            Span::styled("start  ", Style::default().fg(theme.main_fg)),
            Span::styled(" Esc ", Style::default().fg(theme.title)),
            Span::styled("wyjście", Style::default().fg(theme.main_fg)),
        ]),
        Line::from(Span::styled(
            "Złap słowa zanim spadną — kliknij je myszką!",
            Style::default().fg(theme.div_line),
        )),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().bg(theme.bg))
    .render(chunks[3], frame.buffer_mut());
}

fn draw_game(
    frame: &mut Frame,
    engine: &Engine,
    settings: &Settings,
    theme: &Theme,
    flash: Option<&str>,
    area: Rect,
) {
    let (hud_area, field_outer) = layout(area);
    draw_hud(frame, engine, settings, theme, flash, hud_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .style(Style::default().bg(theme.bg));
    let field = block.inner(field_outer);
    block.render(field_outer, frame.buffer_mut());

    // Words draw in spawn order; later words overlap earlier ones, matching hit_test.
    for word in &engine.words {
        let Some(rect) = word_rect(field, word, settings.text_size) else {
            continue;
        };
        let (bg, fg) = theme.word_style(word.color);
        let style = if word.is_popping() {
            // Mid-pop: bubble flashes gold and fades toward the field bg
            if word.pop_progress() < 0.5 {
                Style::default().fg(theme.bg).bg(theme.particle).bold()
            } else {
                Style::default().fg(theme.particle).bg(theme.bg)
            }
        } else {
            Style::default().fg(fg).bg(bg).bold()
        };
        Paragraph::new(word.text.as_str())
            .alignment(Alignment::Center)
            .style(style)
            .render(rect, frame.buffer_mut());
    }

    let buf = frame.buffer_mut();
    for p in &engine.particles {
        let Some((cx, cy)) = cell_of(field, p.x, p.y) else {
            continue;
        };
        let color = if p.life < 0.4 { theme.div_line } else { theme.particle };
        buf[(cx, cy)]
            .set_symbol(if p.life < 0.4 { "·" } else { "•" })
            .set_style(Style::default().fg(color).bg(theme.bg));
    }
}

fn draw_hud(
    frame: &mut Frame,
    engine: &Engine,
    settings: &Settings,
    theme: &Theme,
    flash: Option<&str>,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Magiczne Słowa ", Style::default().fg(theme.title).bold()));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    if inner.height == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let (consumed, total) = engine.progress();
    let mut spans = vec![
        Span::styled(" ⭐ ", Style::default().fg(Color::Yellow)),
        Span::styled(engine.score.to_string(), Style::default().fg(theme.main_fg).bold()),
        Span::styled("   ❤ ", Style::default().fg(Color::Red)),
        Span::styled(engine.lives.to_string(), Style::default().fg(theme.main_fg).bold()),
        Span::styled(
            format!("   {consumed}/{total} słów"),
            Style::default().fg(theme.main_fg),
        ),
    ];
    if engine.streak >= STREAK_BADGE_MIN {
        spans.push(Span::styled(
            format!("   Seria: {}!", engine.streak),
            Style::default().fg(Color::Rgb(251, 146, 60)).bold(),
        ));
    }
    if let Some(msg) = flash {
        spans.push(Span::styled(
            format!("   {msg}"),
            Style::default().fg(theme.title).bold(),
        ));
    }
    Paragraph::new(Line::from(spans))
        .style(Style::default().bg(theme.bg))
        .render(rows[0], frame.buffer_mut());

    // Second row: progress toward the next streak milestone + live settings
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Fill(1)])
        .split(rows[1]);
    let toward = engine.streak % 5;
    let gauge = Gauge::default()
        .ratio(f64::from(toward) / 5.0)
        .label(format!("seria {toward}/5"))
        .gauge_style(Style::default().fg(theme.title).bg(theme.div_line));
    gauge.render(cols[0], frame.buffer_mut());
    Paragraph::new(Line::from(Span::styled(
        format!(
            "  prędkość {} [↑↓]   rozmiar {:.1} [PgUp/PgDn]   odstęp {} [←→]   P pauza  R od nowa",
            settings.speed, settings.text_size, settings.word_spacing
        ),
        Style::default().fg(theme.div_line),
    )))
    .style(Style::default().bg(theme.bg))
    .render(cols[1], frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup_w = 30u16.min(area.width);
    let popup_h = 5u16.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Pauza ",
            Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Wznów    Q — Wyjście ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

/// End-of-game popup; returns its rect so the fade effect can target it.
fn draw_end_overlay(frame: &mut Frame, engine: &Engine, theme: &Theme, area: Rect) -> Rect {
    let popup_w = 40u16.min(area.width);
    let popup_h = 10u16.min(area.height);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w,
        height: popup_h,
    };
    let (banner, banner_style, subtitle) = if engine.mode == Mode::Victory {
        (
            " Brawo! ",
            Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
            "Przeczytałaś wszystkie słowa!",
        )
    } else {
        (
            " Koniec Gry ",
            Style::default().fg(Color::White).bg(Color::Red).bold(),
            "Ale poszło Ci świetnie!",
        )
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(banner, banner_style)),
        Line::from(""),
        Line::from(Span::styled(subtitle, Style::default().fg(theme.main_fg))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Twój wynik: ", Style::default().fg(theme.main_fg)),
            Span::styled(engine.score.to_string(), Style::default().fg(theme.title).bold()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " R — Jeszcze raz    Q — Wyjście ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Magiczne Słowa ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
    popup
}

/// Fade the end overlay in from the field background (TachyonFX), created
/// lazily the first frame the overlay shows.
fn apply_end_fade(
    frame: &mut Frame,
    theme: &Theme,
    popup: Rect,
    end_fx: &mut Option<Effect>,
    end_fx_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = end_fx_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    *end_fx_time = Some(now);

    if end_fx.is_none() {
        *end_fx = Some(
            fx::fade_from(theme.bg, theme.bg, (END_FADE_MS, Interpolation::Linear))
                .with_area(popup),
        );
    }
    if let Some(effect) = end_fx {
        if !effect.done() {
            frame.render_effect(effect, popup, TfxDuration::from_millis(delta_ms));
        }
    }
}

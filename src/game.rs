//! Game engine: clock, word spawning/layout, motion, particles, scoring, mode machine.
//!
//! All simulation state lives in [`Engine`] and is mutated either inside
//! [`Engine::tick`] or through the pop/pause/restart entry points. Positions
//! are percentages of the play field (0–100 on each axis), time is in
//! milliseconds from an arbitrary monotonic origin supplied by the caller.

use crate::Settings;
use crate::theme;
use crate::words;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Hard cap on a single frame delta so a stall (suspended terminal, slow
/// frame) never turns into a simulation jump.
const MAX_DELTA_MS: f64 = 50.0;

/// Reference frame length; motion is normalised against this so speed is
/// frame-rate independent.
const FRAME_REF_MS: f32 = 16.0;

/// Horizontal layout cursor starts (and wraps to) here, in field percent.
pub const LEFT_MARGIN_X: f32 = 10.0;

/// A word may not extend past this; the spawner wraps instead.
const RIGHT_EDGE_X: f32 = 95.0;

/// Words past this vertical percent have crossed the floor.
pub const FLOOR_Y: f32 = 95.0;

/// Words enter above the visible field and slide in.
pub const SPAWN_Y: f32 = -15.0;

/// How long a popped word sticks around for its pop animation.
const POP_DURATION_MS: f32 = 300.0;

const PARTICLES_PER_BURST: usize = 8;
const PARTICLE_DECAY: f32 = 0.05;
const PARTICLE_SPREAD: f32 = 0.75;

const BASE_POINTS: u32 = 10;
const STREAK_MILESTONE: u32 = 5;

/// Starting lives (generous; the game is for kids).
pub const DEFAULT_LIVES: u32 = 5;

pub type WordId = u64;

/// High-level mode; gates everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Setup,
    Playing,
    Paused,
    GameOver,
    Victory,
}

/// Discrete events for collaborators (HUD flashes, audio cues).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Pop { points: u32 },
    Miss,
    StreakMilestone(u32),
    GameOver,
    Victory,
}

/// A word currently on the field (or mid-pop-animation).
#[derive(Debug, Clone)]
pub struct ActiveWord {
    pub id: WordId,
    pub text: String,
    /// Centre x, percent of field width.
    pub x: f32,
    /// Top y, percent of field height. Negative while sliding in.
    pub y: f32,
    /// Index into the theme word palette (matched bg/fg pair).
    pub color: u8,
    /// Milliseconds since this word was popped; `None` while still live.
    pop_age: Option<f32>,
}

impl ActiveWord {
    /// True while the pop animation runs; exempt from motion and floor checks.
    pub fn is_popping(&self) -> bool {
        self.pop_age.is_some()
    }

    /// Pop animation progress in [0, 1].
    pub fn pop_progress(&self) -> f32 {
        self.pop_age
            .map_or(0.0, |age| (age / POP_DURATION_MS).clamp(0.0, 1.0))
    }
}

/// Cosmetic burst particle; no gameplay effect.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Decays linearly from 1.0; removed at <= 0.
    pub life: f32,
}

/// Turns raw frame timestamps into a bounded delta. The baseline advances
/// every tick, paused or not, so unpausing never produces a time jump.
#[derive(Debug, Clone, Copy, Default)]
struct Clock {
    last: Option<f64>,
}

impl Clock {
    /// Delta since the previous tick, capped at [`MAX_DELTA_MS`].
    /// First tick after a reset yields 0 and just records the baseline.
    fn tick(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last {
            Some(prev) => (now_ms - prev).min(MAX_DELTA_MS),
            None => 0.0,
        };
        self.last = Some(now_ms);
        delta
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

/// Milliseconds between spawns for a speed setting (1–10).
fn spawn_interval_ms(speed: u8) -> f64 {
    (4000.0 - f64::from(speed) * 300.0).max(1000.0)
}

/// Vertical percent per reference frame for a speed setting (1–10).
fn speed_multiplier(speed: u8) -> f32 {
    0.02 + f32::from(speed) * 0.015
}

/// Rendered width heuristic: percent of field width a word occupies.
fn estimated_width(text: &str, text_size: f32) -> f32 {
    (4.0 + text.chars().count() as f32 * 2.0) * (text_size * 0.8)
}

/// The whole simulation. One tick per rendering frame; pointer pops are
/// applied immediately from the event handler (single-threaded by contract).
pub struct Engine {
    pub mode: Mode,
    queue: Vec<String>,
    queue_index: usize,
    pub words: Vec<ActiveWord>,
    pub particles: Vec<Particle>,
    pub score: u32,
    pub lives: u32,
    pub streak: u32,
    clock: Clock,
    /// Timestamp of the last spawn (same origin as `tick`'s `now_ms`).
    last_spawn: f64,
    /// Reading-order layout cursor; persists across spawns.
    next_spawn_x: f32,
    next_id: u64,
    start_lives: u32,
    rng: StdRng,
    /// Pending events; drained by the UI layer each frame.
    events: Vec<GameEvent>,
}

impl Engine {
    pub fn new(start_lives: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            mode: Mode::Setup,
            queue: Vec::new(),
            queue_index: 0,
            words: Vec::new(),
            particles: Vec::new(),
            score: 0,
            lives: start_lives,
            streak: 0,
            clock: Clock::default(),
            last_spawn: 0.0,
            next_spawn_x: LEFT_MARGIN_X,
            next_id: 1,
            start_lives,
            rng,
            events: Vec::new(),
        }
    }

    /// Begin a session from free-form text. Returns false (and mutates
    /// nothing) when the text holds no words.
    pub fn start(&mut self, text: &str) -> bool {
        let queue = words::split_words(text);
        if queue.is_empty() {
            return false;
        }
        self.queue = queue;
        self.reset_session();
        self.mode = Mode::Playing;
        true
    }

    /// Back to the setup screen; clears the queue and all transient state.
    pub fn restart(&mut self) {
        self.queue.clear();
        self.reset_session();
        self.mode = Mode::Setup;
    }

    /// Manual pause toggle; no-op outside PLAYING/PAUSED.
    pub fn toggle_pause(&mut self) {
        self.mode = match self.mode {
            Mode::Playing => Mode::Paused,
            Mode::Paused => Mode::Playing,
            other => other,
        };
    }

    fn reset_session(&mut self) {
        self.queue_index = 0;
        self.words.clear();
        self.particles.clear();
        self.score = 0;
        self.streak = 0;
        self.lives = self.start_lives;
        self.clock.reset();
        self.last_spawn = 0.0;
        self.next_spawn_x = LEFT_MARGIN_X;
        self.events.clear();
    }

    /// (consumed, total) position in the word queue, for the HUD.
    pub fn progress(&self) -> (usize, usize) {
        (self.queue_index, self.queue.len())
    }

    /// Take all events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance one frame. `now_ms` is a monotonic timestamp; `settings` is
    /// read fresh every tick so mid-session changes apply immediately.
    pub fn tick(&mut self, now_ms: f64, settings: &Settings) {
        let delta = self.clock.tick(now_ms) as f32;
        if self.mode != Mode::Playing {
            return;
        }
        let settings = settings.clamped();

        if now_ms - self.last_spawn > spawn_interval_ms(settings.speed) {
            self.spawn_word(&settings);
            self.last_spawn = now_ms;
        }

        let step = speed_multiplier(settings.speed) * (delta / FRAME_REF_MS);
        let mut misses = 0u32;
        self.words.retain_mut(|word| {
            if let Some(age) = word.pop_age.as_mut() {
                *age += delta;
                return *age < POP_DURATION_MS;
            }
            word.y += step;
            if word.y > FLOOR_Y {
                misses += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..misses {
            self.miss();
            if self.mode != Mode::Playing {
                return;
            }
        }

        self.particles.retain_mut(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.life -= PARTICLE_DECAY;
            p.life > 0.0
        });

        if self.queue_index >= self.queue.len() && self.words.is_empty() {
            self.mode = Mode::Victory;
            self.events.push(GameEvent::Victory);
        }
    }

    /// Pointer tap on a word. Unknown or already-popping ids are ignored
    /// (the word may have crossed the floor in the same tick window).
    pub fn pop(&mut self, id: WordId) {
        if self.mode != Mode::Playing {
            return;
        }
        let Some(word) = self.words.iter_mut().find(|w| w.id == id) else {
            return;
        };
        if word.pop_age.is_some() {
            return;
        }
        word.pop_age = Some(0.0);
        let (x, y) = (word.x, word.y);

        self.streak += 1;
        // Bonus tier and milestone event are separate conditions: streak 6
        // still pays the +5 bonus but only streak 5, 10, ... fire the event.
        let bonus = self.streak / STREAK_MILESTONE * STREAK_MILESTONE;
        let points = BASE_POINTS + bonus;
        self.score += points;
        self.events.push(GameEvent::Pop { points });
        if self.streak % STREAK_MILESTONE == 0 {
            self.events.push(GameEvent::StreakMilestone(self.streak));
        }

        self.spawn_burst(x, y);
    }

    /// Floor crossing: streak gone, one life gone. Each simultaneous miss
    /// is reported on its own.
    fn miss(&mut self) {
        self.streak = 0;
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::Miss);
        if self.lives == 0 {
            self.mode = Mode::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    /// Place the next queued word in reading order, wrapping at the right
    /// edge. No-op once the queue is exhausted (victory is the tick's job).
    fn spawn_word(&mut self, settings: &Settings) {
        if self.queue_index >= self.queue.len() {
            return;
        }
        let text = self.queue[self.queue_index].clone();
        self.queue_index += 1;

        let width = estimated_width(&text, settings.text_size);
        let mut x = self.next_spawn_x;
        if x + width / 2.0 > RIGHT_EDGE_X {
            x = LEFT_MARGIN_X;
        }
        self.next_spawn_x = x + width + f32::from(settings.word_spacing);

        let color = self.rng.gen_range(0..theme::WORD_COLOR_COUNT);
        let id = self.next_id;
        self.next_id += 1;
        self.words.push(ActiveWord {
            id,
            text,
            x,
            y: SPAWN_Y,
            color,
            pop_age: None,
        });
    }

    fn spawn_burst(&mut self, x: f32, y: f32) {
        for _ in 0..PARTICLES_PER_BURST {
            let id = self.next_id;
            self.next_id += 1;
            self.particles.push(Particle {
                id,
                x,
                y,
                vx: self.rng.gen_range(-PARTICLE_SPREAD..PARTICLE_SPREAD),
                vy: self.rng.gen_range(-PARTICLE_SPREAD..PARTICLE_SPREAD),
                life: 1.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(speed: u8) -> Settings {
        Settings {
            speed,
            text_size: 1.5,
            word_spacing: 5,
        }
    }

    fn started(text: &str) -> Engine {
        let mut e = Engine::new(DEFAULT_LIVES, Some(7));
        assert!(e.start(text));
        e
    }

    #[test]
    fn test_clock_first_tick_is_zero_then_caps() {
        let mut c = Clock::default();
        assert_eq!(c.tick(1234.0), 0.0);
        assert_eq!(c.tick(1250.0), 16.0);
        // Stall: capped at 50, never propagated unbounded
        assert_eq!(c.tick(9999.0), 50.0);
        c.reset();
        assert_eq!(c.tick(10_000.0), 0.0);
    }

    #[test]
    fn test_spawn_interval_formula() {
        assert_eq!(spawn_interval_ms(3), 3100.0);
        assert_eq!(spawn_interval_ms(1), 3700.0);
        // Clamped at the floor
        assert_eq!(spawn_interval_ms(10), 1000.0);
    }

    #[test]
    fn test_speed_multiplier_formula() {
        assert!((speed_multiplier(5) - 0.095).abs() < 1e-6);
        assert!((speed_multiplier(3) - 0.065).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input_does_not_start() {
        let mut e = Engine::new(DEFAULT_LIVES, Some(1));
        assert!(!e.start(""));
        assert!(!e.start("   \t\n  "));
        assert_eq!(e.mode, Mode::Setup);
        assert!(e.words.is_empty());
    }

    #[test]
    fn test_first_word_spawns_at_left_margin_above_field() {
        let mut e = started("Ala ma kota.");
        let s = settings(3);
        e.tick(4000.0, &s);
        assert_eq!(e.words.len(), 1);
        assert_eq!(e.words[0].text, "Ala");
        assert!((e.words[0].x - 10.0).abs() < 1e-6);
        assert!((e.words[0].y - SPAWN_Y).abs() < 1e-6);
        assert_eq!(e.progress(), (1, 3));
    }

    #[test]
    fn test_no_spawn_before_interval_elapses() {
        let mut e = started("jeden dwa");
        let s = settings(3);
        e.tick(0.0, &s);
        e.tick(3100.0, &s); // not strictly past 3100
        assert!(e.words.is_empty());
        e.tick(3101.0, &s);
        assert_eq!(e.words.len(), 1);
    }

    #[test]
    fn test_reading_order_layout_and_wrap() {
        // 7 two-char words at text_size 1.5: width (4+4)*1.2 = 9.6,
        // cursor advance 9.6 + 5 = 14.6 per word. The 7th would start at
        // 97.6 and must wrap back to the margin.
        let mut e = started("ab cd ef gh ij kl mn");
        let s = settings(3);
        for k in 1..=7u32 {
            e.tick(f64::from(k) * 3101.0, &s);
        }
        assert_eq!(e.words.len(), 7);
        for (i, word) in e.words.iter().take(6).enumerate() {
            let expected = 10.0 + 14.6 * i as f32;
            assert!(
                (word.x - expected).abs() < 1e-3,
                "word {i} at {} expected {expected}",
                word.x
            );
        }
        assert!((e.words[6].x - LEFT_MARGIN_X).abs() < 1e-3);
        // Wrap keeps every estimated right edge inside the field
        for word in &e.words {
            let half = estimated_width(&word.text, s.text_size) / 2.0;
            assert!(word.x + half <= RIGHT_EDGE_X + 1e-3);
        }
    }

    #[test]
    fn test_motion_is_frame_rate_normalised() {
        let mut e = started("slowo");
        let s = settings(3);
        e.tick(4000.0, &s); // first tick: spawn, delta 0, no motion
        assert!((e.words[0].y - SPAWN_Y).abs() < 1e-6);
        e.tick(4016.0, &s);
        assert!((e.words[0].y - (SPAWN_Y + 0.065)).abs() < 1e-4);
    }

    #[test]
    fn test_floor_crossing_worked_example() {
        // speed 5: multiplier 0.095; y=90 + one 16 ms frame → 90.095, no miss
        let s = settings(5);
        let mut e = started("slowo");
        e.tick(4000.0, &s);
        e.words[0].y = 90.0;
        e.tick(4016.0, &s);
        assert_eq!(e.words.len(), 1);
        assert!((e.words[0].y - 90.095).abs() < 1e-4);
        assert_eq!(e.lives, DEFAULT_LIVES);

        // but from 94.96 the same step crosses 95 → miss
        e.words[0].y = 94.96;
        e.tick(4032.0, &s);
        assert!(e.words.is_empty());
        assert_eq!(e.lives, DEFAULT_LIVES - 1);
        assert_eq!(e.streak, 0);
        assert!(e.drain_events().contains(&GameEvent::Miss));
    }

    #[test]
    fn test_miss_resets_streak_but_not_score() {
        let s = settings(3);
        let mut e = started("a b c");
        e.tick(4000.0, &s);
        let id = e.words[0].id;
        e.pop(id);
        assert_eq!(e.streak, 1);
        let score_before = e.score;
        e.tick(7200.0, &s); // spawns the second word
        e.words.iter_mut().find(|w| !w.is_popping()).unwrap().y = 96.0;
        e.tick(7216.0, &s);
        assert_eq!(e.streak, 0);
        assert_eq!(e.score, score_before);
    }

    #[test]
    fn test_pop_scoring_and_milestones() {
        let s = settings(1);
        let mut e = started("a b c d e f");
        for k in 1..=6u32 {
            e.tick(f64::from(k) * 3701.0, &s);
        }
        assert_eq!(e.words.len(), 6);
        let ids: Vec<WordId> = e.words.iter().map(|w| w.id).collect();

        // Pops 1–4: 10 each; pop 5: 10 + 5 with milestone; pop 6: 10 + 5.
        for id in &ids[..4] {
            e.pop(*id);
        }
        assert_eq!(e.score, 40);
        e.pop(ids[4]);
        assert_eq!(e.score, 55);
        assert_eq!(e.streak, 5);
        e.pop(ids[5]);
        assert_eq!(e.score, 70);
        assert_eq!(e.streak, 6);

        let milestones: Vec<_> = e
            .drain_events()
            .into_iter()
            .filter(|ev| matches!(ev, GameEvent::StreakMilestone(_)))
            .collect();
        assert_eq!(milestones, vec![GameEvent::StreakMilestone(5)]);
    }

    #[test]
    fn test_pop_unknown_or_popping_id_is_ignored() {
        let s = settings(3);
        let mut e = started("a");
        e.tick(4000.0, &s);
        let id = e.words[0].id;
        e.pop(9999);
        assert_eq!(e.score, 0);
        e.pop(id);
        e.pop(id); // second tap lands on a popping word
        assert_eq!(e.score, 10);
        assert_eq!(e.streak, 1);
    }

    #[test]
    fn test_popping_word_is_exempt_from_floor_then_expires() {
        let s = settings(10);
        let mut e = started("a b");
        e.tick(1001.0, &s);
        let id = e.words[0].id;
        e.words[0].y = 94.0;
        e.pop(id);
        // Popping words neither move nor miss while the animation runs
        e.tick(1017.0, &s);
        e.tick(1033.0, &s);
        assert!(e.words.iter().any(|w| w.id == id));
        assert_eq!(e.lives, DEFAULT_LIVES);
        // ...and are removed once 300 ms have accrued
        let mut t = 1033.0;
        for _ in 0..20 {
            t += 16.0;
            e.tick(t, &s);
        }
        assert!(!e.words.iter().any(|w| w.id == id));
    }

    #[test]
    fn test_particle_burst_and_linear_decay() {
        let s = settings(3);
        let mut e = started("a b");
        e.tick(4000.0, &s);
        let id = e.words[0].id;
        e.pop(id);
        assert_eq!(e.particles.len(), 8);
        assert!(e.particles.iter().all(|p| (p.life - 1.0).abs() < 1e-6));
        assert!(
            e.particles
                .iter()
                .all(|p| p.vx.abs() <= PARTICLE_SPREAD && p.vy.abs() <= PARTICLE_SPREAD)
        );
        let mut t = 4000.0;
        for step in 1..=19u32 {
            t += 16.0;
            e.tick(t, &s);
            let expected = 1.0 - 0.05 * step as f32;
            for p in &e.particles {
                assert!((p.life - expected).abs() < 1e-4);
                assert!(p.life > 0.0 && p.life <= 1.0);
            }
        }
        t += 16.0;
        e.tick(t, &s); // life reaches 0 → all discarded
        assert!(e.particles.is_empty());
    }

    #[test]
    fn test_lives_reach_zero_transitions_to_game_over() {
        let s = settings(3);
        let mut e = Engine::new(1, Some(7));
        assert!(e.start("jedno slowo zostaje"));
        e.tick(4000.0, &s);
        e.words[0].y = 96.0;
        e.tick(4016.0, &s);
        assert_eq!(e.lives, 0);
        assert_eq!(e.mode, Mode::GameOver);
        assert!(e.drain_events().contains(&GameEvent::GameOver));
        // Terminal: further ticks and pause toggles change nothing
        e.toggle_pause();
        assert_eq!(e.mode, Mode::GameOver);
        e.tick(8000.0, &s);
        assert_eq!(e.lives, 0);
    }

    #[test]
    fn test_lives_never_negative_on_simultaneous_misses() {
        let s = settings(1);
        let mut e = Engine::new(2, Some(7));
        assert!(e.start("a b c"));
        for k in 1..=3u32 {
            e.tick(f64::from(k) * 3701.0, &s);
        }
        for w in &mut e.words {
            w.y = 96.0;
        }
        e.tick(3.0 * 3701.0 + 16.0, &s);
        assert_eq!(e.lives, 0);
        assert_eq!(e.mode, Mode::GameOver);
    }

    #[test]
    fn test_victory_once_queue_exhausted_and_field_empty() {
        let s = settings(3);
        let mut e = started("ostatnie");
        e.tick(4000.0, &s);
        let id = e.words[0].id;
        e.pop(id);
        // Not victory yet: the popped word is mid-animation
        e.tick(4016.0, &s);
        assert_eq!(e.mode, Mode::Playing);
        let mut t = 4016.0;
        for _ in 0..25 {
            t += 16.0;
            e.tick(t, &s);
        }
        assert_eq!(e.mode, Mode::Victory);
        assert!(e.drain_events().contains(&GameEvent::Victory));
    }

    #[test]
    fn test_pause_gates_simulation_without_time_jump() {
        let s = settings(3);
        let mut e = started("slowo dluzsze");
        e.tick(4000.0, &s);
        e.tick(4016.0, &s);
        let y = e.words[0].y;
        e.toggle_pause();
        assert_eq!(e.mode, Mode::Paused);
        // Clock baseline still advances while paused
        e.tick(9000.0, &s);
        assert!((e.words[0].y - y).abs() < 1e-6);
        e.toggle_pause();
        // One 16 ms frame of motion, not five seconds' worth
        e.tick(9016.0, &s);
        assert!((e.words[0].y - (y + 0.065)).abs() < 1e-4);
    }

    #[test]
    fn test_pause_is_noop_outside_play() {
        let mut e = Engine::new(DEFAULT_LIVES, Some(7));
        e.toggle_pause();
        assert_eq!(e.mode, Mode::Setup);
    }

    #[test]
    fn test_restart_clears_everything() {
        let s = settings(3);
        let mut e = started("a b c");
        e.tick(4000.0, &s);
        let id = e.words[0].id;
        e.pop(id);
        e.restart();
        assert_eq!(e.mode, Mode::Setup);
        assert!(e.words.is_empty());
        assert!(e.particles.is_empty());
        assert_eq!(e.score, 0);
        assert_eq!(e.streak, 0);
        assert_eq!(e.lives, DEFAULT_LIVES);
        assert_eq!(e.progress(), (0, 0));
        // A fresh session starts from the margin again
        assert!(e.start("x y"));
        e.tick(20_000.0, &s);
        assert!((e.words[0].x - LEFT_MARGIN_X).abs() < 1e-6);
    }

    #[test]
    fn test_active_ids_unique_and_queue_cursor_monotonic() {
        let s = settings(10);
        let mut e = started("a b c d e");
        let mut t = 0.0;
        let mut last_consumed = 0;
        for _ in 0..400 {
            t += 16.0;
            e.tick(t, &s);
            let (consumed, total) = e.progress();
            assert!(consumed >= last_consumed && consumed <= total);
            last_consumed = consumed;
            let mut ids: Vec<WordId> = e.words.iter().map(|w| w.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), e.words.len());
        }
    }

    #[test]
    fn test_settings_changes_apply_next_tick() {
        let mut e = started("slowo");
        e.tick(4000.0, &settings(3));
        e.tick(4016.0, &settings(3));
        let y = e.words[0].y;
        // Speed bumped mid-session: the very next tick uses it
        e.tick(4032.0, &settings(10));
        assert!((e.words[0].y - (y + 0.17)).abs() < 1e-4);
    }
}

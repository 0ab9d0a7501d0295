//! Wordpop — word-popping reading game for early readers in the terminal.

mod app;
mod game;
mod input;
mod theme;
mod ui;
mod words;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;

/// Options derived from CLI that the frame loop needs but keys cannot change.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub lives: u32,
    pub seed: Option<u64>,
    /// When set, the setup screen is skipped and this text starts immediately.
    pub start_text: Option<String>,
    pub frame_rate: f64,
}

/// Live session knobs, adjustable mid-game from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Fall speed level, 1..=10.
    pub speed: u8,
    /// Word bubble scale, 1.0..=5.0.
    pub text_size: f32,
    /// Horizontal gap between spawned words, 1..=20.
    pub word_spacing: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: 3,
            text_size: 1.5,
            word_spacing: 5,
        }
    }
}

impl Settings {
    /// Copy with every knob pulled back into its legal range.
    pub fn clamped(self) -> Self {
        Self {
            speed: self.speed.clamp(1, 10),
            text_size: self.text_size.clamp(1.0, 5.0),
            word_spacing: self.word_spacing.clamp(1, 20),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_default();
    let settings = Settings {
        speed: args.speed,
        text_size: args.text_size,
        word_spacing: args.word_spacing,
    }
    .clamped();
    let start_text = match (&args.text, &args.file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading word list {}", path.display()))?,
        ),
        (None, None) => None,
    };
    let config = GameConfig {
        lives: args.lives,
        seed: args.seed,
        start_text,
        frame_rate: args.frame_rate,
    };
    let mut app = App::new(config, settings, theme);
    app.run()?;
    Ok(())
}

/// Word-popping reading game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "wordpop",
    version,
    about = "Word-popping reading game for early readers. Words drift down the screen; click them to pop them before they reach the floor.",
    long_about = "Wordpop turns any text into a reading game.\n\n\
        Paste a sentence (or pick a sample with F1-F3), press Enter, and the words \
        drift down the field one by one. Click a word to pop it: each pop scores \
        points, popping in a row builds a streak, and every fifth streak raises the \
        bonus. A word that reaches the floor costs a life.\n\n\
        CONTROLS:\n  Mouse click  Pop word    P / Space  Pause      R          Restart\n  Up/Down      Speed       PgUp/PgDn  Text size  Left/Right Word spacing\n  Q / Esc      Quit\n\n\
        Use --theme to load a btop-style theme file, or --text/--file to skip the setup screen."
)]
pub struct Args {
    /// Fall speed level 1-10 (higher = faster falling words, shorter spawn gaps).
    #[arg(short, long, default_value = "3", value_name = "LEVEL")]
    pub speed: u8,

    /// Word bubble scale 1.0-5.0.
    #[arg(long, default_value = "1.5", value_name = "SCALE")]
    pub text_size: f32,

    /// Horizontal gap between consecutive words, 1-20.
    #[arg(long, default_value = "5", value_name = "GAP")]
    pub word_spacing: u8,

    /// Lives before game over.
    #[arg(short, long, default_value = "5", value_name = "N")]
    pub lives: u32,

    /// Seed the spawn/particle randomness (reproducible sessions).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses the pastel default if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Start immediately with this text instead of the setup screen.
    #[arg(long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Start immediately with the contents of this file (ignored when --text is set).
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<std::path::PathBuf>,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,
}

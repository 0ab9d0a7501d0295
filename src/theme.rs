//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Number of word colours; a spawned word's colour index selects one
/// matched background/foreground pair.
pub const WORD_COLOR_COUNT: u8 = 5;

/// Word palette and UI colours, optionally loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Word bubble (bg, fg) pairs, index 0..=4: yellow, pink, blue, green, purple.
    pub words: [(Color, Color); WORD_COLOR_COUNT as usize],
    /// Play field background.
    pub bg: Color,
    /// Borders / dividers.
    pub div_line: Color,
    /// Text (HUD values, help lines).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Pop burst particles.
    pub particle: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::pastel_default()
    }
}

impl Theme {
    /// Hardcoded defaults: pastel word bubbles with dark matching text
    /// (each pair is a light 200-weight bg with its 800-weight fg).
    pub fn pastel_default() -> Self {
        Self {
            words: [
                (parse_hex("#FEF08A").unwrap(), parse_hex("#854D0E").unwrap()), // yellow
                (parse_hex("#FBCFE8").unwrap(), parse_hex("#9D174D").unwrap()), // pink
                (parse_hex("#BFDBFE").unwrap(), parse_hex("#1E40AF").unwrap()), // blue
                (parse_hex("#BBF7D0").unwrap(), parse_hex("#166534").unwrap()), // green
                (parse_hex("#E9D5FF").unwrap(), parse_hex("#6B21A8").unwrap()), // purple
            ],
            bg: parse_hex("#1E293B").unwrap(),
            div_line: parse_hex("#334155").unwrap(),
            main_fg: parse_hex("#CBD5E1").unwrap(),
            title: parse_hex("#F472B6").unwrap(),
            particle: parse_hex("#FFD700").unwrap(), // gold
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"`.
    /// Recognised keys: `bg`, `div_line`, `main_fg`, `title`, `particle`,
    /// and `word{0..4}_bg` / `word{0..4}_fg`. Missing keys keep their
    /// defaults; a missing path falls back to the default theme entirely.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        Ok(Self::from_map(&map))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let mut theme = Self::default();
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        if let Some(c) = get("bg") {
            theme.bg = c;
        }
        if let Some(c) = get("div_line") {
            theme.div_line = c;
        }
        if let Some(c) = get("main_fg") {
            theme.main_fg = c;
        }
        if let Some(c) = get("title") {
            theme.title = c;
        }
        if let Some(c) = get("particle") {
            theme.particle = c;
        }
        for i in 0..WORD_COLOR_COUNT as usize {
            if let Some(c) = get(&format!("word{i}_bg")) {
                theme.words[i].0 = c;
            }
            if let Some(c) = get(&format!("word{i}_fg")) {
                theme.words[i].1 = c;
            }
        }
        theme
    }

    /// (bg, fg) pair for a word colour index.
    #[inline]
    pub fn word_style(&self, index: u8) -> (Color, Color) {
        self.words[(index as usize) % self.words.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let (r, g, b) = if s.len() == 6 {
        let r =
            u8::from_str_radix(&s[0..2], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let g =
            u8::from_str_radix(&s[2..4], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        let b =
            u8::from_str_radix(&s[4..6], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))?;
        (r, g, b)
    } else if s.len() == 3 {
        let r = u8::from_str_radix(&s[0..1], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let g = u8::from_str_radix(&s[1..2], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        let b = u8::from_str_radix(&s[2..3], 16)
            .map_err(|_| ThemeError::InvalidHex(s.to_string()))?
            * 17;
        (r, g, b)
    } else {
        return Err(ThemeError::InvalidHex(s.to_string()));
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#FEF08A").unwrap();
        assert!(matches!(c, Color::Rgb(0xFE, 0xF0, 0x8A)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[word0_bg]="#FEF08A""##);
        assert_eq!(map.get("word0_bg"), Some(&"#FEF08A".to_string()));
    }

    #[test]
    fn test_from_map_overrides_single_pair() {
        let src = r##"
            theme[word2_bg]="#000000"
            theme[word2_fg]="#FFFFFF"
        "##;
        let theme = Theme::from_map(&parse_theme_file(src));
        assert!(matches!(theme.word_style(2).0, Color::Rgb(0, 0, 0)));
        assert!(matches!(theme.word_style(2).1, Color::Rgb(255, 255, 255)));
        // Untouched entries keep defaults
        assert!(matches!(
            theme.word_style(0).0,
            Color::Rgb(0xFE, 0xF0, 0x8A)
        ));
    }

    #[test]
    fn test_word_style_wraps_index() {
        let theme = Theme::default();
        assert_eq!(theme.word_style(0), theme.word_style(WORD_COLOR_COUNT));
    }
}

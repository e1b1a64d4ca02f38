use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::reveal::{DEFAULT_DELAY, MIN_DELAY};
use crate::types::Style;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial per-character delay in seconds.
    pub delay: f64,
    pub origin_x: i32,
    pub origin_y: i32,
    /// `plain`, `block`, or a path to a JSON bitmap font.
    pub font: String,
    pub frame_delay_ms: u64,
    pub tab_width: u16,
    /// Reveal every overdue character in one update instead of one per frame.
    pub catch_up: bool,
    pub cache_lines: bool,
    pub show_status: bool,
    pub style: Style,
    pub key_bindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub faster: String,
    pub slower: String,
    pub quit: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            delay: DEFAULT_DELAY,
            origin_x: 2,
            origin_y: 1,
            font: "plain".into(),
            frame_delay_ms: 16,
            tab_width: 4,
            catch_up: false,
            cache_lines: true,
            show_status: false,
            style: Style::default(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            faster: "Up".into(),
            slower: "Down".into(),
            quit: "Esc".into(),
        }
    }
}

impl PlayerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: PlayerConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// Clamp values the player cannot work with.
    pub fn normalized(mut self) -> Self {
        if self.delay.is_nan() || self.delay < MIN_DELAY {
            log::warn!(
                "Configured delay {} is below the minimum, using {MIN_DELAY}",
                self.delay
            );
            self.delay = MIN_DELAY;
        }
        if self.tab_width == 0 {
            self.tab_width = 1;
        }
        self
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(rest) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return single_char(rest).is_some_and(|c| event.code == KeyCode::Char(c));
    }

    // Plain bindings never fire with Ctrl or Alt held.
    if event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return false;
    }

    match binding {
        "Up" => event.code == KeyCode::Up,
        "Down" => event.code == KeyCode::Down,
        "Left" => event.code == KeyCode::Left,
        "Right" => event.code == KeyCode::Right,
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "PageUp" => event.code == KeyCode::PageUp,
        "PageDown" => event.code == KeyCode::PageDown,
        s => {
            if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                return event.code == KeyCode::F(n);
            }
            single_char(s).is_some_and(|c| event.code == KeyCode::Char(c))
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

//! Typewriter — reveals the source text one character at a time.
//!
//! The typewriter owns the full content and the displayed prefix. Each
//! `update` compares the time since the last reveal with the current
//! per-character delay and appends the next character once the delay has
//! been exceeded. It knows nothing about fonts, lines or the terminal.

use std::time::{Duration, Instant};

use crate::source::TextSource;

/// Smallest per-character delay, in seconds.
pub const MIN_DELAY: f64 = 0.01;
pub const DEFAULT_DELAY: f64 = 0.01;
/// Amount one faster/slower key press changes the delay by.
pub const DELAY_STEP: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct Typewriter {
    content: Vec<char>,
    displayed: String,
    index: usize,
    delay: f64,
    last_reveal: Instant,
    catch_up: bool,
}

impl Typewriter {
    pub fn new(source: &TextSource, delay: f64) -> Self {
        Typewriter {
            content: source.as_str().chars().collect(),
            displayed: String::with_capacity(source.as_str().len()),
            index: 0,
            delay: clamp_delay(delay),
            last_reveal: Instant::now(),
            catch_up: false,
        }
    }

    /// Reveal every character whose delay has fully elapsed instead of at
    /// most one per update.
    pub fn with_catch_up(mut self, catch_up: bool) -> Self {
        self.catch_up = catch_up;
        self
    }

    /// Restart the delay countdown from `now`.
    pub fn start_at(&mut self, now: Instant) {
        self.last_reveal = now;
    }

    pub fn update(&mut self) -> usize {
        self.update_at(Instant::now())
    }

    /// Advance the reveal as of `now`. Returns how many characters were
    /// appended.
    pub fn update_at(&mut self, now: Instant) -> usize {
        if self.is_finished() {
            return 0;
        }
        let elapsed = now.saturating_duration_since(self.last_reveal).as_secs_f64();
        if elapsed <= self.delay {
            return 0;
        }

        let due = if self.catch_up {
            (elapsed / self.delay).floor() as usize
        } else {
            1
        };
        let count = due.min(self.content.len() - self.index);
        self.displayed
            .extend(&self.content[self.index..self.index + count]);
        self.index += count;

        self.last_reveal = if self.catch_up {
            self.last_reveal + Duration::from_secs_f64(self.delay * due as f64)
        } else {
            now
        };
        count
    }

    /// Set the per-character delay, clamped to `MIN_DELAY`.
    pub fn set_speed(&mut self, delay: f64) {
        self.delay = clamp_delay(delay);
    }

    pub fn speed(&self) -> f64 {
        self.delay
    }

    pub fn faster(&mut self) {
        self.set_speed(self.delay - DELAY_STEP);
    }

    pub fn slower(&mut self) {
        self.set_speed(self.delay + DELAY_STEP);
    }

    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    /// Number of characters revealed so far.
    pub fn revealed(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.content.len()
    }
}

fn clamp_delay(delay: f64) -> f64 {
    // f64::max returns the other operand for NaN.
    delay.max(MIN_DELAY)
}

//! Player — the runtime playback controller.
//!
//! Shows a splash screen until a key is pressed, then types the source
//! text out frame by frame. Every loop iteration drains pending input,
//! advances the typewriter, redraws the canvas and presents it, then
//! sleeps for the frame delay.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{KeyBindings, PlayerConfig, matches_binding};
use crate::font::Font;
use crate::menubar::{draw_menu, draw_menu_item};
use crate::renderer::{LineRenderer, RenderReport};
use crate::reveal::Typewriter;
use crate::source::TextSource;
use crate::surface::Surface;
use crate::types::{Cell, Grid, Style};

const SPLASH: &str = "Press [any key] to start, [Esc] to exit...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForKeypress,
    Typing,
    /// Everything revealed; frames keep being drawn.
    Idle,
    Closed,
}

pub struct Player {
    typewriter: Typewriter,
    renderer: LineRenderer,
    font: Font,
    bindings: KeyBindings,
    canvas: Grid,
    phase: Phase,
    frame_delay: Duration,
    origin: (i32, i32),
    show_status: bool,
    last_report: RenderReport,
}

impl Player {
    pub fn new(source: &TextSource, config: &PlayerConfig, font: Font, size: (u16, u16)) -> Self {
        let (width, height) = size;
        let typewriter = Typewriter::new(source, config.delay).with_catch_up(config.catch_up);
        let renderer = LineRenderer::new(
            config.origin_x,
            config.origin_y,
            text_height(height, config.show_status),
            config.style.clone(),
        )
        .with_cache(config.cache_lines);
        Self {
            typewriter,
            renderer,
            font,
            bindings: config.key_bindings.clone(),
            canvas: Grid::new(width, height),
            phase: Phase::WaitingForKeypress,
            frame_delay: Duration::from_millis(config.frame_delay_ms),
            origin: (config.origin_x, config.origin_y),
            show_status: config.show_status,
            last_report: RenderReport::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    pub fn renderer(&self) -> &LineRenderer {
        &self.renderer
    }

    pub fn canvas(&self) -> &Grid {
        &self.canvas
    }

    /// Run until the user quits.
    pub fn run<S: Surface>(&mut self, surface: &mut S) -> Result<()> {
        while self.phase != Phase::Closed {
            for event in surface.poll_events()? {
                self.handle_event(&event);
            }
            if self.phase == Phase::Closed {
                break;
            }
            self.tick();
            self.draw();
            surface.present(&self.canvas)?;
            thread::sleep(self.frame_delay);
        }
        log::debug!(
            "Closed after revealing {}/{} characters",
            self.typewriter.revealed(),
            self.typewriter.len()
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Resize(width, height) => {
                self.canvas.resize(*width, *height);
                self.renderer
                    .set_screen_height(text_height(*height, self.show_status));
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        let interrupt =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if interrupt || matches_binding(&self.bindings.quit, key) {
            self.phase = Phase::Closed;
            return;
        }

        match self.phase {
            Phase::WaitingForKeypress => {
                self.typewriter.start_at(Instant::now());
                self.phase = if self.typewriter.is_finished() {
                    Phase::Idle
                } else {
                    Phase::Typing
                };
            }
            Phase::Typing | Phase::Idle => {
                if matches_binding(&self.bindings.faster, key) {
                    self.typewriter.faster();
                } else if matches_binding(&self.bindings.slower, key) {
                    self.typewriter.slower();
                }
            }
            Phase::Closed => {}
        }
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    pub fn tick(&mut self) {
        if self.phase == Phase::Typing {
            self.typewriter.update();
            if self.typewriter.is_finished() {
                log::debug!("All {} characters revealed", self.typewriter.len());
                self.phase = Phase::Idle;
            }
        }
    }

    pub fn draw(&mut self) {
        self.canvas.clear();
        match self.phase {
            Phase::WaitingForKeypress => {
                let (x, y) = self.origin;
                draw_menu_item(&mut self.canvas, x, y, SPLASH);
            }
            Phase::Typing | Phase::Idle => {
                self.last_report =
                    self.renderer
                        .render(self.typewriter.displayed(), &self.font, &mut self.canvas);
                if self.show_status {
                    self.draw_status();
                }
            }
            Phase::Closed => {}
        }
    }

    fn draw_status(&mut self) {
        let Some(y) = self.canvas.height().checked_sub(1) else {
            return;
        };
        let y = y as i32;
        for x in 0..self.canvas.width() as i32 {
            self.canvas.put(x, y, Cell::default());
        }
        let faster = format!("[{}] faster", self.bindings.faster);
        let slower = format!("[{}] slower", self.bindings.slower);
        let quit = format!("[{}] quit", self.bindings.quit);
        let end = draw_menu(&mut self.canvas, 1, y, &[&faster, &slower, &quit]);

        let info = format!(
            "delay {:.2}s  {}/{}",
            self.typewriter.speed(),
            self.typewriter.revealed(),
            self.typewriter.len()
        );
        let mut x = end + 3;
        for ch in info.chars() {
            self.canvas.put(x, y, Cell::new(ch, Style::dim()));
            x += 1;
        }
        if self.last_report.skipped > 0 {
            let note = format!("  {} line(s) not drawn", self.last_report.skipped);
            for ch in note.chars() {
                self.canvas.put(x, y, Cell::new(ch, Style::bold()));
                x += 1;
            }
        }
    }
}

/// Rows available to the text; the status line takes the last one.
fn text_height(height: u16, show_status: bool) -> u16 {
    if show_status {
        height.saturating_sub(1)
    } else {
        height
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn player(text: &str, config: PlayerConfig) -> Player {
        let font = Font::load(&config.font, config.tab_width).unwrap();
        Player::new(&TextSource::from_text(text), &config, font, (80, 10))
    }

    /// Feeds one batch of events per frame and records presented frames.
    struct ScriptedSurface {
        batches: VecDeque<Vec<Event>>,
        presented: Vec<Grid>,
    }

    impl ScriptedSurface {
        fn new(batches: Vec<Vec<Event>>) -> Self {
            ScriptedSurface {
                batches: batches.into(),
                presented: Vec::new(),
            }
        }
    }

    impl Surface for ScriptedSurface {
        fn size(&self) -> Result<(u16, u16)> {
            Ok((80, 10))
        }

        fn poll_events(&mut self) -> Result<Vec<Event>> {
            // Quit once the script runs out so a broken loop cannot hang.
            Ok(self
                .batches
                .pop_front()
                .unwrap_or_else(|| vec![press(KeyCode::Esc)]))
        }

        fn present(&mut self, grid: &Grid) -> Result<()> {
            self.presented.push(grid.clone());
            Ok(())
        }
    }

    fn fast_config() -> PlayerConfig {
        PlayerConfig {
            frame_delay_ms: 0,
            ..PlayerConfig::default()
        }
    }

    #[test]
    fn splash_waits_for_a_key() {
        let mut p = player("hello", fast_config());
        p.tick();
        p.draw();
        assert_eq!(p.phase(), Phase::WaitingForKeypress);
        assert_eq!(p.typewriter().revealed(), 0);
        assert!(p.canvas().row_text(1).contains("Press [any key] to start"));

        p.handle_event(&press(KeyCode::Char('x')));
        assert_eq!(p.phase(), Phase::Typing);
    }

    #[test]
    fn escape_quits_from_splash_and_from_playback() {
        let mut p = player("hello", fast_config());
        p.handle_event(&press(KeyCode::Esc));
        assert_eq!(p.phase(), Phase::Closed);

        let mut p = player("hello", fast_config());
        p.handle_event(&press(KeyCode::Enter));
        p.handle_event(&press(KeyCode::Esc));
        assert_eq!(p.phase(), Phase::Closed);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut p = player("hello", fast_config());
        p.handle_event(&Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(p.phase(), Phase::Closed);
    }

    #[test]
    fn arrows_change_speed_only_after_splash() {
        let mut p = player(
            "hello",
            PlayerConfig {
                delay: 0.5,
                ..fast_config()
            },
        );
        // The first key only dismisses the splash.
        p.handle_event(&press(KeyCode::Up));
        assert_eq!(p.typewriter().speed(), 0.5);

        for _ in 0..50 {
            p.handle_event(&press(KeyCode::Up));
        }
        assert_eq!(p.typewriter().speed(), 0.01);
        p.handle_event(&press(KeyCode::Up));
        assert_eq!(p.typewriter().speed(), 0.01);

        p.handle_event(&press(KeyCode::Down));
        assert!((p.typewriter().speed() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut p = player("hello", fast_config());
        let mut release = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        p.handle_event(&Event::Key(release));
        assert_eq!(p.phase(), Phase::WaitingForKeypress);
    }

    #[test]
    fn resize_updates_viewport_height() {
        let mut p = player("hello", fast_config());
        p.handle_event(&Event::Resize(20, 3));
        assert_eq!(p.renderer().screen_height(), 3);
        assert_eq!((p.canvas().width(), p.canvas().height()), (20, 3));
    }

    #[test]
    fn run_types_until_idle_then_quits() {
        let mut p = player("ab", fast_config());
        let mut batches = vec![vec![press(KeyCode::Char(' '))]];
        batches.extend(std::iter::repeat_n(Vec::new(), 2000));
        let mut surface = ScriptedSurface::new(batches);

        // Pace frames until both characters are out.
        for _ in 0..2000 {
            if p.phase() == Phase::Idle {
                break;
            }
            let events = surface.poll_events().unwrap();
            for event in &events {
                p.handle_event(event);
            }
            p.tick();
            p.draw();
            surface.present(p.canvas()).unwrap();
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(p.phase(), Phase::Idle);
        assert_eq!(p.typewriter().displayed(), "ab");
        assert!(p.canvas().row_text(1).starts_with("  ab"));

        let mut surface = ScriptedSurface::new(vec![vec![], vec![press(KeyCode::Esc)]]);
        p.run(&mut surface).unwrap();
        assert_eq!(p.phase(), Phase::Closed);
        assert_eq!(surface.presented.len(), 1);
    }

    #[test]
    fn status_line_shows_delay_and_progress() {
        let mut p = player(
            "hello",
            PlayerConfig {
                show_status: true,
                ..fast_config()
            },
        );
        p.handle_event(&press(KeyCode::Enter));
        p.draw();
        let status = p.canvas().row_text(9);
        assert!(status.contains("[Up] faster"));
        assert!(status.contains("delay 0.01s  0/5"));
    }

    #[test]
    fn status_line_does_not_cover_the_typed_line() {
        let config = PlayerConfig {
            show_status: true,
            catch_up: true,
            ..fast_config()
        };
        let mut text: String = (0..30).map(|i| format!("line{i}\n")).collect();
        text.push_str("LAST");
        let font = Font::load(&config.font, config.tab_width).unwrap();
        let mut p = Player::new(&TextSource::from_text(text), &config, font, (40, 10));
        assert_eq!(p.renderer().screen_height(), 9);

        p.handle_event(&press(KeyCode::Enter));
        p.typewriter.update_at(Instant::now() + Duration::from_secs(3600));
        p.tick();
        assert_eq!(p.phase(), Phase::Idle);
        // Scrolling lags the line that overflowed by one frame.
        p.draw();
        p.draw();

        assert!(p.canvas().row_text(8).contains("LAST"));
        assert!(p.canvas().row_text(9).contains("[Up] faster"));

        p.handle_event(&Event::Resize(40, 6));
        assert_eq!(p.renderer().screen_height(), 5);
    }
}

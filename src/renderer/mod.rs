//! Renderer — draws the displayed text onto the frame buffer and scrolls.
//!
//! The displayed text is split on newlines only; a line wider than the
//! canvas is clipped, never wrapped. Every frame redraws every line from
//! the current vertical origin. After each drawn line the renderer checks
//! whether the bottom of that line has passed the viewport height and, if
//! so, moves the origin up by one line height. Lines drawn later in the
//! same frame use the moved origin.

mod cache;

use crate::font::{RasterError, Rasterize};
use crate::types::{Grid, Style};

use cache::LineCache;

/// Split displayed text into lines. Joining the result with `\n` gives the
/// input back unchanged.
pub fn split_lines(text: &str) -> std::str::Split<'_, char> {
    text.split('\n')
}

/// What happened while drawing one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub drawn: usize,
    pub skipped: usize,
    /// Number of one-line scrolls applied during the frame.
    pub scrolled: usize,
}

pub struct LineRenderer {
    origin_x: i32,
    origin_y: i32,
    screen_height: i32,
    style: Style,
    cache: Option<LineCache>,
}

impl LineRenderer {
    pub fn new(origin_x: i32, origin_y: i32, screen_height: u16, style: Style) -> Self {
        LineRenderer {
            origin_x,
            origin_y,
            screen_height: screen_height as i32,
            style,
            cache: None,
        }
    }

    /// Keep rasterized lines between frames, keyed by line content.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(LineCache::default);
        self
    }

    /// Takes effect on the next `render`; content already scrolled stays
    /// where it is.
    pub fn set_screen_height(&mut self, height: u16) {
        self.screen_height = height as i32;
    }

    pub fn screen_height(&self) -> u16 {
        self.screen_height.max(0) as u16
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub fn render(&mut self, text: &str, font: &dyn Rasterize, canvas: &mut Grid) -> RenderReport {
        let line_height = font.line_height() as i32;
        let mut report = RenderReport::default();
        let mut offset = 0;

        for (index, line) in split_lines(text).enumerate() {
            let drawn = match &mut self.cache {
                Some(cache) => match cache.get_or_rasterize(index, line, font, &self.style) {
                    Ok(raster) => {
                        canvas.blit(raster, self.origin_x, self.origin_y + offset);
                        true
                    }
                    Err(_) => false,
                },
                None => match font.rasterize(line, &self.style) {
                    Ok(raster) => {
                        canvas.blit(&raster, self.origin_x, self.origin_y + offset);
                        true
                    }
                    Err(e) => {
                        log_skipped(index, &e);
                        false
                    }
                },
            };
            offset += line_height;

            if !drawn {
                report.skipped += 1;
                continue;
            }
            report.drawn += 1;

            if self.origin_y + offset > self.screen_height {
                self.origin_y -= line_height;
                report.scrolled += 1;
            }
        }

        if let Some(cache) = &mut self.cache {
            cache.end_frame();
        }
        report
    }
}

fn log_skipped(index: usize, err: &RasterError) {
    log::warn!("Skipping line {}: {err}", index + 1);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as Counter;

    use super::*;
    use crate::types::{Cell, Raster};

    /// One-row font with a configurable line height; `!` fails to draw.
    struct TestFont {
        line_height: u16,
        calls: Counter<usize>,
    }

    impl TestFont {
        fn new(line_height: u16) -> Self {
            TestFont {
                line_height,
                calls: Counter::new(0),
            }
        }
    }

    impl Rasterize for TestFont {
        fn line_height(&self) -> u16 {
            self.line_height
        }

        fn rasterize(&self, line: &str, style: &Style) -> Result<Raster, RasterError> {
            self.calls.set(self.calls.get() + 1);
            if line.contains('!') {
                return Err(RasterError::MissingGlyph('!'));
            }
            Ok(Raster {
                rows: vec![line.chars().map(|c| Cell::new(c, style.clone())).collect()],
            })
        }
    }

    #[test]
    fn split_then_join_round_trips() {
        for text in ["", "a", "a\nb", "AB\n", "\n\n", "x\r\ny\n\nz"] {
            let joined = split_lines(text).collect::<Vec<_>>().join("\n");
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn no_scroll_while_content_fits() {
        let font = TestFont::new(20);
        let mut canvas = Grid::new(10, 100);
        let mut renderer = LineRenderer::new(0, 0, 100, Style::default());

        let report = renderer.render("1\n2\n3\n4\n5", &font, &mut canvas);
        assert_eq!(report.scrolled, 0);
        assert_eq!(renderer.origin(), (0, 0));
        assert_eq!(canvas.row_text(80), "5         ");
    }

    #[test]
    fn scrolls_one_line_per_overflowing_line() {
        let font = TestFont::new(20);
        let mut canvas = Grid::new(10, 100);

        let mut renderer = LineRenderer::new(0, 0, 100, Style::default());
        let report = renderer.render("1\n2\n3\n4\n5\n6", &font, &mut canvas);
        assert_eq!(report.scrolled, 1);
        assert_eq!(renderer.origin(), (0, -20));

        // From an origin of 50 the third to sixth lines each overflow.
        let mut renderer = LineRenderer::new(0, 50, 100, Style::default());
        let report = renderer.render("1\n2\n3\n4\n5\n6", &font, &mut canvas);
        assert_eq!(report.scrolled, 4);
        assert_eq!(renderer.origin(), (0, 50 - 4 * 20));
        let (_, y) = renderer.origin();
        assert!(y + 6 * 20 <= 100);
    }

    #[test]
    fn origin_only_moves_up() {
        let font = TestFont::new(1);
        let mut canvas = Grid::new(10, 4);
        let mut renderer = LineRenderer::new(0, 0, 4, Style::default());

        let mut last = renderer.origin().1;
        let mut text = String::new();
        for i in 0..12 {
            text.push_str(&format!("{i}\n"));
            renderer.render(&text, &font, &mut canvas);
            assert!(renderer.origin().1 <= last);
            last = renderer.origin().1;
        }
        renderer.set_screen_height(40);
        renderer.render(&text, &font, &mut canvas);
        assert_eq!(renderer.origin().1, last);
    }

    #[test]
    fn failed_line_is_skipped_but_keeps_its_slot() {
        let font = TestFont::new(1);
        let mut canvas = Grid::new(4, 5);
        let mut renderer = LineRenderer::new(1, 1, 5, Style::default());

        let report = renderer.render("ab\nno!\ncd", &font, &mut canvas);
        assert_eq!(report, RenderReport { drawn: 2, skipped: 1, scrolled: 0 });
        assert_eq!(canvas.row_text(1), " ab ");
        assert_eq!(canvas.row_text(2), "    ");
        assert_eq!(canvas.row_text(3), " cd ");
    }

    #[test]
    fn cache_reuses_rasters_across_frames() {
        let font = TestFont::new(1);
        let mut canvas = Grid::new(8, 8);
        let mut renderer = LineRenderer::new(0, 0, 8, Style::default()).with_cache(true);

        renderer.render("one\ntwo\nbad!", &font, &mut canvas);
        assert_eq!(font.calls.get(), 3);
        renderer.render("one\ntwo\nbad!", &font, &mut canvas);
        assert_eq!(font.calls.get(), 3);
        renderer.render("one\ntwo\nbad!\nt", &font, &mut canvas);
        assert_eq!(font.calls.get(), 4);
        assert_eq!(canvas.row_text(3), "t       ");
    }

    #[test]
    fn cached_failed_line_keeps_its_slot() {
        let font = TestFont::new(1);
        let mut canvas = Grid::new(4, 5);
        let mut renderer = LineRenderer::new(1, 1, 5, Style::default()).with_cache(true);

        for _ in 0..2 {
            canvas.clear();
            let report = renderer.render("ab\nno!\ncd", &font, &mut canvas);
            assert_eq!(report, RenderReport { drawn: 2, skipped: 1, scrolled: 0 });
            assert_eq!(canvas.row_text(1), " ab ");
            assert_eq!(canvas.row_text(2), "    ");
            assert_eq!(canvas.row_text(3), " cd ");
        }
        assert_eq!(font.calls.get(), 3);
    }
}

//! Fonts — turn one line of text into a `Raster`.
//!
//! Two kinds exist: `plain`, where every character is one terminal cell,
//! and bitmap fonts, where every character is a block of filled cells.
//! A bitmap font is either the built-in `block` font or a JSON font file.

mod block;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use unicode_width::UnicodeWidthChar;

use crate::types::{CONTINUATION, Cell, Raster, Style};

/// Turn a single line (no `\n`) into cells.
pub trait Rasterize {
    /// Vertical distance between the tops of two consecutive lines.
    fn line_height(&self) -> u16;

    fn rasterize(&self, line: &str, style: &Style) -> Result<Raster, RasterError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RasterError {
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),
    #[error("cannot draw control character {0:?}")]
    Unprintable(char),
}

#[derive(Debug, Clone)]
pub enum Font {
    Plain(PlainFont),
    Bitmap(BitmapFont),
}

impl Font {
    /// Resolve a font by name (`plain`, `block`) or by path to a JSON
    /// font file.
    pub fn load(name: &str, tab_width: u16) -> Result<Self> {
        match name {
            "plain" => Ok(Font::Plain(PlainFont::new(tab_width))),
            "block" => Ok(Font::Bitmap(block::font())),
            path => BitmapFont::load(Path::new(path)).map(Font::Bitmap),
        }
    }
}

impl Rasterize for Font {
    fn line_height(&self) -> u16 {
        match self {
            Font::Plain(f) => f.line_height(),
            Font::Bitmap(f) => f.line_height(),
        }
    }

    fn rasterize(&self, line: &str, style: &Style) -> Result<Raster, RasterError> {
        match self {
            Font::Plain(f) => f.rasterize(line, style),
            Font::Bitmap(f) => f.rasterize(line, style),
        }
    }
}

// ---------------------------------------------------------------------------
// Plain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlainFont {
    tab_width: u16,
}

impl PlainFont {
    pub fn new(tab_width: u16) -> Self {
        PlainFont {
            tab_width: tab_width.max(1),
        }
    }
}

impl Rasterize for PlainFont {
    fn line_height(&self) -> u16 {
        1
    }

    fn rasterize(&self, line: &str, style: &Style) -> Result<Raster, RasterError> {
        let tab = self.tab_width as usize;
        let mut row: Vec<Cell> = Vec::with_capacity(line.len());
        for ch in line.chars() {
            match ch {
                '\r' => {}
                '\t' => {
                    let pad = tab - row.len() % tab;
                    row.extend(std::iter::repeat_n(Cell::new(' ', style.clone()), pad));
                }
                c if c.is_control() => return Err(RasterError::Unprintable(c)),
                c => match c.width() {
                    Some(0) | None => {}
                    Some(2) => {
                        row.push(Cell::new(c, style.clone()));
                        row.push(Cell::new(CONTINUATION, style.clone()));
                    }
                    Some(_) => row.push(Cell::new(c, style.clone())),
                },
            }
        }
        Ok(Raster { rows: vec![row] })
    }
}

// ---------------------------------------------------------------------------
// Bitmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BitmapFont {
    pub height: u16,
    /// Blank columns between two glyphs.
    pub spacing: u16,
    /// Blank rows between two lines.
    pub line_gap: u16,
    pub fill: char,
    pub glyphs: HashMap<char, Vec<String>>,
}

/// On-disk shape of a bitmap font.
#[derive(Debug, Deserialize)]
struct FontFile {
    height: u16,
    #[serde(default = "default_one")]
    spacing: u16,
    #[serde(default = "default_one")]
    line_gap: u16,
    #[serde(default = "default_fill")]
    fill: char,
    glyphs: BTreeMap<String, Vec<String>>,
}

fn default_one() -> u16 {
    1
}

fn default_fill() -> char {
    '█'
}

impl BitmapFont {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to load font {}", path.display()))?;
        let file: FontFile = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse font {}", path.display()))?;
        Self::from_file(file).with_context(|| format!("Invalid font {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_file(serde_json::from_str(json)?)
    }

    fn from_file(file: FontFile) -> Result<Self> {
        if file.height == 0 {
            bail!("height must be at least 1");
        }
        let mut glyphs = HashMap::with_capacity(file.glyphs.len());
        for (key, rows) in file.glyphs {
            let mut chars = key.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => bail!("glyph key {key:?} must be a single character"),
            };
            if rows.len() != file.height as usize {
                bail!(
                    "glyph {ch:?} has {} rows, expected {}",
                    rows.len(),
                    file.height
                );
            }
            let width = rows[0].chars().count();
            if rows.iter().any(|r| r.chars().count() != width) {
                bail!("glyph {ch:?} has inconsistent row widths");
            }
            glyphs.insert(ch, rows);
        }
        if glyphs.is_empty() {
            bail!("font has no glyphs");
        }
        Ok(BitmapFont {
            height: file.height,
            spacing: file.spacing,
            line_gap: file.line_gap,
            fill: file.fill,
            glyphs,
        })
    }

    /// Look up `ch`, folding to ASCII uppercase when the exact character
    /// is absent.
    pub fn glyph(&self, ch: char) -> Option<&[String]> {
        self.glyphs
            .get(&ch)
            .or_else(|| self.glyphs.get(&ch.to_ascii_uppercase()))
            .map(Vec::as_slice)
    }
}

impl Rasterize for BitmapFont {
    fn line_height(&self) -> u16 {
        self.height + self.line_gap
    }

    fn rasterize(&self, line: &str, style: &Style) -> Result<Raster, RasterError> {
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); self.height as usize];
        let mut first = true;
        for ch in line.chars() {
            if ch == '\r' {
                continue;
            }
            let lookup = if ch == '\t' { ' ' } else { ch };
            let glyph = self.glyph(lookup).ok_or(if ch.is_control() {
                RasterError::Unprintable(ch)
            } else {
                RasterError::MissingGlyph(ch)
            })?;
            if !first {
                for row in &mut rows {
                    row.extend(std::iter::repeat_n(Cell::default(), self.spacing as usize));
                }
            }
            for (row, bits) in rows.iter_mut().zip(glyph) {
                row.extend(bits.chars().map(|b| {
                    if b == ' ' {
                        Cell::default()
                    } else {
                        Cell::new(self.fill, style.clone())
                    }
                }));
            }
            first = false;
        }
        Ok(Raster { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raster: &Raster) -> Vec<String> {
        raster
            .rows
            .iter()
            .map(|r| r.iter().map(|c| c.ch).collect())
            .collect()
    }

    #[test]
    fn plain_expands_tabs_and_drops_carriage_return() {
        let font = PlainFont::new(4);
        let raster = font.rasterize("a\tb\r", &Style::default()).unwrap();
        assert_eq!(text(&raster), vec!["a   b"]);
    }

    #[test]
    fn plain_rejects_control_characters() {
        let font = PlainFont::new(4);
        assert_eq!(
            font.rasterize("bell\u{7}", &Style::default()),
            Err(RasterError::Unprintable('\u{7}'))
        );
    }

    #[test]
    fn plain_gives_wide_characters_two_cells() {
        let font = PlainFont::new(4);
        let raster = font.rasterize("日x", &Style::default()).unwrap();
        assert_eq!(raster.width(), 3);
        assert!(raster.rows[0][1].is_continuation());
    }

    #[test]
    fn plain_empty_line_is_an_empty_raster() {
        let raster = PlainFont::new(4).rasterize("", &Style::default()).unwrap();
        assert_eq!(raster.height(), 1);
        assert_eq!(raster.width(), 0);
    }

    #[test]
    fn block_font_folds_case_and_spaces_glyphs() {
        let font = block::font();
        let raster = font.rasterize("hi", &Style::default()).unwrap();
        assert_eq!(raster.height(), 5);
        // H (5) + gap (1) + I (3)
        assert_eq!(raster.width(), 9);
        assert_eq!(text(&raster)[0], "█   █ ███");
        assert_eq!(font.line_height(), 6);
    }

    #[test]
    fn block_font_reports_missing_glyph() {
        let font = block::font();
        assert_eq!(
            font.rasterize("a~b", &Style::default()),
            Err(RasterError::MissingGlyph('~'))
        );
    }

    #[test]
    fn font_file_is_validated() {
        let ok = BitmapFont::from_json(r##"{"height": 2, "glyphs": {"x": ["# ", " #"]}}"##).unwrap();
        assert_eq!(ok.line_height(), 3);
        assert_eq!(ok.fill, '█');

        let ragged = BitmapFont::from_json(r##"{"height": 2, "glyphs": {"x": ["# ", "#"]}}"##);
        assert!(ragged.is_err());

        let short = BitmapFont::from_json(r##"{"height": 3, "glyphs": {"x": ["#", "#"]}}"##);
        assert!(short.is_err());

        let long_key = BitmapFont::from_json(r##"{"height": 1, "glyphs": {"xy": ["#"]}}"##);
        assert!(long_key.is_err());
    }

    #[test]
    fn load_reports_missing_font_path() {
        let err = Font::load("/nonexistent/font.json", 4).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/font.json"));
    }

    #[test]
    fn load_resolves_builtin_names() {
        assert_eq!(Font::load("plain", 4).unwrap().line_height(), 1);
        assert_eq!(Font::load("block", 4).unwrap().line_height(), 6);
    }
}

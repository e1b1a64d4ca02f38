//! Surface — where finished frames go and where input comes from.
//!
//! `TerminalSurface` owns the terminal for as long as it lives: opening it
//! switches to raw mode and the alternate screen, dropping it restores the
//! terminal, whichever way the player exits.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{cursor, event, execute, queue, style, terminal};

use crate::types::{Cell, Color, Grid, NamedColor, Style};

pub trait Surface {
    /// Current size as `(width, height)` in cells.
    fn size(&self) -> Result<(u16, u16)>;

    /// Every input event that is already pending. Never blocks.
    fn poll_events(&mut self) -> Result<Vec<event::Event>>;

    fn present(&mut self, grid: &Grid) -> Result<()>;
}

pub struct TerminalSurface {
    stdout: io::Stdout,
    previous: Option<Grid>,
}

impl TerminalSurface {
    pub fn open() -> Result<Self> {
        terminal::enable_raw_mode()?;
        // From here on, Drop undoes whatever setup succeeded.
        let mut surface = TerminalSurface {
            stdout: io::stdout(),
            previous: None,
        };
        execute!(
            surface.stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;
        Ok(surface)
    }

    fn present_full(&mut self, grid: &Grid) -> Result<()> {
        queue!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
        for (y, row) in grid.rows().iter().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, y as u16))?;
            for cell in row.iter().filter(|c| !c.is_continuation()) {
                print_cell(&mut self.stdout, cell)?;
            }
        }
        Ok(())
    }

    fn present_diff(&mut self, prev: &Grid, grid: &Grid) -> Result<()> {
        for change in Grid::diff(prev, grid) {
            if change.cell.is_continuation() {
                continue;
            }
            queue!(self.stdout, cursor::MoveTo(change.x, change.y))?;
            print_cell(&mut self.stdout, &change.cell)?;
        }
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    fn poll_events(&mut self) -> Result<Vec<event::Event>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            events.push(event::read()?);
        }
        Ok(events)
    }

    fn present(&mut self, grid: &Grid) -> Result<()> {
        match self.previous.take() {
            Some(prev) if prev.width() == grid.width() && prev.height() == grid.height() => {
                self.present_diff(&prev, grid)?;
            }
            _ => self.present_full(grid)?,
        }
        self.stdout.flush()?;
        self.previous = Some(grid.clone());
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn print_cell(stdout: &mut io::Stdout, cell: &Cell) -> Result<()> {
    let cs = to_content_style(&cell.style);
    queue!(
        stdout,
        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}

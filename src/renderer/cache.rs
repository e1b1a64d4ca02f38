//! Per-line raster cache.
//!
//! Entries are keyed by line content. An entry that was not used during a
//! frame is dropped when that frame ends, so the cache never holds more
//! than one frame's worth of lines. Failed rasterizations are cached too.
//! A failure is logged once per line number, so a line that keeps failing
//! while it is typed out does not log once per revealed character.

use std::collections::{HashMap, HashSet};

use crate::font::{RasterError, Rasterize};
use crate::types::{Raster, Style};

#[derive(Default)]
pub struct LineCache {
    entries: HashMap<String, Entry>,
    warned: HashSet<usize>,
    frame: u64,
}

struct Entry {
    last_used: u64,
    result: Result<Raster, RasterError>,
}

impl LineCache {
    pub fn get_or_rasterize(
        &mut self,
        index: usize,
        line: &str,
        font: &dyn Rasterize,
        style: &Style,
    ) -> &Result<Raster, RasterError> {
        let frame = self.frame;
        let warned = &mut self.warned;
        let entry = self.entries.entry(line.to_string()).or_insert_with(|| {
            let result = font.rasterize(line, style);
            if let Err(e) = &result {
                if warned.insert(index) {
                    log::warn!("Skipping line {}: {e}", index + 1);
                }
            }
            Entry {
                last_used: frame,
                result,
            }
        });
        entry.last_used = frame;
        &entry.result
    }

    pub fn end_frame(&mut self) {
        let frame = self.frame;
        self.entries.retain(|_, e| e.last_used == frame);
        self.frame += 1;
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn warned_lines(&self) -> usize {
        self.warned.len()
    }
}

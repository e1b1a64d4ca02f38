//! Types a text file out in the terminal one character at a time,
//! scrolling up as the text outgrows the screen.

pub mod cli;
pub mod config;
pub mod font;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod reveal;
pub mod source;
pub mod surface;
pub mod types;

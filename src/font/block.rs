//! Built-in `block` font.
//!
//! Each glyph is 5 rows tall with variable width. All rows within a single
//! glyph have the same length. A non-space character in a row means
//! "filled"; a space means "empty".

use std::collections::HashMap;

use super::BitmapFont;

pub const HEIGHT: u16 = 5;

const GLYPHS: &[(char, [&str; 5])] = &[
    ('A', [" ### ", "#   #", "#####", "#   #", "#   #"]),
    ('B', ["#### ", "#   #", "#### ", "#   #", "#### "]),
    ('C', [" ### ", "#   #", "#    ", "#   #", " ### "]),
    ('D', ["#### ", "#   #", "#   #", "#   #", "#### "]),
    ('E', ["#####", "#    ", "###  ", "#    ", "#####"]),
    ('F', ["#####", "#    ", "###  ", "#    ", "#    "]),
    ('G', [" ### ", "#    ", "#  ##", "#   #", " ### "]),
    ('H', ["#   #", "#   #", "#####", "#   #", "#   #"]),
    ('I', ["###", " # ", " # ", " # ", "###"]),
    ('J', ["  ###", "   # ", "   # ", "#  # ", " ##  "]),
    ('K', ["#   #", "#  # ", "###  ", "#  # ", "#   #"]),
    ('L', ["#    ", "#    ", "#    ", "#    ", "#####"]),
    ('M', ["#   #", "## ##", "# # #", "#   #", "#   #"]),
    ('N', ["#   #", "##  #", "# # #", "#  ##", "#   #"]),
    ('O', [" ### ", "#   #", "#   #", "#   #", " ### "]),
    ('P', ["#### ", "#   #", "#### ", "#    ", "#    "]),
    ('Q', [" ### ", "#   #", "# # #", "#  # ", " ## #"]),
    ('R', ["#### ", "#   #", "#### ", "#  # ", "#   #"]),
    ('S', [" ####", "#    ", " ### ", "    #", "#### "]),
    ('T', ["#####", "  #  ", "  #  ", "  #  ", "  #  "]),
    ('U', ["#   #", "#   #", "#   #", "#   #", " ### "]),
    ('V', ["#   #", "#   #", "#   #", " # # ", "  #  "]),
    ('W', ["#   #", "#   #", "# # #", "## ##", "#   #"]),
    ('X', ["#   #", " # # ", "  #  ", " # # ", "#   #"]),
    ('Y', ["#   #", " # # ", "  #  ", "  #  ", "  #  "]),
    ('Z', ["#####", "   # ", "  #  ", " #   ", "#####"]),
    ('0', [" ### ", "#   #", "#   #", "#   #", " ### "]),
    ('1', [" # ", "## ", " # ", " # ", "###"]),
    ('2', [" ### ", "#   #", "  ## ", " #   ", "#####"]),
    ('3', [" ### ", "#   #", "  ## ", "#   #", " ### "]),
    ('4', ["#  # ", "#  # ", "#####", "   # ", "   # "]),
    ('5', ["#####", "#    ", "#### ", "    #", "#### "]),
    ('6', [" ### ", "#    ", "#### ", "#   #", " ### "]),
    ('7', ["#####", "   # ", "  #  ", " #   ", " #   "]),
    ('8', [" ### ", "#   #", " ### ", "#   #", " ### "]),
    ('9', [" ### ", "#   #", " ####", "   # ", " ### "]),
    (' ', ["   ", "   ", "   ", "   ", "   "]),
    ('!', ["#", "#", "#", " ", "#"]),
    ('.', [" ", " ", " ", " ", "#"]),
    (',', ["  ", "  ", "  ", " #", "# "]),
    (':', [" ", "#", " ", "#", " "]),
    (';', ["  ", " #", "  ", " #", "# "]),
    ('\'', ["#", "#", " ", " ", " "]),
    ('"', ["# #", "# #", "   ", "   ", "   "]),
    ('-', ["     ", "     ", "#####", "     ", "     "]),
    ('+', ["     ", "  #  ", "#####", "  #  ", "     "]),
    ('=', ["    ", "####", "    ", "####", "    "]),
    ('?', [" ### ", "#   #", "  ## ", "     ", "  #  "]),
    ('(', [" #", "# ", "# ", "# ", " #"]),
    (')', ["# ", " #", " #", " #", "# "]),
    ('/', ["    #", "   # ", "  #  ", " #   ", "#    "]),
];

/// Build the built-in font.
pub fn font() -> BitmapFont {
    let glyphs: HashMap<char, Vec<String>> = GLYPHS
        .iter()
        .map(|(ch, rows)| (*ch, rows.iter().map(|r| (*r).to_string()).collect()))
        .collect();
    BitmapFont {
        height: HEIGHT,
        spacing: 1,
        line_gap: 1,
        fill: '█',
        glyphs,
    }
}

use crate::types::{Cell, Grid, Style};

/// Draw a menu item string at `(x, y)`, bolding any text inside `[...]`
/// brackets. Text outside brackets is drawn dim. Returns the column after
/// the last character.
pub fn draw_menu_item(grid: &mut Grid, x: i32, y: i32, item: &str) -> i32 {
    let mut col = x;
    let mut style = Style::dim();
    for ch in item.chars() {
        if ch == '[' {
            style = Style::bold();
        }
        grid.put(col, y, Cell::new(ch, style.clone()));
        col += 1;
        if ch == ']' {
            style = Style::dim();
        }
    }
    col
}

/// Draw items left to right separated by two spaces.
pub fn draw_menu(grid: &mut Grid, x: i32, y: i32, items: &[&str]) -> i32 {
    let mut col = x;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            col += 2;
        }
        col = draw_menu_item(grid, col, y, item);
    }
    col
}

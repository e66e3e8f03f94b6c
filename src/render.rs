use std::fs;
use std::path::Path;

use crate::backtracking_search::{Assignment, Choice};
use crate::error::FileError;
use crate::grid_config::GridConfig;

/// Size of each square in an exported image, in pixels.
const CELL_SIZE: usize = 100;

/// Gap left around each fillable square so the black background shows through as a border.
const CELL_BORDER: usize = 2;

const FONT_SIZE: usize = 80;

/// Lay the assigned words out on the grid. Cells that no assigned word covers are `None`, as are
/// blocked cells.
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.width]; config.height];

    for Choice { slot_id, word_id } in assignment.choices() {
        let slot_config = &config.slot_configs[slot_id];
        let word = &config.words[word_id];

        for ((row, col), &glyph) in slot_config.cell_coords().into_iter().zip(&word.glyphs) {
            // Slots built from an explicit overlap table needn't sit inside the structure.
            if let Some(cell) = letters.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *cell = Some(glyph);
            }
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, one line per row, with
/// blocked cells drawn as solid blocks and unfilled cells as spaces.
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    let letters = letter_grid(config, assignment);

    config
        .structure
        .iter()
        .zip(&letters)
        .map(|(structure_row, letter_row)| {
            structure_row
                .iter()
                .zip(letter_row)
                .map(|(&fillable, &letter)| {
                    if fillable {
                        letter.unwrap_or(' ')
                    } else {
                        '█'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_xml(ch: char) -> String {
    match ch {
        '&' => "&amp;".to_string(),
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '"' => "&quot;".to_string(),
        _ => ch.to_string(),
    }
}

/// Draw the grid as an SVG image: white squares with centered letters on a black background.
pub fn render_svg(config: &GridConfig, assignment: &Assignment) -> String {
    let letters = letter_grid(config, assignment);
    let interior_size = CELL_SIZE - 2 * CELL_BORDER;
    let (width, height) = (config.width * CELL_SIZE, config.height * CELL_SIZE);

    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"  <rect width="{width}" height="{height}" fill="black"/>"#
    ));
    svg.push('\n');

    for (row, structure_row) in config.structure.iter().enumerate() {
        for (col, &fillable) in structure_row.iter().enumerate() {
            if !fillable {
                continue;
            }

            let (x, y) = (col * CELL_SIZE + CELL_BORDER, row * CELL_SIZE + CELL_BORDER);
            svg.push_str(&format!(
                r#"  <rect x="{x}" y="{y}" width="{interior_size}" height="{interior_size}" fill="white"/>"#
            ));
            svg.push('\n');

            if let Some(letter) = letters[row][col] {
                let (center_x, center_y) = (x + interior_size / 2, y + interior_size / 2);
                svg.push_str(&format!(
                    r#"  <text x="{center_x}" y="{center_y}" font-family="Open Sans, sans-serif" font-size="{FONT_SIZE}" text-anchor="middle" dominant-baseline="central" fill="black">{}</text>"#,
                    escape_xml(letter),
                ));
                svg.push('\n');
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Write the SVG rendering of an assignment to `path`.
pub fn save_svg(
    config: &GridConfig,
    assignment: &Assignment,
    path: impl AsRef<Path>,
) -> Result<(), FileError> {
    let path = path.as_ref();

    fs::write(path, render_svg(config, assignment)).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

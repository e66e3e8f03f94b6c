//! Small puzzles shared by the unit tests.

use crate::grid_config::{Direction, GridConfig, Overlap, SlotConfig};

/// Two crossing slots sharing their first cell: slot 0 is across, slot 1 is down.
///
/// __
/// _#
pub fn corner_config(words: &[&str]) -> GridConfig {
    GridConfig::from_template_string(words, "__\n_#").unwrap()
}

/// Two crossing slots where the last letter of the down slot (slot 0) is the first letter of the
/// across slot (slot 1).
///
/// _#
/// __
pub fn elbow_config(words: &[&str]) -> GridConfig {
    GridConfig::from_template_string(words, "_#\n__").unwrap()
}

/// Three slots of length 2 that all overlap each other, which can't happen on a real grid:
/// slot 0 and slot 1 share their first letters, slot 1 and slot 2 share their second letters, and
/// the first letter of slot 2 is the second letter of slot 0.
pub fn triangle_config(words: &[&str]) -> GridConfig {
    let slot = |id, start_cell, direction| SlotConfig { id, start_cell, direction, length: 2 };
    let overlap = |cell_idx, other_cell_idx| Some(Overlap { cell_idx, other_cell_idx });

    GridConfig::new(
        vec![],
        vec![
            slot(0, (0, 0), Direction::Across),
            slot(1, (0, 0), Direction::Down),
            slot(2, (0, 1), Direction::Down),
        ],
        vec![
            vec![None, overlap(0, 0), overlap(1, 0)],
            vec![overlap(0, 0), None, overlap(1, 1)],
            vec![overlap(0, 1), overlap(1, 1), None],
        ],
        words,
    )
    .unwrap()
}

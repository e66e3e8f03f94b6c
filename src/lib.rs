pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod render;

#[cfg(test)]
pub(crate) mod test_utils;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// An identifier for a given slot, based on its index in the GridConfig's `slot_configs` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the GridConfig's `words` field. Words are
/// sorted, so comparing ids is the same as comparing the words themselves.
pub type WordId = usize;

/// Zero-indexed row and column for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

pub use arc_consistency::RequeueRule;
pub use backtracking_search::{
    find_fill, Assignment, Choice, FillOptions, FillSuccess, Filler, Statistics,
};
pub use domains::DomainStore;
pub use error::{FileError, StructureError, Unsatisfiable};
pub use grid_config::{Direction, GridConfig, Overlap, SlotConfig, Word};
pub use render::{letter_grid, render_grid, render_svg, save_svg};

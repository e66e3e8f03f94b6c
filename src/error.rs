use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::SlotId;

/// Problems with the geometry handed to `GridConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("structure has no cells")]
    EmptyStructure,

    #[error("slot at position {position} has id {id}")]
    SlotIdMismatch { position: usize, id: SlotId },

    #[error("overlap table is {rows} rows for {slot_count} slots")]
    OverlapTableShape { rows: usize, slot_count: usize },

    #[error("overlap ({cell_idx}, {other_cell_idx}) between slots {slot_id} and {other_slot_id} is out of range")]
    OverlapOutOfRange {
        slot_id: SlotId,
        other_slot_id: SlotId,
        cell_idx: usize,
        other_cell_idx: usize,
    },

    #[error("overlap between slots {slot_id} and {other_slot_id} isn't mirrored by slot {other_slot_id}")]
    AsymmetricOverlap { slot_id: SlotId, other_slot_id: SlotId },

    #[error("slot {slot_id} overlaps itself")]
    SelfOverlap { slot_id: SlotId },

    #[error("slots {slot_id} and {other_slot_id} share more than one cell")]
    MultipleSharedCells { slot_id: SlotId, other_slot_id: SlotId },
}

/// Failure to read or write one of the puzzle's files.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Structure(#[from] StructureError),
}

/// The only way a fill attempt can fail. Both variants are ordinary outcomes for a puzzle whose
/// vocabulary can't cover its geometry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Unsatisfiable {
    /// Node or arc consistency left a slot with no candidates, so search never started.
    #[error("no candidate words remain for slot {slot_id}")]
    EmptyDomain { slot_id: SlotId },

    /// Backtracking tried every combination of the pruned candidates.
    #[error("search exhausted every combination of candidates")]
    Exhausted,
}

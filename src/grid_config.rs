//! The static side of a puzzle: which slots exist, where they cross, and which words are available
//! to fill them. Nothing in here changes once a `GridConfig` has been built.

use bit_set::BitSet;
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use crate::error::{FileError, StructureError};
use crate::{GridCoord, SlotId, WordId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing. `Across` sorts before `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a word that can be chosen for a given slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let glyphs = string.chars().collect();
        Word { string, glyphs }
    }

    /// Length in characters, which is what slot lengths are measured in.
    pub(crate) fn len(&self) -> usize {
        self.glyphs.len()
    }
}

/// The cell two slots share: `cell_idx` within the first slot of the pair and `other_cell_idx`
/// within the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub cell_idx: usize,
    pub other_cell_idx: usize,
}

impl Overlap {
    fn reversed(self) -> Overlap {
        Overlap {
            cell_idx: self.other_cell_idx,
            other_cell_idx: self.cell_idx,
        }
    }
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl SlotConfig {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        let (row, col) = self.start_cell;

        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (row, col + cell_idx),
                Direction::Down => (row + cell_idx, col),
            })
            .collect()
    }

    /// Total order over slots used whenever the heuristics can't otherwise tell two slots apart.
    pub fn position_key(&self) -> (usize, usize, Direction) {
        (self.start_cell.0, self.start_cell.1, self.direction)
    }
}

/// A struct representing the aspects of a puzzle that are static during filling.
pub struct GridConfig {
    pub height: usize,
    pub width: usize,

    /// `structure[row][col]` is true for cells that hold a letter.
    pub structure: Vec<Vec<bool>>,

    pub slot_configs: Vec<SlotConfig>,

    /// Upper-cased, de-duplicated and sorted; a `WordId` is an index into this.
    pub words: Vec<Word>,

    /// `overlaps[x][y]` describes the cell shared by slots `x` and `y`, from `x`'s point of view.
    overlaps: Vec<Vec<Option<Overlap>>>,

    neighbors: Vec<BitSet>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("slot_configs", &self.slot_configs)
            .field("words", &format!("({} entries)", self.words.len()))
            .finish()
    }
}

/// Turn raw vocabulary entries into the sorted, de-duplicated list of words every slot starts
/// from. Entries are trimmed and upper-cased, and blank entries are dropped.
fn normalize_word_list<S: AsRef<str>>(word_list: &[S]) -> Vec<Word> {
    word_list
        .iter()
        .map(|word| word.as_ref().trim().to_uppercase())
        .filter(|word| !word.is_empty())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .map(Word::new)
        .collect()
}

/// Pad ragged rows with blocked cells so that every row is `width` cells long.
fn pad_structure(mut structure: Vec<Vec<bool>>) -> (Vec<Vec<bool>>, usize) {
    let width = structure.iter().map(|row| row.len()).max().unwrap_or(0);
    for row in &mut structure {
        row.resize(width, false);
    }
    (structure, width)
}

impl GridConfig {
    /// Build a config from an explicit overlap table, which doesn't need to correspond to anything
    /// drawable. `overlaps` must be square with one row per slot, and slot ids must match their
    /// positions. Every entry must be mirrored by its reverse in the other slot's row.
    pub fn new<S: AsRef<str>>(
        structure: Vec<Vec<bool>>,
        slot_configs: Vec<SlotConfig>,
        overlaps: Vec<Vec<Option<Overlap>>>,
        word_list: &[S],
    ) -> Result<GridConfig, StructureError> {
        let slot_count = slot_configs.len();

        for (position, slot_config) in slot_configs.iter().enumerate() {
            if slot_config.id != position {
                return Err(StructureError::SlotIdMismatch {
                    position,
                    id: slot_config.id,
                });
            }
        }

        if overlaps.len() != slot_count || overlaps.iter().any(|row| row.len() != slot_count) {
            return Err(StructureError::OverlapTableShape {
                rows: overlaps.len(),
                slot_count,
            });
        }

        let mut neighbors: Vec<BitSet> =
            (0..slot_count).map(|_| BitSet::with_capacity(slot_count)).collect();

        for (slot_id, row) in overlaps.iter().enumerate() {
            for (other_slot_id, overlap) in row.iter().enumerate() {
                let Some(overlap) = overlap else {
                    continue;
                };

                if slot_id == other_slot_id {
                    return Err(StructureError::SelfOverlap { slot_id });
                }

                let in_range = overlap.cell_idx < slot_configs[slot_id].length
                    && overlap.other_cell_idx < slot_configs[other_slot_id].length;

                if !in_range {
                    return Err(StructureError::OverlapOutOfRange {
                        slot_id,
                        other_slot_id,
                        cell_idx: overlap.cell_idx,
                        other_cell_idx: overlap.other_cell_idx,
                    });
                }

                if overlaps[other_slot_id][slot_id] != Some(overlap.reversed()) {
                    return Err(StructureError::AsymmetricOverlap {
                        slot_id,
                        other_slot_id,
                    });
                }

                neighbors[slot_id].insert(other_slot_id);
            }
        }

        let (structure, width) = pad_structure(structure);

        Ok(GridConfig {
            height: structure.len(),
            width,
            structure,
            slot_configs,
            words: normalize_word_list(word_list),
            overlaps,
            neighbors,
        })
    }

    /// Build a config from slots placed on a grid, working out the overlaps from the cells each
    /// pair of slots has in common.
    pub fn from_slots<S: AsRef<str>>(
        structure: Vec<Vec<bool>>,
        slot_configs: Vec<SlotConfig>,
        word_list: &[S],
    ) -> Result<GridConfig, StructureError> {
        let slot_count = slot_configs.len();

        // Map from cell location to (slot id, cell index within slot) for every slot passing
        // through it.
        let mut slots_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();
        for slot_config in &slot_configs {
            for (cell_idx, loc) in slot_config.cell_coords().into_iter().enumerate() {
                slots_by_loc.entry(loc).or_default().push((slot_config.id, cell_idx));
            }
        }

        let mut overlaps: Vec<Vec<Option<Overlap>>> = vec![vec![None; slot_count]; slot_count];

        // Visit cells in a fixed order so that any error we report doesn't depend on hashing.
        let mut shared_cells: Vec<(&GridCoord, &Vec<(SlotId, usize)>)> =
            slots_by_loc.iter().filter(|(_, slots)| slots.len() > 1).collect();
        shared_cells.sort_unstable_by_key(|&(&loc, _)| loc);

        for (_, slots) in shared_cells {
            for (idx, &(slot_id, cell_idx)) in slots.iter().enumerate() {
                for &(other_slot_id, other_cell_idx) in &slots[idx + 1..] {
                    if slot_id == other_slot_id {
                        return Err(StructureError::SelfOverlap { slot_id });
                    }

                    if overlaps[slot_id][other_slot_id].is_some() {
                        return Err(StructureError::MultipleSharedCells {
                            slot_id: slot_id.min(other_slot_id),
                            other_slot_id: slot_id.max(other_slot_id),
                        });
                    }

                    let overlap = Overlap { cell_idx, other_cell_idx };
                    overlaps[slot_id][other_slot_id] = Some(overlap);
                    overlaps[other_slot_id][slot_id] = Some(overlap.reversed());
                }
            }
        }

        GridConfig::new(structure, slot_configs, overlaps, word_list)
    }

    /// Find every maximal run of two or more fillable cells, across and down, and build a config
    /// from them. Slots are numbered in row-major order of their first cell, across before down.
    pub fn from_structure<S: AsRef<str>>(
        structure: Vec<Vec<bool>>,
        word_list: &[S],
    ) -> Result<GridConfig, StructureError> {
        let (structure, width) = pad_structure(structure);
        let height = structure.len();
        let fillable = |row: usize, col: usize| structure[row][col];

        let mut slot_configs: Vec<SlotConfig> = vec![];

        for row in 0..height {
            for col in 0..width {
                if !fillable(row, col) {
                    continue;
                }

                if col == 0 || !fillable(row, col - 1) {
                    let length = (col..width).take_while(|&c| fillable(row, c)).count();
                    if length > 1 {
                        slot_configs.push(SlotConfig {
                            id: slot_configs.len(),
                            start_cell: (row, col),
                            direction: Direction::Across,
                            length,
                        });
                    }
                }

                if row == 0 || !fillable(row - 1, col) {
                    let length = (row..height).take_while(|&r| fillable(r, col)).count();
                    if length > 1 {
                        slot_configs.push(SlotConfig {
                            id: slot_configs.len(),
                            start_cell: (row, col),
                            direction: Direction::Down,
                            length,
                        });
                    }
                }
            }
        }

        GridConfig::from_slots(structure, slot_configs, word_list)
    }

    /// Generate a grid config from a string template, with _ representing fillable cells and
    /// anything else representing blocks. Lines are trimmed and blank lines are skipped, so the
    /// template can be indented.
    pub fn from_template_string<S: AsRef<str>>(
        word_list: &[S],
        template: &str,
    ) -> Result<GridConfig, StructureError> {
        let trimmed: Vec<&str> = template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        GridConfig::from_structure(parse_structure(&trimmed.join("\n"))?, word_list)
    }

    /// Read a structure file and a vocabulary file and build the config they describe.
    pub fn load(
        structure_path: impl AsRef<Path>,
        words_path: impl AsRef<Path>,
    ) -> Result<GridConfig, FileError> {
        let structure = parse_structure(&read_file(structure_path.as_ref())?)?;
        let word_list = parse_word_list(&read_file(words_path.as_ref())?);

        Ok(GridConfig::from_structure(structure, &word_list)?)
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// The cell shared by `slot_id` and `other_slot_id`, if any.
    pub fn overlap(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<Overlap> {
        self.overlaps[slot_id][other_slot_id]
    }

    /// Every slot sharing a cell with `slot_id`.
    pub fn neighbors(&self, slot_id: SlotId) -> &BitSet {
        &self.neighbors[slot_id]
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.neighbors[slot_id].len()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }
}

fn read_file(path: &Path) -> Result<String, FileError> {
    fs::read_to_string(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a structure file: `_` marks a fillable cell and any other character is a block. Short
/// rows are padded with blocks to the width of the longest row.
pub fn parse_structure(contents: &str) -> Result<Vec<Vec<bool>>, StructureError> {
    let (structure, width) = pad_structure(
        contents
            .lines()
            .map(|line| line.chars().map(|c| c == '_').collect())
            .collect(),
    );

    if width == 0 {
        return Err(StructureError::EmptyStructure);
    }

    Ok(structure)
}

/// Parse a vocabulary file with one word per line.
pub fn parse_word_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| line.trim().to_uppercase())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// #___#
    /// #_##_
    /// #_##_
    /// #____
    fn small_grid() -> GridConfig {
        GridConfig::from_template_string(
            &["cat", "dog"],
            "
            #___#
            #_##_
            #_##_
            #____
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_parse_structure_pads_ragged_rows() {
        let structure = parse_structure("__#\n_\n#__").unwrap();

        assert_eq!(
            structure,
            vec![
                vec![true, true, false],
                vec![true, false, false],
                vec![false, true, true],
            ]
        );
    }

    #[test]
    fn test_parse_structure_rejects_empty_input() {
        assert_eq!(parse_structure(""), Err(StructureError::EmptyStructure));
        assert_eq!(parse_structure("\n\n"), Err(StructureError::EmptyStructure));
    }

    #[test]
    fn test_word_list_is_normalized() {
        let config = GridConfig::from_template_string(
            &["cat", "Dog", "", "CAT", " ant ", "\u{e9}t\u{e9}"],
            "___",
        )
        .unwrap();

        let strings: Vec<&str> = config.words.iter().map(|word| word.string.as_str()).collect();
        assert_eq!(strings, ["ANT", "CAT", "DOG", "\u{c9}T\u{c9}"]);
        assert_eq!(config.words[3].len(), 3, "length counts chars, not bytes");
    }

    #[test]
    fn test_parse_word_list() {
        assert_eq!(parse_word_list("one\r\n\nTwo\n  three  \n"), ["ONE", "TWO", "THREE"]);
    }

    #[test]
    fn test_slots_from_structure() {
        let config = small_grid();

        let slots: Vec<(GridCoord, Direction, usize)> = config
            .slot_configs
            .iter()
            .map(|slot| (slot.start_cell, slot.direction, slot.length))
            .collect();

        assert_eq!(
            slots,
            [
                ((0, 1), Direction::Across, 3),
                ((0, 1), Direction::Down, 4),
                ((1, 4), Direction::Down, 3),
                ((3, 1), Direction::Across, 4),
            ]
        );
        assert_eq!((config.height, config.width), (4, 5));
    }

    #[test]
    fn test_overlaps_and_neighbors() {
        let config = small_grid();

        assert_eq!(config.overlap(0, 1), Some(Overlap { cell_idx: 0, other_cell_idx: 0 }));
        assert_eq!(config.overlap(1, 3), Some(Overlap { cell_idx: 3, other_cell_idx: 0 }));
        assert_eq!(config.overlap(3, 1), Some(Overlap { cell_idx: 0, other_cell_idx: 3 }));
        assert_eq!(config.overlap(2, 3), Some(Overlap { cell_idx: 2, other_cell_idx: 3 }));
        assert_eq!(config.overlap(0, 2), None);
        assert_eq!(config.overlap(0, 0), None);

        let neighbors: Vec<Vec<SlotId>> = (0..config.slot_count())
            .map(|slot_id| config.neighbors(slot_id).iter().collect())
            .collect();
        assert_eq!(neighbors, vec![vec![1], vec![0, 3], vec![3], vec![1, 2]]);
        assert_eq!(config.degree(1), 2);
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let config = GridConfig::from_template_string(&["ab"], "_##\n#__").unwrap();

        assert_eq!(config.slot_count(), 1);
        assert_eq!(config.slot_configs[0].start_cell, (1, 1));
    }

    #[test]
    fn test_collinear_slots_sharing_cells_are_rejected() {
        let slots = vec![
            SlotConfig { id: 0, start_cell: (0, 0), direction: Direction::Across, length: 3 },
            SlotConfig { id: 1, start_cell: (0, 1), direction: Direction::Across, length: 3 },
        ];

        let result = GridConfig::from_slots(vec![vec![true; 4]], slots, &["abc"]);

        assert_eq!(
            result.unwrap_err(),
            StructureError::MultipleSharedCells { slot_id: 0, other_slot_id: 1 }
        );
    }

    #[test]
    fn test_explicit_overlap_table_is_validated() {
        let slots = || {
            vec![
                SlotConfig { id: 0, start_cell: (0, 0), direction: Direction::Across, length: 2 },
                SlotConfig { id: 1, start_cell: (0, 0), direction: Direction::Down, length: 2 },
            ]
        };
        let overlap = |cell_idx, other_cell_idx| Some(Overlap { cell_idx, other_cell_idx });

        assert_eq!(
            GridConfig::new(vec![], slots(), vec![vec![None, None]], &["ab"]).unwrap_err(),
            StructureError::OverlapTableShape { rows: 1, slot_count: 2 }
        );
        assert_eq!(
            GridConfig::new(vec![], slots(), vec![vec![overlap(0, 0), None], vec![None, None]], &["ab"])
                .unwrap_err(),
            StructureError::SelfOverlap { slot_id: 0 }
        );
        assert_eq!(
            GridConfig::new(vec![], slots(), vec![vec![None, overlap(0, 2)], vec![None, None]], &["ab"])
                .unwrap_err(),
            StructureError::OverlapOutOfRange {
                slot_id: 0,
                other_slot_id: 1,
                cell_idx: 0,
                other_cell_idx: 2,
            }
        );

        assert_eq!(
            GridConfig::new(vec![], slots(), vec![vec![None, overlap(0, 0)], vec![None, None]], &["ab"])
                .unwrap_err(),
            StructureError::AsymmetricOverlap { slot_id: 0, other_slot_id: 1 }
        );
        assert_eq!(
            GridConfig::new(
                vec![],
                slots(),
                vec![vec![None, overlap(0, 0)], vec![overlap(1, 1), None]],
                &["ab"],
            )
            .unwrap_err(),
            StructureError::AsymmetricOverlap { slot_id: 0, other_slot_id: 1 }
        );

        let mirrored =
            GridConfig::new(vec![], slots(), vec![vec![None, overlap(1, 0)], vec![overlap(0, 1), None]], &["ab"])
                .unwrap();
        assert_eq!(mirrored.degree(0), 1);
        assert_eq!(mirrored.degree(1), 1);

        let mut misnumbered = slots();
        misnumbered[1].id = 5;
        assert_eq!(
            GridConfig::new(vec![], misnumbered, vec![vec![None; 2]; 2], &["ab"]).unwrap_err(),
            StructureError::SlotIdMismatch { position: 1, id: 5 }
        );
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let structure_path = dir.path().join("structure.txt");
        let words_path = dir.path().join("words.txt");
        fs::write(&structure_path, "#___#\n#_##_\n#_##_\n#____\n").unwrap();
        fs::write(&words_path, "cat\ncoat\n\nTeam\nham\ncat\n").unwrap();

        let config = GridConfig::load(&structure_path, &words_path).unwrap();

        assert_eq!((config.height, config.width), (4, 5));
        assert_eq!(config.slot_count(), 4);
        assert_eq!(config.slot_configs[3].start_cell, (3, 1));
        assert_eq!(config.slot_configs[3].direction, Direction::Across);

        let strings: Vec<&str> = config.words.iter().map(|word| word.string.as_str()).collect();
        assert_eq!(strings, ["CAT", "COAT", "HAM", "TEAM"]);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = GridConfig::load("/nonexistent/structure.txt", "/nonexistent/words.txt")
            .unwrap_err();

        assert!(matches!(err, FileError::Io { ref path, .. } if path.ends_with("structure.txt")));
    }
}

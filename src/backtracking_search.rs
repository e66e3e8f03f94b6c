//! This module implements grid-filling as a plain depth-first backtracking search over the domains
//! left behind by node and arc consistency. Slots are chosen by minimum remaining values with a
//! degree tie-break, and words are tried least-constraining first.
//!
//! The search never edits an assignment in place: every branch gets its own extended copy, so
//! abandoning a branch is just dropping that copy.

use instant::{Duration, Instant};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, trace};

use crate::arc_consistency::{self, Pruning, RequeueRule};
use crate::domains::DomainStore;
use crate::error::Unsatisfiable;
use crate::grid_config::GridConfig;
use crate::{SlotId, WordId};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial or complete mapping from slots to words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: BTreeMap<SlotId, WordId>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// A copy of this assignment with one more choice in it. The original is left untouched.
    pub fn with_choice(&self, choice: Choice) -> Assignment {
        let mut extended = self.clone();
        extended.words.insert(choice.slot_id, choice.word_id);
        extended
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words.get(&slot_id).copied()
    }

    pub fn contains(&self, slot_id: SlotId) -> bool {
        self.words.contains_key(&slot_id)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Does this assignment give a word to every slot in the grid?
    pub fn is_complete(&self, config: &GridConfig) -> bool {
        self.words.len() == config.slot_count()
            && (0..config.slot_count()).all(|slot_id| self.contains(slot_id))
    }

    /// The choices in slot order.
    pub fn choices(&self) -> impl Iterator<Item = Choice> + '_ {
        self.words
            .iter()
            .map(|(&slot_id, &word_id)| Choice { slot_id, word_id })
    }

    /// The word assigned to a slot, as a string.
    pub fn word<'a>(&self, config: &'a GridConfig, slot_id: SlotId) -> Option<&'a str> {
        self.get(slot_id).map(|word_id| config.word(word_id).string.as_str())
    }
}

/// Knobs for a fill attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOptions {
    pub requeue_rule: RequeueRule,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Search nodes expanded, i.e. times a slot was picked to be filled.
    pub states: u64,
    /// Search nodes abandoned after every candidate failed.
    pub backtracks: u64,
    pub revisions: u64,
    /// Words removed by node and arc consistency together.
    pub pruned_words: u64,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// The state of one fill attempt: the puzzle, the domains being pruned, and running statistics.
/// A `Filler` is meant to be used for a single `solve`.
pub struct Filler<'a> {
    config: &'a GridConfig,
    options: FillOptions,
    domains: DomainStore,
    statistics: Statistics,
}

impl<'a> Filler<'a> {
    pub fn new(config: &'a GridConfig) -> Filler<'a> {
        Filler::with_options(config, FillOptions::default())
    }

    pub fn with_options(config: &'a GridConfig, options: FillOptions) -> Filler<'a> {
        Filler {
            config,
            options,
            domains: DomainStore::new(config),
            statistics: Statistics::default(),
        }
    }

    pub fn domains(&self) -> &DomainStore {
        &self.domains
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Drop every candidate whose length doesn't fit its slot.
    pub fn enforce_node_consistency(&mut self) {
        self.statistics.pruned_words +=
            arc_consistency::enforce_node_consistency(self.config, &mut self.domains);
    }

    /// Make `x` arc-consistent with `y`; see `arc_consistency::revise`.
    pub fn revise(&mut self, x: SlotId, y: SlotId) -> bool {
        arc_consistency::revise(self.config, &mut self.domains, x, y)
    }

    /// Run AC-3 from `arcs`, or from every ordered pair of distinct slots if `arcs` is `None`.
    pub fn ac3(&mut self, arcs: Option<&[(SlotId, SlotId)]>) -> Result<(), Unsatisfiable> {
        let mut pruning = Pruning::default();
        let result = arc_consistency::ac3(
            self.config,
            &mut self.domains,
            arcs,
            self.options.requeue_rule,
            &mut pruning,
        );

        self.statistics.revisions += pruning.revisions;
        self.statistics.pruned_words += pruning.pruned_words;

        result
    }

    /// Pick the unassigned slot with the fewest remaining candidates, preferring slots with more
    /// neighbors and then the earliest position in the grid.
    pub fn select_unassigned_variable(&self, assignment: &Assignment) -> Option<SlotId> {
        (0..self.config.slot_count())
            .filter(|&slot_id| !assignment.contains(slot_id))
            .min_by_key(|&slot_id| {
                (
                    self.domains.size(slot_id),
                    Reverse(self.config.degree(slot_id)),
                    self.config.slot_configs[slot_id].position_key(),
                    slot_id,
                )
            })
    }

    /// Order the candidates for a slot by how many candidates they would rule out in unassigned
    /// neighboring slots, fewest first. Ties keep word order.
    pub fn order_domain_values(&self, slot_id: SlotId, assignment: &Assignment) -> Vec<WordId> {
        // For each unassigned neighbor: where our letter lands in it, how many candidates it has,
        // and how many of those put each letter in that cell.
        let neighbor_letter_counts: Vec<(usize, usize, HashMap<char, usize>)> = self
            .config
            .neighbors(slot_id)
            .iter()
            .filter(|&neighbor_id| !assignment.contains(neighbor_id))
            .filter_map(|neighbor_id| {
                let overlap = self.config.overlap(slot_id, neighbor_id)?;
                let mut letter_counts: HashMap<char, usize> = HashMap::new();

                for word_id in self.domains.get(neighbor_id) {
                    if let Some(&letter) = self.config.words[word_id].glyphs.get(overlap.other_cell_idx) {
                        *letter_counts.entry(letter).or_insert(0) += 1;
                    }
                }

                Some((overlap.cell_idx, self.domains.size(neighbor_id), letter_counts))
            })
            .collect();

        let mut options: Vec<(usize, WordId)> = self
            .domains
            .get(slot_id)
            .iter()
            .map(|word_id| {
                let word = &self.config.words[word_id];
                let eliminated: usize = neighbor_letter_counts
                    .iter()
                    .map(|(cell_idx, size, letter_counts)| {
                        let compatible = word
                            .glyphs
                            .get(*cell_idx)
                            .and_then(|letter| letter_counts.get(letter))
                            .copied()
                            .unwrap_or(0);
                        size - compatible
                    })
                    .sum();

                (eliminated, word_id)
            })
            .collect();

        options.sort_by_key(|&(eliminated, _)| eliminated);

        options.into_iter().map(|(_, word_id)| word_id).collect()
    }

    /// Check that every assigned word fits its slot and that assigned slots agree wherever they
    /// cross. Using the same word in two slots is allowed.
    pub fn consistent(&self, assignment: &Assignment) -> bool {
        let lengths_match = assignment.choices().all(|Choice { slot_id, word_id }| {
            self.config.words[word_id].len() == self.config.slot_configs[slot_id].length
        });

        lengths_match
            && assignment.choices().all(|Choice { slot_id, word_id }| {
                let word = &self.config.words[word_id];

                self.config.neighbors(slot_id).iter().all(|other_slot_id| {
                    let (Some(overlap), Some(other_word_id)) = (
                        self.config.overlap(slot_id, other_slot_id),
                        assignment.get(other_slot_id),
                    ) else {
                        return true;
                    };

                    word.glyphs[overlap.cell_idx]
                        == self.config.words[other_word_id].glyphs[overlap.other_cell_idx]
                })
            })
    }

    /// Extend `assignment` until it covers every slot, returning the first complete assignment
    /// found, or `None` if no extension of it works.
    pub fn backtrack(&mut self, assignment: Assignment) -> Option<Assignment> {
        if assignment.is_complete(self.config) {
            return Some(assignment);
        }

        let slot_id = self.select_unassigned_variable(&assignment)?;
        self.statistics.states += 1;

        trace!(
            event = "select_slot",
            slot_id,
            depth = assignment.len(),
            candidates = self.domains.size(slot_id),
        );

        for word_id in self.order_domain_values(slot_id, &assignment) {
            let trial = assignment.with_choice(Choice { slot_id, word_id });

            if !self.consistent(&trial) {
                continue;
            }

            if let Some(complete) = self.backtrack(trial) {
                return Some(complete);
            }
        }

        self.statistics.backtracks += 1;

        None
    }

    /// Enforce node and arc consistency, and then search for a complete assignment.
    pub fn solve(&mut self) -> Result<FillSuccess, Unsatisfiable> {
        let start = Instant::now();

        info!(
            event = "solve_start",
            slot_count = self.config.slot_count(),
            word_count = self.config.words.len(),
        );

        let result = self.find_assignment();
        self.statistics.duration = start.elapsed();

        match &result {
            Ok(_) => info!(
                event = "solve_end",
                outcome = "filled",
                states = self.statistics.states,
                backtracks = self.statistics.backtracks,
                duration_ms = self.statistics.duration.as_millis() as u64,
            ),
            Err(unsatisfiable) => info!(
                event = "solve_end",
                outcome = %unsatisfiable,
                states = self.statistics.states,
                backtracks = self.statistics.backtracks,
                duration_ms = self.statistics.duration.as_millis() as u64,
            ),
        }

        result.map(|assignment| FillSuccess {
            statistics: self.statistics.clone(),
            assignment,
        })
    }

    fn find_assignment(&mut self) -> Result<Assignment, Unsatisfiable> {
        self.enforce_node_consistency();

        if let Some(slot_id) = self.domains.first_empty_slot() {
            debug!(event = "node_consistency_wipeout", slot_id);
            return Err(Unsatisfiable::EmptyDomain { slot_id });
        }

        self.ac3(None)?;

        self.backtrack(Assignment::new()).ok_or(Unsatisfiable::Exhausted)
    }
}

/// Search for a valid fill for the given grid with default options.
pub fn find_fill(config: &GridConfig) -> Result<FillSuccess, Unsatisfiable> {
    Filler::new(config).solve()
}

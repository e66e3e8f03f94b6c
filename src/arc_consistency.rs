//! Node consistency and a crossword-specific version of AC-3. For our purposes a grid is
//! arc-consistent when every candidate for a slot has, for each crossing slot, at least one
//! candidate there that puts the same letter in the shared cell.
//!
//! Both passes run once, before search begins, and prune the `DomainStore` in place.

use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::domains::DomainStore;
use crate::error::Unsatisfiable;
use crate::grid_config::GridConfig;
use crate::SlotId;

/// Which arcs get pushed back onto the queue after revising `(x, y)` removes something from `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequeueRule {
    /// Requeue `(z, x)` for each neighbor `z` of `x` that is not itself a neighbor of `y`. On a
    /// real grid this covers every neighbor of `x`, but when three slots all cross each other it
    /// can stop short of full arc consistency.
    #[default]
    ExcludeNeighborsOfOther,

    /// Textbook AC-3: requeue `(z, x)` for every neighbor `z` of `x` other than `y`.
    AllNeighbors,
}

/// Counters for the work done by a consistency pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pruning {
    /// Calls to `revise` that removed at least one word.
    pub revisions: u64,
    pub pruned_words: u64,
}

/// Every ordered pair of distinct slots, in slot order.
pub fn all_arcs(config: &GridConfig) -> Vec<(SlotId, SlotId)> {
    let slot_count = config.slot_count();

    (0..slot_count)
        .flat_map(|x| (0..slot_count).filter(move |&y| y != x).map(move |y| (x, y)))
        .collect()
}

/// Remove every candidate whose length doesn't match its slot. Returns the number of words
/// removed; running it again removes nothing.
pub fn enforce_node_consistency(config: &GridConfig, domains: &mut DomainStore) -> u64 {
    let mut pruned_words = 0;

    for slot_config in &config.slot_configs {
        for word_id in &domains.snapshot(slot_config.id) {
            if config.words[word_id].len() != slot_config.length {
                domains.remove(slot_config.id, word_id);
                pruned_words += 1;
            }
        }
    }

    debug!(event = "node_consistency", pruned_words);

    pruned_words
}

/// The letters that the candidates for `slot_id` place in cell `cell_idx`.
fn letters_at(
    config: &GridConfig,
    domains: &DomainStore,
    slot_id: SlotId,
    cell_idx: usize,
) -> HashSet<char> {
    domains
        .get(slot_id)
        .iter()
        .filter_map(|word_id| config.words[word_id].glyphs.get(cell_idx).copied())
        .collect()
}

/// Make `x` arc-consistent with `y` by removing every candidate for `x` that no candidate for `y`
/// agrees with in their shared cell. Returns whether anything was removed; slots that don't cross
/// are left alone.
pub fn revise(config: &GridConfig, domains: &mut DomainStore, x: SlotId, y: SlotId) -> bool {
    let Some(overlap) = config.overlap(x, y) else {
        return false;
    };

    let supported_letters = letters_at(config, domains, y, overlap.other_cell_idx);
    let mut revised = false;

    for word_id in &domains.snapshot(x) {
        let letter = config.words[word_id].glyphs.get(overlap.cell_idx);

        if !letter.is_some_and(|letter| supported_letters.contains(letter)) {
            domains.remove(x, word_id);
            revised = true;
        }
    }

    revised
}

/// Run AC-3 over a FIFO queue of arcs, seeded with `arcs` or with every ordered pair of distinct
/// slots when `arcs` is `None`. Stops as soon as any domain is emptied.
pub fn ac3(
    config: &GridConfig,
    domains: &mut DomainStore,
    arcs: Option<&[(SlotId, SlotId)]>,
    requeue_rule: RequeueRule,
    pruning: &mut Pruning,
) -> Result<(), Unsatisfiable> {
    let mut queue: VecDeque<(SlotId, SlotId)> = match arcs {
        Some(arcs) => arcs.iter().copied().collect(),
        None => all_arcs(config).into(),
    };

    while let Some((x, y)) = queue.pop_front() {
        let size_before = domains.size(x);

        if !revise(config, domains, x, y) {
            continue;
        }

        pruning.revisions += 1;
        pruning.pruned_words += (size_before - domains.size(x)) as u64;

        if domains.get(x).is_empty() {
            debug!(event = "arc_consistency_wipeout", slot_id = x, revised_against = y);
            return Err(Unsatisfiable::EmptyDomain { slot_id: x });
        }

        for z in config.neighbors(x) {
            let requeue = match requeue_rule {
                RequeueRule::ExcludeNeighborsOfOther => !config.neighbors(y).contains(z),
                RequeueRule::AllNeighbors => z != y,
            };

            if requeue {
                queue.push_back((z, x));
            }
        }
    }

    debug!(
        event = "arc_consistency",
        revisions = pruning.revisions,
        pruned_words = pruning.pruned_words,
    );

    Ok(())
}

/// Check whether every candidate for every slot has a supporting candidate in each crossing slot.
pub fn is_arc_consistent(config: &GridConfig, domains: &DomainStore) -> bool {
    (0..config.slot_count()).all(|x| {
        config.neighbors(x).iter().all(|y| {
            let Some(overlap) = config.overlap(x, y) else {
                return true;
            };
            let supported_letters = letters_at(config, domains, y, overlap.other_cell_idx);

            domains.get(x).iter().all(|word_id| {
                config.words[word_id]
                    .glyphs
                    .get(overlap.cell_idx)
                    .is_some_and(|letter| supported_letters.contains(letter))
            })
        })
    })
}

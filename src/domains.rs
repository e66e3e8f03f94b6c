use bit_set::BitSet;
use std::fmt::{Debug, Formatter};

use crate::grid_config::GridConfig;
use crate::{SlotId, WordId};

/// The candidate words still considered for each slot. Every domain starts as the whole vocabulary
/// and is only ever narrowed, by node and arc consistency, before search begins.
#[derive(Clone)]
pub struct DomainStore {
    domains: Vec<BitSet>,
}

impl Debug for DomainStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.domains.iter().map(|domain| domain.len()))
            .finish()
    }
}

impl DomainStore {
    /// Give every slot in the grid the full vocabulary.
    pub fn new(config: &GridConfig) -> DomainStore {
        let word_count = config.words.len();
        let all_words: BitSet = (0..word_count).collect();

        DomainStore {
            domains: config.slot_configs.iter().map(|_| all_words.clone()).collect(),
        }
    }

    pub fn get(&self, slot_id: SlotId) -> &BitSet {
        &self.domains[slot_id]
    }

    /// Replace a slot's domain. The new domain must be a subset of the old one.
    pub fn set(&mut self, slot_id: SlotId, domain: BitSet) {
        debug_assert!(
            domain.is_subset(&self.domains[slot_id]),
            "domain for slot {slot_id} can't grow"
        );
        self.domains[slot_id] = domain;
    }

    /// A copy of a slot's domain that stays put while the live domain is being pruned.
    pub fn snapshot(&self, slot_id: SlotId) -> BitSet {
        self.domains[slot_id].clone()
    }

    /// Drop a single candidate, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].remove(word_id)
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// How many candidates remain for a slot.
    pub fn size(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].len()
    }

    /// The lowest-numbered slot with no candidates left, if any.
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.domains.iter().position(|domain| domain.is_empty())
    }

    /// The candidates for a slot as strings, in word order.
    pub fn words<'a>(&self, config: &'a GridConfig, slot_id: SlotId) -> Vec<&'a str> {
        self.domains[slot_id]
            .iter()
            .map(|word_id| config.words[word_id].string.as_str())
            .collect()
    }
}

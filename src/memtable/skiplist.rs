//! Arena-backed skip list
//!
//! Nodes live in a `Vec` and refer to each other by index, so the pointer
//! graph needs no unsafe aliasing. Index 0 is the sentinel head, which owns
//! `max_level` lanes and carries no key.

use std::cmp::Ordering;

use crate::comparator::KeyComparator;
use crate::model::{GetResult, KeyValuePair, Slice};

use super::level::LevelGenerator;

const HEAD: usize = 0;

#[derive(Debug)]
struct Node {
    key: Slice,
    value: Slice,
    /// Next node on each lane this node participates in
    forwards: Vec<Option<usize>>,
}

/// Ordered map from keys to values with unique keys
#[derive(Debug)]
pub struct SkipList {
    nodes: Vec<Node>,
}

impl SkipList {
    pub fn new(max_level: usize) -> Self {
        let head = Node {
            key: Slice::empty(),
            value: Slice::empty(),
            forwards: vec![None; max_level.max(1)],
        };
        Self { nodes: vec![head] }
    }

    /// Insert `key` unless it is already present.
    ///
    /// Returns false (and leaves the list untouched) for an existing key.
    pub fn put(
        &mut self,
        key: Slice,
        value: Slice,
        comparator: &dyn KeyComparator,
        levels: &LevelGenerator,
    ) -> bool {
        let max_level = self.nodes[HEAD].forwards.len();
        let mut predecessors = vec![HEAD; max_level];
        let mut current = HEAD;

        for level in (0..max_level).rev() {
            current = self.advance(current, level, key.as_bytes(), comparator);
            predecessors[level] = current;
        }

        if let Some(next) = self.nodes[current].forwards[0] {
            if comparator.compare(self.nodes[next].key.as_bytes(), key.as_bytes()) == Ordering::Equal {
                return false;
            }
        }

        let height = levels.generate().min(max_level);
        let index = self.nodes.len();
        let mut forwards = Vec::with_capacity(height);
        for (level, &predecessor) in predecessors.iter().enumerate().take(height) {
            forwards.push(self.nodes[predecessor].forwards[level]);
            self.nodes[predecessor].forwards[level] = Some(index);
        }
        self.nodes.push(Node { key, value, forwards });
        true
    }

    /// Exact-match lookup
    pub fn get(&self, key: &Slice, comparator: &dyn KeyComparator) -> GetResult {
        match self.node_matching(HEAD, key.as_bytes(), comparator) {
            Some(index) => GetResult::found(key.clone(), self.nodes[index].value.clone()),
            None => GetResult::missing(key.clone()),
        }
    }

    /// Look up several keys in one ordered pass.
    ///
    /// Keys are sorted by the comparator, then each search resumes from the
    /// last matched node instead of the head. Returns the hits in key order
    /// and the keys that were not found.
    pub fn multi_get(&self, keys: &[Slice], comparator: &dyn KeyComparator) -> (Vec<GetResult>, Vec<Slice>) {
        let mut sorted: Vec<Slice> = keys.to_vec();
        sorted.sort_by(|a, b| comparator.compare(a.as_bytes(), b.as_bytes()));

        let mut found = Vec::new();
        let mut missing = Vec::new();
        let mut start = HEAD;

        for key in sorted {
            match self.node_matching(start, key.as_bytes(), comparator) {
                Some(index) => {
                    found.push(GetResult::found(key, self.nodes[index].value.clone()));
                    start = index;
                }
                None => missing.push(key),
            }
        }
        (found, missing)
    }

    /// All pairs in ascending key order (walks lane 0)
    pub fn all_key_values(&self) -> Vec<KeyValuePair> {
        let mut pairs = Vec::with_capacity(self.nodes.len() - 1);
        let mut next = self.nodes[HEAD].forwards[0];
        while let Some(index) = next {
            let node = &self.nodes[index];
            pairs.push(KeyValuePair {
                key: node.key.clone(),
                value: node.value.clone(),
            });
            next = node.forwards[0];
        }
        pairs
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Move right along `level` while the next key is strictly less than `key`
    fn advance(&self, mut current: usize, level: usize, key: &[u8], comparator: &dyn KeyComparator) -> usize {
        while let Some(next) = self.nodes[current].forwards[level] {
            if comparator.compare(self.nodes[next].key.as_bytes(), key) == Ordering::Less {
                current = next;
            } else {
                break;
            }
        }
        current
    }

    /// Descend from `start` (the head or a node with key < `key`) to an exact match
    fn node_matching(&self, start: usize, key: &[u8], comparator: &dyn KeyComparator) -> Option<usize> {
        if start != HEAD
            && comparator.compare(self.nodes[start].key.as_bytes(), key) == Ordering::Equal
        {
            return Some(start);
        }

        let mut current = start;
        for level in (0..self.nodes[start].forwards.len()).rev() {
            current = self.advance(current, level, key, comparator);
        }

        let next = self.nodes[current].forwards[0]?;
        if comparator.compare(self.nodes[next].key.as_bytes(), key) == Ordering::Equal {
            Some(next)
        } else {
            None
        }
    }
}

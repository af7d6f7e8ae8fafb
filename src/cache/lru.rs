//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::HashMap;

/// Index of the sentinel node closing the circular list.
const SENTINEL: usize = 0;

#[derive(Debug)]
struct Node {
    key: String,
    prev: usize,
    next: usize,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys live in an arena-backed circular doubly-linked list closed by a
/// sentinel node, with a HashMap from key to arena slot:
/// - Front (sentinel.next) = Most recently used
/// - Back (sentinel.prev) = Least recently used
///
/// Touch, remove and eviction are all O(1).
#[derive(Debug)]
pub struct LruTracker {
    index: HashMap<String, usize>,
    nodes: Vec<Node>,
    /// Recycled arena slots
    free: Vec<usize>,
}

impl Default for LruTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity + 1);
        nodes.push(Node {
            key: String::new(),
            prev: SENTINEL,
            next: SENTINEL,
        });

        Self {
            index: HashMap::with_capacity(capacity),
            nodes,
            free: Vec::new(),
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front).
    ///
    /// If key is new, it is inserted at the front.
    pub fn touch(&mut self, key: &str) {
        if let Some(&idx) = self.index.get(key) {
            self.unlink(idx);
            self.link_front(idx);
            return;
        }

        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx].key = key.to_string();
                idx
            }
            None => {
                self.nodes.push(Node {
                    key: key.to_string(),
                    prev: SENTINEL,
                    next: SENTINEL,
                });
                self.nodes.len() - 1
            }
        };
        self.index.insert(key.to_string(), idx);
        self.link_front(idx);
    }

    // == Touch Existing ==
    /// Moves a key to the front only if it is already tracked.
    ///
    /// Returns false when the key is unknown, leaving the tracker untouched.
    pub fn touch_existing(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.unlink(idx);
                self.link_front(idx);
                true
            }
            None => false,
        }
    }

    // == Remove ==
    /// Removes a key from the tracker. Returns whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.release(idx);
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let idx = self.nodes[SENTINEL].prev;
        if idx == SENTINEL {
            return None;
        }

        let key = self.release(idx);
        self.index.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&str> {
        let idx = self.nodes[SENTINEL].prev;
        (idx != SENTINEL).then(|| self.nodes[idx].key.as_str())
    }

    // == Keys ==
    /// Returns tracked keys from least to most recently used.
    pub fn keys_oldest_first(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut idx = self.nodes[SENTINEL].prev;
        while idx != SENTINEL {
            keys.push(self.nodes[idx].key.clone());
            idx = self.nodes[idx].prev;
        }
        keys
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.index.clear();
        self.free.clear();
        self.nodes.truncate(1);
        self.nodes[SENTINEL].prev = SENTINEL;
        self.nodes[SENTINEL].next = SENTINEL;
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[SENTINEL].next;
        self.nodes[idx].prev = SENTINEL;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[SENTINEL].next = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Unlinks a slot, recycles it and hands back its key.
    fn release(&mut self, idx: usize) -> String {
        self.unlink(idx);
        self.free.push(idx);
        std::mem::take(&mut self.nodes[idx].key)
    }
}

//! Data-to-item reconciliation
//!
//! Layers hold plain data records and render one visual item per record.
//! Between renders the set of records changes, so each render diffs the new
//! dataset against the items already on screen:
//!
//! - records whose key is new **enter** (a fresh [`ItemKey`] is allocated)
//! - records whose key already has an item **update** (same [`ItemKey`])
//! - items whose key disappeared **exit**
//!
//! Identity is carried by the record key only, never by position, so
//! reordering a dataset never creates or destroys items.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

/// Stable identity of one rendered item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey(u64);

impl ItemKey {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Allocator for [`ItemKey`]s, scoped to one timeline
#[derive(Clone, Debug, Default)]
pub struct IdentityArena {
    next: u64,
}

impl IdentityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a key that has never been returned by this arena
    pub fn allocate(&mut self) -> ItemKey {
        let key = ItemKey(self.next);
        self.next += 1;
        key
    }
}

/// Mapping from record keys to the items that currently render them
#[derive(Clone, Debug)]
pub struct IdentityMap<K> {
    items: HashMap<K, ItemKey>,
}

impl<K> Default for IdentityMap<K> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> IdentityMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<ItemKey> {
        self.items.get(key).copied()
    }

    /// Reverse lookup from an item to the record key it renders
    pub fn key_of(&self, item: ItemKey) -> Option<&K> {
        self.items
            .iter()
            .find_map(|(key, &candidate)| (candidate == item).then_some(key))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forget every mapping, returning the items that were tracked
    pub fn clear(&mut self) -> Vec<ItemKey> {
        let mut items: Vec<ItemKey> = self.items.drain().map(|(_, item)| item).collect();
        items.sort();
        items
    }
}

/// Outcome of one reconciliation pass
///
/// `enter` and `update` carry the index of the record in the dataset that
/// was passed in. `exit` is sorted by key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub enter: Vec<(usize, ItemKey)>,
    pub update: Vec<(usize, ItemKey)>,
    pub exit: Vec<ItemKey>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }
}

/// Diff `keys` against the items tracked by `map`, updating `map` in place
///
/// When the same key appears more than once, the first occurrence wins and
/// the rest are skipped.
pub fn reconcile<K, I>(map: &mut IdentityMap<K>, keys: I, arena: &mut IdentityArena) -> Reconciliation
where
    K: Clone + Eq + Hash + Debug,
    I: IntoIterator<Item = K>,
{
    let mut result = Reconciliation::default();
    let mut seen: HashSet<K> = HashSet::new();

    for (index, key) in keys.into_iter().enumerate() {
        if seen.contains(&key) {
            warn!("Duplicate datum key {:?} at index {}, skipped", key, index);
            continue;
        }
        match map.items.get(&key) {
            Some(&item) => result.update.push((index, item)),
            None => {
                let item = arena.allocate();
                map.items.insert(key.clone(), item);
                result.enter.push((index, item));
            }
        }
        seen.insert(key);
    }

    map.items.retain(|key, item| {
        if seen.contains(key) {
            true
        } else {
            result.exit.push(*item);
            false
        }
    });
    result.exit.sort();

    result
}

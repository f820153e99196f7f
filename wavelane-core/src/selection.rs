//! Selection state management
//!
//! Tracks which visual items of a layer are selected and keeps the style
//! class of each item in sync with its membership.

use crate::layer::VisualItem;
use crate::reconciler::ItemKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default class added to selected items
pub const DEFAULT_SELECTED_CLASS: &str = "selected";

/// Selected items of one layer
///
/// Membership is ordered by selection time and holds no duplicates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelectableSet {
    /// Currently selected items
    selected: Vec<ItemKey>,

    /// Class toggled on selected items
    selected_class: String,
}

impl Default for SelectableSet {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTED_CLASS)
    }
}

impl SelectableSet {
    /// Create an empty set tagging items with `selected_class`
    pub fn new(selected_class: impl Into<String>) -> Self {
        Self {
            selected: Vec::new(),
            selected_class: selected_class.into(),
        }
    }

    pub fn selected_class(&self) -> &str {
        &self.selected_class
    }

    /// Change the selection class, moving it on every selected item
    pub fn set_selected_class(
        &mut self,
        class: impl Into<String>,
        items: &mut HashMap<ItemKey, VisualItem>,
    ) {
        let class = class.into();
        for key in &self.selected {
            if let Some(item) = items.get_mut(key) {
                item.remove_class(&self.selected_class);
                item.add_class(&class);
            }
        }
        self.selected_class = class;
    }

    /// Add an item to the selection
    pub fn select(&mut self, item: &mut VisualItem) {
        item.add_class(&self.selected_class);
        if !self.selected.contains(&item.key) {
            self.selected.push(item.key);
        }
    }

    /// Remove an item from the selection
    pub fn unselect(&mut self, item: &mut VisualItem) {
        item.remove_class(&self.selected_class);
        self.selected.retain(|&k| k != item.key);
    }

    /// Toggle an item's selection state, returning whether it is now selected
    pub fn toggle(&mut self, item: &mut VisualItem) -> bool {
        if self.contains(&item.key) {
            self.unselect(item);
            false
        } else {
            self.select(item);
            true
        }
    }

    /// Unselect everything
    pub fn clear(&mut self, items: &mut HashMap<ItemKey, VisualItem>) {
        for key in self.selected.drain(..) {
            if let Some(item) = items.get_mut(&key) {
                item.remove_class(&self.selected_class);
            }
        }
    }

    /// Drop an item that no longer exists
    pub fn forget(&mut self, key: &ItemKey) {
        self.selected.retain(|k| k != key);
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.selected.contains(key)
    }

    /// Snapshot of the selected items
    pub fn selected_items(&self) -> Vec<ItemKey> {
        self.selected.clone()
    }

    pub fn as_slice(&self) -> &[ItemKey] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parent/children overlay used by component-bearing units.
///
/// The overlay is keyed by the same unit ids as the graph but is not owned
/// by it structurally: a unit can exist without a place in the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubComponentTree {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    parent: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    slot: BTreeMap<String, String>,
}

impl SubComponentTree {
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty() && self.children.is_empty()
    }

    pub fn parent_of(&self, unit_id: &str) -> Option<&str> {
        self.parent.get(unit_id).map(String::as_str)
    }

    pub fn children_of(&self, unit_id: &str) -> &[String] {
        self.children
            .get(unit_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn slot_of(&self, unit_id: &str) -> Option<&str> {
        self.slot.get(unit_id).map(String::as_str)
    }

    /// Re-parents `child` under `parent`, appending it to the parent's children.
    pub fn move_root(&mut self, parent_id: &str, child_id: &str, slot_name: &str) {
        self.detach(child_id);
        self.parent
            .insert(child_id.to_string(), parent_id.to_string());
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .push(child_id.to_string());
        self.slot
            .insert(child_id.to_string(), slot_name.to_string());
    }

    /// Removes `unit_id` from its parent's children.
    pub fn detach(&mut self, unit_id: &str) {
        if let Some(parent_id) = self.parent.remove(unit_id) {
            if let Some(siblings) = self.children.get_mut(&parent_id) {
                siblings.retain(|id| id != unit_id);
                if siblings.is_empty() {
                    self.children.remove(&parent_id);
                }
            }
        }
        self.slot.remove(unit_id);
    }

    /// Drops every trace of `unit_id`; its children become roots.
    pub fn remove(&mut self, unit_id: &str) {
        self.detach(unit_id);
        for child_id in self.children.remove(unit_id).unwrap_or_default() {
            self.parent.remove(&child_id);
            self.slot.remove(&child_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_root_reparents() {
        let mut tree = SubComponentTree::default();
        tree.move_root("a", "c", "default");
        tree.move_root("b", "c", "default");

        assert_eq!(tree.parent_of("c"), Some("b"));
        assert!(tree.children_of("a").is_empty());
        assert_eq!(tree.children_of("b"), ["c".to_string()]);
    }

    #[test]
    fn remove_orphans_children() {
        let mut tree = SubComponentTree::default();
        tree.move_root("a", "b", "default");
        tree.move_root("b", "c", "default");
        tree.remove("b");

        assert_eq!(tree.parent_of("c"), None);
        assert!(tree.children_of("a").is_empty());
        assert!(tree.is_empty());
    }
}

use super::io::{Io, IoOf};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The pins one unit contributes to a merge, split by direction.
pub type MergeUnitSpec = IoOf<BTreeSet<String>>;

/// All merges of a graph, by merge id.
pub type MergesSpec = BTreeMap<String, MergeSpec>;

impl MergeUnitSpec {
    pub fn pin_count(&self) -> usize {
        self.input.len() + self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty() && self.output.is_empty()
    }
}

/// An n-ary junction: every listed unit pin is fused onto one wire.
///
/// Membership is a set, so two merges with the same participants compare
/// equal regardless of the order pins were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeSpec(BTreeMap<String, MergeUnitSpec>);

impl MergeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literals.
    pub fn with_pin(mut self, unit_id: &str, io: Io, pin_id: &str) -> Self {
        self.insert(unit_id, io, pin_id);
        self
    }

    /// Adds a pin; returns false if it was already a member.
    pub fn insert(&mut self, unit_id: &str, io: Io, pin_id: &str) -> bool {
        self.0
            .entry(unit_id.to_string())
            .or_default()
            .get_mut(io)
            .insert(pin_id.to_string())
    }

    /// Removes a pin, dropping the unit entry once it has no pins left.
    pub fn remove(&mut self, unit_id: &str, io: Io, pin_id: &str) -> bool {
        let Some(unit) = self.0.get_mut(unit_id) else {
            return false;
        };
        let removed = unit.get_mut(io).remove(pin_id);
        if unit.is_empty() {
            self.0.remove(unit_id);
        }
        removed
    }

    pub fn remove_unit(&mut self, unit_id: &str) -> Option<MergeUnitSpec> {
        self.0.remove(unit_id)
    }

    pub fn contains(&self, unit_id: &str, io: Io, pin_id: &str) -> bool {
        self.0
            .get(unit_id)
            .is_some_and(|unit| unit.get(io).contains(pin_id))
    }

    pub fn unit(&self, unit_id: &str) -> Option<&MergeUnitSpec> {
        self.0.get(unit_id)
    }

    pub fn has_unit(&self, unit_id: &str) -> bool {
        self.0.contains_key(unit_id)
    }

    pub fn unit_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn pin_count(&self) -> usize {
        self.0.values().map(MergeUnitSpec::pin_count).sum()
    }

    pub fn type_pin_count(&self, io: Io) -> usize {
        self.0.values().map(|unit| unit.get(io).len()).sum()
    }

    pub fn unit_pin_count(&self, unit_id: &str) -> usize {
        self.0.get(unit_id).map_or(0, MergeUnitSpec::pin_count)
    }

    pub fn is_empty(&self) -> bool {
        self.pin_count() == 0
    }

    /// Every member as `(unit_id, io, pin_id)`; per unit, inputs come first.
    pub fn pins(&self) -> impl Iterator<Item = (&str, Io, &str)> {
        self.0.iter().flat_map(|(unit_id, unit)| {
            unit.iter().flat_map(move |(io, pins)| {
                pins.iter()
                    .map(move |pin_id| (unit_id.as_str(), io, pin_id.as_str()))
            })
        })
    }

    /// Adds every pin of `other` that is not already a member.
    pub fn extend_from(&mut self, other: &MergeSpec) {
        for (unit_id, io, pin_id) in other.pins() {
            self.insert(unit_id, io, pin_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_direction_and_unit() {
        let merge = MergeSpec::new()
            .with_pin("a", Io::Output, "o")
            .with_pin("b", Io::Output, "o")
            .with_pin("c", Io::Input, "i");

        assert_eq!(merge.pin_count(), 3);
        assert_eq!(merge.type_pin_count(Io::Output), 2);
        assert_eq!(merge.type_pin_count(Io::Input), 1);
        assert_eq!(merge.unit_pin_count("c"), 1);
        assert_eq!(merge.unit_pin_count("z"), 0);
    }

    #[test]
    fn remove_drops_empty_unit_entries() {
        let mut merge = MergeSpec::new().with_pin("a", Io::Input, "x");
        assert!(merge.remove("a", Io::Input, "x"));
        assert!(!merge.has_unit("a"));
        assert!(merge.is_empty());
        assert!(!merge.remove("a", Io::Input, "x"));
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let left = MergeSpec::new()
            .with_pin("a", Io::Output, "o")
            .with_pin("b", Io::Input, "i");
        let right = MergeSpec::new()
            .with_pin("b", Io::Input, "i")
            .with_pin("a", Io::Output, "o");
        assert_eq!(left, right);
    }
}

//! The move plan consumed by the engine.
//!
//! A [`CollapseMap`] says which entities move ([`GraphSelection`]) and what
//! they are called and bound to on the other side. The engine never invents
//! ids; every id it writes into the target comes from one of these tables.

pub mod connect;
pub mod plan;

pub use connect::*;
pub use plan::*;

use crate::spec::{Io, IoOf, MergeSpec, SubPinSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One boundary sub-pin named by a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlugRef {
    #[serde(rename = "type")]
    pub io: Io,
    pub pin_id: String,
    pub sub_pin_id: String,
}

impl PlugRef {
    pub fn new(io: Io, pin_id: impl Into<String>, sub_pin_id: impl Into<String>) -> Self {
        Self {
            io,
            pin_id: pin_id.into(),
            sub_pin_id: sub_pin_id.into(),
        }
    }
}

/// One unit pin whose direct link crosses the selection boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRef {
    pub unit_id: String,
    #[serde(rename = "type")]
    pub io: Io,
    pub pin_id: String,
}

impl LinkRef {
    pub fn new(unit_id: impl Into<String>, io: Io, pin_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            io,
            pin_id: pin_id.into(),
        }
    }
}

/// What is moving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSelection {
    #[serde(default)]
    pub unit: Vec<String>,
    #[serde(default)]
    pub merge: Vec<String>,
    #[serde(default)]
    pub plug: Vec<PlugRef>,
    #[serde(default)]
    pub link: Vec<LinkRef>,
}

impl GraphSelection {
    pub fn units<I, S>(unit_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unit: unit_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unit.is_empty() && self.merge.is_empty() && self.plug.is_empty() && self.link.is_empty()
    }

    pub fn has_plug(&self, io: Io, pin_id: &str, sub_pin_id: &str) -> bool {
        self.plug
            .iter()
            .any(|plug| plug.io == io && plug.pin_id == pin_id && plug.sub_pin_id == sub_pin_id)
    }
}

/// New direction, sub-pin id and merge for a moved boundary plug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPlug {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub io: Option<Io>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_pin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_id: Option<String>,
}

/// Rewiring of a link pin: the merge it joins and the boundary pin standing
/// in for the other end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_pin_id: Option<String>,
}

/// Id renames applied while moving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextIdMap {
    #[serde(default)]
    pub unit: BTreeMap<String, String>,
    #[serde(default)]
    pub merge: BTreeMap<String, String>,
    #[serde(default)]
    pub plug: IoOf<BTreeMap<String, BTreeMap<String, NextPlug>>>,
    #[serde(default)]
    pub link: BTreeMap<String, IoOf<BTreeMap<String, NextLink>>>,
}

/// Where a moved unit pin surfaces as a boundary pin, and the merge it
/// belonged to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextUnitPin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_pin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<MergeSpec>,
}

impl NextUnitPin {
    pub fn exposed(pin_id: impl Into<String>, sub_pin_id: impl Into<String>) -> Self {
        Self {
            pin_id: Some(pin_id.into()),
            sub_pin_id: Some(sub_pin_id.into()),
            ..Self::default()
        }
    }

    pub fn merged(mut self, merge_id: impl Into<String>, merge: Option<MergeSpec>) -> Self {
        self.merge_id = Some(merge_id.into());
        self.merge = merge;
        self
    }
}

/// The boundary pin representing one side of a moved merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextMergePin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_pin_spec: Option<SubPinSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opposite_merge: Option<MergeSpec>,
}

/// A complete move plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapseMap {
    #[serde(default)]
    pub node_ids: GraphSelection,
    #[serde(default)]
    pub next_id_map: NextIdMap,
    #[serde(default)]
    pub next_pin_id_map: BTreeMap<String, IoOf<BTreeMap<String, NextUnitPin>>>,
    #[serde(default)]
    pub next_merge_pin_id: BTreeMap<String, IoOf<Option<NextMergePin>>>,
    #[serde(default)]
    pub next_plug_spec: IoOf<BTreeMap<String, BTreeMap<String, SubPinSpec>>>,
    #[serde(default)]
    pub next_sub_component_parent_map: BTreeMap<String, String>,
    #[serde(default)]
    pub next_sub_component_children_map: BTreeMap<String, Vec<String>>,
}

impl CollapseMap {
    pub fn new(selection: GraphSelection) -> Self {
        Self {
            node_ids: selection,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &GraphSelection {
        &self.node_ids
    }

    pub fn next_unit_id<'a>(&'a self, unit_id: &'a str) -> &'a str {
        self.next_id_map
            .unit
            .get(unit_id)
            .map_or(unit_id, String::as_str)
    }

    pub fn next_merge_id<'a>(&'a self, merge_id: &'a str) -> &'a str {
        self.next_id_map
            .merge
            .get(merge_id)
            .map_or(merge_id, String::as_str)
    }

    pub fn next_unit_pin(&self, unit_id: &str, io: Io, pin_id: &str) -> Option<&NextUnitPin> {
        self.next_pin_id_map.get(unit_id)?.get(io).get(pin_id)
    }

    pub fn next_merge_pin(&self, merge_id: &str, io: Io) -> Option<&NextMergePin> {
        self.next_merge_pin_id.get(merge_id)?.get(io).as_ref()
    }

    pub fn next_plug(&self, io: Io, pin_id: &str, sub_pin_id: &str) -> Option<&NextPlug> {
        self.next_id_map.plug.get(io).get(pin_id)?.get(sub_pin_id)
    }

    pub fn next_link(&self, unit_id: &str, io: Io, pin_id: &str) -> Option<&NextLink> {
        self.next_id_map.link.get(unit_id)?.get(io).get(pin_id)
    }

    pub fn next_plug_spec(&self, io: Io, pin_id: &str, sub_pin_id: &str) -> Option<&SubPinSpec> {
        self.next_plug_spec.get(io).get(pin_id)?.get(sub_pin_id)
    }

    /// True when the plan rebinds any sub-pin of boundary pin `io.pin_id`.
    pub fn rebinds_pin(&self, io: Io, pin_id: &str) -> bool {
        self.next_plug_spec.get(io).contains_key(pin_id)
    }

    // Builder helpers for hand-written plans.

    pub fn rename_unit(mut self, unit_id: &str, next_id: &str) -> Self {
        self.next_id_map
            .unit
            .insert(unit_id.to_string(), next_id.to_string());
        self
    }

    pub fn rename_merge(mut self, merge_id: &str, next_id: &str) -> Self {
        self.next_id_map
            .merge
            .insert(merge_id.to_string(), next_id.to_string());
        self
    }

    pub fn with_unit_pin(mut self, unit_id: &str, io: Io, pin_id: &str, next: NextUnitPin) -> Self {
        self.next_pin_id_map
            .entry(unit_id.to_string())
            .or_default()
            .get_mut(io)
            .insert(pin_id.to_string(), next);
        self
    }

    pub fn with_merge_pin(mut self, merge_id: &str, io: Io, next: NextMergePin) -> Self {
        *self
            .next_merge_pin_id
            .entry(merge_id.to_string())
            .or_default()
            .get_mut(io) = Some(next);
        self
    }

    pub fn with_plug_spec(
        mut self,
        io: Io,
        pin_id: &str,
        sub_pin_id: &str,
        sub_pin: impl Into<SubPinSpec>,
    ) -> Self {
        self.next_plug_spec
            .get_mut(io)
            .entry(pin_id.to_string())
            .or_default()
            .insert(sub_pin_id.to_string(), sub_pin.into());
        self
    }

    pub fn with_next_plug(mut self, io: Io, pin_id: &str, sub_pin_id: &str, next: NextPlug) -> Self {
        self.next_id_map
            .plug
            .get_mut(io)
            .entry(pin_id.to_string())
            .or_default()
            .insert(sub_pin_id.to_string(), next);
        self
    }

    pub fn with_link(mut self, unit_id: &str, io: Io, pin_id: &str, next: NextLink) -> Self {
        self.next_id_map
            .link
            .entry(unit_id.to_string())
            .or_default()
            .get_mut(io)
            .insert(pin_id.to_string(), next);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::PlugBinding;

    #[test]
    fn reads_camel_case_wire_shape() {
        let json = r#"{
            "nodeIds": {
                "unit": ["y"],
                "plug": [{"type": "input", "pinId": "a", "subPinId": "0"}],
                "link": [{"unitId": "x", "type": "output", "pinId": "o"}]
            },
            "nextIdMap": {"unit": {"y": "y2"}},
            "nextPinIdMap": {"y": {"input": {"i": {"pinId": "i", "subPinId": "0", "mergeId": "m"}}}},
            "nextMergePinId": {"m": {"output": {"mergeId": "m", "pinId": "o", "subPinSpec": {}}}},
            "nextPlugSpec": {"input": {"a": {"0": {"unitId": "y2", "pinId": "i"}}}}
        }"#;
        let map: CollapseMap = serde_json::from_str(json).expect("valid collapse map");

        assert_eq!(map.next_unit_id("y"), "y2");
        assert_eq!(map.next_unit_id("x"), "x");
        assert!(map.selection().has_plug(Io::Input, "a", "0"));
        assert_eq!(
            map.next_unit_pin("y", Io::Input, "i")
                .and_then(|next| next.merge_id.as_deref()),
            Some("m")
        );
        assert_eq!(
            map.next_merge_pin("m", Io::Output)
                .and_then(|next| next.sub_pin_spec.clone()),
            Some(SubPinSpec::unbound())
        );
        assert!(map.next_merge_pin("m", Io::Input).is_none());
        assert_eq!(
            map.next_plug_spec(Io::Input, "a", "0"),
            Some(&PlugBinding::unit("y2", "i").into())
        );
        assert!(map.rebinds_pin(Io::Input, "a"));
    }

    #[test]
    fn empty_selection() {
        assert!(GraphSelection::default().is_empty());
        assert!(!GraphSelection::units(["a"]).is_empty());
    }
}

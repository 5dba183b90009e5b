use super::{CollapseMap, ConnectOpt, GraphSelection, NextMergePin, NextPlug, NextUnitPin, PlugRef};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::spec::{ExposedPinSpec, IoOf, MergeSpec, PlugBinding, SubPinSpec};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Id renames to apply while dissolving a graph unit into its host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRemap {
    pub unit: BTreeMap<String, String>,
    pub merge: BTreeMap<String, String>,
    pub plug: IoOf<BTreeMap<String, BTreeMap<String, String>>>,
}

impl IdRemap {
    /// Renames every nested unit and merge id already taken in `host` to the
    /// first free `<id>_<n>`.
    pub fn avoiding(host: &Graph, nested: &Graph) -> Self {
        Self {
            unit: fresh_ids(host.units.keys(), nested.units.keys()),
            merge: fresh_ids(host.merges.keys(), nested.merges.keys()),
            plug: IoOf::default(),
        }
    }

    pub fn next_unit<'a>(&'a self, unit_id: &'a str) -> &'a str {
        self.unit.get(unit_id).map_or(unit_id, String::as_str)
    }

    pub fn next_merge<'a>(&'a self, merge_id: &'a str) -> &'a str {
        self.merge.get(merge_id).map_or(merge_id, String::as_str)
    }
}

fn fresh_ids<'a>(
    host: impl Iterator<Item = &'a String>,
    nested: impl Iterator<Item = &'a String> + Clone,
) -> BTreeMap<String, String> {
    let mut taken: BTreeSet<String> = host.cloned().collect();
    let clashing: Vec<&String> = nested.clone().filter(|id| taken.contains(*id)).collect();
    taken.extend(nested.cloned());

    let mut renames = BTreeMap::new();
    for id in clashing {
        let fresh = (1..)
            .map(|n| format!("{}_{}", id, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| id.clone());
        taken.insert(fresh.clone());
        renames.insert(id.clone(), fresh);
    }
    renames
}

/// Everything needed to inline a graph unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePlan {
    pub collapse_map: CollapseMap,
    pub connect: ConnectOpt,
}

/// Whether a nested boundary sub-pin must survive as a host boundary pin
/// once its graph unit is inlined.
///
/// A pin the host merges or plugs outward is rewired through the host
/// instead. Otherwise it survives when it fans out, or when it renames the
/// inner pin it forwards to.
pub fn should_expose_pin(
    pin_id: &str,
    pin: &ExposedPinSpec,
    sub_pin: &SubPinSpec,
    merged: bool,
    plugged_outward: bool,
) -> bool {
    if merged || plugged_outward {
        return false;
    }
    if pin.plug_count() > 1 {
        return true;
    }
    !matches!(sub_pin.binding(), Some(PlugBinding::Unit { pin_id: inner, .. }) if inner == pin_id)
}

/// Plans dissolving graph unit `graph_id` of `host` back into `host`.
///
/// Every nested unit and merge is selected. Boundary sub-pins that survive
/// per [`should_expose_pin`] are selected as plugs. Host merges and plugs
/// touching the unit become rebinding entries so the engine can reconnect
/// the surfaced interior.
pub fn inline_plan(host: &Graph, graph_id: &str, remap: &IdRemap) -> Result<InlinePlan, GraphError> {
    let nested = host.unit_graph(graph_id)?;
    let unit_merges = host.unit_merges(graph_id);
    let unit_plugs = host.unit_plugs(graph_id);

    let mut map = CollapseMap::new(GraphSelection {
        unit: nested.units.keys().cloned().collect(),
        merge: nested.merges.keys().cloned().collect(),
        ..GraphSelection::default()
    });
    map.next_id_map.unit = remap.unit.clone();
    map.next_id_map.merge = remap.merge.clone();
    for (io, pins) in remap.plug.iter() {
        for (pin_id, subs) in pins {
            for (sub_pin_id, next_sub_pin_id) in subs {
                let next = NextPlug {
                    sub_pin_id: Some(next_sub_pin_id.clone()),
                    ..NextPlug::default()
                };
                map = map.with_next_plug(io, pin_id, sub_pin_id, next);
            }
        }
    }

    for (io, pins) in nested.exposed.iter() {
        for (pin_id, pin) in pins {
            let host_merge_id = host.find_pin_merge(graph_id, io, pin_id);
            let outer_plug = unit_plugs[io].get(pin_id);

            for (sub_pin_id, sub_pin) in &pin.plug {
                if should_expose_pin(pin_id, pin, sub_pin, host_merge_id.is_some(), outer_plug.is_some()) {
                    map.node_ids.plug.push(PlugRef::new(io, pin_id, sub_pin_id));
                    let next: SubPinSpec = match sub_pin.binding() {
                        Some(PlugBinding::Unit { unit_id, pin_id }) => {
                            PlugBinding::unit(remap.next_unit(unit_id), pin_id).into()
                        }
                        Some(PlugBinding::Merge { merge_id }) => {
                            PlugBinding::merge(remap.next_merge(merge_id)).into()
                        }
                        None => SubPinSpec::unbound(),
                    };
                    map = map.with_plug_spec(io, pin_id, sub_pin_id, next);
                }

                match sub_pin.binding() {
                    Some(PlugBinding::Unit {
                        unit_id,
                        pin_id: inner_pin_id,
                    }) => {
                        let next = NextUnitPin::exposed(pin_id, sub_pin_id);
                        let next = match host_merge_id {
                            Some(merge_id) => {
                                let mut merge = unit_merges.get(merge_id).cloned().unwrap_or_default();
                                merge.remove_unit(graph_id);
                                merge.insert(remap.next_unit(unit_id), io, inner_pin_id);
                                next.merged(merge_id, Some(merge))
                            }
                            None if outer_plug.is_some() => next,
                            None => continue,
                        };
                        map = map.with_unit_pin(unit_id, io, inner_pin_id, next);
                    }
                    Some(PlugBinding::Merge { merge_id: inner_merge_id }) => {
                        let inner_is_empty = nested
                            .merges
                            .get(inner_merge_id)
                            .is_none_or(MergeSpec::is_empty);

                        if inner_is_empty {
                            let next = match host_merge_id {
                                Some(merge_id) => {
                                    let mut opposite = unit_merges.get(merge_id).cloned().unwrap_or_default();
                                    opposite.remove_unit(graph_id);
                                    NextMergePin {
                                        merge_id: Some(merge_id.to_string()),
                                        pin_id: Some(pin_id.clone()),
                                        sub_pin_spec: Some(PlugBinding::merge(merge_id).into()),
                                        opposite_merge: Some(opposite),
                                    }
                                }
                                None => NextMergePin {
                                    sub_pin_spec: Some(SubPinSpec::unbound()),
                                    opposite_merge: Some(MergeSpec::new()),
                                    ..NextMergePin::default()
                                },
                            };
                            map = map.with_merge_pin(inner_merge_id, io, next);
                        } else {
                            let opposite = host_merge_id
                                .and_then(|merge_id| unit_merges.get(merge_id))
                                .cloned()
                                .unwrap_or_default();
                            let next = NextMergePin {
                                merge_id: Some(remap.next_merge(inner_merge_id).to_string()),
                                pin_id: Some(pin_id.clone()),
                                sub_pin_spec: Some(SubPinSpec::unbound()),
                                opposite_merge: Some(opposite),
                            };
                            map = map.with_merge_pin(inner_merge_id, io.opposite(), next);
                        }
                    }
                    None => {}
                }
            }
        }
    }

    debug!(
        graph_id,
        units = map.node_ids.unit.len(),
        merges = map.node_ids.merge.len(),
        plugs = map.node_ids.plug.len(),
        "planned inline"
    );

    Ok(InlinePlan {
        collapse_map: map,
        connect: ConnectOpt::for_unit(host, graph_id),
    })
}

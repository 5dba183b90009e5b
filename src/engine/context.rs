use super::Direction;
use crate::collapse::{CollapseMap, ConnectOpt};
use crate::error::MoveError;
use crate::graph::GraphLike;
use crate::spec::{ExposedPinSpec, ExposedPinsSpec, Io, IoOf, MergesSpec, OuterPlug};
use ahash::{AHashMap, AHashSet};

/// Read-only state shared by the steps of one move.
///
/// Built from the source graph before anything is mutated: `pin_specs` and
/// `merge_specs` are snapshots, so later steps see the wiring as it was
/// when the move started.
#[derive(Debug)]
pub struct MoveContext<'m> {
    pub graph_id: &'m str,
    pub map: &'m CollapseMap,
    pub connect: &'m ConnectOpt,
    pub direction: Direction,
    pub pin_specs: ExposedPinsSpec,
    pub merge_specs: MergesSpec,
    ignored_units: AHashSet<String>,
    ignored_merges: AHashSet<String>,
    ignored_unit_pins: AHashMap<String, IoOf<AHashSet<String>>>,
    touched_merges: AHashSet<String>,
}

impl<'m> MoveContext<'m> {
    /// Validates the selection against `source` and indexes it.
    ///
    /// Fails with `MissingUnit`, `MissingMerge` or `MissingPlug` when the
    /// selection names something `source` does not have.
    pub fn new<G: GraphLike>(
        source: &G,
        graph_id: &'m str,
        map: &'m CollapseMap,
        connect: &'m ConnectOpt,
        direction: Direction,
    ) -> Result<Self, MoveError> {
        let selection = map.selection();

        if let Some(unit_id) = selection.unit.iter().find(|id| !source.has_unit(id)) {
            return Err(MoveError::MissingUnit(unit_id.clone()));
        }
        if let Some(merge_id) = selection.merge.iter().find(|id| !source.has_merge(id)) {
            return Err(MoveError::MissingMerge(merge_id.clone()));
        }
        if let Some(plug) = selection
            .plug
            .iter()
            .find(|plug| !source.has_plug(plug.io, &plug.pin_id, &plug.sub_pin_id))
        {
            return Err(MoveError::MissingPlug {
                io: plug.io,
                pin_id: plug.pin_id.clone(),
                sub_pin_id: plug.sub_pin_id.clone(),
            });
        }

        let mut merge_specs = MergesSpec::new();
        for merge_id in &selection.merge {
            merge_specs.insert(merge_id.clone(), source.get_merge_spec(merge_id)?.clone());
        }

        let mut ctx = Self {
            graph_id,
            map,
            connect,
            direction,
            pin_specs: source.get_exposed_pin_specs().clone(),
            merge_specs,
            ignored_units: selection.unit.iter().cloned().collect(),
            ignored_merges: selection.merge.iter().cloned().collect(),
            ignored_unit_pins: AHashMap::new(),
            touched_merges: AHashSet::new(),
        };

        // A link pin is left to link processing unless some boundary plug
        // reaches it that is not itself moving.
        for link in &selection.link {
            let reached_from_outside = ctx
                .unit_pin_plugs(&link.unit_id, link.io, &link.pin_id)
                .pop()
                .is_some_and(|plug| !selection.has_plug(link.io, &plug.pin_id, &plug.sub_pin_id));
            if reached_from_outside {
                continue;
            }
            ctx.ignore_unit_pin(&link.unit_id, link.io, &link.pin_id);
        }

        let merge_pins: Vec<(String, Io, String)> = ctx
            .merge_specs
            .values()
            .flat_map(|merge| merge.pins())
            .map(|(unit_id, io, pin_id)| (unit_id.to_string(), io, pin_id.to_string()))
            .collect();
        for (unit_id, io, pin_id) in merge_pins {
            ctx.ignore_unit_pin(&unit_id, io, &pin_id);
        }

        ctx.touched_merges = touched_merges(map, connect);
        Ok(ctx)
    }

    pub fn is_reverse(&self) -> bool {
        self.direction.is_reverse()
    }

    pub fn is_ignored_unit(&self, unit_id: &str) -> bool {
        self.ignored_units.contains(unit_id)
    }

    pub fn is_ignored_merge(&self, merge_id: &str) -> bool {
        self.ignored_merges.contains(merge_id)
    }

    pub fn is_unit_pin_ignored(&self, unit_id: &str, io: Io, pin_id: &str) -> bool {
        self.ignored_unit_pins
            .get(unit_id)
            .is_some_and(|pins| pins[io].contains(pin_id))
    }

    /// Snapshot of a source boundary pin.
    pub fn pin_spec(&self, io: Io, pin_id: &str) -> Option<&ExposedPinSpec> {
        self.pin_specs[io].get(pin_id)
    }

    /// Snapshot boundary sub-pins bound to `unit_id.pin_id`, in boundary
    /// order. The last entry is the one a link check consults.
    pub fn unit_pin_plugs(&self, unit_id: &str, io: Io, pin_id: &str) -> Vec<OuterPlug> {
        self.pin_specs[io]
            .iter()
            .flat_map(move |(boundary_pin_id, pin)| {
                pin.plug
                    .iter()
                    .filter(move |(_, sub_pin)| sub_pin.is_unit_pin(unit_id, pin_id))
                    .map(move |(sub_pin_id, _)| OuterPlug::new(boundary_pin_id, sub_pin_id))
            })
            .collect()
    }

    /// Merge ids this move may have emptied, on either side.
    pub fn touched_merges(&self) -> &AHashSet<String> {
        &self.touched_merges
    }

    fn ignore_unit_pin(&mut self, unit_id: &str, io: Io, pin_id: &str) {
        self.ignored_unit_pins
            .entry(unit_id.to_string())
            .or_default()[io]
            .insert(pin_id.to_string());
    }
}

fn touched_merges(map: &CollapseMap, connect: &ConnectOpt) -> AHashSet<String> {
    let mut touched = AHashSet::new();
    for merge_id in &map.selection().merge {
        touched.insert(merge_id.clone());
        touched.insert(map.next_merge_id(merge_id).to_string());
    }
    for pins in map.next_pin_id_map.values() {
        for (_, by_pin) in pins.iter() {
            touched.extend(by_pin.values().filter_map(|next| next.merge_id.clone()));
        }
    }
    for sides in map.next_merge_pin_id.values() {
        for (_, next) in sides.iter() {
            touched.extend(next.as_ref().and_then(|next| next.merge_id.clone()));
        }
    }
    for links in map.next_id_map.link.values() {
        for (_, by_pin) in links.iter() {
            touched.extend(by_pin.values().filter_map(|next| next.merge_id.clone()));
        }
    }
    for (_, pins) in map.next_id_map.plug.iter() {
        for subs in pins.values() {
            touched.extend(subs.values().filter_map(|next| next.merge_id.clone()));
        }
    }
    touched.extend(connect.merges.keys().cloned());
    touched
}

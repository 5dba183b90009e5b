use super::{MoveContext, Scopes};
use crate::error::MoveError;
use crate::graph::GraphLike;
use crate::spec::{ExposedPinSpec, Io, MergeSpec, PlugBinding, SELF};
use serde_json::Value;
use tracing::{debug, trace};

const DEFAULT_SLOT: &str = "default";

struct PinInfo {
    io: Io,
    pin_id: String,
    is_ref: bool,
    constant: bool,
    data: Option<Value>,
}

/// Moves one unit and rewires each of its pins across the boundary.
///
/// Pins the context ignores (merge members and link pins) are left to the
/// merge and link steps.
pub fn move_unit<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    ctx: &MoveContext<'_>,
    unit_id: &str,
) -> Result<(), MoveError> {
    let map = ctx.map;
    let graph_id = ctx.graph_id;
    let next_unit_id = map.next_unit_id(unit_id);

    let unit = scopes.source().remove_unit(unit_id)?;

    let mut pins: Vec<PinInfo> = Vec::new();
    for io in Io::ALL {
        for pin_id in unit.pin_names(io) {
            if ctx.is_unit_pin_ignored(unit_id, io, &pin_id) || unit.is_pin_ignored(io, &pin_id) {
                continue;
            }
            pins.push(PinInfo {
                io,
                is_ref: unit.is_pin_ref(io, &pin_id),
                constant: unit.is_pin_constant(io, &pin_id),
                data: unit.pin_data(io, &pin_id).cloned(),
                pin_id,
            });
        }
    }
    if !ctx.is_unit_pin_ignored(unit_id, Io::Output, SELF) {
        pins.push(PinInfo {
            io: Io::Output,
            pin_id: SELF.to_string(),
            is_ref: false,
            constant: false,
            data: None,
        });
    }

    scopes.target().add_unit(next_unit_id, unit)?;
    replay_hierarchy(scopes.target(), ctx, unit_id, next_unit_id)?;

    for pin in pins {
        move_unit_pin(scopes, ctx, unit_id, next_unit_id, pin)?;
    }

    debug!(unit_id, next_unit_id, graph_id, "unit moved");
    Ok(())
}

fn replay_hierarchy<G: GraphLike>(
    target: &mut G,
    ctx: &MoveContext<'_>,
    unit_id: &str,
    next_unit_id: &str,
) -> Result<(), MoveError> {
    let map = ctx.map;
    if let Some(parent_id) = map.next_sub_component_parent_map.get(unit_id) {
        if target.has_unit(parent_id) {
            target.move_root(parent_id, next_unit_id, DEFAULT_SLOT)?;
        }
    }
    // Children still waiting to move pick up the parent when they arrive.
    for child_id in map
        .next_sub_component_children_map
        .get(unit_id)
        .into_iter()
        .flatten()
    {
        if target.has_unit(child_id) {
            target.move_root(next_unit_id, child_id, DEFAULT_SLOT)?;
        }
    }
    Ok(())
}

fn move_unit_pin<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    ctx: &MoveContext<'_>,
    unit_id: &str,
    next_unit_id: &str,
    pin: PinInfo,
) -> Result<(), MoveError> {
    let graph_id = ctx.graph_id;
    let PinInfo {
        io,
        pin_id,
        is_ref,
        constant,
        data,
    } = pin;

    let next = ctx.map.next_unit_pin(unit_id, io, &pin_id);
    let next_merge_id = next.and_then(|next| next.merge_id.as_deref());
    let should_swap = next_merge_id.is_some_and(|merge_id| !ctx.is_ignored_merge(merge_id) || ctx.is_reverse());
    let exposed = next.and_then(|next| Some((next.pin_id.as_deref()?, next.sub_pin_id.as_deref()?)));

    // Host boundary plugs into this pin either follow it through the graph
    // unit or are released.
    let outer_plugs = ctx.unit_pin_plugs(unit_id, io, &pin_id);
    if !ctx.is_reverse() {
        let source = scopes.source();
        for plug in &outer_plugs {
            if !source.has_plug(io, &plug.pin_id, &plug.sub_pin_id) {
                continue;
            }
            match exposed {
                Some((next_pin_id, _)) => source.plug_pin(
                    io,
                    &plug.pin_id,
                    &plug.sub_pin_id,
                    PlugBinding::unit(graph_id, next_pin_id).into(),
                )?,
                None => source.unplug_pin(io, &plug.pin_id, &plug.sub_pin_id)?,
            }
        }
    }

    let Some((next_pin_id, next_sub_pin_id)) = exposed else {
        trace!(unit_id, %io, %pin_id, "pin stays internal");
        return Ok(());
    };
    let binding = PlugBinding::unit(next_unit_id, &pin_id);

    if ctx.is_reverse() {
        let target = scopes.target();
        if let Some(merge_id) = next_merge_id {
            if target.has_merge_pin(merge_id, graph_id, io, next_pin_id) {
                target.remove_pin_or_merge(merge_id, graph_id, io, next_pin_id)?;
            }
        }
        if let Some(outer) = ctx.connect.plugs[io].get(next_pin_id) {
            if target.has_pin_named(io, &outer.pin_id) {
                target.plug_pin(io, &outer.pin_id, &outer.sub_pin_id, binding.into())?;
            } else {
                target.expose_pin_set(
                    io,
                    &outer.pin_id,
                    ExposedPinSpec::new().with_plug(&outer.sub_pin_id, binding),
                )?;
            }
        }
    } else {
        let target = scopes.target();
        if target.has_pin_named(io, next_pin_id) {
            target.expose_pin(io, next_pin_id, next_sub_pin_id, binding.into())?;
        } else {
            target.expose_pin_set(
                io,
                next_pin_id,
                ExposedPinSpec::new()
                    .with_plug(next_sub_pin_id, binding)
                    .reference(is_ref)
                    .with_data(data),
            )?;
        }
    }

    if constant {
        if ctx.is_reverse() {
            return Err(MoveError::Unsupported("inlining a constant unit pin"));
        }
        let target = scopes.target();
        target.set_unit_pin_constant(next_unit_id, io, &pin_id, false)?;
        target.set_pin_constant(io, next_pin_id, true)?;
    }

    let Some(merge_id) = next_merge_id.filter(|_| should_swap) else {
        return Ok(());
    };
    let seed = next.and_then(|next| next.merge.clone()).unwrap_or_default();

    if ctx.is_reverse() {
        let target = scopes.target();
        if target.has_merge_pin(merge_id, graph_id, io, next_pin_id) {
            target.remove_pin_from_merge(merge_id, graph_id, io, next_pin_id)?;
        }
        if !target.has_merge(merge_id) {
            target.add_merge(merge_id, seed)?;
        }
        if !target.has_merge_pin(merge_id, next_unit_id, io, &pin_id) {
            target.add_pin_to_merge(merge_id, next_unit_id, io, &pin_id)?;
        }
    } else {
        let source = scopes.source();
        if !source.has_merge(merge_id) {
            source.add_merge(merge_id, seed_without(seed, unit_id))?;
        }
        if source.has_merge_pin(merge_id, unit_id, io, &pin_id) {
            source.remove_pin_from_merge(merge_id, unit_id, io, &pin_id)?;
        }
        if !source.has_merge_pin(merge_id, graph_id, io, next_pin_id) {
            source.add_pin_to_merge(merge_id, graph_id, io, next_pin_id)?;
        }
    }
    trace!(unit_id, %io, %pin_id, merge_id, "merge membership swapped");
    Ok(())
}

// The unit has already left the source, so it cannot stay a member there.
fn seed_without(mut seed: MergeSpec, unit_id: &str) -> MergeSpec {
    seed.remove_unit(unit_id);
    seed
}

use super::{LinkTarget, MoveContext, Scopes, move_link_pin_into, upsert_merge};
use crate::collapse::{LinkRef, NextMergePin};
use crate::error::MoveError;
use crate::graph::GraphLike;
use crate::spec::{ExposedPinSpec, Io, IoOf, MergeSpec, PlugBinding, SELF, SubPinSpec};
use itertools::Itertools;
use tracing::{debug, trace};

/// Moves one merge, as snapshotted in `merge`, across the boundary.
///
/// Members that move with it (or that belong to the graph unit) are
/// collected into the moved merge. Members that stay are re-routed through
/// the boundary pins the plan names for each side.
pub fn move_merge<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    ctx: &MoveContext<'_>,
    merge_id: &str,
    merge: &MergeSpec,
) -> Result<(), MoveError> {
    let map = ctx.map;
    let graph_id = ctx.graph_id;
    let next_merge_id = map.next_merge_id(merge_id);
    let next_input = map.next_merge_pin(merge_id, Io::Input);
    let next_output = map.next_merge_pin(merge_id, Io::Output);

    let pin_count = merge.pin_count();
    let input_count = merge.type_pin_count(Io::Input);
    let output_count = merge.type_pin_count(Io::Output);

    let data = {
        let source = scopes.source();
        let data = source.get_merge_data(merge_id).cloned();
        if source.has_merge(merge_id) {
            source.remove_merge(merge_id)?;
        }
        data
    };

    let mut next_merge = MergeSpec::new();
    let mut into = 0usize;
    for (unit_id, io, pin_id) in merge.pins() {
        let next_unit_id = map.next_unit_id(unit_id);
        if next_unit_id == graph_id {
            // The graph unit's pin dissolves into whatever it forwards to.
            let target = scopes.target();
            let exposed = target.get_exposed_pin_spec(io, pin_id)?.clone();
            for sub_pin in exposed.plug.values() {
                match sub_pin.binding() {
                    Some(PlugBinding::Unit {
                        unit_id: inner_unit_id,
                        pin_id: inner_pin_id,
                    }) => {
                        next_merge.insert(inner_unit_id, io, inner_pin_id);
                    }
                    Some(PlugBinding::Merge {
                        merge_id: inner_merge_id,
                    }) => {
                        if let Ok(inner) = target.get_merge_spec(inner_merge_id) {
                            next_merge.extend_from(inner);
                        }
                    }
                    None => {}
                }
            }
            into += 1;
        } else if ctx.is_ignored_unit(unit_id) {
            next_merge.insert(next_unit_id, io, pin_id);
            into += 1;
        }

        let endpoint = if io == Io::Output && !ctx.is_ignored_unit(unit_id) {
            next_input
        } else {
            next_output
        };
        move_link_pin_into(
            scopes,
            ctx,
            &LinkRef::new(unit_id, io, pin_id),
            data.clone(),
            endpoint.and_then(link_target),
            None,
        )?;
    }

    let materialize = if ctx.is_reverse() {
        pin_count == 0 || into > 1
    } else {
        (into == 0 && (pin_count == 0 || (input_count > 0 && output_count > 0))) || into > 1
    };
    if materialize {
        trace!(merge_id, next_merge_id, pins = next_merge.pin_count(), "materializing merge");
        upsert_merge(scopes.target(), next_merge_id, next_merge.clone())?;
    }

    if ctx.is_reverse() {
        restore_host_wiring(scopes, ctx, merge_id, &next_merge)?;
    } else {
        for (io, endpoint) in [(Io::Input, next_input), (Io::Output, next_output)] {
            let Some(NextMergePin {
                pin_id: Some(pin_id),
                sub_pin_spec: Some(sub_pin),
                ..
            }) = endpoint
            else {
                continue;
            };
            let target = scopes.target();
            if target.has_pin_named(io, pin_id) {
                target.expose_pin(io, pin_id, "0", sub_pin.clone())?;
            } else {
                target.expose_pin_set(io, pin_id, ExposedPinSpec::new().with_plug("0", sub_pin.clone()))?;
            }
        }
        repoint_boundary_plugs(
            scopes,
            ctx,
            merge_id,
            &next_merge,
            IoOf::new(next_input, next_output),
        )?;
    }

    debug!(merge_id, next_merge_id, into, materialize, "merge moved");
    Ok(())
}

fn link_target(endpoint: &NextMergePin) -> Option<LinkTarget<'_>> {
    Some(LinkTarget {
        merge_id: endpoint.merge_id.as_deref()?,
        pin_id: endpoint.pin_id.as_deref()?,
    })
}

/// Fuses every host merge that reached the inner merge through a boundary
/// pin of the graph unit with the inner merge itself.
///
/// Host boundary plugs bound straight to such a pin are rebound to the
/// fused merge.
fn restore_host_wiring<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    ctx: &MoveContext<'_>,
    merge_id: &str,
    inner: &MergeSpec,
) -> Result<(), MoveError> {
    let graph_id = ctx.graph_id;
    let next_merge_id = ctx.map.next_merge_id(merge_id);

    for (io, pins) in ctx.pin_specs.iter() {
        for (pin_id, pin) in pins {
            if !pin.plug.values().any(|sub_pin| sub_pin.is_merge(merge_id)) {
                continue;
            }

            for (host_merge_id, host_merge) in &ctx.connect.merges {
                if !host_merge.contains(graph_id, io, pin_id)
                    || host_merge.contains(graph_id, Io::Output, SELF)
                {
                    continue;
                }
                let mut fused = host_merge.clone();
                fused.remove(graph_id, io, pin_id);
                fused.extend_from(inner);

                let target = scopes.target();
                if host_merge_id != next_merge_id && target.has_merge(host_merge_id) {
                    let current = target.remove_merge(host_merge_id)?;
                    fused.extend_from(&current);
                    fused.remove(graph_id, io, pin_id);
                }
                upsert_merge(target, next_merge_id, fused)?;
                if target.has_merge_pin(next_merge_id, graph_id, io, pin_id) {
                    target.remove_pin_from_merge(next_merge_id, graph_id, io, pin_id)?;
                }
                trace!(%host_merge_id, next_merge_id, %pin_id, "host merge fused");
            }

            if let Some(outer) = ctx.connect.plugs[io].get(pin_id) {
                let target = scopes.target();
                if target.has_plug(io, &outer.pin_id, &outer.sub_pin_id) {
                    if !target.has_merge(next_merge_id) {
                        target.add_merge(next_merge_id, inner.clone())?;
                    }
                    target.plug_pin(
                        io,
                        &outer.pin_id,
                        &outer.sub_pin_id,
                        PlugBinding::merge(next_merge_id).into(),
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// Host boundary plugs bound to a merge moving inward now reach it through
/// a same-named boundary pin of the graph unit.
///
/// Inside, the sub-pin binds to the moved merge, or straight to its only
/// pin when a single-pin merge was not rebuilt.
fn repoint_boundary_plugs<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    ctx: &MoveContext<'_>,
    merge_id: &str,
    next_merge: &MergeSpec,
    endpoints: IoOf<Option<&NextMergePin>>,
) -> Result<(), MoveError> {
    let graph_id = ctx.graph_id;
    let next_merge_id = ctx.map.next_merge_id(merge_id);
    let sole_pin = next_merge
        .pins()
        .exactly_one()
        .ok()
        .map(|(unit_id, _, pin_id)| PlugBinding::unit(unit_id, pin_id));

    for (io, pins) in ctx.pin_specs.iter() {
        let opposite_merge_id = endpoints[io].and_then(|endpoint| endpoint.merge_id.as_deref());

        for (pin_id, pin) in pins {
            // Pins the plan rebinds explicitly are handled by the plug step.
            if ctx.map.rebinds_pin(io, pin_id) {
                continue;
            }
            for (sub_pin_id, _) in pin.plug.iter().filter(|(_, sub_pin)| sub_pin.is_merge(merge_id)) {
                if !scopes.source().has_plug(io, pin_id, sub_pin_id) {
                    continue;
                }

                let target = scopes.target();
                let inner: SubPinSpec = if target.has_merge(next_merge_id) {
                    PlugBinding::merge(next_merge_id).into()
                } else {
                    sole_pin.clone().into()
                };
                if target.has_pin_named(io, pin_id) {
                    target.plug_pin(io, pin_id, sub_pin_id, inner)?;
                } else {
                    target.expose_pin_set(
                        io,
                        pin_id,
                        ExposedPinSpec::new()
                            .with_plug(sub_pin_id, inner)
                            .with_data(pin.data.clone()),
                    )?;
                }

                let source = scopes.source();
                let outer: SubPinSpec = match opposite_merge_id {
                    Some(opposite) if source.has_merge(opposite) => PlugBinding::merge(opposite).into(),
                    _ => PlugBinding::unit(graph_id, pin_id).into(),
                };
                source.plug_pin(io, pin_id, sub_pin_id, outer)?;
                trace!(%io, %pin_id, %sub_pin_id, merge_id, "boundary plug repointed");
            }
        }
    }
    Ok(())
}

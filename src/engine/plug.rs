use super::{MoveContext, Scopes, ensure_merge_pin};
use crate::collapse::PlugRef;
use crate::error::MoveError;
use crate::graph::GraphLike;
use crate::spec::{ExposedPinSpec, MergeSpec, PlugBinding, SubPinSpec};
use tracing::{trace, warn};

/// Moves one boundary sub-pin from the source boundary to the target's.
///
/// `sub_pin` is the binding the plug had before the move. The new binding
/// comes from the plan and is dropped to unbound when it names something
/// the target does not have. Runs the same way in both directions.
pub fn move_plug<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    ctx: &MoveContext<'_>,
    plug: &PlugRef,
    sub_pin: &SubPinSpec,
) -> Result<(), MoveError> {
    let PlugRef {
        io,
        pin_id,
        sub_pin_id,
    } = plug;
    let io = *io;
    let map = ctx.map;
    let graph_id = ctx.graph_id;

    let data = {
        let source = scopes.source();
        source.get_sub_pin_spec(io, pin_id, sub_pin_id)?;
        let data = source.get_pin_data(io, pin_id).cloned();
        if source.get_pin_plug_count(io, pin_id) == 1 {
            source.cover_pin_set(io, pin_id)?;
        } else {
            source.cover_pin(io, pin_id, sub_pin_id)?;
        }
        data
    };

    let next_plug = map.next_plug(io, pin_id, sub_pin_id);
    let next_io = next_plug.and_then(|next| next.io).unwrap_or(io);
    let next_sub_pin_id = next_plug
        .and_then(|next| next.sub_pin_id.as_deref())
        .unwrap_or(sub_pin_id.as_str());
    let planned = map
        .next_plug_spec(io, pin_id, sub_pin_id)
        .cloned()
        .unwrap_or_default();
    let target = scopes.target();
    let resolved = match planned.binding() {
        Some(PlugBinding::Unit { unit_id, .. }) if target.has_unit(unit_id) => planned.clone(),
        Some(PlugBinding::Merge { merge_id }) if target.has_merge(merge_id) => planned.clone(),
        Some(binding) => {
            warn!(%io, %pin_id, %sub_pin_id, %binding, "planned binding missing from target, plug left unbound");
            SubPinSpec::unbound()
        }
        None => SubPinSpec::unbound(),
    };

    if target.has_pin_named(next_io, pin_id) {
        target.expose_pin(next_io, pin_id, next_sub_pin_id, resolved)?;
    } else {
        target.expose_pin_set(
            next_io,
            pin_id,
            ExposedPinSpec::new()
                .with_plug(next_sub_pin_id, resolved)
                .with_data(data),
        )?;
    }

    // The graph unit now carries the pin under the id it was exposed with.
    let source = scopes.source();
    match sub_pin.binding() {
        Some(PlugBinding::Unit {
            unit_id,
            pin_id: unit_pin_id,
        }) => {
            let link_merge_id = map
                .next_link(unit_id, io, unit_pin_id)
                .and_then(|next| next.merge_id.as_deref());
            let plug_merge_id = next_plug.and_then(|next| next.merge_id.as_deref());
            if let Some(merge_id) = link_merge_id {
                ensure_merge_pin(source, merge_id, graph_id, next_io, pin_id)?;
            } else if let Some(merge_id) = plug_merge_id {
                if source.has_merge(merge_id) {
                    ensure_merge_pin(source, merge_id, graph_id, next_io, pin_id)?;
                } else {
                    source.add_merge(
                        merge_id,
                        MergeSpec::new()
                            .with_pin(graph_id, next_io, pin_id)
                            .with_pin(unit_id, io, unit_pin_id),
                    )?;
                }
            }
        }
        Some(PlugBinding::Merge { merge_id }) => {
            let merge_id = map
                .next_merge_pin(merge_id, io)
                .and_then(|next| next.merge_id.as_deref())
                .or_else(|| next_plug.and_then(|next| next.merge_id.as_deref()));
            if let Some(merge_id) = merge_id {
                ensure_merge_pin(source, merge_id, graph_id, next_io, pin_id)?;
            }
        }
        None => {}
    }

    trace!(%io, %pin_id, %sub_pin_id, %next_io, next_sub_pin_id, "plug moved");
    Ok(())
}

use super::{MoveContext, Scopes};
use crate::collapse::LinkRef;
use crate::error::MoveError;
use crate::graph::GraphLike;
use crate::spec::{ExposedPinSpec, MergeSpec, OuterPlug, PlugBinding, SubPinSpec};
use serde_json::Value;
use tracing::trace;

/// The far end of a link once it crosses the boundary: a merge on the
/// source side and the boundary pin it meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTarget<'a> {
    pub merge_id: &'a str,
    pub pin_id: &'a str,
}

/// Re-routes a unit pin that stays behind so it reaches its moved peer
/// through a boundary pin.
///
/// `opposite` wires the pin to a boundary pin on the other side through a
/// source merge. `plug` forwards an existing source boundary plug through
/// the graph unit instead. A pin of the graph unit itself is covered on
/// the target unless the merge it sat in absorbs it.
pub fn move_link_pin_into<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    ctx: &MoveContext<'_>,
    link: &LinkRef,
    data: Option<Value>,
    opposite: Option<LinkTarget<'_>>,
    plug: Option<&OuterPlug>,
) -> Result<(), MoveError> {
    let LinkRef { unit_id, io, pin_id } = link;
    let io = *io;
    let graph_id = ctx.graph_id;

    if ctx.is_ignored_unit(unit_id) {
        return Ok(());
    }

    if unit_id == graph_id {
        let absorbed = ctx
            .map
            .next_unit_pin(unit_id, io, pin_id)
            .and_then(|next| next.merge.as_ref())
            .is_some_and(|merge| merge.pin_count() > merge.unit_pin_count(unit_id));
        let target = scopes.target();
        if !absorbed && target.has_pin_named(io, pin_id) {
            trace!(%io, %pin_id, "covering graph boundary pin");
            target.cover_pin_set(io, pin_id)?;
        }
        return Ok(());
    }

    if let Some(LinkTarget {
        merge_id,
        pin_id: opposite_pin_id,
    }) = opposite
    {
        let opposite_io = io.opposite();
        if ctx.is_reverse() {
            let source = scopes.source();
            if source.has_pin_named(opposite_io, opposite_pin_id) {
                source.cover_pin_set(opposite_io, opposite_pin_id)?;
            }
        } else {
            let (is_ref, data) = {
                let source = scopes.source();
                let data = data.or_else(|| source.get_unit_pin_data(unit_id, io, pin_id).cloned());
                (source.is_unit_pin_ref(unit_id, io, pin_id), data)
            };
            let target = scopes.target();
            if !target.has_pin_named(opposite_io, opposite_pin_id) {
                target.expose_pin_set(
                    opposite_io,
                    opposite_pin_id,
                    ExposedPinSpec::new()
                        .with_plug("0", SubPinSpec::unbound())
                        .reference(is_ref)
                        .with_data(data),
                )?;
            }

            let source = scopes.source();
            if source.has_merge(merge_id) {
                if !source.has_merge_pin(merge_id, graph_id, opposite_io, opposite_pin_id) {
                    source.add_pin_to_merge(merge_id, graph_id, opposite_io, opposite_pin_id)?;
                }
                if !source.has_merge_pin(merge_id, unit_id, io, pin_id) {
                    source.add_pin_to_merge(merge_id, unit_id, io, pin_id)?;
                }
            } else {
                source.add_merge(
                    merge_id,
                    MergeSpec::new()
                        .with_pin(unit_id, io, pin_id)
                        .with_pin(graph_id, opposite_io, opposite_pin_id),
                )?;
            }
        }
        trace!(%unit_id, %io, %pin_id, merge_id, opposite_pin_id, "link rerouted");
    }

    if let Some(plug) = plug {
        let target = scopes.target();
        let inner = PlugBinding::unit(unit_id, pin_id);
        if target.has_pin_named(io, &plug.pin_id) {
            target.expose_pin(io, &plug.pin_id, "0", inner.into())?;
        } else {
            target.expose_pin_set(io, &plug.pin_id, ExposedPinSpec::new().with_plug("0", inner))?;
        }

        let source = scopes.source();
        let outer = PlugBinding::unit(graph_id, &plug.pin_id);
        if source.has_pin_named(io, &plug.pin_id) {
            source.plug_pin(io, &plug.pin_id, &plug.sub_pin_id, outer.into())?;
        } else {
            source.expose_pin_set(
                io,
                &plug.pin_id,
                ExposedPinSpec::new().with_plug(&plug.sub_pin_id, outer),
            )?;
        }
    }

    Ok(())
}

//! The move engine: relocates a selection between two graphs.
//!
//! One algorithm runs in two directions. [`Direction::Encapsulate`] lifts
//! the selection out of a host into the nested graph of unit `graph_id`;
//! [`Direction::Inline`] splices a nested graph's contents back into the
//! host. Steps always run in the same order: links, units, merges, plugs.
//!
//! ```rust
//! use graft::prelude::*;
//!
//! let mut host = Graph::new()
//!     .with_unit("x", Unit::new("source").with_output("o", Pin::new("number")))
//!     .with_unit("y", Unit::new("sink").with_input("i", Pin::new("number")))
//!     .with_unit("b", Unit::graph("box", Graph::new()))
//!     .with_merge(
//!         "m",
//!         MergeSpec::new()
//!             .with_pin("x", Io::Output, "o")
//!             .with_pin("y", Io::Input, "i"),
//!     );
//!
//! let map = CollapseMap::new(GraphSelection::units(["y"]))
//!     .with_unit_pin("y", Io::Input, "i", NextUnitPin::exposed("i", "0").merged("m", None));
//!
//! let report = host.encapsulate_into("b", map)?;
//! assert_eq!(report.units, 1);
//! assert!(host.has_merge_pin("m", "b", Io::Input, "i"));
//! # Ok::<(), graft::error::MoveError>(())
//! ```

mod context;
mod link;
mod merge;
mod plug;
mod scope;
mod unit;

pub use context::MoveContext;
pub use link::{LinkTarget, move_link_pin_into};
pub use merge::move_merge;
pub use plug::move_plug;
pub use scope::Scopes;
pub use unit::move_unit;

use crate::collapse::{CollapseMap, ConnectOpt};
use crate::error::{GraphError, MoveError};
use crate::graph::GraphLike;
use crate::spec::{Io, MergeSpec};
use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

/// Which way a move runs.
///
/// Defaults to [`Direction::Inline`], the direction a bare move takes
/// when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Host to nested graph.
    Encapsulate,
    /// Nested graph to host.
    #[default]
    Inline,
}

impl Direction {
    pub fn is_reverse(self) -> bool {
        self == Direction::Inline
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encapsulate => f.write_str("encapsulate"),
            Direction::Inline => f.write_str("inline"),
        }
    }
}

/// What a move did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    pub direction: Direction,
    pub links: usize,
    pub units: usize,
    pub merges: usize,
    pub plugs: usize,
    pub pruned_merges: Vec<String>,
}

impl MoveReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// True when nothing was moved or pruned.
    pub fn is_empty(&self) -> bool {
        self.links + self.units + self.merges + self.plugs == 0 && self.pruned_merges.is_empty()
    }
}

impl fmt::Display for MoveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} units, {} merges, {} plugs, {} links",
            self.direction, self.units, self.merges, self.plugs, self.links
        )?;
        if !self.pruned_merges.is_empty() {
            write!(f, "; pruned {}", self.pruned_merges.iter().join(", "))?;
        }
        Ok(())
    }
}

/// A configured move, ready to apply.
#[derive(Debug, Clone)]
pub struct SubgraphMove {
    graph_id: String,
    map: CollapseMap,
    connect: ConnectOpt,
    direction: Direction,
    prune_dangling_merges: bool,
}

pub struct SubgraphMoveBuilder {
    graph_id: String,
    map: CollapseMap,
    connect: ConnectOpt,
    direction: Direction,
    prune_dangling_merges: bool,
}

impl SubgraphMoveBuilder {
    pub fn new(graph_id: impl Into<String>, map: CollapseMap) -> Self {
        Self {
            graph_id: graph_id.into(),
            map,
            connect: ConnectOpt::default(),
            direction: Direction::default(),
            prune_dangling_merges: true,
        }
    }

    /// Host wiring to restore when inlining.
    pub fn with_connect(mut self, connect: ConnectOpt) -> Self {
        self.connect = connect;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Whether merges emptied by the move are removed afterwards.
    pub fn prune_dangling_merges(mut self, prune: bool) -> Self {
        self.prune_dangling_merges = prune;
        self
    }

    pub fn build(self) -> SubgraphMove {
        SubgraphMove {
            graph_id: self.graph_id,
            map: self.map,
            connect: self.connect,
            direction: self.direction,
            prune_dangling_merges: self.prune_dangling_merges,
        }
    }
}

impl SubgraphMove {
    pub fn builder(graph_id: impl Into<String>, map: CollapseMap) -> SubgraphMoveBuilder {
        SubgraphMoveBuilder::new(graph_id, map)
    }

    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    pub fn collapse_map(&self) -> &CollapseMap {
        &self.map
    }

    pub fn apply<G: GraphLike>(&self, scopes: &mut Scopes<'_, G>) -> Result<MoveReport, MoveError> {
        execute(
            scopes,
            &self.graph_id,
            &self.map,
            &self.connect,
            self.direction,
            self.prune_dangling_merges,
        )
    }
}

/// Applies `map` from `scopes.source()` to `scopes.target()`.
///
/// The selection is checked against the source before anything changes.
/// Errors raised later leave both graphs as far as the move got.
pub fn move_subgraph<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    graph_id: &str,
    map: &CollapseMap,
    connect: &ConnectOpt,
    direction: Direction,
) -> Result<MoveReport, MoveError> {
    execute(scopes, graph_id, map, connect, direction, true)
}

/// Moves the selection from a host into the nested graph of `graph_id`.
pub fn encapsulate<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    graph_id: &str,
    map: &CollapseMap,
) -> Result<MoveReport, MoveError> {
    move_subgraph(scopes, graph_id, map, &ConnectOpt::default(), Direction::Encapsulate)
}

/// Moves the selection from the nested graph of `graph_id` into its host.
pub fn inline<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    graph_id: &str,
    map: &CollapseMap,
    connect: &ConnectOpt,
) -> Result<MoveReport, MoveError> {
    move_subgraph(scopes, graph_id, map, connect, Direction::Inline)
}

#[instrument(name = "move_subgraph", skip_all, fields(graph_id = %graph_id, direction = %direction))]
fn execute<G: GraphLike>(
    scopes: &mut Scopes<'_, G>,
    graph_id: &str,
    map: &CollapseMap,
    connect: &ConnectOpt,
    direction: Direction,
    prune: bool,
) -> Result<MoveReport, MoveError> {
    let selection = map.selection();
    let mut report = MoveReport::new(direction);
    if selection.is_empty() {
        debug!("empty selection, nothing to move");
        return Ok(report);
    }

    let ctx = MoveContext::new(&*scopes.source(), graph_id, map, connect, direction)?;

    for link in &selection.link {
        debug!(unit_id = %link.unit_id, io = %link.io, pin_id = %link.pin_id, "moving link");
        let opposite = map
            .next_link(&link.unit_id, link.io, &link.pin_id)
            .and_then(|next| {
                Some(LinkTarget {
                    merge_id: next.merge_id.as_deref()?,
                    pin_id: next.opposite_pin_id.as_deref()?,
                })
            });
        move_link_pin_into(scopes, &ctx, link, None, opposite, None)?;
        report.links += 1;
    }

    for unit_id in &selection.unit {
        debug!(%unit_id, next_unit_id = map.next_unit_id(unit_id), "moving unit");
        move_unit(scopes, &ctx, unit_id)?;
        report.units += 1;
    }

    for (merge_id, merge) in selection
        .merge
        .iter()
        .filter_map(|merge_id| Some((merge_id, ctx.merge_specs.get(merge_id)?)))
    {
        debug!(%merge_id, pins = merge.pin_count(), "moving merge");
        move_merge(scopes, &ctx, merge_id, merge)?;
        report.merges += 1;
    }

    for plug in &selection.plug {
        debug!(io = %plug.io, pin_id = %plug.pin_id, sub_pin_id = %plug.sub_pin_id, "moving plug");
        let sub_pin = ctx
            .pin_spec(plug.io, &plug.pin_id)
            .and_then(|pin| pin.plug.get(&plug.sub_pin_id))
            .cloned()
            .unwrap_or_default();
        move_plug(scopes, &ctx, plug, &sub_pin)?;
        report.plugs += 1;
    }

    if prune {
        let mut pruned = prune_merges(scopes.source(), ctx.touched_merges())?;
        if !scopes.is_shared() {
            pruned.extend(prune_merges(scopes.target(), ctx.touched_merges())?);
        }
        report.pruned_merges = pruned;
    }

    info!(%report, "move complete");
    Ok(report)
}

/// Removes the `candidates` left with no pins and no plug bound to them.
fn prune_merges<G: GraphLike>(
    graph: &mut G,
    candidates: &AHashSet<String>,
) -> Result<Vec<String>, GraphError> {
    let mut pruned = Vec::new();
    for merge_id in candidates.iter().sorted() {
        if !graph.has_merge(merge_id) || !graph.get_merge_spec(merge_id)?.is_empty() {
            continue;
        }
        if is_merge_plugged(graph, merge_id) {
            continue;
        }
        debug!(%merge_id, "pruning empty merge");
        graph.remove_merge(merge_id)?;
        pruned.push(merge_id.clone());
    }
    Ok(pruned)
}

fn is_merge_plugged<G: GraphLike>(graph: &G, merge_id: &str) -> bool {
    graph
        .get_exposed_pin_specs()
        .iter()
        .flat_map(|(_, pins)| pins.values())
        .flat_map(|pin| pin.plug.values())
        .any(|sub_pin| sub_pin.is_merge(merge_id))
}

/// Adds `unit_id.pin_id` to `merge_id`, creating the merge if needed.
pub(crate) fn ensure_merge_pin<G: GraphLike>(
    graph: &mut G,
    merge_id: &str,
    unit_id: &str,
    io: Io,
    pin_id: &str,
) -> Result<(), GraphError> {
    if !graph.has_merge(merge_id) {
        graph.add_merge(merge_id, MergeSpec::new().with_pin(unit_id, io, pin_id))
    } else if !graph.has_merge_pin(merge_id, unit_id, io, pin_id) {
        graph.add_pin_to_merge(merge_id, unit_id, io, pin_id)
    } else {
        Ok(())
    }
}

/// Creates `merge_id` from `merge`, or unions `merge` into it if it exists.
pub(crate) fn upsert_merge<G: GraphLike>(
    graph: &mut G,
    merge_id: &str,
    merge: MergeSpec,
) -> Result<(), GraphError> {
    if !graph.has_merge(merge_id) {
        return graph.add_merge(merge_id, merge);
    }
    for (unit_id, io, pin_id) in merge.pins() {
        if !graph.has_merge_pin(merge_id, unit_id, io, pin_id) {
            graph.add_pin_to_merge(merge_id, unit_id, io, pin_id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_display() {
        let mut report = MoveReport::new(Direction::Encapsulate);
        assert!(report.is_empty());
        report.units = 2;
        report.pruned_merges = vec!["m1".to_string(), "m2".to_string()];
        assert_eq!(
            report.to_string(),
            "encapsulate: 2 units, 0 merges, 0 plugs, 0 links; pruned m1, m2"
        );
    }

    #[test]
    fn direction_wire_names() {
        assert_eq!(
            serde_json::to_string(&Direction::Inline).expect("serializable"),
            "\"inline\""
        );
        assert!(Direction::Inline.is_reverse());
        assert!(!Direction::Encapsulate.is_reverse());
        assert_eq!(Direction::default(), Direction::Inline);
    }
}

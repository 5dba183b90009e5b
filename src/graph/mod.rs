//! The owning graph model and the capability trait the move engine runs on.

pub mod display;
pub mod hierarchy;
pub mod like;
pub mod query;

pub use hierarchy::SubComponentTree;
pub use like::GraphLike;

use crate::collapse::{CollapseMap, IdRemap, inline_plan};
use crate::engine::{Direction, MoveReport, Scopes, SubgraphMove};
use crate::error::{GraphError, MoveError};
use crate::spec::{
    ExposedPinSpec, ExposedPinsSpec, Io, MergeSpec, MergesSpec, PlugBinding, SubPinSpec, Unit,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// A dataflow graph: units and merges by id, plus its own boundary pins.
///
/// All cross references are ids into the owning maps. Nothing here enforces
/// referential integrity on its own; see [`Graph::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[serde(default)]
    pub units: BTreeMap<String, Unit>,
    #[serde(default)]
    pub merges: MergesSpec,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub merge_data: BTreeMap<String, Value>,
    #[serde(default)]
    pub exposed: ExposedPinsSpec,
    #[serde(default, skip_serializing_if = "SubComponentTree::is_empty")]
    pub component: SubComponentTree,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit_id: &str, unit: Unit) -> Self {
        self.units.insert(unit_id.to_string(), unit);
        self
    }

    pub fn with_merge(mut self, merge_id: &str, merge: MergeSpec) -> Self {
        self.merges.insert(merge_id.to_string(), merge);
        self
    }

    pub fn with_exposed(mut self, io: Io, pin_id: &str, pin: ExposedPinSpec) -> Self {
        self.exposed_mut(io).insert(pin_id.to_string(), pin);
        self
    }

    pub fn exposed(&self, io: Io) -> &BTreeMap<String, ExposedPinSpec> {
        self.exposed.get(io)
    }

    pub fn exposed_mut(&mut self, io: Io) -> &mut BTreeMap<String, ExposedPinSpec> {
        self.exposed.get_mut(io)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn merge_count(&self) -> usize {
        self.merges.len()
    }

    pub fn set_merge_data(&mut self, merge_id: &str, data: Value) -> Result<(), GraphError> {
        if !self.merges.contains_key(merge_id) {
            return Err(GraphError::MergeNotFound(merge_id.to_string()));
        }
        self.merge_data.insert(merge_id.to_string(), data);
        Ok(())
    }

    /// The nested graph of a graph unit.
    pub fn unit_graph(&self, unit_id: &str) -> Result<&Graph, GraphError> {
        self.get_unit(unit_id)?
            .graph
            .as_deref()
            .ok_or_else(|| GraphError::NotAGraph(unit_id.to_string()))
    }

    /// Lends the nested graph out of its unit, leaving an empty graph behind.
    ///
    /// Pair with [`Graph::put_unit_graph`]; this is what lets the host and
    /// the nested graph be borrowed mutably at the same time.
    pub fn take_unit_graph(&mut self, unit_id: &str) -> Result<Graph, GraphError> {
        let slot = self.unit_graph_slot(unit_id)?;
        Ok(std::mem::take(slot))
    }

    pub fn put_unit_graph(&mut self, unit_id: &str, graph: Graph) -> Result<(), GraphError> {
        *self.unit_graph_slot(unit_id)? = graph;
        Ok(())
    }

    fn unit_graph_slot(&mut self, unit_id: &str) -> Result<&mut Graph, GraphError> {
        self.units
            .get_mut(unit_id)
            .ok_or_else(|| GraphError::UnitNotFound(unit_id.to_string()))?
            .graph
            .as_deref_mut()
            .ok_or_else(|| GraphError::NotAGraph(unit_id.to_string()))
    }

    /// Moves the selection of `map` out of this graph into the nested graph
    /// of unit `graph_id`.
    ///
    /// The nested graph is always put back, including when the move fails.
    pub fn encapsulate_into(
        &mut self,
        graph_id: &str,
        map: CollapseMap,
    ) -> Result<MoveReport, MoveError> {
        let mut nested = self.take_unit_graph(graph_id)?;
        let result = SubgraphMove::builder(graph_id, map)
            .direction(Direction::Encapsulate)
            .build()
            .apply(&mut Scopes::split(self, &mut nested));
        self.put_unit_graph(graph_id, nested)?;
        result
    }

    /// Dissolves graph unit `graph_id`, splicing its contents into this graph.
    ///
    /// Nested ids that clash with ids already in this graph are renamed.
    /// Afterwards the unit is removed together with any merge membership or
    /// plug still pointing at it.
    pub fn explode_unit(&mut self, graph_id: &str) -> Result<MoveReport, MoveError> {
        let remap = IdRemap::avoiding(self, self.unit_graph(graph_id)?);
        let plan = inline_plan(self, graph_id, &remap)?;
        let mut nested = self.take_unit_graph(graph_id)?;

        let result = SubgraphMove::builder(graph_id, plan.collapse_map)
            .with_connect(plan.connect)
            .direction(Direction::Inline)
            .build()
            .apply(&mut Scopes::split(&mut nested, self));

        match result {
            Ok(report) => {
                self.remove_unit(graph_id)?;
                self.purge_unit(graph_id);
                Ok(report)
            }
            Err(err) => {
                self.put_unit_graph(graph_id, nested)?;
                Err(err)
            }
        }
    }

    /// Drops merge memberships and unbinds plugs that still name `unit_id`.
    fn purge_unit(&mut self, unit_id: &str) {
        let mut emptied = Vec::new();
        for (merge_id, merge) in self.merges.iter_mut() {
            if merge.remove_unit(unit_id).is_some() && merge.is_empty() {
                emptied.push(merge_id.clone());
            }
        }
        for merge_id in emptied {
            debug!(%merge_id, unit_id, "dropping merge emptied by unit removal");
            self.merges.remove(&merge_id);
            self.merge_data.remove(&merge_id);
        }

        for io in Io::ALL {
            for pin in self.exposed_mut(io).values_mut() {
                for sub_pin in pin.plug.values_mut() {
                    if sub_pin.binding().and_then(PlugBinding::unit_id) == Some(unit_id) {
                        *sub_pin = SubPinSpec::unbound();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Pin;

    #[test]
    fn take_and_put_unit_graph() {
        let inner = Graph::new().with_unit("y", Unit::new("id"));
        let mut host = Graph::new()
            .with_unit("b", Unit::graph("sub", inner.clone()))
            .with_unit("x", Unit::new("id"));

        let taken = host.take_unit_graph("b").expect("b is a graph unit");
        assert_eq!(taken, inner);
        assert_eq!(host.unit_graph("b").map(Graph::unit_count), Ok(0));

        host.put_unit_graph("b", taken).expect("put back");
        assert_eq!(host.unit_graph("b").map(Graph::unit_count), Ok(1));

        assert_eq!(
            host.take_unit_graph("x"),
            Err(GraphError::NotAGraph("x".to_string()))
        );
    }

    #[test]
    fn purge_unit_unbinds_and_drops_empty_merges() {
        let mut graph = Graph::new()
            .with_unit("x", Unit::new("id").with_output("o", Pin::new("any")))
            .with_merge("m", MergeSpec::new().with_pin("b", Io::Input, "i"))
            .with_exposed(
                Io::Input,
                "a",
                ExposedPinSpec::new().with_plug("0", PlugBinding::unit("b", "i")),
            );

        graph.purge_unit("b");

        assert!(!graph.has_merge("m"));
        assert!(
            !graph
                .get_sub_pin_spec(Io::Input, "a", "0")
                .expect("slot kept")
                .is_bound()
        );
    }
}

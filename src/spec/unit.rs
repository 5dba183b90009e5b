use super::io::{Io, IoOf, SELF};
use super::pin::Pin;
use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A node of the dataflow graph.
///
/// An atomic unit declares its pins directly. A graph unit wraps a nested
/// [`Graph`] and exposes that graph's boundary pins as its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    #[serde(default)]
    pub spec_id: String,
    #[serde(default)]
    pub pins: IoOf<BTreeMap<String, Pin>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Box<Graph>>,
}

impl Unit {
    pub fn new(spec_id: impl Into<String>) -> Self {
        Self {
            spec_id: spec_id.into(),
            ..Self::default()
        }
    }

    pub fn graph(spec_id: impl Into<String>, graph: Graph) -> Self {
        Self {
            spec_id: spec_id.into(),
            pins: IoOf::default(),
            graph: Some(Box::new(graph)),
        }
    }

    pub fn with_input(mut self, pin_id: &str, pin: Pin) -> Self {
        self.pins.input.insert(pin_id.to_string(), pin);
        self
    }

    pub fn with_output(mut self, pin_id: &str, pin: Pin) -> Self {
        self.pins.output.insert(pin_id.to_string(), pin);
        self
    }

    pub fn is_graph(&self) -> bool {
        self.graph.is_some()
    }

    /// Pin ids of one direction, excluding the synthetic [`SELF`] output.
    pub fn pin_names(&self, io: Io) -> Vec<String> {
        match &self.graph {
            Some(graph) => graph.exposed(io).keys().cloned().collect(),
            None => self.pins.get(io).keys().cloned().collect(),
        }
    }

    pub fn input_names(&self) -> Vec<String> {
        self.pin_names(Io::Input)
    }

    pub fn output_names(&self) -> Vec<String> {
        self.pin_names(Io::Output)
    }

    pub fn has_pin(&self, io: Io, pin_id: &str) -> bool {
        if io == Io::Output && pin_id == SELF {
            return true;
        }
        match &self.graph {
            Some(graph) => graph.exposed(io).contains_key(pin_id),
            None => self.pins.get(io).contains_key(pin_id),
        }
    }

    pub fn is_pin_ignored(&self, io: Io, pin_id: &str) -> bool {
        self.declared(io, pin_id).is_some_and(|pin| pin.ignored)
    }

    pub fn is_pin_ref(&self, io: Io, pin_id: &str) -> bool {
        match &self.graph {
            Some(graph) => graph.exposed(io).get(pin_id).is_some_and(|pin| pin.is_ref),
            None => self.declared(io, pin_id).is_some_and(|pin| pin.is_ref),
        }
    }

    pub fn is_pin_constant(&self, io: Io, pin_id: &str) -> bool {
        match &self.graph {
            Some(graph) => graph
                .exposed(io)
                .get(pin_id)
                .is_some_and(|pin| pin.constant),
            None => self.declared(io, pin_id).is_some_and(|pin| pin.constant),
        }
    }

    pub fn pin_data(&self, io: Io, pin_id: &str) -> Option<&Value> {
        match &self.graph {
            Some(graph) => graph.exposed(io).get(pin_id)?.data.as_ref(),
            None => self.declared(io, pin_id)?.data.as_ref(),
        }
    }

    /// Sets the constant flag; returns false if the pin is unknown.
    pub fn set_pin_constant(&mut self, io: Io, pin_id: &str, constant: bool) -> bool {
        match &mut self.graph {
            Some(graph) => match graph.exposed_mut(io).get_mut(pin_id) {
                Some(pin) => {
                    pin.constant = constant;
                    true
                }
                None => false,
            },
            None => match self.pins.get_mut(io).get_mut(pin_id) {
                Some(pin) => {
                    pin.constant = constant;
                    true
                }
                None => false,
            },
        }
    }

    fn declared(&self, io: Io, pin_id: &str) -> Option<&Pin> {
        self.pins.get(io).get(pin_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ExposedPinSpec, PlugBinding};

    #[test]
    fn graph_unit_reports_boundary_pins() {
        let mut inner = Graph::new();
        inner.exposed_mut(Io::Input).insert(
            "a".to_string(),
            ExposedPinSpec::new()
                .with_plug("0", PlugBinding::unit("x", "i"))
                .reference(true),
        );
        let unit = Unit::graph("g", inner);

        assert_eq!(unit.input_names(), vec!["a".to_string()]);
        assert!(unit.is_pin_ref(Io::Input, "a"));
        assert!(unit.has_pin(Io::Output, SELF));
        assert!(!unit.has_pin(Io::Output, "a"));
    }

    #[test]
    fn atomic_unit_flags() {
        let mut unit = Unit::new("add")
            .with_input("a", Pin::new("number").constant())
            .with_output("sum", Pin::new("number"));

        assert!(unit.is_pin_constant(Io::Input, "a"));
        assert!(unit.set_pin_constant(Io::Input, "a", false));
        assert!(!unit.is_pin_constant(Io::Input, "a"));
        assert!(!unit.set_pin_constant(Io::Input, "missing", true));
    }
}

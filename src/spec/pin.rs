use super::io::IoOf;
use super::plug::{PlugBinding, SubPinSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A declared pin of a unit.
///
/// `type_expr` is opaque here; compatibility checks belong to whoever
/// evaluates type expressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    #[serde(default, rename = "type")]
    pub type_expr: String,
    #[serde(default)]
    pub constant: bool,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default, rename = "ref")]
    pub is_ref: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Pin {
    pub fn new(type_expr: impl Into<String>) -> Self {
        Self {
            type_expr: type_expr.into(),
            ..Self::default()
        }
    }

    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn reference(mut self) -> Self {
        self.is_ref = true;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A pin on a graph's own boundary.
///
/// Each sub-pin ("plug") routes the boundary pin to one unit pin or merge
/// inside the graph. A pin with several plugs fans out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposedPinSpec {
    #[serde(default)]
    pub plug: BTreeMap<String, SubPinSpec>,
    #[serde(default, rename = "ref")]
    pub is_ref: bool,
    #[serde(default)]
    pub constant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// All boundary pins of a graph.
pub type ExposedPinsSpec = IoOf<BTreeMap<String, ExposedPinSpec>>;

impl ExposedPinSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plug(mut self, sub_pin_id: &str, sub_pin: impl Into<SubPinSpec>) -> Self {
        self.plug.insert(sub_pin_id.to_string(), sub_pin.into());
        self
    }

    pub fn reference(mut self, is_ref: bool) -> Self {
        self.is_ref = is_ref;
        self
    }

    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    pub fn plug_count(&self) -> usize {
        self.plug.len()
    }

    /// The sub-pin id of the first plug bound exactly to `binding`.
    pub fn find_plug(&self, binding: &PlugBinding) -> Option<&str> {
        self.plug
            .iter()
            .find(|(_, sub_pin)| sub_pin.binding() == Some(binding))
            .map(|(sub_pin_id, _)| sub_pin_id.as_str())
    }

    /// True when the only plug points at a unit pin named like this boundary
    /// pin, so the boundary pin adds nothing but a hop.
    pub fn is_elidable(&self, pin_id: &str) -> bool {
        let mut plugs = self.plug.values();
        match (plugs.next(), plugs.next()) {
            (Some(SubPinSpec::Bound(PlugBinding::Unit { pin_id: inner, .. })), None) => {
                inner == pin_id
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_plug_by_binding() {
        let pin = ExposedPinSpec::new()
            .with_plug("0", PlugBinding::unit("a", "x"))
            .with_plug("1", PlugBinding::merge("m"));

        assert_eq!(pin.find_plug(&PlugBinding::merge("m")), Some("1"));
        assert_eq!(pin.find_plug(&PlugBinding::unit("a", "y")), None);
        assert_eq!(pin.plug_count(), 2);
        assert!(!pin.is_elidable("x"));

        let rename = ExposedPinSpec::new().with_plug("0", PlugBinding::unit("a", "x"));
        assert!(rename.is_elidable("x"));
    }

    #[test]
    fn pin_flags_use_wire_names() {
        let pin: Pin = serde_json::from_str(r#"{"type":"number","ref":true}"#).unwrap();
        assert!(pin.is_ref);
        assert_eq!(pin.type_expr, "number");
        assert!(!pin.constant);
    }
}

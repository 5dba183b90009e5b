use serde::{Deserialize, Serialize};
use std::fmt;

/// What a boundary sub-pin is wired to inside its graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlugBinding {
    Unit {
        #[serde(rename = "unitId")]
        unit_id: String,
        #[serde(rename = "pinId")]
        pin_id: String,
    },
    Merge {
        #[serde(rename = "mergeId")]
        merge_id: String,
    },
}

impl PlugBinding {
    pub fn unit(unit_id: impl Into<String>, pin_id: impl Into<String>) -> Self {
        PlugBinding::Unit {
            unit_id: unit_id.into(),
            pin_id: pin_id.into(),
        }
    }

    pub fn merge(merge_id: impl Into<String>) -> Self {
        PlugBinding::Merge {
            merge_id: merge_id.into(),
        }
    }

    pub fn unit_id(&self) -> Option<&str> {
        match self {
            PlugBinding::Unit { unit_id, .. } => Some(unit_id),
            PlugBinding::Merge { .. } => None,
        }
    }

    pub fn merge_id(&self) -> Option<&str> {
        match self {
            PlugBinding::Merge { merge_id } => Some(merge_id),
            PlugBinding::Unit { .. } => None,
        }
    }

    /// True when this binding targets exactly `unit_id.pin_id`.
    pub fn is_unit_pin(&self, unit_id: &str, pin_id: &str) -> bool {
        matches!(self, PlugBinding::Unit { unit_id: u, pin_id: p } if u == unit_id && p == pin_id)
    }

    pub fn is_merge(&self, merge_id: &str) -> bool {
        matches!(self, PlugBinding::Merge { merge_id: m } if m == merge_id)
    }
}

impl fmt::Display for PlugBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlugBinding::Unit { unit_id, pin_id } => write!(f, "{}.{}", unit_id, pin_id),
            PlugBinding::Merge { merge_id } => write!(f, "merge:{}", merge_id),
        }
    }
}

/// One slot of a boundary pin: bound to a unit pin or merge, or left unbound.
///
/// On the wire an unbound slot is the empty object `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubPinSpec {
    Bound(PlugBinding),
    Unbound {},
}

impl SubPinSpec {
    pub fn unbound() -> Self {
        SubPinSpec::Unbound {}
    }

    pub fn binding(&self) -> Option<&PlugBinding> {
        match self {
            SubPinSpec::Bound(binding) => Some(binding),
            SubPinSpec::Unbound {} => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }

    pub fn is_unit_pin(&self, unit_id: &str, pin_id: &str) -> bool {
        self.binding()
            .is_some_and(|binding| binding.is_unit_pin(unit_id, pin_id))
    }

    pub fn is_merge(&self, merge_id: &str) -> bool {
        self.binding().is_some_and(|binding| binding.is_merge(merge_id))
    }
}

impl Default for SubPinSpec {
    fn default() -> Self {
        SubPinSpec::unbound()
    }
}

impl From<PlugBinding> for SubPinSpec {
    fn from(binding: PlugBinding) -> Self {
        SubPinSpec::Bound(binding)
    }
}

impl From<Option<PlugBinding>> for SubPinSpec {
    fn from(binding: Option<PlugBinding>) -> Self {
        binding.map_or_else(SubPinSpec::unbound, SubPinSpec::Bound)
    }
}

impl fmt::Display for SubPinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubPinSpec::Bound(binding) => binding.fmt(f),
            SubPinSpec::Unbound {} => f.write_str("(unbound)"),
        }
    }
}

/// Address of one sub-pin on a boundary pin whose direction is known from context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OuterPlug {
    pub pin_id: String,
    pub sub_pin_id: String,
}

impl OuterPlug {
    pub fn new(pin_id: impl Into<String>, sub_pin_id: impl Into<String>) -> Self {
        Self {
            pin_id: pin_id.into(),
            sub_pin_id: sub_pin_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_pin_wire_shapes() {
        let unit: SubPinSpec = serde_json::from_str(r#"{"unitId":"a","pinId":"x"}"#).unwrap();
        assert_eq!(unit, PlugBinding::unit("a", "x").into());

        let merge: SubPinSpec = serde_json::from_str(r#"{"mergeId":"m"}"#).unwrap();
        assert!(merge.is_merge("m"));

        let empty: SubPinSpec = serde_json::from_str("{}").unwrap();
        assert!(!empty.is_bound());
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }
}

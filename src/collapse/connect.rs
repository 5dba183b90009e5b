use crate::graph::Graph;
use crate::spec::{IoOf, MergesSpec, OuterPlug};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Host wiring around the graph unit being inlined.
///
/// `plugs` holds the host boundary sub-pins bound directly to the unit,
/// keyed by the unit's pin id. `merges` holds every host merge the unit
/// takes part in. Only read when inlining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOpt {
    #[serde(default)]
    pub plugs: IoOf<BTreeMap<String, OuterPlug>>,
    #[serde(default)]
    pub merges: MergesSpec,
}

impl ConnectOpt {
    /// Snapshots the host wiring of `unit_id`.
    pub fn for_unit(host: &Graph, unit_id: &str) -> Self {
        Self {
            plugs: host.unit_plugs(unit_id),
            merges: host.unit_merges(unit_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plugs.input.is_empty() && self.plugs.output.is_empty() && self.merges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ExposedPinSpec, Io, MergeSpec, PlugBinding, Unit};

    #[test]
    fn snapshots_only_wiring_of_the_unit() {
        let host = Graph::new()
            .with_unit("b", Unit::graph("sub", Graph::new()))
            .with_unit("x", Unit::new("id"))
            .with_merge(
                "m",
                MergeSpec::new()
                    .with_pin("x", Io::Output, "o")
                    .with_pin("b", Io::Input, "i"),
            )
            .with_merge("n", MergeSpec::new().with_pin("x", Io::Input, "i"))
            .with_exposed(
                Io::Output,
                "out",
                ExposedPinSpec::new().with_plug("0", PlugBinding::unit("b", "r")),
            );

        let connect = ConnectOpt::for_unit(&host, "b");
        assert_eq!(connect.merges.len(), 1);
        assert!(connect.merges.contains_key("m"));
        assert_eq!(
            connect.plugs.output.get("r"),
            Some(&OuterPlug::new("out", "0"))
        );
        assert!(ConnectOpt::for_unit(&host, "z").is_empty());
    }
}

use super::Graph;
use crate::error::GraphError;
use crate::spec::{Io, IoOf, MergesSpec, OuterPlug, PlugBinding};
use std::collections::BTreeMap;

impl Graph {
    /// Id of the merge that `unit_id.pin_id` takes part in, if any.
    pub fn find_pin_merge(&self, unit_id: &str, io: Io, pin_id: &str) -> Option<&str> {
        self.merges
            .iter()
            .find(|(_, merge)| merge.contains(unit_id, io, pin_id))
            .map(|(merge_id, _)| merge_id.as_str())
    }

    /// The first boundary sub-pin of direction `io` bound to merge `merge_id`.
    pub fn find_merge_plug(&self, io: Io, merge_id: &str) -> Option<OuterPlug> {
        self.exposed(io).iter().find_map(|(pin_id, pin)| {
            pin.plug
                .iter()
                .find(|(_, sub_pin)| sub_pin.is_merge(merge_id))
                .map(|(sub_pin_id, _)| OuterPlug::new(pin_id, sub_pin_id))
        })
    }

    /// Boundary sub-pins bound directly to a pin of `unit_id`, keyed by that
    /// unit pin's id.
    pub fn unit_plugs(&self, unit_id: &str) -> IoOf<BTreeMap<String, OuterPlug>> {
        let mut plugs = IoOf::<BTreeMap<String, OuterPlug>>::default();
        for (io, pins) in self.exposed.iter() {
            for (pin_id, pin) in pins {
                for (sub_pin_id, sub_pin) in &pin.plug {
                    let Some(PlugBinding::Unit {
                        unit_id: bound_unit,
                        pin_id: bound_pin,
                    }) = sub_pin.binding()
                    else {
                        continue;
                    };
                    if bound_unit == unit_id {
                        plugs[io].insert(bound_pin.clone(), OuterPlug::new(pin_id, sub_pin_id));
                    }
                }
            }
        }
        plugs
    }

    /// Every merge that `unit_id` takes part in.
    pub fn unit_merges(&self, unit_id: &str) -> MergesSpec {
        self.merges
            .iter()
            .filter(|(_, merge)| merge.has_unit(unit_id))
            .map(|(merge_id, merge)| (merge_id.clone(), merge.clone()))
            .collect()
    }

    /// Pins fused with `unit_id.pin_id` through any merge, excluding itself.
    pub fn peers(&self, unit_id: &str, io: Io, pin_id: &str) -> Vec<(String, Io, String)> {
        self.merges
            .values()
            .filter(|merge| merge.contains(unit_id, io, pin_id))
            .flat_map(|merge| merge.pins())
            .filter(|&(u, t, p)| !(u == unit_id && t == io && p == pin_id))
            .map(|(u, t, p)| (u.to_string(), t, p.to_string()))
            .collect()
    }

    /// Checks referential integrity, recursing into nested graphs.
    ///
    /// Every merge member must be a unit of this graph and every bound
    /// plug must name a unit or merge of this graph.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (merge_id, merge) in &self.merges {
            if let Some(unit_id) = merge.unit_ids().find(|id| !self.units.contains_key(*id)) {
                return Err(GraphError::DanglingMergeUnit {
                    merge_id: merge_id.clone(),
                    unit_id: unit_id.to_string(),
                });
            }
        }

        for (io, pins) in self.exposed.iter() {
            for (pin_id, pin) in pins {
                for (sub_pin_id, sub_pin) in &pin.plug {
                    let missing = match sub_pin.binding() {
                        Some(PlugBinding::Unit { unit_id, .. }) => {
                            !self.units.contains_key(unit_id)
                        }
                        Some(PlugBinding::Merge { merge_id }) => !self.merges.contains_key(merge_id),
                        None => false,
                    };
                    if missing {
                        return Err(GraphError::DanglingPlug {
                            io,
                            pin_id: pin_id.clone(),
                            sub_pin_id: sub_pin_id.clone(),
                            target: sub_pin.to_string(),
                        });
                    }
                }
            }
        }

        for unit in self.units.values() {
            if let Some(graph) = &unit.graph {
                graph.validate()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ExposedPinSpec, MergeSpec, Pin, Unit};

    fn fan() -> Graph {
        Graph::new()
            .with_unit("a", Unit::new("id").with_output("o", Pin::new("any")))
            .with_unit("b", Unit::new("id").with_output("o", Pin::new("any")))
            .with_unit("c", Unit::new("id").with_input("i", Pin::new("any")))
            .with_merge(
                "m",
                MergeSpec::new()
                    .with_pin("a", Io::Output, "o")
                    .with_pin("b", Io::Output, "o")
                    .with_pin("c", Io::Input, "i"),
            )
    }

    #[test]
    fn peers_exclude_the_pin_itself() {
        let graph = fan();
        let peers = graph.peers("c", Io::Input, "i");
        assert_eq!(peers.len(), 2);
        assert!(peers.contains(&("a".to_string(), Io::Output, "o".to_string())));
        assert_eq!(graph.find_pin_merge("b", Io::Output, "o"), Some("m"));
        assert_eq!(graph.find_pin_merge("b", Io::Input, "o"), None);
    }

    #[test]
    fn validate_reports_dangling_references() {
        assert_eq!(fan().validate(), Ok(()));

        let mut graph = fan();
        graph.units.remove("b");
        assert!(matches!(
            graph.validate(),
            Err(GraphError::DanglingMergeUnit { unit_id, .. }) if unit_id == "b"
        ));

        let graph = fan().with_exposed(
            Io::Output,
            "out",
            ExposedPinSpec::new().with_plug("0", PlugBinding::merge("gone")),
        );
        assert!(matches!(
            graph.validate(),
            Err(GraphError::DanglingPlug { pin_id, .. }) if pin_id == "out"
        ));
    }

    #[test]
    fn unit_plugs_are_keyed_by_unit_pin() {
        let graph = fan().with_exposed(
            Io::Input,
            "x",
            ExposedPinSpec::new().with_plug("0", PlugBinding::unit("c", "i")),
        );
        let plugs = graph.unit_plugs("c");
        assert_eq!(plugs.input.get("i"), Some(&OuterPlug::new("x", "0")));
        assert!(plugs.output.is_empty());
        assert_eq!(graph.unit_merges("c").len(), 1);
        assert!(graph.unit_merges("z").is_empty());
    }

    #[test]
    fn find_merge_plug_by_direction() {
        let graph = fan().with_exposed(
            Io::Output,
            "out",
            ExposedPinSpec::new()
                .with_plug("0", PlugBinding::unit("c", "i"))
                .with_plug("1", PlugBinding::merge("m")),
        );

        assert_eq!(
            graph.find_merge_plug(Io::Output, "m"),
            Some(OuterPlug::new("out", "1"))
        );
        assert_eq!(graph.find_merge_plug(Io::Input, "m"), None);
    }
}

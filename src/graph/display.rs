use super::Graph;
use crate::spec::{Io, MergeSpec};
use itertools::Itertools;
use std::fmt;

/// Renders a merge as `a.o + b.o -> c.i`, outputs on the left.
pub struct DisplayMerge<'a>(pub &'a MergeSpec);

impl fmt::Display for DisplayMerge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |io: Io| {
            self.0
                .pins()
                .filter(|&(_, t, _)| t == io)
                .map(|(unit_id, _, pin_id)| format!("{}.{}", unit_id, pin_id))
                .join(" + ")
        };
        write!(f, "{} -> {}", side(Io::Output), side(Io::Input))
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "units: {}", self.units.keys().join(", "))?;
        for (merge_id, merge) in &self.merges {
            writeln!(f, "merge {}: {}", merge_id, DisplayMerge(merge))?;
        }
        for (io, pins) in self.exposed.iter() {
            for (pin_id, pin) in pins {
                let plugs = pin
                    .plug
                    .iter()
                    .map(|(sub_pin_id, sub_pin)| format!("{}={}", sub_pin_id, sub_pin))
                    .join(", ");
                writeln!(f, "{} {}: [{}]", io, pin_id, plugs)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ExposedPinSpec, PlugBinding, Unit};

    #[test]
    fn renders_units_merges_and_boundary() {
        let graph = Graph::new()
            .with_unit("a", Unit::new("id"))
            .with_unit("c", Unit::new("id"))
            .with_merge(
                "m",
                MergeSpec::new()
                    .with_pin("a", Io::Output, "o")
                    .with_pin("c", Io::Input, "i"),
            )
            .with_exposed(
                Io::Input,
                "x",
                ExposedPinSpec::new().with_plug("0", PlugBinding::unit("c", "i")),
            );

        let text = graph.to_string();
        assert!(text.contains("units: a, c"));
        assert!(text.contains("merge m: a.o -> c.i"));
        assert!(text.contains("input x: [0=c.i]"));
    }
}

//! Common fixtures for building host graphs and move plans.
use graft::prelude::*;

/// An atomic unit with the given input and output pins, all of type `any`.
#[allow(dead_code)]
pub fn unit(inputs: &[&str], outputs: &[&str]) -> Unit {
    let unit = inputs
        .iter()
        .fold(Unit::new("id"), |unit, pin_id| unit.with_input(pin_id, Pin::new("any")));
    outputs
        .iter()
        .fold(unit, |unit, pin_id| unit.with_output(pin_id, Pin::new("any")))
}

/// `x.o -> y.i` through merge `m`, next to an empty graph unit `box`.
#[allow(dead_code)]
pub fn chain_host() -> Graph {
    Graph::new()
        .with_unit("x", unit(&[], &["o"]))
        .with_unit("y", unit(&["i"], &[]))
        .with_unit("box", Unit::graph("box", Graph::new()))
        .with_merge(
            "m",
            MergeSpec::new()
                .with_pin("x", Io::Output, "o")
                .with_pin("y", Io::Input, "i"),
        )
}

/// Plan moving `y` of [`chain_host`] into `box`, surfacing `y.i` as `i`.
#[allow(dead_code)]
pub fn encapsulate_y() -> CollapseMap {
    CollapseMap::new(GraphSelection::units(["y"])).with_unit_pin(
        "y",
        Io::Input,
        "i",
        NextUnitPin::exposed("i", "0").merged("m", None),
    )
}

/// Two sources fused into one sink: `m = {a.o, b.o, c.i}`, plus graph unit `g`.
#[allow(dead_code)]
pub fn fan_host() -> Graph {
    Graph::new()
        .with_unit("a", unit(&[], &["o"]))
        .with_unit("b", unit(&[], &["o"]))
        .with_unit("c", unit(&["i"], &[]))
        .with_unit("g", Unit::graph("g", Graph::new()))
        .with_merge(
            "m",
            MergeSpec::new()
                .with_pin("a", Io::Output, "o")
                .with_pin("b", Io::Output, "o")
                .with_pin("c", Io::Input, "i"),
        )
}

/// A host whose graph unit `box` wraps `y`, fed from `x` through `m`.
#[allow(dead_code)]
pub fn boxed_host() -> Graph {
    let nested = Graph::new().with_unit("y", unit(&["i"], &[])).with_exposed(
        Io::Input,
        "i",
        ExposedPinSpec::new().with_plug("0", PlugBinding::unit("y", "i")),
    );
    Graph::new()
        .with_unit("x", unit(&[], &["o"]))
        .with_unit("box", Unit::graph("box", nested))
        .with_merge(
            "m",
            MergeSpec::new()
                .with_pin("x", Io::Output, "o")
                .with_pin("box", Io::Input, "i"),
        )
}

/// `x.o` fanned out to sinks `s0..` through merge `m`, next to an empty `box`.
#[allow(dead_code)]
pub fn fan_out_host(sinks: usize) -> Graph {
    let mut merge = MergeSpec::new().with_pin("x", Io::Output, "o");
    let mut graph = Graph::new()
        .with_unit("x", unit(&[], &["o"]))
        .with_unit("box", Unit::graph("box", Graph::new()));
    for index in 0..sinks {
        let unit_id = format!("s{index}");
        merge.insert(&unit_id, Io::Input, "i");
        graph = graph.with_unit(&unit_id, unit(&["i"], &[]));
    }
    graph.with_merge("m", merge)
}

/// Plan moving every sink of [`fan_out_host`] and `m` into `box`; `x.o`
/// then reaches `m` through `mx` and the boundary pin `in`.
#[allow(dead_code)]
pub fn fan_out_map(sinks: usize) -> CollapseMap {
    CollapseMap::new(GraphSelection {
        unit: (0..sinks).map(|index| format!("s{index}")).collect(),
        merge: vec!["m".to_string()],
        ..GraphSelection::default()
    })
    .with_merge_pin(
        "m",
        Io::Input,
        NextMergePin {
            merge_id: Some("mx".to_string()),
            pin_id: Some("in".to_string()),
            sub_pin_spec: Some(PlugBinding::merge("m").into()),
            opposite_merge: None,
        },
    )
}

/// Sources `a0..` fused into `c.i` through merge `m`, next to an empty `box`.
#[allow(dead_code)]
pub fn fan_in_host(sources: usize) -> Graph {
    let mut merge = MergeSpec::new().with_pin("c", Io::Input, "i");
    let mut graph = Graph::new()
        .with_unit("c", unit(&["i"], &[]))
        .with_unit("box", Unit::graph("box", Graph::new()));
    for index in 0..sources {
        let unit_id = format!("a{index}");
        merge.insert(&unit_id, Io::Output, "o");
        graph = graph.with_unit(&unit_id, unit(&[], &["o"]));
    }
    graph.with_merge("m", merge)
}

/// Plan moving the first `moved` sources of [`fan_in_host`] into `box`,
/// each surfacing as boundary pin `o<n>` that stays in `m`.
#[allow(dead_code)]
pub fn fan_in_map(moved: usize) -> CollapseMap {
    (0..moved).fold(
        CollapseMap::new(GraphSelection::units((0..moved).map(|index| format!("a{index}")))),
        |map, index| {
            map.with_unit_pin(
                &format!("a{index}"),
                Io::Output,
                "o",
                NextUnitPin::exposed(format!("o{index}"), "0").merged("m", None),
            )
        },
    )
}

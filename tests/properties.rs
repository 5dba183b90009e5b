//! Property tests over generated hosts.
mod common;
use common::*;
use graft::prelude::*;
use proptest::prelude::*;

/// A chain `u0.o -> u1.i -> ...` where each link is present or not.
fn chain(links: &[bool]) -> Graph {
    let mut graph = Graph::new();
    for index in 0..=links.len() {
        graph = graph.with_unit(&format!("u{index}"), unit(&["i"], &["o"]));
    }
    for (index, linked) in links.iter().enumerate() {
        if *linked {
            graph = graph.with_merge(
                &format!("m{index}"),
                MergeSpec::new()
                    .with_pin(&format!("u{index}"), Io::Output, "o")
                    .with_pin(&format!("u{}", index + 1), Io::Input, "i"),
            );
        }
    }
    graph
}

/// Merge pins of `host`, with each pin of graph unit `graph_id` replaced by
/// the pins it forwards to inside.
fn resolved_merge_pins(host: &Graph, graph_id: &str) -> usize {
    let inner = host.unit_graph(graph_id).unwrap();
    host.get_merges_spec()
        .values()
        .flat_map(|merge| merge.pins())
        .map(|(unit_id, io, pin_id)| -> usize {
            if unit_id != graph_id {
                return 1;
            }
            inner
                .get_exposed_pin_spec(io, pin_id)
                .unwrap()
                .plug
                .values()
                .map(|sub_pin| match sub_pin.binding() {
                    Some(PlugBinding::Unit { .. }) => 1,
                    Some(PlugBinding::Merge { merge_id }) => {
                        inner.get_merge_spec(merge_id).unwrap().pin_count()
                    }
                    None => 0,
                })
                .sum::<usize>()
        })
        .sum()
}

fn merge_pins(graph: &Graph) -> usize {
    graph.get_merges_spec().values().map(MergeSpec::pin_count).sum()
}

proptest! {
    #[test]
    fn empty_selection_changes_nothing(
        links in prop::collection::vec(any::<bool>(), 0..6),
        direction in prop_oneof![Just(Direction::Encapsulate), Just(Direction::Inline)],
    ) {
        let original = chain(&links);
        let mut source = original.clone();
        let mut target = Graph::new();

        let report = SubgraphMove::builder("box", CollapseMap::new(GraphSelection::default()))
            .direction(direction)
            .build()
            .apply(&mut Scopes::split(&mut source, &mut target))
            .unwrap();

        prop_assert!(report.is_empty());
        prop_assert_eq!(source, original);
        prop_assert_eq!(target, Graph::new());
    }

    #[test]
    fn fan_out_survives_encapsulate_and_explode(sinks in 2usize..6) {
        let original = fan_out_host(sinks);

        let mut host = original.clone();
        let report = host.encapsulate_into("box", fan_out_map(sinks)).unwrap();
        prop_assert_eq!(report.units, sinks);
        prop_assert!(host.has_merge_pin("mx", "box", Io::Input, "in"));
        prop_assert_eq!(host.unit_graph("box").unwrap().get_merge_spec("m").unwrap().pin_count(), sinks);

        host.explode_unit("box").unwrap();
        let mut expected = original;
        expected.remove_unit("box").unwrap();
        prop_assert_eq!(host, expected);
    }

    #[test]
    fn fan_out_keeps_every_merge_pin(sinks in 2usize..6) {
        let mut host = fan_out_host(sinks);
        let before = merge_pins(&host);

        host.encapsulate_into("box", fan_out_map(sinks)).unwrap();

        prop_assert_eq!(resolved_merge_pins(&host, "box"), before);
    }

    #[test]
    fn fan_in_keeps_every_merge_pin((sources, moved) in (2usize..6).prop_flat_map(|n| (Just(n), 1..=n))) {
        let mut host = fan_in_host(sources);
        let before = merge_pins(&host);

        host.encapsulate_into("box", fan_in_map(moved)).unwrap();

        prop_assert_eq!(host.get_merge_spec("m").unwrap().pin_count(), before);
        prop_assert_eq!(resolved_merge_pins(&host, "box"), before);
    }
}

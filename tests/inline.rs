//! Dissolving graph units back into their host.
mod common;
use common::*;
use graft::prelude::*;

fn without_box(mut graph: Graph) -> Graph {
    graph.remove_unit("box").expect("fixture has box");
    graph
}

#[cfg(test)]
mod inline_tests {
    use super::*;

    #[test]
    fn test_explode_splices_nested_units_into_host_merge() {
        let mut host = boxed_host();
        let report = host.explode_unit("box").unwrap();

        assert_eq!(report.direction, Direction::Inline);
        assert_eq!(report.units, 1);
        assert!(!host.has_unit("box"));
        assert!(host.has_unit("y"));
        assert_eq!(
            host.get_merge_spec("m").unwrap(),
            &MergeSpec::new()
                .with_pin("x", Io::Output, "o")
                .with_pin("y", Io::Input, "i")
        );
        host.validate().unwrap();
    }

    #[test]
    fn test_encapsulate_then_explode_restores_the_host() {
        let mut host = chain_host();
        host.encapsulate_into("box", encapsulate_y()).unwrap();
        host.explode_unit("box").unwrap();

        assert_eq!(host, without_box(chain_host()));
    }

    #[test]
    fn test_merge_round_trip() {
        let original = Graph::new()
            .with_unit("x", unit(&[], &["o"]))
            .with_unit("y", unit(&["i"], &[]))
            .with_unit("z", unit(&["i"], &[]))
            .with_unit("box", Unit::graph("box", Graph::new()))
            .with_merge(
                "m",
                MergeSpec::new()
                    .with_pin("x", Io::Output, "o")
                    .with_pin("y", Io::Input, "i")
                    .with_pin("z", Io::Input, "i"),
            );
        let map = CollapseMap::new(GraphSelection {
            unit: vec!["y".to_string(), "z".to_string()],
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
        );

        let mut host = original.clone();
        host.encapsulate_into("box", map).unwrap();
        host.explode_unit("box").unwrap();

        assert_eq!(host, without_box(original));
    }

    #[test]
    fn test_inner_merge_fuses_with_host_merge() {
        let nested = Graph::new()
            .with_unit("y", unit(&["i"], &[]))
            .with_unit("z", unit(&["i"], &[]))
            .with_merge(
                "n",
                MergeSpec::new()
                    .with_pin("y", Io::Input, "i")
                    .with_pin("z", Io::Input, "i"),
            )
            .with_exposed(
                Io::Input,
                "p",
                ExposedPinSpec::new().with_plug("0", PlugBinding::merge("n")),
            );
        let mut host = Graph::new()
            .with_unit("x", unit(&[], &["o"]))
            .with_unit("box", Unit::graph("box", nested))
            .with_merge(
                "m",
                MergeSpec::new()
                    .with_pin("x", Io::Output, "o")
                    .with_pin("box", Io::Input, "p"),
            );

        let report = host.explode_unit("box").unwrap();

        assert_eq!(report.merges, 1);
        assert!(!host.has_merge("m"));
        assert_eq!(
            host.get_merge_spec("n").unwrap(),
            &MergeSpec::new()
                .with_pin("x", Io::Output, "o")
                .with_pin("y", Io::Input, "i")
                .with_pin("z", Io::Input, "i")
        );
        host.validate().unwrap();
    }

    #[test]
    fn test_clashing_ids_are_renamed() {
        let nested = Graph::new().with_unit("x", unit(&["i"], &[])).with_exposed(
            Io::Input,
            "i",
            ExposedPinSpec::new().with_plug("0", PlugBinding::unit("x", "i")),
        );
        let mut host = Graph::new()
            .with_unit("x", unit(&[], &["o"]))
            .with_unit("box", Unit::graph("box", nested))
            .with_merge(
                "m",
                MergeSpec::new()
                    .with_pin("x", Io::Output, "o")
                    .with_pin("box", Io::Input, "i"),
            );

        host.explode_unit("box").unwrap();

        assert!(host.has_unit("x"));
        assert!(host.has_unit("x_1"));
        assert_eq!(
            host.get_merge_spec("m").unwrap(),
            &MergeSpec::new()
                .with_pin("x", Io::Output, "o")
                .with_pin("x_1", Io::Input, "i")
        );
    }

    #[test]
    fn test_host_plug_is_rebound_to_inner_unit() {
        let nested = Graph::new().with_unit("y", unit(&["i"], &[])).with_exposed(
            Io::Input,
            "i",
            ExposedPinSpec::new().with_plug("0", PlugBinding::unit("y", "i")),
        );
        let mut host = Graph::new()
            .with_unit("box", Unit::graph("box", nested))
            .with_exposed(
                Io::Input,
                "in",
                ExposedPinSpec::new().with_plug("0", PlugBinding::unit("box", "i")),
            );

        host.explode_unit("box").unwrap();

        assert_eq!(
            host.get_sub_pin_spec(Io::Input, "in", "0").unwrap(),
            &SubPinSpec::from(PlugBinding::unit("y", "i"))
        );
        host.validate().unwrap();
    }

    #[test]
    fn test_fanned_out_boundary_pin_survives_in_host() {
        let nested = Graph::new()
            .with_unit("y", unit(&["i"], &[]))
            .with_unit("z", unit(&["i"], &[]))
            .with_exposed(
                Io::Input,
                "i",
                ExposedPinSpec::new()
                    .with_plug("0", PlugBinding::unit("y", "i"))
                    .with_plug("1", PlugBinding::unit("z", "i")),
            );
        let mut host = Graph::new().with_unit("box", Unit::graph("box", nested));

        let report = host.explode_unit("box").unwrap();

        assert_eq!(report.plugs, 2);
        let pin = host.get_exposed_pin_spec(Io::Input, "i").unwrap();
        assert_eq!(pin.plug_count(), 2);
        assert!(pin.plug["0"].is_unit_pin("y", "i"));
        assert!(pin.plug["1"].is_unit_pin("z", "i"));
        host.validate().unwrap();
    }

    #[test]
    fn test_inlining_a_constant_pin_is_unsupported() {
        let nested = Graph::new()
            .with_unit("y", Unit::new("id").with_input("i", Pin::new("any").constant()))
            .with_exposed(
                Io::Input,
                "i",
                ExposedPinSpec::new().with_plug("0", PlugBinding::unit("y", "i")),
            );
        let mut host = Graph::new()
            .with_unit("x", unit(&[], &["o"]))
            .with_unit("box", Unit::graph("box", nested))
            .with_merge(
                "m",
                MergeSpec::new()
                    .with_pin("x", Io::Output, "o")
                    .with_pin("box", Io::Input, "i"),
            );

        let err = host.explode_unit("box").unwrap_err();
        assert!(matches!(err, MoveError::Unsupported(_)));
        assert!(host.has_unit("box"));
    }

    #[test]
    fn test_explode_rejects_atomic_units() {
        let mut host = chain_host();
        assert_eq!(
            host.explode_unit("x").unwrap_err(),
            MoveError::Graph(GraphError::NotAGraph("x".to_string()))
        );
    }

    #[test]
    fn test_hand_written_inline_between_split_scopes() {
        let mut nested = Graph::new().with_unit("y", unit(&["i"], &[]));
        let mut host = Graph::new();
        let map = CollapseMap::new(GraphSelection::units(["y"])).rename_unit("y", "y2");

        let report = inline(
            &mut Scopes::split(&mut nested, &mut host),
            "box",
            &map,
            &ConnectOpt::default(),
        )
        .unwrap();

        assert_eq!(report.units, 1);
        assert!(!nested.has_unit("y"));
        assert!(host.has_unit("y2"));
    }

    #[test]
    fn test_shared_scope_moves_within_one_graph() {
        let mut graph = chain_host().with_merge("e", MergeSpec::new());
        let map = CollapseMap::new(GraphSelection {
            merge: vec!["e".to_string()],
            ..GraphSelection::default()
        })
        .rename_merge("e", "e2");

        let report = SubgraphMove::builder("box", map.clone())
            .direction(Direction::Encapsulate)
            .prune_dangling_merges(false)
            .build()
            .apply(&mut Scopes::shared(&mut graph))
            .unwrap();
        assert_eq!(report.merges, 1);
        assert!(report.pruned_merges.is_empty());
        assert!(!graph.has_merge("e"));
        assert!(graph.has_merge("e2"));

        let mut graph = chain_host().with_merge("e", MergeSpec::new());
        let report = encapsulate(&mut Scopes::shared(&mut graph), "box", &map).unwrap();
        assert_eq!(report.pruned_merges, vec!["e2".to_string()]);
        assert!(!graph.has_merge("e2"));
    }
}

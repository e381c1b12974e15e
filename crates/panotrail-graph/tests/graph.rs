use std::collections::BTreeSet;

use panotrail_geometry::Point3;
use panotrail_graph::{PanoramaNode, Result, ViewpointGraph};
use proptest::prelude::*;

fn build(positions: &[(f64, f64)], adjacency: &[Vec<usize>]) -> Result<ViewpointGraph> {
    let nodes = positions
        .iter()
        .enumerate()
        .map(|(slot, (x, z))| {
            // Indices past the end produce dangling ids on purpose.
            let neighbors = adjacency[slot].iter().map(|n| format!("n{n}"));
            PanoramaNode::at(format!("n{slot}"), Point3::new(*x, 1.5, *z))
                .with_navigable(neighbors.clone())
                .with_visible(neighbors.rev())
        })
        .collect();
    ViewpointGraph::new(nodes)
}

fn node_set(graph: &ViewpointGraph) -> BTreeSet<String> {
    graph.ids().map(str::to_string).collect()
}

fn assert_no_dangling(graph: &ViewpointGraph) {
    for node in graph.nodes() {
        for id in node.navigable().iter().chain(node.visible()) {
            assert!(graph.contains(id), "{} references missing {}", node.id(), id);
        }
    }
}

fn graph_strategy() -> impl Strategy<Value = (Vec<(f64, f64)>, Vec<Vec<usize>>, Vec<u8>)> {
    (1usize..10).prop_flat_map(|n| {
        (
            prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), n),
            prop::collection::vec(prop::collection::vec(0usize..n + 2, 0..5), n),
            prop::collection::vec(0u8..3, n),
        )
    })
}

proptest! {
    #[test]
    fn prune_and_keep_only_commute((positions, adjacency, roles) in graph_strategy()) {
        let prune: Vec<String> = roles.iter().enumerate()
            .filter(|(_, role)| **role == 0).map(|(i, _)| format!("n{i}")).collect();
        let keep: Vec<String> = roles.iter().enumerate()
            .filter(|(_, role)| **role == 1).map(|(i, _)| format!("n{i}")).collect();

        let mut first = build(&positions, &adjacency).unwrap();
        assert_no_dangling(&first);
        first.prune_nodes(&prune).unwrap();
        assert_no_dangling(&first);
        first.keep_only(&keep).unwrap();
        assert_no_dangling(&first);

        let mut second = build(&positions, &adjacency).unwrap();
        second.keep_only(&keep).unwrap();
        assert_no_dangling(&second);
        second.prune_nodes(&prune).unwrap();
        assert_no_dangling(&second);

        prop_assert_eq!(node_set(&first), node_set(&second));
    }

    #[test]
    fn closest_node_of_own_position_is_self(positions in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 1..12)) {
        let adjacency = vec![Vec::new(); positions.len()];
        let graph = build(&positions, &adjacency).unwrap();
        for node in graph.nodes() {
            let closest = graph.closest_node(node.position()).unwrap();
            // Coincident nodes resolve to the first stored one.
            let first_at_position = graph.nodes()
                .find(|other| other.position() == node.position())
                .unwrap();
            prop_assert_eq!(closest, first_at_position.id());
        }
    }
}

#[test]
fn visibility_follows_closest_node() -> Result<()> {
    let graph = ViewpointGraph::new(vec![
        PanoramaNode::at("a", Point3::new(0.0, 0.0, 0.0)).with_navigable(["b"]),
        PanoramaNode::at("b", Point3::new(10.0, 0.0, 0.0)).with_navigable(["a", "c"]),
        PanoramaNode::at("c", Point3::new(20.0, 0.0, 0.0))
            .with_navigable(["b"])
            .with_visible(["a", "b"]),
    ])?;
    assert!(graph.is_visible_from("a", Point3::new(1.0, 0.0, 0.0))?);
    assert!(graph.is_visible_from("a", Point3::new(9.0, 0.0, 0.0))?);
    assert!(!graph.is_visible_from("a", Point3::new(19.0, 0.0, 0.0))?);
    assert!(graph.is_visible_from("c", Point3::new(1.0, 0.0, 0.0))?);
    assert!(graph.is_visible_from("zz", Point3::new(0.0, 0.0, 0.0)).is_err());
    Ok(())
}

#[test]
fn neighbor_lists_are_copies() -> Result<()> {
    let graph = ViewpointGraph::new(vec![
        PanoramaNode::at("a", Point3::new(0.0, 0.0, 0.0)).with_navigable(["b"]),
        PanoramaNode::at("b", Point3::new(1.0, 0.0, 0.0)),
    ])?;
    let mut neighbors = graph.navigable_neighbors("a")?;
    neighbors.push("b".to_string());
    assert_eq!(graph.navigable_neighbors("a")?, vec!["b".to_string()]);
    Ok(())
}

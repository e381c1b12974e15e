use std::collections::{HashMap, HashSet};

use panotrail_base::{Error, NodeId, Result};
use panotrail_geometry::Point3;
use panotrail_geometry::cgmath::MetricSpace;
use tracing::{debug, warn};

use crate::PanoramaNode;

#[derive(Clone, Debug, Default)]
pub struct ViewpointGraph {
    nodes: Vec<PanoramaNode>,
    index: HashMap<NodeId, usize>,
    current: Option<NodeId>,
}

impl ViewpointGraph {
    pub fn new(nodes: Vec<PanoramaNode>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (slot, node) in nodes.iter().enumerate() {
            if index.insert(node.id().to_string(), slot).is_some() {
                return Err(Error::InvalidParameter(format!(
                    "duplicate node id {}",
                    node.id()
                )));
            }
        }
        let mut graph = Self {
            nodes,
            index,
            current: None,
        };
        for node in &mut graph.nodes {
            let index = &graph.index;
            let dropped = node.retain_neighbors(|id| index.contains_key(id));
            if dropped > 0 {
                warn!(node = node.id(), dropped, "stripped dangling adjacency");
            }
        }
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PanoramaNode> {
        self.nodes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(PanoramaNode::id)
    }

    pub fn get_node(&self, id: &str) -> Result<&PanoramaNode> {
        self.index
            .get(id)
            .map(|&slot| &self.nodes[slot])
            .ok_or_else(|| Error::not_found(id))
    }

    pub fn navigable_neighbors(&self, id: &str) -> Result<Vec<NodeId>> {
        Ok(self.get_node(id)?.navigable().to_vec())
    }

    pub fn visible_neighbors(&self, id: &str) -> Result<Vec<NodeId>> {
        Ok(self.get_node(id)?.visible().to_vec())
    }

    /// Node whose position is nearest to `point`. Ties go to the node stored
    /// first, so results are stable across runs over the same loader output.
    pub fn closest_node(&self, point: Point3) -> Option<&str> {
        let mut best: Option<(&PanoramaNode, f64)> = None;
        for node in &self.nodes {
            let distance = node.position().distance(point);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((node, distance)),
            }
        }
        best.map(|(node, _)| node.id())
    }

    pub fn is_visible_from(&self, id: &str, point: Point3) -> Result<bool> {
        let node = self.get_node(id)?;
        let Some(closest) = self.closest_node(point) else {
            return Ok(false);
        };
        Ok(closest == id || node.visible().iter().any(|visible| visible == closest))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn set_current(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::not_found(id));
        }
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Removes `ids` and every adjacency entry that names them. Unknown ids
    /// are ignored. Fails without touching the graph if the current node is
    /// among `ids`.
    pub fn prune_nodes<I, S>(&mut self, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed: HashSet<String> = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| self.contains(id))
            .collect();
        if doomed.is_empty() {
            return Ok(0);
        }
        if let Some(current) = self.current.as_deref() {
            if doomed.contains(current) {
                return Err(Error::invariant(format!(
                    "cannot prune active node {current}"
                )));
            }
        }

        self.nodes.retain(|node| !doomed.contains(node.id()));
        for node in &mut self.nodes {
            node.retain_neighbors(|id| !doomed.contains(id));
        }
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id().to_string(), slot))
            .collect();
        debug!(removed = doomed.len(), remaining = self.nodes.len(), "pruned nodes");
        Ok(doomed.len())
    }

    pub fn keep_only<I, S>(&mut self, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keep: HashSet<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        let doomed: Vec<NodeId> = self
            .ids()
            .filter(|id| !keep.contains(*id))
            .map(str::to_string)
            .collect();
        self.prune_nodes(doomed)
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.navigable().len()).sum()
    }

    pub fn one_way_edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::new();
        for node in &self.nodes {
            for neighbor in node.navigable() {
                let back = self
                    .get_node(neighbor)
                    .map(|other| other.navigable().iter().any(|id| id == node.id()))
                    .unwrap_or(false);
                if !back {
                    edges.push((node.id().to_string(), neighbor.clone()));
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> Result<ViewpointGraph> {
        ViewpointGraph::new(vec![
            PanoramaNode::at("a", Point3::new(0.0, 0.0, 0.0)).with_navigable(["b"]),
            PanoramaNode::at("b", Point3::new(2.0, 0.0, 0.0)).with_navigable(["a", "c"]),
            PanoramaNode::at("c", Point3::new(4.0, 0.0, 0.0)).with_navigable(["b", "ghost"]),
        ])
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = ViewpointGraph::new(vec![
            PanoramaNode::at("a", Point3::new(0.0, 0.0, 0.0)),
            PanoramaNode::at("a", Point3::new(1.0, 0.0, 0.0)),
        ]);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn strips_unknown_neighbors() -> Result<()> {
        let graph = line_graph()?;
        assert_eq!(graph.navigable_neighbors("c")?, vec!["b".to_string()]);
        Ok(())
    }

    #[test]
    fn unknown_node_is_not_found() -> Result<()> {
        let graph = line_graph()?;
        assert!(matches!(graph.get_node("zz"), Err(Error::NotFound(id)) if id == "zz"));
        Ok(())
    }

    #[test]
    fn closest_node_breaks_ties_by_storage_order() -> Result<()> {
        let graph = line_graph()?;
        assert_eq!(graph.closest_node(Point3::new(1.0, 0.0, 0.0)), Some("a"));
        assert_eq!(graph.closest_node(Point3::new(3.0, 5.0, 0.0)), Some("b"));
        assert_eq!(ViewpointGraph::default().closest_node(Point3::new(0.0, 0.0, 0.0)), None);
        Ok(())
    }

    #[test]
    fn cannot_prune_current_node() -> Result<()> {
        let mut graph = line_graph()?;
        graph.set_current("b")?;
        let result = graph.prune_nodes(["a", "b"]);
        assert!(matches!(result, Err(Error::InvariantViolation(_))));
        assert_eq!(graph.len(), 3);
        Ok(())
    }

    #[test]
    fn prune_strips_adjacency() -> Result<()> {
        let mut graph = line_graph()?;
        assert_eq!(graph.prune_nodes(["c", "unknown"])?, 1);
        assert_eq!(graph.navigable_neighbors("b")?, vec!["a".to_string()]);
        assert!(!graph.contains("c"));
        Ok(())
    }

    #[test]
    fn one_way_edges_are_reported() -> Result<()> {
        let graph = ViewpointGraph::new(vec![
            PanoramaNode::at("a", Point3::new(0.0, 0.0, 0.0)).with_navigable(["b"]),
            PanoramaNode::at("b", Point3::new(1.0, 0.0, 0.0)),
        ])?;
        assert_eq!(graph.one_way_edges(), vec![("a".to_string(), "b".to_string())]);
        assert_eq!(graph.edge_count(), 1);
        Ok(())
    }
}

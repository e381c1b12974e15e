use panotrail_base::{NodeId, Result};
use panotrail_geometry::{Point3, decompose};
use panotrail_graph::{PanoramaNode, ViewpointGraph};
use panotrail_trace::Snapshot;
use tracing::debug;

use crate::CameraPose;

#[derive(Clone, Debug, PartialEq)]
pub struct CursorTarget {
    pub node_id: NodeId,
    pub position: Point3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    pub current_node_id: Option<NodeId>,
    pub camera_pose: CameraPose,
    pub cursor_target: Option<CursorTarget>,
}

/// Implemented by anything that owns an [`Environment`], so capture, replay
/// and overlays work the same on a passive environment or a navigator.
pub trait HasEnvironment {
    fn environment(&self) -> &Environment;
    fn environment_mut(&mut self) -> &mut Environment;

    fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.environment_mut().apply_snapshot(snapshot)
    }
}

#[derive(Clone, Debug)]
pub struct Environment {
    graph: ViewpointGraph,
    pose: CameraPose,
    prefetch: Vec<NodeId>,
}

impl Environment {
    pub fn new(graph: ViewpointGraph, pose: CameraPose) -> Self {
        Self {
            graph,
            pose,
            prefetch: Vec::new(),
        }
    }

    pub fn graph(&self) -> &ViewpointGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ViewpointGraph {
        &mut self.graph
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    pub fn pose_mut(&mut self) -> &mut CameraPose {
        &mut self.pose
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.graph.current_id()
    }

    pub fn current_node(&self) -> Option<&PanoramaNode> {
        self.graph
            .current_id()
            .and_then(|id| self.graph.get_node(id).ok())
    }

    pub fn set_current_node(&mut self, id: &str) -> Result<bool> {
        if self.graph.current_id() == Some(id) {
            return Ok(false);
        }
        let node = self.graph.get_node(id)?;
        let position = node.position();
        let neighbors = node.navigable().to_vec();
        self.graph.set_current(id)?;
        self.pose.position = position;
        self.pose.source = Some(id.to_string());
        debug!(node = id, neighbors = neighbors.len(), "current node changed");
        self.prefetch.extend(neighbors);
        Ok(true)
    }

    pub fn take_prefetch_hints(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.prefetch)
    }

    pub fn capture(&self, timestamp_ms: f64) -> Option<Snapshot> {
        let id = self.graph.current_id()?;
        Some(Snapshot::new(
            id,
            self.pose.world_matrix(),
            self.pose.projection,
            timestamp_ms,
        ))
    }

    /// Restores a recorded camera exactly: node first, then the world
    /// transform and both projection matrices as stored. Field of view and
    /// aspect are left alone so the local viewport cannot alter the result.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.set_current_node(&snapshot.node_id)?;
        let parts = decompose(&snapshot.extrinsic);
        self.pose.set_projection(snapshot.intrinsic)?;
        self.pose.position = parts.position;
        self.pose.orientation = parts.rotation;
        self.pose.scale = parts.scale;
        Ok(())
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            current_node_id: self.graph.current_id().map(str::to_string),
            camera_pose: self.pose.clone(),
            cursor_target: None,
        }
    }
}

impl HasEnvironment for Environment {
    fn environment(&self) -> &Environment {
        self
    }

    fn environment_mut(&mut self) -> &mut Environment {
        self
    }
}

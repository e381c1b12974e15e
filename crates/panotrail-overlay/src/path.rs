use std::collections::HashSet;

use panotrail_base::{Error, NodeId, Result};
use panotrail_geometry::Point3;
use panotrail_geometry::cgmath::MetricSpace;
use panotrail_graph::ViewpointGraph;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{OverlayPainter, Rgb, Stroke};

pub const DEFAULT_DENSITY: f64 = 10.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub density: f64,
    pub line_width: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            density: DEFAULT_DENSITY,
            line_width: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathPoint {
    pub position: Point3,
    pub color: Rgb,
    pub anchor: NodeId,
    pub visible: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PathOverlay {
    points: Vec<PathPoint>,
    line_width: f32,
}

impl PathOverlay {
    pub fn build(
        graph: &ViewpointGraph,
        waypoints: &[Point3],
        colors: &[Rgb],
        config: &OverlayConfig,
    ) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidParameter("overlay needs at least one colour".into()));
        }
        if !(config.density > 0.0 && config.density.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "overlay density must be > 0, got {}",
                config.density
            )));
        }
        let positions = subdivide(waypoints, config.density);
        let last = positions.len().saturating_sub(1).max(1) as f64;
        let points = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                Ok(PathPoint {
                    position,
                    color: Rgb::gradient(colors, i as f64 / last).unwrap_or(Rgb::WHITE),
                    anchor: anchor_for(graph, position)?,
                    visible: false,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            waypoints = waypoints.len(),
            points = points.len(),
            "path overlay built"
        );
        Ok(Self {
            points,
            line_width: config.line_width,
        })
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn visible_points(&self) -> impl Iterator<Item = &PathPoint> {
        self.points.iter().filter(|p| p.visible)
    }

    pub fn update_visibility(&mut self, graph: &ViewpointGraph) -> Result<usize> {
        let shown = revealed_anchors(graph)?;
        let mut count = 0;
        for point in &mut self.points {
            point.visible = shown.contains(point.anchor.as_str());
            count += usize::from(point.visible);
        }
        trace!(visible = count, total = self.points.len(), "path visibility updated");
        Ok(count)
    }

    pub fn paint(&self, painter: &mut dyn OverlayPainter) {
        for pair in self.points.windows(2) {
            let [from, to] = pair else { continue };
            if from.visible && to.visible {
                painter.line_segment(
                    from.position,
                    to.position,
                    Stroke::new(self.line_width, from.color),
                );
            }
        }
    }
}

pub(crate) fn subdivide(waypoints: &[Point3], density: f64) -> Vec<Point3> {
    let Some(last) = waypoints.last() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for pair in waypoints.windows(2) {
        let &[from, to] = pair else { continue };
        let steps = ((from.distance(to) * density).ceil() as usize).max(1);
        out.extend((0..steps).map(|k| from + (to - from) * (k as f64 / steps as f64)));
    }
    out.push(*last);
    out
}

pub(crate) fn anchor_for(graph: &ViewpointGraph, position: Point3) -> Result<NodeId> {
    graph
        .closest_node(position)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidParameter("cannot anchor an overlay to an empty graph".into()))
}

pub(crate) fn revealed_anchors(graph: &ViewpointGraph) -> Result<HashSet<NodeId>> {
    let Some(current) = graph.current_id() else {
        return Ok(HashSet::new());
    };
    let mut shown: HashSet<NodeId> = graph.visible_neighbors(current)?.into_iter().collect();
    shown.insert(current.to_string());
    Ok(shown)
}

use std::f64::consts::TAU;

use panotrail_base::{Error, NodeId, Result};
use panotrail_geometry::cgmath::InnerSpace;
use panotrail_geometry::{Point3, Vec3};
use panotrail_graph::ViewpointGraph;
use serde::{Deserialize, Serialize};

use crate::path::{anchor_for, revealed_anchors};
use crate::{OverlayPainter, Rgb, Stroke};

const MARKER_RADIUS: f64 = 0.05;
const ARROW_LENGTH: f64 = 0.3;
const DECORATION_WIDTH: f32 = 2.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub period_ms: f64,
    pub amplitude: f64,
    pub phase: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            period_ms: 1500.0,
            amplitude: 0.25,
            phase: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decoration {
    Arrow { direction: Vec3 },
    Halo { radius: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub position: Point3,
    pub color: Rgb,
    pub anchor: NodeId,
    pub decoration: Option<Decoration>,
    pub visible: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MarkerOverlay {
    markers: Vec<Marker>,
    pulse: PulseConfig,
}

impl MarkerOverlay {
    pub fn build(
        graph: &ViewpointGraph,
        waypoints: &[Point3],
        colors: &[Rgb],
        pulse: PulseConfig,
    ) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidParameter("markers need at least one colour".into()));
        }
        let last = waypoints.len().saturating_sub(1).max(1) as f64;
        let markers = waypoints
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                Ok(Marker {
                    position,
                    color: Rgb::gradient(colors, i as f64 / last).unwrap_or(Rgb::WHITE),
                    anchor: anchor_for(graph, position)?,
                    decoration: None,
                    visible: false,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { markers, pulse })
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn decorate(&mut self, index: usize, decoration: Decoration) -> Result<()> {
        let len = self.markers.len();
        let marker = self.markers.get_mut(index).ok_or_else(|| {
            Error::InvalidParameter(format!("marker {index} out of range ({len} markers)"))
        })?;
        marker.decoration = Some(decoration);
        Ok(())
    }

    pub fn update_visibility(&mut self, graph: &ViewpointGraph) -> Result<usize> {
        let shown = revealed_anchors(graph)?;
        let mut count = 0;
        for marker in &mut self.markers {
            marker.visible = shown.contains(marker.anchor.as_str());
            count += usize::from(marker.visible);
        }
        Ok(count)
    }

    pub fn pulse_scale(&self, wall_clock_ms: f64) -> f64 {
        let PulseConfig {
            period_ms,
            amplitude,
            phase,
        } = self.pulse;
        if period_ms <= 0.0 {
            return 1.0;
        }
        1.0 + amplitude * (TAU * wall_clock_ms / period_ms + phase).sin()
    }

    pub fn paint(&self, painter: &mut dyn OverlayPainter, wall_clock_ms: f64) {
        let scale = self.pulse_scale(wall_clock_ms);
        for marker in self.markers.iter().filter(|m| m.visible) {
            painter.sphere(marker.position, MARKER_RADIUS, marker.color);
            let stroke = Stroke::new(DECORATION_WIDTH, marker.color);
            match marker.decoration {
                Some(Decoration::Arrow { direction }) if direction.magnitude2() > 0.0 => {
                    painter.arrow(
                        marker.position,
                        direction.normalize() * (ARROW_LENGTH * scale),
                        stroke,
                    );
                }
                Some(Decoration::Halo { radius }) => {
                    painter.ring(marker.position, radius * scale, stroke);
                }
                _ => {}
            }
        }
    }
}

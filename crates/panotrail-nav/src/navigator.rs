use panotrail_base::{Error, NodeId, Result};
use panotrail_geometry::cgmath::{InnerSpace, Rad, Rotation3};
use panotrail_geometry::{Point3, Quat, ease_in_out, lerp, look_rotation, transition_fov};
use panotrail_graph::{PanoramaNode, ViewpointGraph};
use panotrail_trace::Snapshot;
use tracing::{debug, trace};

use crate::{CursorTarget, Environment, FrameState, HasEnvironment, NavigatorConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    Uninitialized,
    Idle,
    Transitioning,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Targeting { target: Option<NodeId> },
    Transitioning { target: NodeId, progress: f64 },
    Arrived { node: NodeId },
}

#[derive(Clone, Debug)]
struct Transition {
    target: NodeId,
    from_position: Point3,
    to_position: Point3,
    from_orientation: Quat,
    to_orientation: Quat,
    from_fov: f64,
    to_fov: f64,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl Transition {
    fn progress(&self) -> f64 {
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct Navigator {
    env: Environment,
    config: NavigatorConfig,
    pointer: (f64, f64),
    target: Option<CursorTarget>,
    transition: Option<Transition>,
    input_enabled: bool,
}

impl Navigator {
    pub fn new(graph: ViewpointGraph, config: NavigatorConfig) -> Result<Self> {
        let pose = config.camera_pose();
        Self::from_environment(Environment::new(graph, pose), config)
    }

    pub fn from_environment(env: Environment, config: NavigatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            env,
            config,
            pointer: (0.0, 0.0),
            target: None,
            transition: None,
            input_enabled: true,
        })
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn state(&self) -> NavState {
        if self.transition.is_some() {
            NavState::Transitioning
        } else if self.env.current_node_id().is_some() {
            NavState::Idle
        } else {
            NavState::Uninitialized
        }
    }

    pub fn target(&self) -> Option<&CursorTarget> {
        self.target.as_ref()
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn transition_target(&self) -> Option<(&str, f64)> {
        self.transition
            .as_ref()
            .map(|t| (t.target.as_str(), t.duration_ms))
    }

    pub fn set_current_node(&mut self, id: &str) -> Result<bool> {
        if self.transition.is_some() {
            return Err(Error::invariant(format!(
                "cannot jump to {id} during a transition"
            )));
        }
        let changed = self.env.set_current_node(id)?;
        if changed {
            self.target = None;
        }
        Ok(changed)
    }

    pub fn set_pointer(&mut self, ndc_x: f64, ndc_y: f64) {
        if !self.input_enabled {
            return;
        }
        self.pointer = (ndc_x.clamp(-1.0, 1.0), ndc_y.clamp(-1.0, 1.0));
    }

    pub fn look(&mut self, yaw: f64, pitch: f64) {
        if !self.input_enabled {
            return;
        }
        let pose = self.env.pose_mut();
        let yaw = Quat::from_axis_angle(self.config.up().normalize(), Rad(yaw));
        let pitch = Quat::from_angle_x(Rad(pitch));
        pose.orientation = (yaw * pose.orientation * pitch).normalize();
    }

    pub fn look_at(&mut self, point: Point3) {
        if !self.input_enabled {
            return;
        }
        let pose = self.env.pose_mut();
        pose.orientation = look_rotation(point - pose.position, self.config.up());
        self.pointer = (0.0, 0.0);
    }

    pub fn click(&mut self) -> Result<bool> {
        if !self.input_enabled {
            return Ok(false);
        }
        let Some(target) = self.target.as_ref().map(|t| t.node_id.clone()) else {
            return Ok(false);
        };
        self.begin_transition(&target)
    }

    /// Starts animating toward `target_id`. Returns `false` unless idle with
    /// `target_id` as the selected target.
    pub fn begin_transition(&mut self, target_id: &str) -> Result<bool> {
        if self.transition.is_some() {
            trace!(target = target_id, "transition already in flight");
            return Ok(false);
        }
        let Some(current) = self.env.current_node_id().map(str::to_string) else {
            return Ok(false);
        };
        let to_position = self.env.graph().get_node(target_id)?.position();
        if !self.target.as_ref().is_some_and(|t| t.node_id == target_id) {
            trace!(target = target_id, "not the selected target");
            return Ok(false);
        }

        let pose = self.env.pose();
        let offset = to_position - pose.position;
        let distance = offset.magnitude();
        let to_orientation = if distance > f64::EPSILON {
            look_rotation(offset, self.config.up())
        } else {
            pose.orientation
        };
        self.transition = Some(Transition {
            target: target_id.to_string(),
            from_position: pose.position,
            to_position,
            from_orientation: pose.orientation,
            to_orientation,
            from_fov: pose.fov_deg,
            to_fov: transition_fov(pose.fov_deg, distance),
            elapsed_ms: 0.0,
            duration_ms: self.config.transition_ms,
        });
        self.input_enabled = false;
        self.target = None;
        debug!(from = %current, to = target_id, distance, "transition started");
        Ok(true)
    }

    pub fn on_tick(&mut self, delta_ms: f64) -> Result<TickOutcome> {
        match self.state() {
            NavState::Uninitialized => Err(Error::invariant(
                "navigator ticked before a current node was set",
            )),
            NavState::Transitioning => self.advance_transition(delta_ms),
            NavState::Idle => {
                self.target = self.select_target()?;
                Ok(TickOutcome::Targeting {
                    target: self.target.as_ref().map(|t| t.node_id.clone()),
                })
            }
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            cursor_target: self.target.clone(),
            ..self.env.frame_state()
        }
    }

    fn select_target(&self) -> Result<Option<CursorTarget>> {
        let Some(current) = self.env.current_node_id() else {
            return Ok(None);
        };
        let graph = self.env.graph();
        let pose = self.env.pose();
        let ray = pose.ray_through(self.pointer.0, self.pointer.1);

        let mut best: Option<(&PanoramaNode, f64)> = None;
        for id in graph.get_node(current)?.navigable() {
            let node = graph.get_node(id)?;
            let cursor = node.cursor_position();
            if ray.facing(cursor) <= 0.0 {
                continue;
            }
            let distance = ray.distance_to_point(cursor);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((node, distance));
            }
        }

        let Some((node, _)) = best else {
            trace!(node = current, "no navigable neighbor in front of the camera");
            return Ok(None);
        };
        let position = pose
            .frustum()
            .clamp_point(node.cursor_position(), self.config.cursor_offset);
        Ok(Some(CursorTarget {
            node_id: node.id().to_string(),
            position,
        }))
    }

    fn advance_transition(&mut self, delta_ms: f64) -> Result<TickOutcome> {
        let Some(mut transition) = self.transition.take() else {
            return Ok(TickOutcome::Targeting { target: None });
        };
        transition.elapsed_ms += delta_ms.max(0.0);
        let t = transition.progress();
        let eased = ease_in_out(t);

        let pose = self.env.pose_mut();
        pose.position = transition.from_position
            + (transition.to_position - transition.from_position) * eased;
        pose.orientation = transition
            .from_orientation
            .slerp(transition.to_orientation, eased);
        pose.fov_deg = lerp(transition.from_fov, transition.to_fov, eased);
        pose.update_projection();

        if t < 1.0 {
            let target = transition.target.clone();
            self.transition = Some(transition);
            return Ok(TickOutcome::Transitioning {
                target,
                progress: t,
            });
        }

        pose.fov_deg = transition.from_fov;
        pose.update_projection();
        self.env.set_current_node(&transition.target)?;
        self.target = None;
        self.input_enabled = true;
        debug!(node = %transition.target, "transition finished");
        Ok(TickOutcome::Arrived {
            node: transition.target,
        })
    }
}

impl HasEnvironment for Navigator {
    fn environment(&self) -> &Environment {
        &self.env
    }

    fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        if self.transition.is_some() {
            return Err(Error::invariant(format!(
                "cannot replay {} during a transition",
                snapshot.node_id
            )));
        }
        self.env.apply_snapshot(snapshot)?;
        self.target = None;
        Ok(())
    }
}

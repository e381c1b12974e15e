use panotrail_base::{Error, Result};
use panotrail_geometry::Vec3;
use serde::{Deserialize, Serialize};

use crate::CameraPose;

pub const DEFAULT_FOV_DEG: f64 = 60.0;
pub const DEFAULT_TRANSITION_MS: f64 = 1000.0;
pub const DEFAULT_CURSOR_OFFSET: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub transition_ms: f64,
    pub world_up: [f64; 3],
    pub cursor_offset: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            fov_deg: DEFAULT_FOV_DEG,
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 1000.0,
            transition_ms: DEFAULT_TRANSITION_MS,
            world_up: [0.0, 1.0, 0.0],
            cursor_offset: DEFAULT_CURSOR_OFFSET,
        }
    }
}

impl NavigatorConfig {
    pub fn up(&self) -> Vec3 {
        Vec3::from(self.world_up)
    }

    pub fn camera_pose(&self) -> CameraPose {
        CameraPose::new(self.fov_deg, self.aspect, self.near, self.far)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(invalid("fov_deg must be in (0, 180)"));
        }
        if self.aspect <= 0.0 {
            return Err(invalid("aspect must be > 0"));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(invalid("clip planes must satisfy 0 < near < far"));
        }
        if self.transition_ms <= 0.0 {
            return Err(invalid("transition_ms must be > 0"));
        }
        if self.world_up == [0.0; 3] {
            return Err(invalid("world_up must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::InvalidParameter(msg.to_string())
}

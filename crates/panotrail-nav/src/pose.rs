use panotrail_base::{Error, NodeId, Result};
use panotrail_geometry::cgmath::{Deg, EuclideanSpace, InnerSpace, SquareMatrix, perspective};
use panotrail_geometry::{Frustum, Mat4, Point3, Quat, Ray, Vec3, Vec4, compose};

#[derive(Clone, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Point3,
    pub orientation: Quat,
    pub scale: Vec3,
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub projection: Mat4,
    pub projection_inverse: Mat4,
    pub source: Option<NodeId>,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(60.0, 16.0 / 9.0, 0.01, 1000.0)
    }
}

impl CameraPose {
    pub fn new(fov_deg: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut pose = Self {
            position: Point3::origin(),
            orientation: Quat::new(1.0, 0.0, 0.0, 0.0),
            scale: Vec3::new(1.0, 1.0, 1.0),
            fov_deg,
            aspect,
            near,
            far,
            projection: Mat4::identity(),
            projection_inverse: Mat4::identity(),
            source: None,
        };
        pose.update_projection();
        pose
    }

    pub fn update_projection(&mut self) {
        self.projection = perspective(Deg(self.fov_deg), self.aspect, self.near, self.far);
        self.projection_inverse = self.projection.invert().unwrap_or_else(Mat4::identity);
    }

    pub fn set_projection(&mut self, projection: Mat4) -> Result<()> {
        let inverse = projection
            .invert()
            .ok_or_else(|| Error::InvalidParameter("projection is not invertible".to_string()))?;
        self.projection = projection;
        self.projection_inverse = inverse;
        Ok(())
    }

    pub fn world_matrix(&self) -> Mat4 {
        compose(self.position, self.orientation, self.scale)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().invert().unwrap_or_else(Mat4::identity)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::new(0.0, 0.0, -1.0)
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(&(self.projection * self.view_matrix()))
    }

    /// Ray from the camera through a pointer in normalized device
    /// coordinates (`[-1, 1]` on both axes, `+y` up).
    pub fn ray_through(&self, ndc_x: f64, ndc_y: f64) -> Ray {
        let eye = self.projection_inverse * Vec4::new(ndc_x, ndc_y, 0.5, 1.0);
        if eye.w.abs() <= f64::EPSILON {
            return Ray::new(self.position, self.forward());
        }
        let eye = (eye.truncate() / eye.w).extend(1.0);
        let world = Point3::from_vec((self.world_matrix() * eye).truncate());
        let direction = world - self.position;
        if direction.magnitude() <= f64::EPSILON {
            return Ray::new(self.position, self.forward());
        }
        Ray::new(self.position, direction)
    }
}

use cgmath::Matrix;

use crate::{Mat4, Plane, Point3, Vec4};

#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let r0 = view_projection.row(0);
        let r1 = view_projection.row(1);
        let r2 = view_projection.row(2);
        let r3 = view_projection.row(3);
        let plane = |v: Vec4| Plane::from_coefficients(v.x, v.y, v.z, v.w);
        Self {
            planes: [
                plane(r3 + r0),
                plane(r3 - r0),
                plane(r3 + r1),
                plane(r3 - r1),
                plane(r3 + r2),
                plane(r3 - r2),
            ],
        }
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    pub fn contains(&self, point: Point3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Pulls `point` inside the frustum by projecting it onto the nearest
    /// violated plane and nudging it `offset` along that plane's normal,
    /// repeating while any plane is still violated.
    pub fn clamp_point(&self, point: Point3, offset: f64) -> Point3 {
        let mut clamped = point;
        for _ in 0..self.planes.len() {
            let nearest = self
                .planes
                .iter()
                .map(|plane| (plane, plane.distance_to_point(clamped)))
                .filter(|(_, distance)| *distance < 0.0)
                .max_by(|a, b| a.1.total_cmp(&b.1));
            let Some((plane, _)) = nearest else {
                break;
            };
            clamped = plane.project_point(clamped) + plane.normal * offset;
        }
        clamped
    }
}

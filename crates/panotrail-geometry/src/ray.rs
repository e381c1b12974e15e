use cgmath::{EuclideanSpace, InnerSpace, MetricSpace};

use crate::{Point3, Vec3, normalized};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: normalized(direction),
        }
    }

    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    pub fn facing(&self, point: Point3) -> f64 {
        (point - self.origin).dot(self.direction)
    }

    pub fn distance_to_point(&self, point: Point3) -> f64 {
        let t = self.facing(point);
        if t < 0.0 {
            return self.origin.distance(point);
        }
        self.at(t).distance(point)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f64,
}

impl Plane {
    pub fn from_coefficients(a: f64, b: f64, c: f64, d: f64) -> Self {
        let normal = Vec3::new(a, b, c);
        let len = normal.magnitude();
        if len <= f64::EPSILON {
            return Self {
                normal,
                constant: d,
            };
        }
        Self {
            normal: normal / len,
            constant: d / len,
        }
    }

    pub fn from_normal_and_point(normal: Vec3, point: Point3) -> Self {
        let normal = normalized(normal);
        Self {
            normal,
            constant: -normal.dot(point.to_vec()),
        }
    }

    pub fn distance_to_point(&self, point: Point3) -> f64 {
        self.normal.dot(point.to_vec()) + self.constant
    }

    pub fn project_point(&self, point: Point3) -> Point3 {
        point - self.normal * self.distance_to_point(point)
    }
}

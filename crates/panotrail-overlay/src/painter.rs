use panotrail_geometry::{Point3, Vec3};

use crate::{Rgb, Stroke};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: Point2,
    pub max: Point2,
}

impl Rect {
    pub const fn from_min_max(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OverlayShape {
    Line {
        start: Point3,
        end: Point3,
        stroke: Stroke,
    },
    Sphere {
        center: Point3,
        radius: f64,
        fill: Rgb,
    },
    Arrow {
        origin: Point3,
        direction: Vec3,
        stroke: Stroke,
    },
    Ring {
        center: Point3,
        radius: f64,
        stroke: Stroke,
    },
    Rect {
        rect: Rect,
        fill: Rgb,
    },
}

pub trait OverlayPainter {
    fn line_segment(&mut self, start: Point3, end: Point3, stroke: Stroke);
    fn sphere(&mut self, center: Point3, radius: f64, fill: Rgb);
    fn arrow(&mut self, origin: Point3, direction: Vec3, stroke: Stroke);
    fn ring(&mut self, center: Point3, radius: f64, stroke: Stroke);
    fn rect_filled(&mut self, rect: Rect, fill: Rgb);
}

#[derive(Debug, Default)]
pub struct OverlayCollector {
    pub shapes: Vec<OverlayShape>,
}

impl OverlayCollector {
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl OverlayPainter for OverlayCollector {
    fn line_segment(&mut self, start: Point3, end: Point3, stroke: Stroke) {
        self.shapes.push(OverlayShape::Line { start, end, stroke });
    }

    fn sphere(&mut self, center: Point3, radius: f64, fill: Rgb) {
        self.shapes.push(OverlayShape::Sphere {
            center,
            radius,
            fill,
        });
    }

    fn arrow(&mut self, origin: Point3, direction: Vec3, stroke: Stroke) {
        self.shapes.push(OverlayShape::Arrow {
            origin,
            direction,
            stroke,
        });
    }

    fn ring(&mut self, center: Point3, radius: f64, stroke: Stroke) {
        self.shapes.push(OverlayShape::Ring {
            center,
            radius,
            stroke,
        });
    }

    fn rect_filled(&mut self, rect: Rect, fill: Rgb) {
        self.shapes.push(OverlayShape::Rect { rect, fill });
    }
}

use cgmath::{EuclideanSpace, InnerSpace, Matrix3, Matrix4, SquareMatrix, Zero};

use crate::{Mat4, Point3, Quat, Vec3, Vec4, normalized};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformParts {
    pub position: Point3,
    pub rotation: Quat,
    pub scale: Vec3,
}

pub fn compose(position: Point3, rotation: Quat, scale: Vec3) -> Mat4 {
    Matrix4::from_translation(position.to_vec())
        * Matrix4::from(rotation)
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

pub fn decompose(matrix: &Mat4) -> TransformParts {
    let mut sx = matrix.x.truncate().magnitude();
    let sy = matrix.y.truncate().magnitude();
    let sz = matrix.z.truncate().magnitude();
    if matrix.determinant() < 0.0 {
        sx = -sx;
    }
    let axis = |column: Vec4, scale: f64| {
        if scale.abs() <= f64::EPSILON {
            Vec3::zero()
        } else {
            column.truncate() / scale
        }
    };
    let basis = Matrix3::from_cols(axis(matrix.x, sx), axis(matrix.y, sy), axis(matrix.z, sz));
    TransformParts {
        position: Point3::from_vec(matrix.w.truncate()),
        rotation: Quat::from(basis).normalize(),
        scale: Vec3::new(sx, sy, sz),
    }
}

pub fn to_row_major(matrix: &Mat4) -> [f64; 16] {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[row * 4 + col] = matrix[col][row];
        }
    }
    out
}

pub fn from_row_major(values: &[f64; 16]) -> Mat4 {
    let mut matrix = Mat4::identity();
    for row in 0..4 {
        for col in 0..4 {
            matrix[col][row] = values[row * 4 + col];
        }
    }
    matrix
}

/// Rotation of a camera (looking down its local -Z) so that it faces
/// `forward`. Falls back to Z then Y as the up hint when `forward` is
/// parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let f = normalized(forward);
    if f.magnitude() <= f64::EPSILON {
        return Quat::new(1.0, 0.0, 0.0, 0.0);
    }
    let right = [up, Vec3::unit_z(), Vec3::unit_y()]
        .into_iter()
        .map(|hint| f.cross(hint))
        .find(|right| right.magnitude() > 1.0e-6)
        .unwrap_or_else(Vec3::unit_x)
        .normalize();
    let cam_up = right.cross(f).normalize();
    Quat::from(Matrix3::from_cols(right, cam_up, -f)).normalize()
}

//! Per-draw model transforms.
//!
//! A [`Transform`] is built right before a draw call, turned into a model matrix
//! and thrown away. Nothing is cached between draws.

use cgmath::{Deg, Matrix4, Vector3};

/// Scale, per-axis rotation (degrees) and translation of one drawn object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: Vector3<f32>,
    /// Rotation around X, Y and Z in degrees. Applied to the scaled object in
    /// Z, Y, X order, so the composed matrix reads `Rx · Ry · Rz`.
    pub rotation_degrees: Vector3<f32>,
    pub translation: Vector3<f32>,
}

impl Transform {
    pub fn new(
        scale: impl Into<Vector3<f32>>,
        rotation_degrees: impl Into<Vector3<f32>>,
        translation: impl Into<Vector3<f32>>,
    ) -> Self {
        Self {
            scale: scale.into(),
            rotation_degrees: rotation_degrees.into(),
            translation: translation.into(),
        }
    }

    /// Compose `T · Rx · Ry · Rz · S`.
    ///
    /// The order is fixed: callers place objects assuming X is the outermost
    /// rotation and that rotations happen before translation.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        compose(self.scale, self.rotation_degrees, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation_degrees: Vector3::new(0.0, 0.0, 0.0),
            translation: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl From<Transform> for Matrix4<f32> {
    fn from(transform: Transform) -> Self {
        transform.to_matrix()
    }
}

/// Build a model matrix from scale, XYZ rotation in degrees and translation.
pub fn compose(
    scale: Vector3<f32>,
    rotation_degrees: Vector3<f32>,
    translation: Vector3<f32>,
) -> Matrix4<f32> {
    Matrix4::from_translation(translation)
        * Matrix4::from_angle_x(Deg(rotation_degrees.x))
        * Matrix4::from_angle_y(Deg(rotation_degrees.y))
        * Matrix4::from_angle_z(Deg(rotation_degrees.z))
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

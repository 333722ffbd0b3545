//! Affine transform for part placement and snap frames
//!
//! Columns of the basis are `right`, `up` and `at`; the fourth column is the
//! translation. Composition is plain matrix multiplication, so `a * b` applies
//! `b` first and then `a`.

use std::ops::Mul;

use glam::{DMat3, DMat4, DVec3, DVec4};
use serde::{Deserialize, Serialize};

use crate::constants::DETERMINANT_EPSILON;

/// A 4x4 affine transform (position + right/up/at basis)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(DMat4);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self(DMat4::IDENTITY);

    /// Half turn about local Y. Built from exact columns so the flip carries
    /// no trigonometric rounding.
    pub const FLIP_Y: Self = Self(DMat4::from_cols(
        DVec4::new(-1.0, 0.0, 0.0, 0.0),
        DVec4::new(0.0, 1.0, 0.0, 0.0),
        DVec4::new(0.0, 0.0, -1.0, 0.0),
        DVec4::new(0.0, 0.0, 0.0, 1.0),
    ));

    /// Wrap a raw matrix
    pub fn from_mat4(matrix: DMat4) -> Self {
        Self(matrix)
    }

    /// The underlying matrix
    pub fn as_mat4(&self) -> &DMat4 {
        &self.0
    }

    /// Build from basis columns and a translation
    pub fn from_basis(right: DVec3, up: DVec3, at: DVec3, translation: DVec3) -> Self {
        Self(DMat4::from_cols(
            right.extend(0.0),
            up.extend(0.0),
            at.extend(0.0),
            translation.extend(1.0),
        ))
    }

    /// Pure translation
    pub fn from_translation(translation: DVec3) -> Self {
        Self(DMat4::from_translation(translation))
    }

    /// Rotation about the X axis (radians)
    pub fn rotation_x(angle: f64) -> Self {
        Self(DMat4::from_rotation_x(angle))
    }

    /// Rotation about the Y axis (radians)
    pub fn rotation_y(angle: f64) -> Self {
        Self(DMat4::from_rotation_y(angle))
    }

    /// Rotation about the Z axis (radians)
    pub fn rotation_z(angle: f64) -> Self {
        Self(DMat4::from_rotation_z(angle))
    }

    /// Build from authored rows (row-major, translation in the last column)
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self(DMat4::from_cols_array_2d(&rows).transpose())
    }

    /// Export as rows (row-major, translation in the last column)
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        self.0.transpose().to_cols_array_2d()
    }

    /// Build a world transform from game placement vectors.
    ///
    /// `right` is derived from `at x up`, negated, normalized and then scaled
    /// to the mean length of `up` and `at` so uniformly scaled parts keep
    /// their scale on all three axes.
    pub fn from_position_up_at(position: DVec3, up: DVec3, at: DVec3) -> Self {
        let right = -at.cross(up).normalize_or_zero() * ((up.length() + at.length()) / 2.0);
        Self::from_basis(right, up, at, position)
    }

    /// Decompose into game placement vectors `(position, up, at)`
    pub fn to_position_up_at(&self) -> (DVec3, DVec3, DVec3) {
        (self.translation(), self.up(), self.at())
    }

    /// Re-derive an orthonormal basis, keeping `at` authoritative
    pub fn orthonormalized(&self) -> Self {
        let at = self.at().normalize_or_zero();
        let right = self.up().cross(at).normalize_or_zero();
        let up = at.cross(right);
        Self::from_basis(right, up, at, self.translation())
    }

    pub fn translation(&self) -> DVec3 {
        self.0.w_axis.truncate()
    }

    pub fn right(&self) -> DVec3 {
        self.0.x_axis.truncate()
    }

    pub fn up(&self) -> DVec3 {
        self.0.y_axis.truncate()
    }

    pub fn at(&self) -> DVec3 {
        self.0.z_axis.truncate()
    }

    /// The 3x3 basis
    pub fn basis(&self) -> DMat3 {
        DMat3::from_mat4(self.0)
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    /// True when every element is finite and the basis is non-degenerate
    pub fn is_invertible(&self) -> bool {
        self.0.is_finite() && self.determinant().abs() > DETERMINANT_EPSILON
    }

    /// Inverse, or `None` for a degenerate basis
    pub fn try_inverse(&self) -> Option<Self> {
        self.is_invertible().then(|| Self(self.0.inverse()))
    }

    /// `self * other`: apply `other` in the frame of `self`
    pub fn compose(&self, other: &Self) -> Self {
        Self(self.0 * other.0)
    }

    /// Map a local point into the space of this transform
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.0.transform_point3(point)
    }

    /// Element-wise comparison within `tolerance`
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.0.abs_diff_eq(other.0, tolerance)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl From<DMat4> for Transform {
    fn from(matrix: DMat4) -> Self {
        Self(matrix)
    }
}

//! GPU upload layouts for skinning matrices
//!
//! A renderer uploads either full column-major 4x4 matrices (the layout of
//! a `mat4[]` uniform array) or the compact 3x4 form below, dropping the
//! constant last row of an affine transform.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// 3x4 affine bone matrix (row-major storage, POD type)
///
/// Stores 3 rows of a 4x4 affine matrix. The implicit 4th row is [0, 0, 0, 1].
/// Each row stores [Xx, Xy, Xz, Tx] etc.
///
/// Memory layout (48 bytes):
/// - row0: rotation row 0 + translation X
/// - row1: rotation row 1 + translation Y
/// - row2: rotation row 2 + translation Z
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct BoneMatrix3x4 {
    /// First row: [m00, m01, m02, tx]
    pub row0: [f32; 4],
    /// Second row: [m10, m11, m12, ty]
    pub row1: [f32; 4],
    /// Third row: [m20, m21, m22, tz]
    pub row2: [f32; 4],
}

impl BoneMatrix3x4 {
    /// Size of one matrix in bytes
    pub const SIZE: usize = 48;

    /// Identity bone matrix (no transformation)
    pub const IDENTITY: Self = Self {
        row0: [1.0, 0.0, 0.0, 0.0],
        row1: [0.0, 1.0, 0.0, 0.0],
        row2: [0.0, 0.0, 1.0, 0.0],
    };

    /// Take the top three rows of an affine matrix
    pub fn from_mat4(m: Mat4) -> Self {
        Self {
            row0: m.row(0).to_array(),
            row1: m.row(1).to_array(),
            row2: m.row(2).to_array(),
        }
    }

    /// Rebuild the 4x4 matrix with the implicit [0, 0, 0, 1] row
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&[
            [self.row0[0], self.row1[0], self.row2[0], 0.0],
            [self.row0[1], self.row1[1], self.row2[1], 0.0],
            [self.row0[2], self.row1[2], self.row2[2], 0.0],
            [self.row0[3], self.row1[3], self.row2[3], 1.0],
        ])
    }

    /// Convert to flat f32 array for GPU upload (row-major)
    pub fn to_array(&self) -> [f32; 12] {
        let mut out = [0.0; 12];
        out[0..4].copy_from_slice(&self.row0);
        out[4..8].copy_from_slice(&self.row1);
        out[8..12].copy_from_slice(&self.row2);
        out
    }
}

impl From<Mat4> for BoneMatrix3x4 {
    fn from(m: Mat4) -> Self {
        Self::from_mat4(m)
    }
}

/// Raw bytes of a matrix slice, column-major, 64 bytes per matrix
pub fn matrices_as_bytes(matrices: &[Mat4]) -> &[u8] {
    bytemuck::cast_slice(matrices)
}

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::{Result, RigError};

/// Maximum bone influences stored per unique vertex.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// One `(bone table index, weight)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneInfluence {
    pub bone: u32,
    pub weight: f32,
}

impl BoneInfluence {
    #[must_use]
    pub fn new(bone: u32, weight: f32) -> Self {
        Self { bone, weight }
    }
}

/// Influences of a single unique vertex.
pub type BoneWeights = SmallVec<[BoneInfluence; MAX_BONE_INFLUENCES]>;

/// Flat per-submesh buffers as decoded by the provider.
///
/// - `vertices`: positions, stride 3, one entry per unique vertex
/// - `indices`: one entry per loop corner, stride 3 per triangle
/// - `normals`: stride 3, addressed through `indices`
/// - `uvs`: stride 2, addressed through `indices`
/// - `bone_weights`: one row per unique vertex (not per loop)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmeshBuffers {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub bone_weights: Vec<BoneWeights>,
}

impl SubmeshBuffers {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks strides and index ranges.
    ///
    /// Degenerate triangles (in index or position space) are passed through.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(RigError::InvalidBuffers(format!(
                "vertex buffer length {} is not a multiple of 3",
                self.vertices.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(RigError::InvalidBuffers(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        let vertex_count = self.vertex_count();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(RigError::InvalidBuffers(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
        if !self.normals.is_empty() && self.normals.len() != vertex_count * 3 {
            return Err(RigError::InvalidBuffers(format!(
                "normal buffer holds {} floats, expected {}",
                self.normals.len(),
                vertex_count * 3
            )));
        }
        if !self.uvs.is_empty() && self.uvs.len() != vertex_count * 2 {
            return Err(RigError::InvalidBuffers(format!(
                "uv buffer holds {} floats, expected {}",
                self.uvs.len(),
                vertex_count * 2
            )));
        }
        if !self.bone_weights.is_empty() && self.bone_weights.len() != vertex_count {
            return Err(RigError::InvalidBuffers(format!(
                "bone weight table has {} rows for {vertex_count} vertices",
                self.bone_weights.len()
            )));
        }
        if let Some(row) = self
            .bone_weights
            .iter()
            .position(|w| w.len() > MAX_BONE_INFLUENCES)
        {
            return Err(RigError::InvalidBuffers(format!(
                "vertex {row} carries more than {MAX_BONE_INFLUENCES} bone influences"
            )));
        }
        Ok(())
    }
}

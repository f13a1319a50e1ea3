//! Skeleton reconstruction
//!
//! Produces host-ready bone placements from a [`BoneTree`] in one of two modes:
//!
//! - **Bind pose**: bones listed in the mesh's bind-pose table are placed at
//!   the inverse of their bind-pose matrix. Unlisted tree nodes are skipped
//!   and their children attach to the nearest listed ancestor.
//! - **Local TRS**: every node is placed at
//!   `parent_world · T(pos) · R(rot) · S(scale)`, then converted with
//!   [`fix_axes`].
//!
//! Output bones are in pre-order of the source tree.

use glam::{Mat4, Vec3, Vec4};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RigError};
use crate::skeleton::tree::BoneTree;

/// Permutation swapping the Y and Z basis vectors.
pub const AXIS_SWAP_YZ: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 1.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.0, 1.0),
);

/// Re-expresses `m` with Y and Z swapped on both sides.
///
/// `AXIS_SWAP_YZ` is its own inverse, so `fix_axes(fix_axes(m)) == m` and
/// `fix_axes(a * b) == fix_axes(a) * fix_axes(b)`.
#[inline]
#[must_use]
pub fn fix_axes(m: Mat4) -> Mat4 {
    AXIS_SWAP_YZ * m * AXIS_SWAP_YZ
}

/// Reconstruction knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkeletonOptions {
    /// Display length of every bone along its local X axis.
    pub bone_length: f32,
    /// Apply [`fix_axes`] to bind-pose placements too.
    pub fix_bind_pose_axes: bool,
}

impl Default for SkeletonOptions {
    fn default() -> Self {
        Self {
            bone_length: 0.05,
            fix_bind_pose_axes: false,
        }
    }
}

/// How a skeleton was reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconstructMode {
    BindPose,
    LocalTrs,
}

/// One output bone.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedBone {
    pub name: String,
    /// Index of the parent bone in [`ReconstructedSkeleton::bones`].
    pub parent: Option<usize>,
    /// Placement transform in the host's convention.
    pub matrix: Mat4,
    /// Display-only tail offset in bone space.
    pub tail: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedSkeleton {
    pub mode: ReconstructMode,
    pub bones: Vec<ReconstructedBone>,
}

impl ReconstructedSkeleton {
    /// Index of the first bone called `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Names from `name` up to its skeleton root, inclusive.
    #[must_use]
    pub fn parent_chain(&self, name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.find(name);
        while let Some(index) = current {
            // Parents always precede children, so this terminates.
            let bone = &self.bones[index];
            chain.push(bone.name.as_str());
            current = bone.parent.filter(|&p| p < index);
        }
        chain
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// Bind-pose driven reconstruction.
///
/// `bind_poses` pairs bone names with their bind-pose matrices in mesh bone
/// table order; for duplicate names the first entry wins.
pub fn from_bind_poses(
    tree: &BoneTree,
    bind_poses: &[(String, Mat4)],
    options: &SkeletonOptions,
) -> Result<ReconstructedSkeleton> {
    let mut lookup: FxHashMap<&str, &Mat4> = FxHashMap::default();
    for (name, matrix) in bind_poses {
        lookup.entry(name.as_str()).or_insert(matrix);
    }

    let tail = Vec3::new(options.bone_length, 0.0, 0.0);
    let mut bones = Vec::with_capacity(bind_poses.len());

    // State: nearest included ancestor in the output.
    tree.walk(|_, node, parent: Option<&Option<usize>>| {
        let parent = parent.copied().flatten();
        let Some(bind_pose) = lookup.get(node.name.as_str()) else {
            return Ok(parent);
        };

        let inverse = bind_pose.inverse();
        if !inverse.is_finite() {
            return Err(RigError::InvalidBuffers(format!(
                "bind pose of bone '{}' is singular",
                node.name
            )));
        }
        let mut matrix = inverse;
        if options.fix_bind_pose_axes {
            matrix = fix_axes(matrix);
        }

        bones.push(ReconstructedBone {
            name: node.name.clone(),
            parent,
            matrix,
            tail,
        });
        Ok(Some(bones.len() - 1))
    })?;

    Ok(ReconstructedSkeleton {
        mode: ReconstructMode::BindPose,
        bones,
    })
}

/// Local-TRS driven reconstruction over the whole tree.
pub fn from_local_trs(tree: &BoneTree, options: &SkeletonOptions) -> Result<ReconstructedSkeleton> {
    let tail = Vec3::new(options.bone_length, 0.0, 0.0);
    let mut bones = Vec::with_capacity(tree.len());

    // State: (parent world matrix, parent output index).
    tree.walk(|_, node, parent: Option<&(Mat4, usize)>| {
        let local = node.local.to_matrix();
        let (world, parent_index) = match parent {
            Some(&(parent_world, index)) => (parent_world * local, Some(index)),
            None => (local, None),
        };

        bones.push(ReconstructedBone {
            name: node.name.clone(),
            parent: parent_index,
            matrix: fix_axes(world),
            tail,
        });
        Ok((world, bones.len() - 1))
    })?;

    Ok(ReconstructedSkeleton {
        mode: ReconstructMode::LocalTrs,
        bones,
    })
}

//! Bone hierarchy handling
//!
//! - [`BoneTree`]: arena of source bones read from the asset graph
//! - [`SkeletonPathMap`]: bone path hash -> path lookup
//! - [`reconstruct`]: bind-pose and local-TRS skeleton reconstruction

pub mod path_map;
pub mod reconstruct;
pub mod tree;

pub use path_map::{SkeletonPathMap, bone_path_hash};
pub use reconstruct::{
    AXIS_SWAP_YZ, ReconstructMode, ReconstructedBone, ReconstructedSkeleton, SkeletonOptions,
    fix_axes, from_bind_poses, from_local_trs,
};
pub use tree::{BoneNode, BoneTree, LocalTrs, find_root_transform};

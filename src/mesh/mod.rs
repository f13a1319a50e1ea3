//! Skinned mesh assembly
//!
//! Turns the provider's flat per-submesh buffers into indexed triangle
//! geometry with per-loop normals/UVs and per-bone vertex groups.

pub mod assemble;
pub mod bone_table;
pub mod buffers;
pub mod vertex_group;

pub use assemble::{AssembledSubmesh, MeshGeometry, Polygon, assemble_submesh, assign_weights};
pub use bone_table::BoneTable;
pub use buffers::{BoneInfluence, BoneWeights, MAX_BONE_INFLUENCES, SubmeshBuffers};
pub use vertex_group::{VertexGroup, VertexGroupSet};

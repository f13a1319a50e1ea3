//! Scene host boundary
//!
//! [`SceneHost`] is the set of scene mutations the importer needs from the
//! interactive 3D environment. All calls happen on the host's mutation thread.
//! [`MemoryHost`] is a self-contained implementation used by the CLI and the
//! tests; [`adapter`] maps reconstructed entities onto any host.

pub mod adapter;
pub mod memory;

use glam::{Mat4, Vec3};
use slotmap::new_key_type;

use crate::errors::Result;
use crate::mesh::MeshGeometry;

pub use adapter::{build_armature, build_mesh_object, link_to_armature};
pub use memory::{HostSummary, MemoryHost};

new_key_type! {
    pub struct MeshKey;
    pub struct ArmatureKey;
    pub struct ObjectKey;
    pub struct BoneKey;
}

/// Resource wrapped by a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectData {
    Mesh(MeshKey),
    Armature(ArmatureKey),
}

pub trait SceneHost {
    /// Creates a named mesh resource.
    fn create_mesh(&mut self, name: &str, geometry: &MeshGeometry) -> Result<MeshKey>;

    /// Creates an empty armature resource.
    fn create_armature(&mut self, name: &str) -> Result<ArmatureKey>;

    /// Creates an object wrapping `data` and links it into the active collection.
    fn create_object(&mut self, name: &str, data: ObjectData) -> Result<ObjectKey>;

    /// Opens the editable-bone session of `armature`.
    fn begin_bone_edit(&mut self, armature: ArmatureKey) -> Result<()>;

    /// Creates a bone. Only valid inside an editable-bone session.
    fn create_bone(
        &mut self,
        armature: ArmatureKey,
        name: &str,
        matrix: Mat4,
        tail: Vec3,
        parent: Option<BoneKey>,
    ) -> Result<BoneKey>;

    /// Closes the editable-bone session of `armature`.
    fn end_bone_edit(&mut self, armature: ArmatureKey) -> Result<()>;

    /// Finds or creates `group` on `object` and adds `weight` to `vertex`.
    fn add_vertex_weight(&mut self, object: ObjectKey, group: &str, vertex: u32, weight: f32)
    -> Result<()>;

    fn set_parent(&mut self, child: ObjectKey, parent: ObjectKey) -> Result<()>;

    /// Deforms `object` by the armature held by `armature_object`.
    fn add_armature_modifier(&mut self, object: ObjectKey, armature_object: ObjectKey)
    -> Result<()>;
}

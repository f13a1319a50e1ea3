use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;
use crate::mesh::SubmeshBuffers;

/// Class id tags of the object kinds this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub i32);

impl ClassId {
    pub const GAME_OBJECT: ClassId = ClassId(1);
    pub const TRANSFORM: ClassId = ClassId(4);
    pub const MATERIAL: ClassId = ClassId(21);
    pub const TEXTURE_2D: ClassId = ClassId(28);
    pub const MESH: ClassId = ClassId(43);
    pub const AUDIO_CLIP: ClassId = ClassId(83);
    pub const SKINNED_MESH_RENDERER: ClassId = ClassId(137);

    /// Human readable name, used in log and error context.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GAME_OBJECT => "GameObject",
            Self::TRANSFORM => "Transform",
            Self::MATERIAL => "Material",
            Self::TEXTURE_2D => "Texture2D",
            Self::MESH => "Mesh",
            Self::AUDIO_CLIP => "AudioClip",
            Self::SKINNED_MESH_RENDERER => "SkinnedMeshRenderer",
            _ => "Object",
        }
    }
}

/// Identity of one object in the decoded asset graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub file_id: i64,
    pub path_id: i64,
    pub class_id: ClassId,
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}:{})", self.class_id.name(), self.file_id, self.path_id)
    }
}

/// Serialized object pointer, as stored inside records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PPtr {
    #[serde(rename = "m_FileID", default)]
    pub file_id: i64,
    #[serde(rename = "m_PathID", default)]
    pub path_id: i64,
}

impl PPtr {
    #[must_use]
    pub fn new(file_id: i64, path_id: i64) -> Self {
        Self { file_id, path_id }
    }

    /// A path id of zero marks an empty pointer.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.path_id == 0
    }
}

/// Decoded RGBA8 texture payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// The external parser that owns the decoded asset graph.
///
/// Records are handed over as generic field trees; [`crate::source::records`]
/// converts them into typed structs before anything downstream sees them.
pub trait AssetGraphProvider {
    /// All object references, optionally restricted to one class.
    fn object_refs(&self, filter: Option<ClassId>) -> Vec<ObjectRef>;

    /// The generic record of an object, or `None` if it cannot be dereferenced.
    fn record(&self, object: ObjectRef) -> Option<Value>;

    /// Resolves a pointer to the object it references.
    fn resolve(&self, ptr: PPtr) -> Option<ObjectRef>;

    /// Container (asset path) name associated with an object, if any.
    fn container_name(&self, object: ObjectRef) -> Option<String>;

    /// Number of submeshes stored in a mesh object.
    fn submesh_count(&self, mesh: ObjectRef) -> Result<usize>;

    /// Decoded flat buffers of one submesh.
    fn submesh_buffers(&self, mesh: ObjectRef, submesh: usize) -> Result<SubmeshBuffers>;

    /// Decoded image bytes of a texture object.
    fn texture_image(&self, texture: ObjectRef) -> Result<DecodedImage>;

    /// Raw container bytes of an audio clip.
    fn audio_data(&self, clip: ObjectRef) -> Result<Vec<u8>>;
}

//! Typed views of provider records.
//!
//! Field names follow the serialized layout of the source engine
//! (`m_Name`, `m_LocalRotation`, ...). Conversion happens once, at the
//! provider boundary, through [`fetch`].

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RigError};
use crate::source::provider::{AssetGraphProvider, ObjectRef, PPtr};

/// A record class with a stable display name for error context.
pub trait Record: DeserializeOwned {
    const CLASS: &'static str;
}

/// Dereferences `object` and decodes it as `T`.
pub fn fetch<T: Record>(provider: &dyn AssetGraphProvider, object: ObjectRef) -> Result<T> {
    let value = provider
        .record(object)
        .ok_or_else(|| RigError::unresolved(T::CLASS, object.to_string()))?;
    serde_json::from_value(value).map_err(|source| RigError::RecordSchema {
        class: T::CLASS,
        source,
    })
}

/// Resolves `ptr` and decodes the target as `T`.
pub fn fetch_ptr<T: Record>(
    provider: &dyn AssetGraphProvider,
    ptr: PPtr,
    context: &str,
) -> Result<(ObjectRef, T)> {
    if ptr.is_null() {
        return Err(RigError::unresolved(T::CLASS, format!("null pointer in {context}")));
    }
    let object = provider.resolve(ptr).ok_or_else(|| {
        RigError::unresolved(
            T::CLASS,
            format!("{}:{} from {context}", ptr.file_id, ptr.path_id),
        )
    })?;
    Ok((object, fetch(provider, object)?))
}

// ============================================================================
// Value types
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Vector3f {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }
}

impl From<Vector3f> for Vec3 {
    fn from(v: Vector3f) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Quaternionf {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternionf {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl From<Quaternionf> for Quat {
    fn from(q: Quaternionf) -> Self {
        Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

fn unit_scale() -> Vector3f {
    Vector3f { x: 1.0, y: 1.0, z: 1.0 }
}

/// Row/column addressed 4x4 matrix (`eRC`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct Matrix4x4f {
    pub e00: f32,
    pub e01: f32,
    pub e02: f32,
    pub e03: f32,
    pub e10: f32,
    pub e11: f32,
    pub e12: f32,
    pub e13: f32,
    pub e20: f32,
    pub e21: f32,
    pub e22: f32,
    pub e23: f32,
    pub e30: f32,
    pub e31: f32,
    pub e32: f32,
    pub e33: f32,
}

impl From<Matrix4x4f> for Mat4 {
    fn from(m: Matrix4x4f) -> Self {
        Mat4::from_cols(
            Vec4::new(m.e00, m.e10, m.e20, m.e30),
            Vec4::new(m.e01, m.e11, m.e21, m.e31),
            Vec4::new(m.e02, m.e12, m.e22, m.e32),
            Vec4::new(m.e03, m.e13, m.e23, m.e33),
        )
    }
}

impl From<Mat4> for Matrix4x4f {
    fn from(m: Mat4) -> Self {
        let c = m.to_cols_array_2d();
        Self {
            e00: c[0][0],
            e01: c[1][0],
            e02: c[2][0],
            e03: c[3][0],
            e10: c[0][1],
            e11: c[1][1],
            e12: c[2][1],
            e13: c[3][1],
            e20: c[0][2],
            e21: c[1][2],
            e22: c[2][2],
            e23: c[3][2],
            e30: c[0][3],
            e31: c[1][3],
            e32: c[2][3],
            e33: c[3][3],
        }
    }
}

// ============================================================================
// Object records
// ============================================================================

/// Any object that only needs its name read.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRecord {
    #[serde(rename = "m_Name", default)]
    pub name: String,
}

impl Record for NamedRecord {
    const CLASS: &'static str = "NamedObject";
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameObjectRecord {
    #[serde(rename = "m_Name", default)]
    pub name: String,
}

impl Record for GameObjectRecord {
    const CLASS: &'static str = "GameObject";
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformRecord {
    #[serde(rename = "m_GameObject")]
    pub game_object: PPtr,
    #[serde(rename = "m_LocalRotation", default)]
    pub local_rotation: Quaternionf,
    #[serde(rename = "m_LocalPosition", default)]
    pub local_position: Vector3f,
    #[serde(rename = "m_LocalScale", default = "unit_scale")]
    pub local_scale: Vector3f,
    #[serde(rename = "m_Children", default)]
    pub children: Vec<PPtr>,
    #[serde(rename = "m_Father", default)]
    pub father: PPtr,
}

impl Record for TransformRecord {
    const CLASS: &'static str = "Transform";
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkinnedMeshRendererRecord {
    #[serde(rename = "m_GameObject")]
    pub game_object: PPtr,
    #[serde(rename = "m_Mesh", default)]
    pub mesh: PPtr,
    #[serde(rename = "m_RootBone", default)]
    pub root_bone: PPtr,
    #[serde(rename = "m_Materials", default)]
    pub materials: Vec<PPtr>,
}

impl Record for SkinnedMeshRendererRecord {
    const CLASS: &'static str = "SkinnedMeshRenderer";
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeshRecord {
    #[serde(rename = "m_Name", default)]
    pub name: String,
    #[serde(rename = "m_BoneNameHashes", default)]
    pub bone_name_hashes: Vec<u32>,
    #[serde(rename = "m_BindPose", default)]
    pub bind_pose: Vec<Matrix4x4f>,
}

impl Record for MeshRecord {
    const CLASS: &'static str = "Mesh";
}

#[derive(Debug, Clone, Deserialize)]
pub struct TexEnv {
    #[serde(rename = "m_Texture", default)]
    pub texture: PPtr,
}

/// One `(slot name, texture env)` pair of the saved property map.
#[derive(Debug, Clone, Deserialize)]
pub struct TexEnvEntry {
    pub first: String,
    pub second: TexEnv,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SavedProperties {
    #[serde(rename = "m_TexEnvs", default)]
    pub tex_envs: Vec<TexEnvEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialRecord {
    #[serde(rename = "m_Name", default)]
    pub name: String,
    #[serde(rename = "m_SavedProperties", default)]
    pub saved_properties: SavedProperties,
}

impl Record for MaterialRecord {
    const CLASS: &'static str = "Material";
}

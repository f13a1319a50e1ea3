use glam::{Mat4, Vec3};
use rustc_hash::FxHashSet;
use serde::Serialize;
use slotmap::SlotMap;

use crate::errors::{Result, RigError};
use crate::host::{ArmatureKey, BoneKey, MeshKey, ObjectData, ObjectKey, SceneHost};
use crate::mesh::{MeshGeometry, VertexGroupSet};

#[derive(Debug, Clone)]
pub struct MeshResource {
    pub name: String,
    pub geometry: MeshGeometry,
}

#[derive(Debug, Clone)]
pub struct HostBone {
    pub armature: ArmatureKey,
    pub name: String,
    pub matrix: Mat4,
    pub tail: Vec3,
    pub parent: Option<BoneKey>,
}

#[derive(Debug, Clone)]
pub struct Armature {
    pub name: String,
    /// Bones in creation order.
    pub bones: Vec<BoneKey>,
    editing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Armature(ObjectKey),
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub data: ObjectData,
    pub parent: Option<ObjectKey>,
    pub vertex_groups: VertexGroupSet,
    pub modifiers: Vec<Modifier>,
}

/// Slotmap-backed scene host.
///
/// Object and resource names are made unique by appending `.001`, `.002`, ...
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub meshes: SlotMap<MeshKey, MeshResource>,
    pub armatures: SlotMap<ArmatureKey, Armature>,
    pub bones: SlotMap<BoneKey, HostBone>,
    pub objects: SlotMap<ObjectKey, SceneObject>,
    /// Objects linked into the active collection, in link order.
    pub collection: Vec<ObjectKey>,

    mesh_names: FxHashSet<String>,
    armature_names: FxHashSet<String>,
    object_names: FxHashSet<String>,
}

fn unique_name(used: &mut FxHashSet<String>, name: &str) -> String {
    let mut candidate = name.to_string();
    let mut counter = 0u32;
    while used.contains(&candidate) {
        counter += 1;
        candidate = format!("{name}.{counter:03}");
    }
    used.insert(candidate.clone());
    candidate
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn object_by_name(&self, name: &str) -> Option<(ObjectKey, &SceneObject)> {
        self.objects.iter().find(|(_, o)| o.name == name)
    }

    /// Bones of an armature in creation order.
    pub fn armature_bones(&self, armature: ArmatureKey) -> impl Iterator<Item = &HostBone> {
        self.armatures
            .get(armature)
            .map(|a| a.bones.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&k| self.bones.get(k))
    }

    fn object(&self, key: ObjectKey) -> Result<&SceneObject> {
        self.objects
            .get(key)
            .ok_or_else(|| RigError::HostAdapter(format!("unknown object {key:?}")))
    }

    fn armature_mut(&mut self, key: ArmatureKey) -> Result<&mut Armature> {
        self.armatures
            .get_mut(key)
            .ok_or_else(|| RigError::HostAdapter(format!("unknown armature {key:?}")))
    }

    /// Serializable snapshot of the scene.
    #[must_use]
    pub fn summary(&self) -> HostSummary {
        let objects = self
            .collection
            .iter()
            .filter_map(|&k| self.objects.get(k))
            .map(|o| ObjectSummary {
                name: o.name.clone(),
                kind: match o.data {
                    ObjectData::Mesh(_) => "mesh",
                    ObjectData::Armature(_) => "armature",
                },
                parent: o
                    .parent
                    .and_then(|p| self.objects.get(p))
                    .map(|p| p.name.clone()),
                vertex_groups: o
                    .vertex_groups
                    .iter()
                    .map(|g| GroupSummary {
                        name: g.name().to_string(),
                        vertices: g.len(),
                    })
                    .collect(),
                armature_modifiers: o
                    .modifiers
                    .iter()
                    .filter_map(|Modifier::Armature(target)| self.objects.get(*target))
                    .map(|t| t.name.clone())
                    .collect(),
            })
            .collect();

        let meshes = self
            .meshes
            .values()
            .map(|m| MeshSummary {
                name: m.name.clone(),
                vertices: m.geometry.vertex_count(),
                triangles: m.geometry.triangle_count(),
            })
            .collect();

        let armatures = self
            .armatures
            .iter()
            .map(|(key, a)| ArmatureSummary {
                name: a.name.clone(),
                bones: self
                    .armature_bones(key)
                    .map(|b| BoneSummary {
                        name: b.name.clone(),
                        parent: b
                            .parent
                            .and_then(|p| self.bones.get(p))
                            .map(|p| p.name.clone()),
                        matrix: b.matrix.to_cols_array(),
                    })
                    .collect(),
            })
            .collect();

        HostSummary {
            objects,
            meshes,
            armatures,
        }
    }
}

impl SceneHost for MemoryHost {
    fn create_mesh(&mut self, name: &str, geometry: &MeshGeometry) -> Result<MeshKey> {
        let name = unique_name(&mut self.mesh_names, name);
        Ok(self.meshes.insert(MeshResource {
            name,
            geometry: geometry.clone(),
        }))
    }

    fn create_armature(&mut self, name: &str) -> Result<ArmatureKey> {
        let name = unique_name(&mut self.armature_names, name);
        Ok(self.armatures.insert(Armature {
            name,
            bones: Vec::new(),
            editing: false,
        }))
    }

    fn create_object(&mut self, name: &str, data: ObjectData) -> Result<ObjectKey> {
        let exists = match data {
            ObjectData::Mesh(k) => self.meshes.contains_key(k),
            ObjectData::Armature(k) => self.armatures.contains_key(k),
        };
        if !exists {
            return Err(RigError::HostAdapter(format!(
                "object '{name}' wraps an unknown resource"
            )));
        }

        let name = unique_name(&mut self.object_names, name);
        let key = self.objects.insert(SceneObject {
            name,
            data,
            parent: None,
            vertex_groups: VertexGroupSet::new(),
            modifiers: Vec::new(),
        });
        self.collection.push(key);
        Ok(key)
    }

    fn begin_bone_edit(&mut self, armature: ArmatureKey) -> Result<()> {
        let armature = self.armature_mut(armature)?;
        if armature.editing {
            return Err(RigError::HostAdapter(format!(
                "armature '{}' is already in edit mode",
                armature.name
            )));
        }
        armature.editing = true;
        Ok(())
    }

    fn create_bone(
        &mut self,
        armature: ArmatureKey,
        name: &str,
        matrix: Mat4,
        tail: Vec3,
        parent: Option<BoneKey>,
    ) -> Result<BoneKey> {
        let target = self.armature_mut(armature)?;
        if !target.editing {
            return Err(RigError::HostAdapter(format!(
                "bone '{name}' created outside an edit session of '{}'",
                target.name
            )));
        }
        if let Some(parent) = parent {
            match self.bones.get(parent) {
                Some(p) if p.armature == armature => {}
                _ => {
                    return Err(RigError::HostAdapter(format!(
                        "parent of bone '{name}' is not part of this armature"
                    )));
                }
            }
        }

        let key = self.bones.insert(HostBone {
            armature,
            name: name.to_string(),
            matrix,
            tail,
            parent,
        });
        self.armature_mut(armature)?.bones.push(key);
        Ok(key)
    }

    fn end_bone_edit(&mut self, armature: ArmatureKey) -> Result<()> {
        let armature = self.armature_mut(armature)?;
        if !armature.editing {
            return Err(RigError::HostAdapter(format!(
                "armature '{}' is not in edit mode",
                armature.name
            )));
        }
        armature.editing = false;
        Ok(())
    }

    fn add_vertex_weight(
        &mut self,
        object: ObjectKey,
        group: &str,
        vertex: u32,
        weight: f32,
    ) -> Result<()> {
        let target = self.object(object)?;
        let ObjectData::Mesh(mesh) = target.data else {
            return Err(RigError::HostAdapter(format!(
                "vertex group '{group}' added to non-mesh object '{}'",
                target.name
            )));
        };
        let vertex_count = self.meshes.get(mesh).map_or(0, |m| m.geometry.vertex_count());
        if vertex as usize >= vertex_count {
            return Err(RigError::HostAdapter(format!(
                "vertex {vertex} out of range for '{}' ({vertex_count} vertices)",
                target.name
            )));
        }

        if let Some(target) = self.objects.get_mut(object) {
            target.vertex_groups.find_or_create(group).add(vertex, weight);
        }
        Ok(())
    }

    fn set_parent(&mut self, child: ObjectKey, parent: ObjectKey) -> Result<()> {
        self.object(parent)?;
        if child == parent {
            return Err(RigError::HostAdapter("object cannot parent itself".into()));
        }
        let target = self
            .objects
            .get_mut(child)
            .ok_or_else(|| RigError::HostAdapter(format!("unknown object {child:?}")))?;
        target.parent = Some(parent);
        Ok(())
    }

    fn add_armature_modifier(&mut self, object: ObjectKey, armature_object: ObjectKey) -> Result<()> {
        if !matches!(self.object(armature_object)?.data, ObjectData::Armature(_)) {
            return Err(RigError::HostAdapter(
                "armature modifier target is not an armature object".into(),
            ));
        }
        let target = self
            .objects
            .get_mut(object)
            .ok_or_else(|| RigError::HostAdapter(format!("unknown object {object:?}")))?;
        target.modifiers.push(Modifier::Armature(armature_object));
        Ok(())
    }
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HostSummary {
    pub objects: Vec<ObjectSummary>,
    pub meshes: Vec<MeshSummary>,
    pub armatures: Vec<ArmatureSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    pub name: String,
    pub kind: &'static str,
    pub parent: Option<String>,
    pub vertex_groups: Vec<GroupSummary>,
    pub armature_modifiers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub vertices: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeshSummary {
    pub name: String,
    pub vertices: usize,
    pub triangles: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArmatureSummary {
    pub name: String,
    pub bones: Vec<BoneSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoneSummary {
    pub name: String,
    pub parent: Option<String>,
    /// Column-major placement matrix.
    pub matrix: [f32; 16],
}

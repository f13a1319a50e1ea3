use crate::errors::Result;
use crate::host::{ArmatureKey, BoneKey, ObjectData, ObjectKey, SceneHost};
use crate::mesh::AssembledSubmesh;
use crate::skeleton::ReconstructedSkeleton;

/// Creates an armature object holding every bone of `skeleton`.
///
/// The editable-bone session is closed even when bone creation fails.
pub fn build_armature(
    host: &mut dyn SceneHost,
    name: &str,
    skeleton: &ReconstructedSkeleton,
) -> Result<ObjectKey> {
    let armature = host.create_armature(name)?;
    let object = host.create_object(name, ObjectData::Armature(armature))?;

    host.begin_bone_edit(armature)?;
    let created = create_bones(host, armature, skeleton);
    let closed = host.end_bone_edit(armature);
    created?;
    closed?;

    Ok(object)
}

fn create_bones(
    host: &mut dyn SceneHost,
    armature: ArmatureKey,
    skeleton: &ReconstructedSkeleton,
) -> Result<()> {
    let mut keys: Vec<BoneKey> = Vec::with_capacity(skeleton.len());
    for bone in &skeleton.bones {
        // Parents precede children in the bone list.
        let parent = bone.parent.and_then(|p| keys.get(p).copied());
        let key = host.create_bone(armature, &bone.name, bone.matrix, bone.tail, parent)?;
        keys.push(key);
    }
    Ok(())
}

/// Creates a mesh object and pushes its vertex groups.
pub fn build_mesh_object(host: &mut dyn SceneHost, submesh: &AssembledSubmesh) -> Result<ObjectKey> {
    let mesh = host.create_mesh(&submesh.name, &submesh.geometry)?;
    let object = host.create_object(&submesh.name, ObjectData::Mesh(mesh))?;

    for group in submesh.groups.iter() {
        for (vertex, weight) in group.iter() {
            host.add_vertex_weight(object, group.name(), vertex, weight)?;
        }
    }
    Ok(object)
}

/// Parents `mesh_object` to the armature object and adds the deform modifier.
pub fn link_to_armature(
    host: &mut dyn SceneHost,
    mesh_object: ObjectKey,
    armature_object: ObjectKey,
) -> Result<()> {
    host.set_parent(mesh_object, armature_object)?;
    host.add_armature_modifier(mesh_object, armature_object)
}

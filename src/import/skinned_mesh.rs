use glam::Mat4;
use serde::Serialize;

use crate::errors::{Result, RigError};
use crate::host::{ObjectKey, build_armature, build_mesh_object, link_to_armature};
use crate::import::ImportContext;
use crate::material::{SlotReport, extract_material_textures, resolve_material};
use crate::mesh::{AssembledSubmesh, BoneTable, assemble_submesh};
use crate::skeleton::{
    BoneTree, ReconstructMode, ReconstructedSkeleton, SkeletonOptions, SkeletonPathMap,
    find_root_transform, from_bind_poses, from_local_trs,
};
use crate::source::records::{
    GameObjectRecord, MeshRecord, SkinnedMeshRendererRecord, fetch, fetch_ptr,
};
use crate::source::{AssetGraphProvider, ObjectRef};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialReport {
    pub index: usize,
    pub name: Option<String>,
    pub slots: Vec<SlotReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinnedMeshReport {
    pub name: String,
    pub mesh: String,
    pub mode: ReconstructMode,
    /// Names of the created submesh objects, in submesh order.
    pub submeshes: Vec<String>,
    pub bones: usize,
    pub path_collisions: usize,
    pub materials: Vec<MaterialReport>,
}

/// Name of the GameObject owning `renderer`.
pub fn renderer_name(provider: &dyn AssetGraphProvider, renderer: ObjectRef) -> Result<String> {
    let record: SkinnedMeshRendererRecord = fetch(provider, renderer)?;
    let (_, game_object) =
        fetch_ptr::<GameObjectRecord>(provider, record.game_object, &renderer.to_string())?;
    Ok(game_object.name)
}

/// Picks the reconstruction mode from what the mesh exposes.
///
/// Bind poses are used when present and aligned with the bone table.
pub fn reconstruct_skeleton(
    tree: &BoneTree,
    mesh: &MeshRecord,
    bones: &BoneTable,
    options: &SkeletonOptions,
) -> Result<ReconstructedSkeleton> {
    if !mesh.bind_pose.is_empty() && mesh.bind_pose.len() == bones.len() {
        let bind_poses: Vec<(String, Mat4)> = bones
            .names()
            .iter()
            .cloned()
            .zip(mesh.bind_pose.iter().copied().map(Mat4::from))
            .collect();
        return from_bind_poses(tree, &bind_poses, options);
    }
    if !mesh.bind_pose.is_empty() {
        log::warn!(
            "Mesh '{}' has {} bind poses for {} bones, using local transforms",
            mesh.name,
            mesh.bind_pose.len(),
            bones.len()
        );
    }
    from_local_trs(tree, options)
}

/// Imports one skinned mesh renderer: submesh objects, armature, textures.
///
/// All geometry and the skeleton are built before the host is touched, so a
/// reconstruction failure leaves the scene unchanged. A host call failing
/// midway does not roll back: objects created before it stay in the scene.
pub fn import_skinned_mesh(
    ctx: &mut ImportContext<'_>,
    renderer: ObjectRef,
) -> Result<SkinnedMeshReport> {
    let provider = ctx.provider;
    let context = renderer.to_string();

    let record: SkinnedMeshRendererRecord = fetch(provider, renderer)?;
    let (_, game_object) =
        fetch_ptr::<GameObjectRecord>(provider, record.game_object, &context)?;
    let name = game_object.name;

    let root_bone = provider
        .resolve(record.root_bone)
        .ok_or_else(|| RigError::unresolved("root bone", format!("renderer '{name}' {context}")))?;
    let root = find_root_transform(provider, root_bone)?;
    let tree = BoneTree::load(provider, root)?;
    let paths = SkeletonPathMap::build(&tree)?;

    let (mesh_ref, mesh) =
        fetch_ptr::<MeshRecord>(provider, record.mesh, &format!("renderer '{name}' mesh"))?;
    let bones = BoneTable::resolve(&mesh.bone_name_hashes, &paths, &mesh.name)?;

    let submesh_count = provider.submesh_count(mesh_ref)?;
    let mut submeshes: Vec<AssembledSubmesh> = Vec::with_capacity(submesh_count);
    for index in 0..submesh_count {
        let buffers = provider.submesh_buffers(mesh_ref, index)?;
        submeshes.push(assemble_submesh(
            format!("{}_{index}", mesh.name),
            &buffers,
            &bones,
        )?);
    }

    let skeleton = reconstruct_skeleton(&tree, &mesh, &bones, &ctx.config.skeleton)?;
    log::debug!(
        "Renderer '{name}': {} submeshes, {} bones ({:?})",
        submeshes.len(),
        skeleton.len(),
        skeleton.mode
    );

    let mut objects: Vec<ObjectKey> = Vec::with_capacity(submeshes.len());
    for submesh in &submeshes {
        objects.push(build_mesh_object(ctx.host, submesh)?);
    }
    let armature = build_armature(ctx.host, &name, &skeleton)?;
    for &object in &objects {
        link_to_armature(ctx.host, object, armature)?;
    }

    let materials = import_materials(ctx, &name, &record);

    log::info!(
        "Imported skinned mesh '{name}' ({} submeshes, {} bones)",
        submeshes.len(),
        skeleton.len()
    );
    Ok(SkinnedMeshReport {
        name,
        mesh: mesh.name,
        mode: skeleton.mode,
        submeshes: submeshes.into_iter().map(|s| s.name).collect(),
        bones: skeleton.len(),
        path_collisions: paths.collisions(),
        materials,
    })
}

fn import_materials(
    ctx: &ImportContext<'_>,
    renderer_name: &str,
    record: &SkinnedMeshRendererRecord,
) -> Vec<MaterialReport> {
    record
        .materials
        .iter()
        .enumerate()
        .filter(|(_, ptr)| !ptr.is_null())
        .map(|(index, &ptr)| {
            let context = format!("renderer '{renderer_name}' material #{index}");
            match resolve_material(ctx.provider, ptr, &context) {
                Ok(material) => MaterialReport {
                    index,
                    slots: extract_material_textures(
                        ctx.provider,
                        &ctx.config.output_dir,
                        &material,
                    ),
                    name: Some(material.material_name),
                    error: None,
                },
                Err(err) => {
                    log::warn!("Skipping {context}: {err}");
                    MaterialReport {
                        index,
                        name: None,
                        slots: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect()
}

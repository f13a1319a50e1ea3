//! Import Pipeline Tests
//!
//! End-to-end runs over an in-memory asset graph: skinned mesh renderers,
//! audio clips, name filtering and per-object failure isolation.

mod common;

use serde_json::json;

use rigport::errors::{ErrorKind, Result, RigError};
use glam::{Mat4, Vec3};

use rigport::host::{ArmatureKey, BoneKey, MeshKey, ObjectData, ObjectKey, SceneHost};
use rigport::mesh::MeshGeometry;
use rigport::import::{ImportContext, ImportedObject, import_audio_clip, import_skinned_mesh};
use rigport::skeleton::{ReconstructMode, fix_axes};
use rigport::source::{ClassId, MemoryProvider};
use rigport::{BatchImporter, BundleSource, ImportConfig, MemoryHost};

use common::{CharacterOptions, approx_mat, character, object, world_matrices};

fn config(out: &std::path::Path) -> ImportConfig {
    ImportConfig::new(BundleSource::Directory("unused".into()), out)
}

// ============================================================================
// Skinned meshes
// ============================================================================

#[test]
fn skinned_mesh_builds_objects_armature_and_textures() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions::default());
    let config = config(dir.path());
    let mut host = MemoryHost::new();

    let report = {
        let mut ctx = ImportContext::new(&provider, &mut host, &config);
        import_skinned_mesh(&mut ctx, object(common::RENDERER, ClassId::SKINNED_MESH_RENDERER))
            .unwrap()
    };

    assert_eq!(report.name, "Hero");
    assert_eq!(report.mesh, "Body");
    assert_eq!(report.mode, ReconstructMode::BindPose);
    assert_eq!(report.submeshes, ["Body_0"]);
    assert_eq!(report.bones, 3);
    assert_eq!(report.materials.len(), 1);
    assert_eq!(report.materials[0].name.as_deref(), Some("Skin"));
    assert!(dir.path().join("Skin").join("body_MainTex.png").exists());

    let (mesh_key, mesh_object) = host.object_by_name("Body_0").unwrap();
    let (armature_key, armature_object) = host.object_by_name("Hero").unwrap();
    assert_eq!(mesh_object.parent, Some(armature_key));

    // Vertex 0 -> spine at 0.5, vertex 1 -> root at 1.0, zero weight skipped.
    let groups = &mesh_object.vertex_groups;
    assert_eq!(groups.len(), 2);
    assert_eq!(groups.get("spine").unwrap().weight(0), Some(0.5));
    assert_eq!(groups.get("root").unwrap().weight(1), Some(1.0));
    assert!(groups.get("head").is_none());

    let ObjectData::Armature(armature) = armature_object.data else {
        panic!("expected armature data");
    };
    let bones: Vec<_> = host.armature_bones(armature).collect();
    let names: Vec<&str> = bones.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["root", "spine", "head"]);
    for (bone, world) in bones.iter().zip(world_matrices()) {
        assert!(approx_mat(bone.matrix, world), "bone {}", bone.name);
    }
    assert!(host.objects.contains_key(mesh_key));
}

#[test]
fn mesh_without_bind_poses_uses_local_transforms() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions {
        bind_poses: false,
        ..Default::default()
    });
    let config = config(dir.path());
    let mut host = MemoryHost::new();

    let report = {
        let mut ctx = ImportContext::new(&provider, &mut host, &config);
        import_skinned_mesh(&mut ctx, object(common::RENDERER, ClassId::SKINNED_MESH_RENDERER))
            .unwrap()
    };
    assert_eq!(report.mode, ReconstructMode::LocalTrs);

    let (_, armature_object) = host.object_by_name("Hero").unwrap();
    let ObjectData::Armature(armature) = armature_object.data else {
        panic!("expected armature data");
    };
    for (bone, world) in host.armature_bones(armature).zip(world_matrices()) {
        assert!(approx_mat(bone.matrix, fix_axes(world)), "bone {}", bone.name);
    }
}

#[test]
fn unresolved_bone_hash_aborts_before_touching_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider = character(CharacterOptions::default());
    provider.insert_record(
        common::BODY_MESH,
        ClassId::MESH,
        json!({ "m_Name": "Body", "m_BoneNameHashes": [0xDEAD_BEEFu32] }),
    );
    let config = config(dir.path());
    let mut host = MemoryHost::new();

    let err = {
        let mut ctx = ImportContext::new(&provider, &mut host, &config);
        import_skinned_mesh(&mut ctx, object(common::RENDERER, ClassId::SKINNED_MESH_RENDERER))
            .unwrap_err()
    };
    assert!(matches!(err, RigError::UnresolvedReference { .. }));
    assert!(host.objects.is_empty());
}

#[test]
fn missing_texture_is_a_slot_failure_not_an_object_failure() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions {
        texture: false,
        ..Default::default()
    });
    let config = config(dir.path());
    let mut host = MemoryHost::new();

    let report = {
        let mut ctx = ImportContext::new(&provider, &mut host, &config);
        import_skinned_mesh(&mut ctx, object(common::RENDERER, ClassId::SKINNED_MESH_RENDERER))
            .unwrap()
    };
    let slots = &report.materials[0].slots;
    assert_eq!(slots.len(), 2);
    assert!(matches!(
        slots[0].outcome,
        rigport::material::SlotOutcome::Failed { .. }
    ));
}

/// Host that refuses armatures and forwards everything else.
struct NoArmatureHost(MemoryHost);

impl SceneHost for NoArmatureHost {
    fn create_mesh(&mut self, name: &str, geometry: &MeshGeometry) -> Result<MeshKey> {
        self.0.create_mesh(name, geometry)
    }

    fn create_armature(&mut self, name: &str) -> Result<ArmatureKey> {
        Err(RigError::HostAdapter(format!("armature '{name}' refused")))
    }

    fn create_object(&mut self, name: &str, data: ObjectData) -> Result<ObjectKey> {
        self.0.create_object(name, data)
    }

    fn begin_bone_edit(&mut self, armature: ArmatureKey) -> Result<()> {
        self.0.begin_bone_edit(armature)
    }

    fn create_bone(
        &mut self,
        armature: ArmatureKey,
        name: &str,
        matrix: Mat4,
        tail: Vec3,
        parent: Option<BoneKey>,
    ) -> Result<BoneKey> {
        self.0.create_bone(armature, name, matrix, tail, parent)
    }

    fn end_bone_edit(&mut self, armature: ArmatureKey) -> Result<()> {
        self.0.end_bone_edit(armature)
    }

    fn add_vertex_weight(
        &mut self,
        object: ObjectKey,
        group: &str,
        vertex: u32,
        weight: f32,
    ) -> Result<()> {
        self.0.add_vertex_weight(object, group, vertex, weight)
    }

    fn set_parent(&mut self, child: ObjectKey, parent: ObjectKey) -> Result<()> {
        self.0.set_parent(child, parent)
    }

    fn add_armature_modifier(&mut self, object: ObjectKey, armature_object: ObjectKey) -> Result<()> {
        self.0.add_armature_modifier(object, armature_object)
    }
}

#[test]
fn host_failure_after_mesh_objects_keeps_them_and_fails_the_renderer() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions::default());
    let config = config(dir.path());
    let mut host = NoArmatureHost(MemoryHost::new());

    let err = {
        let mut ctx = ImportContext::new(&provider, &mut host, &config);
        import_skinned_mesh(&mut ctx, object(common::RENDERER, ClassId::SKINNED_MESH_RENDERER))
            .unwrap_err()
    };
    assert_eq!(err.kind(), ErrorKind::HostAdapterFailure);

    // No rollback: the submesh object exists, unparented.
    let (_, mesh_object) = host.0.object_by_name("Body_0").unwrap();
    assert_eq!(mesh_object.parent, None);
    assert!(host.0.object_by_name("Hero").is_none());
}

// ============================================================================
// Audio clips
// ============================================================================

#[test]
fn audio_clip_is_written_under_its_container_path() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions::default());
    let config = config(dir.path());
    let mut host = MemoryHost::new();
    let ctx = ImportContext::new(&provider, &mut host, &config);

    let report = import_audio_clip(&ctx, object(common::CLIP, ClassId::AUDIO_CLIP)).unwrap();
    let sfx = dir.path().join("assets").join("sfx");
    assert_eq!(report.name, "sfx");
    assert_eq!(
        report.extract.written,
        vec![sfx.join("clip_hit.wav"), sfx.join("clip_loop.wav")]
    );
}

#[test]
fn corrupt_audio_bank_fails_the_clip() {
    let dir = tempfile::tempdir().unwrap();
    let mut provider = character(CharacterOptions::default());
    let clip = object(common::CLIP, ClassId::AUDIO_CLIP);
    provider.set_audio(clip, b"RIFF....").unwrap();
    let config = config(dir.path());
    let mut host = MemoryHost::new();
    let ctx = ImportContext::new(&provider, &mut host, &config);

    let err = import_audio_clip(&ctx, clip).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContainerParseFailure);
}

// ============================================================================
// Batch
// ============================================================================

#[test]
fn batch_imports_every_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions::default());
    let config = config(dir.path());
    let mut host = MemoryHost::new();

    let report = BatchImporter::new(&provider, &mut host, &config)
        .run()
        .unwrap();
    assert_eq!(report.imported.len(), 2);
    assert_eq!(report.skipped, 0);
    assert!(report.failures.is_empty());
    assert!(matches!(report.imported[0], ImportedObject::SkinnedMesh(_)));
    assert!(matches!(report.imported[1], ImportedObject::AudioClip(_)));
}

#[test]
fn batch_name_filter_skips_others() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions::default());
    let config = config(dir.path()).with_names(["sfx"]);
    let mut host = MemoryHost::new();

    let report = BatchImporter::new(&provider, &mut host, &config)
        .run()
        .unwrap();
    assert_eq!(report.imported.len(), 1);
    assert_eq!(report.skipped, 1);
    assert!(host.objects.is_empty());
}

fn provider_with_broken_renderer() -> MemoryProvider {
    let mut provider = character(CharacterOptions::default());
    // A second renderer whose root bone does not exist.
    provider.insert_record(2, ClassId::GAME_OBJECT, json!({ "m_Name": "Ghost" }));
    provider.insert_record(
        61,
        ClassId::SKINNED_MESH_RENDERER,
        json!({
            "m_GameObject": common::pptr(2),
            "m_Mesh": common::pptr(common::BODY_MESH),
            "m_RootBone": common::pptr(999),
        }),
    );
    provider
}

#[test]
fn batch_continues_past_failures() {
    let dir = tempfile::tempdir().unwrap();
    let provider = provider_with_broken_renderer();
    let config = config(dir.path());
    let mut host = MemoryHost::new();

    let report = BatchImporter::new(&provider, &mut host, &config)
        .run()
        .unwrap();
    assert_eq!(report.imported.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name.as_deref(), Some("Ghost"));
    assert_eq!(
        report.failure_counts().get(&ErrorKind::UnresolvedReference),
        Some(&1)
    );
}

#[test]
fn batch_fail_fast_returns_first_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = provider_with_broken_renderer();
    let config = config(dir.path()).with_continue_on_error(false);
    let mut host = MemoryHost::new();

    let result = BatchImporter::new(&provider, &mut host, &config).run();
    assert!(matches!(result, Err(RigError::UnresolvedReference { .. })));
}

#[test]
fn graph_dump_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let provider = character(CharacterOptions::default());
    let dump_dir = dir.path().join("dumps");
    std::fs::create_dir_all(dump_dir.join("nested")).unwrap();
    std::fs::write(
        dump_dir.join("nested").join("scene.json"),
        serde_json::to_string(&provider.to_dump()).unwrap(),
    )
    .unwrap();

    let loaded = MemoryProvider::load_dir(&dump_dir).unwrap();
    let config = config(&dir.path().join("out"));
    let mut host = MemoryHost::new();
    let report = BatchImporter::new(&loaded, &mut host, &config)
        .run()
        .unwrap();
    assert_eq!(report.imported.len(), 2);
    assert!(dir.path().join("out").join("Skin").join("body_MainTex.png").exists());
}

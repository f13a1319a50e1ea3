//! Shared fixtures: in-memory asset graphs and synthetic sample banks.

#![allow(dead_code)]

use glam::{Mat4, Quat, Vec3};
use serde_json::{Value, json};
use smallvec::smallvec;

use rigport::mesh::{BoneInfluence, SubmeshBuffers};
use rigport::skeleton::bone_path_hash;
use rigport::source::records::Matrix4x4f;
use rigport::source::{ClassId, DecodedImage, MemoryProvider, ObjectRef};

pub const EPSILON: f32 = 1e-4;

pub fn approx_mat(a: Mat4, b: Mat4) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

pub fn pptr(path_id: i64) -> Value {
    json!({ "m_FileID": 0, "m_PathID": path_id })
}

// ============================================================================
// Sample banks
// ============================================================================

pub const FSB_PCM16: u32 = 2;
pub const FSB_MPEG: u32 = 11;
pub const FSB_VORBIS: u32 = 15;

/// Builds a version 1 FSB5 bank, 44100 Hz mono.
///
/// Payload lengths should be multiples of 16 so sample ranges stay exact.
pub fn fsb5_bank(mode: u32, samples: &[(&str, &[u8])], with_names: bool) -> Vec<u8> {
    let mut headers = Vec::new();
    let mut data = Vec::new();
    for (_, payload) in samples {
        assert_eq!(data.len() % 16, 0);
        let offset = (data.len() / 16) as u64;
        let frames = (payload.len() / 2) as u64;
        let raw: u64 = (8 << 1) | (offset << 6) | (frames << 34);
        headers.extend_from_slice(&raw.to_le_bytes());
        data.extend_from_slice(payload);
        while data.len() % 16 != 0 {
            data.push(0);
        }
    }

    let mut names = Vec::new();
    if with_names {
        let mut strings = Vec::new();
        let table_len = 4 * samples.len();
        for (name, _) in samples {
            names.extend_from_slice(&((table_len + strings.len()) as u32).to_le_bytes());
            strings.extend_from_slice(name.as_bytes());
            strings.push(0);
        }
        names.extend_from_slice(&strings);
    }

    let mut bank = Vec::new();
    bank.extend_from_slice(b"FSB5");
    for field in [
        1,
        samples.len() as u32,
        headers.len() as u32,
        names.len() as u32,
        data.len() as u32,
        mode,
    ] {
        bank.extend_from_slice(&field.to_le_bytes());
    }
    bank.extend_from_slice(&[0u8; 32]);
    assert_eq!(bank.len(), 0x3C);

    bank.extend_from_slice(&headers);
    bank.extend_from_slice(&names);
    bank.extend_from_slice(&data);
    bank
}

pub fn pcm_payload(seed: u8) -> Vec<u8> {
    (0..32u8).map(|i| i.wrapping_mul(7).wrapping_add(seed)).collect()
}

// ============================================================================
// Skinned character
// ============================================================================

pub const HERO_GO: i64 = 1;
pub const ROOT_TF: i64 = 20;
pub const SPINE_TF: i64 = 21;
pub const HEAD_TF: i64 = 22;
pub const BODY_MESH: i64 = 30;
pub const SKIN_MATERIAL: i64 = 40;
pub const BODY_TEXTURE: i64 = 50;
pub const RENDERER: i64 = 60;
pub const CLIP: i64 = 70;

pub fn root_local() -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::ONE, Quat::IDENTITY, Vec3::ZERO)
}

pub fn spine_local() -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::ONE,
        Quat::from_rotation_z(0.3),
        Vec3::new(0.0, 1.0, 0.0),
    )
}

pub fn head_local() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0))
}

pub fn world_matrices() -> [Mat4; 3] {
    let root = root_local();
    let spine = root * spine_local();
    let head = spine * head_local();
    [root, spine, head]
}

fn transform(go: i64, father: i64, children: &[i64], pos: Vec3, rot: Quat) -> Value {
    json!({
        "m_GameObject": pptr(go),
        "m_LocalPosition": { "x": pos.x, "y": pos.y, "z": pos.z },
        "m_LocalRotation": { "x": rot.x, "y": rot.y, "z": rot.z, "w": rot.w },
        "m_LocalScale": { "x": 1.0, "y": 1.0, "z": 1.0 },
        "m_Children": children.iter().map(|&c| pptr(c)).collect::<Vec<_>>(),
        "m_Father": pptr(father),
    })
}

/// Four vertices, two triangles; vertex 0 weighted 0.5 to bone table slot 1.
pub fn quad_buffers() -> SubmeshBuffers {
    SubmeshBuffers {
        vertices: vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
        normals: vec![
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, //
            1.0, 0.0, 0.0,
        ],
        uvs: vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        bone_weights: vec![
            smallvec![BoneInfluence::new(1, 0.5)],
            smallvec![BoneInfluence::new(0, 1.0)],
            smallvec![BoneInfluence::new(2, 0.0)],
            smallvec![],
        ],
    }
}

/// Options for [`character`].
#[derive(Debug, Clone, Copy)]
pub struct CharacterOptions {
    pub bind_poses: bool,
    pub texture: bool,
    pub clip: bool,
}

impl Default for CharacterOptions {
    fn default() -> Self {
        Self {
            bind_poses: true,
            texture: true,
            clip: true,
        }
    }
}

/// A "Hero" renderer skinned to `root/spine/head`, a "Skin" material and an
/// audio clip with two PCM16 samples.
pub fn character(options: CharacterOptions) -> MemoryProvider {
    let mut provider = MemoryProvider::new();

    provider.insert_record(HERO_GO, ClassId::GAME_OBJECT, json!({ "m_Name": "Hero" }));
    for (id, name) in [(10, "root"), (11, "spine"), (12, "head")] {
        provider.insert_record(id, ClassId::GAME_OBJECT, json!({ "m_Name": name }));
    }

    provider.insert_record(
        ROOT_TF,
        ClassId::TRANSFORM,
        transform(10, 0, &[SPINE_TF], Vec3::ZERO, Quat::IDENTITY),
    );
    provider.insert_record(
        SPINE_TF,
        ClassId::TRANSFORM,
        transform(
            11,
            ROOT_TF,
            &[HEAD_TF],
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_rotation_z(0.3),
        ),
    );
    provider.insert_record(
        HEAD_TF,
        ClassId::TRANSFORM,
        transform(12, SPINE_TF, &[], Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY),
    );

    let hashes = ["root", "root/spine", "root/spine/head"].map(bone_path_hash);
    let bind_pose: Vec<Value> = if options.bind_poses {
        world_matrices()
            .iter()
            .map(|m| serde_json::to_value(Matrix4x4f::from(m.inverse())).unwrap())
            .collect()
    } else {
        Vec::new()
    };
    let mesh = provider.insert_record(
        BODY_MESH,
        ClassId::MESH,
        json!({
            "m_Name": "Body",
            "m_BoneNameHashes": hashes,
            "m_BindPose": bind_pose,
        }),
    );
    provider.set_submeshes(mesh, vec![quad_buffers()]).unwrap();

    provider.insert_record(
        SKIN_MATERIAL,
        ClassId::MATERIAL,
        json!({
            "m_Name": "Skin",
            "m_SavedProperties": {
                "m_TexEnvs": [
                    { "first": "_MainTex", "second": { "m_Texture": pptr(BODY_TEXTURE) } },
                    { "first": "_BumpMap", "second": { "m_Texture": pptr(0) } },
                ]
            }
        }),
    );
    if options.texture {
        let texture = provider.insert_record(
            BODY_TEXTURE,
            ClassId::TEXTURE_2D,
            json!({ "m_Name": "body" }),
        );
        provider.set_image(texture, &checker_image()).unwrap();
    }

    provider.insert_record(
        RENDERER,
        ClassId::SKINNED_MESH_RENDERER,
        json!({
            "m_GameObject": pptr(HERO_GO),
            "m_Mesh": pptr(BODY_MESH),
            "m_RootBone": pptr(SPINE_TF),
            "m_Materials": [pptr(SKIN_MATERIAL)],
        }),
    );

    if options.clip {
        let clip = provider.insert_record(CLIP, ClassId::AUDIO_CLIP, json!({ "m_Name": "sfx" }));
        let hit = pcm_payload(1);
        let looped = pcm_payload(2);
        provider
            .set_audio(
                clip,
                &fsb5_bank(
                    FSB_PCM16,
                    &[("hit", hit.as_slice()), ("loop", looped.as_slice())],
                    true,
                ),
            )
            .unwrap();
        provider.set_container(clip, "assets/sfx/clip").unwrap();
    }

    provider
}

pub fn checker_image() -> DecodedImage {
    DecodedImage {
        width: 2,
        height: 2,
        rgba: vec![
            255, 255, 255, 255, 0, 0, 0, 255, //
            0, 0, 0, 255, 255, 255, 255, 255,
        ],
    }
}

pub fn object(path_id: i64, class_id: ClassId) -> ObjectRef {
    ObjectRef {
        file_id: 0,
        path_id,
        class_id,
    }
}

//! Mesh Assembly Tests
//!
//! Tests for:
//! - Triangle/polygon layout from index buffers
//! - Per-loop normal and UV expansion
//! - Vertex group weight accumulation and zero-weight skipping
//! - Bone table resolution through the path map
//! - Buffer validation

mod common;

use glam::{Vec2, Vec3};
use smallvec::smallvec;

use rigport::errors::RigError;
use rigport::mesh::{
    BoneInfluence, BoneTable, SubmeshBuffers, VertexGroup, VertexGroupSet, assemble_submesh,
    assign_weights,
};
use rigport::skeleton::{BoneNode, BoneTree, LocalTrs, SkeletonPathMap, bone_path_hash};

use common::{EPSILON, quad_buffers};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn bones() -> BoneTable {
    BoneTable::from_names(vec!["root".into(), "spine".into(), "head".into()])
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn index_buffer_of_3k_yields_k_triangles() {
    for k in [0usize, 1, 2, 7] {
        let buffers = SubmeshBuffers {
            vertices: vec![0.0; 9],
            indices: (0..k * 3).map(|i| (i % 3) as u32).collect(),
            ..Default::default()
        };
        let mesh = assemble_submesh("m", &buffers, &bones()).unwrap();

        assert_eq!(mesh.geometry.triangle_count(), k);
        for (i, polygon) in mesh.geometry.polygons.iter().enumerate() {
            assert_eq!(polygon.loop_start as usize, i * 3);
            assert_eq!(polygon.loop_total, 3);
            assert!(polygon.smooth);
        }
    }
}

#[test]
fn quad_scenario_two_triangles_one_group() {
    let buffers = SubmeshBuffers {
        bone_weights: vec![
            smallvec![BoneInfluence::new(1, 0.5)],
            smallvec![],
            smallvec![],
            smallvec![],
        ],
        ..quad_buffers()
    };
    let mesh = assemble_submesh("Body_0", &buffers, &bones()).unwrap();

    assert_eq!(mesh.geometry.vertex_count(), 4);
    assert_eq!(mesh.geometry.triangle_count(), 2);
    assert_eq!(mesh.groups.len(), 1);

    let spine = mesh.groups.get("spine").unwrap();
    assert_eq!(spine.len(), 1);
    assert!(approx(spine.weight(0).unwrap(), 0.5));
}

#[test]
fn positions_are_copied_verbatim() {
    let mesh = assemble_submesh("m", &quad_buffers(), &bones()).unwrap();
    assert_eq!(
        mesh.geometry.positions,
        vec![
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    );
    assert_eq!(mesh.geometry.loops, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn normals_and_uvs_are_expanded_per_loop() {
    let mesh = assemble_submesh("m", &quad_buffers(), &bones()).unwrap();
    let geometry = &mesh.geometry;

    assert_eq!(geometry.loop_normals.len(), 6);
    assert_eq!(geometry.loop_uvs.len(), 6);
    // Loop 4 references vertex 2, loop 5 references vertex 3.
    assert_eq!(geometry.loop_normals[4], Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(geometry.loop_normals[5], Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(geometry.loop_uvs[3], Vec2::new(0.0, 0.0));
    assert_eq!(geometry.loop_uvs[5], Vec2::new(0.0, 1.0));
}

#[test]
fn missing_channels_stay_empty() {
    let buffers = SubmeshBuffers {
        normals: Vec::new(),
        uvs: Vec::new(),
        bone_weights: Vec::new(),
        ..quad_buffers()
    };
    let mesh = assemble_submesh("m", &buffers, &bones()).unwrap();
    assert!(mesh.geometry.loop_normals.is_empty());
    assert!(mesh.geometry.loop_uvs.is_empty());
    assert!(mesh.groups.is_empty());
}

// ============================================================================
// Weights
// ============================================================================

#[test]
fn vertex_group_weights_accumulate() {
    let mut group = VertexGroup::new("spine");
    group.add(3, 0.25);
    group.add(3, 0.5);
    assert!(approx(group.weight(3).unwrap(), 0.75));
    assert_eq!(group.len(), 1);
}

#[test]
fn repeated_influences_accumulate_without_normalizing() {
    let buffers = SubmeshBuffers {
        vertices: vec![0.0; 3],
        bone_weights: vec![smallvec![
            BoneInfluence::new(0, 0.75),
            BoneInfluence::new(0, 0.5),
            BoneInfluence::new(1, 0.5),
        ]],
        ..Default::default()
    };
    let groups = assign_weights("m", &buffers, &bones()).unwrap();

    assert!(approx(groups.get("root").unwrap().weight(0).unwrap(), 1.25));
    assert!(approx(groups.total_weight(0), 1.75));
}

#[test]
fn zero_weights_never_create_entries() {
    let buffers = SubmeshBuffers {
        vertices: vec![0.0; 6],
        bone_weights: vec![
            smallvec![BoneInfluence::new(0, 0.0), BoneInfluence::new(2, 0.0)],
            smallvec![BoneInfluence::new(1, 1.0)],
        ],
        ..Default::default()
    };
    let groups = assign_weights("m", &buffers, &bones()).unwrap();

    assert_eq!(groups.groups_of(0).count(), 0);
    assert!(groups.get("root").is_none());
    assert!(groups.get("head").is_none());
    assert_eq!(groups.len(), 1);
}

#[test]
fn groups_are_created_in_first_use_order() {
    let mut set = VertexGroupSet::new();
    set.find_or_create("b").add(0, 1.0);
    set.find_or_create("a").add(0, 1.0);
    set.find_or_create("b").add(1, 1.0);

    let names: Vec<&str> = set.iter().map(VertexGroup::name).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(set.get("b").unwrap().len(), 2);
}

#[test]
fn out_of_range_bone_index_is_unresolved() {
    let buffers = SubmeshBuffers {
        vertices: vec![0.0; 3],
        bone_weights: vec![smallvec![BoneInfluence::new(9, 1.0)]],
        ..Default::default()
    };
    assert!(matches!(
        assign_weights("m", &buffers, &bones()),
        Err(RigError::UnresolvedReference { .. })
    ));
}

// ============================================================================
// Bone table
// ============================================================================

#[test]
fn bone_table_resolves_hashes_to_names() {
    let mut tree = BoneTree::new(BoneNode::new("root", LocalTrs::default()));
    let spine = tree.add_child(0, BoneNode::new("spine", LocalTrs::default()));
    tree.add_child(spine, BoneNode::new("head", LocalTrs::default()));
    let paths = SkeletonPathMap::build(&tree).unwrap();

    let hashes = ["root/spine/head", "root"].map(bone_path_hash);
    let table = BoneTable::resolve(&hashes, &paths, "Body").unwrap();
    assert_eq!(table.names(), ["head", "root"]);
    assert_eq!(table.name(0), Some("head"));
    assert_eq!(table.name(2), None);
}

#[test]
fn bone_table_unresolved_hash_fails_the_mesh() {
    let tree = BoneTree::new(BoneNode::new("root", LocalTrs::default()));
    let paths = SkeletonPathMap::build(&tree).unwrap();

    let err = BoneTable::resolve(&[bone_path_hash("root"), 0xDEAD_BEEF], &paths, "Body")
        .unwrap_err();
    assert!(matches!(err, RigError::UnresolvedReference { .. }));
    assert!(err.to_string().contains("Body"));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn index_buffer_must_be_multiple_of_three() {
    let buffers = SubmeshBuffers {
        vertices: vec![0.0; 9],
        indices: vec![0, 1],
        ..Default::default()
    };
    assert!(matches!(
        assemble_submesh("m", &buffers, &bones()),
        Err(RigError::InvalidBuffers(_))
    ));
}

#[test]
fn index_out_of_range_is_rejected() {
    let buffers = SubmeshBuffers {
        indices: vec![0, 1, 4],
        ..quad_buffers()
    };
    assert!(matches!(
        assemble_submesh("m", &buffers, &bones()),
        Err(RigError::InvalidBuffers(_))
    ));
}

#[test]
fn normals_must_match_vertex_count() {
    let buffers = SubmeshBuffers {
        normals: vec![0.0; 6],
        ..quad_buffers()
    };
    assert!(matches!(
        assemble_submesh("m", &buffers, &bones()),
        Err(RigError::InvalidBuffers(_))
    ));
}

#[test]
fn degenerate_triangles_pass_through() {
    let buffers = SubmeshBuffers {
        indices: vec![0, 0, 0],
        ..quad_buffers()
    };
    let mesh = assemble_submesh("m", &buffers, &bones()).unwrap();
    assert_eq!(mesh.geometry.triangle_count(), 1);
}

#[test]
fn buffers_deserialize_from_camel_case_json() {
    let json = serde_json::json!({
        "vertices": [0.0, 0.0, 0.0],
        "indices": [0, 0, 0],
        "boneWeights": [[{ "bone": 1, "weight": 0.5 }]],
    });
    let buffers: SubmeshBuffers = serde_json::from_value(json).unwrap();
    assert_eq!(buffers.bone_weights[0][0], BoneInfluence::new(1, 0.5));
    assert!(buffers.normals.is_empty());
}

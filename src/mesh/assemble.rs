use glam::{Vec2, Vec3};

use crate::errors::{Result, RigError};
use crate::mesh::bone_table::BoneTable;
use crate::mesh::buffers::SubmeshBuffers;
use crate::mesh::vertex_group::VertexGroupSet;

/// One face of the assembled mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polygon {
    pub loop_start: u32,
    pub loop_total: u32,
    pub smooth: bool,
}

/// Indexed triangle geometry with per-loop attributes.
///
/// `loops[i]` is the unique vertex referenced by loop corner `i`;
/// `loop_normals` and `loop_uvs` are parallel to `loops` (or empty when the
/// source has no such channel).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub loops: Vec<u32>,
    pub polygons: Vec<Polygon>,
    pub loop_normals: Vec<Vec3>,
    pub loop_uvs: Vec<Vec2>,
}

impl MeshGeometry {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.polygons.len()
    }
}

/// Output of [`assemble_submesh`].
#[derive(Debug, Clone)]
pub struct AssembledSubmesh {
    pub name: String,
    pub geometry: MeshGeometry,
    pub groups: VertexGroupSet,
}

/// Converts flat submesh buffers into indexed geometry plus vertex groups.
pub fn assemble_submesh(
    name: impl Into<String>,
    buffers: &SubmeshBuffers,
    bones: &BoneTable,
) -> Result<AssembledSubmesh> {
    let name = name.into();
    buffers.validate()?;

    let positions = buffers
        .vertices
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    let loops = buffers.indices.clone();

    let polygons = (0..buffers.triangle_count() as u32)
        .map(|tri| Polygon {
            loop_start: tri * 3,
            loop_total: 3,
            smooth: true,
        })
        .collect();

    // Per-vertex channels materialized per loop corner.
    let loop_normals = if buffers.normals.is_empty() {
        Vec::new()
    } else {
        loops
            .iter()
            .map(|&v| {
                let i = v as usize * 3;
                Vec3::new(buffers.normals[i], buffers.normals[i + 1], buffers.normals[i + 2])
            })
            .collect()
    };
    let loop_uvs = if buffers.uvs.is_empty() {
        Vec::new()
    } else {
        loops
            .iter()
            .map(|&v| {
                let i = v as usize * 2;
                Vec2::new(buffers.uvs[i], buffers.uvs[i + 1])
            })
            .collect()
    };

    let groups = assign_weights(&name, buffers, bones)?;

    Ok(AssembledSubmesh {
        name,
        geometry: MeshGeometry {
            positions,
            loops,
            polygons,
            loop_normals,
            loop_uvs,
        },
        groups,
    })
}

/// Builds vertex groups from the per-unique-vertex weight table.
///
/// Zero weights are skipped; everything else accumulates unnormalized.
pub fn assign_weights(
    mesh_name: &str,
    buffers: &SubmeshBuffers,
    bones: &BoneTable,
) -> Result<VertexGroupSet> {
    let mut groups = VertexGroupSet::new();

    for (vertex, row) in buffers.bone_weights.iter().enumerate() {
        for influence in row {
            if influence.weight == 0.0 {
                continue;
            }
            let bone_name = bones.name(influence.bone).ok_or_else(|| {
                RigError::unresolved(
                    "bone table index",
                    format!(
                        "{} at vertex {vertex} of '{mesh_name}' (table has {} bones)",
                        influence.bone,
                        bones.len()
                    ),
                )
            })?;
            groups
                .find_or_create(bone_name)
                .add(vertex as u32, influence.weight);
        }
    }

    Ok(groups)
}

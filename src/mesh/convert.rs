//! Conversion from Bevy render meshes.

use bevy::log::debug;
use bevy::math::Vec3;
use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::Mesh;
use std::collections::HashMap;

use super::{SelectMesh, VertexIndex};

/// Positions within this distance of an already welded vertex merge into it.
const WELD_EPSILON: f32 = 1e-5;

impl SelectMesh {
    /// Build a `SelectMesh` from a Bevy `Mesh`.
    ///
    /// Render meshes duplicate vertices along hard edges and UV seams, so
    /// coincident positions are welded first; otherwise neighbouring faces
    /// would not share edges. Each triangle becomes one face.
    ///
    /// Returns `None` if the mesh lacks positions or uses a non-triangle topology.
    pub fn from_bevy_mesh(mesh: &Mesh) -> Option<Self> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return None;
        }

        let raw_positions: Vec<Vec3> = match mesh.attribute(Mesh::ATTRIBUTE_POSITION)? {
            VertexAttributeValues::Float32x3(v) => v.iter().map(|p| Vec3::from(*p)).collect(),
            _ => return None,
        };

        let indices: Vec<u32> = match mesh.indices() {
            Some(Indices::U32(indices)) => indices.clone(),
            Some(Indices::U16(indices)) => indices.iter().map(|&i| i as u32).collect(),
            None => (0..raw_positions.len() as u32).collect(),
        };

        let (positions, remap) = weld_positions(&raw_positions);

        let mut polygons = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let corners = [
                *remap.get(tri[0] as usize)?,
                *remap.get(tri[1] as usize)?,
                *remap.get(tri[2] as usize)?,
            ];
            // Skip triangles collapsed by welding
            if corners[0] == corners[1] || corners[1] == corners[2] || corners[2] == corners[0] {
                continue;
            }
            polygons.push(corners.to_vec());
        }

        debug!(
            "Welded {} render vertices into {} ({} faces)",
            raw_positions.len(),
            positions.len(),
            polygons.len()
        );

        SelectMesh::from_polygons(positions, &polygons)
    }
}

/// Merge coincident positions. Returns the unique positions and, for every
/// input position, the index of the vertex it maps to.
///
/// Positions are bucketed on a grid one epsilon wide; a position is compared
/// by distance against the welded vertices in its own and the 26 surrounding
/// cells, so neighbours straddling a cell boundary still merge.
fn weld_positions(raw: &[Vec3]) -> (Vec<Vec3>, Vec<VertexIndex>) {
    let threshold_sq = WELD_EPSILON * WELD_EPSILON;
    let mut cells: HashMap<(i64, i64, i64), Vec<VertexIndex>> = HashMap::new();
    let mut unique: Vec<Vec3> = Vec::new();
    let mut remap = Vec::with_capacity(raw.len());

    for &p in raw {
        let (cx, cy, cz) = weld_cell(p);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    if let Some(&v) = candidates
                        .iter()
                        .find(|&&v| unique[v as usize].distance_squared(p) <= threshold_sq)
                    {
                        found = Some(v);
                        break 'search;
                    }
                }
            }
        }

        let index = match found {
            Some(v) => v,
            None => {
                unique.push(p);
                let v = (unique.len() - 1) as VertexIndex;
                cells.entry((cx, cy, cz)).or_default().push(v);
                v
            }
        };
        remap.push(index);
    }

    (unique, remap)
}

fn weld_cell(p: Vec3) -> (i64, i64, i64) {
    (
        (p.x / WELD_EPSILON).floor() as i64,
        (p.y / WELD_EPSILON).floor() as i64,
        (p.z / WELD_EPSILON).floor() as i64,
    )
}

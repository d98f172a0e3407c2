//! Selectable mesh topology for edit-mode selection.
//!
//! `SelectMesh` is an indexed polygon mesh with explicit edge records and a
//! `selected` flag on every vertex, edge and face. Faces keep their vertex
//! loop and the edges bounding it, so selection can be flushed between
//! element types without rebuilding adjacency.

mod convert;
mod flush;

use bevy::math::Vec3;
use bitflags::bitflags;
use std::collections::HashMap;

/// Index of a vertex in the mesh.
pub type VertexIndex = u32;
/// Index of an edge in the mesh.
pub type EdgeIndex = u32;
/// Index of a face in the mesh.
pub type FaceIndex = u32;

bitflags! {
    /// Element granularity the editor currently selects at.
    ///
    /// Several flags may be active at once; flushing follows the finest one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ElementSelectMode: u8 {
        const VERTEX = 1 << 0;
        const EDGE = 1 << 1;
        const FACE = 1 << 2;
    }
}

impl Default for ElementSelectMode {
    fn default() -> Self {
        ElementSelectMode::VERTEX
    }
}

/// Canonical edge representation (lower vertex index first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKey(pub VertexIndex, pub VertexIndex);

impl EdgeKey {
    /// Create a canonical edge key with the lower index first.
    pub fn new(a: VertexIndex, b: VertexIndex) -> Self {
        if a <= b {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeshVertex {
    pub position: Vec3,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct MeshEdge {
    pub vertices: [VertexIndex; 2],
    pub selected: bool,
}

/// A polygon face. `vertices` is the ordered loop, `edges[i]` joins
/// `vertices[i]` and `vertices[i + 1]`.
#[derive(Debug, Clone)]
pub struct MeshFace {
    pub vertices: Vec<VertexIndex>,
    pub edges: Vec<EdgeIndex>,
    /// Unit normal in the mesh's local space.
    pub normal: Vec3,
    pub selected: bool,
}

/// Polygon mesh with per-element selection state.
#[derive(Debug, Clone, Default)]
pub struct SelectMesh {
    pub vertices: Vec<MeshVertex>,
    pub edges: Vec<MeshEdge>,
    pub faces: Vec<MeshFace>,
    pub select_mode: ElementSelectMode,
    /// Bumped whenever cached draw data must be regenerated.
    draw_generation: u64,
}

impl SelectMesh {
    /// Build a mesh from positions and polygon vertex loops.
    ///
    /// Edges are shared between polygons that reference the same vertex pair.
    /// Returns `None` if a polygon has fewer than 3 vertices or references a
    /// vertex that does not exist.
    pub fn from_polygons(positions: Vec<Vec3>, polygons: &[Vec<VertexIndex>]) -> Option<Self> {
        let vertices: Vec<MeshVertex> = positions
            .into_iter()
            .map(|position| MeshVertex {
                position,
                selected: false,
            })
            .collect();

        let mut edges: Vec<MeshEdge> = Vec::new();
        let mut edge_map: HashMap<EdgeKey, EdgeIndex> = HashMap::new();
        let mut faces = Vec::with_capacity(polygons.len());

        for polygon in polygons {
            if polygon.len() < 3 || polygon.iter().any(|&v| v as usize >= vertices.len()) {
                return None;
            }

            let mut face_edges = Vec::with_capacity(polygon.len());
            for i in 0..polygon.len() {
                let a = polygon[i];
                let b = polygon[(i + 1) % polygon.len()];
                let index = *edge_map.entry(EdgeKey::new(a, b)).or_insert_with(|| {
                    edges.push(MeshEdge {
                        vertices: [a, b],
                        selected: false,
                    });
                    (edges.len() - 1) as EdgeIndex
                });
                face_edges.push(index);
            }

            let loop_positions: Vec<Vec3> =
                polygon.iter().map(|&v| vertices[v as usize].position).collect();

            faces.push(MeshFace {
                vertices: polygon.clone(),
                edges: face_edges,
                normal: newell_normal(&loop_positions),
                selected: false,
            });
        }

        Some(SelectMesh {
            vertices,
            edges,
            faces,
            select_mode: ElementSelectMode::default(),
            draw_generation: 0,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of polygon faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Local-space unit normal of a face.
    pub fn face_normal(&self, face: FaceIndex) -> Vec3 {
        self.faces[face as usize].normal
    }

    /// Select or deselect every element.
    pub fn select_all(&mut self, selected: bool) {
        for v in &mut self.vertices {
            v.selected = selected;
        }
        for e in &mut self.edges {
            e.selected = selected;
        }
        for f in &mut self.faces {
            f.selected = selected;
        }
    }

    /// Select a face together with its boundary edges and vertices.
    pub fn select_face(&mut self, face: FaceIndex) {
        let Some(f) = self.faces.get_mut(face as usize) else {
            return;
        };
        f.selected = true;
        for &e in &f.edges {
            self.edges[e as usize].selected = true;
        }
        for &v in &f.vertices {
            self.vertices[v as usize].selected = true;
        }
    }

    pub fn selected_faces(&self) -> Vec<FaceIndex> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.selected)
            .map(|(i, _)| i as FaceIndex)
            .collect()
    }

    pub fn selected_edges(&self) -> Vec<EdgeIndex> {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.selected)
            .map(|(i, _)| i as EdgeIndex)
            .collect()
    }

    pub fn selected_vertices(&self) -> Vec<VertexIndex> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.selected)
            .map(|(i, _)| i as VertexIndex)
            .collect()
    }

    /// Mark cached draw data stale without touching topology.
    pub fn refresh_draw_data(&mut self) {
        self.draw_generation = self.draw_generation.wrapping_add(1);
    }

    /// Counter observers compare against to know when to redraw.
    pub fn draw_generation(&self) -> u64 {
        self.draw_generation
    }
}

/// Newell's method: robust normal for planar and slightly non-planar polygons.
fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, current) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal.normalize_or_zero()
}

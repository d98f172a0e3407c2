//! Selection flushing between vertices, edges and faces.
//!
//! After any per-element edit the three selections can disagree (a face
//! selected while one of its vertices is not, an edge left selected with no
//! selected face around it). Flushing re-derives the coarser or finer element
//! types from the one the active select mode is authoritative for.

use super::{ElementSelectMode, SelectMesh};

impl SelectMesh {
    /// Make vertex, edge and face selection mutually consistent with
    /// `select_mode`.
    ///
    /// - Vertex mode: vertices are authoritative. An edge is selected iff both
    ///   ends are, a face iff every corner is.
    /// - Edge mode: edges are authoritative. A vertex is selected iff it ends a
    ///   selected edge, a face iff all of its edges are selected.
    /// - Face mode: faces are authoritative. Edges and vertices are selected
    ///   iff they bound a selected face.
    pub fn flush_selection(&mut self) {
        if self.select_mode.contains(ElementSelectMode::VERTEX) {
            self.flush_from_vertices();
        } else if self.select_mode.contains(ElementSelectMode::EDGE) {
            self.flush_from_edges();
        } else {
            self.flush_from_faces();
        }
    }

    fn flush_from_vertices(&mut self) {
        for edge in &mut self.edges {
            let [a, b] = edge.vertices;
            edge.selected =
                self.vertices[a as usize].selected && self.vertices[b as usize].selected;
        }
        for face in &mut self.faces {
            face.selected = face
                .vertices
                .iter()
                .all(|&v| self.vertices[v as usize].selected);
        }
    }

    fn flush_from_edges(&mut self) {
        for vertex in &mut self.vertices {
            vertex.selected = false;
        }
        for edge in &self.edges {
            if edge.selected {
                for &v in &edge.vertices {
                    self.vertices[v as usize].selected = true;
                }
            }
        }
        for face in &mut self.faces {
            face.selected = face.edges.iter().all(|&e| self.edges[e as usize].selected);
        }
    }

    fn flush_from_faces(&mut self) {
        for vertex in &mut self.vertices {
            vertex.selected = false;
        }
        for edge in &mut self.edges {
            edge.selected = false;
        }
        for face in &self.faces {
            if !face.selected {
                continue;
            }
            for &e in &face.edges {
                self.edges[e as usize].selected = true;
            }
            for &v in &face.vertices {
                self.vertices[v as usize].selected = true;
            }
        }
    }
}

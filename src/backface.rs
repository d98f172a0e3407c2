//! Backface-only selection filter.
//!
//! Shrinks the current edit-mesh selection to the elements that touch faces
//! pointing away from the viewer, then flushes the selection so vertices,
//! edges and faces agree again.

use bevy::log::{debug, warn};
use bevy::math::{Affine3A, Mat3, Vec3};
use std::collections::HashSet;

use crate::host::{ActiveObject, ObjectMode};
use crate::mesh::{EdgeIndex, FaceIndex, SelectMesh, VertexIndex};

/// Faces classified as backfaces, plus every edge and vertex they touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfaceSet {
    pub faces: HashSet<FaceIndex>,
    pub edges: HashSet<EdgeIndex>,
    pub vertices: HashSet<VertexIndex>,
}

/// Selection that survived filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub faces: usize,
    pub edges: usize,
    pub vertices: usize,
}

/// Why the filter left the selection untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoActiveObject,
    NotAMesh,
    NotInEditMode,
    NoFaces,
    /// The object's linear transform cannot be inverted (zero scale on an axis).
    DegenerateTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Skipped(SkipReason),
    Filtered(FilterStats),
}

/// Matrix that carries local normals into world space: the inverse-transpose
/// of the object's linear part, so non-uniform scale keeps normals
/// perpendicular to their faces.
pub fn normal_matrix(world: &Affine3A) -> Option<Mat3> {
    let linear = Mat3::from(world.matrix3);
    let det = linear.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(linear.inverse().transpose())
}

/// Classify faces against a world-space view direction.
///
/// A face is a backface iff its world normal has a strictly positive dot
/// product with `view_direction`. Edge-on faces (`dot == 0`) count as
/// front-facing.
pub fn classify_backfaces(
    mesh: &SelectMesh,
    normal_matrix: &Mat3,
    view_direction: Vec3,
) -> BackfaceSet {
    let mut set = BackfaceSet::default();

    for (fi, face) in mesh.faces.iter().enumerate() {
        let world_normal = (*normal_matrix * face.normal).normalize_or_zero();
        if world_normal.dot(view_direction) > 0.0 {
            set.faces.insert(fi as FaceIndex);
            set.edges.extend(face.edges.iter().copied());
            set.vertices.extend(face.vertices.iter().copied());
        }
    }

    set
}

/// Deselect everything outside `backfaces`, flush, and mark draw data stale.
pub fn restrict_selection(mesh: &mut SelectMesh, backfaces: &BackfaceSet) -> FilterStats {
    for (fi, face) in mesh.faces.iter_mut().enumerate() {
        if face.selected && !backfaces.faces.contains(&(fi as FaceIndex)) {
            face.selected = false;
        }
    }
    for (ei, edge) in mesh.edges.iter_mut().enumerate() {
        if edge.selected && !backfaces.edges.contains(&(ei as EdgeIndex)) {
            edge.selected = false;
        }
    }
    for (vi, vertex) in mesh.vertices.iter_mut().enumerate() {
        if vertex.selected && !backfaces.vertices.contains(&(vi as VertexIndex)) {
            vertex.selected = false;
        }
    }

    mesh.flush_selection();
    mesh.refresh_draw_data();

    FilterStats {
        faces: mesh.faces.iter().filter(|f| f.selected).count(),
        edges: mesh.edges.iter().filter(|e| e.selected).count(),
        vertices: mesh.vertices.iter().filter(|v| v.selected).count(),
    }
}

/// Keep only the selected elements that belong to backfaces of the active
/// edit mesh. Contexts where that is meaningless are a silent no-op.
pub fn filter_backfaces(object: Option<ActiveObject<'_>>, view_direction: Vec3) -> FilterOutcome {
    let Some(object) = object else {
        return FilterOutcome::Skipped(SkipReason::NoActiveObject);
    };
    let Some(mesh) = object.mesh else {
        return FilterOutcome::Skipped(SkipReason::NotAMesh);
    };
    if object.mode != ObjectMode::Edit {
        return FilterOutcome::Skipped(SkipReason::NotInEditMode);
    }
    if mesh.face_count() == 0 {
        return FilterOutcome::Skipped(SkipReason::NoFaces);
    }
    let Some(normals) = normal_matrix(&object.world) else {
        warn!("Backface filter skipped: object transform is not invertible");
        return FilterOutcome::Skipped(SkipReason::DegenerateTransform);
    };

    let backfaces = classify_backfaces(mesh, &normals, view_direction);
    let stats = restrict_selection(mesh, &backfaces);

    debug!(
        "Backface filter: {} of {} faces face away, kept {} faces / {} edges / {} vertices",
        backfaces.faces.len(),
        mesh.face_count(),
        stats.faces,
        stats.edges,
        stats.vertices
    );

    FilterOutcome::Filtered(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::make_cube;
    use crate::mesh::ElementSelectMode;

    fn edit(mesh: &mut SelectMesh) -> Option<ActiveObject<'_>> {
        Some(ActiveObject {
            mode: ObjectMode::Edit,
            world: Affine3A::IDENTITY,
            mesh: Some(mesh),
        })
    }

    fn snapshot(mesh: &SelectMesh) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
        (
            mesh.selected_faces(),
            mesh.selected_edges(),
            mesh.selected_vertices(),
        )
    }

    #[test]
    fn keeps_only_far_side_of_cube() {
        // Viewer on the -Z side looking toward +Z.
        let mut cube = make_cube();
        cube.select_mode = ElementSelectMode::FACE;
        cube.select_all(true);

        let outcome = filter_backfaces(edit(&mut cube), Vec3::Z);

        assert_eq!(
            outcome,
            FilterOutcome::Filtered(FilterStats {
                faces: 1,
                edges: 4,
                vertices: 4
            })
        );
        assert_eq!(cube.selected_faces(), vec![0]);
        let mut verts = cube.selected_vertices();
        verts.sort();
        assert_eq!(verts, vec![4, 5, 6, 7]);
    }

    #[test]
    fn edge_on_faces_are_front_facing() {
        let cube = make_cube();
        let set = classify_backfaces(&cube, &Mat3::IDENTITY, Vec3::X);
        // Only +X; the four side faces are exactly perpendicular.
        assert_eq!(set.faces, HashSet::from([2]));
    }

    #[test]
    fn filtering_twice_is_stable() {
        for mode in [
            ElementSelectMode::VERTEX,
            ElementSelectMode::EDGE,
            ElementSelectMode::FACE,
        ] {
            let mut cube = make_cube();
            cube.select_mode = mode;
            cube.select_all(true);
            let view = Vec3::new(1.0, 0.5, 0.25).normalize();

            filter_backfaces(edit(&mut cube), view);
            let once = snapshot(&cube);
            filter_backfaces(edit(&mut cube), view);
            assert_eq!(snapshot(&cube), once, "mode {mode:?}");
        }
    }

    #[test]
    fn selected_vertices_are_backed_by_faces() {
        let mut cube = make_cube();
        cube.select_mode = ElementSelectMode::FACE;
        cube.select_all(true);
        filter_backfaces(edit(&mut cube), Vec3::new(1.0, 1.0, 0.0));

        let selected_faces = cube.selected_faces();
        assert_eq!(selected_faces.len(), 2);
        for v in cube.selected_vertices() {
            assert!(
                selected_faces
                    .iter()
                    .any(|&f| cube.faces[f as usize].vertices.contains(&v)),
                "vertex {v} has no selected face"
            );
        }
    }

    #[test]
    fn vertex_mode_keeps_lone_back_vertex() {
        let mut cube = make_cube();
        cube.select_mode = ElementSelectMode::VERTEX;
        cube.vertices[6].selected = true;
        cube.vertices[0].selected = true;

        filter_backfaces(edit(&mut cube), Vec3::Z);

        // Vertex 6 lies on the +Z face, vertex 0 does not.
        assert_eq!(cube.selected_vertices(), vec![6]);
        assert!(cube.selected_faces().is_empty());
    }

    #[test]
    fn unselected_backfaces_stay_unselected() {
        let mut cube = make_cube();
        cube.select_mode = ElementSelectMode::FACE;
        cube.select_face(1);

        filter_backfaces(edit(&mut cube), Vec3::Z);

        assert!(cube.selected_faces().is_empty());
        assert!(cube.selected_vertices().is_empty());
    }

    #[test]
    fn uses_inverse_transpose_for_non_uniform_scale() {
        // Sloped triangle on the plane x + y = 1, local normal (1, 1, 0).
        let mesh = SelectMesh::from_polygons(
            vec![Vec3::X, Vec3::Y, Vec3::new(1.0, 0.0, 1.0)],
            &[vec![0, 1, 2]],
        )
        .expect("valid triangle");
        let world = Affine3A::from_scale(Vec3::new(10.0, 1.0, 1.0));
        let normals = normal_matrix(&world).expect("invertible");

        // True world normal leans toward +Y; a plain linear transform would
        // lean it toward +X and flip the result.
        let set = classify_backfaces(&mesh, &normals, Vec3::new(1.0, -0.5, 0.0));
        assert!(set.faces.is_empty());
    }

    #[test]
    fn rotation_moves_the_backface() {
        let mut cube = make_cube();
        cube.select_mode = ElementSelectMode::FACE;
        cube.select_all(true);
        let object = ActiveObject {
            mode: ObjectMode::Edit,
            // Half turn about +Y, written out exactly.
            world: Affine3A::from_mat3(Mat3::from_cols(Vec3::NEG_X, Vec3::Y, Vec3::NEG_Z)),
            mesh: Some(&mut cube),
        };

        filter_backfaces(Some(object), Vec3::Z);

        // The local -Z face now points at +Z.
        assert_eq!(cube.selected_faces(), vec![1]);
    }

    #[test]
    fn skips_ineligible_contexts() {
        assert_eq!(
            filter_backfaces(None, Vec3::Z),
            FilterOutcome::Skipped(SkipReason::NoActiveObject)
        );

        let not_mesh = ActiveObject {
            mode: ObjectMode::Edit,
            world: Affine3A::IDENTITY,
            mesh: None,
        };
        assert_eq!(
            filter_backfaces(Some(not_mesh), Vec3::Z),
            FilterOutcome::Skipped(SkipReason::NotAMesh)
        );

        let mut cube = make_cube();
        cube.select_all(true);
        let object_mode = ActiveObject {
            mode: ObjectMode::Object,
            world: Affine3A::IDENTITY,
            mesh: Some(&mut cube),
        };
        assert_eq!(
            filter_backfaces(Some(object_mode), Vec3::Z),
            FilterOutcome::Skipped(SkipReason::NotInEditMode)
        );
        assert_eq!(cube.selected_faces().len(), 6);

        let mut empty = SelectMesh::default();
        assert_eq!(
            filter_backfaces(edit(&mut empty), Vec3::Z),
            FilterOutcome::Skipped(SkipReason::NoFaces)
        );
    }

    #[test]
    fn flat_scale_is_degenerate() {
        let mut cube = make_cube();
        cube.select_all(true);
        let object = ActiveObject {
            mode: ObjectMode::Edit,
            world: Affine3A::from_scale(Vec3::new(1.0, 0.0, 1.0)),
            mesh: Some(&mut cube),
        };
        assert_eq!(
            filter_backfaces(Some(object), Vec3::Z),
            FilterOutcome::Skipped(SkipReason::DegenerateTransform)
        );
        assert_eq!(cube.selected_faces().len(), 6);
    }
}

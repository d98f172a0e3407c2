//! Seams to the editor that hosts the occlusion selection tool.
//!
//! The tool never picks geometry or renders anything itself. It asks the host
//! to run a box or lasso drag, flips the host's x-ray flag, and reads/writes
//! selection flags on whatever mesh the host is editing.

use bevy::math::{Affine3A, Vec3};
use std::time::Duration;

use crate::error::{DragRefused, TimerUnavailable};
use crate::mesh::SelectMesh;
use crate::session::{SelectMode, ShapeStyle};

/// Opaque handle to a repeating timer owned by a [`TimerHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u32);

/// Interaction mode of the active object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ObjectMode {
    #[default]
    Object,
    Edit,
}

/// The object the host is currently editing.
pub struct ActiveObject<'a> {
    pub mode: ObjectMode,
    /// Object-to-world transform.
    pub world: Affine3A,
    /// `None` when the active object is not a mesh (curve, armature, light...).
    pub mesh: Option<&'a mut SelectMesh>,
}

/// The 3D view the drag happens in.
pub trait ViewportHost {
    /// Whether there is a 3D view to select in.
    fn has_active_view(&self) -> bool;

    /// Current state of the see-through (x-ray) override.
    fn xray(&self) -> bool;

    fn set_xray(&mut self, enabled: bool);

    /// World-space direction the view is looking along.
    fn view_direction(&self) -> Option<Vec3>;
}

/// The host's interactive box/lasso select.
///
/// Once started, the drag consumes its own input until it finishes; the tool
/// only sees events the drag did not consume.
pub trait DragSelectHost {
    fn begin_drag(&mut self, shape: ShapeStyle, mode: SelectMode) -> Result<(), DragRefused>;
}

/// Repeating wake-up source.
pub trait TimerHost {
    fn allocate_timer(&mut self, period: Duration) -> Result<TimerHandle, TimerUnavailable>;

    fn release_timer(&mut self, handle: TimerHandle);
}

/// Access to the mesh being edited.
pub trait MeshHost {
    fn active_object(&mut self) -> Option<ActiveObject<'_>>;
}

/// Everything a session needs from its host.
pub trait OcclusionHost: ViewportHost + DragSelectHost + TimerHost + MeshHost {}

impl<T: ViewportHost + DragSelectHost + TimerHost + MeshHost> OcclusionHost for T {}

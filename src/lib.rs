//! # bevy_occlusion_select
//!
//! X-ray drag selection for Bevy mesh editors.
//!
//! While a selection drag runs the view is forced into see-through mode, so
//! elements hidden behind front faces can be boxed or lassoed. With the
//! backface-only flag the result is then narrowed to the elements of faces
//! pointing away from the viewer.
//!
//! ## Quick Start
//!
//! Implement the host traits on your editor resource and add the plugin:
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_occlusion_select::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .insert_resource(MyEditor::default())
//!         .add_plugins(OcclusionSelectPlugin::<MyEditor>::default())
//!         .run();
//! }
//! ```
//!
//! ## Default bindings
//!
//! - **Right drag**: replace selection
//! - **Shift + Right drag**: extend
//! - **Ctrl + Right drag**: deselect
//! - **Alt + Right drag**: keep backfaces only

pub mod backface;
pub mod error;
pub mod host;
pub mod keymap;
pub mod mesh;
pub mod plugin;
pub mod session;
pub mod settings;

pub use error::{Result, SessionError, SettingsError};
pub use plugin::{
    EditorHost, OcclusionSelectFinished, OcclusionSelectInput, OcclusionSelectPlugin,
    OcclusionSelectRequest,
};
pub use session::{OcclusionController, OcclusionIntents, Response, Session, SessionEvent};

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::backface::{filter_backfaces, FilterOutcome};
    pub use crate::host::{
        ActiveObject, DragSelectHost, MeshHost, ObjectMode, TimerHandle, TimerHost, ViewportHost,
    };
    pub use crate::keymap::{DragChord, KeyBinding, KeymapRegistry, Modifiers};
    pub use crate::mesh::{ElementSelectMode, SelectMesh};
    pub use crate::plugin::{
        EditorHost, OcclusionSelectFinished, OcclusionSelectInput, OcclusionSelectPlugin,
        OcclusionSelectRequest,
    };
    pub use crate::session::{
        OcclusionController, OcclusionIntents, Response, SelectMode, SessionEvent, ShapeStyle,
    };
    pub use crate::settings::{IconPosition, OcclusionSceneToggle, OcclusionSettings};
}

//! Runs one scripted backface-only drag against a toy editor, without a window.
//!
//! ```sh
//! cargo run --example headless
//! ```

use bevy::input::mouse::MouseMotion;
use bevy::log::LogPlugin;
use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy_occlusion_select::error::DragRefused;
use bevy_occlusion_select::prelude::*;

/// Minimal editor: one cube in edit mode, viewed from -Z.
#[derive(Resource)]
struct ToyEditor {
    xray: bool,
    cube: SelectMesh,
}

impl ViewportHost for ToyEditor {
    fn has_active_view(&self) -> bool {
        true
    }

    fn xray(&self) -> bool {
        self.xray
    }

    fn set_xray(&mut self, enabled: bool) {
        info!("x-ray {}", if enabled { "ON" } else { "OFF" });
        self.xray = enabled;
    }

    fn view_direction(&self) -> Option<Vec3> {
        Some(Vec3::Z)
    }
}

impl DragSelectHost for ToyEditor {
    fn begin_drag(&mut self, shape: ShapeStyle, mode: SelectMode) -> Result<(), DragRefused> {
        // A real editor would start its box/lasso tool here; pretend it
        // selected everything.
        info!("{} drag ({})", shape.display_name(), mode.display_name());
        self.cube.select_all(true);
        Ok(())
    }
}

impl MeshHost for ToyEditor {
    fn active_object(&mut self) -> Option<ActiveObject<'_>> {
        Some(ActiveObject {
            mode: ObjectMode::Edit,
            world: Affine3A::IDENTITY,
            mesh: Some(&mut self.cube),
        })
    }
}

fn main() {
    let Some(mut cube) = SelectMesh::from_bevy_mesh(&Mesh::from(Cuboid::default())) else {
        error!("cuboid mesh could not be converted");
        return;
    };
    cube.select_mode = ElementSelectMode::FACE;

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .init_resource::<ButtonInput<MouseButton>>()
        .init_resource::<ButtonInput<KeyCode>>()
        .add_message::<MouseMotion>()
        .insert_resource(ToyEditor { xray: false, cube })
        .add_plugins(OcclusionSelectPlugin::<ToyEditor>::with_settings(
            OcclusionSettings::default(),
        ));

    app.world_mut().write_message(OcclusionSelectRequest {
        intents: OcclusionIntents {
            backface_only: true,
            ..default()
        },
    });
    app.update();

    app.world_mut()
        .write_message(OcclusionSelectInput(SessionEvent::Release));
    app.update();

    let editor = app.world().resource::<ToyEditor>();
    info!(
        "selected after drag: {} faces, {} edges, {} vertices (x-ray {})",
        editor.cube.selected_faces().len(),
        editor.cube.selected_edges().len(),
        editor.cube.selected_vertices().len(),
        if editor.xray { "ON" } else { "OFF" }
    );
}

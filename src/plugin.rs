//! Bevy integration: gesture detection, session driving and repair timers.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use std::marker::PhantomData;
use std::time::Duration;

use crate::error::{DragRefused, TimerUnavailable};
use crate::host::{ActiveObject, DragSelectHost, MeshHost, TimerHandle, TimerHost, ViewportHost};
use crate::keymap::{DragChord, KeymapHandle, KeymapRegistry, Modifiers};
use crate::session::{
    OcclusionController, OcclusionIntents, Response, SelectMode, SessionEvent, ShapeStyle,
};
use crate::settings::{OcclusionSceneToggle, OcclusionSettings};

/// The editor resource the plugin drives. Timers come from [`RepairTimers`].
pub trait EditorHost: ViewportHost + DragSelectHost + MeshHost + Resource {}

impl<T: ViewportHost + DragSelectHost + MeshHost + Resource> EditorHost for T {}

/// Invoke the occlusion select action.
#[derive(Message, Debug, Clone, Copy)]
pub struct OcclusionSelectRequest {
    pub intents: OcclusionIntents,
}

/// Event forwarded to the running session by the host integration.
#[derive(Message, Debug, Clone, Copy)]
pub struct OcclusionSelectInput(pub SessionEvent);

/// A session completed and restored the view.
#[derive(Message, Debug, Clone, Copy)]
pub struct OcclusionSelectFinished;

/// Handles of the bindings the plugin registered, so apps can rebind.
#[derive(Resource, Debug, Default)]
pub struct DefaultBindings(pub Vec<KeymapHandle>);

/// Repeating timers backed by Bevy's `Time`.
#[derive(Resource, Default)]
pub struct RepairTimers {
    timers: Vec<(TimerHandle, Timer)>,
    next_id: u32,
}

impl RepairTimers {
    /// Advance every timer, returning the ones that fired.
    pub fn tick(&mut self, delta: Duration) -> Vec<TimerHandle> {
        let mut fired = Vec::new();
        for (handle, timer) in &mut self.timers {
            timer.tick(delta);
            if timer.just_finished() {
                fired.push(*handle);
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl TimerHost for RepairTimers {
    fn allocate_timer(&mut self, period: Duration) -> Result<TimerHandle, TimerUnavailable> {
        if period.is_zero() {
            return Err(TimerUnavailable("repair interval must be positive".into()));
        }
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.push((handle, Timer::new(period, TimerMode::Repeating)));
        Ok(handle)
    }

    fn release_timer(&mut self, handle: TimerHandle) {
        self.timers.retain(|(h, _)| *h != handle);
    }
}

/// Pairs the editor host with the plugin's timers for one system run.
struct HostWithTimers<'a, H> {
    host: &'a mut H,
    timers: &'a mut RepairTimers,
}

impl<H: ViewportHost> ViewportHost for HostWithTimers<'_, H> {
    fn has_active_view(&self) -> bool {
        self.host.has_active_view()
    }

    fn xray(&self) -> bool {
        self.host.xray()
    }

    fn set_xray(&mut self, enabled: bool) {
        self.host.set_xray(enabled);
    }

    fn view_direction(&self) -> Option<Vec3> {
        self.host.view_direction()
    }
}

impl<H: DragSelectHost> DragSelectHost for HostWithTimers<'_, H> {
    fn begin_drag(&mut self, shape: ShapeStyle, mode: SelectMode) -> Result<(), DragRefused> {
        self.host.begin_drag(shape, mode)
    }
}

impl<H> TimerHost for HostWithTimers<'_, H> {
    fn allocate_timer(&mut self, period: Duration) -> Result<TimerHandle, TimerUnavailable> {
        self.timers.allocate_timer(period)
    }

    fn release_timer(&mut self, handle: TimerHandle) {
        self.timers.release_timer(handle);
    }
}

impl<H: MeshHost> MeshHost for HostWithTimers<'_, H> {
    fn active_object(&mut self) -> Option<ActiveObject<'_>> {
        self.host.active_object()
    }
}

/// Press being watched for drag travel.
#[derive(Resource, Default, Debug)]
pub struct DragGesture {
    pressed: Option<DragChord>,
    travelled: f32,
    started: bool,
}

/// Plugin adding x-ray drag selection for an editor host resource `H`.
pub struct OcclusionSelectPlugin<H> {
    settings: Option<OcclusionSettings>,
    _host: PhantomData<fn() -> H>,
}

impl<H> Default for OcclusionSelectPlugin<H> {
    fn default() -> Self {
        Self {
            settings: None,
            _host: PhantomData,
        }
    }
}

impl<H> OcclusionSelectPlugin<H> {
    /// Use these settings instead of loading them from the config directory.
    pub fn with_settings(settings: OcclusionSettings) -> Self {
        Self {
            settings: Some(settings),
            _host: PhantomData,
        }
    }
}

impl<H: EditorHost> Plugin for OcclusionSelectPlugin<H> {
    fn build(&self, app: &mut App) {
        let settings = self.settings.clone().unwrap_or_else(OcclusionSettings::load);
        let mut keymap = KeymapRegistry::default();
        let handles = keymap.register_defaults();

        app.insert_resource(settings)
            .insert_resource(keymap)
            .insert_resource(DefaultBindings(handles))
            .init_resource::<OcclusionController>()
            .init_resource::<OcclusionSceneToggle>()
            .init_resource::<RepairTimers>()
            .init_resource::<DragGesture>()
            .add_message::<OcclusionSelectRequest>()
            .add_message::<OcclusionSelectInput>()
            .add_message::<OcclusionSelectFinished>()
            .add_systems(
                Update,
                (
                    detect_drag_gesture,
                    start_requested_sessions::<H>,
                    drive_session::<H>,
                )
                    .chain(),
            );
    }
}

/// Turn a bound button press plus enough cursor travel into a request, and
/// the matching release or Escape into session input.
fn detect_drag_gesture(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut motion: MessageReader<MouseMotion>,
    keymap: Res<KeymapRegistry>,
    settings: Res<OcclusionSettings>,
    controller: Res<OcclusionController>,
    mut gesture: ResMut<DragGesture>,
    mut requests: MessageWriter<OcclusionSelectRequest>,
    mut inputs: MessageWriter<OcclusionSelectInput>,
) {
    let travel: f32 = motion.read().map(|m| m.delta.length()).sum();

    if gesture.pressed.is_none() && !controller.is_active() {
        if let Some(&button) = mouse
            .get_just_pressed()
            .find(|&&b| keymap.uses_button(b))
        {
            gesture.pressed = Some(DragChord::new(button, Modifiers::from_keyboard(&keyboard)));
            gesture.travelled = 0.0;
            gesture.started = false;
        }
    }

    let Some(chord) = gesture.pressed else {
        return;
    };

    if !gesture.started {
        gesture.travelled += travel;
        if gesture.travelled >= settings.drag_threshold_px {
            gesture.started = true;
            match keymap.resolve(chord) {
                Some(intents) => {
                    requests.write(OcclusionSelectRequest { intents });
                }
                None => {
                    // Unbound modifier combination: let other tools have it.
                    gesture.pressed = None;
                    return;
                }
            }
        }
    }

    if gesture.started && keyboard.just_pressed(KeyCode::Escape) {
        inputs.write(OcclusionSelectInput(SessionEvent::Cancel));
    }

    if mouse.just_released(chord.button) {
        if gesture.started {
            inputs.write(OcclusionSelectInput(SessionEvent::Release));
        }
        *gesture = DragGesture::default();
    }
}

fn start_requested_sessions<H: EditorHost>(
    mut requests: MessageReader<OcclusionSelectRequest>,
    mut controller: ResMut<OcclusionController>,
    mut host: ResMut<H>,
    mut timers: ResMut<RepairTimers>,
    toggle: Res<OcclusionSceneToggle>,
    settings: Res<OcclusionSettings>,
) {
    let mut host = HostWithTimers {
        host: &mut *host,
        timers: &mut *timers,
    };
    for request in requests.read() {
        controller.invoke(&mut host, toggle.0, request.intents, settings.repair_interval());
    }
}

fn drive_session<H: EditorHost>(
    time: Res<Time>,
    mut inputs: MessageReader<OcclusionSelectInput>,
    mut controller: ResMut<OcclusionController>,
    mut host: ResMut<H>,
    mut timers: ResMut<RepairTimers>,
    mut finished: MessageWriter<OcclusionSelectFinished>,
) {
    let fired = timers.tick(time.delta());
    let mut host = HostWithTimers {
        host: &mut *host,
        timers: &mut *timers,
    };

    let events = fired
        .into_iter()
        .map(SessionEvent::Timer)
        .chain(inputs.read().map(|input| input.0));

    for event in events {
        if controller.handle(&mut host, event) == Response::Finished {
            finished.write(OcclusionSelectFinished);
        }
    }
}

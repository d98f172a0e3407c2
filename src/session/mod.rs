//! Modal x-ray drag selection session.
//!
//! A session forces the view's x-ray override on, hands the actual drag to
//! the host's box/lasso select, keeps the override pinned with a repeating
//! timer while the drag runs, and on termination optionally filters the
//! result down to backfaces before restoring everything it touched.
//!
//! ```text
//!  begin ──► Armed ──► Delegated ──(release | cancel | non-repeat input)──► Done
//!                         │  ▲
//!                         └──┘ timer tick: re-assert x-ray
//! ```

mod controller;
mod mode;

pub use controller::OcclusionController;
pub use mode::{OcclusionIntents, SelectMode, ShapeStyle};

use bevy::log::{debug, info, warn};
use bevy::math::Vec3;
use std::time::Duration;

use crate::backface::{filter_backfaces, FilterOutcome};
use crate::error::{Result, SessionError};
use crate::host::{OcclusionHost, TimerHandle};

/// Default period of the x-ray repair timer.
pub const DEFAULT_REPAIR_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Override forced, drag being requested.
    Armed,
    /// The host drag is running.
    Delegated,
    /// State restored. Terminal.
    Done,
}

/// Event routed to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A repeating timer fired.
    Timer(TimerHandle),
    /// The drag button was released.
    Release,
    /// The cancel key was pressed.
    Cancel,
    /// Any other input the host drag did not consume.
    Input { is_repeat: bool },
}

/// What the host should do with the event that was just handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Consumed, the session keeps running.
    Running,
    /// Consumed, the session is over.
    Finished,
    /// Not consumed; hand it to the next handler.
    PassThrough,
}

/// One drag-select interaction, from invocation to restoration.
///
/// A session must be driven to [`Phase::Done`], by a terminating event or
/// [`Session::finish`], before it is dropped. Dropping a live session cannot
/// reach the host: the x-ray override stays forced and the repair timer stays
/// registered, and only a warning is logged. [`OcclusionController`] upholds
/// this for sessions it owns.
#[derive(Debug)]
pub struct Session {
    mode: SelectMode,
    shape: ShapeStyle,
    backface_only: bool,
    phase: Phase,
    saved_xray: bool,
    timer: Option<TimerHandle>,
    view_direction: Vec3,
}

impl Session {
    /// Arm a session and delegate the drag to the host.
    ///
    /// On error nothing stays modified: a refused drag undoes the forced
    /// x-ray override and releases the timer before returning.
    pub fn begin<H: OcclusionHost + ?Sized>(
        host: &mut H,
        scene_toggle: bool,
        intents: OcclusionIntents,
        repair_interval: Duration,
    ) -> Result<Session> {
        if !host.has_active_view() {
            return Err(SessionError::InvalidContext("no active 3D view"));
        }
        let Some(view_direction) = host.view_direction() else {
            return Err(SessionError::InvalidContext("view has no direction"));
        };

        let saved_xray = host.xray();
        host.set_xray(true);

        let timer = match host.allocate_timer(repair_interval) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("X-ray repair disabled for this drag: {e}");
                None
            }
        };

        let mut session = Session {
            mode: intents.mode(),
            shape: ShapeStyle::from_scene_toggle(scene_toggle),
            backface_only: intents.backface_only,
            phase: Phase::Armed,
            saved_xray,
            timer,
            view_direction,
        };

        if let Err(e) = host.begin_drag(session.shape, session.mode) {
            session.restore(host);
            return Err(SessionError::HostDelegationFailure(e.0));
        }

        session.phase = Phase::Delegated;
        info!(
            "Occlusion select: {} {}{}",
            session.shape.display_name(),
            session.mode.display_name(),
            if session.backface_only { " (backfaces only)" } else { "" }
        );
        Ok(session)
    }

    /// Advance the state machine by one event.
    pub fn on_event<H: OcclusionHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: SessionEvent,
    ) -> Response {
        if self.phase != Phase::Delegated {
            return Response::PassThrough;
        }

        match event {
            SessionEvent::Timer(handle) if Some(handle) == self.timer => {
                if !host.xray() {
                    debug!("X-ray override was cleared during drag, re-asserting");
                    host.set_xray(true);
                }
                Response::Running
            }
            SessionEvent::Timer(_) => Response::PassThrough,
            SessionEvent::Release
            | SessionEvent::Cancel
            | SessionEvent::Input { is_repeat: false } => self.complete(host),
            SessionEvent::Input { is_repeat: true } => Response::PassThrough,
        }
    }

    /// Run completion now, whatever the pending input. Used when the owner
    /// tears the session down from outside the event flow.
    pub fn finish<H: OcclusionHost + ?Sized>(&mut self, host: &mut H) -> Response {
        if self.phase == Phase::Done {
            return Response::PassThrough;
        }
        self.complete(host)
    }

    fn complete<H: OcclusionHost + ?Sized>(&mut self, host: &mut H) -> Response {
        if self.backface_only {
            match filter_backfaces(host.active_object(), self.view_direction) {
                FilterOutcome::Filtered(stats) => info!(
                    "Backfaces only: kept {} faces, {} edges, {} vertices",
                    stats.faces, stats.edges, stats.vertices
                ),
                FilterOutcome::Skipped(reason) => debug!("Backface filter skipped: {reason:?}"),
            }
        }
        self.restore(host);
        Response::Finished
    }

    fn restore<H: OcclusionHost + ?Sized>(&mut self, host: &mut H) {
        host.set_xray(self.saved_xray);
        if let Some(handle) = self.timer.take() {
            host.release_timer(handle);
        }
        self.phase = Phase::Done;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    pub fn shape(&self) -> ShapeStyle {
        self.shape
    }

    pub fn backface_only(&self) -> bool {
        self.backface_only
    }

    /// X-ray state to restore on completion.
    pub fn saved_xray(&self) -> bool {
        self.saved_xray
    }

    /// Repair timer, `None` once done or if allocation failed.
    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// World-space view direction captured when the session began.
    pub fn view_direction(&self) -> Vec3 {
        self.view_direction
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.phase != Phase::Done {
            warn!(
                "Occlusion session dropped while {:?}; x-ray override was not restored",
                self.phase
            );
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockHost;
    use super::*;
    use crate::mesh::fixtures::make_cube;
    use crate::mesh::ElementSelectMode;

    fn intents(deselect: bool, extend: bool, backface_only: bool) -> OcclusionIntents {
        OcclusionIntents {
            deselect,
            extend,
            backface_only,
        }
    }

    #[test]
    fn begin_forces_xray_and_delegates() {
        let mut host = MockHost::new();
        let session =
            Session::begin(&mut host, false, intents(false, false, false), DEFAULT_REPAIR_INTERVAL)
                .expect("session starts");

        assert_eq!(session.phase(), Phase::Delegated);
        assert!(host.xray);
        assert!(!session.saved_xray());
        assert_eq!(host.drags, vec![(ShapeStyle::Lasso, SelectMode::Set)]);
        assert_eq!(host.timers_allocated.len(), 1);
        assert_eq!(host.timers_allocated[0].1, Duration::from_millis(50));

        let mut session = session;
        session.finish(&mut host);
    }

    #[test]
    fn deselect_drag_runs_in_sub_mode_without_filter() {
        let mut host = MockHost::new();
        let mut cube = make_cube();
        cube.select_mode = ElementSelectMode::FACE;
        cube.select_all(true);
        host.mesh = Some(cube);

        let mut session =
            Session::begin(&mut host, true, intents(true, false, false), DEFAULT_REPAIR_INTERVAL)
                .expect("session starts");
        assert_eq!(session.mode(), SelectMode::Sub);
        assert_eq!(host.drags, vec![(ShapeStyle::Box, SelectMode::Sub)]);

        assert_eq!(session.on_event(&mut host, SessionEvent::Release), Response::Finished);
        let mesh = host.mesh.as_ref().expect("mesh");
        assert_eq!(mesh.selected_faces().len(), 6);
        assert_eq!(mesh.draw_generation(), 0);
    }

    #[test]
    fn backface_only_filters_on_completion() {
        let mut host = MockHost::new();
        let mut cube = make_cube();
        cube.select_mode = ElementSelectMode::FACE;
        cube.select_all(true);
        host.mesh = Some(cube);

        let mut session =
            Session::begin(&mut host, false, intents(false, false, true), DEFAULT_REPAIR_INTERVAL)
                .expect("session starts");
        // Turning the camera mid-drag does not change the captured direction.
        host.view_direction = Vec3::NEG_Z;
        session.on_event(&mut host, SessionEvent::Input { is_repeat: false });

        let mesh = host.mesh.as_ref().expect("mesh");
        assert_eq!(mesh.selected_faces(), vec![0]);
    }

    #[test]
    fn timer_tick_repairs_cleared_override() {
        let mut host = MockHost::new();
        let mut session =
            Session::begin(&mut host, false, OcclusionIntents::default(), DEFAULT_REPAIR_INTERVAL)
                .expect("session starts");
        let timer = session.timer().expect("timer allocated");

        host.xray = false;
        assert_eq!(session.on_event(&mut host, SessionEvent::Timer(timer)), Response::Running);
        assert!(host.xray);
        assert_eq!(session.phase(), Phase::Delegated);

        // Foreign timers are not ours to answer.
        assert_eq!(
            session.on_event(&mut host, SessionEvent::Timer(TimerHandle(99))),
            Response::PassThrough
        );
        session.finish(&mut host);
    }

    #[test]
    fn repeats_pass_through_until_termination() {
        let mut host = MockHost::new();
        host.xray = true;
        let mut session =
            Session::begin(&mut host, false, OcclusionIntents::default(), DEFAULT_REPAIR_INTERVAL)
                .expect("session starts");

        assert_eq!(
            session.on_event(&mut host, SessionEvent::Input { is_repeat: true }),
            Response::PassThrough
        );
        assert_eq!(session.on_event(&mut host, SessionEvent::Cancel), Response::Finished);
        assert_eq!(session.phase(), Phase::Done);
        assert!(host.xray, "pre-session x-ray state restored");
        assert_eq!(host.timers_released, vec![TimerHandle(1)]);

        // Done is terminal and idempotent.
        assert_eq!(session.on_event(&mut host, SessionEvent::Release), Response::PassThrough);
        assert_eq!(session.finish(&mut host), Response::PassThrough);
        assert_eq!(host.timers_released.len(), 1);
    }

    #[test]
    fn degraded_timer_still_restores_once() {
        let mut host = MockHost::new();
        host.refuse_timer = true;
        let mut session =
            Session::begin(&mut host, false, OcclusionIntents::default(), DEFAULT_REPAIR_INTERVAL)
                .expect("timer failure is not fatal");
        assert!(session.timer().is_none());

        assert_eq!(session.on_event(&mut host, SessionEvent::Release), Response::Finished);
        assert_eq!(host.xray_writes, vec![true, false]);
        assert!(host.timers_released.is_empty());
    }

    #[test]
    fn dropping_live_session_leaves_host_untouched() {
        let mut host = MockHost::new();
        let session =
            Session::begin(&mut host, false, OcclusionIntents::default(), DEFAULT_REPAIR_INTERVAL)
                .expect("session starts");
        drop(session);

        assert!(host.xray);
        assert_eq!(host.xray_writes, vec![true]);
        assert!(host.timers_released.is_empty());
    }

    #[test]
    fn no_view_is_invalid_context() {
        let mut host = MockHost::new();
        host.active_view = false;
        let intents = OcclusionIntents::default();
        let result = Session::begin(&mut host, false, intents, DEFAULT_REPAIR_INTERVAL);

        assert!(matches!(result, Err(SessionError::InvalidContext(_))));
        assert!(host.xray_writes.is_empty());
        assert!(host.drags.is_empty());
        assert!(host.timers_allocated.is_empty());
    }

    #[test]
    fn refused_drag_restores_state() {
        let mut host = MockHost::new();
        host.refuse_drag = true;
        let intents = OcclusionIntents::default();
        let result = Session::begin(&mut host, false, intents, DEFAULT_REPAIR_INTERVAL);

        assert!(matches!(result, Err(SessionError::HostDelegationFailure(_))));
        assert!(!host.xray);
        assert_eq!(host.xray_writes, vec![true, false]);
        assert_eq!(host.timers_released, vec![TimerHandle(1)]);
    }
}

use bevy::log::warn;
use bevy::prelude::Resource;
use std::time::Duration;

use super::{OcclusionIntents, Phase, Response, Session, SessionEvent};
use crate::error::{Result, SessionError};
use crate::host::OcclusionHost;

/// Owns at most one running session for a view and exposes the occlusion
/// select action to the host.
#[derive(Resource, Default)]
pub struct OcclusionController {
    session: Option<Session>,
}

impl OcclusionController {
    /// Start a session, reporting why it could not start.
    pub fn begin<H: OcclusionHost + ?Sized>(
        &mut self,
        host: &mut H,
        scene_toggle: bool,
        intents: OcclusionIntents,
        repair_interval: Duration,
    ) -> Result<()> {
        if self.session.is_some() {
            return Err(SessionError::InvalidContext(
                "a drag session is already running on this view",
            ));
        }
        self.session = Some(Session::begin(host, scene_toggle, intents, repair_interval)?);
        Ok(())
    }

    /// The invocable action: start a session, or quietly decline.
    pub fn invoke<H: OcclusionHost + ?Sized>(
        &mut self,
        host: &mut H,
        scene_toggle: bool,
        intents: OcclusionIntents,
        repair_interval: Duration,
    ) -> Response {
        match self.begin(host, scene_toggle, intents, repair_interval) {
            Ok(()) => Response::Running,
            Err(e) => {
                warn!("Occlusion select declined: {e}");
                Response::PassThrough
            }
        }
    }

    /// Route an event to the running session, dropping it once done.
    pub fn handle<H: OcclusionHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: SessionEvent,
    ) -> Response {
        let Some(session) = self.session.as_mut() else {
            return Response::PassThrough;
        };
        let response = session.on_event(host, event);
        if session.phase() == Phase::Done {
            self.session = None;
        }
        response
    }

    /// Tear down the running session through the normal completion path.
    pub fn finish<H: OcclusionHost + ?Sized>(&mut self, host: &mut H) -> Response {
        match self.session.take() {
            Some(mut session) => session.finish(host),
            None => Response::PassThrough,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::MockHost;
    use crate::session::DEFAULT_REPAIR_INTERVAL;

    #[test]
    fn second_begin_on_same_view_is_rejected() {
        let mut host = MockHost::new();
        let mut controller = OcclusionController::default();
        let intents = OcclusionIntents::default();

        assert_eq!(
            controller.invoke(&mut host, false, intents, DEFAULT_REPAIR_INTERVAL),
            Response::Running
        );
        assert!(matches!(
            controller.begin(&mut host, false, intents, DEFAULT_REPAIR_INTERVAL),
            Err(SessionError::InvalidContext(_))
        ));
        assert_eq!(host.drags.len(), 1);

        controller.finish(&mut host);
    }

    #[test]
    fn session_is_released_after_finishing() {
        let mut host = MockHost::new();
        let mut controller = OcclusionController::default();
        let intents = OcclusionIntents::default();
        controller.invoke(&mut host, false, intents, DEFAULT_REPAIR_INTERVAL);

        assert_eq!(controller.handle(&mut host, SessionEvent::Release), Response::Finished);
        assert!(!controller.is_active());
        assert_eq!(controller.handle(&mut host, SessionEvent::Release), Response::PassThrough);

        // A fresh drag may start afterwards.
        assert_eq!(
            controller.invoke(&mut host, false, intents, DEFAULT_REPAIR_INTERVAL),
            Response::Running
        );
        controller.finish(&mut host);
        assert!(!host.xray);
    }

    #[test]
    fn declined_invoke_passes_through() {
        let mut host = MockHost::new();
        host.active_view = false;
        let mut controller = OcclusionController::default();
        let intents = OcclusionIntents::default();

        assert_eq!(
            controller.invoke(&mut host, false, intents, DEFAULT_REPAIR_INTERVAL),
            Response::PassThrough
        );
        assert!(!controller.is_active());
    }
}

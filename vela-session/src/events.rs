//! Observer interfaces for core-to-collaborator notifications.
//!
//! One listener trait per notification kind, registered at construction
//! time and invoked synchronously from within the owning session's task.
//! Listeners must therefore be cheap and must never call back into the
//! same session's blocking surface.

use std::sync::Arc;

use vela_core::types::display::DisplayId;
use vela_core::types::geometry::RectInt;

use crate::types::{SessionId, SessionState, SizeChangeReason, TerminateInfo};

/// Receives committed rect changes.
pub trait RectChangeListener: Send + Sync {
    fn on_rect_changed(
        &self,
        id: SessionId,
        rect: RectInt,
        reason: SizeChangeReason,
        display_id: DisplayId,
    );
}

/// Receives lifecycle state transitions.
pub trait StateChangeListener: Send + Sync {
    fn on_state_changed(&self, id: SessionId, state: SessionState);
}

/// Receives custom-animation-playing toggles.
pub trait AnimationListener: Send + Sync {
    fn on_custom_animation(&self, id: SessionId, playing: bool);
}

/// Receives focus/active changes; fired once per actual change.
pub trait FocusChangeListener: Send + Sync {
    fn on_active_changed(&self, id: SessionId, active: bool);
}

/// Receives termination and exception notifications; each is delivered
/// at most once per session lifetime.
pub trait TerminationListener: Send + Sync {
    fn on_session_terminated(&self, id: SessionId, info: &TerminateInfo);

    fn on_session_exception(&self, _id: SessionId, _info: &TerminateInfo) {}
}

/// The listener set a session is constructed with.
#[derive(Default, Clone)]
pub struct SessionObservers {
    rect: Vec<Arc<dyn RectChangeListener>>,
    state: Vec<Arc<dyn StateChangeListener>>,
    animation: Vec<Arc<dyn AnimationListener>>,
    focus: Vec<Arc<dyn FocusChangeListener>>,
    termination: Vec<Arc<dyn TerminationListener>>,
}

impl SessionObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rect_listener(mut self, listener: Arc<dyn RectChangeListener>) -> Self {
        self.rect.push(listener);
        self
    }

    pub fn with_state_listener(mut self, listener: Arc<dyn StateChangeListener>) -> Self {
        self.state.push(listener);
        self
    }

    pub fn with_animation_listener(mut self, listener: Arc<dyn AnimationListener>) -> Self {
        self.animation.push(listener);
        self
    }

    pub fn with_focus_listener(mut self, listener: Arc<dyn FocusChangeListener>) -> Self {
        self.focus.push(listener);
        self
    }

    pub fn with_termination_listener(mut self, listener: Arc<dyn TerminationListener>) -> Self {
        self.termination.push(listener);
        self
    }

    pub(crate) fn notify_rect_changed(
        &self,
        id: SessionId,
        rect: RectInt,
        reason: SizeChangeReason,
        display_id: DisplayId,
    ) {
        for listener in &self.rect {
            listener.on_rect_changed(id, rect, reason, display_id);
        }
    }

    pub(crate) fn notify_state_changed(&self, id: SessionId, state: SessionState) {
        for listener in &self.state {
            listener.on_state_changed(id, state);
        }
    }

    pub(crate) fn notify_custom_animation(&self, id: SessionId, playing: bool) {
        for listener in &self.animation {
            listener.on_custom_animation(id, playing);
        }
    }

    pub(crate) fn notify_active_changed(&self, id: SessionId, active: bool) {
        for listener in &self.focus {
            listener.on_active_changed(id, active);
        }
    }

    pub(crate) fn notify_terminated(&self, id: SessionId, info: &TerminateInfo) {
        for listener in &self.termination {
            listener.on_session_terminated(id, info);
        }
    }

    pub(crate) fn notify_exception(&self, id: SessionId, info: &TerminateInfo) {
        for listener in &self.termination {
            listener.on_session_exception(id, info);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Recording listeners shared by the session tests.

    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingListener {
        pub rects: Mutex<Vec<(SessionId, RectInt, SizeChangeReason)>>,
        pub states: Mutex<Vec<(SessionId, SessionState)>>,
        pub animations: Mutex<Vec<(SessionId, bool)>>,
        pub focus: Mutex<Vec<(SessionId, bool)>>,
        pub terminated: Mutex<Vec<SessionId>>,
        pub exceptions: Mutex<Vec<SessionId>>,
    }

    impl RectChangeListener for RecordingListener {
        fn on_rect_changed(
            &self,
            id: SessionId,
            rect: RectInt,
            reason: SizeChangeReason,
            _display_id: DisplayId,
        ) {
            self.rects.lock().unwrap().push((id, rect, reason));
        }
    }

    impl StateChangeListener for RecordingListener {
        fn on_state_changed(&self, id: SessionId, state: SessionState) {
            self.states.lock().unwrap().push((id, state));
        }
    }

    impl AnimationListener for RecordingListener {
        fn on_custom_animation(&self, id: SessionId, playing: bool) {
            self.animations.lock().unwrap().push((id, playing));
        }
    }

    impl FocusChangeListener for RecordingListener {
        fn on_active_changed(&self, id: SessionId, active: bool) {
            self.focus.lock().unwrap().push((id, active));
        }
    }

    impl TerminationListener for RecordingListener {
        fn on_session_terminated(&self, id: SessionId, _info: &TerminateInfo) {
            self.terminated.lock().unwrap().push(id);
        }

        fn on_session_exception(&self, id: SessionId, _info: &TerminateInfo) {
            self.exceptions.lock().unwrap().push(id);
        }
    }
}

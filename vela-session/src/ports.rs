//! Collaborator ports: the traits through which the session core talks
//! to the rest of the window-management service.
//!
//! The core never reaches into displays, surfaces, or the global session
//! registry directly. It consumes already-known display geometry through
//! `DisplayProvider`, hands surfaces to the `SurfaceBridge`, asks the
//! `SessionRegistry` for occupancy and focus services, and defers every
//! privilege decision to the `PermissionGate` (deny by default).

use std::sync::Arc;

use vela_core::types::display::{DisplayId, DisplayMetrics, FoldScreenStatus};
use vela_core::types::geometry::RectInt;

use crate::types::{KeyEvent, SessionId, SizeChangeReason, SurfaceHandle};

/// Client-side stage endpoint bound at connect time. This is the remote
/// half of the session; delivery failures are the transport's concern.
pub trait SessionStage: Send + Sync {
    fn set_active(&self, active: bool);

    fn update_rect(&self, rect: RectInt, reason: SizeChangeReason);

    fn update_density(&self, pixel_ratio: f32);

    /// Informs a main window's client that a blocking dialog of its own
    /// gained or lost the foreground.
    fn notify_dialog_state_change(&self, foreground: bool);
}

/// Input event channel bound at connect time.
pub trait EventChannel: Send + Sync {
    fn transfer_key_event(&self, event: &KeyEvent);
}

/// Supplies fold posture and per-display geometry. Owned by the display
/// collaborator; the core treats the posture enumeration as authoritative.
pub trait DisplayProvider: Send + Sync {
    fn fold_status(&self, display_id: DisplayId) -> FoldScreenStatus;

    fn metrics(&self, display_id: DisplayId) -> Option<DisplayMetrics>;

    fn cutout_rects(&self, display_id: DisplayId) -> Vec<RectInt>;
}

/// Receives the native surface handle at connect/disconnect time.
pub trait SurfaceBridge: Send + Sync {
    fn attach(&self, id: SessionId, surface: SurfaceHandle);

    fn detach(&self, id: SessionId);
}

/// Focus, z-order, and occupancy services of the global registry.
///
/// The registry itself (z-order bookkeeping across all sessions) is an
/// external collaborator; these are only the queries and requests the
/// core needs from it.
pub trait SessionRegistry: Send + Sync {
    /// Rects of currently shown status bars on the display.
    fn status_bar_rects(&self, display_id: DisplayId) -> Vec<RectInt>;

    fn is_status_bar_visible(&self, display_id: DisplayId) -> bool;

    /// Rects of foregrounded, docked input-method panels on the display.
    fn keyboard_rects(&self, display_id: DisplayId) -> Vec<RectInt>;

    /// Rect of the navigation indicator, when one is shown.
    fn navigation_indicator_rect(&self, display_id: DisplayId) -> Option<RectInt>;

    /// Requests focus presentation for the session (point-down path).
    fn present_focus(&self, id: SessionId);

    /// Requests a raise-to-top for the session.
    fn raise_to_top(&self, id: SessionId);

    /// Camera floating window visibility changed (system overlay windows).
    fn notify_camera_float_visibility(&self, id: SessionId, shown: bool);

    /// Asks the window that summoned an input-method window to restore
    /// its pre-keyboard visibility.
    fn notify_calling_window_restore(&self, id: SessionId);
}

/// Caller-identity predicate for privileged operations. Fails closed.
pub trait PermissionGate: Send + Sync {
    /// True when the current caller runs with system privilege.
    fn is_system_caller(&self) -> bool;

    /// True when the current caller may terminate the given session.
    fn can_terminate(&self, id: SessionId) -> bool;
}

/// The full port set threaded into every session at construction.
#[derive(Clone)]
pub struct CollaboratorPorts {
    pub display: Arc<dyn DisplayProvider>,
    pub surface_bridge: Arc<dyn SurfaceBridge>,
    pub registry: Arc<dyn SessionRegistry>,
    pub permissions: Arc<dyn PermissionGate>,
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Canned collaborator implementations used across the crate's tests.

    use super::*;
    use std::sync::Mutex;
    use vela_core::types::geometry::SizeInt;

    #[derive(Default)]
    pub struct StubStage {
        pub active_calls: Mutex<Vec<bool>>,
        pub rect_updates: Mutex<Vec<(RectInt, SizeChangeReason)>>,
        pub dialog_changes: Mutex<Vec<bool>>,
    }

    impl SessionStage for StubStage {
        fn set_active(&self, active: bool) {
            self.active_calls.lock().unwrap().push(active);
        }

        fn update_rect(&self, rect: RectInt, reason: SizeChangeReason) {
            self.rect_updates.lock().unwrap().push((rect, reason));
        }

        fn update_density(&self, _pixel_ratio: f32) {}

        fn notify_dialog_state_change(&self, foreground: bool) {
            self.dialog_changes.lock().unwrap().push(foreground);
        }
    }

    #[derive(Default)]
    pub struct StubChannel {
        pub key_events: Mutex<Vec<KeyEvent>>,
    }

    impl EventChannel for StubChannel {
        fn transfer_key_event(&self, event: &KeyEvent) {
            self.key_events.lock().unwrap().push(*event);
        }
    }

    pub struct FixedDisplayProvider {
        pub fold: FoldScreenStatus,
        pub metrics: DisplayMetrics,
        pub cutouts: Vec<RectInt>,
    }

    impl Default for FixedDisplayProvider {
        fn default() -> Self {
            let full = RectInt::new(0, 0, 1260, 2720);
            Self {
                fold: FoldScreenStatus {
                    posture: Default::default(),
                    full_rect: full,
                    upper_rect: RectInt::new(0, 0, 1260, 1360),
                    lower_rect: RectInt::new(0, 1360, 1260, 1360),
                },
                metrics: DisplayMetrics::new(
                    DisplayId::DEFAULT,
                    SizeInt::new(1260, 2720),
                    1.5,
                    full,
                ),
                cutouts: Vec::new(),
            }
        }
    }

    impl DisplayProvider for FixedDisplayProvider {
        fn fold_status(&self, _display_id: DisplayId) -> FoldScreenStatus {
            self.fold
        }

        fn metrics(&self, _display_id: DisplayId) -> Option<DisplayMetrics> {
            Some(self.metrics)
        }

        fn cutout_rects(&self, _display_id: DisplayId) -> Vec<RectInt> {
            self.cutouts.clone()
        }
    }

    #[derive(Default)]
    pub struct RecordingSurfaceBridge {
        pub attached: Mutex<Vec<(SessionId, SurfaceHandle)>>,
        pub detached: Mutex<Vec<SessionId>>,
    }

    impl SurfaceBridge for RecordingSurfaceBridge {
        fn attach(&self, id: SessionId, surface: SurfaceHandle) {
            self.attached.lock().unwrap().push((id, surface));
        }

        fn detach(&self, id: SessionId) {
            self.detached.lock().unwrap().push(id);
        }
    }

    #[derive(Default)]
    pub struct StubRegistry {
        pub status_bars: Vec<RectInt>,
        pub status_bar_visible: bool,
        pub keyboards: Vec<RectInt>,
        pub nav_indicator: Option<RectInt>,
        pub focus_requests: Mutex<Vec<SessionId>>,
        pub raise_requests: Mutex<Vec<SessionId>>,
        pub camera_notifications: Mutex<Vec<(SessionId, bool)>>,
        pub calling_window_restores: Mutex<Vec<SessionId>>,
    }

    impl SessionRegistry for StubRegistry {
        fn status_bar_rects(&self, _display_id: DisplayId) -> Vec<RectInt> {
            self.status_bars.clone()
        }

        fn is_status_bar_visible(&self, _display_id: DisplayId) -> bool {
            self.status_bar_visible
        }

        fn keyboard_rects(&self, _display_id: DisplayId) -> Vec<RectInt> {
            self.keyboards.clone()
        }

        fn navigation_indicator_rect(&self, _display_id: DisplayId) -> Option<RectInt> {
            self.nav_indicator
        }

        fn present_focus(&self, id: SessionId) {
            self.focus_requests.lock().unwrap().push(id);
        }

        fn raise_to_top(&self, id: SessionId) {
            self.raise_requests.lock().unwrap().push(id);
        }

        fn notify_camera_float_visibility(&self, id: SessionId, shown: bool) {
            self.camera_notifications.lock().unwrap().push((id, shown));
        }

        fn notify_calling_window_restore(&self, id: SessionId) {
            self.calling_window_restores.lock().unwrap().push(id);
        }
    }

    pub struct StaticPermissionGate {
        pub system_caller: bool,
        pub terminate_allowed: bool,
    }

    impl Default for StaticPermissionGate {
        fn default() -> Self {
            Self {
                system_caller: true,
                terminate_allowed: true,
            }
        }
    }

    impl PermissionGate for StaticPermissionGate {
        fn is_system_caller(&self) -> bool {
            self.system_caller
        }

        fn can_terminate(&self, _id: SessionId) -> bool {
            self.terminate_allowed
        }
    }

    pub fn default_ports() -> CollaboratorPorts {
        CollaboratorPorts {
            display: Arc::new(FixedDisplayProvider::default()),
            surface_bridge: Arc::new(RecordingSurfaceBridge::default()),
            registry: Arc::new(StubRegistry::default()),
            permissions: Arc::new(StaticPermissionGate::default()),
        }
    }
}

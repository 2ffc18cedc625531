//! Value types of the session layer: identity, lifecycle states, the
//! window property bag, and decoded input samples.

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use vela_core::types::display::DisplayId;
use vela_core::types::geometry::RectInt;

/// Persistent identifier of one session, stable across reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub i32);

impl SessionId {
    /// The invalid session id.
    pub const INVALID: SessionId = SessionId(0);

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle of the native render surface bound at connect time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

/// Lifecycle state of a session.
///
/// A session starts in `Disconnect`, binds its client in `Connect`, and
/// then alternates between the foreground states (`Foreground`,
/// `Active`) and the background states (`Inactive`, `Background`).
/// `End` is terminal and irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Disconnect,
    Connect,
    Foreground,
    Active,
    Inactive,
    Background,
    End,
}

/// The window's role, selecting the per-category behavioral variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindowCategory {
    /// Ordinary application window.
    #[default]
    Application,
    /// Modal or system overlay window (dialogs, floating system surfaces).
    SystemOverlay,
    /// Input-method / keyboard window.
    InputMethod,
}

/// Why a rect commit happened. Tagged onto every rect-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SizeChangeReason {
    #[default]
    Undefined,
    Maximize,
    Recover,
    Rotation,
    Drag,
    DragStart,
    DragEnd,
    Resize,
    Move,
    Hide,
    Transform,
    CustomAnimationShow,
}

/// Window presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WindowMode {
    #[default]
    Fullscreen,
    Floating,
    SplitPrimary,
    SplitSecondary,
    Pip,
}

/// Maximize layout preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaximizeMode {
    /// Maximized content still avoids the system bars.
    #[default]
    AvoidSystemBar,
    /// Maximized content fills the whole display.
    FullFill,
}

/// Animation behavior requested by the client for show/hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationFlag {
    #[default]
    Default,
    /// The client drives its own animation; backgrounding is deferred to
    /// the animation-completion callback.
    Custom,
}

/// Requested display orientation carried in the property bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Unspecified,
    Portrait,
    Landscape,
    PortraitInverted,
    LandscapeInverted,
    AutoRotation,
}

/// Visual state a reconnecting client claims to be in. Only `Created`,
/// `Shown`, and `Hidden` are acceptable for recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestedVisualState {
    #[default]
    Initial,
    Created,
    Shown,
    Hidden,
}

bitflags! {
    /// Boolean window properties packed into a flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowFlags: u32 {
        /// Content lays itself out around the system-reserved regions.
        const NEED_AVOID = 1 << 0;
        /// The window may be shown above the lock screen.
        const SHOW_WHEN_LOCKED = 1 << 1;
        /// Window never participates in split-screen moves.
        const FORBID_SPLIT_MOVE = 1 << 2;
        /// Compositor stamps a watermark over the content.
        const WATER_MARK = 1 << 3;
        /// Window is exempt from avoid-area computation entirely
        /// (e.g. the desktop background layer).
        const AVOID_AREA_EXEMPT = 1 << 4;
        /// The window hosts the floating camera preview; the registry is
        /// told whenever its visibility changes.
        const CAMERA_FLOAT = 1 << 5;
    }
}

impl Default for WindowFlags {
    fn default() -> Self {
        WindowFlags::empty()
    }
}

/// Modality of a window, derived from its creation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModalityKind {
    #[default]
    NonModal,
    /// Blocks interaction with its parent window.
    WindowModal,
    /// Blocks interaction with the whole owning application.
    ApplicationModal,
}

/// Size constraints of a window, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimits {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            min_width: 0,
            min_height: 0,
            max_width: u32::MAX,
            max_height: u32::MAX,
        }
    }
}

/// The per-session property bag.
///
/// Mutated exclusively inside the owning session's task queue; external
/// readers only ever see snapshots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionProperty {
    pub flags: u32,
    pub window_mode: WindowMode,
    pub animation: AnimationFlag,
    pub turn_screen_on: bool,
    pub keep_screen_on: bool,
    pub requested_orientation: Orientation,
    /// Requested brightness in [0.0, 1.0]; negative means "follow system".
    pub brightness: f32,
    pub maximize_mode: MaximizeMode,
    pub modality: ModalityKind,
    pub topmost: bool,
    pub drag_enabled: bool,
    pub raise_enabled: bool,
    pub decor_enabled: bool,
    pub limits: WindowLimits,
    pub display_id: DisplayId,
    pub requested_visual_state: RequestedVisualState,
    /// Temporarily forces the status bar visible above this window.
    pub force_show_status_bar: bool,
    /// The window runs under forced-compatibility scaling; fixed avoid
    /// bands replace the computed ones.
    pub compat_scale_mode: bool,
    /// Protected system surface; hiding it requires system privilege.
    pub protected_system_window: bool,
}

impl SessionProperty {
    pub fn window_flags(&self) -> WindowFlags {
        WindowFlags::from_bits_truncate(self.flags)
    }

    pub fn has_flag(&self, flag: WindowFlags) -> bool {
        self.window_flags().contains(flag)
    }

    pub fn set_flag(&mut self, flag: WindowFlags, value: bool) {
        let mut flags = self.window_flags();
        flags.set(flag, value);
        self.flags = flags.bits();
    }
}

/// Immutable creation information of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub category: WindowCategory,
    pub app_id: String,
    pub window_name: String,
    pub identity_token: Uuid,
    pub created_at: DateTime<Utc>,
}

impl SessionInfo {
    pub fn new(
        id: SessionId,
        category: WindowCategory,
        app_id: impl Into<String>,
        window_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category,
            app_id: app_id.into(),
            window_name: window_name.into(),
            identity_token: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }
}

/// Termination request payload handed to the termination hook.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TerminateInfo {
    pub app_id: String,
    pub window_name: String,
    pub result_code: i32,
}

/// Pointer sample action, already decoded by the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerAction {
    Down,
    Move,
    Up,
    Cancel,
    /// Terminal "pointer left the window" event; always dispatched.
    Leave,
}

/// One decoded pointer sample in display-group coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub pointer_id: i32,
    /// Source device that produced the sample (mouse, touch, ...).
    pub device_id: i32,
    pub action: PointerAction,
    pub display_id: DisplayId,
    pub display_x: i32,
    pub display_y: i32,
    /// Position relative to the window's own origin.
    pub window_x: i32,
    pub window_y: i32,
}

impl PointerSample {
    pub fn position(&self) -> (i32, i32) {
        (self.display_x, self.display_y)
    }
}

/// Key event action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    Down,
    Up,
}

/// One decoded key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key_code: i32,
    pub action: KeyAction,
}

/// A read-only view of a session published after every queue task.
///
/// External readers must not assume freshness beyond the snapshot's
/// capture point.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub category: WindowCategory,
    pub state: SessionState,
    pub is_active: bool,
    pub is_terminating: bool,
    pub rect: RectInt,
    pub display_id: DisplayId,
    pub window_mode: WindowMode,
    pub need_avoid: bool,
    pub is_modal: bool,
    pub is_topmost: bool,
}

impl SessionSnapshot {
    /// Foreground in the wide sense: visible to the user.
    pub fn is_foreground(&self) -> bool {
        matches!(self.state, SessionState::Foreground | SessionState::Active)
    }
}

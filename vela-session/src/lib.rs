//! Session-lifecycle and geometry-coordination core for the Vela window
//! management service.
//!
//! For every on-screen window this crate tracks a state machine,
//! serializes all state-mutating operations through a per-window serial
//! task queue, drives interactive move/resize under live pointer input
//! coalesced to the display refresh cycle, and computes the
//! system-reserved avoid regions a window's content must not be covered
//! by, including fold-posture and pixel-density adjustments.
//!
//! Out of scope, reachable only through the ports in [`ports`]:
//! transport/marshalling, display topology, rendering, and the global
//! z-order/focus registry.

pub mod avoid_area;
pub mod config;
pub mod error;
pub mod events;
pub mod move_drag;
pub mod ports;
pub mod session;
pub mod task_queue;
pub mod types;

pub use avoid_area::{AvoidArea, AvoidAreaEngine, AvoidAreaType};
pub use config::{FormFactor, SessionCoreConfig};
pub use error::{SessionError, SessionResult};
pub use events::{
    AnimationListener, FocusChangeListener, RectChangeListener, SessionObservers,
    StateChangeListener, TerminationListener,
};
pub use move_drag::{DragArea, DragKind, MoveDragController};
pub use ports::{
    CollaboratorPorts, DisplayProvider, EventChannel, PermissionGate, SessionRegistry,
    SessionStage, SurfaceBridge,
};
pub use session::{Session, SessionArena, SessionBuilder, SessionLifecycle};
pub use types::{
    AnimationFlag, KeyEvent, MaximizeMode, PointerAction, PointerSample, SessionId, SessionInfo,
    SessionProperty, SessionSnapshot, SessionState, SizeChangeReason, SurfaceHandle,
    TerminateInfo, WindowCategory, WindowFlags, WindowMode,
};

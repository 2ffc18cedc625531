//! Interactive move/drag/resize geometry engine.
//!
//! Consumes already-decoded pointer samples and produces candidate
//! rectangles for the owning session to commit. All mutation happens
//! from within the session's serial task queue.

mod controller;
mod hot_zone;

pub use controller::{DragKind, DragOutcome, MoveDragContext, MoveDragController};
pub use hot_zone::{classify_drag_area, DragArea, HotZones, PointerKind};

//! The window session: state machine, category policies, and the public
//! handle/arena surface.

mod arena;
mod core;
mod handle;
mod policy;

pub use arena::SessionArena;
pub use handle::{Session, SessionBuilder, SessionLifecycle};
pub(crate) use policy::CategoryPolicy;

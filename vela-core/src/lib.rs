//! Core infrastructure layer for the Vela window management service.
//!
//! This crate provides the foundational pieces shared by the higher layers:
//! geometric primitives, display and fold-posture types, the core error
//! taxonomy, configuration loading, and logging initialization. It has no
//! knowledge of window sessions; that lives in `vela-session`.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{ConfigLoader, CoreConfig, LoggingConfig};
pub use error::{ConfigError, CoreError, LoggingError};
pub use types::display::{DisplayId, DisplayMetrics, FoldPosture, FoldScreenStatus};
pub use types::geometry::{Point, PointInt, Rect, RectInt, Size, SizeInt};

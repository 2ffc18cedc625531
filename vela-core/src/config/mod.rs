//! Configuration handling for the Vela core layer.
//!
//! Configuration is declared as plain serde types, with defaults supplied
//! by the `defaults` module and TOML loading by `ConfigLoader`.

mod defaults;
mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CoreConfig, LoggingConfig, LogFormat};

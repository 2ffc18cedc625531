//! Default values for configuration fields.

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

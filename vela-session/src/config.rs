//! Immutable configuration of the session core.
//!
//! All tunables that used to be process-wide toggles in older window
//! managers are threaded explicitly into the constructors of the session,
//! the move/drag controller, and the avoid-area engine. Lengths are in
//! device-independent pixels unless stated otherwise and are scaled by
//! the display's current pixel ratio at the point of use.

use serde::{Deserialize, Serialize};

/// Coarse device form factor; drives pointer-dispatch filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormFactor {
    #[default]
    Phone,
    Tablet,
    /// Pointer-first large screens; background windows do not receive
    /// pointer events.
    LargeScreen,
}

/// Configuration shared by the session state machine and both geometry
/// engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SessionCoreConfig {
    /// Minimum width of a floating window.
    pub min_floating_width: u32,
    /// Minimum height of a floating window.
    pub min_floating_height: u32,
    /// Upper bound applied to both floating dimensions; 0 disables it.
    pub max_floating_size: u32,
    /// Width of the resize frame band along window edges.
    pub frame_band_width: u32,
    /// Side length of the corner-exclusion square.
    pub corner_band_width: u32,
    /// Outward hot-zone extension for precise pointer devices.
    pub hot_zone_pointer: u32,
    /// Outward hot-zone extension for touch input.
    pub hot_zone_touch: u32,
    /// Height of the title-bar band validated against the limiting rect.
    pub title_bar_height: u32,
    /// Fixed status-bar band height used when no concrete bar rect is
    /// reported.
    pub status_bar_height: u32,
    /// Fixed navigation-indicator band height.
    pub nav_indicator_height: u32,
    /// Fixed top band substituted under forced-compatibility scaling.
    pub compat_top_band_height: u32,
    /// Fixed bottom band substituted under forced-compatibility scaling.
    pub compat_bottom_band_height: u32,
    /// Height of the grab bar granted to pressed floating windows.
    pub floating_bar_height: u32,
    /// Whether floating windows render above full-screen windows.
    pub floating_above_fullscreen: bool,
    pub form_factor: FormFactor,
}

impl Default for SessionCoreConfig {
    fn default() -> Self {
        Self {
            min_floating_width: 226,
            min_floating_height: 226,
            max_floating_size: 1920,
            frame_band_width: 5,
            corner_band_width: 16,
            hot_zone_pointer: 4,
            hot_zone_touch: 20,
            title_bar_height: 32,
            status_bar_height: 36,
            nav_indicator_height: 24,
            compat_top_band_height: 40,
            compat_bottom_band_height: 28,
            floating_bar_height: 32,
            floating_above_fullscreen: false,
            form_factor: FormFactor::Phone,
        }
    }
}

impl SessionCoreConfig {
    /// Scales a device-independent length by the pixel ratio, guarding
    /// degenerate ratios. A near-zero ratio is treated as 1.0 so the
    /// geometry engines clamp rather than error on bad display data.
    pub fn scaled(&self, length: u32, pixel_ratio: f32) -> i32 {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > f32::EPSILON {
            pixel_ratio
        } else {
            1.0
        };
        (length as f32 * ratio).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_guards_degenerate_pixel_ratio() {
        let config = SessionCoreConfig::default();
        assert_eq!(config.scaled(10, 0.0), 10);
        assert_eq!(config.scaled(10, f32::NAN), 10);
        assert_eq!(config.scaled(10, 1.5), 15);
    }

    #[test]
    fn default_minimums_are_positive() {
        let config = SessionCoreConfig::default();
        assert!(config.min_floating_width > 0);
        assert!(config.min_floating_height > 0);
        assert!(config.corner_band_width > config.frame_band_width);
    }
}

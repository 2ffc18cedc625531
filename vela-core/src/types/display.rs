//! Display identity, metrics, and fold-posture types.
//!
//! These are read-only inputs to the session layer. Ownership of the
//! actual values lies with the display collaborator; the session core is
//! a pure consumer of whatever posture enumeration the provider supplies.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geometry::{RectInt, SizeInt};

/// Identifier of a physical or virtual display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisplayId(pub u64);

impl DisplayId {
    /// The sentinel for "no display known".
    pub const INVALID: DisplayId = DisplayId(u64::MAX);

    /// The default display of the primary display group.
    pub const DEFAULT: DisplayId = DisplayId(0);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl Default for DisplayId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical configuration of a foldable display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FoldPosture {
    /// Fully opened, the whole panel is one display surface.
    #[default]
    Expanded,
    /// Folded to roughly a right angle; only the upper half faces the user.
    HalfFolded,
    /// Fully closed.
    Folded,
    /// Half folded with a physical keyboard covering the lower half.
    KeyboardOverlay,
    /// The provider could not determine the posture.
    Unknown,
}

/// Posture plus the reference rectangles for the current posture.
///
/// `full_rect` spans the entire panel; `upper_rect` and `lower_rect`
/// describe the two halves split at the crease. All three are in
/// display-group coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FoldScreenStatus {
    pub posture: FoldPosture,
    pub full_rect: RectInt,
    pub upper_rect: RectInt,
    pub lower_rect: RectInt,
}

impl FoldScreenStatus {
    /// The rectangle windows should be laid out against under the
    /// current posture. Half-folded and keyboard-overlay postures expose
    /// only the upper half.
    pub fn effective_rect(&self) -> RectInt {
        match self.posture {
            FoldPosture::HalfFolded | FoldPosture::KeyboardOverlay => self.upper_rect,
            _ => self.full_rect,
        }
    }
}

/// Geometry and density of one display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub id: DisplayId,
    /// Full display size in pixels.
    pub size: SizeInt,
    /// Device pixel ratio (vpr) applied to device-independent lengths.
    pub pixel_ratio: f32,
    /// The rectangle a dragged window's title bar must stay within.
    pub limiting_rect: RectInt,
}

impl DisplayMetrics {
    pub fn new(id: DisplayId, size: SizeInt, pixel_ratio: f32, limiting_rect: RectInt) -> Self {
        Self {
            id,
            size,
            pixel_ratio,
            limiting_rect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::geometry::RectInt;

    fn status(posture: FoldPosture) -> FoldScreenStatus {
        FoldScreenStatus {
            posture,
            full_rect: RectInt::new(0, 0, 1200, 2000),
            upper_rect: RectInt::new(0, 0, 1200, 1000),
            lower_rect: RectInt::new(0, 1000, 1200, 1000),
        }
    }

    #[test]
    fn expanded_uses_full_rect() {
        assert_eq!(
            status(FoldPosture::Expanded).effective_rect(),
            RectInt::new(0, 0, 1200, 2000)
        );
    }

    #[test]
    fn half_folded_and_keyboard_use_upper_rect() {
        assert_eq!(
            status(FoldPosture::HalfFolded).effective_rect(),
            RectInt::new(0, 0, 1200, 1000)
        );
        assert_eq!(
            status(FoldPosture::KeyboardOverlay).effective_rect(),
            RectInt::new(0, 0, 1200, 1000)
        );
    }

    #[test]
    fn invalid_display_id() {
        assert!(!DisplayId::INVALID.is_valid());
        assert!(DisplayId::DEFAULT.is_valid());
    }
}

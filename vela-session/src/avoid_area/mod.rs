//! Avoid-area computation: the system-reserved regions a window's
//! content must not be covered by.

mod engine;

pub use engine::{AvoidAreaContext, AvoidAreaEngine};

use serde::{Deserialize, Serialize};
use vela_core::types::geometry::RectInt;

/// Which class of reserved region is being queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AvoidAreaType {
    /// Status-bar-class system surfaces.
    System,
    /// Display cutouts (camera notches, punch holes).
    Cutout,
    /// Docked input-method panels.
    Keyboard,
    /// The navigation indicator strip.
    NavigationIndicator,
}

impl AvoidAreaType {
    pub const ALL: [AvoidAreaType; 4] = [
        AvoidAreaType::System,
        AvoidAreaType::Cutout,
        AvoidAreaType::Keyboard,
        AvoidAreaType::NavigationIndicator,
    ];
}

/// Up to four directional rectangles, each relative to the window's own
/// origin. Recomputed on demand, never persisted across unrelated rect
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvoidArea {
    pub top: RectInt,
    pub left: RectInt,
    pub right: RectInt,
    pub bottom: RectInt,
}

impl AvoidArea {
    pub const EMPTY: AvoidArea = AvoidArea {
        top: RectInt::ZERO,
        left: RectInt::ZERO,
        right: RectInt::ZERO,
        bottom: RectInt::ZERO,
    };

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
            && self.left.is_empty()
            && self.right.is_empty()
            && self.bottom.is_empty()
    }

    /// Classifies `avoid_rect`'s overlap with `window_rect` into one of
    /// the four directional slots, relative to the window origin.
    ///
    /// The direction is picked by testing the overlap's center against
    /// the window's two diagonals: above both diagonals is top, below
    /// both is bottom, and the side wedges are left/right.
    pub fn accumulate(&mut self, window_rect: &RectInt, avoid_rect: &RectInt) {
        if window_rect.is_empty() || avoid_rect.is_empty() {
            return;
        }
        let overlap = window_rect.overlap_relative_to(avoid_rect, window_rect.x, window_rect.y);
        if overlap.is_empty() {
            return;
        }
        let center_x = (overlap.x + overlap.w / 2) as f32;
        let center_y = (overlap.y + overlap.h / 2) as f32;
        let slope = window_rect.h as f32 / window_rect.w.max(1) as f32;
        let above_falling = center_y - slope * center_x;
        let below_rising = center_y + slope * center_x - window_rect.h as f32;
        if above_falling < 0.0 {
            if below_rising < 0.0 {
                self.top = overlap;
            } else {
                self.right = overlap;
            }
        } else if below_rising < 0.0 {
            self.left = overlap;
        } else {
            self.bottom = overlap;
        }
    }
}

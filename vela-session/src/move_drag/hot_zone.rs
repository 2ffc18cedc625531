//! Hot-zone classification for drag gestures.
//!
//! A window border is split into a frame band and four corner squares.
//! A gesture that starts strictly inside the corner-exclusion rectangle
//! is an edge drag (one dimension adjusts); anywhere else on the border
//! it is a corner drag (both dimensions adjust).

use bitflags::bitflags;

use vela_core::types::geometry::RectInt;

use crate::config::SessionCoreConfig;
use crate::types::PointerSample;

bitflags! {
    /// Which edges of the window the gesture grabbed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DragArea: u8 {
        const LEFT = 1 << 0;
        const TOP = 1 << 1;
        const RIGHT = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl Default for DragArea {
    fn default() -> Self {
        DragArea::empty()
    }
}

impl DragArea {
    pub const LEFT_TOP: DragArea = DragArea::LEFT.union(DragArea::TOP);
    pub const RIGHT_TOP: DragArea = DragArea::RIGHT.union(DragArea::TOP);
    pub const LEFT_BOTTOM: DragArea = DragArea::LEFT.union(DragArea::BOTTOM);
    pub const RIGHT_BOTTOM: DragArea = DragArea::RIGHT.union(DragArea::BOTTOM);

    /// True for the four corner grabs.
    pub fn is_corner(&self) -> bool {
        let horizontal = self.intersects(DragArea::LEFT | DragArea::RIGHT);
        let vertical = self.intersects(DragArea::TOP | DragArea::BOTTOM);
        horizontal && vertical
    }
}

/// Source device kind, deciding how far the hot zone extends outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

impl PointerKind {
    /// Device ids at or above this value are touch-class in the decoded
    /// sample stream.
    pub fn from_device_id(device_id: i32) -> Self {
        if device_id == 0 {
            PointerKind::Mouse
        } else {
            PointerKind::Touch
        }
    }
}

/// The two exclusion rectangles derived from a gesture-start rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HotZones {
    /// Window rect shrunk by the frame band; points inside are not a drag.
    pub except_frame: RectInt,
    /// Window rect shrunk by the corner band; points inside it but on the
    /// frame band are edge drags.
    pub except_corner: RectInt,
}

impl HotZones {
    /// Derives the hot zones from the gesture-start rectangle at the
    /// given pixel ratio.
    pub fn derive(rect: &RectInt, config: &SessionCoreConfig, pixel_ratio: f32) -> Self {
        let frame = config.scaled(config.frame_band_width, pixel_ratio);
        let corner = config.scaled(config.corner_band_width, pixel_ratio);
        Self {
            except_frame: rect.inset(frame),
            except_corner: rect.inset(corner),
        }
    }
}

/// Classifies where a gesture start point grabs the window.
///
/// Returns `DragArea::empty()` when the point is inside the content area
/// (a move, not a resize) or entirely outside the outward hot zone.
pub fn classify_drag_area(
    sample: &PointerSample,
    rect: &RectInt,
    config: &SessionCoreConfig,
    pixel_ratio: f32,
) -> DragArea {
    let kind = PointerKind::from_device_id(sample.device_id);
    let outside = match kind {
        PointerKind::Mouse => config.scaled(config.hot_zone_pointer, pixel_ratio),
        PointerKind::Touch => config.scaled(config.hot_zone_touch, pixel_ratio),
    };
    let (px, py) = sample.position();

    let with_hot_zone = rect.outset(outside);
    if !with_hot_zone.contains_point(px, py) {
        return DragArea::empty();
    }

    let zones = HotZones::derive(rect, config, pixel_ratio);
    if zones.except_frame.contains_point(px, py) {
        return DragArea::empty();
    }

    let mut area = DragArea::empty();
    if px <= zones.except_corner.x {
        area |= DragArea::LEFT;
    } else if px >= zones.except_corner.right() {
        area |= DragArea::RIGHT;
    }
    if py <= zones.except_corner.y {
        area |= DragArea::TOP;
    } else if py >= zones.except_corner.bottom() {
        area |= DragArea::BOTTOM;
    }

    // A point on the frame band but clear of both corner bands grabs the
    // nearest single edge.
    if area.is_empty() {
        let distances = [
            (px - rect.x, DragArea::LEFT),
            (rect.right() - px, DragArea::RIGHT),
            (py - rect.y, DragArea::TOP),
            (rect.bottom() - py, DragArea::BOTTOM),
        ];
        if let Some((_, nearest)) = distances
            .iter()
            .filter(|(d, _)| *d >= 0)
            .min_by_key(|(d, _)| *d)
        {
            area = *nearest;
        }
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use vela_core::types::display::DisplayId;
    use crate::types::PointerAction;

    fn sample_at(x: i32, y: i32) -> PointerSample {
        PointerSample {
            pointer_id: 1,
            device_id: 0,
            action: PointerAction::Down,
            display_id: DisplayId::DEFAULT,
            display_x: x,
            display_y: y,
            window_x: 0,
            window_y: 0,
        }
    }

    fn config() -> SessionCoreConfig {
        SessionCoreConfig::default()
    }

    #[rstest]
    #[case(0, 0, DragArea::LEFT_TOP)]
    #[case(800, 0, DragArea::RIGHT_TOP)]
    #[case(0, 800, DragArea::LEFT_BOTTOM)]
    #[case(800, 800, DragArea::RIGHT_BOTTOM)]
    fn corners_classify_as_corner_drags(
        #[case] x: i32,
        #[case] y: i32,
        #[case] expected: DragArea,
    ) {
        let rect = RectInt::new(0, 0, 800, 800);
        let area = classify_drag_area(&sample_at(x, y), &rect, &config(), 1.0);
        assert_eq!(area, expected);
        assert!(area.is_corner());
    }

    #[test]
    fn frame_band_midpoint_is_edge_drag() {
        let rect = RectInt::new(0, 0, 800, 800);
        // On the left frame band, vertically centered: inside the
        // corner-exclusion rect, outside the frame-exclusion rect.
        let area = classify_drag_area(&sample_at(2, 400), &rect, &config(), 1.0);
        assert_eq!(area, DragArea::LEFT);
        assert!(!area.is_corner());
    }

    #[test]
    fn interior_point_is_not_a_drag() {
        let rect = RectInt::new(0, 0, 800, 800);
        let area = classify_drag_area(&sample_at(400, 400), &rect, &config(), 1.0);
        assert!(area.is_empty());
    }

    #[test]
    fn far_outside_point_is_not_a_drag() {
        let rect = RectInt::new(0, 0, 800, 800);
        let area = classify_drag_area(&sample_at(900, 400), &rect, &config(), 1.0);
        assert!(area.is_empty());
    }

    #[test]
    fn touch_hot_zone_extends_further_out() {
        let rect = RectInt::new(100, 100, 800, 800);
        let mut touch = sample_at(90, 400);
        touch.device_id = 7;
        let area = classify_drag_area(&touch, &rect, &config(), 1.0);
        assert_eq!(area, DragArea::LEFT);

        let mouse = sample_at(90, 400);
        assert!(classify_drag_area(&mouse, &rect, &config(), 1.0).is_empty());
    }
}

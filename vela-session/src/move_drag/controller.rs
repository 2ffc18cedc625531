//! Interactive move/resize geometry controller.
//!
//! The controller is `Idle` until a gesture starts, `Active` while one is
//! running, and returns to `Idle` on end, cancel, or owner destruction.
//! Pointer-move samples are coalesced to one computation per display
//! refresh tick; the owning session drives `on_refresh_tick` and commits
//! whatever candidate rectangle the controller accepts.

use std::sync::Arc;
use tracing::{debug, info};

use vela_core::types::display::{DisplayId, DisplayMetrics};
use vela_core::types::geometry::RectInt;

use crate::config::SessionCoreConfig;
use crate::error::{SessionError, SessionResult};
use crate::types::{PointerSample, SessionId, SessionProperty, SizeChangeReason};

use super::hot_zone::{classify_drag_area, DragArea, HotZones};

/// Pixel ratios below this cannot be used for validation.
const NEAR_ZERO: f32 = 0.001;

/// Whether the gesture moves the window or resizes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Displacement bounds derived from the window limits at gesture start.
#[derive(Debug, Clone, Copy)]
struct TranslateLimits {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl Default for TranslateLimits {
    fn default() -> Self {
        Self {
            min_x: i32::MIN,
            max_x: i32::MAX,
            min_y: i32::MIN,
            max_y: i32::MAX,
        }
    }
}

/// Window dimension bounds with the density-scaled floating minimum
/// already applied.
#[derive(Debug, Clone, Copy)]
struct ScaledLimits {
    min_w: i32,
    min_h: i32,
    max_w: i32,
    max_h: i32,
}

impl ScaledLimits {
    fn derive(property: &SessionProperty, config: &SessionCoreConfig, pixel_ratio: f32) -> Self {
        let min_w = (property.limits.min_width as i64)
            .max(config.scaled(config.min_floating_width, pixel_ratio) as i64)
            as i32;
        let min_h = (property.limits.min_height as i64)
            .max(config.scaled(config.min_floating_height, pixel_ratio) as i64)
            as i32;
        let mut max_w = property.limits.max_width.min(i32::MAX as u32) as i32;
        let mut max_h = property.limits.max_height.min(i32::MAX as u32) as i32;
        if config.max_floating_size > 0 {
            let cap = config.scaled(config.max_floating_size, pixel_ratio);
            max_w = max_w.min(cap);
            max_h = max_h.min(cap);
        }
        Self {
            min_w,
            min_h,
            max_w: max_w.max(min_w),
            max_h: max_h.max(min_h),
        }
    }
}

/// State captured for the lifetime of one gesture.
#[derive(Debug, Clone)]
pub struct MoveDragContext {
    pub kind: DragKind,
    pub area: DragArea,
    /// Pointer that initiated the gesture; -1 adopts the first sample.
    pub pointer_id: i32,
    pub device_id: i32,
    pub start_pointer_x: i32,
    pub start_pointer_y: i32,
    pub start_rect: RectInt,
    pub target_rect: RectInt,
    pub display_id: DisplayId,
    pub hot_zones: HotZones,
    limits: TranslateLimits,
    scaled: ScaledLimits,
    main_axis: Option<Axis>,
}

/// An accepted geometry step the session should commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    pub rect: RectInt,
    pub reason: SizeChangeReason,
}

/// Per-session move/drag controller.
pub struct MoveDragController {
    session_id: SessionId,
    config: Arc<SessionCoreConfig>,
    aspect_ratio: f32,
    context: Option<MoveDragContext>,
    /// Latest pointer-move sample since the last refresh tick.
    pending_sample: Option<PointerSample>,
    has_point_down: bool,
}

impl MoveDragController {
    pub fn new(session_id: SessionId, config: Arc<SessionCoreConfig>) -> Self {
        Self {
            session_id,
            config,
            aspect_ratio: 0.0,
            context: None,
            pending_sample: None,
            has_point_down: false,
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_move_active(&self) -> bool {
        matches!(
            self.context,
            Some(MoveDragContext {
                kind: DragKind::Move,
                ..
            })
        )
    }

    pub fn is_drag_active(&self) -> bool {
        matches!(
            self.context,
            Some(MoveDragContext {
                kind: DragKind::Resize,
                ..
            })
        )
    }

    pub fn target_rect(&self) -> Option<RectInt> {
        self.context.as_ref().map(|ctx| ctx.target_rect)
    }

    /// The context of the running gesture, if any.
    pub fn context(&self) -> Option<&MoveDragContext> {
        self.context.as_ref()
    }

    /// Locks the drag aspect ratio; zero disables the lock.
    pub fn set_aspect_ratio(&mut self, ratio: f32) {
        self.aspect_ratio = ratio;
    }

    /// Starts a programmatic move anchored at the given pointer position.
    pub fn start_moving_with_coordinate(
        &mut self,
        anchor_x: i32,
        anchor_y: i32,
        width: i32,
        height: i32,
        current_rect: RectInt,
        display_id: DisplayId,
        pixel_ratio: f32,
    ) -> SessionResult<()> {
        if self.is_gesture_active() {
            info!(id = %self.session_id, "move already in progress");
            return Err(SessionError::RepeatOperation);
        }
        if width <= 0 || height <= 0 {
            return Err(SessionError::InvalidParam);
        }
        let start_rect = RectInt::new(current_rect.x, current_rect.y, width, height);
        self.context = Some(MoveDragContext {
            kind: DragKind::Move,
            area: DragArea::empty(),
            pointer_id: -1,
            device_id: -1,
            start_pointer_x: anchor_x,
            start_pointer_y: anchor_y,
            start_rect,
            target_rect: start_rect,
            display_id,
            hot_zones: HotZones::derive(&start_rect, &self.config, pixel_ratio),
            limits: TranslateLimits::default(),
            scaled: ScaledLimits {
                min_w: 1,
                min_h: 1,
                max_w: i32::MAX,
                max_h: i32::MAX,
            },
            main_axis: None,
        });
        self.has_point_down = true;
        Ok(())
    }

    /// Handles a pointer-down sample. Starts a resize gesture when the
    /// point grabs a hot zone on a drag-enabled window.
    pub fn handle_down(
        &mut self,
        sample: &PointerSample,
        current_rect: RectInt,
        property: &SessionProperty,
        pixel_ratio: f32,
    ) -> Option<DragOutcome> {
        if self.is_gesture_active() {
            // A second down while a gesture runs terminates it.
            return self.finish_gesture();
        }
        self.has_point_down = true;
        if !property.drag_enabled {
            return None;
        }
        let area = classify_drag_area(sample, &current_rect, &self.config, pixel_ratio);
        if area.is_empty() {
            return None;
        }
        let scaled = ScaledLimits::derive(property, &self.config, pixel_ratio);
        let limits = freeform_translate_limits(area, &current_rect, &scaled);
        self.context = Some(MoveDragContext {
            kind: DragKind::Resize,
            area,
            pointer_id: sample.pointer_id,
            device_id: sample.device_id,
            start_pointer_x: sample.display_x,
            start_pointer_y: sample.display_y,
            start_rect: current_rect,
            target_rect: current_rect,
            display_id: sample.display_id,
            hot_zones: HotZones::derive(&current_rect, &self.config, pixel_ratio),
            limits,
            scaled,
            main_axis: None,
        });
        debug!(id = %self.session_id, ?area, "resize gesture started");
        Some(DragOutcome {
            rect: current_rect,
            reason: SizeChangeReason::DragStart,
        })
    }

    /// Coalesces a pointer-move sample; only the latest sample per
    /// refresh tick is processed. Samples from a pointer other than the
    /// gesture's initiator are ignored.
    pub fn coalesce_move(&mut self, sample: &PointerSample) {
        let Some(ctx) = self.context.as_ref() else {
            return;
        };
        if ctx.pointer_id >= 0 && sample.pointer_id != ctx.pointer_id {
            debug!(id = %self.session_id, "ignoring sample from unrelated pointer");
            return;
        }
        if ctx.device_id >= 0 && sample.device_id != ctx.device_id {
            return;
        }
        self.pending_sample = Some(*sample);
    }

    /// Runs one geometry computation for the latest coalesced sample.
    ///
    /// `metrics` describes the pointer's current display; `None`, or a
    /// near-zero pixel ratio, disables the limiting-rect validation.
    pub fn on_refresh_tick(&mut self, metrics: Option<&DisplayMetrics>) -> Option<DragOutcome> {
        let sample = self.pending_sample.take()?;
        let ctx = self.context.as_mut()?;
        if ctx.pointer_id < 0 {
            ctx.pointer_id = sample.pointer_id;
            ctx.device_id = sample.device_id;
        }
        let tran_x = sample.display_x - ctx.start_pointer_x;
        let tran_y = sample.display_y - ctx.start_pointer_y;

        let (candidate, reason) = match ctx.kind {
            DragKind::Move => (
                RectInt::new(
                    ctx.start_rect.x + tran_x,
                    ctx.start_rect.y + tran_y,
                    ctx.start_rect.w,
                    ctx.start_rect.h,
                ),
                SizeChangeReason::Move,
            ),
            DragKind::Resize => {
                let rect = if self.aspect_ratio > NEAR_ZERO {
                    fixed_aspect_target_rect(ctx, tran_x, tran_y, self.aspect_ratio)
                } else {
                    freeform_target_rect(ctx, tran_x, tran_y)
                };
                (rect, SizeChangeReason::Drag)
            }
        };

        if !passes_limit_check(&candidate, metrics, &self.config) {
            debug!(id = %self.session_id, %candidate, "candidate rejected by limiting rect");
            return None;
        }
        ctx.target_rect = candidate;
        Some(DragOutcome {
            rect: candidate,
            reason,
        })
    }

    /// Handles pointer-up/cancel. Ends any active gesture.
    pub fn handle_up(&mut self, sample: &PointerSample) -> Option<DragOutcome> {
        self.has_point_down = false;
        match self.context.as_ref() {
            Some(ctx) if ctx.pointer_id < 0 || ctx.pointer_id == sample.pointer_id => {
                self.finish_gesture()
            }
            _ => None,
        }
    }

    /// Ends the gesture in response to focus loss.
    pub fn on_lost_focus(&mut self) -> Option<DragOutcome> {
        if self.is_gesture_active() {
            info!(id = %self.session_id, "gesture stopped on focus loss");
            self.finish_gesture()
        } else {
            None
        }
    }

    /// Unconditional, immediate cancellation: the context is discarded
    /// and in-flight samples are suppressed. Used when the owning session
    /// is destroyed or disconnected mid-gesture.
    pub fn reset(&mut self) {
        if self.context.take().is_some() {
            info!(id = %self.session_id, "gesture context discarded");
        }
        self.pending_sample = None;
        self.has_point_down = false;
    }

    fn finish_gesture(&mut self) -> Option<DragOutcome> {
        let ctx = self.context.take()?;
        self.pending_sample = None;
        Some(DragOutcome {
            rect: ctx.target_rect,
            reason: SizeChangeReason::DragEnd,
        })
    }
}

fn freeform_translate_limits(
    area: DragArea,
    rect: &RectInt,
    scaled: &ScaledLimits,
) -> TranslateLimits {
    let mut limits = TranslateLimits::default();
    if area.contains(DragArea::LEFT) {
        limits.min_x = rect.w.saturating_sub(scaled.max_w);
        limits.max_x = rect.w.saturating_sub(scaled.min_w);
    } else if area.contains(DragArea::RIGHT) {
        limits.min_x = scaled.min_w.saturating_sub(rect.w);
        limits.max_x = scaled.max_w.saturating_sub(rect.w);
    }
    if area.contains(DragArea::TOP) {
        limits.min_y = rect.h.saturating_sub(scaled.max_h);
        limits.max_y = rect.h.saturating_sub(scaled.min_h);
    } else if area.contains(DragArea::BOTTOM) {
        limits.min_y = scaled.min_h.saturating_sub(rect.h);
        limits.max_y = scaled.max_h.saturating_sub(rect.h);
    }
    limits
}

fn fix_translate_by_limits(limits: &TranslateLimits, tran_x: &mut i32, tran_y: &mut i32) {
    *tran_x = (*tran_x).clamp(limits.min_x, limits.max_x);
    *tran_y = (*tran_y).clamp(limits.min_y, limits.max_y);
}

fn freeform_target_rect(ctx: &MoveDragContext, mut tran_x: i32, mut tran_y: i32) -> RectInt {
    fix_translate_by_limits(&ctx.limits, &mut tran_x, &mut tran_y);
    let mut target = ctx.start_rect;
    if ctx.area.contains(DragArea::LEFT) {
        target.x += tran_x;
        target.w -= tran_x;
    } else if ctx.area.contains(DragArea::RIGHT) {
        target.w += tran_x;
    }
    if ctx.area.contains(DragArea::TOP) {
        target.y += tran_y;
        target.h -= tran_y;
    } else if ctx.area.contains(DragArea::BOTTOM) {
        target.h += tran_y;
    }
    target
}

fn init_main_axis(ctx: &mut MoveDragContext, tran_x: i32, tran_y: i32) -> bool {
    let axis = if ctx.area == DragArea::LEFT || ctx.area == DragArea::RIGHT {
        Axis::X
    } else if ctx.area == DragArea::TOP || ctx.area == DragArea::BOTTOM {
        Axis::Y
    } else if tran_x == 0 && tran_y == 0 {
        return false;
    } else if tran_x.abs() > tran_y.abs() {
        Axis::X
    } else {
        Axis::Y
    };
    ctx.main_axis = Some(axis);
    true
}

/// Resize with the aspect ratio locked: the dominant axis drives the
/// gesture and the other dimension is derived through the ratio.
fn fixed_aspect_target_rect(
    ctx: &mut MoveDragContext,
    mut tran_x: i32,
    mut tran_y: i32,
    aspect_ratio: f32,
) -> RectInt {
    fix_translate_by_limits(&ctx.limits, &mut tran_x, &mut tran_y);
    if ctx.main_axis.is_none() && !init_main_axis(ctx, tran_x, tran_y) {
        return ctx.start_rect;
    }
    match ctx.main_axis {
        Some(Axis::X) => tran_y = (tran_x as f32 / aspect_ratio) as i32,
        Some(Axis::Y) => tran_x = (tran_y as f32 * aspect_ratio) as i32,
        None => return ctx.start_rect,
    }

    let r = ctx.start_rect;
    let main_is_x = ctx.main_axis == Some(Axis::X);
    let target = match ctx.area {
        DragArea::LEFT_TOP => RectInt::new(r.x + tran_x, r.y + tran_y, r.w - tran_x, r.h - tran_y),
        DragArea::RIGHT_TOP => RectInt::new(
            r.x,
            r.y + if main_is_x { -tran_y } else { tran_y },
            r.w + if main_is_x { tran_x } else { -tran_x },
            r.h + if main_is_x { tran_y } else { -tran_y },
        ),
        DragArea::RIGHT_BOTTOM => RectInt::new(r.x, r.y, r.w + tran_x, r.h + tran_y),
        DragArea::LEFT_BOTTOM => RectInt::new(
            r.x + if main_is_x { tran_x } else { -tran_x },
            r.y,
            r.w - if main_is_x { tran_x } else { -tran_x },
            r.h - if main_is_x { tran_y } else { -tran_y },
        ),
        DragArea::LEFT => RectInt::new(r.x + tran_x, r.y, r.w - tran_x, r.h - tran_y),
        DragArea::TOP => RectInt::new(r.x, r.y + tran_y, r.w - tran_x, r.h - tran_y),
        DragArea::RIGHT | DragArea::BOTTOM => RectInt::new(r.x, r.y, r.w + tran_x, r.h + tran_y),
        _ => r,
    };
    clamp_rect_dims(target, &ctx.scaled)
}

fn clamp_rect_dims(mut rect: RectInt, scaled: &ScaledLimits) -> RectInt {
    rect.w = rect.w.clamp(scaled.min_w, scaled.max_w);
    rect.h = rect.h.clamp(scaled.min_h, scaled.max_h);
    rect
}

/// A candidate is acceptable when the window's title-bar band keeps some
/// overlap with the limiting rectangle in both axes. A near-zero pixel
/// ratio means the check cannot run; the candidate passes through.
fn passes_limit_check(
    candidate: &RectInt,
    metrics: Option<&DisplayMetrics>,
    config: &SessionCoreConfig,
) -> bool {
    let Some(metrics) = metrics else {
        return true;
    };
    if metrics.pixel_ratio.abs() < NEAR_ZERO {
        debug!("pixel ratio near zero, skipping limit validation");
        return true;
    }
    let limit = metrics.limiting_rect;
    if limit.is_empty() {
        return true;
    }
    let band_h = config.scaled(config.title_bar_height, metrics.pixel_ratio);
    let band = RectInt::new(candidate.x, candidate.y, candidate.w, band_h);
    let horizontal = band.x < limit.right() && band.right() > limit.x;
    let vertical = band.y < limit.bottom() && band.bottom() > limit.y;
    horizontal && vertical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PointerAction;
    use pretty_assertions::assert_eq;
    use vela_core::types::geometry::SizeInt;

    fn controller() -> MoveDragController {
        MoveDragController::new(SessionId(7), Arc::new(SessionCoreConfig::default()))
    }

    fn down_at(x: i32, y: i32) -> PointerSample {
        PointerSample {
            pointer_id: 1,
            device_id: 0,
            action: PointerAction::Down,
            display_id: DisplayId::DEFAULT,
            display_x: x,
            display_y: y,
            window_x: x,
            window_y: y,
        }
    }

    fn move_to(x: i32, y: i32) -> PointerSample {
        PointerSample {
            action: PointerAction::Move,
            display_x: x,
            display_y: y,
            ..down_at(x, y)
        }
    }

    fn up_at(x: i32, y: i32) -> PointerSample {
        PointerSample {
            action: PointerAction::Up,
            ..down_at(x, y)
        }
    }

    fn draggable_property() -> SessionProperty {
        SessionProperty {
            drag_enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn left_top_corner_drag_shrinks_from_origin() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 800, 800);
        let started = controller.handle_down(&down_at(0, 0), rect, &draggable_property(), 1.0);
        assert_eq!(started.unwrap().reason, SizeChangeReason::DragStart);

        controller.coalesce_move(&move_to(30, 30));
        let outcome = controller.on_refresh_tick(None).unwrap();
        assert_eq!(outcome.rect, RectInt::new(30, 30, 770, 770));
        assert_eq!(outcome.reason, SizeChangeReason::Drag);
    }

    #[test]
    fn resize_clamps_to_scaled_minimum() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 800, 800);
        controller.handle_down(&down_at(0, 0), rect, &draggable_property(), 1.0);
        controller.coalesce_move(&move_to(700, 700));
        let outcome = controller.on_refresh_tick(None).unwrap();
        // Default minimum floating size at pixel ratio 1.0.
        assert_eq!(outcome.rect.w, 226);
        assert_eq!(outcome.rect.h, 226);
    }

    #[test]
    fn move_samples_are_coalesced_to_latest() {
        let mut controller = controller();
        let rect = RectInt::new(100, 100, 400, 400);
        controller
            .start_moving_with_coordinate(150, 150, 400, 400, rect, DisplayId::DEFAULT, 1.0)
            .unwrap();
        controller.coalesce_move(&move_to(160, 160));
        controller.coalesce_move(&move_to(210, 130));
        let outcome = controller.on_refresh_tick(None).unwrap();
        assert_eq!(outcome.rect, RectInt::new(160, 80, 400, 400));
        assert_eq!(outcome.reason, SizeChangeReason::Move);
        // Only one computation per tick.
        assert!(controller.on_refresh_tick(None).is_none());
    }

    #[test]
    fn repeated_start_moving_is_rejected() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 400, 400);
        controller
            .start_moving_with_coordinate(10, 10, 400, 400, rect, DisplayId::DEFAULT, 1.0)
            .unwrap();
        let second =
            controller.start_moving_with_coordinate(10, 10, 400, 400, rect, DisplayId::DEFAULT, 1.0);
        assert_eq!(second.unwrap_err(), SessionError::RepeatOperation);
    }

    #[test]
    fn candidate_outside_limiting_rect_is_rejected() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 400, 400);
        controller
            .start_moving_with_coordinate(200, 10, 400, 400, rect, DisplayId::DEFAULT, 1.0)
            .unwrap();
        let metrics = DisplayMetrics::new(
            DisplayId::DEFAULT,
            SizeInt::new(1000, 1000),
            1.0,
            RectInt::new(0, 0, 1000, 1000),
        );
        // Fully left of the limiting rect.
        controller.coalesce_move(&move_to(-700, 10));
        assert!(controller.on_refresh_tick(Some(&metrics)).is_none());
        // Previous target is retained.
        assert_eq!(controller.target_rect().unwrap(), rect);

        // Near-zero pixel ratio: validation cannot run, candidate passes.
        let degenerate = DisplayMetrics::new(
            DisplayId::DEFAULT,
            SizeInt::new(1000, 1000),
            0.0,
            RectInt::new(0, 0, 1000, 1000),
        );
        controller.coalesce_move(&move_to(-700, 10));
        assert!(controller.on_refresh_tick(Some(&degenerate)).is_some());
    }

    #[test]
    fn pointer_up_ends_gesture_with_drag_end() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 800, 800);
        controller.handle_down(&down_at(800, 800), rect, &draggable_property(), 1.0);
        controller.coalesce_move(&move_to(850, 860));
        let moved = controller.on_refresh_tick(None).unwrap();
        assert_eq!(moved.rect, RectInt::new(0, 0, 850, 860));

        let end = controller.handle_up(&up_at(850, 860)).unwrap();
        assert_eq!(end.reason, SizeChangeReason::DragEnd);
        assert_eq!(end.rect, RectInt::new(0, 0, 850, 860));
        assert!(!controller.is_gesture_active());
    }

    #[test]
    fn reset_suppresses_pending_samples() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 800, 800);
        controller.handle_down(&down_at(0, 400), rect, &draggable_property(), 1.0);
        controller.coalesce_move(&move_to(40, 400));
        controller.reset();
        assert!(controller.on_refresh_tick(None).is_none());
        assert!(!controller.is_gesture_active());
    }

    #[test]
    fn unrelated_pointer_samples_are_ignored() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 800, 800);
        controller.handle_down(&down_at(0, 400), rect, &draggable_property(), 1.0);
        let mut foreign = move_to(300, 400);
        foreign.pointer_id = 9;
        controller.coalesce_move(&foreign);
        assert!(controller.on_refresh_tick(None).is_none());
    }

    #[test]
    fn non_draggable_window_starts_no_gesture() {
        let mut controller = controller();
        let rect = RectInt::new(0, 0, 800, 800);
        let property = SessionProperty::default();
        assert!(controller
            .handle_down(&down_at(0, 0), rect, &property, 1.0)
            .is_none());
        assert!(!controller.is_gesture_active());
    }

    #[test]
    fn aspect_ratio_drag_preserves_ratio() {
        let mut controller = controller();
        controller.set_aspect_ratio(2.0);
        let rect = RectInt::new(0, 0, 800, 400);
        controller.handle_down(&down_at(800, 400), rect, &draggable_property(), 1.0);
        controller.coalesce_move(&move_to(900, 410));
        let outcome = controller.on_refresh_tick(None).unwrap();
        let ratio = outcome.rect.w as f32 / outcome.rect.h as f32;
        assert!((ratio - 2.0).abs() < 0.02, "ratio drifted: {ratio}");
    }
}

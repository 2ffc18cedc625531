//! The avoid-area computation engine.
//!
//! Pure geometry over the window rect, the occupancy rects reported by
//! the registry, and the display's fold posture. Degenerate numeric
//! input never errors; the engine clamps or passes through and logs,
//! because rejecting a frame mid-gesture is visibly worse than a
//! marginally incorrect one.

use std::sync::Arc;
use tracing::debug;

use vela_core::types::display::FoldScreenStatus;
use vela_core::types::geometry::RectInt;

use crate::config::SessionCoreConfig;
use crate::types::{SessionProperty, WindowCategory, WindowFlags, WindowMode};

use super::{AvoidArea, AvoidAreaType};

/// Everything the engine needs to know about one window and its display
/// at computation time. Assembled by the owning session inside its task
/// queue; the engine itself holds no session state.
pub struct AvoidAreaContext<'a> {
    pub window_rect: RectInt,
    pub property: &'a SessionProperty,
    pub category: WindowCategory,
    pub fold: FoldScreenStatus,
    pub pixel_ratio: f32,
    pub status_bar_visible: bool,
    pub status_bars: &'a [RectInt],
    pub keyboards: &'a [RectInt],
    pub cutouts: &'a [RectInt],
    pub nav_indicator: Option<RectInt>,
    /// For an overlay that exactly shares its parent's rect: the
    /// parent's availability verdict, which replaces this window's own
    /// mode gate.
    pub delegated_availability: Option<bool>,
}

/// Computes avoid areas for one window.
pub struct AvoidAreaEngine {
    config: Arc<SessionCoreConfig>,
}

impl AvoidAreaEngine {
    pub fn new(config: Arc<SessionCoreConfig>) -> Self {
        Self { config }
    }

    /// Computes the avoid area of the given kind. Returns the all-empty
    /// area whenever the window is exempt from the kind.
    pub fn compute(&self, ty: AvoidAreaType, ctx: &AvoidAreaContext<'_>) -> AvoidArea {
        if !self.is_available(ty, ctx) {
            return AvoidArea::EMPTY;
        }
        match ty {
            AvoidAreaType::System => self.system_area(ctx),
            AvoidAreaType::Cutout => self.cutout_area(ctx),
            AvoidAreaType::Keyboard => self.keyboard_area(ctx),
            AvoidAreaType::NavigationIndicator => self.navigation_indicator_area(ctx),
        }
    }

    /// The availability gate per window mode and category.
    pub fn is_available(&self, ty: AvoidAreaType, ctx: &AvoidAreaContext<'_>) -> bool {
        if ctx.property.has_flag(WindowFlags::AVOID_AREA_EXEMPT) {
            return false;
        }
        if ty == AvoidAreaType::Keyboard {
            return true;
        }
        if let Some(delegated) = ctx.delegated_availability {
            return delegated;
        }
        match ctx.property.window_mode {
            WindowMode::Fullscreen => ctx.property.has_flag(WindowFlags::NEED_AVOID),
            WindowMode::Floating => {
                ty == AvoidAreaType::System && ctx.property.force_show_status_bar
            }
            WindowMode::Pip => false,
            WindowMode::SplitPrimary | WindowMode::SplitSecondary => true,
        }
    }

    fn display_rect(&self, fold: &FoldScreenStatus) -> RectInt {
        let rect = fold.effective_rect();
        if rect.is_empty() {
            debug!("fold provider reported an empty reference rect");
        }
        rect
    }

    fn system_area(&self, ctx: &AvoidAreaContext<'_>) -> AvoidArea {
        let mut area = AvoidArea::default();
        let display_rect = self.display_rect(&ctx.fold);

        if ctx.property.compat_scale_mode {
            // Forced-compatibility scaling replaces the computed bands
            // with fixed device-independent heights.
            let top_h = self.config.scaled(self.config.compat_top_band_height, ctx.pixel_ratio);
            let bottom_h = self
                .config
                .scaled(self.config.compat_bottom_band_height, ctx.pixel_ratio);
            let top = RectInt::new(display_rect.x, display_rect.y, display_rect.w, top_h);
            let bottom = RectInt::new(
                display_rect.x,
                display_rect.bottom() - bottom_h,
                display_rect.w,
                bottom_h,
            );
            area.accumulate(&ctx.window_rect, &top);
            area.accumulate(&ctx.window_rect, &bottom);
            return area;
        }

        if !ctx.status_bar_visible && !ctx.property.force_show_status_bar {
            debug!("status bar not visible, system avoid area empty");
            return area;
        }

        if ctx.status_bars.is_empty() {
            let band_h = self.config.scaled(self.config.status_bar_height, ctx.pixel_ratio);
            let band = RectInt::new(display_rect.x, display_rect.y, display_rect.w, band_h);
            area.accumulate(&ctx.window_rect, &band);
            return area;
        }

        for bar in ctx.status_bars {
            if let Some(clipped) = bar.intersection(&display_rect) {
                area.accumulate(&ctx.window_rect, &clipped);
            }
        }
        area
    }

    fn keyboard_area(&self, ctx: &AvoidAreaContext<'_>) -> AvoidArea {
        let mut area = AvoidArea::default();
        for keyboard in ctx.keyboards {
            area.accumulate(&ctx.window_rect, keyboard);
        }
        area
    }

    fn cutout_area(&self, ctx: &AvoidAreaContext<'_>) -> AvoidArea {
        let mut area = AvoidArea::default();
        let display_rect = self.display_rect(&ctx.fold);
        for cutout in ctx.cutouts {
            if let Some(clipped) = cutout.intersection(&display_rect) {
                area.accumulate(&ctx.window_rect, &clipped);
            }
        }
        area
    }

    fn navigation_indicator_area(&self, ctx: &AvoidAreaContext<'_>) -> AvoidArea {
        let mut area = AvoidArea::default();
        if ctx.property.force_show_status_bar {
            debug!("status bar temporarily forced, skipping navigation indicator");
            return area;
        }
        let display_rect = self.display_rect(&ctx.fold);
        let indicator = ctx.nav_indicator.unwrap_or_else(|| {
            let band_h = self
                .config
                .scaled(self.config.nav_indicator_height, ctx.pixel_ratio);
            RectInt::new(
                display_rect.x,
                display_rect.bottom() - band_h,
                display_rect.w,
                band_h,
            )
        });
        area.accumulate(&ctx.window_rect, &indicator);
        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use vela_core::types::display::FoldPosture;

    fn fold(posture: FoldPosture) -> FoldScreenStatus {
        FoldScreenStatus {
            posture,
            full_rect: RectInt::new(0, 0, 1200, 2600),
            upper_rect: RectInt::new(0, 0, 1200, 1300),
            lower_rect: RectInt::new(0, 1300, 1200, 1300),
        }
    }

    struct Fixture {
        property: SessionProperty,
        status_bars: Vec<RectInt>,
        keyboards: Vec<RectInt>,
        cutouts: Vec<RectInt>,
        nav_indicator: Option<RectInt>,
        fold: FoldScreenStatus,
        window_rect: RectInt,
        pixel_ratio: f32,
        status_bar_visible: bool,
        delegated: Option<bool>,
    }

    impl Default for Fixture {
        fn default() -> Self {
            let mut property = SessionProperty::default();
            property.set_flag(WindowFlags::NEED_AVOID, true);
            Self {
                property,
                status_bars: vec![RectInt::new(0, 0, 1200, 90)],
                keyboards: Vec::new(),
                cutouts: Vec::new(),
                nav_indicator: None,
                fold: fold(FoldPosture::Expanded),
                window_rect: RectInt::new(0, 0, 1200, 2600),
                pixel_ratio: 1.5,
                status_bar_visible: true,
                delegated: None,
            }
        }
    }

    impl Fixture {
        fn context(&self) -> AvoidAreaContext<'_> {
            AvoidAreaContext {
                window_rect: self.window_rect,
                property: &self.property,
                category: WindowCategory::Application,
                fold: self.fold,
                pixel_ratio: self.pixel_ratio,
                status_bar_visible: self.status_bar_visible,
                status_bars: &self.status_bars,
                keyboards: &self.keyboards,
                cutouts: &self.cutouts,
                nav_indicator: self.nav_indicator,
                delegated_availability: self.delegated,
            }
        }
    }

    fn engine() -> AvoidAreaEngine {
        AvoidAreaEngine::new(Arc::new(SessionCoreConfig::default()))
    }

    #[test]
    fn fullscreen_without_need_avoid_is_all_empty() {
        let mut fixture = Fixture::default();
        fixture.property.set_flag(WindowFlags::NEED_AVOID, false);
        let area = engine().compute(AvoidAreaType::System, &fixture.context());
        assert!(area.is_empty());
    }

    #[test]
    fn fullscreen_with_need_avoid_reports_status_bar() {
        let fixture = Fixture::default();
        let area = engine().compute(AvoidAreaType::System, &fixture.context());
        assert_eq!(area.top, RectInt::new(0, 0, 1200, 90));
    }

    #[test]
    fn exempt_category_is_all_empty_for_every_kind() {
        let mut fixture = Fixture::default();
        fixture.property.set_flag(WindowFlags::AVOID_AREA_EXEMPT, true);
        fixture.keyboards = vec![RectInt::new(0, 1800, 1200, 800)];
        let engine = engine();
        for ty in AvoidAreaType::ALL {
            assert!(engine.compute(ty, &fixture.context()).is_empty(), "{ty:?}");
        }
    }

    #[rstest]
    #[case(false, true)]
    #[case(true, false)]
    fn floating_system_exemption_honors_force_flag(
        #[case] force_show: bool,
        #[case] expect_empty: bool,
    ) {
        let mut fixture = Fixture::default();
        fixture.property.window_mode = WindowMode::Floating;
        fixture.property.force_show_status_bar = force_show;
        let area = engine().compute(AvoidAreaType::System, &fixture.context());
        assert_eq!(area.is_empty(), expect_empty);
    }

    #[test]
    fn floating_window_still_gets_keyboard_area() {
        let mut fixture = Fixture::default();
        fixture.property.window_mode = WindowMode::Floating;
        fixture.window_rect = RectInt::new(0, 1500, 1200, 1100);
        fixture.keyboards = vec![RectInt::new(0, 1800, 1200, 800)];
        let area = engine().compute(AvoidAreaType::Keyboard, &fixture.context());
        assert_eq!(area.bottom, RectInt::new(0, 300, 1200, 800));
    }

    #[test]
    fn keyboard_overlay_posture_substitutes_upper_rect() {
        let mut fixture = Fixture::default();
        fixture.fold = fold(FoldPosture::KeyboardOverlay);
        fixture.status_bars = Vec::new();
        fixture.window_rect = RectInt::new(0, 0, 1200, 1300);
        let area = engine().compute(AvoidAreaType::System, &fixture.context());
        // Fixed band: 36vp at ratio 1.5 = 54px, spanning the upper half.
        assert_eq!(area.top, RectInt::new(0, 0, 1200, 54));

        // The fallback navigation band also hugs the upper half's bottom.
        let nav = engine().compute(AvoidAreaType::NavigationIndicator, &fixture.context());
        assert_eq!(nav.bottom, RectInt::new(0, 1264, 1200, 36));
    }

    #[test]
    fn fixed_bands_scale_with_pixel_ratio() {
        let mut fixture = Fixture::default();
        fixture.status_bars = Vec::new();
        fixture.pixel_ratio = 2.0;
        let area = engine().compute(AvoidAreaType::System, &fixture.context());
        assert_eq!(area.top.h, 72);
    }

    #[test]
    fn compat_mode_overrides_top_and_bottom_bands() {
        let mut fixture = Fixture::default();
        fixture.property.compat_scale_mode = true;
        let area = engine().compute(AvoidAreaType::System, &fixture.context());
        // 40vp and 28vp at ratio 1.5.
        assert_eq!(area.top, RectInt::new(0, 0, 1200, 60));
        assert_eq!(area.bottom, RectInt::new(0, 2558, 1200, 42));
    }

    #[test]
    fn cutout_is_clipped_and_classified() {
        let mut fixture = Fixture::default();
        fixture.cutouts = vec![RectInt::new(500, 0, 200, 80)];
        let area = engine().compute(AvoidAreaType::Cutout, &fixture.context());
        assert_eq!(area.top, RectInt::new(500, 0, 200, 80));
    }

    #[test]
    fn navigation_indicator_prefers_provider_rect() {
        let mut fixture = Fixture::default();
        fixture.nav_indicator = Some(RectInt::new(0, 2560, 1200, 40));
        let area = engine().compute(AvoidAreaType::NavigationIndicator, &fixture.context());
        assert_eq!(area.bottom, RectInt::new(0, 2560, 1200, 40));
    }

    #[test]
    fn delegated_availability_replaces_own_gate() {
        let mut fixture = Fixture::default();
        fixture.property.window_mode = WindowMode::Floating;
        fixture.delegated = Some(true);
        let area = engine().compute(AvoidAreaType::System, &fixture.context());
        assert_eq!(area.top, RectInt::new(0, 0, 1200, 90));
    }

    #[test]
    fn pip_mode_is_exempt() {
        let mut fixture = Fixture::default();
        fixture.property.window_mode = WindowMode::Pip;
        assert!(engine()
            .compute(AvoidAreaType::System, &fixture.context())
            .is_empty());
        assert!(engine()
            .compute(AvoidAreaType::NavigationIndicator, &fixture.context())
            .is_empty());
    }
}

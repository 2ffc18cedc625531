//! The owned, queue-confined state of one session.
//!
//! `SessionCore` is mutated exclusively from within the session's serial
//! task queue; the public `Session` handle wraps queue submission. Every
//! operation validates permissions and arguments before touching state,
//! so a failed operation never leaves the session partially mutated.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use vela_core::types::display::DisplayId;
use vela_core::types::geometry::RectInt;

use crate::avoid_area::{AvoidArea, AvoidAreaContext, AvoidAreaEngine, AvoidAreaType};
use crate::config::SessionCoreConfig;
use crate::error::{SessionError, SessionResult};
use crate::events::SessionObservers;
use crate::move_drag::{DragOutcome, MoveDragController};
use crate::ports::{CollaboratorPorts, EventChannel, SessionStage};
use crate::types::{
    AnimationFlag, KeyEvent, MaximizeMode, PointerAction, PointerSample, RequestedVisualState,
    SessionId, SessionInfo, SessionProperty, SessionSnapshot, SessionState, SizeChangeReason,
    SurfaceHandle, TerminateInfo, WindowCategory, WindowFlags, WindowMode,
};

use super::arena::SessionArena;
use super::policy::CategoryPolicy;

pub struct SessionCore {
    pub(crate) info: SessionInfo,
    pub(crate) config: Arc<SessionCoreConfig>,
    pub(crate) property: SessionProperty,
    pub(crate) state: SessionState,
    pub(crate) is_active: bool,
    pub(crate) is_terminating: bool,
    pub(crate) termination_notified: bool,
    pub(crate) custom_animation_playing: bool,
    pub(crate) pending_background: bool,
    pub(crate) rect: RectInt,
    pub(crate) requested_rect: RectInt,
    pub(crate) reason: SizeChangeReason,
    pub(crate) stage: Option<Arc<dyn SessionStage>>,
    pub(crate) channel: Option<Arc<dyn EventChannel>>,
    pub(crate) surface: Option<SurfaceHandle>,
    pub(crate) move_drag: MoveDragController,
    pub(crate) avoid_engine: AvoidAreaEngine,
    pub(crate) observers: SessionObservers,
    pub(crate) ports: CollaboratorPorts,
    pub(crate) arena: Arc<SessionArena>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionCore {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        info: SessionInfo,
        config: Arc<SessionCoreConfig>,
        property: SessionProperty,
        initial_rect: RectInt,
        ports: CollaboratorPorts,
        observers: SessionObservers,
        arena: Arc<SessionArena>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        let move_drag = MoveDragController::new(info.id, Arc::clone(&config));
        let avoid_engine = AvoidAreaEngine::new(Arc::clone(&config));
        let core = Self {
            info,
            config,
            property,
            state: SessionState::Disconnect,
            is_active: false,
            is_terminating: false,
            termination_notified: false,
            custom_animation_playing: false,
            pending_background: false,
            rect: initial_rect,
            requested_rect: initial_rect,
            reason: SizeChangeReason::Undefined,
            stage: None,
            channel: None,
            surface: None,
            move_drag,
            avoid_engine,
            observers,
            ports,
            arena,
            snapshot_tx,
        };
        core.publish_snapshot();
        core
    }

    pub(crate) fn policy(&self) -> &'static CategoryPolicy {
        CategoryPolicy::for_category(self.info.category)
    }

    pub(crate) fn is_session_valid(&self) -> bool {
        !matches!(self.state, SessionState::Disconnect | SessionState::End)
    }

    pub(crate) fn is_session_foreground(&self) -> bool {
        matches!(self.state, SessionState::Foreground | SessionState::Active)
    }

    pub(crate) fn pixel_ratio(&self) -> f32 {
        self.ports
            .display
            .metrics(self.property.display_id)
            .map(|metrics| metrics.pixel_ratio)
            .unwrap_or(1.0)
    }

    fn update_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        debug!(id = %self.info.id, ?state, "session state transition");
        self.state = state;
        self.observers.notify_state_changed(self.info.id, state);
        self.publish_snapshot();
    }

    pub(crate) fn publish_snapshot(&self) {
        let policy = self.policy();
        self.snapshot_tx.send_replace(SessionSnapshot {
            id: self.info.id,
            category: self.info.category,
            state: self.state,
            is_active: self.is_active,
            is_terminating: self.is_terminating,
            rect: self.rect,
            display_id: self.property.display_id,
            window_mode: self.property.window_mode,
            need_avoid: self.property.has_flag(WindowFlags::NEED_AVOID),
            is_modal: (policy.is_modal)(self),
            is_topmost: (policy.is_topmost)(self),
        });
    }

    // --- Lifecycle ---

    pub(crate) fn connect(
        &mut self,
        stage: Option<Arc<dyn SessionStage>>,
        channel: Option<Arc<dyn EventChannel>>,
        surface: Option<SurfaceHandle>,
        property: Option<SessionProperty>,
        token: Option<uuid::Uuid>,
    ) -> SessionResult<()> {
        if self.state != SessionState::Disconnect && !self.is_terminating {
            warn!(id = %self.info.id, state = ?self.state, "connect in non-disconnect state");
            return Err(SessionError::InvalidSession);
        }
        let stage = stage.ok_or(SessionError::NullReference)?;
        let channel = channel.ok_or(SessionError::NullReference)?;
        if let Some(token) = token {
            if token != self.info.identity_token {
                warn!(id = %self.info.id, "identity token mismatch on connect");
                return Err(SessionError::InvalidPermission);
            }
        }
        self.stage = Some(stage);
        self.channel = Some(channel);
        if let Some(surface) = surface {
            self.ports.surface_bridge.attach(self.info.id, surface);
            self.surface = Some(surface);
        }
        if let Some(property) = property {
            self.init_property_on_connect(property);
        }
        self.is_terminating = false;
        self.update_state(SessionState::Connect);
        if let Some(stage) = &self.stage {
            stage.update_rect(self.rect, SizeChangeReason::Undefined);
        }
        info!(id = %self.info.id, "session connected");
        Ok(())
    }

    fn init_property_on_connect(&mut self, mut property: SessionProperty) {
        if property.display_id == DisplayId::DEFAULT {
            property.display_id = self.property.display_id;
        }
        // Non-dialog system surfaces created by unprivileged callers must
        // not be draggable.
        if self.info.category == WindowCategory::SystemOverlay
            && property.modality == crate::types::ModalityKind::NonModal
            && !self.ports.permissions.is_system_caller()
        {
            property.drag_enabled = false;
        }
        self.property = property;
    }

    pub(crate) fn reconnect(
        &mut self,
        stage: Option<Arc<dyn SessionStage>>,
        channel: Option<Arc<dyn EventChannel>>,
        surface: Option<SurfaceHandle>,
        property: Option<SessionProperty>,
    ) -> SessionResult<()> {
        let stage = stage.ok_or(SessionError::NullReference)?;
        let channel = channel.ok_or(SessionError::NullReference)?;
        let property = property.ok_or(SessionError::NullReference)?;

        let requested = property.requested_visual_state;
        if requested == RequestedVisualState::Initial {
            warn!(id = %self.info.id, "reconnect with invalid visual state");
            self.disconnect_locked();
            return Err(SessionError::InvalidParam);
        }

        self.stage = Some(stage);
        self.channel = Some(channel);
        if let Some(surface) = surface {
            self.ports.surface_bridge.attach(self.info.id, surface);
            self.surface = Some(surface);
        }
        // Recovery re-establishes the binding without resetting the
        // session's accumulated history.
        self.property = property;
        self.update_state(SessionState::Connect);
        match requested {
            RequestedVisualState::Created => {}
            RequestedVisualState::Shown => {
                self.update_state(SessionState::Foreground);
                let _ = self.set_active(true);
            }
            RequestedVisualState::Hidden => {
                self.update_state(SessionState::Background);
            }
            RequestedVisualState::Initial => unreachable!("rejected above"),
        }
        info!(id = %self.info.id, ?requested, "session reconnected");
        Ok(())
    }

    pub(crate) fn show(&mut self, property: Option<SessionProperty>) -> SessionResult<()> {
        if self.state == SessionState::End {
            return Err(SessionError::InvalidSession);
        }
        if let Some(incoming) = &property {
            if incoming.animation == AnimationFlag::Custom {
                self.property.animation = AnimationFlag::Custom;
                self.set_custom_animation_playing(true);
            }
        }
        let policy = self.policy();
        (policy.show_side_effects)(self);
        self.foreground(property)
    }

    pub(crate) fn foreground(&mut self, property: Option<SessionProperty>) -> SessionResult<()> {
        if !matches!(
            self.state,
            SessionState::Connect | SessionState::Background | SessionState::Inactive
        ) {
            warn!(id = %self.info.id, state = ?self.state, "foreground in invalid state");
            return Err(SessionError::InvalidSession);
        }
        if let Some(incoming) = property {
            self.property.window_mode = incoming.window_mode;
            self.property.decor_enabled = incoming.decor_enabled;
            self.property.turn_screen_on = incoming.turn_screen_on;
            self.property.keep_screen_on = incoming.keep_screen_on;
            self.property.brightness = incoming.brightness;
            self.property.requested_orientation = incoming.requested_orientation;
        }
        self.update_state(SessionState::Foreground);
        if !self.is_active {
            self.set_active(true)?;
        }
        self.is_terminating = false;
        Ok(())
    }

    pub(crate) fn set_active(&mut self, active: bool) -> SessionResult<()> {
        if !self.is_session_valid() {
            return Err(SessionError::InvalidSession);
        }
        if active == self.is_active {
            debug!(id = %self.info.id, active, "active status unchanged");
            return Ok(());
        }
        let stage = self.stage.clone().ok_or(SessionError::NullReference)?;
        if active && self.state == SessionState::Foreground {
            stage.set_active(true);
            self.is_active = true;
            self.update_state(SessionState::Active);
            self.observers.notify_active_changed(self.info.id, true);
        } else if !active && self.state == SessionState::Active {
            stage.set_active(false);
            self.is_active = false;
            self.update_state(SessionState::Inactive);
            self.observers.notify_active_changed(self.info.id, false);
        }
        Ok(())
    }

    pub(crate) fn update_active_status(&mut self, active: bool) -> SessionResult<()> {
        self.set_active(active)
    }

    pub(crate) fn hide(&mut self) -> SessionResult<()> {
        if self.state == SessionState::End {
            return Err(SessionError::InvalidSession);
        }
        let policy = self.policy();
        (policy.hide_permission)(self)?;
        self.set_active(false)?;
        (policy.hide_side_effects)(self);
        if self.property.animation == AnimationFlag::Custom {
            // Backgrounding is deferred to the animation-completion
            // callback; the surface stays up while the client animates.
            self.set_custom_animation_playing(true);
            self.pending_background = true;
            return Ok(());
        }
        self.background()
    }

    pub(crate) fn background(&mut self) -> SessionResult<()> {
        if self.state == SessionState::Active && self.info.category == WindowCategory::Application
        {
            self.is_active = false;
            self.update_state(SessionState::Inactive);
        }
        if self.state != SessionState::Inactive {
            warn!(id = %self.info.id, state = ?self.state, "background in invalid state");
            return Err(SessionError::InvalidSession);
        }
        self.pending_background = false;
        self.update_state(SessionState::Background);
        Ok(())
    }

    pub(crate) fn disconnect(&mut self, from_client: bool) -> SessionResult<()> {
        if self.state == SessionState::End {
            debug!(id = %self.info.id, "disconnect on ended session is a no-op");
            return Ok(());
        }
        if from_client {
            self.update_state(SessionState::Disconnect);
            return Ok(());
        }
        self.disconnect_locked();
        Ok(())
    }

    fn disconnect_locked(&mut self) {
        self.is_active = false;
        self.move_drag.reset();
        if self.surface.take().is_some() {
            self.ports.surface_bridge.detach(self.info.id);
        }
        let policy = self.policy();
        (policy.disconnect_side_effects)(self);
        self.update_state(SessionState::Background);
        self.update_state(SessionState::Disconnect);
        self.is_terminating = false;
        self.stage = None;
        self.channel = None;
    }

    pub(crate) fn terminate(&mut self, info: TerminateInfo) -> SessionResult<()> {
        if self.is_terminating && !self.ports.permissions.can_terminate(self.info.id) {
            warn!(id = %self.info.id, "unauthorized terminate on terminating session");
            return Err(SessionError::InvalidPermission);
        }
        self.is_terminating = true;
        if !self.termination_notified {
            self.termination_notified = true;
            self.observers.notify_terminated(self.info.id, &info);
        }
        self.publish_snapshot();
        Ok(())
    }

    pub(crate) fn notify_exception(&mut self, info: TerminateInfo) -> SessionResult<()> {
        if self.is_terminating && !self.ports.permissions.can_terminate(self.info.id) {
            return Err(SessionError::InvalidPermission);
        }
        self.is_terminating = true;
        self.observers.notify_exception(self.info.id, &info);
        self.publish_snapshot();
        Ok(())
    }

    pub(crate) fn destroy(&mut self) {
        if self.state == SessionState::End {
            return;
        }
        info!(id = %self.info.id, "destroying session");
        self.move_drag.reset();
        if self.surface.take().is_some() {
            self.ports.surface_bridge.detach(self.info.id);
        }
        self.stage = None;
        self.channel = None;
        self.update_state(SessionState::End);
        self.arena.remove(self.info.id);
    }

    // --- Custom animation ---

    fn set_custom_animation_playing(&mut self, playing: bool) {
        if self.custom_animation_playing != playing {
            self.custom_animation_playing = playing;
            self.observers
                .notify_custom_animation(self.info.id, playing);
        }
    }

    pub(crate) fn on_custom_animation_complete(&mut self) -> SessionResult<()> {
        if self.state == SessionState::End {
            return Err(SessionError::InvalidSession);
        }
        self.set_custom_animation_playing(false);
        if self.pending_background {
            self.background()?;
        }
        Ok(())
    }

    // --- Geometry ---

    pub(crate) fn update_session_rect(
        &mut self,
        rect: RectInt,
        reason: SizeChangeReason,
        is_global: bool,
    ) -> SessionResult<()> {
        if !self.is_session_valid() {
            return Err(SessionError::InvalidSession);
        }
        let mut rect = rect;
        if is_global {
            let fold = self.ports.display.fold_status(self.property.display_id);
            rect.x -= fold.full_rect.x;
            rect.y -= fold.full_rect.y;
        }
        self.requested_rect = rect;
        self.commit_rect(rect, reason);
        Ok(())
    }

    pub(crate) fn commit_rect(&mut self, rect: RectInt, reason: SizeChangeReason) {
        if self.rect == rect && self.reason == reason {
            debug!(id = %self.info.id, %rect, "skipping redundant rect commit");
            return;
        }
        self.rect = rect;
        self.reason = reason;
        if let Some(stage) = &self.stage {
            stage.update_rect(rect, reason);
        }
        self.observers
            .notify_rect_changed(self.info.id, rect, reason, self.property.display_id);
        self.publish_snapshot();
    }

    pub(crate) fn set_global_maximize_mode(&mut self, mode: MaximizeMode) -> SessionResult<()> {
        if !self.is_session_valid() {
            return Err(SessionError::InvalidSession);
        }
        self.property.maximize_mode = mode;
        self.publish_snapshot();
        Ok(())
    }

    pub(crate) fn global_maximize_mode(&self) -> MaximizeMode {
        self.property.maximize_mode
    }

    /// The rect most recently requested, which may still be ahead of the
    /// committed one during an animated transition.
    pub(crate) fn requested_rect(&self) -> RectInt {
        self.requested_rect
    }

    pub(crate) fn set_aspect_ratio(&mut self, ratio: f32) -> SessionResult<()> {
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(SessionError::InvalidParam);
        }
        self.move_drag.set_aspect_ratio(ratio);
        Ok(())
    }

    // --- Move / drag ---

    pub(crate) fn start_moving_with_coordinate(
        &mut self,
        anchor_x: i32,
        anchor_y: i32,
        width: i32,
        height: i32,
    ) -> SessionResult<()> {
        if !self.is_session_valid() {
            return Err(SessionError::InvalidSession);
        }
        let pixel_ratio = self.pixel_ratio();
        self.move_drag.start_moving_with_coordinate(
            anchor_x,
            anchor_y,
            width,
            height,
            self.rect,
            self.property.display_id,
            pixel_ratio,
        )
    }

    /// Consumes one decoded pointer sample. Returns whether the sample
    /// was dispatched to this session at all.
    pub(crate) fn transfer_pointer_sample(&mut self, sample: PointerSample) -> SessionResult<bool> {
        let policy = self.policy();
        if !(policy.allow_pointer_dispatch)(self, &sample) {
            debug!(id = %self.info.id, "pointer dispatch suppressed");
            return Ok(false);
        }
        match sample.action {
            PointerAction::Down => {
                (policy.process_point_down)(self, sample.display_x, sample.display_y)?;
                let pixel_ratio = self.pixel_ratio();
                let rect = self.rect;
                let property = self.property.clone();
                if let Some(outcome) =
                    self.move_drag
                        .handle_down(&sample, rect, &property, pixel_ratio)
                {
                    self.apply_drag_outcome(outcome);
                }
            }
            PointerAction::Move => self.move_drag.coalesce_move(&sample),
            PointerAction::Up | PointerAction::Cancel => {
                if let Some(outcome) = self.move_drag.handle_up(&sample) {
                    self.apply_drag_outcome(outcome);
                }
            }
            PointerAction::Leave => {}
        }
        Ok(true)
    }

    /// Drives one geometry computation; called once per display refresh.
    pub(crate) fn on_refresh_tick(&mut self) {
        let metrics = self
            .move_drag
            .context()
            .map(|ctx| ctx.display_id)
            .and_then(|display| self.ports.display.metrics(display));
        if let Some(outcome) = self.move_drag.on_refresh_tick(metrics.as_ref()) {
            self.apply_drag_outcome(outcome);
        }
    }

    pub(crate) fn on_lost_focus(&mut self) {
        if let Some(outcome) = self.move_drag.on_lost_focus() {
            self.apply_drag_outcome(outcome);
        }
    }

    fn apply_drag_outcome(&mut self, outcome: DragOutcome) {
        match outcome.reason {
            SizeChangeReason::DragStart => {
                self.reason = SizeChangeReason::DragStart;
                self.publish_snapshot();
            }
            SizeChangeReason::Move | SizeChangeReason::Drag | SizeChangeReason::DragEnd => {
                self.commit_rect(outcome.rect, outcome.reason);
            }
            _ => {}
        }
    }

    // --- Input dispatch ---

    pub(crate) fn transfer_key_event(&mut self, event: KeyEvent) -> SessionResult<()> {
        if !self.is_session_valid() {
            return Err(SessionError::InvalidSession);
        }
        let policy = self.policy();
        (policy.allow_key_event)(self)?;
        let channel = self.channel.as_ref().ok_or(SessionError::NullReference)?;
        channel.transfer_key_event(&event);
        Ok(())
    }

    // --- Avoid area ---

    pub(crate) fn avoid_area_by_type(&self, ty: AvoidAreaType) -> AvoidArea {
        let display_id = self.property.display_id;
        let fold = self.ports.display.fold_status(display_id);
        let pixel_ratio = self.pixel_ratio();
        let cutouts = self.ports.display.cutout_rects(display_id);
        let status_bars = self.ports.registry.status_bar_rects(display_id);
        let keyboards = self.ports.registry.keyboard_rects(display_id);
        let nav_indicator = self.ports.registry.navigation_indicator_rect(display_id);
        let context = AvoidAreaContext {
            window_rect: self.rect,
            property: &self.property,
            category: self.info.category,
            fold,
            pixel_ratio,
            status_bar_visible: self.ports.registry.is_status_bar_visible(display_id),
            status_bars: &status_bars,
            keyboards: &keyboards,
            cutouts: &cutouts,
            nav_indicator,
            delegated_availability: self.delegated_availability(ty),
        };
        self.avoid_engine.compute(ty, &context)
    }

    /// An overlay that exactly shares its parent's rect inherits the
    /// parent's availability gate.
    fn delegated_availability(&self, _ty: AvoidAreaType) -> Option<bool> {
        if self.info.category != WindowCategory::SystemOverlay {
            return None;
        }
        let parent = self.arena.parent_of(self.info.id)?;
        let snapshot = self.arena.snapshot_of(parent)?;
        if snapshot.rect != self.rect {
            return None;
        }
        Some(match snapshot.window_mode {
            WindowMode::Fullscreen => snapshot.need_avoid,
            WindowMode::Floating | WindowMode::Pip => false,
            WindowMode::SplitPrimary | WindowMode::SplitSecondary => true,
        })
    }

    // --- Cross-session helpers used by the category policies ---

    pub(crate) fn check_dialog_on_foreground(&self) -> bool {
        self.foreground_modal_children().next().is_some()
    }

    pub(crate) fn handle_point_down_dialog(&self) {
        for child in self.foreground_modal_children().collect::<Vec<_>>() {
            self.ports.registry.raise_to_top(child);
            self.ports.registry.present_focus(child);
        }
        if let Some(stage) = &self.stage {
            stage.notify_dialog_state_change(true);
        }
    }

    pub(crate) fn is_top_dialog(&self) -> bool {
        let Some(parent) = self.arena.parent_of(self.info.id) else {
            return true;
        };
        let siblings: Vec<_> = self
            .arena
            .children_of(parent)
            .into_iter()
            .filter_map(|id| self.arena.snapshot_of(id))
            .filter(|s| {
                s.category == WindowCategory::SystemOverlay && s.is_modal && s.is_foreground()
            })
            .map(|s| s.id)
            .collect();
        siblings.last() == Some(&self.info.id) || siblings.is_empty()
    }

    /// Whether the parent session has a blocking dialog on the
    /// foreground. `exclude_self` leaves this session out of the check
    /// so a dialog does not block its own input.
    pub(crate) fn parent_has_foreground_dialog(&self, exclude_self: bool) -> bool {
        let Some(parent) = self.arena.parent_of(self.info.id) else {
            return false;
        };
        self.arena
            .children_of(parent)
            .into_iter()
            .filter(|id| !exclude_self || *id != self.info.id)
            .filter_map(|id| self.arena.snapshot_of(id))
            .any(|s| {
                s.category == WindowCategory::SystemOverlay && s.is_modal && s.is_foreground()
            })
    }

    /// Asks the parent, through the parent's own queue, to run its
    /// point-down dialog handling. Cross-session state is never touched
    /// directly.
    pub(crate) fn notify_parent_point_down_dialog(&self) {
        let Some(parent) = self.arena.parent_of(self.info.id) else {
            return;
        };
        if let Some(parent_session) = self.arena.get(parent) {
            parent_session.post_point_down_dialog();
        }
    }

    fn foreground_modal_children(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.arena
            .children_of(self.info.id)
            .into_iter()
            .filter_map(|id| self.arena.snapshot_of(id))
            .filter(|s| {
                s.category == WindowCategory::SystemOverlay && s.is_modal && s.is_foreground()
            })
            .map(|s| s.id)
    }
}

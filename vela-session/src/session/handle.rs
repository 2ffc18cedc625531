//! The public handle of one session.
//!
//! A `Session` wraps the serial task queue owning the `SessionCore`.
//! Mutating operations are posted as tasks; queries either read the
//! published snapshot or post a synchronous task when they must observe
//! queue-ordered state (avoid-area computation, key dispatch).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use vela_core::types::geometry::RectInt;

use crate::avoid_area::{AvoidArea, AvoidAreaType};
use crate::config::SessionCoreConfig;
use crate::error::{SessionError, SessionResult};
use crate::events::SessionObservers;
use crate::ports::{CollaboratorPorts, EventChannel, SessionStage};
use crate::task_queue::TaskQueue;
use crate::types::{
    KeyEvent, MaximizeMode, PointerSample, SessionInfo, SessionProperty, SessionSnapshot,
    SessionState, SizeChangeReason, SurfaceHandle, TerminateInfo, WindowCategory, WindowFlags,
};

use super::arena::SessionArena;
use super::core::SessionCore;

/// The lifecycle surface of a session, as seen by the collaborator layer.
///
/// All operations return a result code; none of them panic. `hide` is
/// the async-post twin of `hide_sync`: identical semantics, differing
/// only in queue discipline.
#[async_trait]
pub trait SessionLifecycle: Send + Sync {
    async fn connect(
        &self,
        stage: Option<Arc<dyn SessionStage>>,
        channel: Option<Arc<dyn EventChannel>>,
        surface: Option<SurfaceHandle>,
        property: Option<SessionProperty>,
        token: Option<Uuid>,
    ) -> SessionResult<()>;

    async fn reconnect(
        &self,
        stage: Option<Arc<dyn SessionStage>>,
        channel: Option<Arc<dyn EventChannel>>,
        surface: Option<SurfaceHandle>,
        property: Option<SessionProperty>,
    ) -> SessionResult<()>;

    async fn show(&self, property: Option<SessionProperty>) -> SessionResult<()>;

    fn hide(&self) -> SessionResult<()>;

    async fn hide_sync(&self) -> SessionResult<()>;

    async fn disconnect(&self, from_client: bool) -> SessionResult<()>;

    async fn update_active_status(&self, active: bool) -> SessionResult<()>;

    async fn terminate_session(&self, info: TerminateInfo) -> SessionResult<()>;

    async fn notify_session_exception(&self, info: TerminateInfo) -> SessionResult<()>;
}

pub struct Session {
    id: crate::types::SessionId,
    category: WindowCategory,
    queue: TaskQueue<SessionCore>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl Session {
    pub fn id(&self) -> crate::types::SessionId {
        self.id
    }

    pub fn category(&self) -> WindowCategory {
        self.category
    }

    /// The latest published snapshot. Freshness is bounded by the
    /// capture point; use the sync query surface to observe
    /// queue-ordered state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn session_rect(&self) -> RectInt {
        self.snapshot.borrow().rect
    }

    pub fn session_state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    pub fn is_active(&self) -> bool {
        self.snapshot.borrow().is_active
    }

    /// A session whose state is `End` accepts no further mutation.
    fn ensure_not_ended(&self) -> SessionResult<()> {
        if self.session_state() == SessionState::End {
            return Err(SessionError::InvalidSession);
        }
        Ok(())
    }

    // --- Geometry surface ---

    pub async fn update_session_rect(
        &self,
        rect: RectInt,
        reason: SizeChangeReason,
        is_global: bool,
    ) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("UpdateSessionRect", move |core| {
                core.update_session_rect(rect, reason, is_global)
            })
            .await?
    }

    pub async fn start_moving_with_coordinate(
        &self,
        anchor_x: i32,
        anchor_y: i32,
        width: i32,
        height: i32,
    ) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("StartMovingWithCoordinate", move |core| {
                core.start_moving_with_coordinate(anchor_x, anchor_y, width, height)
            })
            .await?
    }

    /// Feeds one decoded pointer sample into the session. Returns
    /// whether the sample was dispatched to this session.
    pub async fn transfer_pointer_sample(&self, sample: PointerSample) -> SessionResult<bool> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("TransferPointerSample", move |core| {
                core.transfer_pointer_sample(sample)
            })
            .await?
    }

    /// Drives one move/drag geometry computation. Invoked by the vsync
    /// collaborator once per display refresh; intermediate pointer-move
    /// samples are coalesced and only the latest is processed.
    pub async fn on_refresh_tick(&self) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("OnRefreshTick", |core| core.on_refresh_tick())
            .await
    }

    pub fn on_lost_focus(&self) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue.post("OnLostFocus", |core| core.on_lost_focus())
    }

    pub async fn transfer_key_event(&self, event: KeyEvent) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("TransferKeyEvent", move |core| core.transfer_key_event(event))
            .await?
    }

    pub async fn set_aspect_ratio(&self, ratio: f32) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("SetAspectRatio", move |core| core.set_aspect_ratio(ratio))
            .await?
    }

    pub async fn set_global_maximize_mode(&self, mode: MaximizeMode) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("SetGlobalMaximizeMode", move |core| {
                core.set_global_maximize_mode(mode)
            })
            .await?
    }

    pub async fn global_maximize_mode(&self) -> SessionResult<MaximizeMode> {
        self.queue
            .post_sync("GetGlobalMaximizeMode", |core| core.global_maximize_mode())
            .await
    }

    // --- Query surface ---

    /// The most recently requested rect, observed in queue order.
    pub async fn requested_rect(&self) -> SessionResult<RectInt> {
        self.queue
            .post_sync("GetRequestedRect", |core| core.requested_rect())
            .await
    }

    pub async fn avoid_area_by_type(&self, ty: AvoidAreaType) -> SessionResult<AvoidArea> {
        self.queue
            .post_sync("GetAvoidAreaByType", move |core| core.avoid_area_by_type(ty))
            .await
    }

    pub async fn all_avoid_areas(&self) -> SessionResult<Vec<(AvoidAreaType, AvoidArea)>> {
        self.queue
            .post_sync("GetAllAvoidAreas", |core| {
                AvoidAreaType::ALL
                    .into_iter()
                    .map(|ty| (ty, core.avoid_area_by_type(ty)))
                    .collect()
            })
            .await
    }

    // --- Animation ---

    pub async fn notify_custom_animation_complete(&self) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("CustomAnimationComplete", |core| {
                core.on_custom_animation_complete()
            })
            .await?
    }

    // --- Destruction ---

    /// Destroys the session: cancels any active gesture, marks the state
    /// `End`, removes it from the arena, and shuts the queue down.
    pub async fn destroy(&self) -> SessionResult<()> {
        self.queue.post_sync("Destroy", |core| core.destroy()).await?;
        self.queue.shutdown();
        Ok(())
    }

    pub(crate) fn post_point_down_dialog(&self) {
        let _ = self
            .queue
            .post("HandlePointDownDialog", |core| core.handle_point_down_dialog());
    }
}

#[async_trait]
impl SessionLifecycle for Session {
    async fn connect(
        &self,
        stage: Option<Arc<dyn SessionStage>>,
        channel: Option<Arc<dyn EventChannel>>,
        surface: Option<SurfaceHandle>,
        property: Option<SessionProperty>,
        token: Option<Uuid>,
    ) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("Connect", move |core| {
                core.connect(stage, channel, surface, property, token)
            })
            .await?
    }

    async fn reconnect(
        &self,
        stage: Option<Arc<dyn SessionStage>>,
        channel: Option<Arc<dyn EventChannel>>,
        surface: Option<SurfaceHandle>,
        property: Option<SessionProperty>,
    ) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("Reconnect", move |core| {
                core.reconnect(stage, channel, surface, property)
            })
            .await?
    }

    async fn show(&self, property: Option<SessionProperty>) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("Show", move |core| core.show(property))
            .await?
    }

    fn hide(&self) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue.post("Hide", |core| {
            if let Err(error) = core.hide() {
                tracing::warn!(id = %core.info.id, %error, "async hide failed");
            }
        })
    }

    async fn hide_sync(&self) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue.post_sync("HideSync", |core| core.hide()).await?
    }

    async fn disconnect(&self, from_client: bool) -> SessionResult<()> {
        // Disconnect is idempotent with respect to already-ended sessions.
        if self.session_state() == SessionState::End {
            return Ok(());
        }
        self.queue
            .post_sync("Disconnect", move |core| core.disconnect(from_client))
            .await?
    }

    async fn update_active_status(&self, active: bool) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("UpdateActiveStatus", move |core| {
                core.update_active_status(active)
            })
            .await?
    }

    async fn terminate_session(&self, info: TerminateInfo) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("TerminateSession", move |core| core.terminate(info))
            .await?
    }

    async fn notify_session_exception(&self, info: TerminateInfo) -> SessionResult<()> {
        self.ensure_not_ended()?;
        self.queue
            .post_sync("NotifySessionException", move |core| {
                core.notify_exception(info)
            })
            .await?
    }
}

/// Builds and registers sessions.
pub struct SessionBuilder {
    info: SessionInfo,
    config: Arc<SessionCoreConfig>,
    property: SessionProperty,
    initial_rect: RectInt,
    ports: CollaboratorPorts,
    observers: SessionObservers,
}

impl SessionBuilder {
    pub fn new(info: SessionInfo, ports: CollaboratorPorts) -> Self {
        Self {
            info,
            config: Arc::new(SessionCoreConfig::default()),
            property: SessionProperty::default(),
            initial_rect: RectInt::ZERO,
            ports,
            observers: SessionObservers::default(),
        }
    }

    pub fn with_config(mut self, config: Arc<SessionCoreConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn with_property(mut self, property: SessionProperty) -> Self {
        self.property = property;
        self
    }

    pub fn with_initial_rect(mut self, rect: RectInt) -> Self {
        self.initial_rect = rect;
        self
    }

    pub fn with_observers(mut self, observers: SessionObservers) -> Self {
        self.observers = observers;
        self
    }

    /// Spawns the session worker, registers the handle in the arena, and
    /// returns it. Must run inside a tokio runtime.
    pub fn build(self, arena: &Arc<SessionArena>) -> Arc<Session> {
        let id = self.info.id;
        let category = self.info.category;
        let seed = SessionSnapshot {
            id,
            category,
            state: SessionState::Disconnect,
            is_active: false,
            is_terminating: false,
            rect: self.initial_rect,
            display_id: self.property.display_id,
            window_mode: self.property.window_mode,
            need_avoid: self.property.has_flag(WindowFlags::NEED_AVOID),
            is_modal: false,
            is_topmost: false,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(seed);
        let core = SessionCore::new(
            self.info,
            self.config,
            self.property,
            self.initial_rect,
            self.ports,
            self.observers,
            Arc::clone(arena),
            snapshot_tx,
        );
        let queue = TaskQueue::spawn(format!("session-{id}"), core);
        let session = Arc::new(Session {
            id,
            category,
            queue,
            snapshot: snapshot_rx,
        });
        arena.insert(Arc::clone(&session));
        session
    }
}

//! Arena of live sessions indexed by persistent id.
//!
//! Parent/child relations are stored as ids, never as owning pointers,
//! so reference cycles (including a session set as its own parent in
//! recovery paths) are impossible by construction. Cross-session
//! operations resolve the target here and post into the target's own
//! queue rather than mutating its state directly.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{SessionError, SessionResult};
use crate::types::{SessionId, SessionSnapshot};

use super::handle::Session;

#[derive(Default)]
struct ArenaInner {
    sessions: HashMap<SessionId, Arc<Session>>,
    parents: HashMap<SessionId, SessionId>,
    children: HashMap<SessionId, Vec<SessionId>>,
}

/// The session arena shared by every session and the collaborator layer.
#[derive(Default)]
pub struct SessionArena {
    inner: RwLock<ArenaInner>,
}

impl SessionArena {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn insert(&self, session: Arc<Session>) {
        let mut inner = self.inner.write().expect("arena lock poisoned");
        inner.sessions.insert(session.id(), session);
    }

    /// Removes the session and severs its relations in both directions.
    pub fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        let mut inner = self.inner.write().expect("arena lock poisoned");
        if let Some(parent) = inner.parents.remove(&id) {
            if let Some(siblings) = inner.children.get_mut(&parent) {
                siblings.retain(|child| *child != id);
            }
        }
        for child in inner.children.remove(&id).unwrap_or_default() {
            inner.parents.remove(&child);
        }
        inner.sessions.remove(&id)
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.inner
            .read()
            .expect("arena lock poisoned")
            .sessions
            .get(&id)
            .cloned()
    }

    /// Resolves a session, reporting `DestroyedObject` when it is gone.
    pub fn resolve(&self, id: SessionId) -> SessionResult<Arc<Session>> {
        self.get(id).ok_or(SessionError::DestroyedObject)
    }

    /// Records `parent` as the parent of `child`. Both must be alive.
    pub fn set_parent(&self, child: SessionId, parent: SessionId) -> SessionResult<()> {
        let mut inner = self.inner.write().expect("arena lock poisoned");
        if !inner.sessions.contains_key(&child) || !inner.sessions.contains_key(&parent) {
            return Err(SessionError::DestroyedObject);
        }
        if let Some(previous) = inner.parents.insert(child, parent) {
            if let Some(siblings) = inner.children.get_mut(&previous) {
                siblings.retain(|c| *c != child);
            }
        }
        let siblings = inner.children.entry(parent).or_default();
        if !siblings.contains(&child) {
            siblings.push(child);
        }
        Ok(())
    }

    pub fn parent_of(&self, id: SessionId) -> Option<SessionId> {
        self.inner
            .read()
            .expect("arena lock poisoned")
            .parents
            .get(&id)
            .copied()
    }

    pub fn children_of(&self, id: SessionId) -> Vec<SessionId> {
        self.inner
            .read()
            .expect("arena lock poisoned")
            .children
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Immutable snapshot of another session, if it is still alive.
    pub fn snapshot_of(&self, id: SessionId) -> Option<SessionSnapshot> {
        self.get(id).map(|session| session.snapshot())
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("arena lock poisoned").sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

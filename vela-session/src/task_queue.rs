//! Per-session serial task queue.
//!
//! Each session owns exactly one logical serial execution queue: a
//! single-consumer channel drained by a dedicated worker that owns the
//! session's mutable state. Every lifecycle- or geometry-mutating
//! operation is wrapped as a task and appended here, so tasks execute
//! strictly in submission order, one at a time, and no two mutating
//! operations on the same state ever run concurrently.
//!
//! Two submission modes exist: `post` enqueues and returns immediately;
//! `post_sync` enqueues and awaits that specific task's completion
//! through a oneshot reply channel.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};

enum QueueItem<S> {
    Task {
        name: &'static str,
        task: Box<dyn FnOnce(&mut S) + Send + 'static>,
    },
    Shutdown,
}

/// Handle to one serial queue. Cloning shares the same queue.
pub struct TaskQueue<S> {
    sender: mpsc::UnboundedSender<QueueItem<S>>,
}

impl<S> Clone for TaskQueue<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: Send + 'static> TaskQueue<S> {
    /// Spawns the worker owning `state` and returns the queue handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(label: String, mut state: S) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<QueueItem<S>>();
        tokio::spawn(async move {
            while let Some(item) = receiver.recv().await {
                match item {
                    QueueItem::Task { name, task } => {
                        debug!(queue = %label, task = name, "executing queue task");
                        task(&mut state);
                    }
                    QueueItem::Shutdown => {
                        debug!(queue = %label, "queue shut down");
                        receiver.close();
                        break;
                    }
                }
            }
        });
        Self { sender }
    }

    /// Async post: enqueue and return immediately. The caller does not
    /// observe the task's completion.
    pub fn post(
        &self,
        name: &'static str,
        task: impl FnOnce(&mut S) + Send + 'static,
    ) -> SessionResult<()> {
        self.sender
            .send(QueueItem::Task {
                name,
                task: Box::new(task),
            })
            .map_err(|_| {
                warn!(task = name, "post on a destroyed session queue");
                SessionError::DestroyedObject
            })
    }

    /// Sync post: enqueue and await completion of this specific task,
    /// returning its result.
    pub async fn post_sync<R, F>(&self, name: &'static str, task: F) -> SessionResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut S) -> R + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        self.post(name, move |state| {
            let _ = reply.send(task(state));
        })?;
        response.await.map_err(|_| SessionError::DestroyedObject)
    }

    /// Requests queue shutdown. Tasks already enqueued ahead of the
    /// request still run; later posts observe `DestroyedObject`.
    pub fn shutdown(&self) {
        let _ = self.sender.send(QueueItem::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn tasks_run_in_submission_order() {
        let queue = TaskQueue::spawn("test".into(), Vec::<u32>::new());
        for i in 0..100 {
            queue.post("push", move |v| v.push(i)).unwrap();
        }
        let seen = queue.post_sync("read", |v| v.clone()).await.unwrap();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn post_sync_observes_committed_state() {
        let queue = TaskQueue::spawn("test".into(), 0u32);
        queue.post("add", |v| *v += 1).unwrap();
        let value = queue
            .post_sync("add-and-read", |v| {
                *v += 1;
                *v
            })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn shutdown_rejects_later_posts() {
        let queue = TaskQueue::spawn("test".into(), 0u32);
        queue.shutdown();
        // The worker races with the post; drain the shutdown first.
        tokio::task::yield_now().await;
        let result = queue.post_sync("late", |v| *v).await;
        assert_eq!(result.unwrap_err(), SessionError::DestroyedObject);
    }

    #[tokio::test]
    async fn tasks_ahead_of_shutdown_still_run() {
        let queue = TaskQueue::spawn("test".into(), 0u32);
        let (tx, rx) = tokio::sync::oneshot::channel();
        queue
            .post("inc", move |v| {
                *v += 1;
                let _ = tx.send(*v);
            })
            .unwrap();
        queue.shutdown();
        assert_eq!(rx.await.unwrap(), 1);
    }
}

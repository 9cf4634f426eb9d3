//! Cancellable scheduled tasks.
//!
//! The engine's two background activities, the preview's scroll animation
//! and the periodic best-effort auto-save, share one primitive: a
//! time-sliced task that runs a callback per tick and can be cancelled at any
//! tick boundary. Neither activity touches engine data from the task; the
//! animation only moves a presentation offset, and the auto-saver works on a
//! captured snapshot.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::{task, time};

use crate::snapshot::{FlowSnapshot, SnapshotStore};

/// Handle to a running scheduled task.
///
/// Dropping the handle cancels the task; [`cancel`](Self::cancel) does the
/// same explicitly while keeping the handle around for `is_finished` checks.
pub struct ScheduledTask {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<task::JoinHandle<()>>,
}

impl ScheduledTask {
    fn spawned(shutdown: oneshot::Sender<()>, handle: task::JoinHandle<()>) -> Self {
        Self {
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    /// Requests cancellation at the next tick boundary. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }

    /// Cancels and waits for the task to wind down.
    pub async fn cancel_and_wait(mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// True once the task has stopped, whether by completion or cancellation.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Spawns a time-sliced task invoking `frame` once per `period`.
///
/// The first frame fires immediately; each invocation receives the frame
/// number. Returning [`ControlFlow::Break`] ends the task from inside, and
/// [`ScheduledTask::cancel`] ends it from outside at the next boundary,
/// which is exactly the contract a scroll animation needs.
///
/// # Examples
///
/// ```no_run
/// use std::ops::ControlFlow;
/// use std::time::Duration;
/// use chatloom::tasks::spawn_frames;
///
/// // Ease a scroll offset toward its target, one slice per frame.
/// let mut offset = 0.0_f32;
/// let target = 480.0_f32;
/// let animation = spawn_frames(Duration::from_millis(16), move |_frame| {
///     offset += (target - offset) * 0.2;
///     if (target - offset).abs() < 0.5 {
///         ControlFlow::Break(())
///     } else {
///         ControlFlow::Continue(())
///     }
/// });
/// drop(animation); // cancelling mid-flight is always safe
/// ```
pub fn spawn_frames<F>(period: Duration, mut frame: F) -> ScheduledTask
where
    F: FnMut(u64) -> ControlFlow<()> + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let handle = task::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        let mut number: u64 = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = interval.tick() => {
                    if frame(number).is_break() {
                        break;
                    }
                    number += 1;
                }
            }
        }
    });
    ScheduledTask::spawned(shutdown_tx, handle)
}

/// Spawns the periodic best-effort auto-saver.
///
/// Every `period`, `capture` produces a fresh [`FlowSnapshot`] which is
/// handed to `store`. A failed save is logged and superseded by the next
/// interval, never retried mid-interval, never blocking interaction. The
/// first save happens one full period after spawning.
pub fn spawn_autosave<F>(
    period: Duration,
    store: Arc<dyn SnapshotStore>,
    capture: F,
) -> ScheduledTask
where
    F: Fn() -> FlowSnapshot + Send + Sync + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let handle = task::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        interval.tick().await; // the immediate tick; nothing to save yet
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = interval.tick() => {
                    let snapshot = capture();
                    match store.save(&snapshot).await {
                        Ok(()) => tracing::debug!("auto-saved flow snapshot"),
                        Err(e) => {
                            tracing::warn!(error = %e, "auto-save failed; superseded at next interval");
                        }
                    }
                }
            }
        }
    });
    ScheduledTask::spawned(shutdown_tx, handle)
}

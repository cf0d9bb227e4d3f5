//! Single-slot delayed task scheduler.
//!
//! Every [`Debouncer::trigger`] replaces whatever is waiting with a new task due
//! `window` from now. Once a task has fired it runs to completion; later
//! triggers only cancel a task that is still waiting.

use parking_lot::Mutex;
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct Pending {
    cancel: CancellationToken,
    fired: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct Slots {
    pending: Option<Pending>,
    /// Replaced tasks; ones that had already fired may still be running.
    replaced: Vec<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    slots: Mutex<Slots>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, slots: Mutex::new(Slots::default()) }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `task` to run after the window, dropping any task still waiting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let window = self.window;

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(window) => {}
            }
            flag.store(true, Ordering::SeqCst);
            task.await;
        });

        let mut slots = self.slots.lock();
        slots.replaced.retain(|h| !h.is_finished());
        if let Some(previous) = slots.pending.replace(Pending { cancel, fired, handle }) {
            previous.cancel.cancel();
            slots.replaced.push(previous.handle);
        }
    }

    /// Drop the waiting task, if any. A task that already fired keeps running.
    pub fn cancel(&self) {
        let mut slots = self.slots.lock();
        if let Some(previous) = slots.pending.take() {
            previous.cancel.cancel();
            slots.replaced.push(previous.handle);
        }
    }

    /// True while a task is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.slots
            .lock()
            .pending
            .as_ref()
            .is_some_and(|p| !p.cancel.is_cancelled() && !p.fired.load(Ordering::SeqCst))
    }

    /// Wait for the scheduled task to fire and finish, along with any earlier
    /// task that fired and is still running.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut slots = self.slots.lock();
            let mut handles = std::mem::take(&mut slots.replaced);
            handles.extend(slots.pending.take().map(|p| p.handle));
            handles
        };

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Debounced task did not complete: {e}");
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.slots.get_mut().pending.take() {
            pending.cancel.cancel();
        }
    }
}

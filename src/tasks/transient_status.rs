//! Transient notification status with a cancellable revert timer

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{sync::broadcast, task::JoinHandle, time::sleep};
use tracing::{debug, warn};

use crate::state::{StatusNotice, SubmissionStatus};

#[derive(Debug)]
struct Slot {
    notice: StatusNotice,
    generation: u64,
    revert: Option<JoinHandle<()>>,
    closed: bool,
}

impl Slot {
    fn cancel_revert(&mut self) {
        if let Some(revert) = self.revert.take() {
            revert.abort();
        }
    }
}

/// A status that shows a notice and reverts to idle after a fixed lifetime
///
/// Every transition supersedes the previous one: a pending revert is aborted
/// and the generation counter moves on, so a revert that already woke up
/// cannot overwrite a newer notice. After [`TransientStatus::close`] every
/// update is ignored.
#[derive(Debug)]
pub struct TransientStatus {
    name: &'static str,
    slot: Arc<Mutex<Slot>>,
    events_tx: broadcast::Sender<StatusNotice>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TransientStatus {
    pub fn new(name: &'static str) -> Self {
        let (events_tx, _) = broadcast::channel(32);
        Self {
            name,
            slot: Arc::new(Mutex::new(Slot {
                notice: StatusNotice::idle(),
                generation: 0,
                revert: None,
                closed: false,
            })),
            events_tx,
        }
    }

    pub fn current(&self) -> StatusNotice {
        lock(&self.slot).notice.clone()
    }

    /// Receive every transition, in order
    pub fn subscribe(&self) -> broadcast::Receiver<StatusNotice> {
        self.events_tx.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.slot).closed
    }

    /// Move into `notice` unless the status is already `Sending`
    ///
    /// Returns false when the status was busy or closed. No revert is
    /// scheduled; the caller is expected to follow up with [`Self::show`].
    pub fn begin(&self, notice: StatusNotice) -> bool {
        let mut slot = lock(&self.slot);
        if slot.closed || slot.notice.status == SubmissionStatus::Sending {
            return false;
        }
        self.transition(&mut slot, notice);
        true
    }

    /// Show `notice` and revert to idle once `lifetime` has passed
    pub fn show(&self, notice: StatusNotice, lifetime: Duration) -> bool {
        let mut slot = lock(&self.slot);
        if slot.closed {
            debug!("Ignoring {} update after teardown", self.name);
            return false;
        }
        self.transition(&mut slot, notice);

        let generation = slot.generation;
        let shared = Arc::clone(&self.slot);
        let events_tx = self.events_tx.clone();
        let name = self.name;
        slot.revert = Some(tokio::spawn(async move {
            sleep(lifetime).await;

            let mut slot = lock(&shared);
            if slot.closed || slot.generation != generation {
                return;
            }
            slot.generation += 1;
            slot.notice = StatusNotice::idle();
            slot.revert = None;
            debug!("{} status reverted to idle", name);
            let _ = events_tx.send(slot.notice.clone());
        }));
        true
    }

    /// Cancel any pending revert and stop accepting updates
    pub fn close(&self) {
        let mut slot = lock(&self.slot);
        slot.cancel_revert();
        slot.closed = true;
    }

    fn transition(&self, slot: &mut Slot, notice: StatusNotice) {
        slot.cancel_revert();
        slot.generation += 1;
        slot.notice = notice;

        debug!("{} status -> {:?}", self.name, slot.notice.status);
        if self.events_tx.receiver_count() > 0 {
            if let Err(e) = self.events_tx.send(slot.notice.clone()) {
                warn!("Failed to send {} status notification: {}", self.name, e);
            }
        }
    }
}

impl Drop for TransientStatus {
    fn drop(&mut self) {
        lock(&self.slot).cancel_revert();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, Instant};

    #[tokio::test(start_paused = true)]
    async fn shown_notice_reverts_after_lifetime() {
        let status = TransientStatus::new("test");
        let mut rx = status.subscribe();

        status.show(StatusNotice::success("done"), Duration::from_millis(1500));
        assert_eq!(rx.recv().await.expect("success").status, SubmissionStatus::Success);

        advance(Duration::from_millis(1499)).await;
        assert_eq!(status.current().status, SubmissionStatus::Success);

        assert_eq!(rx.recv().await.expect("idle"), StatusNotice::idle());
        assert_eq!(status.current(), StatusNotice::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_notice_cancels_stale_revert() {
        let status = TransientStatus::new("test");
        let mut rx = status.subscribe();
        let start = Instant::now();

        status.show(StatusNotice::error("first"), Duration::from_millis(1000));
        advance(Duration::from_millis(800)).await;
        status.show(StatusNotice::success("second"), Duration::from_millis(1000));

        // The first revert would have fired here
        advance(Duration::from_millis(500)).await;
        assert_eq!(status.current(), StatusNotice::success("second"));

        assert_eq!(rx.recv().await.expect("first"), StatusNotice::error("first"));
        assert_eq!(rx.recv().await.expect("second"), StatusNotice::success("second"));
        assert_eq!(rx.recv().await.expect("idle"), StatusNotice::idle());
        assert!(start.elapsed() >= Duration::from_millis(1800));
    }

    #[tokio::test(start_paused = true)]
    async fn begin_refuses_while_sending() {
        let status = TransientStatus::new("test");
        assert!(status.begin(StatusNotice::sending("one")));
        assert!(!status.begin(StatusNotice::sending("two")));
        assert_eq!(status.current(), StatusNotice::sending("one"));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_status_ignores_updates_and_pending_revert() {
        let status = TransientStatus::new("test");
        status.show(StatusNotice::success("done"), Duration::from_millis(100));
        status.close();

        assert!(!status.show(StatusNotice::error("late"), Duration::from_millis(100)));
        advance(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        assert_eq!(status.current(), StatusNotice::success("done"));
        assert!(status.is_closed());
    }
}

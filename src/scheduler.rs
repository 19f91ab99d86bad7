//! Per-session round timer.
//!
//! Each session owns one [`RoundTimer`]. A round is two sequential phases
//! (answer window, then reveal window); arming a phase cancels whatever was
//! pending, so a session can never have two windows armed at once. The
//! timer task captures the epoch handed out at arming time and must check it
//! against the session before acting — an aborted task never runs, and a
//! task that lost the race to a state transition sees a stale epoch and
//! becomes a no-op.

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct RoundTimer {
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

impl RoundTimer {
    /// Cancel any pending timer and hand out the epoch for the next phase.
    /// Call under the session lock, then spawn the phase task with the
    /// returned epoch and [`store`](Self::store) its handle.
    pub fn begin_phase(&mut self) -> u64 {
        self.cancel();
        self.epoch
    }

    pub fn store(&mut self, handle: JoinHandle<()>) {
        self.handle = Some(handle);
    }

    /// Abort the pending timer task, if any, and invalidate its epoch.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.epoch += 1;
    }

    /// A fired timer acts only if its captured epoch is still current.
    pub fn matches(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn arming_a_new_phase_invalidates_the_old_epoch() {
        let mut timer = RoundTimer::default();
        let first = timer.begin_phase();
        assert!(timer.matches(first));

        let second = timer.begin_phase();
        assert!(!timer.matches(first));
        assert!(timer.matches(second));
    }

    #[tokio::test]
    async fn cancel_aborts_the_pending_task() {
        let fired = Arc::new(AtomicBool::new(false));
        let mut timer = RoundTimer::default();

        let _epoch = timer.begin_phase();
        let flag = fired.clone();
        timer.store(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flag.store(true, Ordering::SeqCst);
        }));

        timer.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn stale_epoch_no_longer_matches_after_cancel() {
        let mut timer = RoundTimer::default();
        let epoch = timer.begin_phase();
        timer.cancel();
        assert!(!timer.matches(epoch));
    }
}

#![forbid(unsafe_code)]

//! Frame scheduling capability.
//!
//! The layout machine never owns a timer. When it has multi-frame work (a
//! collapse/expand animation) it asks an injected [`FrameScheduler`] for a
//! frame, and the host later calls back into the machine with a timestamp.
//! Each machine gets its own scheduler, so independent groups and tests never
//! share timing state.
//!
//! Every request carries the [`CancellationToken`] of the work that asked for
//! it. Once that work is cancelled the request is stale; hosts that drive a
//! [`FrameLoop`] hand the token to [`FrameLoop::schedule_cancellable`] so the
//! callback never fires.
//!
//! [`FrameLoop`] is the host-side half: a single driver that batches every
//! callback pending for a frame and keeps the ones that ask to run again.

use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use crate::cancellation::CancellationToken;

/// Capability to request a future frame.
pub trait FrameScheduler {
    /// Ask the host to deliver a frame to the group `group_id`, unless
    /// `token` is cancelled first.
    fn request_frame(&self, group_id: &str, token: &CancellationToken);
}

/// Scheduler that drops every request. Hosts that poll
/// `needs_frame()`-style state themselves can use it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScheduler;

impl FrameScheduler for NoopScheduler {
    fn request_frame(&self, _group_id: &str, _token: &CancellationToken) {}
}

/// Scheduler that records requests for the host (or a test) to drain.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    requests: RefCell<Vec<(String, CancellationToken)>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live requests not yet drained. Cancelled ones don't count.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|(_, token)| !token.is_cancelled())
            .count()
    }

    /// Drain recorded requests in arrival order, dropping cancelled ones.
    pub fn take_requests(&self) -> Vec<String> {
        std::mem::take(&mut *self.requests.borrow_mut())
            .into_iter()
            .filter(|(_, token)| !token.is_cancelled())
            .map(|(group_id, _)| group_id)
            .collect()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, group_id: &str, token: &CancellationToken) {
        self.requests
            .borrow_mut()
            .push((group_id.to_string(), token.clone()));
    }
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for std::rc::Rc<T> {
    fn request_frame(&self, group_id: &str, token: &CancellationToken) {
        (**self).request_frame(group_id, token);
    }
}

/// Identifier of a callback registered with a [`FrameLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameTaskId(u64);

type FrameCallback = Box<dyn FnMut(Duration) -> bool>;

/// Batches frame callbacks: "run again next frame while it returns true".
#[derive(Default)]
pub struct FrameLoop {
    pending: Vec<(FrameTaskId, FrameCallback)>,
    next_id: u64,
}

impl FrameLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for the next frame.
    pub fn schedule(&mut self, callback: impl FnMut(Duration) -> bool + 'static) -> FrameTaskId {
        let id = FrameTaskId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.push((id, Box::new(callback)));
        id
    }

    /// Register a callback that stops as soon as `token` is cancelled.
    pub fn schedule_cancellable(
        &mut self,
        token: CancellationToken,
        mut callback: impl FnMut(Duration) -> bool + 'static,
    ) -> FrameTaskId {
        self.schedule(move |now| !token.is_cancelled() && callback(now))
    }

    /// Remove a callback before it runs. Returns whether it was pending.
    pub fn cancel(&mut self, id: FrameTaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(task, _)| *task != id);
        self.pending.len() != before
    }

    /// Run every pending callback once, in registration order. Callbacks
    /// returning `false` are dropped. Returns how many remain.
    pub fn run_frame(&mut self, now: Duration) -> usize {
        self.pending.retain_mut(|(_, callback)| callback(now));
        self.pending.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

impl fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("pending", &self.pending.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationSource;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn callbacks_run_until_they_return_false() {
        let mut frames = FrameLoop::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        frames.schedule(move |_| {
            seen.set(seen.get() + 1);
            seen.get() < 3
        });

        assert_eq!(frames.run_frame(Duration::ZERO), 1);
        assert_eq!(frames.run_frame(Duration::from_millis(16)), 1);
        assert_eq!(frames.run_frame(Duration::from_millis(32)), 0);
        assert!(frames.is_idle());
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn batches_multiple_callbacks_per_frame() {
        let mut frames = FrameLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b"] {
            let log = Rc::clone(&log);
            frames.schedule(move |now| {
                log.borrow_mut().push((name, now));
                false
            });
        }
        frames.run_frame(Duration::from_millis(5));
        assert_eq!(
            *log.borrow(),
            vec![("a", Duration::from_millis(5)), ("b", Duration::from_millis(5))]
        );
    }

    #[test]
    fn cancelled_token_stops_callback() {
        let mut frames = FrameLoop::new();
        let source = CancellationSource::new();
        frames.schedule_cancellable(source.token(), |_| true);
        assert_eq!(frames.run_frame(Duration::ZERO), 1);
        source.cancel();
        assert_eq!(frames.run_frame(Duration::ZERO), 0);
    }

    #[test]
    fn cancel_by_id_removes_only_that_task() {
        let mut frames = FrameLoop::new();
        let first = frames.schedule(|_| true);
        frames.schedule(|_| true);
        assert!(frames.cancel(first));
        assert!(!frames.cancel(first));
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn manual_scheduler_records_requests() {
        let scheduler = Rc::new(ManualScheduler::new());
        let shared: Rc<ManualScheduler> = Rc::clone(&scheduler);
        let source = CancellationSource::new();
        shared.request_frame("group-1", &source.token());
        scheduler.request_frame("group-2", &source.token());
        assert_eq!(scheduler.pending(), 2);
        assert_eq!(scheduler.take_requests(), vec!["group-1", "group-2"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn manual_scheduler_drops_cancelled_requests() {
        let scheduler = ManualScheduler::new();
        let stale = CancellationSource::new();
        let live = CancellationSource::new();
        scheduler.request_frame("left", &stale.token());
        scheduler.request_frame("right", &live.token());
        stale.cancel();
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.take_requests(), vec!["right"]);
    }
}

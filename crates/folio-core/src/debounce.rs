use std::time::Duration;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: DebounceHandle,
    deadline: Instant,
    value: T,
}

/// Cancellable trailing-edge timer driven by an external clock.
///
/// Every `schedule` replaces the pending value and pushes the deadline out by
/// the full delay, so only the last call inside a quiet window fires.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    next_handle: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_handle: 1,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn schedule(&mut self, now: Instant, value: T) -> DebounceHandle {
        self.schedule_after(now, self.delay, value)
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, value: T) -> DebounceHandle {
        let handle = DebounceHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.pending = Some(Pending {
            handle,
            deadline: now + delay,
            value,
        });
        handle
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    /// Cancels only if `handle` is still the pending timer.
    pub fn cancel_handle(&mut self, handle: DebounceHandle) -> bool {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.handle == handle)
        {
            self.pending = None;
            return true;
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Time left until the pending value fires, zero if overdue.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            return self.cancel();
        }
        None
    }

    pub fn flush(&mut self) -> Option<T> {
        self.cancel()
    }
}

//! Timer abstraction used by the session controller.
//!
//! The controller never touches browser APIs directly. It asks a
//! [`TimerDriver`] to schedule [`TimerEvent`]s and keeps the returned
//! [`TimerId`]s so it can cancel them later. [`ManualTimers`] is a
//! deterministic virtual clock used for headless runs and tests; the browser
//! driver lives in [`crate::web_timers`].

use std::collections::BTreeMap;

/// Identifier handed out by a [`TimerDriver`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// What a timer means to the session when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Start the next heat, or complete the session if none remain.
    NextHeat,
    /// Single-heat sessions: the only heat's delay has elapsed.
    SessionEnd,
    /// One-second countdown tick.
    CountdownTick,
    /// Refresh the running lane labels of the given heat.
    Redraw(u32),
}

/// Schedule/cancel operations the session needs from its environment.
pub trait TimerDriver {
    /// Fire `event` once after `delay_ms`.
    fn set_timeout(&mut self, delay_ms: u32, event: TimerEvent) -> TimerId;
    /// Fire `event` every `period_ms` until cleared.
    fn set_interval(&mut self, period_ms: u32, event: TimerEvent) -> TimerId;
    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn clear(&mut self, id: TimerId);
}

/// A timer that came due on a [`ManualTimers`] clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired {
    pub id: TimerId,
    pub event: TimerEvent,
    pub at_ms: f64,
}

#[derive(Debug, Clone)]
struct Pending {
    event: TimerEvent,
    period_ms: Option<u32>,
}

/// Virtual-clock timer driver.
///
/// Due timers fire in order of due time, then creation order. Intervals
/// re-arm at exactly `due + period`, so there is no drift.
#[derive(Debug, Default)]
pub struct ManualTimers {
    now_ms: f64,
    next_id: u64,
    // (due_ms as integer, id) keeps ordering total and deterministic
    queue: BTreeMap<(u64, TimerId), Pending>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Number of timers still scheduled.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.queue.keys().any(|(_, pending_id)| *pending_id == id)
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock
    /// to its due time. Intervals are re-armed before returning.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<Fired> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due as f64 > until_ms {
            return None;
        }
        let pending = self.queue.remove(&(due, id))?;
        self.now_ms = self.now_ms.max(due as f64);
        if let Some(period) = pending.period_ms {
            self.queue.insert((due + period.max(1) as u64, id), pending.clone());
        }
        Some(Fired {
            id,
            event: pending.event,
            at_ms: due as f64,
        })
    }

    /// Move the clock forward without firing anything. Callers are expected
    /// to have drained due timers first.
    pub fn set_now(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn schedule(&mut self, delay_ms: u32, event: TimerEvent, period_ms: Option<u32>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let due = self.now_ms.ceil() as u64 + delay_ms as u64;
        self.queue.insert((due, id), Pending { event, period_ms });
        id
    }
}

impl TimerDriver for ManualTimers {
    fn set_timeout(&mut self, delay_ms: u32, event: TimerEvent) -> TimerId {
        self.schedule(delay_ms, event, None)
    }

    fn set_interval(&mut self, period_ms: u32, event: TimerEvent) -> TimerId {
        self.schedule(period_ms.max(1), event, Some(period_ms))
    }

    fn clear(&mut self, id: TimerId) {
        self.queue.retain(|(_, pending_id), _| *pending_id != id);
    }
}

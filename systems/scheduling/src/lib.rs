#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic virtual clock implementing the simulators' scheduler capability.
//!
//! The host owns the clock, feeds it elapsed wall-clock time through
//! [`VirtualClock::advance`], and drains due timers one at a time through
//! [`VirtualClock::poll`], forwarding each to the simulator that requested it.
//! Draining one timer at a time lets a simulator schedule follow-up timers
//! while handling a fire; those land on the same timeline and fire within the
//! same advance if they fall due before its horizon.

use std::{collections::BTreeMap, time::Duration};

use grid_arcade_core::{Scheduler, TimerId};

/// Shortest period accepted for repeating timers.
///
/// A zero interval would fire forever within a single advance.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug)]
struct PendingTimer {
    due: Duration,
    interval: Option<Duration>,
}

/// Virtual-time scheduler driven explicitly by the host.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Duration,
    horizon: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, PendingTimer>,
}

impl VirtualClock {
    /// Creates a clock at time zero with no pending timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Reports whether the timer is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, timer: TimerId) -> bool {
        self.timers.contains_key(&timer)
    }

    /// Time at which the earliest pending timer falls due.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.values().map(|timer| timer.due).min()
    }

    /// Extends the horizon up to which [`VirtualClock::poll`] fires timers.
    pub fn advance(&mut self, dt: Duration) {
        self.horizon = self.horizon.max(self.now).saturating_add(dt);
    }

    /// Moves the horizon to the earliest pending timer, if any.
    ///
    /// Returns the virtual time jumped to.
    pub fn advance_to_next(&mut self) -> Option<Duration> {
        let due = self.next_due()?;
        self.horizon = self.horizon.max(due);
        Some(due)
    }

    /// Pops the earliest timer due at or before the horizon.
    ///
    /// Ties fire in the order the timers were requested. Repeating timers are
    /// re-armed one interval after their due time. Once nothing else is due the
    /// clock settles at the horizon and `None` is returned.
    pub fn poll(&mut self) -> Option<TimerId> {
        let next = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.due <= self.horizon)
            .min_by_key(|(id, timer)| (timer.due, **id))
            .map(|(id, timer)| (*id, *timer));

        let Some((id, timer)) = next else {
            self.now = self.horizon;
            return None;
        };

        self.now = timer.due;
        match timer.interval {
            Some(interval) => {
                if let Some(pending) = self.timers.get_mut(&id) {
                    pending.due = timer.due.saturating_add(interval);
                }
            }
            None => {
                let _ = self.timers.remove(&id);
            }
        }
        log::trace!("timer {} fired at {:?}", id.get(), self.now);
        Some(id)
    }

    /// Drains every timer due up to the horizon.
    ///
    /// Only suitable when no handler schedules new timers; hosts that forward
    /// fires to simulators should loop over [`VirtualClock::poll`] instead.
    pub fn drain_due(&mut self) -> Vec<TimerId> {
        std::iter::from_fn(|| self.poll()).collect()
    }

    fn insert(&mut self, delay: Duration, interval: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);
        let timer = PendingTimer {
            due: self.now.saturating_add(delay),
            interval,
        };
        let _ = self.timers.insert(id, timer);
        id
    }
}

impl Scheduler for VirtualClock {
    fn schedule_after(&mut self, delay: Duration) -> TimerId {
        self.insert(delay, None)
    }

    fn schedule_every(&mut self, interval: Duration) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(interval, Some(interval))
    }

    fn cancel(&mut self, timer: TimerId) {
        if self.timers.remove(&timer).is_some() {
            log::trace!("timer {} cancelled", timer.get());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once_after_delay() {
        let mut clock = VirtualClock::new();
        let timer = clock.schedule_after(Duration::from_millis(300));

        clock.advance(Duration::from_millis(299));
        assert_eq!(clock.poll(), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(clock.poll(), Some(timer));
        assert_eq!(clock.poll(), None);
        assert!(!clock.is_pending(timer));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut clock = VirtualClock::new();
        let _ = clock.schedule_every(Duration::ZERO);
        clock.advance(Duration::from_millis(3));
        assert_eq!(clock.drain_due().len(), 3);
    }
}

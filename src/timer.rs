//! Cooperative single-threaded timers.
//!
//! The queue never sleeps and never spawns: the owner pumps it with the
//! current time and handles whatever is due, one event at a time.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    period: Option<u64>,
    event: E,
}

/// Timers keyed by `(deadline, arming sequence)` so ties fire in arming order.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    entries: BTreeMap<(u64, u64), Entry<E>>,
    next_seq: u64,
    next_id: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
            next_id: 0,
        }
    }
}

impl<E: Clone> TimerQueue<E> {

    /// Fires `event` every `period` ms, first at `now + period`.
    pub fn set_interval(&mut self, now: u64, period: u64, event: E) -> TimerId {
        let period = period.max(1);
        self.insert(now + period, Some(period), event)
    }

    /// Fires `event` once at `now + delay`.
    pub fn set_timeout(&mut self, now: u64, delay: u64, event: E) -> TimerId {
        self.insert(now + delay, None, event)
    }

    /// Returns whether a live timer was removed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self
            .entries
            .iter()
            .find(|(_, entry)| entry.id == id)
            .map(|(key, _)| *key);
        match key {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// Releases the earliest timer whose deadline is `<= now`, with that
    /// deadline. Intervals are re-armed before being released.
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, u64, E)> {
        let (&(deadline, _), _) = self.entries.first_key_value()?;
        if deadline > now {
            return None;
        }
        let (_, entry) = self.entries.pop_first()?;
        if let Some(period) = entry.period {
            let key = (deadline + period, self.bump_seq());
            self.entries.insert(key, entry.clone());
        }
        log::trace!("timer {:?} fired at {}", entry.id, deadline);
        Some((entry.id, deadline, entry.event))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, deadline: u64, period: Option<u64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let key = (deadline, self.bump_seq());
        self.entries.insert(key, Entry { id, period, event });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

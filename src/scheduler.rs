//! Interval scheduling on a virtual clock.
//!
//! Every active component may own one repeating interval. The scheduler
//! never looks at the wall clock: the driver calls [`Scheduler::pop_due`]
//! with a target time and fires whatever comes due, in order. This keeps the
//! engine deterministic under test and lets a real event loop feed it
//! measured elapsed time.
//!
//! ## Handles
//!
//! [`IntervalHandle`] is a generational index: `index` names a slot that is
//! reused after cancellation, `generation` changes on every reuse. A stale
//! handle therefore can never cancel or fire somebody else's interval.

use std::time::Duration;

use crate::tree::ComponentId;

/// Intervals shorter than this are clamped.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IntervalHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Entry {
    owner: ComponentId,
    period: Duration,
    next_due: Duration,
    /// Registration order, breaks ties between equal due times
    seq: u64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward without firing anything.
    ///
    /// Call after draining [`pop_due`](Self::pop_due) for the same target.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Start a repeating interval for `owner`. The first tick is one period
    /// from now.
    pub fn register(&mut self, owner: ComponentId, period: Duration) -> IntervalHandle {
        let period = period.max(MIN_PERIOD);
        let entry = Entry {
            owner,
            period,
            next_due: self.now + period,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some(entry);
            IntervalHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            IntervalHandle {
                index,
                generation: 0,
            }
        }
    }

    fn slot(&self, handle: IntervalHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.entry.is_some())
    }

    /// Stop an interval. Returns false for stale or already cancelled handles.
    ///
    /// Once this returns the interval will not fire again.
    pub fn cancel(&mut self, handle: IntervalHandle) -> bool {
        if self.slot(handle).is_none() {
            return false;
        }
        self.slots[handle.index as usize].entry = None;
        self.free_indices.push(handle.index);
        true
    }

    pub fn is_live(&self, handle: IntervalHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Period of a live interval, after clamping.
    pub fn period(&self, handle: IntervalHandle) -> Option<Duration> {
        self.slot(handle)
            .and_then(|slot| slot.entry.as_ref())
            .map(|entry| entry.period)
    }

    /// Number of live intervals owned by `owner`.
    pub fn registrations_for(&self, owner: ComponentId) -> usize {
        self.slots
            .iter()
            .filter_map(|slot| slot.entry.as_ref())
            .filter(|entry| entry.owner == owner)
            .count()
    }

    /// Total number of live intervals.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }

    /// Pop the earliest interval due at or before `target`.
    ///
    /// The clock moves to the tick time and the interval is rescheduled one
    /// period later, so an interval lagging by several periods fires once
    /// per period as the caller keeps popping.
    pub fn pop_due(&mut self, target: Duration) -> Option<(IntervalHandle, ComponentId)> {
        let (index, _) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.entry.as_ref().map(|e| (i, (e.next_due, e.seq))))
            .filter(|(_, (due, _))| *due <= target)
            .min_by_key(|(_, key)| *key)?;

        let slot = &mut self.slots[index];
        let entry = slot.entry.as_mut()?;
        self.now = self.now.max(entry.next_due);
        entry.next_due += entry.period;
        Some((
            IntervalHandle {
                index: index as u32,
                generation: slot.generation,
            },
            entry.owner,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(s: &mut Scheduler, target: Duration) -> Vec<ComponentId> {
        let mut fired = Vec::new();
        while let Some((_, owner)) = s.pop_due(target) {
            fired.push(owner);
        }
        s.set_now(target);
        fired
    }

    #[test]
    fn test_fires_once_per_elapsed_period() {
        let mut s = Scheduler::new();
        let a = ComponentId::next();
        s.register(a, ms(100));

        assert!(drain(&mut s, ms(99)).is_empty());
        assert_eq!(drain(&mut s, ms(100)), vec![a]);
        assert_eq!(drain(&mut s, ms(350)), vec![a, a]);
        assert_eq!(s.now(), ms(350));
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut s = Scheduler::new();
        let slow = ComponentId::next();
        let fast = ComponentId::next();
        s.register(slow, ms(30));
        s.register(fast, ms(20));

        assert_eq!(drain(&mut s, ms(60)), vec![fast, slow, fast, slow, fast]);
    }

    #[test]
    fn test_cancelled_handle_never_fires() {
        let mut s = Scheduler::new();
        let a = ComponentId::next();
        let handle = s.register(a, ms(10));
        assert!(s.cancel(handle));
        assert!(!s.is_live(handle));
        assert!(!s.cancel(handle));
        assert!(drain(&mut s, ms(100)).is_empty());
        assert_eq!(s.live_count(), 0);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut s = Scheduler::new();
        let a = ComponentId::next();
        let b = ComponentId::next();
        let first = s.register(a, ms(10));
        s.cancel(first);

        // Reuses the slot with a new generation
        let second = s.register(b, ms(10));
        assert_eq!(first.index, second.index);
        assert_ne!(first.generation, second.generation);

        assert!(!s.cancel(first));
        assert!(s.is_live(second));
        assert_eq!(s.registrations_for(b), 1);
        assert_eq!(s.registrations_for(a), 0);
    }

    #[test]
    fn test_registration_starts_from_current_time() {
        let mut s = Scheduler::new();
        drain(&mut s, ms(1000));
        let a = ComponentId::next();
        s.register(a, ms(50));
        assert!(drain(&mut s, ms(1049)).is_empty());
        assert_eq!(drain(&mut s, ms(1050)), vec![a]);
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut s = Scheduler::new();
        let a = ComponentId::next();
        s.register(a, Duration::ZERO);
        assert_eq!(drain(&mut s, ms(3)).len(), 3);
    }
}

//! Virtual-time queue for delayed session events.
//!
//! Every entry carries the round it was issued for; the session drops
//! entries whose round is no longer current.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Identifies one round of one session. Bumped whenever the target
/// sequence changes or the session is started or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RoundId(pub u64);

impl RoundId {
    pub fn next(self) -> RoundId {
        RoundId(self.0 + 1)
    }
}

/// An event that has come due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<E> {
    pub due_us: i64,
    pub round: RoundId,
    pub event: E,
}

#[derive(Debug)]
struct Entry<E> {
    due_us: i64,
    /// Insertion order, breaks ties between equal due times.
    seq: u64,
    round: RoundId,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due_us == other.due_us && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // Reversed so the max-heap pops the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_us
            .cmp(&self.due_us)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BinaryHeap<Entry<E>>,
    next_seq: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `event` to fire at `due_us`.
    pub fn schedule_at(&mut self, due_us: i64, round: RoundId, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            due_us,
            seq,
            round,
            event,
        });
    }

    /// Removes and returns the earliest event due at or before `now_us`.
    /// Events with equal due times come out in insertion order.
    pub fn pop_due(&mut self, now_us: i64) -> Option<Scheduled<E>> {
        if self.queue.peek()?.due_us > now_us {
            return None;
        }
        self.queue.pop().map(|e| Scheduled {
            due_us: e.due_us,
            round: e.round,
            event: e.event,
        })
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<i64> {
        self.queue.peek().map(|e| e.due_us)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule_at(300, RoundId(1), "c");
        s.schedule_at(100, RoundId(1), "a");
        s.schedule_at(200, RoundId(1), "b");

        assert_eq!(s.next_due(), Some(100));
        assert!(s.pop_due(50).is_none());
        assert_eq!(s.pop_due(1_000).unwrap().event, "a");
        assert_eq!(s.pop_due(1_000).unwrap().event, "b");
        assert_eq!(s.pop_due(1_000).unwrap().event, "c");
        assert!(s.pop_due(1_000).is_none());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule_at(100, RoundId(0), 1);
        s.schedule_at(100, RoundId(0), 2);
        s.schedule_at(100, RoundId(0), 3);
        let order: Vec<i32> = std::iter::from_fn(|| s.pop_due(100).map(|e| e.event)).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn entries_keep_their_round() {
        let mut s = Scheduler::new();
        s.schedule_at(10, RoundId(7), ());
        let fired = s.pop_due(10).unwrap();
        assert_eq!(fired.round, RoundId(7));
        assert_eq!(fired.due_us, 10);
    }

    #[test]
    fn clear_drops_everything() {
        let mut s = Scheduler::new();
        s.schedule_at(10, RoundId(0), ());
        s.schedule_at(20, RoundId(0), ());
        assert_eq!(s.len(), 2);
        s.clear();
        assert!(s.is_empty());
        assert!(s.pop_due(i64::MAX).is_none());
    }

    #[test]
    fn round_id_next() {
        assert_eq!(RoundId(4).next(), RoundId(5));
        assert_eq!(RoundId::default(), RoundId(0));
    }
}

//! Deadline bookkeeping for the client's two kinds of timers.
//!
//! Nothing here sleeps or spawns: callers hand in the current instant and
//! collect whatever became due. The main loop sleeps until
//! [`crate::app::ChatApp::next_deadline`], and tests simply pass instants
//! further in the future.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tokio::time::{Duration, Instant};

/// A repeating timer. Owning the value is owning the timer: dropping it is
/// cancellation.
#[derive(Debug)]
pub struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    pub fn new(start: Instant, period: Duration) -> Self {
        Interval {
            period,
            next: start + period,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Returns how many periods elapsed up to `now`, catching up on any the
    /// caller missed.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let mut fired = 0;
        while self.next <= now {
            self.next += self.period;
            fired += 1;
        }
        fired
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry<T: Ord> {
    deadline: Instant,
    seq: u64,
    payload: T,
}

/// One-shot timers ordered by deadline; equal deadlines fire in arming order.
/// Arming never replaces an earlier entry.
#[derive(Debug)]
pub struct OneShotQueue<T: Ord> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    seq: u64,
}

impl<T: Ord> Default for OneShotQueue<T> {
    fn default() -> Self {
        OneShotQueue {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }
}

impl<T: Ord> OneShotQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, deadline: Instant, payload: T) {
        self.seq += 1;
        self.heap.push(Reverse(Entry {
            deadline,
            seq: self.seq,
            payload,
        }));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Removes and returns every payload whose deadline is at or before `now`.
    pub fn drain_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.deadline > now {
                break;
            }
            if let Some(Reverse(entry)) = self.heap.pop() {
                due.push(entry.payload);
            }
        }
        due
    }
}

/// Earliest of two optional deadlines.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

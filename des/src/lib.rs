//! Discrete-event simulation plumbing
//!
//! `Schedule` is a future event list: a min-first priority queue of pending
//! events keyed on simulated time. Events that share a time are ordered by
//! their [`Phase`] and then by insertion order, so a model can rely on
//! "all departures before all arrivals" without depending on how the heap
//! happens to break ties.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub mod parallel;

/// Position of an event within a single time step
///
/// Lower phases are popped first when several events share the same time.
pub trait Phase {
    fn phase(&self) -> usize {
        0
    }
}

struct Event<T> {
    t: usize,
    phase: usize,
    seq: usize,
    data: T,
}

impl<T> Event<T> {
    fn key(&self) -> (usize, usize, usize) {
        (self.t, self.phase, self.seq)
    }
}

impl<T> PartialEq for Event<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Event<T> {}

impl<T> Ord for Event<T> {
    // BinaryHeap is a max-heap, so the comparison is reversed
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl<T> PartialOrd for Event<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct Schedule<T> {
    queue: BinaryHeap<Event<T>>,
    next_seq: usize,
}

impl<T: Phase> Schedule<T> {
    pub fn new() -> Schedule<T> {
        Schedule {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, t: usize, data: T) {
        let phase = data.phase();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Event {
            t,
            phase,
            seq,
            data,
        });
    }

    /// Time of the earliest pending event
    pub fn peek_time(&self) -> Option<usize> {
        self.queue.peek().map(|event| event.t)
    }

    pub fn peek(&self) -> Option<(usize, &T)> {
        self.queue.peek().map(|event| (event.t, &event.data))
    }

    pub fn pop(&mut self) -> Option<(usize, T)> {
        self.queue.pop().map(|event| (event.t, event.data))
    }

    /// Pop the earliest event only if it is due at `t` and matches `accept`
    ///
    /// Draining a phase is a loop over this call: it stops at the first event
    /// that belongs to a later time or is rejected.
    pub fn pop_due<F>(&mut self, t: usize, accept: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        match self.queue.peek() {
            Some(event) if event.t == t && accept(&event.data) => {
                self.queue.pop().map(|event| event.data)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T: Phase> Default for Schedule<T> {
    fn default() -> Self {
        Schedule::new()
    }
}

impl<T: Phase> FromIterator<(usize, T)> for Schedule<T> {
    fn from_iter<I: IntoIterator<Item = (usize, T)>>(iter: I) -> Self {
        let mut schedule = Schedule::new();
        for (t, data) in iter {
            schedule.push(t, data);
        }
        schedule
    }
}

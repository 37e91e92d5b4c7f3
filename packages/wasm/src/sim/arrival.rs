//! Staggered arrival of generated vertices.
//!
//! Purely presentational: each vertex of a round becomes visible at its own
//! time so the view fills in gradually. The queue never alters vertex
//! content and never drops anything; it only decides *when* a vertex reaches
//! the visible store.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::dag::Vertex;

/// A vertex waiting to become visible.
#[derive(Debug)]
struct Pending {
    visible_at: f64,
    /// Schedule order, to keep releases stable for equal times.
    sequence: u64,
    vertex: Vertex,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .visible_at
            .total_cmp(&self.visible_at)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Min-queue of "become visible at time T" events.
#[derive(Debug, Default)]
pub struct ArrivalQueue {
    heap: BinaryHeap<Pending>,
    next_sequence: u64,
}

impl ArrivalQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `vertex` to become visible at `visible_at` (milliseconds).
    pub fn schedule(&mut self, vertex: Vertex, visible_at: f64) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Pending {
            visible_at,
            sequence,
            vertex,
        });
    }

    /// Remove and return every vertex due at or before `now`, earliest first.
    pub fn release(&mut self, now: f64) -> Vec<Vertex> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|p| p.visible_at <= now) {
            if let Some(pending) = self.heap.pop() {
                due.push(pending.vertex);
            }
        }
        due
    }

    /// Remove and return everything, earliest first.
    pub fn drain_all(&mut self) -> Vec<Vertex> {
        let mut all = Vec::with_capacity(self.heap.len());
        while let Some(pending) = self.heap.pop() {
            all.push(pending.vertex);
        }
        all
    }

    /// Time of the next release, if anything is pending.
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|p| p.visible_at)
    }

    /// Number of pending vertices.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop everything pending.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

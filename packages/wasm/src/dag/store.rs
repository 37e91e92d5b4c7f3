//! Append-only vertex store with a round index.
//!
//! Vertices are never removed individually. Eviction is the window predicate
//! re-applied on every pass; the `BTreeMap` index lets a windowed read start
//! at the first in-window round instead of scanning the whole history.

use std::collections::BTreeMap;

use super::vertex::Vertex;
use super::window;

/// Append-only store of vertices.
#[derive(Debug, Default, Clone)]
pub struct VertexStore {
    /// Vertices in insertion order.
    vertices: Vec<Vertex>,

    /// Map from round to indices into `vertices`, in insertion order.
    by_round: BTreeMap<u64, Vec<usize>>,
}

impl VertexStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex.
    pub fn push(&mut self, vertex: Vertex) {
        let index = self.vertices.len();
        self.by_round.entry(vertex.round).or_default().push(index);
        self.vertices.push(vertex);
    }

    /// Append several vertices in order.
    pub fn extend<I: IntoIterator<Item = Vertex>>(&mut self, vertices: I) {
        for vertex in vertices {
            self.push(vertex);
        }
    }

    /// Get the number of stored vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// All vertices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    /// Highest round stored.
    pub fn max_round(&self) -> Option<u64> {
        self.by_round.keys().next_back().copied()
    }

    /// Lowest round stored.
    pub fn min_round(&self) -> Option<u64> {
        self.by_round.keys().next().copied()
    }

    /// Vertices of a single round, in insertion order.
    pub fn round(&self, round: u64) -> impl Iterator<Item = &Vertex> {
        self.by_round
            .get(&round)
            .into_iter()
            .flatten()
            .map(|&i| &self.vertices[i])
    }

    /// The trailing `window_rounds` rounds, ascending by round and stable in
    /// insertion order within a round. Same result as [`window::select`]
    /// over [`Self::iter`].
    pub fn windowed(&self, window_rounds: u64) -> Vec<&Vertex> {
        let Some(max_round) = self.max_round() else {
            return Vec::new();
        };
        let start = window::window_start(max_round, window_rounds);

        self.by_round
            .range(start..)
            .flat_map(|(_, indices)| indices.iter().map(|&i| &self.vertices[i]))
            .collect()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.by_round.clear();
    }
}

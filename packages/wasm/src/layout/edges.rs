//! Parent and ack edge resolution.
//!
//! Edges are resolved against the positions placed so far in the current
//! pass. A reference whose target has not been placed (a later vertex, or one
//! evicted by the window) is reported as unresolved and produces no drawable
//! edge. Nothing is retried once the pass ends.

use std::collections::HashMap;

use serde::Serialize;

use super::positioner::Position;
use crate::dag::{Vertex, VertexId};

/// Kind of causal reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// From the parent to the child (same peer).
    Parent,
    /// From the acknowledging vertex to the acknowledged one.
    Ack,
}

/// A drawable line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub from: Position,
    pub to: Position,
}

/// One causal reference and whether it could be drawn in this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub kind: EdgeKind,
    pub target: VertexId,
    pub resolved: bool,
}

/// Edges and links produced for one vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Resolved edges only.
    pub edges: Vec<Edge>,
    /// Every reference, resolved or not.
    pub links: Vec<Link>,
}

/// Position map for one pass.
#[derive(Debug, Default)]
pub struct EdgeResolver {
    positions: HashMap<VertexId, Position>,
}

impl EdgeResolver {
    /// Create a resolver for a fresh pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with room for `capacity` vertices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Record a placed vertex. A duplicate id overwrites the earlier entry.
    pub fn record(&mut self, id: VertexId, position: Position) {
        self.positions.insert(id, position);
    }

    /// Position of an already placed vertex.
    pub fn position_of(&self, id: &VertexId) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Number of placed vertices.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Record `vertex` at `position`, then resolve its parent and ack edges.
    pub fn place_and_resolve(&mut self, vertex: &Vertex, position: Position) -> Resolution {
        self.record(vertex.id, position);

        let mut resolution = Resolution {
            edges: Vec::with_capacity(vertex.acks.len() + 1),
            links: Vec::with_capacity(vertex.acks.len() + 1),
        };

        if let Some(parent) = vertex.parent {
            let parent_position = self.position_of(&parent);
            if let Some(from) = parent_position {
                resolution.edges.push(Edge {
                    kind: EdgeKind::Parent,
                    from,
                    to: position,
                });
            }
            resolution.links.push(Link {
                kind: EdgeKind::Parent,
                target: parent,
                resolved: parent_position.is_some(),
            });
        }

        for &ack in &vertex.acks {
            let ack_position = self.position_of(&ack);
            if let Some(to) = ack_position {
                resolution.edges.push(Edge {
                    kind: EdgeKind::Ack,
                    from: position,
                    to,
                });
            }
            resolution.links.push(Link {
                kind: EdgeKind::Ack,
                target: ack,
                resolved: ack_position.is_some(),
            });
        }

        resolution
    }
}

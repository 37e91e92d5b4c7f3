//! Fork-aware vertex positioning.
//!
//! A vertex sits at `(lane * lane_spacing, level * level_spacing)`. When
//! several vertices from one peer claim the same height (a fork), the first
//! one placed in the pass keeps the canonical lane position and each later
//! one shifts right by another `fork_offset`, in processing order.

use std::collections::HashMap;

use serde::Serialize;

use crate::dag::PeerId;

/// A point on the z = 0 plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Resolved coordinate for one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    /// Number of vertices with the same (peer, height) placed before this one.
    pub fork_index: u32,
}

/// Places vertices for one pass, tracking (peer, height) collisions.
#[derive(Debug)]
pub struct ForkPositioner {
    lane_spacing: f32,
    level_spacing: f32,
    fork_offset: f32,
    /// Vertices placed so far in this pass, keyed by (peer, height).
    occupied: HashMap<(PeerId, u64), u32>,
}

impl ForkPositioner {
    /// Create a positioner for a fresh pass.
    pub fn new(lane_spacing: f32, level_spacing: f32, fork_offset: f32) -> Self {
        Self {
            lane_spacing,
            level_spacing,
            fork_offset,
            occupied: HashMap::new(),
        }
    }

    /// Place the next vertex. Must be called in window order.
    pub fn place(&mut self, peer: &PeerId, height: u64, lane: u32, level: u64) -> Placement {
        let slot = self.occupied.entry((peer.clone(), height)).or_insert(0);
        let fork_index = *slot;
        *slot += 1;

        let mut x = lane as f32 * self.lane_spacing;
        if fork_index > 0 {
            x += fork_index as f32 * self.fork_offset;
        }
        let y = level as f32 * self.level_spacing;

        Placement {
            position: Position::new(x, y),
            fork_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_position() {
        let mut positioner = ForkPositioner::new(0.5, 0.25, 0.1);
        let peer = PeerId::new(vec![1]);
        let placement = positioner.place(&peer, 1, 2, 4);
        assert_eq!(placement.position, Position::new(1.0, 1.0));
        assert_eq!(placement.fork_index, 0);
    }

    #[test]
    fn test_forks_fan_out_in_order() {
        let mut positioner = ForkPositioner::new(1.0, 1.0, 0.25);
        let peer = PeerId::new(vec![7]);

        let first = positioner.place(&peer, 5, 0, 2);
        let second = positioner.place(&peer, 5, 0, 2);
        let third = positioner.place(&peer, 5, 0, 2);

        assert_eq!(first.position.x, 0.0);
        assert_eq!(second.position.x, 0.25);
        assert_eq!(third.position.x, 0.5);
        assert_eq!(first.position.y, third.position.y);
        assert_eq!(third.fork_index, 2);
    }

    #[test]
    fn test_different_heights_do_not_collide() {
        let mut positioner = ForkPositioner::new(1.0, 1.0, 0.25);
        let peer = PeerId::new(vec![7]);
        positioner.place(&peer, 1, 0, 0);
        let next = positioner.place(&peer, 2, 0, 1);
        assert_eq!(next.fork_index, 0);

        let other = PeerId::new(vec![8]);
        assert_eq!(positioner.place(&other, 1, 1, 0).fork_index, 0);
    }

    #[test]
    fn test_degenerate_spacing_does_not_panic() {
        let mut positioner = ForkPositioner::new(-1.0, 0.0, f32::NAN);
        let placement = positioner.place(&PeerId::new(vec![1]), 1, 3, 3);
        assert_eq!(placement.position.x, -3.0);
        assert_eq!(placement.position.y, 0.0);
    }
}

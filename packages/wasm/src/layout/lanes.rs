//! Peer → lane assignment.
//!
//! Each peer gets a horizontal lane the first time it is seen, in order of
//! first appearance. Lanes are stable for the lifetime of the owning
//! [`LayoutContext`](super::LayoutContext).
//!
//! Lane slots are never reused: forgetting a peer retires its slot, and any
//! peer seen afterwards (including the forgotten one) gets the next
//! never-assigned index.

use std::collections::HashMap;

use crate::dag::PeerId;

/// Stable peer → lane mapping.
#[derive(Debug, Default, Clone)]
pub struct PeerLanes {
    /// Map from peer identity to its lane index.
    lanes: HashMap<PeerId, u32>,

    /// Next lane index to assign. Only ever grows.
    next_lane: u32,
}

impl PeerLanes {
    /// Create an empty assignor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lane for `peer`, assigning the next free index on first sight.
    pub fn lane_of(&mut self, peer: &PeerId) -> u32 {
        if let Some(&lane) = self.lanes.get(peer) {
            return lane;
        }

        let lane = self.next_lane;
        self.next_lane += 1;
        self.lanes.insert(peer.clone(), lane);
        log::trace!("assigned lane {} to {}", lane, peer);
        lane
    }

    /// Lane for `peer` without assigning one.
    pub fn get(&self, peer: &PeerId) -> Option<u32> {
        self.lanes.get(peer).copied()
    }

    /// Retire a peer's lane. Returns the retired index, if any.
    pub fn forget(&mut self, peer: &PeerId) -> Option<u32> {
        self.lanes.remove(peer)
    }

    /// Number of peers currently holding a lane.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Check if no peer holds a lane.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// The index the next new peer will receive.
    pub fn next_lane(&self) -> u32 {
        self.next_lane
    }

    /// Drop every assignment and start counting from zero again.
    pub fn clear(&mut self) {
        self.lanes.clear();
        self.next_lane = 0;
    }
}

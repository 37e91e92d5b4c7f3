//! One layout pass over a windowed vertex sequence.
//!
//! # Pass Overview
//!
//! 1. **Levels:** find the lowest round of the input and map every round to
//!    a zero-based level.
//! 2. **Placement (in input order):** lane from the context's peer lanes,
//!    level from step 1, fork offset from earlier vertices with the same
//!    (peer, height).
//! 3. **Edges:** right after a vertex is placed, resolve its parent and ack
//!    references against everything placed before it.
//!
//! The input must already be windowed and sorted by round (see
//! [`crate::dag::window`]). Positions are recomputed from scratch each pass;
//! only the peer lanes persist between passes.

use serde::Serialize;

use super::edges::{Edge, EdgeResolver, Link};
use super::lanes::PeerLanes;
use super::levels::RoundLevels;
use super::positioner::{ForkPositioner, Position};
use crate::dag::{Status, Vertex, VertexId};

/// Spacing parameters for a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    /// Horizontal distance between lanes.
    pub lane_spacing: f32,
    /// Vertical distance between levels.
    pub level_spacing: f32,
    /// Extra horizontal shift per fork.
    pub fork_offset: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            lane_spacing: 0.5,
            level_spacing: 0.5,
            fork_offset: 0.15,
        }
    }
}

/// Display color and its meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorInfo {
    pub label: String,
    pub color: String,
}

/// Output record for one placed vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedVertex {
    pub id: VertexId,
    pub position: Position,
    /// Resolved edges only.
    pub edges: Vec<Edge>,
    /// Every parent/ack reference, with its resolution state.
    pub links: Vec<Link>,
    pub peer_label: String,
    pub lane: u32,
    pub level: u64,
    pub fork_index: u32,
    pub round: u64,
    pub height: u64,
    pub acks_count: usize,
    pub status: Status,
    pub color_tag: ColorInfo,
}

/// Result of one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutFrame {
    /// Placed vertices in processing order.
    pub placed: Vec<PlacedVertex>,
    /// Minimum round of the pass.
    pub lowest_round: u64,
    /// Maximum level of the pass.
    pub highest_level: u64,
    /// `highest_level * level_spacing`, for re-centering the camera.
    pub vertical_extent: f32,
}

impl LayoutFrame {
    /// Number of placed vertices.
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Check if nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Total number of drawable edges.
    pub fn edge_count(&self) -> usize {
        self.placed.iter().map(|p| p.edges.len()).sum()
    }

    /// Find a placed vertex by id. With duplicate ids the last one wins.
    pub fn get(&self, id: &VertexId) -> Option<&PlacedVertex> {
        self.placed.iter().rev().find(|p| p.id == *id)
    }
}

/// State that survives between passes.
///
/// Owned by the caller and passed into every pass, so nothing about lane
/// assignment lives in shared module state.
#[derive(Debug, Default, Clone)]
pub struct LayoutContext {
    lanes: PeerLanes,
}

impl LayoutContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Peer lanes assigned so far.
    pub fn lanes(&self) -> &PeerLanes {
        &self.lanes
    }

    /// Mutable access to the peer lanes.
    pub fn lanes_mut(&mut self) -> &mut PeerLanes {
        &mut self.lanes
    }

    /// Run one pass over `vertices`, which must be windowed and sorted.
    pub fn layout(&mut self, vertices: &[&Vertex], settings: &LayoutSettings) -> LayoutFrame {
        let levels = RoundLevels::from_rounds(vertices.iter().map(|v| v.round));
        let mut positioner = ForkPositioner::new(
            settings.lane_spacing,
            settings.level_spacing,
            settings.fork_offset,
        );
        let mut resolver = EdgeResolver::with_capacity(vertices.len());
        let mut placed = Vec::with_capacity(vertices.len());

        for vertex in vertices {
            let lane = self.lanes.lane_of(&vertex.peer);
            let level = levels.level_of(vertex.round);
            let placement = positioner.place(&vertex.peer, vertex.height, lane, level);
            let resolution = resolver.place_and_resolve(vertex, placement.position);

            placed.push(PlacedVertex {
                id: vertex.id,
                position: placement.position,
                edges: resolution.edges,
                links: resolution.links,
                peer_label: vertex.peer.label(),
                lane,
                level,
                fork_index: placement.fork_index,
                round: vertex.round,
                height: vertex.height,
                acks_count: vertex.acks.len(),
                status: vertex.status,
                color_tag: ColorInfo {
                    label: vertex.data.label().to_string(),
                    color: vertex.data.color().to_string(),
                },
            });
        }

        let highest_level = levels.highest_level();
        let frame = LayoutFrame {
            placed,
            lowest_round: levels.lowest_round(),
            highest_level,
            vertical_extent: highest_level as f32 * settings.level_spacing,
        };

        log::debug!(
            "layout pass: {} vertices, {} edges, rounds from {}, extent {}",
            frame.len(),
            frame.edge_count(),
            frame.lowest_round,
            frame.vertical_extent
        );
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::{window, ColorTag, PeerId};
    use crate::layout::edges::EdgeKind;

    fn vertex(id: u64, peer: u8, height: u64, round: u64) -> Vertex {
        Vertex {
            id: VertexId::from_u64(id),
            peer: PeerId::new(vec![peer]),
            parent: None,
            acks: Vec::new(),
            height,
            round,
            status: Status::Confirmed,
            data: ColorTag::IsolatedRoot,
        }
    }

    fn settings() -> LayoutSettings {
        LayoutSettings {
            lane_spacing: 1.0,
            level_spacing: 2.0,
            fork_offset: 0.25,
        }
    }

    #[test]
    fn test_lanes_and_levels() {
        let vertices = vec![vertex(1, 0xA, 1, 3), vertex(2, 0xB, 1, 3), vertex(3, 0xA, 2, 4)];
        let refs: Vec<&Vertex> = vertices.iter().collect();

        let mut context = LayoutContext::new();
        let frame = context.layout(&refs, &settings());

        assert_eq!(frame.lowest_round, 3);
        assert_eq!(frame.highest_level, 1);
        assert_eq!(frame.vertical_extent, 2.0);
        assert_eq!(frame.placed[0].position, Position::new(0.0, 0.0));
        assert_eq!(frame.placed[1].position, Position::new(1.0, 0.0));
        assert_eq!(frame.placed[2].position, Position::new(0.0, 2.0));
        assert_eq!(frame.placed[1].peer_label, "0b");
    }

    #[test]
    fn test_fork_scenario() {
        let v1 = vertex(1, 0xF, 5, 3);
        let v2 = vertex(2, 0xF, 5, 3);
        let mut context = LayoutContext::new();
        let frame = context.layout(&[&v1, &v2], &settings());

        let p1 = frame.placed[0].position;
        let p2 = frame.placed[1].position;
        assert_eq!(p2.x, p1.x + 0.25);
        assert_eq!(p1.y, p2.y);
        assert_eq!(frame.placed[1].fork_index, 1);
    }

    #[test]
    fn test_lanes_persist_across_passes() {
        let a = vertex(1, 0xA, 1, 1);
        let b = vertex(2, 0xB, 1, 1);
        let mut context = LayoutContext::new();

        context.layout(&[&a, &b], &settings());
        // B alone still sits in its original lane.
        let frame = context.layout(&[&b], &settings());
        assert_eq!(frame.placed[0].lane, 1);
        assert_eq!(frame.placed[0].position.x, 1.0);
    }

    #[test]
    fn test_eviction_scenario() {
        // Rounds 1..=5, one vertex per round for two peers, each acking the
        // other peer's previous-round vertex, plus a stale ack into round 2.
        let mut vertices = Vec::new();
        for round in 1..=5u64 {
            for peer in 0..2u8 {
                let id = round * 10 + peer as u64;
                let mut v = vertex(id, peer, round, round);
                if round > 1 {
                    v.parent = Some(VertexId::from_u64((round - 1) * 10 + peer as u64));
                    v.acks.push(VertexId::from_u64((round - 1) * 10 + (1 - peer) as u64));
                }
                if round == 5 {
                    v.acks.push(VertexId::from_u64(20 + peer as u64));
                }
                vertices.push(v);
            }
        }

        let windowed = window::select(&vertices, 2);
        let mut context = LayoutContext::new();
        let frame = context.layout(&windowed, &settings());

        assert_eq!(frame.len(), 4);
        assert!(frame.placed.iter().all(|p| p.round >= 4));
        assert_eq!(frame.lowest_round, 4);

        let stale = VertexId::from_u64(20);
        let round_five = frame.get(&VertexId::from_u64(50)).unwrap();
        assert!(round_five.links.iter().any(|l| l.target == stale && !l.resolved));
        // Parent + one in-window ack.
        assert_eq!(round_five.edges.len(), 2);

        // Round 4 references round 3, which is evicted.
        let round_four = frame.get(&VertexId::from_u64(40)).unwrap();
        assert!(round_four.edges.is_empty());
        assert_eq!(round_four.links.len(), 2);
    }

    #[test]
    fn test_every_edge_endpoint_was_placed() {
        let mut a2 = vertex(3, 0xA, 2, 2);
        a2.parent = Some(VertexId::from_u64(1));
        a2.acks = vec![VertexId::from_u64(2), VertexId::from_u64(99)];
        let vertices = vec![vertex(1, 0xA, 1, 1), vertex(2, 0xB, 1, 1), a2];
        let refs: Vec<&Vertex> = vertices.iter().collect();

        let mut context = LayoutContext::new();
        let frame = context.layout(&refs, &settings());
        let positions: Vec<Position> = frame.placed.iter().map(|p| p.position).collect();

        for placed in &frame.placed {
            for edge in &placed.edges {
                assert!(positions.contains(&edge.from));
                assert!(positions.contains(&edge.to));
            }
        }
        let last = &frame.placed[2];
        assert_eq!(last.edges.len(), 2);
        assert_eq!(last.edges[0].kind, EdgeKind::Parent);
        assert_eq!(last.acks_count, 2);
    }

    #[test]
    fn test_empty_pass() {
        let mut context = LayoutContext::new();
        let frame = context.layout(&[], &settings());
        assert!(frame.is_empty());
        assert_eq!(frame.vertical_extent, 0.0);
    }
}

//! Synthetic traffic generator.
//!
//! Models a set of peers that each emit at most one message per round. On
//! every tick, each peer independently abstains with probability
//! `skip_probability`; a participating peer links to its own message from
//! the previous round (the parent) and acknowledges every other active
//! peer's previous-round message.
//!
//! Every message of round N is in the history before any decision for round
//! N + 1 is made, which keeps the generated DAG causally consistent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dag::{ColorTag, PeerId, Status, Vertex, VertexId, VertexStore, VERTEX_ID_LEN};

/// Length of generated peer identifiers in bytes.
pub const PEER_ID_LEN: usize = 8;

/// First round the generator emits. Round 0 never exists.
pub const FIRST_ROUND: u64 = 1;

/// Per-peer generator state.
#[derive(Debug, Clone)]
struct PeerState {
    id: PeerId,
    /// Height of the last emitted vertex (0 before the first).
    height: u64,
}

/// Round-based synthetic traffic source.
pub struct TrafficGenerator {
    rng: StdRng,
    peers: Vec<PeerState>,
    current_round: u64,
    skip_probability: f64,
}

impl TrafficGenerator {
    /// Create a generator with no peers.
    pub fn new(seed: u64, skip_probability: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            peers: Vec::new(),
            current_round: FIRST_ROUND,
            skip_probability,
        }
    }

    /// Create a generator with `peer_count` random peers.
    pub fn with_peers(seed: u64, skip_probability: f64, peer_count: usize) -> Self {
        let mut generator = Self::new(seed, skip_probability);
        for _ in 0..peer_count {
            generator.add_random_peer();
        }
        generator
    }

    // =========================================================================
    // Peers
    // =========================================================================

    /// Add a peer. Returns false if it was already known.
    pub fn add_peer(&mut self, id: PeerId) -> bool {
        if self.peers.iter().any(|p| p.id == id) {
            return false;
        }
        log::info!("peer joined: {}", id);
        self.peers.push(PeerState { id, height: 0 });
        true
    }

    /// Add a peer with a random identity and return it.
    pub fn add_random_peer(&mut self) -> PeerId {
        loop {
            let mut bytes = [0u8; PEER_ID_LEN];
            self.rng.fill(&mut bytes[..]);
            let id = PeerId::new(bytes.to_vec());
            if self.add_peer(id.clone()) {
                return id;
            }
        }
    }

    /// Stop a peer from emitting. Vertices it already emitted are kept.
    pub fn remove_peer(&mut self, id: &PeerId) -> bool {
        let before = self.peers.len();
        self.peers.retain(|p| p.id != *id);
        let removed = self.peers.len() != before;
        if removed {
            log::info!("peer left: {}", id);
        }
        removed
    }

    /// Known peers in join order.
    pub fn peers(&self) -> impl Iterator<Item = &PeerId> {
        self.peers.iter().map(|p| &p.id)
    }

    /// Number of known peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// The round the next tick will emit.
    pub fn current_round(&self) -> u64 {
        self.current_round
    }

    /// Abstention probability used from the next tick on.
    pub fn set_skip_probability(&mut self, skip_probability: f64) {
        self.skip_probability = skip_probability;
    }

    /// Abstention probability.
    pub fn skip_probability(&self) -> f64 {
        self.skip_probability
    }

    /// Restart at the first round. Peers stay, their heights reset.
    pub fn reset(&mut self) {
        self.current_round = FIRST_ROUND;
        for peer in &mut self.peers {
            peer.height = 0;
        }
    }

    /// Emit the current round into `history` and advance the clock.
    ///
    /// Returns the vertices emitted this round, in peer join order.
    pub fn tick(&mut self, history: &mut VertexStore) -> Vec<Vertex> {
        let round = self.current_round;
        // Removed peers are no longer linked to.
        let previous: Vec<(PeerId, VertexId)> = history
            .round(round.saturating_sub(1))
            .filter(|v| self.peers.iter().any(|p| p.id == v.peer))
            .map(|v| (v.peer.clone(), v.id))
            .collect();

        let mut emitted = Vec::with_capacity(self.peers.len());
        for index in 0..self.peers.len() {
            if self.abstains() {
                log::trace!("{} abstains in round {}", self.peers[index].id, round);
                continue;
            }

            let id = self.fresh_id();
            let peer = &mut self.peers[index];

            let parent = previous
                .iter()
                .find(|(owner, _)| *owner == peer.id)
                .map(|&(_, id)| id);
            let acks: Vec<VertexId> = previous
                .iter()
                .filter(|(owner, _)| *owner != peer.id)
                .map(|&(_, id)| id)
                .collect();

            peer.height += 1;
            emitted.push(Vertex {
                id,
                peer: peer.id.clone(),
                parent,
                data: ColorTag::classify(parent.is_some(), acks.len()),
                acks,
                height: peer.height,
                round,
                status: Status::Confirmed,
            });
        }

        history.extend(emitted.iter().cloned());
        self.current_round += 1;

        log::debug!(
            "round {}: {} of {} peers emitted",
            round,
            emitted.len(),
            self.peers.len()
        );
        emitted
    }

    /// Out-of-range probabilities clamp instead of panicking; NaN never skips.
    fn abstains(&mut self) -> bool {
        self.rng.random::<f64>() < self.skip_probability
    }

    fn fresh_id(&mut self) -> VertexId {
        let mut bytes = [0u8; VERTEX_ID_LEN];
        self.rng.fill(&mut bytes[..]);
        VertexId::new(bytes)
    }

    /// Draw a uniform delay in `[0, max_ms)`, or 0 for an empty range.
    pub(crate) fn jitter(&mut self, max_ms: f64) -> f64 {
        if max_ms > 0.0 && max_ms.is_finite() {
            self.rng.random::<f64>() * max_ms
        } else {
            0.0
        }
    }
}

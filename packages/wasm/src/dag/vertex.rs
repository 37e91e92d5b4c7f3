//! Vertex type and related identifiers.
//!
//! A vertex is one message in the packet DAG. Each vertex has:
//! - A fixed-size opaque identifier
//! - The identifier of the peer that emitted it
//! - An optional causal parent (the same peer's previous message)
//! - Acknowledgments of other peers' messages
//! - A per-peer causal height and the round it was generated in
//!
//! Vertices are immutable once created.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a vertex identifier in bytes.
pub const VERTEX_ID_LEN: usize = 16;

/// Opaque vertex identifier.
///
/// Uniqueness is a producer contract: the layout engine never deduplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub [u8; VERTEX_ID_LEN]);

impl VertexId {
    /// Create a new VertexId from raw bytes.
    #[inline]
    pub fn new(bytes: [u8; VERTEX_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an identifier from a small integer. Handy for fixtures.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; VERTEX_ID_LEN];
        bytes[VERTEX_ID_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Get the raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; VERTEX_ID_LEN] {
        &self.0
    }

    /// Lowercase hex form of the identifier.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vertex({})", &self.to_hex()[..8])
    }
}

impl From<[u8; VERTEX_ID_LEN]> for VertexId {
    #[inline]
    fn from(bytes: [u8; VERTEX_ID_LEN]) -> Self {
        Self(bytes)
    }
}

/// Opaque peer identifier.
///
/// Peers are compared by byte value, which is their canonical form.
/// `label()` renders the canonical string used in layout output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub Vec<u8>);

impl PeerId {
    /// Number of hex characters shown in short labels.
    const SHORT_LABEL_LEN: usize = 8;

    /// Create a PeerId from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Canonical lowercase hex form of the peer identity.
    pub fn label(&self) -> String {
        hex::encode(&self.0)
    }

    /// Truncated label for compact display.
    pub fn short_label(&self) -> String {
        let mut label = self.label();
        label.truncate(Self::SHORT_LABEL_LEN);
        label
    }

    /// Parse a peer from its canonical hex label.
    pub fn from_label(label: &str) -> Option<Self> {
        hex::decode(label).ok().map(Self)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Peer({})", self.short_label())
    }
}

/// Cosmetic confirmation status. No confirmation algorithm exists; the
/// value is whatever the producer tagged at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

/// Display payload carried by a vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorTag {
    /// No parent and nothing acknowledged.
    IsolatedRoot,
    /// No parent, but acknowledges other peers.
    AcknowledgedRoot,
    /// Continues the peer's own chain.
    ContinuingChain,
    /// Arbitrary color supplied with static input, as a bare string.
    #[serde(untagged)]
    Custom(String),
}

impl ColorTag {
    /// Pick the tag for a freshly generated vertex.
    pub fn classify(has_parent: bool, ack_count: usize) -> Self {
        match (has_parent, ack_count) {
            (false, 0) => ColorTag::IsolatedRoot,
            (false, _) => ColorTag::AcknowledgedRoot,
            (true, _) => ColorTag::ContinuingChain,
        }
    }

    /// Human-readable meaning of the tag.
    pub fn label(&self) -> &str {
        match self {
            ColorTag::IsolatedRoot => "new chain, unacknowledged",
            ColorTag::AcknowledgedRoot => "new chain, acknowledged",
            ColorTag::ContinuingChain => "continuing chain",
            ColorTag::Custom(_) => "custom",
        }
    }

    /// CSS color name handed to the renderer.
    pub fn color(&self) -> &str {
        match self {
            ColorTag::IsolatedRoot => "red",
            ColorTag::AcknowledgedRoot => "orange",
            ColorTag::ContinuingChain => "green",
            ColorTag::Custom(color) => color,
        }
    }
}

/// One message in the DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub id: VertexId,
    pub peer: PeerId,
    #[serde(default)]
    pub parent: Option<VertexId>,
    #[serde(default)]
    pub acks: Vec<VertexId>,
    pub height: u64,
    pub round: u64,
    #[serde(default)]
    pub status: Status,
    pub data: ColorTag,
}

//! DAG data model.
//!
//! Immutable vertices, an append-only round-indexed store, and the window
//! stage that selects and orders the vertices a layout pass sees.

mod store;
mod vertex;
pub mod window;

pub use store::VertexStore;
pub use vertex::{ColorTag, PeerId, Status, Vertex, VertexId, VERTEX_ID_LEN};

//! Scene graph of the last layout frame.
//!
//! Uses petgraph's StableGraph for the drawable topology, with Structure of
//! Arrays (SoA) position buffers for direct GPU upload.

mod scene;

pub use scene::Scene;

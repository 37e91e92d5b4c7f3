//! Incremental DAG layout.
//!
//! This module maps windowed, round-sorted vertices to 2D positions and
//! drawable edges. Lanes persist across passes in a [`LayoutContext`];
//! everything else is recomputed from scratch on each pass.

pub mod edges;
pub mod lanes;
pub mod levels;
pub mod pass;
pub mod positioner;

pub use edges::{Edge, EdgeKind, Link};
pub use lanes::PeerLanes;
pub use levels::RoundLevels;
pub use pass::{LayoutContext, LayoutFrame, LayoutSettings, PlacedVertex};
pub use positioner::{ForkPositioner, Position};

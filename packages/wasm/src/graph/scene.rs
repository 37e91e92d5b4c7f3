//! Scene - the last layout frame as a graph.
//!
//! The Scene stores the drawable topology of one frame using petgraph's
//! StableGraph and keeps SoA (Structure of Arrays) position buffers so the
//! renderer can upload them without walking per-vertex records. Hit testing
//! goes through an rstar R-tree of the placed positions.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Directed;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

use crate::dag::VertexId;
use crate::layout::{EdgeKind, LayoutFrame};

/// A placed position tagged with its vertex.
type PlacedPoint = GeomWithData<[f32; 2], VertexId>;

/// Drawable topology and positions of one frame.
///
/// This struct manages:
/// - Graph topology via petgraph (one node per placed vertex, one edge per
///   resolved reference)
/// - Position buffers in SoA layout, indexed by node index
/// - R-tree over the finite positions for hit testing
pub struct Scene {
    /// Nodes store their vertex id, edges store their kind.
    graph: StableGraph<VertexId, EdgeKind, Directed>,

    /// Map from vertex id to petgraph NodeIndex. Duplicate ids keep the last.
    index_of: HashMap<VertexId, NodeIndex>,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Hit-testing index. Vertices with a non-finite coordinate are left out.
    hits: RTree<PlacedPoint>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            index_of: HashMap::new(),
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            hits: RTree::new(),
        }
    }

    /// Build a scene from a layout frame.
    pub fn from_frame(frame: &LayoutFrame) -> Self {
        let count = frame.len();
        let mut graph = StableGraph::with_capacity(count, frame.edge_count());
        let mut index_of = HashMap::with_capacity(count);
        let mut pos_x = Vec::with_capacity(count);
        let mut pos_y = Vec::with_capacity(count);

        for placed in &frame.placed {
            let index = graph.add_node(placed.id);
            index_of.insert(placed.id, index);
            pos_x.push(placed.position.x);
            pos_y.push(placed.position.y);

            for link in placed.links.iter().filter(|l| l.resolved) {
                let Some(&target) = index_of.get(&link.target) else {
                    continue;
                };
                match link.kind {
                    EdgeKind::Parent => graph.add_edge(target, index, EdgeKind::Parent),
                    EdgeKind::Ack => graph.add_edge(index, target, EdgeKind::Ack),
                };
            }
        }

        let points: Vec<PlacedPoint> = graph
            .node_indices()
            .map(|i| (graph[i], pos_x[i.index()], pos_y[i.index()]))
            .filter(|&(_, x, y)| x.is_finite() && y.is_finite())
            .map(|(id, x, y)| PlacedPoint::new([x, y], id))
            .collect();

        Self {
            graph,
            index_of,
            pos_x,
            pos_y,
            hits: RTree::bulk_load(points),
        }
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Get the number of vertices.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get a vertex's position.
    pub fn position_of(&self, id: &VertexId) -> Option<(f32, f32)> {
        self.index_of.get(id).map(|&index| {
            let i = index.index();
            (self.pos_x[i], self.pos_y[i])
        })
    }

    /// Vertices connected to `id` by an edge in either direction.
    pub fn neighbors(&self, id: &VertexId) -> Vec<VertexId> {
        self.index_of
            .get(id)
            .map(|&index| {
                self.graph
                    .neighbors_undirected(index)
                    .filter_map(|n| self.graph.node_weight(n).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Interleaved positions `[x0, y0, x1, y1, ...]` in placement order.
    pub fn positions(&self) -> Vec<f32> {
        self.pos_x
            .iter()
            .zip(&self.pos_y)
            .flat_map(|(&x, &y)| [x, y])
            .collect()
    }

    /// Line segments `[x_from, y_from, x_to, y_to, ...]`, one per edge.
    pub fn edge_segments(&self) -> Vec<f32> {
        let mut segments = Vec::with_capacity(self.graph.edge_count() * 4);
        for edge in self.graph.edge_references() {
            let from = edge.source().index();
            let to = edge.target().index();
            segments.extend_from_slice(&[
                self.pos_x[from],
                self.pos_y[from],
                self.pos_x[to],
                self.pos_y[to],
            ]);
        }
        segments
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest vertex within a maximum distance.
    pub fn vertex_at(&self, x: f32, y: f32, max_distance: f32) -> Option<VertexId> {
        let nearest = self.hits.nearest_neighbor(&[x, y])?;
        let [px, py] = *nearest.geom();
        let distance_sq = (px - x) * (px - x) + (py - y) * (py - y);
        (distance_sq <= max_distance * max_distance).then_some(nearest.data)
    }

    /// Find all vertices in a rectangle.
    pub fn vertices_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<VertexId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.hits
            .locate_in_envelope(&envelope)
            .map(|point| point.data)
            .collect()
    }

    /// Find all vertices within `radius` of a point.
    pub fn vertices_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<VertexId> {
        self.hits
            .locate_within_distance([x, y], radius * radius)
            .map(|point| point.data)
            .collect()
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all vertices as (min_x, min_y, max_x, max_y).
    pub fn get_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        if self.pos_x.is_empty() {
            return None;
        }

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for (&x, &y) in self.pos_x.iter().zip(&self.pos_y) {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        if min_x == f32::INFINITY {
            return None;
        }

        Some((min_x, min_y, max_x, max_y))
    }

    /// Clear the scene.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

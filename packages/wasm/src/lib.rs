//! Packet DAG - WASM Module
//!
//! This module generates synthetic peer-to-peer DAG traffic and lays it out
//! incrementally for a top-down animated view. It is compiled to WebAssembly
//! and exposes a JavaScript-friendly API via wasm-bindgen; the renderer,
//! camera and controls live on the JavaScript side.
//!
//! # Architecture
//!
//! - `dag`: Vertex model, append-only round-indexed store, round windowing
//! - `sim`: Round clock, synthetic traffic generator, staggered arrivals
//! - `layout`: Peer lanes, round levels, fork-aware positions, edge resolution
//! - `graph`: Scene graph of the last frame (petgraph StableGraph, rstar hit testing)
//! - `view`: Single owner of all of the above, driven by the host timer loop

use js_sys::{Float32Array, Function};
use wasm_bindgen::prelude::*;

pub mod config;
pub mod dag;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod sim;
pub mod view;

use config::{ConfigPatch, ViewConfig};
use dag::{PeerId, Vertex};
use view::DagView;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Set the console log level ("off", "error", "warn", "info", "debug", "trace").
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsError> {
    let filter = logging::parse_level(level)
        .ok_or_else(|| JsError::new(&format!("unknown log level: {level}")))?;
    logging::init(filter);
    Ok(())
}

/// Main entry point for the DAG view.
///
/// This struct wraps the internal DagView and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct PacketDagWasm {
    view: DagView,
}

#[wasm_bindgen]
impl PacketDagWasm {
    /// Create a new view.
    ///
    /// `config` is an optional plain object with any of `laneSpacing`,
    /// `levelSpacing`, `forkOffset`, `windowRounds`, `tickIntervalMs`,
    /// `skipProbability`, `arrivalJitterMs`, `seed`, `initialPeers`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PacketDagWasm, JsError> {
        let config: ViewConfig = if config.is_undefined() || config.is_null() {
            ViewConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            view: DagView::new(config),
        })
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Update a subset of the configuration. Takes effect on the next
    /// tick or layout pass.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, patch: JsValue) -> Result<(), JsError> {
        let patch: ConfigPatch = serde_wasm_bindgen::from_value(patch)?;
        self.view.apply(&patch);
        Ok(())
    }

    /// Get the full current configuration.
    pub fn config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.view.config())?)
    }

    /// Register a function called with the vertical extent after every
    /// layout pass. Pass `undefined` to remove it.
    #[wasm_bindgen(js_name = setExtentCallback)]
    pub fn set_extent_callback(&mut self, callback: Option<Function>) {
        match callback {
            Some(callback) => self.view.set_extent_listener(move |extent| {
                if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(extent as f64)) {
                    log::warn!("extent callback threw: {:?}", err);
                }
            }),
            None => self.view.clear_extent_listener(),
        }
    }

    // =========================================================================
    // Traffic
    // =========================================================================

    /// Advance the round clock to host time `now_ms` (e.g. performance.now()).
    ///
    /// Returns the number of vertices that became visible.
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        self.view.tick(now_ms) as u32
    }

    /// Make every staged vertex visible immediately.
    pub fn flush(&mut self) -> u32 {
        self.view.flush() as u32
    }

    /// Drop all traffic and restart at the first round.
    pub fn reset(&mut self) {
        self.view.reset();
    }

    /// Add a random peer. Returns its hex label.
    #[wasm_bindgen(js_name = addPeer)]
    pub fn add_peer(&mut self) -> String {
        self.view.add_peer().label()
    }

    /// Stop a peer (by hex label) from emitting.
    ///
    /// Returns true if the peer existed.
    #[wasm_bindgen(js_name = removePeer)]
    pub fn remove_peer(&mut self, label: &str) -> bool {
        PeerId::from_label(label).is_some_and(|peer| self.view.remove_peer(&peer))
    }

    /// Retire a peer's lane (by hex label). The slot is never reused.
    #[wasm_bindgen(js_name = retireLane)]
    pub fn retire_lane(&mut self, label: &str) -> Option<u32> {
        PeerId::from_label(label).and_then(|peer| self.view.retire_lane(&peer))
    }

    /// Hex labels of the emitting peers.
    pub fn peers(&self) -> Vec<String> {
        self.view.peers().map(PeerId::label).collect()
    }

    /// Number of emitting peers.
    #[wasm_bindgen(js_name = peerCount)]
    pub fn peer_count(&self) -> u32 {
        self.view.peer_count() as u32
    }

    /// The round the next tick emits.
    #[wasm_bindgen(js_name = currentRound)]
    pub fn current_round(&self) -> f64 {
        self.view.current_round() as f64
    }

    /// Number of vertices visible to layout.
    #[wasm_bindgen(js_name = vertexCount)]
    pub fn vertex_count(&self) -> u32 {
        self.view.visible_count() as u32
    }

    /// Number of generated vertices not yet visible.
    #[wasm_bindgen(js_name = pendingCount)]
    pub fn pending_count(&self) -> u32 {
        self.view.pending_count() as u32
    }

    /// Replace all traffic with a static array of vertices.
    ///
    /// Each vertex is `{ id, peer, parent?, acks?, height, round, status?, data }`
    /// with byte arrays for ids and peers.
    #[wasm_bindgen(js_name = loadVertices)]
    pub fn load_vertices(&mut self, vertices: JsValue) -> Result<u32, JsError> {
        let vertices: Vec<Vertex> = serde_wasm_bindgen::from_value(vertices)?;
        let count = vertices.len() as u32;
        self.view.load_vertices(vertices);
        Ok(count)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Run a layout pass and return the frame as a plain object.
    ///
    /// Fires the extent callback once.
    pub fn layout(&mut self) -> Result<JsValue, JsError> {
        let frame = self.view.layout();
        Ok(serde_wasm_bindgen::to_value(frame)?)
    }

    /// Interleaved positions of the last frame [x0, y0, x1, y1, ...].
    pub fn positions(&self) -> Float32Array {
        Float32Array::from(&self.view.scene().positions()[..])
    }

    /// Edge segments of the last frame [x_from, y_from, x_to, y_to, ...].
    #[wasm_bindgen(js_name = edgeSegments)]
    pub fn edge_segments(&self) -> Float32Array {
        Float32Array::from(&self.view.scene().edge_segments()[..])
    }

    /// Hex id of the nearest vertex within `radius`, if any.
    #[wasm_bindgen(js_name = vertexAt)]
    pub fn vertex_at(&self, x: f32, y: f32, radius: f32) -> Option<String> {
        self.view.scene().vertex_at(x, y, radius).map(|id| id.to_hex())
    }

    /// Hex ids of all vertices within a rectangle.
    #[wasm_bindgen(js_name = verticesInRect)]
    pub fn vertices_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.view
            .scene()
            .vertices_in_rect(min_x, min_y, max_x, max_y)
            .iter()
            .map(|id| id.to_hex())
            .collect()
    }

    /// Hex ids of all vertices within `radius` of a point.
    #[wasm_bindgen(js_name = verticesInRadius)]
    pub fn vertices_in_radius(&self, x: f32, y: f32, radius: f32) -> Vec<String> {
        self.view
            .scene()
            .vertices_in_radius(x, y, radius)
            .iter()
            .map(|id| id.to_hex())
            .collect()
    }

    /// Bounding box of the last frame as [min_x, min_y, max_x, max_y].
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.view
            .scene()
            .get_bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::dag::{window, VertexId};
    use crate::layout::{EdgeKind, LayoutContext, LayoutSettings, Position};
    use crate::sim::Simulation;
    use std::collections::{HashMap, HashSet};

    fn live_config(seed: u64) -> ViewConfig {
        ViewConfig {
            seed,
            initial_peers: 6,
            skip_probability: 0.3,
            arrival_jitter_ms: 250.0,
            tick_interval_ms: 100.0,
            window_rounds: 8,
            ..ViewConfig::default()
        }
    }

    /// Full pipeline: generator → arrivals → window → layout → scene, with
    /// a pass after every tick like the browser loop does.
    #[test]
    fn test_live_pipeline_edges_only_touch_placed_vertices() {
        let mut view = DagView::new(live_config(17));

        for step in 0..40 {
            view.tick(step as f64 * 100.0);
            let frame = view.layout().clone();

            let placed: HashSet<VertexId> = frame.placed.iter().map(|p| p.id).collect();
            let positions: Vec<Position> = frame.placed.iter().map(|p| p.position).collect();

            for p in &frame.placed {
                for link in p.links.iter().filter(|l| l.resolved) {
                    assert!(placed.contains(&link.target));
                }
                for edge in &p.edges {
                    assert!(positions.contains(&edge.from));
                    assert!(positions.contains(&edge.to));
                }
                assert!(p.round >= frame.lowest_round);
                assert_eq!(p.level, p.round - frame.lowest_round);
            }
            assert_eq!(view.scene().node_count(), frame.len());
            assert_eq!(view.scene().edge_count(), frame.edge_count());
        }
    }

    #[test]
    fn test_lanes_unique_and_stable_over_run() {
        let mut view = DagView::new(live_config(3));
        let mut first_seen: HashMap<String, u32> = HashMap::new();

        for step in 0..30 {
            if step == 10 {
                view.add_peer();
            }
            if step == 20 {
                let leaving = view.peers().next().cloned().unwrap();
                view.remove_peer(&leaving);
            }
            view.tick(step as f64 * 100.0);
            for p in &view.layout().placed {
                let lane = *first_seen.entry(p.peer_label.clone()).or_insert(p.lane);
                assert_eq!(lane, p.lane, "peer {} changed lane", p.peer_label);
            }
        }

        let lanes: HashSet<u32> = first_seen.values().copied().collect();
        assert_eq!(lanes.len(), first_seen.len(), "two peers share a lane");
    }

    #[test]
    fn test_generated_dag_is_causally_consistent() {
        let mut sim = Simulation::new(99, 0.3, 5);
        for _ in 0..50 {
            sim.tick(0.0, 0.0);
        }
        let history = sim.history();
        let by_id: HashMap<VertexId, &Vertex> = history.iter().map(|v| (v.id, v)).collect();

        let mut last_height: HashMap<&PeerId, u64> = HashMap::new();
        for v in history.iter() {
            if let Some(parent) = v.parent {
                let parent = by_id[&parent];
                assert_eq!(parent.peer, v.peer);
                assert_eq!(parent.round + 1, v.round);
                assert!(parent.height < v.height);
            }
            for ack in &v.acks {
                let acked = by_id[ack];
                assert_ne!(acked.peer, v.peer);
                assert_eq!(acked.round + 1, v.round);
            }
            let previous = last_height.insert(&v.peer, v.height).unwrap_or(0);
            assert!(v.height > previous);
        }
    }

    /// Round-clock scenario: two peers, first round.
    #[test]
    fn test_round_one_two_peers() {
        let mut sim = Simulation::from_generator(sim::TrafficGenerator::new(5, 0.0));
        sim.add_peer(PeerId::new(vec![0xA]));
        sim.add_peer(PeerId::new(vec![0xB]));
        sim.tick(0.0, 0.0);
        sim.flush();

        let windowed = sim.visible().windowed(0);
        let frame = LayoutContext::new().layout(&windowed, &LayoutSettings::default());
        assert_eq!(frame.len(), 2);
        for p in &frame.placed {
            assert!(p.edges.is_empty());
            assert!(p.links.is_empty());
            assert_eq!(p.color_tag.label, "new chain, unacknowledged");
            assert_eq!(p.color_tag.color, "red");
        }
    }

    /// Eviction scenario over generated traffic: window of 2 rounds.
    #[test]
    fn test_generated_eviction_drops_stale_references() {
        let mut sim = Simulation::from_generator(sim::TrafficGenerator::new(8, 0.0));
        sim.add_peer(PeerId::new(vec![1]));
        sim.add_peer(PeerId::new(vec![2]));
        for _ in 0..5 {
            sim.tick(0.0, 0.0);
        }
        sim.flush();

        let windowed = window::select(sim.visible().iter(), 2);
        let frame = LayoutContext::new().layout(&windowed, &LayoutSettings::default());
        assert_eq!(frame.len(), 4);
        assert!(frame.placed.iter().all(|p| p.round >= 4));

        for p in frame.placed.iter().filter(|p| p.round == 4) {
            assert!(p.edges.is_empty());
            assert!(p.links.iter().all(|l| !l.resolved));
        }
        for p in frame.placed.iter().filter(|p| p.round == 5) {
            assert_eq!(p.edges.len(), 2);
            assert_eq!(p.edges.iter().filter(|e| e.kind == EdgeKind::Parent).count(), 1);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let run = || {
            let mut view = DagView::new(live_config(1234));
            for step in 0..20 {
                view.tick(step as f64 * 100.0);
            }
            view.flush();
            view.layout().clone()
        };
        assert_eq!(run(), run());
    }
}

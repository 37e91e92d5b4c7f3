//! DagView - single owner of all mutable view state.
//!
//! Holds the configuration, the layout context (peer lanes), the simulation
//! and the scene of the last frame. The host drives it from one timer loop:
//! `tick(now)` to advance the round clock, `layout()` to run a pass.

use crate::config::{ConfigPatch, ViewConfig};
use crate::dag::{PeerId, Vertex};
use crate::graph::Scene;
use crate::layout::{LayoutContext, LayoutFrame};
use crate::sim::Simulation;

/// Callback receiving the vertical extent once per layout pass.
pub type ExtentListener = Box<dyn FnMut(f32)>;

/// The view engine.
pub struct DagView {
    config: ViewConfig,
    context: LayoutContext,
    simulation: Simulation,
    frame: LayoutFrame,
    scene: Scene,
    extent_listener: Option<ExtentListener>,
}

impl DagView {
    /// Create a view with `config.initial_peers` random peers.
    pub fn new(config: ViewConfig) -> Self {
        let simulation = Simulation::new(config.seed, config.skip_probability, config.initial_peers);
        Self {
            config,
            context: LayoutContext::new(),
            simulation,
            frame: LayoutFrame::default(),
            scene: Scene::new(),
            extent_listener: None,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Current configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Update a subset of the configuration. Applies from the next tick/pass.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        self.config.apply(patch);
        self.simulation
            .generator_mut()
            .set_skip_probability(self.config.skip_probability);
    }

    /// Register the extent callback, replacing any previous one.
    pub fn set_extent_listener(&mut self, listener: impl FnMut(f32) + 'static) {
        self.extent_listener = Some(Box::new(listener));
    }

    /// Remove the extent callback.
    pub fn clear_extent_listener(&mut self) {
        self.extent_listener = None;
    }

    // =========================================================================
    // Traffic
    // =========================================================================

    /// Advance the round clock to host time `now` (milliseconds).
    ///
    /// Returns the number of vertices that became visible.
    pub fn tick(&mut self, now: f64) -> usize {
        let timing = self.config.timing();
        self.simulation.advance(now, &timing)
    }

    /// Make every staged vertex visible now.
    pub fn flush(&mut self) -> usize {
        self.simulation.flush()
    }

    /// Drop all traffic and restart at the first round. Peers and their
    /// lanes are kept.
    pub fn reset(&mut self) {
        self.simulation.reset();
        self.frame = LayoutFrame::default();
        self.scene.clear();
    }

    /// Add a random peer.
    pub fn add_peer(&mut self) -> PeerId {
        self.simulation.generator_mut().add_random_peer()
    }

    /// Add a specific peer. Returns false if it was already known.
    pub fn add_peer_id(&mut self, id: PeerId) -> bool {
        self.simulation.add_peer(id)
    }

    /// Stop a peer from emitting. Its lane stays reserved so its remaining
    /// vertices do not move.
    pub fn remove_peer(&mut self, id: &PeerId) -> bool {
        self.simulation.remove_peer(id)
    }

    /// Retire a peer's lane. The slot is never handed out again.
    pub fn retire_lane(&mut self, id: &PeerId) -> Option<u32> {
        self.context.lanes_mut().forget(id)
    }

    /// Replace all traffic with a static sequence of vertices.
    pub fn load_vertices(&mut self, vertices: Vec<Vertex>) {
        log::info!("loading {} static vertices", vertices.len());
        self.simulation.load_static(vertices);
    }

    /// Peers that currently emit.
    pub fn peers(&self) -> impl Iterator<Item = &PeerId> {
        self.simulation.generator().peers()
    }

    /// Number of peers that currently emit.
    pub fn peer_count(&self) -> usize {
        self.simulation.generator().peer_count()
    }

    /// The round the next tick emits.
    pub fn current_round(&self) -> u64 {
        self.simulation.generator().current_round()
    }

    /// Number of vertices visible to layout.
    pub fn visible_count(&self) -> usize {
        self.simulation.visible().len()
    }

    /// Number of generated vertices waiting to become visible.
    pub fn pending_count(&self) -> usize {
        self.simulation.pending()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Run one layout pass over the visible window and notify the extent
    /// listener.
    pub fn layout(&mut self) -> &LayoutFrame {
        let settings = self.config.layout_settings();
        let windowed = self.simulation.visible().windowed(self.config.window_rounds);

        self.frame = self.context.layout(&windowed, &settings);
        self.scene = Scene::from_frame(&self.frame);

        if let Some(listener) = self.extent_listener.as_mut() {
            listener(self.frame.vertical_extent);
        }
        &self.frame
    }

    /// The frame produced by the last pass.
    pub fn frame(&self) -> &LayoutFrame {
        &self.frame
    }

    /// Scene graph of the last pass.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Layout context, for inspecting lanes.
    pub fn context(&self) -> &LayoutContext {
        &self.context
    }
}

impl Default for DagView {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

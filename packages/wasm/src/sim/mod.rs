//! Synthetic traffic simulation.
//!
//! The simulation owns two stores:
//! - the causal **history**, which the generator reads to link each round to
//!   the previous one and which always holds complete rounds;
//! - the **visible** store, which the layout reads and which fills in as
//!   staggered arrivals are released.
//!
//! Time is supplied by the host (milliseconds, e.g. `performance.now()`), so
//! nothing here depends on a real clock.

mod arrival;
mod generator;

pub use arrival::ArrivalQueue;
pub use generator::{TrafficGenerator, FIRST_ROUND, PEER_ID_LEN};

use crate::dag::{PeerId, Vertex, VertexStore};

/// Most rounds a single [`Simulation::advance`] call runs to catch up.
pub const MAX_CATCH_UP_TICKS: u32 = 64;

/// Timing parameters for [`Simulation::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Milliseconds between rounds.
    pub tick_interval_ms: f64,
    /// Upper bound of the per-vertex arrival delay.
    pub arrival_jitter_ms: f64,
}

/// Round clock, generator and arrival staging.
pub struct Simulation {
    generator: TrafficGenerator,
    history: VertexStore,
    arrivals: ArrivalQueue,
    visible: VertexStore,
    /// Host time at which the next round is due. `None` until the first advance.
    next_tick_at: Option<f64>,
}

impl Simulation {
    /// Create a simulation with `peer_count` random peers.
    pub fn new(seed: u64, skip_probability: f64, peer_count: usize) -> Self {
        Self::from_generator(TrafficGenerator::with_peers(seed, skip_probability, peer_count))
    }

    /// Wrap an existing generator.
    pub fn from_generator(generator: TrafficGenerator) -> Self {
        Self {
            generator,
            history: VertexStore::new(),
            arrivals: ArrivalQueue::new(),
            visible: VertexStore::new(),
            next_tick_at: None,
        }
    }

    /// The generator, for peer management.
    pub fn generator(&self) -> &TrafficGenerator {
        &self.generator
    }

    /// Mutable access to the generator.
    pub fn generator_mut(&mut self) -> &mut TrafficGenerator {
        &mut self.generator
    }

    /// Complete causal history.
    pub fn history(&self) -> &VertexStore {
        &self.history
    }

    /// Vertices released for display.
    pub fn visible(&self) -> &VertexStore {
        &self.visible
    }

    /// Number of vertices generated but not yet visible.
    pub fn pending(&self) -> usize {
        self.arrivals.len()
    }

    /// Add a peer; it emits from the next round on.
    pub fn add_peer(&mut self, id: PeerId) -> bool {
        self.generator.add_peer(id)
    }

    /// Stop a peer from emitting.
    pub fn remove_peer(&mut self, id: &PeerId) -> bool {
        self.generator.remove_peer(id)
    }

    /// Run one round immediately and stage its vertices for arrival.
    pub fn tick(&mut self, now: f64, arrival_jitter_ms: f64) -> usize {
        let emitted = self.generator.tick(&mut self.history);
        let count = emitted.len();
        for vertex in emitted {
            let delay = self.generator.jitter(arrival_jitter_ms);
            self.arrivals.schedule(vertex, now + delay);
        }
        count
    }

    /// Run every round due by `now`, then release due arrivals.
    ///
    /// The first call starts the clock and runs one round. Intervals that
    /// are not positive and finite, or too small to move the clock, run
    /// exactly one round per call. At most [`MAX_CATCH_UP_TICKS`] rounds run
    /// per call; after a longer gap the clock resyncs to `now`. Returns the
    /// number of vertices that became visible.
    pub fn advance(&mut self, now: f64, timing: &Timing) -> usize {
        let interval = timing.tick_interval_ms;
        let steady = interval > 0.0 && interval.is_finite();

        match self.next_tick_at {
            None => {
                self.tick(now, timing.arrival_jitter_ms);
                self.next_tick_at = Some(now + interval);
            }
            Some(_) if !steady => {
                self.tick(now, timing.arrival_jitter_ms);
                self.next_tick_at = Some(now);
            }
            Some(mut due) => {
                let mut ran = 0;
                while due <= now && ran < MAX_CATCH_UP_TICKS {
                    self.tick(due, timing.arrival_jitter_ms);
                    ran += 1;

                    let next = due + interval;
                    if next <= due {
                        break;
                    }
                    due = next;
                }
                if due <= now {
                    log::warn!(
                        "round clock fell behind by {} ms after {} rounds, resyncing",
                        now - due,
                        ran
                    );
                    due = now + interval;
                }
                self.next_tick_at = Some(due);
            }
        }

        self.release(now)
    }

    /// Release arrivals due by `now` into the visible store.
    pub fn release(&mut self, now: f64) -> usize {
        let due = self.arrivals.release(now);
        let count = due.len();
        self.visible.extend(due);
        count
    }

    /// Make every pending arrival visible now.
    pub fn flush(&mut self) -> usize {
        let all = self.arrivals.drain_all();
        let count = all.len();
        self.visible.extend(all);
        count
    }

    /// Replace the visible store with a static sequence (no generation).
    pub fn load_static<I: IntoIterator<Item = Vertex>>(&mut self, vertices: I) {
        self.arrivals.clear();
        self.visible.clear();
        self.visible.extend(vertices);
    }

    /// Forget all generated traffic and restart at the first round.
    pub fn reset(&mut self) {
        self.generator.reset();
        self.history.clear();
        self.arrivals.clear();
        self.visible.clear();
        self.next_tick_at = None;
    }
}

//! Frame scheduler.
//!
//! A frame has two halves:
//!
//! - **compute** ([`Simulation::begin_frame`]): retire any pending apply
//!   half, take the latest parameter snapshot and interaction requests,
//!   handle a spawn, rebuild the quadtree and neighbor graph, then run every
//!   steering pass behind one fan-in barrier.
//! - **apply** ([`Simulation::complete`]): integrate prey and predators.
//!
//! The apply half of frame N always finishes before frame N+1 reads
//! positions or resizes buffers. Frames are never pipelined.

use crate::{
    config::{BehaviorParams, ConfigError, FlockConfig},
    interaction::{FrameRequests, Interactions},
    neighbors::NeighborGraph,
    phases::{self, ForceInputs, PredatorForces, PreyForces},
    population::{self, Population},
    quadtree::QuadTree,
    types::AgentId,
};
use glam::Vec2;
use rand::{SeedableRng, rngs::SmallRng};
use tracing::{debug, info};

/// Computed but not yet applied frame.
#[derive(Clone, Copy, Debug)]
struct PendingApply {
    dt: f32,
}

pub struct Simulation {
    config: FlockConfig,
    params: BehaviorParams,
    next_params: Option<BehaviorParams>,

    prey: Population,
    predators: Population,
    wander_theta: Vec<f32>,

    prey_forces: PreyForces,
    predator_forces: PredatorForces,
    intensity: Vec<f32>,

    tree: QuadTree,
    graph: NeighborGraph,
    interactions: Interactions,

    rng: SmallRng,
    frame: u64,
    pending: Option<PendingApply>,
}

impl Simulation {
    /// Creates a simulation with randomly placed populations.
    ///
    /// Prey start with speeds in `[min_speed, 2 * min_speed]`, predators in
    /// `[min_speed, max_speed]`. Both are seeded from `config.world.seed`.
    ///
    /// ### Errors
    /// Returns [`ConfigError::Invalid`] if the configuration fails validation.
    pub fn new(config: FlockConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(config.world.seed);
        let bounds = config.world.bounds;

        let prey_speed = config.prey.movement.min_speed;
        let prey = Population::random_in_rect(
            config.world.prey_count,
            &bounds,
            prey_speed..=prey_speed * 2.0,
            &mut rng,
        );
        let predator_speed = config.predator.movement;
        let predators = Population::random_in_rect(
            config.world.predator_count,
            &bounds,
            predator_speed.min_speed..=predator_speed.max_speed,
            &mut rng,
        );

        Self::assemble(config, prey, predators, rng)
    }

    /// Creates a simulation from explicit populations.
    ///
    /// The world counts in `config` are ignored.
    pub fn with_populations(
        config: FlockConfig,
        prey: Population,
        predators: Population,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = SmallRng::seed_from_u64(config.world.seed);
        Self::assemble(config, prey, predators, rng)
    }

    fn assemble(
        config: FlockConfig,
        prey: Population,
        predators: Population,
        rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        let world = config.world;
        info!(
            prey = prey.len(),
            predators = predators.len(),
            seed = world.seed,
            "flock simulation created"
        );

        Ok(Self {
            params: config.behavior(),
            next_params: None,
            wander_theta: vec![0.0; predators.len()],
            prey_forces: PreyForces::with_len(prey.len()),
            predator_forces: PredatorForces::with_len(predators.len()),
            intensity: vec![0.0; prey.len()],
            tree: QuadTree::new(
                world.bounds,
                world.quadtree_capacity,
                world.quadtree_min_size,
            ),
            graph: NeighborGraph::new(),
            interactions: Interactions::new(),
            prey,
            predators,
            rng,
            frame: 0,
            pending: None,
            config,
        })
    }

    /// Stores a parameter snapshot; it takes effect at the start of the next
    /// frame's compute half.
    pub fn set_params(&mut self, params: BehaviorParams) {
        self.next_params = Some(params);
    }

    /// Runs one full frame.
    pub fn step(&mut self, dt: f32) {
        self.begin_frame(dt);
        self.complete();
    }

    /// Compute half of a frame.
    ///
    /// Any previously computed frame is applied first, so calling this twice
    /// in a row still integrates both frames in order.
    pub fn begin_frame(&mut self, dt: f32) {
        self.complete();

        if let Some(params) = self.next_params.take() {
            self.params = params;
        }

        let requests = self.interactions.take_frame();
        if let Some(position) = requests.spawn {
            self.spawn_prey(position);
        }

        phases::index_phase(&mut self.tree, &self.prey.positions);
        phases::neighbor_phase(
            &mut self.graph,
            &self.tree,
            &self.prey.positions,
            &self.params.prey,
        );
        phases::force_phase(
            &self.prey,
            &self.predators,
            &self.graph,
            &self.params,
            self.force_inputs(&requests),
            &mut self.prey_forces,
            &mut self.intensity,
            &mut self.predator_forces,
            &mut self.wander_theta,
        );

        self.pending = Some(PendingApply { dt });
    }

    /// Apply half of a frame. Does nothing when no frame is pending.
    pub fn complete(&mut self) {
        let Some(PendingApply { dt }) = self.pending.take() else {
            return;
        };
        phases::apply_phase(
            &mut self.prey,
            &mut self.predators,
            &self.prey_forces,
            &self.predator_forces,
            &self.params,
            &self.config.world.bounds,
            dt,
        );
        self.frame += 1;
    }

    fn force_inputs(&self, requests: &FrameRequests) -> ForceInputs {
        ForceInputs {
            attraction: requests.attraction,
            repulsion: requests.repulsion,
            seed: self.config.world.seed,
            frame: self.frame,
            intensity_saturation: self.config.world.intensity_saturation,
        }
    }

    /// Grows the prey population by one agent and resizes every derived
    /// buffer. This is a stop-the-world resize: every prey force buffer and
    /// the intensity buffer are reallocated and cleared.
    fn spawn_prey(&mut self, position: Vec2) -> AgentId {
        let speed = self.params.prey.movement.min_speed;
        let velocity = population::random_velocity(speed..=speed * 2.0, &mut self.rng);
        let id = self.prey.spawn(position, velocity);

        let n = self.prey.len();
        self.prey_forces.ensure_len(n);
        self.intensity.clear();
        self.intensity.resize(n, 0.0);

        debug!(id, x = position.x, y = position.y, prey = n, "prey spawned");
        id
    }

    pub fn interactions(&self) -> &Interactions {
        &self.interactions
    }

    pub fn interactions_mut(&mut self) -> &mut Interactions {
        &mut self.interactions
    }

    pub fn prey(&self) -> &Population {
        &self.prey
    }

    pub fn predators(&self) -> &Population {
        &self.predators
    }

    /// Per-prey crowding intensity from the last computed frame.
    pub fn intensity(&self) -> &[f32] {
        &self.intensity
    }

    pub fn prey_forces(&self) -> &PreyForces {
        &self.prey_forces
    }

    pub fn predator_forces(&self) -> &PredatorForces {
        &self.predator_forces
    }

    pub fn wander_theta(&self) -> &[f32] {
        &self.wander_theta
    }

    /// Quadtree of the last computed frame, for debug overlays.
    pub fn quadtree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn neighbor_graph(&self) -> &NeighborGraph {
        &self.graph
    }

    /// Parameters used by the last computed frame.
    pub fn params(&self) -> &BehaviorParams {
        &self.params
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Number of fully applied frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// `true` between [`Simulation::begin_frame`] and [`Simulation::complete`].
    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }
}

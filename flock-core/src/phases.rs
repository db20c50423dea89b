//! Per-frame simulation phases.
//!
//! A frame runs these in order:
//! 1. [`index_phase`] - rebuild the quadtree from prey positions.
//! 2. [`neighbor_phase`] - build the neighbor graph, serially.
//! 3. [`force_phase`] - fan out every steering pass (plus the intensity
//!    pass) in one rayon scope; the end of the scope is the fan-in barrier.
//! 4. [`apply_phase`] - integrate prey and predators concurrently, each from
//!    its own force buffers.
//!
//! Phases 1 to 3 form the compute half of a frame and phase 4 the apply half;
//! [`crate::simulation::Simulation`] sequences them.

use crate::{
    config::{BehaviorParams, PreyParams},
    force_buffer::ForceBuffer,
    motion,
    neighbors::NeighborGraph,
    population::Population,
    quadtree::QuadTree,
    steering::{flocking, intensity, point_forces, wander},
    types::Rect,
};
use glam::Vec2;
use tracing::trace;

/// Force buffers of every prey behavior.
#[derive(Debug, Default)]
pub struct PreyForces {
    pub alignment: ForceBuffer,
    pub separation: ForceBuffer,
    pub cohesion: ForceBuffer,
    pub escape: ForceBuffer,
    pub attraction: ForceBuffer,
    pub repulsion: ForceBuffer,
}

impl PreyForces {
    pub fn with_len(len: usize) -> Self {
        Self {
            alignment: ForceBuffer::with_len(len),
            separation: ForceBuffer::with_len(len),
            cohesion: ForceBuffer::with_len(len),
            escape: ForceBuffer::with_len(len),
            attraction: ForceBuffer::with_len(len),
            repulsion: ForceBuffer::with_len(len),
        }
    }

    /// Resizes and clears every buffer.
    pub fn ensure_len(&mut self, len: usize) {
        self.alignment.ensure_len(len);
        self.separation.ensure_len(len);
        self.cohesion.ensure_len(len);
        self.escape.ensure_len(len);
        self.attraction.ensure_len(len);
        self.repulsion.ensure_len(len);
    }

    pub fn len(&self) -> usize {
        self.alignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignment.is_empty()
    }

    /// Every prey force, in the order the integrator sums them.
    pub fn slices(&self) -> [&[Vec2]; 6] {
        [
            self.alignment.as_slice(),
            self.separation.as_slice(),
            self.cohesion.as_slice(),
            self.escape.as_slice(),
            self.attraction.as_slice(),
            self.repulsion.as_slice(),
        ]
    }
}

/// Force buffers of every predator behavior.
#[derive(Debug, Default)]
pub struct PredatorForces {
    pub wander: ForceBuffer,
}

impl PredatorForces {
    pub fn with_len(len: usize) -> Self {
        Self {
            wander: ForceBuffer::with_len(len),
        }
    }

    pub fn slices(&self) -> [&[Vec2]; 1] {
        [self.wander.as_slice()]
    }
}

/// Point forces and frame-wide values shared by the force passes.
#[derive(Clone, Copy, Debug)]
pub struct ForceInputs {
    pub attraction: Option<Vec2>,
    pub repulsion: Option<Vec2>,
    pub seed: u64,
    pub frame: u64,
    pub intensity_saturation: f32,
}

/// Rebuilds `tree` from `positions`.
///
/// ### Returns
/// The number of agents outside the world that were left out of the index
/// this frame. They get no neighbors, which is expected rather than an error.
pub fn index_phase(tree: &mut QuadTree, positions: &[Vec2]) -> usize {
    let dropped = tree.build(positions);
    if dropped > 0 {
        trace!(dropped, "agents outside the quadtree root");
    }
    dropped
}

/// Builds the neighbor graph from a freshly built tree.
///
/// The query box is sized from the largest perception radius of the
/// neighbor-driven behaviors.
pub fn neighbor_phase(
    graph: &mut NeighborGraph,
    tree: &QuadTree,
    positions: &[Vec2],
    params: &PreyParams,
) {
    graph.build(tree, positions, params.max_perception_radius());
    trace!(
        agents = graph.len(),
        neighbors = graph.total_neighbors(),
        "neighbor graph rebuilt"
    );
}

/// Runs every steering pass of the frame concurrently.
///
/// All passes read the populations and the neighbor graph and write only to
/// their own buffer. The function returns once every pass has finished, so
/// callers may read any output buffer afterward. Escape reads predator
/// positions, which is why predator integration must also wait for this
/// barrier.
///
/// ### Parameters
/// - `prey`, `predators` - Current populations; read only.
/// - `graph` - Neighbor graph for `prey`.
/// - `params` - Behavior snapshot for this frame.
/// - `inputs` - Active point forces, seed and frame number.
/// - `prey_out` - Prey force buffers, one per behavior.
/// - `intensity_out` - Per-prey crowding intensity.
/// - `predator_out` - Predator force buffers.
/// - `wander_theta` - Persistent predator wander angles, advanced in place.
#[allow(clippy::too_many_arguments)]
pub fn force_phase(
    prey: &Population,
    predators: &Population,
    graph: &NeighborGraph,
    params: &BehaviorParams,
    inputs: ForceInputs,
    prey_out: &mut PreyForces,
    intensity_out: &mut [f32],
    predator_out: &mut PredatorForces,
    wander_theta: &mut [f32],
) {
    let positions = prey.positions.as_slice();
    let velocities = prey.velocities.as_slice();
    let predator_positions = predators.positions.as_slice();
    let predator_velocities = predators.velocities.as_slice();
    let prey_params = &params.prey;
    let wander_params = &params.predator.wander;

    let PreyForces {
        alignment,
        separation,
        cohesion,
        escape,
        attraction,
        repulsion,
    } = prey_out;
    let wander_out = &mut predator_out.wander;

    rayon::scope(move |s| {
        s.spawn(move |_| {
            flocking::alignment(
                positions,
                velocities,
                graph,
                &prey_params.alignment,
                alignment.as_mut_slice(),
            );
        });
        s.spawn(move |_| {
            flocking::separation(
                positions,
                velocities,
                graph,
                &prey_params.separation,
                separation.as_mut_slice(),
            );
        });
        s.spawn(move |_| {
            flocking::cohesion(
                positions,
                velocities,
                graph,
                &prey_params.cohesion,
                cohesion.as_mut_slice(),
            );
        });
        s.spawn(move |_| {
            point_forces::escape(
                positions,
                velocities,
                predator_positions,
                &prey_params.escape,
                escape.as_mut_slice(),
            );
        });
        s.spawn(move |_| {
            point_forces::attraction(
                positions,
                inputs.attraction,
                &prey_params.attraction,
                attraction.as_mut_slice(),
            );
        });
        s.spawn(move |_| {
            point_forces::repulsion(
                positions,
                velocities,
                inputs.repulsion,
                &prey_params.repulsion,
                repulsion.as_mut_slice(),
            );
        });
        s.spawn(move |_| {
            intensity::intensity(graph, inputs.intensity_saturation, intensity_out);
        });
        s.spawn(move |_| {
            wander::wander(
                predator_positions,
                predator_velocities,
                wander_theta,
                wander_params,
                inputs.seed,
                inputs.frame,
                wander_out.as_mut_slice(),
            );
        });
    });
}

/// Integrates both species, each behind its own set of force buffers.
///
/// Must only be called after [`force_phase`] has returned for this frame.
pub fn apply_phase(
    prey: &mut Population,
    predators: &mut Population,
    prey_forces: &PreyForces,
    predator_forces: &PredatorForces,
    params: &BehaviorParams,
    bounds: &Rect,
    dt: f32,
) {
    let prey_slices = prey_forces.slices();
    let predator_slices = predator_forces.slices();

    rayon::join(
        || {
            motion::integrate_prey(
                &mut prey.positions,
                &mut prey.velocities,
                &mut prey.transforms,
                &prey_slices,
                &params.prey.movement,
                bounds,
                dt,
            )
        },
        || {
            motion::integrate_predators(
                &mut predators.positions,
                &mut predators.velocities,
                &mut predators.transforms,
                &predator_slices,
                &params.predator.movement,
                bounds,
                dt,
            )
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FlockConfig, types::Rect};

    fn world() -> Rect {
        Rect::new(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0))
    }

    struct Frame {
        tree: QuadTree,
        graph: NeighborGraph,
        prey_forces: PreyForces,
        predator_forces: PredatorForces,
        intensity: Vec<f32>,
        theta: Vec<f32>,
    }

    impl Frame {
        fn new(prey: &Population, predators: &Population) -> Self {
            Self {
                tree: QuadTree::new(world(), 4, 1.0),
                graph: NeighborGraph::new(),
                prey_forces: PreyForces::with_len(prey.len()),
                predator_forces: PredatorForces::with_len(predators.len()),
                intensity: vec![0.0; prey.len()],
                theta: vec![0.0; predators.len()],
            }
        }

        fn compute(
            &mut self,
            prey: &Population,
            predators: &Population,
            params: &BehaviorParams,
            inputs: ForceInputs,
        ) {
            index_phase(&mut self.tree, &prey.positions);
            neighbor_phase(&mut self.graph, &self.tree, &prey.positions, &params.prey);
            force_phase(
                prey,
                predators,
                &self.graph,
                params,
                inputs,
                &mut self.prey_forces,
                &mut self.intensity,
                &mut self.predator_forces,
                &mut self.theta,
            );
        }
    }

    fn inputs() -> ForceInputs {
        ForceInputs {
            attraction: None,
            repulsion: None,
            seed: 1,
            frame: 0,
            intensity_saturation: 4.0,
        }
    }

    #[test]
    fn force_phase_fills_each_buffer_independently() {
        let prey = Population::from_state(
            vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(30.0, 30.0)],
            vec![Vec2::X, -Vec2::X, Vec2::Y],
        );
        let predators = Population::from_state(vec![Vec2::new(33.0, 30.0)], vec![Vec2::Y]);
        let params = FlockConfig::default().behavior();
        let mut frame = Frame::new(&prey, &predators);

        frame.compute(&prey, &predators, &params, inputs());

        // The first two prey see each other, the third sees the predator.
        assert!(frame.prey_forces.alignment.get(0).length() > 0.0);
        assert!(frame.prey_forces.separation.get(1).length() > 0.0);
        assert_eq!(frame.prey_forces.alignment.get(2), Vec2::ZERO);
        assert!(frame.prey_forces.escape.get(2).x < 0.0);
        assert_eq!(frame.prey_forces.escape.get(0), Vec2::ZERO);
        assert!(!frame.prey_forces.attraction.any_nonzero());
        assert!(!frame.prey_forces.repulsion.any_nonzero());
        assert!(frame.predator_forces.wander.get(0).length() > 0.0);
        assert_eq!(frame.intensity, vec![0.25, 0.25, 0.0]);
    }

    #[test]
    fn point_forces_follow_frame_inputs() {
        let prey = Population::from_state(vec![Vec2::new(5.0, 0.0)], vec![Vec2::ZERO]);
        let predators = Population::default();
        let params = FlockConfig::default().behavior();
        let mut frame = Frame::new(&prey, &predators);

        let mut with_points = inputs();
        with_points.attraction = Some(Vec2::new(20.0, 0.0));
        with_points.repulsion = Some(Vec2::ZERO);
        frame.compute(&prey, &predators, &params, with_points);

        assert!(frame.prey_forces.attraction.get(0).x > 0.0);
        assert!(frame.prey_forces.repulsion.get(0).x > 0.0);

        frame.compute(&prey, &predators, &params, inputs());
        assert_eq!(frame.prey_forces.attraction.get(0), Vec2::ZERO);
        assert_eq!(frame.prey_forces.repulsion.get(0), Vec2::ZERO);
    }

    #[test]
    fn apply_phase_moves_both_species() {
        let mut prey = Population::from_state(vec![Vec2::ZERO], vec![Vec2::new(5.0, 0.0)]);
        let mut predators =
            Population::from_state(vec![Vec2::new(10.0, 10.0)], vec![Vec2::new(0.0, 8.0)]);
        let params = FlockConfig::default().behavior();
        let mut frame = Frame::new(&prey, &predators);
        frame.compute(&prey, &predators, &params, inputs());

        apply_phase(
            &mut prey,
            &mut predators,
            &frame.prey_forces,
            &frame.predator_forces,
            &params,
            &world(),
            0.1,
        );

        assert!(prey.positions[0].x > 0.0);
        assert!(predators.positions[0].y > 10.0);
        assert_eq!(prey.transforms[0].position, prey.positions[0]);
        assert_eq!(predators.transforms[0].position, predators.positions[0]);
    }
}

//! Predator wandering.
//!
//! Each predator keeps a persistent wander angle. Every frame the angle moves
//! by a pseudo-random offset that is a pure function of
//! `(seed, agent index, frame)`, so runs are reproducible regardless of how
//! rayon schedules the pass.

use super::{clamp_force, heading};
use crate::{config::WanderParams, types::AgentId};
use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rayon::prelude::*;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of the per-agent generator for one frame.
pub fn agent_seed(seed: u64, id: AgentId, frame: u64) -> u64 {
    splitmix64(seed ^ splitmix64(id as u64 ^ splitmix64(frame)))
}

/// Angle offset in `[-range, range]` for agent `id` on `frame`.
pub fn wander_offset(seed: u64, id: AgentId, frame: u64, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    let mut rng = SmallRng::seed_from_u64(agent_seed(seed, id, frame));
    rng.random_range(-range..=range)
}

/// Steering toward a point on the wander circle.
///
/// The circle sits `wander_distance` ahead of the agent along its heading;
/// the target is the point at angle `theta` on a circle of `wander_radius`.
/// A zero velocity uses the fallback heading.
pub fn wander_force(position: Vec2, velocity: Vec2, theta: f32, params: &WanderParams) -> Vec2 {
    let center = position + heading(velocity) * params.wander_distance;
    let target = center + Vec2::from_angle(theta) * params.wander_radius;
    clamp_force(target - position, params.max_steering_force)
}

/// Advances every wander angle and writes the resulting steering forces.
///
/// ### Parameters
/// - `positions`, `velocities` - Current predator state.
/// - `thetas` - Persistent wander angles, updated in place.
/// - `params` - Frame-local wander parameters.
/// - `seed` - Simulation seed.
/// - `frame` - Current frame number.
/// - `out` - One slot per predator; fully overwritten.
pub fn wander(
    positions: &[Vec2],
    velocities: &[Vec2],
    thetas: &mut [f32],
    params: &WanderParams,
    seed: u64,
    frame: u64,
    out: &mut [Vec2],
) {
    debug_assert_eq!(thetas.len(), positions.len());
    out.par_iter_mut()
        .zip(thetas.par_iter_mut())
        .enumerate()
        .for_each(|(i, (force, theta))| {
            *theta += wander_offset(seed, i, frame, params.variation_range);
            *force = wander_force(positions[i], velocities[i], *theta, params);
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_reproducible_and_bounded() {
        for frame in 0..50 {
            for id in 0..8 {
                let a = wander_offset(42, id, frame, 0.3);
                let b = wander_offset(42, id, frame, 0.3);
                assert_eq!(a, b);
                assert!((-0.3..=0.3).contains(&a));
            }
        }
        assert_eq!(wander_offset(42, 0, 0, 0.0), 0.0);
    }

    #[test]
    fn offsets_differ_between_agents_and_frames() {
        let base = wander_offset(7, 0, 0, 1.0);
        let other_agent = wander_offset(7, 1, 0, 1.0);
        let other_frame = wander_offset(7, 0, 1, 1.0);
        assert_ne!(base, other_agent);
        assert_ne!(base, other_frame);
    }

    #[test]
    fn zero_velocity_is_guarded() {
        let params = WanderParams {
            wander_radius: 1.0,
            wander_distance: 2.0,
            variation_range: 0.0,
            max_steering_force: 10.0,
        };
        let f = wander_force(Vec2::ZERO, Vec2::ZERO, 0.0, &params);
        assert!(f.is_finite());
        assert!((f - Vec2::new(3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn pass_advances_angles_and_clamps() {
        let p = WanderParams::default();
        let positions = vec![Vec2::ZERO, Vec2::new(5.0, 5.0)];
        let velocities = vec![Vec2::X, Vec2::Y];
        let mut thetas = vec![0.0, 1.0];
        let mut out = vec![Vec2::ZERO; 2];

        wander(&positions, &velocities, &mut thetas, &p, 1, 3, &mut out);

        assert_eq!(thetas[0], wander_offset(1, 0, 3, p.variation_range));
        assert_eq!(thetas[1], 1.0 + wander_offset(1, 1, 3, p.variation_range));
        for f in out {
            assert!(f.length() <= p.max_steering_force + 1e-5);
            assert!(f.length() > 0.0);
        }
    }
}

//! Per-species agent storage and seeding.

use crate::types::{AgentId, Rect, Transform};
use glam::Vec2;
use rand::Rng;

/// One species' agents as parallel arrays.
///
/// `positions[i]`, `velocities[i]` and `transforms[i]` always describe the
/// same agent. Agents are only ever appended, never removed.
#[derive(Debug, Default)]
pub struct Population {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    /// Scene handles, written only by the motion integrators.
    pub transforms: Vec<Transform>,
}

impl Population {
    pub fn from_state(positions: Vec<Vec2>, velocities: Vec<Vec2>) -> Self {
        debug_assert_eq!(positions.len(), velocities.len());
        let transforms = positions
            .iter()
            .map(|&position| Transform {
                position,
                rotation: 0.0,
            })
            .collect();
        Self {
            positions,
            velocities,
            transforms,
        }
    }

    /// Places `count` agents uniformly inside `bounds`, each moving in a
    /// random direction with a speed drawn from `speed`.
    pub fn random_in_rect(
        count: usize,
        bounds: &Rect,
        speed: std::ops::RangeInclusive<f32>,
        rng: &mut impl Rng,
    ) -> Self {
        let positions = (0..count)
            .map(|_| {
                let x = rng.random_range(bounds.min.x..=bounds.max.x);
                let y = rng.random_range(bounds.min.y..=bounds.max.y);
                Vec2::new(x, y)
            })
            .collect();
        let velocities = (0..count)
            .map(|_| random_velocity(speed.clone(), rng))
            .collect();

        Self::from_state(positions, velocities)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends one agent to every parallel array.
    ///
    /// Existing agents keep their index and state. The arrays may reallocate,
    /// so no slice borrowed from them may outlive this call; the borrow
    /// checker enforces that for callers holding `&mut self`.
    pub fn spawn(&mut self, position: Vec2, velocity: Vec2) -> AgentId {
        let id = self.positions.len();
        self.positions.push(position);
        self.velocities.push(velocity);
        self.transforms.push(Transform {
            position,
            rotation: velocity.y.atan2(velocity.x),
        });
        id
    }
}

/// Velocity with a uniformly random direction and a speed from `speed`.
pub fn random_velocity(speed: std::ops::RangeInclusive<f32>, rng: &mut impl Rng) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let magnitude = if speed.start() < speed.end() {
        rng.random_range(speed)
    } else {
        *speed.start()
    };
    Vec2::from_angle(angle) * magnitude
}

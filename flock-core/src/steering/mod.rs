//! Steering-force passes.
//!
//! Every pass reads positions, velocities and (where relevant) the neighbor
//! graph, and writes exactly one force per agent into its own output slice.
//! Writes are disjoint by construction, so each pass is a plain rayon
//! parallel map over the agent range and passes can run concurrently.
//!
//! Passes:
//! - [`flocking`] - alignment, separation and cohesion over neighbor lists.
//! - [`point_forces`] - escape from predators, attraction and repulsion
//!   around user-chosen points.
//! - [`wander`] - seeded pseudo-random heading drift for predators.
//! - [`intensity`] - per-prey crowding scalar used for coloring.

pub mod flocking;
pub mod intensity;
pub mod point_forces;
pub mod wander;

use glam::Vec2;

/// Direction used when an agent's velocity is the zero vector.
pub const FALLBACK_HEADING: Vec2 = Vec2::X;

/// Normalized velocity, or [`FALLBACK_HEADING`] for a zero (or non-finite)
/// velocity.
#[inline]
pub fn heading(velocity: Vec2) -> Vec2 {
    velocity.try_normalize().unwrap_or(FALLBACK_HEADING)
}

/// Field-of-view test.
///
/// A neighbor is visible if the angle between `forward` and `to_neighbor` is
/// strictly less than half of `perception_angle_deg`. A neighbor at exactly
/// the agent's position has no direction and counts as visible.
///
/// ### Parameters
/// - `forward` - Unit heading of the observing agent.
/// - `to_neighbor` - Vector from the agent to the neighbor.
/// - `perception_angle_deg` - Full field-of-view angle in degrees.
#[inline]
pub fn in_field_of_view(forward: Vec2, to_neighbor: Vec2, perception_angle_deg: f32) -> bool {
    let Some(dir) = to_neighbor.try_normalize() else {
        return true;
    };
    let angle = forward.dot(dir).clamp(-1.0, 1.0).acos();
    angle < perception_angle_deg.to_radians() * 0.5
}

/// Linearly remaps `distance` from `[0, radius]` to `[min_weight, max_weight]`.
///
/// Distances outside the range are clamped first. Passing
/// `min_weight > max_weight` makes near neighbors dominate.
#[inline]
pub fn distance_weight(distance: f32, radius: f32, min_weight: f32, max_weight: f32) -> f32 {
    if radius <= 0.0 {
        return min_weight;
    }
    let t = (distance / radius).clamp(0.0, 1.0);
    min_weight + (max_weight - min_weight) * t
}

/// Rescales `force` to exactly `max` if it is longer, keeping its direction.
#[inline]
pub fn clamp_force(force: Vec2, max: f32) -> Vec2 {
    force.clamp_length_max(max.max(0.0))
}

/// Clamps the magnitude of `force` into `[min, max]`.
///
/// The zero vector has no direction and stays zero.
#[inline]
pub fn clamp_force_range(force: Vec2, min: f32, max: f32) -> Vec2 {
    let len = force.length();
    if len == 0.0 {
        Vec2::ZERO
    } else if len < min {
        force * (min / len)
    } else if len > max {
        force * (max / len)
    } else {
        force
    }
}

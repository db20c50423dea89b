//! Forces around points rather than neighbors: escape from predators, and
//! the user-driven attraction and repulsion points.

use super::{clamp_force, clamp_force_range, heading};
use crate::config::{AttractionParams, EscapeParams, RepulsionParams};
use glam::Vec2;
use rayon::prelude::*;

/// Below this fraction of the orbit radius an agent is considered to be
/// orbiting the attraction point and receives no pull.
pub const ORBIT_THRESHOLD: f32 = 0.35;

/// Sum of per-predator flee forces for one prey.
///
/// Every predator closer than `perception_radius` contributes
/// `heading(away) * speed_factor - velocity`, clamped individually to
/// `max_steering_force`. The sum itself is not clamped.
pub fn escape_force(
    position: Vec2,
    velocity: Vec2,
    predators: &[Vec2],
    params: &EscapeParams,
) -> Vec2 {
    predators
        .iter()
        .filter_map(|&predator| {
            let away = position - predator;
            (away.length() < params.perception_radius).then(|| {
                clamp_force(
                    heading(away) * params.speed_factor - velocity,
                    params.max_steering_force,
                )
            })
        })
        .sum()
}

/// Pull toward the attraction point, if one is active.
///
/// With `t = distance / orbit_radius`, agents at `t < ORBIT_THRESHOLD` get
/// exactly zero. Otherwise the force is the unit direction to the target
/// scaled by `t²`, with its magnitude clamped into
/// `[min_steering_force, max_steering_force]`.
pub fn attraction_force(position: Vec2, target: Option<Vec2>, params: &AttractionParams) -> Vec2 {
    let Some(target) = target else {
        return Vec2::ZERO;
    };
    let to_target = target - position;
    let d = to_target.length();
    if d >= params.interaction_radius {
        return Vec2::ZERO;
    }

    let t = d / params.orbit_radius.max(f32::EPSILON);
    if t < ORBIT_THRESHOLD {
        return Vec2::ZERO;
    }
    clamp_force_range(
        to_target.normalize_or_zero() * (t * t),
        params.min_steering_force,
        params.max_steering_force,
    )
}

/// Push away from a one-shot repulsion point.
pub fn repulsion_force(
    position: Vec2,
    velocity: Vec2,
    source: Option<Vec2>,
    params: &RepulsionParams,
) -> Vec2 {
    let Some(source) = source else {
        return Vec2::ZERO;
    };
    let away = position - source;
    if away.length() >= params.interaction_radius {
        return Vec2::ZERO;
    }
    let desired = heading(away) * params.speed_factor;
    clamp_force(desired - velocity, params.max_steering_force)
}

/// Escape pass over every prey.
pub fn escape(
    positions: &[Vec2],
    velocities: &[Vec2],
    predators: &[Vec2],
    params: &EscapeParams,
    out: &mut [Vec2],
) {
    out.par_iter_mut().enumerate().for_each(|(i, force)| {
        *force = escape_force(positions[i], velocities[i], predators, params);
    });
}

/// Attraction pass; writes zeros when `target` is `None`.
pub fn attraction(
    positions: &[Vec2],
    target: Option<Vec2>,
    params: &AttractionParams,
    out: &mut [Vec2],
) {
    out.par_iter_mut().enumerate().for_each(|(i, force)| {
        *force = attraction_force(positions[i], target, params);
    });
}

/// Repulsion pass; writes zeros when `source` is `None`.
pub fn repulsion(
    positions: &[Vec2],
    velocities: &[Vec2],
    source: Option<Vec2>,
    params: &RepulsionParams,
    out: &mut [Vec2],
) {
    out.par_iter_mut().enumerate().for_each(|(i, force)| {
        *force = repulsion_force(positions[i], velocities[i], source, params);
    });
}

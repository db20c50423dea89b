//! Alignment, separation and cohesion.
//!
//! The three rules share one accumulation loop and differ only in which
//! direction each visible neighbor contributes.

use super::{clamp_force, distance_weight, heading, in_field_of_view};
use crate::{config::FlockingParams, neighbors::NeighborGraph, types::AgentId};
use glam::Vec2;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlockRule {
    /// Match the heading of nearby agents.
    Alignment,
    /// Move away from nearby agents.
    Separation,
    /// Move toward nearby agents.
    Cohesion,
}

/// Steering force of one rule for agent `id`.
///
/// Neighbors count when they are closer than `perception_radius` and inside
/// the field of view. Each one contributes a unit direction scaled by its
/// distance weight. The summed direction, scaled to `desired_magnitude`, is
/// the desired velocity; the result is `desired - velocity`, clamped to
/// `max_steering_force` and then multiplied by `scale_force`.
///
/// Returns zero when no neighbor is visible or the contributions cancel.
pub fn flocking_force(
    rule: FlockRule,
    id: AgentId,
    positions: &[Vec2],
    velocities: &[Vec2],
    graph: &NeighborGraph,
    params: &FlockingParams,
) -> Vec2 {
    let pos = positions[id];
    let vel = velocities[id];
    let forward = heading(vel);

    let mut sum = Vec2::ZERO;
    for &other in graph.neighbors(id) {
        let offset = positions[other] - pos;
        let d = offset.length();
        if d >= params.perception_radius
            || !in_field_of_view(forward, offset, params.perception_angle)
        {
            continue;
        }

        let dir = match rule {
            FlockRule::Alignment => velocities[other].normalize_or_zero(),
            FlockRule::Separation => (-offset).normalize_or_zero(),
            FlockRule::Cohesion => offset.normalize_or_zero(),
        };
        sum += dir
            * distance_weight(
                d,
                params.perception_radius,
                params.min_distance_weight,
                params.max_distance_weight,
            );
    }

    let Some(dir) = sum.try_normalize() else {
        return Vec2::ZERO;
    };
    let desired = dir * params.desired_magnitude;
    clamp_force(desired - vel, params.max_steering_force) * params.scale_force
}

/// Runs one rule over every agent in parallel, writing into `out`.
///
/// ### Parameters
/// - `rule` - Which flocking rule to evaluate.
/// - `positions`, `velocities` - Current state of the population.
/// - `graph` - Neighbor candidates built this frame.
/// - `params` - Frame-local parameter block of this rule.
/// - `out` - One slot per agent; fully overwritten.
pub fn flocking_pass(
    rule: FlockRule,
    positions: &[Vec2],
    velocities: &[Vec2],
    graph: &NeighborGraph,
    params: &FlockingParams,
    out: &mut [Vec2],
) {
    debug_assert_eq!(out.len(), positions.len());
    out.par_iter_mut().enumerate().for_each(|(i, force)| {
        *force = flocking_force(rule, i, positions, velocities, graph, params);
    });
}

pub fn alignment(
    positions: &[Vec2],
    velocities: &[Vec2],
    graph: &NeighborGraph,
    params: &FlockingParams,
    out: &mut [Vec2],
) {
    flocking_pass(
        FlockRule::Alignment,
        positions,
        velocities,
        graph,
        params,
        out,
    );
}

pub fn separation(
    positions: &[Vec2],
    velocities: &[Vec2],
    graph: &NeighborGraph,
    params: &FlockingParams,
    out: &mut [Vec2],
) {
    flocking_pass(
        FlockRule::Separation,
        positions,
        velocities,
        graph,
        params,
        out,
    );
}

pub fn cohesion(
    positions: &[Vec2],
    velocities: &[Vec2],
    graph: &NeighborGraph,
    params: &FlockingParams,
    out: &mut [Vec2],
) {
    flocking_pass(
        FlockRule::Cohesion,
        positions,
        velocities,
        graph,
        params,
        out,
    );
}

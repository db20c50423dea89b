//! Motion integration for prey and predators.
//!
//! Forces are added straight onto the velocity without `dt` scaling; every
//! steering constant is tuned against that, so introducing `dt` here means
//! re-tuning the whole parameter set. Only the position update uses `dt`.

use crate::{
    config::{PredatorMovementParams, PreyMovementParams},
    force_buffer::sum_at,
    steering::heading,
    types::{Rect, Transform},
};
use glam::Vec2;
use rayon::prelude::*;

/// Applies quadratic drag `½ · drag_factor · |v|²` against the velocity.
///
/// If the drag would stop or reverse the agent, the velocity keeps its
/// direction with magnitude `epsilon` instead.
pub fn apply_drag(velocity: Vec2, drag_factor: f32, epsilon: f32) -> Vec2 {
    let speed = velocity.length();
    let dir = heading(velocity);
    let drag = 0.5 * drag_factor * speed * speed;
    if drag >= speed {
        dir * epsilon
    } else {
        dir * (speed - drag)
    }
}

/// Raises the speed to at least `min_speed`, keeping the direction.
pub fn enforce_min_speed(velocity: Vec2, min_speed: f32) -> Vec2 {
    if velocity.length() < min_speed {
        heading(velocity) * min_speed
    } else {
        velocity
    }
}

/// Clamps the speed into `[min_speed, max_speed]`, keeping the direction.
pub fn clamp_speed(velocity: Vec2, min_speed: f32, max_speed: f32) -> Vec2 {
    let speed = velocity.length();
    if speed < min_speed {
        heading(velocity) * min_speed
    } else if speed > max_speed {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}

/// Reflective bounce off the world rectangle, one axis at a time.
///
/// On each axis where `position` lies outside `bounds`, the velocity
/// component is negated and the coordinate clamped back in. The other axis is
/// left untouched.
pub fn bounce(position: &mut Vec2, velocity: &mut Vec2, bounds: &Rect) {
    if position.x < bounds.min.x || position.x > bounds.max.x {
        velocity.x = -velocity.x;
        position.x = position.x.clamp(bounds.min.x, bounds.max.x);
    }
    if position.y < bounds.min.y || position.y > bounds.max.y {
        velocity.y = -velocity.y;
        position.y = position.y.clamp(bounds.min.y, bounds.max.y);
    }
}

/// Heading angle in radians for the scene transform.
#[inline]
pub fn rotation_of(velocity: Vec2) -> f32 {
    let h = heading(velocity);
    h.y.atan2(h.x)
}

/// One prey integration step.
pub fn step_prey(
    position: &mut Vec2,
    velocity: &mut Vec2,
    transform: &mut Transform,
    acceleration: Vec2,
    params: &PreyMovementParams,
    bounds: &Rect,
    dt: f32,
) {
    let mut v = *velocity + acceleration;
    v = apply_drag(v, params.drag_factor, params.movement_accuracy);
    v = enforce_min_speed(v, params.min_speed);
    transform.rotation = rotation_of(v);

    *position += v * dt;
    bounce(position, &mut v, bounds);

    *velocity = v;
    transform.position = *position;
}

/// One predator integration step.
pub fn step_predator(
    position: &mut Vec2,
    velocity: &mut Vec2,
    transform: &mut Transform,
    acceleration: Vec2,
    params: &PredatorMovementParams,
    bounds: &Rect,
    dt: f32,
) {
    let mut v = *velocity + acceleration;
    v = clamp_speed(v, params.min_speed, params.max_speed);
    transform.rotation = rotation_of(v);

    *position += v * dt;
    bounce(position, &mut v, bounds);

    *velocity = v;
    transform.position = *position;
}

/// Integrates every prey in parallel.
///
/// ### Parameters
/// - `positions`, `velocities`, `transforms` - Prey state, mutated in place.
/// - `forces` - Every prey force buffer; summed per agent.
/// - `params` - Prey movement parameters.
/// - `bounds` - World rectangle.
/// - `dt` - Elapsed time, used for the position update only.
pub fn integrate_prey(
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
    transforms: &mut [Transform],
    forces: &[&[Vec2]],
    params: &PreyMovementParams,
    bounds: &Rect,
    dt: f32,
) {
    positions
        .par_iter_mut()
        .zip(velocities.par_iter_mut())
        .zip(transforms.par_iter_mut())
        .enumerate()
        .for_each(|(i, ((p, v), t))| {
            step_prey(p, v, t, sum_at(forces, i), params, bounds, dt);
        });
}

/// Integrates every predator in parallel.
pub fn integrate_predators(
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
    transforms: &mut [Transform],
    forces: &[&[Vec2]],
    params: &PredatorMovementParams,
    bounds: &Rect,
    dt: f32,
) {
    positions
        .par_iter_mut()
        .zip(velocities.par_iter_mut())
        .zip(transforms.par_iter_mut())
        .enumerate()
        .for_each(|(i, ((p, v), t))| {
            step_predator(p, v, t, sum_at(forces, i), params, bounds, dt);
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn bounds() -> Rect {
        Rect::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0))
    }

    #[test]
    fn drag_reduces_speed_along_direction() {
        let v = apply_drag(Vec2::new(2.0, 0.0), 0.5, 0.01);
        // ½ · 0.5 · 4 = 1
        assert!((v - Vec2::new(1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn drag_never_reverses_velocity() {
        let v = apply_drag(Vec2::new(0.0, -10.0), 1.0, 0.01);
        assert!((v - Vec2::new(0.0, -0.01)).length() < EPS);

        let v = apply_drag(Vec2::ZERO, 1.0, 0.01);
        assert!(v.is_finite());
        assert!((v.length() - 0.01).abs() < EPS);
    }

    #[test]
    fn predator_speed_is_clamped_both_ways() {
        let slow = clamp_speed(Vec2::new(0.5, 0.0), 2.0, 4.0);
        let fast = clamp_speed(Vec2::new(0.0, 9.0), 2.0, 4.0);
        let inside = clamp_speed(Vec2::new(3.0, 0.0), 2.0, 4.0);
        let stopped = clamp_speed(Vec2::ZERO, 2.0, 4.0);
        assert!((slow.length() - 2.0).abs() < EPS);
        assert!((fast.length() - 4.0).abs() < EPS);
        assert_eq!(inside, Vec2::new(3.0, 0.0));
        assert!((stopped - Vec2::new(2.0, 0.0)).length() < EPS);
    }

    #[test]
    fn bounce_flips_only_the_crossing_axis() {
        let mut p = Vec2::new(10.5, 3.0);
        let mut v = Vec2::new(2.0, 1.0);
        bounce(&mut p, &mut v, &bounds());
        assert_eq!(p, Vec2::new(10.0, 3.0));
        assert_eq!(v, Vec2::new(-2.0, 1.0));

        let mut p = Vec2::new(0.0, -12.0);
        let mut v = Vec2::new(1.0, -3.0);
        bounce(&mut p, &mut v, &bounds());
        assert_eq!(p, Vec2::new(0.0, -10.0));
        assert_eq!(v, Vec2::new(1.0, 3.0));
    }

    #[test]
    fn lone_prey_moves_along_drag_reduced_velocity() {
        let params = PreyMovementParams {
            min_speed: 0.0,
            drag_factor: 0.2,
            movement_accuracy: 0.01,
        };
        let mut p = Vec2::ZERO;
        let mut v = Vec2::X;
        let mut t = Transform::default();

        step_prey(&mut p, &mut v, &mut t, Vec2::ZERO, &params, &bounds(), 0.5);

        // speed 1 - ½ · 0.2 · 1 = 0.9
        assert!((v - Vec2::new(0.9, 0.0)).length() < EPS);
        assert!((p - Vec2::new(0.45, 0.0)).length() < EPS);
        assert_eq!(t.position, p);
        assert!(t.rotation.abs() < EPS);
    }

    #[test]
    fn prey_keeps_min_speed() {
        let params = PreyMovementParams {
            min_speed: 3.0,
            drag_factor: 0.0,
            movement_accuracy: 0.01,
        };
        let mut p = Vec2::ZERO;
        let mut v = Vec2::new(0.0, 0.5);
        let mut t = Transform::default();

        step_prey(&mut p, &mut v, &mut t, Vec2::ZERO, &params, &bounds(), 1.0);

        assert!((v.length() - 3.0).abs() < EPS);
        assert!((t.rotation - std::f32::consts::FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn integrators_sum_every_force_buffer() {
        let mut positions = vec![Vec2::ZERO, Vec2::new(5.0, 5.0)];
        let mut velocities = vec![Vec2::new(3.0, 0.0), Vec2::new(0.0, 3.0)];
        let mut transforms = vec![Transform::default(); 2];
        let a = [Vec2::new(1.0, 0.0), Vec2::ZERO];
        let b = [Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0)];
        let params = PredatorMovementParams {
            min_speed: 0.0,
            max_speed: 100.0,
        };

        integrate_predators(
            &mut positions,
            &mut velocities,
            &mut transforms,
            &[&a, &b],
            &params,
            &bounds(),
            1.0,
        );

        assert_eq!(velocities, vec![Vec2::new(4.0, 1.0), Vec2::new(0.0, 2.0)]);
        assert_eq!(positions, vec![Vec2::new(4.0, 1.0), Vec2::new(5.0, 7.0)]);
        assert_eq!(transforms[1].position, Vec2::new(5.0, 7.0));
    }

    #[test]
    fn integrated_prey_stay_in_bounds() {
        let mut positions = vec![Vec2::new(9.9, 9.9), Vec2::new(-9.9, 0.0)];
        let mut velocities = vec![Vec2::new(5.0, 5.0), Vec2::new(-5.0, 0.0)];
        let mut transforms = vec![Transform::default(); 2];
        let params = PreyMovementParams::default();

        integrate_prey(
            &mut positions,
            &mut velocities,
            &mut transforms,
            &[],
            &params,
            &bounds(),
            1.0,
        );

        for p in &positions {
            assert!(bounds().contains(*p));
        }
        assert!(velocities[0].x < 0.0 && velocities[0].y < 0.0);
        assert!(velocities[1].x > 0.0);
    }
}

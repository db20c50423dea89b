//! Core 2-D predator/prey flocking simulation library.
//!
//! Main components:
//! - [`simulation`] - the two-phase frame scheduler.
//! - [`phases`] - index, neighbor, force and apply phases of a frame.
//! - [`quadtree`] - bucket quadtree used for range queries.
//! - [`neighbors`] - flat per-frame neighbor graph.
//! - [`steering`] - flocking rules, point forces, wander and intensity.
//! - [`motion`] - drag, speed limits and reflective bounds.
//! - [`population`] - per-species agent arrays.
//! - [`interaction`] - user spawn/attract/repel requests.
//! - [`config`] - parameter blocks and JSON loading.
//! - [`force_buffer`] - per-agent force accumulators.
//! - [`types`] - shared ids and geometry.

pub mod config;
pub mod force_buffer;
pub mod interaction;
pub mod motion;
pub mod neighbors;
pub mod phases;
pub mod population;
pub mod quadtree;
pub mod simulation;
pub mod steering;
pub mod types;

pub use config::{BehaviorParams, ConfigError, FlockConfig};
pub use simulation::Simulation;

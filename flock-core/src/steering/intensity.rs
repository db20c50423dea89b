//! Crowding intensity of each prey, used for coloring.

use crate::neighbors::NeighborGraph;
use rayon::prelude::*;

/// Crowding intensity in `[0, 1]` per prey, for coloring.
///
/// `count / saturation`, capped at 1. Only reads the neighbor graph, so it
/// runs alongside the force passes.
pub fn intensity(graph: &NeighborGraph, saturation: f32, out: &mut [f32]) {
    out.par_iter_mut().enumerate().for_each(|(i, value)| {
        *value = if saturation > 0.0 {
            (graph.count[i] as f32 / saturation).min(1.0)
        } else {
            1.0
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_at_one() {
        let graph = NeighborGraph {
            start: vec![0, 0, 2],
            count: vec![0, 2, 10],
            flat: vec![0; 12],
        };
        let mut out = vec![0.5; 3];
        intensity(&graph, 4.0, &mut out);
        assert_eq!(out, vec![0.0, 0.5, 1.0]);
    }
}

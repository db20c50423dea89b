//! Flattened per-agent neighbor lists.
//!
//! The graph is rebuilt every frame from a freshly built [`QuadTree`]. It
//! only guarantees that candidates fall inside a square around each agent;
//! steering behaviors apply their own radius and field-of-view filters.

use crate::{
    quadtree::QuadTree,
    types::{AgentId, Rect},
};
use glam::Vec2;

/// Compressed (CSR-style) neighbor lists.
///
/// `flat[start[i]..start[i] + count[i]]` holds the candidates of agent `i`
/// and never contains `i` itself.
#[derive(Debug, Default)]
pub struct NeighborGraph {
    pub start: Vec<usize>,
    pub count: Vec<usize>,
    pub flat: Vec<AgentId>,
}

impl NeighborGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the graph for every agent, one quadtree query at a time.
    ///
    /// Agents outside the tree's root were left out of the index; they get an
    /// empty list too, so the graph stays symmetric.
    ///
    /// This pass is serial: each query walks the shared tree and the
    /// per-agent output length is unknown until the query returns. The
    /// buffers keep their capacity between frames, so after warm-up a
    /// rebuild does not allocate unless the flock gets denser.
    ///
    /// ### Parameters
    /// - `tree` - Quadtree built from `positions` this frame.
    /// - `positions` - Agent positions; must match what the tree was built from.
    /// - `radius` - Largest perception radius of the consuming behaviors. The
    ///   query box has side `2 * radius`.
    pub fn build(&mut self, tree: &QuadTree, positions: &[Vec2], radius: f32) {
        let n = positions.len();
        self.start.clear();
        self.count.clear();
        self.flat.clear();
        self.start.reserve(n);
        self.count.reserve(n);

        let bounds = tree.bounds();
        let mut candidates = Vec::new();
        for (i, &p) in positions.iter().enumerate() {
            let start = self.flat.len();
            self.start.push(start);
            if !bounds.contains(p) {
                self.count.push(0);
                continue;
            }

            candidates.clear();
            let query = Rect::from_center_half_extent(p, radius);
            tree.query_range_into(&query, positions, &mut candidates);

            self.flat.extend(candidates.iter().copied().filter(|&j| j != i));
            self.count.push(self.flat.len() - start);
        }
    }

    /// Neighbor candidates of agent `id`.
    #[inline]
    pub fn neighbors(&self, id: AgentId) -> &[AgentId] {
        let s = self.start[id];
        &self.flat[s..s + self.count[id]]
    }

    pub fn len(&self) -> usize {
        self.start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }

    /// Total number of stored neighbor entries.
    pub fn total_neighbors(&self) -> usize {
        self.flat.len()
    }
}

//! Bucket quadtree over 2-D points.
//!
//! Nodes only store agent indices; positions are always looked up in the
//! caller's position slice. The tree is rebuilt from an empty root every
//! frame, so there is no removal or incremental update path.

use crate::types::{AgentId, NodeId, Rect};
use glam::Vec2;

#[derive(Debug)]
pub struct QuadNode {
    pub rect: Rect,
    pub points: Vec<AgentId>,
    /// Child node ids in south-west, south-east, north-west, north-east order.
    pub children: Option<[NodeId; 4]>,
}

impl QuadNode {
    fn new(rect: Rect, capacity: usize) -> Self {
        Self {
            rect,
            points: Vec::with_capacity(capacity),
            children: None,
        }
    }
}

#[derive(Debug)]
pub struct QuadTree {
    pub nodes: Vec<QuadNode>,
    capacity: usize,
    min_size: f32,
}

impl QuadTree {
    /// Creates a tree holding a single empty root covering `bounds`.
    ///
    /// ### Parameters
    /// - `bounds` - Rectangle of the root node; points outside are rejected.
    /// - `capacity` - Number of points a node holds before it subdivides.
    /// - `min_size` - Nodes whose smaller side is at or under this size never
    ///   subdivide and accept any number of points.
    pub fn new(bounds: Rect, capacity: usize, min_size: f32) -> Self {
        Self {
            nodes: vec![QuadNode::new(bounds, capacity)],
            capacity,
            min_size,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[0].rect
    }

    /// Discards every node and starts again from an empty root over `bounds`.
    pub fn reset(&mut self, bounds: Rect) {
        self.nodes.clear();
        self.nodes.push(QuadNode::new(bounds, self.capacity));
    }

    /// Rebuilds the tree from scratch and inserts every position.
    ///
    /// ### Returns
    /// The number of points that fell outside the root and were dropped.
    pub fn build(&mut self, positions: &[Vec2]) -> usize {
        let bounds = self.bounds();
        self.reset(bounds);
        positions
            .iter()
            .enumerate()
            .filter(|&(i, &p)| !self.insert(i, p))
            .count()
    }

    /// Inserts `index` at `point`.
    ///
    /// Returns `false` if the point lies outside the root rectangle. On a
    /// shared quadrant edge the point goes to the first child (in
    /// south-west, south-east, north-west, north-east order) that contains it.
    pub fn insert(&mut self, index: AgentId, point: Vec2) -> bool {
        self.insert_at(0, index, point)
    }

    fn insert_at(&mut self, id: NodeId, index: AgentId, point: Vec2) -> bool {
        if !self.nodes[id].rect.contains(point) {
            return false;
        }

        if self.nodes[id].points.len() < self.capacity || self.is_at_floor(id) {
            self.nodes[id].points.push(index);
            return true;
        }

        let children = match self.nodes[id].children {
            Some(children) => children,
            None => self.subdivide(id),
        };

        children
            .into_iter()
            .find(|&child| self.nodes[child].rect.contains(point))
            .is_some_and(|child| self.insert_at(child, index, point))
    }

    fn is_at_floor(&self, id: NodeId) -> bool {
        self.nodes[id].rect.size().min_element() <= self.min_size
    }

    fn subdivide(&mut self, id: NodeId) -> [NodeId; 4] {
        let quads = self.nodes[id].rect.quadrants();
        let first = self.nodes.len();
        for rect in quads {
            self.nodes.push(QuadNode::new(rect, self.capacity));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[id].children = Some(children);
        children
    }

    /// Returns all indices whose current position lies inside `range`.
    ///
    /// ### Parameters
    /// - `range` - Query rectangle (boundary-inclusive).
    /// - `positions` - The same positions the tree was built from; they must
    ///   not change between build and query.
    pub fn query_range(&self, range: &Rect, positions: &[Vec2]) -> Vec<AgentId> {
        let mut out = Vec::new();
        self.query_range_into(range, positions, &mut out);
        out
    }

    /// Same as [`QuadTree::query_range`], appending into `out`.
    pub fn query_range_into(&self, range: &Rect, positions: &[Vec2], out: &mut Vec<AgentId>) {
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.rect.overlaps(range) {
                continue;
            }
            out.extend(
                node.points
                    .iter()
                    .copied()
                    .filter(|&i| range.contains(positions[i])),
            );
            if let Some(children) = node.children {
                stack.extend(children.into_iter().rev());
            }
        }
    }

    /// Rectangles of every node, for debug overlays.
    pub fn rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.nodes.iter().map(|n| n.rect)
    }

    /// Total number of stored points.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    fn world() -> Rect {
        Rect::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0))
    }

    #[test]
    fn insert_rejects_points_outside_root() {
        let mut tree = QuadTree::new(world(), 4, 0.5);
        assert!(!tree.insert(0, Vec2::new(11.0, 0.0)));
        assert!(tree.insert(1, Vec2::new(10.0, 10.0)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn node_subdivides_once_capacity_is_reached() {
        let mut tree = QuadTree::new(world(), 2, 0.5);
        tree.insert(0, Vec2::new(-5.0, -5.0));
        tree.insert(1, Vec2::new(5.0, 5.0));
        assert!(tree.nodes[0].children.is_none());

        tree.insert(2, Vec2::new(5.0, -5.0));
        let children = tree.nodes[0].children.expect("root should subdivide");

        // Existing points stay in the root; the new one lands in the south-east child.
        assert_eq!(tree.nodes[0].points, vec![0, 1]);
        assert_eq!(tree.nodes[children[1]].points, vec![2]);
    }

    #[test]
    fn shared_edge_goes_to_first_accepting_child() {
        let mut tree = QuadTree::new(world(), 0, 0.5);
        // The center is on the boundary of all four quadrants.
        assert!(tree.insert(7, Vec2::ZERO));

        let holder = tree
            .nodes
            .iter()
            .position(|n| n.points.contains(&7))
            .unwrap();
        assert_eq!(tree.len(), 1);
        // Capacity zero subdivides down to the floor. The first hop takes the
        // south-west quadrant, every later one its north-east corner.
        assert_ne!(holder, 0);
        assert_eq!(tree.nodes[holder].rect.max, Vec2::ZERO);
        assert!(tree.nodes[holder].rect.size().x <= 0.5);
    }

    #[test]
    fn min_size_floor_stops_subdivision() {
        let mut tree = QuadTree::new(Rect::new(Vec2::ZERO, Vec2::ONE), 1, 1.0);
        for i in 0..10 {
            assert!(tree.insert(i, Vec2::splat(0.5)));
        }
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].points.len(), 10);
    }

    #[test]
    fn query_returns_every_contained_point_exactly_once() {
        let mut rng = SmallRng::seed_from_u64(7);
        let positions: Vec<Vec2> = (0..500)
            .map(|_| {
                let x = rng.random_range(-10.0..=10.0);
                let y = rng.random_range(-10.0..=10.0);
                Vec2::new(x, y)
            })
            .collect();

        let mut tree = QuadTree::new(world(), 4, 0.25);
        assert_eq!(tree.build(&positions), 0);

        let mut all = tree.query_range(&world(), &positions);
        all.sort_unstable();
        assert_eq!(all, (0..positions.len()).collect::<Vec<_>>());

        let range = Rect::new(Vec2::new(-3.0, -1.0), Vec2::new(4.0, 6.0));
        let mut hits = tree.query_range(&range, &positions);
        hits.sort_unstable();
        let mut expected: Vec<usize> = (0..positions.len())
            .filter(|&i| range.contains(positions[i]))
            .collect();
        expected.sort_unstable();
        assert_eq!(hits, expected);
    }

    #[test]
    fn repeated_queries_are_idempotent() {
        let positions = vec![
            Vec2::new(1.0, 1.0),
            Vec2::new(-2.0, 3.0),
            Vec2::new(2.5, -7.0),
            Vec2::new(0.0, 0.0),
        ];
        let mut tree = QuadTree::new(world(), 1, 0.1);
        tree.build(&positions);

        let range = Rect::from_center_half_extent(Vec2::ZERO, 3.0);
        let mut a = tree.query_range(&range, &positions);
        let mut b = tree.query_range(&range, &positions);
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert_eq!(a, vec![0, 1, 3]);
    }

    #[test]
    fn build_discards_previous_frame_and_counts_drops() {
        let mut tree = QuadTree::new(world(), 2, 0.5);
        tree.build(&[Vec2::ZERO, Vec2::ONE, Vec2::splat(2.0), Vec2::splat(3.0)]);
        assert!(tree.nodes.len() > 1);

        let dropped = tree.build(&[Vec2::new(50.0, 0.0), Vec2::ZERO]);
        assert_eq!(dropped, 1);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.len(), 1);
    }
}

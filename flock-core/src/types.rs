use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for an agent within one population.
///
/// This is an index into the population's parallel arrays, and is only
/// meaningful within a single frame (spawns may reallocate storage, but never
/// renumber existing agents).
pub type AgentId = usize;

/// Identifier for a node in a [`crate::quadtree::QuadTree`].
///
/// This is an index into the tree's node arena, and is only meaningful
/// until the next rebuild.
pub type NodeId = usize;

/// Axis-aligned rectangle with inclusive bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square rectangle centered on `center` with the given half side.
    pub fn from_center_half_extent(center: Vec2, half: f32) -> Self {
        Self {
            min: center - Vec2::splat(half),
            max: center + Vec2::splat(half),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns `true` if the rectangle has a positive area.
    pub fn is_valid(&self) -> bool {
        self.max.x > self.min.x && self.max.y > self.min.y
    }

    /// Boundary-inclusive point containment.
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Boundary-inclusive overlap test; rectangles that only touch overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Splits the rectangle into four equal quadrants.
    ///
    /// The order is fixed: south-west, south-east, north-west, north-east
    /// (with `+y` pointing north). Quadtree insertion relies on this order to
    /// break ties for points on shared edges.
    pub fn quadrants(&self) -> [Rect; 4] {
        let c = self.center();
        [
            Rect::new(self.min, c),
            Rect::new(Vec2::new(c.x, self.min.y), Vec2::new(self.max.x, c.y)),
            Rect::new(Vec2::new(self.min.x, c.y), Vec2::new(c.x, self.max.y)),
            Rect::new(c, self.max),
        ]
    }
}

/// Externally visible transform of one agent (its "scene handle").
///
/// Written only by the motion integrators; renderers read it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Heading in radians, measured counter-clockwise from `+x`.
    pub rotation: f32,
}

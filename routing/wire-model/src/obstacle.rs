//! Obstacles wires must route around.

use wire_geom::{Compass, GridPoint, GridRect};

use crate::arena::{Key, Pool};
use crate::vertex::{Vertex, VertexId};

/// Typed key for an [`Obstacle`] in the router's obstacle pool.
pub type ObstacleId = Key<Obstacle>;

/// An axis-aligned rectangle wires may not cross, with one shared [`Vertex`]
/// per corner.
///
/// The corner vertices sit on the boundary ring: the top-left corner at
/// `(x, y)` and the bottom-right corner at `(right - 1, bottom - 1)`, so all
/// four are contained by the bounds. Every wire that bends around this
/// obstacle bends at these same four vertices.
///
/// `exclude` is transient per-wire state: while one wire is being solved, the
/// obstacles containing its endpoints are excluded from blocking tests so the
/// wire can escape them.
pub struct Obstacle {
    /// The obstacle's bounds.
    pub bounds: GridRect,
    /// Corner vertex at `(x, y)`.
    pub top_left: VertexId,
    /// Corner vertex at `(right - 1, y)`.
    pub top_right: VertexId,
    /// Corner vertex at `(x, bottom - 1)`.
    pub bottom_left: VertexId,
    /// Corner vertex at `(right - 1, bottom - 1)`.
    pub bottom_right: VertexId,
    /// Center of the bounds, used to orient bend labels.
    pub center: GridPoint,
    /// Transient flag: ignore this obstacle in blocking tests for the wire
    /// currently being solved.
    pub exclude: bool,
}

impl Obstacle {
    /// Creates an obstacle for `bounds`, allocating its four corner vertices
    /// in `vertices`. `id` is the key this obstacle will live under (see
    /// [`Pool::insert_with`]).
    #[must_use]
    pub fn new(bounds: GridRect, vertices: &mut Pool<Vertex>, id: ObstacleId) -> Self {
        let top_left = vertices.insert(Vertex::corner(
            GridPoint::new(bounds.x, bounds.y),
            id,
            Compass::NORTH_WEST,
        ));
        let top_right = vertices.insert(Vertex::corner(
            GridPoint::new(bounds.right() - 1, bounds.y),
            id,
            Compass::NORTH_EAST,
        ));
        let bottom_left = vertices.insert(Vertex::corner(
            GridPoint::new(bounds.x, bounds.bottom() - 1),
            id,
            Compass::SOUTH_WEST,
        ));
        let bottom_right = vertices.insert(Vertex::corner(
            GridPoint::new(bounds.right() - 1, bounds.bottom() - 1),
            id,
            Compass::SOUTH_EAST,
        ));

        Self {
            bounds,
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            center: bounds.center(),
            exclude: false,
        }
    }

    /// The four corner vertices, top-left first, reading order.
    #[must_use]
    pub const fn corners(&self) -> [VertexId; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Strict interior containment: excludes the one-cell boundary ring the
    /// corner vertices sit on.
    ///
    /// # Example
    ///
    /// ```
    /// use wire_geom::{GridPoint, GridRect};
    /// use wire_model::{Obstacle, Pool};
    ///
    /// let mut vertices = Pool::new();
    /// let mut obstacles = Pool::new();
    /// let id = obstacles.insert_with(|id| {
    ///     Obstacle::new(GridRect::new(0, 0, 4, 4), &mut vertices, id)
    /// });
    /// let obstacle = &obstacles[id];
    ///
    /// assert!(obstacle.contains_proper(GridPoint::new(2, 2)));
    /// assert!(!obstacle.contains_proper(GridPoint::new(0, 2))); // boundary ring
    /// assert!(!obstacle.contains_proper(GridPoint::new(3, 3))); // corner cell
    /// ```
    #[must_use]
    pub const fn contains_proper(&self, p: GridPoint) -> bool {
        p.x > self.bounds.x
            && p.x < self.bounds.x + self.bounds.width - 1
            && p.y > self.bounds.y
            && p.y < self.bounds.y + self.bounds.height - 1
    }
}

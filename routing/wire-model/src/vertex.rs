//! Vertices of the visibility graph.

use std::collections::HashMap;

use wire_geom::{Compass, GridPoint, GridRect};

use crate::arena::Key;
use crate::obstacle::ObstacleId;
use crate::path::PathId;

/// Typed key for a [`Vertex`] in the router's vertex pool.
pub type VertexId = Key<Vertex>;

/// Which way a wire bends at a corner vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BendKind {
    /// Not yet labeled this solve.
    #[default]
    NotSet,
    /// The wire bends toward the owning obstacle's center.
    Innie,
    /// The wire bends away from the owning obstacle's center.
    Outie,
}

/// A corner of an obstacle, or an endpoint of a wire.
///
/// A vertex is a grid point plus the state the solve pipeline threads through
/// it. The four corner vertices of an obstacle are shared by every wire that
/// bends there; the pipeline relies on that sharing, so the state mutated
/// here is visible across wires by design.
///
/// Two coordinate sets are kept: `orig` never moves, while `pos` is displaced
/// outward during grow passes ([`Vertex::grow`]) and restored afterward
/// ([`Vertex::shrink`]).
pub struct Vertex {
    /// Fixed coordinates the vertex was created at.
    pub orig: GridPoint,
    /// Working coordinates; equal to `orig` except inside a grow pass.
    pub pos: GridPoint,
    /// Owning obstacle, or `None` for wire endpoints.
    pub obstacle: Option<ObstacleId>,
    /// Which corner of the owning obstacle this is; exactly one of
    /// `NORTH`/`SOUTH` combined with exactly one of `EAST`/`WEST` for corner
    /// vertices, `NONE` for endpoints.
    pub corner: Compass,

    // Shortest-path state, valid for the wire currently being searched.
    /// Adjacent vertices in the current visibility graph.
    pub neighbors: Vec<VertexId>,
    /// Dijkstra permanent flag.
    pub is_permanent: bool,
    /// Predecessor in the shortest-path tree.
    pub label: Option<VertexId>,
    /// Accumulated cost from the search start.
    pub cost: f64,

    // Fan-out state, valid across wires within one solve.
    /// INNIE/OUTIE label set while labeling wires.
    pub kind: BendKind,
    /// Running use counter while materializing bent points.
    pub count: i32,
    /// Number of wires bending at this vertex.
    pub total_count: i32,
    /// Distance to the nearest foreign obstacle; `0` means not yet found.
    pub nearest_obstacle: i32,
    /// Whether the nearest-obstacle scan already ran this solve.
    pub nearest_obstacle_checked: bool,
    /// Outward displacement applied per use when bending wires.
    pub offset: f64,
    /// Wires that bend at this vertex.
    pub paths: Vec<PathId>,
    /// Bend-angle key per wire, cached while labeling and read when
    /// ordering.
    pub cached_cosines: HashMap<PathId, f64>,
}

impl Vertex {
    /// Creates an endpoint vertex with no owning obstacle.
    #[must_use]
    pub fn endpoint(at: GridPoint) -> Self {
        Self::new(at, None, Compass::NONE)
    }

    /// Creates a corner vertex on the given obstacle.
    #[must_use]
    pub fn corner(at: GridPoint, obstacle: ObstacleId, corner: Compass) -> Self {
        Self::new(at, Some(obstacle), corner)
    }

    fn new(at: GridPoint, obstacle: Option<ObstacleId>, corner: Compass) -> Self {
        Self {
            orig: at,
            pos: at,
            obstacle,
            corner,
            neighbors: Vec::new(),
            is_permanent: false,
            label: None,
            cost: 0.0,
            kind: BendKind::NotSet,
            count: 0,
            total_count: 0,
            nearest_obstacle: 0,
            nearest_obstacle_checked: false,
            offset: 0.0,
            paths: Vec::new(),
            cached_cosines: HashMap::new(),
        }
    }

    /// Records that `path` bends at this vertex with the given bend-angle
    /// key.
    pub fn add_path(&mut self, path: PathId, cosine: f64) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
        self.cached_cosines.insert(path, cosine);
    }

    /// Produces the bent point for one use of this corner.
    ///
    /// The point is displaced from the working position by `modifier` times
    /// the vertex offset, along the corner's outward direction. The float
    /// displacement is truncated back onto the integer grid per axis.
    #[must_use]
    pub fn bend(&self, modifier: i32) -> GridPoint {
        let d = f64::from(modifier) * self.offset;
        let y = if self.corner.intersects(Compass::NORTH) {
            f64::from(self.pos.y) - d
        } else {
            f64::from(self.pos.y) + d
        };
        let x = if self.corner.intersects(Compass::EAST) {
            f64::from(self.pos.x) + d
        } else {
            f64::from(self.pos.x) - d
        };
        #[allow(clippy::cast_possible_truncation)]
        GridPoint::new(x as i32, y as i32)
    }

    /// Displaces the working position outward to the furthest offset wires
    /// will occupy at this corner.
    ///
    /// Paired with [`Vertex::shrink`]; grow followed by shrink restores the
    /// working position exactly.
    pub fn grow(&mut self, spacing: i32) {
        let modifier = if self.nearest_obstacle == 0 {
            self.total_count * spacing
        } else {
            self.nearest_obstacle / 2 - 1
        };

        if self.corner.intersects(Compass::NORTH) {
            self.pos.y -= modifier;
        } else {
            self.pos.y += modifier;
        }
        if self.corner.intersects(Compass::EAST) {
            self.pos.x += modifier;
        } else {
            self.pos.x -= modifier;
        }
    }

    /// Restores the working position to the original coordinates.
    pub fn shrink(&mut self) {
        self.pos = self.orig;
    }

    /// Recomputes the per-use offset from the nearest-obstacle distance.
    ///
    /// The available half-gap is split evenly between the wires using this
    /// corner, in integer arithmetic, so wires squeeze together uniformly
    /// when a neighboring obstacle leaves no room for the default spacing.
    pub fn update_offset(&mut self) {
        if self.nearest_obstacle != 0 {
            self.offset = f64::from((self.nearest_obstacle / 2 - 1) / self.total_count);
        }
    }

    /// The region wires travel through at this corner: the box between the
    /// original and the (possibly grown) working position, padded by
    /// `extra` away from the obstacle.
    #[must_use]
    pub fn deformed_rect(&self, extra: i32) -> GridRect {
        let mut rect = GridRect::new(0, 0, 0, 0);

        if self.corner.intersects(Compass::NORTH) {
            rect.y = self.pos.y - extra;
            rect.height = self.orig.y - self.pos.y + extra;
        } else {
            rect.y = self.orig.y;
            rect.height = self.pos.y - self.orig.y + extra;
        }
        if self.corner.intersects(Compass::EAST) {
            rect.x = self.orig.x;
            rect.width = self.pos.x - self.orig.x + extra;
        } else {
            rect.x = self.pos.x - extra;
            rect.width = self.orig.x - self.pos.x + extra;
        }

        rect
    }

    /// Clears every per-solve field.
    ///
    /// `default_offset` is the router spacing for corner vertices and `0`
    /// for endpoints.
    pub fn full_reset(&mut self, default_offset: f64) {
        self.total_count = 0;
        self.kind = BendKind::NotSet;
        self.count = 0;
        self.cost = 0.0;
        self.offset = default_offset;
        self.nearest_obstacle = 0;
        self.label = None;
        self.nearest_obstacle_checked = false;
        self.is_permanent = false;
        self.neighbors.clear();
        self.cached_cosines.clear();
        self.paths.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::arena::Pool;
    use crate::obstacle::Obstacle;

    fn north_east_vertex() -> Vertex {
        let mut obstacles: Pool<Obstacle> = Pool::new();
        let mut vertices: Pool<Vertex> = Pool::new();
        let id = obstacles.insert_with(|id| {
            Obstacle::new(wire_geom::GridRect::new(0, 0, 10, 10), &mut vertices, id)
        });
        let mut v = Vertex::corner(GridPoint::new(9, 0), id, Compass::NORTH_EAST);
        v.offset = 4.0;
        v
    }

    #[test]
    fn test_bend_moves_outward() {
        let v = north_east_vertex();
        assert_eq!(v.bend(1), GridPoint::new(13, -4));
        assert_eq!(v.bend(2), GridPoint::new(17, -8));
    }

    #[test]
    fn test_bend_truncates_toward_zero() {
        let mut v = north_east_vertex();
        v.offset = 1.5;
        // 9 + 1.5 = 10.5 -> 10, 0 - 1.5 = -1.5 -> -1
        assert_eq!(v.bend(1), GridPoint::new(10, -1));
    }

    #[test]
    fn test_grow_then_shrink_roundtrips() {
        let mut v = north_east_vertex();
        v.total_count = 3;
        let before = v.pos;
        v.grow(4);
        assert_eq!(v.pos, GridPoint::new(9 + 12, -12));
        v.shrink();
        assert_eq!(v.pos, before);
    }

    #[test]
    fn test_grow_uses_constrained_distance_when_set() {
        let mut v = north_east_vertex();
        v.total_count = 3;
        v.nearest_obstacle = 10;
        v.grow(4);
        // 10 / 2 - 1 = 4 regardless of the count.
        assert_eq!(v.pos, GridPoint::new(13, -4));
    }

    #[test]
    fn test_update_offset_integer_division() {
        let mut v = north_east_vertex();
        v.total_count = 2;
        v.nearest_obstacle = 11;
        v.update_offset();
        // (11 / 2 - 1) / 2 = 4 / 2 = 2 in integer arithmetic.
        assert_eq!(v.offset, 2.0);

        v.nearest_obstacle = 9;
        v.update_offset();
        // (9 / 2 - 1) / 2 = 3 / 2 = 1.
        assert_eq!(v.offset, 1.0);
    }

    #[test]
    fn test_update_offset_noop_when_unconstrained() {
        let mut v = north_east_vertex();
        v.offset = 4.0;
        v.nearest_obstacle = 0;
        v.update_offset();
        assert_eq!(v.offset, 4.0);
    }

    #[test]
    fn test_deformed_rect_after_grow() {
        let mut v = north_east_vertex();
        v.total_count = 1;
        v.grow(4);
        let rect = v.deformed_rect(2);
        // Grown position is (13, -4); region spans from the original corner
        // outward, padded by 2.
        assert_eq!(rect, GridRect::new(9, -6, 6, 6));
    }

    #[test]
    fn test_full_reset_clears_state() {
        let mut v = north_east_vertex();
        v.total_count = 5;
        v.kind = BendKind::Outie;
        v.cost = 12.0;
        v.nearest_obstacle = 9;
        v.is_permanent = true;
        v.full_reset(4.0);
        assert_eq!(v.total_count, 0);
        assert_eq!(v.kind, BendKind::NotSet);
        assert_eq!(v.cost, 0.0);
        assert_eq!(v.nearest_obstacle, 0);
        assert_eq!(v.offset, 4.0);
        assert!(!v.is_permanent);
        assert!(v.neighbors.is_empty());
    }

    #[test]
    fn test_add_path_deduplicates_but_updates_cosine() {
        let mut v = north_east_vertex();
        let mut paths: Pool<crate::path::Path> = Pool::new();
        let mut vertices: Pool<Vertex> = Pool::new();
        let s = vertices.insert(Vertex::endpoint(GridPoint::new(0, 0)));
        let e = vertices.insert(Vertex::endpoint(GridPoint::new(1, 1)));
        let p = paths.insert(crate::path::Path::new(s, e));
        v.add_path(p, 0.5);
        v.add_path(p, -0.5);
        assert_eq!(v.paths.len(), 1);
        assert_eq!(v.cached_cosines[&p], -0.5);
    }
}

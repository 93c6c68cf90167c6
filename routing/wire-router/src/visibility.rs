//! Visibility graph construction.
//!
//! Each wire gets a private visibility graph, grown lazily: the first work
//! item is the straight start-to-end segment, and whenever a candidate
//! segment turns out to be blocked, the blocking obstacle joins the graph
//! and contributes new candidates - its perimeter, corner-to-corner
//! segments against every obstacle already in the graph, and attachment
//! segments from both wire endpoints.
//!
//! Candidate segments are pruned against the wire's threshold oval (the
//! ellipse with foci at the endpoints) before any intersection test runs,
//! which keeps the graph small on large diagrams.

use wire_geom::{lines_intersect, Compass, GridPoint};
use wire_model::{Obstacle, ObstacleId, PathId, RouteError, Seg, VertexId};

use crate::router::Router;

/// One pending candidate segment.
///
/// A segment carries up to two obstacles to skip during its blocking test:
/// the obstacles whose corners the segment was built from. A segment is
/// entitled to touch the corners it exists because of.
struct WorkItem {
    seg: Seg,
    exclude_a: Option<ObstacleId>,
    exclude_b: Option<ObstacleId>,
}

impl WorkItem {
    const fn free(seg: Seg) -> Self {
        Self {
            seg,
            exclude_a: None,
            exclude_b: None,
        }
    }

    const fn excluding(seg: Seg, a: ObstacleId) -> Self {
        Self {
            seg,
            exclude_a: Some(a),
            exclude_b: None,
        }
    }

    const fn excluding_pair(seg: Seg, a: ObstacleId, b: ObstacleId) -> Self {
        Self {
            seg,
            exclude_a: Some(a),
            exclude_b: Some(b),
        }
    }
}

/// Returns `true` if the segment `a-b` may not pass the obstacle: it
/// crosses one of the corner-to-corner diagonals, or ends strictly inside.
fn blocks(obstacle: &Obstacle, a: GridPoint, b: GridPoint) -> bool {
    let bounds = obstacle.bounds;
    let (left, top) = (bounds.x, bounds.y);
    let (right, bottom) = (bounds.right() - 1, bounds.bottom() - 1);

    lines_intersect(left, top, right, bottom, a.x, a.y, b.x, b.y)
        || lines_intersect(left, bottom, right, top, a.x, a.y, b.x, b.y)
        || obstacle.contains_proper(a)
        || obstacle.contains_proper(b)
}

/// Returns `true` if segment `a-b` crosses the chosen corner-to-corner
/// diagonal of `obstacle`: the anti diagonal (bottom-left to top-right)
/// when `anti`, the main diagonal otherwise.
fn diagonal_hit(obstacle: &Obstacle, anti: bool, a: GridPoint, b: GridPoint) -> bool {
    let bounds = obstacle.bounds;
    let (left, top) = (bounds.x, bounds.y);
    let (right, bottom) = (bounds.right() - 1, bounds.bottom() - 1);
    if anti {
        lines_intersect(left, bottom, right, top, a.x, a.y, b.x, b.y)
    } else {
        lines_intersect(left, top, right, bottom, a.x, a.y, b.x, b.y)
    }
}

impl Router {
    /// Builds the wire's visibility graph and searches it.
    ///
    /// Returns `Ok(false)` when no route was found; the caller decides
    /// whether to retry without pruning.
    pub(crate) fn generate_shortest_path(&mut self, path_id: PathId) -> Result<bool, RouteError> {
        self.create_visibility_graph(path_id)?;

        if self.paths[path_id].visible_vertices.is_empty() {
            return Ok(false);
        }

        Ok(self.determine_shortest_path(path_id))
    }

    fn create_visibility_graph(&mut self, path_id: PathId) -> Result<(), RouteError> {
        let (start, end) = {
            let path = &self.paths[path_id];
            (path.start, path.end)
        };
        let mut stack = vec![WorkItem::free(Seg::new(start, end))];

        while let Some(item) = stack.pop() {
            self.add_segment(path_id, &item, &mut stack)?;
        }
        Ok(())
    }

    /// Admits a candidate segment, or grows the graph by its first blocking
    /// obstacle.
    fn add_segment(
        &mut self,
        path_id: PathId,
        item: &WorkItem,
        stack: &mut Vec<WorkItem>,
    ) -> Result<(), RouteError> {
        if self.outside_threshold(path_id, item.seg) {
            return Ok(());
        }

        let a = self.vertices[item.seg.start].pos;
        let b = self.vertices[item.seg.end].pos;

        let mut blocking = None;
        for &oid in &self.obstacle_order {
            if Some(oid) == item.exclude_a || Some(oid) == item.exclude_b {
                continue;
            }
            let obstacle = &self.obstacles[oid];
            if obstacle.exclude {
                continue;
            }
            if blocks(obstacle, a, b) {
                blocking = Some(oid);
                break;
            }
        }

        match blocking {
            Some(oid) => {
                if !self.paths[path_id].visible_obstacles.contains(oid) {
                    self.add_obstacle_to_graph(path_id, oid, stack)?;
                }
            }
            None => self.link_vertices(path_id, item.seg),
        }
        Ok(())
    }

    /// True when either segment endpoint leaves the wire's threshold oval.
    /// A zero threshold disables pruning.
    fn outside_threshold(&self, path_id: PathId, seg: Seg) -> bool {
        let path = &self.paths[path_id];
        if path.threshold == 0.0 {
            return false;
        }
        let start = self.vertices[path.start].pos;
        let end = self.vertices[path.end].pos;
        let a = self.vertices[seg.start].pos;
        let b = self.vertices[seg.end].pos;

        b.distance(end) + b.distance(start) > path.threshold
            || a.distance(end) + a.distance(start) > path.threshold
    }

    /// Brings an obstacle into the wire's graph and queues every candidate
    /// segment it contributes.
    fn add_obstacle_to_graph(
        &mut self,
        path_id: PathId,
        new_id: ObstacleId,
        stack: &mut Vec<WorkItem>,
    ) -> Result<(), RouteError> {
        self.paths[path_id].visible_obstacles.insert(new_id);

        let visible: Vec<ObstacleId> = self.paths[path_id]
            .visible_obstacles
            .as_slice()
            .to_vec();
        for current in visible {
            if current != new_id {
                self.add_segments_between(path_id, new_id, current, stack);
            }
        }

        self.add_perimeter_segments(new_id, stack);

        let (start, end) = {
            let path = &self.paths[path_id];
            (path.start, path.end)
        };
        self.add_vertex_obstacle_segments(start, new_id, stack)?;
        self.add_vertex_obstacle_segments(end, new_id, stack)?;
        Ok(())
    }

    /// Queues the four edges of the obstacle, each excluded from testing
    /// against its own obstacle.
    fn add_perimeter_segments(&mut self, oid: ObstacleId, stack: &mut Vec<WorkItem>) {
        let o = &self.obstacles[oid];
        let edges = [
            Seg::new(o.top_left, o.top_right),
            Seg::new(o.top_right, o.bottom_right),
            Seg::new(o.bottom_right, o.bottom_left),
            Seg::new(o.bottom_left, o.top_left),
        ];
        for seg in edges {
            stack.push(WorkItem::excluding(seg, oid));
        }
    }

    /// Queues candidate segments between two obstacles, chosen by their
    /// relative position so the candidates hug the pair's outer hull.
    fn add_segments_between(
        &mut self,
        path_id: PathId,
        source: ObstacleId,
        target: ObstacleId,
        stack: &mut Vec<WorkItem>,
    ) {
        let s = self.obstacles[source].bounds;
        let t = self.obstacles[target].bounds;

        if s.intersects(t) {
            self.add_all_segments_between(path_id, source, target, stack);
        } else if t.bottom() - 1 < s.y {
            self.add_segments_target_above(source, target, stack);
        } else if s.bottom() - 1 < t.y {
            self.add_segments_target_above(target, source, stack);
        } else if t.right() - 1 < s.x {
            self.add_segments_target_beside(source, target, stack);
        } else {
            self.add_segments_target_beside(target, source, stack);
        }
    }

    /// Intersecting obstacles: all four corresponding-corner segments, plus
    /// both crossover segments along any exactly aligned side.
    fn add_all_segments_between(
        &mut self,
        path_id: PathId,
        o1: ObstacleId,
        o2: ObstacleId,
        stack: &mut Vec<WorkItem>,
    ) {
        let (a, b) = (self.corner_ids(o1), self.corner_ids(o2));
        let (s, t) = (self.obstacles[o1].bounds, self.obstacles[o2].bounds);

        self.add_connecting_segment(path_id, Seg::new(a.bl, b.bl), o1, o2, false, false, stack);
        self.add_connecting_segment(path_id, Seg::new(a.br, b.br), o1, o2, true, true, stack);
        self.add_connecting_segment(path_id, Seg::new(a.tl, b.tl), o1, o2, true, true, stack);
        self.add_connecting_segment(path_id, Seg::new(a.tr, b.tr), o1, o2, false, false, stack);

        if s.bottom() == t.bottom() {
            self.add_connecting_segment(path_id, Seg::new(a.bl, b.br), o1, o2, false, true, stack);
            self.add_connecting_segment(path_id, Seg::new(a.br, b.bl), o1, o2, true, false, stack);
        }
        if s.y == t.y {
            self.add_connecting_segment(path_id, Seg::new(a.tl, b.tr), o1, o2, true, false, stack);
            self.add_connecting_segment(path_id, Seg::new(a.tr, b.tl), o1, o2, false, true, stack);
        }
        if s.x == t.x {
            self.add_connecting_segment(path_id, Seg::new(a.bl, b.tl), o1, o2, false, true, stack);
            self.add_connecting_segment(path_id, Seg::new(a.tl, b.bl), o1, o2, true, false, stack);
        }
        if s.right() == t.right() {
            self.add_connecting_segment(path_id, Seg::new(a.br, b.tr), o1, o2, true, false, stack);
            self.add_connecting_segment(path_id, Seg::new(a.tr, b.br), o1, o2, false, true, stack);
        }
    }

    /// Queues a segment between two intersecting obstacles after checking
    /// it against one chosen diagonal of each (the overlap makes the full
    /// blocking test too strict).
    #[allow(clippy::too_many_arguments)]
    fn add_connecting_segment(
        &mut self,
        path_id: PathId,
        seg: Seg,
        o1: ObstacleId,
        o2: ObstacleId,
        anti1: bool,
        anti2: bool,
        stack: &mut Vec<WorkItem>,
    ) {
        if self.outside_threshold(path_id, seg) {
            return;
        }
        let a = self.vertices[seg.start].pos;
        let b = self.vertices[seg.end].pos;
        if self.obstacles[o2].contains_proper(a) || self.obstacles[o1].contains_proper(b) {
            return;
        }
        if diagonal_hit(&self.obstacles[o1], anti1, a, b)
            || diagonal_hit(&self.obstacles[o2], anti2, a, b)
        {
            return;
        }
        stack.push(WorkItem::excluding_pair(seg, o1, o2));
    }

    /// `target` lies strictly above `source`: queue the outer-bounding
    /// segments on each flank plus the diagonal that hugs the pair.
    fn add_segments_target_above(
        &mut self,
        source: ObstacleId,
        target: ObstacleId,
        stack: &mut Vec<WorkItem>,
    ) {
        let (s, t) = (self.corner_ids(source), self.corner_ids(target));
        let (sb, tb) = (
            self.obstacles[source].bounds,
            self.obstacles[target].bounds,
        );

        let (seg, seg2) = if tb.x > sb.x {
            let crossover = if tb.x < sb.right() - 1 {
                Seg::new(s.tr, t.bl)
            } else {
                Seg::new(s.br, t.tl)
            };
            (Seg::new(s.tl, t.tl), crossover)
        } else if sb.x == tb.x {
            (Seg::new(s.tl, t.bl), Seg::new(s.tr, t.bl))
        } else {
            (Seg::new(s.bl, t.bl), Seg::new(s.tr, t.bl))
        };
        stack.push(WorkItem::excluding_pair(seg, source, target));
        stack.push(WorkItem::excluding_pair(seg2, source, target));

        let (seg, seg2) = if tb.right() < sb.right() {
            let crossover = if tb.right() - 1 > sb.x {
                Seg::new(s.tl, t.br)
            } else {
                Seg::new(s.bl, t.tr)
            };
            (Seg::new(s.tr, t.tr), crossover)
        } else if sb.right() == tb.right() {
            (Seg::new(s.tr, t.br), Seg::new(s.tl, t.br))
        } else {
            (Seg::new(s.br, t.br), Seg::new(s.tl, t.br))
        };
        stack.push(WorkItem::excluding_pair(seg, source, target));
        stack.push(WorkItem::excluding_pair(seg2, source, target));
    }

    /// `target` lies strictly left of `source`: the transposed flank rule.
    fn add_segments_target_beside(
        &mut self,
        source: ObstacleId,
        target: ObstacleId,
        stack: &mut Vec<WorkItem>,
    ) {
        let (s, t) = (self.corner_ids(source), self.corner_ids(target));
        let (sb, tb) = (
            self.obstacles[source].bounds,
            self.obstacles[target].bounds,
        );

        let (seg, seg2) = if tb.y > sb.y {
            let crossover = if tb.y < sb.bottom() - 1 {
                Seg::new(s.bl, t.tr)
            } else {
                Seg::new(s.br, t.tl)
            };
            (Seg::new(s.tl, t.tl), crossover)
        } else if sb.y == tb.y {
            (Seg::new(s.tl, t.tr), Seg::new(s.bl, t.tr))
        } else {
            (Seg::new(s.tr, t.tr), Seg::new(s.bl, t.tr))
        };
        stack.push(WorkItem::excluding_pair(seg, source, target));
        stack.push(WorkItem::excluding_pair(seg2, source, target));

        let (seg, seg2) = if tb.bottom() < sb.bottom() {
            let crossover = if tb.bottom() - 1 > sb.y {
                Seg::new(s.tl, t.br)
            } else {
                Seg::new(s.tr, t.bl)
            };
            (Seg::new(s.bl, t.bl), crossover)
        } else if sb.bottom() == tb.bottom() {
            (Seg::new(s.bl, t.br), Seg::new(s.tl, t.br))
        } else {
            (Seg::new(s.br, t.br), Seg::new(s.tl, t.br))
        };
        stack.push(WorkItem::excluding_pair(seg, source, target));
        stack.push(WorkItem::excluding_pair(seg2, source, target));
    }

    /// Queues the attachment segments from a wire endpoint to the two
    /// corners of the obstacle it can reach, chosen by relative position.
    fn add_vertex_obstacle_segments(
        &mut self,
        vertex: VertexId,
        oid: ObstacleId,
        stack: &mut Vec<WorkItem>,
    ) -> Result<(), RouteError> {
        let position = {
            let o = &self.obstacles[oid];
            o.bounds.position_of(self.vertices[vertex].pos)
        };
        let o = &self.obstacles[oid];

        let (first, second) = if position == Compass::SOUTH_WEST || position == Compass::NORTH_EAST
        {
            (o.top_left, o.bottom_right)
        } else if position == Compass::SOUTH_EAST || position == Compass::NORTH_WEST {
            (o.top_right, o.bottom_left)
        } else if position == Compass::NORTH {
            (o.top_left, o.top_right)
        } else if position == Compass::EAST {
            (o.bottom_right, o.top_right)
        } else if position == Compass::SOUTH {
            (o.bottom_right, o.bottom_left)
        } else if position == Compass::WEST {
            (o.top_left, o.bottom_left)
        } else {
            // On the boundary ring: attach along the edge the point sits on.
            let p = self.vertices[vertex].pos;
            let bounds = o.bounds;
            if p.x == bounds.x {
                (o.top_left, o.bottom_left)
            } else if p.y == bounds.y {
                (o.top_left, o.top_right)
            } else if p.y == bounds.bottom() - 1 {
                (o.bottom_left, o.bottom_right)
            } else if p.x == bounds.right() - 1 {
                (o.top_right, o.bottom_right)
            } else {
                return Err(RouteError::UnexpectedVertexPosition { vertex: p, bounds });
            }
        };

        stack.push(WorkItem::excluding(Seg::new(vertex, first), oid));
        stack.push(WorkItem::excluding(Seg::new(vertex, second), oid));
        Ok(())
    }

    /// Makes the segment an edge of the graph: symmetric neighbor links
    /// plus membership in the wire's vertex set.
    fn link_vertices(&mut self, path_id: PathId, seg: Seg) {
        if let Some((a, b)) = self.vertices.pair_mut(seg.start, seg.end) {
            if !a.neighbors.contains(&seg.end) {
                a.neighbors.push(seg.end);
                b.neighbors.push(seg.start);
            }
        }
        let path = &mut self.paths[path_id];
        path.visible_vertices.insert(seg.start);
        path.visible_vertices.insert(seg.end);
    }

    fn corner_ids(&self, oid: ObstacleId) -> Corners {
        let o = &self.obstacles[oid];
        Corners {
            tl: o.top_left,
            tr: o.top_right,
            bl: o.bottom_left,
            br: o.bottom_right,
        }
    }
}

struct Corners {
    tl: VertexId,
    tr: VertexId,
    bl: VertexId,
    br: VertexId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wire_geom::GridRect;

    #[test]
    fn test_free_segment_links_endpoints() {
        let mut router = Router::new();
        let wire = router.add_path(GridPoint::new(0, 0), GridPoint::new(10, 0));
        let found = router.generate_shortest_path(wire).unwrap();
        assert!(found);

        let path = router.path(wire).unwrap();
        assert_eq!(path.visible_vertices.len(), 2);
        assert_eq!(path.segments.len(), 1);
        assert!(path.visible_obstacles.is_empty());
    }

    #[test]
    fn test_blocking_obstacle_joins_graph() {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(4, 0, 2, 10));
        let wire = router.add_path(GridPoint::new(0, 5), GridPoint::new(10, 5));
        // Give it the no-pruning threshold a retry would use.
        router.paths[wire].threshold = 0.0;
        let found = router.generate_shortest_path(wire).unwrap();
        assert!(found);

        let path = router.path(wire).unwrap();
        assert_eq!(path.visible_obstacles.len(), 1);
        // Start, end, and the four corners all joined the graph.
        assert_eq!(path.visible_vertices.len(), 6);
    }

    #[test]
    fn test_excluded_obstacle_does_not_block() {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(0, 0, 100, 100));
        let oid = router.obstacle_order[0];
        router.obstacles[oid].exclude = true;

        let wire = router.add_path(GridPoint::new(10, 10), GridPoint::new(90, 90));
        let found = router.generate_shortest_path(wire).unwrap();
        assert!(found);
        assert_eq!(router.path(wire).unwrap().segments.len(), 1);
    }

    #[test]
    fn test_endpoint_on_boundary_ring_attaches_along_edge() {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(0, 0, 10, 10));
        // Endpoint on the left edge of the obstacle; routing to the right.
        let wire = router.add_path(GridPoint::new(0, 5), GridPoint::new(20, 5));
        router.paths[wire].threshold = 0.0;
        // The ring endpoint has a defined attachment, so this must not
        // error out.
        router.generate_shortest_path(wire).unwrap();
    }

    #[test]
    fn test_blocks_counts_strict_interior_endpoint() {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(0, 0, 10, 10));
        let oid = router.obstacle_order[0];
        let o = &router.obstacles[oid];
        // Ends inside without crossing a diagonal.
        assert!(blocks(o, GridPoint::new(1, 5), GridPoint::new(3, 5)));
        // Passes fully outside.
        assert!(!blocks(o, GridPoint::new(-5, -5), GridPoint::new(20, -5)));
    }
}

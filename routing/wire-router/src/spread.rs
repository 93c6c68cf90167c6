//! Fan-out spacing passes: vertex counting, clearance shrinking, and the
//! grow/deflect loop.
//!
//! After every wire has a raw shortest path, these passes decide how far
//! wires can fan out at each corner and insert extra bends where a fanned
//! out wire would clip a neighboring obstacle:
//!
//! 1. Count how many wires bend at each corner vertex.
//! 2. For each used corner, probe the outward quadrant for foreign
//!    obstacles and shrink the corner's offset so the whole fan fits in
//!    the available gap.
//! 3. Grow every used corner to the fan's outer extent, re-test all wire
//!    segments against the grown corners, and split any segment that now
//!    collides, bending it around the nearest corner. Repeat while a pass
//!    keeps finding work, up to a fixed bound.

use tracing::debug;
use wire_geom::{lines_intersect, Compass, GridPoint, GridRect};
use wire_model::{PathId, Seg, VertexId, NUM_GROW_PASSES};

use crate::router::Router;

impl Router {
    /// Tallies how many wires bend at each intermediate vertex.
    pub(crate) fn count_vertices(&mut self) {
        let working = self.working_paths.clone();
        for path_id in working {
            let intermediates = self.intermediate_ends(path_id);
            for vertex in intermediates {
                self.vertices[vertex].total_count += 1;
            }
        }
    }

    /// Probes around every intermediate vertex of every wire for foreign
    /// obstacles that would constrain its fan-out.
    pub(crate) fn check_vertex_intersections(&mut self) {
        let working = self.working_paths.clone();
        for path_id in working {
            let intermediates = self.intermediate_ends(path_id);
            for vertex in intermediates {
                self.check_vertex_for_intersections(vertex);
            }
        }
    }

    /// The ends of the wire's raw segments, excluding the final segment's
    /// end (the wire endpoint itself).
    fn intermediate_ends(&self, path_id: PathId) -> Vec<VertexId> {
        let segments = &self.paths[path_id].segments;
        segments
            .iter()
            .take(segments.len().saturating_sub(1))
            .map(|seg| seg.end)
            .collect()
    }

    /// Scans the vertex's outward quadrant for the nearest foreign obstacle
    /// and shrinks the vertex offset to fit the gap.
    ///
    /// The probe square has side `2 * total_count * spacing + 1`: the full
    /// extent the fan could reach at default spacing. Skipped when the
    /// vertex was already checked or already constrained this solve.
    pub(crate) fn check_vertex_for_intersections(&mut self, vertex_id: VertexId) {
        let (corner, position, total_count, own_obstacle) = {
            let v = &self.vertices[vertex_id];
            if v.nearest_obstacle != 0 || v.nearest_obstacle_checked {
                return;
            }
            (v.corner, v.pos, v.total_count, v.obstacle)
        };

        let side = 2 * (total_count * self.spacing()) + 1;
        let y = if corner.intersects(Compass::NORTH) {
            position.y - side
        } else {
            position.y
        };
        let x = if corner.intersects(Compass::EAST) {
            position.x
        } else {
            position.x - side
        };
        let probe = GridRect::new(x, y, side, side);

        for &oid in &self.obstacle_order {
            if own_obstacle == Some(oid) {
                continue;
            }
            let bounds = self.obstacles[oid].bounds;
            if !probe.intersects(bounds) {
                continue;
            }
            let relative = bounds.position_of(position);
            if relative.is_none() {
                continue;
            }

            let y_dist = if relative.intersects(Compass::NORTH) {
                bounds.y - position.y
            } else {
                position.y - bounds.bottom() + 1
            };
            let x_dist = if relative.intersects(Compass::EAST) {
                position.x - bounds.right() + 1
            } else {
                bounds.x - position.x
            };

            let candidate = x_dist.max(y_dist);
            let vertex = &mut self.vertices[vertex_id];
            if candidate < vertex.nearest_obstacle || vertex.nearest_obstacle == 0 {
                vertex.nearest_obstacle = candidate;
                vertex.update_offset();
            }
        }

        self.vertices[vertex_id].nearest_obstacle_checked = true;
    }

    /// Runs up to [`NUM_GROW_PASSES`] grow/deflect passes, stopping early
    /// once a pass inserts nothing.
    pub(crate) fn grow_obstacles(&mut self) {
        self.grow_pass_changed = false;
        for pass in 0..NUM_GROW_PASSES {
            if pass == 0 || self.grow_pass_changed {
                self.grow_obstacles_pass();
            }
        }
    }

    /// One pass: grow used corners, re-test every wire segment against the
    /// grown geometry, shrink back.
    fn grow_obstacles_pass(&mut self) {
        let spacing = self.spacing();
        let order = self.obstacle_order.clone();

        for &oid in &order {
            for corner in self.obstacles[oid].corners() {
                let vertex = &mut self.vertices[corner];
                if vertex.total_count > 0 {
                    vertex.grow(spacing);
                }
            }
        }

        let working = self.working_paths.clone();
        for path_id in working {
            let excluded = self.paths[path_id].excluded_obstacles.clone();
            for &oid in &excluded {
                if let Some(obstacle) = self.obstacles.get_mut(oid) {
                    obstacle.exclude = true;
                }
            }

            if self.paths[path_id].grown_segments.is_empty() {
                let segments = self.paths[path_id].segments.clone();
                for seg in segments {
                    self.test_offset_segment(path_id, seg, None);
                }
            } else {
                let current = self.paths[path_id].grown_segments.clone();
                let mut inserted = 0usize;
                for (index, seg) in current.into_iter().enumerate() {
                    inserted += self.test_offset_segment(path_id, seg, Some(index + inserted));
                }
            }

            for &oid in &excluded {
                if let Some(obstacle) = self.obstacles.get_mut(oid) {
                    obstacle.exclude = false;
                }
            }
        }

        for &oid in &order {
            for corner in self.obstacles[oid].corners() {
                self.vertices[corner].shrink();
            }
        }

        debug!(changed = self.grow_pass_changed, "grow pass finished");
    }

    /// Tests one segment against every grown obstacle corner it does not
    /// originate from, splitting it at the nearest corner on a hit
    /// diagonal.
    ///
    /// With `index`, the segment is replaced in place inside
    /// `grown_segments`; without, results are appended (first pass).
    /// Returns the number of splits (0 or 1): a segment splits at most once
    /// per pass.
    fn test_offset_segment(&mut self, path_id: PathId, seg: Seg, index: Option<usize>) -> usize {
        let buffer = self.spacing();
        let a = self.vertices[seg.start].pos;
        let b = self.vertices[seg.end].pos;
        let start_obstacle = self.vertices[seg.start].obstacle;
        let end_obstacle = self.vertices[seg.end].obstacle;
        let slope = wire_geom::slope_sign(a, b);

        let order = self.obstacle_order.clone();
        for &oid in &order {
            if end_obstacle == Some(oid) || start_obstacle == Some(oid) {
                continue;
            }
            if self.obstacles[oid].exclude {
                continue;
            }

            let (tl_id, tr_id, bl_id, br_id) = {
                let o = &self.obstacles[oid];
                (o.top_left, o.top_right, o.bottom_left, o.bottom_right)
            };
            let tl = self.vertices[tl_id].pos;
            let tr = self.vertices[tr_id].pos;
            let bl = self.vertices[bl_id].pos;
            let br = self.vertices[br_id].pos;

            let main_hit = lines_intersect(
                tl.x - buffer,
                tl.y - buffer,
                br.x + buffer,
                br.y + buffer,
                a.x,
                a.y,
                b.x,
                b.y,
            );
            let anti_hit = lines_intersect(
                bl.x - buffer,
                bl.y + buffer,
                tr.x + buffer,
                tr.y - buffer,
                a.x,
                a.y,
                b.x,
                b.y,
            );

            // A falling segment can only clip the main diagonal first; a
            // rising one the anti diagonal.
            let candidate = if slope < 0 {
                if main_hit {
                    Some(self.nearest_vertex(tl_id, br_id, a, b))
                } else if anti_hit {
                    Some(self.nearest_vertex(bl_id, tr_id, a, b))
                } else {
                    None
                }
            } else if anti_hit {
                Some(self.nearest_vertex(bl_id, tr_id, a, b))
            } else if main_hit {
                Some(self.nearest_vertex(tl_id, br_id, a, b))
            } else {
                None
            };

            let Some(vertex_id) = candidate else {
                continue;
            };

            // Bending around a corner adjacent to the segment's own corner
            // would hook the wire back on itself.
            let v_rect = self.vertices[vertex_id].deformed_rect(buffer);
            if end_obstacle.is_some() {
                let end_rect = self.vertices[seg.end].deformed_rect(buffer);
                if v_rect.intersects(end_rect) {
                    continue;
                }
            }
            if start_obstacle.is_some() {
                let start_rect = self.vertices[seg.start].deformed_rect(buffer);
                if v_rect.intersects(start_rect) {
                    continue;
                }
            }

            let new_start = Seg::new(seg.start, vertex_id);
            let new_end = Seg::new(vertex_id, seg.end);

            {
                let vertex = &mut self.vertices[vertex_id];
                vertex.total_count += 1;
                vertex.nearest_obstacle_checked = false;
                vertex.shrink();
            }
            self.check_vertex_for_intersections(vertex_id);
            {
                let vertex = &mut self.vertices[vertex_id];
                vertex.grow(buffer);
                if vertex.nearest_obstacle != 0 {
                    vertex.update_offset();
                }
            }

            self.grow_pass_changed = true;

            let path = &mut self.paths[path_id];
            match index {
                Some(i) => {
                    path.grown_segments.remove(i);
                    path.grown_segments.insert(i, new_start);
                    path.grown_segments.insert(i + 1, new_end);
                }
                None => {
                    path.grown_segments.push(new_start);
                    path.grown_segments.push(new_end);
                }
            }
            return 1;
        }

        if index.is_none() {
            self.paths[path_id].grown_segments.push(seg);
        }
        0
    }

    /// Of two corners, the one whose detour past the segment is shorter.
    fn nearest_vertex(&self, v1: VertexId, v2: VertexId, a: GridPoint, b: GridPoint) -> VertexId {
        let p1 = self.vertices[v1].pos;
        let p2 = self.vertices[v2].pos;
        if a.distance(p1) + b.distance(p1) > a.distance(p2) + b.distance(p2) {
            v2
        } else {
            v1
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use wire_geom::GridPoint;

    #[test]
    fn test_count_vertices_skips_endpoints() {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(4, 0, 2, 10));
        let wire = router.add_path(GridPoint::new(0, 5), GridPoint::new(10, 5));
        router.paths[wire].threshold = 0.0;
        router.generate_shortest_path(wire).unwrap();

        router.count_vertices();

        // The wire bends at two corners; endpoints stay uncounted.
        let counted: Vec<_> = router
            .paths[wire]
            .segments
            .iter()
            .take(router.paths[wire].segments.len() - 1)
            .map(|s| s.end)
            .collect();
        assert_eq!(counted.len(), 2);
        for v in counted {
            assert_eq!(router.vertices[v].total_count, 1);
        }
        let start = router.paths[wire].start;
        assert_eq!(router.vertices[start].total_count, 0);
    }

    #[test]
    fn test_clearance_shrinks_offset_near_foreign_obstacle() {
        let mut router = Router::new();
        // Obstacle with a neighbor 8 cells to the right of its top-right
        // corner, tall enough to reach into the corner's outward quadrant.
        router.add_obstacle(GridRect::new(0, 0, 10, 10));
        router.add_obstacle(GridRect::new(17, -20, 10, 30));
        let first = router.obstacle_order[0];

        let corner = router.obstacles[first].top_right;
        router.vertices[corner].total_count = 1;
        router.vertices[corner].offset = 4.0;

        router.check_vertex_for_intersections(corner);

        let v = &router.vertices[corner];
        // Corner at x = 9, neighbor's left edge at 17: gap 8.
        assert_eq!(v.nearest_obstacle, 8);
        // (8 / 2 - 1) / 1 = 3: the fan shrinks below the default 4.
        assert_eq!(v.offset, 3.0);
        assert!(v.nearest_obstacle_checked);
    }

    #[test]
    fn test_clearance_leaves_unconstrained_corner_alone() {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(0, 0, 10, 10));
        let first = router.obstacle_order[0];

        let corner = router.obstacles[first].top_right;
        router.vertices[corner].total_count = 1;
        router.vertices[corner].offset = 4.0;

        router.check_vertex_for_intersections(corner);

        let v = &router.vertices[corner];
        assert_eq!(v.nearest_obstacle, 0);
        assert_eq!(v.offset, 4.0);
        assert!(v.nearest_obstacle_checked);
    }

    #[test]
    fn test_grow_pass_fills_grown_segments() {
        let mut router = Router::new();
        let wire = router.add_path(GridPoint::new(0, 0), GridPoint::new(10, 0));
        router.generate_shortest_path(wire).unwrap();
        assert!(router.paths[wire].grown_segments.is_empty());

        router.grow_obstacles();

        assert_eq!(router.paths[wire].grown_segments.len(), 1);
        assert!(!router.grow_pass_changed);
    }

    #[test]
    fn test_nearest_vertex_picks_smaller_detour() {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(0, 0, 10, 10));
        let first = router.obstacle_order[0];
        let (tl, br) = {
            let o = &router.obstacles[first];
            (o.top_left, o.bottom_right)
        };
        // A segment running just past the top-left corner.
        let picked = router.nearest_vertex(tl, br, GridPoint::new(-5, 1), GridPoint::new(5, -5));
        assert_eq!(picked, tl);
    }
}

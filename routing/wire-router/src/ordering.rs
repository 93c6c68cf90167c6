//! Bend labeling, wire ordering, point materialization, and recombination.
//!
//! The passes here turn grown segment chains into final polylines:
//!
//! - **Labeling** walks wires depth-first, marking each bend INNIE (toward
//!   the obstacle center) or OUTIE by cross product. Wires that disagree
//!   with labels already placed by other wires flip to inverted once; a
//!   second disagreement splits the wire at the offending segment into a
//!   subpath that restarts labeling from there.
//! - **Ordering** sorts wires at shared corners by their cached bend
//!   angles, so the wire with the sharpest bend lands outermost.
//! - **Bending** materializes integer points, spending INNIE offsets in
//!   use order and OUTIE offsets in reverse use order, which hands every
//!   wire at a corner a distinct fan position.
//! - **Recombination** stitches subpaths back into their parents.

use wire_geom::{bend_cosine, cross_at};
use wire_model::{BendKind, Path, PathId, Seg};

use crate::router::Router;

impl Router {
    /// Labels every working wire's bends, splitting inconsistent wires.
    /// New subpaths are appended to `sub_paths` (and to the working set).
    pub(crate) fn label_paths(&mut self, sub_paths: &mut Vec<PathId>) {
        let mut stack: Vec<PathId> = self.working_paths.clone();

        while let Some(path_id) = stack.pop() {
            if !self.paths[path_id].is_marked {
                self.paths[path_id].is_marked = true;
                self.label_path(path_id, &mut stack, sub_paths);
            }
        }

        // The marks are reused by ordering.
        let working = self.working_paths.clone();
        for path_id in working {
            self.paths[path_id].is_marked = false;
        }
    }

    fn label_path(
        &mut self,
        path_id: PathId,
        stack: &mut Vec<PathId>,
        sub_paths: &mut Vec<PathId>,
    ) {
        let mut agree = false;
        let mut index = 0usize;

        while index + 1 < self.paths[path_id].grown_segments.len() {
            let seg = self.paths[path_id].grown_segments[index];
            let next_seg = self.paths[path_id].grown_segments[index + 1];
            let vertex_id = seg.end;

            let Some(obstacle_id) = self.vertices[vertex_id].obstacle else {
                index += 1;
                continue;
            };
            let center = self.obstacles[obstacle_id].center;
            let s_pos = self.vertices[seg.start].pos;
            let v_pos = self.vertices[vertex_id].pos;
            let cross = cross_at(s_pos, v_pos, center);

            let kind = self.vertices[vertex_id].kind;
            let inverted = self.paths[path_id].is_inverted;

            if kind == BendKind::NotSet {
                self.label_vertex(path_id, seg, cross);
            } else if !inverted
                && ((cross > 0 && kind == BendKind::Outie)
                    || (cross < 0 && kind == BendKind::Innie))
            {
                if agree {
                    // Second disagreement: split here and label the tail
                    // as its own wire.
                    let sub = self.split_path(path_id, index, sub_paths);
                    stack.push(sub);
                    return;
                }
                // First disagreement: this wire is inverted; fix the
                // labels it placed before it knew.
                self.paths[path_id].is_inverted = true;
                self.invert_prior(path_id, index);
            } else if inverted
                && ((cross < 0 && kind == BendKind::Outie)
                    || (cross > 0 && kind == BendKind::Innie))
            {
                let sub = self.split_path(path_id, index, sub_paths);
                stack.push(sub);
                return;
            } else {
                agree = true;
            }

            // Wires sharing this corner must label consistently with it.
            let vertex_paths = self.vertices[vertex_id].paths.clone();
            for other in vertex_paths {
                if let Some(other_path) = self.paths.get_mut(other) {
                    if !other_path.is_marked {
                        other_path.is_marked = true;
                        stack.push(other);
                    }
                }
            }

            let n_pos = self.vertices[next_seg.end].pos;
            let cosine = bend_cosine(s_pos, v_pos, n_pos);
            self.vertices[vertex_id].add_path(path_id, cosine);

            index += 1;
        }
    }

    /// Labels the vertex at the end of `seg` from the cross product sign,
    /// honoring the wire's inversion. A zero cross product inherits the
    /// preceding vertex's label, defaulting to INNIE.
    fn label_vertex(&mut self, path_id: PathId, seg: Seg, cross: i64) {
        let inverted = self.paths[path_id].is_inverted;
        let kind = if cross > 0 {
            if inverted {
                BendKind::Outie
            } else {
                BendKind::Innie
            }
        } else if cross < 0 {
            if inverted {
                BendKind::Innie
            } else {
                BendKind::Outie
            }
        } else {
            let prior = self.vertices[seg.start].kind;
            if prior == BendKind::NotSet {
                BendKind::Innie
            } else {
                prior
            }
        };
        self.vertices[seg.end].kind = kind;
    }

    fn invert_prior(&mut self, path_id: PathId, stop_index: usize) {
        let Self {
            paths, vertices, ..
        } = self;
        paths[path_id].invert_prior_vertices(stop_index, vertices);
    }

    /// Splits the wire at segment `seg_index`: the wire keeps segments up
    /// to and including it, the new subpath takes the rest and shares the
    /// boundary vertices.
    fn split_path(
        &mut self,
        path_id: PathId,
        seg_index: usize,
        sub_paths: &mut Vec<PathId>,
    ) -> PathId {
        let (tail, seg_start, old_end) = {
            let path = &mut self.paths[path_id];
            let tail = path.grown_segments[seg_index..].to_vec();
            path.grown_segments.truncate(seg_index + 1);
            let seg = tail[0];
            let old_end = path.end;
            path.end = seg.end;
            (tail, seg.start, old_end)
        };

        let mut sub = Path::new(seg_start, old_end);
        sub.grown_segments = tail;
        let sub_id = self.paths.insert(sub);

        self.paths[path_id].sub_path = Some(sub_id);
        self.working_paths.push(sub_id);
        sub_paths.push(sub_id);
        sub_id
    }

    /// Depth-first orders wires so that, at any shared corner, wires
    /// appear sharpest bend first.
    pub(crate) fn order_paths(&mut self) -> Vec<PathId> {
        let mut ordered = Vec::new();
        let working = self.working_paths.clone();
        for path_id in working {
            self.order_path(path_id, &mut ordered);
        }
        ordered
    }

    fn order_path(&mut self, path_id: PathId, ordered: &mut Vec<PathId>) {
        if self.paths[path_id].is_marked {
            return;
        }
        self.paths[path_id].is_marked = true;

        let segment_count = self.paths[path_id].grown_segments.len();
        for index in 0..segment_count.saturating_sub(1) {
            let vertex_id = self.paths[path_id].grown_segments[index].end;

            let Some(mut this_angle) = self.vertices[vertex_id].cached_cosines.get(&path_id).copied()
            else {
                continue;
            };
            if self.paths[path_id].is_inverted {
                this_angle = -this_angle;
            }

            let vertex_paths = self.vertices[vertex_id].paths.clone();
            for other in vertex_paths {
                let Some(other_path) = self.paths.get(other) else {
                    continue;
                };
                if other_path.is_marked {
                    continue;
                }
                let Some(mut other_angle) =
                    self.vertices[vertex_id].cached_cosines.get(&other).copied()
                else {
                    continue;
                };
                if other_path.is_inverted {
                    other_angle = -other_angle;
                }
                if other_angle < this_angle {
                    self.order_path(other, ordered);
                }
            }
        }

        ordered.push(path_id);
    }

    /// Materializes every wire's polyline, in fan-out order.
    ///
    /// INNIE bends consume offsets counting up, OUTIE bends counting down
    /// from the total, so the wires ordered first end up outermost on both
    /// sides of the fan.
    pub(crate) fn bend_paths(&mut self, ordered: &[PathId]) {
        for &path_id in ordered {
            // A wire that found no route keeps its empty polyline as the
            // "unroutable" signal.
            {
                let path = &self.paths[path_id];
                if path.segments.is_empty() && path.grown_segments.is_empty() {
                    continue;
                }
            }

            let start_pos = {
                let start = self.paths[path_id].start;
                self.vertices[start].pos
            };
            self.paths[path_id].points.push(start_pos);

            let grown = self.paths[path_id].grown_segments.clone();
            for (index, seg) in grown.iter().enumerate() {
                if index + 1 >= grown.len() {
                    break;
                }
                let vertex = &mut self.vertices[seg.end];
                let point = if vertex.kind == BendKind::Innie {
                    vertex.count += 1;
                    vertex.bend(vertex.count)
                } else {
                    let point = vertex.bend(vertex.total_count);
                    vertex.total_count -= 1;
                    point
                };
                self.paths[path_id].points.push(point);
            }

            let end_pos = {
                let end = self.paths[path_id].end;
                self.vertices[end].pos
            };
            self.paths[path_id].points.push(end_pos);
        }
    }

    /// Stitches every subpath chain back into its parent and retires the
    /// subpaths.
    pub(crate) fn recombine_subpaths(&mut self, ordered: &[PathId], sub_paths: &[PathId]) {
        for &path_id in ordered {
            // Collect the chain and merge deepest-first, so the walk never
            // recurses.
            let mut chain = vec![path_id];
            let mut current = path_id;
            while let Some(sub) = self.paths.get(current).and_then(|p| p.sub_path) {
                chain.push(sub);
                current = sub;
            }
            while chain.len() > 1 {
                let Some(child) = chain.pop() else {
                    break;
                };
                if let Some(&parent) = chain.last() {
                    self.merge_subpath(parent, child);
                }
            }
        }

        for &sub in sub_paths {
            self.working_paths.retain(|&p| p != sub);
            // Subpaths share their endpoint vertices with the parent, so
            // only the path entity itself is retired.
            self.paths.remove(sub);
        }
    }

    /// Folds `child` into `parent` at their shared split vertex. The split
    /// vertex drops out of the polyline: the wire no longer bends there.
    fn merge_subpath(&mut self, parent_id: PathId, child_id: PathId) {
        let (mut child_grown, mut child_points, child_visible, child_end) = {
            let child = &mut self.paths[child_id];
            (
                std::mem::take(&mut child.grown_segments),
                std::mem::take(&mut child.points),
                std::mem::take(&mut child.visible_obstacles),
                child.end,
            )
        };

        if child_grown.is_empty() {
            return;
        }
        let changed = child_grown.remove(0);
        if !child_points.is_empty() {
            child_points.remove(0);
        }

        let parent = &mut self.paths[parent_id];
        if let Some(last) = parent.grown_segments.last_mut() {
            last.end = changed.end;
        }
        parent.grown_segments.append(&mut child_grown);
        parent.points.pop();
        parent.points.append(&mut child_points);
        parent.visible_obstacles.extend_from(&child_visible);
        parent.end = child_end;
        parent.sub_path = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use wire_geom::{GridPoint, GridRect};

    /// Route a single wire against one obstacle and run the passes up to
    /// labeling.
    fn routed_wire() -> (Router, PathId) {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(4, 0, 2, 10));
        let wire = router.add_path(GridPoint::new(0, 5), GridPoint::new(10, 5));
        router.paths[wire].threshold = 0.0;
        router.generate_shortest_path(wire).unwrap();
        // The solve loop resets vertex state (and seeds corner offsets with
        // the spacing) after each search.
        router.reset_vertices();
        router.count_vertices();
        router.check_vertex_intersections();
        router.grow_obstacles();
        (router, wire)
    }

    #[test]
    fn test_label_path_marks_bends_innie() {
        let (mut router, wire) = routed_wire();
        let mut subs = Vec::new();
        router.label_paths(&mut subs);
        assert!(subs.is_empty());

        // The wire wraps the obstacle's bottom corners, bending toward the
        // center both times.
        let grown = router.paths[wire].grown_segments.clone();
        for seg in &grown[..grown.len() - 1] {
            assert_eq!(router.vertices[seg.end].kind, BendKind::Innie);
        }
        // Labeling cached a bend angle for the wire at each corner.
        for seg in &grown[..grown.len() - 1] {
            assert!(router.vertices[seg.end].cached_cosines.contains_key(&wire));
        }
    }

    #[test]
    fn test_marks_are_cleared_for_ordering() {
        let (mut router, wire) = routed_wire();
        let mut subs = Vec::new();
        router.label_paths(&mut subs);
        assert!(!router.paths[wire].is_marked);
    }

    #[test]
    fn test_order_paths_emits_every_wire_once() {
        let (mut router, _) = routed_wire();
        let mut subs = Vec::new();
        router.label_paths(&mut subs);
        let ordered = router.order_paths();
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn test_bend_paths_offsets_bends_outward() {
        let (mut router, wire) = routed_wire();
        let mut subs = Vec::new();
        router.label_paths(&mut subs);
        let ordered = router.order_paths();
        router.bend_paths(&ordered);

        let points = router.paths[wire].points.clone();
        assert_eq!(points.first(), Some(&GridPoint::new(0, 5)));
        assert_eq!(points.last(), Some(&GridPoint::new(10, 5)));
        assert_eq!(points.len(), 4);
        // The wire rounds the bottom of the obstacle (y up to 9), pushed
        // outward by the default spacing.
        assert!(points[1].y > 9);
        assert!(points[2].y > 9);
    }

    #[test]
    fn test_unroutable_wire_keeps_empty_points() {
        let mut router = Router::new();
        // Start boxed in by four overlapping walls; overlap matters, since
        // walls that only touch leave a routable seam along their
        // boundary rings.
        router.add_obstacle(GridRect::new(-20, -20, 40, 12));
        router.add_obstacle(GridRect::new(-20, 8, 40, 12));
        router.add_obstacle(GridRect::new(-20, -12, 12, 24));
        router.add_obstacle(GridRect::new(8, -12, 12, 24));
        let wire = router.add_path(GridPoint::new(0, 0), GridPoint::new(100, 0));

        router.solve().unwrap();
        assert!(router.points(wire).unwrap().is_empty());
    }
}

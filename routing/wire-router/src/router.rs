//! The router: entity ownership, incremental dirty tracking, and the solve
//! pipeline.

use std::collections::HashMap;

use tracing::debug;
use wire_geom::{segments_intersect, GridPoint, GridRect};
use wire_model::{
    Obstacle, ObstacleId, Path, PathId, Pool, RouteError, Vertex, VertexId, DEFAULT_SPACING,
};

/// Routes a collection of wires around rectangular obstacles.
///
/// The router owns every obstacle, wire, and vertex in arenas and keeps
/// results between solves: after a [`Router::solve`], adding or removing an
/// obstacle marks only the affected wires dirty, and the next solve
/// re-searches just those.
///
/// Wires with bendpoints are handled through hidden child wires, one per
/// leg between consecutive control points; the children are routed
/// independently and recombined into the wire the caller added.
///
/// # Example
///
/// ```
/// use wire_router::{GridPoint, GridRect, Router};
///
/// let mut router = Router::new();
/// router.add_obstacle(GridRect::new(4, 0, 2, 10));
/// let wire = router.add_path(GridPoint::new(0, 5), GridPoint::new(10, 5));
///
/// router.solve().unwrap();
///
/// let points = router.points(wire).unwrap();
/// assert_eq!(points.first(), Some(&GridPoint::new(0, 5)));
/// assert_eq!(points.last(), Some(&GridPoint::new(10, 5)));
/// ```
pub struct Router {
    spacing: i32,

    pub(crate) vertices: Pool<Vertex>,
    pub(crate) obstacles: Pool<Obstacle>,
    /// Obstacles in insertion order; all obstacle iteration goes through
    /// this list so tie-breaks stay deterministic.
    pub(crate) obstacle_order: Vec<ObstacleId>,

    pub(crate) paths: Pool<Path>,
    /// Wires the caller added, in insertion order.
    user_paths: Vec<PathId>,
    /// Wires actually solved: user wires, bendpoint children, and transient
    /// subpaths.
    pub(crate) working_paths: Vec<PathId>,
    /// Bendpoint children per parent wire.
    children: HashMap<PathId, Vec<PathId>>,

    /// Set when a grow pass inserted a bend; gates the next pass.
    pub(crate) grow_pass_changed: bool,
}

impl Router {
    /// Creates an empty router with the default spacing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            vertices: Pool::new(),
            obstacles: Pool::new(),
            obstacle_order: Vec::new(),
            paths: Pool::new(),
            user_paths: Vec::new(),
            working_paths: Vec::new(),
            children: HashMap::new(),
            grow_pass_changed: false,
        }
    }

    /// The minimum separation kept between wires, and between a wire and
    /// the obstacles it bends around.
    #[must_use]
    pub const fn spacing(&self) -> i32 {
        self.spacing
    }

    /// Sets the spacing. When the requested spacing cannot be satisfied at
    /// a crowded corner, wires are squeezed together uniformly instead.
    pub fn set_spacing(&mut self, spacing: i32) {
        self.spacing = spacing;
    }

    /// Adds an obstacle.
    ///
    /// Returns `true` if any previously solved wire touches the new
    /// obstacle and was marked dirty.
    pub fn add_obstacle(&mut self, bounds: GridRect) -> bool {
        let Self {
            obstacles, vertices, ..
        } = self;
        let id = obstacles.insert_with(|id| Obstacle::new(bounds, vertices, id));
        self.obstacle_order.push(id);
        self.test_and_dirty_paths(id)
    }

    /// Removes the first-added obstacle whose bounds equal `bounds`.
    ///
    /// Returns `true` if the removal dirtied at least one wire. Removing
    /// bounds no obstacle has is a no-op returning `false`.
    pub fn remove_obstacle(&mut self, bounds: GridRect) -> bool {
        let Some(position) = self
            .obstacle_order
            .iter()
            .position(|&id| self.obstacles[id].bounds == bounds)
        else {
            return false;
        };
        let id = self.obstacle_order.remove(position);
        let corners = self.obstacles[id].corners();

        let mut result = false;
        for corner in corners {
            result |= self.dirty_paths_on(corner);
        }

        let working = self.working_paths.clone();
        for path_id in working {
            let path = &mut self.paths[path_id];
            if path.is_dirty {
                continue;
            }
            if path.is_obstacle_visible(id) {
                path.is_dirty = true;
                result = true;
            }
        }

        for corner in corners {
            self.vertices.remove(corner);
        }
        self.obstacles.remove(id);
        result
    }

    /// Moves an obstacle: removes `old_bounds` and adds `new_bounds`.
    ///
    /// Returns `true` if either step dirtied a wire.
    pub fn update_obstacle(&mut self, old_bounds: GridRect, new_bounds: GridRect) -> bool {
        let removed = self.remove_obstacle(old_bounds);
        self.add_obstacle(new_bounds) || removed
    }

    /// Adds a wire from `start` to `end`. New wires start dirty and are
    /// routed on the next solve.
    pub fn add_path(&mut self, start: GridPoint, end: GridPoint) -> PathId {
        let s = self.vertices.insert(Vertex::endpoint(start));
        let e = self.vertices.insert(Vertex::endpoint(end));
        let id = self.paths.insert(Path::new(s, e));
        self.user_paths.push(id);
        self.working_paths.push(id);
        id
    }

    /// Removes a wire, detaching and releasing any bendpoint children.
    ///
    /// Returns `false` if `path` is not a wire this router owns.
    pub fn remove_path(&mut self, path: PathId) -> bool {
        let Some(position) = self.user_paths.iter().position(|&p| p == path) else {
            return false;
        };
        self.user_paths.remove(position);

        match self.children.remove(&path) {
            Some(kids) => {
                for kid in kids {
                    self.working_paths.retain(|&p| p != kid);
                    self.release_path(kid);
                }
            }
            None => {
                self.working_paths.retain(|&p| p != path);
            }
        }
        self.release_path(path);
        true
    }

    /// Borrows a wire.
    #[must_use]
    pub fn path(&self, path: PathId) -> Option<&Path> {
        self.paths.get(path)
    }

    /// Mutably borrows a wire, e.g. to attach caller data.
    pub fn path_mut(&mut self, path: PathId) -> Option<&mut Path> {
        self.paths.get_mut(path)
    }

    /// The solved polyline of a wire. Empty if the wire has not been solved
    /// or no route exists.
    #[must_use]
    pub fn points(&self, path: PathId) -> Option<&[GridPoint]> {
        self.paths.get(path).map(Path::points)
    }

    /// A wire's start coordinates.
    #[must_use]
    pub fn start_point(&self, path: PathId) -> Option<GridPoint> {
        self.paths.get(path).map(|p| p.start_point(&self.vertices))
    }

    /// A wire's end coordinates.
    #[must_use]
    pub fn end_point(&self, path: PathId) -> Option<GridPoint> {
        self.paths.get(path).map(|p| p.end_point(&self.vertices))
    }

    /// Sets (or clears) a wire's mandatory bendpoints and dirties it.
    ///
    /// Returns `false` if `path` is stale.
    pub fn set_bend_points(&mut self, path: PathId, bendpoints: Option<Vec<GridPoint>>) -> bool {
        match self.paths.get_mut(path) {
            Some(p) => {
                p.set_bend_points(bendpoints);
                true
            }
            None => false,
        }
    }

    /// Moves a wire's start point. A move to the current position changes
    /// nothing.
    pub fn set_start_point(&mut self, path: PathId, point: GridPoint) -> bool {
        let Self {
            paths, vertices, ..
        } = self;
        match paths.get_mut(path) {
            Some(p) => {
                p.set_start_point(point, vertices);
                true
            }
            None => false,
        }
    }

    /// Moves a wire's end point. A move to the current position changes
    /// nothing.
    pub fn set_end_point(&mut self, path: PathId, point: GridPoint) -> bool {
        let Self {
            paths, vertices, ..
        } = self;
        match paths.get_mut(path) {
            Some(p) => {
                p.set_end_point(point, vertices);
                true
            }
            None => false,
        }
    }

    /// The wires the caller added, in insertion order.
    #[must_use]
    pub fn user_paths(&self) -> &[PathId] {
        &self.user_paths
    }

    /// Solves every dirty wire and refreshes the point lists of all wires.
    ///
    /// Returns the caller's wires. Read each wire's polyline through
    /// [`Router::points`]; an empty polyline means no route was found.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::UnexpectedVertexPosition`] if an endpoint falls
    /// through every attachment case while building a visibility graph.
    pub fn solve(&mut self) -> Result<&[PathId], RouteError> {
        let num_solved = self.solve_dirty_paths()?;
        debug!(num_solved, "searched dirty wires");

        self.count_vertices();
        self.check_vertex_intersections();
        self.grow_obstacles();

        let mut sub_paths: Vec<PathId> = Vec::new();
        self.label_paths(&mut sub_paths);
        debug!(sub_paths = sub_paths.len(), "labeled wires");

        let ordered = self.order_paths();
        self.bend_paths(&ordered);

        self.recombine_subpaths(&ordered, &sub_paths);
        self.recombine_children_paths();
        self.cleanup();

        Ok(&self.user_paths)
    }

    // ---- dirty tracking -------------------------------------------------

    /// Marks dirty every clean wire whose solved polyline touches the
    /// obstacle. Returns `true` if any wire was dirtied.
    fn test_and_dirty_paths(&mut self, obstacle: ObstacleId) -> bool {
        let working = self.working_paths.clone();
        let mut result = false;
        for path_id in working {
            result |= self.test_and_set(path_id, obstacle);
        }
        result
    }

    /// Dirties `path_id` if it is clean and its polyline crosses the
    /// obstacle's diagonals or enters its bounds.
    fn test_and_set(&mut self, path_id: PathId, obstacle: ObstacleId) -> bool {
        let path = &self.paths[path_id];
        if path.is_dirty {
            return false;
        }
        if path.excluded_obstacles.contains(&obstacle) {
            return false;
        }

        let o = &self.obstacles[obstacle];
        let tl = self.vertices[o.top_left].pos;
        let tr = self.vertices[o.top_right].pos;
        let bl = self.vertices[o.bottom_left].pos;
        let br = self.vertices[o.bottom_right].pos;
        let bounds = o.bounds;

        let hit = path.points.windows(2).any(|w| {
            segments_intersect(tl, br, w[0], w[1])
                || segments_intersect(tr, bl, w[0], w[1])
                || bounds.contains(w[0])
                || bounds.contains(w[1])
        });
        if hit {
            self.paths[path_id].is_dirty = true;
        }
        hit
    }

    /// Dirties every live wire that bends at the vertex. Returns `true` if
    /// any was dirtied.
    fn dirty_paths_on(&mut self, vertex: VertexId) -> bool {
        let path_ids = self.vertices[vertex].paths.clone();
        let mut any = false;
        for path_id in path_ids {
            if let Some(path) = self.paths.get_mut(path_id) {
                path.is_dirty = true;
                any = true;
            }
        }
        any
    }

    // ---- per-solve resets -----------------------------------------------

    /// Fully resets every obstacle corner vertex and every wire endpoint.
    pub(crate) fn reset_vertices(&mut self) {
        let default_offset = f64::from(self.spacing);
        let order = self.obstacle_order.clone();
        for oid in order {
            for corner in self.obstacles[oid].corners() {
                self.vertices[corner].full_reset(default_offset);
            }
        }
        let working = self.working_paths.clone();
        for path_id in working {
            let (start, end) = {
                let p = &self.paths[path_id];
                (p.start, p.end)
            };
            // Endpoints carry no default offset.
            self.vertices[start].full_reset(0.0);
            self.vertices[end].full_reset(0.0);
        }
    }

    fn reset_obstacle_exclusions(&mut self) {
        for &oid in &self.obstacle_order {
            self.obstacles[oid].exclude = false;
        }
    }

    /// Recomputes which obstacles strictly contain the wire's endpoints and
    /// flags them excluded for this wire's search.
    ///
    /// An endpoint sitting exactly on an obstacle's boundary ring (corners
    /// included) does not exclude the obstacle.
    fn refresh_excluded_obstacles(&mut self, path_id: PathId) {
        let (start, end) = {
            let p = &self.paths[path_id];
            (p.start_point(&self.vertices), p.end_point(&self.vertices))
        };

        let mut excluded = Vec::new();
        for &oid in &self.obstacle_order {
            let obstacle = &mut self.obstacles[oid];
            obstacle.exclude =
                obstacle.contains_proper(start) || obstacle.contains_proper(end);
            if obstacle.exclude {
                excluded.push(oid);
            }
        }
        self.paths[path_id].excluded_obstacles = excluded;
    }

    // ---- dirty path solving ---------------------------------------------

    /// Re-searches every dirty wire, maintaining bendpoint children first.
    /// Returns the number of wires searched.
    fn solve_dirty_paths(&mut self) -> Result<usize, RouteError> {
        let user = self.user_paths.clone();
        for path_id in user {
            if !self.paths[path_id].is_dirty {
                continue;
            }
            let prev_count = self.children.get(&path_id).map_or(1, Vec::len);
            let new_count = self.paths[path_id]
                .bendpoints
                .as_ref()
                .map_or(1, |b| b.len() + 1);
            if prev_count != new_count {
                self.regenerate_child_paths(path_id, prev_count, new_count);
            }
            self.refresh_children_endpoints(path_id);
        }

        let mut num_solved = 0;
        let working = self.working_paths.clone();
        for path_id in working {
            self.refresh_excluded_obstacles(path_id);
            if !self.paths[path_id].is_dirty {
                self.paths[path_id].reset_partial();
                continue;
            }

            num_solved += 1;
            self.paths[path_id].full_reset(&self.vertices);

            let mut found = self.generate_shortest_path(path_id)?;
            let over_threshold = found && {
                let path = &self.paths[path_id];
                self.vertices[path.end].cost > path.threshold
            };
            if !found || over_threshold {
                // One retry with pruning disabled. Mandatory: the oval can
                // prune the only viable corners.
                self.reset_vertices();
                self.paths[path_id].full_reset(&self.vertices);
                self.paths[path_id].threshold = 0.0;
                found = self.generate_shortest_path(path_id)?;
            }
            tracing::trace!(?path_id, found, "searched wire");

            self.reset_vertices();
        }

        self.reset_obstacle_exclusions();

        if num_solved == 0 {
            self.reset_vertices();
        }

        Ok(num_solved)
    }

    // ---- bendpoint children ---------------------------------------------

    /// Grows or shrinks the child list of `parent` to `target` legs.
    fn regenerate_child_paths(&mut self, parent: PathId, prev_count: usize, target: usize) {
        let mut current = prev_count;
        let mut kids = self.children.remove(&parent).unwrap_or_default();

        if current == 1 {
            // The wire had no children; it leaves the working set and its
            // legs take its place.
            self.working_paths.retain(|&p| p != parent);
            current = 0;
        } else if target == 1 {
            // Back to a simple wire.
            for kid in kids {
                self.working_paths.retain(|&p| p != kid);
                self.release_path(kid);
            }
            self.working_paths.push(parent);
            return;
        }

        while current < target {
            let at = self.paths[parent].start_point(&self.vertices);
            let s = self.vertices.insert(Vertex::endpoint(at));
            let e = self.vertices.insert(Vertex::endpoint(at));
            let kid = self.paths.insert(Path::new(s, e));
            self.working_paths.push(kid);
            kids.push(kid);
            current += 1;
        }
        while current > target {
            if let Some(kid) = kids.pop() {
                self.working_paths.retain(|&p| p != kid);
                self.release_path(kid);
            }
            current -= 1;
        }

        self.children.insert(parent, kids);
    }

    /// Points each child of `parent` at its leg between consecutive control
    /// points: start, bend 0, bend 1, ..., end.
    fn refresh_children_endpoints(&mut self, parent: PathId) {
        let Some(kids) = self.children.get(&parent).cloned() else {
            return;
        };
        let (mut previous, parent_end, bendpoints) = {
            let p = &self.paths[parent];
            (
                p.start_point(&self.vertices),
                p.end_point(&self.vertices),
                p.bendpoints.clone().unwrap_or_default(),
            )
        };

        for (i, kid) in kids.iter().enumerate() {
            let next = if i < bendpoints.len() {
                bendpoints[i]
            } else {
                parent_end
            };
            let Self {
                paths, vertices, ..
            } = self;
            let path = &mut paths[*kid];
            path.set_start_point(previous, vertices);
            path.set_end_point(next, vertices);
            previous = next;
        }
    }

    /// Concatenates each parent's child polylines back into the parent,
    /// dropping the duplicated junction points.
    pub(crate) fn recombine_children_paths(&mut self) {
        let parents: Vec<PathId> = self
            .user_paths
            .iter()
            .copied()
            .filter(|p| self.children.contains_key(p))
            .collect();

        for parent in parents {
            let kids = self.children.get(&parent).cloned().unwrap_or_default();
            {
                let Self {
                    paths, vertices, ..
                } = self;
                paths[parent].full_reset(vertices);
            }

            for kid in &kids {
                let (kid_points, kid_segments, kid_visible) = {
                    let k = &self.paths[*kid];
                    (
                        k.points.clone(),
                        k.segments.clone(),
                        k.visible_obstacles.clone(),
                    )
                };
                let p = &mut self.paths[parent];
                if !kid_points.is_empty() {
                    p.points.extend(kid_points);
                    // Each leg's last point is the next leg's first.
                    p.points.pop();
                }
                p.segments.extend(kid_segments);
                p.visible_obstacles.extend_from(&kid_visible);
            }

            let last_point = kids
                .last()
                .and_then(|k| self.paths[*k].points.last().copied());
            if let Some(point) = last_point {
                self.paths[parent].points.push(point);
            }
        }
    }

    // ---- housekeeping ---------------------------------------------------

    /// Frees a wire and its endpoint vertices. Only for wires whose
    /// endpoints are exclusively theirs (user wires and bendpoint
    /// children), never for subpaths.
    fn release_path(&mut self, path: PathId) {
        if let Some(removed) = self.paths.remove(path) {
            self.vertices.remove(removed.start);
            self.vertices.remove(removed.end);
        }
    }

    /// Releases per-solve buffers on every working wire.
    fn cleanup(&mut self) {
        let working = self.working_paths.clone();
        for path_id in working {
            self.paths[path_id].cleanup();
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

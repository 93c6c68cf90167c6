//! Wire routing requests.

use std::any::Any;

use wire_geom::GridPoint;

use crate::arena::{Key, Pool};
use crate::obstacle::ObstacleId;
use crate::ordered::OrderedSet;
use crate::vertex::{BendKind, Vertex, VertexId};
use crate::{COLD_OVAL_FACTOR, RESOLVE_OVAL_FACTOR};

/// Typed key for a [`Path`] in the router's path pool.
pub type PathId = Key<Path>;

/// A directed segment between two vertices of the visibility graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seg {
    /// Segment origin.
    pub start: VertexId,
    /// Segment destination.
    pub end: VertexId,
}

impl Seg {
    /// Creates a segment from `start` to `end`.
    #[must_use]
    pub const fn new(start: VertexId, end: VertexId) -> Self {
        Self { start, end }
    }
}

/// One wire routing request and its solver workspace.
///
/// A path runs from `start` to `end`, optionally through mandatory
/// bendpoints. The solved polyline is read from [`Path::points`]; an empty
/// point list after a solve means no route was found.
///
/// Most fields are workspace the router threads state through:
/// `segments` holds the raw shortest-path output, `grown_segments` the
/// deflected version after grow passes, and the `visible_*` sets the wire's
/// private view of the visibility graph. `threshold` and `prev_cost_ratio`
/// drive the search-pruning oval.
pub struct Path {
    /// Start vertex (an endpoint vertex, no owning obstacle).
    pub start: VertexId,
    /// End vertex (an endpoint vertex, no owning obstacle).
    pub end: VertexId,
    /// Mandatory intermediate points, if any.
    pub bendpoints: Option<Vec<GridPoint>>,

    /// Shortest-path output: vertex-to-vertex segments from start to end.
    pub segments: Vec<Seg>,
    /// Segments after grow/deflection passes split them around corners.
    pub grown_segments: Vec<Seg>,
    /// The solved polyline.
    pub points: Vec<GridPoint>,

    /// Obstacles discovered while building this wire's visibility graph.
    pub visible_obstacles: OrderedSet<ObstacleId>,
    /// Vertices linked into this wire's visibility graph.
    pub visible_vertices: OrderedSet<VertexId>,
    /// Obstacles containing this wire's endpoints, excluded from blocking
    /// tests while the wire solves.
    pub excluded_obstacles: Vec<ObstacleId>,

    /// Whether this wire must be re-searched on the next solve.
    pub is_dirty: bool,
    /// Whether the INNIE/OUTIE labels along this wire are globally flipped.
    pub is_inverted: bool,
    /// Depth-first traversal marker shared by the labeling and ordering
    /// passes.
    pub is_marked: bool,

    /// Pruning bound: candidate segments whose endpoints leave the ellipse
    /// with foci at the endpoints and total distance `threshold` are
    /// discarded. `0` disables pruning.
    pub threshold: f64,
    /// Previous solution cost over the straight-line distance; seeds the
    /// next threshold.
    pub prev_cost_ratio: f64,

    /// Wire split off when labeling found an irreconcilable disagreement.
    pub sub_path: Option<PathId>,

    /// Caller-attached payload, ignored by the router.
    pub data: Option<Box<dyn Any>>,
}

impl Path {
    /// Creates a path between two endpoint vertices. New paths start dirty.
    #[must_use]
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Self {
            start,
            end,
            bendpoints: None,
            segments: Vec::new(),
            grown_segments: Vec::new(),
            points: Vec::new(),
            visible_obstacles: OrderedSet::new(),
            visible_vertices: OrderedSet::new(),
            excluded_obstacles: Vec::new(),
            is_dirty: true,
            is_inverted: false,
            is_marked: false,
            threshold: 0.0,
            prev_cost_ratio: 0.0,
            sub_path: None,
            data: None,
        }
    }

    /// The solved polyline. Empty when the wire has not been solved or no
    /// route was found.
    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// The mandatory intermediate points, if any.
    #[must_use]
    pub fn bend_points(&self) -> Option<&[GridPoint]> {
        self.bendpoints.as_deref()
    }

    /// Sets the mandatory intermediate points and dirties the wire.
    pub fn set_bend_points(&mut self, bendpoints: Option<Vec<GridPoint>>) {
        self.bendpoints = bendpoints;
        self.is_dirty = true;
    }

    /// The start coordinates.
    #[must_use]
    pub fn start_point(&self, vertices: &Pool<Vertex>) -> GridPoint {
        vertices[self.start].pos
    }

    /// The end coordinates.
    #[must_use]
    pub fn end_point(&self, vertices: &Pool<Vertex>) -> GridPoint {
        vertices[self.end].pos
    }

    /// Moves the start to `p`. A move to the current position is a no-op;
    /// otherwise the old endpoint vertex is released and the wire dirtied.
    pub fn set_start_point(&mut self, p: GridPoint, vertices: &mut Pool<Vertex>) {
        if vertices[self.start].pos == p {
            return;
        }
        vertices.remove(self.start);
        self.start = vertices.insert(Vertex::endpoint(p));
        self.is_dirty = true;
    }

    /// Moves the end to `p`. A move to the current position is a no-op;
    /// otherwise the old endpoint vertex is released and the wire dirtied.
    pub fn set_end_point(&mut self, p: GridPoint, vertices: &mut Pool<Vertex>) {
        if vertices[self.end].pos == p {
            return;
        }
        vertices.remove(self.end);
        self.end = vertices.insert(Vertex::endpoint(p));
        self.is_dirty = true;
    }

    /// Returns `true` if the obstacle is part of this wire's visibility
    /// graph.
    #[must_use]
    pub fn is_obstacle_visible(&self, obstacle: ObstacleId) -> bool {
        self.visible_obstacles.contains(obstacle)
    }

    /// Resets the fields rebuilt by the passes that run after the search:
    /// grow, label, order, bend.
    pub fn reset_partial(&mut self) {
        self.is_marked = false;
        self.is_inverted = false;
        self.sub_path = None;
        self.is_dirty = false;
        self.grown_segments.clear();
        self.points.clear();
    }

    /// Resets everything for a fresh search and recomputes the pruning
    /// threshold.
    ///
    /// A cold wire gets `distance * COLD_OVAL_FACTOR`; a re-solved wire
    /// scales the straight-line distance by its previous cost ratio instead,
    /// padded by `RESOLVE_OVAL_FACTOR`.
    pub fn full_reset(&mut self, vertices: &Pool<Vertex>) {
        self.visible_vertices.clear();
        self.segments.clear();
        let distance = self.start_point(vertices).distance(self.end_point(vertices));
        if self.prev_cost_ratio == 0.0 {
            self.threshold = distance * COLD_OVAL_FACTOR;
        } else {
            self.threshold = self.prev_cost_ratio * RESOLVE_OVAL_FACTOR * distance;
        }
        self.visible_obstacles.clear();
        self.reset_partial();
    }

    /// Flips the labels of every vertex this wire passed before
    /// `stop_index`.
    ///
    /// Called when the wire discovers mid-labeling that it is inverted and
    /// has to rectify the labels it assigned before it knew.
    pub fn invert_prior_vertices(&mut self, stop_index: usize, vertices: &mut Pool<Vertex>) {
        for seg in &self.grown_segments[..stop_index] {
            let vertex = &mut vertices[seg.end];
            vertex.kind = match vertex.kind {
                BendKind::Innie => BendKind::Outie,
                _ => BendKind::Innie,
            };
        }
    }

    /// Releases the per-solve buffers that are not needed between solves.
    pub fn cleanup(&mut self) {
        self.visible_vertices.clear();
    }
}

//! Shortest-path search over a wire's visibility graph.
//!
//! Dijkstra with labels stored on the vertices themselves: `cost` and
//! `label` (predecessor) live in the shared vertex arena and are wiped by
//! the router between wires. The minimum is found by a linear scan in
//! insertion order, which is what makes equal-cost tie-breaks
//! deterministic.

use wire_model::{PathId, Seg};

use crate::router::Router;

impl Router {
    /// Searches the wire's visibility graph and reconstructs the segment
    /// chain. Returns `false` when the graph has a gap or the end is
    /// unreachable.
    pub(crate) fn determine_shortest_path(&mut self, path_id: PathId) -> bool {
        if !self.label_graph(path_id) {
            return false;
        }

        let (start, end) = {
            let path = &self.paths[path_id];
            (path.start, path.end)
        };
        let distance = self.vertices[start].pos.distance(self.vertices[end].pos);
        self.paths[path_id].prev_cost_ratio = self.vertices[end].cost / distance;

        let mut segments: Vec<Seg> = Vec::new();
        let mut vertex = end;
        while vertex != start {
            let Some(previous) = self.vertices[vertex].label else {
                return false;
            };
            segments.push(Seg::new(previous, vertex));
            vertex = previous;
        }
        segments.reverse();
        self.paths[path_id].segments = segments;
        true
    }

    /// Labels the graph with costs from the wire's start.
    ///
    /// Returns `false` when the scan reaches a vertex with no neighbors,
    /// meaning the graph never connected; the caller treats that as "no
    /// route" and may retry without pruning.
    fn label_graph(&mut self, path_id: PathId) -> bool {
        let (start, visible) = {
            let path = &self.paths[path_id];
            (path.start, path.visible_vertices.as_slice().to_vec())
        };

        let mut num_permanent = 1usize;
        let mut vertex = start;
        self.vertices[start].is_permanent = true;

        while num_permanent != visible.len() {
            let neighbors = self.vertices[vertex].neighbors.clone();
            if neighbors.is_empty() {
                return false;
            }

            let base_cost = self.vertices[vertex].cost;
            let from = self.vertices[vertex].pos;
            for neighbor_id in neighbors {
                let to = self.vertices[neighbor_id].pos;
                let neighbor = &mut self.vertices[neighbor_id];
                if neighbor.is_permanent {
                    continue;
                }
                let new_cost = base_cost + from.distance(to);
                if neighbor.label.is_none() || neighbor.cost > new_cost {
                    neighbor.label = Some(vertex);
                    neighbor.cost = new_cost;
                }
            }

            // Pick the cheapest labeled, non-permanent vertex by linear
            // scan. When none is labeled yet the current vertex is kept,
            // which drains the loop and reports the end as unreachable.
            let mut smallest = 0.0f64;
            for &candidate_id in &visible {
                let candidate = &self.vertices[candidate_id];
                if !candidate.is_permanent
                    && candidate.label.is_some()
                    && (candidate.cost < smallest || smallest == 0.0)
                {
                    smallest = candidate.cost;
                    vertex = candidate_id;
                }
            }

            self.vertices[vertex].is_permanent = true;
            num_permanent += 1;
        }
        true
    }
}

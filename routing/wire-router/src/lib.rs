//! Obstacle-avoiding polyline routing for diagram wires.
//!
//! Given a set of rectangular obstacles and a set of wires (each a start
//! point, an end point, and optional mandatory bendpoints), the
//! [`Router`] computes an integer polyline per wire that:
//!
//! - never crosses the strict interior of an obstacle,
//! - bends only at obstacle corners or user bendpoints,
//! - fans out from other wires sharing the same corner, so bundles of
//!   wires stay readable instead of overlapping.
//!
//! Routing is incremental: obstacles and wires can be added, moved, and
//! removed between solves, and only the wires affected by a change are
//! re-searched.
//!
//! # Quick Start
//!
//! ```
//! use wire_router::{solve_for, GridPoint};
//!
//! // One obstacle between the endpoints; the wire detours around it.
//! let points = solve_for(&[(4, 0, 2, 10)], &[], 0, 5, 10, 5).unwrap();
//!
//! assert_eq!(points.first(), Some(&GridPoint::new(0, 5)));
//! assert_eq!(points.last(), Some(&GridPoint::new(10, 5)));
//! assert!(points.len() > 2);
//! ```
//!
//! # The solve pipeline
//!
//! One [`Router::solve`] runs these phases in order:
//!
//! 1. **Search** - each dirty wire builds a visibility graph against the
//!    current obstacles (grown lazily, pruned by a threshold oval) and runs
//!    Dijkstra over it.
//! 2. **Count** - tally how many wires use each corner vertex.
//! 3. **Clearance** - shrink a corner's fan-out offset when a neighboring
//!    obstacle leaves no room for the default spacing.
//! 4. **Grow** - temporarily inflate corners by their fan-out extent and
//!    split wire segments that now collide, inserting new bends.
//! 5. **Label** - mark each bend INNIE or OUTIE by cross product, splitting
//!    inconsistent wires into subpaths.
//! 6. **Order** - depth-first order wires at shared corners by bend angle.
//! 7. **Bend** - materialize integer point lists, offsetting each bend
//!    outward by its vertex offset times a per-wire modifier.
//! 8. **Recombine** - stitch subpaths and bendpoint children back into the
//!    wires the caller owns.
//!
//! The phases communicate through shared vertex state, so their order is
//! load-bearing; see `wire-model` for the state each entity carries.
//!
//! # Determinism
//!
//! Tie-breaks (equal-cost routes, fan-out order, first blocking obstacle)
//! depend on iteration order. Every collection the pipeline iterates is
//! insertion-ordered, so identical input sequences produce identical
//! output, byte for byte.

#![doc(html_root_url = "https://docs.rs/wire-router/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod dijkstra;
mod facade;
mod ordering;
mod router;
mod spread;
mod visibility;

pub use facade::solve_for;
pub use router::Router;

// The common vocabulary, re-exported so most callers only need this crate.
pub use wire_geom::{Compass, GridPoint, GridRect};
pub use wire_model::{Path, PathId, RouteError, DEFAULT_SPACING};

//! Domain entities and solver state for diagram wire routing.
//!
//! This crate defines the entities the routing engine works on and the arena
//! storage that holds them:
//!
//! - [`Obstacle`] - A rectangle wires must route around, with one [`Vertex`]
//!   per corner
//! - [`Vertex`] - An obstacle corner or wire endpoint carrying per-solve
//!   search and fan-out state
//! - [`Path`] - One routing request: endpoints, optional bendpoints, the
//!   visibility-graph workspace, and the solved point list
//! - [`Pool`] / [`Key`] - Generational arenas with typed ids
//!   ([`ObstacleId`], [`VertexId`], [`PathId`])
//! - [`RouteError`] - Error type shared across the routing crates
//!
//! The entities form a deliberately cyclic graph (vertices know their
//! obstacle, paths bend at shared vertices, vertices remember which paths
//! bend there). All cross-references are arena keys rather than pointers, so
//! the router can mutate any entity while holding ids to the rest, and a
//! removed entity invalidates its id everywhere at once.
//!
//! Fields on [`Vertex`] and [`Path`] are public: they are solver workspace,
//! owned and sequenced by the router crate. Callers should treat everything
//! except the documented accessors as internal.
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for the geometric value
//!   types re-exported from `wire-geom`

#![doc(html_root_url = "https://docs.rs/wire-model/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod arena;
pub mod error;
pub mod obstacle;
pub mod ordered;
pub mod path;
pub mod vertex;

pub use arena::{Key, Pool};
pub use error::RouteError;
pub use obstacle::{Obstacle, ObstacleId};
pub use ordered::OrderedSet;
pub use path::{Path, PathId, Seg};
pub use vertex::{BendKind, Vertex, VertexId};

/// Default minimum separation between wires, and between a wire and an
/// obstacle it bends around.
pub const DEFAULT_SPACING: i32 = 4;

/// Number of grow-and-deflect passes per solve. More passes trade time for
/// fewer residual near-collisions.
pub const NUM_GROW_PASSES: usize = 2;

/// Threshold-oval factor applied to the straight-line distance on a cold
/// solve.
pub const COLD_OVAL_FACTOR: f64 = 1.13;

/// Threshold-oval factor applied to the previous cost ratio on a re-solve.
pub const RESOLVE_OVAL_FACTOR: f64 = 1.04;

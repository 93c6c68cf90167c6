//! Integer grid geometry for diagram wire routing.
//!
//! This crate provides the foundational geometric types used by the wire
//! routing engine:
//!
//! - [`GridPoint`] - Integer 2D coordinates
//! - [`GridRect`] - Axis-aligned integer rectangles
//! - [`Compass`] - Bitmask describing where a point lies relative to a rectangle
//! - [`segment`] - Segment predicates: intersection, cross products, slope
//!   sign, and the signed bend cosine used for fanning wires out at a corner
//!
//! # Coordinate System
//!
//! Coordinates are discrete `i32` values with x growing rightward and y
//! growing downward, the usual screen convention for diagram editors.
//! Rectangle boundaries are inclusive of the top and left edges and exclusive
//! of the bottom and right edges, so a rectangle of width 1 covers exactly one
//! grid column.
//!
//! Continuous measurements (distances, cosines) are `f64` and go through
//! `nalgebra` points and vectors.
//!
//! # Example
//!
//! ```
//! use wire_geom::{Compass, GridPoint, GridRect};
//!
//! let rect = GridRect::new(10, 10, 5, 5);
//! assert!(rect.contains(GridPoint::new(10, 10)));
//! assert!(!rect.contains(GridPoint::new(15, 15)));
//!
//! // A point above and to the left of the rectangle
//! let pos = rect.position_of(GridPoint::new(0, 0));
//! assert_eq!(pos, Compass::NORTH_WEST);
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization for the value types

#![doc(html_root_url = "https://docs.rs/wire-geom/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod compass;
pub mod point;
pub mod rect;
pub mod segment;

pub use compass::Compass;
pub use point::GridPoint;
pub use rect::GridRect;
pub use segment::{
    bend_cosine, cross_at, lines_intersect, relative_ccw, segments_intersect, slope_sign,
};

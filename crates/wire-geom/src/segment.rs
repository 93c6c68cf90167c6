//! Segment predicates for visibility testing and corner fan-out.
//!
//! These are the low-level kernels the router leans on: a robust integer
//! segment intersection test, the cross product used to decide which way a
//! wire bends around a corner, the slope sign that selects which obstacle
//! diagonal to test, and the signed cosine key used to order wires sharing a
//! corner.
//!
//! All intermediate arithmetic is `i64` so any pair of `i32` coordinates is
//! exact.

use crate::point::GridPoint;

/// Position of `(px, py)` relative to the directed line from `(x1, y1)` to
/// `(x2, y2)`.
///
/// Returns `-1` or `1` depending on which side of the line the point falls
/// on, and `0` when the point lies on the closed segment. A collinear point
/// beyond an endpoint reports the side it would reach by continuing past that
/// endpoint.
#[must_use]
#[allow(clippy::similar_names)]
pub fn relative_ccw(x1: i32, y1: i32, x2: i32, y2: i32, px: i32, py: i32) -> i32 {
    let dx = i64::from(x2) - i64::from(x1);
    let dy = i64::from(y2) - i64::from(y1);
    let mut qx = i64::from(px) - i64::from(x1);
    let mut qy = i64::from(py) - i64::from(y1);

    let mut ccw = qx * dy - qy * dx;
    if ccw == 0 {
        // Collinear: resolve against the segment extent.
        ccw = qx * dx + qy * dy;
        if ccw > 0 {
            qx -= dx;
            qy -= dy;
            ccw = qx * dx + qy * dy;
            if ccw < 0 {
                ccw = 0;
            }
        }
    }
    match ccw.cmp(&0) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

/// Returns `true` if segment `(x1, y1)-(x2, y2)` intersects segment
/// `(x3, y3)-(x4, y4)`.
///
/// Touching endpoints and collinear overlap both count as intersection.
///
/// # Example
///
/// ```
/// use wire_geom::lines_intersect;
///
/// assert!(lines_intersect(0, 0, 10, 10, 0, 10, 10, 0));
/// assert!(lines_intersect(0, 0, 5, 0, 5, 0, 9, 9)); // shared endpoint
/// assert!(!lines_intersect(0, 0, 5, 0, 0, 1, 5, 1));
/// ```
#[must_use]
#[allow(clippy::similar_names, clippy::too_many_arguments)]
pub fn lines_intersect(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    x3: i32,
    y3: i32,
    x4: i32,
    y4: i32,
) -> bool {
    relative_ccw(x1, y1, x2, y2, x3, y3) * relative_ccw(x1, y1, x2, y2, x4, y4) <= 0
        && relative_ccw(x3, y3, x4, y4, x1, y1) * relative_ccw(x3, y3, x4, y4, x2, y2) <= 0
}

/// Convenience form of [`lines_intersect`] over [`GridPoint`]s.
#[must_use]
pub fn segments_intersect(a1: GridPoint, a2: GridPoint, b1: GridPoint, b2: GridPoint) -> bool {
    lines_intersect(a1.x, a1.y, a2.x, a2.y, b1.x, b1.y, b2.x, b2.y)
}

/// Cross product of the segment `s -> v` with the segment `v -> c`, anchored
/// at the shared vertex `v`.
///
/// The sign tells which side of the incoming segment the point `c` falls on;
/// the router uses it with `c` as an obstacle center to decide whether a wire
/// bends toward or away from the obstacle.
#[must_use]
pub fn cross_at(s: GridPoint, v: GridPoint, c: GridPoint) -> i64 {
    (i64::from(s.x) - i64::from(v.x)) * (i64::from(c.y) - i64::from(v.y))
        - (i64::from(s.y) - i64::from(v.y)) * (i64::from(c.x) - i64::from(v.x))
}

/// Sign-carrying slope indicator for the segment `a -> b`.
///
/// Not the actual slope: the y delta, negated when the segment runs
/// leftward, so the sign alone distinguishes rising from falling segments.
#[must_use]
pub const fn slope_sign(a: GridPoint, b: GridPoint) -> i32 {
    if b.x - a.x >= 0 {
        b.y - a.y
    } else {
        -(b.y - a.y)
    }
}

/// Signed cosine key for the bend `s -> v -> n`.
///
/// Maps the turn at `v` onto a single ordered scale: the magnitude is
/// `1 + cos` of the angle between the incoming direction reversed and the
/// outgoing direction, and the sign comes from the turn direction. Wires
/// sharing a corner are sorted by this key so the sharpest bend ends up
/// outermost.
///
/// Returns `0.0` for a degenerate bend with a zero-length side.
#[must_use]
pub fn bend_cosine(s: GridPoint, v: GridPoint, n: GridPoint) -> f64 {
    let inbound = s.to_vector() - v.to_vector();
    let outbound = n.to_vector() - v.to_vector();
    let len_product = inbound.norm() * outbound.norm();
    if len_product == 0.0 {
        return 0.0;
    }

    let cos = inbound.dot(&outbound) / len_product;
    let sin = (i64::from(s.x) - i64::from(v.x)) * (i64::from(n.y) - i64::from(v.y))
        - (i64::from(s.y) - i64::from(v.y)) * (i64::from(n.x) - i64::from(v.x));
    if sin < 0 {
        1.0 + cos
    } else {
        -(1.0 + cos)
    }
}

//! One-shot solving facade.

use wire_geom::{GridPoint, GridRect};
use wire_model::RouteError;

use crate::router::Router;

/// Routes a single wire from `(x1, y1)` to `(x2, y2)` around the given
/// obstacles, through the given bendpoints.
///
/// Obstacles are `(x, y, width, height)` tuples, bendpoints `(x, y)`
/// tuples. The result starts exactly at `(x1, y1)` and ends exactly at
/// `(x2, y2)`; an empty result means no route exists.
///
/// This is the convenience entry point for callers that do not need
/// incremental solving; build a [`Router`] directly to route many wires or
/// to update obstacles between solves.
///
/// # Errors
///
/// Returns [`RouteError::InvalidInput`] if an obstacle has a non-positive
/// width or height, and propagates any internal routing error.
///
/// # Example
///
/// ```
/// use wire_router::{solve_for, GridPoint};
///
/// // No obstacles: the wire is a straight line.
/// let points = solve_for(&[], &[], 0, 0, 10, 10).unwrap();
/// assert_eq!(points, vec![GridPoint::new(0, 0), GridPoint::new(10, 10)]);
///
/// // A mandatory bendpoint forces a detour.
/// let points = solve_for(&[], &[(5, 5)], 0, 0, 10, 0).unwrap();
/// assert_eq!(
///     points,
///     vec![
///         GridPoint::new(0, 0),
///         GridPoint::new(5, 5),
///         GridPoint::new(10, 0),
///     ]
/// );
/// ```
pub fn solve_for(
    obstacles: &[(i32, i32, i32, i32)],
    bendpoints: &[(i32, i32)],
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
) -> Result<Vec<GridPoint>, RouteError> {
    let mut router = Router::new();

    for &(x, y, width, height) in obstacles {
        if width <= 0 || height <= 0 {
            return Err(RouteError::invalid_input(format!(
                "obstacle ({x}, {y}, {width}, {height}) must have positive width and height"
            )));
        }
        router.add_obstacle(GridRect::new(x, y, width, height));
    }

    let wire = router.add_path(GridPoint::new(x1, y1), GridPoint::new(x2, y2));
    if !bendpoints.is_empty() {
        let bends = bendpoints
            .iter()
            .map(|&(x, y)| GridPoint::new(x, y))
            .collect();
        router.set_bend_points(wire, Some(bends));
    }

    router.solve()?;

    Ok(router
        .points(wire)
        .map(<[GridPoint]>::to_vec)
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_obstacle() {
        let result = solve_for(&[(0, 0, 0, 5)], &[], 0, 0, 10, 10);
        assert!(result.is_err());
        assert!(result.unwrap_err().is_invalid_input());

        let result = solve_for(&[(0, 0, 5, -1)], &[], 0, 0, 10, 10);
        assert!(result.unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_empty_world_is_straight() {
        let points = solve_for(&[], &[], 0, 0, 10, 10).unwrap();
        assert_eq!(points, vec![GridPoint::new(0, 0), GridPoint::new(10, 10)]);
    }

    #[test]
    fn test_endpoints_always_exact() {
        let points = solve_for(&[(4, 0, 2, 10)], &[], 0, 5, 10, 5).unwrap();
        assert_eq!(points.first(), Some(&GridPoint::new(0, 5)));
        assert_eq!(points.last(), Some(&GridPoint::new(10, 5)));
    }
}

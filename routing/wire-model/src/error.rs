//! Error types for routing operations.

use wire_geom::{GridPoint, GridRect};

/// Errors that can occur while routing wires.
///
/// Geometric infeasibility is deliberately not an error: a wire with no legal
/// route solves to an empty point list. Errors are reserved for inputs the
/// engine cannot interpret and for internal invariant breaks.
///
/// # Example
///
/// ```
/// use wire_model::RouteError;
///
/// let error = RouteError::invalid_input("obstacle width must be positive");
/// assert!(error.is_invalid_input());
/// assert!(error.to_string().contains("width"));
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RouteError {
    /// The caller handed the facade something it cannot interpret, such as
    /// an obstacle rectangle with a non-positive width or height.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A wire endpoint fell through every legal attachment case against an
    /// obstacle while building the visibility graph.
    ///
    /// This indicates a bug in the routing engine or a pathological input;
    /// every point outside an obstacle, and every point on its one-cell
    /// boundary ring, has a defined attachment.
    #[error("endpoint {vertex} has no legal attachment on obstacle at {bounds:?}")]
    UnexpectedVertexPosition {
        /// The endpoint being attached.
        vertex: GridPoint,
        /// The obstacle it could not be attached to.
        bounds: GridRect,
    },
}

impl RouteError {
    /// Creates an [`RouteError::InvalidInput`] with the given message.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns `true` if this is an invalid-input error.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let error = RouteError::invalid_input("bendpoint out of range");
        assert!(error.to_string().contains("invalid input"));
        assert!(error.to_string().contains("bendpoint"));
    }

    #[test]
    fn test_unexpected_vertex_position_display() {
        let error = RouteError::UnexpectedVertexPosition {
            vertex: GridPoint::new(3, 4),
            bounds: GridRect::new(0, 0, 8, 8),
        };
        let msg = error.to_string();
        assert!(msg.contains("(3, 4)"));
        assert!(msg.contains("no legal attachment"));
        assert!(!error.is_invalid_input());
    }
}

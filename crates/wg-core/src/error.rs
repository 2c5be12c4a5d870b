//! Generation errors
//!
//! Every variant is a deterministic configuration error raised at the call
//! that caused it. Reads and writes that cannot reach a materialized region
//! are not errors; they resolve to `None` or are dropped.

use thiserror::Error;

use crate::position::Axis;

/// Errors raised by world construction, lattice movement and pattern
/// compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("invalid bounds on {axis} axis: min must be <= 0 and max must be >= 0")]
    InvalidBounds { axis: Axis },

    #[error("{axis} axis wraps but does not define both a minimum and a maximum")]
    WrapBoundsUndefined { axis: Axis },

    #[error("no region types defined")]
    NoRegionTypesDefined,

    #[error("invalid region type: '{0}'")]
    InvalidRegionType(String),

    #[error("move would leave the world bounds")]
    OutOfBounds,

    #[error("pattern dimensions must be odd, got {rows}x{cols}")]
    InvalidPatternShape { rows: usize, cols: usize },
}

/// Convenience alias used across the crate.
pub type GenResult<T> = Result<T, GenError>;

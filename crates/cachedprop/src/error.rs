//! Error types for cachedprop

use std::convert::Infallible;
use std::fmt;

/// Result type alias for cache operations
///
/// `E` is the error type of the wrapped computation. Construction never
/// runs a computation, so it uses the default `Infallible`.
pub type Result<T, E = Infallible> = std::result::Result<T, Error<E>>;

/// Error types for cache construction and lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error<E = Infallible> {
    /// The host does not expose the configured invalidation field
    MissingInvalidationField {
        /// Name of the field that was looked up
        field: String,
    },

    /// The computation failed; carried as-is
    Compute(E),

    /// The requested capacity cannot be honored
    UnsupportedCapacityPolicy {
        /// Capacity passed at construction; `None` is unbounded
        requested: Option<usize>,
    },
}

impl<E> Error<E> {
    /// Returns the computation error, if that is what this is
    pub fn into_compute(self) -> Option<E> {
        match self {
            Error::Compute(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this error came from the computation
    pub fn is_compute(&self) -> bool {
        matches!(self, Error::Compute(_))
    }

    /// Re-type a cache error that cannot carry a computation failure
    pub fn widen(err: Error<Infallible>) -> Self {
        match err {
            Error::MissingInvalidationField { field } => Error::MissingInvalidationField { field },
            Error::UnsupportedCapacityPolicy { requested } => {
                Error::UnsupportedCapacityPolicy { requested }
            }
            Error::Compute(never) => match never {},
        }
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingInvalidationField { field } => {
                write!(f, "Instance variable {} does not exist", field)
            }
            Error::Compute(e) => write!(f, "Compute failed: {}", e),
            Error::UnsupportedCapacityPolicy {
                requested: Some(n),
            } => write!(
                f,
                "Unsupported capacity policy: {} entries (must be at least 1)",
                n
            ),
            Error::UnsupportedCapacityPolicy { requested: None } => write!(
                f,
                "Unsupported capacity policy: unbounded history needs a hashed key"
            ),
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Compute(e) => Some(e),
            _ => None,
        }
    }
}

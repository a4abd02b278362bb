use std::collections::TryReserveError;
use std::fmt::{self, Debug, Display};

/// Boxed error produced by user supplied factory and teardown hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Configuration rejected while building a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Capacity must be at least one.
    #[error("capacity must be greater than zero: {0}")]
    InvalidCapacity(i64),
    /// Floor must not be negative.
    #[error("floor must not be negative: {0}")]
    InvalidFloor(i64),
    /// More resources requested up front than the pool can hold.
    #[error("floor is greater than capacity: {floor} > {capacity}")]
    FloorExceedsCapacity { floor: i64, capacity: i64 },
    /// A non-zero floor needs a factory to create the resources.
    #[error("cannot prefill a non-zero floor without a factory")]
    MissingFactory,
    /// Shard width must be one of the supported nibble boundaries.
    #[error("shard width must be a nibble boundary (16, 256 or 4096): {0}")]
    InvalidWidth(usize),
    /// Total capacity of a sharded pool does not fit in `usize`.
    #[error("shard depth overflows total capacity: {width} * {depth}")]
    ShardOverflow { width: usize, depth: usize },
}

/// Errors returned by pool operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pool configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The factory failed while prefilling the pool.
    #[error("resource factory failed: {0}")]
    Factory(#[source] BoxError),
    /// Storage for the requested capacity could not be reserved.
    #[error("cannot reserve storage for {capacity} resources")]
    Storage {
        capacity: usize,
        #[source]
        source: TryReserveError,
    },
    /// The pool was used after [`close`](crate::ResourcePool::close).
    #[error("pool closed")]
    Closed,
    /// One or more resources failed to tear down.
    #[error(transparent)]
    Teardown(#[from] TeardownError),
}

impl Error {
    /// Whether this error reports use of a closed pool.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }
}

/// Every teardown failure collected while closing a pool.
///
/// The display form joins the individual messages with `", "`, in the order
/// the resources were stored.
#[derive(Debug, Default)]
pub struct TeardownError {
    errors: Vec<BoxError>,
}

impl TeardownError {
    pub(crate) fn push(&mut self, err: BoxError) {
        self.errors.push(err);
    }

    pub(crate) fn extend(&mut self, other: TeardownError) {
        self.errors.extend(other.errors);
    }

    /// Returns `Err(self)` if any failure was collected.
    pub(crate) fn into_result(self) -> Result<(), TeardownError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// The individual teardown failures.
    pub fn errors(&self) -> &[BoxError] {
        &self.errors
    }

    /// Number of resources that failed to tear down.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether no failure was collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Take the individual failures, in storage order.
    pub fn into_errors(self) -> Vec<BoxError> {
        self.errors
    }
}

impl Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(err, f)?;
        }
        Ok(())
    }
}

impl std::error::Error for TeardownError {}

/// A resource handed back by [`put`](crate::ResourcePool::put) because the
/// pool is closed.
pub struct PutError<T>(pub T);

impl<T> PutError<T> {
    /// Take back the rejected resource.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutError").finish_non_exhaustive()
    }
}

impl<T> Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("pool closed")
    }
}

impl<T> std::error::Error for PutError<T> {}

impl<T> From<PutError<T>> for Error {
    fn from(_: PutError<T>) -> Self {
        Error::Closed
    }
}

/// A resource handed back by [`try_put`](crate::ResourcePool::try_put).
pub enum TryPutError<T> {
    /// The pool is at capacity.
    Full(T),
    /// The pool is closed.
    Closed(T),
}

impl<T> TryPutError<T> {
    /// Take back the rejected resource.
    pub fn into_inner(self) -> T {
        match self {
            TryPutError::Full(item) | TryPutError::Closed(item) => item,
        }
    }

    /// Whether the pool was at capacity.
    pub fn is_full(&self) -> bool {
        matches!(self, TryPutError::Full(_))
    }

    /// Whether the pool was closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, TryPutError::Closed(_))
    }
}

impl<T> Debug for TryPutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryPutError::Full(_) => f.write_str("Full(..)"),
            TryPutError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> Display for TryPutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryPutError::Full(_) => f.write_str("pool full"),
            TryPutError::Closed(_) => f.write_str("pool closed"),
        }
    }
}

impl<T> std::error::Error for TryPutError<T> {}

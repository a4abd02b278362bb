use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, ConfigError};

/// Capacity used when neither capacity nor floor is configured.
pub const DEFAULT_CAPACITY: usize = 100;

/// Creates a new resource.
pub type FactoryFn<T> = dyn Fn() -> Result<T, BoxError> + Send + Sync;
/// Sanitizes a resource before it re-enters the pool.
pub type ResetFn<T> = dyn Fn(&mut T) + Send + Sync;
/// Releases the external state of a resource when the pool closes.
pub type TeardownFn<T> = dyn Fn(T) -> Result<(), BoxError> + Send + Sync;

/// Numeric pool settings as read from external input.
///
/// Values are signed so that negative input is reported as a configuration
/// error instead of wrapping.
///
/// # Example
///
/// ```rust
/// use bounded_pool::{Builder, Settings};
///
/// let settings = Settings { capacity: Some(8), floor: 2 };
/// let pool = Builder::new()
///     .settings(settings)
///     .factory(|| Ok::<_, std::io::Error>(Vec::<u8>::new()))
///     .build()
///     .unwrap();
/// assert_eq!(pool.capacity(), 8);
/// assert_eq!(pool.available(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Maximum number of resident resources. When unset, the floor is used
    /// if it is positive, otherwise [`DEFAULT_CAPACITY`].
    pub capacity: Option<i64>,
    /// Number of resources created eagerly at construction.
    pub floor: i64,
}

impl Settings {
    fn resolved_capacity(&self) -> i64 {
        match self.capacity {
            Some(capacity) => capacity,
            None if self.floor > 0 => self.floor,
            None => DEFAULT_CAPACITY as i64,
        }
    }
}

/// Callbacks injected into a pool.
pub(crate) struct Hooks<T> {
    pub(crate) factory: Option<Arc<FactoryFn<T>>>,
    pub(crate) reset: Option<Arc<ResetFn<T>>>,
    pub(crate) teardown: Option<Arc<TeardownFn<T>>>,
}

impl<T> Default for Hooks<T> {
    fn default() -> Self {
        Self {
            factory: None,
            reset: None,
            teardown: None,
        }
    }
}

impl<T> Clone for Hooks<T> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            reset: self.reset.clone(),
            teardown: self.teardown.clone(),
        }
    }
}

/// Validated, immutable configuration of a pool.
///
/// Obtained from [`Builder::config`](crate::Builder::config) and consumed by
/// [`Pool::with_config`](crate::Pool::with_config).
pub struct Config<T> {
    capacity: usize,
    floor: usize,
    pub(crate) hooks: Hooks<T>,
}

impl<T> Config<T> {
    /// Apply the settings and check them against the supplied hooks.
    pub(crate) fn validate(settings: Settings, hooks: Hooks<T>) -> Result<Self, ConfigError> {
        let capacity = settings.resolved_capacity();
        if capacity <= 0 {
            return Err(ConfigError::InvalidCapacity(capacity));
        }
        let floor = settings.floor;
        if floor < 0 {
            return Err(ConfigError::InvalidFloor(floor));
        }
        if floor > capacity {
            return Err(ConfigError::FloorExceedsCapacity { floor, capacity });
        }
        if floor > 0 && hooks.factory.is_none() {
            return Err(ConfigError::MissingFactory);
        }
        Ok(Self {
            capacity: usize::try_from(capacity)
                .map_err(|_| ConfigError::InvalidCapacity(capacity))?,
            floor: usize::try_from(floor).map_err(|_| ConfigError::InvalidFloor(floor))?,
            hooks,
        })
    }

    /// Configuration assembled internally; the caller guarantees the invariants.
    pub(crate) fn from_parts(capacity: usize, floor: usize, hooks: Hooks<T>) -> Self {
        debug_assert!(capacity > 0 && floor <= capacity);
        debug_assert!(floor == 0 || hooks.factory.is_some());
        Self {
            capacity,
            floor,
            hooks,
        }
    }

    /// Maximum number of resident resources.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resources created at construction.
    pub fn floor(&self) -> usize {
        self.floor
    }
}

impl<T> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("capacity", &self.capacity)
            .field("floor", &self.floor)
            .field("factory", &self.hooks.factory.is_some())
            .field("reset", &self.hooks.reset.is_some())
            .field("teardown", &self.hooks.teardown.is_some())
            .finish()
    }
}

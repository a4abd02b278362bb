use std::sync::Arc;

use crate::config::{Config, Hooks, Settings};
use crate::error::{BoxError, ConfigError, Error};
use crate::{Pool, ShardedPool};

/// A builder for creating a [`Pool`] or [`ShardedPool`] with custom configuration.
///
/// # Example
///
/// ```rust
/// use bounded_pool::Builder;
///
/// let pool = Builder::new()
///     .capacity(10)
///     .floor(5)
///     .factory(|| Ok::<_, std::io::Error>(String::with_capacity(64)))
///     .reset(String::clear)
///     .build()
///     .unwrap();
/// assert_eq!(pool.capacity(), 10);
/// assert_eq!(pool.available(), 5);
/// ```
pub struct Builder<T> {
    settings: Settings,
    hooks: Hooks<T>,
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Builder<T> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            hooks: Hooks::default(),
        }
    }

    /// Set the maximum number of resources the pool holds.
    pub fn capacity(&mut self, capacity: i64) -> &mut Self {
        self.settings.capacity = Some(capacity);
        self
    }

    /// Set the number of resources created when the pool is built.
    pub fn floor(&mut self, floor: i64) -> &mut Self {
        self.settings.floor = floor;
        self
    }

    /// Replace capacity and floor with externally loaded settings.
    pub fn settings(&mut self, settings: Settings) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Set the function used to create resources.
    pub fn factory<F, E>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
        T: 'static,
    {
        self.hooks.factory = Some(Arc::new(move || -> Result<T, BoxError> {
            factory().map_err(Into::into)
        }));
        self
    }

    /// Set the function applied to a resource before it is returned to the pool.
    pub fn reset<F>(&mut self, reset: F) -> &mut Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        self.hooks.reset = Some(Arc::new(reset));
        self
    }

    /// Set the function that releases a resource when the pool is closed.
    pub fn teardown<F, E>(&mut self, teardown: F) -> &mut Self
    where
        F: Fn(T) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
        T: 'static,
    {
        self.hooks.teardown = Some(Arc::new(move |item: T| -> Result<(), BoxError> {
            teardown(item).map_err(Into::into)
        }));
        self
    }

    /// Apply all settings and validate them.
    ///
    /// The builder is reset to its defaults.
    pub fn config(&mut self) -> Result<Config<T>, ConfigError> {
        let settings = std::mem::take(&mut self.settings);
        let hooks = std::mem::take(&mut self.hooks);
        Config::validate(settings, hooks)
    }

    /// Build a single pool with the current configuration.
    pub fn build(&mut self) -> Result<Pool<T>, Error> {
        let config = self.config()?;
        Pool::with_config(config)
    }

    /// Build a sharded pool holding at least `capacity` resources, picking
    /// the shard width with [`shard_width`](crate::shard_width).
    pub fn build_sharded(&mut self) -> Result<ShardedPool<T>, Error> {
        let config = self.config()?;
        let width = crate::shard_width(config.capacity());
        ShardedPool::with_config(width, config)
    }

    /// Build a sharded pool with an explicit shard width.
    ///
    /// `width` must be 16, 256 or 4096. The configured capacity is spread
    /// evenly, so each shard holds `ceil(capacity / width)` resources.
    pub fn build_sharded_with_width(&mut self, width: usize) -> Result<ShardedPool<T>, Error> {
        let config = self.config()?;
        ShardedPool::with_config(width, config)
    }
}

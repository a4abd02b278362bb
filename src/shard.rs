use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::Relaxed;

use crate::config::{Config, Hooks};
use crate::error::{ConfigError, Error, PutError, TeardownError, TryPutError};
use crate::{Pool, ResourcePool};

/// Shard widths supported by [`ShardedPool`].
pub const SHARD_WIDTHS: [usize; 3] = [16, 256, 4096];

/// A shard width is only picked if each shard would hold more than this
/// many resources.
pub const MIN_SHARD_DEPTH: usize = 8;

/// Pick the shard width for a pool holding `count` resources.
///
/// The widest of 4096 and 256 whose depth `count / width` exceeds
/// [`MIN_SHARD_DEPTH`] is chosen, otherwise 16.
///
/// # Example
///
/// ```rust
/// use bounded_pool::shard_width;
///
/// assert_eq!(shard_width(100), 16);
/// assert_eq!(shard_width(10_000), 256);
/// assert_eq!(shard_width(1_000_000), 4096);
/// ```
pub fn shard_width(count: usize) -> usize {
    if count / 4096 > MIN_SHARD_DEPTH {
        4096
    } else if count / 256 > MIN_SHARD_DEPTH {
        256
    } else {
        16
    }
}

fn mask_for(width: usize) -> Result<usize, ConfigError> {
    match width {
        16 => Ok(0xf),
        256 => Ok(0xff),
        4096 => Ok(0xfff),
        _ => Err(ConfigError::InvalidWidth(width)),
    }
}

/// Share of `floor` prefilled by shard `index`; the first `floor % width`
/// shards take one extra.
fn shard_floor(floor: usize, width: usize, index: usize) -> usize {
    floor / width + usize::from(index < floor % width)
}

/// A pool split into independent [`Pool`] shards to reduce lock contention.
///
/// `get` and `put` are routed round-robin by two independent counters, so
/// a resource is not necessarily put back into the shard it came from, and
/// a `get` may block on an empty shard while other shards hold resources.
/// Under skewed workloads per-shard occupancy drifts from the average; this
/// is the price of not sharing a lock.
///
/// # Example
///
/// ```rust
/// use bounded_pool::ShardedPool;
/// use std::sync::Arc;
///
/// let pool = Arc::new(ShardedPool::with_count(64).unwrap());
/// assert_eq!(pool.width(), 16);
/// assert_eq!(pool.depth(), 4);
/// for _ in 0..pool.capacity() {
///     pool.put(vec![0u8; 16]).unwrap();
/// }
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let pool = pool.clone();
///         std::thread::spawn(move || {
///             for _ in 0..1000 {
///                 let buf = pool.get().unwrap();
///                 pool.put(buf).unwrap();
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(pool.available(), 64);
/// ```
pub struct ShardedPool<T> {
    shards: Box<[Pool<T>]>,
    mask: usize,
    depth: usize,
    /// Routing counter for `get`.
    gets: AtomicUsize,
    /// Routing counter for `put`.
    puts: AtomicUsize,
}

impl<T> ShardedPool<T> {
    /// Create an empty sharded pool for at least `count` resources, picking
    /// the width with [`shard_width`].
    pub fn with_count(count: usize) -> Result<Self, Error> {
        let width = shard_width(count);
        Self::with_width(width, count.div_ceil(width))
    }

    /// Create an empty sharded pool of `width` shards holding `depth`
    /// resources each. `width` must be one of [`SHARD_WIDTHS`].
    pub fn with_width(width: usize, depth: usize) -> Result<Self, Error> {
        let mask = mask_for(width)?;
        if depth == 0 {
            return Err(ConfigError::InvalidCapacity(0).into());
        }
        if width.checked_mul(depth).is_none() {
            return Err(ConfigError::ShardOverflow { width, depth }.into());
        }
        Self::assemble(mask, depth, 0, Hooks::default())
    }

    /// Spread a validated configuration over `width` shards.
    pub(crate) fn with_config(width: usize, config: Config<T>) -> Result<Self, Error> {
        let mask = mask_for(width)?;
        let depth = config.capacity().div_ceil(width);
        let floor = config.floor();
        Self::assemble(mask, depth, floor, config.hooks)
    }

    fn assemble(mask: usize, depth: usize, floor: usize, hooks: Hooks<T>) -> Result<Self, Error> {
        let width = mask + 1;
        let mut shards = Vec::with_capacity(width);
        for index in 0..width {
            let config = Config::from_parts(depth, shard_floor(floor, width, index), hooks.clone());
            match Pool::with_config(config) {
                Ok(shard) => shards.push(shard),
                Err(err) => {
                    for shard in &shards {
                        if let Err(cleanup) = shard.close() {
                            tracing::warn!(
                                error = %cleanup,
                                "teardown failed while aborting sharded pool construction"
                            );
                        }
                    }
                    return Err(err);
                }
            }
        }

        tracing::debug!(width, depth, floor, "sharded pool created");
        Ok(Self {
            shards: shards.into_boxed_slice(),
            mask,
            depth,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        })
    }

    /// Take a resource from the next shard in `get` order, blocking while
    /// that shard is empty.
    pub fn get(&self) -> Result<T, Error> {
        self.get_shard().get()
    }

    /// Store a resource in the next shard in `put` order, blocking while
    /// that shard is full.
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        self.put_shard().put(item)
    }

    /// Take a resource from the next shard without blocking.
    pub fn try_get(&self) -> Result<Option<T>, Error> {
        self.get_shard().try_get()
    }

    /// Store a resource in the next shard without blocking.
    pub fn try_put(&self, item: T) -> Result<(), TryPutError<T>> {
        self.put_shard().try_put(item)
    }

    /// Close every shard, collecting the teardown failures of all of them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bounded_pool::Builder;
    ///
    /// let pool = Builder::new()
    ///     .capacity(32)
    ///     .floor(32)
    ///     .factory(|| Ok::<_, std::io::Error>(()))
    ///     .teardown(|()| Err("leak"))
    ///     .build_sharded()
    ///     .unwrap();
    /// assert_eq!(pool.close().unwrap_err().len(), 32);
    /// ```
    pub fn close(&self) -> Result<(), TeardownError> {
        let mut errors = TeardownError::default();
        for shard in self.shards.iter() {
            if let Err(err) = shard.close() {
                errors.extend(err);
            }
        }
        errors.into_result()
    }

    /// Number of resources held across all shards. Shards are read one at a
    /// time, so the sum is not a consistent snapshot under concurrent use.
    pub fn available(&self) -> usize {
        self.shards.iter().map(Pool::available).sum()
    }

    /// Total capacity, `width * depth`.
    pub fn capacity(&self) -> usize {
        self.width() * self.depth
    }

    /// Whether every shard is closed.
    pub fn is_closed(&self) -> bool {
        self.shards.iter().all(Pool::is_closed)
    }

    /// Number of shards.
    pub fn width(&self) -> usize {
        self.mask + 1
    }

    /// Capacity of each shard.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn get_shard(&self) -> &Pool<T> {
        &self.shards[self.gets.fetch_add(1, Relaxed) & self.mask]
    }

    fn put_shard(&self) -> &Pool<T> {
        &self.shards[self.puts.fetch_add(1, Relaxed) & self.mask]
    }
}

impl<T> ResourcePool<T> for ShardedPool<T> {
    fn get(&self) -> Result<T, Error> {
        ShardedPool::get(self)
    }

    fn put(&self, item: T) -> Result<(), PutError<T>> {
        ShardedPool::put(self, item)
    }

    fn try_get(&self) -> Result<Option<T>, Error> {
        ShardedPool::try_get(self)
    }

    fn try_put(&self, item: T) -> Result<(), TryPutError<T>> {
        ShardedPool::try_put(self, item)
    }

    fn close(&self) -> Result<(), TeardownError> {
        ShardedPool::close(self)
    }

    fn available(&self) -> usize {
        ShardedPool::available(self)
    }

    fn capacity(&self) -> usize {
        ShardedPool::capacity(self)
    }

    fn is_closed(&self) -> bool {
        ShardedPool::is_closed(self)
    }
}

impl<T> fmt::Debug for ShardedPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedPool")
            .field("width", &self.width())
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_follows_depth_threshold() {
        assert_eq!(shard_width(0), 16);
        assert_eq!(shard_width(256 * 9 - 1), 16);
        assert_eq!(shard_width(256 * 9), 256);
        assert_eq!(shard_width(4096 * 9 - 1), 256);
        assert_eq!(shard_width(4096 * 9), 4096);
    }

    #[test]
    fn mask_only_for_nibble_boundaries() {
        assert_eq!(mask_for(16), Ok(0xf));
        assert_eq!(mask_for(256), Ok(0xff));
        assert_eq!(mask_for(4096), Ok(0xfff));
        assert_eq!(mask_for(8), Err(ConfigError::InvalidWidth(8)));
        assert_eq!(mask_for(1024), Err(ConfigError::InvalidWidth(1024)));
    }

    #[test]
    fn floor_is_split_without_exceeding_depth() {
        for (floor, width, depth) in [(0, 16, 1), (5, 16, 1), (16, 16, 1), (100, 16, 7), (33, 16, 3)] {
            let shares: Vec<_> = (0..width).map(|i| shard_floor(floor, width, i)).collect();
            assert_eq!(shares.iter().sum::<usize>(), floor);
            assert!(shares.iter().all(|&share| share <= depth));
        }
    }

    #[test]
    fn routing_counters_are_independent() {
        let pool: ShardedPool<usize> = ShardedPool::with_width(16, 1).unwrap();
        for i in 0..16 {
            pool.put(i).unwrap();
        }
        // Puts filled shard i with value i; gets walk the shards in the same order.
        for i in 0..16 {
            assert_eq!(pool.get().unwrap(), i);
        }
        assert!(pool.try_get().unwrap().is_none());
    }
}

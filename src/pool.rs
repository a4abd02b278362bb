use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::config::{Config, Hooks, ResetFn, TeardownFn};
use crate::error::{ConfigError, Error, PutError, TeardownError, TryPutError};
use crate::{Entry, OwnedEntry};

/// Common interface of the blocking pools in this crate.
///
/// # Example
///
/// ```rust
/// use bounded_pool::{Pool, ResourcePool, ShardedPool};
///
/// fn cycle<P: ResourcePool<u32>>(pool: &P) {
///     let mut item = pool.pull().unwrap();
///     *item += 1;
/// }
///
/// let pool: Pool<u32> = Pool::with_capacity(1).unwrap();
/// pool.put(0).unwrap();
/// cycle(&pool);
/// assert_eq!(pool.get().unwrap(), 1);
///
/// let sharded: ShardedPool<u32> = ShardedPool::with_width(16, 1).unwrap();
/// for i in 0..16 {
///     sharded.put(i).unwrap();
/// }
/// cycle(&sharded);
/// assert_eq!(sharded.available(), 16);
/// ```
pub trait ResourcePool<T> {
    /// Take a resource, blocking while none is available.
    fn get(&self) -> Result<T, Error>;

    /// Return a resource, blocking while the pool is full.
    fn put(&self, item: T) -> Result<(), PutError<T>>;

    /// Take a resource if one is available right now.
    fn try_get(&self) -> Result<Option<T>, Error>;

    /// Return a resource if there is room for it right now.
    fn try_put(&self, item: T) -> Result<(), TryPutError<T>>;

    /// Close the pool, tearing down every resource it holds and waking all
    /// blocked callers.
    fn close(&self) -> Result<(), TeardownError>;

    /// Number of resources currently held by the pool.
    fn available(&self) -> usize;

    /// Maximum number of resources the pool holds.
    fn capacity(&self) -> usize;

    /// Whether [`close`](ResourcePool::close) has been called.
    fn is_closed(&self) -> bool;

    /// Take a resource wrapped in a guard that puts it back when dropped.
    fn pull(&self) -> Result<Entry<'_, T, Self>, Error>
    where
        Self: Sized,
    {
        self.get().map(|item| Entry::new(item, self))
    }

    /// Like [`pull`](ResourcePool::pull), but the guard keeps the pool alive
    /// and can be sent to other threads.
    fn pull_owned(self: &Arc<Self>) -> Result<OwnedEntry<T, Self>, Error>
    where
        Self: Sized,
    {
        self.get().map(|item| OwnedEntry::new(item, Arc::clone(self)))
    }
}

/// A bounded, blocking pool of resources.
///
/// Resources are handed out in LIFO order. [`get`](Pool::get) blocks while
/// the pool is empty and [`put`](Pool::put) blocks while it is full; both fail
/// with [`Error::Closed`] once [`close`](Pool::close) has been called.
///
/// # Examples
///
/// ```rust
/// use bounded_pool::{Builder, Pool};
/// use std::sync::Arc;
///
/// let pool: Arc<Pool<Vec<u8>>> = Arc::new(
///     Builder::new()
///         .capacity(4)
///         .floor(4)
///         .factory(|| Ok::<_, std::io::Error>(Vec::with_capacity(1024)))
///         .reset(Vec::clear)
///         .build()
///         .unwrap(),
/// );
///
/// let handles: Vec<_> = (0..8)
///     .map(|n| {
///         let pool = pool.clone();
///         std::thread::spawn(move || {
///             for _ in 0..100 {
///                 let mut buf = pool.get().unwrap();
///                 buf.push(n);
///                 pool.put(buf).unwrap();
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(pool.available(), 4);
/// assert!(pool.get().unwrap().is_empty());
/// ```
pub struct Pool<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    /// Signalled when a resource is stored.
    not_empty: Condvar,
    /// Signalled when a slot frees up.
    not_full: Condvar,
    reset: Option<Arc<ResetFn<T>>>,
    teardown: Option<Arc<TeardownFn<T>>>,
}

struct State<T> {
    // Never grows beyond the capacity reserved at construction.
    items: Vec<T>,
    closed: bool,
}

impl<T> Pool<T> {
    /// Create an empty pool without hooks.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bounded_pool::Pool;
    ///
    /// let pool: Pool<u32> = Pool::with_capacity(10).unwrap();
    /// assert_eq!(pool.capacity(), 10);
    /// assert_eq!(pool.available(), 0);
    /// assert!(Pool::<u32>::with_capacity(0).is_err());
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(ConfigError::InvalidCapacity(0).into());
        }
        Self::with_config(Config::from_parts(capacity, 0, Hooks::default()))
    }

    /// Create a pool from a validated configuration, invoking the factory
    /// once per resource of the floor.
    ///
    /// If the factory fails, the resources created so far are torn down and
    /// the factory error is returned. A capacity whose storage cannot be
    /// reserved fails with [`Error::Storage`].
    pub fn with_config(config: Config<T>) -> Result<Self, Error> {
        let capacity = config.capacity();
        let floor = config.floor();
        let hooks = config.hooks;

        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|source| Error::Storage { capacity, source })?;
        if floor > 0 {
            let factory = hooks
                .factory
                .as_deref()
                .ok_or(ConfigError::MissingFactory)?;
            for _ in 0..floor {
                match factory() {
                    Ok(item) => items.push(item),
                    Err(err) => {
                        let cleanup = teardown_all(hooks.teardown.as_deref(), items);
                        if !cleanup.is_empty() {
                            tracing::warn!(
                                error = %cleanup,
                                "teardown failed while aborting pool construction"
                            );
                        }
                        return Err(Error::Factory(err));
                    }
                }
            }
        }

        tracing::debug!(capacity, floor, "pool created");
        Ok(Self {
            capacity,
            state: Mutex::new(State {
                items,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            reset: hooks.reset,
            teardown: hooks.teardown,
        })
    }

    /// Take the most recently stored resource, blocking while the pool is
    /// empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bounded_pool::Pool;
    ///
    /// let pool = Pool::with_capacity(2).unwrap();
    /// pool.put("a").unwrap();
    /// pool.put("b").unwrap();
    /// assert_eq!(pool.get().unwrap(), "b");
    /// assert_eq!(pool.get().unwrap(), "a");
    /// ```
    pub fn get(&self) -> Result<T, Error> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(Error::Closed);
            }
            if let Some(item) = state.items.pop() {
                drop(state);
                self.not_full.notify_one();
                return Ok(item);
            }
            tracing::trace!("get waiting for a resource");
            self.not_empty.wait(&mut state);
        }
    }

    /// Store a resource, blocking while the pool is full.
    ///
    /// The reset hook runs before the pool lock is taken. The pool does not
    /// check where the resource came from.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bounded_pool::Pool;
    ///
    /// let pool = Pool::with_capacity(1).unwrap();
    /// pool.put(1u8).unwrap();
    /// pool.close().unwrap();
    /// let rejected = pool.put(2u8).unwrap_err();
    /// assert_eq!(rejected.into_inner(), 2);
    /// ```
    pub fn put(&self, mut item: T) -> Result<(), PutError<T>> {
        if let Some(reset) = &self.reset {
            reset(&mut item);
        }

        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PutError(item));
            }
            if state.items.len() < self.capacity {
                state.items.push(item);
                drop(state);
                self.not_empty.notify_one();
                return Ok(());
            }
            tracing::trace!("put waiting for a free slot");
            self.not_full.wait(&mut state);
        }
    }

    /// Take a resource without blocking. Returns `Ok(None)` if the pool is
    /// empty.
    pub fn try_get(&self) -> Result<Option<T>, Error> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }
        let item = state.items.pop();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        Ok(item)
    }

    /// Store a resource without blocking.
    ///
    /// The reset hook has already been applied to a resource handed back in
    /// [`TryPutError::Full`].
    pub fn try_put(&self, mut item: T) -> Result<(), TryPutError<T>> {
        if let Some(reset) = &self.reset {
            reset(&mut item);
        }

        let mut state = self.state.lock();
        if state.closed {
            return Err(TryPutError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(TryPutError::Full(item));
        }
        state.items.push(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Close the pool.
    ///
    /// Every resource currently stored is passed to the teardown hook, and
    /// all callers blocked in [`get`](Pool::get) or [`put`](Pool::put) wake up
    /// with [`Error::Closed`]. Resources held by callers are not torn down.
    /// Teardown failures are collected, not short-circuited. Closing an
    /// already closed pool does nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bounded_pool::Builder;
    ///
    /// let pool = Builder::new()
    ///     .floor(2)
    ///     .factory(|| Ok::<_, std::io::Error>(0u32))
    ///     .teardown(|_| Err("busy"))
    ///     .build()
    ///     .unwrap();
    /// let err = pool.close().unwrap_err();
    /// assert_eq!(err.len(), 2);
    /// assert_eq!(err.to_string(), "busy, busy");
    /// assert!(pool.close().is_ok());
    /// ```
    pub fn close(&self) -> Result<(), TeardownError> {
        let items = {
            let mut state = self.state.lock();
            if state.closed {
                return Ok(());
            }
            state.closed = true;
            std::mem::take(&mut state.items)
        };
        self.not_empty.notify_all();
        self.not_full.notify_all();

        let resources = items.len();
        let errors = teardown_all(self.teardown.as_deref(), items);
        tracing::debug!(resources, failures = errors.len(), "pool closed");
        errors.into_result()
    }

    /// Number of resources currently stored in the pool.
    pub fn available(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Maximum number of resources the pool holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether [`close`](Pool::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<T> ResourcePool<T> for Pool<T> {
    fn get(&self) -> Result<T, Error> {
        Pool::get(self)
    }

    fn put(&self, item: T) -> Result<(), PutError<T>> {
        Pool::put(self, item)
    }

    fn try_get(&self) -> Result<Option<T>, Error> {
        Pool::try_get(self)
    }

    fn try_put(&self, item: T) -> Result<(), TryPutError<T>> {
        Pool::try_put(self, item)
    }

    fn close(&self) -> Result<(), TeardownError> {
        Pool::close(self)
    }

    fn available(&self) -> usize {
        Pool::available(self)
    }

    fn capacity(&self) -> usize {
        Pool::capacity(self)
    }

    fn is_closed(&self) -> bool {
        Pool::is_closed(self)
    }
}

impl<T> Drop for Pool<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.closed {
            return;
        }
        state.closed = true;
        let items = std::mem::take(&mut state.items);
        let errors = teardown_all(self.teardown.as_deref(), items);
        if !errors.is_empty() {
            tracing::warn!(error = %errors, "teardown failed while dropping pool");
        }
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Pool");
        d.field("capacity", &self.capacity);
        if let Some(state) = self.state.try_lock() {
            d.field("available", &state.items.len())
                .field("closed", &state.closed);
        }
        d.finish_non_exhaustive()
    }
}

/// Pass every item to the teardown hook, collecting the failures.
fn teardown_all<T>(teardown: Option<&TeardownFn<T>>, items: Vec<T>) -> TeardownError {
    let mut errors = TeardownError::default();
    if let Some(teardown) = teardown {
        for item in items {
            if let Err(err) = teardown(item) {
                errors.push(err);
            }
        }
    }
    errors
}

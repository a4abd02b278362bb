//! A bounded, blocking resource pool.
//!
//! # Features
//!
//! - Fixed capacity with an optional floor of resources created up front.
//! - Blocking `get`/`put`: `get` waits while the pool is empty, `put` waits
//!   while it is full. Both sides wait on their own condition variable over a
//!   single lock, so a `put` only wakes a waiting `get` and vice versa.
//! - Factory, reset and teardown hooks.
//! - `close` tears down every resource the pool holds, wakes every blocked
//!   caller with [`Error::Closed`] and reports all teardown failures at once.
//! - [`ShardedPool`] spreads the capacity over 16, 256 or 4096 independent
//!   pools to reduce lock contention.
//!
//! # Examples
//!
//! ## Buffer pool
//!
//! ```rust
//! use bounded_pool::Builder;
//!
//! let pool = Builder::new()
//!     .capacity(2)
//!     .floor(2)
//!     .factory(|| Ok::<_, std::io::Error>(Vec::<u8>::with_capacity(4096)))
//!     .reset(Vec::clear)
//!     .build()
//!     .unwrap();
//!
//! let mut buf = pool.get().unwrap();
//! buf.extend_from_slice(b"hello");
//! pool.put(buf).unwrap();
//! assert_eq!(pool.available(), 2);
//! assert!(pool.get().unwrap().is_empty());
//! ```
//!
//! ## Multiple threads sharing a pool
//!
//! ```rust
//! use bounded_pool::{Builder, ResourcePool};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let next_id = AtomicUsize::new(0);
//! let pool = Arc::new(
//!     Builder::new()
//!         .capacity(3)
//!         .floor(3)
//!         .factory(move || Ok::<_, std::io::Error>(next_id.fetch_add(1, Ordering::Relaxed)))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let workers: Vec<_> = (0..6)
//!     .map(|_| {
//!         let pool = pool.clone();
//!         std::thread::spawn(move || {
//!             for _ in 0..100 {
//!                 let id = pool.pull().unwrap();
//!                 assert!(*id < 3);
//!             }
//!         })
//!     })
//!     .collect();
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//! assert_eq!(pool.available(), 3);
//! pool.close().unwrap();
//! assert!(pool.get().unwrap_err().is_closed());
//! ```

mod builder;
mod config;
mod entry;
mod error;
mod pool;
mod shard;

pub use builder::Builder;
pub use config::{Config, DEFAULT_CAPACITY, FactoryFn, ResetFn, Settings, TeardownFn};
pub use entry::{Entry, OwnedEntry};
pub use error::{BoxError, ConfigError, Error, PutError, TeardownError, TryPutError};
pub use pool::{Pool, ResourcePool};
pub use shard::{MIN_SHARD_DEPTH, SHARD_WIDTHS, ShardedPool, shard_width};

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::{Pool, ResourcePool};

/// A resource borrowed from a pool.
///
/// `Entry` holds the resource and a reference to the pool it came from.
/// When the `Entry` is dropped, the resource is put back; if the pool has
/// been closed in the meantime the resource is simply dropped.
///
/// Dropping an `Entry` blocks while the pool is full, which only happens if
/// resources from elsewhere were put into it.
///
/// # Example
///
/// ```rust
/// use bounded_pool::{Pool, ResourcePool};
///
/// let pool = Pool::with_capacity(1).unwrap();
/// pool.put(String::new()).unwrap();
/// {
///     let mut s = pool.pull().unwrap();
///     s.push_str("hello");
///     assert_eq!(pool.available(), 0);
/// }
/// assert_eq!(pool.available(), 1);
/// assert_eq!(pool.get().unwrap(), "hello");
/// ```
pub struct Entry<'a, T, P: ResourcePool<T> = Pool<T>> {
    // `item` is always `Some` until the entry is dropped or detached.
    item: Option<T>,
    pool: &'a P,
}

impl<'a, T, P: ResourcePool<T>> Entry<'a, T, P> {
    pub(crate) fn new(item: T, pool: &'a P) -> Self {
        Self {
            item: Some(item),
            pool,
        }
    }

    /// Take the resource out of the entry without returning it to the pool.
    pub fn detach(mut self) -> T {
        self.item.take().expect("entry holds a resource until dropped")
    }

    /// The pool this entry returns to.
    pub fn pool(&self) -> &'a P {
        self.pool
    }
}

impl<'a, T, P: ResourcePool<T>> Drop for Entry<'a, T, P> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            give_back(self.pool, item);
        }
    }
}

impl<'a, T, P: ResourcePool<T>> Deref for Entry<'a, T, P> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.item.as_ref().expect("entry holds a resource until dropped")
    }
}

impl<'a, T, P: ResourcePool<T>> DerefMut for Entry<'a, T, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item.as_mut().expect("entry holds a resource until dropped")
    }
}

impl<'a, T: Debug, P: ResourcePool<T>> Debug for Entry<'a, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entry").field(&self.item).finish()
    }
}

impl<'a, T: PartialEq, P: ResourcePool<T>> PartialEq for Entry<'a, T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.item.eq(&other.item)
    }
}

impl<'a, T: Eq, P: ResourcePool<T>> Eq for Entry<'a, T, P> {}

impl<'a, T: Hash, P: ResourcePool<T>> Hash for Entry<'a, T, P> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.item.hash(state)
    }
}

#[cfg(feature = "serde")]
impl<'a, T: serde::Serialize, P: ResourcePool<T>> serde::Serialize for Entry<'a, T, P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (**self).serialize(serializer)
    }
}

/// An owned resource borrowed from a pool.
///
/// `OwnedEntry` holds the resource and an `Arc` reference to the pool, so it
/// can outlive the scope that pulled it and move between threads.
///
/// # Example
///
/// ```rust
/// use bounded_pool::{Pool, ResourcePool};
/// use std::sync::Arc;
///
/// let pool = Arc::new(Pool::with_capacity(1).unwrap());
/// pool.put(0u64).unwrap();
/// let mut item = pool.pull_owned().unwrap();
/// std::thread::spawn(move || *item = 7).join().unwrap();
/// assert_eq!(pool.get().unwrap(), 7);
/// ```
pub struct OwnedEntry<T, P: ResourcePool<T> = Pool<T>> {
    // `item` is always `Some` until the entry is dropped or detached.
    item: Option<T>,
    pool: Arc<P>,
}

impl<T, P: ResourcePool<T>> OwnedEntry<T, P> {
    pub(crate) fn new(item: T, pool: Arc<P>) -> Self {
        Self {
            item: Some(item),
            pool,
        }
    }

    /// Take the resource out of the entry without returning it to the pool.
    pub fn detach(mut self) -> T {
        self.item.take().expect("entry holds a resource until dropped")
    }

    /// The pool this entry returns to.
    pub fn pool(&self) -> &Arc<P> {
        &self.pool
    }
}

impl<T, P: ResourcePool<T>> Drop for OwnedEntry<T, P> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            give_back(&*self.pool, item);
        }
    }
}

impl<T, P: ResourcePool<T>> Deref for OwnedEntry<T, P> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.item.as_ref().expect("entry holds a resource until dropped")
    }
}

impl<T, P: ResourcePool<T>> DerefMut for OwnedEntry<T, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.item.as_mut().expect("entry holds a resource until dropped")
    }
}

impl<T: Debug, P: ResourcePool<T>> Debug for OwnedEntry<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedEntry").field(&self.item).finish()
    }
}

impl<T: PartialEq, P: ResourcePool<T>> PartialEq for OwnedEntry<T, P> {
    fn eq(&self, other: &Self) -> bool {
        self.item.eq(&other.item)
    }
}

impl<T: Eq, P: ResourcePool<T>> Eq for OwnedEntry<T, P> {}

impl<T: Hash, P: ResourcePool<T>> Hash for OwnedEntry<T, P> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.item.hash(state)
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize, P: ResourcePool<T>> serde::Serialize for OwnedEntry<T, P> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (**self).serialize(serializer)
    }
}

fn give_back<T, P: ResourcePool<T>>(pool: &P, item: T) {
    if let Err(rejected) = pool.put(item) {
        tracing::debug!("pool closed, dropping returned resource");
        drop(rejected);
    }
}

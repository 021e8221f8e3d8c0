use std::hash::Hash;
use std::marker::PhantomData;

use slotmap::{Key, KeyData, SlotMap};

use crate::contact::ContactDetails;
use crate::error::Error;
use crate::support::SupportPoint;

/// A typed handle into an [`ObjectPool<T>`].
///
/// Instead of dispatching on a runtime kind string, the kind is the Rust
/// type `T`, checked at compile time. Grounded in `ivy_resources::Handle<T>`.
pub struct Handle<T>(KeyData, PhantomData<T>);

impl<T> Handle<T> {
    pub fn null() -> Self {
        Key::null()
    }

    pub fn is_null(&self) -> bool {
        Key::is_null(self)
    }
}

unsafe impl<T> Key for Handle<T> {
    fn data(&self) -> KeyData {
        self.0
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self(KeyData::default(), PhantomData)
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> From<KeyData> for Handle<T> {
    fn from(k: KeyData) -> Self {
        Self(k, PhantomData)
    }
}

/// Process-wide object pool for a single kind of pooled value.
///
/// Discipline: every value handed out by [`Self::acquire`]
/// must come back through [`Self::release`] exactly once. `acquired_total`
/// and `released_total` let tests assert pool balance (P9) without needing
/// to inspect the slab directly.
#[derive(Debug)]
pub struct ObjectPool<T> {
    slots: SlotMap<Handle<T>, T>,
    acquired_total: u64,
    released_total: u64,
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObjectPool<T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            acquired_total: 0,
            released_total: 0,
        }
    }

    /// Acquires a new value from the pool, returning a handle to it.
    #[inline]
    pub fn acquire(&mut self, value: T) -> Handle<T> {
        self.acquired_total += 1;
        self.slots.insert(value)
    }

    /// Releases a previously-acquired value back to the pool.
    ///
    /// Releasing a handle that was already released (or was never acquired
    /// from this pool) is an [`Error::DoubleRelease`] rather than a silent
    /// no-op, so double-free bugs in simplex/polyhedron teardown surface in
    /// tests.
    #[inline]
    pub fn release(&mut self, handle: Handle<T>) -> Result<T, Error> {
        self.released_total += 1;
        self.slots.remove(handle).ok_or(Error::DoubleRelease)
    }

    #[inline]
    pub fn get(&self, handle: Handle<T>) -> &T {
        &self.slots[handle]
    }

    #[inline]
    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        &mut self.slots[handle]
    }

    /// Membership test, exposed for callers amortizing a pool across many
    /// queries per frame who want to check a handle's validity before use.
    #[inline]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.slots.contains_key(handle)
    }

    /// Number of values currently acquired and not yet released.
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn acquired_total(&self) -> u64 {
        self.acquired_total
    }

    #[inline]
    pub fn released_total(&self) -> u64 {
        self.released_total
    }
}

/// Pool of [`SupportPoint`]s.
pub type SupportPointPool = ObjectPool<SupportPoint>;

/// Pool of [`ContactDetails`].
///
/// Most callers can simply take the `ContactDetails` returned by value from
/// [`crate::gjk_epa`] — Rust's ownership already gives an "exactly once"
/// guarantee for a value type that is moved rather than shared, so this
/// pool exists for API symmetry with [`SupportPointPool`] and for callers
/// that want to amortize the allocation of the manifold itself across many
/// queries per frame.
pub type ContactPool = ObjectPool<ContactDetails>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_release_balance() {
        let mut pool: ObjectPool<i32> = ObjectPool::new();
        let a = pool.acquire(1);
        let b = pool.acquire(2);
        assert_eq!(pool.outstanding(), 2);

        assert_eq!(pool.release(a).unwrap(), 1);
        assert_eq!(pool.outstanding(), 1);
        assert!(!pool.contains(a));
        assert!(pool.contains(b));

        assert_eq!(pool.acquired_total(), 2);
        assert_eq!(pool.released_total(), 1);
    }

    #[test]
    fn double_release_is_an_error() {
        let mut pool: ObjectPool<i32> = ObjectPool::new();
        let a = pool.acquire(1);
        pool.release(a).unwrap();
        assert_eq!(pool.release(a), Err(Error::DoubleRelease));
    }
}

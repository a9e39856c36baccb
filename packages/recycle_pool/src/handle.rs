use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique pool IDs.
static POOL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Uniquely identifies a pool for the lifetime of the process.
///
/// IDs are never reused, so a handle that outlives its pool can never be mistaken for a handle
/// of a pool created later under the same key.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PoolId(u64);

impl PoolId {
    pub(crate) fn generate() -> Self {
        Self(POOL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// A token for an instance checked out of a [`Pool`][crate::Pool].
///
/// Handles are returned by `acquire()` and handed back to `release()`. A handle identifies
/// both the owning pool and the instance within it, so returning an instance does not depend
/// on any property of the instance itself.
///
/// Handles are plain tokens that can be copied freely. The pool decides whether a handle is
/// currently valid: releasing the same handle twice is rejected, as is releasing a handle to
/// a pool that has since been cleared.
///
/// Each checkout of an instance gets its own handle. When a released instance is handed out
/// again, the new handle differs from the old one, so copies of the old handle stay invalid.
///
/// # Example
///
/// ```
/// use recycle_pool::{Capacity, FnFactory, Pool};
///
/// let mut pool = Pool::new(FnFactory::new("ball", || Some(0_u32)), 0, Capacity::Unbounded);
///
/// let handle = pool.acquire(None).unwrap();
/// assert_eq!(handle.pool_id(), pool.id());
///
/// pool.release(handle).unwrap();
/// assert!(pool.release(handle).is_err());
/// # pool.clear();
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle {
    pool_id: PoolId,
    index: usize,

    /// How many times the instance had been released when this handle was issued.
    generation: u64,
}

impl Handle {
    pub(crate) fn new(pool_id: PoolId, index: usize, generation: u64) -> Self {
        Self {
            pool_id,
            index,
            generation,
        }
    }

    /// The ID of the pool that owns the instance.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    /// Position of the instance in its pool, in creation order.
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            pool_id,
            index,
            generation,
        } = self;

        write!(f, "{pool_id}/instance#{index}/checkout#{generation}")
    }
}

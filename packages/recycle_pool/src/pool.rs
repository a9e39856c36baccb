use std::fmt;
use std::thread;

use foldhash::{HashSet, HashSetExt};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::{Capacity, DropPolicy, Error, Factory, Handle, Placement, PoolId, PoolRoot, PoolStats};

/// A pool of reusable instances of one logical resource type.
///
/// Every instance the pool creates is either *active* (checked out by a caller) or *inactive*
/// (idle and available for reuse). The pool hands out inactive instances first, most recently
/// released first, and only asks its [`Factory`] for a new instance when nothing is available
/// for reuse. The total number of instances ever created is capped by the pool's
/// [`Capacity`]; once the cap is reached and no instance is idle, [`acquire()`][1] returns
/// `None` until an instance is released.
///
/// The pool owns its instances for their whole lifetime. Callers receive a [`Handle`] and
/// access the instance through [`get()`][2] and [`get_mut()`][3] while it is checked out.
///
/// # Example
///
/// ```rust
/// use recycle_pool::{Capacity, FnFactory, Pool};
///
/// let factory = FnFactory::new("ball", || Some(String::from("ball")));
/// let mut pool = Pool::new(factory, 1, Capacity::Bounded(2));
///
/// let first = pool.acquire(None).unwrap();
/// let second = pool.acquire(None).unwrap();
/// pool.get_mut(first).unwrap().push_str(" #1");
///
/// // The cap is reached and nothing is idle.
/// assert!(pool.acquire(None).is_none());
///
/// pool.release(first).unwrap();
///
/// // The released instance is handed out again, under a new handle.
/// let again = pool.acquire(None).unwrap();
/// assert_ne!(again, first);
/// assert_eq!(pool.get(again).unwrap(), "ball #1");
/// # _ = second;
/// pool.clear();
/// ```
///
/// # Teardown
///
/// [`clear()`][4] destroys every instance, whether active or inactive, and then the pool root.
/// Dropping a pool without clearing it does the same under the default [`DropPolicy`].
///
/// [1]: Self::acquire
/// [2]: Self::get
/// [3]: Self::get_mut
/// [4]: Self::clear
pub struct Pool<F: Factory> {
    /// We need to uniquely identify each pool to ensure that handles are not returned to the
    /// wrong pool.
    id: PoolId,

    key: F::Key,

    factory: F,

    capacity: Capacity,

    root: PoolRoot,

    /// Every instance ever created, in creation order. A handle indexes into this.
    instances: Vec<F::Instance>,

    /// Per instance, how many times it has been released. A handle is only valid while its
    /// generation matches, so copies of a handle from an earlier checkout are rejected.
    generations: Vec<u64>,

    /// Indexes of checked-out instances.
    active: HashSet<usize>,

    /// Indexes of idle instances. The last entry is handed out next.
    inactive: Vec<usize>,

    drop_policy: DropPolicy,

    /// Set once the instances and the root have been passed to the factory for destruction.
    torn_down: bool,
}

impl<F: Factory> Pool<F> {
    /// Creates a pool and pre-warms it with up to `size` idle instances.
    ///
    /// Pre-warming stops early if the capacity is smaller than `size` or if the factory
    /// fails to create an instance. This is not an error; the pool simply starts with fewer
    /// idle instances and a warning is logged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::{Capacity, FnFactory, Pool};
    ///
    /// let mut pool = Pool::new(FnFactory::new("ball", || Some(0_u64)), 2, Capacity::Bounded(3));
    ///
    /// assert_eq!(pool.created_count(), 2);
    /// assert_eq!(pool.inactive_len(), 2);
    /// assert_eq!(pool.active_len(), 0);
    /// # pool.clear();
    /// ```
    #[must_use]
    pub fn new(factory: F, size: usize, capacity: Capacity) -> Self {
        Self::new_inner(factory, size, capacity, None, DropPolicy::default())
    }

    pub(crate) fn new_inner(
        factory: F,
        size: usize,
        capacity: Capacity,
        registry_root: Option<&str>,
        drop_policy: DropPolicy,
    ) -> Self {
        let key = factory.key();
        let root = PoolRoot::for_key(&key, registry_root);

        let mut pool = Self {
            id: PoolId::generate(),
            key,
            factory,
            capacity,
            root,
            instances: Vec::with_capacity(capacity.limit().map_or(size, |max| max.min(size))),
            generations: Vec::new(),
            active: HashSet::new(),
            inactive: Vec::new(),
            drop_policy,
            torn_down: false,
        };

        for _ in 0..size {
            let Some(index) = pool.create() else {
                break;
            };

            pool.inactive.push(index);
        }

        if pool.created_count() < size {
            warn!(
                key = ?pool.key,
                requested = size,
                created = pool.created_count(),
                capacity = %pool.capacity,
                "pool pre-warmed with fewer instances than requested"
            );
        }

        debug!(
            key = ?pool.key,
            pool_id = %pool.id,
            created = pool.created_count(),
            capacity = %pool.capacity,
            "pool created"
        );

        pool
    }

    /// The unique ID of the pool, which all of its handles carry.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// The key of the resource type pooled here.
    #[must_use]
    pub fn key(&self) -> &F::Key {
        &self.key
    }

    /// The creation cap of the pool.
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// The private container that idle instances are placed under.
    #[must_use]
    pub fn root(&self) -> &PoolRoot {
        &self.root
    }

    /// How many instances this pool has created. Never exceeds the capacity.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.instances.len()
    }

    /// How many instances are currently checked out.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// How many instances are idle and available for reuse.
    #[must_use]
    pub fn inactive_len(&self) -> usize {
        self.inactive.len()
    }

    /// Whether the handle refers to an instance currently checked out of this pool.
    #[must_use]
    pub fn is_active(&self, handle: Handle) -> bool {
        handle.pool_id() == self.id
            && self.generations.get(handle.index()) == Some(&handle.generation())
            && self.active.contains(&handle.index())
    }

    /// A snapshot of the bookkeeping of this pool.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            created: self.created_count(),
            active: self.active_len(),
            inactive: self.inactive_len(),
        }
    }

    /// Checks out an instance, preferring the most recently released idle instance.
    ///
    /// If no instance is idle, a new one is created as long as the capacity allows it.
    /// Returns `None` if the capacity is exhausted or the factory could not create an
    /// instance; this is a normal outcome and leaves the pool unchanged.
    ///
    /// The instance is activated through the factory and placed under `parent`, or under the
    /// pool root if no parent is given.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::{Capacity, FnFactory, Pool};
    ///
    /// let mut pool = Pool::new(FnFactory::new("ball", || Some(0_u8)), 0, Capacity::Bounded(1));
    ///
    /// let handle = pool.acquire(None).unwrap();
    /// assert!(pool.is_active(handle));
    /// assert!(pool.acquire(None).is_none());
    /// # pool.clear();
    /// ```
    pub fn acquire(&mut self, parent: Option<&F::Parent>) -> Option<Handle> {
        let index = match self.inactive.pop() {
            Some(index) => index,
            None => self.create()?,
        };

        let instance = self
            .instances
            .get_mut(index)
            .expect("idle and newly created indexes always refer to existing instances");

        let placement = match parent {
            Some(parent) => Placement::Parent(parent),
            None => Placement::Root(&self.root),
        };
        self.factory.activate(instance, placement);

        self.active.insert(index);

        let generation = *self
            .generations
            .get(index)
            .expect("every created instance has a generation");

        let handle = Handle::new(self.id, index, generation);
        trace!(key = ?self.key, %handle, "instance acquired");

        Some(handle)
    }

    /// Returns a checked-out instance to the pool, making it the next one to be handed out.
    ///
    /// The instance is deactivated through the factory and placed under the pool root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotActive`] without changing any state if the handle is not currently
    /// checked out of this pool, e.g. because it was already released, was issued for an
    /// earlier checkout of the same instance or belongs to a different pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::{Capacity, FnFactory, Pool};
    ///
    /// let mut pool = Pool::new(FnFactory::new("ball", || Some(0_u8)), 0, Capacity::Unbounded);
    ///
    /// let handle = pool.acquire(None).unwrap();
    ///
    /// assert!(pool.release(handle).is_ok());
    /// assert!(pool.release(handle).is_err());
    /// # pool.clear();
    /// ```
    pub fn release(&mut self, handle: Handle) -> Result<()> {
        if !self.is_active(handle) {
            warn!(key = ?self.key, %handle, "rejected release of instance that is not checked out");
            return Err(Error::NotActive { handle });
        }

        self.active.remove(&handle.index());

        let generation = self
            .generations
            .get_mut(handle.index())
            .expect("active indexes always refer to existing instances");
        *generation = generation.wrapping_add(1);

        let instance = self
            .instances
            .get_mut(handle.index())
            .expect("active indexes always refer to existing instances");

        self.factory.deactivate(instance, &self.root);
        self.inactive.push(handle.index());

        trace!(key = ?self.key, %handle, "instance released");

        Ok(())
    }

    /// Shared access to a checked-out instance.
    ///
    /// Returns `None` if the handle is not currently checked out of this pool.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&F::Instance> {
        if !self.is_active(handle) {
            return None;
        }

        self.instances.get(handle.index())
    }

    /// Exclusive access to a checked-out instance.
    ///
    /// Returns `None` if the handle is not currently checked out of this pool.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut F::Instance> {
        if !self.is_active(handle) {
            return None;
        }

        self.instances.get_mut(handle.index())
    }

    /// Destroys every instance of the pool, checked out or idle, followed by the pool root.
    ///
    /// Handles to this pool are stale afterwards and are rejected by every operation that
    /// accepts a handle.
    pub fn clear(mut self) {
        self.tear_down();
    }

    /// Creates a new idle instance if the capacity admits it. Returns its index.
    fn create(&mut self) -> Option<usize> {
        if !self.capacity.admits(self.created_count()) {
            trace!(key = ?self.key, capacity = %self.capacity, "pool is at capacity");
            return None;
        }

        let Some(mut instance) = self.factory.create() else {
            warn!(key = ?self.key, "factory did not produce an instance");
            return None;
        };

        self.factory.deactivate(&mut instance, &self.root);

        let index = self.instances.len();
        self.instances.push(instance);
        self.generations.push(0);

        debug!(key = ?self.key, created = self.created_count(), "instance created");

        Some(index)
    }

    #[cfg_attr(test, mutants::skip)] // Mutations are only observable through the factory hooks.
    fn tear_down(&mut self) {
        if self.torn_down {
            return;
        }

        self.torn_down = true;

        let active_count = self.active.len();
        let mut instances: Vec<Option<F::Instance>> = self.instances.drain(..).map(Some).collect();

        // Checked-out instances go first, then idle ones.
        let order = self.active.drain().chain(self.inactive.drain(..).rev());

        for index in order {
            if let Some(instance) = instances.get_mut(index).and_then(Option::take) {
                self.factory.destroy(instance);
            }
        }

        debug_assert!(
            instances.iter().all(Option::is_none),
            "every created instance must be either active or inactive"
        );

        self.factory.destroy_root(&self.root);

        debug!(
            key = ?self.key,
            pool_id = %self.id,
            destroyed = instances.len(),
            active = active_count,
            "pool cleared"
        );
    }
}

impl<F: Factory> fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .field("root", &self.root)
            .field("created", &self.created_count())
            .field("active", &self.active_len())
            .field("inactive", &self.inactive_len())
            .field("drop_policy", &self.drop_policy)
            .finish_non_exhaustive()
    }
}

impl<F: Factory> Drop for Pool<F> {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }

        // Do not pile a second panic on top of an unwinding one.
        if self.drop_policy == DropPolicy::MustNotDropItems
            && !self.active.is_empty()
            && !thread::panicking()
        {
            panic!(
                "dropped pool {:?} while {} of its instances were still checked out",
                self.key,
                self.active.len()
            );
        }

        self.tear_down();
    }
}

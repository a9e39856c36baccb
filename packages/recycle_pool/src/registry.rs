use std::fmt;

use foldhash::{HashMap, HashMapExt};
use tracing::{debug, warn};

use crate::builder::FactoryResolver;
use crate::error::Result;
use crate::{
    Capacity, DropPolicy, Error, Factory, Handle, Pool, PoolId, PoolStats, RegistryBuilder,
};

/// A collection of [`Pool`]s, at most one per logical resource type.
///
/// Pools are filed under the key of their [`Factory`]. Callers create a pool for a key once,
/// then acquire instances by key and release them by [`Handle`]. Each handle names the pool
/// that issued it, so releasing never needs to inspect the instance itself.
///
/// The registry is an ordinary value: the application decides where it lives and passes it
/// to the code that needs it. One registry per process is a common arrangement, not a rule.
///
/// # Example
///
/// ```rust
/// use recycle_pool::{Capacity, FnFactory, PoolRegistry};
///
/// let mut registry = PoolRegistry::new();
///
/// registry
///     .create_pool_with(FnFactory::new("ball", || Some(0_u32)), 2, Capacity::Bounded(3))
///     .unwrap();
///
/// let handle = registry.acquire(&"ball", None).unwrap().unwrap();
/// *registry.get_mut(handle).unwrap() += 1;
///
/// registry.release(handle).unwrap();
///
/// registry.clear_all();
/// assert!(registry.is_empty());
/// ```
///
/// # On-demand creation
///
/// With [auto-create][Self::set_auto_create] enabled, acquiring from a key that has no pool
/// creates the pool first, using the factory resolver configured through
/// [`RegistryBuilder::factory_resolver()`] and the default size and capacity.
pub struct PoolRegistry<F: Factory> {
    pools: HashMap<F::Key, Pool<F>>,

    /// Routes handles to the key of the pool that issued them.
    keys_by_pool: HashMap<PoolId, F::Key>,

    auto_create: bool,
    default_size: usize,
    default_capacity: Capacity,
    drop_policy: DropPolicy,

    /// Every pool root is attached to this registry-wide root.
    root_name: String,

    resolver: Option<FactoryResolver<F>>,
}

impl<F: Factory> PoolRegistry<F> {
    /// Creates an empty registry with the default configuration.
    ///
    /// Auto-create is disabled and new pools are pre-warmed with one instance and have no
    /// capacity limit unless specified otherwise.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`PoolRegistry`].
    ///
    /// Use this when you want to customize the registry configuration beyond the defaults.
    pub fn builder() -> RegistryBuilder<F> {
        RegistryBuilder::new()
    }

    pub(crate) fn new_inner(
        auto_create: bool,
        default_size: usize,
        default_capacity: Capacity,
        drop_policy: DropPolicy,
        root_name: String,
        resolver: Option<FactoryResolver<F>>,
    ) -> Self {
        debug!(root = %root_name, auto_create, "pool registry created");

        Self {
            pools: HashMap::new(),
            keys_by_pool: HashMap::new(),
            auto_create,
            default_size,
            default_capacity,
            drop_policy,
            root_name,
            resolver,
        }
    }

    /// Whether acquiring from a key without a pool creates the pool on demand.
    #[must_use]
    pub fn auto_create(&self) -> bool {
        self.auto_create
    }

    /// Enables or disables on-demand pool creation.
    pub fn set_auto_create(&mut self, enabled: bool) {
        self.auto_create = enabled;
    }

    /// Name of the registry-wide root that every pool root is attached to.
    #[must_use]
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// The number of registered pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether no pools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Whether a pool is registered for the key.
    #[must_use]
    pub fn contains_pool(&self, key: &F::Key) -> bool {
        self.pools.contains_key(key)
    }

    /// The keys of all registered pools, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &F::Key> {
        self.pools.keys()
    }

    /// The pool registered for the key, if any.
    #[must_use]
    pub fn pool(&self, key: &F::Key) -> Option<&Pool<F>> {
        self.pools.get(key)
    }

    /// A snapshot of the bookkeeping of the pool registered for the key, if any.
    #[must_use]
    pub fn stats(&self, key: &F::Key) -> Option<PoolStats> {
        self.pools.get(key).map(Pool::stats)
    }

    /// Creates a pool for the factory's key with the default size and capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePool`] if a pool already exists for the key. The existing
    /// pool is left untouched and the factory is dropped.
    pub fn create_pool(&mut self, factory: F) -> Result<()> {
        self.create_pool_with(factory, self.default_size, self.default_capacity)
    }

    /// Creates a pool for the factory's key, pre-warmed with up to `size` idle instances and
    /// creating at most `capacity` instances in total.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePool`] if a pool already exists for the key. The existing
    /// pool is left untouched and the factory is dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use recycle_pool::{Capacity, Error, FnFactory, PoolRegistry};
    ///
    /// let mut registry = PoolRegistry::new();
    ///
    /// registry
    ///     .create_pool_with(FnFactory::new("ball", || Some(0_u8)), 2, Capacity::Bounded(3))
    ///     .unwrap();
    ///
    /// let again = registry.create_pool(FnFactory::new("ball", || Some(1_u8)));
    /// assert!(matches!(again, Err(Error::DuplicatePool { .. })));
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn create_pool_with(&mut self, factory: F, size: usize, capacity: Capacity) -> Result<()> {
        let key = factory.key();

        if self.pools.contains_key(&key) {
            warn!(?key, "pool already exists");
            return Err(Error::DuplicatePool {
                key: format!("{key:?}"),
            });
        }

        self.insert_pool(key, factory, size, capacity);
        Ok(())
    }

    /// Checks out an instance from the pool registered for the key.
    ///
    /// The instance is placed under `parent`, or under the pool root if no parent is given.
    ///
    /// Returns `Ok(None)` if the pool is at capacity and has no idle instance. This is an
    /// expected outcome rather than an error; try again after an instance has been released.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPool`] if no pool is registered for the key and auto-create is
    /// disabled. With auto-create enabled, returns [`Error::InvalidInput`] if no factory
    /// could be resolved for the key.
    pub fn acquire(&mut self, key: &F::Key, parent: Option<&F::Parent>) -> Result<Option<Handle>> {
        if !self.pools.contains_key(key) {
            if !self.auto_create {
                warn!(?key, "no pool registered for key");
                return Err(Error::UnknownPool {
                    target: format!("key {key:?}"),
                });
            }

            self.create_on_demand(key)?;
        }

        let pool = self
            .pools
            .get_mut(key)
            .expect("pool was either registered already or has just been created");

        Ok(pool.acquire(parent))
    }

    /// Returns a checked-out instance to the pool that issued its handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPool`] if the pool that issued the handle is no longer
    /// registered, e.g. because it has been cleared. Returns [`Error::NotActive`] if the
    /// instance is not currently checked out, e.g. because it was already released.
    pub fn release(&mut self, handle: Handle) -> Result<()> {
        let Some(key) = self.keys_by_pool.get(&handle.pool_id()) else {
            warn!(%handle, "no pool registered for handle");
            return Err(Error::UnknownPool {
                target: format!("handle {handle}"),
            });
        };

        let pool = self
            .pools
            .get_mut(key)
            .expect("every routed key has a registered pool");

        pool.release(handle)
    }

    /// Shared access to a checked-out instance.
    ///
    /// Returns `None` if the handle does not refer to a checked-out instance of a registered
    /// pool.
    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&F::Instance> {
        let key = self.keys_by_pool.get(&handle.pool_id())?;
        self.pools.get(key)?.get(handle)
    }

    /// Exclusive access to a checked-out instance.
    ///
    /// Returns `None` if the handle does not refer to a checked-out instance of a registered
    /// pool.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut F::Instance> {
        let key = self.keys_by_pool.get(&handle.pool_id())?;
        self.pools.get_mut(key)?.get_mut(handle)
    }

    /// Destroys every instance of the pool registered for the key and unregisters the pool.
    ///
    /// A new pool may be created for the key afterwards. Handles issued by the old pool are
    /// stale and are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPool`] if no pool is registered for the key.
    pub fn clear_pool(&mut self, key: &F::Key) -> Result<()> {
        let Some(pool) = self.pools.remove(key) else {
            warn!(?key, "no pool registered for key");
            return Err(Error::UnknownPool {
                target: format!("key {key:?}"),
            });
        };

        self.keys_by_pool.remove(&pool.id());
        pool.clear();

        Ok(())
    }

    /// Destroys every instance of every pool and unregisters all pools.
    pub fn clear_all(&mut self) {
        let count = self.pools.len();

        for (_, pool) in self.pools.drain() {
            pool.clear();
        }

        self.keys_by_pool.clear();

        debug!(pools = count, "all pools cleared");
    }

    fn create_on_demand(&mut self, key: &F::Key) -> Result<()> {
        let factory = self.resolver.as_mut().and_then(|resolve| resolve(key));

        let Some(factory) = factory else {
            warn!(?key, "no factory could be resolved for key");
            return Err(Error::InvalidInput {
                problem: format!("no factory could be resolved for key {key:?}"),
            });
        };

        let factory_key = factory.key();
        if factory_key != *key {
            warn!(?key, ?factory_key, "resolved factory has another key");
            return Err(Error::InvalidInput {
                problem: format!("resolved factory for {key:?} has key {factory_key:?}"),
            });
        }

        debug!(?key, "creating pool on demand");
        self.insert_pool(
            factory_key,
            factory,
            self.default_size,
            self.default_capacity,
        );

        Ok(())
    }

    fn insert_pool(&mut self, key: F::Key, factory: F, size: usize, capacity: Capacity) {
        let pool = Pool::new_inner(
            factory,
            size,
            capacity,
            Some(self.root_name.as_str()),
            self.drop_policy,
        );

        self.keys_by_pool.insert(pool.id(), key.clone());
        self.pools.insert(key, pool);
    }
}

impl<F: Factory> Default for PoolRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Factory> fmt::Debug for PoolRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("pools", &self.pools)
            .field("auto_create", &self.auto_create)
            .field("default_size", &self.default_size)
            .field("default_capacity", &self.default_capacity)
            .field("drop_policy", &self.drop_policy)
            .field("root_name", &self.root_name)
            .field("has_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::pool::tests::{Event, RecordingFactory};

    fn destroyed_count(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, Event::Destroyed(_)))
            .count()
    }

    fn created_count(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, Event::Created(_)))
            .count()
    }

    #[test]
    fn create_acquire_release_roundtrip() {
        let mut registry = PoolRegistry::new();
        registry
            .create_pool_with(RecordingFactory::new("ball"), 2, Capacity::Bounded(3))
            .unwrap();

        let stats = registry.stats(&"ball").unwrap();
        assert_eq!(stats.created, 2);
        assert_eq!(stats.inactive, 2);

        let a = registry.acquire(&"ball", None).unwrap().unwrap();
        let b = registry.acquire(&"ball", None).unwrap().unwrap();
        assert_eq!(registry.stats(&"ball").unwrap().inactive, 0);

        let c = registry.acquire(&"ball", None).unwrap().unwrap();
        assert_eq!(registry.stats(&"ball").unwrap().created, 3);
        assert_eq!(registry.stats(&"ball").unwrap().active, 3);

        assert_eq!(registry.acquire(&"ball", None).unwrap(), None);

        registry.release(c).unwrap();
        let reused = registry.acquire(&"ball", None).unwrap().unwrap();
        assert_eq!(reused.index(), c.index());

        registry.release(reused).unwrap();
        registry.release(a).unwrap();
        registry.release(b).unwrap();
        registry.clear_all();
    }

    #[test]
    fn create_pool_uses_defaults() {
        let mut registry = PoolRegistry::new();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();

        let stats = registry.stats(&"ball").unwrap();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.capacity, Capacity::Unbounded);
    }

    #[test]
    fn duplicate_pool_rejected() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = PoolRegistry::new();

        registry
            .create_pool_with(
                RecordingFactory::new("ball").with_events(Rc::clone(&events)),
                2,
                Capacity::Unbounded,
            )
            .unwrap();
        let first_id = registry.pool(&"ball").unwrap().id();

        let result = registry.create_pool_with(
            RecordingFactory::new("ball").with_events(Rc::clone(&events)),
            5,
            Capacity::Unbounded,
        );

        assert!(matches!(result, Err(Error::DuplicatePool { .. })));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pool(&"ball").unwrap().id(), first_id);
        assert_eq!(created_count(&events.borrow()), 2);
    }

    #[test]
    fn acquire_unknown_without_auto_create() {
        let mut registry = PoolRegistry::<RecordingFactory>::new();

        let result = registry.acquire(&"unknown", None);

        assert!(matches!(result, Err(Error::UnknownPool { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn acquire_unknown_with_auto_create() {
        let mut registry = PoolRegistry::<RecordingFactory>::builder()
            .factory_resolver(|&key| Some(RecordingFactory::new(key)))
            .build();

        assert!(matches!(
            registry.acquire(&"unknown", None),
            Err(Error::UnknownPool { .. })
        ));

        registry.set_auto_create(true);
        let handle = registry.acquire(&"unknown", None).unwrap().unwrap();

        assert!(registry.contains_pool(&"unknown"));
        assert!(registry.get(handle).unwrap().enabled);

        let stats = registry.stats(&"unknown").unwrap();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.capacity, Capacity::Unbounded);
    }

    #[test]
    fn auto_create_without_resolver_is_invalid_input() {
        let mut registry = PoolRegistry::<RecordingFactory>::builder()
            .auto_create(true)
            .build();

        let result = registry.acquire(&"unknown", None);

        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn auto_create_rejects_factory_with_other_key() {
        let mut registry = PoolRegistry::<RecordingFactory>::builder()
            .auto_create(true)
            .factory_resolver(|_| Some(RecordingFactory::new("other")))
            .build();

        let result = registry.acquire(&"unknown", None);

        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn release_routes_by_handle() {
        let mut registry = PoolRegistry::new();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();
        registry.create_pool(RecordingFactory::new("cube")).unwrap();

        let ball = registry.acquire(&"ball", None).unwrap().unwrap();
        let cube = registry.acquire(&"cube", Some("scene")).unwrap().unwrap();
        assert_eq!(registry.get(cube).unwrap().parent, "scene");

        registry.release(cube).unwrap();

        assert_eq!(registry.stats(&"cube").unwrap().active, 0);
        assert_eq!(registry.stats(&"ball").unwrap().active, 1);

        registry.release(ball).unwrap();
        assert_eq!(registry.stats(&"ball").unwrap().active, 0);
    }

    #[test]
    fn double_release_rejected() {
        let mut registry = PoolRegistry::new();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();

        let handle = registry.acquire(&"ball", None).unwrap().unwrap();
        registry.release(handle).unwrap();
        let before = registry.stats(&"ball").unwrap();

        assert!(matches!(
            registry.release(handle),
            Err(Error::NotActive { .. })
        ));
        assert_eq!(registry.stats(&"ball").unwrap(), before);
    }

    #[test]
    fn stale_handle_after_reuse_rejected() {
        let mut registry = PoolRegistry::new();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();

        let first = registry.acquire(&"ball", None).unwrap().unwrap();
        registry.release(first).unwrap();
        let second = registry.acquire(&"ball", None).unwrap().unwrap();

        assert!(matches!(
            registry.release(first),
            Err(Error::NotActive { .. })
        ));
        assert!(registry.get(first).is_none());
        assert_eq!(registry.stats(&"ball").unwrap().active, 1);

        registry.get_mut(second).unwrap().serial = 7;
        let third = registry.acquire(&"ball", None).unwrap().unwrap();
        assert_ne!(registry.get(third).unwrap().serial, 7);
        assert_eq!(registry.get(second).unwrap().serial, 7);
    }

    #[test]
    fn stale_handle_after_clear_pool() {
        let mut registry = PoolRegistry::new();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();

        let handle = registry.acquire(&"ball", None).unwrap().unwrap();
        registry.clear_pool(&"ball").unwrap();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();

        assert!(matches!(
            registry.release(handle),
            Err(Error::UnknownPool { .. })
        ));
        assert!(registry.get(handle).is_none());
        assert_eq!(registry.stats(&"ball").unwrap().inactive, 1);
    }

    #[test]
    fn clear_pool_destroys_and_unregisters() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = PoolRegistry::new();
        registry
            .create_pool_with(
                RecordingFactory::new("ball").with_events(Rc::clone(&events)),
                2,
                Capacity::Unbounded,
            )
            .unwrap();
        registry.create_pool(RecordingFactory::new("cube")).unwrap();
        _ = registry.acquire(&"ball", None).unwrap().unwrap();

        registry.clear_pool(&"ball").unwrap();

        assert!(!registry.contains_pool(&"ball"));
        assert!(registry.contains_pool(&"cube"));
        assert_eq!(destroyed_count(&events.borrow()), 2);
    }

    #[test]
    fn clear_unknown_pool_reported() {
        let mut registry = PoolRegistry::<RecordingFactory>::new();

        assert!(matches!(
            registry.clear_pool(&"ball"),
            Err(Error::UnknownPool { .. })
        ));
    }

    #[test]
    fn clear_all_destroys_every_instance_once() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = PoolRegistry::new();

        for key in ["ball", "cube", "cone"] {
            registry
                .create_pool_with(
                    RecordingFactory::new(key).with_events(Rc::clone(&events)),
                    2,
                    Capacity::Bounded(4),
                )
                .unwrap();
        }

        let held = registry.acquire(&"cube", None).unwrap().unwrap();
        for _ in 0..3 {
            _ = registry.acquire(&"cone", None).unwrap().unwrap();
        }

        registry.clear_all();

        let events = events.borrow();
        assert!(registry.is_empty());
        assert_eq!(created_count(&events), 7);
        assert_eq!(destroyed_count(&events), 7);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::RootDestroyed(_)))
                .count(),
            3
        );
        assert!(matches!(
            registry.release(held),
            Err(Error::UnknownPool { .. })
        ));
    }

    #[test]
    fn dropping_registry_tears_down_pools() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = PoolRegistry::new();
        registry
            .create_pool(RecordingFactory::new("ball").with_events(Rc::clone(&events)))
            .unwrap();
        _ = registry.acquire(&"ball", None).unwrap().unwrap();

        drop(registry);

        assert_eq!(destroyed_count(&events.borrow()), 1);
    }

    #[test]
    fn pool_roots_hang_under_registry_root() {
        let mut registry = PoolRegistry::new();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();

        let root = registry.pool(&"ball").unwrap().root();
        assert_eq!(root.parent(), Some(registry.root_name()));
    }

    #[test]
    fn keys_lists_registered_pools() {
        let mut registry = PoolRegistry::new();
        registry.create_pool(RecordingFactory::new("ball")).unwrap();
        registry.create_pool(RecordingFactory::new("cube")).unwrap();

        let mut keys: Vec<_> = registry.keys().copied().collect();
        keys.sort_unstable();

        assert_eq!(keys, vec!["ball", "cube"]);
    }
}

use std::fmt;

use crate::{Capacity, DropPolicy, Factory, PoolRegistry};

/// Produces a factory for a key that has no pool yet, used when pools are created on demand.
pub(crate) type FactoryResolver<F> = Box<dyn FnMut(&<F as Factory>::Key) -> Option<F>>;

/// Builder for creating an instance of [`PoolRegistry`].
///
/// You only need to use this builder if you want to customize the registry configuration.
/// The default configuration used by [`PoolRegistry::new()`][1] is sufficient for most use
/// cases.
///
/// # Examples
///
/// ```
/// use recycle_pool::{Capacity, FnFactory, PoolRegistry};
///
/// let mut registry = PoolRegistry::<FnFactory<&'static str, u32>>::builder()
///     .auto_create(true)
///     .default_size(0)
///     .default_capacity(Capacity::Bounded(8))
///     .factory_resolver(|&key| Some(FnFactory::new(key, || Some(0))))
///     .build();
///
/// // The pool for "spark" is created by the first acquire.
/// let handle = registry.acquire(&"spark", None).unwrap();
/// assert!(handle.is_some());
/// ```
///
/// [1]: PoolRegistry::new
#[must_use]
pub struct RegistryBuilder<F: Factory> {
    auto_create: bool,
    default_size: usize,
    default_capacity: Capacity,
    drop_policy: DropPolicy,
    root_name: String,
    resolver: Option<FactoryResolver<F>>,
}

impl<F: Factory> fmt::Debug for RegistryBuilder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field(
                "factory_type",
                &format_args!("{}", std::any::type_name::<F>()),
            )
            .field("auto_create", &self.auto_create)
            .field("default_size", &self.default_size)
            .field("default_capacity", &self.default_capacity)
            .field("drop_policy", &self.drop_policy)
            .field("root_name", &self.root_name)
            .field("has_resolver", &self.resolver.is_some())
            .finish()
    }
}

/// Number of instances a pool is pre-warmed with unless specified otherwise.
pub(crate) const DEFAULT_SIZE: usize = 1;

/// Name of the registry-wide root that every pool root is attached to.
pub(crate) const DEFAULT_ROOT_NAME: &str = "pool_root";

impl<F: Factory> RegistryBuilder<F> {
    pub(crate) fn new() -> Self {
        Self {
            auto_create: false,
            default_size: DEFAULT_SIZE,
            default_capacity: Capacity::Unbounded,
            drop_policy: DropPolicy::default(),
            root_name: DEFAULT_ROOT_NAME.to_owned(),
            resolver: None,
        }
    }

    /// Whether acquiring from a key without a pool creates the pool on demand.
    ///
    /// On-demand creation needs a [factory resolver][Self::factory_resolver] to obtain the
    /// factory for the key. The flag can be changed later through
    /// [`PoolRegistry::set_auto_create()`].
    pub fn auto_create(mut self, enabled: bool) -> Self {
        self.auto_create = enabled;
        self
    }

    /// How many idle instances [`PoolRegistry::create_pool()`] and on-demand creation
    /// pre-warm a new pool with. Defaults to 1.
    pub fn default_size(mut self, size: usize) -> Self {
        self.default_size = size;
        self
    }

    /// The capacity [`PoolRegistry::create_pool()`] and on-demand creation give a new pool.
    /// Defaults to [`Capacity::Unbounded`].
    pub fn default_capacity(mut self, capacity: Capacity) -> Self {
        self.default_capacity = capacity;
        self
    }

    /// Sets the [drop policy][DropPolicy] of every pool the registry creates. This governs
    /// how to treat instances that are still checked out when a pool is dropped without
    /// being cleared.
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Name of the registry-wide root that every pool root is attached to.
    /// Defaults to `pool_root`.
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Provides the factory for a key when a pool is created on demand.
    ///
    /// Returning `None` means no factory exists for the key, which the acquire operation
    /// reports as [`Error::InvalidInput`][crate::Error::InvalidInput].
    pub fn factory_resolver<R>(mut self, resolver: R) -> Self
    where
        R: FnMut(&F::Key) -> Option<F> + 'static,
    {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Builds the registry with the specified configuration.
    #[must_use]
    pub fn build(self) -> PoolRegistry<F> {
        PoolRegistry::new_inner(
            self.auto_create,
            self.default_size,
            self.default_capacity,
            self.drop_policy,
            self.root_name,
            self.resolver,
        )
    }
}

use std::fmt::{self, Debug};
use std::hash::Hash;

use crate::PoolRoot;

/// Where an instance is placed when it is checked out of its pool.
#[derive(Debug)]
#[expect(
    clippy::exhaustive_enums,
    reason = "an instance is either under its pool root or under a caller-given parent"
)]
pub enum Placement<'a, P: ?Sized> {
    /// The caller did not ask for a placement, so the instance stays under the pool's root.
    Root(&'a PoolRoot),

    /// The caller asked for the instance to be placed under this parent.
    Parent(&'a P),
}

/// Produces and destroys the instances of one logical resource type.
///
/// The pool treats the factory as opaque: it never inspects instances, it only calls the
/// factory to create them, to prepare them for use or for idling and to destroy them during
/// teardown.
///
/// The factory also names the resource type through [`key()`][Self::key]. A registry files
/// each pool under the key of its factory, so the key must be deterministic and distinct
/// for every distinct resource type.
///
/// # Example
///
/// ```
/// use recycle_pool::{Factory, Placement, PoolRoot};
///
/// #[derive(Debug)]
/// struct Bullet {
///     visible: bool,
///     parent: String,
/// }
///
/// struct BulletFactory;
///
/// impl Factory for BulletFactory {
///     type Key = &'static str;
///     type Instance = Bullet;
///     type Parent = str;
///
///     fn key(&self) -> &'static str {
///         "bullet"
///     }
///
///     fn create(&mut self) -> Option<Bullet> {
///         Some(Bullet {
///             visible: false,
///             parent: String::new(),
///         })
///     }
///
///     fn destroy(&mut self, _instance: Bullet) {}
///
///     fn activate(&mut self, instance: &mut Bullet, placement: Placement<'_, str>) {
///         instance.visible = true;
///         instance.parent = match placement {
///             Placement::Root(root) => root.name().to_owned(),
///             Placement::Parent(parent) => parent.to_owned(),
///         };
///     }
///
///     fn deactivate(&mut self, instance: &mut Bullet, root: &PoolRoot) {
///         instance.visible = false;
///         root.name().clone_into(&mut instance.parent);
///     }
/// }
/// ```
pub trait Factory {
    /// Identifies the logical resource type produced by this factory.
    type Key: Clone + Eq + Hash + Debug;

    /// The type of the pooled instances.
    type Instance;

    /// The type of the placement targets that callers may attach checked-out instances to.
    type Parent: ?Sized;

    /// The key of the resource type this factory produces.
    fn key(&self) -> Self::Key;

    /// Creates a new instance, or returns `None` if no instance could be created.
    ///
    /// Newly created instances are idle: the pool calls [`deactivate()`][Self::deactivate]
    /// before storing them.
    fn create(&mut self) -> Option<Self::Instance>;

    /// Destroys an instance during pool teardown.
    fn destroy(&mut self, instance: Self::Instance);

    /// Prepares an instance for use when it is checked out of the pool.
    fn activate(&mut self, instance: &mut Self::Instance, placement: Placement<'_, Self::Parent>) {
        _ = instance;
        _ = placement;
    }

    /// Parks an instance under the pool root when it becomes idle.
    fn deactivate(&mut self, instance: &mut Self::Instance, root: &PoolRoot) {
        _ = instance;
        _ = root;
    }

    /// Releases the pool root after all instances of the pool have been destroyed.
    fn destroy_root(&mut self, root: &PoolRoot) {
        _ = root;
    }
}

impl<F: Factory + ?Sized> Factory for Box<F> {
    type Key = F::Key;
    type Instance = F::Instance;
    type Parent = F::Parent;

    fn key(&self) -> Self::Key {
        (**self).key()
    }

    fn create(&mut self) -> Option<Self::Instance> {
        (**self).create()
    }

    fn destroy(&mut self, instance: Self::Instance) {
        (**self).destroy(instance);
    }

    fn activate(&mut self, instance: &mut Self::Instance, placement: Placement<'_, Self::Parent>) {
        (**self).activate(instance, placement);
    }

    fn deactivate(&mut self, instance: &mut Self::Instance, root: &PoolRoot) {
        (**self).deactivate(instance, root);
    }

    fn destroy_root(&mut self, root: &PoolRoot) {
        (**self).destroy_root(root);
    }
}

/// A [`Factory`] that creates instances by calling a closure.
///
/// Instances are destroyed by dropping them and there are no placement targets.
///
/// # Example
///
/// ```
/// use recycle_pool::{Capacity, FnFactory, Pool};
///
/// let factory = FnFactory::new("buffer", || Some(Vec::<u8>::with_capacity(1024)));
/// let mut pool = Pool::new(factory, 2, Capacity::Unbounded);
///
/// assert_eq!(pool.inactive_len(), 2);
/// # pool.clear();
/// ```
pub struct FnFactory<K, T> {
    key: K,
    create: Box<dyn FnMut() -> Option<T>>,
}

impl<K, T> FnFactory<K, T> {
    /// Creates a factory for the resource type `key` that produces instances with `create`.
    pub fn new<C>(key: K, create: C) -> Self
    where
        C: FnMut() -> Option<T> + 'static,
    {
        Self {
            key,
            create: Box::new(create),
        }
    }
}

impl<K: Debug, T> Debug for FnFactory<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("key", &self.key)
            .field(
                "instance_type",
                &format_args!("{}", std::any::type_name::<T>()),
            )
            .finish_non_exhaustive()
    }
}

impl<K, T> Factory for FnFactory<K, T>
where
    K: Clone + Eq + Hash + Debug,
{
    type Key = K;
    type Instance = T;
    type Parent = ();

    fn key(&self) -> K {
        self.key.clone()
    }

    fn create(&mut self) -> Option<T> {
        (self.create)()
    }

    fn destroy(&mut self, instance: T) {
        drop(instance);
    }
}

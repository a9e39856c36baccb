/// Determines what happens to pooled instances when a pool is dropped without being cleared.
///
/// By default, the pool tears itself down exactly as [`Pool::clear()`][1] would, passing every
/// instance to the factory's destroy hook.
///
/// # Examples
///
/// ```
/// use recycle_pool::{DropPolicy, FnFactory, PoolRegistry};
///
/// // The drop policy is applied to every pool the registry creates.
/// let registry = PoolRegistry::<FnFactory<&str, u32>>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
/// ```
///
/// [1]: crate::Pool::clear
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool destroys its instances when it is dropped. This is the default.
    #[default]
    MayDropItems,

    /// The pool will panic if any of its instances are still checked out when it is dropped.
    ///
    /// This may be valuable if callers hold handles to instances whose destruction must be
    /// coordinated with other systems, so losing track of a checked-out instance is a bug.
    MustNotDropItems,
}

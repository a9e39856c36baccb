use std::fmt::Debug;

/// The private container that a pool groups its instances under.
///
/// Idle instances are always placed under their pool's root, as are checked-out instances
/// for which the caller did not request a specific placement. The root is created together
/// with the pool and handed to [`Factory::destroy_root()`][crate::Factory::destroy_root] when
/// the pool is cleared.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolRoot {
    name: String,
    parent: Option<String>,
}

impl PoolRoot {
    pub(crate) fn for_key(key: &impl Debug, parent: Option<&str>) -> Self {
        Self {
            name: format!("{key:?}_root"),
            parent: parent.map(str::to_owned),
        }
    }

    /// Name of the root, derived from the key of the pool.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the registry-wide root this root is attached to, if the pool is registered.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

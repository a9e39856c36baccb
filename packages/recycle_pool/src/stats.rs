use crate::Capacity;

/// A snapshot of the bookkeeping of one pool.
///
/// Every instance the pool has created is either checked out or idle, so `active + inactive`
/// always equals `created`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct PoolStats {
    /// The creation cap of the pool.
    pub capacity: Capacity,

    /// How many instances the pool has created.
    pub created: usize,

    /// How many instances are currently checked out.
    pub active: usize,

    /// How many instances are idle and available for reuse.
    pub inactive: usize,
}

impl PoolStats {
    /// Whether the pool can neither reuse nor create an instance, so the next acquire
    /// returns nothing.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.inactive == 0 && !self.capacity.admits(self.created)
    }
}

use std::fmt;

/// The maximum number of instances a pool will ever create.
///
/// The capacity is fixed when the pool is created. Instances are never destroyed before the
/// pool itself is cleared, so the capacity caps the total creation count, not merely the
/// number of instances checked out at the same time.
///
/// # Examples
///
/// ```
/// use recycle_pool::Capacity;
///
/// let capacity = Capacity::Bounded(3);
///
/// assert!(capacity.admits(2));
/// assert!(!capacity.admits(3));
/// assert!(Capacity::Unbounded.admits(usize::MAX));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Capacity {
    /// The pool creates at most this many instances.
    Bounded(usize),

    /// The pool creates new instances whenever none are available for reuse. This is the
    /// default.
    #[default]
    Unbounded,
}

impl Capacity {
    /// Whether a pool that has already created `created` instances may create one more.
    #[must_use]
    pub fn admits(self, created: usize) -> bool {
        match self {
            Self::Bounded(max) => created < max,
            Self::Unbounded => true,
        }
    }

    /// The upper bound on instances, if there is one.
    #[must_use]
    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Bounded(max) => Some(max),
            Self::Unbounded => None,
        }
    }
}

impl From<usize> for Capacity {
    fn from(max: usize) -> Self {
        Self::Bounded(max)
    }
}

impl From<Option<usize>> for Capacity {
    fn from(max: Option<usize>) -> Self {
        max.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

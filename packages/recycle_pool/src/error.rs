use thiserror::Error;

use crate::Handle;

/// Conditions reported by pool and registry operations.
///
/// None of these abort the caller: every operation leaves the pool state unchanged when it
/// reports one of them. Running out of instances is not an error and is reported as `None`
/// by the acquire operations instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An argument to the operation could not be used, e.g. no factory could be resolved
    /// for a key that was to be created on demand.
    #[error("invalid input: {problem}")]
    InvalidInput {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// A pool was requested for a key that already has a live pool.
    #[error("a pool already exists for key {key}")]
    DuplicatePool {
        /// Debug rendering of the key.
        key: String,
    },

    /// The operation referenced a key or handle for which no pool is registered.
    #[error("no pool is registered for {target}")]
    UnknownPool {
        /// Debug rendering of the key, or the handle that could not be routed.
        target: String,
    },

    /// A handle was released that is not currently checked out of the pool, either because
    /// it was already released or because it belongs to a different pool.
    #[error("instance {handle} is not checked out of this pool")]
    NotActive {
        /// The rejected handle.
        handle: Handle,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::PoolId;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn messages_name_the_subject() {
        let error = Error::DuplicatePool {
            key: "\"ball\"".to_string(),
        };
        assert_eq!(error.to_string(), "a pool already exists for key \"ball\"");

        let error = Error::UnknownPool {
            target: "\"cube\"".to_string(),
        };
        assert_eq!(error.to_string(), "no pool is registered for \"cube\"");

        let handle = Handle::new(PoolId::generate(), 0, 0);
        let error = Error::NotActive { handle };
        assert!(error.to_string().contains(&handle.to_string()));
    }
}

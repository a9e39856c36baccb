#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Keyed object pools that recycle expensive instances instead of recreating them.
//!
//! This package provides [`PoolRegistry`], a collection of [`Pool`]s filed by the logical
//! resource type they hold. Each pool creates instances through a [`Factory`], hands them out
//! on demand and takes them back for reuse when they are released, so that the cost of
//! creating and destroying identical resources is paid once rather than on every use.
//!
//! # Features
//!
//! - **Pre-warming**: A pool can create a number of idle instances up front.
//! - **Creation cap**: A pool never creates more instances than its [`Capacity`] allows.
//!   Running out is a normal outcome, reported as `None` rather than as an error.
//! - **LIFO reuse**: The most recently released instance is the next one handed out.
//! - **Handle-based release**: [`Handle`]s identify the owning pool, so releasing an instance
//!   is a direct lookup and double releases are rejected.
//! - **On-demand pools**: With auto-create enabled, acquiring from an unknown key creates
//!   the pool through a configured factory resolver.
//! - **Complete teardown**: Clearing a pool destroys every instance it created, whether idle
//!   or still checked out.
//!
//! # Example
//!
//! ```rust
//! use recycle_pool::{Capacity, FnFactory, PoolRegistry};
//!
//! let mut registry = PoolRegistry::new();
//!
//! // Two idle buffers up front, at most three in total.
//! registry
//!     .create_pool_with(
//!         FnFactory::new("buffer", || Some(Vec::<u8>::with_capacity(4096))),
//!         2,
//!         Capacity::Bounded(3),
//!     )
//!     .unwrap();
//!
//! let handle = registry.acquire(&"buffer", None).unwrap().unwrap();
//! registry.get_mut(handle).unwrap().extend_from_slice(b"hello");
//!
//! // Returned for reuse, not destroyed.
//! registry.release(handle).unwrap();
//!
//! // Destroys every pooled buffer.
//! registry.clear_all();
//! ```
//!
//! # Thread safety
//!
//! Pools and registries are single-threaded data structures. Every operation runs to
//! completion without blocking; callers that share a registry between threads must provide
//! their own synchronization.

mod builder;
mod capacity;
mod drop_policy;
mod error;
mod factory;
mod handle;
mod pool;
mod registry;
mod root;
mod stats;

pub use builder::*;
pub use capacity::*;
pub use drop_policy::*;
pub use error::Error;
pub use factory::*;
pub use handle::*;
pub use pool::*;
pub use registry::*;
pub use root::*;
pub use stats::*;

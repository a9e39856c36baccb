//! Basic usage example for `PoolRegistry`.
//!
//! This example shows the glue a host application puts around the registry: create the pools
//! once at startup, acquire and release instances while running and clear everything at
//! shutdown. Run with `RUST_LOG=recycle_pool=debug` to see the pool lifecycle events.

use recycle_pool::{Capacity, FnFactory, PoolRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Particle {
    position: (f32, f32),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Startup: two particles up front, never more than four.
    let mut registry = PoolRegistry::new();
    registry
        .create_pool_with(
            FnFactory::new("particle", || {
                Some(Particle {
                    position: (0.0, 0.0),
                })
            }),
            2,
            Capacity::Bounded(4),
        )
        .expect("the registry is empty, so the pool cannot already exist");

    // Running: check out as many particles as the pool allows.
    let mut live = Vec::new();
    let mut x = 0.0_f32;

    while let Some(handle) = registry
        .acquire(&"particle", None)
        .expect("the particle pool was created at startup")
    {
        let particle = registry.get_mut(handle).expect("just acquired");
        particle.position = (x, 1.0);
        x += 1.0;
        live.push(handle);
    }

    let count = live.len();
    println!("Checked out {count} particles before the pool ran dry");

    for handle in live {
        let particle = registry.get(handle).expect("still checked out");
        println!("Particle at {:?}", particle.position);

        registry
            .release(handle)
            .expect("every handle is released exactly once");
    }

    let stats = registry.stats(&"particle").expect("pool exists");
    println!(
        "Created {} particles, {} idle and ready for reuse",
        stats.created, stats.inactive
    );

    // Shutdown.
    registry.clear_all();
    println!("All pools cleared");
}

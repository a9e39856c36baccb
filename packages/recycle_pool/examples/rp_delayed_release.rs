//! Releasing instances some time after they were acquired.
//!
//! The pools have no timers. A caller that wants an instance returned "after N frames" keeps
//! the handle and releases it when the time comes. Here a game loop fires a projectile every
//! frame and each projectile returns to the pool three frames later. Because released
//! projectiles are reused, the pool settles at a handful of instances no matter how long the
//! loop runs.

use std::collections::VecDeque;

use recycle_pool::{Factory, Placement, PoolRegistry, PoolRoot};
use tracing_subscriber::EnvFilter;

const LIFETIME_FRAMES: u32 = 3;
const FRAMES: u32 = 20;

#[derive(Debug)]
struct Projectile {
    visible: bool,
    parent: String,
}

#[derive(Debug)]
struct ProjectileFactory;

impl Factory for ProjectileFactory {
    type Key = &'static str;
    type Instance = Projectile;
    type Parent = str;

    fn key(&self) -> &'static str {
        "projectile"
    }

    fn create(&mut self) -> Option<Projectile> {
        Some(Projectile {
            visible: false,
            parent: String::new(),
        })
    }

    fn destroy(&mut self, instance: Projectile) {
        let parent = instance.parent;
        println!("Destroying projectile last seen under {parent}");
    }

    fn activate(&mut self, instance: &mut Projectile, placement: Placement<'_, str>) {
        instance.visible = true;
        instance.parent = match placement {
            Placement::Root(root) => root.name().to_owned(),
            Placement::Parent(parent) => parent.to_owned(),
        };
    }

    fn deactivate(&mut self, instance: &mut Projectile, root: &PoolRoot) {
        instance.visible = false;
        root.name().clone_into(&mut instance.parent);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = PoolRegistry::builder().root_name("world").build();
    registry
        .create_pool(ProjectileFactory)
        .expect("the registry is empty, so the pool cannot already exist");

    // Handles waiting to be released, with the frame at which to release them.
    let mut pending = VecDeque::new();

    for frame in 0..FRAMES {
        while pending.front().is_some_and(|&(due, _)| due <= frame) {
            let (_, handle) = pending.pop_front().expect("front was just checked");
            registry
                .release(handle)
                .expect("each projectile is released exactly once");
        }

        let handle = registry
            .acquire(&"projectile", Some("battlefield"))
            .expect("the projectile pool was created at startup")
            .expect("the pool has no capacity limit");

        let projectile = registry.get(handle).expect("just acquired");
        assert!(projectile.visible);

        pending.push_back((frame.saturating_add(LIFETIME_FRAMES), handle));
    }

    let stats = registry.stats(&"projectile").expect("pool exists");
    println!(
        "Fired {FRAMES} projectiles using {} instances ({} still in flight)",
        stats.created, stats.active
    );

    registry.clear_all();
}

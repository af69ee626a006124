//! Pools and the rules between them
//!
//! A [`Stage`] runs the simulation half of a tick in a fixed order:
//!
//! 1. update every pool, sequentially or one scoped thread per pool
//! 2. insert everything behaviors queued, once all updates have joined
//! 3. run the collision pass
//!
//! Drawing is driven separately by the engine.

use crate::input::InputState;
use crate::physics::{CollisionDetector, CollisionHit};
use crate::render::{RenderContext, RenderError};

use super::behavior::{Spawn, UpdateContext};
use super::entity::Entity;
use super::pool::EntityPool;

/// Index of a pool within its stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(usize);

impl PoolId {
    /// Id for the pool at `index`
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position in the stage
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Entity pools plus collision rules
#[derive(Debug, Default)]
pub struct Stage {
    pools: Vec<EntityPool>,
    collisions: CollisionDetector,
}

impl Stage {
    /// Empty stage; `collision_scale` multiplies every collision radius
    pub fn new(collision_scale: f32) -> Self {
        Self {
            pools: Vec::new(),
            collisions: CollisionDetector::new(collision_scale),
        }
    }

    /// Add a pool
    pub fn add_pool(&mut self, name: impl Into<String>, capacity: usize) -> PoolId {
        let pool = EntityPool::with_capacity(name, capacity);
        log::debug!("Created pool '{}' (capacity {capacity})", pool.name());
        self.pools.push(pool);
        PoolId(self.pools.len() - 1)
    }

    /// Id of the first pool called `name`
    pub fn pool_id(&self, name: &str) -> Option<PoolId> {
        self.pools.iter().position(|pool| pool.name() == name).map(PoolId)
    }

    /// Pool by id
    pub fn pool(&self, id: PoolId) -> Option<&EntityPool> {
        self.pools.get(id.0)
    }

    /// Mutable pool by id
    pub fn pool_mut(&mut self, id: PoolId) -> Option<&mut EntityPool> {
        self.pools.get_mut(id.0)
    }

    /// All pools in id order
    pub fn pools(&self) -> &[EntityPool] {
        &self.pools
    }

    /// Insert directly into a pool; `None` for an unknown pool
    pub fn insert(&mut self, pool: PoolId, entity: Entity) -> Option<usize> {
        self.pool_mut(pool).map(|pool| pool.insert(entity))
    }

    /// Test `first` against `second` every tick
    pub fn add_collision_rule(&mut self, first: PoolId, second: PoolId) {
        self.collisions.add_rule(first, second);
    }

    /// The collision detector
    pub fn collisions(&self) -> &CollisionDetector {
        &self.collisions
    }

    /// Live entities across all pools
    pub fn live_count(&self) -> usize {
        self.pools.iter().map(EntityPool::live_count).sum()
    }

    /// Update every pool, returning what behaviors asked to spawn
    ///
    /// With `parallel`, each pool updates on its own scoped thread. All
    /// threads join before this returns. A pool only ever touches its own
    /// entities; cross-pool effects go through the returned spawns.
    pub fn update(&mut self, now: f64, dt: f32, input: &InputState, parallel: bool) -> Vec<Spawn> {
        if parallel && self.pools.len() > 1 {
            return update_parallel(&mut self.pools, now, dt, input);
        }

        let mut ctx = UpdateContext::new(now, dt, input);
        for pool in &mut self.pools {
            pool.update_all(&mut ctx);
        }
        ctx.into_spawns()
    }

    /// Insert queued spawns in order; returns how many were inserted
    pub fn flush_spawns(&mut self, spawns: Vec<Spawn>) -> usize {
        let mut inserted = 0;
        for Spawn { pool, entity } in spawns {
            if self.insert(pool, entity).is_some() {
                inserted += 1;
            } else {
                log::warn!("Dropped spawn for unknown pool {pool:?}");
            }
        }
        inserted
    }

    /// Run the collision pass over every rule
    pub fn detect_collisions(&mut self) -> Vec<CollisionHit> {
        self.collisions.detect(&mut self.pools)
    }

    /// Draw every pool in id order; returns the number of draw calls
    pub fn draw(&mut self, ctx: &mut RenderContext<'_>) -> Result<usize, RenderError> {
        let mut drawn = 0;
        for pool in &mut self.pools {
            drawn += pool.draw_all(ctx)?;
        }
        Ok(drawn)
    }
}

fn update_parallel(pools: &mut [EntityPool], now: f64, dt: f32, input: &InputState) -> Vec<Spawn> {
    std::thread::scope(|scope| {
        let workers: Vec<_> = pools
            .iter_mut()
            .map(|pool| {
                scope.spawn(move || {
                    let mut ctx = UpdateContext::new(now, dt, input);
                    pool.update_all(&mut ctx);
                    ctx.into_spawns()
                })
            })
            .collect();

        // Joined in pool order so spawn order matches a sequential update
        workers
            .into_iter()
            .flat_map(|worker| {
                worker
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    })
}

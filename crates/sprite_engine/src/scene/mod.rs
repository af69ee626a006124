//! Simulation objects
//!
//! [`Entity`] pairs a [`Transform`] with a shared renderable and a
//! [`Behavior`]. Entities live in [`EntityPool`]s, and a [`Stage`] owns the
//! pools together with the collision rules between them.

pub mod behavior;
pub mod entity;
pub mod pool;
pub mod stage;
pub mod transform;
pub mod weapon;

pub use behavior::{Autofire, Behavior, BehaviorFn, Spawn, SteerAndFire, SteerKeys, UpdateContext};
pub use entity::Entity;
pub use pool::{EntityPool, Slot};
pub use stage::{PoolId, Stage};
pub use transform::{Transform, TransformError, TransformLimits};
pub use weapon::Weapon;

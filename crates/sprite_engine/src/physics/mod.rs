//! Motion integration and proximity collision

pub mod collision;
pub mod force;

pub use collision::{collides, CollisionDetector, CollisionHit, EntityRef};
pub use force::{apply_force, Force, Velocity};

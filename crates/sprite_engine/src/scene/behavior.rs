//! Per-entity update hooks
//!
//! Built-in gameplay is expressed as [`Behavior`] variants. Ad hoc logic goes
//! in [`Behavior::Custom`]. Behaviors never touch other pools directly;
//! anything they create is queued on the [`UpdateContext`] and inserted after
//! every pool has finished updating.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Bounds, Vec2};
use crate::input::{InputState, KeyCode};
use crate::physics::{apply_force, Force, Velocity};

use super::entity::Entity;
use super::stage::PoolId;
use super::weapon::Weapon;

/// Signature of a custom behavior
pub type BehaviorFn = dyn Fn(&mut Entity, &mut UpdateContext<'_>) + Send + Sync;

/// An entity queued for insertion into a pool
#[derive(Debug, Clone)]
pub struct Spawn {
    /// Destination pool
    pub pool: PoolId,
    /// Entity to insert
    pub entity: Entity,
}

/// What a behavior sees during one tick
#[derive(Debug)]
pub struct UpdateContext<'a> {
    /// Seconds since the clock started
    pub now: f64,
    /// Seconds since the previous tick
    pub dt: f32,
    /// Keyboard state for this frame
    pub input: &'a InputState,
    spawns: Vec<Spawn>,
}

impl<'a> UpdateContext<'a> {
    /// Context with an empty spawn queue
    pub fn new(now: f64, dt: f32, input: &'a InputState) -> Self {
        Self {
            now,
            dt,
            input,
            spawns: Vec::new(),
        }
    }

    /// Queue `entity` for insertion into `pool`
    pub fn spawn(&mut self, pool: PoolId, entity: Entity) {
        self.spawns.push(Spawn { pool, entity });
    }

    /// Queued spawns so far
    pub fn spawns(&self) -> &[Spawn] {
        &self.spawns
    }

    /// Take the queued spawns
    pub fn into_spawns(self) -> Vec<Spawn> {
        self.spawns
    }
}

/// Keys driving [`SteerAndFire`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteerKeys {
    /// Accelerate toward +Y
    pub up: KeyCode,
    /// Accelerate toward -Y
    pub down: KeyCode,
    /// Accelerate toward -X
    pub left: KeyCode,
    /// Accelerate toward +X
    pub right: KeyCode,
    /// Fire while held
    pub fire: KeyCode,
}

impl Default for SteerKeys {
    fn default() -> Self {
        Self {
            up: KeyCode::Up,
            down: KeyCode::Down,
            left: KeyCode::Left,
            right: KeyCode::Right,
            fire: KeyCode::Space,
        }
    }
}

impl SteerKeys {
    /// Unit direction from the held keys, zero when idle or cancelled out
    pub fn direction(&self, input: &InputState) -> Vec2 {
        let axis = |positive: KeyCode, negative: KeyCode| {
            f32::from(u8::from(input.is_held(positive))) - f32::from(u8::from(input.is_held(negative)))
        };
        let direction = Vec2::new(axis(self.right, self.left), axis(self.up, self.down));
        direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros)
    }
}

/// Input-driven steering with a weapon
#[derive(Debug, Clone)]
pub struct SteerAndFire {
    /// Key bindings
    pub keys: SteerKeys,
    /// Acceleration while a direction key is held, units/s²
    pub acceleration: f32,
    /// Deceleration when idle, units/s²
    pub braking: f32,
    /// Accumulated velocity and its cap
    pub velocity: Velocity,
    /// The entity is kept inside this rectangle
    pub bounds: Bounds,
    /// Weapon fired while the fire key is held
    pub weapon: Weapon,
    /// Pool projectiles are spawned into
    pub target: PoolId,
}

impl SteerAndFire {
    fn run(&mut self, entity: &mut Entity, ctx: &mut UpdateContext<'_>) {
        let direction = self.keys.direction(ctx.input);
        if direction == Vec2::zeros() {
            self.velocity.brake(self.braking, ctx.dt);
        } else {
            self.velocity.accelerate(direction * self.acceleration, ctx.dt);
        }

        let transform = entity.transform_mut();
        apply_force(transform, &self.velocity.as_force(), ctx.dt);
        let position = transform.position();
        let clamped = self.bounds.clamp(position);
        if clamped != position {
            transform.set_position(clamped.x, clamped.y);
        }

        if ctx.input.is_held(self.keys.fire) {
            if let Some(projectile) = self.weapon.fire(entity.transform(), ctx.now) {
                ctx.spawn(self.target, projectile);
            }
        }
    }
}

/// Fire whenever the weapon is ready, along the entity's own facing
#[derive(Debug, Clone)]
pub struct Autofire {
    /// Weapon to fire
    pub weapon: Weapon,
    /// Pool projectiles are spawned into
    pub target: PoolId,
}

impl Autofire {
    fn run(&mut self, entity: &Entity, ctx: &mut UpdateContext<'_>) {
        if let Some(projectile) = self.weapon.fire(entity.transform(), ctx.now) {
            ctx.spawn(self.target, projectile);
        }
    }
}

/// Per-entity update hook
#[derive(Clone, Default)]
pub enum Behavior {
    /// Does nothing
    #[default]
    Passive,
    /// Constant force; deleted once outside `bounds`
    Ballistic {
        /// Applied every tick
        force: Force,
        /// Playfield; leaving it deletes the entity
        bounds: Bounds,
    },
    /// Player steering and firing
    SteerAndFire(Box<SteerAndFire>),
    /// Enemy firing on cooldown
    Autofire(Box<Autofire>),
    /// Ad hoc logic
    Custom(Arc<BehaviorFn>),
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passive => f.write_str("Passive"),
            Self::Ballistic { force, bounds } => f
                .debug_struct("Ballistic")
                .field("force", force)
                .field("bounds", bounds)
                .finish(),
            Self::SteerAndFire(inner) => f.debug_tuple("SteerAndFire").field(inner).finish(),
            Self::Autofire(inner) => f.debug_tuple("Autofire").field(inner).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Behavior {
    /// Wrap a closure
    pub fn custom<F>(update: F) -> Self
    where
        F: Fn(&mut Entity, &mut UpdateContext<'_>) + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(update))
    }

    /// Weapon carried by this behavior, if any
    pub fn weapon(&self) -> Option<&Weapon> {
        match self {
            Self::SteerAndFire(inner) => Some(&inner.weapon),
            Self::Autofire(inner) => Some(&inner.weapon),
            _ => None,
        }
    }

    /// Mutable weapon carried by this behavior, if any
    pub fn weapon_mut(&mut self) -> Option<&mut Weapon> {
        match self {
            Self::SteerAndFire(inner) => Some(&mut inner.weapon),
            Self::Autofire(inner) => Some(&mut inner.weapon),
            _ => None,
        }
    }

    /// Advance `entity` by one tick
    pub fn run(&mut self, entity: &mut Entity, ctx: &mut UpdateContext<'_>) {
        match self {
            Self::Passive => {}
            Self::Ballistic { force, bounds } => {
                if bounds.contains(entity.transform().position()) {
                    apply_force(entity.transform_mut(), force, ctx.dt);
                } else {
                    entity.mark_deleted();
                }
            }
            Self::SteerAndFire(inner) => inner.run(entity, ctx),
            Self::Autofire(inner) => inner.run(entity, ctx),
            Self::Custom(update) => update(entity, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::RenderableId;
    use crate::scene::Transform;
    use approx::assert_relative_eq;

    fn bullet_template() -> Entity {
        Entity::new(RenderableId::default()).with_transform(Transform::new().with_scale(0.2, 0.5))
    }

    #[test]
    fn test_ballistic_moves_then_culls() {
        let bounds = Bounds::new(-1.0, -1.0, 1.0, 1.0);
        let mut entity = Entity::new(RenderableId::default()).with_behavior(Behavior::Ballistic {
            force: Force::new(Vec2::new(10.0, 0.0)),
            bounds,
        });
        let input = InputState::new();
        let mut ctx = UpdateContext::new(0.0, 0.1, &input);

        entity.update(&mut ctx);
        assert_relative_eq!(entity.transform().x(), 1.0);
        assert!(!entity.is_deleted());

        entity.update(&mut ctx);
        assert_relative_eq!(entity.transform().x(), 2.0);
        entity.update(&mut ctx);
        assert!(entity.is_deleted());
    }

    #[test]
    fn test_steer_accelerates_and_stays_in_bounds() {
        let bounds = Bounds::new(-1.0, -1.0, 1.0, 1.0);
        let weapon = Weapon::new("laser", bullet_template(), bounds);
        let mut player = Entity::new(RenderableId::default()).with_behavior(Behavior::SteerAndFire(Box::new(
            SteerAndFire {
                keys: SteerKeys::default(),
                acceleration: 100.0,
                braking: 100.0,
                velocity: Velocity::new(5.0),
                bounds,
                weapon,
                target: PoolId::new(1),
            },
        )));

        let mut input = InputState::new();
        input.press(KeyCode::Right);
        for _ in 0..10 {
            let mut ctx = UpdateContext::new(0.0, 0.1, &input);
            player.update(&mut ctx);
            assert!(ctx.spawns().is_empty());
        }
        assert_relative_eq!(player.transform().x(), 1.0);
        assert_relative_eq!(player.transform().y(), 0.0);
    }

    #[test]
    fn test_steer_fires_into_target_pool_on_cooldown() {
        let bounds = Bounds::centered(20.0, 20.0);
        let mut player = Entity::new(RenderableId::default()).with_behavior(Behavior::SteerAndFire(Box::new(
            SteerAndFire {
                keys: SteerKeys::default(),
                acceleration: 1.0,
                braking: 1.0,
                velocity: Velocity::new(1.0),
                bounds,
                weapon: Weapon::new("laser", bullet_template(), bounds),
                target: PoolId::new(2),
            },
        )));

        let mut input = InputState::new();
        input.press(KeyCode::Space);

        let mut fired = Vec::new();
        for now in [0.0, 0.05, 0.1, 0.15] {
            let mut ctx = UpdateContext::new(now, 0.05, &input);
            player.update(&mut ctx);
            fired.extend(ctx.into_spawns());
        }

        assert_eq!(fired.len(), 2);
        assert!(fired.iter().all(|spawn| spawn.pool == PoolId::new(2)));
        assert!(player.behavior().weapon().is_some());
    }

    #[test]
    fn test_autofire_faces_own_angle() {
        let bounds = Bounds::centered(20.0, 20.0);
        let mut enemy = Entity::new(RenderableId::default())
            .with_transform(Transform::at(5.0, 0.0).with_rotation(std::f32::consts::PI))
            .with_behavior(Behavior::Autofire(Box::new(Autofire {
                weapon: Weapon::new("laser", bullet_template(), bounds),
                target: PoolId::new(0),
            })));
        let input = InputState::new();
        let mut ctx = UpdateContext::new(1.0, 0.016, &input);
        enemy.update(&mut ctx);

        let spawns = ctx.into_spawns();
        assert_eq!(spawns.len(), 1);
        let shot = spawns[0].entity.transform();
        assert_relative_eq!(shot.position(), Vec2::new(4.0, 0.0), epsilon = 1e-5);
        match spawns[0].entity.behavior() {
            Behavior::Ballistic { force, .. } => {
                assert_relative_eq!(force.vector, Vec2::new(-10.0, 0.0), epsilon = 1e-4);
            }
            other => panic!("expected ballistic projectile, got {other:?}"),
        }
    }

    #[test]
    fn test_steer_direction_cancels_opposites() {
        let keys = SteerKeys::default();
        let mut input = InputState::new();
        input.press(KeyCode::Left);
        input.press(KeyCode::Right);
        assert_eq!(keys.direction(&input), Vec2::zeros());

        input.press(KeyCode::Up);
        assert_relative_eq!(keys.direction(&input), Vec2::new(0.0, 1.0));
    }
}

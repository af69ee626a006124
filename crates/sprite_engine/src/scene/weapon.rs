//! Cooldown-gated projectile factory

use std::sync::Arc;

use crate::foundation::math::{utils, Bounds};
use crate::physics::Force;

use super::behavior::Behavior;
use super::entity::Entity;
use super::transform::Transform;

/// Stamps out projectiles from a template, at most once per cooldown
///
/// Firing while on cooldown is a normal outcome and simply yields nothing.
#[derive(Debug, Clone)]
pub struct Weapon {
    name: String,
    cooldown: f64,
    last_fired_at: Option<f64>,
    template: Arc<Entity>,
    speed: f32,
    muzzle_offset: f32,
    bounds: Bounds,
}

impl Weapon {
    /// Seconds between shots unless configured otherwise
    pub const DEFAULT_COOLDOWN: f64 = 0.1;

    /// Projectile speed in units per second unless configured otherwise
    pub const DEFAULT_SPEED: f32 = 10.0;

    /// Distance in front of the shooter projectiles appear at
    pub const DEFAULT_MUZZLE_OFFSET: f32 = 1.0;

    /// Weapon firing copies of `template`, culled when they leave `bounds`
    pub fn new(name: impl Into<String>, template: Entity, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            cooldown: Self::DEFAULT_COOLDOWN,
            last_fired_at: None,
            template: Arc::new(template),
            speed: Self::DEFAULT_SPEED,
            muzzle_offset: Self::DEFAULT_MUZZLE_OFFSET,
            bounds,
        }
    }

    /// Builder pattern: set cooldown in seconds
    #[must_use]
    pub fn with_cooldown(mut self, seconds: f64) -> Self {
        self.cooldown = seconds;
        self
    }

    /// Builder pattern: set projectile speed
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder pattern: set muzzle offset
    #[must_use]
    pub fn with_muzzle_offset(mut self, offset: f32) -> Self {
        self.muzzle_offset = offset;
        self
    }

    /// Name, usually the projectile's sub-texture
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cooldown in seconds
    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    /// Time of the last successful shot
    pub fn last_fired_at(&self) -> Option<f64> {
        self.last_fired_at
    }

    /// Projectile template
    pub fn template(&self) -> &Entity {
        &self.template
    }

    /// Take over the time `previous` last fired; used when swapping weapons
    pub fn carry_cooldown_from(&mut self, previous: &Self) {
        self.last_fired_at = previous.last_fired_at;
    }

    /// Whether a shot at `now` would succeed
    pub fn is_ready(&self, now: f64) -> bool {
        self.last_fired_at
            .map_or(true, |last| now >= last + self.cooldown)
    }

    /// Fire from `shooter` at time `now`
    ///
    /// The projectile is placed `muzzle_offset` ahead of the shooter along its
    /// facing, turned the same way, and given a ballistic behavior moving at
    /// `speed` along that facing.
    pub fn fire(&mut self, shooter: &Transform, now: f64) -> Option<Entity> {
        if !self.is_ready(now) {
            return None;
        }
        self.last_fired_at = Some(now);

        let angle = shooter.angle();
        let muzzle = shooter.position() + utils::polar(angle, self.muzzle_offset);

        let mut projectile = (*self.template).clone();
        let transform = projectile.transform_mut();
        transform.set_position(muzzle.x, muzzle.y);
        transform.set_rotation(angle);
        projectile.set_behavior(Behavior::Ballistic {
            force: Force::toward(angle, self.speed),
            bounds: self.bounds,
        });

        Some(projectile)
    }
}

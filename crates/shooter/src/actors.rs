//! Player, weapons and enemies

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sprite_engine::foundation::math::{constants, Bounds};
use sprite_engine::physics::Velocity;
use sprite_engine::scene::{Autofire, Behavior, Entity, EntityPool, PoolId, SteerAndFire, Weapon};
use sprite_engine::{AppError, Engine};

use crate::assets::SpriteSheet;
use crate::config::{ControlsConfig, GameplayConfig};

/// Pools the game runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pools {
    /// The player ship
    pub player: PoolId,
    /// Projectiles fired by the player
    pub player_shots: PoolId,
    /// Enemy ships
    pub enemies: PoolId,
    /// Projectiles fired by enemies
    pub enemy_shots: PoolId,
}

/// One weapon per weapon sprite on the sheet, in name order
///
/// Laser sprites are drawn pointing up, so templates carry a -90° angle
/// offset to line up with a facing of 0 along +X.
pub fn player_weapons(
    engine: &Engine,
    sheet: &SpriteSheet,
    gameplay: &GameplayConfig,
    bounds: Bounds,
) -> Result<Vec<Weapon>, AppError> {
    sheet
        .weapons()
        .iter()
        .map(|name| {
            let mut template = sheet.sprite(engine, name, gameplay.projectile_scale)?;
            template.transform_mut().set_angle_offset(-constants::HALF_PI);
            Ok(Weapon::new(name.clone(), template, bounds)
                .with_cooldown(gameplay.weapon_cooldown)
                .with_speed(gameplay.projectile_speed)
                .with_muzzle_offset(gameplay.muzzle_offset))
        })
        .collect()
}

/// The player ship, facing +X near the left edge
pub fn player(
    engine: &Engine,
    sheet: &SpriteSheet,
    gameplay: &GameplayConfig,
    controls: &ControlsConfig,
    weapon: Weapon,
    pools: Pools,
) -> Result<Entity, AppError> {
    let bounds = engine.config().playfield;
    let mut ship = sheet.sprite(engine, sheet.player(), gameplay.player_scale)?;

    let transform = ship.transform_mut();
    transform.set_position(bounds.min.x + 2.0, 0.0);
    transform.set_angle_offset(-constants::HALF_PI);

    Ok(ship.with_behavior(Behavior::SteerAndFire(Box::new(SteerAndFire {
        keys: controls.steer,
        acceleration: gameplay.player_acceleration,
        braking: gameplay.player_braking,
        velocity: Velocity::new(gameplay.player_max_speed),
        bounds,
        weapon,
        target: pools.player_shots,
    }))))
}

/// Enemy templates, one per enemy sprite
///
/// Enemies face -X and fire on their own cooldown. Their sprites point down,
/// hence the +90° offset on top of the 180° facing.
pub fn enemy_templates(
    engine: &Engine,
    sheet: &SpriteSheet,
    gameplay: &GameplayConfig,
    weapon: &Weapon,
    pools: Pools,
) -> Result<Vec<Entity>, AppError> {
    sheet
        .enemies()
        .iter()
        .map(|name| {
            let mut enemy = sheet.sprite(engine, name, gameplay.enemy_scale)?;
            let transform = enemy.transform_mut();
            transform.set_rotation(constants::PI);
            transform.set_angle_offset(constants::HALF_PI);

            let weapon = weapon
                .clone()
                .with_cooldown(gameplay.enemy_weapon_cooldown)
                .with_speed(gameplay.enemy_projectile_speed);
            Ok(enemy.with_behavior(Behavior::Autofire(Box::new(Autofire {
                weapon,
                target: pools.enemy_shots,
            }))))
        })
        .collect()
}

/// Places enemies on free rows along the right edge
#[derive(Debug)]
pub struct EnemySpawner {
    x: f32,
    rows: Vec<f32>,
    spacing: f32,
    templates: Vec<Entity>,
    rng: StdRng,
}

impl EnemySpawner {
    /// Spawner for `bounds`, with rows `spacing` apart starting one unit in from the bottom
    pub fn new(bounds: Bounds, spacing: f32, templates: Vec<Entity>, seed: u64) -> Self {
        let mut rows = Vec::new();
        let mut y = bounds.min.y + 1.0;
        while spacing > 0.0 && y <= bounds.max.y - 1.0 {
            rows.push(y);
            y += spacing;
        }

        Self {
            x: bounds.max.x - 1.0,
            rows,
            spacing,
            templates,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Row heights, bottom to top
    pub fn rows(&self) -> &[f32] {
        &self.rows
    }

    /// Lowest row without a live enemy on it
    pub fn free_row(&self, pool: &EntityPool) -> Option<f32> {
        let half = self.spacing * 0.5;
        self.rows.iter().copied().find(|&row| {
            pool.iter_live()
                .all(|(_, enemy)| (enemy.transform().y() - row).abs() >= half)
        })
    }

    /// Spawn a random enemy on the lowest free row
    ///
    /// Returns `false` when every row is taken.
    pub fn spawn(&mut self, pool: &mut EntityPool) -> bool {
        if self.templates.is_empty() {
            return false;
        }
        let Some(row) = self.free_row(pool) else {
            return false;
        };

        let index = self.rng.gen_range(0..self.templates.len());
        let mut enemy = self.templates[index].clone();
        enemy.transform_mut().set_position(self.x, row);
        let slot = pool.insert(enemy);
        log::debug!("Enemy spawned in slot {slot} at row {row:.1}");
        true
    }
}

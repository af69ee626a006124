//! The shooter application
//!
//! Four pools: the player ship, its shots, enemies and enemy shots. Player
//! shots destroy enemies; enemy shots and enemy ships destroy the player.
//! The run ends when the player pool has no live ship left.

use sprite_engine::scene::Weapon;
use sprite_engine::{AppError, Application, Engine, TickReport};

use crate::actors::{self, EnemySpawner, Pools};
use crate::assets::SpriteSheet;
use crate::config::GameConfig;

struct World {
    pools: Pools,
    weapons: Vec<Weapon>,
    weapon_index: usize,
    spawner: EnemySpawner,
    spawn_timer: f64,
}

/// Side-scrolling shooter
pub struct ShooterGame {
    config: GameConfig,
    world: Option<World>,
    score: u32,
    game_over: bool,
}

impl ShooterGame {
    /// Game using `config`; nothing is loaded until the engine initializes it
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            world: None,
            score: 0,
            game_over: false,
        }
    }

    /// Enemies destroyed so far
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Whether the player ship has been destroyed
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Name of the weapon the player currently carries
    pub fn current_weapon(&self) -> Option<&str> {
        let world = self.world.as_ref()?;
        world.weapons.get(world.weapon_index).map(Weapon::name)
    }

    fn world_mut(&mut self) -> Result<&mut World, AppError> {
        self.world
            .as_mut()
            .ok_or_else(|| AppError::GameLogic("game used before initialize".to_owned()))
    }

    fn switch_weapon(engine: &mut Engine, world: &mut World, step: isize) {
        let count = world.weapons.len();
        if count < 2 {
            return;
        }
        world.weapon_index = world
            .weapon_index
            .checked_add_signed(step)
            .map_or(count - 1, |index| index % count);
        let mut weapon = world.weapons[world.weapon_index].clone();

        let carried = engine
            .stage_mut()
            .pool_mut(world.pools.player)
            .and_then(|pool| pool.iter_live_mut().next())
            .and_then(|(_, ship)| ship.behavior_mut().weapon_mut());
        if let Some(carried) = carried {
            log::info!("Weapon switched to {}", weapon.name());
            weapon.carry_cooldown_from(carried);
            *carried = weapon;
        }
    }
}

impl Application for ShooterGame {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Initializing shooter...");
        let gameplay = &self.config.gameplay;

        let sheet = SpriteSheet::load(engine, &self.config.assets)?;
        let capacity = engine.config().initial_pool_capacity;
        let bounds = engine.config().playfield;

        let stage = engine.stage_mut();
        let pools = Pools {
            player: stage.add_pool("player", 1),
            player_shots: stage.add_pool("player_shots", capacity),
            enemies: stage.add_pool("enemies", capacity),
            enemy_shots: stage.add_pool("enemy_shots", capacity),
        };
        stage.add_collision_rule(pools.player_shots, pools.enemies);
        stage.add_collision_rule(pools.enemy_shots, pools.player);
        stage.add_collision_rule(pools.enemies, pools.player);

        let weapons = actors::player_weapons(engine, &sheet, gameplay, bounds)?;
        let (Some(first), Some(last)) = (weapons.first(), weapons.last()) else {
            return Err(AppError::GameLogic("no weapons on the sprite sheet".to_owned()));
        };

        let ship = actors::player(engine, &sheet, gameplay, &self.config.controls, first.clone(), pools)?;
        let templates = actors::enemy_templates(engine, &sheet, gameplay, last, pools)?;
        engine
            .stage_mut()
            .insert(pools.player, ship)
            .ok_or_else(|| AppError::GameLogic("player pool missing".to_owned()))?;

        let spawner = EnemySpawner::new(bounds, gameplay.enemy_row_spacing, templates, gameplay.seed);
        log::info!(
            "Shooter ready: {} weapons, {} enemy rows",
            weapons.len(),
            spawner.rows().len()
        );

        self.world = Some(World {
            pools,
            weapons,
            weapon_index: 0,
            spawner,
            spawn_timer: 0.0,
        });
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        let controls = self.config.controls;
        let interval = self.config.gameplay.enemy_spawn_interval;
        let world = self.world_mut()?;

        let input = engine.input();
        if input.was_pressed(controls.quit) {
            log::info!("Quit requested");
            engine.request_stop();
            return Ok(());
        }
        let step = isize::from(input.was_pressed(controls.next_weapon))
            - isize::from(input.was_pressed(controls.previous_weapon));
        if step != 0 {
            Self::switch_weapon(engine, world, step);
        }

        if interval > 0.0 {
            world.spawn_timer += f64::from(delta_time);
            while world.spawn_timer >= interval {
                world.spawn_timer -= interval;
                if let Some(pool) = engine.stage_mut().pool_mut(world.pools.enemies) {
                    world.spawner.spawn(pool);
                }
            }
        }
        Ok(())
    }

    fn after_tick(&mut self, engine: &mut Engine, report: &TickReport) -> Result<(), AppError> {
        let pools = self.world_mut()?.pools;

        for hit in &report.hits {
            if hit.first.pool == pools.player_shots {
                self.score += 1;
                log::debug!("Enemy destroyed, score {}", self.score);
            } else {
                log::info!("Player hit by {}", if hit.first.pool == pools.enemies { "an enemy" } else { "a shot" });
            }
        }

        let alive = engine
            .stage()
            .pool(pools.player)
            .is_some_and(|pool| pool.live_count() > 0);
        if !alive && !self.game_over {
            self.game_over = true;
            log::info!("Game over at tick {} with score {}", report.tick, self.score);
            engine.request_stop();
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!(
            "Shooter finished: score {}, {} live entities",
            self.score,
            engine.stage().live_count()
        );
        self.world = None;
    }
}

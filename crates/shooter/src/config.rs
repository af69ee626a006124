//! Game configuration
//!
//! Loaded from `shooter.toml` (or `.ron`) when present; every field has a
//! default so a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use sprite_engine::config::{Config, EngineConfig};
use sprite_engine::input::KeyCode;
use sprite_engine::scene::SteerKeys;

/// Game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Engine settings
    pub engine: EngineConfig,

    /// Asset aliases
    pub assets: AssetAliases,

    /// Gameplay tuning
    pub gameplay: GameplayConfig,

    /// Key bindings
    pub controls: ControlsConfig,

    /// Headless run settings
    pub headless: HeadlessConfig,
}

impl Config for GameConfig {}

/// Where game assets live, relative to the engine asset root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetAliases {
    /// Sprite shader alias (`.vert`/`.frag` appended)
    pub sprite_shader: String,

    /// Sprite sheet atlas alias (`.xml` appended)
    pub atlas: String,

    /// Sub-texture used for the player ship
    pub player_sprite: String,

    /// Enemy sub-textures start with this
    pub enemy_prefix: String,

    /// Weapon sub-textures start with this
    pub weapon_prefix: String,
}

impl Default for AssetAliases {
    fn default() -> Self {
        Self {
            sprite_shader: "shaders/sprite".to_owned(),
            atlas: "textures/sheet".to_owned(),
            player_sprite: "playerShip1_blue.png".to_owned(),
            enemy_prefix: "enemy".to_owned(),
            weapon_prefix: "laser".to_owned(),
        }
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Seconds between player shots
    pub weapon_cooldown: f64,

    /// Player projectile speed, units/s
    pub projectile_speed: f32,

    /// Projectile height in world units; width follows the sprite aspect
    pub projectile_scale: f32,

    /// Distance ahead of the shooter projectiles spawn at
    pub muzzle_offset: f32,

    /// Player acceleration, units/s²
    pub player_acceleration: f32,

    /// Player deceleration when no direction is held, units/s²
    pub player_braking: f32,

    /// Player top speed, units/s
    pub player_max_speed: f32,

    /// Player ship height in world units
    pub player_scale: f32,

    /// Enemy height in world units
    pub enemy_scale: f32,

    /// Seconds between enemy spawn attempts
    pub enemy_spawn_interval: f64,

    /// Vertical distance between enemy rows
    pub enemy_row_spacing: f32,

    /// Seconds between enemy shots
    pub enemy_weapon_cooldown: f64,

    /// Enemy projectile speed, units/s
    pub enemy_projectile_speed: f32,

    /// Seed for enemy selection
    pub seed: u64,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            weapon_cooldown: 0.1,
            projectile_speed: 10.0,
            projectile_scale: 0.5,
            muzzle_offset: 1.0,
            player_acceleration: 30.0,
            player_braking: 20.0,
            player_max_speed: 8.0,
            player_scale: 1.2,
            enemy_scale: 1.5,
            enemy_spawn_interval: 1.5,
            enemy_row_spacing: 1.2,
            enemy_weapon_cooldown: 2.0,
            enemy_projectile_speed: 6.0,
            seed: 0x5eed,
        }
    }
}

/// Key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Steering and fire keys
    pub steer: SteerKeys,

    /// Switch to the previous weapon
    pub previous_weapon: KeyCode,

    /// Switch to the next weapon
    pub next_weapon: KeyCode,

    /// Quit
    pub quit: KeyCode,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            steer: SteerKeys::default(),
            previous_weapon: KeyCode::Q,
            next_weapon: KeyCode::E,
            quit: KeyCode::Escape,
        }
    }
}

/// A key transition injected by the headless platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedKey {
    /// Frame number, starting at 1
    pub frame: u32,
    /// Key involved
    pub key: KeyCode,
    /// Pressed when true, released when false
    pub pressed: bool,
}

/// Headless run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Frames to run before closing
    pub frames: u32,

    /// Scripted input
    pub script: Vec<ScriptedKey>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            script: vec![
                ScriptedKey {
                    frame: 1,
                    key: KeyCode::Space,
                    pressed: true,
                },
                ScriptedKey {
                    frame: 30,
                    key: KeyCode::Up,
                    pressed: true,
                },
                ScriptedKey {
                    frame: 90,
                    key: KeyCode::Up,
                    pressed: false,
                },
                ScriptedKey {
                    frame: 120,
                    key: KeyCode::E,
                    pressed: true,
                },
            ],
        }
    }
}

//! Game asset definitions
//!
//! The whole game draws from one sprite sheet: a single shared renderable for
//! the sheet texture, with each entity picking its sub-texture through the
//! `uniSubTexPos` uniform.

use sprite_engine::foundation::collections::RenderableId;
use sprite_engine::foundation::math::Vec2;
use sprite_engine::render::Renderable;
use sprite_engine::scene::{Entity, Transform};
use sprite_engine::{AppError, Engine};

use crate::config::AssetAliases;

/// The loaded sprite sheet and the sprite names the game cares about
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    atlas: String,
    renderable: RenderableId,
    player: String,
    enemies: Vec<String>,
    weapons: Vec<String>,
}

impl SpriteSheet {
    /// Load the shader and atlas named in `aliases` and register the sheet renderable
    pub fn load(engine: &mut Engine, aliases: &AssetAliases) -> Result<Self, AppError> {
        let shader = engine.assets_mut().shader(&aliases.sprite_shader)?;
        let atlas = engine.assets_mut().atlas(&aliases.atlas)?;
        let texture = atlas.texture;

        let mut enemies: Vec<String> = atlas
            .descriptor
            .names_with_prefix(&aliases.enemy_prefix)
            .map(str::to_owned)
            .collect();
        let mut weapons: Vec<String> = atlas
            .descriptor
            .names_with_prefix(&aliases.weapon_prefix)
            .map(str::to_owned)
            .collect();
        enemies.sort();
        weapons.sort();

        if atlas.descriptor.find(&aliases.player_sprite).is_none() {
            return Err(AppError::GameLogic(format!(
                "atlas '{}' has no player sprite '{}'",
                aliases.atlas, aliases.player_sprite
            )));
        }
        if enemies.is_empty() || weapons.is_empty() {
            return Err(AppError::GameLogic(format!(
                "atlas '{}' needs at least one '{}*' and one '{}*' sprite",
                aliases.atlas, aliases.enemy_prefix, aliases.weapon_prefix
            )));
        }

        let renderable = engine.renderables_mut().add(Renderable::sprite(shader, texture));
        log::info!(
            "Sprite sheet '{}': {} enemies, {} weapons",
            aliases.atlas,
            enemies.len(),
            weapons.len()
        );

        Ok(Self {
            atlas: aliases.atlas.clone(),
            renderable,
            player: aliases.player_sprite.clone(),
            enemies,
            weapons,
        })
    }

    /// Shared renderable for the sheet
    pub fn renderable(&self) -> RenderableId {
        self.renderable
    }

    /// Player sprite name
    pub fn player(&self) -> &str {
        &self.player
    }

    /// Enemy sprite names, sorted
    pub fn enemies(&self) -> &[String] {
        &self.enemies
    }

    /// Weapon sprite names, sorted
    pub fn weapons(&self) -> &[String] {
        &self.weapons
    }

    /// Entity showing sprite `name`, `height` world units tall
    ///
    /// Width follows the sub-texture's aspect ratio.
    pub fn sprite(&self, engine: &Engine, name: &str, height: f32) -> Result<Entity, AppError> {
        let rect = engine.assets().sub_rect(&self.atlas, name)?;
        let size = self.sprite_size(engine, name, height)?;

        Ok(Entity::new(self.renderable)
            .with_sub_rect(rect)
            .with_transform(Transform::default().with_scale(size.x, size.y)))
    }

    /// World size of sprite `name` at `height`
    pub fn sprite_size(&self, engine: &Engine, name: &str, height: f32) -> Result<Vec2, AppError> {
        let aspect = engine.assets().aspect_ratio(&self.atlas, name)?;
        Ok(Vec2::new(height * aspect, height))
    }
}

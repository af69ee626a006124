//! # Sprite Engine
//!
//! A small 2D simulation kernel for sprite games.
//!
//! ## Features
//!
//! - **Cached transforms**: model and camera matrices recompute only when a value changes
//! - **Shared renderables**: many entities draw one shader/texture/geometry bundle
//! - **Entity pools**: slot-reusing containers for high-churn objects like projectiles
//! - **Behaviors**: steering, ballistic motion, cooldown-gated weapons, custom closures
//! - **Proximity collision**: circle-approximation tests between pools
//! - **Asset cache**: deduplicated shaders, textures and texture atlases
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sprite_engine::prelude::*;
//!
//! struct MyGame;
//!
//! impl Application for MyGame {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let shader = engine.assets_mut().shader("shaders/sprite")?;
//!         let quad = engine.renderables_mut().add(Renderable::flat(shader));
//!         let pool = engine.stage_mut().add_pool("things", 16);
//!         engine.stage_mut().insert(pool, Entity::new(quad));
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::must_use_candidate)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{AppError, Application, Platform};
pub use engine::{Engine, EngineError, TickReport};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetCache, AssetError, AssetLoader, AtlasDescriptor, FileSystemLoader},
        config::{Config, ConfigError, EngineConfig},
        foundation::{
            collections::{CameraId, RenderableId, ShaderId, TextureId},
            math::{constants, utils, Bounds, Mat3, Point2, Vec2, Vec4},
            time::FrameClock,
        },
        input::{InputState, KeyAction, KeyCode, KeyEvent, Modifiers},
        physics::{apply_force, collides, CollisionHit, EntityRef, Force, Velocity},
        render::{
            Camera2D, CameraRegistry, InstanceUniforms, RecordingBackend, RenderBackend, RenderError, Renderable,
            RenderableStore,
        },
        scene::{
            Autofire, Behavior, Entity, EntityPool, PoolId, Spawn, Stage, SteerAndFire, SteerKeys, Transform,
            UpdateContext, Weapon,
        },
        AppError, Application, Engine, EngineError, Platform, TickReport,
    };
}

//! Application trait and lifecycle management

use thiserror::Error;

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::engine::{Engine, EngineError, TickReport};
use crate::input::InputState;
use crate::render::RenderError;

/// Application lifecycle trait
///
/// Implement this trait to build a game on the engine. The engine calls the
/// hooks in this order every frame: `update`, the simulation tick, then
/// `after_tick`.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Load assets, create renderables
    /// and pools, and spawn the initial entities here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the simulation tick.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// React to the outcome of a tick (collisions, spawn counts)
    fn after_tick(&mut self, _engine: &mut Engine, _report: &TickReport) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the main loop ends.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Window and input collaborator
pub trait Platform {
    /// Feed this frame's key transitions into `input`
    fn pump_events(&mut self, input: &mut InputState);

    /// Whether the window asked to close
    fn should_close(&self) -> bool;

    /// Show the finished frame
    fn present(&mut self) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Rendering error
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}

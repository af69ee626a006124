//! Side-scrolling shooter built on `sprite_engine`
//!
//! The player ship sits on the left and fires along +X; enemies appear on
//! rows along the right edge and fire back. Runs headless against a
//! recording backend, driven by a scripted key sequence.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod actors;
pub mod assets;
pub mod config;
pub mod game;
pub mod platform;

pub use config::GameConfig;
pub use game::ShooterGame;
pub use platform::HeadlessPlatform;

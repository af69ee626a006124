//! Cross-module tests driving the engine tick end to end


use std::path::Path;

use crate::assets::tests::CountingLoader;
use crate::config::EngineConfig;
use crate::engine::Engine;

/// Engine with a fixed 60 Hz step and an in-memory sprite shader
fn test_engine(config: EngineConfig) -> (Engine, crate::assets::tests::LoadCounts) {
    crate::foundation::logging::init_for_tests();
    let loader = CountingLoader::with_sprite_shader(Path::new("assets"));
    let counts = loader.counts.clone();
    (Engine::new(config, Box::new(loader)), counts)
}

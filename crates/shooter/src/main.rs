//! Shooter entry point

use std::error::Error;
use std::process::ExitCode;

use shooter::{GameConfig, HeadlessPlatform, ShooterGame};
use sprite_engine::config::Config;
use sprite_engine::foundation::logging;
use sprite_engine::render::RecordingBackend;
use sprite_engine::{AppError, Engine};

const CONFIG_PATH: &str = "shooter.toml";
const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

fn main() -> ExitCode {
    logging::init();
    log::info!("Starting shooter");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let mut config = GameConfig::load_or_default(CONFIG_PATH)?;
    // Headless runs replay a script, so ticks must not depend on wall time.
    config.engine.fixed_timestep.get_or_insert(DEFAULT_TIMESTEP);

    let mut engine = Engine::with_filesystem(config.engine.clone());
    let mut platform = HeadlessPlatform::new(&config.headless);
    let mut backend = RecordingBackend::new();
    let mut game = ShooterGame::new(config);

    engine.run(&mut game, &mut platform, &mut backend)?;

    log::info!(
        "Final score {} after {} frames ({} draw calls){}",
        game.score(),
        platform.presented(),
        backend.total_draws(),
        if game.is_game_over() { " (game over)" } else { "" }
    );
    Ok(())
}

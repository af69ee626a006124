//! Engine context
//!
//! [`Engine`] owns every registry the simulation needs and is passed by
//! reference to whatever needs assets, cameras, pools or time. One tick runs:
//!
//! 1. advance the clock
//! 2. update all pools
//! 3. insert spawns queued during the update
//! 4. collision pass
//! 5. draw all pools
//!
//! The stop flag is only checked between ticks; a tick in progress completes.

use thiserror::Error;

use crate::application::{AppError, Application, Platform};
use crate::assets::{AssetCache, AssetError, AssetLoader, FileSystemLoader};
use crate::config::{ConfigError, EngineConfig};
use crate::foundation::time::FrameClock;
use crate::input::InputState;
use crate::physics::CollisionHit;
use crate::render::{CameraRegistry, RenderBackend, RenderContext, RenderError, RenderableStore, MAIN_CAMERA};
use crate::scene::Stage;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Asset system error
    #[error("Asset system error: {0}")]
    Asset(#[from] AssetError),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Application error
    #[error("Application error: {0}")]
    Application(String),
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Clock time at the start of the tick
    pub now: f64,
    /// Entities inserted from behavior spawns
    pub spawned: usize,
    /// Collisions detected; participants are already deleted
    pub hits: Vec<CollisionHit>,
    /// Draw calls submitted
    pub draw_calls: usize,
}

/// The explicit engine context
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    assets: AssetCache,
    renderables: RenderableStore,
    cameras: CameraRegistry,
    stage: Stage,
    input: InputState,
    clock: FrameClock,
    running: bool,
}

impl Engine {
    /// Engine loading assets through `loader`
    ///
    /// A main camera framing `config.camera_frame` is created up front.
    pub fn new(config: EngineConfig, loader: Box<dyn AssetLoader>) -> Self {
        let mut cameras = CameraRegistry::new(config.camera_frame);
        cameras.get_or_create(MAIN_CAMERA);

        let clock = config.fixed_timestep.map_or_else(FrameClock::monotonic, FrameClock::fixed);

        log::info!(
            "Engine created (asset root {}, playfield {:?}..{:?})",
            config.asset_root.display(),
            config.playfield.min,
            config.playfield.max
        );

        Self {
            assets: AssetCache::new(config.asset_root.clone(), loader),
            renderables: RenderableStore::new(),
            cameras,
            stage: Stage::new(config.collision_scale),
            input: InputState::new(),
            clock,
            running: false,
            config,
        }
    }

    /// Engine reading assets from `config.asset_root` on disk
    pub fn with_filesystem(config: EngineConfig) -> Self {
        Self::new(config, Box::new(FileSystemLoader))
    }

    /// Configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Asset cache
    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    /// Mutable asset cache
    pub fn assets_mut(&mut self) -> &mut AssetCache {
        &mut self.assets
    }

    /// Renderables
    pub fn renderables(&self) -> &RenderableStore {
        &self.renderables
    }

    /// Mutable renderables
    pub fn renderables_mut(&mut self) -> &mut RenderableStore {
        &mut self.renderables
    }

    /// Cameras
    pub fn cameras(&self) -> &CameraRegistry {
        &self.cameras
    }

    /// Mutable cameras
    pub fn cameras_mut(&mut self) -> &mut CameraRegistry {
        &mut self.cameras
    }

    /// Pools and collision rules
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Mutable pools and collision rules
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// Keyboard state
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Mutable keyboard state
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Whether the main loop is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ask the main loop to stop after the current tick
    pub fn request_stop(&mut self) {
        if self.running {
            log::info!("Stop requested at tick {}", self.clock.tick_count());
        }
        self.running = false;
    }

    /// Upload every renderable not yet uploaded
    pub fn finalize(&mut self, backend: &mut dyn RenderBackend) -> Result<usize, EngineError> {
        let uploaded = self.renderables.finalize_all(&self.assets, backend)?;
        if uploaded > 0 {
            log::info!("Finalized {uploaded} renderable(s)");
        }
        Ok(uploaded)
    }

    /// Run one tick of `dt` seconds
    pub fn step(&mut self, dt: f32, backend: &mut dyn RenderBackend) -> Result<TickReport, EngineError> {
        self.clock.advance(dt);
        self.simulate(backend)
    }

    fn simulate(&mut self, backend: &mut dyn RenderBackend) -> Result<TickReport, EngineError> {
        let now = self.clock.now();
        let dt = self.clock.delta();

        let spawns = self
            .stage
            .update(now, dt, &self.input, self.config.parallel_update);
        let spawned = self.stage.flush_spawns(spawns);
        let hits = self.stage.detect_collisions();

        let mut ctx = RenderContext {
            cameras: &mut self.cameras,
            renderables: &self.renderables,
            backend: &mut *backend,
        };
        let draw_calls = self.stage.draw(&mut ctx)?;
        backend.end_frame()?;

        Ok(TickReport {
            tick: self.clock.tick_count(),
            now,
            spawned,
            hits,
            draw_calls,
        })
    }

    /// Run the main loop until the application stops it or the window closes
    ///
    /// Renderables created during `initialize` are finalized before the first
    /// tick.
    pub fn run<A, P>(&mut self, app: &mut A, platform: &mut P, backend: &mut dyn RenderBackend) -> Result<(), EngineError>
    where
        A: Application,
        P: Platform,
    {
        app.initialize(self).map_err(app_error("initialization"))?;
        self.finalize(backend)?;

        self.running = true;
        log::info!("Starting main loop...");

        while self.running {
            self.input.begin_frame();
            platform.pump_events(&mut self.input);
            if platform.should_close() || self.input.should_close() {
                log::info!("Window closed");
                break;
            }

            self.clock.tick();
            let delta_time = self.clock.delta();
            app.update(self, delta_time).map_err(app_error("update"))?;

            let report = self.simulate(backend)?;
            app.after_tick(self, &report).map_err(app_error("after tick"))?;
            platform.present();
        }

        self.running = false;
        app.cleanup(self);

        log::info!(
            "Engine shutdown complete after {} ticks ({:.1} ticks/s)",
            self.clock.tick_count(),
            self.clock.average_fps()
        );
        Ok(())
    }
}

fn app_error(stage: &'static str) -> impl Fn(AppError) -> EngineError {
    move |err| EngineError::Application(format!("App {stage}: {err}"))
}

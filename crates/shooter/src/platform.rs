//! Windowless platform
//!
//! Replays a key script against a fixed frame budget. Stands in for a real
//! window when running in CI or from the command line.

use sprite_engine::input::InputState;
use sprite_engine::Platform;

use crate::config::{HeadlessConfig, ScriptedKey};

/// Platform that feeds scripted key transitions and closes after a set number of frames
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    frame: u32,
    frames: u32,
    script: Vec<ScriptedKey>,
    presented: u32,
}

impl HeadlessPlatform {
    /// Platform running `config.frames` frames
    pub fn new(config: &HeadlessConfig) -> Self {
        let mut script = config.script.clone();
        script.sort_by_key(|entry| entry.frame);
        Self {
            frame: 0,
            frames: config.frames,
            script,
            presented: 0,
        }
    }

    /// Frames pumped so far
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Frames presented so far
    pub fn presented(&self) -> u32 {
        self.presented
    }
}

impl Platform for HeadlessPlatform {
    fn pump_events(&mut self, input: &mut InputState) {
        self.frame += 1;
        for entry in self.script.iter().filter(|entry| entry.frame == self.frame) {
            if entry.pressed {
                input.press(entry.key);
            } else {
                input.release(entry.key);
            }
        }
    }

    fn should_close(&self) -> bool {
        self.frame > self.frames
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

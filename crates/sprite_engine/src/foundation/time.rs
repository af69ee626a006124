//! Frame timing

use std::time::Instant;

/// Where the clock gets its time from
#[derive(Debug, Clone, Copy)]
enum TimeSource {
    /// Wall clock, measured from clock creation
    Monotonic(Instant),
    /// Every tick advances by the same amount
    Fixed(f32),
}

/// Frame clock shared by every subsystem that needs "now" or delta time
///
/// `now` is kept in `f64` seconds so cooldown comparisons stay exact over
/// long sessions; `delta` is `f32` because it feeds `f32` physics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    source: TimeSource,
    now: f64,
    previous: f64,
    delta: f32,
    tick_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::monotonic()
    }
}

impl FrameClock {
    /// Clock driven by the wall clock
    pub fn monotonic() -> Self {
        Self::with_source(TimeSource::Monotonic(Instant::now()))
    }

    /// Clock that advances by `step` seconds per tick
    pub fn fixed(step: f32) -> Self {
        Self::with_source(TimeSource::Fixed(step))
    }

    fn with_source(source: TimeSource) -> Self {
        Self {
            source,
            now: 0.0,
            previous: 0.0,
            delta: 0.0,
            tick_count: 0,
        }
    }

    /// Advance the clock by one tick using its time source
    pub fn tick(&mut self) {
        let next = match self.source {
            TimeSource::Monotonic(start) => start.elapsed().as_secs_f64(),
            TimeSource::Fixed(step) => self.now + f64::from(step),
        };
        self.advance_to(next);
    }

    /// Advance the clock by an explicit delta, ignoring the time source
    pub fn advance(&mut self, delta: f32) {
        self.advance_to(self.now + f64::from(delta));
    }

    fn advance_to(&mut self, next: f64) {
        self.previous = self.now;
        self.now = next.max(self.now);
        #[allow(clippy::cast_possible_truncation)]
        {
            self.delta = (self.now - self.previous) as f32;
        }
        self.tick_count += 1;
    }

    /// Seconds since the clock started
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Seconds between the last two ticks
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Number of ticks so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Average ticks per second since the clock started
    pub fn average_fps(&self) -> f64 {
        if self.now > 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let ticks = self.tick_count as f64;
            ticks / self.now
        } else {
            0.0
        }
    }
}

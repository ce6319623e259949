//! Time sources and the clamped frame clock

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Largest simulated step per frame, in seconds
pub const MAX_FRAME_DELTA: f32 = 1.0 / 30.0;

/// Monotonic time in seconds
pub trait TimeSource {
    fn now(&self) -> f64;
}

/// Wall clock measured from creation
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-advanced clock. Clones share the same time, so a host (or test) can
/// keep one handle and give another to the engine.
#[derive(Clone, Default)]
pub struct ManualClock {
    seconds: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        self.seconds.set(self.seconds.get() + seconds);
    }

    pub fn set(&self, seconds: f64) {
        self.seconds.set(seconds);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        self.seconds.get()
    }
}

/// Result of one clock tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDelta {
    /// Unclamped elapsed seconds, for FPS measurement
    pub raw: f64,
    /// Simulation step in seconds, clamped to `[0, max_delta]`
    pub step: f32,
}

/// Tracks the last frame time and turns timestamps into clamped steps
pub struct FrameClock {
    last: Option<f64>,
    pub max_delta: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: None,
            max_delta: MAX_FRAME_DELTA,
        }
    }

    /// Restart measurement from `now`; the next tick measures from here
    pub fn reset(&mut self, now: f64) {
        self.last = Some(now);
    }

    /// Forget the last frame; the next tick yields a zero step
    pub fn stop(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self, now: f64) -> FrameDelta {
        let raw = match self.last {
            Some(last) => (now - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(now);
        FrameDelta {
            raw,
            step: (raw as f32).clamp(0.0, self.max_delta),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

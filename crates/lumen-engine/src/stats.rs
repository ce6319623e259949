//! Rolling frame diagnostics

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
    /// Frames per second over the last full one-second window
    pub fps: f32,
    /// Simulated step of the last frame
    pub frame_time_ms: f32,
    pub physics_time_ms: f32,
    pub render_time_ms: f32,
    /// Wall time spent inside the last `frame` call
    pub total_time_ms: f32,
    pub particle_count: usize,
    pub frame_count: u64,
}

/// Accumulates frame timings into `PerformanceStats`
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    stats: PerformanceStats,
    window_seconds: f64,
    window_frames: u32,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &PerformanceStats {
        &self.stats
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        elapsed: f64,
        step_seconds: f32,
        physics_ms: f32,
        render_ms: f32,
        total_ms: f32,
        particle_count: usize,
        frame_count: u64,
    ) -> &PerformanceStats {
        self.window_seconds += elapsed;
        self.window_frames += 1;
        if self.window_seconds >= 1.0 {
            self.stats.fps = (self.window_frames as f64 / self.window_seconds) as f32;
            self.window_seconds = 0.0;
            self.window_frames = 0;
        }

        self.stats.frame_time_ms = step_seconds * 1000.0;
        self.stats.physics_time_ms = physics_ms;
        self.stats.render_time_ms = render_ms;
        self.stats.total_time_ms = total_ms;
        self.stats.particle_count = particle_count;
        self.stats.frame_count = frame_count;
        &self.stats
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! The simulation loop: particle population, frame scheduling, physics and
//! rendering hand-off, event dispatch

use crate::clock::{FrameClock, SystemClock, TimeSource};
use crate::config::{EngineConfig, EngineParameters, EngineState};
use crate::events::{EngineEvent, EventBus, SubscriberId};
use crate::spawn::SpawnOptions;
use crate::stats::{PerformanceMonitor, PerformanceStats};
use lumen_core::{Bounds, Color, Rect, Result, Rng, Vec2};
use lumen_geometry::{assign_delays, GeometrySampler, SampledPoint, SvgDocument};
use lumen_particles::{
    ForceFieldPhysics, InputSource, Particle, ParticleId, ParticleOptions, ParticlePool,
    PhysicsSolver, PointerInput,
};
use lumen_render::{BatchRenderer, Canvas, RenderOptions};
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

/// Hue, saturation and lightness ranges for particles created without a color
const RANDOM_HUE: (f32, f32) = (0.0, 360.0);
const RANDOM_SATURATION: (f32, f32) = (60.0, 100.0);
const RANDOM_LIGHTNESS: (f32, f32) = (40.0, 80.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// Handle for one scheduled frame. Only the most recently issued token is
/// honored; anything older is a cancelled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Simulated and drawn
    Rendered,
    /// Skipped because the engine is paused; the next frame is scheduled
    Paused,
    /// Token was stale or the engine is stopped; nothing happened
    Cancelled,
}

/// Per-particle callback run after physics each frame, given the step in seconds
pub type UpdateHook = Box<dyn FnMut(&mut Particle, f32)>;

/// Owns the particle pool and drives update/render frames on a host-provided
/// cadence.
///
/// The host asks for the scheduled token and calls [`Engine::frame`] from
/// its per-frame callback:
///
/// ```ignore
/// engine.start();
/// while let Some(token) = engine.scheduled_frame() {
///     engine.frame(token);
/// }
/// ```
pub struct Engine<C: Canvas, P: PhysicsSolver = ForceFieldPhysics, I: InputSource = PointerInput> {
    pool: ParticlePool,
    physics: P,
    input: I,
    renderer: BatchRenderer<C>,
    render_options: RenderOptions,
    bounds: Bounds,
    time: Box<dyn TimeSource>,
    clock: FrameClock,
    state: RunState,
    scheduled: Option<FrameToken>,
    next_token: u64,
    frame_count: u64,
    target_fps: u32,
    events: EventBus,
    hooks: Vec<UpdateHook>,
    monitor: PerformanceMonitor,
    sampler: GeometrySampler,
    rng: Rng,
}

impl<C: Canvas> Engine<C> {
    /// Engine with the force-field solver and pointer input
    pub fn new(canvas: C, config: EngineConfig) -> Self {
        let input = PointerInput::new(config.pointer.clone());
        Self::with_parts(canvas, config, ForceFieldPhysics::new(), input)
    }
}

impl<C: Canvas, P: PhysicsSolver, I: InputSource> Engine<C, P, I> {
    pub fn with_parts(canvas: C, config: EngineConfig, mut physics: P, input: I) -> Self {
        physics.set_parameters(&config.physics);
        let bounds = Bounds::new(canvas.width() as f32, canvas.height() as f32);
        let mut rng = match config.seed {
            Some(seed) => Rng::new(seed),
            None => Rng::from_time(),
        };
        let sampler_rng = Rng::new(rng.next_f32().to_bits() | 1);
        let render_options = config.effective_render_options();

        let mut engine = Self {
            pool: ParticlePool::new(config.max_particles),
            physics,
            input,
            renderer: BatchRenderer::new(canvas, config.background),
            render_options,
            bounds,
            time: Box::new(SystemClock::new()),
            clock: FrameClock::new(),
            state: RunState::Stopped,
            scheduled: None,
            next_token: 0,
            frame_count: 0,
            target_fps: config.target_fps,
            events: EventBus::new(),
            hooks: Vec::new(),
            monitor: PerformanceMonitor::new(),
            sampler: GeometrySampler::with_rng(config.sampler, sampler_rng),
            rng,
        };

        tracing::debug!(
            max_particles = config.max_particles,
            width = bounds.width,
            height = bounds.height,
            "engine created"
        );
        if config.auto_start {
            engine.start();
        }
        engine
    }

    /// Replace the wall clock, e.g. with a `ManualClock` for offline renders
    pub fn with_time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Box::new(time);
        if self.state == RunState::Running {
            self.clock.reset(self.time.now());
        }
        self
    }

    // --- run control ---

    /// Begin stepping. No-op while running; resumes when paused.
    pub fn start(&mut self) {
        match self.state {
            RunState::Running => {}
            RunState::Paused => self.resume(),
            RunState::Stopped => {
                self.state = RunState::Running;
                self.clock.reset(self.time.now());
                self.schedule();
                tracing::info!(particles = self.pool.active_count(), "engine started");
            }
        }
    }

    /// Cancel the scheduled frame and reset timing. Idempotent, and safe to
    /// call while a frame is being dispatched.
    pub fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        self.state = RunState::Stopped;
        self.scheduled = None;
        self.clock.stop();
        tracing::info!(frames = self.frame_count, "engine stopped");
    }

    /// Freeze stepping. Frames keep being scheduled so resume is immediate.
    pub fn pause(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Paused;
            tracing::info!("engine paused");
        }
    }

    /// Continue after `pause`. The clock restarts so the paused interval is
    /// not simulated.
    pub fn resume(&mut self) {
        if self.state == RunState::Paused {
            self.state = RunState::Running;
            self.clock.reset(self.time.now());
            tracing::info!("engine resumed");
        }
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state != RunState::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    /// Token the host should pass to the next `frame` call
    pub fn scheduled_frame(&self) -> Option<FrameToken> {
        self.scheduled
    }

    /// Host pacing hint derived from `target_fps`
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    fn schedule(&mut self) {
        self.next_token += 1;
        self.scheduled = Some(FrameToken(self.next_token));
    }

    /// Run one frame: input, physics, hooks, sweep, render, stats, then
    /// dispatch queued events. A subscriber returning `Break` stops the engine.
    pub fn frame(&mut self, token: FrameToken) -> FrameOutcome {
        if self.scheduled != Some(token) {
            return FrameOutcome::Cancelled;
        }
        self.scheduled = None;

        if self.state == RunState::Paused {
            self.schedule();
            self.dispatch_events();
            return FrameOutcome::Paused;
        }

        let frame_start = Instant::now();
        let delta = self.clock.tick(self.time.now());
        let step = delta.step;
        let delta_ms = step * 1000.0;

        let forces = self.input.forces(delta_ms);
        self.physics.set_input_forces(forces);

        let physics_start = Instant::now();
        self.physics
            .update(self.pool.particles_mut(), delta_ms, self.bounds);
        for hook in &mut self.hooks {
            for particle in self.pool.particles_mut() {
                hook(particle, step);
            }
        }
        let physics_ms = physics_start.elapsed().as_secs_f32() * 1000.0;

        for id in self.pool.sweep_inactive() {
            self.events.push(EngineEvent::ParticleDestroyed(id));
        }

        self.frame_count += 1;
        let active = self.pool.active_count();
        self.events.push(EngineEvent::Updated {
            delta: step,
            active,
        });

        self.renderer.clear();
        self.renderer
            .render_frame(self.pool.particles(), &self.render_options);
        let render_ms = self.renderer.stats().render_time_ms;
        self.events.push(EngineEvent::Rendered { active });

        let total_ms = frame_start.elapsed().as_secs_f32() * 1000.0;
        let stats = self
            .monitor
            .record(
                delta.raw,
                step,
                physics_ms,
                render_ms,
                total_ms,
                active,
                self.frame_count,
            )
            .clone();
        tracing::trace!(
            frame = self.frame_count,
            active,
            physics_ms,
            render_ms,
            total_ms,
            "frame"
        );
        self.events.push(EngineEvent::PerformanceUpdated(stats));

        self.schedule();
        self.dispatch_events();
        FrameOutcome::Rendered
    }

    /// Run the scheduled frame, if any
    pub fn step(&mut self) -> FrameOutcome {
        match self.scheduled {
            Some(token) => self.frame(token),
            None => FrameOutcome::Cancelled,
        }
    }

    // --- particles ---

    /// `None` at the particle cap
    pub fn acquire(&mut self, x: f32, y: f32, options: &ParticleOptions) -> Option<ParticleId> {
        let id = self.pool.acquire(Vec2::new(x, y), options)?;
        self.events.push(EngineEvent::ParticleCreated(id));
        Some(id)
    }

    /// False if `id` is not active
    pub fn release(&mut self, id: ParticleId) -> bool {
        if !self.pool.release(id) {
            return false;
        }
        self.events.push(EngineEvent::ParticleDestroyed(id));
        true
    }

    pub fn release_all(&mut self) -> usize {
        let released = self.pool.release_all();
        let count = released.len();
        for id in released {
            self.events.push(EngineEvent::ParticleDestroyed(id));
        }
        count
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.pool.get(id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.pool.get_mut(id)
    }

    pub fn particles(&self) -> &[Particle] {
        self.pool.particles()
    }

    /// Ids parallel to `particles()`
    pub fn particle_ids(&self) -> &[ParticleId] {
        self.pool.ids()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn max_particles(&self) -> usize {
        self.pool.capacity()
    }

    /// One particle per point until the cap is hit; the rest are dropped.
    pub fn create_from_points(
        &mut self,
        points: &[SampledPoint],
        options: &SpawnOptions,
    ) -> Vec<ParticleId> {
        let mut created = Vec::with_capacity(points.len().min(self.pool.free_count()));
        for point in points {
            let color = match options.color {
                Some(color) => color,
                None => Color::random_hsl(
                    &mut self.rng,
                    RANDOM_HUE,
                    RANDOM_SATURATION,
                    RANDOM_LIGHTNESS,
                ),
            };
            let particle_options = options.particle_options(point, color);
            match self.acquire(point.position.x, point.position.y, &particle_options) {
                Some(id) => created.push(id),
                None => {
                    tracing::debug!(
                        requested = points.len(),
                        created = created.len(),
                        max_particles = self.pool.capacity(),
                        "particle cap reached"
                    );
                    break;
                }
            }
        }

        if options.center {
            self.center_particles(&created);
        }
        tracing::debug!(count = created.len(), "created particles from points");
        created
    }

    /// Parse, sample and spawn an SVG document. A parse or sampling error
    /// leaves the pool untouched.
    pub fn create_from_svg(&mut self, svg: &str, options: &SpawnOptions) -> Result<Vec<ParticleId>> {
        let document = SvgDocument::parse(svg)?;

        let fit_scale = match options.fit {
            Some(fraction) => {
                let (width, height) = document.size();
                if width > 0.0 && height > 0.0 {
                    (self.bounds.width * fraction / width).min(self.bounds.height * fraction / height)
                } else {
                    1.0
                }
            }
            None => 1.0,
        };
        let spacing = self.sampler.config.spacing;
        let quality = self.sampler.config.quality;
        let scale = self.sampler.config.scale * fit_scale;
        let mut points = self
            .sampler
            .sample(&document.shapes, spacing, quality, scale)?;

        if let Some(mode) = options.delay {
            assign_delays(&mut points, mode, &mut self.rng);
        }
        Ok(self.create_from_points(&points, options))
    }

    /// Translate the given particles so their bounding box is centered on the
    /// canvas. Layout is preserved; previous positions, trails and origins
    /// move with them.
    pub fn center_particles(&mut self, ids: &[ParticleId]) {
        let pool = &self.pool;
        let Some(bbox) = Rect::from_points(ids.iter().filter_map(|&id| pool.get(id)).map(|p| p.position))
        else {
            return;
        };
        let offset = self.bounds.center() - bbox.center();

        for &id in ids {
            if let Some(p) = self.pool.get_mut(id) {
                p.position += offset;
                p.prev_position += offset;
                p.user_data.origin += offset;
                for point in &mut p.trail {
                    point.position += offset;
                }
            }
        }
    }

    // --- configuration ---

    pub fn resize(&mut self, width: u32, height: u32) {
        self.bounds = Bounds::new(width as f32, height as f32);
        self.renderer.resize(width, height);
        tracing::debug!(width, height, "engine resized");
    }

    /// Apply the fields that are set. A lower `max_particles` never evicts:
    /// the active count may exceed the new cap until particles are released.
    pub fn set_parameters(&mut self, params: &EngineParameters) {
        if let Some(max) = params.max_particles {
            self.pool.set_capacity(max);
        }
        if let Some(fps) = params.target_fps {
            self.target_fps = fps.max(1);
        }
        if let Some(physics) = &params.physics {
            self.physics.set_parameters(physics);
        }
        if let Some(quality) = params.quality {
            self.render_options.apply_quality(quality);
        }
        if let Some(glow) = params.show_glow {
            self.render_options.show_glow = glow;
        }
        if let Some(trail) = params.show_trail {
            self.render_options.show_trail = trail;
        }
        if let Some(sort) = params.sort_by_depth {
            self.render_options.sort_by_depth = sort;
        }
        if let Some(mode) = params.blend_mode {
            self.render_options.blend_mode = mode;
        }
        if let Some(background) = params.background {
            self.renderer.set_background(background);
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            running: self.is_running(),
            paused: self.is_paused(),
            particle_count: self.pool.active_count(),
            max_particles: self.pool.capacity(),
            frame_count: self.frame_count,
            target_fps: self.target_fps,
            performance: self.monitor.stats().clone(),
            physics: self.physics.summary(),
            render: self.renderer.stats().clone(),
        }
    }

    /// Stop, empty the pool, drop subscribers and hooks, clear the canvas
    pub fn destroy(&mut self) {
        self.stop();
        self.pool.clear();
        self.events.drain();
        self.events.clear_subscribers();
        self.hooks.clear();
        self.physics.clear_force_fields();
        self.monitor.reset();
        self.renderer.clear();
        tracing::info!("engine destroyed");
    }

    // --- events and hooks ---

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriberId
    where
        F: FnMut(&EngineEvent) -> ControlFlow<()> + 'static,
    {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Deliver queued events now. Frames do this on their own; hosts call it
    /// to flush creation events while stopped.
    pub fn dispatch_events(&mut self) -> ControlFlow<()> {
        let flow = self.events.dispatch();
        if flow.is_break() {
            self.stop();
        }
        flow
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn add_update_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Particle, f32) + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    // --- accessors ---

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn performance(&self) -> &PerformanceStats {
        self.monitor.stats()
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn renderer(&self) -> &BatchRenderer<C> {
        &self.renderer
    }

    pub fn canvas(&self) -> &C {
        self.renderer.canvas()
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    pub fn sampler_mut(&mut self) -> &mut GeometrySampler {
        &mut self.sampler
    }
}

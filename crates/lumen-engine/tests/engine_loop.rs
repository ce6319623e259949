use lumen_core::{Bounds, Color, LumenError, Rect, Rng, Vec2};
use lumen_engine::{
    Engine, EngineConfig, EngineEvent, FrameOutcome, ManualClock, RunState, SpawnOptions,
};
use lumen_geometry::{GeometrySampler, SampledPoint, SamplerConfig, SvgDocument};
use lumen_particles::{
    ForceField, NoInput, Particle, ParticleOptions, PhysicsParameters, PhysicsSolver,
    PhysicsSummary, PointerButton,
};
use lumen_render::PixelCanvas;
use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;

/// Solver that records the deltas it was stepped with
#[derive(Default)]
struct RecordingPhysics {
    deltas: Rc<RefCell<Vec<f32>>>,
    input_forces: usize,
}

impl PhysicsSolver for RecordingPhysics {
    fn update(&mut self, _particles: &mut [Particle], delta_ms: f32, _bounds: Bounds) {
        self.deltas.borrow_mut().push(delta_ms);
    }
    fn add_force_field(&mut self, _field: ForceField) {}
    fn clear_force_fields(&mut self) {}
    fn set_parameters(&mut self, _params: &PhysicsParameters) {}
    fn set_input_forces(&mut self, forces: Vec<ForceField>) {
        self.input_forces = forces.len();
    }
    fn summary(&self) -> PhysicsSummary {
        PhysicsSummary {
            gravity: Vec2::ZERO,
            wind: Vec2::ZERO,
            friction: 1.0,
            bounce: 1.0,
            time_scale: 1.0,
            force_fields: 0,
            input_forces: self.input_forces,
        }
    }
}

fn config(max_particles: usize) -> EngineConfig {
    EngineConfig {
        max_particles,
        seed: Some(42),
        ..Default::default()
    }
}

fn engine(max_particles: usize, width: u32, height: u32) -> (Engine<PixelCanvas>, ManualClock) {
    let clock = ManualClock::new();
    let engine = Engine::new(PixelCanvas::new(width, height), config(max_particles))
        .with_time_source(clock.clone());
    (engine, clock)
}

fn recording_engine() -> (
    Engine<PixelCanvas, RecordingPhysics, NoInput>,
    ManualClock,
    Rc<RefCell<Vec<f32>>>,
) {
    let clock = ManualClock::new();
    let physics = RecordingPhysics::default();
    let deltas = Rc::clone(&physics.deltas);
    let engine = Engine::with_parts(PixelCanvas::new(32, 32), config(100), physics, NoInput)
        .with_time_source(clock.clone());
    (engine, clock, deltas)
}

#[test]
fn acquire_beyond_cap_returns_none() {
    let (mut engine, _) = engine(8, 64, 64);
    let results: Vec<_> = (0..11)
        .map(|i| engine.acquire(i as f32, 0.0, &ParticleOptions::default()))
        .collect();
    assert_eq!(engine.active_count(), 8);
    assert!(results[..8].iter().all(Option::is_some));
    assert!(results[8..].iter().all(Option::is_none));
}

#[test]
fn release_round_trip_keeps_counts() {
    let (mut engine, _) = engine(4, 64, 64);
    engine.acquire(1.0, 1.0, &ParticleOptions::default());
    let before = engine.active_count();
    let id = engine
        .acquire(2.0, 2.0, &ParticleOptions::default())
        .unwrap();
    assert!(engine.release(id));
    assert_eq!(engine.active_count(), before);
    assert!(!engine.release(id));
}

#[test]
fn lowering_max_particles_blocks_acquires_until_released() {
    let (mut engine, _) = engine(6, 64, 64);
    let ids: Vec<_> = (0..6)
        .map(|i| {
            engine
                .acquire(i as f32, 0.0, &ParticleOptions::default())
                .unwrap()
        })
        .collect();
    engine.set_parameters(&lumen_engine::EngineParameters {
        max_particles: Some(3),
        ..Default::default()
    });
    assert_eq!(engine.active_count(), 6);
    assert!(engine
        .acquire(0.0, 0.0, &ParticleOptions::default())
        .is_none());

    for &id in &ids[..3] {
        assert!(engine.release(id));
    }
    assert!(engine
        .acquire(0.0, 0.0, &ParticleOptions::default())
        .is_none());
    assert!(engine.release(ids[3]));
    assert!(engine
        .acquire(0.0, 0.0, &ParticleOptions::default())
        .is_some());
    assert_eq!(engine.active_count(), 3);
}

#[test]
fn centering_puts_bbox_center_on_canvas_center() {
    let (mut engine, _) = engine(100, 200, 100);
    let points: Vec<_> = [(3.0, 7.0), (13.0, 2.0), (40.0, 31.0), (22.0, 19.0)]
        .iter()
        .map(|&(x, y)| SampledPoint::new(Vec2::new(x, y)))
        .collect();
    let ids = engine.create_from_points(&points, &SpawnOptions::default());
    assert_eq!(ids.len(), 4);

    let bbox = Rect::from_points(engine.particles().iter().map(|p| p.position)).unwrap();
    let center = bbox.center();
    assert!((center.x - 100.0).abs() < 1e-4);
    assert!((center.y - 50.0).abs() < 1e-4);
    // no scaling
    assert!((bbox.width - 37.0).abs() < 1e-4);
    assert!((bbox.height - 29.0).abs() < 1e-4);

    for (p, src) in engine.particles().iter().zip(&points) {
        assert_eq!(p.prev_position, p.position);
        assert_eq!(p.user_data.origin, p.position);
        let offset = p.position - src.position;
        assert!((offset.x - 78.5).abs() < 1e-4);
        assert!((offset.y - 33.5).abs() < 1e-4);
    }
}

#[test]
fn long_stall_is_clamped_to_one_thirtieth() {
    let (mut engine, clock, deltas) = recording_engine();
    engine.start();
    clock.advance(5.0);
    assert_eq!(engine.step(), FrameOutcome::Rendered);
    clock.advance(0.01);
    engine.step();

    let deltas = deltas.borrow();
    assert_eq!(deltas.len(), 2);
    assert!(deltas[0] <= 1000.0 / 30.0 + 1e-3);
    assert!(deltas[0] > 33.0);
    assert!((deltas[1] - 10.0).abs() < 1e-3);
}

#[test]
fn rect_scenario_fills_pool_without_misses() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
        <rect x="0" y="0" width="100" height="100"/>
    </svg>"#;
    let document = SvgDocument::parse(svg).unwrap();

    let mut base = GeometrySampler::with_rng(
        SamplerConfig {
            merge: false,
            ..Default::default()
        },
        Rng::new(3),
    );
    let outline = base.sample(&document.shapes, 5.0, 1, 1.0).unwrap();
    assert!(outline.len() >= 80);

    let quality = 7;
    let points = base.sample(&document.shapes, 5.0, quality, 1.0).unwrap();
    assert!(points.len() >= 80 * quality as usize);

    let (mut engine, clock) = engine(500, 300, 300);
    let ids = engine.create_from_points(&points[..500], &SpawnOptions::default());
    assert_eq!(ids.len(), 500);

    engine.start();
    clock.advance(1.0 / 60.0);
    assert_eq!(engine.step(), FrameOutcome::Rendered);
    assert_eq!(engine.active_count(), 500);
    assert_eq!(engine.state().render.width, 300);
}

#[test]
fn create_from_points_stops_at_cap() {
    let (mut engine, _) = engine(10, 64, 64);
    let points: Vec<_> = (0..25)
        .map(|i| SampledPoint::new(Vec2::new(i as f32, 1.0)))
        .collect();
    let ids = engine.create_from_points(&points, &SpawnOptions::default());
    assert_eq!(ids.len(), 10);
    assert_eq!(engine.active_count(), 10);
}

#[test]
fn create_from_svg_copies_point_metadata() {
    let svg = r#"<svg width="50" height="50">
        <circle cx="25" cy="25" r="10"/>
        <line x1="0" y1="0" x2="20" y2="0"/>
    </svg>"#;
    let (mut engine, _) = engine(1000, 100, 100);
    let spawn = SpawnOptions {
        color: Some(Color::rgb(0, 255, 0)),
        delay: Some(lumen_geometry::DelayMode::sequential()),
        ..Default::default()
    };
    let ids = engine.create_from_svg(svg, &spawn).unwrap();
    assert!(!ids.is_empty());
    assert!(engine.particles().iter().all(|p| p.color == Color::rgb(0, 255, 0)));
    let shapes: std::collections::HashSet<_> = engine
        .particles()
        .iter()
        .filter_map(|p| p.user_data.shape_index)
        .collect();
    assert_eq!(shapes.len(), 2);
    assert!(engine.particles().iter().all(|p| p.user_data.delay.is_some()));
}

#[test]
fn fit_scales_artwork_to_canvas() {
    let svg = r#"<svg viewBox="0 0 10 10"><rect x="0" y="0" width="10" height="10"/></svg>"#;
    let (mut engine, _) = engine(10_000, 200, 100);
    engine.sampler_mut().config.merge = false;
    let spawn = SpawnOptions {
        fit: Some(0.5),
        ..Default::default()
    };
    engine.create_from_svg(svg, &spawn).unwrap();
    let bbox = Rect::from_points(engine.particles().iter().map(|p| p.position)).unwrap();
    // limited by height: 100 * 0.5 / 10 = 5x
    assert!((bbox.width - 50.0).abs() < 1.0);
    assert!((bbox.height - 50.0).abs() < 1.0);
}

#[test]
fn parse_error_leaves_pool_untouched() {
    let (mut engine, _) = engine(100, 64, 64);
    engine.acquire(1.0, 1.0, &ParticleOptions::default());
    let err = engine
        .create_from_svg("<svg><rect", &SpawnOptions::default())
        .unwrap_err();
    assert!(matches!(err, LumenError::Parse(_)));
    assert_eq!(engine.active_count(), 1);
    assert_eq!(engine.pending_events(), 1);
}

#[test]
fn stale_token_is_ignored_after_stop() {
    let (mut engine, clock) = engine(10, 32, 32);
    engine.start();
    let token = engine.scheduled_frame().unwrap();
    engine.stop();
    engine.stop();
    clock.advance(0.016);
    assert_eq!(engine.frame(token), FrameOutcome::Cancelled);
    assert_eq!(engine.frame_count(), 0);
    assert_eq!(engine.run_state(), RunState::Stopped);
}

#[test]
fn pause_skips_simulation_but_keeps_schedule() {
    let (mut engine, clock, deltas) = recording_engine();
    engine.start();
    engine.pause();
    for _ in 0..3 {
        clock.advance(0.016);
        assert_eq!(engine.step(), FrameOutcome::Paused);
        assert!(engine.scheduled_frame().is_some());
    }
    assert!(deltas.borrow().is_empty());
    assert_eq!(engine.frame_count(), 0);

    engine.resume();
    clock.advance(0.016);
    assert_eq!(engine.step(), FrameOutcome::Rendered);
    assert_eq!(deltas.borrow().len(), 1);
}

#[test]
fn events_reach_every_subscriber() {
    let (mut engine, clock) = engine(10, 32, 32);
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(0usize));

    let sink = Rc::clone(&first);
    engine.subscribe(move |event| {
        sink.borrow_mut().push(event.clone());
        ControlFlow::Continue(())
    });
    let counter = Rc::clone(&second);
    engine.subscribe(move |_| {
        *counter.borrow_mut() += 1;
        ControlFlow::Continue(())
    });

    let id = engine
        .acquire(5.0, 5.0, &ParticleOptions::default())
        .unwrap();
    engine.start();
    clock.advance(0.016);
    engine.step();

    let events = first.borrow();
    assert_eq!(events[0], EngineEvent::ParticleCreated(id));
    assert!(matches!(events[1], EngineEvent::Updated { active: 1, .. }));
    assert_eq!(events[2], EngineEvent::Rendered { active: 1 });
    assert!(matches!(events[3], EngineEvent::PerformanceUpdated(_)));
    assert_eq!(*second.borrow(), events.len());
}

#[test]
fn subscriber_break_stops_engine() {
    let (mut engine, clock) = engine(10, 32, 32);
    engine.subscribe(|event| match event {
        EngineEvent::Rendered { .. } => ControlFlow::Break(()),
        _ => ControlFlow::Continue(()),
    });
    engine.start();
    clock.advance(0.016);
    assert_eq!(engine.step(), FrameOutcome::Rendered);
    assert_eq!(engine.run_state(), RunState::Stopped);
    assert!(engine.scheduled_frame().is_none());
    assert_eq!(engine.step(), FrameOutcome::Cancelled);
}

#[test]
fn dead_particles_are_released_with_events() {
    let (mut engine, clock) = engine(10, 64, 64);
    let destroyed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&destroyed);
    engine.subscribe(move |event| {
        if let EngineEvent::ParticleDestroyed(id) = event {
            sink.borrow_mut().push(*id);
        }
        ControlFlow::Continue(())
    });

    let short = ParticleOptions {
        decay: 100.0,
        ..Default::default()
    };
    let doomed = engine.acquire(10.0, 10.0, &short).unwrap();
    engine.acquire(20.0, 20.0, &ParticleOptions::default()).unwrap();
    engine.start();
    clock.advance(0.02);
    engine.step();

    assert_eq!(engine.active_count(), 1);
    assert_eq!(*destroyed.borrow(), vec![doomed]);
}

#[test]
fn pointer_forces_reach_physics() {
    let (mut engine, clock) = engine(10, 200, 200);
    engine.set_parameters(&lumen_engine::EngineParameters {
        physics: Some(PhysicsParameters {
            gravity: Some(Vec2::ZERO),
            ..Default::default()
        }),
        ..Default::default()
    });
    let id = engine
        .acquire(100.0, 100.0, &ParticleOptions::default())
        .unwrap();
    engine
        .input_mut()
        .press(150.0, 100.0, PointerButton::Primary);
    engine.start();
    clock.advance(0.016);
    engine.step();

    assert_eq!(engine.state().physics.input_forces, 1);
    assert!(engine.particle(id).unwrap().velocity.x > 0.0);
}

#[test]
fn state_serializes_to_json() {
    let (mut engine, clock) = engine(10, 32, 32);
    engine.acquire(1.0, 1.0, &ParticleOptions::default());
    engine.start();
    clock.advance(0.016);
    engine.step();

    let json = serde_json::to_value(engine.state()).unwrap();
    assert_eq!(json["running"], true);
    assert_eq!(json["paused"], false);
    assert_eq!(json["particle_count"], 1);
    assert_eq!(json["max_particles"], 10);
    assert_eq!(json["frame_count"], 1);
    assert!(json["performance"]["frame_time_ms"].as_f64().unwrap() > 15.0);
}

#[test]
fn config_from_toml_drives_engine() {
    let config = EngineConfig::from_toml_str(
        r##"
max_particles = 3
background = "#202020"
quality = "low"
"##,
    )
    .unwrap();
    let engine = Engine::new(PixelCanvas::new(16, 16), config);
    assert_eq!(engine.max_particles(), 3);
    assert!(!engine.render_options().show_glow);
    assert!(!engine.render_options().show_trail);
}

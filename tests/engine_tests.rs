//! Integration tests for the engine frame loop.
//!
//! These drive a full [`Engine`] through [`RecordingSurface`] and
//! [`RasterSurface`] to check lifetimes, ordering and what reaches the canvas.

use clickfx::prelude::*;
use clickfx::{DrawCommand, HeadlessRender, FIXED_STEP};

fn engine() -> Engine<RecordingSurface> {
    Engine::with_seed(RecordingSurface::new(800, 600), 1234)
}

fn at_centre() -> EffectOptions {
    EffectOptions::at(400.0, 300.0)
}

// ============================================================================
// Lifetimes
// ============================================================================

#[test]
fn test_particle_removed_after_its_life() {
    for seed in 0..20 {
        let mut engine = Engine::with_seed(RecordingSurface::new(100, 100), seed);
        engine.confetti(&at_centre().count(1));
        let life = engine.particles()[0].kinematics().life;
        let frames = (life / FIXED_STEP).ceil() as u32;

        for _ in 0..frames.saturating_sub(2) {
            engine.frame();
        }
        assert_eq!(engine.len(), 1, "removed too early (life {life})");

        for _ in frames.saturating_sub(2)..frames + 1 {
            engine.frame();
        }
        assert!(engine.is_empty(), "still alive after {} frames (life {life})", frames + 1);
    }
}

#[test]
fn test_dead_particles_are_never_drawn() {
    let mut engine = engine();
    engine.confetti(&at_centre().count(25));

    while !engine.is_empty() {
        engine.frame();
        let cmds = engine.surface_mut().take_commands();
        let rects = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(rects, engine.len());
    }
}

#[test]
fn test_every_effect_runs_to_completion() {
    let mut engine = engine();
    for effect in Effect::ALL {
        engine.emit(effect, &at_centre());
    }
    assert!(!engine.is_empty());

    // Longest life is a balloon at 3.5s.
    for _ in 0..(3.6 / FIXED_STEP) as u32 {
        engine.frame();
        engine.surface_mut().take_commands();
    }
    assert!(engine.is_empty());
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_alpha_in_range_at_draw_time() {
    let mut engine = engine();
    for effect in Effect::ALL {
        engine.emit(effect, &at_centre().count(20).power(2.5));
    }

    for _ in 0..240 {
        engine.frame();
        let surface = engine.surface_mut();
        for alpha in surface.paint_alphas() {
            assert!((0.0..=1.0).contains(&alpha), "alpha {alpha} out of range");
        }
        surface.take_commands();
    }
}

#[test]
fn test_save_restore_balanced_each_frame() {
    let mut engine = engine();
    for effect in Effect::ALL {
        engine.emit(effect, &at_centre().count(5));
    }

    for _ in 0..30 {
        engine.frame();
        let surface = engine.surface_mut();
        assert_eq!(surface.depth(), 0);
        let cmds = surface.take_commands();
        let saves = cmds.iter().filter(|c| **c == DrawCommand::Save).count();
        let restores = cmds.iter().filter(|c| **c == DrawCommand::Restore).count();
        assert_eq!(saves, restores);
        // One for the clear plus one per live particle.
        assert_eq!(saves, engine.len() + 1);
    }
}

#[test]
fn test_idle_loop_only_clears() {
    let mut engine = engine();
    for _ in 0..100 {
        engine.frame();
    }
    let surface = engine.surface();
    assert!(engine.is_empty());
    assert_eq!(surface.paint_count(), 0);
    let clears = surface
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::ClearRect { .. }))
        .count();
    assert_eq!(clears, 100);
}

// ============================================================================
// Emission
// ============================================================================

#[test]
fn test_confetti_count() {
    let mut engine = engine();
    engine.confetti(&at_centre().count(60));
    assert_eq!(engine.len(), 60);
    assert!(engine.particles().iter().all(|p| p.kind() == ParticleKind::Rect));
}

#[test]
fn test_fireworks_count() {
    let mut engine = engine();
    engine.fireworks(&at_centre().count(90));
    assert_eq!(engine.len(), 120);
    assert!(engine.particles().iter().all(|p| p.kind() == ParticleKind::Circle));
}

#[test]
fn test_zero_count_leaves_set_unchanged() {
    let mut engine = engine();
    engine.smoke(&at_centre().count(3));
    let before: Vec<_> = engine.particles().to_vec();

    engine.confetti(&at_centre().count(0));
    engine.fireworks(&at_centre().count(0));
    engine.balloons(&at_centre().count(0));
    engine.flame(&at_centre().count(0));
    engine.smoke(&at_centre().count(0));
    engine.pixel_burst(&at_centre().count(0));
    engine.sparkles(&at_centre().count(0));
    engine.leaves(&at_centre().count(0));
    engine.glow_pulse(&at_centre().count(0));

    assert_eq!(engine.particles(), &before[..]);
}

#[test]
fn test_balloons_rise() {
    let mut engine = engine();
    engine.balloons(&at_centre().count(10));

    let mean_vy = |engine: &Engine<RecordingSurface>| {
        let total: f32 = engine.particles().iter().map(|p| p.kinematics().velocity.y).sum();
        total / engine.len() as f32
    };

    let start = mean_vy(&engine);
    for _ in 0..60 {
        engine.frame();
    }
    let later = mean_vy(&engine);
    assert!(later < start);
    assert!(later < 0.0);
}

#[test]
fn test_settings_drive_emission() {
    let config = OverlayConfig {
        effect: EffectChoice::Fixed(Effect::Sparkles),
        intensity: 2.0,
        ..Default::default()
    };
    let mut engine = engine();
    let effect = engine.emit_choice(config.effect, &config.effect_options(10.0, 10.0));
    assert_eq!(effect, Effect::Sparkles);
    assert_eq!(engine.len(), 120);
}

// ============================================================================
// Raster output
// ============================================================================

#[test]
fn test_raster_glow_then_clear() {
    let mut engine = Engine::with_seed(RasterSurface::new(200, 200), 9);
    engine.glow_pulse(&EffectOptions::at(100.0, 100.0).count(1));
    engine.frame();

    assert!(engine.surface().pixel(100, 100)[3] > 0);
    assert_eq!(engine.surface().pixel(0, 0), [0, 0, 0, 0]);

    while !engine.is_empty() {
        engine.frame();
    }
    engine.frame();
    assert!(engine.surface().pixels().iter().all(|b| *b == 0));
}

#[test]
fn test_headless_render_writes_frames() {
    let dir = tempfile::tempdir().unwrap();
    let config = OverlayConfig {
        effect: EffectChoice::Fixed(Effect::Fireworks),
        ..Default::default()
    };

    let written = HeadlessRender::new(config)
        .with_size(160, 120)
        .with_frames(25, 10)
        .with_seed(3)
        .render_to(dir.path())
        .unwrap();

    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["frame_0010.png", "frame_0020.png", "frame_0025.png"]);
    for path in &written {
        let image = image::open(path).unwrap();
        assert_eq!((image.width(), image.height()), (160, 120));
    }
}

//! Per-kind motion and rendering.
//!
//! | Kind | Motion | Shape | Alpha |
//! |------|--------|-------|-------|
//! | Rect | base + spin | rotated rect, `size × 0.6·size` | opaque |
//! | Circle | base | disc | `0.6 + 0.4·sin(20·age + size)` when twinkling |
//! | Balloon | buoyancy + sway | ellipse, tie, string | `1 - t^1.5` |
//! | Flame | base + buoyancy, size × 0.97 per frame | gradient disc, radius `2·size` | fade early |
//! | Smoke | base + buoyancy | disc at 40% | `1 - t` |
//! | Pixel | base | square | opaque |
//! | Sparkle | base | four-point star | `0.5 + 0.5·sin(25·age + size)` when twinkling |
//! | Leaf | falls at 0.02/frame² + sway | rotated ellipse | `1 - t` |
//! | GlowPulse | none, size `start·(0.5 + 1.5·t)` | gradient disc at 40% | `1 - t` |
//!
//! `t` is `age / life`. Every draw is wrapped in save/restore.

use crate::color::Color;
use crate::particle::{Particle, ParticleKind};
use crate::surface::{Paint, RadialGradient, Surface};
use std::f32::consts::TAU;

/// Balloon lift when the behavior leaves buoyancy unset.
pub const BALLOON_BUOYANCY: f32 = -0.05;
/// Balloon sway when the behavior leaves wobble unset.
pub const BALLOON_WOBBLE: f32 = 0.006;
/// Constant downward pull on leaves.
pub const LEAF_GRAVITY: f32 = 0.02;
/// Per-frame flame shrink factor.
pub const FLAME_SHRINK: f32 = 0.97;
/// Opacity multiplier for smoke and glow pulses.
pub const SOFT_ALPHA: f32 = 0.4;

const BALLOON_TIE: Color = Color::rgba(0.0, 0.0, 0.0, 0.25);
const SPARKLE_LINE_WIDTH: f32 = 1.5;

pub(crate) fn update(p: &mut Particle, dt: f32) {
    match p.kind() {
        ParticleKind::Rect | ParticleKind::Pixel => p.base_update(dt),
        ParticleKind::Circle => {
            p.base_update(dt);
            twinkle(p, 0.6, 0.4, 20.0);
        }
        ParticleKind::Sparkle => {
            p.base_update(dt);
            twinkle(p, 0.5, 0.5, 25.0);
        }
        ParticleKind::Balloon => {
            let buoyancy = p.behavior.buoyancy.unwrap_or(BALLOON_BUOYANCY);
            let wobble = p.behavior.wobble.unwrap_or(BALLOON_WOBBLE);
            sway(p, buoyancy, 4.0, wobble);
            p.base_update(dt);
            let t = p.state.age / p.state.life;
            p.state.alpha = (1.0 - t.max(0.0).powf(1.5)).max(0.0);
        }
        ParticleKind::Flame => {
            p.state.velocity.y += p.behavior.buoyancy.unwrap_or(0.0);
            p.base_update(dt);
            p.state.size *= FLAME_SHRINK;
        }
        ParticleKind::Smoke => {
            p.state.velocity.y += p.behavior.buoyancy.unwrap_or(0.0);
            p.base_update(dt);
            p.state.alpha = p.state.linear_fade();
        }
        ParticleKind::Leaf => {
            let wobble = p.behavior.wobble.unwrap_or(0.0);
            sway(p, LEAF_GRAVITY, 3.0, wobble);
            p.base_update(dt);
            p.state.alpha = p.state.linear_fade();
        }
        ParticleKind::GlowPulse { start_size } => {
            p.age_by(dt);
            let t = p.state.progress();
            p.state.size = start_size * (0.5 + 1.5 * t);
            p.state.alpha = (1.0 - t).max(0.0);
        }
    }
}

/// Vertical push plus a sinusoidal horizontal nudge keyed on age and size.
fn sway(p: &mut Particle, lift: f32, frequency: f32, amplitude: f32) {
    let s = &mut p.state;
    s.velocity.y += lift;
    s.velocity.x += ((s.age + s.size) * frequency).sin() * amplitude;
}

/// Oscillating alpha, multiplied into the linear fade when both are set.
fn twinkle(p: &mut Particle, base: f32, depth: f32, rate: f32) {
    if !p.behavior.twinkle {
        return;
    }
    let s = &mut p.state;
    let oscillation = base + depth * (s.age * rate + s.size).sin();
    s.alpha = if p.behavior.fade_early {
        oscillation * s.linear_fade()
    } else {
        oscillation
    };
}

pub(crate) fn draw<S: Surface + ?Sized>(p: &Particle, surface: &mut S) {
    let s = p.kinematics();
    let alpha = p.draw_alpha();
    let (x, y) = (s.position.x, s.position.y);

    surface.save();
    match p.kind() {
        ParticleKind::Rect => {
            surface.set_global_alpha(alpha);
            surface.translate(x, y);
            surface.rotate(s.rotation);
            surface.set_fill_style(Paint::Solid(s.color));
            surface.fill_rect(-s.size / 2.0, -s.size / 2.0, s.size, s.size * 0.6);
        }
        ParticleKind::Circle => {
            surface.set_global_alpha(alpha);
            disc(surface, x, y, s.size, Paint::Solid(s.color));
        }
        ParticleKind::Balloon => {
            surface.set_global_alpha(alpha);
            surface.translate(x, y);
            surface.rotate(s.rotation * 0.1);

            surface.begin_path();
            surface.ellipse(0.0, 0.0, s.size, s.size * 1.3, 0.0, 0.0, TAU);
            surface.set_fill_style(Paint::Solid(s.color));
            surface.fill();

            surface.begin_path();
            surface.move_to(0.0, s.size * 1.3);
            surface.line_to(0.0, s.size * 1.6);
            surface.set_stroke_style(Paint::Solid(BALLOON_TIE));
            surface.set_line_width(1.0);
            surface.stroke();

            surface.begin_path();
            surface.move_to(0.0, s.size * 1.6);
            surface.quadratic_curve_to(3.0, s.size * 2.2, 0.0, s.size * 2.8);
            surface.stroke();
        }
        ParticleKind::Flame => {
            surface.set_global_alpha(alpha);
            let radius = s.size * 2.0;
            disc(surface, x, y, radius, glow(s.color, x, y, radius));
        }
        ParticleKind::Smoke => {
            surface.set_global_alpha(alpha * SOFT_ALPHA);
            disc(surface, x, y, s.size, Paint::Solid(s.color));
        }
        ParticleKind::Pixel => {
            surface.set_global_alpha(alpha);
            surface.set_fill_style(Paint::Solid(s.color));
            surface.fill_rect(x, y, s.size, s.size);
        }
        ParticleKind::Sparkle => {
            surface.set_global_alpha(alpha);
            surface.translate(x, y);
            surface.rotate(s.rotation);
            surface.set_stroke_style(Paint::Solid(s.color));
            surface.set_line_width(SPARKLE_LINE_WIDTH);

            let long = s.size;
            let short = s.size * 0.35;
            surface.begin_path();
            surface.move_to(-long, 0.0);
            surface.line_to(long, 0.0);
            surface.move_to(0.0, -long);
            surface.line_to(0.0, long);
            surface.move_to(-short, -short);
            surface.line_to(short, short);
            surface.move_to(-short, short);
            surface.line_to(short, -short);
            surface.stroke();
        }
        ParticleKind::Leaf => {
            surface.set_global_alpha(alpha);
            surface.translate(x, y);
            surface.rotate(s.rotation);
            surface.begin_path();
            surface.ellipse(0.0, 0.0, s.size * 0.6, s.size, 0.0, 0.0, TAU);
            surface.set_fill_style(Paint::Solid(s.color));
            surface.fill();
        }
        ParticleKind::GlowPulse { .. } => {
            surface.set_global_alpha(alpha * SOFT_ALPHA);
            disc(surface, x, y, s.size, glow(s.color, x, y, s.size));
        }
    }
    surface.restore();
}

fn disc<S: Surface + ?Sized>(surface: &mut S, x: f32, y: f32, radius: f32, paint: Paint) {
    surface.begin_path();
    surface.arc(x, y, radius.max(0.0), 0.0, TAU);
    surface.set_fill_style(paint);
    surface.fill();
}

/// Gradient from the particle color at the center to transparent at `radius`.
fn glow(color: Color, x: f32, y: f32, radius: f32) -> Paint {
    RadialGradient::new(glam::Vec2::new(x, y), 0.0, radius.max(0.0))
        .with_stop(0.0, color)
        .with_stop(1.0, color.with_alpha(0.0))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{Behavior, Launch};
    use crate::surface::{DrawCommand, RecordingSurface};
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    const DT: f32 = 1.0 / 60.0;

    fn make(kind: ParticleKind, behavior: Behavior, speed: f32, angle: f32, life: f32) -> Particle {
        Particle::new(
            kind,
            Launch {
                origin: Vec2::new(200.0, 200.0),
                speed,
                angle,
                size: 10.0,
                color: Color::rgb(1.0, 0.5, 0.0),
                life,
            },
            behavior,
            0.0,
        )
    }

    fn all_kinds() -> Vec<(ParticleKind, Behavior)> {
        vec![
            (ParticleKind::Rect, Behavior::new().gravity(0.15).spin(0.2)),
            (ParticleKind::Circle, Behavior::new().twinkle()),
            (ParticleKind::Circle, Behavior::new().fade_early()),
            (ParticleKind::Balloon, Behavior::new().buoyancy(-0.06).wobble(0.01)),
            (ParticleKind::Flame, Behavior::new().buoyancy(-0.08).fade_early()),
            (ParticleKind::Smoke, Behavior::new().buoyancy(-0.03)),
            (ParticleKind::Pixel, Behavior::new().gravity(0.1)),
            (ParticleKind::Sparkle, Behavior::new().twinkle().fade_early()),
            (ParticleKind::Leaf, Behavior::new().wobble(0.03).spin(0.05)),
            (ParticleKind::GlowPulse { start_size: 10.0 }, Behavior::new()),
        ]
    }

    #[test]
    fn test_balloon_rises() {
        let mut p = make(ParticleKind::Balloon, Behavior::new().buoyancy(-0.06), 1.0, 0.0, 3.0);
        let mut last_vy = p.kinematics().velocity.y;
        for _ in 0..60 {
            update(&mut p, DT);
            let vy = p.kinematics().velocity.y;
            assert!(vy < last_vy);
            last_vy = vy;
        }
        assert!(last_vy < 0.0);
        assert!(p.kinematics().position.y < 200.0);
    }

    #[test]
    fn test_balloon_alpha_eases_out() {
        let mut p = make(ParticleKind::Balloon, Behavior::new(), 1.0, 0.0, 1.0);
        for _ in 0..30 {
            update(&mut p, DT);
        }
        let t: f32 = p.kinematics().age;
        let expected = 1.0 - t.powf(1.5);
        assert!((p.kinematics().alpha - expected).abs() < 1e-4);
    }

    #[test]
    fn test_flame_shrinks_every_frame() {
        let mut p = make(ParticleKind::Flame, Behavior::new().buoyancy(-0.08), 1.0, -FRAC_PI_2, 1.0);
        let mut last = p.kinematics().size;
        for _ in 0..20 {
            update(&mut p, DT);
            let size = p.kinematics().size;
            assert!((size - last * FLAME_SHRINK).abs() < 1e-4);
            last = size;
        }
    }

    #[test]
    fn test_glow_pulse_grows_in_place() {
        let mut p = make(ParticleKind::GlowPulse { start_size: 10.0 }, Behavior::new(), 0.0, 0.0, 1.0);
        update(&mut p, DT);
        let mut last = p.kinematics().size;
        for _ in 0..30 {
            update(&mut p, DT);
            assert!(p.kinematics().size > last);
            last = p.kinematics().size;
        }
        assert_eq!(p.kinematics().position, Vec2::new(200.0, 200.0));

        let t = p.kinematics().progress();
        assert!((p.kinematics().size - 10.0 * (0.5 + 1.5 * t)).abs() < 1e-4);
        assert!((p.kinematics().alpha - (1.0 - t)).abs() < 1e-5);
    }

    #[test]
    fn test_leaf_falls() {
        let mut p = make(ParticleKind::Leaf, Behavior::new().wobble(0.03), 0.0, 0.0, 3.0);
        for _ in 0..60 {
            update(&mut p, DT);
        }
        assert!(p.kinematics().velocity.y > 0.0);
        assert!(p.kinematics().position.y > 200.0);
    }

    #[test]
    fn test_smoke_fades_linearly() {
        let mut p = make(ParticleKind::Smoke, Behavior::new().buoyancy(-0.03), 1.0, -FRAC_PI_2, 2.0);
        for _ in 0..60 {
            update(&mut p, DT);
        }
        let expected = 1.0 - p.kinematics().age / 2.0;
        assert!((p.kinematics().alpha - expected).abs() < 1e-5);
    }

    #[test]
    fn test_circle_twinkle_formula() {
        let mut p = make(ParticleKind::Circle, Behavior::new().twinkle(), 1.0, 0.0, 1.0);
        update(&mut p, DT);
        let s = p.kinematics();
        let expected = 0.6 + 0.4 * (s.age * 20.0 + s.size).sin();
        assert!((s.alpha - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rect_stays_opaque() {
        let mut p = make(ParticleKind::Rect, Behavior::new().gravity(0.15), 3.0, 0.0, 1.0);
        for _ in 0..50 {
            update(&mut p, DT);
        }
        assert_eq!(p.kinematics().alpha, 1.0);
    }

    #[test]
    fn test_draw_is_balanced_and_alpha_in_range() {
        for (kind, behavior) in all_kinds() {
            let mut p = make(kind, behavior, 2.0, 0.3, 1.0);
            let mut surface = RecordingSurface::new(400, 400);
            while !p.is_dead() {
                update(&mut p, DT);
                p.draw(&mut surface);
            }
            assert_eq!(surface.depth(), 0, "{} left saves open", kind.name());
            assert!(surface.paint_count() > 0, "{} never painted", kind.name());
            for alpha in surface.paint_alphas() {
                assert!((0.0..=1.0).contains(&alpha), "{} alpha {alpha}", kind.name());
            }
        }
    }

    #[test]
    fn test_dead_particle_draws_nothing() {
        let mut p = make(ParticleKind::Circle, Behavior::new(), 1.0, 0.0, 0.01);
        p.update(DT, 0.0);
        assert!(p.is_dead());

        let mut surface = RecordingSurface::new(10, 10);
        p.draw(&mut surface);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_balloon_draws_body_tie_and_string() {
        let p = make(ParticleKind::Balloon, Behavior::new(), 1.0, 0.0, 1.0);
        let mut surface = RecordingSurface::new(10, 10);
        p.draw(&mut surface);

        let cmds = surface.commands();
        assert!(cmds.iter().any(|c| matches!(c, DrawCommand::Ellipse { .. })));
        assert!(cmds.iter().any(|c| matches!(c, DrawCommand::QuadraticCurveTo { .. })));
        assert_eq!(cmds.iter().filter(|c| matches!(c, DrawCommand::Stroke { .. })).count(), 2);
    }

    #[test]
    fn test_sparkle_twinkle_formula() {
        let mut p = make(ParticleKind::Sparkle, Behavior::new().twinkle(), 1.0, 0.0, 1.0);
        for _ in 0..7 {
            update(&mut p, DT);
        }
        let s = p.kinematics();
        let expected = 0.5 + 0.5 * (25.0 * s.age + s.size).sin();
        assert!((s.alpha - expected).abs() < 1e-6);
    }

    #[test]
    fn test_sparkle_twinkle_fades_when_fading_early() {
        let mut p = make(ParticleKind::Sparkle, Behavior::new().twinkle().fade_early(), 1.0, 0.0, 0.5);
        for _ in 0..20 {
            update(&mut p, DT);
        }
        let s = p.kinematics();
        let oscillation = 0.5 + 0.5 * (25.0 * s.age + s.size).sin();
        let expected = oscillation * (1.0 - s.age / 0.5);
        assert!((s.alpha - expected).abs() < 1e-5);
        assert!(s.alpha <= 1.0 - s.age / 0.5 + 1e-6);
    }

    #[test]
    fn test_leaf_fades_linearly() {
        let mut p = make(ParticleKind::Leaf, Behavior::new().wobble(0.03), 0.0, 0.0, 2.0);
        for _ in 0..45 {
            update(&mut p, DT);
        }
        let s = p.kinematics();
        assert!((s.alpha - (1.0 - s.age / 2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_pixel_is_square_anchored_at_position() {
        let p = make(ParticleKind::Pixel, Behavior::new(), 1.0, 0.0, 1.0);
        let mut surface = RecordingSurface::new(400, 400);
        p.draw(&mut surface);

        let rects: Vec<_> = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .collect();
        assert_eq!(
            rects,
            vec![&DrawCommand::FillRect {
                x: 200.0,
                y: 200.0,
                w: 10.0,
                h: 10.0,
                alpha: 1.0
            }]
        );
    }

    #[test]
    fn test_flame_gradient_spans_twice_its_size() {
        let p = make(ParticleKind::Flame, Behavior::new(), 0.0, 0.0, 1.0);
        let mut surface = RecordingSurface::new(400, 400);
        p.draw(&mut surface);

        let cmds = surface.commands();
        let gradient = cmds
            .iter()
            .find_map(|c| match c {
                DrawCommand::SetFillStyle(Paint::Radial(g)) => Some(g),
                _ => None,
            })
            .expect("flame fills with a gradient");
        assert_eq!(gradient.center, Vec2::new(200.0, 200.0));
        assert_eq!(gradient.inner_radius, 0.0);
        assert_eq!(gradient.outer_radius, 20.0);
        assert_eq!(gradient.stops()[0].1, Color::rgb(1.0, 0.5, 0.0));
        assert_eq!(gradient.stops()[1].1.a, 0.0);
        assert!(cmds
            .iter()
            .any(|c| matches!(c, DrawCommand::Arc { radius, .. } if *radius == 20.0)));
    }

    #[test]
    fn test_sparkle_draws_four_arms_in_one_stroke() {
        let p = make(ParticleKind::Sparkle, Behavior::new(), 0.0, 0.0, 1.0);
        let mut surface = RecordingSurface::new(400, 400);
        p.draw(&mut surface);

        let cmds = surface.commands();
        let segments: Vec<(f32, f32)> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::LineTo { x, y } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        let short = 10.0 * 0.35;
        assert_eq!(
            segments,
            vec![(10.0, 0.0), (0.0, 10.0), (short, short), (short, -short)]
        );
        assert_eq!(cmds.iter().filter(|c| matches!(c, DrawCommand::MoveTo { .. })).count(), 4);
        assert_eq!(cmds.iter().filter(|c| matches!(c, DrawCommand::Stroke { .. })).count(), 1);
        assert!(cmds.contains(&DrawCommand::SetLineWidth(SPARKLE_LINE_WIDTH)));
    }
}

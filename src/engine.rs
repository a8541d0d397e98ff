//! The particle engine.
//!
//! An [`Engine`] owns a drawing [`Surface`] and the ordered set of live
//! particles. Effects append batches to the set; the host calls
//! [`Engine::frame`] once per display refresh to advance and draw them.
//!
//! # Frame Order
//!
//! 1. clear the whole surface
//! 2. advance the clock by the fixed step
//! 3. drop particles already dead
//! 4. update every particle, in insertion order
//! 5. drop particles that died during the update
//! 6. draw what is left, in insertion order
//!
//! A particle is therefore never drawn on the frame it dies, and particles
//! emitted between frames take their first step on the next frame.
//!
//! ```ignore
//! let mut engine = Engine::new(RasterSurface::new(800, 600));
//! engine.confetti(&EffectOptions::at(400.0, 300.0));
//! while !engine.is_empty() {
//!     engine.frame();
//! }
//! let surface = engine.shutdown();
//! ```

use crate::effects::{self, Effect, EffectChoice, EffectOptions};
use crate::particle::Particle;
use crate::spawn::EmitContext;
use crate::surface::Surface;
use crate::time::{usable_step, FrameClock, FIXED_STEP};
use glam::Affine2;

/// Live particle set bound to a surface.
pub struct Engine<S: Surface> {
    surface: S,
    particles: Vec<Particle>,
    clock: FrameClock,
    ctx: EmitContext,
}

impl<S: Surface> Engine<S> {
    /// Bind an engine to `surface`.
    pub fn new(surface: S) -> Self {
        Self::with_context(surface, EmitContext::new())
    }

    /// Engine whose emissions draw from a seeded RNG.
    pub fn with_seed(surface: S, seed: u64) -> Self {
        Self::with_context(surface, EmitContext::with_seed(seed))
    }

    fn with_context(surface: S, ctx: EmitContext) -> Self {
        log::info!(
            "Engine started on a {}x{} surface",
            surface.width(),
            surface.height()
        );
        Self {
            surface,
            particles: Vec::new(),
            clock: FrameClock::new(),
            ctx,
        }
    }

    // ========== Emission ==========

    /// Emit `effect` and return how many particles were added.
    pub fn emit(&mut self, effect: Effect, opts: &EffectOptions) -> usize {
        let batch = effects::build(effect, opts, &mut self.ctx);
        let added = batch.len();
        self.particles.extend(batch);
        log::debug!(
            "Emitted {} {} particles at ({:.0}, {:.0}), {} live",
            added,
            effect,
            opts.x,
            opts.y,
            self.particles.len()
        );
        added
    }

    /// Resolve `choice` (picking at random for shuffle) and emit it.
    pub fn emit_choice(&mut self, choice: EffectChoice, opts: &EffectOptions) -> Effect {
        let effect = choice.pick(&mut self.ctx);
        self.emit(effect, opts);
        effect
    }

    pub fn confetti(&mut self, opts: &EffectOptions) {
        self.emit(Effect::Confetti, opts);
    }

    pub fn fireworks(&mut self, opts: &EffectOptions) {
        self.emit(Effect::Fireworks, opts);
    }

    pub fn balloons(&mut self, opts: &EffectOptions) {
        self.emit(Effect::Balloons, opts);
    }

    pub fn flame(&mut self, opts: &EffectOptions) {
        self.emit(Effect::Flame, opts);
    }

    pub fn smoke(&mut self, opts: &EffectOptions) {
        self.emit(Effect::Smoke, opts);
    }

    pub fn pixel_burst(&mut self, opts: &EffectOptions) {
        self.emit(Effect::PixelBurst, opts);
    }

    pub fn sparkles(&mut self, opts: &EffectOptions) {
        self.emit(Effect::Sparkles, opts);
    }

    pub fn leaves(&mut self, opts: &EffectOptions) {
        self.emit(Effect::Leaves, opts);
    }

    pub fn glow_pulse(&mut self, opts: &EffectOptions) {
        self.emit(Effect::GlowPulse, opts);
    }

    // ========== Frame loop ==========

    /// Run one frame at the fixed nominal step.
    pub fn frame(&mut self) {
        self.tick(FIXED_STEP);
    }

    /// Run one frame advancing physics by `dt` seconds.
    ///
    /// Negative or non-finite steps still clear and draw but age nothing.
    pub fn tick(&mut self, dt: f32) {
        self.clear();

        let dt = usable_step(dt);
        let now = self.clock.advance(dt);

        self.particles.retain(|p| !p.is_dead());
        for particle in &mut self.particles {
            particle.update(dt, now);
        }
        self.particles.retain(|p| !p.is_dead());

        for particle in &self.particles {
            particle.draw(&mut self.surface);
        }
    }

    /// Clear the full surface regardless of the current transform.
    fn clear(&mut self) {
        let (w, h) = (self.surface.width() as f32, self.surface.height() as f32);
        self.surface.save();
        self.surface.set_transform(Affine2::IDENTITY);
        self.surface.clear_rect(0.0, 0.0, w, h);
        self.surface.restore();
    }

    // ========== Access ==========

    /// Live particles in insertion order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Stop the engine, drop every particle and hand the surface back.
    pub fn shutdown(self) -> S {
        log::info!(
            "Engine stopped after {} frames with {} live particles",
            self.clock.frame(),
            self.particles.len()
        );
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn engine() -> Engine<RecordingSurface> {
        Engine::with_seed(RecordingSurface::new(640, 480), 5)
    }

    #[test]
    fn test_emit_appends_in_order() {
        let mut engine = engine();
        engine.confetti(&EffectOptions::at(10.0, 10.0).count(3));
        engine.glow_pulse(&EffectOptions::at(10.0, 10.0).count(2));
        assert_eq!(engine.len(), 5);
        assert_eq!(engine.particles()[0].kind().name(), "rect");
        assert_eq!(engine.particles()[4].kind().name(), "glow_pulse");
    }

    #[test]
    fn test_new_particles_start_next_frame() {
        let mut engine = engine();
        engine.pixel_burst(&EffectOptions::at(0.0, 0.0).count(4));
        assert!(engine.particles().iter().all(|p| p.kinematics().age == 0.0));
        engine.frame();
        assert!(engine.particles().iter().all(|p| p.kinematics().age > 0.0));
    }

    #[test]
    fn test_frame_clears_first() {
        let mut engine = engine();
        engine.frame();
        let cmds = engine.surface_mut().take_commands();
        assert!(cmds.iter().any(|c| matches!(
            c,
            DrawCommand::ClearRect { w, h, .. } if *w == 640.0 && *h == 480.0
        )));
        assert_eq!(engine.clock().frame(), 1);
    }

    #[test]
    fn test_emit_choice_fixed() {
        let mut engine = engine();
        let effect = engine.emit_choice(
            EffectChoice::Fixed(Effect::Leaves),
            &EffectOptions::at(0.0, 0.0).count(2),
        );
        assert_eq!(effect, Effect::Leaves);
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_shutdown_returns_surface() {
        let mut engine = engine();
        engine.sparkles(&EffectOptions::at(0.0, 0.0));
        engine.frame();
        let surface = engine.shutdown();
        assert_eq!(surface.width(), 640);
        assert!(!surface.commands().is_empty());
    }

    #[test]
    fn test_bad_step_does_not_stall_lifetimes() {
        let mut engine = engine();
        engine.confetti(&EffectOptions::at(0.0, 0.0).count(5));

        engine.tick(f32::NAN);
        engine.tick(f32::INFINITY);
        engine.tick(-1.0);
        assert!(engine.particles().iter().all(|p| p.kinematics().age == 0.0));
        assert_eq!(engine.clock().elapsed(), 0.0);

        // Confetti lives at most 1.4s.
        for _ in 0..90 {
            engine.frame();
        }
        assert!(engine.is_empty());
    }
}

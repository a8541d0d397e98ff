//! Particles: shared kinematics, behavior options and the base update.
//!
//! A [`Particle`] pairs a [`ParticleKind`] with the [`Kinematics`] every kind
//! shares and the [`Behavior`] options chosen by the effect that emitted it.
//! Per-kind motion and drawing live in [`crate::variants`]; this module holds
//! the default rules the kinds build on.
//!
//! # Base Update
//!
//! Each frame, unless a kind overrides it:
//!
//! 1. `age += dt`, and the particle dies once `age >= life`
//! 2. with `fade_early`, `alpha = max(0, 1 - age / life)`
//! 3. `velocity *= drag`, `velocity.y += gravity`, `position += velocity`,
//!    `rotation += spin`
//!
//! Velocities are in surface units per frame; the physics constants assume
//! a nominal 60 Hz step.

use crate::color::Color;
use crate::surface::Surface;
use glam::Vec2;

/// Drag applied when a behavior leaves it unset.
pub const DEFAULT_DRAG: f32 = 0.99;

/// Per-particle tuning chosen at emission time.
///
/// Unset values fall back to the defaults of the kind that reads them.
///
/// ```ignore
/// Behavior::new().gravity(0.15).drag(0.985).spin(0.3)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Behavior {
    pub gravity: Option<f32>,
    pub drag: Option<f32>,
    pub buoyancy: Option<f32>,
    pub wobble: Option<f32>,
    pub spin: Option<f32>,
    pub fade_early: bool,
    pub twinkle: bool,
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant added to vertical velocity every frame.
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Velocity multiplier applied every frame.
    pub fn drag(mut self, drag: f32) -> Self {
        self.drag = Some(drag);
        self
    }

    /// Lift added to vertical velocity by rising kinds (negative is up).
    pub fn buoyancy(mut self, buoyancy: f32) -> Self {
        self.buoyancy = Some(buoyancy);
        self
    }

    /// Amplitude of the horizontal sway of balloons and leaves.
    pub fn wobble(mut self, wobble: f32) -> Self {
        self.wobble = Some(wobble);
        self
    }

    /// Rotation added every frame, in radians.
    pub fn spin(mut self, spin: f32) -> Self {
        self.spin = Some(spin);
        self
    }

    /// Fade alpha linearly over the lifetime.
    pub fn fade_early(mut self) -> Self {
        self.fade_early = true;
        self
    }

    /// Oscillate alpha.
    pub fn twinkle(mut self) -> Self {
        self.twinkle = true;
        self
    }

    pub fn drag_or_default(&self) -> f32 {
        self.drag.unwrap_or(DEFAULT_DRAG)
    }

    pub fn gravity_or_default(&self) -> f32 {
        self.gravity.unwrap_or(0.0)
    }
}

/// The fixed set of particle kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleKind {
    /// Spinning confetti rectangle.
    Rect,
    /// Filled disc, optionally twinkling.
    Circle,
    /// Rising balloon with a tie and string.
    Balloon,
    /// Shrinking gradient ember.
    Flame,
    /// Soft rising puff.
    Smoke,
    /// Axis-aligned square.
    Pixel,
    /// Four-point star.
    Sparkle,
    /// Swaying, falling leaf.
    Leaf,
    /// Expanding gradient ring that stays in place.
    GlowPulse {
        /// Size at emission; the current size is derived from it.
        start_size: f32,
    },
}

impl ParticleKind {
    /// Short lowercase name, for logs and stats.
    pub fn name(&self) -> &'static str {
        match self {
            ParticleKind::Rect => "rect",
            ParticleKind::Circle => "circle",
            ParticleKind::Balloon => "balloon",
            ParticleKind::Flame => "flame",
            ParticleKind::Smoke => "smoke",
            ParticleKind::Pixel => "pixel",
            ParticleKind::Sparkle => "sparkle",
            ParticleKind::Leaf => "leaf",
            ParticleKind::GlowPulse { .. } => "glow_pulse",
        }
    }
}

/// Initial state of a particle, as drawn by an effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub origin: Vec2,
    /// Speed in units per frame.
    pub speed: f32,
    /// Direction in radians; `0` is +x, `π/2` is down the screen.
    pub angle: f32,
    pub size: f32,
    pub color: Color,
    /// Lifetime in seconds.
    pub life: f32,
}

/// State shared by every kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub position: Vec2,
    /// Units per frame.
    pub velocity: Vec2,
    pub size: f32,
    pub color: Color,
    /// Total lifetime in seconds.
    pub life: f32,
    /// Seconds since emission.
    pub age: f32,
    /// Opacity; may leave `[0, 1]` between updates, clamped when drawn.
    pub alpha: f32,
    /// Radians.
    pub rotation: f32,
    /// Radians per frame.
    pub spin: f32,
}

impl Kinematics {
    /// Fraction of the lifetime elapsed, clamped to `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.life > 0.0 {
            (self.age / self.life).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// `max(0, 1 - age / life)`.
    pub fn linear_fade(&self) -> f32 {
        if self.life > 0.0 {
            (1.0 - self.age / self.life).max(0.0)
        } else {
            0.0
        }
    }
}

/// A single live particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    kind: ParticleKind,
    pub(crate) state: Kinematics,
    pub(crate) behavior: Behavior,
    dead: bool,
}

impl Particle {
    /// Build a particle from its launch parameters.
    ///
    /// `rotation` is the initial orientation; effects draw it uniformly
    /// from `[0, 2π)`.
    pub fn new(kind: ParticleKind, launch: Launch, behavior: Behavior, rotation: f32) -> Self {
        Self {
            kind,
            state: Kinematics {
                position: launch.origin,
                velocity: Vec2::from_angle(launch.angle) * launch.speed,
                size: launch.size,
                color: launch.color,
                life: launch.life,
                age: 0.0,
                alpha: 1.0,
                rotation,
                spin: behavior.spin.unwrap_or(0.0),
            },
            behavior,
            dead: false,
        }
    }

    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.state
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Alpha clamped to `[0, 1]`, as composited.
    pub fn draw_alpha(&self) -> f32 {
        if self.state.alpha.is_finite() {
            self.state.alpha.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Advance one frame. No-op once the particle is dead.
    ///
    /// `now` is the engine's simulated clock in seconds. Current kinds animate
    /// from their own age and ignore it.
    pub fn update(&mut self, dt: f32, _now: f32) {
        if self.dead {
            return;
        }
        crate::variants::update(self, dt);
    }

    /// Draw onto `surface`. Dead particles draw nothing.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.dead {
            return;
        }
        crate::variants::draw(self, surface);
    }

    /// Ageing and fade steps of the base update.
    pub(crate) fn age_by(&mut self, dt: f32) {
        self.state.age += dt;
        if self.state.age >= self.state.life {
            self.dead = true;
        }
        if self.behavior.fade_early {
            self.state.alpha = self.state.linear_fade();
        }
    }

    /// Drag, gravity, integration and spin.
    pub(crate) fn integrate(&mut self) {
        let drag = self.behavior.drag_or_default();
        let gravity = self.behavior.gravity_or_default();
        let s = &mut self.state;

        s.velocity *= drag;
        s.velocity.y += gravity;
        s.position += s.velocity;
        s.rotation += s.spin;
    }

    /// The complete default update.
    pub(crate) fn base_update(&mut self, dt: f32) {
        self.age_by(dt);
        self.integrate();
    }
}

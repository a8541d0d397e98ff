//! # clickfx - click-triggered particle effects
//!
//! Short-lived, physics-driven particle effects (confetti, fireworks,
//! balloons, flame, smoke, sparkles, leaves, glow pulses, pixel bursts)
//! drawn onto a transparent overlay.
//!
//! ## Quick Start
//!
//! ```ignore
//! use clickfx::prelude::*;
//!
//! let mut engine = Engine::new(RasterSurface::new(800, 600));
//! engine.fireworks(&EffectOptions::at(400.0, 300.0).power(1.5));
//!
//! for _ in 0..90 {
//!     engine.frame();
//! }
//! engine.surface().save_png("fireworks.png")?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Engine
//!
//! An [`Engine`] owns a [`Surface`] and the live particles. Each emission
//! method appends a batch; [`Engine::frame`] clears the surface, advances
//! physics by a fixed 1/60 s step, drops dead particles and draws the rest.
//!
//! ### Surfaces
//!
//! Anything implementing the canvas-like [`Surface`] trait can be drawn on:
//! [`RasterSurface`] draws into a tiny-skia pixmap, [`RecordingSurface`]
//! records the calls.
//!
//! ### Overlay
//!
//! [`Overlay`] hosts an engine in a transparent window and emits the
//! configured effect wherever the left button is released.
//!
//! ## Effects
//!
//! | Effect | Particles |
//! |--------|-----------|
//! | [`Effect::Confetti`] | spinning rectangles |
//! | [`Effect::Fireworks`] | twinkling ring plus white sparks |
//! | [`Effect::Balloons`] | rising, swaying balloons |
//! | [`Effect::Flame`] | shrinking embers |
//! | [`Effect::Smoke`] | soft rising puffs |
//! | [`Effect::PixelBurst`] | squares |
//! | [`Effect::Sparkles`] | twinkling stars |
//! | [`Effect::Leaves`] | falling leaves |
//! | [`Effect::GlowPulse`] | expanding glows |

pub mod color;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
mod gpu;
pub mod input;
pub mod overlay;
pub mod particle;
pub mod spawn;
pub mod surface;
pub mod time;
mod variants;

pub use color::Color;
pub use config::{ConfigOverrides, OverlayConfig};
pub use effects::{Effect, EffectChoice, EffectOptions};
pub use engine::Engine;
pub use error::{ConfigError, GpuError, OverlayError};
pub use glam::{Affine2, Vec2};
pub use overlay::{HeadlessRender, Overlay};
pub use particle::{Behavior, Kinematics, Launch, Particle, ParticleKind};
pub use spawn::EmitContext;
pub use surface::{DrawCommand, Paint, RadialGradient, RasterSurface, RecordingSurface, Surface};
pub use time::{FrameClock, FIXED_STEP};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use clickfx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::config::OverlayConfig;
    pub use crate::effects::{Effect, EffectChoice, EffectOptions};
    pub use crate::engine::Engine;
    pub use crate::overlay::{HeadlessRender, Overlay};
    pub use crate::particle::{Particle, ParticleKind};
    pub use crate::surface::{RasterSurface, RecordingSurface, Surface};
    pub use crate::Vec2;
}

//! Named effects and the particle batches they emit.
//!
//! Each [`Effect`] turns an [`EffectOptions`] into a batch of particles whose
//! speeds, sizes, lifetimes and colors are drawn from effect-specific ranges.
//!
//! | Effect | Kind | Default count | Direction |
//! |--------|------|---------------|-----------|
//! | confetti | Rect | 80 | any |
//! | fireworks | Circle | 80 (+1/3 white) | even ring |
//! | balloons | Balloon | 20 | right, ±π/8 |
//! | flame | Flame | 40 | up, ±π/6 |
//! | smoke | Smoke | 25 | up, ±π/4 |
//! | pixelBurst | Pixel | 60 | any |
//! | sparkles | Sparkle | 40 | any |
//! | leaves | Leaf | 18 | up, ±π/3 |
//! | glowPulse | GlowPulse | 3 | stationary |
//!
//! Builders are pure apart from the RNG; the [`crate::engine::Engine`]
//! appends the result to its live set.

use crate::color::{default_colors, Color, FLAME_PALETTE, LEAF_PALETTE};
use crate::particle::{Behavior, Launch, Particle, ParticleKind};
use crate::spawn::EmitContext;
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, FRAC_PI_6, FRAC_PI_8};
use std::fmt;

/// The named effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Effect {
    #[default]
    Confetti,
    Fireworks,
    Balloons,
    Flame,
    Smoke,
    PixelBurst,
    Sparkles,
    Leaves,
    GlowPulse,
}

impl Effect {
    pub const ALL: [Effect; 9] = [
        Effect::Confetti,
        Effect::Fireworks,
        Effect::Balloons,
        Effect::Flame,
        Effect::Smoke,
        Effect::PixelBurst,
        Effect::Sparkles,
        Effect::Leaves,
        Effect::GlowPulse,
    ];

    /// Canonical camelCase name.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Confetti => "confetti",
            Effect::Fireworks => "fireworks",
            Effect::Balloons => "balloons",
            Effect::Flame => "flame",
            Effect::Smoke => "smoke",
            Effect::PixelBurst => "pixelBurst",
            Effect::Sparkles => "sparkles",
            Effect::Leaves => "leaves",
            Effect::GlowPulse => "glowPulse",
        }
    }

    /// Batch size used when the options leave `count` unset.
    pub fn default_count(&self) -> u32 {
        match self {
            Effect::Confetti | Effect::Fireworks => 80,
            Effect::Balloons => 20,
            Effect::Flame => 40,
            Effect::Smoke => 25,
            Effect::PixelBurst => 60,
            Effect::Sparkles => 40,
            Effect::Leaves => 18,
            Effect::GlowPulse => 3,
        }
    }

    /// Look up an effect by name, ignoring case, `-` and `_`.
    pub fn lookup(name: &str) -> Option<Effect> {
        let key = normalize(name);
        Effect::ALL
            .into_iter()
            .find(|effect| normalize(effect.name()) == key)
    }

    /// Like [`Effect::lookup`], falling back to confetti for unknown names.
    pub fn from_name(name: &str) -> Effect {
        Effect::lookup(name).unwrap_or_else(|| {
            log::warn!("Unknown effect '{}', using confetti", name);
            Effect::Confetti
        })
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// A configured effect: one fixed effect, or a random one per click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EffectChoice {
    Fixed(Effect),
    Shuffle,
}

impl EffectChoice {
    /// The effect to emit for the next click.
    pub fn pick(&self, ctx: &mut EmitContext) -> Effect {
        match self {
            EffectChoice::Fixed(effect) => *effect,
            EffectChoice::Shuffle => Effect::ALL[ctx.random_index(Effect::ALL.len())],
        }
    }
}

impl Default for EffectChoice {
    fn default() -> Self {
        EffectChoice::Fixed(Effect::Confetti)
    }
}

impl From<&str> for EffectChoice {
    fn from(name: &str) -> Self {
        if normalize(name) == "shuffle" {
            EffectChoice::Shuffle
        } else {
            EffectChoice::Fixed(Effect::from_name(name))
        }
    }
}

impl From<String> for EffectChoice {
    fn from(name: String) -> Self {
        EffectChoice::from(name.as_str())
    }
}

impl From<EffectChoice> for String {
    fn from(choice: EffectChoice) -> Self {
        choice.to_string()
    }
}

impl fmt::Display for EffectChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectChoice::Fixed(effect) => effect.fmt(f),
            EffectChoice::Shuffle => f.write_str("shuffle"),
        }
    }
}

/// Where and how to emit an effect.
///
/// ```ignore
/// let opts = EffectOptions::at(320.0, 200.0).count(60).power(1.5);
/// engine.fireworks(&opts);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOptions {
    pub x: f32,
    pub y: f32,
    /// Palette to pick from; effects with a fixed palette ignore it.
    pub colors: Vec<Color>,
    /// Batch size; `None` uses [`Effect::default_count`].
    pub count: Option<u32>,
    /// Speed and size multiplier; `None` means 1.
    pub power: Option<f32>,
}

impl EffectOptions {
    /// Options at `(x, y)` with the default palette.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            colors: default_colors(),
            count: None,
            power: None,
        }
    }

    pub fn colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn power(mut self, power: f32) -> Self {
        self.power = Some(power);
        self
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Power to use; unset, non-finite or non-positive values become 1.
    pub fn effective_power(&self) -> f32 {
        match self.power {
            Some(p) if p.is_finite() && p > 0.0 => p,
            _ => 1.0,
        }
    }
}

/// Build the particle batch for `effect`.
pub fn build(effect: Effect, opts: &EffectOptions, ctx: &mut EmitContext) -> Vec<Particle> {
    let count = opts.count.unwrap_or_else(|| effect.default_count());
    if count == 0 {
        return Vec::new();
    }

    let fallback;
    let colors = if opts.colors.is_empty() {
        fallback = default_colors();
        &fallback[..]
    } else {
        &opts.colors[..]
    };

    let batch = Batch {
        origin: opts.origin(),
        power: opts.effective_power(),
        count,
        colors,
    };

    match effect {
        Effect::Confetti => confetti(&batch, ctx),
        Effect::Fireworks => fireworks(&batch, ctx),
        Effect::Balloons => balloons(&batch, ctx),
        Effect::Flame => flame(&batch, ctx),
        Effect::Smoke => smoke(&batch, ctx),
        Effect::PixelBurst => pixel_burst(&batch, ctx),
        Effect::Sparkles => sparkles(&batch, ctx),
        Effect::Leaves => leaves(&batch, ctx),
        Effect::GlowPulse => glow_pulse(&batch, ctx),
    }
}

struct Batch<'a> {
    origin: Vec2,
    power: f32,
    count: u32,
    colors: &'a [Color],
}

impl Batch<'_> {
    fn particle(
        &self,
        ctx: &mut EmitContext,
        kind: ParticleKind,
        launch: Launch,
        behavior: Behavior,
    ) -> Particle {
        Particle::new(kind, launch, behavior, ctx.random_angle())
    }

    fn launch(&self, angle: f32, speed: f32, size: f32, color: Color, life: f32) -> Launch {
        Launch {
            origin: self.origin,
            speed,
            angle,
            size,
            color,
            life,
        }
    }
}

fn confetti(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let launch = b.launch(
                ctx.random_angle(),
                ctx.random_range(2.0, 6.0) * b.power,
                ctx.random_range(4.0, 8.0),
                ctx.pick(b.colors),
                ctx.random_range(0.9, 1.4),
            );
            let behavior = Behavior::new()
                .spin(ctx.random_range(-0.5, 0.5))
                .gravity(0.15)
                .drag(0.985);
            b.particle(ctx, ParticleKind::Rect, launch, behavior)
        })
        .collect()
}

fn fireworks(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    let sparks = b.count.div_ceil(3);
    let mut out = Vec::with_capacity((b.count + sparks) as usize);

    for i in 0..b.count {
        let launch = b.launch(
            ctx.ring_angle(i, b.count, 0.05),
            ctx.random_range(3.0, 7.0) * b.power,
            ctx.random_range(2.0, 4.0),
            ctx.pick(b.colors),
            ctx.random_range(0.8, 1.2),
        );
        let behavior = Behavior::new().twinkle().gravity(0.12).drag(0.992);
        out.push(b.particle(ctx, ParticleKind::Circle, launch, behavior));
    }

    for _ in 0..sparks {
        let launch = b.launch(
            ctx.random_angle(),
            ctx.random_range(1.0, 3.0) * b.power,
            ctx.random_range(1.0, 2.0),
            Color::WHITE,
            ctx.random_range(0.6, 0.9),
        );
        let behavior = Behavior::new().fade_early().gravity(0.05).drag(0.99);
        out.push(b.particle(ctx, ParticleKind::Circle, launch, behavior));
    }

    out
}

fn balloons(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let launch = b.launch(
                ctx.jitter(0.0, FRAC_PI_8),
                ctx.random_range(0.8, 1.6) / b.power,
                ctx.random_range(8.0, 12.0),
                ctx.pick(b.colors),
                ctx.random_range(2.5, 3.5),
            );
            let behavior = Behavior::new()
                .buoyancy(-0.06)
                .wobble(ctx.random_range(0.004, 0.01));
            b.particle(ctx, ParticleKind::Balloon, launch, behavior)
        })
        .collect()
}

fn flame(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let launch = b.launch(
                ctx.jitter(-FRAC_PI_2, FRAC_PI_6),
                ctx.random_range(1.0, 3.0) * b.power,
                ctx.random_range(4.0, 8.0),
                ctx.pick(&FLAME_PALETTE),
                ctx.random_range(0.5, 0.9),
            );
            let behavior = Behavior::new().buoyancy(-0.08).drag(0.96).fade_early();
            b.particle(ctx, ParticleKind::Flame, launch, behavior)
        })
        .collect()
}

fn smoke(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let launch = b.launch(
                ctx.jitter(-FRAC_PI_2, FRAC_PI_4),
                ctx.random_range(0.5, 1.5) * b.power,
                ctx.random_range(8.0, 16.0),
                ctx.pick(b.colors),
                ctx.random_range(1.5, 2.5),
            );
            let behavior = Behavior::new().buoyancy(-0.03).drag(0.98);
            b.particle(ctx, ParticleKind::Smoke, launch, behavior)
        })
        .collect()
}

fn pixel_burst(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let launch = b.launch(
                ctx.random_angle(),
                ctx.random_range(2.0, 5.0) * b.power,
                ctx.random_range(3.0, 6.0),
                ctx.pick(b.colors),
                ctx.random_range(0.6, 1.0),
            );
            let behavior = Behavior::new().gravity(0.1).drag(0.97);
            b.particle(ctx, ParticleKind::Pixel, launch, behavior)
        })
        .collect()
}

fn sparkles(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let launch = b.launch(
                ctx.random_angle(),
                ctx.random_range(0.5, 3.0) * b.power,
                ctx.random_range(3.0, 6.0),
                ctx.pick(b.colors),
                ctx.random_range(0.6, 1.2),
            );
            let behavior = Behavior::new()
                .gravity(0.02)
                .drag(0.95)
                .twinkle()
                .fade_early();
            b.particle(ctx, ParticleKind::Sparkle, launch, behavior)
        })
        .collect()
}

fn leaves(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let launch = b.launch(
                ctx.jitter(-FRAC_PI_2, FRAC_PI_3),
                ctx.random_range(1.0, 3.0) * b.power,
                ctx.random_range(6.0, 10.0),
                ctx.pick(&LEAF_PALETTE),
                ctx.random_range(2.0, 3.0),
            );
            let behavior = Behavior::new()
                .drag(0.98)
                .spin(ctx.random_range(-0.08, 0.08))
                .wobble(ctx.random_range(0.02, 0.05));
            b.particle(ctx, ParticleKind::Leaf, launch, behavior)
        })
        .collect()
}

fn glow_pulse(b: &Batch, ctx: &mut EmitContext) -> Vec<Particle> {
    (0..b.count)
        .map(|_| {
            let size = ctx.random_range(20.0, 40.0) * b.power;
            let launch = b.launch(0.0, 0.0, size, ctx.pick(b.colors), ctx.random_range(0.6, 1.0));
            b.particle(
                ctx,
                ParticleKind::GlowPulse { start_size: size },
                launch,
                Behavior::new(),
            )
        })
        .collect()
}

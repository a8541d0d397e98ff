//! Native overlay window.
//!
//! [`Overlay`] opens a transparent window, binds an [`Engine`] to a
//! [`RasterSurface`] the size of the window and presents the canvas through
//! [`GpuState`] on every redraw. Releasing the left button emits the
//! configured effect at the cursor.
//!
//! ```ignore
//! Overlay::new(OverlayConfig::load_or_default("clickfx.json"))
//!     .with_title("Party")
//!     .run()?;
//! ```
//!
//! The canvas works in physical pixels; the device pixel ratio, clamped to
//! `[1, 3]`, is applied as the canvas base transform so effects are sized
//! in logical pixels.

use crate::config::{ConfigOverrides, OverlayConfig};
use crate::engine::Engine;
use crate::error::OverlayError;
use crate::gpu::GpuState;
use crate::input::{clamp_scale_factor, MouseButton, PointerInput};
use crate::surface::{RasterSurface, Surface};
use glam::{Affine2, Vec2};
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 30;

/// Overlay window builder.
///
/// Use method chaining to configure, then call `.run()` to start.
pub struct Overlay {
    config: OverlayConfig,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
    title: String,
    size: (u32, u32),
}

impl Overlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            config_path: None,
            overrides: ConfigOverrides::default(),
            title: "clickfx".into(),
            size: (1280, 720),
        }
    }

    /// Re-read settings from `path` whenever the window regains focus.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Pin settings on top of the config and every reload of it.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.config = overrides.apply(self.config);
        self.overrides = overrides;
        self
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Re-read the settings file, if any, keeping the overrides.
    fn reload(&mut self) {
        if let Some(path) = &self.config_path {
            let config = OverlayConfig::load_or_default(path);
            self.config = self.overrides.apply(config);
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width.max(1), height.max(1));
        self
    }

    /// Run the overlay. This blocks until the window is closed.
    pub fn run(self) -> Result<(), OverlayError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct App {
    overlay: Overlay,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    engine: Option<Engine<RasterSurface>>,
    input: PointerInput,
    error: Option<OverlayError>,
}

impl App {
    fn new(overlay: Overlay) -> Self {
        Self {
            overlay,
            window: None,
            gpu_state: None,
            engine: None,
            input: PointerInput::new(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), OverlayError> {
        let (w, h) = self.overlay.size;
        let window_attrs = Window::default_attributes()
            .with_title(self.overlay.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(w, h))
            .with_transparent(true);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu_state = pollster::block_on(GpuState::new(window.clone()))?;

        self.input.set_scale_factor(window.scale_factor());
        let size = window.inner_size();
        let mut engine = Engine::new(RasterSurface::new(size.width, size.height));
        apply_scale(engine.surface_mut(), self.input.scale_factor());

        window.request_redraw();
        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        self.engine = Some(engine);
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(engine) = self.engine.take() {
            engine.shutdown();
        }
        self.gpu_state = None;
        event_loop.exit();
    }

    fn handle_clicks(&mut self) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        let config = &self.overlay.config;
        for click in self.input.drain_clicks() {
            if click.button != MouseButton::Left || !config.enabled {
                continue;
            }
            let opts = config.effect_options(click.x, click.y);
            engine.emit_choice(config.effect, &opts);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(engine), Some(gpu_state)) = (&mut self.engine, &mut self.gpu_state) else {
            return;
        };

        engine.frame();

        let surface = engine.surface();
        match gpu_state.render(surface.pixels(), surface.width(), surface.height()) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, closing overlay");
                self.stop(event_loop);
                return;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            let clock = engine.clock();
            if clock.frame() % TITLE_INTERVAL == 0 {
                window.set_title(&format!(
                    "{} | {} particles | {:.0} fps",
                    self.overlay.title,
                    engine.len(),
                    clock.fps()
                ));
            }
            window.request_redraw();
        }
    }
}

/// Reset the canvas base transform to the device pixel ratio.
fn apply_scale(surface: &mut RasterSurface, scale_factor: f64) {
    let scale = clamp_scale_factor(scale_factor) as f32;
    surface.set_transform(Affine2::from_scale(Vec2::splat(scale)));
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.start(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    self.stop(event_loop);
                }
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                if let Some(engine) = &mut self.engine {
                    let surface = engine.surface_mut();
                    surface.resize(physical_size.width, physical_size.height);
                    apply_scale(surface, self.input.scale_factor());
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(engine) = &mut self.engine {
                    apply_scale(engine.surface_mut(), self.input.scale_factor());
                }
            }
            WindowEvent::Focused(true) => self.overlay.reload(),
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } => self.handle_clicks(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Offscreen rendering of one effect to numbered PNG frames.
///
/// ```ignore
/// let written = HeadlessRender::new(OverlayConfig::default())
///     .with_size(640, 480)
///     .with_frames(90, 10)
///     .render_to("out/")?;
/// ```
pub struct HeadlessRender {
    config: OverlayConfig,
    size: (u32, u32),
    scale_factor: f64,
    frames: u32,
    every: u32,
    seed: Option<u64>,
}

impl HeadlessRender {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            size: (800, 600),
            scale_factor: 1.0,
            frames: 60,
            every: 10,
            seed: None,
        }
    }

    /// Canvas size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width.max(1), height.max(1));
        self
    }

    /// Device pixel ratio, clamped to `[1, 3]`.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = clamp_scale_factor(scale_factor);
        self
    }

    /// Run `frames` frames and keep every `every`-th one (and the last).
    pub fn with_frames(mut self, frames: u32, every: u32) -> Self {
        self.frames = frames;
        self.every = every.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Emit once at the centre, then write frames into `dir`.
    ///
    /// Returns the paths written, in order.
    pub fn render_to(self, dir: impl AsRef<std::path::Path>) -> Result<Vec<PathBuf>, OverlayError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let (w, h) = self.size;
        let physical_w = (w as f64 * self.scale_factor).round() as u32;
        let physical_h = (h as f64 * self.scale_factor).round() as u32;
        let surface = RasterSurface::new(physical_w, physical_h);
        let mut engine = match self.seed {
            Some(seed) => Engine::with_seed(surface, seed),
            None => Engine::new(surface),
        };
        apply_scale(engine.surface_mut(), self.scale_factor);

        let opts = self.config.effect_options(w as f32 / 2.0, h as f32 / 2.0);
        let effect = engine.emit_choice(self.config.effect, &opts);
        log::info!("Rendering {} frames of {} into {}", self.frames, effect, dir.display());

        let mut written = Vec::new();
        for frame in 1..=self.frames {
            engine.frame();
            if frame % self.every == 0 || frame == self.frames {
                let path = dir.join(format!("frame_{:04}.png", frame));
                engine.surface().save_png(&path)?;
                log::debug!("Wrote {} ({} live)", path.display(), engine.len());
                written.push(path);
            }
        }

        engine.shutdown();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Effect, EffectChoice};

    #[test]
    fn test_reload_keeps_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        OverlayConfig {
            effect: EffectChoice::Fixed(Effect::Smoke),
            intensity: 0.5,
            enabled: false,
            ..Default::default()
        }
        .save(&path)
        .unwrap();

        let overrides = ConfigOverrides {
            effect: Some(EffectChoice::Fixed(Effect::Fireworks)),
            intensity: Some(2.0),
        };
        let mut overlay = Overlay::new(OverlayConfig::load_or_default(&path))
            .with_overrides(overrides)
            .with_config_path(&path);
        assert_eq!(overlay.config().effect, EffectChoice::Fixed(Effect::Fireworks));

        overlay.reload();
        let config = overlay.config();
        assert_eq!(config.effect, EffectChoice::Fixed(Effect::Fireworks));
        assert_eq!(config.intensity, 2.0);
        // Keys that were not overridden still come from the file.
        assert!(!config.enabled);
    }

    #[test]
    fn test_reload_without_path_keeps_config() {
        let mut overlay = Overlay::new(OverlayConfig {
            intensity: 1.5,
            ..Default::default()
        });
        overlay.reload();
        assert_eq!(overlay.config().intensity, 1.5);
    }
}

//! CPU canvas implementing [`Surface`] on a [`tiny_skia::Pixmap`].
//!
//! Path points are mapped to device space as they are added, so a path keeps
//! the transform each point was given. Fills use the nonzero rule and
//! gradients are evaluated in the user space current at paint time. Arcs and
//! ellipses become cubic segments of at most a quarter turn.
//!
//! The pixmap stores premultiplied RGBA; [`RasterSurface::pixel`] and PNG
//! export demultiply.

use super::{Paint, RadialGradient, Surface};
use crate::color::Color;
use glam::{Affine2, Vec2};
use image::{ImageResult, RgbaImage};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::path::Path;
use tiny_skia::{
    BlendMode, FillRule, GradientStop, LineCap, LineJoin, PathBuilder, Pixmap, Point, Shader,
    SpreadMode, Stroke, Transform,
};

/// Canvas default miter limit.
const MITER_LIMIT: f32 = 10.0;

#[derive(Debug, Clone)]
struct DrawState {
    transform: Affine2,
    global_alpha: f32,
    fill: Paint,
    stroke: Paint,
    line_width: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            global_alpha: 1.0,
            fill: Paint::default(),
            stroke: Paint::default(),
            line_width: 1.0,
        }
    }
}

/// Software canvas backed by a premultiplied RGBA pixmap.
///
/// ```ignore
/// let mut surface = RasterSurface::new(800, 600);
/// surface.set_fill_style(Color::WHITE.into());
/// surface.fill_rect(10.0, 10.0, 20.0, 20.0);
/// surface.save_png("frame.png")?;
/// ```
pub struct RasterSurface {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
    path: PathBuilder,
    /// Current point in device space.
    current: Option<Vec2>,
    /// First point of the open subpath, in device space.
    subpath_start: Option<Vec2>,
}

impl RasterSurface {
    /// Create a fully transparent surface, at least 1×1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: blank_pixmap(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
            path: PathBuilder::new(),
            current: None,
            subpath_start: None,
        }
    }

    /// Resize the backing pixmap.
    ///
    /// Like resizing a canvas, this clears the pixels and resets the state
    /// stack, transform included.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Raw RGBA8 bytes, row-major, premultiplied alpha.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight-alpha RGBA of one pixel; out-of-bounds reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        match self.pixmap.pixel(x, y) {
            Some(p) => {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            }
            None => [0; 4],
        }
    }

    /// Straight-alpha copy of the canvas.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.pixmap.width(), self.pixmap.height(), |x, y| {
            image::Rgba(self.pixel(x, y))
        })
    }

    /// Current transform, including any base scale set by the host.
    pub fn transform(&self) -> Affine2 {
        self.state.transform
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)
    }

    // ========== Path construction ==========

    fn to_device(&self, x: f32, y: f32) -> Vec2 {
        self.state.transform.transform_point2(Vec2::new(x, y))
    }

    /// Approximate uniform scale of the current transform.
    fn transform_scale(&self) -> f32 {
        self.state.transform.matrix2.determinant().abs().sqrt()
    }

    fn start_subpath(&mut self, point: Vec2) {
        self.path.move_to(point.x, point.y);
        self.current = Some(point);
        self.subpath_start = Some(point);
    }

    /// Line to `point`, or start a subpath there when there is no current point.
    fn connect(&mut self, point: Vec2) {
        if self.current.is_some() {
            self.path.line_to(point.x, point.y);
            self.current = Some(point);
        } else {
            self.start_subpath(point);
        }
    }

    /// Append an elliptical arc given in user space.
    fn push_arc(&mut self, center: Vec2, radii: Vec2, rotation: f32, start_angle: f32, end_angle: f32) {
        let sweep = arc_sweep(start_angle, end_angle);
        let to_device =
            self.state.transform * Affine2::from_scale_angle_translation(radii, rotation, center);
        let on_unit = |theta: f32| Vec2::new(theta.cos(), theta.sin());

        self.connect(to_device.transform_point2(on_unit(start_angle)));

        let segments = ((sweep / FRAC_PI_2).ceil() as usize).max(1);
        let step = sweep / segments as f32;
        let k = 4.0 / 3.0 * (step / 4.0).tan();

        for i in 0..segments {
            let a0 = start_angle + step * i as f32;
            let (p0, p3) = (on_unit(a0), on_unit(a0 + step));
            let [c1, c2, end] = [p0 + p0.perp() * k, p3 - p3.perp() * k, p3]
                .map(|p| to_device.transform_point2(p));
            self.path.cubic_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y);
            self.current = Some(end);
        }
    }

    fn rect_path(&self, x: f32, y: f32, w: f32, h: f32) -> Option<tiny_skia::Path> {
        let corners =
            [(x, y), (x + w, y), (x + w, y + h), (x, y + h)].map(|(px, py)| self.to_device(px, py));
        let mut builder = PathBuilder::new();
        builder.move_to(corners[0].x, corners[0].y);
        for corner in &corners[1..] {
            builder.line_to(corner.x, corner.y);
        }
        builder.close();
        builder.finish()
    }

    // ========== Painting ==========

    /// Paint for the current global alpha, or `None` if nothing would show.
    fn skia_paint(&self, paint: &Paint) -> Option<tiny_skia::Paint<'static>> {
        let alpha = self.state.global_alpha;
        if alpha <= 0.0 {
            return None;
        }
        let shader = match paint {
            Paint::Solid(color) => Shader::SolidColor(skia_color(*color, alpha)?),
            Paint::Radial(gradient) => {
                radial_shader(gradient, alpha, skia_transform(self.state.transform))?
            }
        };
        Some(tiny_skia::Paint {
            shader,
            anti_alias: true,
            ..Default::default()
        })
    }

    fn fill_device_path(&mut self, path: &tiny_skia::Path) {
        if let Some(paint) = self.skia_paint(&self.state.fill) {
            self.pixmap
                .fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    fn stroke_device_path(&mut self, path: &tiny_skia::Path) {
        let width = self.state.line_width * self.transform_scale();
        if width.is_nan() || width <= 0.0 {
            return;
        }
        let Some(paint) = self.skia_paint(&self.state.stroke) else {
            return;
        };
        let stroke = Stroke {
            width,
            miter_limit: MITER_LIMIT,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint, &stroke, Transform::identity(), None);
    }
}

fn blank_pixmap(width: u32, height: u32) -> Pixmap {
    let mut size = (width.max(1), height.max(1));
    loop {
        if let Some(pixmap) = Pixmap::new(size.0, size.1) {
            return pixmap;
        }
        // Too large to allocate; halve until it fits.
        size = ((size.0 / 2).max(1), (size.1 / 2).max(1));
    }
}

fn skia_transform(transform: Affine2) -> Transform {
    let m = transform.matrix2;
    let t = transform.translation;
    Transform::from_row(m.x_axis.x, m.x_axis.y, m.y_axis.x, m.y_axis.y, t.x, t.y)
}

/// Clamped color with `alpha` multiplied in; `None` for non-finite channels.
fn skia_color(color: Color, alpha: f32) -> Option<tiny_skia::Color> {
    let c = color.clamped();
    tiny_skia::Color::from_rgba(c.r, c.g, c.b, c.a * alpha)
}

/// Concentric gradient with an inner radius, expressed as a tiny-skia radial
/// gradient from the centre by remapping stop offsets onto `[0, outer]`.
fn radial_shader(gradient: &RadialGradient, alpha: f32, transform: Transform) -> Option<Shader<'static>> {
    let outer = gradient.outer_radius;
    if outer.is_nan() || outer <= 0.0 {
        return None;
    }
    let inner = gradient.inner_radius.clamp(0.0, outer);
    let stops: Vec<GradientStop> = gradient
        .stops()
        .iter()
        .filter_map(|&(offset, color)| {
            let position = (inner + offset * (outer - inner)) / outer;
            Some(GradientStop::new(position, skia_color(color, alpha)?))
        })
        .collect();
    let center = Point::from_xy(gradient.center.x, gradient.center.y);
    tiny_skia::RadialGradient::new(center, center, outer, stops, SpreadMode::Pad, transform)
}

/// Sweep of a clockwise arc from `start` to `end`.
fn arc_sweep(start: f32, end: f32) -> f32 {
    let delta = end - start;
    if delta >= TAU {
        TAU
    } else {
        delta.rem_euclid(TAU)
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let Some(path) = self.rect_path(x, y, w, h) else {
            return;
        };
        let bounds = path.bounds();
        let (width, height) = (self.pixmap.width() as f32, self.pixmap.height() as f32);
        if bounds.left() <= 0.0 && bounds.top() <= 0.0 && bounds.right() >= width && bounds.bottom() >= height
        {
            self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
            return;
        }

        let clear = tiny_skia::Paint {
            blend_mode: BlendMode::Clear,
            anti_alias: false,
            ..Default::default()
        };
        self.pixmap
            .fill_path(&path, &clear, FillRule::Winding, Transform::identity(), None);
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_translation(Vec2::new(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(radians);
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform * Affine2::from_scale(Vec2::new(x, y));
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.state.transform = transform;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn set_fill_style(&mut self, paint: Paint) {
        self.state.fill = paint;
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        self.state.stroke = paint;
    }

    fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        if let Some(path) = self.rect_path(x, y, w, h) {
            self.fill_device_path(&path);
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        if let Some(path) = self.rect_path(x, y, w, h) {
            self.stroke_device_path(&path);
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.current = None;
        self.subpath_start = None;
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let point = self.to_device(x, y);
        self.start_subpath(point);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let point = self.to_device(x, y);
        self.connect(point);
    }

    fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) {
        let control = self.to_device(cpx, cpy);
        let end = self.to_device(x, y);
        if self.current.is_none() {
            self.start_subpath(control);
        }
        self.path.quad_to(control.x, control.y, end.x, end.y);
        self.current = Some(end);
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        if radius < 0.0 {
            return;
        }
        self.push_arc(Vec2::new(x, y), Vec2::splat(radius), 0.0, start_angle, end_angle);
    }

    fn ellipse(
        &mut self,
        x: f32,
        y: f32,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        start_angle: f32,
        end_angle: f32,
    ) {
        if radius_x < 0.0 || radius_y < 0.0 {
            return;
        }
        self.push_arc(
            Vec2::new(x, y),
            Vec2::new(radius_x, radius_y),
            rotation,
            start_angle,
            end_angle,
        );
    }

    fn close_path(&mut self) {
        if self.current.is_some() {
            self.path.close();
            self.current = self.subpath_start;
        }
    }

    fn fill(&mut self) {
        if let Some(path) = self.path.clone().finish() {
            self.fill_device_path(&path);
        }
    }

    fn stroke(&mut self) {
        if let Some(path) = self.path.clone().finish() {
            self.stroke_device_path(&path);
        }
    }
}

//! Drawing surfaces.
//!
//! The engine renders through the [`Surface`] trait, a small subset of the
//! HTML canvas 2D API: a transform/alpha state stack, solid and gradient
//! paints, rectangles, and paths built from lines, arcs, ellipses and
//! quadratic curves.
//!
//! Two implementations ship with the crate:
//!
//! | Surface | Use |
//! |---------|-----|
//! | [`RasterSurface`] | CPU canvas backed by a tiny-skia pixmap; presented by the window host or saved as PNG |
//! | [`RecordingSurface`] | Records calls as [`DrawCommand`]s for tests and inspection |
//!
//! Paths are specified in user space and transformed by the current
//! transform at the time each point is added, exactly like a canvas.

mod raster;
mod recorder;

pub use raster::RasterSurface;
pub use recorder::{DrawCommand, RecordingSurface};

use crate::color::Color;
use glam::{Affine2, Vec2};

/// How a fill or stroke is colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// A single flat color.
    Solid(Color),
    /// A radial gradient, specified in user space.
    Radial(RadialGradient),
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl From<RadialGradient> for Paint {
    fn from(gradient: RadialGradient) -> Self {
        Paint::Radial(gradient)
    }
}

/// Concentric radial gradient between an inner and an outer radius.
///
/// Points inside `inner_radius` take the first stop, points beyond
/// `outer_radius` take the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub inner_radius: f32,
    pub outer_radius: f32,
    stops: Vec<(f32, Color)>,
}

impl RadialGradient {
    pub fn new(center: Vec2, inner_radius: f32, outer_radius: f32) -> Self {
        Self {
            center,
            inner_radius,
            outer_radius,
            stops: Vec::new(),
        }
    }

    /// Add a color stop. Offsets are clamped to `0.0..=1.0` and kept sorted.
    pub fn with_stop(mut self, offset: f32, color: Color) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let index = self.stops.partition_point(|(o, _)| *o <= offset);
        self.stops.insert(index, (offset, color));
        self
    }

    pub fn stops(&self) -> &[(f32, Color)] {
        &self.stops
    }
}

/// A canvas-like 2D drawing target.
///
/// All methods are infallible; drawing outside the surface is clipped.
/// `width`/`height` are in device pixels.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Reset the rectangle (in user space) to fully transparent.
    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    /// Push the transform, alpha, paints and line width.
    fn save(&mut self);
    /// Pop the state pushed by the matching [`Surface::save`].
    fn restore(&mut self);

    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, x: f32, y: f32);
    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine2);

    /// Opacity multiplied into everything drawn afterwards.
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_fill_style(&mut self, paint: Paint);
    fn set_stroke_style(&mut self, paint: Paint);
    fn set_line_width(&mut self, width: f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32);
    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32);
    #[allow(clippy::too_many_arguments)]
    fn ellipse(
        &mut self,
        x: f32,
        y: f32,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        start_angle: f32,
        end_angle: f32,
    );
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_stops_are_sorted() {
        let g = RadialGradient::new(Vec2::ZERO, 0.0, 10.0)
            .with_stop(1.0, Color::TRANSPARENT)
            .with_stop(0.0, Color::WHITE);
        assert_eq!(g.stops()[0].0, 0.0);
        assert_eq!(g.stops()[1].0, 1.0);
    }

    #[test]
    fn test_stop_offsets_are_clamped() {
        let g = RadialGradient::new(Vec2::ZERO, 0.0, 10.0)
            .with_stop(-2.0, Color::WHITE)
            .with_stop(4.0, Color::BLACK);
        assert_eq!(g.stops(), &[(0.0, Color::WHITE), (1.0, Color::BLACK)]);
    }
}

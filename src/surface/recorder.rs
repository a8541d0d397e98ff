//! A [`Surface`] that records drawing calls instead of rasterizing them.

use super::{Paint, Surface};
use glam::Affine2;

/// One recorded drawing call.
///
/// `Fill`, `Stroke`, `FillRect` and `StrokeRect` carry the global alpha in
/// effect when they were issued, which is what ends up composited.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    ClearRect { x: f32, y: f32, w: f32, h: f32 },
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Rotate(f32),
    Scale { x: f32, y: f32 },
    SetTransform(Affine2),
    SetGlobalAlpha(f32),
    SetFillStyle(Paint),
    SetStrokeStyle(Paint),
    SetLineWidth(f32),
    FillRect { x: f32, y: f32, w: f32, h: f32, alpha: f32 },
    StrokeRect { x: f32, y: f32, w: f32, h: f32, alpha: f32 },
    BeginPath,
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    QuadraticCurveTo { cpx: f32, cpy: f32, x: f32, y: f32 },
    Arc { x: f32, y: f32, radius: f32, start: f32, end: f32 },
    Ellipse { x: f32, y: f32, radius_x: f32, radius_y: f32, rotation: f32 },
    ClosePath,
    Fill { alpha: f32 },
    Stroke { alpha: f32 },
}

impl DrawCommand {
    /// Whether this call puts paint on the surface.
    pub fn is_paint(&self) -> bool {
        matches!(
            self,
            DrawCommand::FillRect { .. }
                | DrawCommand::StrokeRect { .. }
                | DrawCommand::Fill { .. }
                | DrawCommand::Stroke { .. }
        )
    }

    /// Effective alpha of a paint call.
    pub fn paint_alpha(&self) -> Option<f32> {
        match self {
            DrawCommand::FillRect { alpha, .. }
            | DrawCommand::StrokeRect { alpha, .. }
            | DrawCommand::Fill { alpha }
            | DrawCommand::Stroke { alpha } => Some(*alpha),
            _ => None,
        }
    }
}

/// Surface that logs every call.
///
/// Global alpha is stored as given (unclamped) so callers that forget to
/// clamp are visible in the recording.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    alpha: f32,
    alpha_stack: Vec<f32>,
    max_depth: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            alpha: 1.0,
            alpha_stack: Vec::new(),
            max_depth: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of unmatched `save` calls.
    pub fn depth(&self) -> usize {
        self.alpha_stack.len()
    }

    /// Deepest save nesting seen so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Iterator over the alpha of every paint call.
    pub fn paint_alphas(&self) -> impl Iterator<Item = f32> + '_ {
        self.commands.iter().filter_map(DrawCommand::paint_alpha)
    }

    pub fn paint_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_paint()).count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.commands.push(DrawCommand::ClearRect { x, y, w, h });
    }

    fn save(&mut self) {
        self.alpha_stack.push(self.alpha);
        self.max_depth = self.max_depth.max(self.alpha_stack.len());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(alpha) = self.alpha_stack.pop() {
            self.alpha = alpha;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Translate { x, y });
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate(radians));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::Scale { x, y });
    }

    fn set_transform(&mut self, transform: Affine2) {
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
        self.commands.push(DrawCommand::SetGlobalAlpha(alpha));
    }

    fn set_fill_style(&mut self, paint: Paint) {
        self.commands.push(DrawCommand::SetFillStyle(paint));
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        self.commands.push(DrawCommand::SetStrokeStyle(paint));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::SetLineWidth(width));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let alpha = self.alpha;
        self.commands.push(DrawCommand::FillRect { x, y, w, h, alpha });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let alpha = self.alpha;
        self.commands.push(DrawCommand::StrokeRect { x, y, w, h, alpha });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo { x, y });
    }

    fn quadratic_curve_to(&mut self, cpx: f32, cpy: f32, x: f32, y: f32) {
        self.commands
            .push(DrawCommand::QuadraticCurveTo { cpx, cpy, x, y });
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        self.commands.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start: start_angle,
            end: end_angle,
        });
    }

    fn ellipse(
        &mut self,
        x: f32,
        y: f32,
        radius_x: f32,
        radius_y: f32,
        rotation: f32,
        _start_angle: f32,
        _end_angle: f32,
    ) {
        self.commands.push(DrawCommand::Ellipse {
            x,
            y,
            radius_x,
            radius_y,
            rotation,
        });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        let alpha = self.alpha;
        self.commands.push(DrawCommand::Fill { alpha });
    }

    fn stroke(&mut self) {
        let alpha = self.alpha;
        self.commands.push(DrawCommand::Stroke { alpha });
    }
}

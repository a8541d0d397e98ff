//! Pointer handling for the overlay window.
//!
//! [`PointerInput`] follows the cursor and turns button releases into
//! [`Click`]s in logical coordinates, which is the space the engine draws in
//! once the surface carries the device pixel ratio as its base transform.
//!
//! ```ignore
//! input.handle_event(&event);
//! for click in input.drain_clicks() {
//!     if click.button == MouseButton::Left {
//!         engine.emit_choice(config.effect, &config.effect_options(click.x, click.y));
//!     }
//! }
//! ```

use glam::Vec2;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};

/// Lowest device pixel ratio the overlay honours.
pub const MIN_SCALE_FACTOR: f64 = 1.0;
/// Highest device pixel ratio the overlay honours.
pub const MAX_SCALE_FACTOR: f64 = 3.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Back, forward and any extra buttons.
    Other,
}

impl From<WinitMouseButton> for MouseButton {
    fn from(btn: WinitMouseButton) -> Self {
        match btn {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            WinitMouseButton::Back | WinitMouseButton::Forward | WinitMouseButton::Other(_) => {
                MouseButton::Other
            }
        }
    }
}

/// A completed press-and-release, at the release position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Click {
    pub button: MouseButton,
    /// Logical x.
    pub x: f32,
    /// Logical y.
    pub y: f32,
}

/// Clamp a window scale factor to the supported range.
pub fn clamp_scale_factor(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
    } else {
        MIN_SCALE_FACTOR
    }
}

/// Cursor position, held buttons and pending clicks.
#[derive(Debug)]
pub struct PointerInput {
    /// Cursor in physical pixels.
    position: Vec2,
    held: HashSet<MouseButton>,
    clicks: Vec<Click>,
    scale_factor: f64,
}

impl Default for PointerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerInput {
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            held: HashSet::new(),
            clicks: Vec::new(),
            scale_factor: 1.0,
        }
    }

    /// Cursor position in physical pixels.
    pub fn physical_position(&self) -> Vec2 {
        self.position
    }

    /// Cursor position in logical pixels.
    pub fn logical_position(&self) -> Vec2 {
        self.position / self.scale_factor as f32
    }

    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held.contains(&button)
    }

    /// Device pixel ratio in effect, already clamped.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn set_scale_factor(&mut self, scale: f64) {
        self.scale_factor = clamp_scale_factor(scale);
    }

    /// Take the clicks seen since the last drain, oldest first.
    pub fn drain_clicks(&mut self) -> Vec<Click> {
        std::mem::take(&mut self.clicks)
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.button(MouseButton::from(*button), *state);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.set_scale_factor(*scale_factor);
            }
            _ => {}
        }
    }

    fn cursor_moved(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    fn button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.held.insert(button);
            }
            ElementState::Released => {
                // A release without a press (focus gained mid-click) still counts.
                self.held.remove(&button);
                let logical = self.logical_position();
                self.clicks.push(Click {
                    button,
                    x: logical.x,
                    y: logical.y,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_on_release() {
        let mut input = PointerInput::new();
        input.cursor_moved(100.0, 50.0);
        input.button(MouseButton::Left, ElementState::Pressed);
        assert!(input.is_held(MouseButton::Left));
        assert!(input.drain_clicks().is_empty());

        input.button(MouseButton::Left, ElementState::Released);
        assert!(!input.is_held(MouseButton::Left));
        let clicks = input.drain_clicks();
        assert_eq!(
            clicks,
            vec![Click {
                button: MouseButton::Left,
                x: 100.0,
                y: 50.0
            }]
        );
        assert!(input.drain_clicks().is_empty());
    }

    #[test]
    fn test_clicks_are_logical() {
        let mut input = PointerInput::new();
        input.set_scale_factor(2.0);
        input.cursor_moved(300.0, 200.0);
        input.button(MouseButton::Right, ElementState::Released);

        let click = input.drain_clicks()[0];
        assert_eq!((click.x, click.y), (150.0, 100.0));
        assert_eq!(input.physical_position(), Vec2::new(300.0, 200.0));
    }

    #[test]
    fn test_scale_factor_clamped() {
        assert_eq!(clamp_scale_factor(0.5), 1.0);
        assert_eq!(clamp_scale_factor(4.0), 3.0);
        assert_eq!(clamp_scale_factor(1.25), 1.25);
        assert_eq!(clamp_scale_factor(f64::NAN), 1.0);
    }

    #[test]
    fn test_extra_buttons_are_not_left() {
        assert_eq!(MouseButton::from(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
        assert_eq!(MouseButton::from(WinitMouseButton::Forward), MouseButton::Other);
        assert_eq!(MouseButton::from(WinitMouseButton::Other(7)), MouseButton::Other);

        let mut input = PointerInput::new();
        input.button(MouseButton::from(WinitMouseButton::Back), ElementState::Released);
        let clicks = input.drain_clicks();
        assert_eq!(clicks.len(), 1);
        assert_ne!(clicks[0].button, MouseButton::Left);
    }
}

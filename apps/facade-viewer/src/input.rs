//! winit events to windowing-agnostic [`InputEvent`]s.

use facade_input::{InputEvent, PointerButton};
use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Trackpads report pixels; this many count as one wheel notch.
const PIXELS_PER_NOTCH: f32 = 100.0;

pub fn translate(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::MouseInput { state, button, .. } => pointer_button(*state, *button),
        WindowEvent::CursorMoved { position, .. } => Some(pointer_moved(*position)),
        WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scrolled(scroll_notches(*delta))),
        _ => None,
    }
}

fn pointer_button(state: ElementState, button: MouseButton) -> Option<InputEvent> {
    let button = match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
        _ => return None,
    };
    Some(match state {
        ElementState::Pressed => InputEvent::PointerPressed(button),
        ElementState::Released => InputEvent::PointerReleased(button),
    })
}

fn pointer_moved(position: PhysicalPosition<f64>) -> InputEvent {
    InputEvent::PointerMoved(Vec2::new(position.x as f32, position.y as f32))
}

/// Positive is away from the user.
fn scroll_notches(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_NOTCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_map_to_gestures() {
        assert_eq!(
            pointer_button(ElementState::Pressed, MouseButton::Left),
            Some(InputEvent::PointerPressed(PointerButton::Primary))
        );
        assert_eq!(
            pointer_button(ElementState::Released, MouseButton::Right),
            Some(InputEvent::PointerReleased(PointerButton::Secondary))
        );
        assert_eq!(
            pointer_button(ElementState::Pressed, MouseButton::Middle),
            Some(InputEvent::PointerPressed(PointerButton::Middle))
        );
        assert_eq!(
            pointer_button(ElementState::Pressed, MouseButton::Back),
            None
        );
    }

    #[test]
    fn wheel_lines_are_notches() {
        assert_eq!(scroll_notches(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        assert_eq!(scroll_notches(MouseScrollDelta::LineDelta(0.0, -1.0)), -1.0);
    }

    #[test]
    fn trackpad_pixels_scale_down() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 250.0));
        assert_eq!(scroll_notches(delta), 2.5);
    }

    #[test]
    fn cursor_position_is_physical_pixels() {
        assert_eq!(
            pointer_moved(PhysicalPosition::new(12.5, 40.0)),
            InputEvent::PointerMoved(Vec2::new(12.5, 40.0))
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        assert_eq!(translate(&WindowEvent::Focused(true)), None);
        assert_eq!(translate(&WindowEvent::CloseRequested), None);
    }
}

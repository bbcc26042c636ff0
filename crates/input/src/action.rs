use glam::Vec2;

/// Pointer buttons the viewer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button or single touch.
    Primary,
    /// Right mouse button.
    Secondary,
    /// Wheel button.
    Middle,
}

/// A raw input event, already stripped of windowing-library types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPressed(PointerButton),
    PointerReleased(PointerButton),
    /// Absolute pointer position in physical pixels.
    PointerMoved(Vec2),
    /// Scroll in wheel notches; positive means away from the user (zoom in).
    Scrolled(f32),
}

/// A camera action produced by the interaction controller.
///
/// Drag deltas are in physical pixels; the camera scales them by the
/// viewport height so gestures feel the same at any window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit around the target.
    Rotate(Vec2),
    /// Translate target and camera in the view plane.
    Pan(Vec2),
    /// Dolly toward (positive) or away from (negative) the target, in wheel notches.
    Zoom(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_compare_by_value() {
        assert_eq!(Action::Zoom(1.0), Action::Zoom(1.0));
        assert_ne!(Action::Rotate(Vec2::X), Action::Pan(Vec2::X));
    }

    #[test]
    fn events_carry_buttons() {
        let e = InputEvent::PointerPressed(PointerButton::Secondary);
        assert_eq!(e, InputEvent::PointerPressed(PointerButton::Secondary));
    }
}

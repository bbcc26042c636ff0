use crate::action::{Action, InputEvent, PointerButton};
use glam::Vec2;

/// Which gestures are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionModes {
    pub rotate: bool,
    pub pan: bool,
    pub zoom: bool,
}

impl Default for InteractionModes {
    fn default() -> Self {
        Self {
            rotate: true,
            pan: true,
            zoom: true,
        }
    }
}

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Rotating,
    Panning,
    /// Middle-button dolly drag.
    Zooming,
}

/// Pixels of vertical dolly drag that equal one wheel notch.
const DOLLY_PIXELS_PER_NOTCH: f32 = 100.0;

/// Turns raw pointer/scroll events into camera actions.
///
/// Runs on the event-loop thread; each event is handled synchronously so the
/// resulting action is applied before the next frame is drawn.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    modes: InteractionModes,
    state: InteractionState,
    last_pointer: Option<Vec2>,
}

impl InteractionController {
    pub fn new(modes: InteractionModes) -> Self {
        Self {
            modes,
            ..Self::default()
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn modes(&self) -> InteractionModes {
        self.modes
    }

    /// Feed one event; returns the action it produces, if any.
    pub fn handle(&mut self, event: InputEvent) -> Option<Action> {
        match event {
            InputEvent::PointerPressed(button) => {
                if self.state == InteractionState::Idle {
                    self.state = self.state_for(button);
                    if self.state != InteractionState::Idle {
                        tracing::debug!(state = ?self.state, "gesture started");
                    }
                }
                None
            }
            InputEvent::PointerReleased(_) => {
                if self.state != InteractionState::Idle {
                    tracing::debug!(state = ?self.state, "gesture ended");
                }
                self.state = InteractionState::Idle;
                None
            }
            InputEvent::PointerMoved(position) => {
                let previous = self.last_pointer.replace(position);
                let delta = position - previous?;
                if delta == Vec2::ZERO {
                    return None;
                }
                match self.state {
                    InteractionState::Idle => None,
                    InteractionState::Rotating => Some(Action::Rotate(delta)),
                    InteractionState::Panning => Some(Action::Pan(delta)),
                    // Dragging up pulls the camera in.
                    InteractionState::Zooming => {
                        Some(Action::Zoom(-delta.y / DOLLY_PIXELS_PER_NOTCH))
                    }
                }
            }
            InputEvent::Scrolled(notches) => {
                if self.state != InteractionState::Idle || !self.modes.zoom || notches == 0.0 {
                    return None;
                }
                Some(Action::Zoom(notches))
            }
        }
    }

    /// Forget the pointer position, e.g. when the cursor leaves the window.
    pub fn reset_pointer(&mut self) {
        self.last_pointer = None;
    }

    fn state_for(&self, button: PointerButton) -> InteractionState {
        match button {
            PointerButton::Primary if self.modes.rotate => InteractionState::Rotating,
            PointerButton::Secondary if self.modes.pan => InteractionState::Panning,
            PointerButton::Middle if self.modes.zoom => InteractionState::Zooming,
            _ => InteractionState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(Vec2::new(x, y))
    }

    #[test]
    fn starts_idle_and_ignores_hover() {
        let mut c = InteractionController::default();
        assert_eq!(c.state(), InteractionState::Idle);
        assert_eq!(c.handle(moved(10.0, 10.0)), None);
        assert_eq!(c.handle(moved(20.0, 10.0)), None);
    }

    #[test]
    fn primary_drag_rotates() {
        let mut c = InteractionController::default();
        c.handle(moved(100.0, 100.0));
        c.handle(InputEvent::PointerPressed(PointerButton::Primary));
        assert_eq!(c.state(), InteractionState::Rotating);
        assert_eq!(
            c.handle(moved(110.0, 95.0)),
            Some(Action::Rotate(Vec2::new(10.0, -5.0)))
        );
        c.handle(InputEvent::PointerReleased(PointerButton::Primary));
        assert_eq!(c.state(), InteractionState::Idle);
    }

    #[test]
    fn secondary_drag_pans() {
        let mut c = InteractionController::default();
        c.handle(moved(0.0, 0.0));
        c.handle(InputEvent::PointerPressed(PointerButton::Secondary));
        assert_eq!(c.state(), InteractionState::Panning);
        assert_eq!(
            c.handle(moved(3.0, 4.0)),
            Some(Action::Pan(Vec2::new(3.0, 4.0)))
        );
    }

    #[test]
    fn middle_drag_dollies() {
        let mut c = InteractionController::default();
        c.handle(moved(0.0, 0.0));
        c.handle(InputEvent::PointerPressed(PointerButton::Middle));
        assert_eq!(c.state(), InteractionState::Zooming);
        assert_eq!(c.handle(moved(0.0, 50.0)), Some(Action::Zoom(-0.5)));
        assert_eq!(c.handle(moved(0.0, 0.0)), Some(Action::Zoom(0.5)));
    }

    #[test]
    fn second_button_does_not_switch_gesture() {
        let mut c = InteractionController::default();
        c.handle(InputEvent::PointerPressed(PointerButton::Primary));
        c.handle(InputEvent::PointerPressed(PointerButton::Secondary));
        assert_eq!(c.state(), InteractionState::Rotating);
    }

    #[test]
    fn scroll_zooms_only_when_idle() {
        let mut c = InteractionController::default();
        assert_eq!(c.handle(InputEvent::Scrolled(1.0)), Some(Action::Zoom(1.0)));
        c.handle(InputEvent::PointerPressed(PointerButton::Primary));
        assert_eq!(c.handle(InputEvent::Scrolled(1.0)), None);
        c.handle(InputEvent::PointerReleased(PointerButton::Primary));
        assert_eq!(
            c.handle(InputEvent::Scrolled(-2.0)),
            Some(Action::Zoom(-2.0))
        );
    }

    #[test]
    fn disabled_modes_stay_idle() {
        let mut c = InteractionController::new(InteractionModes {
            rotate: false,
            pan: false,
            zoom: false,
        });
        for button in [
            PointerButton::Primary,
            PointerButton::Secondary,
            PointerButton::Middle,
        ] {
            c.handle(InputEvent::PointerPressed(button));
            assert_eq!(c.state(), InteractionState::Idle);
        }
        assert_eq!(c.handle(InputEvent::Scrolled(3.0)), None);
    }

    #[test]
    fn reset_pointer_drops_stale_delta() {
        let mut c = InteractionController::default();
        c.handle(moved(0.0, 0.0));
        c.handle(InputEvent::PointerPressed(PointerButton::Primary));
        c.reset_pointer();
        assert_eq!(c.handle(moved(500.0, 500.0)), None);
        assert_eq!(
            c.handle(moved(501.0, 500.0)),
            Some(Action::Rotate(Vec2::new(1.0, 0.0)))
        );
    }
}

use bevy::input::touch::Touch;
use bevy::prelude::*;

/// The mouse, or one finger on a touch screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// Pointer that went down this frame and where, in logical window pixels
/// with the origin at the top left.
pub fn just_pressed_pointer(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<(PointerId, Vec2)> {
    if button_input.just_pressed(MouseButton::Left) {
        let cursor_position = windows.get_single().ok()?.cursor_position()?;
        Some((PointerId::Mouse, cursor_position))
    } else {
        let touch = touch_input.iter_just_pressed().next()?;
        Some((PointerId::Touch(touch.id()), touch.position()))
    }
}

/// Position of `pointer` while it is held down. Other fingers are ignored.
pub fn pressed_position(
    pointer: PointerId,
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    match pointer {
        PointerId::Mouse if button_input.pressed(MouseButton::Left) => {
            windows.get_single().ok()?.cursor_position()
        }
        PointerId::Mouse => None,
        PointerId::Touch(id) => touch_input.get_pressed(id).map(Touch::position),
    }
}

/// True when `pointer` was lifted this frame, even if the cursor left the window.
pub fn just_released(
    pointer: PointerId,
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
) -> bool {
    match pointer {
        PointerId::Mouse => button_input.just_released(MouseButton::Left),
        PointerId::Touch(id) => touch_input.just_released(id) || touch_input.just_canceled(id),
    }
}

/// Where `pointer` was lifted this frame, if that is known.
pub fn released_position(
    pointer: PointerId,
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    match pointer {
        PointerId::Mouse if button_input.just_released(MouseButton::Left) => {
            windows.get_single().ok()?.cursor_position()
        }
        PointerId::Mouse => None,
        PointerId::Touch(id) => touch_input.get_released(id).map(Touch::position),
    }
}

use bevy::prelude::*;

/// What the pointer did this frame, in world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSample {
    /// `None` when no mouse button or finger is down.
    pub position: Option<Vec2>,
    /// A press started this frame.
    pub pressed: bool,
    /// The press ended this frame.
    pub released: bool,
}

impl InputSample {
    pub const fn idle() -> Self {
        Self {
            position: None,
            pressed: false,
            released: false,
        }
    }

    pub const fn press(position: Vec2) -> Self {
        Self {
            position: Some(position),
            pressed: true,
            released: false,
        }
    }

    pub const fn hold(position: Vec2) -> Self {
        Self {
            position: Some(position),
            pressed: false,
            released: false,
        }
    }

    pub const fn release(position: Vec2) -> Self {
        Self {
            position: Some(position),
            pressed: false,
            released: true,
        }
    }
}

/// Pointer position while a button or finger is down, and on the frame it lifts.
pub fn pointer_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.pressed(MouseButton::Left) || button_input.just_released(MouseButton::Left) {
        windows.get_single().ok()?.cursor_position()
    } else {
        first_finger(touch_input.iter().map(|touch| (touch.id(), touch.position()))).or_else(|| {
            first_finger(
                touch_input
                    .iter_just_released()
                    .map(|touch| (touch.id(), touch.position())),
            )
        })
    }
}

/// Position of the touch with the lowest id. `Touches` iterates in hash order.
pub fn first_finger(touches: impl Iterator<Item = (u64, Vec2)>) -> Option<Vec2> {
    touches
        .min_by_key(|&(id, _)| id)
        .map(|(_, position)| position)
}

pub fn screen_to_world(
    position: Vec2,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let (camera, camera_transform) = camera.get_single().ok()?;

    camera
        .viewport_to_world(camera_transform, position)
        .map(|ray| ray.origin.truncate())
        .ok()
}

pub fn sample_input(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> InputSample {
    let position = pointer_screen_position(button_input, touch_input, windows)
        .and_then(|position| screen_to_world(position, camera));

    InputSample {
        position,
        pressed: button_input.just_pressed(MouseButton::Left) || touch_input.any_just_pressed(),
        released: button_input.just_released(MouseButton::Left)
            || touch_input.any_just_released(),
    }
}

use crate::world::Vec2;

/// Stick vectors shorter than this are treated as no input.
pub const MOVEMENT_DEADZONE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    /// Screen-space direction from the held movement keys; +y points down.
    pub(crate) fn direction(&self) -> Vec2 {
        let axis = |negative: InputAction, positive: InputAction| {
            let mut value = 0.0;
            if self.is_down(negative) {
                value -= 1.0;
            }
            if self.is_down(positive) {
                value += 1.0;
            }
            value
        };
        Vec2::new(
            axis(InputAction::MoveLeft, InputAction::MoveRight),
            axis(InputAction::MoveUp, InputAction::MoveDown),
        )
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Zeroes `direction` when its length is below `deadzone`.
pub fn apply_deadzone(direction: Vec2, deadzone: f32) -> Vec2 {
    let length = direction.length();
    if !length.is_finite() || length < deadzone.max(0.0) {
        return Vec2::ZERO;
    }
    direction
}

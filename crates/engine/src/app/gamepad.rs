use gilrs::{Axis, EventType, Gilrs};
use tracing::{info, warn};

use crate::world::Vec2;

/// Left-stick state of whichever controller last moved it.
///
/// Without a usable gamepad backend the stick simply reads zero and the game
/// stays keyboard-only.
pub(crate) struct GamepadInput {
    gilrs: Option<Gilrs>,
    stick: Vec2,
}

impl GamepadInput {
    pub(crate) fn connect() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => {
                let mut connected = 0usize;
                for (_, gamepad) in gilrs.gamepads() {
                    connected += 1;
                    info!(name = gamepad.name(), "gamepad_found");
                }
                if connected == 0 {
                    info!("gamepad_none_using_keyboard");
                }
                Some(gilrs)
            }
            Err(error) => {
                warn!(error = %error, "gamepad_unavailable_using_keyboard");
                None
            }
        };
        Self {
            gilrs,
            stick: Vec2::ZERO,
        }
    }

    /// Drains pending controller events and returns the current stick vector
    /// in screen orientation.
    pub(crate) fn poll(&mut self) -> Vec2 {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return Vec2::ZERO;
        };
        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::AxisChanged(axis, value, _) => {
                    apply_stick_axis(&mut self.stick, axis, value);
                }
                EventType::Connected => {
                    info!("gamepad_connected");
                }
                EventType::Disconnected => {
                    self.stick = Vec2::ZERO;
                    info!("gamepad_disconnected");
                }
                _ => {}
            }
        }
        self.stick
    }
}

// Controllers report stick Y up-positive; world and screen Y grow downward.
fn apply_stick_axis(stick: &mut Vec2, axis: Axis, value: f32) {
    let value = if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    match axis {
        Axis::LeftStickX => stick.x = value,
        Axis::LeftStickY => stick.y = -value,
        _ => {}
    }
}

mod gamepad;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{apply_deadzone, InputAction, MOVEMENT_DEADZONE};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::Renderer;
pub use scene::{InputSnapshot, PlayerView, Scene, SceneCommand, SceneFrame};

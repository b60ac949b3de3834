use super::input::{apply_deadzone, ActionStates, InputAction, MOVEMENT_DEADZONE};
use crate::world::{Camera, Destination, TileGrid, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input gathered between two ticks. Press edges are true for exactly one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    stick_direction: Vec2,
    cursor_position_px: Option<Vec2>,
    zoom_key_steps: i32,
    zoom_wheel_steps: i32,
    skip_objective_pressed: bool,
    toggle_collision_overlay_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// Raw left-stick vector, +y pointing down.
    pub fn stick_direction(&self) -> Vec2 {
        self.stick_direction
    }

    /// Movement request for this tick. A stick outside the deadzone wins over
    /// the movement keys.
    pub fn movement_direction(&self) -> Vec2 {
        let stick = apply_deadzone(self.stick_direction, MOVEMENT_DEADZONE);
        if stick != Vec2::ZERO {
            return stick;
        }
        self.actions.direction()
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    /// Net `+`/`-` key presses this tick.
    pub fn zoom_key_steps(&self) -> i32 {
        self.zoom_key_steps
    }

    /// Net mouse wheel notches this tick.
    pub fn zoom_wheel_steps(&self) -> i32 {
        self.zoom_wheel_steps
    }

    pub fn skip_objective_pressed(&self) -> bool {
        self.skip_objective_pressed
    }

    pub fn toggle_collision_overlay_pressed(&self) -> bool {
        self.toggle_collision_overlay_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub(crate) fn with_actions(mut self, actions: ActionStates) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_stick_direction(mut self, stick_direction: Vec2) -> Self {
        self.stick_direction = stick_direction;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_zoom_key_steps(mut self, zoom_key_steps: i32) -> Self {
        self.zoom_key_steps = zoom_key_steps;
        self
    }

    pub fn with_zoom_wheel_steps(mut self, zoom_wheel_steps: i32) -> Self {
        self.zoom_wheel_steps = zoom_wheel_steps;
        self
    }

    pub fn with_skip_objective_pressed(mut self, pressed: bool) -> Self {
        self.skip_objective_pressed = pressed;
        self
    }

    pub fn with_toggle_collision_overlay_pressed(mut self, pressed: bool) -> Self {
        self.toggle_collision_overlay_pressed = pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub position: Vec2,
    pub half_width: f32,
    pub half_height: f32,
}

/// Everything the renderer needs for one frame, borrowed from the scene.
#[derive(Debug, Clone)]
pub struct SceneFrame<'a> {
    pub grid: &'a TileGrid,
    pub camera: Camera,
    pub destinations: &'a [Destination],
    pub player: PlayerView,
    pub status_text: String,
    pub info_message: Option<&'a str>,
    pub show_collision_overlay: bool,
}

pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn frame(&self) -> SceneFrame<'_>;
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}

/// Owns the running scene and makes `load`/`unload` happen exactly once.
pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if !self.is_loaded {
            self.scene.load();
            self.is_loaded = true;
        }
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if !self.is_loaded {
            return SceneCommand::None;
        }
        self.scene.update(fixed_dt_seconds, input)
    }

    pub(crate) fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}

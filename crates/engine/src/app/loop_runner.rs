use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::world::{CatalogError, MapLoadError, Vec2};
use crate::StartupError;

use super::gamepad::GamepadInput;
use super::input::ActionStates;
use super::metrics::LoopStatsWindow;
use super::scene::SceneRuntime;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Campus Navigator".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    MapLoad(#[from] MapLoadError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` at a fixed tick rate until quit.
/// Tile images referenced by the scene's grid are resolved under `tiles_dir`.
pub fn run_app(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    tiles_dir: PathBuf,
) -> Result<(), AppError> {
    let mut runtime = SceneRuntime::new(scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, tiles_dir).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut clock = TickClock::new(
        config.target_tps,
        config.max_frame_delta,
        config.max_ticks_per_frame,
    );
    let fixed_dt_seconds = clock.fixed_dt().as_secs_f32();
    let present_interval = present_interval(config.max_render_fps);
    let metrics_log_interval = if config.metrics_log_interval.is_zero() {
        Duration::from_secs(1)
    } else {
        config.metrics_log_interval
    };
    let initial_size = window_for_loop.inner_size();
    let mut input_collector = InputCollector::new(initial_size.width, initial_size.height);
    let mut gamepad = GamepadInput::connect();

    runtime.load();
    info!(
        target_tps = config.target_tps.max(1),
        max_frame_delta_ms = clock.max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = clock.max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        present_interval_ms = present_interval.map_or(0, |interval| interval.as_millis() as u64),
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut stats_window = LoopStatsWindow::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input_collector
                            .set_cursor_position_px(position.x as f32, position.y as f32);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.clear_cursor_position();
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        input_collector.handle_mouse_wheel(delta);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        input_collector.set_stick_direction(gamepad.poll());
                        let budget = clock.advance(frame_dt);
                        for _ in 0..budget.ticks {
                            let input_snapshot = input_collector.snapshot_for_tick();
                            if runtime.update(fixed_dt_seconds, &input_snapshot)
                                == SceneCommand::Quit
                            {
                                info!(reason = "scene_quit", "shutdown_requested");
                                window_target.exit();
                                break;
                            }
                        }
                        stats_window.record_ticks(budget.ticks);
                        if !budget.dropped.is_zero() {
                            stats_window.record_dropped_backlog(budget.dropped);
                            warn!(
                                dropped_backlog_ms = budget.dropped.as_millis() as u64,
                                max_ticks_per_frame = clock.max_ticks_per_frame,
                                "sim_clamp_triggered"
                            );
                        }

                        let since_present =
                            Instant::now().saturating_duration_since(last_present_instant);
                        if let Some(wait) = present_wait(since_present, present_interval) {
                            thread::sleep(wait);
                        }

                        if let Err(error) = renderer.render(&runtime.scene().frame()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();

                        let next_title = runtime.scene().debug_title();
                        if next_title != last_applied_title {
                            window_for_loop
                                .set_title(next_title.as_deref().unwrap_or(&config.window_title));
                            last_applied_title = next_title;
                        }
                        stats_window.record_frame(frame_dt);

                        if let Some(stats) = stats_window.roll(now) {
                            info!(
                                fps = stats.fps,
                                tps = stats.tps,
                                frame_time_ms = stats.frame_time_ms,
                                dropped_backlog_ms = stats.dropped_backlog_ms,
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                runtime.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    stick_direction: Vec2,
    zoom_in_key_is_down: bool,
    zoom_out_key_is_down: bool,
    pending_zoom_key_steps: i32,
    pending_zoom_wheel_steps: i32,
    skip_key_is_down: bool,
    skip_pressed_edge: bool,
    overlay_key_is_down: bool,
    overlay_pressed_edge: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            KeyCode::Equal | KeyCode::NumpadAdd => {
                if press_edge(&mut self.zoom_in_key_is_down, state) {
                    self.pending_zoom_key_steps = self.pending_zoom_key_steps.saturating_add(1);
                }
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                if press_edge(&mut self.zoom_out_key_is_down, state) {
                    self.pending_zoom_key_steps = self.pending_zoom_key_steps.saturating_sub(1);
                }
            }
            KeyCode::KeyN => {
                if press_edge(&mut self.skip_key_is_down, state) {
                    self.skip_pressed_edge = true;
                }
            }
            KeyCode::KeyC => {
                if press_edge(&mut self.overlay_key_is_down, state) {
                    self.overlay_pressed_edge = true;
                }
            }
            KeyCode::Escape => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.mark_quit_requested();
                }
            }
            _ => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::empty()
            .with_quit_requested(self.quit_requested)
            .with_actions(self.action_states)
            .with_stick_direction(self.stick_direction)
            .with_cursor_position_px(self.cursor_position_px)
            .with_zoom_key_steps(self.pending_zoom_key_steps)
            .with_zoom_wheel_steps(self.pending_zoom_wheel_steps)
            .with_skip_objective_pressed(self.skip_pressed_edge)
            .with_toggle_collision_overlay_pressed(self.overlay_pressed_edge)
            .with_window_size((self.window_width, self.window_height));
        self.pending_zoom_key_steps = 0;
        self.pending_zoom_wheel_steps = 0;
        self.skip_pressed_edge = false;
        self.overlay_pressed_edge = false;
        snapshot
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2 { x, y });
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn set_stick_direction(&mut self, stick: Vec2) {
        self.stick_direction = stick;
    }

    fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        let steps = wheel_notches(delta);
        self.pending_zoom_wheel_steps = self.pending_zoom_wheel_steps.saturating_add(steps);
    }
}

/// Tracks a key's held state and reports true only on the up-to-down transition.
fn press_edge(is_down: &mut bool, state: ElementState) -> bool {
    match state {
        ElementState::Pressed => {
            let edge = !*is_down;
            *is_down = true;
            edge
        }
        ElementState::Released => {
            *is_down = false;
            false
        }
    }
}

/// Fixed-timestep accumulator. Frame time is capped before it is banked and
/// any backlog left once the per-frame tick cap is reached is discarded.
#[derive(Debug, Clone)]
struct TickClock {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    banked: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickBudget {
    ticks: u32,
    dropped: Duration,
}

impl TickClock {
    fn new(target_tps: u32, max_frame_delta: Duration, max_ticks_per_frame: u32) -> Self {
        Self {
            fixed_dt: Duration::from_secs_f64(1.0 / target_tps.max(1) as f64),
            max_frame_delta: if max_frame_delta.is_zero() {
                Duration::from_millis(250)
            } else {
                max_frame_delta
            },
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            banked: Duration::ZERO,
        }
    }

    fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    fn advance(&mut self, frame_dt: Duration) -> TickBudget {
        self.banked += frame_dt.min(self.max_frame_delta);
        let mut ticks = 0;
        while ticks < self.max_ticks_per_frame && self.banked >= self.fixed_dt {
            self.banked -= self.fixed_dt;
            ticks += 1;
        }
        let dropped = if self.banked >= self.fixed_dt {
            std::mem::take(&mut self.banked)
        } else {
            Duration::ZERO
        };
        TickBudget { ticks, dropped }
    }
}

/// Minimum spacing between presents, or `None` when uncapped.
fn present_interval(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps
        .filter(|fps| *fps > 0)
        .map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn present_wait(since_present: Duration, interval: Option<Duration>) -> Option<Duration> {
    interval
        .and_then(|interval| interval.checked_sub(since_present))
        .filter(|wait| !wait.is_zero())
}

/// Line deltas round to whole notches; touchpad pixel deltas count as one
/// notch in their direction.
fn wheel_notches(delta: MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
        MouseScrollDelta::PixelDelta(position) if position.y > 0.0 => 1,
        MouseScrollDelta::PixelDelta(position) if position.y < 0.0 => -1,
        MouseScrollDelta::PixelDelta(_) => 0,
    }
}

use campus_engine::world::{
    start_position, Camera, CollisionPolicy, DestinationRegistry, MovingBody, ObjectiveSession,
    TileGrid, Vec2, DEFAULT_OBJECTIVE_COUNT,
};
use campus_engine::{InputSnapshot, PlayerView, Scene, SceneCommand, SceneFrame};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

const TITLE_PREFIX: &str = "Campus Navigator";
const PLAYER_SPEED_PX_PER_SECOND: f32 = 150.0;
const PLAYER_HALF_EXTENT_PX: f32 = 10.0;
const ZOOM_STEP_FACTOR: f32 = 1.1;
const INFO_MESSAGE_SECONDS: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GameplayConfig {
    pub objective_count: usize,
    pub player_speed: f32,
    pub player_half_width: f32,
    pub player_half_height: f32,
    pub zoom_step_factor: f32,
    pub info_message_seconds: f32,
    pub collision_policy: CollisionPolicy,
    pub seed: Option<u64>,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            objective_count: DEFAULT_OBJECTIVE_COUNT,
            player_speed: PLAYER_SPEED_PX_PER_SECOND,
            player_half_width: PLAYER_HALF_EXTENT_PX,
            player_half_height: PLAYER_HALF_EXTENT_PX,
            zoom_step_factor: ZOOM_STEP_FACTOR,
            info_message_seconds: INFO_MESSAGE_SECONDS,
            collision_policy: CollisionPolicy::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct InfoMessage {
    text: String,
    remaining_seconds: f32,
}

pub(crate) struct CampusScene {
    config: GameplayConfig,
    grid: TileGrid,
    player: MovingBody,
    camera: Camera,
    session: ObjectiveSession,
    info_message: Option<InfoMessage>,
    show_collision_overlay: bool,
    viewport: (u32, u32),
}

impl CampusScene {
    pub(crate) fn new(grid: TileGrid, registry: DestinationRegistry, config: GameplayConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = ObjectiveSession::start(registry, config.objective_count, &mut rng);
        let player = MovingBody::new(
            start_position(&grid),
            config.player_half_width,
            config.player_half_height,
            config.player_speed,
        );
        Self {
            config,
            grid,
            player,
            camera: Camera::default(),
            session,
            info_message: None,
            show_collision_overlay: false,
            viewport: (0, 0),
        }
    }

    fn apply_zoom(&mut self, input: &InputSnapshot) {
        let player = self.player.position();
        let key_steps = input.zoom_key_steps();
        if key_steps != 0 {
            let (focus_x, focus_y) = self.camera.world_to_screen(player.x, player.y);
            self.camera
                .zoom_by(self.config.zoom_step_factor.powi(key_steps), focus_x, focus_y);
        }

        let wheel_steps = input.zoom_wheel_steps();
        if wheel_steps != 0 {
            let focus = input.cursor_position_px().unwrap_or_else(|| {
                let (x, y) = self.camera.world_to_screen(player.x, player.y);
                Vec2::new(x, y)
            });
            self.camera
                .zoom_by(self.config.zoom_step_factor.powi(wheel_steps), focus.x, focus.y);
        }
        if key_steps != 0 || wheel_steps != 0 {
            debug!(zoom = self.camera.zoom(), "camera_zoom_changed");
        }
    }

    fn follow_player(&mut self) {
        let (width, height) = self.viewport;
        let position = self.player.position();
        self.camera.follow_center(
            width as f32 / 2.0,
            height as f32 / 2.0,
            position.x,
            position.y,
        );
    }

    fn check_objective(&mut self) {
        let position = self.player.position();
        if let Some(report) = self
            .session
            .on_proximity(position, self.player.proximity_radius())
        {
            self.info_message = Some(InfoMessage {
                text: report.message(),
                remaining_seconds: self.config.info_message_seconds,
            });
        }
    }

    fn tick_info_message(&mut self, fixed_dt_seconds: f32) {
        let Some(message) = self.info_message.as_mut() else {
            return;
        };
        message.remaining_seconds -= fixed_dt_seconds;
        if message.remaining_seconds <= 0.0 {
            self.info_message = None;
        }
    }
}

impl Scene for CampusScene {
    fn load(&mut self) {
        self.player.warn_if_oversized(&self.grid);
        let position = self.player.position();
        info!(
            player_x = position.x,
            player_y = position.y,
            destinations = self.session.destinations().len(),
            objectives = self.session.selected_count(),
            "scene_loaded"
        );
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        self.viewport = input.window_size();

        if input.toggle_collision_overlay_pressed() {
            self.show_collision_overlay = !self.show_collision_overlay;
            info!(
                visible = self.show_collision_overlay,
                "collision_overlay_toggled"
            );
        }
        self.apply_zoom(input);
        if input.skip_objective_pressed() {
            self.session.skip_current();
        }

        self.player
            .update(fixed_dt_seconds, input.movement_direction(), &self.grid);
        self.follow_player();
        self.tick_info_message(fixed_dt_seconds);
        self.check_objective();

        SceneCommand::None
    }

    fn frame(&self) -> SceneFrame<'_> {
        SceneFrame {
            grid: &self.grid,
            camera: self.camera,
            destinations: self.session.destinations(),
            player: PlayerView {
                position: self.player.position(),
                half_width: self.player.half_width(),
                half_height: self.player.half_height(),
            },
            status_text: self.session.status_text(),
            info_message: self
                .info_message
                .as_ref()
                .map(|message| message.text.as_str()),
            show_collision_overlay: self.show_collision_overlay,
        }
    }

    fn unload(&mut self) {
        info!(
            visited = self.session.visited_count(),
            total = self.session.selected_count(),
            "scene_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        let total = self.session.selected_count();
        if total == 0 {
            return Some(format!("{TITLE_PREFIX} | no objectives"));
        }
        Some(format!(
            "{TITLE_PREFIX} | {}/{} visited",
            self.session.visited_count(),
            total
        ))
    }
}

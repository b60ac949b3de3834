    use super::*;
    use campus_engine::world::Destination;
    use campus_engine::InputAction;

    const DT: f32 = 1.0 / 60.0;
    const WINDOW: (u32, u32) = (800, 600);

    fn open_grid(columns: u32, rows: u32) -> TileGrid {
        let cells = (columns * rows) as usize;
        TileGrid::new(32, 32, columns, rows, vec![None; cells], vec![true; cells]).expect("grid")
    }

    fn registry(points: &[(f32, f32)]) -> DestinationRegistry {
        DestinationRegistry::from_destinations(
            points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| {
                    Destination::new(
                        format!("d{i}"),
                        format!("Hall {i}"),
                        Vec2::new(x, y),
                        30.0,
                        format!("Facts about hall {i}"),
                    )
                })
                .collect(),
        )
    }

    fn seeded_config() -> GameplayConfig {
        GameplayConfig {
            seed: Some(17),
            ..GameplayConfig::default()
        }
    }

    fn scene_with(points: &[(f32, f32)]) -> CampusScene {
        let mut scene = CampusScene::new(open_grid(20, 20), registry(points), seeded_config());
        scene.load();
        scene
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::empty().with_window_size(WINDOW)
    }

    fn holding(action: InputAction) -> InputSnapshot {
        idle().with_action_down(action, true)
    }

    fn run_ticks(scene: &mut CampusScene, input: &InputSnapshot, ticks: usize) {
        for _ in 0..ticks {
            assert_eq!(scene.update(DT, input), SceneCommand::None);
        }
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-2,
            "actual={actual} expected={expected}"
        );
    }

    fn teleport_to_current_target(scene: &mut CampusScene) {
        let target = scene.session.current_target().expect("target").position;
        scene.player.set_position(target);
    }

    #[test]
    fn player_spawns_on_top_right_tile() {
        let scene = scene_with(&[(100.0, 100.0)]);
        assert_eq!(scene.player.position(), Vec2::new(19.0 * 32.0 + 16.0, 16.0));
    }

    #[test]
    fn holding_left_moves_at_configured_speed() {
        let mut scene = scene_with(&[(100.0, 500.0)]);
        let start = scene.player.position();

        run_ticks(&mut scene, &holding(InputAction::MoveLeft), 60);

        assert_close(scene.player.position().x, start.x - 150.0);
        assert_close(scene.player.position().y, start.y);
    }

    #[test]
    fn camera_keeps_player_at_window_center() {
        let mut scene = scene_with(&[(100.0, 500.0)]);
        run_ticks(&mut scene, &holding(InputAction::MoveDown), 30);

        let position = scene.player.position();
        let (sx, sy) = scene.camera.world_to_screen(position.x, position.y);
        assert_close(sx, 400.0);
        assert_close(sy, 300.0);
    }

    #[test]
    fn zoom_key_zooms_around_player() {
        let mut scene = scene_with(&[(100.0, 500.0)]);
        run_ticks(&mut scene, &idle(), 1);

        scene.update(DT, &idle().with_zoom_key_steps(1));
        assert_close(scene.camera.zoom(), 1.1);
        let position = scene.player.position();
        let (sx, sy) = scene.camera.world_to_screen(position.x, position.y);
        assert_close(sx, 400.0);
        assert_close(sy, 300.0);

        scene.update(DT, &idle().with_zoom_key_steps(-2));
        assert_close(scene.camera.zoom(), 1.1 / 1.21);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut scene = scene_with(&[(100.0, 500.0)]);
        let wheel_in = idle()
            .with_zoom_wheel_steps(5)
            .with_cursor_position_px(Some(Vec2::new(10.0, 10.0)));
        run_ticks(&mut scene, &wheel_in, 20);
        assert_eq!(scene.camera.zoom(), 10.0);

        run_ticks(&mut scene, &idle().with_zoom_wheel_steps(-50), 1);
        assert_close(scene.camera.zoom(), 0.1);
    }

    #[test]
    fn overlay_toggles_on_each_press() {
        let mut scene = scene_with(&[(100.0, 500.0)]);
        let toggle = idle().with_toggle_collision_overlay_pressed(true);

        scene.update(DT, &toggle);
        assert!(scene.frame().show_collision_overlay);
        scene.update(DT, &idle());
        assert!(scene.frame().show_collision_overlay);
        scene.update(DT, &toggle);
        assert!(!scene.frame().show_collision_overlay);
    }

    #[test]
    fn reaching_target_shows_info_then_expires() {
        let mut scene = scene_with(&[(100.0, 500.0), (300.0, 300.0)]);
        let first = scene.session.current_target().expect("target").name.clone();
        teleport_to_current_target(&mut scene);

        scene.update(DT, &idle());
        let frame = scene.frame();
        let message = frame.info_message.expect("message");
        assert!(message.starts_with(&format!("{first}: Facts about hall")));
        assert!(frame.status_text.starts_with("Find (2/2): "));
        assert_eq!(scene.debug_title().as_deref(), Some("Campus Navigator | 1/2 visited"));

        run_ticks(&mut scene, &idle(), 290);
        assert!(scene.frame().info_message.is_some());
        run_ticks(&mut scene, &idle(), 20);
        assert!(scene.frame().info_message.is_none());
    }

    #[test]
    fn visiting_every_target_completes_session() {
        let mut scene = scene_with(&[(100.0, 500.0), (300.0, 300.0), (500.0, 100.0)]);
        for _ in 0..3 {
            teleport_to_current_target(&mut scene);
            scene.update(DT, &idle());
        }

        assert!(scene.session.all_visited());
        assert_eq!(
            scene.frame().status_text,
            "Session Complete! All objectives met!"
        );
        let active = scene
            .frame()
            .destinations
            .iter()
            .filter(|destination| destination.is_active_target)
            .count();
        assert_eq!(active, 0);
    }

    #[test]
    fn skip_moves_to_next_objective() {
        let mut scene = scene_with(&[(100.0, 500.0), (300.0, 300.0)]);
        let first = scene.session.current_target().expect("target").id.clone();

        scene.update(DT, &idle().with_skip_objective_pressed(true));

        let second = scene.session.current_target().expect("second").id.clone();
        assert_ne!(first, second);
        assert!(scene.frame().status_text.starts_with("Find (2/2): "));
    }

    #[test]
    fn empty_catalog_reports_no_objectives() {
        let mut scene = scene_with(&[]);
        run_ticks(&mut scene, &holding(InputAction::MoveDown), 5);
        scene.update(DT, &idle().with_skip_objective_pressed(true));

        assert_eq!(
            scene.frame().status_text,
            "No objectives available for this session."
        );
        assert_eq!(
            scene.debug_title().as_deref(),
            Some("Campus Navigator | no objectives")
        );
    }

    #[test]
    fn same_seed_picks_same_first_target() {
        let points = [(10.0, 10.0), (50.0, 50.0), (90.0, 90.0), (130.0, 130.0)];
        let a = scene_with(&points);
        let b = scene_with(&points);
        assert_eq!(
            a.session.current_target().map(|d| d.id.clone()),
            b.session.current_target().map(|d| d.id.clone())
        );
    }

    #[test]
    fn walls_stop_the_player() {
        let mut walkable = vec![true; 100];
        for y in 0..10 {
            walkable[y * 10 + 5] = false;
        }
        let grid = TileGrid::new(32, 32, 10, 10, vec![None; 100], walkable).expect("grid");
        let mut scene = CampusScene::new(grid, registry(&[(20.0, 300.0)]), seeded_config());
        scene.load();

        run_ticks(&mut scene, &holding(InputAction::MoveLeft), 240);

        let position = scene.player.position();
        assert_close(position.x, 6.0 * 32.0 + 10.0 + 0.01);
    }

    #[test]
    fn quit_request_ends_scene() {
        let mut scene = scene_with(&[(100.0, 500.0)]);
        assert_eq!(
            scene.update(DT, &idle().with_quit_requested(true)),
            SceneCommand::Quit
        );
    }

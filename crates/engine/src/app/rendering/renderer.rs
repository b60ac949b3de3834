use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use super::hud::{draw_info_panel, draw_status_panel};
use super::raster::{blend_rect, clear, draw_circle, draw_rect_outline, fill_rect, ScreenRectPx};
use crate::app::{PlayerView, SceneFrame};
use crate::tile_keys::validate_tile_key;
use crate::world::{Camera, Destination, TileGrid};

const CLEAR_COLOR: [u8; 4] = [18, 20, 26, 255];
const MAP_BASE_COLOR: [u8; 4] = [58, 74, 52, 255];
const BLOCKED_OVERLAY_COLOR: [u8; 4] = [255, 0, 0, 100];
const DESTINATION_PENDING_COLOR: [u8; 4] = [255, 165, 0, 255];
const DESTINATION_VISITED_COLOR: [u8; 4] = [0, 200, 0, 255];
const ACTIVE_TARGET_OUTLINE_COLOR: [u8; 4] = [255, 255, 255, 255];
const PLAYER_COLOR: [u8; 4] = [40, 110, 255, 255];
const PLAYER_OUTLINE_COLOR: [u8; 4] = [10, 20, 60, 255];
const ACTIVE_TARGET_RING_THICKNESS_PX: i32 = 3;

#[derive(Debug)]
struct LoadedTile {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    tiles_dir: PathBuf,
    tile_cache: HashMap<String, Option<LoadedTile>>,
    warned_tile_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, tiles_dir: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            tiles_dir,
            tile_cache: HashMap::new(),
            warned_tile_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub(crate) fn render(&mut self, scene_frame: &SceneFrame<'_>) -> Result<(), Error> {
        let (width, height) = (self.width, self.height);
        let frame = self.pixels.frame_mut();
        clear(frame, CLEAR_COLOR);

        draw_map_base(frame, width, height, scene_frame.grid, &scene_frame.camera);
        draw_tiles(
            frame,
            width,
            height,
            scene_frame.grid,
            &scene_frame.camera,
            &mut self.tile_cache,
            &mut self.warned_tile_keys,
            &self.tiles_dir,
        );
        if scene_frame.show_collision_overlay {
            draw_collision_overlay(frame, width, height, scene_frame.grid, &scene_frame.camera);
        }
        draw_destinations(
            frame,
            width,
            height,
            scene_frame.destinations,
            &scene_frame.camera,
        );
        draw_player(frame, width, height, &scene_frame.player, &scene_frame.camera);

        draw_status_panel(frame, width, height, &scene_frame.status_text);
        if let Some(message) = scene_frame.info_message {
            draw_info_panel(frame, width, height, message);
        }

        self.pixels.render()
    }
}

/// Screen rectangle covering world rect `[x0, x1) x [y0, y1)`.
fn world_rect_to_screen(camera: &Camera, x0: f32, y0: f32, x1: f32, y1: f32) -> ScreenRectPx {
    let (left, top) = camera.world_to_screen(x0, y0);
    let (right, bottom) = camera.world_to_screen(x1, y1);
    ScreenRectPx {
        left: left.floor() as i32,
        top: top.floor() as i32,
        right: right.floor() as i32,
        bottom: bottom.floor() as i32,
    }
}

fn tile_screen_rect(grid: &TileGrid, camera: &Camera, tile_x: u32, tile_y: u32) -> ScreenRectPx {
    let tile_width = grid.tile_width() as f32;
    let tile_height = grid.tile_height() as f32;
    let x0 = tile_x as f32 * tile_width;
    let y0 = tile_y as f32 * tile_height;
    world_rect_to_screen(camera, x0, y0, x0 + tile_width, y0 + tile_height)
}

fn draw_map_base(frame: &mut [u8], width: u32, height: u32, grid: &TileGrid, camera: &Camera) {
    let rect = world_rect_to_screen(camera, 0.0, 0.0, grid.world_width(), grid.world_height());
    fill_rect(frame, width, height, rect, MAP_BASE_COLOR);
}

#[allow(clippy::too_many_arguments)]
fn draw_tiles(
    frame: &mut [u8],
    width: u32,
    height: u32,
    grid: &TileGrid,
    camera: &Camera,
    tile_cache: &mut HashMap<String, Option<LoadedTile>>,
    warned_tile_keys: &mut HashSet<String>,
    tiles_dir: &Path,
) {
    let Some(visible) = camera.visible_tile_range(grid, width, height) else {
        return;
    };
    for tile_y in visible.y_min..=visible.y_max {
        for tile_x in visible.x_min..=visible.x_max {
            let Some(key) = grid.tile_ref(tile_x as i64, tile_y as i64) else {
                continue;
            };
            let Some(tile) = resolve_cached_tile(tile_cache, warned_tile_keys, tiles_dir, key)
            else {
                continue;
            };
            let rect = tile_screen_rect(grid, camera, tile_x, tile_y);
            draw_tile_scaled(frame, width, height, rect, tile);
        }
    }
}

fn draw_collision_overlay(
    frame: &mut [u8],
    width: u32,
    height: u32,
    grid: &TileGrid,
    camera: &Camera,
) {
    let Some(visible) = camera.visible_tile_range(grid, width, height) else {
        return;
    };
    for tile_y in visible.y_min..=visible.y_max {
        for tile_x in visible.x_min..=visible.x_max {
            if grid.is_walkable(tile_x as i64, tile_y as i64) {
                continue;
            }
            let rect = tile_screen_rect(grid, camera, tile_x, tile_y);
            blend_rect(frame, width, height, rect, BLOCKED_OVERLAY_COLOR);
        }
    }
}

/// Markers are `radius` screen pixels regardless of zoom.
fn draw_destinations(
    frame: &mut [u8],
    width: u32,
    height: u32,
    destinations: &[Destination],
    camera: &Camera,
) {
    for destination in destinations {
        let (sx, sy) = camera.world_to_screen(destination.position.x, destination.position.y);
        let (cx, cy) = (sx.round() as i32, sy.round() as i32);
        let radius_px = destination.radius.round().max(1.0) as i32;
        let color = if destination.visited {
            DESTINATION_VISITED_COLOR
        } else {
            DESTINATION_PENDING_COLOR
        };
        draw_circle(frame, width, height, cx, cy, radius_px, 0, color);
        if destination.is_active_target {
            draw_circle(
                frame,
                width,
                height,
                cx,
                cy,
                radius_px,
                ACTIVE_TARGET_RING_THICKNESS_PX,
                ACTIVE_TARGET_OUTLINE_COLOR,
            );
        }
    }
}

fn draw_player(frame: &mut [u8], width: u32, height: u32, player: &PlayerView, camera: &Camera) {
    let rect = world_rect_to_screen(
        camera,
        player.position.x - player.half_width,
        player.position.y - player.half_height,
        player.position.x + player.half_width,
        player.position.y + player.half_height,
    );
    // Keep the player visible at extreme zoom-out.
    let rect = ScreenRectPx {
        right: rect.right.max(rect.left + 2),
        bottom: rect.bottom.max(rect.top + 2),
        ..rect
    };
    fill_rect(frame, width, height, rect, PLAYER_COLOR);
    draw_rect_outline(frame, width, height, rect, PLAYER_OUTLINE_COLOR);
}

fn resolve_cached_tile<'a>(
    cache: &'a mut HashMap<String, Option<LoadedTile>>,
    warned_tile_keys: &mut HashSet<String>,
    tiles_dir: &Path,
    key: &str,
) -> Option<&'a LoadedTile> {
    if !cache.contains_key(key) {
        let loaded = resolve_tile_image_path(tiles_dir, key)
            .and_then(|path| {
                load_tile_rgba(&path).map_err(|reason| (Some(path), reason))
            })
            .map_err(|(path, reason)| {
                warn_tile_load_once(warned_tile_keys, key, path.as_deref(), &reason)
            })
            .ok();
        cache.insert(key.to_string(), loaded);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn resolve_tile_image_path(
    tiles_dir: &Path,
    key: &str,
) -> Result<PathBuf, (Option<PathBuf>, String)> {
    validate_tile_key(key).map_err(|error| (None, format!("invalid_key:{error}")))?;
    Ok(tiles_dir.join(key))
}

fn load_tile_rgba(path: &Path) -> Result<LoadedTile, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedTile {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_tile_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        tile_key = key,
        path = %path_display,
        reason = reason,
        "renderer_tile_load_failed"
    );
}

/// Nearest-neighbour blit of `tile` stretched over `rect`.
fn draw_tile_scaled(frame: &mut [u8], width: u32, height: u32, rect: ScreenRectPx, tile: &LoadedTile) {
    if tile.width == 0 || tile.height == 0 {
        return;
    }
    if tile.rgba.len() < tile.width as usize * tile.height as usize * 4 {
        return;
    }
    let dest_width = rect.right - rect.left;
    let dest_height = rect.bottom - rect.top;
    let Some(clipped) = rect.clipped(width, height) else {
        return;
    };

    let frame_width = width as usize;
    let tile_width = tile.width as usize;
    for out_y in clipped.top..clipped.bottom {
        let src_y = ((out_y - rect.top) as i64 * tile.height as i64 / dest_height as i64)
            .clamp(0, tile.height as i64 - 1) as usize;
        for out_x in clipped.left..clipped.right {
            let src_x = ((out_x - rect.left) as i64 * tile.width as i64 / dest_width as i64)
                .clamp(0, tile.width as i64 - 1) as usize;
            let src = (src_y * tile_width + src_x) * 4;
            let alpha = tile.rgba[src + 3];
            if alpha == 0 {
                continue;
            }
            let dst = (out_y as usize * frame_width + out_x as usize) * 4;
            frame[dst..dst + 3].copy_from_slice(&tile.rgba[src..src + 3]);
            frame[dst + 3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Vec2;
    use image::{Rgba, RgbaImage};

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn tile_cache_loads_once_and_remembers_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("grass.png"))
            .expect("save");
        std::fs::write(dir.path().join("broken.png"), b"not a png").expect("write");

        let mut cache = HashMap::new();
        let mut warned = HashSet::new();
        let tile = resolve_cached_tile(&mut cache, &mut warned, dir.path(), "grass.png")
            .expect("grass");
        assert_eq!((tile.width, tile.height), (2, 2));

        for _ in 0..3 {
            assert!(resolve_cached_tile(&mut cache, &mut warned, dir.path(), "broken.png").is_none());
            assert!(resolve_cached_tile(&mut cache, &mut warned, dir.path(), "missing.png").is_none());
            assert!(resolve_cached_tile(&mut cache, &mut warned, dir.path(), "../x.png").is_none());
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(warned.len(), 3);
    }

    #[test]
    fn tile_blit_scales_to_destination_rect() {
        let tile = LoadedTile {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
        };
        let mut frame = vec![0u8; 8 * 2 * 4];
        draw_tile_scaled(&mut frame, 8, 2, ScreenRectPx::from_origin_size(0, 0, 4, 2), &tile);

        assert_eq!(pixel(&frame, 8, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 8, 2, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&frame, 8, 4, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn collision_overlay_tints_only_blocked_tiles() {
        let grid = TileGrid::new(2, 2, 2, 1, vec![None, None], vec![true, false]).expect("grid");
        let camera = Camera::default();
        let mut frame = vec![0u8; 4 * 2 * 4];
        clear(&mut frame, [0, 0, 0, 255]);
        draw_collision_overlay(&mut frame, 4, 2, &grid, &camera);

        assert_eq!(pixel(&frame, 4, 0, 0), [0, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 2, 1), [100, 0, 0, 255]);
    }

    #[test]
    fn destinations_use_state_colors_and_own_radius() {
        let mut visited = Destination::new("v", "Visited", Vec2::new(10.0, 10.0), 6.0, "");
        visited.mark_visited();
        let mut active = Destination::new("a", "Active", Vec2::new(40.0, 10.0), 8.0, "");
        active.set_active_target(true);

        let (width, height) = (60u32, 24u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        draw_destinations(&mut frame, width, height, &[visited, active], &Camera::default());

        assert_eq!(pixel(&frame, width, 10, 10), DESTINATION_VISITED_COLOR);
        assert_eq!(pixel(&frame, width, 16, 10), DESTINATION_VISITED_COLOR);
        assert_eq!(pixel(&frame, width, 17, 10), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, width, 40, 10), DESTINATION_PENDING_COLOR);
        assert_eq!(pixel(&frame, width, 47, 10), ACTIVE_TARGET_OUTLINE_COLOR);
        assert_eq!(pixel(&frame, width, 49, 10), [0, 0, 0, 0]);
    }

    #[test]
    fn destination_marker_size_ignores_zoom() {
        let destination = Destination::new("d", "Dorm", Vec2::new(10.0, 5.0), 6.0, "");
        let camera = Camera::new(2.0, Vec2::ZERO);

        let (width, height) = (40u32, 20u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        draw_destinations(&mut frame, width, height, &[destination], &camera);

        assert_eq!(pixel(&frame, width, 20, 10), DESTINATION_PENDING_COLOR);
        assert_eq!(pixel(&frame, width, 26, 10), DESTINATION_PENDING_COLOR);
        assert_eq!(pixel(&frame, width, 27, 10), [0, 0, 0, 0]);
    }

    #[test]
    fn player_is_drawn_at_camera_transform() {
        let mut camera = Camera::new(2.0, Vec2::ZERO);
        camera.follow_center(20.0, 20.0, 100.0, 100.0);
        let player = PlayerView {
            position: Vec2::new(100.0, 100.0),
            half_width: 5.0,
            half_height: 5.0,
        };
        let mut frame = vec![0u8; 40 * 40 * 4];
        draw_player(&mut frame, 40, 40, &player, &camera);

        assert_eq!(pixel(&frame, 40, 20, 20), PLAYER_COLOR);
        assert_eq!(pixel(&frame, 40, 35, 20), [0, 0, 0, 0]);
    }
}

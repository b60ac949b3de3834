use super::{TileGrid, Vec2};

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.1;
pub const CAMERA_ZOOM_MAX: f32 = 10.0;

/// World-to-screen transform: `screen = world * zoom + offset`.
///
/// Both drawing and any screen-space picking go through this type so the
/// picture on screen always matches the collision grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    zoom: f32,
    offset: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRectInclusive {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: CAMERA_ZOOM_DEFAULT,
            offset: Vec2::ZERO,
        }
    }
}

impl Camera {
    pub fn new(zoom: f32, offset: Vec2) -> Self {
        Self {
            zoom: clamp_camera_zoom(zoom),
            offset,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn world_to_screen(&self, world_x: f32, world_y: f32) -> (f32, f32) {
        (
            self.offset.x + world_x * self.zoom,
            self.offset.y + world_y * self.zoom,
        )
    }

    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        (
            (screen_x - self.offset.x) / self.zoom,
            (screen_y - self.offset.y) / self.zoom,
        )
    }

    /// Scales zoom by `factor` while keeping the world point under
    /// `(focus_x, focus_y)` at the same screen position.
    pub fn zoom_by(&mut self, factor: f32, focus_x: f32, focus_y: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let (world_x, world_y) = self.screen_to_world(focus_x, focus_y);
        self.zoom = clamp_camera_zoom(self.zoom * factor);
        self.offset = Vec2 {
            x: focus_x - world_x * self.zoom,
            y: focus_y - world_y * self.zoom,
        };
    }

    pub fn follow_center(&mut self, screen_x: f32, screen_y: f32, world_x: f32, world_y: f32) {
        self.offset = Vec2 {
            x: screen_x - world_x * self.zoom,
            y: screen_y - world_y * self.zoom,
        };
    }

    /// Tiles that intersect a `width` x `height` viewport, clipped to the grid.
    pub fn visible_tile_range(
        &self,
        grid: &TileGrid,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Option<TileRectInclusive> {
        if viewport_width == 0 || viewport_height == 0 {
            return None;
        }
        let (min_x, min_y) = self.screen_to_world(0.0, 0.0);
        let (max_x, max_y) = self.screen_to_world(viewport_width as f32, viewport_height as f32);

        let x_min = grid.column_at_world(min_x).max(0);
        let y_min = grid.row_at_world(min_y).max(0);
        let x_max = grid.column_at_world(max_x).min(grid.columns() as i64 - 1);
        let y_max = grid.row_at_world(max_y).min(grid.rows() as i64 - 1);
        if x_min > x_max || y_min > y_max {
            return None;
        }

        Some(TileRectInclusive {
            x_min: x_min as u32,
            x_max: x_max as u32,
            y_min: y_min as u32,
            y_max: y_max as u32,
        })
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn assert_close(actual: (f32, f32), expected: (f32, f32)) {
        assert!(
            (actual.0 - expected.0).abs() < EPS && (actual.1 - expected.1).abs() < EPS,
            "actual={actual:?} expected={expected:?}"
        );
    }

    #[test]
    fn world_to_screen_applies_zoom_then_offset() {
        let camera = Camera::new(2.0, Vec2::new(10.0, -5.0));
        assert_close(camera.world_to_screen(3.0, 4.0), (16.0, 3.0));
        assert_close(camera.screen_to_world(16.0, 3.0), (3.0, 4.0));
    }

    #[test]
    fn zoom_keeps_focus_point_anchored() {
        let zooms = [0.1, 0.37, 1.0, 2.5, 10.0];
        let factors = [0.5, 1.1, 1.0 / 1.1, 3.0];
        let foci = [(0.0, 0.0), (400.0, 300.0), (799.0, 12.5)];
        for zoom in zooms {
            for factor in factors {
                for (fx, fy) in foci {
                    let mut camera = Camera::new(zoom, Vec2::new(-123.0, 45.0));
                    let world_before = camera.screen_to_world(fx, fy);
                    camera.zoom_by(factor, fx, fy);
                    let screen_after = camera.world_to_screen(world_before.0, world_before.1);
                    assert_close(screen_after, (fx, fy));
                }
            }
        }
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut camera = Camera::default();
        for _ in 0..100 {
            camera.zoom_by(1.5, 0.0, 0.0);
        }
        assert_eq!(camera.zoom(), CAMERA_ZOOM_MAX);
        for _ in 0..100 {
            camera.zoom_by(0.5, 0.0, 0.0);
        }
        assert_eq!(camera.zoom(), CAMERA_ZOOM_MIN);
    }

    #[test]
    fn zoom_ignores_invalid_factors() {
        let mut camera = Camera::new(2.0, Vec2::new(1.0, 1.0));
        camera.zoom_by(0.0, 5.0, 5.0);
        camera.zoom_by(-1.0, 5.0, 5.0);
        camera.zoom_by(f32::NAN, 5.0, 5.0);
        assert_eq!(camera, Camera::new(2.0, Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn non_finite_zoom_falls_back_to_default() {
        assert_eq!(Camera::new(f32::INFINITY, Vec2::ZERO).zoom(), 1.0);
    }

    #[test]
    fn follow_center_puts_world_point_at_screen_center() {
        let mut camera = Camera::new(1.7, Vec2::ZERO);
        camera.follow_center(400.0, 300.0, 1000.0, 250.0);
        assert_close(camera.world_to_screen(1000.0, 250.0), (400.0, 300.0));
    }

    #[test]
    fn visible_tile_range_is_clipped_to_grid() {
        let grid = TileGrid::new(32, 32, 10, 10, vec![None; 100], vec![true; 100]).expect("grid");
        let mut camera = Camera::default();
        camera.follow_center(100.0, 100.0, 48.0, 48.0);

        let rect = camera.visible_tile_range(&grid, 200, 200).expect("visible");
        assert_eq!(
            rect,
            TileRectInclusive {
                x_min: 0,
                x_max: 4,
                y_min: 0,
                y_max: 4
            }
        );

        camera.follow_center(100.0, 100.0, 5000.0, 5000.0);
        assert!(camera.visible_tile_range(&grid, 200, 200).is_none());
        assert!(camera.visible_tile_range(&grid, 0, 200).is_none());
    }
}

use tracing::warn;

use super::{TileGrid, Vec2};

/// Gap left between a clamped body and the tile that stopped it, so the next
/// tick does not land exactly on the tile boundary.
pub const COLLISION_EPSILON: f32 = 0.01;

/// Axis-aligned box moving through a [`TileGrid`].
///
/// Position is the box center in world pixels. The box is resolved against the
/// grid one axis at a time, which gives wall sliding for diagonal input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingBody {
    position: Vec2,
    half_width: f32,
    half_height: f32,
    speed: f32,
}

impl MovingBody {
    pub fn new(position: Vec2, half_width: f32, half_height: f32, speed: f32) -> Self {
        Self {
            position,
            half_width: half_width.max(0.0),
            half_height: half_height.max(0.0),
            speed: speed.max(0.0),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Radius used for proximity checks against destinations.
    pub fn proximity_radius(&self) -> f32 {
        self.half_width
    }

    /// Whether the box is strictly narrower and shorter than one tile.
    /// Collision only tests the two leading corners and the far edge
    /// `center + half` is inclusive, so a box exactly one tile wide already
    /// touches the neighbouring tile.
    pub fn fits_grid(&self, grid: &TileGrid) -> bool {
        self.half_width * 2.0 < grid.tile_width() as f32
            && self.half_height * 2.0 < grid.tile_height() as f32
    }

    pub fn warn_if_oversized(&self, grid: &TileGrid) {
        if !self.fits_grid(grid) {
            warn!(
                half_width = self.half_width,
                half_height = self.half_height,
                tile_width = grid.tile_width(),
                tile_height = grid.tile_height(),
                "body_larger_than_tile_collision_may_clip"
            );
        }
    }

    /// Moves the body along `direction` for `dt` seconds.
    ///
    /// `direction` is normalized first; zero or non-finite input does not move
    /// the body. X is resolved before Y using the pre-update Y, then Y using
    /// the new X. On each axis the leading edge is swept from its current tile
    /// to its candidate tile, testing the two leading corners, and the body is
    /// clamped just short of the first non-walkable tile. A clamp never
    /// pushes the body against the input, so a body already overlapping a
    /// blocked tile stays put. The result is then clamped to the map interior.
    pub fn update(&mut self, dt: f32, direction: Vec2, grid: &TileGrid) {
        if dt.is_finite() && dt > 0.0 {
            if let Some(unit) = direction.normalized() {
                let delta_x = unit.x * self.speed * dt;
                let delta_y = unit.y * self.speed * dt;
                self.position.x = self.resolve_x(delta_x, grid);
                self.position.y = self.resolve_y(delta_y, grid);
            }
        }
        self.clamp_to_map(grid);
    }

    fn resolve_x(&self, delta_x: f32, grid: &TileGrid) -> f32 {
        let candidate = self.position.x + delta_x;
        if delta_x == 0.0 {
            return candidate;
        }
        let top_row = grid.row_at_world(self.position.y - self.half_height);
        let bottom_row = grid.row_at_world(self.position.y + self.half_height);
        let column_blocked = |column: i64| {
            !grid.is_walkable(column, top_row) || !grid.is_walkable(column, bottom_row)
        };
        let tile_width = grid.tile_width() as f32;

        if delta_x > 0.0 {
            let from = grid.column_at_world(self.position.x + self.half_width);
            let to = grid.column_at_world(candidate + self.half_width);
            if let Some(column) = (from..=to).find(|column| column_blocked(*column)) {
                let stop = column as f32 * tile_width - self.half_width - COLLISION_EPSILON;
                return stop.max(self.position.x);
            }
        } else {
            let from = grid.column_at_world(self.position.x - self.half_width);
            let to = grid.column_at_world(candidate - self.half_width);
            if let Some(column) = (to..=from).rev().find(|column| column_blocked(*column)) {
                let stop = (column + 1) as f32 * tile_width + self.half_width + COLLISION_EPSILON;
                return stop.min(self.position.x);
            }
        }
        candidate
    }

    fn resolve_y(&self, delta_y: f32, grid: &TileGrid) -> f32 {
        let candidate = self.position.y + delta_y;
        if delta_y == 0.0 {
            return candidate;
        }
        let left_column = grid.column_at_world(self.position.x - self.half_width);
        let right_column = grid.column_at_world(self.position.x + self.half_width);
        let row_blocked = |row: i64| {
            !grid.is_walkable(left_column, row) || !grid.is_walkable(right_column, row)
        };
        let tile_height = grid.tile_height() as f32;

        if delta_y > 0.0 {
            let from = grid.row_at_world(self.position.y + self.half_height);
            let to = grid.row_at_world(candidate + self.half_height);
            if let Some(row) = (from..=to).find(|row| row_blocked(*row)) {
                let stop = row as f32 * tile_height - self.half_height - COLLISION_EPSILON;
                return stop.max(self.position.y);
            }
        } else {
            let from = grid.row_at_world(self.position.y - self.half_height);
            let to = grid.row_at_world(candidate - self.half_height);
            if let Some(row) = (to..=from).rev().find(|row| row_blocked(*row)) {
                let stop = (row + 1) as f32 * tile_height + self.half_height + COLLISION_EPSILON;
                return stop.min(self.position.y);
            }
        }
        candidate
    }

    fn clamp_to_map(&mut self, grid: &TileGrid) {
        let max_x = (grid.world_width() - self.half_width).max(self.half_width);
        let max_y = (grid.world_height() - self.half_height).max(self.half_height);
        self.position.x = self.position.x.clamp(self.half_width, max_x);
        self.position.y = self.position.y.clamp(self.half_height, max_y);
    }
}

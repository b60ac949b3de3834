mod body;
mod camera;
mod destinations;
mod objectives;
mod spawn;
mod tile_grid;

pub use body::{MovingBody, COLLISION_EPSILON};
pub use camera::{Camera, TileRectInclusive, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN};
pub use destinations::{
    load_destination_catalog, parse_destination_catalog, CatalogError, Destination, DestinationId,
    DestinationRecord, DestinationRegistry, DEFAULT_DESTINATION_RADIUS,
};
pub use objectives::{ObjectiveSession, VisitReport, DEFAULT_OBJECTIVE_COUNT};
pub use spawn::{find_start_tile, start_position};
pub use tile_grid::{
    load_map_metadata, parse_map_metadata, CollisionPolicy, MapLoadError, MapMetadata, TileGrid,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or `None` for zero / non-finite input.
    pub fn normalized(self) -> Option<Vec2> {
        let length = self.length();
        if !length.is_finite() || length <= f32::EPSILON {
            return None;
        }
        Some(Vec2 {
            x: self.x / length,
            y: self.y / length,
        })
    }

    pub fn distance(self, other: Vec2) -> f32 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
        .length()
    }
}

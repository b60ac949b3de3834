use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// What to do when `collision_grid_data` is absent or empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Refuse to load the map.
    #[default]
    Strict,
    /// Treat every tile as walkable and log a warning.
    AllWalkable,
}

impl CollisionPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "all_walkable" | "all-walkable" => Some(Self::AllWalkable),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::AllWalkable => "all_walkable",
        }
    }
}

/// On-disk layout of `map_meta.json`, as produced by the tile slicing pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct MapMetadata {
    pub tile_pixel_width: u32,
    pub tile_pixel_height: u32,
    pub grid_width_in_tiles: u32,
    pub grid_height_in_tiles: u32,
    #[serde(default)]
    pub tile_filenames_grid: Vec<Vec<Option<String>>>,
    /// `0` is walkable, anything else is blocked.
    #[serde(default)]
    pub collision_grid_data: Option<Vec<Vec<u32>>>,
}

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read map metadata at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map metadata from {origin} at {json_path}: {source}")]
    Parse {
        origin: String,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tile size must be positive, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
    #[error("grid size must be positive, got {columns}x{rows} tiles")]
    ZeroGridSize { columns: u32, rows: u32 },
    #[error("tile_filenames_grid is empty")]
    EmptyTileTable,
    #[error("tile_filenames_grid has {actual} rows, expected {expected}")]
    TileRowCountMismatch { expected: usize, actual: usize },
    #[error("tile_filenames_grid row {row} has {actual} columns, expected {expected}")]
    TileColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("collision_grid_data is missing or empty and the collision policy is strict")]
    MissingCollisionGrid,
    #[error("collision_grid_data has {actual} rows, expected {expected}")]
    CollisionRowCountMismatch { expected: usize, actual: usize },
    #[error("collision_grid_data row {row} has {actual} columns, expected {expected}")]
    CollisionColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Immutable tile layout plus walkability, in row-major order.
///
/// World space is unscaled pixels with tile `(0, 0)` covering
/// `[0, tile_width) x [0, tile_height)`; y grows downward.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    rows: u32,
    tile_refs: Vec<Option<String>>,
    walkable: Vec<bool>,
}

impl TileGrid {
    pub fn new(
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        rows: u32,
        tile_refs: Vec<Option<String>>,
        walkable: Vec<bool>,
    ) -> Result<Self, MapLoadError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(MapLoadError::ZeroTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        if columns == 0 || rows == 0 {
            return Err(MapLoadError::ZeroGridSize { columns, rows });
        }
        let expected = columns as usize * rows as usize;
        if tile_refs.len() != expected {
            return Err(MapLoadError::TileRowCountMismatch {
                expected,
                actual: tile_refs.len(),
            });
        }
        if walkable.len() != expected {
            return Err(MapLoadError::CollisionRowCountMismatch {
                expected,
                actual: walkable.len(),
            });
        }
        Ok(Self {
            tile_width,
            tile_height,
            columns,
            rows,
            tile_refs,
            walkable,
        })
    }

    pub fn from_metadata(
        metadata: MapMetadata,
        policy: CollisionPolicy,
    ) -> Result<Self, MapLoadError> {
        let MapMetadata {
            tile_pixel_width,
            tile_pixel_height,
            grid_width_in_tiles: columns,
            grid_height_in_tiles: rows,
            tile_filenames_grid,
            collision_grid_data,
        } = metadata;

        if tile_pixel_width == 0 || tile_pixel_height == 0 {
            return Err(MapLoadError::ZeroTileSize {
                width: tile_pixel_width,
                height: tile_pixel_height,
            });
        }
        if columns == 0 || rows == 0 {
            return Err(MapLoadError::ZeroGridSize { columns, rows });
        }
        if tile_filenames_grid.is_empty() {
            return Err(MapLoadError::EmptyTileTable);
        }
        check_table_shape(&tile_filenames_grid, columns, rows).map_err(|shape| match shape {
            ShapeMismatch::Rows { expected, actual } => {
                MapLoadError::TileRowCountMismatch { expected, actual }
            }
            ShapeMismatch::Columns {
                row,
                expected,
                actual,
            } => MapLoadError::TileColumnCountMismatch {
                row,
                expected,
                actual,
            },
        })?;

        let walkable = match collision_grid_data.filter(|grid| !grid.is_empty()) {
            Some(grid) => {
                check_table_shape(&grid, columns, rows).map_err(|shape| match shape {
                    ShapeMismatch::Rows { expected, actual } => {
                        MapLoadError::CollisionRowCountMismatch { expected, actual }
                    }
                    ShapeMismatch::Columns {
                        row,
                        expected,
                        actual,
                    } => MapLoadError::CollisionColumnCountMismatch {
                        row,
                        expected,
                        actual,
                    },
                })?;
                grid.into_iter()
                    .flatten()
                    .map(|cell| cell == 0)
                    .collect::<Vec<_>>()
            }
            None => match policy {
                CollisionPolicy::Strict => return Err(MapLoadError::MissingCollisionGrid),
                CollisionPolicy::AllWalkable => {
                    warn!(
                        policy = policy.label(),
                        "collision_grid_missing_defaulting_to_walkable"
                    );
                    vec![true; columns as usize * rows as usize]
                }
            },
        };

        let tile_refs = tile_filenames_grid.into_iter().flatten().collect();
        Self::new(
            tile_pixel_width,
            tile_pixel_height,
            columns,
            rows,
            tile_refs,
            walkable,
        )
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn world_width(&self) -> f32 {
        self.columns as f32 * self.tile_width as f32
    }

    pub fn world_height(&self) -> f32 {
        self.rows as f32 * self.tile_height as f32
    }

    fn index_of(&self, tile_x: i64, tile_y: i64) -> Option<usize> {
        if tile_x < 0 || tile_y < 0 || tile_x >= self.columns as i64 || tile_y >= self.rows as i64
        {
            return None;
        }
        Some(tile_y as usize * self.columns as usize + tile_x as usize)
    }

    /// Out-of-bounds tiles are never walkable.
    pub fn is_walkable(&self, tile_x: i64, tile_y: i64) -> bool {
        self.index_of(tile_x, tile_y)
            .and_then(|index| self.walkable.get(index).copied())
            .unwrap_or(false)
    }

    pub fn column_at_world(&self, world_x: f32) -> i64 {
        (world_x / self.tile_width as f32).floor() as i64
    }

    pub fn row_at_world(&self, world_y: f32) -> i64 {
        (world_y / self.tile_height as f32).floor() as i64
    }

    pub fn tile_at_world(&self, world_x: f32, world_y: f32) -> (i64, i64) {
        (self.column_at_world(world_x), self.row_at_world(world_y))
    }

    pub fn tile_ref(&self, tile_x: i64, tile_y: i64) -> Option<&str> {
        self.index_of(tile_x, tile_y)
            .and_then(|index| self.tile_refs.get(index))
            .and_then(|entry| entry.as_deref())
    }

    pub fn tile_center_world(&self, tile_x: i64, tile_y: i64) -> Option<(f32, f32)> {
        self.index_of(tile_x, tile_y)?;
        Some((
            (tile_x as f32 + 0.5) * self.tile_width as f32,
            (tile_y as f32 + 0.5) * self.tile_height as f32,
        ))
    }

    pub fn blocked_tile_count(&self) -> usize {
        self.walkable.iter().filter(|walkable| !**walkable).count()
    }
}

enum ShapeMismatch {
    Rows {
        expected: usize,
        actual: usize,
    },
    Columns {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

fn check_table_shape<T>(table: &[Vec<T>], columns: u32, rows: u32) -> Result<(), ShapeMismatch> {
    if table.len() != rows as usize {
        return Err(ShapeMismatch::Rows {
            expected: rows as usize,
            actual: table.len(),
        });
    }
    for (row, cells) in table.iter().enumerate() {
        if cells.len() != columns as usize {
            return Err(ShapeMismatch::Columns {
                row,
                expected: columns as usize,
                actual: cells.len(),
            });
        }
    }
    Ok(())
}

pub fn parse_map_metadata(raw: &str, origin: &str) -> Result<MapMetadata, MapLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, MapMetadata>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        MapLoadError::Parse {
            origin: origin.to_string(),
            json_path,
            source: error.into_inner(),
        }
    })
}

/// Reads `map_meta.json` and builds the grid under `policy`.
pub fn load_map_metadata(path: &Path, policy: CollisionPolicy) -> Result<TileGrid, MapLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| MapLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = parse_map_metadata(&raw, &path.display().to_string())?;
    let grid = TileGrid::from_metadata(metadata, policy)?;
    info!(
        path = %path.display(),
        columns = grid.columns(),
        rows = grid.rows(),
        tile_width = grid.tile_width(),
        tile_height = grid.tile_height(),
        blocked_tiles = grid.blocked_tile_count(),
        "map_loaded"
    );
    Ok(grid)
}

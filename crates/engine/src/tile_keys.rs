use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileKeyError {
    #[error("tile reference must not be empty")]
    Empty,
    #[error("tile reference must be relative, found leading '/'")]
    LeadingSlash,
    #[error("tile reference must not contain '\\\\'")]
    Backslash,
    #[error("tile reference must not contain '..'")]
    ParentTraversal,
    #[error("tile reference must name a .png file")]
    NotPng,
}

/// Checks a `tile_filenames_grid` entry before it is joined onto the tiles
/// directory.
pub fn validate_tile_key(key: &str) -> Result<(), TileKeyError> {
    if key.is_empty() {
        return Err(TileKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(TileKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(TileKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(TileKeyError::ParentTraversal);
    }
    if !key.to_ascii_lowercase().ends_with(".png") {
        return Err(TileKeyError::NotPng);
    }
    Ok(())
}

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::Vec2;

pub const DEFAULT_DESTINATION_RADIUS: f32 = 30.0;
const DEFAULT_INFO_TEXT: &str = "No information available.";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationId(pub String);

/// One catalog entry as stored in `destinations.json`. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DestinationRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub world_x: Option<f32>,
    #[serde(default)]
    pub world_y: Option<f32>,
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub info_text: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read destination catalog at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse destination catalog from {origin} at {json_path}: {source}")]
    Parse {
        origin: String,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
    pub info_text: String,
    pub visited: bool,
    pub is_active_target: bool,
}

impl Destination {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Vec2,
        radius: f32,
        info_text: impl Into<String>,
    ) -> Self {
        Self {
            id: DestinationId(id.into()),
            name: name.into(),
            position,
            radius,
            info_text: info_text.into(),
            visited: false,
            is_active_target: false,
        }
    }

    pub fn mark_visited(&mut self) {
        self.visited = true;
        self.is_active_target = false;
    }

    pub fn set_active_target(&mut self, is_active: bool) {
        self.is_active_target = is_active;
    }
}

/// Destinations that have usable coordinates, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationRegistry {
    destinations: Vec<Destination>,
}

impl DestinationRegistry {
    /// Builds the registry, dropping entries without coordinates or with a
    /// duplicate id. Dropped entries are logged, never fatal.
    pub fn from_records(records: impl IntoIterator<Item = DestinationRecord>) -> Self {
        let mut seen_ids = HashSet::new();
        let mut destinations = Vec::new();
        let mut skipped = 0usize;

        for record in records {
            let (Some(world_x), Some(world_y)) = (record.world_x, record.world_y) else {
                warn!(
                    id = record.id.as_str(),
                    name = record.name.as_str(),
                    "destination_skipped_missing_coordinates"
                );
                skipped += 1;
                continue;
            };
            if !world_x.is_finite() || !world_y.is_finite() {
                warn!(
                    id = record.id.as_str(),
                    world_x, world_y, "destination_skipped_non_finite_coordinates"
                );
                skipped += 1;
                continue;
            }
            if !seen_ids.insert(record.id.clone()) {
                warn!(id = record.id.as_str(), "destination_skipped_duplicate_id");
                skipped += 1;
                continue;
            }

            let radius = match record.radius {
                Some(radius) if radius.is_finite() && radius > 0.0 => radius,
                Some(radius) => {
                    warn!(
                        id = record.id.as_str(),
                        radius,
                        default_radius = DEFAULT_DESTINATION_RADIUS,
                        "destination_radius_invalid_using_default"
                    );
                    DEFAULT_DESTINATION_RADIUS
                }
                None => DEFAULT_DESTINATION_RADIUS,
            };
            let info_text = record
                .info_text
                .unwrap_or_else(|| DEFAULT_INFO_TEXT.to_string());

            destinations.push(Destination::new(
                record.id,
                record.name,
                Vec2::new(world_x, world_y),
                radius,
                info_text,
            ));
        }

        info!(
            loaded = destinations.len(),
            skipped, "destination_registry_built"
        );
        Self { destinations }
    }

    pub fn from_destinations(destinations: Vec<Destination>) -> Self {
        Self { destinations }
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn find(&self, id: &str) -> Option<&Destination> {
        self.destinations
            .iter()
            .find(|destination| destination.id.0 == id)
    }

    pub(crate) fn into_destinations(self) -> Vec<Destination> {
        self.destinations
    }
}

pub fn parse_destination_catalog(
    raw: &str,
    origin: &str,
) -> Result<Vec<DestinationRecord>, CatalogError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, Vec<DestinationRecord>>(&mut deserializer).map_err(
        |error| {
            let json_path = error.path().to_string();
            CatalogError::Parse {
                origin: origin.to_string(),
                json_path,
                source: error.into_inner(),
            }
        },
    )
}

pub fn load_destination_catalog(path: &Path) -> Result<Vec<DestinationRecord>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_destination_catalog(&raw, &path.display().to_string())
}

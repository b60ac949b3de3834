use std::path::PathBuf;

use campus_engine::world::{
    load_destination_catalog, load_map_metadata, CollisionPolicy, DestinationRegistry,
};
use campus_engine::{resolve_app_paths, AppError, LoopConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{CampusScene, GameplayConfig};

const OBJECTIVE_COUNT_ENV_VAR: &str = "CAMPUS_OBJECTIVE_COUNT";
const SEED_ENV_VAR: &str = "CAMPUS_SEED";
const COLLISION_POLICY_ENV_VAR: &str = "CAMPUS_COLLISION_POLICY";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) tiles_dir: PathBuf,
}

/// Resolves paths, loads the map and catalog, and builds the scene. Any
/// failure here is fatal and happens before a window exists.
pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    info!("=== Campus Navigator Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        map_meta = %paths.map_meta_path.display(),
        destinations = %paths.destinations_path.display(),
        "startup"
    );

    let gameplay_config = gameplay_config_from_env(|var| std::env::var(var).ok());
    info!(
        objective_count = gameplay_config.objective_count,
        collision_policy = gameplay_config.collision_policy.label(),
        seed = ?gameplay_config.seed,
        "gameplay_config"
    );

    let grid = load_map_metadata(&paths.map_meta_path, gameplay_config.collision_policy)?;
    let records = load_destination_catalog(&paths.destinations_path)?;
    let registry = DestinationRegistry::from_records(records);
    let scene = CampusScene::new(grid, registry, gameplay_config);

    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(scene),
        tiles_dir: paths.tiles_dir,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Applies environment overrides on top of the defaults. Invalid values are
/// logged and ignored.
fn gameplay_config_from_env(lookup: impl Fn(&str) -> Option<String>) -> GameplayConfig {
    let mut config = GameplayConfig::default();

    if let Some(count) = parse_env(&lookup, OBJECTIVE_COUNT_ENV_VAR, |raw| {
        raw.parse::<usize>().ok()
    }) {
        config.objective_count = count;
    }
    if let Some(seed) = parse_env(&lookup, SEED_ENV_VAR, |raw| raw.parse::<u64>().ok()) {
        config.seed = Some(seed);
    }
    if let Some(policy) = parse_env(&lookup, COLLISION_POLICY_ENV_VAR, CollisionPolicy::parse) {
        config.collision_policy = policy;
    }
    config
}

fn parse_env<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(var)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(
            env_var = var,
            value = raw.as_str(),
            "env_override_invalid_using_default"
        );
    }
    parsed
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod tile_keys;
pub mod world;

pub use app::{
    apply_deadzone, run_app, AppError, InputAction, InputSnapshot, LoopConfig, PlayerView,
    Renderer, Scene, SceneCommand, SceneFrame, MOVEMENT_DEADZONE,
};
pub use tile_keys::{validate_tile_key, TileKeyError};

pub const ROOT_ENV_VAR: &str = "CAMPUS_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub tiles_dir: PathBuf,
    pub map_meta_path: PathBuf,
    pub destinations_path: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        let tiles_dir = assets_dir.join("tiles");
        Self {
            map_meta_path: tiles_dir.join("map_meta.json"),
            destinations_path: assets_dir.join("destinations.json"),
            root,
            assets_dir,
            tiles_dir,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "{env_var} is set but does not point to a valid project root: {path}\n\
A valid root contains assets/tiles/map_meta.json."
    )]
    InvalidEnvRoot {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error(
        "Could not find a project root above the executable directory {start_dir}\n\
or the working directory. Expected a directory containing assets/tiles/map_meta.json.\n\
Set {env_var} explicitly, for example: export {env_var}=\"/path/to/campus\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(Path::new(&value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            if let Some(found) = find_marked_ancestor(&exe_dir) {
                return Ok(found);
            }
            if let Some(found) = env::current_dir()
                .ok()
                .and_then(|cwd| find_marked_ancestor(&cwd))
            {
                return Ok(found);
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    path.join("assets")
        .join("tiles")
        .join("map_meta.json")
        .is_file()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_marker_requires_map_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!is_repo_marker(dir.path()));

        let tiles = dir.path().join("assets").join("tiles");
        fs::create_dir_all(&tiles).expect("mkdir");
        assert!(!is_repo_marker(dir.path()));

        fs::write(tiles.join("map_meta.json"), "{}").expect("write");
        assert!(is_repo_marker(dir.path()));
    }

    #[test]
    fn marked_ancestor_is_found_from_nested_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tiles = dir.path().join("assets").join("tiles");
        fs::create_dir_all(&tiles).expect("mkdir");
        fs::write(tiles.join("map_meta.json"), "{}").expect("write");
        let nested = dir.path().join("target").join("debug");
        fs::create_dir_all(&nested).expect("mkdir");

        let found = find_marked_ancestor(&nested).expect("root");
        assert_eq!(found, normalize_path(dir.path()));
    }

    #[test]
    fn app_paths_follow_asset_layout() {
        let paths = AppPaths::from_root(PathBuf::from("/campus"));
        assert_eq!(
            paths.map_meta_path,
            PathBuf::from("/campus/assets/tiles/map_meta.json")
        );
        assert_eq!(
            paths.destinations_path,
            PathBuf::from("/campus/assets/destinations.json")
        );
        assert_eq!(paths.tiles_dir, PathBuf::from("/campus/assets/tiles"));
    }
}

use std::process::ExitCode;

use campus_engine::run_app;
use tracing::error;

use super::bootstrap::{build_app, init_tracing};

pub(crate) fn run() -> ExitCode {
    init_tracing();

    let app = match build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run_app(app.config, app.scene, app.tiles_dir) {
        error!(error = %err, "app_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

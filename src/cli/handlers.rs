use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::config::{DriverConfig, ENV_HOME};
use crate::mode::{Mode, ModeSelector, RuntimePolicy};

use super::output::{format_checks, format_config, CheckStatus};

pub fn handle_show() -> i32 {
    let config = match DriverConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("contech-config: {}", e);
            return 1;
        }
    };

    let mode = match ModeSelector::select(&config) {
        Ok(mode) => Some(mode),
        Err(e) => {
            warn!("Mode does not resolve: {}", e);
            None
        }
    };

    print!("{}", format_config(&config, mode.as_ref()));
    0
}

pub fn handle_check() -> i32 {
    info!("Checking contech installation");

    let results = match DriverConfig::from_env() {
        Ok(config) => run_checks(&config),
        Err(e) => vec![(
            "Configuration".to_string(),
            CheckStatus::failed(e.to_string()).with_details(format!(
                "Set {} to the root of your contech directory",
                ENV_HOME
            )),
        )],
    };

    print!("{}", format_checks(&results));

    if results.iter().all(|(_, status)| status.passed) {
        0
    } else {
        1
    }
}

/// Runs every installation check against `config`.
pub fn run_checks(config: &DriverConfig) -> Vec<(String, CheckStatus)> {
    let mut results = Vec::new();

    results.push((
        "Configuration".to_string(),
        match config.validate() {
            Ok(()) => CheckStatus::passed("Environment parses"),
            Err(e) => CheckStatus::failed(e.to_string()),
        },
    ));

    results.push((
        "Installation root".to_string(),
        if config.home().is_dir() {
            CheckStatus::passed(config.home().display().to_string())
        } else {
            CheckStatus::failed(format!("{} is not a directory", config.home().display()))
                .with_details(format!("Check {}", ENV_HOME))
        },
    ));

    let mode = ModeSelector::select(config);
    results.push((
        "Mode".to_string(),
        match mode {
            Ok(ref mode) => CheckStatus::passed(mode.to_string()),
            Err(ref e) => CheckStatus::failed(e.to_string()),
        },
    ));

    let plugin = match mode {
        Ok(Mode::Hammer(_)) => config.hammer_plugin(),
        _ => config.contech_plugin(),
    };
    results.push(("Transform plugin".to_string(), file_check(&plugin)));

    if let Ok(ref mode) = mode {
        let status = match mode.runtime(config) {
            RuntimePolicy::ConventionalLink => {
                CheckStatus::passed("Not needed; hammer builds link without a runtime")
            }
            RuntimePolicy::FullRuntime(path) | RuntimePolicy::MarkerObject(path) => {
                file_check(&path)
            }
        };
        results.push(("Runtime".to_string(), status));
    }

    debug!(checks = results.len(), "Installation checks complete");
    results
}

fn file_check(path: &Path) -> CheckStatus {
    if path.is_file() {
        CheckStatus::passed(path.display().to_string())
    } else {
        CheckStatus::failed(format!("{} is missing", path.display()))
    }
}

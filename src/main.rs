use contech_driver::driver::{exit_code_for_error, Driver, DRIVER_FAILURE_EXIT_CODE};
use contech_driver::invocation::Language;
use contech_driver::tools::ProcessRunner;
use contech_driver::{init_from_env, passthrough, DriverConfig, ModeSelector, VERSION};

use std::env;
use std::ffi::OsString;
use std::sync::Arc;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = run().await;
    std::process::exit(exit_code);
}

async fn run() -> i32 {
    let mut argv = env::args_os();
    let program = argv.next().unwrap_or_default();
    let tokens: Vec<OsString> = argv.collect();

    init_from_env();
    debug!("contech-cc v{} starting", VERSION);

    let language = Language::from_program_name(&program);

    let config = match DriverConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("contech: {}", e);
            return DRIVER_FAILURE_EXIT_CODE;
        }
    };

    let mode = match ModeSelector::select(&config) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("contech: {}", e);
            return DRIVER_FAILURE_EXIT_CODE;
        }
    };

    let work_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("contech: cannot determine working directory: {}", e);
            return DRIVER_FAILURE_EXIT_CODE;
        }
    };

    let runner = Arc::new(ProcessRunner::new());

    // Tokens that are not valid UTF-8 cannot be classified; hand them to the compiler as-is.
    let utf8: Option<Vec<String>> = tokens.iter().map(|t| t.to_str().map(str::to_string)).collect();
    let Some(utf8) = utf8 else {
        debug!("Non UTF-8 argument; passing invocation through");
        return passthrough::forward(
            runner.as_ref(),
            config.compiler_for(language),
            &tokens,
            Some(work_dir.as_path()),
        )
        .await;
    };

    let driver = Driver::new(config, mode, runner, work_dir);
    match driver.run(language, &utf8).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("contech: {:#}", e);
            exit_code_for_error(&e)
        }
    }
}

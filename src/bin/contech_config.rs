use clap::Parser;
use contech_driver::cli::{handle_check, handle_show, CliArgs, Commands};
use contech_driver::util::logging::{self, LoggingConfig};
use contech_driver::VERSION;
use std::env;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("contech-config v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Show => handle_show(),
        Commands::Check => handle_check(),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        logging::parse_level(level_str).unwrap_or_else(|| {
            eprintln!(
                "Invalid log level '{}', defaulting to WARN. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            logging::DEFAULT_LEVEL
        })
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        env::var("CONTECH_LOG_LEVEL")
            .ok()
            .and_then(|v| logging::parse_level(&v))
            .unwrap_or(logging::DEFAULT_LEVEL)
    };

    logging::init_logging(LoggingConfig::with_level(level));
}

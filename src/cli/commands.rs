use clap::{Parser, Subcommand};

/// Inspect and check the contech compiler driver's configuration
#[derive(Parser, Debug)]
#[command(
    name = "contech-config",
    about = "Inspect and check the contech compiler driver's configuration",
    version,
    long_about = "contech-config shows the configuration contech-cc resolves from its \
                  environment and checks that the installation it points at is usable. \
                  contech-cc itself takes no options; every argument it receives belongs \
                  to the compiler."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Print the resolved configuration",
        long_about = "Prints the configuration contech-cc would use in this environment.\n\n\
                      Examples:\n  \
                      contech-config show\n  \
                      CONTECH_MODE=markonly contech-config show"
    )]
    Show,

    #[command(
        about = "Check that the installation is usable",
        long_about = "Checks the installation root, the transform plugin and the runtime for \
                      the selected mode. Exits with status 1 if any check fails.\n\n\
                      Examples:\n  \
                      contech-config check\n  \
                      CONTECH_MODE=hammer contech-config check"
    )]
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_subcommands() {
        let args = CliArgs::parse_from(["contech-config", "show"]);
        assert!(matches!(args.command, Commands::Show));

        let args = CliArgs::parse_from(["contech-config", "check"]);
        assert!(matches!(args.command, Commands::Check));
    }

    #[test]
    fn test_show_takes_no_format() {
        let result = CliArgs::try_parse_from(["contech-config", "show", "--format", "env"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["contech-config", "-v", "check"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["contech-config", "--log-level", "trace", "show"]);
        assert_eq!(args.log_level, Some("trace".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from(["contech-config", "-v", "-q", "check"]);
        assert!(result.is_err());
    }
}

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands};
pub use handlers::{handle_check, handle_show};
pub use output::CheckStatus;

//! Configuration management for the contech driver
//!
//! The driver takes no options of its own on the command line (every token belongs to the
//! compiler), so all configuration comes from environment variables.
//!
//! # Environment Variables
//!
//! - `CONTECH_HOME`: root of the contech installation - **required**
//! - `CONTECH_STATE_FILE`: shared state file - default: `$CONTECH_HOME/scripts/output/contechStateFile.temp`
//! - `CONTECH_MODE`: standard|markonly|minimal|hammer - default: "standard"
//! - `HAMMER_NAIL_FILE`: rule file for hammer mode - required in hammer mode
//! - `HAMMER_OPT_LEVEL`: optimization level for hammer mode - required in hammer mode
//! - `CONTECH_CC` / `CONTECH_CXX`: C and C++ compilers - default: "clang" / "clang++"
//! - `CONTECH_OPT`: transform tool - default: "opt"
//! - `CONTECH_BLOB_TARGET`: object format of the embedded state table - default: "elf64-x86-64"
//! - `CONTECH_KEEP_TEMPS`: keep intermediate files (true|false) - default: "false"
//! - `CONTECH_LOG_LEVEL`: logging level - default: "warn"
//!
//! # Example
//!
//! ```no_run
//! use contech_driver::{DriverConfig, ModeSelector};
//!
//! let config = DriverConfig::from_env()?;
//! let mode = ModeSelector::select(&config)?;
//! println!("{} mode, state file {}", mode, config.state_file.display());
//! # Ok::<(), contech_driver::ConfigError>(())
//! ```

use crate::embed::BlobTarget;
use crate::invocation::Language;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CC: &str = "clang";
const DEFAULT_CXX: &str = "clang++";
const DEFAULT_OPT: &str = "opt";
const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_KEEP_TEMPS: bool = false;

/// State file location relative to the installation root
const DEFAULT_STATE_FILE: &str = "scripts/output/contechStateFile.temp";

const PLUGIN_DIR: &str = "llvm_fe_3.2/build/Release+Asserts/lib";
const CONTECH_PLUGIN: &str = "LLVMContech.so";
const HAMMER_PLUGIN: &str = "LLVMHammer.so";
const RUNTIME_BITCODE: &str = "common/runtime/ct_runtime.bc";
const RUNTIME_MARKER: &str = "common/runtime/ct_runtime.o";

pub const ENV_HOME: &str = "CONTECH_HOME";
pub const ENV_STATE_FILE: &str = "CONTECH_STATE_FILE";
pub const ENV_MODE: &str = "CONTECH_MODE";
pub const ENV_HAMMER_NAIL_FILE: &str = "HAMMER_NAIL_FILE";
pub const ENV_HAMMER_OPT_LEVEL: &str = "HAMMER_OPT_LEVEL";
pub const ENV_CC: &str = "CONTECH_CC";
pub const ENV_CXX: &str = "CONTECH_CXX";
pub const ENV_OPT: &str = "CONTECH_OPT";
pub const ENV_BLOB_TARGET: &str = "CONTECH_BLOB_TARGET";
pub const ENV_KEEP_TEMPS: &str = "CONTECH_KEEP_TEMPS";
pub const ENV_LOG_LEVEL: &str = "CONTECH_LOG_LEVEL";

/// Configuration errors
///
/// All of these are fatal and are reported before any external tool runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Root installation not specified
    #[error("Could not find contech installation. Set CONTECH_HOME to the root of your contech directory.")]
    MissingHome,

    /// Hammer mode without one of its required values
    #[error("Hammer mode requires {0} to be set")]
    MissingHammerValue(&'static str),

    /// Unknown instrumentation mode
    #[error("Invalid mode: {0}. Valid options: standard, markonly, minimal, hammer")]
    InvalidMode(String),

    /// Unknown object format for the state table
    #[error("Invalid blob target: {0}. Valid options: elf64-x86-64, elf32-i386, elf64-littleaarch64")]
    InvalidBlobTarget(String),

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Resolved driver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Root of the contech installation
    pub home: PathBuf,

    /// Shared state file handed to every transform invocation
    pub state_file: PathBuf,

    /// Requested instrumentation mode, resolved by [`crate::ModeSelector`]
    pub mode: Option<String>,

    /// Hammer rule file
    pub hammer_nail_file: Option<PathBuf>,

    /// Hammer optimization level, passed through as given
    pub hammer_opt_level: Option<String>,

    pub cc: String,
    pub cxx: String,
    pub opt: String,

    /// Object format of the embedded state table
    pub blob_target: BlobTarget,

    /// Keep intermediate IR and link artifacts
    pub keep_temps: bool,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl DriverConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let home = get(ENV_HOME)
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingHome)?;

        let state_file = get(ENV_STATE_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(DEFAULT_STATE_FILE));

        let blob_target = match get(ENV_BLOB_TARGET) {
            Some(name) => name
                .parse::<BlobTarget>()
                .map_err(|_| ConfigError::InvalidBlobTarget(name))?,
            None => BlobTarget::default(),
        };

        let keep_temps = get(ENV_KEEP_TEMPS)
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_KEEP_TEMPS);

        let log_level = get(ENV_LOG_LEVEL)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Ok(Self {
            home,
            state_file,
            mode: get(ENV_MODE),
            hammer_nail_file: get(ENV_HAMMER_NAIL_FILE).map(PathBuf::from),
            hammer_opt_level: get(ENV_HAMMER_OPT_LEVEL),
            cc: get(ENV_CC).unwrap_or_else(|| DEFAULT_CC.to_string()),
            cxx: get(ENV_CXX).unwrap_or_else(|| DEFAULT_CXX.to_string()),
            opt: get(ENV_OPT).unwrap_or_else(|| DEFAULT_OPT.to_string()),
            blob_target,
            keep_temps,
            log_level,
        })
    }

    /// A configuration rooted at `home` with every other value at its default.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            state_file: home.join(DEFAULT_STATE_FILE),
            home,
            mode: None,
            hammer_nail_file: None,
            hammer_opt_level: None,
            cc: DEFAULT_CC.to_string(),
            cxx: DEFAULT_CXX.to_string(),
            opt: DEFAULT_OPT.to_string(),
            blob_target: BlobTarget::default(),
            keep_temps: DEFAULT_KEEP_TEMPS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Validates the configuration
    ///
    /// Mode-specific requirements are checked by [`crate::ModeSelector::select`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.state_file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "State file path is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Compiler used for the given language variant.
    pub fn compiler_for(&self, language: Language) -> &str {
        match language {
            Language::C => &self.cc,
            Language::Cpp => &self.cxx,
        }
    }

    pub fn plugin_dir(&self) -> PathBuf {
        self.home.join(PLUGIN_DIR)
    }

    pub fn contech_plugin(&self) -> PathBuf {
        self.plugin_dir().join(CONTECH_PLUGIN)
    }

    pub fn hammer_plugin(&self) -> PathBuf {
        self.plugin_dir().join(HAMMER_PLUGIN)
    }

    /// Full runtime, linked as bitcode.
    pub fn runtime_bitcode(&self) -> PathBuf {
        self.home.join(RUNTIME_BITCODE)
    }

    /// Lightweight runtime for mark-only builds.
    pub fn runtime_marker(&self) -> PathBuf {
        self.home.join(RUNTIME_MARKER)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

impl fmt::Display for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contech Configuration:")?;
        writeln!(f, "  Home: {}", self.home.display())?;
        writeln!(f, "  State File: {}", self.state_file.display())?;
        writeln!(f, "  Mode: {}", self.mode.as_deref().unwrap_or("standard"))?;
        if let Some(ref nail) = self.hammer_nail_file {
            writeln!(f, "  Hammer Nail File: {}", nail.display())?;
        }
        if let Some(ref level) = self.hammer_opt_level {
            writeln!(f, "  Hammer Opt Level: {}", level)?;
        }
        writeln!(f, "  C Compiler: {}", self.cc)?;
        writeln!(f, "  C++ Compiler: {}", self.cxx)?;
        writeln!(f, "  Transform Tool: {}", self.opt)?;
        writeln!(f, "  Blob Target: {}", self.blob_target)?;
        writeln!(f, "  Keep Temps: {}", self.keep_temps)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

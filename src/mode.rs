//! Instrumentation modes and how each one shapes the build.
//!
//! A [`Mode`] is resolved once, up front, by [`ModeSelector::select`]. Everything that differs
//! between modes (which plugin the transform tool loads, the flags it gets, the runtime linked
//! into the executable and whether the state table is embedded) is answered by the mode, so
//! the pipeline stages never branch on configuration themselves.

use crate::config::{ConfigError, DriverConfig, ENV_HAMMER_NAIL_FILE, ENV_HAMMER_OPT_LEVEL};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Values hammer mode cannot run without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HammerSettings {
    pub nail_file: PathBuf,
    pub opt_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Full instrumentation with the complete runtime.
    Standard,
    /// Marks code regions only; links the lightweight marker runtime.
    MarkOnly,
    /// Reduced instrumentation with the complete runtime.
    Minimal,
    /// Hammer rules, no runtime and a conventional link.
    Hammer(HammerSettings),
}

/// Mode names without their settings, as spelled in `CONTECH_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Standard,
    MarkOnly,
    Minimal,
    Hammer,
}

impl FromStr for ModeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(ModeKind::Standard),
            "markonly" | "mark-only" | "mark_only" => Ok(ModeKind::MarkOnly),
            "minimal" => Ok(ModeKind::Minimal),
            "hammer" => Ok(ModeKind::Hammer),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// What gets linked in front of the program's objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimePolicy {
    /// Complete runtime, as bitcode for link-time optimization.
    FullRuntime(PathBuf),
    /// Marker object only.
    MarkerObject(PathBuf),
    /// No runtime; an ordinary link.
    ConventionalLink,
}

impl RuntimePolicy {
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            RuntimePolicy::FullRuntime(path) | RuntimePolicy::MarkerObject(path) => Some(path),
            RuntimePolicy::ConventionalLink => None,
        }
    }
}

/// Plugin and flags for one transform invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSpec {
    pub plugin: PathBuf,
    pub args: Vec<OsString>,
}

impl TransformSpec {
    /// The `-load=<plugin>` argument.
    pub fn load_arg(&self) -> OsString {
        let mut arg = OsString::from("-load=");
        arg.push(&self.plugin);
        arg
    }
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Standard => ModeKind::Standard,
            Mode::MarkOnly => ModeKind::MarkOnly,
            Mode::Minimal => ModeKind::Minimal,
            Mode::Hammer(_) => ModeKind::Hammer,
        }
    }

    /// Whether the final link carries the state table object.
    pub fn embeds_state(&self) -> bool {
        !matches!(self, Mode::Hammer(_))
    }

    pub fn runtime(&self, config: &DriverConfig) -> RuntimePolicy {
        match self {
            Mode::Standard | Mode::Minimal => RuntimePolicy::FullRuntime(config.runtime_bitcode()),
            Mode::MarkOnly => RuntimePolicy::MarkerObject(config.runtime_marker()),
            Mode::Hammer(_) => RuntimePolicy::ConventionalLink,
        }
    }

    /// Transform invocation shape rewriting `input` into `output`, numbering code regions
    /// through `state`.
    pub fn transform(
        &self,
        config: &DriverConfig,
        input: &Path,
        output: &Path,
        state: &Path,
    ) -> TransformSpec {
        let mut args: Vec<OsString> = Vec::new();

        match self {
            Mode::Hammer(settings) => {
                args.push("-Hammer".into());
                args.push(input.into());
                args.push("-o".into());
                args.push(output.into());
                args.push("-HammerState".into());
                args.push(state.into());
                args.push("-HammerNailFile".into());
                args.push(settings.nail_file.as_os_str().to_owned());
                args.push("-HammerOptLevel".into());
                args.push(settings.opt_level.as_str().into());

                TransformSpec {
                    plugin: config.hammer_plugin(),
                    args,
                }
            }
            _ => {
                args.push("-Contech".into());
                args.push(input.into());
                args.push("-o".into());
                args.push(output.into());
                args.push("-ContechState".into());
                args.push(state.into());
                match self {
                    Mode::MarkOnly => args.push("-ContechMarkFE".into()),
                    Mode::Minimal => args.push("-ContechMinimal".into()),
                    _ => {}
                }

                TransformSpec {
                    plugin: config.contech_plugin(),
                    args,
                }
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Standard => write!(f, "standard"),
            Mode::MarkOnly => write!(f, "markonly"),
            Mode::Minimal => write!(f, "minimal"),
            Mode::Hammer(_) => write!(f, "hammer"),
        }
    }
}

/// Resolves the instrumentation mode from configuration.
pub struct ModeSelector;

impl ModeSelector {
    /// Picks the mode named by the configuration, `standard` when none is named.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidMode`] for an unknown name, and
    /// [`ConfigError::MissingHammerValue`] when hammer mode lacks its rule file or
    /// optimization level.
    pub fn select(config: &DriverConfig) -> Result<Mode, ConfigError> {
        let kind = match config.mode.as_deref() {
            Some(name) => name.parse::<ModeKind>()?,
            None => ModeKind::Standard,
        };

        Ok(match kind {
            ModeKind::Standard => Mode::Standard,
            ModeKind::MarkOnly => Mode::MarkOnly,
            ModeKind::Minimal => Mode::Minimal,
            ModeKind::Hammer => {
                let nail_file = config
                    .hammer_nail_file
                    .clone()
                    .ok_or(ConfigError::MissingHammerValue(ENV_HAMMER_NAIL_FILE))?;
                let opt_level = config
                    .hammer_opt_level
                    .clone()
                    .ok_or(ConfigError::MissingHammerValue(ENV_HAMMER_OPT_LEVEL))?;
                Mode::Hammer(HammerSettings {
                    nail_file,
                    opt_level,
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn config_with_mode(mode: Option<&str>) -> DriverConfig {
        let mut config = DriverConfig::with_home("/opt/contech");
        config.mode = mode.map(str::to_string);
        config
    }

    fn hammer() -> Mode {
        Mode::Hammer(HammerSettings {
            nail_file: PathBuf::from("/rules/nails.txt"),
            opt_level: "3".to_string(),
        })
    }

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[parameterized(
        default = { None, ModeKind::Standard },
        standard = { Some("standard"), ModeKind::Standard },
        markonly = { Some("markonly"), ModeKind::MarkOnly },
        mark_only = { Some("Mark-Only"), ModeKind::MarkOnly },
        minimal = { Some("MINIMAL"), ModeKind::Minimal },
    )]
    fn test_select(mode: Option<&str>, expected: ModeKind) {
        let selected = ModeSelector::select(&config_with_mode(mode)).unwrap();
        assert_eq!(selected.kind(), expected);
    }

    #[test]
    fn test_unknown_mode() {
        let result = ModeSelector::select(&config_with_mode(Some("turbo")));
        assert!(matches!(result, Err(ConfigError::InvalidMode(name)) if name == "turbo"));
    }

    #[test]
    fn test_hammer_requires_nail_file() {
        let mut config = config_with_mode(Some("hammer"));
        config.hammer_opt_level = Some("2".to_string());

        let result = ModeSelector::select(&config);
        assert!(matches!(
            result,
            Err(ConfigError::MissingHammerValue(ENV_HAMMER_NAIL_FILE))
        ));
    }

    #[test]
    fn test_hammer_requires_opt_level() {
        let mut config = config_with_mode(Some("hammer"));
        config.hammer_nail_file = Some(PathBuf::from("/rules/nails.txt"));

        let result = ModeSelector::select(&config);
        assert!(matches!(
            result,
            Err(ConfigError::MissingHammerValue(ENV_HAMMER_OPT_LEVEL))
        ));
    }

    #[test]
    fn test_hammer_with_both_values() {
        let mut config = config_with_mode(Some("hammer"));
        config.hammer_nail_file = Some(PathBuf::from("/rules/nails.txt"));
        config.hammer_opt_level = Some("3".to_string());

        assert_eq!(ModeSelector::select(&config).unwrap(), hammer());
    }

    #[test]
    fn test_runtime_policy_per_mode() {
        let config = DriverConfig::with_home("/opt/contech");

        assert_eq!(
            Mode::Standard.runtime(&config),
            RuntimePolicy::FullRuntime(config.runtime_bitcode())
        );
        assert_eq!(
            Mode::Minimal.runtime(&config),
            RuntimePolicy::FullRuntime(config.runtime_bitcode())
        );
        assert_eq!(
            Mode::MarkOnly.runtime(&config),
            RuntimePolicy::MarkerObject(config.runtime_marker())
        );
        assert_eq!(hammer().runtime(&config), RuntimePolicy::ConventionalLink);
        assert!(hammer().runtime(&config).artifact().is_none());
    }

    #[test]
    fn test_only_hammer_skips_state_embedding() {
        assert!(Mode::Standard.embeds_state());
        assert!(Mode::MarkOnly.embeds_state());
        assert!(Mode::Minimal.embeds_state());
        assert!(!hammer().embeds_state());
    }

    #[test]
    fn test_standard_transform_shape() {
        let config = DriverConfig::with_home("/opt/contech");
        let transform = Mode::Standard.transform(
            &config,
            Path::new("foo.bc"),
            Path::new("foo_ct.bc"),
            Path::new("/tmp/state"),
        );

        assert_eq!(transform.plugin, config.contech_plugin());
        assert_eq!(
            transform.load_arg().to_string_lossy(),
            format!("-load={}", config.contech_plugin().display())
        );
        assert_eq!(
            strings(&transform.args),
            vec!["-Contech", "foo.bc", "-o", "foo_ct.bc", "-ContechState", "/tmp/state"]
        );
    }

    #[parameterized(
        markonly = { Mode::MarkOnly, "-ContechMarkFE" },
        minimal = { Mode::Minimal, "-ContechMinimal" },
    )]
    fn test_variant_flag_is_appended(mode: Mode, flag: &str) {
        let config = DriverConfig::with_home("/opt/contech");
        let transform = mode.transform(
            &config,
            Path::new("a.bc"),
            Path::new("a_ct.bc"),
            Path::new("s"),
        );
        assert_eq!(strings(&transform.args).last().map(String::as_str), Some(flag));
        assert_eq!(transform.plugin, config.contech_plugin());
    }

    #[test]
    fn test_hammer_transform_shape() {
        let config = DriverConfig::with_home("/opt/contech");
        let transform = hammer().transform(
            &config,
            Path::new("foo.bc"),
            Path::new("foo_ct.bc"),
            Path::new("/tmp/state"),
        );

        assert_eq!(transform.plugin, config.hammer_plugin());
        assert_eq!(
            strings(&transform.args),
            vec![
                "-Hammer",
                "foo.bc",
                "-o",
                "foo_ct.bc",
                "-HammerState",
                "/tmp/state",
                "-HammerNailFile",
                "/rules/nails.txt",
                "-HammerOptLevel",
                "3"
            ]
        );
    }

    #[test]
    fn test_display_names_parse_back() {
        for mode in [Mode::Standard, Mode::MarkOnly, Mode::Minimal, hammer()] {
            let kind: ModeKind = mode.to_string().parse().unwrap();
            assert_eq!(kind, mode.kind());
        }
    }
}

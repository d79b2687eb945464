//! Mutable state shared by the stages of one build.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::DriverConfig;
use crate::invocation::CompileInvocation;
use crate::mode::Mode;
use crate::state::{StateFile, StateSegment};
use crate::tools::{ToolInvocation, ToolRunner};

use super::artifacts::{UnitArtifacts, BASE_FLAG};
use super::stage::StageStatus;

/// Everything a stage reads, plus what earlier stages produced.
pub struct BuildContext<'a> {
    pub config: &'a DriverConfig,
    pub mode: &'a Mode,
    pub runner: &'a dyn ToolRunner,
    pub invocation: &'a CompileInvocation,

    /// Directory every tool runs in and intermediates are written to
    pub work_dir: PathBuf,

    /// Present when the invocation names a source file
    pub unit: Option<UnitArtifacts>,

    /// Objects for the final link: the caller's, then the one this build produced
    pub objects: Vec<PathBuf>,

    /// Relocatable object carrying the state table, once embedded
    pub state_object: Option<PathBuf>,

    /// Bytes of the state file appended by this build's transform
    pub state_segment: Option<StateSegment>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        config: &'a DriverConfig,
        mode: &'a Mode,
        runner: &'a dyn ToolRunner,
        invocation: &'a CompileInvocation,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        let unit = invocation
            .source
            .as_deref()
            .map(|source| UnitArtifacts::for_source(source, invocation.output.as_deref()));

        Self {
            config,
            mode,
            runner,
            invocation,
            work_dir: work_dir.into(),
            unit,
            objects: invocation.objects.clone(),
            state_object: None,
            state_segment: None,
        }
    }

    pub fn unit(&self) -> Result<&UnitArtifacts> {
        self.unit
            .as_ref()
            .context("No source file was classified for this invocation")
    }

    /// Compiler for the invocation's language.
    pub fn compiler(&self) -> &str {
        self.config.compiler_for(self.invocation.language)
    }

    /// The base flag followed by the caller's unrecognized flags, in order.
    pub fn compile_flags(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(BASE_FLAG).chain(self.invocation.flags.iter().map(String::as_str))
    }

    /// `path` as seen from the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }

    pub fn state_file(&self) -> StateFile {
        StateFile::new(self.resolve(&self.config.state_file))
    }

    /// A tool invocation rooted in the working directory.
    pub fn tool(&self, program: &str) -> ToolInvocation {
        ToolInvocation::new(program).current_dir(&self.work_dir)
    }

    /// Runs `invocation` and turns its exit status into a stage outcome.
    pub async fn run(&self, invocation: &ToolInvocation) -> Result<StageStatus> {
        debug!(command = %invocation, "Running tool");

        let status = self
            .runner
            .run(invocation)
            .await
            .with_context(|| format!("Failed to start {}", invocation.program().to_string_lossy()))?;

        if status.success() {
            Ok(StageStatus::Continue)
        } else {
            Ok(StageStatus::Failed(status.code()))
        }
    }

    /// Deletes generated files unless temporaries are being kept.
    ///
    /// Removal failures are logged and otherwise ignored.
    pub fn remove_temporaries<'p>(&self, paths: impl IntoIterator<Item = &'p Path>) {
        if self.config.keep_temps {
            return;
        }

        for path in paths {
            let path = self.resolve(path);
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed temporary"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temporary"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{ArgumentClassifier, Language};
    use crate::tools::RecordingRunner;
    use tempfile::TempDir;

    #[test]
    fn test_context_derives_unit_and_objects() {
        let config = DriverConfig::with_home("/opt/contech");
        let runner = RecordingRunner::new();
        let invocation =
            ArgumentClassifier::new(Language::C).classify(&["-O2", "foo.c", "util.o", "-o", "app"]);

        let ctx = BuildContext::new(&config, &Mode::Standard, &runner, &invocation, "/work");

        let unit = ctx.unit().unwrap();
        assert_eq!(unit.object, PathBuf::from("app.o"));
        assert_eq!(ctx.objects, vec![PathBuf::from("util.o")]);
        assert_eq!(ctx.compiler(), "clang");
        assert_eq!(ctx.compile_flags().collect::<Vec<_>>(), vec!["-flto", "-O2"]);
        assert_eq!(ctx.resolve(Path::new("foo.bc")), PathBuf::from("/work/foo.bc"));
        assert_eq!(ctx.resolve(Path::new("/abs/x")), PathBuf::from("/abs/x"));
    }

    #[test]
    fn test_context_without_source() {
        let config = DriverConfig::with_home("/opt/contech");
        let runner = RecordingRunner::new();
        let invocation = ArgumentClassifier::new(Language::Cpp).classify(&["a.o", "b.o"]);

        let ctx = BuildContext::new(&config, &Mode::Standard, &runner, &invocation, "/work");

        assert!(ctx.unit().is_err());
        assert_eq!(ctx.compiler(), "clang++");
    }

    #[tokio::test]
    async fn test_run_maps_exit_status() {
        let dir = TempDir::new().unwrap();
        let config = DriverConfig::with_home("/opt/contech");
        let runner = RecordingRunner::new().fail_call(1, 2);
        let invocation = CompileInvocation::default();
        let ctx = BuildContext::new(&config, &Mode::Standard, &runner, &invocation, dir.path());

        assert_eq!(
            ctx.run(&ctx.tool("clang")).await.unwrap(),
            StageStatus::Continue
        );
        assert_eq!(
            ctx.run(&ctx.tool("clang")).await.unwrap(),
            StageStatus::Failed(2)
        );
    }

    #[test]
    fn test_remove_temporaries_respects_keep_temps() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo.bc"), b"").unwrap();

        let mut config = DriverConfig::with_home("/opt/contech");
        config.keep_temps = true;
        let runner = RecordingRunner::new();
        let invocation = CompileInvocation::default();

        let ctx = BuildContext::new(&config, &Mode::Standard, &runner, &invocation, dir.path());
        ctx.remove_temporaries([Path::new("foo.bc")]);
        assert!(dir.path().join("foo.bc").exists());

        config.keep_temps = false;
        let ctx = BuildContext::new(&config, &Mode::Standard, &runner, &invocation, dir.path());
        ctx.remove_temporaries([Path::new("foo.bc"), Path::new("missing.bc")]);
        assert!(!dir.path().join("foo.bc").exists());
    }
}

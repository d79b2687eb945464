//! CLI integration tests
//!
//! These run the real `contech-cc` and `contech-config` binaries against fake compiler and
//! transform tools (small shell scripts) to verify:
//! - Configuration errors and their exit codes
//! - Passthrough exit codes
//! - Files produced by a full compile and link
//! - Installation checks

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const FAKE_COMPILER: &str = r#"#!/bin/sh
echo "cc $*" >> "$FAKE_LOG"
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then : > "$a"; fi
  prev="$a"
done
exit ${FAKE_EXIT:-0}
"#;

const FAKE_TRANSFORM: &str = r#"#!/bin/sh
echo "opt $*" >> "$FAKE_LOG"
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then : > "$a"; fi
  if [ "$prev" = "-ContechState" ] || [ "$prev" = "-HammerState" ]; then printf 'abcd' >> "$a"; fi
  prev="$a"
done
exit 0
"#;

/// A scratch build directory with fake tools and an isolated environment.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        write_script(&bin.join("fake-cc"), FAKE_COMPILER);
        write_script(&bin.join("fake-opt"), FAKE_TRANSFORM);
        fs::create_dir_all(dir.path().join("home")).unwrap();
        fs::create_dir_all(dir.path().join("work")).unwrap();
        Self { dir }
    }

    fn work(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    fn state_file(&self) -> PathBuf {
        self.dir.path().join("state/contechStateFile.temp")
    }

    fn log(&self) -> String {
        fs::read_to_string(self.dir.path().join("tools.log")).unwrap_or_default()
    }

    fn command(&self, binary: &str) -> Command {
        let bin = self.dir.path().join("bin");
        let mut cmd = Command::new(binary);
        cmd.current_dir(self.work())
            .env("CONTECH_HOME", self.dir.path().join("home"))
            .env("CONTECH_STATE_FILE", self.state_file())
            .env("CONTECH_CC", bin.join("fake-cc"))
            .env("CONTECH_CXX", bin.join("fake-cc"))
            .env("CONTECH_OPT", bin.join("fake-opt"))
            .env("FAKE_LOG", self.dir.path().join("tools.log"))
            .env_remove("CONTECH_MODE")
            .env_remove("CONTECH_KEEP_TEMPS")
            .env_remove("CONTECH_BLOB_TARGET")
            .env_remove("CONTECH_LOG_LEVEL")
            .env_remove("HAMMER_NAIL_FILE")
            .env_remove("HAMMER_OPT_LEVEL")
            .env_remove("RUST_LOG");
        cmd
    }

    fn cc(&self) -> Command {
        self.command(env!("CARGO_BIN_EXE_contech-cc"))
    }

    fn config(&self) -> Command {
        self.command(env!("CARGO_BIN_EXE_contech-config"))
    }
}

fn write_script(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to execute binary")
}

#[test]
fn test_missing_home_is_fatal() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.cc().env_remove("CONTECH_HOME").args(["-c", "foo.c"]));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("contech: "));
    assert!(stderr.contains("CONTECH_HOME"));
    assert!(sandbox.log().is_empty());
}

#[test]
fn test_hammer_without_settings_runs_no_tool() {
    let sandbox = Sandbox::new();

    let output = run(sandbox
        .cc()
        .env("CONTECH_MODE", "hammer")
        .env("HAMMER_OPT_LEVEL", "2")
        .args(["-c", "foo.c"]));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("HAMMER_NAIL_FILE"));
    assert!(sandbox.log().is_empty());
}

#[test]
fn test_unknown_mode_is_fatal() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.cc().env("CONTECH_MODE", "turbo").arg("--version"));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("turbo"));
    assert!(sandbox.log().is_empty());
}

#[test]
fn test_passthrough_returns_compiler_exit_code() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.cc().env("FAKE_EXIT", "3").args(["-c", "foo.s"]));

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(sandbox.log().trim(), "cc -c foo.s");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_compile_only() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.cc().args(["-O2", "-c", "foo.c"]));

    assert!(output.status.success(), "{:?}", output);
    assert!(output.stderr.is_empty());
    assert!(sandbox.work().join("foo.o").exists());
    assert!(!sandbox.work().join("foo.bc").exists());
    assert_eq!(fs::metadata(sandbox.state_file()).unwrap().len(), 4);

    let log = sandbox.log();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "cc -flto -O2 foo.c -emit-llvm -c -o foo.bc");
    assert!(lines[1].starts_with("opt -load="));
    assert_eq!(lines[2], "cc -flto -O2 -c -o foo.o foo_ct.bc");
}

#[test]
fn test_compile_and_link() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.cc().args(["main.c", "-o", "app"]));

    assert!(output.status.success(), "{:?}", output);
    assert!(sandbox.work().join("app").exists());
    assert!(sandbox.work().join("app.o").exists());
    assert!(!sandbox.work().join("contech_state.o").exists());
    assert!(!sandbox.work().join("contech.bin").exists());

    let log = sandbox.log();
    let link = log.lines().last().unwrap();
    assert!(link.contains("common/runtime/ct_runtime.bc app.o -flto -o app -flto -lpthread -lz"));
    assert!(link.ends_with("contech_state.o"));
}

#[test]
fn test_failing_frontend_stops_build() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.cc().env("FAKE_EXIT", "2").args(["-c", "foo.c"]));

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(sandbox.log().lines().count(), 1);
    assert!(!sandbox.state_file().exists());
}

#[test]
fn test_config_show() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.config().arg("show"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!(
        "  Home: {}",
        sandbox.dir.path().join("home").display()
    )));
    assert!(stdout.contains("  Mode: standard"));
    assert!(stdout.contains("Embeds State: true"));
}

#[test]
fn test_config_check_fails_on_empty_installation() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.config().arg("check"));

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Installation Check"));
    assert!(stdout.contains("\u{2717} Transform plugin"));
}

#[test]
fn test_config_help() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.config().arg("--help"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("show"));
    assert!(stdout.contains("check"));
}

#[test]
fn test_linker_map_passes_through() {
    let sandbox = Sandbox::new();

    let output = run(sandbox.cc().args(["main.o", "-Wl,-Map,out.map", "-o", "app"]));

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(sandbox.log().trim(), "cc main.o -Wl,-Map,out.map -o app");
    assert!(!sandbox.work().join("contech_state.o").exists());
}

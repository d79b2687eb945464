use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::command::ToolInvocation;
use super::runner::{ToolError, ToolRunner, ToolStatus};

const STATE_FLAGS: &[&str] = &["-ContechState", "-HammerState"];
const DEFAULT_REGIONS_PER_UNIT: u32 = 3;

/// A [`ToolRunner`] that records invocations instead of spawning processes.
///
/// Unless told to fail, each call behaves like a well-mannered tool: the file named after `-o`
/// is created, and a transform invocation appends freshly numbered region identifiers (little
/// endian `u32`, continuing from the state file's current count) to the state file it was
/// handed.
pub struct RecordingRunner {
    calls: Mutex<Vec<ToolInvocation>>,
    failures: Mutex<HashMap<usize, i32>>,
    regions_per_unit: u32,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            regions_per_unit: DEFAULT_REGIONS_PER_UNIT,
        }
    }

    /// Number of identifiers each transform invocation assigns.
    pub fn with_regions_per_unit(mut self, regions: u32) -> Self {
        self.regions_per_unit = regions;
        self
    }

    /// Makes the `index`-th call (zero based) exit with `code` without side effects.
    pub fn fail_call(self, index: usize, code: i32) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(index, code);
        }
        self
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn resolve(invocation: &ToolInvocation, path: &Path) -> PathBuf {
        match invocation.cwd() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn simulate(&self, invocation: &ToolInvocation) -> std::io::Result<()> {
        for flag in STATE_FLAGS {
            if let Some(state) = invocation.value_after(flag) {
                let state = Self::resolve(invocation, Path::new(state));
                let existing = fs::metadata(&state).map(|m| m.len()).unwrap_or(0) / 4;
                let mut file = OpenOptions::new().create(true).append(true).open(&state)?;
                for id in existing..existing + u64::from(self.regions_per_unit) {
                    file.write_all(&(id as u32).to_le_bytes())?;
                }
            }
        }

        if let Some(output) = invocation.value_after("-o") {
            let output = Self::resolve(invocation, Path::new(output));
            fs::write(&output, invocation.to_string())?;
        }

        Ok(())
    }
}

#[async_trait]
impl ToolRunner for RecordingRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolStatus, ToolError> {
        let index = {
            let mut calls = self.calls.lock().map_err(|_| ToolError::Spawn {
                program: invocation.program().to_string_lossy().into_owned(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "recording runner lock poisoned"),
            })?;
            calls.push(invocation.clone());
            calls.len() - 1
        };

        let failure = self
            .failures
            .lock()
            .ok()
            .and_then(|f| f.get(&index).copied());
        if let Some(code) = failure {
            return Ok(ToolStatus::from_code(code));
        }

        self.simulate(invocation).map_err(|source| ToolError::Spawn {
            program: invocation.program().to_string_lossy().into_owned(),
            source,
        })?;

        Ok(ToolStatus::SUCCESS)
    }
}

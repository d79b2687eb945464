use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Executable name when the invocation names none.
pub const DEFAULT_EXECUTABLE: &str = "a.out";

/// Flag every compiler invocation carries ahead of the caller's flags.
pub const BASE_FLAG: &str = "-flto";

/// Trailing arguments of the final link, required by the runtime.
pub const LINK_TAIL: [&str; 3] = ["-flto", "-lpthread", "-lz"];

const IR_SUFFIX: &str = ".bc";
const INSTRUMENTED_SUFFIX: &str = "_ct.bc";
const OBJECT_EXTENSION: &str = "o";

/// Files produced for the translation unit being compiled.
///
/// The intermediate names derive from the source's file stem and live in the working
/// directory; the object follows the requested output when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitArtifacts {
    pub source: PathBuf,
    /// Front-end output.
    pub ir: PathBuf,
    /// Transform output.
    pub instrumented_ir: PathBuf,
    pub object: PathBuf,
}

impl UnitArtifacts {
    pub fn for_source(source: &Path, output: Option<&Path>) -> Self {
        let stem = source.file_stem().unwrap_or_else(|| source.as_os_str());

        let object = match output {
            Some(out) => out.with_extension(OBJECT_EXTENSION),
            None => PathBuf::from(suffixed(stem, ".o")),
        };

        Self {
            source: source.to_path_buf(),
            ir: PathBuf::from(suffixed(stem, IR_SUFFIX)),
            instrumented_ir: PathBuf::from(suffixed(stem, INSTRUMENTED_SUFFIX)),
            object,
        }
    }

    /// The two IR files, which are removed once the object exists.
    pub fn intermediates(&self) -> [&Path; 2] {
        [&self.ir, &self.instrumented_ir]
    }
}

fn suffixed(stem: &OsStr, suffix: &str) -> OsString {
    let mut name = stem.to_os_string();
    name.push(suffix);
    name
}

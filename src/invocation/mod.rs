//! Structured view of a compiler command line
//!
//! [`CompileInvocation`] is what the driver understands of an invocation: a source file, the
//! objects to link, the output name and a handful of control flags. Every other token lives in
//! [`CompileInvocation::flags`], untouched and in order, and is forwarded to every compiler
//! stage.

pub mod classifier;

pub use classifier::ArgumentClassifier;

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Source language variant, which decides between the C and C++ compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    C,
    Cpp,
}

impl Language {
    /// Initial language implied by the name the driver was invoked under.
    ///
    /// `contech-c++`, `contech-cxx` and `contech-cpp` start in C++ mode, anything else in C.
    pub fn from_program_name(program: &OsStr) -> Self {
        let name = Path::new(program)
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with("++") || name.ends_with("xx") || name.ends_with("pp") {
            Language::Cpp
        } else {
            Language::C
        }
    }

    pub fn is_cpp(self) -> bool {
        self == Language::Cpp
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "C"),
            Language::Cpp => write!(f, "C++"),
        }
    }
}

/// A classified compiler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileInvocation {
    /// The single source file this invocation compiles, if any.
    pub source: Option<PathBuf>,

    /// Objects named on the command line, in order.
    pub objects: Vec<PathBuf>,

    /// Output name from `-o`, `-o<name>` or `-Wl,-o,<name>`.
    pub output: Option<PathBuf>,

    /// Unrecognized tokens, verbatim and in original order.
    pub flags: Vec<String>,

    /// `-c` was given.
    pub compile_only: bool,

    /// A dependency-generation option (`-M...`) was given.
    pub dependency_only: bool,

    pub language: Language,
}

impl CompileInvocation {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Default::default()
        }
    }

    /// Only dependency output was requested, nothing is actually compiled.
    pub fn is_dependency_scan(&self) -> bool {
        self.dependency_only && !self.compile_only
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}

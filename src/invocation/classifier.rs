//! Token-stream classifier for compiler command lines.
//!
//! The classifier is a two-state machine. In `Idle` each token is matched against the
//! recognized patterns in a fixed order; `-o` moves it to `ExpectOutputValue`, where the next
//! token is taken as the output name no matter what it looks like. Linker option lists
//! (`-Wl,a,b,c`) are scanned with their own nested state that ends with the list.
//!
//! Pattern order in `Idle`:
//!
//! 1. `-o` exactly
//! 2. anything containing `-M` (dependency generation, including `-Wl,-Map,...`)
//! 3. `-Wl,...` linker list (also forwarded verbatim)
//! 4. `-o<name>`
//! 5. `*.cpp`, `*.cc`, `*.c` source
//! 6. `*.o` object
//! 7. `-c`
//! 8. everything else, forwarded verbatim

use std::path::PathBuf;
use tracing::debug;

use super::{CompileInvocation, Language};

pub const OUTPUT_FLAG: &str = "-o";
pub const COMPILE_ONLY_FLAG: &str = "-c";
pub const DEPENDENCY_MARKER: &str = "-M";
pub const LINKER_LIST_PREFIX: &str = "-Wl,";
pub const OBJECT_EXTENSION: &str = ".o";

const CPP_EXTENSIONS: &[&str] = &[".cpp", ".cc"];
const C_EXTENSIONS: &[&str] = &[".c"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    ExpectOutputValue,
}

/// Turns a raw token list into a [`CompileInvocation`].
#[derive(Debug, Clone, Copy)]
pub struct ArgumentClassifier {
    language: Language,
}

impl ArgumentClassifier {
    /// `language` is the variant assumed until a source extension says otherwise.
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn classify<S: AsRef<str>>(&self, tokens: &[S]) -> CompileInvocation {
        let mut invocation = CompileInvocation::new(self.language);
        let mut state = ScanState::Idle;

        for token in tokens {
            let token = token.as_ref();
            state = match state {
                ScanState::ExpectOutputValue => {
                    invocation.output = Some(PathBuf::from(token));
                    ScanState::Idle
                }
                ScanState::Idle => Self::step(token, &mut invocation),
            };
        }

        // A trailing -o has no value; let the compiler complain about it.
        if state == ScanState::ExpectOutputValue {
            invocation.flags.push(OUTPUT_FLAG.to_string());
        }

        debug!(
            source = ?invocation.source,
            output = ?invocation.output,
            objects = invocation.objects.len(),
            flags = invocation.flags.len(),
            compile_only = invocation.compile_only,
            dependency_only = invocation.dependency_only,
            language = %invocation.language,
            "Classified invocation"
        );

        invocation
    }

    fn step(token: &str, invocation: &mut CompileInvocation) -> ScanState {
        if token == OUTPUT_FLAG {
            return ScanState::ExpectOutputValue;
        }

        if token.contains(DEPENDENCY_MARKER) {
            invocation.dependency_only = true;
            return ScanState::Idle;
        }

        if token.starts_with(LINKER_LIST_PREFIX) {
            Self::scan_linker_list(token, invocation);
            invocation.flags.push(token.to_string());
            return ScanState::Idle;
        }

        if let Some(name) = token.strip_prefix(OUTPUT_FLAG) {
            invocation.output = Some(PathBuf::from(name));
            return ScanState::Idle;
        }

        if let Some(language) = source_language(token) {
            if invocation.source.is_none() {
                invocation.source = Some(PathBuf::from(token));
                invocation.language = language;
            } else {
                debug!(token, "Additional source file forwarded unclassified");
                invocation.flags.push(token.to_string());
            }
            return ScanState::Idle;
        }

        if token.ends_with(OBJECT_EXTENSION) {
            invocation.objects.push(PathBuf::from(token));
            return ScanState::Idle;
        }

        if token == COMPILE_ONLY_FLAG {
            invocation.compile_only = true;
            return ScanState::Idle;
        }

        invocation.flags.push(token.to_string());
        ScanState::Idle
    }

    /// Looks for `-o,<name>` inside a comma-joined linker list. An output name recorded
    /// elsewhere takes precedence.
    fn scan_linker_list(token: &str, invocation: &mut CompileInvocation) {
        let mut state = ScanState::Idle;

        for sub in token.split(',').skip(1) {
            state = match state {
                ScanState::ExpectOutputValue => {
                    if invocation.output.is_none() {
                        invocation.output = Some(PathBuf::from(sub));
                    }
                    ScanState::Idle
                }
                ScanState::Idle if sub == OUTPUT_FLAG => ScanState::ExpectOutputValue,
                ScanState::Idle => ScanState::Idle,
            };
        }
    }
}

fn source_language(token: &str) -> Option<Language> {
    if CPP_EXTENSIONS.iter().any(|ext| token.ends_with(ext)) {
        Some(Language::Cpp)
    } else if C_EXTENSIONS.iter().any(|ext| token.ends_with(ext)) {
        Some(Language::C)
    } else {
        None
    }
}

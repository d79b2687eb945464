//! Embedding the build's state table into the final executable.
//!
//! The runtime finds the table through the symbols `objcopy -I binary` would generate for a
//! file named `contech.bin`, so the object is laid out the same way: the raw bytes in `.data`,
//! bracketed by `_start` and `_end` symbols, plus an absolute `_size` symbol.

use crate::state::{StateError, StateFile};
use object::write::{Object as ObjectWriter, StandardSection, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SymbolFlags, SymbolKind, SymbolScope};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// File the state table is copied to before embedding; its name determines the symbol names.
pub const STATE_SNAPSHOT: &str = "contech.bin";

/// Relocatable object carrying the state table.
pub const STATE_OBJECT: &str = "contech_state.o";

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("Failed to build state table object")]
    Object(#[from] object::write::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Object format of the embedded state table, named like BFD targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobTarget {
    #[default]
    Elf64X86_64,
    Elf32I386,
    Elf64Aarch64,
}

impl BlobTarget {
    pub const ALL: [BlobTarget; 3] = [
        BlobTarget::Elf64X86_64,
        BlobTarget::Elf32I386,
        BlobTarget::Elf64Aarch64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlobTarget::Elf64X86_64 => "elf64-x86-64",
            BlobTarget::Elf32I386 => "elf32-i386",
            BlobTarget::Elf64Aarch64 => "elf64-littleaarch64",
        }
    }

    pub fn architecture(self) -> Architecture {
        match self {
            BlobTarget::Elf64X86_64 => Architecture::X86_64,
            BlobTarget::Elf32I386 => Architecture::I386,
            BlobTarget::Elf64Aarch64 => Architecture::Aarch64,
        }
    }
}

impl FromStr for BlobTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlobTarget::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for BlobTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `_binary_<name>` with every character outside `[A-Za-z0-9_]` replaced by `_`.
fn symbol_stem(file_name: &str) -> String {
    let mangled: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("_binary_{}", mangled)
}

/// Builds a relocatable object holding `bytes`, with symbols named after `file_name`.
pub fn blob_object(
    bytes: &[u8],
    file_name: &str,
    target: BlobTarget,
) -> Result<Vec<u8>, EmbedError> {
    let mut obj = ObjectWriter::new(BinaryFormat::Elf, target.architecture(), Endianness::Little);
    let data = obj.section_id(StandardSection::Data);
    let offset = obj.append_section_data(data, bytes, 1);
    let len = bytes.len() as u64;
    let stem = symbol_stem(file_name);

    // Untyped (STT_NOTYPE) like objcopy's; the ELF writer rejects defined `Unknown` symbols.
    let mut define = |suffix: &str, value: u64, section: SymbolSection| {
        obj.add_symbol(Symbol {
            name: format!("{}_{}", stem, suffix).into_bytes(),
            value,
            size: 0,
            kind: SymbolKind::Label,
            scope: SymbolScope::Dynamic,
            weak: false,
            section,
            flags: SymbolFlags::None,
        });
    };

    define("start", offset, SymbolSection::Section(data));
    define("end", offset + len, SymbolSection::Section(data));
    define("size", len, SymbolSection::Absolute);

    Ok(obj.write()?)
}

/// Turns the state file into a linkable object in the build's working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateBlobEmbedder {
    target: BlobTarget,
}

impl StateBlobEmbedder {
    pub fn new(target: BlobTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> BlobTarget {
        self.target
    }

    /// Snapshots `state` to `contech.bin` in `work_dir` and writes `contech_state.o` next to
    /// it, returning the object's path.
    ///
    /// # Errors
    ///
    /// Fails when the state file does not exist, which means no translation unit of this build
    /// was instrumented.
    pub fn embed(&self, state: &StateFile, work_dir: &Path) -> Result<PathBuf, EmbedError> {
        let snapshot = work_dir.join(STATE_SNAPSHOT);
        let bytes = state.snapshot_to(&snapshot)?;

        let object = blob_object(&bytes, STATE_SNAPSHOT, self.target)?;
        let object_path = work_dir.join(STATE_OBJECT);
        fs::write(&object_path, object).map_err(|source| EmbedError::Io {
            path: object_path.clone(),
            source,
        })?;

        info!(
            bytes = bytes.len(),
            target = %self.target,
            object = %object_path.display(),
            "Embedded state table"
        );
        debug!(snapshot = %snapshot.display(), "State snapshot kept for link");
        Ok(object_path)
    }
}

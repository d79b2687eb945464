use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// One external tool invocation: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// The argument immediately following `flag`, if `flag` appears.
    pub fn value_after(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }

    pub fn contains_arg(&self, arg: impl AsRef<OsStr>) -> bool {
        let arg = arg.as_ref();
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let inv = ToolInvocation::new("clang")
            .arg("-c")
            .args(["-o", "foo.o"])
            .arg(Path::new("foo.c"))
            .current_dir("/work");

        assert_eq!(inv.program(), OsStr::new("clang"));
        assert_eq!(inv.get_args().len(), 4);
        assert_eq!(inv.cwd(), Some(Path::new("/work")));
        assert_eq!(inv.value_after("-o"), Some(OsStr::new("foo.o")));
        assert!(inv.contains_arg("foo.c"));
        assert!(!inv.contains_arg("bar.c"));
    }

    #[test]
    fn test_value_after_missing_or_trailing() {
        let inv = ToolInvocation::new("clang").arg("-o");
        assert_eq!(inv.value_after("-o"), None);
        assert_eq!(inv.value_after("-c"), None);
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let inv = ToolInvocation::new("clang").args(["-I", "my dir", "", "-c"]);
        assert_eq!(inv.to_string(), "clang -I 'my dir' '' -c");
    }
}

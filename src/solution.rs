//! `Solution`: a user's source/binary/captured-output path bundle, plus the
//! freshness check and compile entry point.
//!
//! Grounded on `original_source/src/solution.{h,cpp}` (`IsUpdated`,
//! `Compile`, `GetLastModifiedTime`).

use std::path::{Path, PathBuf};

use crate::compiler;
use crate::result::CompilationResult;
use crate::Result;

#[derive(Clone, Debug)]
pub struct Solution {
    source: PathBuf,
    binary: PathBuf,
    output: PathBuf,
}

impl Solution {
    pub fn new(source: PathBuf, binary: PathBuf, output: PathBuf) -> Solution {
        Solution { source, binary, output }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// `true` iff the binary exists and its mtime is no older than the
    /// source's, i.e. the same freshness test `compile` itself uses.
    pub fn is_up_to_date(&self) -> Result<bool> {
        compiler::is_up_to_date(&self.source, &self.binary)
    }

    /// Compile `self.source` into `self.binary` with `compiler`/`options`.
    pub fn compile(&self, compiler_name: &str, options: &[String]) -> Result<CompilationResult> {
        compiler::compile(&self.source, &self.binary, compiler_name, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn is_up_to_date_reflects_mtimes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.c");
        let binary = dir.path().join("main");
        let output = dir.path().join("main.out");

        std::fs::write(&source, "int main(){}").unwrap();
        let solution = Solution::new(source.clone(), binary.clone(), output);
        assert!(!solution.is_up_to_date().unwrap());

        sleep(Duration::from_millis(10));
        std::fs::write(&binary, "binary").unwrap();
        assert!(solution.is_up_to_date().unwrap());
    }
}

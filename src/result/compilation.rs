//! `CompilationResult`: outcome of one compiler invocation.
//!
//! Grounded on `original_source/src/result/compilation_result.h`'s
//! `CompilationResult -> {CompilationSuccess -> CompilationTargetUpToDate,
//! CompilationFailure -> CompilationSourceNotExist}` hierarchy, flattened
//! into a single enum.

use std::path::{Path, PathBuf};

/// Shared attributes of every compilation outcome.
#[derive(Clone, Debug)]
pub struct CompilationInfo {
    pub message: String,
    pub command: String,
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Clone, Debug)]
pub enum CompilationResult {
    /// Compiler exited zero and produced (or refreshed) the target binary.
    Success(CompilationInfo),
    /// The target was already newer than the source; no compiler was run.
    TargetUpToDate(CompilationInfo),
    /// The source file does not exist.
    SourceNotExist(CompilationInfo),
    /// The compiler ran and exited non-zero, or could not be execed/duped.
    Failure(CompilationInfo),
}

impl CompilationResult {
    pub fn success(message: String, command: String, source: &Path, target: &Path) -> CompilationResult {
        CompilationResult::Success(info(message, command, source, target))
    }

    pub fn target_up_to_date(message: String, command: String, source: &Path, target: &Path) -> CompilationResult {
        CompilationResult::TargetUpToDate(info(message, command, source, target))
    }

    pub fn source_not_exist(message: String, command: String, source: &Path, target: &Path) -> CompilationResult {
        CompilationResult::SourceNotExist(info(message, command, source, target))
    }

    pub fn failure(message: String, command: String, source: &Path, target: &Path) -> CompilationResult {
        CompilationResult::Failure(info(message, command, source, target))
    }

    pub fn info(&self) -> &CompilationInfo {
        match self {
            CompilationResult::Success(i)
            | CompilationResult::TargetUpToDate(i)
            | CompilationResult::SourceNotExist(i)
            | CompilationResult::Failure(i) => i,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompilationResult::Success(_) | CompilationResult::TargetUpToDate(_))
    }
}

fn info(message: String, command: String, source: &Path, target: &Path) -> CompilationInfo {
    CompilationInfo {
        message,
        command,
        source: source.to_path_buf(),
        target: target.to_path_buf(),
    }
}

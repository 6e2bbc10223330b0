//! `ExecutionResult`: outcome of running one compiled binary against one
//! test case's input.
//!
//! Grounded on `original_source/src/result/execution_result.h`'s full leaf
//! set (`ExecutionFailureTimeout`, `...MemoryLimitExceeded`,
//! `...BadAlloc`/`OutofRange`/`LengthError`/`InvalidArgument`,
//! `...SegmentationFault`/`Abort`/`Interrupt`/`Termination`/`Kill`), flattened
//! into a single enum whose factory dispatches on `exit_status::Classification`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::exit_status::Classification;

/// Resource usage captured from a terminated child's `rusage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceUsage {
    pub user_cpu_time: Duration,
    pub system_cpu_time: Duration,
    pub peak_rss_kb: i64,
}

impl ResourceUsage {
    pub fn from_rusage(usage: &libc::rusage) -> ResourceUsage {
        ResourceUsage {
            user_cpu_time: timeval_to_duration(usage.ru_utime),
            system_cpu_time: timeval_to_duration(usage.ru_stime),
            peak_rss_kb: usage.ru_maxrss,
        }
    }

    pub fn cpu_time(&self) -> Duration {
        self.user_cpu_time + self.system_cpu_time
    }
}

fn timeval_to_duration(tv: libc::timeval) -> Duration {
    Duration::new(tv.tv_sec.max(0) as u64, (tv.tv_usec.max(0) as u32) * 1000)
}

/// Shared attributes of every execution outcome.
#[derive(Clone, Debug)]
pub struct ExecutionInfo {
    pub program: PathBuf,
    pub input: String,
    pub output: String,
    pub usage: ResourceUsage,
}

#[derive(Clone, Debug)]
pub enum ExecutionResult {
    Success(ExecutionInfo),

    ProgramNotExist(ExecutionInfo),
    InputNotExist(ExecutionInfo),

    Timeout(ExecutionInfo),
    MemoryLimitExceeded(ExecutionInfo),

    BadAlloc(ExecutionInfo),
    OutOfRange(ExecutionInfo),
    LengthError(ExecutionInfo),
    InvalidArgument(ExecutionInfo),
    Exception(ExecutionInfo),

    SegmentationFault(ExecutionInfo),
    Abort(ExecutionInfo),
    Interrupt(ExecutionInfo),
    Termination(ExecutionInfo),
    Kill(ExecutionInfo),
    Signaled(ExecutionInfo),

    /// Natural non-zero exit, not one of the above.
    Failure(ExecutionInfo),
}

impl ExecutionResult {
    pub fn info(&self) -> &ExecutionInfo {
        use ExecutionResult::*;
        match self {
            Success(i) | ProgramNotExist(i) | InputNotExist(i) | Timeout(i)
            | MemoryLimitExceeded(i) | BadAlloc(i) | OutOfRange(i) | LengthError(i)
            | InvalidArgument(i) | Exception(i) | SegmentationFault(i) | Abort(i)
            | Interrupt(i) | Termination(i) | Kill(i) | Signaled(i) | Failure(i) => i,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success(_))
    }

    pub fn output(&self) -> &str {
        &self.info().output
    }
}

/// Build an `ExecutionResult` from a decoded wait-status classification and
/// the captured payload.
///
/// A bare `SegmentationFault` is reclassified as `MemoryLimitExceeded` when
/// `memory_limit_mb` was non-zero: the child's custom SIGSEGV handler does
/// not survive `execve`, so the kernel's default SIGSEGV action is what
/// actually terminates a process that grows past `RLIMIT_AS`, indistinguishable
/// at the signal level from a genuine null-pointer dereference. See
/// SPEC_FULL.md §4.B/§4.G/§9 and `DESIGN.md` for the full rationale.
pub fn execution_result_of(
    classification: Classification,
    program: &Path,
    input: String,
    output: String,
    usage: ResourceUsage,
    memory_limit_mb: i64,
) -> ExecutionResult {
    let info = ExecutionInfo {
        program: program.to_path_buf(),
        input,
        output,
        usage,
    };

    match classification {
        Classification::Success => ExecutionResult::Success(info),
        Classification::ExecutionProgramNotExist => ExecutionResult::ProgramNotExist(info),
        Classification::ExecutionInputNotExist => ExecutionResult::InputNotExist(info),
        Classification::Timeout => ExecutionResult::Timeout(info),
        Classification::OutOfMemory => ExecutionResult::MemoryLimitExceeded(info),
        Classification::ExceptionBadAlloc => ExecutionResult::BadAlloc(info),
        Classification::ExceptionOutOfRange => ExecutionResult::OutOfRange(info),
        Classification::ExceptionLengthError => ExecutionResult::LengthError(info),
        Classification::ExceptionInvalidArgument => ExecutionResult::InvalidArgument(info),
        Classification::Exception => ExecutionResult::Exception(info),
        Classification::SegmentationFault => {
            if memory_limit_mb != 0 {
                ExecutionResult::MemoryLimitExceeded(info)
            } else {
                ExecutionResult::SegmentationFault(info)
            }
        }
        Classification::Abort => ExecutionResult::Abort(info),
        Classification::Interrupt => ExecutionResult::Interrupt(info),
        Classification::Termination => ExecutionResult::Termination(info),
        Classification::Kill => ExecutionResult::Kill(info),
        Classification::Signaled(_) => ExecutionResult::Signaled(info),
        Classification::Failure(_) => ExecutionResult::Failure(info),
        Classification::ExecutionExecFailure | Classification::ExecutionDupFailure => {
            ExecutionResult::Failure(info)
        }
        Classification::CompilationTargetUpToDate
        | Classification::CompilationSourceNotExist
        | Classification::CompilationExecFailure
        | Classification::CompilationDupFailure => ExecutionResult::Failure(info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_usage() -> ResourceUsage {
        ResourceUsage::default()
    }

    #[test]
    fn segfault_without_memory_limit_stays_segfault() {
        let result = execution_result_of(
            Classification::SegmentationFault,
            Path::new("/bin/prog"),
            String::new(),
            String::new(),
            zero_usage(),
            0,
        );
        assert!(matches!(result, ExecutionResult::SegmentationFault(_)));
    }

    #[test]
    fn segfault_with_memory_limit_becomes_mle() {
        let result = execution_result_of(
            Classification::SegmentationFault,
            Path::new("/bin/prog"),
            String::new(),
            String::new(),
            zero_usage(),
            256,
        );
        assert!(matches!(result, ExecutionResult::MemoryLimitExceeded(_)));
    }

    #[test]
    fn success_round_trips_output_bytes() {
        let result = execution_result_of(
            Classification::Success,
            Path::new("/bin/prog"),
            "1 2 3".to_string(),
            "6".to_string(),
            zero_usage(),
            0,
        );
        assert_eq!(result.output(), "6");
        assert!(result.is_success());
    }
}

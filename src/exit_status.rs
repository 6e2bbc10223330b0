//! Sentinel exit-code codec.
//!
//! The child signals its own classified fate by exiting with a reserved code
//! rather than relying solely on signals, since a custom signal handler does
//! not survive `execve` (see `subprocess` module docs). `decode` additionally
//! classifies natural exits and terminating signals into the same taxonomy.

use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;

/// A sentinel value a child may exit with to report a classified outcome
/// that cannot (or should not) be expressed by its natural exit code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i32)]
pub enum Sentinel {
    Success = 0,
    Failure = 1,

    OutOfMemory = 100,
    Timeout = 101,

    Exception = 110,
    ExceptionBadAlloc = 111,
    ExceptionOutOfRange = 112,
    ExceptionLengthError = 113,
    ExceptionInvalidArgument = 114,

    CompilationTargetUpToDate = 120,
    CompilationSourceNotExist = 121,
    CompilationExecFailure = 122,
    CompilationDupFailure = 123,

    ExecutionProgramNotExist = 130,
    ExecutionInputNotExist = 131,
    ExecutionExecFailure = 132,
    ExecutionDupFailure = 133,
}

impl Sentinel {
    fn from_code(code: i32) -> Option<Sentinel> {
        use Sentinel::*;
        let value = match code {
            0 => Success,
            100 => OutOfMemory,
            101 => Timeout,
            110 => Exception,
            111 => ExceptionBadAlloc,
            112 => ExceptionOutOfRange,
            113 => ExceptionLengthError,
            114 => ExceptionInvalidArgument,
            120 => CompilationTargetUpToDate,
            121 => CompilationSourceNotExist,
            122 => CompilationExecFailure,
            123 => CompilationDupFailure,
            130 => ExecutionProgramNotExist,
            131 => ExecutionInputNotExist,
            132 => ExecutionExecFailure,
            133 => ExecutionDupFailure,
            _ => return None,
        };
        Some(value)
    }

    /// Encode this sentinel as the exit code a child should call
    /// `std::process::exit` with.
    pub fn encode(self) -> i32 {
        self as i32
    }
}

/// The result of classifying a terminated child's wait status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    Success,
    /// Natural non-zero exit, not a recognised sentinel.
    Failure(i32),

    Timeout,
    OutOfMemory,

    Exception,
    ExceptionBadAlloc,
    ExceptionOutOfRange,
    ExceptionLengthError,
    ExceptionInvalidArgument,

    CompilationTargetUpToDate,
    CompilationSourceNotExist,
    CompilationExecFailure,
    CompilationDupFailure,

    ExecutionProgramNotExist,
    ExecutionInputNotExist,
    ExecutionExecFailure,
    ExecutionDupFailure,

    SegmentationFault,
    Abort,
    Interrupt,
    Termination,
    Kill,
    /// Terminated by a signal with no dedicated variant above.
    Signaled(Signal),
}

/// Decode a terminated child's [`WaitStatus`] into a [`Classification`].
///
/// Exit-code classification is attempted before signal classification; a
/// sentinel match takes precedence over treating the code as a natural exit.
pub fn decode(status: &WaitStatus) -> Classification {
    match status {
        WaitStatus::Exited(_, code) => match Sentinel::from_code(*code) {
            Some(Sentinel::Success) => Classification::Success,
            Some(Sentinel::OutOfMemory) => Classification::OutOfMemory,
            Some(Sentinel::Timeout) => Classification::Timeout,
            Some(Sentinel::Exception) => Classification::Exception,
            Some(Sentinel::ExceptionBadAlloc) => Classification::ExceptionBadAlloc,
            Some(Sentinel::ExceptionOutOfRange) => Classification::ExceptionOutOfRange,
            Some(Sentinel::ExceptionLengthError) => Classification::ExceptionLengthError,
            Some(Sentinel::ExceptionInvalidArgument) => Classification::ExceptionInvalidArgument,
            Some(Sentinel::CompilationTargetUpToDate) => Classification::CompilationTargetUpToDate,
            Some(Sentinel::CompilationSourceNotExist) => Classification::CompilationSourceNotExist,
            Some(Sentinel::CompilationExecFailure) => Classification::CompilationExecFailure,
            Some(Sentinel::CompilationDupFailure) => Classification::CompilationDupFailure,
            Some(Sentinel::ExecutionProgramNotExist) => Classification::ExecutionProgramNotExist,
            Some(Sentinel::ExecutionInputNotExist) => Classification::ExecutionInputNotExist,
            Some(Sentinel::ExecutionExecFailure) => Classification::ExecutionExecFailure,
            Some(Sentinel::ExecutionDupFailure) => Classification::ExecutionDupFailure,
            Some(Sentinel::Failure) | None => {
                if *code == 0 {
                    Classification::Success
                } else {
                    Classification::Failure(*code)
                }
            }
        },
        WaitStatus::Signaled(_, signal, _) => match *signal {
            // The itimer armed before exec outlives it; SIGALRM's default
            // disposition after exec is to terminate, so a bare SIGALRM is
            // exactly the timeout condition even though the handler installed
            // pre-exec never survives to fire again.
            Signal::SIGALRM => Classification::Timeout,
            Signal::SIGSEGV => Classification::SegmentationFault,
            Signal::SIGABRT => Classification::Abort,
            Signal::SIGINT => Classification::Interrupt,
            Signal::SIGTERM => Classification::Termination,
            Signal::SIGKILL => Classification::Kill,
            other => Classification::Signaled(other),
        },
        _ => Classification::Failure(-1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    fn exited(code: i32) -> WaitStatus {
        WaitStatus::Exited(Pid::from_raw(1), code)
    }

    fn signaled(sig: Signal) -> WaitStatus {
        WaitStatus::Signaled(Pid::from_raw(1), sig, false)
    }

    #[test]
    fn sentinel_round_trips_through_decode() {
        assert_eq!(decode(&exited(Sentinel::Timeout.encode())), Classification::Timeout);
        assert_eq!(decode(&exited(Sentinel::OutOfMemory.encode())), Classification::OutOfMemory);
        assert_eq!(
            decode(&exited(Sentinel::ExceptionBadAlloc.encode())),
            Classification::ExceptionBadAlloc
        );
    }

    #[test]
    fn natural_exit_zero_is_success() {
        assert_eq!(decode(&exited(0)), Classification::Success);
    }

    #[test]
    fn natural_nonzero_exit_is_failure() {
        assert_eq!(decode(&exited(7)), Classification::Failure(7));
    }

    #[test]
    fn sigalrm_classifies_as_timeout() {
        assert_eq!(decode(&signaled(Signal::SIGALRM)), Classification::Timeout);
    }

    #[test]
    fn sigsegv_classifies_as_segfault() {
        assert_eq!(decode(&signaled(Signal::SIGSEGV)), Classification::SegmentationFault);
    }

    #[test]
    fn unmapped_signal_falls_back_to_generic_variant() {
        assert_eq!(
            decode(&signaled(Signal::SIGUSR1)),
            Classification::Signaled(Signal::SIGUSR1)
        );
    }
}

//! Executor: run one compiled binary against one test case's input through
//! [`Subprocess`], capturing stdout and resource usage.
//!
//! Grounded on `original_source/src/offline_judge.cpp`'s `Execute`/
//! `ExecuteWithFile`; `judge/src/engine/mod.rs`'s `execute_judgee` for the
//! idiom of redirecting the judgee's stdin from a real file and capturing
//! stdout.

use std::io::Write;
use std::path::Path;

use crate::exit_status::{self, Classification};
use crate::fd::{self, FileDescriptor};
use crate::result::execution::{execution_result_of, ExecutionResult, ResourceUsage};
use crate::subprocess::{Redirections, ResourceLimits, Subprocess};
use crate::Result;

/// Run `program` with `input` wired to its stdin, under the given CPU-time
/// (seconds + microseconds) and memory (MB) limits. If `output_file` is
/// given, the captured stdout is also written there (this resolves the open
/// question in SPEC_FULL.md §9: "write if `output_file` is provided" is
/// taken as intended, rather than the original's likely-inverted
/// `is_empty()` check).
pub fn execute(
    program: &Path,
    cpu_time_sec: i64,
    cpu_time_usec: i64,
    memory_limit_mb: i64,
    input: String,
    output_file: Option<&Path>,
) -> Result<ExecutionResult> {
    if !program.exists() {
        log::warn!("execution program does not exist: {:?}", program);
        return Ok(execution_result_of(
            Classification::ExecutionProgramNotExist,
            program,
            input,
            String::new(),
            ResourceUsage::default(),
            memory_limit_mb,
        ));
    }

    // Stdin is delivered from a real file rather than a pipe fed by a writer
    // thread: a judgee that reads only a prefix of its input and exits
    // closes the pipe's read end, and because Rust ignores SIGPIPE, a
    // concurrent writer would observe EPIPE on its next write and fail. That
    // is ordinary judgee behaviour, not an operational error, and §7
    // forbids letting it escape `execute` as one. `judge/src/engine/mod.rs`'s
    // `execute_judgee` takes the same approach, opening the test case's
    // input file directly for the judgee's stdin.
    let mut input_file = tempfile::NamedTempFile::new()?;
    input_file.write_all(input.as_bytes())?;
    input_file.flush()?;
    let stdin_owned = FileDescriptor::open(input_file.path(), fd::Flag::IN)?;

    let (stdout_read, stdout_write) = nix::unistd::pipe()?;
    let stdout_read_view = FileDescriptor::adopt_owned(stdout_read);
    let stdout_write_view = FileDescriptor::adopt_owned(stdout_write);

    let redirections = Redirections {
        stdin: Some(FileDescriptor::adopt(stdin_owned.fd())),
        stdout: Some(FileDescriptor::adopt(stdout_write_view.fd())),
        stderr: None,
    };
    let limits = ResourceLimits {
        cpu_time_sec,
        cpu_time_usec,
        memory_limit_mb,
    };

    log::trace!("spawning {:?} with a {}-byte stdin payload from {:?}", program, input.len(), input_file.path());
    let mut child = Subprocess::spawn(program, &[], redirections, limits)?;

    // Close our view of the ends the child now owns, so EOF on the stdout
    // read side is driven solely by the child's copy closing.
    drop(stdin_owned);
    drop(stdout_write_view);

    let mut output = String::new();
    stdout_read_view.read_to_string(&mut output)?;
    drop(stdout_read_view);

    child.wait()?;
    let usage = ResourceUsage::from_rusage(child.usage()?);
    let classification = exit_status::decode(child.status()?);
    log::debug!("{:?} terminated: {:?}", program, classification);

    if let Some(output_file) = output_file {
        std::fs::write(output_file, &output)?;
    }

    Ok(execution_result_of(classification, program, input, output, usage, memory_limit_mb))
}

/// Pre-check `input_file`'s existence, read it into a string, then delegate
/// to [`execute`].
pub fn execute_with_file(
    program: &Path,
    cpu_time_sec: i64,
    cpu_time_usec: i64,
    memory_limit_mb: i64,
    input_file: &Path,
    output_file: Option<&Path>,
) -> Result<ExecutionResult> {
    if !program.exists() {
        log::warn!("execution program does not exist: {:?}", program);
        return Ok(execution_result_of(
            Classification::ExecutionProgramNotExist,
            program,
            String::new(),
            String::new(),
            ResourceUsage::default(),
            memory_limit_mb,
        ));
    }
    if !input_file.exists() {
        log::warn!("execution input does not exist: {:?}", input_file);
        return Ok(execution_result_of(
            Classification::ExecutionInputNotExist,
            program,
            String::new(),
            String::new(),
            ResourceUsage::default(),
            memory_limit_mb,
        ));
    }

    let input = std::fs::read_to_string(input_file)?;
    execute(program, cpu_time_sec, cpu_time_usec, memory_limit_mb, input, output_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cat_echoes_stdin_to_stdout() {
        let result = execute(Path::new("/bin/cat"), 0, 0, 0, "hello\n".to_string(), None).unwrap();
        assert!(result.is_success());
        assert_eq!(result.output(), "hello\n");
    }

    #[test]
    fn nonexistent_program_is_reported_without_forking() {
        let result = execute(Path::new("/no/such/program"), 0, 0, 0, String::new(), None).unwrap();
        assert!(matches!(result, ExecutionResult::ProgramNotExist(_)));
    }

    #[test]
    fn missing_input_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute_with_file(
            Path::new("/bin/cat"),
            0,
            0,
            0,
            &dir.path().join("missing.in"),
            None,
        )
        .unwrap();
        assert!(matches!(result, ExecutionResult::InputNotExist(_)));
    }

    #[test]
    fn execute_with_file_reads_input_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("case.in");
        std::fs::write(&input_path, "3 4\n").unwrap();

        let result = execute_with_file(Path::new("/bin/cat"), 0, 0, 0, &input_path, None).unwrap();
        assert!(result.is_success());
        assert_eq!(result.output(), "3 4\n");
    }

    #[test]
    fn output_file_receives_a_copy_of_the_captured_output() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("out.txt");

        let result = execute(
            Path::new("/bin/cat"),
            0,
            0,
            0,
            "42\n".to_string(),
            Some(&output_path),
        )
        .unwrap();
        assert!(result.is_success());
        assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "42\n");
    }

    #[test]
    fn a_tight_cpu_time_limit_yields_timeout() {
        // `yes` writes indefinitely and burns CPU doing it; a 100ms ceiling
        // reliably tips the itimer before it could otherwise exit.
        let result = execute(Path::new("/usr/bin/yes"), 0, 100_000, 0, String::new(), None).unwrap();
        assert!(matches!(result, ExecutionResult::Timeout(_)));
    }

    #[test]
    fn a_judgee_reading_only_part_of_its_input_does_not_error() {
        // `head` (no args) stops after its first 10 lines, leaving the rest
        // of a large stdin unread. With stdin delivered from a file rather
        // than a pipe fed by a writer thread, that does not surface as a
        // broken-pipe operational error out of `execute`.
        let huge_input: String = std::iter::repeat("line\n").take(100_000).collect();
        let expected_output: String = std::iter::repeat("line\n").take(10).collect();

        let result = execute(Path::new("/usr/bin/head"), 0, 0, 0, huge_input, None).unwrap();
        assert!(result.is_success());
        assert_eq!(result.output(), expected_output);
    }
}

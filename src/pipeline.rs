//! Pipeline driver: compile once, then execute and judge every test case in
//! order, never aborting because one test case failed.
//!
//! Grounded on `original_source/src/offline_judge.cpp`'s top-level driving
//! function and `main.cpp`'s call sequence; `judge/src/engine/mod.rs`'s
//! `JudgeEngine::judge` for the idiom of a driver struct holding borrowed
//! config and exposing one `run` method.

use crate::executor;
use crate::judge::Judge;
use crate::result::{submission_result_of, ExecutionResult, JudgeResult, SubmissionResult};
use crate::solution::Solution;
use crate::testcase::TestCaseContainer;
use crate::Result;

/// Per-test-case resource ceilings, in the units `Subprocess` expects.
#[derive(Clone, Copy, Debug, Default)]
pub struct Limits {
    pub cpu_time_sec: i64,
    pub cpu_time_usec: i64,
    pub memory_limit_mb: i64,
}

/// Drives one submission: compile the `Solution`, then execute and judge it
/// against every test case in `TestCaseContainer`.
pub struct Pipeline {
    judge: Judge,
}

impl Default for Pipeline {
    fn default() -> Pipeline {
        Pipeline::new()
    }
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Pipeline { judge: Judge::new() }
    }

    pub fn with_judge(judge: Judge) -> Pipeline {
        Pipeline { judge }
    }

    /// Run the full compile → (execute, judge)* → submit sequence.
    pub fn run(
        &self,
        solution: &Solution,
        test_cases: &TestCaseContainer,
        compiler: &str,
        compiler_options: &[String],
        limits: Limits,
    ) -> Result<SubmissionResult> {
        log::info!(
            "compiling {:?} with {} test case(s) pending",
            solution.source(),
            test_cases.len()
        );
        let compilation = solution.compile(compiler, compiler_options)?;

        if !compilation.is_success() {
            log::warn!("compilation failed for {:?}, skipping all test cases", solution.source());
            return Ok(submission_result_of(compilation, Vec::new(), Vec::new()));
        }

        let mut executions: Vec<ExecutionResult> = Vec::with_capacity(test_cases.len());
        let mut judges: Vec<JudgeResult> = Vec::new();

        for case in test_cases {
            log::debug!("executing test case #{}", case.id());
            let input = case.input()?;
            let execution = executor::execute(
                solution.binary(),
                limits.cpu_time_sec,
                limits.cpu_time_usec,
                limits.memory_limit_mb,
                input,
                Some(solution.output()),
            )?;

            if execution.is_success() {
                let expected = case.output()?;
                let verdict = self.judge.diff(execution.output().to_string(), expected);
                log::debug!("test case #{} judged: {}", case.id(), verdict.is_success());
                judges.push(verdict);
            } else {
                log::debug!("test case #{} did not execute successfully, skipping judge", case.id());
            }

            executions.push(execution);
        }

        Ok(submission_result_of(compilation, executions, judges))
    }
}

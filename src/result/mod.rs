//! The result algebra: tagged-variant enums replacing the original's
//! `Result -> {Compilation,Execution,Judge,Submission}Result ->
//! Success/Failure -> leaf cause` virtual-inheritance hierarchy.
//!
//! Every variant here is a plain value, never constructed inside an `Err`:
//! producing `ExecutionResult::Timeout` is the executor doing its job, not
//! failing at it. See `DESIGN.md` §G and SPEC_FULL.md §7.

pub mod compilation;
pub mod execution;
pub mod judge_result;
pub mod submission;

pub use compilation::CompilationResult;
pub use execution::{execution_result_of, ExecutionResult};
pub use judge_result::{judge_result_of, JudgeResult, LineVerdict, TokenVerdict};
pub use submission::{submission_result_of, SubmissionResult};

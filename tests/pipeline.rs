//! End-to-end compile (skipped via freshness check) -> execute -> judge
//! coverage, exercising the crate's public API the way an embedder would.

use std::thread::sleep;
use std::time::Duration;

use offline_judge::pipeline::{Limits, Pipeline};
use offline_judge::solution::Solution;
use offline_judge::testcase::TestCaseContainer;

/// Sets up a tempdir containing a "solution" whose binary is an already
/// up-to-date copy of `/bin/cat`, so the pipeline's compile step takes the
/// `TargetUpToDate` path without spawning a real compiler.
fn cat_solution(dir: &std::path::Path) -> Solution {
    let source = dir.join("solution.src");
    let binary = dir.join("solution.bin");
    let output = dir.join("solution.out");

    std::fs::write(&source, "this file stands in for a submission's source").unwrap();
    sleep(Duration::from_millis(10));
    std::fs::copy("/bin/cat", &binary).unwrap();

    Solution::new(source, binary, output)
}

fn write_test_case(dir: &std::path::Path, stem: &str, input: &str, output: &str) {
    std::fs::write(dir.join(format!("{}.in", stem)), input).unwrap();
    std::fs::write(dir.join(format!("{}.out", stem)), output).unwrap();
}

#[test]
fn full_pipeline_accepts_a_cat_solution_against_matching_cases() {
    let dir = tempfile::tempdir().unwrap();
    let solution = cat_solution(dir.path());

    let cases_dir = tempfile::tempdir().unwrap();
    write_test_case(cases_dir.path(), "1", "1 2 3\n", "1 2 3\n");
    write_test_case(cases_dir.path(), "2", "hello world\n", "hello world\n");

    let test_cases = TestCaseContainer::from_dir(cases_dir.path(), "in", "out").unwrap();
    assert_eq!(test_cases.len(), 2);

    let pipeline = Pipeline::new();
    let result = pipeline
        .run(&solution, &test_cases, "cc", &[], Limits::default())
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.info().executions.len(), 2);
    assert_eq!(result.info().judges.len(), 2);
    assert!(std::fs::metadata(solution.output()).is_ok());
}

#[test]
fn a_wrong_answer_case_fails_the_submission_but_every_case_still_runs() {
    let dir = tempfile::tempdir().unwrap();
    let solution = cat_solution(dir.path());

    let cases_dir = tempfile::tempdir().unwrap();
    write_test_case(cases_dir.path(), "1", "1 2 3\n", "1 2 3\n");
    write_test_case(cases_dir.path(), "2", "1 2 3\n", "1 2 4\n");
    write_test_case(cases_dir.path(), "3", "9 9 9\n", "9 9 9\n");

    let test_cases = TestCaseContainer::from_dir(cases_dir.path(), "in", "out").unwrap();

    let pipeline = Pipeline::new();
    let result = pipeline
        .run(&solution, &test_cases, "cc", &[], Limits::default())
        .unwrap();

    assert!(!result.is_success());
    // Every test case is attempted even though the middle one fails.
    assert_eq!(result.info().executions.len(), 3);
    assert_eq!(result.info().judges.len(), 3);
    assert!(result.info().judges[0].is_success());
    assert!(!result.info().judges[1].is_success());
    assert!(result.info().judges[2].is_success());
}

#[test]
fn missing_test_case_sibling_is_an_operational_error_not_a_verdict() {
    let cases_dir = tempfile::tempdir().unwrap();
    std::fs::write(cases_dir.path().join("1.in"), "data").unwrap();

    let result = TestCaseContainer::from_dir(cases_dir.path(), "in", "out");
    assert!(result.is_err());
}

//! Token-diff judge: compares a user's captured output to the expected
//! answer line by line, each line tokenised on ASCII whitespace.
//!
//! Grounded on `original_source/src/offlinejudge.cpp`'s line/token walk (the
//! dedicated `offline_judge.cpp` leaves `Judge` unimplemented) and
//! `judge/src/engine/checkers.rs`'s `DefaultChecker::check` for the idiomatic
//! token-by-token comparison loop and its EOF handling on both sides.

use std::time::Instant;

use crate::result::judge_result::{judge_result_of, JudgeInfo, JudgeResult, LineJudgeData, LineVerdict, TokenVerdict};

/// Default byte ceiling on the user's captured output before the line walk
/// is attempted at all. Resolves the open question in SPEC_FULL.md §4.F /
/// §9: the original names `JudgeFailureOutputExceeded` but never specifies
/// its trigger.
pub const DEFAULT_OUTPUT_CEILING: usize = 8 * 1024 * 1024;

/// A judge instance, parameterised only by its output-length ceiling.
pub struct Judge {
    output_ceiling: usize,
}

impl Default for Judge {
    fn default() -> Judge {
        Judge::new()
    }
}

impl Judge {
    pub fn new() -> Judge {
        Judge {
            output_ceiling: DEFAULT_OUTPUT_CEILING,
        }
    }

    pub fn with_output_ceiling(output_ceiling: usize) -> Judge {
        Judge { output_ceiling }
    }

    /// Compare `user_answer` against `correct_answer`, producing a
    /// [`JudgeResult`].
    pub fn diff(&self, user_answer: String, correct_answer: String) -> JudgeResult {
        if user_answer.len() > self.output_ceiling {
            log::warn!(
                "user output ({} bytes) exceeds the {}-byte ceiling; skipping line walk",
                user_answer.len(),
                self.output_ceiling
            );
            let info = JudgeInfo {
                user_answer,
                correct_answer,
                lines: Vec::new(),
            };
            return JudgeResult::OutputExceeded(info);
        }

        let started = Instant::now();
        let lines = diff_lines(&user_answer, &correct_answer);
        log::trace!("judged {} lines in {:?}", lines.len(), started.elapsed());

        judge_result_of(user_answer, correct_answer, lines)
    }
}

/// Walk both answers line by line until both are exhausted, tokenising each
/// line on ASCII whitespace. A side that runs out of lines first contributes
/// the empty string for the remainder, so uneven line counts surface as
/// `IllFormed` lines rather than being silently truncated.
fn diff_lines(user_answer: &str, correct_answer: &str) -> Vec<LineJudgeData> {
    let user_lines: Vec<&str> = user_answer.lines().collect();
    let correct_lines: Vec<&str> = correct_answer.lines().collect();
    let total = user_lines.len().max(correct_lines.len());

    (0..total)
        .map(|i| {
            let user_line = user_lines.get(i).copied().unwrap_or("");
            let correct_line = correct_lines.get(i).copied().unwrap_or("");
            diff_line(user_line, correct_line)
        })
        .collect()
}

fn diff_line(user_line: &str, correct_line: &str) -> LineJudgeData {
    let user_tokens: Vec<&str> = tokenize(user_line);
    let correct_tokens: Vec<&str> = tokenize(correct_line);

    if user_tokens.len() != correct_tokens.len() {
        return LineJudgeData {
            verdict: LineVerdict::IllFormed,
            tokens: Vec::new(),
        };
    }

    let tokens: Vec<TokenVerdict> = user_tokens
        .iter()
        .zip(correct_tokens.iter())
        .map(|(u, c)| if u == c { TokenVerdict::Correct } else { TokenVerdict::Wrong })
        .collect();

    let verdict = if tokens.iter().all(|t| *t == TokenVerdict::Correct) {
        LineVerdict::Correct
    } else {
        LineVerdict::Wrong
    };

    LineJudgeData { verdict, tokens }
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_ascii_whitespace())
        .filter(|tok| !tok.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_answers_are_correct() {
        let judge = Judge::new();
        let result = judge.diff("1 2 3\n".to_string(), "1 2 3\n".to_string());
        assert!(result.is_success());
        assert_eq!(result.info().lines.len(), 1);
        assert!(result.info().lines[0].tokens.iter().all(|t| *t == TokenVerdict::Correct));
    }

    #[test]
    fn mismatched_token_is_wrong() {
        let judge = Judge::new();
        let result = judge.diff("1 2 4\n".to_string(), "1 2 3\n".to_string());
        assert!(!result.is_success());
        let line = &result.info().lines[0];
        assert_eq!(line.verdict, LineVerdict::Wrong);
        assert_eq!(line.tokens[2], TokenVerdict::Wrong);
    }

    #[test]
    fn fewer_tokens_is_ill_formed() {
        let judge = Judge::new();
        let result = judge.diff("1 2\n".to_string(), "1 2 3\n".to_string());
        let line = &result.info().lines[0];
        assert_eq!(line.verdict, LineVerdict::IllFormed);
    }

    #[test]
    fn empty_vs_empty_is_success_with_no_lines() {
        let judge = Judge::new();
        let result = judge.diff(String::new(), String::new());
        assert!(result.is_success());
        assert!(result.info().lines.is_empty());
    }

    #[test]
    fn extra_trailing_line_is_ill_formed() {
        let judge = Judge::new();
        let result = judge.diff("1 2 3\nextra\n".to_string(), "1 2 3\n".to_string());
        assert!(!result.is_success());
        assert_eq!(result.info().lines.len(), 2);
        assert_eq!(result.info().lines[1].verdict, LineVerdict::IllFormed);
    }

    #[test]
    fn trailing_newline_alone_does_not_add_a_line() {
        let judge = Judge::new();
        let result = judge.diff("1 2 3\n".to_string(), "1 2 3".to_string());
        assert!(result.is_success());
        assert_eq!(result.info().lines.len(), 1);
    }

    #[test]
    fn output_exceeding_ceiling_is_reported_without_a_line_walk() {
        let judge = Judge::with_output_ceiling(4);
        let result = judge.diff("12345".to_string(), "12345".to_string());
        assert!(matches!(result, JudgeResult::OutputExceeded(_)));
        assert!(result.info().lines.is_empty());
    }
}

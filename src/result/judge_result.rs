//! `JudgeResult`: outcome of comparing a user's captured output against an
//! expected answer, plus the per-token/per-line verdict data the renderer
//! walks to colourise a diff.
//!
//! Grounded on `original_source/src/result/judge_result.h`'s
//! `JudgeSuccess` / `JudgeFailureInvalidOutputFormat` / `JudgeFailureOutputExceeded`
//! leaves, and `original_source/src/offlinejudge.cpp`'s line/token walk.

/// Verdict of a single token comparison.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenVerdict {
    Correct,
    Wrong,
}

/// Verdict of a single line, aggregated from its tokens.
///
/// Ordered `Correct < Wrong < IllFormed` so an overall verdict can be taken
/// as the maximum over all lines without ever downgrading.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum LineVerdict {
    Correct,
    Wrong,
    IllFormed,
}

/// Per-token verdicts for one line, alongside the line's own aggregate.
#[derive(Clone, Debug)]
pub struct LineJudgeData {
    pub verdict: LineVerdict,
    pub tokens: Vec<TokenVerdict>,
}

#[derive(Clone, Debug)]
pub struct JudgeInfo {
    pub user_answer: String,
    pub correct_answer: String,
    pub lines: Vec<LineJudgeData>,
}

impl JudgeInfo {
    /// The monotone maximum over every line's verdict; `Correct` for zero
    /// lines (an empty answer judged against an empty answer).
    pub fn overall(&self) -> LineVerdict {
        self.lines
            .iter()
            .map(|l| l.verdict)
            .max()
            .unwrap_or(LineVerdict::Correct)
    }
}

#[derive(Clone, Debug)]
pub enum JudgeResult {
    Success(JudgeInfo),
    InvalidOutputFormat(JudgeInfo),
    /// The user's captured output exceeded the configured byte ceiling
    /// before a line walk was attempted; `lines` is always empty.
    OutputExceeded(JudgeInfo),
}

impl JudgeResult {
    pub fn info(&self) -> &JudgeInfo {
        match self {
            JudgeResult::Success(i) | JudgeResult::InvalidOutputFormat(i) | JudgeResult::OutputExceeded(i) => i,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JudgeResult::Success(_))
    }
}

/// Build a `JudgeResult` from the line data already computed by `judge::diff`.
///
/// The original engine has no dedicated "wrong answer" leaf class: a
/// mismatched token and a mismatched token count both collapse to
/// `InvalidOutputFormat` at the `JudgeResult` level, and it is the per-line
/// `LineVerdict`/`TokenVerdict` data (not the result variant) that the
/// renderer walks to tell a reader exactly where a submission diverged.
pub fn judge_result_of(user_answer: String, correct_answer: String, lines: Vec<LineJudgeData>) -> JudgeResult {
    let info = JudgeInfo {
        user_answer,
        correct_answer,
        lines,
    };

    if info.overall() == LineVerdict::Correct {
        JudgeResult::Success(info)
    } else {
        JudgeResult::InvalidOutputFormat(info)
    }
}

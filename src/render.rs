//! `Render`: turns a result-algebra value into text. A pure visitor sink —
//! one method per result category, never embedding formatting logic inside
//! the `result` module itself.
//!
//! Grounded on `original_source/src/renderer.h`'s visitor interface shape;
//! the ANSI colour codes come from the original's terminal-colouring
//! convention (SPEC_FULL.md §6).

use std::io::{self, Write};

use crate::result::judge_result::{JudgeInfo, LineVerdict, TokenVerdict};
use crate::result::{CompilationResult, ExecutionResult, JudgeResult, SubmissionResult};

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// One method per result category; implementors decide the concrete text
/// and colouring. Variants themselves never format.
pub trait Render {
    fn render_compilation(&self, out: &mut dyn Write, result: &CompilationResult) -> io::Result<()>;
    fn render_execution(&self, out: &mut dyn Write, result: &ExecutionResult) -> io::Result<()>;
    fn render_judge(&self, out: &mut dyn Write, index: usize, result: &JudgeResult) -> io::Result<()>;
    fn render_submission(&self, out: &mut dyn Write, result: &SubmissionResult) -> io::Result<()>;
}

/// Default ANSI-colour terminal renderer: a header line with the test-case
/// index, then a two-column (user | expected) view with per-line colouring
/// (green=Correct, red=Wrong, yellow=IllFormed).
pub struct AnsiRenderer;

impl Render for AnsiRenderer {
    fn render_compilation(&self, out: &mut dyn Write, result: &CompilationResult) -> io::Result<()> {
        let info = result.info();
        if result.is_success() {
            writeln!(out, "compiled: {}", info.command)
        } else {
            writeln!(out, "{}compilation failed{}: {}", RED, RESET, info.command)?;
            write!(out, "{}", info.message)
        }
    }

    fn render_execution(&self, out: &mut dyn Write, result: &ExecutionResult) -> io::Result<()> {
        let info = result.info();
        writeln!(
            out,
            "ran {:?}: cpu={:?} rss={}kB",
            info.program,
            info.usage.cpu_time(),
            info.usage.peak_rss_kb
        )
    }

    fn render_judge(&self, out: &mut dyn Write, index: usize, result: &JudgeResult) -> io::Result<()> {
        writeln!(out, "--- test case #{} ---", index)?;
        render_judge_info(out, result.info())
    }

    fn render_submission(&self, out: &mut dyn Write, result: &SubmissionResult) -> io::Result<()> {
        let info = result.info();
        self.render_compilation(out, &info.compilation)?;
        for (i, judge) in info.judges.iter().enumerate() {
            self.render_judge(out, i, judge)?;
        }
        if result.is_success() {
            writeln!(out, "{}ACCEPTED{}", GREEN, RESET)
        } else {
            writeln!(out, "{}REJECTED{}", RED, RESET)
        }
    }
}

fn render_judge_info(out: &mut dyn Write, info: &JudgeInfo) -> io::Result<()> {
    let user_lines: Vec<&str> = info.user_answer.lines().collect();
    let correct_lines: Vec<&str> = info.correct_answer.lines().collect();

    for (i, line) in info.lines.iter().enumerate() {
        let color = match line.verdict {
            LineVerdict::Correct => GREEN,
            LineVerdict::Wrong => RED,
            LineVerdict::IllFormed => YELLOW,
        };
        let user_line = user_lines.get(i).copied().unwrap_or("");
        let correct_line = correct_lines.get(i).copied().unwrap_or("");
        writeln!(out, "{}{} | {}{}", color, user_line, correct_line, RESET)?;
    }
    Ok(())
}

/// Reproduce the token-verdict colouring of one line, for callers that want
/// per-token granularity rather than `render_judge`'s whole-line view.
pub fn render_tokens(out: &mut dyn Write, tokens: &[TokenVerdict]) -> io::Result<()> {
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            write!(out, " ")?;
        }
        let color = match token {
            TokenVerdict::Correct => GREEN,
            TokenVerdict::Wrong => RED,
        };
        write!(out, "{}#{}{}", color, i, RESET)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::Judge;

    #[test]
    fn render_judge_colors_each_line() {
        let judge = Judge::new();
        let result = judge.diff("1 2 3\n".to_string(), "1 2 4\n".to_string());

        let mut buf = Vec::new();
        AnsiRenderer.render_judge(&mut buf, 0, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(RED));
        assert!(text.contains("test case #0"));
    }
}

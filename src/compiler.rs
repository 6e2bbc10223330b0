//! Compiler driver: invoke an external compiler through [`Subprocess`], with
//! an mtime-based freshness check that skips compilation entirely when the
//! target is already newer than the source.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::exit_status::{self, Classification};
use crate::fd::FileDescriptor;
use crate::result::compilation::CompilationResult;
use crate::subprocess::{Redirections, ResourceLimits, Subprocess};
use crate::Result;

/// Compile `source` into `target` with `compiler`, passing `options` as a
/// single, shell-split-free option string appended verbatim after `-o
/// target`. Returns `TargetUpToDate` without spawning a process when
/// `mtime(source) <= mtime(target)`.
pub fn compile(
    source: &Path,
    target: &Path,
    compiler: &str,
    options: &[String],
) -> Result<CompilationResult> {
    let command = format_command(compiler, source, target, options);

    if !source.exists() {
        log::warn!("compilation source does not exist: {:?}", source);
        return Ok(CompilationResult::source_not_exist(String::new(), command, source, target));
    }

    if is_up_to_date(source, target)? {
        log::debug!("{:?} is up to date with respect to {:?}, skipping compile", target, source);
        return Ok(CompilationResult::target_up_to_date(String::new(), command, source, target));
    }

    let (read_fd, write_fd) = nix::unistd::pipe()?;
    let write_view = FileDescriptor::adopt_owned(write_fd);
    let read_view = FileDescriptor::adopt_owned(read_fd);

    let mut args = vec![source.display().to_string(), "-o".to_string(), target.display().to_string()];
    args.extend(options.iter().cloned());

    let redirections = Redirections {
        stdin: None,
        stdout: Some(FileDescriptor::adopt(write_view.fd())),
        stderr: Some(FileDescriptor::adopt(write_view.fd())),
    };

    log::trace!("spawning compiler: {}", command);
    let mut child = Subprocess::spawn(Path::new(compiler), &args, redirections, ResourceLimits::none())?;
    drop(write_view);

    let mut message = String::new();
    read_view.read_to_string(&mut message)?;
    child.wait()?;

    let classification = exit_status::decode(child.status()?);
    Ok(build_result(classification, message, command, source, target))
}

fn format_command(compiler: &str, source: &Path, target: &Path, options: &[String]) -> String {
    let mut parts = vec![
        compiler.to_string(),
        source.display().to_string(),
        "-o".to_string(),
        target.display().to_string(),
    ];
    parts.extend(options.iter().cloned());
    parts.join(" ")
}

fn build_result(
    classification: Classification,
    message: String,
    command: String,
    source: &Path,
    target: &Path,
) -> CompilationResult {
    match classification {
        Classification::Success => CompilationResult::success(message, command, source, target),
        Classification::CompilationSourceNotExist => {
            CompilationResult::source_not_exist(message, command, source, target)
        }
        _ => CompilationResult::failure(message, command, source, target),
    }
}

/// `mtime(source) <= mtime(target)`. Ties count as up-to-date (strict
/// greater-than on the source side is what forces a rebuild).
pub fn is_up_to_date(source: &Path, target: &Path) -> Result<bool> {
    if !target.exists() {
        return Ok(false);
    }
    let source_mtime = modified(source)?;
    let target_mtime = modified(target)?;
    Ok(source_mtime <= target_mtime)
}

fn modified(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn up_to_date_when_target_newer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.c");
        let target = dir.path().join("main");

        std::fs::write(&source, "int main() { return 0; }").unwrap();
        sleep(Duration::from_millis(10));
        std::fs::write(&target, "binary").unwrap();

        assert!(is_up_to_date(&source, &target).unwrap());
    }

    #[test]
    fn stale_when_source_newer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.c");
        let target = dir.path().join("main");

        std::fs::write(&target, "binary").unwrap();
        sleep(Duration::from_millis(10));
        let mut f = std::fs::File::create(&source).unwrap();
        f.write_all(b"int main() { return 0; }").unwrap();

        assert!(!is_up_to_date(&source, &target).unwrap());
    }

    #[test]
    fn missing_target_is_not_up_to_date() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.c");
        std::fs::write(&source, "x").unwrap();
        assert!(!is_up_to_date(&source, &dir.path().join("missing")).unwrap());
    }
}

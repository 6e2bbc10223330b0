//! Single-child sandboxed subprocess: fork, apply limits, redirect streams,
//! exec, and reap.
//!
//! Unlike the teacher's `sandbox` crate, which hands child supervision to a
//! background daemon thread so many children can be tracked concurrently,
//! this module is strictly single-threaded and single-child: at most one
//! [`Subprocess`] may be alive in the process at a time (enforced by
//! `HAS_INSTANCE`), and the parent reaps it directly with `wait4` rather than
//! polling `/proc` from a daemon. See `DESIGN.md` for the rationale.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::wait::WaitStatus;
use nix::unistd::{execv, fork, ForkResult, Pid};

use crate::fd::FileDescriptor;
use crate::{Error, ErrorKind, Result};

static HAS_INSTANCE: AtomicBool = AtomicBool::new(false);

/// CPU-time and memory ceilings applied to a child before it execs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceLimits {
    pub cpu_time_sec: i64,
    pub cpu_time_usec: i64,
    pub memory_limit_mb: i64,
}

impl ResourceLimits {
    pub fn none() -> ResourceLimits {
        ResourceLimits {
            cpu_time_sec: 0,
            cpu_time_usec: 0,
            memory_limit_mb: 0,
        }
    }

    fn has_time_limit(&self) -> bool {
        self.cpu_time_sec != 0 || self.cpu_time_usec != 0
    }

    fn has_memory_limit(&self) -> bool {
        self.memory_limit_mb != 0
    }
}

/// Standard-stream redirections to apply in the child before exec. A `None`
/// field leaves the corresponding stream untouched.
#[derive(Default)]
pub struct Redirections {
    pub stdin: Option<FileDescriptor>,
    pub stdout: Option<FileDescriptor>,
    pub stderr: Option<FileDescriptor>,
}

/// A forked child process, from the parent's point of view.
pub struct Subprocess {
    pid: Pid,
    status: Option<WaitStatus>,
    usage: Option<libc::rusage>,
}

impl Subprocess {
    /// Fork, apply `limits` and `redirections` in the child, then `execv`
    /// `program` with `args`. Fails immediately if another `Subprocess` is
    /// already alive in this process.
    pub fn spawn(
        program: &Path,
        args: &[String],
        redirections: Redirections,
        limits: ResourceLimits,
    ) -> Result<Subprocess> {
        if HAS_INSTANCE.swap(true, Ordering::SeqCst) {
            bail!(ErrorKind::InstanceAlreadyRunning);
        }

        log::trace!("forking to run {:?} {:?}", program, args);
        let fork_result = match fork() {
            Ok(r) => r,
            Err(e) => {
                HAS_INSTANCE.store(false, Ordering::SeqCst);
                return Err(Error::with_chain(e, ErrorKind::ForkFailed));
            }
        };

        match fork_result {
            ForkResult::Child => {
                child_main(program, args, redirections, limits);
                unreachable!("child_main never returns")
            }
            ForkResult::Parent { child } => {
                log::debug!("forked child pid {}", child);
                Ok(Subprocess {
                    pid: child,
                    status: None,
                    usage: None,
                })
            }
        }
    }

    /// Non-blocking reap attempt. Returns `true` if the child has terminated.
    pub fn poll(&mut self) -> Result<bool> {
        if self.status.is_some() {
            return Ok(true);
        }
        match wait4(self.pid, true)? {
            Some((status, usage)) => {
                self.status = Some(status);
                self.usage = Some(usage);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Block until the child terminates, capturing its status and `rusage`
    /// atomically.
    pub fn wait(&mut self) -> Result<()> {
        if self.status.is_some() {
            return Ok(());
        }
        let (status, usage) = wait4(self.pid, false)?
            .expect("blocking wait4 always returns a status");
        self.status = Some(status);
        self.usage = Some(usage);
        Ok(())
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn status(&self) -> Result<&WaitStatus> {
        self.status.as_ref().ok_or_else(|| ErrorKind::NotTerminated.into())
    }

    pub fn usage(&self) -> Result<&libc::rusage> {
        self.usage.as_ref().ok_or_else(|| ErrorKind::NotTerminated.into())
    }
}

impl Drop for Subprocess {
    fn drop(&mut self) {
        HAS_INSTANCE.store(false, Ordering::SeqCst);
    }
}

/// Raw `wait4` wrapper capturing status and resource usage together.
/// `nonblocking` maps to `WNOHANG`; returns `None` only in that mode when the
/// child has not yet terminated.
fn wait4(pid: Pid, nonblocking: bool) -> Result<Option<(WaitStatus, libc::rusage)>> {
    let options = if nonblocking { libc::WNOHANG } else { 0 };
    let mut raw_status: libc::c_int = 0;
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };

    let ret = unsafe { libc::wait4(pid.as_raw(), &mut raw_status, options, &mut usage) };
    if ret < 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    if ret == 0 {
        return Ok(None);
    }

    let status = decode_wait_status(pid, raw_status);
    Ok(Some((status, usage)))
}

fn decode_wait_status(pid: Pid, raw: libc::c_int) -> WaitStatus {
    if libc::WIFEXITED(raw) {
        WaitStatus::Exited(pid, libc::WEXITSTATUS(raw))
    } else if libc::WIFSIGNALED(raw) {
        let signal = Signal::from_c_int(libc::WTERMSIG(raw)).unwrap_or(Signal::SIGKILL);
        WaitStatus::Signaled(pid, signal, libc::WCOREDUMP(raw))
    } else {
        WaitStatus::StillAlive
    }
}

/// Everything that happens in the child between fork and exec. Never
/// returns: every path ends in `std::process::exit`.
fn child_main(program: &Path, args: &[String], redirections: Redirections, limits: ResourceLimits) -> ! {
    install_handlers();

    if let Err(_) = apply_redirections(&redirections) {
        std::process::exit(crate::exit_status::Sentinel::ExecutionDupFailure.encode());
    }

    if limits.has_memory_limit() {
        if apply_memory_limit(limits.memory_limit_mb).is_err() {
            std::process::exit(crate::exit_status::Sentinel::Exception.encode());
        }
    }

    if limits.has_time_limit() {
        if apply_time_limit(limits.cpu_time_sec, limits.cpu_time_usec).is_err() {
            std::process::exit(crate::exit_status::Sentinel::Exception.encode());
        }
    }

    let native_program = match CString::new(program.as_os_str().as_bytes()) {
        Ok(s) => s,
        Err(_) => std::process::exit(crate::exit_status::Sentinel::ExecutionExecFailure.encode()),
    };
    let mut native_args = Vec::with_capacity(args.len() + 1);
    native_args.push(native_program.clone());
    for arg in args {
        match CString::new(arg.as_str()) {
            Ok(s) => native_args.push(s),
            Err(_) => std::process::exit(crate::exit_status::Sentinel::ExecutionExecFailure.encode()),
        }
    }

    match execv(&native_program, &native_args) {
        Ok(_) => unreachable!("execv does not return on success"),
        Err(_) => std::process::exit(crate::exit_status::Sentinel::ExecutionExecFailure.encode()),
    }
}

fn apply_redirections(redirections: &Redirections) -> nix::Result<()> {
    if let Some(stdin) = &redirections.stdin {
        nix::unistd::dup2(stdin.fd(), libc::STDIN_FILENO)?;
    }
    if let Some(stdout) = &redirections.stdout {
        nix::unistd::dup2(stdout.fd(), libc::STDOUT_FILENO)?;
    }
    if let Some(stderr) = &redirections.stderr {
        nix::unistd::dup2(stderr.fd(), libc::STDERR_FILENO)?;
    }
    Ok(())
}

fn apply_memory_limit(mb: i64) -> std::io::Result<()> {
    let bytes = (mb as u64).saturating_mul(1024 * 1024);
    let limit = libc::rlimit {
        rlim_cur: bytes,
        rlim_max: bytes,
    };
    let ret = unsafe { libc::setrlimit(libc::RLIMIT_AS, &limit) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

fn apply_time_limit(sec: i64, usec: i64) -> std::io::Result<()> {
    let interval = libc::itimerval {
        it_interval: libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        },
        it_value: libc::timeval {
            tv_sec: sec,
            tv_usec: usec,
        },
    };
    let ret = unsafe { libc::setitimer(libc::ITIMER_REAL, &interval, std::ptr::null_mut()) };
    if ret == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Install the child-side SIGSEGV/SIGALRM handlers described in
/// SPEC_FULL.md §4.B. These only have a realistic chance of firing in our
/// own setup code between fork and exec: `execve` resets caught-signal
/// dispositions to default, so once the target image is running, a real
/// timeout or address-space violation is handled by the kernel's default
/// action and recognised at decode time instead (see `exit_status`).
fn install_handlers() {
    unsafe {
        let sigsegv_action = SigAction::new(
            SigHandler::Handler(handle_sigsegv),
            SaFlags::empty(),
            SigSet::empty(),
        );
        let _ = signal::sigaction(Signal::SIGSEGV, &sigsegv_action);

        let sigalrm_action = SigAction::new(
            SigHandler::Handler(handle_sigalrm),
            SaFlags::empty(),
            SigSet::empty(),
        );
        let _ = signal::sigaction(Signal::SIGALRM, &sigalrm_action);
    }
}

extern "C" fn handle_sigsegv(_sig: libc::c_int) {
    let errno = std::io::Error::last_os_error()
        .raw_os_error()
        .unwrap_or(0);
    if errno == libc::ENOMEM {
        std::process::exit(crate::exit_status::Sentinel::OutOfMemory.encode());
    }
    unsafe {
        let _ = signal::sigaction(
            Signal::SIGSEGV,
            &SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty()),
        );
        let _ = signal::raise(Signal::SIGSEGV);
    }
}

extern "C" fn handle_sigalrm(_sig: libc::c_int) {
    std::process::exit(crate::exit_status::Sentinel::Timeout.encode());
}

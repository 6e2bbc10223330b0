//! Scoped ownership of a raw OS file descriptor.
//!
//! Mirrors the original engine's `FileDescriptor`: a handle is either an
//! owner, in which case dropping it closes the underlying descriptor exactly
//! once, or a non-owning borrow adopted from an existing raw fd, in which case
//! dropping it does nothing.

use std::path::Path;

use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2, read, write};

use crate::{Error, ErrorKind, Result};

bitflags::bitflags! {
    /// Access-mode bits requested when opening a descriptor.
    pub struct Flag: i32 {
        const IN    = 0b0001;
        const OUT   = 0b0010;
        const INOUT = Self::IN.bits | Self::OUT.bits;
        const APP   = 0b0100;
        const TRUNC = 0b1000;
    }
}

const READ_CHUNK: usize = 256;

/// A scoped owner (or borrower) of a raw file descriptor.
pub struct FileDescriptor {
    fd: i32,
    is_owner: bool,
}

impl FileDescriptor {
    /// Open `path` with the given access flags. A create bit (mode `0o644`)
    /// is added only when `path` does not already exist, matching
    /// `file_descriptor.cpp`'s `Open` rather than deriving it from `flag`.
    pub fn open(path: &Path, flag: Flag) -> Result<FileDescriptor> {
        let mut oflag = OFlag::empty();
        if flag.contains(Flag::INOUT) {
            oflag |= OFlag::O_RDWR;
        } else if flag.contains(Flag::OUT) {
            oflag |= OFlag::O_WRONLY;
        } else {
            oflag |= OFlag::O_RDONLY;
        }
        if flag.contains(Flag::APP) {
            oflag |= OFlag::O_APPEND;
        }
        if flag.contains(Flag::TRUNC) {
            oflag |= OFlag::O_TRUNC;
        }
        if !path.exists() {
            oflag |= OFlag::O_CREAT;
        }

        let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
        let fd = open(path, oflag, mode)?;
        log::trace!("opened {:?} as fd {}", path, fd);

        Ok(FileDescriptor { fd, is_owner: true })
    }

    /// Adopt an existing raw descriptor without taking ownership of it. The
    /// descriptor is never closed by this handle's `Drop` impl.
    pub fn adopt(fd: i32) -> FileDescriptor {
        FileDescriptor { fd, is_owner: false }
    }

    /// Adopt an existing raw descriptor, taking ownership of it.
    pub fn adopt_owned(fd: i32) -> FileDescriptor {
        FileDescriptor { fd, is_owner: true }
    }

    /// Close the descriptor. Idempotent; a non-owner or an already-closed
    /// handle does nothing.
    pub fn close(&mut self) {
        if self.is_owner && self.fd >= 0 {
            if let Err(e) = close(self.fd) {
                log::warn!("failed to close fd {}: {}", self.fd, e);
            }
            self.fd = -1;
        }
    }

    /// Point `self`'s underlying descriptor number at `other`'s fd, matching
    /// POSIX `dup2` semantics.
    pub fn redirect(&self, other: &FileDescriptor) -> Result<()> {
        dup2(other.fd, self.fd)?;
        Ok(())
    }

    /// Read until EOF, appending into `sink`.
    pub fn read_to_string(&self, sink: &mut String) -> Result<()> {
        if !self.is_readable() {
            bail!(ErrorKind::Msg("fd is not readable".into()));
        }
        let mut buf = [0u8; READ_CHUNK];
        let mut bytes = Vec::new();
        loop {
            let n = read(self.fd, &mut buf)?;
            if n == 0 {
                break;
            }
            bytes.extend_from_slice(&buf[..n]);
        }
        sink.push_str(&String::from_utf8_lossy(&bytes));
        Ok(())
    }

    /// Write the full contents of `source` to the descriptor, handling short
    /// writes by re-offsetting into the buffer.
    pub fn write_all(&self, source: &[u8]) -> Result<()> {
        if !self.is_writable() {
            bail!(ErrorKind::Msg("fd is not writable".into()));
        }
        let mut offset = 0;
        while offset < source.len() {
            let n = write(self.fd, &source[offset..])?;
            offset += n;
        }
        Ok(())
    }

    pub fn fd(&self) -> i32 {
        self.fd
    }

    /// Query the descriptor's current access-mode flags via `fcntl(F_GETFL)`
    /// rather than the flags it was opened or adopted with, so a descriptor
    /// moved by `redirect` reports accurately. Mirrors
    /// `file_descriptor.cpp`'s `Flag()`.
    pub fn flag(&self) -> OFlag {
        fcntl(self.fd, FcntlArg::F_GETFL)
            .map(OFlag::from_bits_truncate)
            .unwrap_or_else(|_| OFlag::empty())
    }

    pub fn is_opened(&self) -> bool {
        self.fd >= 0
    }

    fn access_mode(&self) -> i32 {
        self.flag().bits() & libc::O_ACCMODE
    }

    pub fn is_readable(&self) -> bool {
        let mode = self.access_mode();
        mode == libc::O_RDONLY || mode == libc::O_RDWR
    }

    pub fn is_writable(&self) -> bool {
        let mode = self.access_mode();
        mode == libc::O_WRONLY || mode == libc::O_RDWR
    }
}

impl Drop for FileDescriptor {
    fn drop(&mut self) {
        self.close();
    }
}

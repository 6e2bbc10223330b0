//! An offline programming-judge engine: compiles a submitted source program,
//! runs the resulting binary once per test case under CPU-time and memory
//! limits in a forked child, and judges captured output against the expected
//! output.
//!
//! The crate is split along the compile -> execute -> judge pipeline:
//!
//! * [`fd`] and [`subprocess`] provide the sandboxed child-process primitives;
//! * [`exit_status`] decodes a child's raw wait status into a classification;
//! * [`compiler`] and [`executor`] stage one `Subprocess` invocation each;
//! * [`judge`] tokenises and diffs captured output against an answer key;
//! * [`result`] collects every distinguishable outcome into a tagged-variant
//!   algebra, and [`render`]/[`label`] turn a result into text;
//! * [`pipeline`] drives the whole sequence for one solution against one
//!   test-case container.

#[macro_use]
extern crate error_chain;
extern crate libc;
extern crate nix;

pub mod fd;
pub mod exit_status;
pub mod subprocess;
pub mod compiler;
pub mod executor;
pub mod judge;
pub mod result;
pub mod render;
pub mod label;
pub mod pipeline;
pub mod testcase;
pub mod solution;

#[cfg(feature = "serde")]
pub mod config;

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }

    foreign_links {
        Io(::std::io::Error);
        Nix(::nix::Error);
        Yaml(::serde_yaml::Error);
    }

    errors {
        InstanceAlreadyRunning {
            description("a Subprocess instance is already running in this process")
        }

        ForkFailed {
            description("failed to fork a child process")
        }

        ProgramNotExist(path: String) {
            description("program does not exist")
            display("program does not exist: {}", path)
        }

        InputNotExist(path: String) {
            description("input file does not exist")
            display("input file does not exist: {}", path)
        }

        CompilationSourceNotExist(path: String) {
            description("compilation source does not exist")
            display("compilation source does not exist: {}", path)
        }

        MalformedTestCaseDirectory(reason: String) {
            description("test case directory is malformed")
            display("test case directory is malformed: {}", reason)
        }

        NotTerminated {
            description("queried status or usage of a subprocess before it terminated")
        }
    }
}

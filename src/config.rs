//! `Config`: the eight (plus `limits.*`, new in this expansion) recognised
//! configuration keys, grouped the way the original's config file groups
//! them. Parsing and locating the config file on disk is the CLI binary's
//! job; the core only ever consumes an already-populated `Config` value.
//!
//! Grounded on `driver/src/config.rs`'s `AppConfig`/section-struct pattern,
//! deserialized with `serde_yaml` from the same dependency table.

use std::path::PathBuf;

use serde::Deserialize;

/// Test-case directory layout: `testcase.dir`, `testcase.in`, `testcase.out`.
#[derive(Clone, Debug, Deserialize)]
pub struct TestCaseConfig {
    pub dir: PathBuf,
    #[serde(rename = "in")]
    pub in_ext: String,
    #[serde(rename = "out")]
    pub out_ext: String,
}

/// The submitted user program: `user.src`, `user.bin`, `user.out`.
#[derive(Clone, Debug, Deserialize)]
pub struct UserConfig {
    pub src: PathBuf,
    pub bin: PathBuf,
    pub out: PathBuf,
}

/// Compiler invocation: `compiler.compiler`, `compiler.option`.
#[derive(Clone, Debug, Deserialize)]
pub struct CompilerConfig {
    pub compiler: String,
    #[serde(default)]
    pub option: String,
}

/// Per-test-case resource ceilings. New in this expansion (SPEC_FULL.md §6):
/// the original hardcodes these at the call site rather than exposing them
/// to a config file.
#[derive(Clone, Debug, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_cpu_time_ms")]
    pub cpu_time_ms: u64,
    #[serde(default = "default_memory_mb")]
    pub memory_mb: i64,
}

fn default_cpu_time_ms() -> u64 {
    10_000
}

fn default_memory_mb() -> i64 {
    256
}

impl Default for LimitsConfig {
    fn default() -> LimitsConfig {
        LimitsConfig {
            cpu_time_ms: default_cpu_time_ms(),
            memory_mb: default_memory_mb(),
        }
    }
}

impl LimitsConfig {
    pub fn cpu_time_sec_usec(&self) -> (i64, i64) {
        let sec = (self.cpu_time_ms / 1000) as i64;
        let usec = ((self.cpu_time_ms % 1000) * 1000) as i64;
        (sec, usec)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub testcase: TestCaseConfig,
    pub user: UserConfig,
    pub compiler: CompilerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Parse a `Config` out of YAML text (the format the bundled binary
    /// reads its config file in, matching `serde_yaml` already present in
    /// the teacher's dependency table).
    pub fn from_yaml(text: &str) -> crate::Result<Config> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_eight_keys_plus_limits() {
        let yaml = r#"
testcase:
  dir: /tmp/cases
  in: in
  out: out
user:
  src: sol.cpp
  bin: sol
  out: sol.out
compiler:
  compiler: g++
  option: "-O2 -std=c++17"
limits:
  cpu_time_ms: 2000
  memory_mb: 128
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.testcase.in_ext, "in");
        assert_eq!(config.compiler.compiler, "g++");
        assert_eq!(config.limits.cpu_time_ms, 2000);
        assert_eq!(config.limits.cpu_time_sec_usec(), (2, 0));
    }

    #[test]
    fn limits_default_when_omitted() {
        let yaml = r#"
testcase:
  dir: /tmp/cases
  in: in
  out: out
user:
  src: sol.cpp
  bin: sol
  out: sol.out
compiler:
  compiler: g++
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.limits.memory_mb, default_memory_mb());
        assert_eq!(config.compiler.option, "");
    }
}

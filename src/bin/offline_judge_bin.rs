//! CLI entry point for the `offline-judge` binary: loads a YAML config file,
//! enumerates a test-case directory, compiles and judges one solution
//! against it, and prints a rendered submission result.
//!
//! Grounded on `judge/src/bin/judge-bin.rs`'s `clap::App` +
//! `stderrlog::new().verbosity(...).init()` +
//! `error_chain::ChainedError::display_chain()` top-level error idiom.

extern crate clap;
extern crate error_chain;
extern crate offline_judge;
extern crate stderrlog;

use std::path::PathBuf;

use error_chain::ChainedError;

use offline_judge::config::Config;
use offline_judge::label::{EnglishLabeler, Labeler};
use offline_judge::pipeline::{Limits, Pipeline};
use offline_judge::render::{AnsiRenderer, Render};
use offline_judge::solution::Solution;
use offline_judge::testcase::TestCaseContainer;

error_chain::error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }

    links {
        Judge(offline_judge::Error, offline_judge::ErrorKind);
    }

    foreign_links {
        Io(std::io::Error);
    }
}

fn get_arg_matches() -> clap::ArgMatches<'static> {
    clap::App::new("offline-judge")
        .version("0.1.0")
        .about("Compile, run and judge a single submission against a directory of test cases")
        .arg(
            clap::Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .value_name("FILE")
                .required(true)
                .help("path to a YAML configuration file"),
        )
        .arg(
            clap::Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("increase logging verbosity (may be repeated)"),
        )
        .get_matches()
}

fn do_main() -> Result<()> {
    let matches = get_arg_matches();

    stderrlog::new()
        .quiet(false)
        .verbosity(matches.occurrences_of("verbosity") as usize + 1)
        .init()
        .unwrap();

    let config_path = PathBuf::from(matches.value_of("config").unwrap());
    let config_text = std::fs::read_to_string(&config_path)?;
    let config = Config::from_yaml(&config_text)?;

    let test_cases = TestCaseContainer::from_dir(
        &config.testcase.dir,
        &config.testcase.in_ext,
        &config.testcase.out_ext,
    )?;
    log::info!("loaded {} test case(s) from {:?}", test_cases.len(), config.testcase.dir);

    let solution = Solution::new(config.user.src.clone(), config.user.bin.clone(), config.user.out.clone());

    let options: Vec<String> = if config.compiler.option.is_empty() {
        Vec::new()
    } else {
        config.compiler.option.split_whitespace().map(str::to_string).collect()
    };

    let (cpu_time_sec, cpu_time_usec) = config.limits.cpu_time_sec_usec();
    let limits = Limits {
        cpu_time_sec,
        cpu_time_usec,
        memory_limit_mb: config.limits.memory_mb,
    };

    let pipeline = Pipeline::new();
    let result = pipeline.run(&solution, &test_cases, &config.compiler.compiler, &options, limits)?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    AnsiRenderer.render_submission(&mut handle, &result)?;
    println!("{}", EnglishLabeler.label_submission(&result));

    if result.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn main() {
    if let Err(e) = do_main() {
        eprintln!("error: {}", e.display_chain());
        std::process::exit(2);
    }
}

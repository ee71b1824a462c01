//! Runtime tests with a substituted configuration loader.

use std::ffi::OsString;
use std::process::ExitCode;

use refork_config::Config;
use rstest::rstest;

use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

struct StubLoader(Config);

impl ConfigLoader for StubLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.0.clone())
    }
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str], config: Config) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        run_with_loader(args.iter().map(OsString::from), &mut io, &StubLoader(config))
    };
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf-8"),
        stderr: String::from_utf8(stderr).expect("stderr utf-8"),
    }
}

#[test]
fn list_steps_prints_the_plan() {
    let outcome = invoke(&["refork", "--list-steps"], Config::default());
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stderr.is_empty(), "{}", outcome.stderr);
    let lines: Vec<&str> = outcome.stdout.lines().collect();
    assert_eq!(
        lines.first().copied(),
        Some("recipe otto-js (upstream github.com/robertkrimen/otto)")
    );
    assert!(lines.contains(&" 1. $ go fmt"));
    assert!(lines.contains(&" 4. rename *otto*.go: otto -> js"));
    assert!(lines.contains(&"27. patch -p0"));
    assert!(lines.contains(&"generate doc.go"));
    assert_eq!(lines.last().copied(), Some("verify: $ go test"));
}

#[rstest]
#[case::help("--help", "Usage: refork")]
#[case::version("--version", "refork ")]
fn help_and_version_go_to_stdout(#[case] flag: &str, #[case] expected: &str) {
    let outcome = invoke(&["refork", flag], Config::default());
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains(expected), "{}", outcome.stdout);
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let outcome = invoke(&["refork", "--bogus"], Config::default());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("--bogus"), "{}", outcome.stderr);
}

#[test]
fn unknown_recipe_lists_the_available_ones() {
    let outcome = invoke(&["refork", "--recipe", "lua-js"], Config::default());
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome
            .stderr
            .contains("unknown recipe 'lua-js'; available recipes: otto-js"),
        "{}",
        outcome.stderr
    );
}

#[test]
fn unset_search_path_fails_the_precondition_check() {
    let config = Config {
        search_path_var: String::from("REFORK_CLI_TEST_SEARCH_PATH_UNSET"),
        ..Config::default()
    };
    let outcome = invoke(&["refork"], config);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains(
            "precondition check failed: environment variable \
             REFORK_CLI_TEST_SEARCH_PATH_UNSET is unset or empty"
        ),
        "{}",
        outcome.stderr
    );
    assert!(outcome.stdout.is_empty());
}

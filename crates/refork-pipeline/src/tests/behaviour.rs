//! Behaviour-driven tests for fork runs.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::{TIMESTAMP, WidgetSource, Workspace};
use crate::{
    CommandError, CommandOutput, CommandRunner, CommandSpec, Driver, PipelineOptions, RunFailure,
    RunReport,
};

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

/// Runner that records every command and fails the one named in `failing`.
#[derive(Debug, Clone, Default)]
struct ScriptedRunner {
    failing: Option<String>,
    log: Rc<RefCell<Vec<String>>>,
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec, _dir: &Path) -> Result<CommandOutput, CommandError> {
        let line = command.to_string();
        self.log.borrow_mut().push(line.clone());
        if self.failing.as_deref() == Some(line.as_str()) {
            return Ok(CommandOutput::new(Some(1), format!("{line}: FAIL\n")));
        }
        Ok(CommandOutput::success(""))
    }
}

struct TestWorld {
    workspace: Option<Workspace>,
    runner: ScriptedRunner,
    source: WidgetSource,
    outcome: Option<Result<RunReport, RunFailure>>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld {
        workspace: None,
        runner: ScriptedRunner::default(),
        source: WidgetSource::default(),
        outcome: None,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

fn workspace(world: &TestWorld) -> &Workspace {
    world.workspace.as_ref().expect("workspace should be prepared")
}

fn run(world: &mut TestWorld, force_clean: bool) {
    let options = PipelineOptions {
        verbose: false,
        force_clean,
    };
    let workspace = workspace(world);
    let outcome = Driver::new(world.runner.clone(), workspace.var(), workspace.work_dir())
        .with_options(options)
        .with_timestamp(TIMESTAMP)
        .run(&world.source);
    world.outcome = Some(outcome);
}

fn failure(world: &TestWorld) -> &RunFailure {
    match world.outcome.as_ref().expect("run should have happened") {
        Ok(report) => panic!("expected failure, got {report:?}"),
        Err(failure) => failure,
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("an upstream widget project with an empty working directory")]
fn given_workspace(world: &mut TestWorld) {
    world.workspace = Some(Workspace::new());
}

#[given("the working directory already holds {name}")]
fn given_stale_entry(world: &mut TestWorld, name: String) {
    workspace(world).seed(unquote(&name), "stale\n");
}

#[given("the command {line} fails")]
fn given_failing_command(world: &mut TestWorld, line: String) {
    world.runner.failing = Some(unquote(&line).to_owned());
}

#[given("a strict rule that matches nothing")]
fn given_strict_rule(world: &mut TestWorld) {
    world.source.strict_rule = true;
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the fork is run normally")]
fn when_run(world: &mut TestWorld) {
    run(world, false);
}

#[when("the fork is run with force clean")]
fn when_run_force_clean(world: &mut TestWorld) {
    run(world, true);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the run succeeds")]
fn then_succeeds(world: &mut TestWorld) {
    let outcome = world.outcome.as_ref().expect("run should have happened");
    assert!(outcome.is_ok(), "run failed: {outcome:?}");
}

#[then("the run fails at {stage}")]
fn then_fails_at(world: &mut TestWorld, stage: String) {
    let actual = failure(world).stage().to_string();
    assert!(
        actual.starts_with(unquote(&stage)),
        "expected failure at {stage}, got {actual}"
    );
}

#[then("file {name} contains {content}")]
fn then_file_contains(world: &mut TestWorld, name: String, content: String) {
    let text = workspace(world)
        .read(unquote(&name))
        .unwrap_or_else(|| panic!("{name} should exist"));
    assert!(text.contains(unquote(&content)), "{name}: {text}");
}

#[then("file {name} does not exist")]
fn then_file_missing(world: &mut TestWorld, name: String) {
    assert!(workspace(world).read(unquote(&name)).is_none());
}

#[then("the commands run were {commands}")]
fn then_commands_were(world: &mut TestWorld, commands: String) {
    let expected: Vec<&str> = unquote(&commands).split(", ").collect();
    assert_eq!(*world.runner.log.borrow(), expected);
}

#[then("no command was run")]
fn then_no_commands(world: &mut TestWorld) {
    assert!(world.runner.log.borrow().is_empty());
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/fork_run.feature", name = "A clean run produces the fork")]
fn clean_run(world: TestWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fork_run.feature", name = "A stale working directory is refused")]
fn stale_work_dir(world: TestWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fork_run.feature", name = "Force clean replaces stale entries")]
fn force_clean(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/fork_run.feature",
    name = "A failing pre-verification stops the run"
)]
fn failing_pre_verification(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/fork_run.feature",
    name = "A failing step skips post-verification"
)]
fn failing_step(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/fork_run.feature",
    name = "A failing post-verification follows every earlier stage"
)]
fn failing_post_verification(world: TestWorld) {
    let _ = world;
}

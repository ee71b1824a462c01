//! Driver tests against a throwaway search path.

mod behaviour;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mockall::mock;
use mockall::predicate::always;
use once_cell::sync::Lazy;
use refork_rewrite::{
    DocTemplate, FileGlob, LicenseTemplate, Matcher, RenameSpec, RewriteRule, TreePath,
};
use tempfile::TempDir;

use crate::{
    CommandError, CommandOutput, CommandRunner, CommandSpec, Driver, Phase, PipelineError,
    PipelineOptions, PipelineState, Recipe, RecipeContext, RecipeSource, Stage, Step,
};

pub(super) const TIMESTAMP: &str = "2024-01-01T00:00:00Z";
const UPSTREAM: &str = "github.com/acme/widget";

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static NEXT_VAR: AtomicUsize = AtomicUsize::new(0);

mock! {
    Runner {}
    impl CommandRunner for Runner {
        fn run(&self, command: &CommandSpec, dir: &Path) -> Result<CommandOutput, CommandError>;
    }
}

/// A search root holding the upstream widget project and an empty fork
/// directory. The search path variable is unique per workspace and removed
/// on drop.
pub(super) struct Workspace {
    dir: TempDir,
    var: String,
    _guard: MutexGuard<'static, ()>,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = TempDir::new().expect("temp dir");
        let upstream = dir.path().join("src/github.com/acme/widget");
        fs::create_dir_all(upstream.join("parts")).expect("upstream dirs");
        fs::create_dir_all(upstream.join(".git")).expect("upstream git dir");
        fs::write(upstream.join(".git/HEAD"), "ref: refs/heads/main\n").expect("HEAD");
        fs::write(
            upstream.join("widget.go"),
            "package widget\n\nimport \"github.com/acme/widget/parts\"\n",
        )
        .expect("widget.go");
        fs::write(upstream.join("parts/part.go"), "package parts\n").expect("part.go");

        let work = dir.path().join("src/example.org/fork");
        fs::create_dir_all(work.join(".git")).expect("fork git dir");

        let var = format!(
            "REFORK_TEST_SEARCH_PATH_{}",
            NEXT_VAR.fetch_add(1, Ordering::Relaxed)
        );
        // SAFETY: guarded by ENV_LOCK; the variable name is unique to this workspace.
        unsafe { env::set_var(&var, dir.path()) };
        Self {
            dir,
            var,
            _guard: guard,
        }
    }

    pub(super) fn var(&self) -> &str {
        &self.var
    }

    pub(super) fn work_dir(&self) -> PathBuf {
        self.dir.path().join("src/example.org/fork")
    }

    pub(super) fn read(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.work_dir().join(name)).ok()
    }

    pub(super) fn seed(&self, name: &str, content: &str) {
        fs::write(self.work_dir().join(name), content).expect("seed work dir");
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // SAFETY: ENV_LOCK is still held through `_guard`.
        unsafe { env::remove_var(&self.var) };
    }
}

/// Recipe turning the widget project into a gadget fork.
#[derive(Debug, Default)]
pub(super) struct WidgetSource {
    pub(super) strict_rule: bool,
}

impl RecipeSource for WidgetSource {
    fn upstream_import_path(&self) -> &str {
        UPSTREAM
    }

    fn recipe(&self, context: &RecipeContext) -> Result<Recipe, PipelineError> {
        let every_go_file = FileGlob::new("**/*.go")?;
        let mut recipe = Recipe::new(
            "widget-to-gadget",
            LicenseTemplate::new("Widget fork made at {timestamp}."),
        )
        .verify_before(CommandSpec::parse("check pre")?)
        .rule(RewriteRule::substitute(
            "package clause",
            FileGlob::new("*.go")?,
            Matcher::literal("package widget")?,
            "package gadget",
        ))
        .step(Step::Rename(RenameSpec::new(
            FileGlob::new("*widget*.go")?,
            "widget",
            "gadget",
        )?))
        .rule(RewriteRule::substitute(
            "import path",
            every_go_file.clone(),
            Matcher::literal(format!("\"{UPSTREAM}"))?,
            format!("\"{}", context.import_path()),
        ));
        if self.strict_rule {
            recipe = recipe.rule(
                RewriteRule::substitute(
                    "never matched",
                    every_go_file,
                    Matcher::literal("no such text")?,
                    "",
                )
                .require_match(),
            );
        }
        Ok(recipe
            .with_doc(DocTemplate::new(
                TreePath::new("doc.go")?,
                "/*\n\n  {license}\n\n*/\npackage gadget\n",
            ))
            .verify_after(CommandSpec::parse("check post")?))
    }
}

fn driver(workspace: &Workspace, runner: MockRunner, options: PipelineOptions) -> Driver<MockRunner> {
    Driver::new(runner, workspace.var(), workspace.work_dir())
        .with_options(options)
        .with_timestamp(TIMESTAMP)
}

fn command_line(command: &CommandSpec) -> String {
    command.to_string()
}

#[test]
fn successful_run_produces_the_fork() {
    let workspace = Workspace::new();
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .with(always(), always())
        .times(2)
        .returning(|_, _| Ok(CommandOutput::success("ok\n")));

    let report = driver(&workspace, runner, PipelineOptions::default())
        .run(&WidgetSource::default())
        .expect("run succeeds");

    assert_eq!(report.import_path(), "example.org/fork");
    assert_eq!(report.files_loaded(), 2);
    assert_eq!(report.final_state(), PipelineState::Done);
    assert_eq!(
        workspace.read("gadget.go").as_deref(),
        Some(concat!(
            "// Widget fork made at 2024-01-01T00:00:00Z.\n\n",
            "package gadget\n\n",
            "import \"example.org/fork/parts\"\n",
        ))
    );
    assert!(workspace.read("widget.go").is_none());
    assert_eq!(
        workspace.read("parts/part.go").as_deref(),
        Some("// Widget fork made at 2024-01-01T00:00:00Z.\n\npackage parts\n")
    );
    assert_eq!(
        workspace.read("doc.go").as_deref(),
        Some("/*\n\n  Widget fork made at 2024-01-01T00:00:00Z.\n\n*/\npackage gadget\n")
    );
    assert!(workspace.work_dir().join(".git").is_dir());
    assert!(!workspace.work_dir().join(".git/HEAD").exists());
}

#[test]
fn stale_work_dir_fails_before_any_mutation() {
    let workspace = Workspace::new();
    workspace.seed("stale.go", "stale\n");
    let mut runner = MockRunner::new();
    runner.expect_run().never();

    let failure = driver(&workspace, runner, PipelineOptions::default())
        .run(&WidgetSource::default())
        .expect_err("run fails");

    assert_eq!(failure.stage(), &Stage::Precondition);
    assert!(matches!(
        failure.error(),
        PipelineError::WorkDirNotEmpty { entry } if entry == "stale.go"
    ));
    assert_eq!(workspace.read("stale.go").as_deref(), Some("stale\n"));
    assert!(workspace.read("widget.go").is_none());
}

#[test]
fn unset_search_path_is_a_precondition_failure() {
    let workspace = Workspace::new();
    let mut runner = MockRunner::new();
    runner.expect_run().never();

    let failure = Driver::new(runner, "REFORK_TEST_SEARCH_PATH_UNSET", workspace.work_dir())
        .run(&WidgetSource::default())
        .expect_err("run fails");

    assert_eq!(failure.stage(), &Stage::Precondition);
    assert!(matches!(failure.error(), PipelineError::SearchPathUnset { .. }));
}

#[test]
fn failed_pre_verification_stops_before_rewrites() {
    let workspace = Workspace::new();
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(|command, _| command_line(command) == "check pre")
        .times(1)
        .returning(|_, _| Ok(CommandOutput::new(Some(1), "FAIL widget\n")));

    let failure = driver(&workspace, runner, PipelineOptions::default())
        .run(&WidgetSource::default())
        .expect_err("run fails");

    assert_eq!(failure.stage(), &Stage::Verify(Phase::Pre));
    assert_eq!(failure.diagnostic_output(), Some("FAIL widget\n"));
    let loaded = workspace.read("widget.go").expect("snapshot was loaded");
    assert!(loaded.contains("package widget"));
    assert!(workspace.read("doc.go").is_none());
}

#[test]
fn failing_step_skips_doc_and_post_verification() {
    let workspace = Workspace::new();
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .times(1)
        .returning(|_, _| Ok(CommandOutput::success("")));

    let failure = driver(&workspace, runner, PipelineOptions::default())
        .run(&WidgetSource { strict_rule: true })
        .expect_err("run fails");

    assert!(matches!(failure.stage(), Stage::Step { index: 4, .. }));
    assert!(workspace.read("gadget.go").is_some());
    assert!(workspace.read("doc.go").is_none());
}

#[test]
fn failed_post_verification_follows_every_earlier_stage() {
    let workspace = Workspace::new();
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(|command, _| command_line(command) == "check pre")
        .times(1)
        .returning(|_, _| Ok(CommandOutput::success("ok\n")));
    runner
        .expect_run()
        .withf(|command, _| command_line(command) == "check post")
        .times(1)
        .returning(|_, _| Ok(CommandOutput::new(Some(1), "FAIL post\n")));

    let failure = driver(&workspace, runner, PipelineOptions::default())
        .run(&WidgetSource::default())
        .expect_err("run fails");

    assert_eq!(failure.stage(), &Stage::Verify(Phase::Post));
    assert_eq!(failure.diagnostic_output(), Some("FAIL post\n"));
    assert!(workspace.read("gadget.go").is_some());
    assert!(workspace.read("widget.go").is_none());
    assert!(workspace.read("doc.go").is_some());
}

#[test]
fn force_clean_replaces_stale_entries() {
    let workspace = Workspace::new();
    workspace.seed("stale.go", "stale\n");
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .times(2)
        .returning(|_, _| Ok(CommandOutput::success("")));

    let options = PipelineOptions {
        verbose: true,
        force_clean: true,
    };
    driver(&workspace, runner, options)
        .run(&WidgetSource::default())
        .expect("run succeeds");

    assert!(workspace.read("stale.go").is_none());
    assert!(workspace.read("gadget.go").is_some());
}

#[test]
fn commands_run_inside_the_work_dir() {
    let workspace = Workspace::new();
    let expected = workspace.work_dir();
    let mut runner = MockRunner::new();
    runner
        .expect_run()
        .withf(move |_, dir| dir == expected)
        .times(2)
        .returning(|_, _| Ok(CommandOutput::success("")));

    driver(&workspace, runner, PipelineOptions::default())
        .run(&WidgetSource::default())
        .expect("run succeeds");
}

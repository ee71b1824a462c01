//! The fork driver.
//!
//! [`Driver::run`] walks the [`PipelineState`] machine: preconditions,
//! snapshot load, pre-verification, every recipe step, doc generation and
//! post-verification. The first failure stops the run and is reported as a
//! [`RunFailure`] naming the stage; nothing after it executes. Precondition
//! failures leave the working directory untouched.

use std::path::{Path, PathBuf};

use refork_rewrite::{RuleEngine, SourceTree};
use tracing::{debug, error, info, warn};

use crate::PIPELINE_TARGET;
use crate::command::{CommandRunner, CommandSpec, run_checked};
use crate::environment::ForkEnvironment;
use crate::error::{PipelineError, RunFailure};
use crate::recipe::{Recipe, RecipeContext, RecipeSource, Step};
use crate::snapshot::SnapshotLoader;
use crate::state::{Phase, PipelineState, Stage};
use crate::timestamp::license_timestamp;
use crate::workdir::prepare_work_dir;

/// Switches that change how a run behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Log every external command and its output.
    pub verbose: bool,
    /// Remove non-dot entries from the working directory before loading.
    pub force_clean: bool,
}

/// Executes recipes against the working directory.
#[derive(Debug)]
pub struct Driver<R> {
    runner: R,
    search_path_var: String,
    work_dir: PathBuf,
    options: PipelineOptions,
    timestamp: Option<String>,
}

impl<R: CommandRunner> Driver<R> {
    /// Creates a driver that resolves the search path from `search_path_var`
    /// and writes the fork into `work_dir`.
    #[must_use]
    pub fn new(runner: R, search_path_var: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            search_path_var: search_path_var.into(),
            work_dir: work_dir.into(),
            options: PipelineOptions::default(),
            timestamp: None,
        }
    }

    /// Replaces the run options.
    #[must_use]
    pub const fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Pins the license timestamp instead of deriving it per run.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Produces the fork described by `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`RunFailure`] identifying the first stage that failed.
    pub fn run<S>(&self, source: &S) -> Result<RunReport, RunFailure>
    where
        S: RecipeSource + ?Sized,
    {
        let mut run = RunTracker::default();

        let (environment, recipe) =
            run.attempt(Stage::Precondition, || self.check_preconditions(source))?;
        run.report.import_path = environment.import_path().to_owned();
        run.note(format!("fork import path {}", environment.import_path()));

        let tree = SourceTree::new(environment.work_dir());
        let license = recipe.license().render(&self.timestamp());

        let loaded = run.attempt(Stage::Load, || {
            SnapshotLoader::new(license.header(recipe.header_prefix()))
                .load(environment.upstream_dir(), environment.work_dir())
        })?;
        run.report.files_loaded = loaded;
        run.advance(format!("copied {loaded} files"));

        run.attempt(Stage::Verify(Phase::Pre), || {
            self.verify(recipe.pre_verify(), environment.work_dir())
        })?;
        run.advance(format!("{} commands passed", recipe.pre_verify().len()));

        for (offset, step) in recipe.steps().iter().enumerate() {
            let stage = Stage::Step {
                index: offset + 1,
                label: step.to_string(),
            };
            let summary = run.attempt(stage, || self.execute(step, &tree))?;
            run.note(summary);
        }
        run.advance(format!("{} steps applied", recipe.steps().len()));

        let doc = run.attempt(Stage::Doc, || match recipe.doc() {
            Some(template) => {
                template.write(&tree, &license)?;
                Ok(format!("wrote {}", template.path()))
            }
            None => Ok(String::from("no documentation template")),
        })?;
        run.advance(doc);

        run.attempt(Stage::Verify(Phase::Post), || {
            self.verify(recipe.post_verify(), environment.work_dir())
        })?;
        run.advance(format!("{} commands passed", recipe.post_verify().len()));
        run.advance(String::from("fork complete"));

        info!(
            target: PIPELINE_TARGET,
            recipe = recipe.name(),
            import_path = environment.import_path(),
            files = run.report.files_loaded,
            "fork run completed"
        );
        Ok(run.report)
    }

    fn check_preconditions<S>(&self, source: &S) -> Result<(ForkEnvironment, Recipe), PipelineError>
    where
        S: RecipeSource + ?Sized,
    {
        let environment = ForkEnvironment::resolve(
            &self.search_path_var,
            source.upstream_import_path(),
            &self.work_dir,
        )?;
        let recipe = source.recipe(&RecipeContext::new(environment.import_path()))?;
        prepare_work_dir(environment.work_dir(), self.options.force_clean)?;
        Ok((environment, recipe))
    }

    fn timestamp(&self) -> String {
        if let Some(pinned) = &self.timestamp {
            return pinned.clone();
        }
        let mut warnings = Vec::new();
        let timestamp = license_timestamp(&mut warnings);
        for warning in warnings {
            warn!(target: PIPELINE_TARGET, "{warning}");
        }
        timestamp
    }

    fn verify(&self, commands: &[CommandSpec], dir: &Path) -> Result<(), PipelineError> {
        for command in commands {
            run_checked(&self.runner, command, dir, self.options.verbose)?;
        }
        Ok(())
    }

    fn execute(&self, step: &Step, tree: &SourceTree) -> Result<String, PipelineError> {
        let summary = match step {
            Step::Rule(rule) => {
                let report = RuleEngine::new(tree).apply(rule)?;
                format!(
                    "{} replacements in {} files",
                    report.replacements(),
                    report.files_changed()
                )
            }
            Step::Rename(rename) => format!("renamed {} files", rename.apply(tree)?.len()),
            Step::Prune(prune) => format!("removed {} paths", prune.apply(tree)?.len()),
            Step::Command(command) => {
                run_checked(&self.runner, command, tree.root(), self.options.verbose)?;
                String::from("command succeeded")
            }
            Step::Patch(patch) => format!("patched {} files", patch.apply(tree)?.len()),
        };
        Ok(summary)
    }
}

/// Summary of one completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    state: PipelineState,
    summary: String,
}

impl StageReport {
    /// State reached when the stage completed.
    #[must_use]
    pub const fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Short description of what the stage did.
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    import_path: String,
    files_loaded: usize,
    stages: Vec<StageReport>,
}

impl RunReport {
    /// The fork's import path.
    #[must_use]
    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    /// Number of files copied from upstream.
    #[must_use]
    pub const fn files_loaded(&self) -> usize {
        self.files_loaded
    }

    /// Stage summaries in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StageReport] {
        &self.stages
    }

    /// Final state of the run.
    #[must_use]
    pub fn final_state(&self) -> PipelineState {
        self.stages
            .last()
            .map_or(PipelineState::Empty, |stage| stage.state.clone())
    }
}

#[derive(Debug)]
struct RunTracker {
    state: PipelineState,
    report: RunReport,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self {
            state: PipelineState::Empty,
            report: RunReport::default(),
        }
    }
}

impl RunTracker {
    fn attempt<T>(
        &mut self,
        stage: Stage,
        work: impl FnOnce() -> Result<T, PipelineError>,
    ) -> Result<T, RunFailure> {
        debug!(target: PIPELINE_TARGET, stage = %stage, "stage started");
        work().map_err(|cause| {
            error!(target: PIPELINE_TARGET, stage = %stage, error = %cause, "stage failed");
            self.state = PipelineState::Failed(stage.clone());
            RunFailure::new(stage, cause)
        })
    }

    fn note(&mut self, summary: String) {
        debug!(target: PIPELINE_TARGET, state = %self.state, "{summary}");
        self.report.stages.push(StageReport {
            state: self.state.clone(),
            summary,
        });
    }

    fn advance(&mut self, summary: String) {
        if let Some(next) = self.state.successor() {
            info!(target: PIPELINE_TARGET, from = %self.state, to = %next, "state advanced");
            self.state = next;
        }
        self.note(summary);
    }
}

//! Orchestration of fork runs.
//!
//! A run resolves where the upstream project lives, copies a stamped snapshot
//! of it into the working directory, verifies it, applies a [`Recipe`] step
//! by step, writes the package documentation and verifies the result. The
//! [`Driver`] owns that sequence; external tools are reached through the
//! [`CommandRunner`] seam.
//!
//! ```rust,ignore
//! use refork_pipeline::{Driver, PipelineOptions, SystemCommandRunner};
//!
//! let driver = Driver::new(SystemCommandRunner, "GOPATH", ".")
//!     .with_options(PipelineOptions { verbose: true, force_clean: false });
//! let report = driver.run(&my_recipe_source)?;
//! println!("forked as {}", report.import_path());
//! ```

pub mod command;
pub mod driver;
pub mod environment;
pub mod error;
pub mod recipe;
pub mod snapshot;
pub mod state;
pub mod timestamp;
pub mod workdir;

#[cfg(test)]
mod tests;

pub(crate) const PIPELINE_TARGET: &str = "refork::pipeline";
pub(crate) const COMMAND_TARGET: &str = "refork::command";

pub use self::command::{CommandError, CommandOutput, CommandRunner, CommandSpec, SystemCommandRunner};
pub use self::driver::{Driver, PipelineOptions, RunReport, StageReport};
pub use self::environment::ForkEnvironment;
pub use self::error::{PipelineError, RunFailure};
pub use self::recipe::{Recipe, RecipeContext, RecipeSource, Step};
pub use self::snapshot::SnapshotLoader;
pub use self::state::{Phase, PipelineState, Stage};
pub use self::workdir::prepare_work_dir;

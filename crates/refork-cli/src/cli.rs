//! Command-line argument definitions.
//!
//! Settings that shape the run environment (log filter, search path variable,
//! working directory) are owned by `refork-config` and split off before this
//! parser sees the arguments.

use clap::Parser;

/// Command-line interface for the fork automation tool.
#[derive(Parser, Debug)]
#[command(
    name = "refork",
    version,
    about = "Forks an upstream source tree under a new package identity"
)]
pub(crate) struct Cli {
    /// Logs every external command together with its combined output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
    /// Removes every non-dot entry from the working directory before loading.
    #[arg(long, visible_alias = "rm")]
    pub(crate) force_clean: bool,
    /// Prints the recipe plan and exits without touching the file system.
    #[arg(long)]
    pub(crate) list_steps: bool,
    /// Built-in recipe to run.
    #[arg(long, value_name = "NAME", default_value = crate::recipes::DEFAULT_RECIPE)]
    pub(crate) recipe: String,
}

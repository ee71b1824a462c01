//! Shared configuration for the `refork` tool.
//!
//! [`Config`] is layered by `ortho_config`: built-in defaults, then an
//! optional TOML file (`--config-path` or `REFORK_CONFIG_PATH`), then
//! `REFORK_*` environment variables, then command-line flags. Only settings
//! that shape the environment of a run live here; per-run switches such as
//! `--verbose` belong to the command line parser of the binary.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SEARCH_PATH_VAR, DEFAULT_WORK_DIR, default_log_filter_string,
    default_log_format, default_search_path_var, default_work_dir,
};
pub use self::logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for a fork run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "REFORK")]
pub struct Config {
    /// Tracing filter directive, e.g. `info` or `refork::rewrite=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the log stream on stderr.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Name of the environment variable holding the search path list.
    #[ortho_config(default = default_search_path_var())]
    pub search_path_var: String,
    /// Directory the fork is generated in.
    #[ortho_config(default = default_work_dir())]
    pub work_dir: Utf8PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            search_path_var: default_search_path_var(),
            work_dir: default_work_dir(),
        }
    }
}

impl Config {
    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Name of the search path environment variable.
    #[must_use]
    pub fn search_path_var(&self) -> &str {
        &self.search_path_var
    }

    /// Working directory of the run.
    #[must_use]
    pub fn work_dir(&self) -> &Utf8Path {
        &self.work_dir
    }
}

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable holding the search path list the upstream tree is
/// found under.
pub const DEFAULT_SEARCH_PATH_VAR: &str = "GOPATH";

/// Working directory the fork is written into when none is configured.
pub const DEFAULT_WORK_DIR: &str = ".";

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Owned search path variable name.
#[must_use]
pub fn default_search_path_var() -> String {
    DEFAULT_SEARCH_PATH_VAR.to_owned()
}

/// Default working directory.
#[must_use]
pub fn default_work_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_WORK_DIR)
}

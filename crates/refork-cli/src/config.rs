//! Configuration loading helpers for the CLI.
//!
//! Arguments destined for `ortho_config` are separated from the flags the
//! CLI parser owns, so each parser only sees what it understands. The
//! program name is handed to both.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use refork_config::Config;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }

        let (flag, has_inline_value) = match argument_text.split_once('=') {
            Some((name, _)) => (name, true),
            None => (argument_text.as_ref(), false),
        };

        if super::CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value,
            };
        }

        FlagAction::Skip
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) cli_arguments: Vec<OsString>,
}

/// Partitions `args` into configuration and CLI arguments.
///
/// Configuration flags may appear anywhere; a flag without an inline value
/// takes the following argument with it.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut config_arguments: Vec<OsString> = Vec::new();
    let mut cli_arguments: Vec<OsString> = Vec::new();
    let mut remaining = args.iter();

    if let Some(program) = remaining.next() {
        config_arguments.push(program.clone());
        cli_arguments.push(program.clone());
    }

    while let Some(argument) = remaining.next() {
        match OrthoConfigLoader::process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value {
                    config_arguments.extend(remaining.next().cloned());
                }
            }
            FlagAction::Skip => cli_arguments.push(argument.clone()),
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        cli_arguments,
    }
}

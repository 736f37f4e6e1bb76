use std::path::PathBuf;

use clap::ArgMatches;

/// Inputs and outputs of an analysis of source files.
#[derive(Clone, Default)]
pub struct DeadIO {
    pub files: Vec<PathBuf>,
    pub models: Option<PathBuf>,
    pub arch: Option<String>,
    pub main: Option<String>,
    pub whitelist: Option<PathBuf>,
    pub blacklist: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl DeadIO {
    pub fn from_args(args: &ArgMatches) -> Self {
        DeadIO {
            files: path_values(args, "paths"),
            models: path_value(args, "models"),
            arch: string_value(args, "arch"),
            main: string_value(args, "main"),
            whitelist: path_value(args, "whitelist"),
            blacklist: path_value(args, "blacklist"),
            output: path_value(args, "output"),
        }
    }
}

/// Inputs and outputs of a translation of a symbol table.
#[derive(Clone, Default)]
pub struct TranslateIO {
    pub symbols: PathBuf,
    pub output: Option<PathBuf>,
}

impl TranslateIO {
    pub fn from_args(args: &ArgMatches) -> Self {
        TranslateIO {
            symbols: path_value(args, "symbols").unwrap_or_default(),
            output: path_value(args, "output"),
        }
    }
}

/// Inputs of a satisfiability check.
#[derive(Clone, Default)]
pub struct SatIO {
    pub formula: String,
    pub model: Option<PathBuf>,
    pub configuration: Option<PathBuf>,
}

impl SatIO {
    pub fn from_args(args: &ArgMatches) -> Self {
        SatIO {
            formula: string_value(args, "formula").unwrap_or_default(),
            model: path_value(args, "model"),
            configuration: path_value(args, "configuration"),
        }
    }
}

fn path_value(args: &ArgMatches, id: &str) -> Option<PathBuf> {
    match args.try_get_one::<PathBuf>(id) {
        Ok(Some(path)) => Some(path.clone()),
        _ => None,
    }
}

fn path_values(args: &ArgMatches, id: &str) -> Vec<PathBuf> {
    match args.try_get_many::<PathBuf>(id) {
        Ok(Some(paths)) => paths.cloned().collect(),
        _ => Vec::default(),
    }
}

fn string_value(args: &ArgMatches, id: &str) -> Option<String> {
    match args.try_get_one::<String>(id) {
        Ok(Some(value)) => Some(value.clone()),
        _ => None,
    }
}

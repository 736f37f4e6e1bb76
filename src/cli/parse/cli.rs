use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn cli() -> Command {
    dead_args(Command::new("undertaker")
        .about("Finds dead and undead conditional blocks in source files")
        .version(env!("CARGO_PKG_VERSION"))
        .args_conflicts_with_subcommands(true))

        .subcommand(dead_args(Command::new("dead")
            .about("Analyse source files for dead and undead blocks (the default)")))

        .subcommand(check_args(Command::new("cnf")
            .about("Translate a Kconfig symbol table to a model in the CNF format"))

            .arg(Arg::new("symbols")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("A JSON dump of the symbol table of a Kconfig front end."))

            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required(false)
                .num_args(1)
                .help("The file to write the model to.
Default: Standard output")))

        .subcommand(check_args(Command::new("sat")
            .about("Check the satisfiability of a formula"))

            .arg(Arg::new("formula")
                .required(true)
                .help("The formula, e.g. 'CONFIG_A && !(CONFIG_B || B0)'."))

            .arg(Arg::new("model")
                .short('m')
                .long("model")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required(false)
                .num_args(1)
                .help("A model in the CNF format to check the formula on top of."))

            .arg(Arg::new("configuration")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required(false)
                .num_args(1)
                .help("A (partial) Kconfig configuration, whose values are assumed.
Requires a model, for the types of symbols.")))
}

/// Arguments of each satisfiability check.
fn check_args(command: Command) -> Command {
    command
        .arg(Arg::new("time_limit")
            .long("timeout")
            .short('t')
            .value_name("SECONDS")
            .value_parser(value_parser!(u64))
            .required(false)
            .num_args(1)
            .help("Time limit for a single check in seconds.
Default: No limit"))

        .arg(Arg::new("constant_policy")
            .long("constant-policy")
            .value_name("POLICY")
            .value_parser(["bound", "free"])
            .required(false)
            .num_args(1)
            .help("How constants are compiled.
Default: free

bound: Constants are literals of a single variable bound to true.
free:  Constants are folded away."))

        .arg(Arg::new("no_simplify")
            .long("no-simplify")
            .action(ArgAction::SetTrue)
            .help("Compile expressions as given, without simplification."))
}

fn dead_args(command: Command) -> Command {
    check_args(command)
        .arg(Arg::new("paths")
            .required(false)
            .trailing_var_arg(true)
            .num_args(0..)
            .value_parser(value_parser!(PathBuf))
            .help("The source files to analyse."))

        .arg(Arg::new("models")
            .short('m')
            .long("models")
            .value_name("DIR")
            .value_parser(value_parser!(PathBuf))
            .required(false)
            .num_args(1)
            .help("A directory of models, '*.model' (RSF) or '*.cnf' files named by architecture.
Without models only defects of the code itself are found."))

        .arg(Arg::new("arch")
            .short('a')
            .long("arch")
            .value_name("ARCH")
            .required(false)
            .num_args(1)
            .help("Load the model of this architecture only."))

        .arg(Arg::new("main")
            .short('M')
            .long("main")
            .value_name("ARCH")
            .required(false)
            .num_args(1)
            .help("The architecture of the primary model.
Default: The architecture given to '--arch', or the first architecture by name."))

        .arg(Arg::new("whitelist")
            .short('w')
            .long("whitelist")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .required(false)
            .num_args(1)
            .help("A file of items, one per line, forced on in every model."))

        .arg(Arg::new("blacklist")
            .short('B')
            .long("blacklist")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .required(false)
            .num_args(1)
            .help("A file of items, one per line, forced off in every model."))

        .arg(Arg::new("crosscheck")
            .short('C')
            .long("crosscheck")
            .action(ArgAction::SetTrue)
            .help("Check referential defects against every model before reporting them.")
            .long_help("Check referential defects against every model before reporting them.

A block which is a defect only because some item is missing from the primary model is checked against every other model.
If some model finds no defect the block is reported as fine on that architecture, and otherwise the defect is global."))

        .arg(Arg::new("jobs")
            .short('j')
            .long("jobs")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .required(false)
            .num_args(1)
            .help("The number of files analysed in parallel.
Default: 1"))

        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("DIR")
            .value_parser(value_parser!(PathBuf))
            .required(false)
            .num_args(1)
            .help("The directory to write reports to.
Default: Alongside each source file"))
}

#[cfg(not(target_env = "msvc"))]
#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = Jemalloc;

use std::{
    fs::File,
    io::{BufReader, Write},
    sync::Arc,
};

use undertaker::{
    checker::SatChecker,
    cnf::{assumptions::AssumptionMap, builder::CnfBuilder, Formula},
    config::Config,
    defect::analyzer::Analyzer,
    expr::parse::Dialect,
    kconfig::{symbols::SymbolTranslator, SymbolTable},
    model::{preset::PresetList, ModelContainer},
    types::err::ErrorKind,
};

mod config_io;
mod parse;

use config_io::{DeadIO, SatIO, TranslateIO};

fn main() {
    #[cfg(feature = "log")]
    env_logger::init();

    let matches = parse::cli::cli().get_matches();

    let (args, command) = match matches.subcommand() {
        Some((command, args)) => (args, command),
        None => (&matches, "dead"),
    };
    let config = parse::config::config_from_args(args);

    let result = match command {
        "cnf" => translate(&config, TranslateIO::from_args(args)),
        "sat" => satisfiability(&config, SatIO::from_args(args)),
        _ => dead(config, DeadIO::from_args(args)),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("E: {e}");
            std::process::exit(1)
        }
    }
}

/// Analyses source files for dead and undead blocks.
fn dead(config: Config, io: DeadIO) -> Result<(), ErrorKind> {
    if io.files.is_empty() {
        return Err(ErrorKind::Io("no source files given".to_string()));
    }

    let mut analyzer = Analyzer::new(config).with_output(io.output.clone());

    if let Some(dir) = &io.models {
        let mut models = match &io.arch {
            Some(arch) => ModelContainer::load_model(dir, arch)?,
            None => ModelContainer::load_models(dir)?,
        };

        let whitelist = read_preset_list(io.whitelist.as_ref(), true)?;
        let blacklist = read_preset_list(io.blacklist.as_ref(), false)?;
        models.apply_presets(&whitelist, &blacklist);

        if let Some(main) = io.main.as_ref().or(io.arch.as_ref()) {
            models.set_main(main)?;
        }
        if let Some(main) = models.main_model() {
            println!("I: Using {} as primary model", main.name());
        }

        analyzer = analyzer.with_models(Arc::new(models));
    } else if io.whitelist.is_some() || io.blacklist.is_some() {
        eprintln!("W: Preset lists have no effect without models");
    }

    let summary = analyzer.analyze_paths(&io.files);
    println!(
        "I: Processed {} files with {} blocks, found {} defects, {} blocks failed",
        summary.files, summary.blocks, summary.defects, summary.failed_blocks
    );

    match summary.failed_files {
        0 => Ok(()),
        failed => Err(ErrorKind::Io(format!("{failed} files could not be processed"))),
    }
}

fn read_preset_list(path: Option<&std::path::PathBuf>, white: bool) -> Result<PresetList, ErrorKind> {
    let mut list = PresetList::default();
    if let Some(path) = path {
        let file = File::open(path)?;
        let count = list.load(BufReader::new(file), white)?;
        println!("I: Read {count} items from {}", path.display());
    }
    Ok(list)
}

/// Translates a Kconfig symbol table to a formula, written in the CNF format.
fn translate(config: &Config, io: TranslateIO) -> Result<(), ErrorKind> {
    let table = SymbolTable::from_json(BufReader::new(File::open(&io.symbols)?))?;

    let mut formula = Formula::from_config(config);
    let builder = CnfBuilder::new(&mut formula, config.constant_policy.value);
    let mut translator = SymbolTranslator::new(builder).with_simplification(config.simplify.value);
    let stats = translator.translate(&table)?;

    match &io.output {
        Some(path) => formula.write_file(path)?,
        None => formula.write(std::io::stdout().lock())?,
    }

    let mut out = std::io::stderr().lock();
    writeln!(out, "I: Translated {} symbols", stats.symbols)?;
    writeln!(out, "I: {} features with string dependencies", stats.features_with_string_dependencies)?;
    writeln!(out, "I: {} string comparisons", stats.total_string_comparisons)?;
    writeln!(out, "I: {} variables, {} clauses", formula.var_count(), formula.clauses().len())?;
    Ok(())
}

/// Checks a formula, optionally on top of a model and a configuration.
fn satisfiability(config: &Config, io: SatIO) -> Result<(), ErrorKind> {
    let model = match &io.model {
        Some(path) => {
            let mut formula = Formula::from_config(config);
            formula.read_file(path)?;
            Some(formula)
        }
        None => None,
    };

    let assumptions = match (&io.configuration, &model) {
        (Some(path), Some(model)) => AssumptionMap::read(model, BufReader::new(File::open(path)?))?,
        (Some(_), None) => {
            eprintln!("W: A configuration has no effect without a model");
            AssumptionMap::default()
        }
        (None, _) => AssumptionMap::default(),
    };

    let mut checker = SatChecker::new(config).with_base(model.as_ref());
    checker.push(Dialect::Cpp, io.formula.as_str());

    match checker.check_assuming(&assumptions)? {
        true => {
            println!("SATISFIABLE");
            for line in checker.configuration() {
                println!("{line}");
            }
        }
        false => {
            println!("UNSATISFIABLE");
            let failed = checker.failed_assumptions();
            if !failed.is_empty() {
                println!("Failed assumptions: {}", failed.join(" "));
            }
        }
    }
    Ok(())
}

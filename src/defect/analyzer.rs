/*!
Analysis of the blocks of files, spread over a pool of workers.

Each block is first checked for being dead and, if not dead, for being undead, against the main model if any.
If crosschecks are enabled, a defect which [needs a crosscheck](BlockDefect::needs_crosscheck) is checked against every other model:

- The first model on which the block is not a defect marks the block as fine for that architecture, and ends the crosscheck.
- If every model finds the defect, the defect is global.

Files are sent over a channel to scoped worker threads, each of which reads, analyses and reports on a file at a time.
Models are shared by the workers and never modified, and each check builds its own formula.
*/

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crossbeam::channel::unbounded;

use crate::{
    blocks::{scanner, CppFile},
    config::Config,
    defect::{BlockDefect, Flavour},
    misc::log::targets::{self},
    model::{ConfigurationModel, ModelContainer},
    types::err::ErrorKind,
};

/// Counts of an analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub blocks: usize,
    pub defects: usize,

    /// Blocks which could not be checked, e.g. due to a time limit.
    pub failed_blocks: usize,

    /// Files which could not be read.
    pub failed_files: usize,
}

impl Summary {
    fn merge(mut self, other: Summary) -> Summary {
        self.files += other.files;
        self.blocks += other.blocks;
        self.defects += other.defects;
        self.failed_blocks += other.failed_blocks;
        self.failed_files += other.failed_files;
        self
    }
}

/// The defects of a file.
#[derive(Debug, Default)]
pub struct FileAnalysis {
    pub defects: Vec<BlockDefect>,
    pub blocks: usize,
    pub failed_blocks: usize,
}

pub struct Analyzer {
    config: Config,
    models: Option<Arc<ModelContainer>>,

    /// The directory reports are written to, or alongside the sources if `None`.
    output: Option<PathBuf>,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Analyzer {
            config,
            models: None,
            output: None,
        }
    }

    pub fn with_models(mut self, models: Arc<ModelContainer>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    fn main_model(&self) -> Option<&dyn ConfigurationModel> {
        self.models.as_ref().and_then(|models| models.main_model())
    }

    /// The defect of block `id` of `file`, if any.
    pub fn analyze_block(&self, file: &CppFile, id: usize) -> Result<Option<BlockDefect>, ErrorKind> {
        let main = self.main_model();

        let mut defect = BlockDefect::new(file, id, Flavour::Dead);
        if !defect.is_defect(main, &self.config)? {
            defect = BlockDefect::new(file, id, Flavour::Undead);
            if !defect.is_defect(main, &self.config)? {
                return Ok(None);
            }
        }

        if !self.config.crosscheck.value || !defect.needs_crosscheck() {
            return Ok(Some(defect));
        }
        let Some(models) = &self.models else {
            return Ok(Some(defect));
        };

        for model in models.models() {
            if defect.arch() == Some(model.name()) {
                continue;
            }
            let mut elsewhere = defect.clone();
            if !elsewhere.is_defect(Some(model), &self.config)? {
                log::debug!(target: targets::DEFECT, "{}:{} is fine on {}", file.filename(), defect.block(), model.name());
                defect.mark_ok(model.name());
                return Ok(Some(defect));
            }
        }

        defect.defect_is_global();
        Ok(Some(defect))
    }

    /// The defects of the blocks of `file`.
    ///
    /// A block which fails to be checked is logged and skipped.
    pub fn analyze_file(&self, file: &CppFile) -> FileAnalysis {
        let mut analysis = FileAnalysis {
            blocks: file.len(),
            ..Default::default()
        };

        for block in file.blocks() {
            match self.analyze_block(file, block.id) {
                Ok(Some(defect)) => analysis.defects.push(defect),
                Ok(None) => {}
                Err(e) => {
                    log::error!(target: targets::DEFECT, "Couldn't process {}:{}: {e}", file.filename(), block.name());
                    analysis.failed_blocks += 1;
                }
            }
        }

        analysis
    }

    /// Reads the file at `path`, analyses its blocks and writes a report for each defect.
    pub fn analyze_path(&self, path: &Path) -> Result<Summary, ErrorKind> {
        let file = scanner::scan_file(path)?;
        let analysis = self.analyze_file(&file);

        for defect in &analysis.defects {
            defect.write_report(self.output.as_deref())?;
        }

        Ok(Summary {
            files: 1,
            blocks: analysis.blocks,
            defects: analysis.defects.len(),
            failed_blocks: analysis.failed_blocks,
            failed_files: 0,
        })
    }

    /// Analyses each of `paths` with the configured number of workers.
    pub fn analyze_paths(&self, paths: &[PathBuf]) -> Summary {
        let (sender, receiver) = unbounded::<&Path>();
        for path in paths {
            let _ = sender.send(path.as_path());
        }
        drop(sender);

        let jobs = std::cmp::max(1, std::cmp::min(self.config.jobs.value, paths.len()));
        log::info!(target: targets::DEFECT, "Analysing {} files with {jobs} workers", paths.len());

        let pool = crossbeam::scope(|scope| {
            let workers: Vec<_> = (0..jobs)
                .map(|_| {
                    let receiver = receiver.clone();
                    scope.spawn(move |_| {
                        let mut summary = Summary::default();
                        for path in receiver.iter() {
                            let result = match self.analyze_path(path) {
                                Ok(result) => result,
                                Err(e) => {
                                    log::error!(target: targets::DEFECT, "Couldn't process {}: {e}", path.display());
                                    Summary {
                                        failed_files: 1,
                                        ..Default::default()
                                    }
                                }
                            };
                            summary = summary.merge(result);
                        }
                        summary
                    })
                })
                .collect();

            workers
                .into_iter()
                .filter_map(|worker| worker.join().ok())
                .fold(Summary::default(), Summary::merge)
        });

        match pool {
            Ok(summary) => summary,
            Err(_) => {
                log::error!(target: targets::DEFECT, "A worker panicked");
                Summary::default()
            }
        }
    }
}

/*!
Classification of dead and undead blocks.

A [BlockDefect] asks up to three questions of a block, each with a larger formula, and the first unsatisfiable formula determines the kind of defect:

1. The block precondition and the code constraints of the block.
   If unsatisfiable, the defect is an [Implementation](DefectKind::Implementation) defect, and global.
2. With a model, the constraints of the model on the items of the block.
   If unsatisfiable, the defect is a [Configuration](DefectKind::Configuration) defect, and global.
3. The constraint that each item missing from the model is off.
   If unsatisfiable, the defect is a [Referential](DefectKind::Referential) defect, and (for now) not global.

The precondition of a dead block `Bn` is `Bn`, and of an undead block `( PARENT && ! Bn )`.
A block without a parent is never undead.

Pieces of a formula are joined by `\n&&\n`, and empty pieces are skipped.

```rust
# use undertaker::{blocks::{BlockKind, CppFile}, config::Config};
# use undertaker::defect::{BlockDefect, DefectKind, Flavour};
let mut file = CppFile::new("kernel/fork.c");
file.open(BlockKind::Ifdef, "CONFIG_A", 1).unwrap();
file.open(BlockKind::If, "!CONFIG_A", 2).unwrap();
file.close(3).unwrap();
file.close(4).unwrap();

let config = Config::default();
let mut defect = BlockDefect::new(&file, 1, Flavour::Dead);
assert_eq!(defect.is_defect(None, &config), Ok(true));
assert_eq!(defect.kind(), DefectKind::Implementation);
assert_eq!(defect.report_filename(), "kernel/fork.c.B1.code.globally.dead");
```
*/

pub mod analyzer;

use std::{
    collections::BTreeSet,
    fmt,
    fs,
    path::{Component, Path, PathBuf},
};

use crate::{
    blocks::CppFile,
    checker::{SatChecker, PIECE_SEPARATOR},
    config::Config,
    expr::{
        parse::Dialect,
        visitor::{Visited, Visitor},
        Arena, ExprId,
    },
    misc::log::targets::{self},
    model::ConfigurationModel,
    rsf::item_db::missing_constraints,
    types::err::{self, ErrorKind},
};

/// The cheapest explanation of a defect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DefectKind {
    None,

    /// The code alone is contradictory.
    Implementation,

    /// The code and the model are contradictory.
    Configuration,

    /// The code and the model are contradictory once items missing from the model are off.
    Referential,
}

impl DefectKind {
    /// The label of the kind in report file names.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Implementation => "code",
            Self::Configuration => "kconfig",
            Self::Referential => "missing",
        }
    }
}

/// Whether a block is checked for being dead or undead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavour {
    Dead,
    Undead,
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dead => write!(f, "dead"),
            Self::Undead => write!(f, "undead"),
        }
    }
}

/// The analysis of a block for one flavour of defect.
#[derive(Clone, Debug)]
pub struct BlockDefect {
    source: String,
    block: String,
    line: usize,
    flavour: Flavour,

    /// `None` for an undead analysis of a block without a parent.
    precondition: Option<String>,
    code_constraints: String,

    kind: DefectKind,
    global: bool,

    /// The architecture of the first model the block was checked against.
    arch: Option<String>,

    /// The formula of the last check.
    formula: String,

    /// Architectures on which the block was found to be fine.
    ok_list: Vec<String>,
}

impl BlockDefect {
    /// An analysis of block `id` of `file`.
    pub fn new(file: &CppFile, id: usize, flavour: Flavour) -> Self {
        let (block, line) = match file.get(id) {
            Some(block) => (block.name(), block.line_start),
            None => (format!("B{id}"), 0),
        };

        let precondition = match flavour {
            Flavour::Dead => Some(block.clone()),
            Flavour::Undead => file
                .parent_name(id)
                .map(|parent| format!("( {parent} && ! {block} )")),
        };

        let code_constraints = match file.get(id) {
            Some(_) => file.code_constraints(id),
            None => String::default(),
        };

        BlockDefect {
            source: file.filename().to_string(),
            block,
            line,
            flavour,
            precondition,
            code_constraints,
            kind: DefectKind::None,
            global: false,
            arch: None,
            formula: String::default(),
            ok_list: Vec::default(),
        }
    }

    /// Determines whether the block is a defect, with respect to `model` if given.
    ///
    /// Any previous verdict is replaced, including whether the defect is global and the formula which established it.
    pub fn is_defect(&mut self, model: Option<&dyn ConfigurationModel>, config: &Config) -> Result<bool, ErrorKind> {
        self.kind = DefectKind::None;
        self.global = false;
        self.formula.clear();

        if self.arch.is_none() {
            self.arch = model.map(|model| model.name().to_string());
        }

        let Some(precondition) = self.precondition.clone() else {
            return Ok(false);
        };

        let mut code = SatChecker::new(config);
        code.push(Dialect::Cpp, precondition.as_str());
        code.push(Dialect::Cpp, self.code_constraints.as_str());

        self.formula = code.text();
        if !code.check()? {
            log::debug!(target: targets::DEFECT, "{}:{} is {} in code", self.source, self.block, self.flavour);
            self.kind = DefectKind::Implementation;
            self.global = true;
            return Ok(true);
        }

        let Some(model) = model else {
            return Ok(false);
        };

        // Checks against the model start from its base formula, if any.
        let mut checker = SatChecker::new(config).with_base(model.base());
        checker.push(Dialect::Cpp, precondition.as_str());
        checker.push(Dialect::Cpp, self.code_constraints.as_str());

        let items = block_items(&[&precondition, &self.code_constraints])?;
        let mut missing = BTreeSet::default();
        let intersection = model.intersect(&items, &mut missing);
        checker.push(intersection.dialect, intersection.constraints);

        self.formula = checker.text();
        if !checker.check()? {
            log::debug!(target: targets::DEFECT, "{}:{} is {} with {}", self.source, self.block, self.flavour, model.name());
            self.kind = DefectKind::Configuration;
            self.global = true;
            return Ok(true);
        }

        checker.push(Dialect::Cpp, missing_constraints(&missing));
        self.formula = checker.text();
        if !checker.check()? {
            log::debug!(target: targets::DEFECT,
                "{}:{} is {} with {} given {} missing items",
                self.source, self.block, self.flavour, model.name(), missing.len());
            self.kind = DefectKind::Referential;
            return Ok(true);
        }

        Ok(false)
    }

    /// Whether the defect should be checked against other models before being reported.
    pub fn needs_crosscheck(&self) -> bool {
        self.kind == DefectKind::Referential && !self.global
    }

    /// Records the block as fine on architecture `arch`.
    pub fn mark_ok(&mut self, arch: &str) {
        self.ok_list.push(arch.to_string());
    }

    pub fn defect_is_global(&mut self) {
        self.global = true;
    }

    /// The code part of the formula of the block, without model constraints.
    pub fn block_precondition(&self) -> String {
        let pieces: Vec<&str> = [self.precondition.as_deref().unwrap_or_default(), self.code_constraints.as_str()]
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .collect();
        pieces.join(PIECE_SEPARATOR)
    }

    pub fn kind(&self) -> DefectKind {
        self.kind
    }

    pub fn flavour(&self) -> Flavour {
        self.flavour
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn arch(&self) -> Option<&str> {
        self.arch.as_deref()
    }

    pub fn block(&self) -> &str {
        &self.block
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn ok_list(&self) -> &[String] {
        &self.ok_list
    }

    /// The name of the report of the defect:
    ///
    /// ```none
    /// <source>.<block>[.<arch>].<code|kconfig|missing>[.globally].<dead|undead>
    /// ```
    ///
    /// The architecture is included if the defect is not global, or is a configuration defect.
    pub fn report_filename(&self) -> String {
        let mut parts = vec![self.source.clone(), self.block.clone()];
        if let Some(arch) = &self.arch {
            if !self.global || self.kind == DefectKind::Configuration {
                parts.push(arch.clone());
            }
        }
        parts.push(self.kind.label().to_string());
        if self.global {
            parts.push("globally".to_string());
        }
        parts.push(self.flavour.to_string());
        parts.join(".")
    }

    /// The content of the report of the defect.
    pub fn report(&self) -> String {
        format!("#{}:{}\n{}\n", self.block, self.line, self.formula)
    }

    /// Writes the report of the defect, alongside the source or below `dir` if given.
    ///
    /// Returns the path of the report, or `None` if the block is not a defect.
    pub fn write_report(&self, dir: Option<&Path>) -> Result<Option<PathBuf>, ErrorKind> {
        if self.kind == DefectKind::None {
            return Ok(None);
        }

        let path = match dir {
            None => PathBuf::from(self.report_filename()),
            Some(dir) => {
                let relative: PathBuf = Path::new(&self.report_filename())
                    .components()
                    .filter(|component| matches!(component, Component::Normal(_)))
                    .collect();
                dir.join(relative)
            }
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            if fs::create_dir_all(parent).is_err() {
                return Err(err::ReportError::OutputDirectory(parent.display().to_string()).into());
            }
        }
        if fs::write(&path, self.report()).is_err() {
            return Err(err::ReportError::Unwritable(path.display().to_string()).into());
        }

        log::info!(target: targets::DEFECT, "Created {}", path.display());
        Ok(Some(path))
    }
}

/// The items of some code constraints, i.e. the names with a `CONFIG_` prefix outside of comparisons and calls.
pub fn block_items(pieces: &[&str]) -> Result<BTreeSet<String>, ErrorKind> {
    let mut arena = Arena::default();
    let mut items = BTreeSet::default();
    for piece in pieces.iter().filter(|piece| !piece.trim().is_empty()) {
        let root = arena.parse(piece)?;
        match arena.accept(root, &mut ItemCollector) {
            Ok(found) => items.extend(found),
            Err(never) => match never {},
        }
    }
    Ok(items)
}

/// Collects the names of items, ignoring the operands of opaque nodes.
struct ItemCollector;

impl Visitor for ItemCollector {
    type Output = BTreeSet<String>;
    type Error = std::convert::Infallible;

    fn visit(
        &mut self,
        _arena: &Arena,
        _id: ExprId,
        node: Visited<'_, Self::Output>,
    ) -> Result<Self::Output, Self::Error> {
        let items = match node {
            Visited::Const(_) | Visited::Any(..) | Visited::Call(..) => BTreeSet::default(),

            Visited::Var(var) => match var.name.starts_with("CONFIG_") {
                true => BTreeSet::from([var.name.clone()]),
                false => BTreeSet::default(),
            },

            Visited::Not(e) => e,

            Visited::And(mut l, r) | Visited::Or(mut l, r) | Visited::Impl(mut l, r) | Visited::Eq(mut l, r) => {
                l.extend(r);
                l
            }
        };
        Ok(items)
    }
}

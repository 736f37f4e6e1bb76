//! Configuration models backed by a formula, as written by `undertaker cnf`.

use std::{collections::BTreeSet, io::BufRead, path::Path};

use regex::Regex;

use crate::{
    cnf::{Formula, CONFIGURATION_SPACE_INCOMPLETE, CONFIGURATION_SPACE_REGEX},
    expr::parse::Dialect,
    misc::log::targets::{self},
    model::{configuration_space, feature_type, ConfigurationModel, Intersection},
    structures::symbol::SymbolType,
    types::err::{self, ErrorKind},
};

/// Prefix of names which stand for files, and are always part of a model.
pub const FILE_PREFIX: &str = "FILE_";

pub struct CnfModel {
    name: String,
    formula: Formula,
    space: Regex,
}

impl CnfModel {
    /// A model named `name` of the given formula.
    pub fn new(name: impl Into<String>, mut formula: Formula) -> Result<Self, ErrorKind> {
        let space = configuration_space(formula.meta_value(CONFIGURATION_SPACE_REGEX))?;
        if formula.var_count() == 0 {
            formula.add_meta_value(CONFIGURATION_SPACE_INCOMPLETE, "1");
        }
        Ok(CnfModel {
            name: name.into(),
            formula,
            space,
        })
    }

    pub fn read(name: impl Into<String>, reader: impl BufRead) -> Result<Self, ErrorKind> {
        let mut formula = Formula::default();
        formula.read(reader)?;
        Self::new(name, formula)
    }

    /// A model from the file at `path`, named by the stem of the path.
    pub fn read_file(path: &Path) -> Result<Self, ErrorKind> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut formula = Formula::default();
        if let Err(e) = formula.read_file(path) {
            log::error!(target: targets::MODEL, "{e}");
            return Err(err::ModelError::Unreadable(path.display().to_string()).into());
        }
        let model = Self::new(name, formula)?;
        log::info!(target: targets::MODEL,
            "Loaded cnf model for {} with {} variables and {} clauses",
            model.name, model.formula.var_count(), model.formula.clauses().len());
        Ok(model)
    }

    /// Whether `symbol` is a variable of a symbol of the model, or a file.
    pub fn contains_symbol(&self, symbol: &str) -> bool {
        symbol.starts_with(FILE_PREFIX) || self.formula.associated_symbol(symbol).is_some()
    }
}

impl ConfigurationModel for CnfModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn intersect(&self, items: &BTreeSet<String>, missing: &mut BTreeSet<String>) -> Intersection {
        let mut pieces = Vec::default();
        let mut valid_items = 0;
        let before = missing.len();

        for feature in self.whitelist() {
            if self.formula.var(feature).is_some() {
                pieces.push(feature.clone());
            }
        }
        for feature in self.blacklist() {
            if self.formula.var(feature).is_some() {
                pieces.push(format!("!{feature}"));
            }
        }

        for item in items {
            if self.contains_symbol(item) || self.formula.var(item).is_some() {
                valid_items += 1;
            } else if self.in_configuration_space(item)
                && item.len() > 1
                && !item.starts_with(crate::rsf::item_db::FREE_PREFIX)
            {
                missing.insert(item.clone());
            }
        }

        log::debug!(target: targets::MODEL,
            "Out of {} items {} have been put in the missing set using {}",
            items.len(), missing.len() - before, self.name);

        Intersection {
            constraints: pieces.join("\n&& "),
            dialect: Dialect::Model,
            valid_items,
        }
    }

    fn base(&self) -> Option<&Formula> {
        Some(&self.formula)
    }

    fn meta_value(&self, key: &str) -> Option<&[String]> {
        self.formula.meta_value(key)
    }

    fn add_meta_value(&mut self, key: &str, value: &str) {
        self.formula.add_meta_value(key, value);
    }

    fn in_configuration_space(&self, name: &str) -> bool {
        self.space.is_match(name)
    }

    fn symbol_type(&self, feature: &str) -> SymbolType {
        feature_type(feature, |symbol| match self.formula.symbol_type(symbol) {
            SymbolType::Unknown => None,
            known => Some(known),
        })
    }
}

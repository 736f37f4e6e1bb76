/*!
Configuration models, one per architecture.

A [ConfigurationModel] provides the constraints a Kconfig model places on the items used by some code.
Two kinds of model are supported:

- [RSF models](rsf::RsfModel), read from `*.model` files in RSF form and backed by an [item database](crate::rsf::item_db).
  Constraints are the renderings of the backward slice of the items.
- [CNF models](cnf::CnfModel), read from `*.cnf` files as written by `undertaker cnf`.
  The whole formula is the base of each check, and so no slice is required.

In either case:

- The *configuration space* of a model is a regular expression (the meta value `CONFIGURATION_SPACE_REGEX`, by default `^CONFIG_[^ ]+$`) matching the names the model is responsible for.
  Only names in the configuration space may be missing from a model.
- A model is *complete* unless it has the meta value `CONFIGURATION_SPACE_INCOMPLETE`, which an empty model always has.
- Features may be [whitelisted](ConfigurationModel::add_feature_to_whitelist) (forced on) and [blacklisted](ConfigurationModel::add_feature_to_blacklist) (forced off), recorded as the meta values `ALWAYS_ON` and `ALWAYS_OFF`.

Models are collected in a [ModelContainer], and [preset lists](preset) of features may be loaded from files.
*/

pub mod cnf;
pub mod container;
pub mod preset;
pub mod rsf;

pub use container::ModelContainer;

use std::collections::BTreeSet;

use regex::Regex;

use crate::{
    cnf::Formula,
    expr::parse::Dialect,
    structures::symbol::SymbolType,
    types::err::{self},
};

/// The configuration space of a model without a configuration space regex.
pub const DEFAULT_CONFIGURATION_SPACE: &str = "^CONFIG_[^ ]+$";

/// The constraints of a model on some items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Intersection {
    /// Constraints joined by `\n&& `, possibly empty.
    pub constraints: String,

    /// The dialect of the constraints.
    pub dialect: Dialect,

    /// A count of the items known to the model.
    pub valid_items: usize,
}

/// A Kconfig model of some architecture.
pub trait ConfigurationModel: Send + Sync {
    /// The name of the model, typically the architecture.
    fn name(&self) -> &str;

    /// The constraints of the model on `items`, with names in the configuration space unknown to the model added to `missing`.
    fn intersect(&self, items: &BTreeSet<String>, missing: &mut BTreeSet<String>) -> Intersection;

    /// A formula every check against the model starts from, if any.
    fn base(&self) -> Option<&Formula> {
        None
    }

    fn meta_value(&self, key: &str) -> Option<&[String]>;

    fn add_meta_value(&mut self, key: &str, value: &str);

    /// Whether `name` is a name the model is responsible for.
    fn in_configuration_space(&self, name: &str) -> bool;

    /// Whether the model is complete.
    fn is_complete(&self) -> bool {
        self.meta_value(crate::cnf::CONFIGURATION_SPACE_INCOMPLETE).is_none()
    }

    /// The type of the symbol of `feature`, e.g. of `X` for `CONFIG_X_MODULE`.
    fn symbol_type(&self, feature: &str) -> SymbolType;

    fn is_boolean(&self, feature: &str) -> bool {
        self.symbol_type(feature) == SymbolType::Boolean
    }

    fn is_tristate(&self, feature: &str) -> bool {
        self.symbol_type(feature) == SymbolType::Tristate
    }

    fn add_feature_to_whitelist(&mut self, feature: &str) {
        self.add_meta_value(crate::cnf::ALWAYS_ON, feature);
    }

    fn add_feature_to_blacklist(&mut self, feature: &str) {
        self.add_meta_value(crate::cnf::ALWAYS_OFF, feature);
    }

    fn whitelist(&self) -> &[String] {
        self.meta_value(crate::cnf::ALWAYS_ON).unwrap_or(&[])
    }

    fn blacklist(&self) -> &[String] {
        self.meta_value(crate::cnf::ALWAYS_OFF).unwrap_or(&[])
    }
}

/// The configuration space regex given by the meta values of a model, or the default.
pub(crate) fn configuration_space(values: Option<&[String]>) -> Result<Regex, err::ModelError> {
    let pattern = match values.and_then(|values| values.first()) {
        Some(pattern) => {
            log::info!(target: crate::misc::log::targets::MODEL, "Set configuration space regex to '{pattern}'");
            pattern.as_str()
        }
        None => DEFAULT_CONFIGURATION_SPACE,
    };
    Regex::new(pattern).map_err(|_| err::ModelError::InvalidRegex(pattern.to_string()))
}

/// The type of the symbol of `feature`, given a lookup of types by symbol name.
///
/// The `CONFIG_` prefix is optional, and a `_MODULE` suffix is dropped if the name with the suffix is not a symbol.
pub(crate) fn feature_type(feature: &str, lookup: impl Fn(&str) -> Option<SymbolType>) -> SymbolType {
    let symbol = feature.strip_prefix("CONFIG_").unwrap_or(feature);
    lookup(symbol)
        .or_else(|| symbol.strip_suffix("_MODULE").and_then(&lookup))
        .unwrap_or_default()
}

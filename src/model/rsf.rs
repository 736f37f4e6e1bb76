//! Configuration models backed by an item database.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use regex::Regex;

use crate::{
    cnf::{ALWAYS_OFF, ALWAYS_ON, CONFIGURATION_SPACE_INCOMPLETE, CONFIGURATION_SPACE_REGEX},
    expr::parse::Dialect,
    misc::log::targets::{self},
    model::{configuration_space, feature_type, ConfigurationModel, Intersection},
    rsf::{item_db::ItemDb, Rsf},
    structures::symbol::SymbolType,
    types::err::{self, ErrorKind},
};

pub struct RsfModel {
    name: String,
    db: ItemDb,
    meta: BTreeMap<String, Vec<String>>,
    space: Regex,
}

impl RsfModel {
    /// A model named `name` from RSF relations.
    pub fn read(name: impl Into<String>, reader: impl BufRead) -> Result<Self, ErrorKind> {
        let rsf = Rsf::read(reader)?;
        let db = ItemDb::from_rsf(&rsf);

        let mut meta = BTreeMap::default();
        for key in [ALWAYS_ON, ALWAYS_OFF, CONFIGURATION_SPACE_REGEX, CONFIGURATION_SPACE_INCOMPLETE] {
            if let Some(values) = rsf.meta_value(key) {
                meta.insert(key.to_string(), values.to_vec());
            }
        }
        let space = configuration_space(rsf.meta_value(CONFIGURATION_SPACE_REGEX))?;

        let mut model = RsfModel {
            name: name.into(),
            db,
            meta,
            space,
        };
        if model.db.is_empty() {
            model.add_meta_value(CONFIGURATION_SPACE_INCOMPLETE, "1");
        }
        for feature in model.whitelist().to_vec() {
            model.db.whitelist(feature);
        }
        Ok(model)
    }

    /// A model from the file at `path`, named by the stem of the path.
    pub fn read_file(path: &Path) -> Result<Self, ErrorKind> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(_) => return Err(err::ModelError::Unreadable(path.display().to_string()).into()),
        };
        let model = Self::read(name, BufReader::new(file))?;
        log::info!(target: targets::MODEL, "Loaded rsf model for {}", model.name);
        Ok(model)
    }

    pub fn item_db(&self) -> &ItemDb {
        &self.db
    }
}

impl ConfigurationModel for RsfModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn intersect(&self, items: &BTreeSet<String>, missing: &mut BTreeSet<String>) -> Intersection {
        let always_on = self.whitelist();
        let always_off = self.blacklist();

        let start = items
            .iter()
            .chain(always_on)
            .chain(always_off)
            .cloned();
        let before = missing.len();
        let (constraints, valid_items) = self.db.intersect(start, |name| self.in_configuration_space(name), missing);

        let mut pieces = Vec::default();
        if !constraints.is_empty() {
            pieces.push(constraints);
        }
        // Whitelisted features count as known, so are forced on even without an item of their own.
        // Blacklisted features without an item are left to the missing set.
        for feature in always_on {
            if self.db.is_known(feature) {
                pieces.push(feature.clone());
            }
        }
        for feature in always_off {
            if self.db.is_known(feature) {
                pieces.push(format!("!{feature}"));
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

    fn meta_value(&self, key: &str) -> Option<&[String]> {
        self.meta.get(key).map(|values| values.as_slice())
    }

    fn add_meta_value(&mut self, key: &str, value: &str) {
        if key == ALWAYS_ON {
            self.db.whitelist(value);
        }
        let values = self.meta.entry(key.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    fn in_configuration_space(&self, name: &str) -> bool {
        self.space.is_match(name)
    }

    fn symbol_type(&self, feature: &str) -> SymbolType {
        feature_type(feature, |symbol| self.db.symbol_type(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"
Item A boolean
Item B tristate
Item C boolean
Depends A "B"
Depends C "!A"
UNDERTAKER_SET ALWAYS_OFF CONFIG_C
"#;

    fn model() -> RsfModel {
        RsfModel::read("x86", MODEL.as_bytes()).unwrap()
    }

    #[test]
    fn intersection() {
        let model = model();
        let mut missing = BTreeSet::default();
        let items = BTreeSet::from(["CONFIG_A".to_string(), "CONFIG_UNKNOWN".to_string(), "OTHER".to_string()]);
        let intersection = model.intersect(&items, &mut missing);

        assert_eq!(intersection.dialect, Dialect::Model);
        assert_eq!(
            intersection.constraints,
            [
                "( CONFIG_A -> (CONFIG_B) )",
                "( CONFIG_B -> (! CONFIG_B_MODULE) )",
                "( CONFIG_B_MODULE -> (! CONFIG_B) )",
                "( CONFIG_C -> (!CONFIG_A) )",
                "!CONFIG_C",
            ]
            .join("\n&& ")
        );
        assert_eq!(intersection.valid_items, 4);
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["CONFIG_UNKNOWN"]);
    }

    #[test]
    fn whitelisted_features() {
        let mut model = model();
        model.add_feature_to_whitelist("CONFIG_EXTRA");
        assert_eq!(model.whitelist(), ["CONFIG_EXTRA".to_string()].as_slice());

        let mut missing = BTreeSet::default();
        let items = BTreeSet::from(["CONFIG_EXTRA".to_string()]);
        let intersection = model.intersect(&items, &mut missing);
        assert!(missing.is_empty());
        assert!(intersection.constraints.contains("\n&& CONFIG_EXTRA\n&& !CONFIG_C"));
    }

    #[test]
    fn unknown_preset_features() {
        let mut model = model();
        model.add_feature_to_whitelist("CONFIG_EXTRA");
        model.add_feature_to_blacklist("CONFIG_GONE");

        let mut missing = BTreeSet::default();
        let items = BTreeSet::from(["CONFIG_A".to_string()]);
        let intersection = model.intersect(&items, &mut missing);

        assert!(intersection.constraints.ends_with("\n&& CONFIG_EXTRA\n&& !CONFIG_C"));
        assert!(!intersection.constraints.contains("CONFIG_GONE"));
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["CONFIG_GONE"]);
    }

    #[test]
    fn types_and_completeness() {
        let model = model();
        assert!(model.is_complete());
        assert!(model.is_tristate("CONFIG_B_MODULE"));
        assert!(model.is_boolean("CONFIG_A"));
        assert_eq!(model.symbol_type("CONFIG_Z"), SymbolType::Unknown);

        let empty = RsfModel::read("empty", "".as_bytes()).unwrap();
        assert!(!empty.is_complete());
    }
}

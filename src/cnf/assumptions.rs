/*!
Assumptions read from a (partial) Kconfig configuration.

A configuration file has lines of the form `CONFIG_X=value` or `# CONFIG_X is not set`.
Each line is translated to values of the variables of the symbol `X`, using the symbol type recorded in a formula:

| Type      | `y`              | `m`                     | otherwise                           |
|-----------|------------------|-------------------------|-------------------------------------|
| boolean   | `CONFIG_X`       | `!CONFIG_X`             | `!CONFIG_X`                         |
| tristate  | `CONFIG_X`       | `CONFIG_X_MODULE`       | `!CONFIG_X`, `!CONFIG_X_MODULE`     |

Values of int, hex and string symbols are not translated, and symbols of unknown type are skipped.

```rust
# use undertaker::cnf::{assumptions::AssumptionMap, Formula};
# use undertaker::structures::symbol::SymbolType;
let mut formula = Formula::default();
formula.set_symbol_type("USB", SymbolType::Tristate);

let config = "CONFIG_USB=m\n# CONFIG_SMP is not set\n";
let map = AssumptionMap::read(&formula, config.as_bytes()).unwrap();
assert_eq!(map.get("CONFIG_USB_MODULE"), Some(true));
assert_eq!(map.len(), 1);
```
*/

use std::{collections::BTreeMap, io::BufRead};

use crate::{
    cnf::GenericFormula,
    misc::log::targets::{self},
    oracle::Oracle,
    structures::symbol::SymbolType,
    types::err::ErrorKind,
};

/// Values of variables, by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssumptionMap {
    values: BTreeMap<String, bool>,
}

impl AssumptionMap {
    /// Reads a configuration, with symbol types from `formula`.
    pub fn read<O: Oracle>(formula: &GenericFormula<O>, reader: impl BufRead) -> Result<Self, ErrorKind> {
        let mut map = AssumptionMap::default();
        let mut warned = false;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let Some((name, value)) = parse_line(&line) else {
                if !line.starts_with('#') {
                    log::error!(target: targets::CNF, "Failed to parse line '{line}'");
                }
                continue;
            };

            let symbol = &name["CONFIG_".len()..];
            match formula.symbol_type(symbol) {
                SymbolType::Boolean => {
                    map.values.insert(name.to_string(), value == "y");
                }

                SymbolType::Tristate => match value {
                    "y" => {
                        map.values.insert(name.to_string(), true);
                    }
                    "m" => {
                        map.values.insert(format!("{name}_MODULE"), true);
                    }
                    _ => {
                        map.values.insert(name.to_string(), false);
                        map.values.insert(format!("{name}_MODULE"), false);
                    }
                },

                SymbolType::Int | SymbolType::Hex | SymbolType::String => {
                    if !warned {
                        log::warn!(target: targets::CNF, "Values of int, hex and string symbols are not assumed");
                        warned = true;
                    }
                }

                SymbolType::Other | SymbolType::Unknown => {}
            }
        }

        log::debug!(target: targets::CNF, "Read {} assumptions", map.len());
        Ok(map)
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Assumes each value for the next check of `formula`.
    pub fn push_onto<O: Oracle>(&self, formula: &mut GenericFormula<O>) {
        for (name, value) in self.iter() {
            formula.push_named_assumption(name, value);
        }
    }
}

/// The variable and value of a line, if the line is an assignment or a 'not set' comment.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    if let Some(rest) = line.strip_prefix('#') {
        let rest = rest.strip_prefix(|c: char| c.is_whitespace()).unwrap_or(rest);
        let name = rest.strip_suffix(" is not set")?;
        return match name.starts_with("CONFIG_") {
            true => Some((name, "n")),
            false => None,
        };
    }

    let (name, value) = line.split_once('=')?;
    let symbol = name.strip_prefix("CONFIG_")?;
    match !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        true => Some((name, value)),
        false => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::Formula;

    fn formula() -> Formula {
        let mut formula = Formula::default();
        formula.set_symbol_type("SMP", SymbolType::Boolean);
        formula.set_symbol_type("USB", SymbolType::Tristate);
        formula.set_symbol_type("NET", SymbolType::Tristate);
        formula.set_symbol_type("LOG", SymbolType::Int);
        formula.set_symbol_type("NAME", SymbolType::String);
        formula
    }

    #[test]
    fn lines() {
        let config = "\
#
# Automatically generated
#
CONFIG_SMP=y
CONFIG_USB=m

# CONFIG_NET is not set
CONFIG_LOG=17
CONFIG_NAME=\"x\"
CONFIG_UNKNOWN=y
what is this
";
        let map = AssumptionMap::read(&formula(), config.as_bytes()).unwrap();

        assert_eq!(map.get("CONFIG_SMP"), Some(true));
        assert_eq!(map.get("CONFIG_USB"), None);
        assert_eq!(map.get("CONFIG_USB_MODULE"), Some(true));
        assert_eq!(map.get("CONFIG_NET"), Some(false));
        assert_eq!(map.get("CONFIG_NET_MODULE"), Some(false));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn boolean_values_other_than_y() {
        let map = AssumptionMap::read(&formula(), "CONFIG_SMP=m\n".as_bytes()).unwrap();
        assert_eq!(map.get("CONFIG_SMP"), Some(false));
    }

    #[test]
    fn parsing() {
        assert_eq!(parse_line("#CONFIG_A is not set"), Some(("CONFIG_A", "n")));
        assert_eq!(parse_line("# CONFIG_A is not set"), Some(("CONFIG_A", "n")));
        assert_eq!(parse_line("# A is not set"), None);
        assert_eq!(parse_line("CONFIG_A=\"a=b\""), Some(("CONFIG_A", "\"a=b\"")));
        assert_eq!(parse_line("CONFIG_A-B=y"), None);
        assert_eq!(parse_line("A=y"), None);
    }

    #[test]
    fn pushed_assumptions() {
        let mut formula = formula();
        let a = formula.add_var("CONFIG_SMP") as i32;
        let b = formula.add_var("CONFIG_USB") as i32;
        formula.add_clause(&[a, b]).unwrap();

        let map = AssumptionMap::read(&formula, "# CONFIG_SMP is not set\n".as_bytes()).unwrap();
        map.push_onto(&mut formula);
        assert_eq!(formula.check_satisfiable(), Ok(true));
        assert_eq!(formula.deref_name("CONFIG_USB"), Some(true));

        let map =
            AssumptionMap::read(&formula, "CONFIG_SMP=n\nCONFIG_USB=n\n".as_bytes()).unwrap();
        map.push_onto(&mut formula);
        assert_eq!(formula.check_satisfiable(), Ok(false));
    }
}

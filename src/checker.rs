/*!
Satisfiability checks of formulas given as text.

A [SatChecker] collects pieces of text, each an expression in some [dialect](Dialect), and checks the satisfiability of their conjunction.
Each check builds a fresh formula, starting from a copy of the base formula of a model if one is given, and so checkers are independent of each other.

```rust
# use undertaker::{checker::SatChecker, config::Config, expr::parse::Dialect};
let config = Config::default();
let mut checker = SatChecker::new(&config);
checker.push(Dialect::Cpp, "( B1 <-> B0 && CONFIG_A )");
checker.push(Dialect::Cpp, "B1");
checker.push(Dialect::Model, "");
assert_eq!(checker.check(), Ok(true));
assert_eq!(checker.configuration(), vec!["CONFIG_A=y"]);

checker.push(Dialect::Model, "!CONFIG_A");
assert_eq!(checker.check(), Ok(false));
assert_eq!(checker.text(), "( B1 <-> B0 && CONFIG_A )\n&&\nB1\n&&\n!CONFIG_A");
```
*/

use std::collections::BTreeMap;

use crate::{
    cnf::{assumptions::AssumptionMap, builder::CnfBuilder, Formula},
    config::Config,
    expr::{parse::Dialect, Arena},
    misc::log::targets::{self},
    structures::literal::Literal,
    types::err::ErrorKind,
};

/// The separator of the pieces of a formula.
pub const PIECE_SEPARATOR: &str = "\n&&\n";

pub struct SatChecker<'c> {
    config: &'c Config,

    /// A formula each check starts from.
    base: Option<&'c Formula>,

    pieces: Vec<(Dialect, String)>,

    /// The formula of the last check.
    formula: Option<Formula>,
}

impl<'c> SatChecker<'c> {
    pub fn new(config: &'c Config) -> Self {
        SatChecker {
            config,
            base: None,
            pieces: Vec::default(),
            formula: None,
        }
    }

    /// Starts each check from a copy of `base`.
    pub fn with_base(mut self, base: Option<&'c Formula>) -> Self {
        self.base = base;
        self
    }

    /// Adds `text` to the conjunction, unless blank.
    pub fn push(&mut self, dialect: Dialect, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.pieces.push((dialect, text));
        }
    }

    /// The pieces of the conjunction, joined by [PIECE_SEPARATOR].
    pub fn text(&self) -> String {
        let pieces: Vec<&str> = self.pieces.iter().map(|(_, text)| text.as_str()).collect();
        pieces.join(PIECE_SEPARATOR)
    }

    pub fn check(&mut self) -> Result<bool, ErrorKind> {
        self.check_assuming(&AssumptionMap::default())
    }

    /// Checks the conjunction, with the values of `assumptions` assumed.
    pub fn check_assuming(&mut self, assumptions: &AssumptionMap) -> Result<bool, ErrorKind> {
        let mut formula = Formula::from_config(self.config);
        if let Some(base) = self.base {
            formula.extend_from(base)?;
        }

        let mut arena = Arena::default();
        let mut roots = Vec::with_capacity(self.pieces.len());
        for (dialect, text) in &self.pieces {
            let root = arena.parse_with(text, *dialect)?;
            roots.push(match self.config.simplify.value {
                true => arena.simplify(root),
                false => root,
            });
        }

        let mut builder = CnfBuilder::new(&mut formula, self.config.constant_policy.value);
        for root in roots {
            builder.push_clause(&arena, root)?;
        }

        assumptions.push_onto(&mut formula);
        let result = formula.check_satisfiable()?;
        log::trace!(target: targets::CNF, "{} pieces: {result}", self.pieces.len());

        self.formula = Some(formula);
        Ok(result)
    }

    /// Values of the named variables in the model of the last (satisfiable) check.
    pub fn assignment(&self) -> BTreeMap<String, bool> {
        let Some(formula) = &self.formula else {
            return BTreeMap::default();
        };
        formula
            .names()
            .filter_map(|(name, id)| formula.deref(id).map(|value| (name.to_string(), value)))
            .collect()
    }

    /// The assignment of `CONFIG_` variables, as lines of a Kconfig configuration.
    ///
    /// The value of `CONFIG_X_MODULE` is given as `CONFIG_X=m` when `CONFIG_X` is a variable.
    pub fn configuration(&self) -> Vec<String> {
        let assignment = self.assignment();
        let mut lines = Vec::default();

        for (name, value) in &assignment {
            if !name.starts_with("CONFIG_") {
                continue;
            }
            if let Some(symbol) = name.strip_suffix("_MODULE") {
                if assignment.contains_key(symbol) {
                    continue;
                }
            }
            let module = assignment.get(&format!("{name}_MODULE")).copied().unwrap_or(false);
            lines.push(match (value, module) {
                (true, _) => format!("{name}=y"),
                (false, true) => format!("{name}=m"),
                (false, false) => format!("# {name} is not set"),
            });
        }

        lines
    }

    /// The assumptions responsible for the last check being unsatisfiable, as names with `!` for negative assumptions.
    pub fn failed_assumptions(&self) -> Vec<String> {
        let Some(formula) = &self.formula else {
            return Vec::default();
        };
        formula
            .failed_assumptions()
            .into_iter()
            .filter_map(|literal| {
                let name = formula.name_of(literal.atom())?;
                Some(match literal.polarity() {
                    true => name.to_string(),
                    false => format!("!{name}"),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::symbol::SymbolType;

    #[test]
    fn pieces_are_conjoined() {
        let config = Config::default();
        let mut checker = SatChecker::new(&config);
        checker.push(Dialect::Cpp, "x -> y");
        checker.push(Dialect::Cpp, "  ");
        assert_eq!(checker.check(), Ok(true));

        checker.push(Dialect::Model, "x & !y");
        assert_eq!(checker.check(), Ok(false));
        assert_eq!(checker.text(), "x -> y\n&&\nx & !y");
    }

    #[test]
    fn base_formulas() {
        let mut base = Formula::default();
        base.set_symbol_type("USB", SymbolType::Tristate);
        let usb = base.add_var("CONFIG_USB") as i32;
        let module = base.add_var("CONFIG_USB_MODULE") as i32;
        base.add_clause(&[-usb, -module]).unwrap();
        base.add_clause(&[usb, module]).unwrap();

        let config = Config::default();
        let mut checker = SatChecker::new(&config).with_base(Some(&base));
        checker.push(Dialect::Cpp, "!CONFIG_USB");
        assert_eq!(checker.check(), Ok(true));
        assert_eq!(checker.configuration(), vec!["CONFIG_USB=m"]);

        checker.push(Dialect::Cpp, "!CONFIG_USB_MODULE");
        assert_eq!(checker.check(), Ok(false));
    }

    #[test]
    fn assumptions() {
        let mut base = Formula::default();
        base.set_symbol_type("A", SymbolType::Boolean);
        base.set_symbol_type("B", SymbolType::Boolean);
        let a = base.add_var("CONFIG_A") as i32;
        let b = base.add_var("CONFIG_B") as i32;
        base.add_clause(&[-a, -b]).unwrap();

        let config_file = "CONFIG_A=y\nCONFIG_B=y\n";
        let assumptions = AssumptionMap::read(&base, config_file.as_bytes()).unwrap();

        let config = Config::default();
        let mut checker = SatChecker::new(&config).with_base(Some(&base));
        assert_eq!(checker.check_assuming(&assumptions), Ok(false));

        let mut failed = checker.failed_assumptions();
        failed.sort();
        assert_eq!(failed, vec!["CONFIG_A", "CONFIG_B"]);
    }

    #[test]
    fn parse_errors_fail_the_check() {
        let config = Config::default();
        let mut checker = SatChecker::new(&config);
        checker.push(Dialect::Cpp, "A &&");
        assert!(matches!(checker.check(), Err(ErrorKind::Parse(_))));
    }
}

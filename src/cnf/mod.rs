/*!
Formulas in conjunctive normal form, with names, symbol types and meta values.

A formula is a list of clauses over variables `1..=N`, together with:

- A bijection between *named* variables and their numbers.
  Auxiliary variables (e.g. from the [Tseitin builder](builder)) are unnamed.
- A table from Kconfig symbol names to [symbol types](SymbolType), and a table of *associated* symbols, from `CONFIG_X` (and `CONFIG_X_MODULE` for tristate symbols) to `X`.
- Meta values, from a key to an ordered list of distinct strings.
  The keys [ALWAYS_ON] and [ALWAYS_OFF] list variables a model forces on or off.

Variables are allocated monotonically and never reused.

Each formula owns an [oracle](crate::oracle), and clauses are passed to the oracle incrementally, on each check.
So, formulas are independent of each other and may be checked in any interleaving.

```rust
# use undertaker::cnf::Formula;
let mut formula = Formula::default();
let x = formula.add_var("x") as i32;
let y = formula.add_var("y") as i32;

formula.add_clause(&[-x, y]).unwrap();
formula.push_named_assumption("x", true);
formula.push_named_assumption("y", false);
assert_eq!(formula.check_satisfiable(), Ok(false));

// Assumptions apply to a single check.
assert_eq!(formula.check_satisfiable(), Ok(true));
```
*/

pub mod assumptions;
pub mod builder;
pub mod io;

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use crate::{
    config::Config,
    misc::log::targets::{self},
    oracle::{Oracle, Report, Solver},
    structures::{
        literal::{Atom, IntLiteral, Literal},
        symbol::SymbolType,
    },
    types::err::{self, ErrorKind},
};

/// Meta key of variables forced on.
pub const ALWAYS_ON: &str = "ALWAYS_ON";

/// Meta key of variables forced off.
pub const ALWAYS_OFF: &str = "ALWAYS_OFF";

/// Meta key of a regular expression matching the names a model is responsible for.
pub const CONFIGURATION_SPACE_REGEX: &str = "CONFIGURATION_SPACE_REGEX";

/// Meta key whose presence marks a model as incomplete.
pub const CONFIGURATION_SPACE_INCOMPLETE: &str = "CONFIGURATION_SPACE_INCOMPLETE";

/// A formula, generic over the oracle used to check satisfiability.
pub struct GenericFormula<O: Oracle> {
    var_count: Atom,

    names: HashMap<String, Atom>,
    atom_names: HashMap<Atom, String>,

    clauses: Vec<Vec<IntLiteral>>,

    /// Literals of a clause under construction.
    pending: Vec<IntLiteral>,

    assumptions: Vec<IntLiteral>,

    symbol_types: BTreeMap<String, SymbolType>,
    associated: HashMap<String, String>,
    meta: BTreeMap<String, Vec<String>>,

    oracle: O,

    /// A count of clauses passed to the oracle.
    fed: usize,

    /// The result of the last check, and the assumptions of the check.
    cached: Option<(Vec<IntLiteral>, bool)>,

    time_limit: Option<Duration>,
}

/// A formula using the built-in oracle.
pub type Formula = GenericFormula<Solver>;

impl<O: Oracle> Default for GenericFormula<O> {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl<O: Oracle> GenericFormula<O> {
    pub fn from_config(config: &Config) -> Self {
        GenericFormula {
            var_count: 0,
            names: HashMap::default(),
            atom_names: HashMap::default(),
            clauses: Vec::default(),
            pending: Vec::default(),
            assumptions: Vec::default(),
            symbol_types: BTreeMap::default(),
            associated: HashMap::default(),
            meta: BTreeMap::default(),
            oracle: O::from_config(config),
            fed: 0,
            cached: None,
            time_limit: config.time_limit(),
        }
    }

    /// A fresh, unnamed, variable.
    pub fn new_var(&mut self) -> Atom {
        self.var_count += 1;
        self.var_count
    }

    /// Names variable `id` as `name`, extending the variable count to `id` if required.
    pub fn set_var(&mut self, name: impl Into<String>, id: Atom) {
        let name = name.into();
        self.var_count = std::cmp::max(self.var_count, id);
        if let Some(previous) = self.atom_names.insert(id, name.clone()) {
            self.names.remove(&previous);
        }
        self.names.insert(name, id);
    }

    /// The variable named `name`, if any.
    pub fn var(&self, name: &str) -> Option<Atom> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, id: Atom) -> Option<&str> {
        self.atom_names.get(&id).map(|name| name.as_str())
    }

    /// The variable named `name`, allocated if required.
    pub fn add_var(&mut self, name: &str) -> Atom {
        match self.names.get(name) {
            Some(id) => *id,
            None => {
                let id = self.new_var();
                self.set_var(name, id);
                id
            }
        }
    }

    /// Adds `literal` to the clause under construction.
    pub fn push_var(&mut self, literal: IntLiteral) {
        self.pending.push(literal);
    }

    /// Adds the variable `name`, with the given polarity, to the clause under construction.
    ///
    /// The variable is allocated if required.
    pub fn push_named(&mut self, name: &str, polarity: bool) {
        let literal = IntLiteral::new(self.add_var(name), polarity);
        self.pending.push(literal);
    }

    /// Commits the clause under construction.
    ///
    /// If some literal is invalid the clause is kept under construction, unchanged.
    pub fn push_clause(&mut self) -> Result<(), err::CnfError> {
        for literal in &self.pending {
            self.check_literal(*literal)?;
        }
        let clause = std::mem::take(&mut self.pending);
        self.clauses.push(clause);
        self.cached = None;
        Ok(())
    }

    pub fn add_clause(&mut self, clause: &[IntLiteral]) -> Result<(), err::CnfError> {
        for literal in clause {
            self.check_literal(*literal)?;
        }
        self.clauses.push(clause.to_vec());
        self.cached = None;
        Ok(())
    }

    /// Assumes `literal` for the next check.
    pub fn push_assumption(&mut self, literal: IntLiteral) -> Result<(), err::CnfError> {
        self.check_literal(literal)?;
        self.assumptions.push(literal);
        Ok(())
    }

    /// Assumes the variable `name` has value `value` for the next check.
    ///
    /// Unknown names are ignored.
    pub fn push_named_assumption(&mut self, name: &str, value: bool) {
        match self.var(name) {
            Some(id) => self.assumptions.push(IntLiteral::new(id, value)),
            None => {
                log::debug!(target: targets::CNF, "Ignored assumption on unknown variable {name}");
            }
        }
    }

    /// Determines the satisfiability of the clauses of the formula under the assumptions pushed since the last check.
    ///
    /// The assumptions are consumed by the check.
    pub fn check_satisfiable(&mut self) -> Result<bool, ErrorKind> {
        let assumptions = std::mem::take(&mut self.assumptions);

        if let Some((cached_assumptions, result)) = &self.cached {
            if *cached_assumptions == assumptions {
                return Ok(*result);
            }
        }

        self.oracle.reserve(self.var_count);
        for clause in &self.clauses[self.fed..] {
            self.oracle.add_clause(clause)?;
        }
        self.fed = self.clauses.len();

        let result = match self.oracle.solve_given(&assumptions, self.time_limit)? {
            Report::Satisfiable => true,
            Report::Unsatisfiable => false,
            Report::TimeUp => {
                log::warn!(target: targets::CNF, "Time limit reached after {:?}", self.time_limit);
                self.cached = None;
                return Err(ErrorKind::from(err::OracleError::TimeUp));
            }
        };

        log::trace!(target: targets::CNF,
            "{} variables, {} clauses, {} assumptions: {result}",
            self.var_count, self.clauses.len(), assumptions.len());

        self.cached = Some((assumptions, result));
        Ok(result)
    }

    /// A subset of the assumptions of the last check sufficient for the check to be unsatisfiable.
    pub fn failed_assumptions(&self) -> Vec<IntLiteral> {
        self.oracle.failed_assumptions()
    }

    /// The value of variable `id` in the model of the last (satisfiable) check.
    pub fn deref(&self, id: Atom) -> Option<bool> {
        self.oracle.value_of(id)
    }

    pub fn deref_name(&self, name: &str) -> Option<bool> {
        self.var(name).and_then(|id| self.deref(id))
    }

    /// Records the type of Kconfig symbol `symbol`, and associates the names of its variables with the symbol.
    pub fn set_symbol_type(&mut self, symbol: &str, symbol_type: SymbolType) {
        self.symbol_types.insert(symbol.to_string(), symbol_type);
        self.associated
            .insert(format!("CONFIG_{symbol}"), symbol.to_string());
        if symbol_type == SymbolType::Tristate {
            self.associated
                .insert(format!("CONFIG_{symbol}_MODULE"), symbol.to_string());
        }
    }

    pub fn symbol_type(&self, symbol: &str) -> SymbolType {
        self.symbol_types.get(symbol).copied().unwrap_or_default()
    }

    pub fn symbol_types(&self) -> impl Iterator<Item = (&str, SymbolType)> {
        self.symbol_types.iter().map(|(name, t)| (name.as_str(), *t))
    }

    /// The Kconfig symbol a variable name such as `CONFIG_X_MODULE` belongs to.
    pub fn associated_symbol(&self, name: &str) -> Option<&str> {
        self.associated.get(name).map(|symbol| symbol.as_str())
    }

    /// Adds `value` to the meta values of `key`, unless already present.
    pub fn add_meta_value(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let values = self.meta.entry(key.to_string()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    pub fn meta_value(&self, key: &str) -> Option<&[String]> {
        self.meta.get(key).map(|values| values.as_slice())
    }

    pub fn meta_values(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.meta.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn var_count(&self) -> Atom {
        self.var_count
    }

    pub fn clauses(&self) -> &[Vec<IntLiteral>] {
        &self.clauses
    }

    /// Named variables, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = (&str, Atom)> {
        self.names.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Copies the variables, names and clauses of `base` into the formula.
    ///
    /// Intended for an empty formula, as variables of `base` keep their numbers.
    pub fn extend_from<P: Oracle>(&mut self, base: &GenericFormula<P>) -> Result<(), err::CnfError> {
        self.var_count = std::cmp::max(self.var_count, base.var_count);
        for (name, id) in base.names() {
            self.set_var(name, id);
        }
        for clause in base.clauses() {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    fn check_literal(&self, literal: IntLiteral) -> Result<(), err::CnfError> {
        match literal {
            0 => Err(err::CnfError::ZeroLiteral),
            _ if literal.atom() > self.var_count => Err(err::CnfError::UnallocatedVariable(literal)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_var_is_idempotent() {
        let mut formula = Formula::default();
        let x = formula.add_var("x");
        let y = formula.add_var("y");
        assert_ne!(x, y);
        assert_eq!(formula.add_var("x"), x);
        assert_eq!(formula.var_count(), 2);
        assert_eq!(formula.name_of(y), Some("y"));
    }

    #[test]
    fn set_var_extends_the_count() {
        let mut formula = Formula::default();
        formula.set_var("CONFIG_A", 7);
        assert_eq!(formula.var_count(), 7);
        assert_eq!(formula.new_var(), 8);
        assert_eq!(formula.var("CONFIG_A"), Some(7));
    }

    #[test]
    fn unallocated_literals() {
        let mut formula = Formula::default();
        formula.new_var();
        assert_eq!(formula.add_clause(&[1, -2]), Err(err::CnfError::UnallocatedVariable(-2)));
        assert_eq!(formula.add_clause(&[0]), Err(err::CnfError::ZeroLiteral));
        assert!(formula.clauses().is_empty());
    }

    #[test]
    fn rejected_clauses_stay_pending() {
        let mut formula = Formula::default();
        formula.push_named("a", true);
        formula.push_var(-2);
        assert_eq!(formula.push_clause(), Err(err::CnfError::UnallocatedVariable(-2)));
        assert!(formula.clauses().is_empty());

        formula.new_var();
        formula.push_clause().unwrap();
        assert_eq!(formula.clauses(), &[vec![1, -2]]);
    }

    #[test]
    fn pending_clauses() {
        let mut formula = Formula::default();
        formula.push_named("a", true);
        formula.push_named("b", false);
        formula.push_clause().unwrap();
        assert_eq!(formula.clauses(), &[vec![1, -2]]);

        formula.push_named_assumption("a", false);
        formula.push_named_assumption("b", true);
        assert_eq!(formula.check_satisfiable(), Ok(false));
        let mut failed = formula.failed_assumptions();
        failed.sort();
        assert_eq!(failed, vec![-1, 2]);
    }

    #[test]
    fn unknown_assumptions_are_ignored() {
        let mut formula = Formula::default();
        formula.add_var("a");
        formula.add_clause(&[1]).unwrap();
        formula.push_named_assumption("zzz", false);
        assert_eq!(formula.check_satisfiable(), Ok(true));
        assert_eq!(formula.deref_name("a"), Some(true));
    }

    #[test]
    fn clauses_after_a_check() {
        let mut formula = Formula::default();
        let a = formula.add_var("a") as i32;
        formula.add_clause(&[a]).unwrap();
        assert_eq!(formula.check_satisfiable(), Ok(true));

        let b = formula.add_var("b") as i32;
        formula.add_clause(&[-a, b]).unwrap();
        formula.add_clause(&[-b]).unwrap();
        assert_eq!(formula.check_satisfiable(), Ok(false));
    }

    #[test]
    fn interleaved_formulas() {
        let mut first = Formula::default();
        let mut second = Formula::default();
        let x = first.add_var("x") as i32;
        let y = second.add_var("y") as i32;

        first.add_clause(&[x]).unwrap();
        second.add_clause(&[-y]).unwrap();
        assert_eq!(first.check_satisfiable(), Ok(true));
        first.add_clause(&[-x]).unwrap();
        assert_eq!(second.check_satisfiable(), Ok(true));
        assert_eq!(first.check_satisfiable(), Ok(false));
        assert_eq!(second.deref(y as Atom), Some(false));
    }

    #[test]
    fn symbols() {
        let mut formula = Formula::default();
        formula.set_symbol_type("USB", SymbolType::Tristate);
        formula.set_symbol_type("SMP", SymbolType::Boolean);

        assert_eq!(formula.symbol_type("USB"), SymbolType::Tristate);
        assert_eq!(formula.symbol_type("NONE"), SymbolType::Unknown);
        assert_eq!(formula.associated_symbol("CONFIG_USB_MODULE"), Some("USB"));
        assert_eq!(formula.associated_symbol("CONFIG_SMP"), Some("SMP"));
        assert_eq!(formula.associated_symbol("CONFIG_SMP_MODULE"), None);
    }

    #[test]
    fn meta_values_are_distinct() {
        let mut formula = Formula::default();
        formula.add_meta_value(ALWAYS_ON, "CONFIG_B");
        formula.add_meta_value(ALWAYS_ON, "CONFIG_A");
        formula.add_meta_value(ALWAYS_ON, "CONFIG_B");
        assert_eq!(
            formula.meta_value(ALWAYS_ON),
            Some(["CONFIG_B".to_string(), "CONFIG_A".to_string()].as_slice())
        );
        assert_eq!(formula.meta_value(ALWAYS_OFF), None);
    }

    #[test]
    fn extended_formulas() {
        let mut base = Formula::default();
        let a = base.add_var("a") as i32;
        base.new_var();
        base.add_clause(&[-a]).unwrap();

        let mut formula = Formula::default();
        formula.extend_from(&base).unwrap();
        assert_eq!(formula.var_count(), 2);
        assert_eq!(formula.var("a"), Some(1));

        let b = formula.add_var("b") as i32;
        assert_eq!(b, 3);
        formula.add_clause(&[a, b]).unwrap();
        formula.push_named_assumption("b", false);
        assert_eq!(formula.check_satisfiable(), Ok(false));
        assert!(base.var("b").is_none());
    }
}

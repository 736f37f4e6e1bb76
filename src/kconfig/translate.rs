/*!
Translation of Kconfig expressions to pairs of boolean expressions.

A tristate value is one of `n`, `m` or `y`, and is represented by two booleans, `yes` and `module`, with `n` as `(0, 0)`, `m` as `(0, 1)` and `y` as `(1, 0)`.
A tristate symbol `X` has the variables `CONFIG_X` and `CONFIG_X_MODULE`, and a boolean symbol only `CONFIG_X`.

Connectives follow the tristate algebra (with `&&` as minimum, `||` as maximum and `!` as `2 - x`):

| Expression | `yes`                 | `module`                                                  |
|------------|-----------------------|-----------------------------------------------------------|
| `a && b`   | `a.y && b.y`          | `(a.m \|\| b.m) && (a.y \|\| a.m) && (b.y \|\| b.m)`      |
| `a \|\| b` | `a.y \|\| b.y`        | `!(a.y \|\| b.y) && (a.m \|\| b.m)`                       |
| `!a`       | `!a.y && !a.m`        | `a.m`                                                     |

Comparisons between symbols which are not boolean or tristate (e.g. `STR = "foo"`) are not modelled, and each such comparison is a fresh variable.
*/

use std::collections::HashSet;

use crate::{
    expr::{Arena, ExprId, Relation, FALSE, TRUE},
    misc::log::targets::{self},
    structures::symbol::SymbolType,
    types::err::{self},
};

use super::{KExpr, SymbolTable};

/// The translation of an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TristateRepr {
    pub yes: ExprId,
    pub module: ExprId,

    /// Whether the expression is a value of a string, int or hex symbol, and so has no tristate value.
    pub invalid: bool,

    /// The type of the expression, if the expression is a symbol.
    pub symbol_type: Option<SymbolType>,
}

impl TristateRepr {
    fn constant(yes: bool, module: bool) -> Self {
        TristateRepr {
            yes: if yes { TRUE } else { FALSE },
            module: if module { TRUE } else { FALSE },
            invalid: false,
            symbol_type: Some(SymbolType::Tristate),
        }
    }

    fn compound(yes: ExprId, module: ExprId) -> Self {
        TristateRepr {
            yes,
            module,
            invalid: false,
            symbol_type: None,
        }
    }
}

/// Counters of a single translation run.
#[derive(Debug, Default)]
pub struct TranslationContext {
    /// Unnamed choices named so far.
    pub choices: usize,

    /// Free variables introduced for `=`.
    pub equal: usize,

    /// Free variables introduced for `!=`.
    pub unequal: usize,
}

impl TranslationContext {
    /// A name for the next unnamed choice.
    pub fn choice_name(&mut self) -> String {
        let name = format!("CHOICE_{}", self.choices);
        self.choices += 1;
        name
    }
}

/// Translates the expressions of a table into an arena.
pub struct ExpressionTranslator<'t> {
    table: &'t SymbolTable,

    /// If present, symbols outside the set translate to `n`.
    symbol_set: Option<&'t HashSet<String>>,

    pub arena: Arena,

    /// Comparisons approximated by a free variable.
    comparisons: usize,
}

impl<'t> ExpressionTranslator<'t> {
    pub fn new(table: &'t SymbolTable, symbol_set: Option<&'t HashSet<String>>) -> Self {
        ExpressionTranslator {
            table,
            symbol_set,
            arena: Arena::default(),
            comparisons: 0,
        }
    }

    /// A count of comparisons approximated by a free variable.
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// The `yes` (or, with `Relation::Module`, `module`) variable of `name`.
    pub fn variable(&mut self, name: &str, relation: Relation) -> ExprId {
        let symbol_type = self.table.type_of(name);
        self.arena.kconfig_var(name, relation, Some(symbol_type))
    }

    pub fn process(
        &mut self,
        e: &KExpr,
        context: &mut TranslationContext,
    ) -> Result<TristateRepr, err::TranslationError> {
        match e {
            KExpr::Symbol(name) => Ok(self.symbol(name)),

            KExpr::And(l, r) => {
                let a = self.process(l, context)?;
                let b = self.process(r, context)?;
                let yes = self.arena.and(a.yes, b.yes);

                let either = self.arena.or(a.module, b.module);
                let a_some = self.arena.or(a.yes, a.module);
                let b_some = self.arena.or(b.yes, b.module);
                let module = self.arena.and_all([either, a_some, b_some]);
                Ok(TristateRepr::compound(yes, module))
            }

            KExpr::Or(l, r) => {
                let a = self.process(l, context)?;
                let b = self.process(r, context)?;
                let yes = self.arena.or(a.yes, b.yes);

                let not_yes = self.arena.not(yes);
                let either = self.arena.or(a.module, b.module);
                let module = self.arena.and(not_yes, either);
                Ok(TristateRepr::compound(yes, module))
            }

            KExpr::Not(e) => {
                let a = self.process(e, context)?;
                let not_yes = self.arena.not(a.yes);
                let not_module = self.arena.not(a.module);
                let yes = self.arena.and(not_yes, not_module);
                Ok(TristateRepr::compound(yes, a.module))
            }

            KExpr::Equal(l, r) => {
                if !self.logical_comparison(l, r) {
                    let name = format!("__FREE__EQ{}", context.equal);
                    context.equal += 1;
                    return Ok(self.free_comparison(name));
                }
                let a = self.symbol(l);
                let b = self.symbol(r);
                let both_yes = self.arena.and(a.yes, b.yes);
                let both_module = self.arena.and(a.module, b.module);
                let neither = {
                    let values = [a.yes, b.yes, a.module, b.module];
                    let negations: Vec<ExprId> = values.iter().map(|v| self.arena.not(*v)).collect();
                    self.arena.and_all(negations)
                };
                let yes = self.arena.or_all([both_yes, both_module, neither]);
                Ok(TristateRepr::compound(yes, FALSE))
            }

            KExpr::Unequal(l, r) => {
                if !self.logical_comparison(l, r) {
                    let name = format!("__FREE__NE{}", context.unequal);
                    context.unequal += 1;
                    return Ok(self.free_comparison(name));
                }
                let a = self.symbol(l);
                let b = self.symbol(r);
                let not_a_yes = self.arena.not(a.yes);
                let not_b_yes = self.arena.not(b.yes);
                let not_a_module = self.arena.not(a.module);
                let not_b_module = self.arena.not(b.module);
                let differ_yes = self.arena.or(not_a_yes, not_b_yes);
                let differ_module = self.arena.or(not_a_module, not_b_module);
                let some = self.arena.or_all([a.yes, b.yes, a.module, b.module]);
                let yes = self.arena.and_all([differ_yes, differ_module, some]);
                Ok(TristateRepr::compound(yes, FALSE))
            }

            KExpr::List(members) => {
                let mut alternatives = Vec::with_capacity(members.len());
                let mut modules = Vec::with_capacity(members.len());

                for chosen in members {
                    let mut exclusive = Vec::with_capacity(members.len());
                    for member in members {
                        let yes = self.variable(member, Relation::Yes);
                        match member == chosen {
                            true => exclusive.push(yes),
                            false => exclusive.push(self.arena.not(yes)),
                        }
                    }
                    alternatives.push(self.arena.and_all(exclusive));
                    modules.push(self.variable(chosen, Relation::Module));
                }

                let yes = self.arena.or_all(alternatives);
                let module = self.arena.or_all(modules);
                Ok(TristateRepr::compound(yes, module))
            }

            KExpr::Range(..) => Err(err::TranslationError::UnsupportedFeature(
                "cannot handle ranges yet",
            )),
        }
    }

    fn symbol(&mut self, name: &str) -> TristateRepr {
        match name {
            "n" => return TristateRepr::constant(false, false),
            "y" => return TristateRepr::constant(true, false),
            "m" => return TristateRepr::constant(false, true),
            _ => {}
        }

        let Some(symbol) = self.table.get(name) else {
            // A literal value.
            return TristateRepr {
                yes: FALSE,
                module: FALSE,
                invalid: false,
                symbol_type: Some(SymbolType::Unknown),
            };
        };
        let symbol_type = symbol.symbol_type;

        if symbol_type.is_valued() {
            return TristateRepr {
                yes: FALSE,
                module: FALSE,
                invalid: true,
                symbol_type: Some(symbol_type),
            };
        }

        if symbol.modules {
            return TristateRepr {
                yes: self.arena.kconfig_var(name, Relation::Yes, Some(SymbolType::Boolean)),
                module: FALSE,
                invalid: true,
                symbol_type: Some(SymbolType::Boolean),
            };
        }

        if self.symbol_set.is_some_and(|set| !set.contains(name)) {
            return TristateRepr {
                yes: FALSE,
                module: FALSE,
                invalid: false,
                symbol_type: Some(SymbolType::Boolean),
            };
        }

        let yes = self.arena.kconfig_var(name, Relation::Yes, Some(symbol_type));
        let module = match symbol_type {
            SymbolType::Tristate => self.arena.kconfig_var(name, Relation::Module, Some(symbol_type)),
            _ => FALSE,
        };
        TristateRepr {
            yes,
            module,
            invalid: !symbol_type.is_logical(),
            symbol_type: Some(symbol_type),
        }
    }

    /// Whether either operand of a comparison is a boolean or tristate symbol.
    fn logical_comparison(&self, l: &str, r: &str) -> bool {
        let logical = |name: &str| match name {
            "y" | "m" | "n" => true,
            _ => self.table.type_of(name).is_logical(),
        };
        logical(l) || logical(r)
    }

    fn free_comparison(&mut self, name: String) -> TristateRepr {
        log::trace!(target: targets::KCONFIG, "Comparison approximated by {name}");
        self.comparisons += 1;
        let yes = self.arena.var(name);
        TristateRepr::compound(yes, FALSE)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::kconfig::Symbol;

    fn table() -> SymbolTable {
        let symbol = |name: &str, symbol_type| Symbol {
            name: Some(name.to_string()),
            symbol_type,
            ..Default::default()
        };
        SymbolTable::new(vec![
            symbol("A", SymbolType::Tristate),
            symbol("B", SymbolType::Tristate),
            symbol("C", SymbolType::Boolean),
            symbol("S", SymbolType::String),
            Symbol {
                modules: true,
                ..symbol("MODULES", SymbolType::Boolean)
            },
        ])
    }

    fn s(name: &str) -> KExpr {
        KExpr::Symbol(name.to_string())
    }

    /// The tristate value of `repr` under an assignment of tristate values to symbols.
    fn value(arena: &Arena, repr: TristateRepr, values: &[(&str, u8)]) -> u8 {
        let mut assignment = HashMap::new();
        for (name, value) in values {
            assignment.insert(format!("CONFIG_{name}"), *value == 2);
            assignment.insert(format!("CONFIG_{name}_MODULE"), *value == 1);
        }
        let yes = arena.eval(repr.yes, &assignment).unwrap();
        let module = arena.eval(repr.module, &assignment).unwrap();
        assert!(!(yes && module));
        match (yes, module) {
            (true, _) => 2,
            (false, true) => 1,
            _ => 0,
        }
    }

    #[test]
    fn symbols() {
        let table = table();
        let mut translator = ExpressionTranslator::new(&table, None);
        let mut context = TranslationContext::default();

        let a = translator.process(&s("A"), &mut context).unwrap();
        assert_eq!(translator.arena.render(a.yes), "CONFIG_A");
        assert_eq!(translator.arena.render(a.module), "CONFIG_A_MODULE");

        let c = translator.process(&s("C"), &mut context).unwrap();
        assert_eq!(c.module, FALSE);

        let m = translator.process(&s("m"), &mut context).unwrap();
        assert_eq!((m.yes, m.module), (FALSE, TRUE));

        let string = translator.process(&s("S"), &mut context).unwrap();
        assert!(string.invalid);
        assert_eq!((string.yes, string.module), (FALSE, FALSE));

        let modules = translator.process(&s("MODULES"), &mut context).unwrap();
        assert_eq!(translator.arena.render(modules.yes), "CONFIG_MODULES");
        assert_eq!(modules.module, FALSE);

        let literal = translator.process(&s("17"), &mut context).unwrap();
        assert_eq!((literal.yes, literal.module), (FALSE, FALSE));
    }

    #[test]
    fn symbol_set() {
        let table = table();
        let set = HashSet::from(["B".to_string()]);
        let mut translator = ExpressionTranslator::new(&table, Some(&set));
        let mut context = TranslationContext::default();

        let a = translator.process(&s("A"), &mut context).unwrap();
        assert_eq!((a.yes, a.module), (FALSE, FALSE));
        let b = translator.process(&s("B"), &mut context).unwrap();
        assert_eq!(translator.arena.render(b.yes), "CONFIG_B");
    }

    #[test]
    fn tristate_algebra() {
        let table = table();
        let mut translator = ExpressionTranslator::new(&table, None);
        let mut context = TranslationContext::default();

        let and = translator.process(&KExpr::and(s("A"), s("B")), &mut context).unwrap();
        let or = translator.process(&KExpr::or(s("A"), s("B")), &mut context).unwrap();
        let not = translator.process(&KExpr::not(s("A")), &mut context).unwrap();
        let eq = translator.process(&KExpr::Equal("A".into(), "B".into()), &mut context).unwrap();
        let ne = translator.process(&KExpr::Unequal("A".into(), "B".into()), &mut context).unwrap();

        for a in 0..3_u8 {
            for b in 0..3_u8 {
                let values = [("A", a), ("B", b)];
                let arena = &translator.arena;
                assert_eq!(value(arena, and, &values), a.min(b));
                assert_eq!(value(arena, or, &values), a.max(b));
                assert_eq!(value(arena, not, &values), 2 - a);
                assert_eq!(value(arena, eq, &values), if a == b { 2 } else { 0 });
                assert_eq!(value(arena, ne, &values), if a != b { 2 } else { 0 });
            }
        }
        assert_eq!(translator.comparisons(), 0);
    }

    #[test]
    fn comparison_of_values() {
        let table = table();
        let mut translator = ExpressionTranslator::new(&table, None);
        let mut context = TranslationContext::default();

        let eq = KExpr::Equal("S".into(), "foo".into());
        let ne = KExpr::Unequal("S".into(), "bar".into());
        let first = translator.process(&eq, &mut context).unwrap();
        let second = translator.process(&eq, &mut context).unwrap();
        let third = translator.process(&ne, &mut context).unwrap();

        assert_eq!(translator.arena.render(first.yes), "__FREE__EQ0");
        assert_eq!(translator.arena.render(second.yes), "__FREE__EQ1");
        assert_eq!(translator.arena.render(third.yes), "__FREE__NE0");
        assert_eq!(third.module, FALSE);
        assert_eq!(translator.comparisons(), 3);
    }

    #[test]
    fn list() {
        let table = table();
        let mut translator = ExpressionTranslator::new(&table, None);
        let mut context = TranslationContext::default();

        let list = KExpr::List(vec!["A".into(), "C".into()]);
        let repr = translator.process(&list, &mut context).unwrap();
        let arena = &translator.arena;

        let eval = |e: ExprId, a: bool, c: bool| {
            let assignment = HashMap::from([
                ("CONFIG_A".to_string(), a),
                ("CONFIG_C".to_string(), c),
                ("CONFIG_A_MODULE".to_string(), false),
                ("CONFIG_C_MODULE".to_string(), false),
            ]);
            arena.eval(e, &assignment).unwrap()
        };
        assert!(eval(repr.yes, true, false));
        assert!(eval(repr.yes, false, true));
        assert!(!eval(repr.yes, true, true));
        assert!(!eval(repr.yes, false, false));
    }

    #[test]
    fn ranges() {
        let table = table();
        let mut translator = ExpressionTranslator::new(&table, None);
        let result = translator.process(
            &KExpr::Range("1".into(), "5".into()),
            &mut TranslationContext::default(),
        );
        assert_eq!(
            result,
            Err(err::TranslationError::UnsupportedFeature("cannot handle ranges yet"))
        );
    }
}

/*!
Axiomatisation of Kconfig symbols as clauses of a formula.

For each symbol `X` with variables `Y` (`CONFIG_X`) and `M` (`CONFIG_X_MODULE`), the [visibility](Symbol::visibility) `vis`, [dependencies](Symbol::depends) `dep`, [default](Symbol::default_expression) `def` and [reverse dependency](Symbol::reverse_dependency_expression) `rev` are [translated](super::translate), and constrain the variables as follows.

Boolean symbols:
- `Y -> (dep.y || dep.m || rev.y || rev.m)`
- `rev.y -> Y` and `rev.m -> Y`
- An invisible symbol takes its default, unless selected: `vis.y || vis.m || (FDef && FDefRev)`, with
  `FDef = Y -> (def.y || def.m || rev.y || rev.m)` and `FDefRev = ((def.y || def.m) && (dep.y || dep.m)) -> Y`.

Tristate symbols:
- `Y -> (dep.y || rev.y)` and `M -> (rev.m || dep.y || dep.m)`
- `rev.y -> Y` and `rev.m -> (Y || M)`
- `vis.y || vis.m || (I0 && I1 && I2 && I3)`, with
  `I0 = Y -> (def.y || rev.y)`, `I1 = M -> (def.y || def.m || rev.m)`, `I2 = (def.m || def.y) -> (!(dep.y || dep.m) || Y || M)` and `I3 = (def.y && dep.y) -> Y`.
- `!(Y && M)`.

Choices are constrained as their type, and in addition a boolean choice requires one of its values (`Y -> (choice.y || choice.m)`), while a tristate choice `y` requires exactly one value set to `y` and no value set to `m`.

String, int and hex symbols have their type recorded, and variable allocated, but no constraint.

Each constraint is simplified before compilation, and skipped if it simplifies to `1`.
*/

use std::collections::HashSet;

use crate::{
    cnf::{builder::CnfBuilder, GenericFormula},
    expr::{ExprId, Relation},
    kconfig::{
        translate::{ExpressionTranslator, TranslationContext},
        Symbol, SymbolTable, MODULES_MAGIC,
    },
    misc::log::targets::{self},
    oracle::Oracle,
    structures::symbol::SymbolType,
    types::err::{self, ErrorKind},
};

/// Counts from a translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Symbols whose type was recorded.
    pub symbols: usize,

    /// Symbols with some comparison of values, approximated by a free variable.
    pub features_with_string_dependencies: usize,

    /// All comparisons of values.
    pub total_string_comparisons: usize,
}

/// Translates the symbols of a table to clauses of a formula.
pub struct SymbolTranslator<'f, O: Oracle> {
    builder: CnfBuilder<'f, O>,
    context: TranslationContext,
    simplify: bool,
    stats: TranslationStats,
}

impl<'f, O: Oracle> SymbolTranslator<'f, O> {
    pub fn new(builder: CnfBuilder<'f, O>) -> Self {
        SymbolTranslator {
            builder,
            context: TranslationContext::default(),
            simplify: true,
            stats: TranslationStats::default(),
        }
    }

    /// Whether constraints are simplified before compilation.
    pub fn with_simplification(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    pub fn stats(&self) -> TranslationStats {
        self.stats
    }

    pub fn formula(&mut self) -> &mut GenericFormula<O> {
        self.builder.formula()
    }

    /// Translates every symbol of `table`.
    pub fn translate(&mut self, table: &SymbolTable) -> Result<TranslationStats, ErrorKind> {
        let symbol_set = table.symbol_set();

        for symbol in table.symbols() {
            let name = match (&symbol.name, symbol.choice, symbol.modules) {
                (Some(name), _, _) => name.clone(),
                (None, true, _) => self.context.choice_name(),
                (None, false, true) => MODULES_MAGIC.to_string(),
                (None, false, false) => continue,
            };

            match (symbol.choice, symbol.symbol_type) {
                (true, _) => self.choice_symbol(table, &symbol_set, symbol, &name)?,
                (false, SymbolType::Boolean) => self.bool_symbol(table, &symbol_set, symbol, &name)?,
                (false, SymbolType::Tristate) => {
                    self.tristate_symbol(table, &symbol_set, symbol, &name)?
                }
                (false, SymbolType::Int | SymbolType::Hex | SymbolType::String) => {
                    log::debug!(target: targets::KCONFIG, "CONFIG {name} ({})", symbol.symbol_type);
                    self.push_symbol_info(&name, symbol.symbol_type);
                }
                (false, SymbolType::Unknown | SymbolType::Other) => {}
            }
        }

        if self.stats.features_with_string_dependencies > 0 {
            log::info!(target: targets::KCONFIG,
                "Features with string dependencies: {} with {} comparisons",
                self.stats.features_with_string_dependencies, self.stats.total_string_comparisons);
        }
        Ok(self.stats)
    }

    /// Records the type of `name` and allocates its variables.
    fn push_symbol_info(&mut self, name: &str, symbol_type: SymbolType) {
        let formula = self.builder.formula();
        formula.set_symbol_type(name, symbol_type);
        formula.add_var(&format!("CONFIG_{name}"));
        if symbol_type == SymbolType::Tristate {
            formula.add_var(&format!("CONFIG_{name}_MODULE"));
        }
        self.stats.symbols += 1;
    }

    fn add_clauses(&mut self, translator: &mut ExpressionTranslator, clauses: &[ExprId]) -> Result<(), ErrorKind> {
        for clause in clauses {
            let clause = match self.simplify {
                true => translator.arena.simplify(*clause),
                false => *clause,
            };
            if translator.arena.as_constant(clause) == Some(true) {
                continue;
            }
            self.builder.push_clause(&translator.arena, clause)?;
        }
        Ok(())
    }

    fn count_comparisons(&mut self, translator: &ExpressionTranslator) {
        if translator.comparisons() > 0 {
            self.stats.features_with_string_dependencies += 1;
        }
        self.stats.total_string_comparisons += translator.comparisons();
    }

    fn bool_symbol(
        &mut self,
        table: &SymbolTable,
        symbol_set: &HashSet<String>,
        symbol: &Symbol,
        name: &str,
    ) -> Result<(), ErrorKind> {
        log::debug!(target: targets::KCONFIG, "CONFIG {name} (boolean)");
        let mut translator = ExpressionTranslator::new(table, Some(symbol_set));
        let context = &mut self.context;

        let vis = translator.process(&symbol.visibility(), context)?;
        let dep = translator.process(&symbol.depends(), context)?;
        let def = translator.process(&symbol.default_expression(), context)?;
        let rev = translator.process(&symbol.reverse_dependency_expression(), context)?;

        let a = &mut translator.arena;
        let y = a.kconfig_var(name, Relation::Yes, Some(symbol.symbol_type));
        let not_y = a.mk_not(y);

        let f_def = a.or_all([not_y, def.yes, def.module, rev.yes, rev.module]);
        let def_some = a.or(def.yes, def.module);
        let dep_some = a.or(dep.yes, dep.module);
        let def_and_dep = a.and(def_some, dep_some);
        let not_def_and_dep = a.not(def_and_dep);
        let f_def_rev = a.or(not_def_and_dep, y);
        let invisible = a.and(f_def, f_def_rev);
        let complete_invisible = a.or_all([vis.yes, vis.module, invisible]);

        let f_yes = a.or_all([not_y, dep.yes, dep.module, rev.yes, rev.module]);
        let not_rev_yes = a.not(rev.yes);
        let f_rev_yes = a.or(not_rev_yes, y);
        let not_rev_module = a.not(rev.module);
        let f_rev_module = a.or(not_rev_module, y);

        self.push_symbol_info(name, symbol.symbol_type);
        self.add_clauses(&mut translator, &[f_yes, f_rev_yes, f_rev_module, complete_invisible])?;
        self.count_comparisons(&translator);
        Ok(())
    }

    fn tristate_symbol(
        &mut self,
        table: &SymbolTable,
        symbol_set: &HashSet<String>,
        symbol: &Symbol,
        name: &str,
    ) -> Result<(), ErrorKind> {
        log::debug!(target: targets::KCONFIG, "CONFIG {name} (tristate)");
        let mut translator = ExpressionTranslator::new(table, Some(symbol_set));
        let context = &mut self.context;

        let vis = translator.process(&symbol.visibility(), context)?;
        let dep = translator.process(&symbol.depends(), context)?;
        let def = translator.process(&symbol.default_expression(), context)?;
        let rev = translator.process(&symbol.reverse_dependency_expression(), context)?;

        let a = &mut translator.arena;
        let y = a.kconfig_var(name, Relation::Yes, Some(symbol.symbol_type));
        let m = a.kconfig_var(name, Relation::Module, Some(symbol.symbol_type));
        let not_y = a.mk_not(y);
        let not_m = a.mk_not(m);

        let inv_0 = a.or_all([not_y, def.yes, rev.yes]);
        let inv_1 = a.or_all([not_m, def.yes, def.module, rev.module]);
        let inv_2 = {
            let def_some = a.or(def.module, def.yes);
            let not_def_some = a.not(def_some);
            let dep_some = a.or(dep.yes, dep.module);
            let not_dep_some = a.not(dep_some);
            a.or_all([not_def_some, not_dep_some, y, m])
        };
        let inv_3 = {
            let def_and_dep = a.and(def.yes, dep.yes);
            let not_def_and_dep = a.not(def_and_dep);
            a.or(not_def_and_dep, y)
        };
        let invisible = a.and_all([inv_0, inv_1, inv_2, inv_3]);
        let complete_invisible = a.or_all([vis.yes, vis.module, invisible]);

        let f_yes = {
            let allowed = a.or(dep.yes, rev.yes);
            a.mk_impl(y, allowed)
        };
        let f_module = a.or_all([not_m, rev.module, dep.yes, dep.module]);
        let f_rev_yes = {
            let not_rev_yes = a.not(rev.yes);
            a.or(not_rev_yes, y)
        };
        let f_rev_module = {
            let not_rev_module = a.not(rev.module);
            a.or_all([not_rev_module, y, m])
        };
        let guard = match symbol.symbol_type {
            SymbolType::Boolean => not_m,
            _ => {
                let both = a.mk_and(y, m);
                a.mk_not(both)
            }
        };

        self.push_symbol_info(name, symbol.symbol_type);
        self.add_clauses(
            &mut translator,
            &[f_yes, f_module, f_rev_yes, f_rev_module, complete_invisible, guard],
        )?;
        self.count_comparisons(&translator);
        Ok(())
    }

    fn choice_symbol(
        &mut self,
        table: &SymbolTable,
        symbol_set: &HashSet<String>,
        symbol: &Symbol,
        name: &str,
    ) -> Result<(), ErrorKind> {
        match symbol.symbol_type {
            SymbolType::Boolean => {
                log::debug!(target: targets::KCONFIG, "CONFIG {name} (choice boolean)");
                self.bool_symbol(table, symbol_set, symbol, name)?;
            }
            SymbolType::Tristate => {
                log::debug!(target: targets::KCONFIG, "CONFIG {name} (choice tristate)");
                self.tristate_symbol(table, symbol_set, symbol, name)?;
            }
            _ => return Err(err::TranslationError::InvalidChoiceType(name.to_string()).into()),
        }

        let Some(choice) = symbol.choice_expression() else {
            return Ok(());
        };

        let mut translator = ExpressionTranslator::new(table, Some(symbol_set));
        let choice = translator.process(&choice, &mut self.context)?;
        let a = &mut translator.arena;
        let y = a.kconfig_var(name, Relation::Yes, Some(symbol.symbol_type));
        let not_y = a.mk_not(y);

        let clauses = match symbol.symbol_type {
            SymbolType::Boolean => vec![a.or_all([not_y, choice.yes, choice.module])],
            _ => {
                let not_choice_module = a.not(choice.module);
                vec![a.or(not_y, choice.yes), a.or(not_y, not_choice_module)]
            }
        };
        self.add_clauses(&mut translator, &clauses)?;
        self.count_comparisons(&translator);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cnf::{builder::ConstantPolicy, Formula, ALWAYS_ON},
        kconfig::{DefaultValue, KExpr, Prompt},
    };

    fn s(name: &str) -> KExpr {
        KExpr::Symbol(name.to_string())
    }

    fn named(name: &str, symbol_type: SymbolType) -> Symbol {
        Symbol {
            name: Some(name.to_string()),
            symbol_type,
            ..Default::default()
        }
    }

    fn prompt() -> Prompt {
        Prompt {
            text: "prompt".to_string(),
            visible: None,
        }
    }

    fn translated(symbols: Vec<Symbol>) -> (Formula, TranslationStats) {
        let table = SymbolTable::new(symbols);
        let mut formula = Formula::default();
        let builder = CnfBuilder::new(&mut formula, ConstantPolicy::Free);
        let stats = SymbolTranslator::new(builder).translate(&table).unwrap();
        (formula, stats)
    }

    /// Whether the formula is satisfiable with the given values of variables.
    fn possible(formula: &mut Formula, values: &[(&str, bool)]) -> bool {
        for (name, value) in values {
            formula.push_named_assumption(name, *value);
        }
        formula.check_satisfiable().unwrap()
    }

    #[test]
    fn boolean_dependency() {
        let a = Symbol {
            prompts: vec![prompt()],
            ..named("A", SymbolType::Boolean)
        };
        let b = Symbol {
            prompts: vec![prompt()],
            dependencies: vec![s("A")],
            ..named("B", SymbolType::Boolean)
        };
        let (mut formula, stats) = translated(vec![a, b]);

        assert_eq!(stats.symbols, 2);
        assert_eq!(formula.symbol_type("B"), SymbolType::Boolean);
        assert!(!possible(&mut formula, &[("CONFIG_A", false), ("CONFIG_B", true)]));
        assert!(possible(&mut formula, &[("CONFIG_A", true), ("CONFIG_B", true)]));
        assert!(possible(&mut formula, &[("CONFIG_A", true), ("CONFIG_B", false)]));
    }

    #[test]
    fn invisible_symbols_take_their_default() {
        let a = Symbol {
            prompts: vec![prompt()],
            ..named("A", SymbolType::Boolean)
        };
        let b = Symbol {
            defaults: vec![DefaultValue {
                value: s("y"),
                visible: None,
            }],
            dependencies: vec![s("A")],
            ..named("B", SymbolType::Boolean)
        };
        let (mut formula, _) = translated(vec![a, b]);

        assert!(!possible(&mut formula, &[("CONFIG_A", true), ("CONFIG_B", false)]));
        assert!(!possible(&mut formula, &[("CONFIG_A", false), ("CONFIG_B", true)]));
        assert!(possible(&mut formula, &[("CONFIG_A", false), ("CONFIG_B", false)]));
    }

    #[test]
    fn selected_symbols() {
        let a = Symbol {
            prompts: vec![prompt()],
            ..named("A", SymbolType::Boolean)
        };
        let b = Symbol {
            prompts: vec![prompt()],
            reverse_dependency: Some(s("A")),
            ..named("B", SymbolType::Boolean)
        };
        let (mut formula, _) = translated(vec![a, b]);
        assert!(!possible(&mut formula, &[("CONFIG_A", true), ("CONFIG_B", false)]));
        assert!(possible(&mut formula, &[("CONFIG_A", false), ("CONFIG_B", true)]));
    }

    #[test]
    fn tristate() {
        let a = Symbol {
            prompts: vec![prompt()],
            ..named("A", SymbolType::Tristate)
        };
        let b = Symbol {
            prompts: vec![prompt()],
            dependencies: vec![s("A")],
            ..named("B", SymbolType::Tristate)
        };
        let (mut formula, _) = translated(vec![a, b]);

        assert_eq!(formula.associated_symbol("CONFIG_B_MODULE"), Some("B"));
        assert!(!possible(&mut formula, &[("CONFIG_A", true), ("CONFIG_A_MODULE", true)]));
        // B may not be y when A is m.
        assert!(!possible(&mut formula, &[("CONFIG_A_MODULE", true), ("CONFIG_B", true)]));
        assert!(possible(&mut formula, &[("CONFIG_A_MODULE", true), ("CONFIG_B_MODULE", true)]));
        assert!(!possible(
            &mut formula,
            &[("CONFIG_A", false), ("CONFIG_A_MODULE", false), ("CONFIG_B_MODULE", true)]
        ));
    }

    #[test]
    fn choices() {
        let choice = Symbol {
            name: None,
            symbol_type: SymbolType::Boolean,
            choice: true,
            members: vec!["X".into(), "Y".into()],
            prompts: vec![prompt()],
            ..Default::default()
        };
        let member = |name: &str| Symbol {
            prompts: vec![prompt()],
            choice_value: true,
            ..named(name, SymbolType::Boolean)
        };
        let (mut formula, _) = translated(vec![choice, member("X"), member("Y")]);

        assert_eq!(formula.symbol_type("CHOICE_0"), SymbolType::Boolean);
        assert!(!possible(&mut formula, &[("CONFIG_CHOICE_0", true), ("CONFIG_X", true), ("CONFIG_Y", true)]));
        assert!(!possible(&mut formula, &[("CONFIG_CHOICE_0", true), ("CONFIG_X", false), ("CONFIG_Y", false)]));
        assert!(possible(&mut formula, &[("CONFIG_CHOICE_0", true), ("CONFIG_X", false), ("CONFIG_Y", true)]));
    }

    #[test]
    fn invalid_choice_type() {
        let choice = Symbol {
            symbol_type: SymbolType::String,
            choice: true,
            ..Default::default()
        };
        let table = SymbolTable::new(vec![choice]);
        let mut formula = Formula::default();
        let builder = CnfBuilder::new(&mut formula, ConstantPolicy::Free);
        let result = SymbolTranslator::new(builder).translate(&table);
        assert_eq!(
            result,
            Err(ErrorKind::Translation(err::TranslationError::InvalidChoiceType("CHOICE_0".into())))
        );
    }

    #[test]
    fn strings() {
        let s_symbol = Symbol {
            prompts: vec![prompt()],
            ..named("S", SymbolType::String)
        };
        let b = Symbol {
            prompts: vec![prompt()],
            dependencies: vec![KExpr::and(KExpr::Equal("S".into(), "foo".into()), s("y"))],
            ..named("B", SymbolType::Boolean)
        };
        let (formula, stats) = translated(vec![s_symbol, b]);

        assert_eq!(formula.symbol_type("S"), SymbolType::String);
        assert!(formula.var("CONFIG_S").is_some());
        assert!(formula.var("__FREE__EQ0").is_some());
        assert_eq!(stats.features_with_string_dependencies, 1);
        assert_eq!(stats.total_string_comparisons, 1);
    }

    #[test]
    fn forced_symbols_are_always_on() {
        let a = Symbol {
            reverse_dependency: Some(s("y")),
            ..named("A", SymbolType::Boolean)
        };
        let (formula, _) = translated(vec![a]);
        assert_eq!(formula.meta_value(ALWAYS_ON), Some(["CONFIG_A".to_string()].as_slice()));
    }
}

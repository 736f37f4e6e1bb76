//! Expressions derived from the properties of a symbol.

use super::{KExpr, Symbol};

fn or_option(acc: Option<KExpr>, e: KExpr) -> Option<KExpr> {
    match acc {
        None => Some(e),
        Some(acc) => Some(KExpr::or(acc, e)),
    }
}

impl Symbol {
    /// When the symbol may be changed by a user: the disjunction of the conditions of its prompts.
    ///
    /// Without prompts the symbol is never visible.
    /// A single prompt whose condition is the first dependency of the symbol is always visible, as the dependency is required anyway.
    pub fn visibility(&self) -> KExpr {
        let mut visible = None;
        for prompt in &self.prompts {
            visible = or_option(visible, prompt.visible.clone().unwrap_or_else(KExpr::yes));
        }

        if let [prompt] = self.prompts.as_slice() {
            let condition = prompt.visible.clone().unwrap_or_else(KExpr::yes);
            if self.dependencies.first() == Some(&condition) {
                return KExpr::yes();
            }
        }

        visible.unwrap_or_else(KExpr::no)
    }

    /// The disjunction of the dependencies of the symbol, or `y` without dependencies.
    pub fn depends(&self) -> KExpr {
        let mut depends = None;
        for dependency in &self.dependencies {
            depends = or_option(depends, dependency.clone());
        }
        depends.unwrap_or_else(KExpr::yes)
    }

    /// The value of the first visible default, or `n`.
    ///
    /// That is, `(vis_1 && val_1) || (!vis_1 && ((vis_2 && val_2) || (!vis_2 && ... n)))`.
    pub fn default_expression(&self) -> KExpr {
        let mut default = KExpr::no();
        for value in self.defaults.iter().rev() {
            default = match &value.visible {
                None => value.value.clone(),
                Some(visible) => KExpr::or(
                    KExpr::and(visible.clone(), value.value.clone()),
                    KExpr::and(KExpr::not(visible.clone()), default),
                ),
            };
        }
        default
    }

    /// The reverse dependency of the symbol, or `n` if none or if the symbol is the value of a choice.
    pub fn reverse_dependency_expression(&self) -> KExpr {
        match (&self.reverse_dependency, self.choice_value) {
            (Some(rev), false) => rev.clone(),
            _ => KExpr::no(),
        }
    }

    /// For a choice, the list of the values of the choice.
    pub fn choice_expression(&self) -> Option<KExpr> {
        match self.choice && !self.members.is_empty() {
            true => Some(KExpr::List(self.members.clone())),
            false => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kconfig::{DefaultValue, Prompt};

    fn symbol(name: &str) -> KExpr {
        KExpr::Symbol(name.to_string())
    }

    #[test]
    fn visibility() {
        let mut s = Symbol::default();
        assert_eq!(s.visibility(), KExpr::no());

        s.prompts.push(Prompt {
            text: "a".into(),
            visible: Some(symbol("A")),
        });
        assert_eq!(s.visibility(), symbol("A"));

        s.dependencies.push(symbol("A"));
        assert_eq!(s.visibility(), KExpr::yes());

        s.prompts.push(Prompt::default());
        assert_eq!(s.visibility(), KExpr::or(symbol("A"), KExpr::yes()));
    }

    #[test]
    fn depends() {
        let mut s = Symbol::default();
        assert_eq!(s.depends(), KExpr::yes());
        s.dependencies = vec![symbol("A"), symbol("B")];
        assert_eq!(s.depends(), KExpr::or(symbol("A"), symbol("B")));
    }

    #[test]
    fn default_chain() {
        let mut s = Symbol::default();
        assert_eq!(s.default_expression(), KExpr::no());

        s.defaults = vec![
            DefaultValue {
                value: symbol("m"),
                visible: Some(symbol("A")),
            },
            DefaultValue {
                value: symbol("y"),
                visible: None,
            },
        ];
        let expected = KExpr::or(
            KExpr::and(symbol("A"), symbol("m")),
            KExpr::and(KExpr::not(symbol("A")), symbol("y")),
        );
        assert_eq!(s.default_expression(), expected);
    }

    #[test]
    fn choice_values_have_no_reverse_dependency() {
        let mut s = Symbol {
            reverse_dependency: Some(symbol("X")),
            ..Default::default()
        };
        assert_eq!(s.reverse_dependency_expression(), symbol("X"));
        s.choice_value = true;
        assert_eq!(s.reverse_dependency_expression(), KExpr::no());
    }
}

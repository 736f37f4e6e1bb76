/*!
Compilation of expressions to clauses, by the Tseitin encoding.

Each compound node `n` with operands `a` and `b` receives a fresh variable `h`, constrained to be equivalent to the node:

| Node      | Clauses                                     |
|-----------|---------------------------------------------|
| `a && b`  | `(-h a) (-h b) (h -a -b)`                   |
| `a \|\| b`| `(h -a) (h -b) (-h a b)`                    |
| `a -> b`  | `(h a) (h -b) (-h -a b)`                    |
| `a <-> b` | `(h -a -b) (h a b) (-h a -b) (-h -a b)`     |

Negation flips the sign of a literal, and variables are looked up (or allocated) by name.
Nodes without boolean semantics are opaque: an operator such as `==` receives a fresh unconstrained variable, and a call receives one variable per distinct rendering within a build.

The root of an expression is asserted by a unit clause.

# Constants

How constants compile depends on the [ConstantPolicy]:

- [Bound](ConstantPolicy::Bound): a single variable `t` is allocated on first use and asserted by the unit clause `t`.
  Then, `1` compiles to `t` and `0` to `-t`.
- [Free](ConstantPolicy::Free): constants are folded through the gates, and no variable is used.
  If the root folds to `1` nothing is asserted, and if the root folds to `0` a falsum `f` is asserted, by the clauses `f` and `-f`.

```rust
# use undertaker::cnf::{builder::{CnfBuilder, ConstantPolicy}, Formula};
# use undertaker::expr::Arena;
let mut arena = Arena::default();
let root = arena.parse("x -> (y && 0)").unwrap();

let mut formula = Formula::default();
let mut builder = CnfBuilder::new(&mut formula, ConstantPolicy::Free);
builder.push_clause(&arena, root).unwrap();

formula.push_named_assumption("x", true);
assert_eq!(formula.check_satisfiable(), Ok(false));
```
*/

use std::collections::{HashMap, HashSet};

use crate::{
    cnf::{GenericFormula, ALWAYS_ON},
    expr::{
        visitor::{Visited, Visitor},
        Arena, ExprId, Node,
    },
    misc::log::targets::{self},
    oracle::Oracle,
    structures::literal::{Atom, IntLiteral, Literal},
    types::err::{self, ErrorKind},
};

/// How constants are compiled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConstantPolicy {
    /// Constants are literals of a single variable bound to true.
    Bound,

    /// Constants are folded away.
    Free,
}

/// The result of compiling a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compiled {
    Const(bool),
    Literal(IntLiteral),
}

impl Compiled {
    fn negate(self) -> Self {
        match self {
            Compiled::Const(value) => Compiled::Const(!value),
            Compiled::Literal(literal) => Compiled::Literal(literal.negate()),
        }
    }
}

/// Compiles expressions to clauses of a formula.
pub struct CnfBuilder<'f, O: Oracle> {
    formula: &'f mut GenericFormula<O>,
    policy: ConstantPolicy,

    /// The variable bound to true, if allocated.
    bound: Option<Atom>,

    /// Variables of calls, by rendering.
    calls: HashMap<String, Atom>,

    /// Names which receive a fresh variable on each occurrence.
    ignored: HashSet<String>,
}

impl<'f, O: Oracle> CnfBuilder<'f, O> {
    pub fn new(formula: &'f mut GenericFormula<O>, policy: ConstantPolicy) -> Self {
        CnfBuilder {
            formula,
            policy,
            bound: None,
            calls: HashMap::default(),
            ignored: HashSet::default(),
        }
    }

    /// Treats each occurrence of the given names as a fresh variable.
    pub fn with_ignored(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.ignored.extend(names);
        self
    }

    /// The formula clauses are added to.
    pub fn formula(&mut self) -> &mut GenericFormula<O> {
        self.formula
    }

    /// Asserts the expression `root` of `arena`.
    ///
    /// If `root` is a variable, the variable is also recorded as always on.
    pub fn push_clause(&mut self, arena: &Arena, root: ExprId) -> Result<(), ErrorKind> {
        match arena.node(root) {
            Node::Const(true) => return Ok(()),
            Node::Var(var) => self.formula.add_meta_value(ALWAYS_ON, var.name.clone()),
            _ => {}
        }

        match arena.accept(root, self)? {
            Compiled::Const(true) => {}

            Compiled::Const(false) => {
                let falsum = self.formula.new_var() as IntLiteral;
                self.formula.add_clause(&[falsum])?;
                self.formula.add_clause(&[-falsum])?;
            }

            Compiled::Literal(literal) => self.formula.add_clause(&[literal])?,
        }

        log::trace!(target: targets::CNF, "Compiled {root} to {} clauses", self.formula.clauses().len());
        Ok(())
    }

    fn constant(&mut self, value: bool) -> Result<Compiled, err::CnfError> {
        match self.policy {
            ConstantPolicy::Free => Ok(Compiled::Const(value)),
            ConstantPolicy::Bound => {
                let t = match self.bound {
                    Some(t) => t,
                    None => {
                        let t = self.formula.new_var();
                        self.formula.add_clause(&[t as IntLiteral])?;
                        self.bound = Some(t);
                        t
                    }
                };
                Ok(Compiled::Literal(IntLiteral::new(t, value)))
            }
        }
    }

    fn fresh(&mut self) -> IntLiteral {
        self.formula.new_var() as IntLiteral
    }

    fn and_gate(&mut self, a: IntLiteral, b: IntLiteral) -> Result<IntLiteral, err::CnfError> {
        let h = self.fresh();
        self.formula.add_clause(&[-h, a])?;
        self.formula.add_clause(&[-h, b])?;
        self.formula.add_clause(&[h, -a, -b])?;
        Ok(h)
    }

    fn or_gate(&mut self, a: IntLiteral, b: IntLiteral) -> Result<IntLiteral, err::CnfError> {
        let h = self.fresh();
        self.formula.add_clause(&[h, -a])?;
        self.formula.add_clause(&[h, -b])?;
        self.formula.add_clause(&[-h, a, b])?;
        Ok(h)
    }

    fn impl_gate(&mut self, a: IntLiteral, b: IntLiteral) -> Result<IntLiteral, err::CnfError> {
        let h = self.fresh();
        self.formula.add_clause(&[h, a])?;
        self.formula.add_clause(&[h, -b])?;
        self.formula.add_clause(&[-h, -a, b])?;
        Ok(h)
    }

    fn eq_gate(&mut self, a: IntLiteral, b: IntLiteral) -> Result<IntLiteral, err::CnfError> {
        let h = self.fresh();
        self.formula.add_clause(&[h, -a, -b])?;
        self.formula.add_clause(&[h, a, b])?;
        self.formula.add_clause(&[-h, a, -b])?;
        self.formula.add_clause(&[-h, -a, b])?;
        Ok(h)
    }
}

impl<O: Oracle> Visitor for CnfBuilder<'_, O> {
    type Output = Compiled;
    type Error = err::CnfError;

    fn visit(
        &mut self,
        arena: &Arena,
        id: ExprId,
        node: Visited<'_, Compiled>,
    ) -> Result<Compiled, err::CnfError> {
        use Compiled::{Const, Literal as Lit};

        let compiled = match node {
            Visited::Const(value) => self.constant(value)?,

            Visited::Var(var) => match self.ignored.contains(&var.name) {
                true => Lit(self.fresh()),
                false => Lit(self.formula.add_var(&var.name) as IntLiteral),
            },

            Visited::Not(e) => e.negate(),

            Visited::And(a, b) => match (a, b) {
                (Const(false), _) | (_, Const(false)) => Const(false),
                (Const(true), x) | (x, Const(true)) => x,
                (Lit(a), Lit(b)) => Lit(self.and_gate(a, b)?),
            },

            Visited::Or(a, b) => match (a, b) {
                (Const(true), _) | (_, Const(true)) => Const(true),
                (Const(false), x) | (x, Const(false)) => x,
                (Lit(a), Lit(b)) => Lit(self.or_gate(a, b)?),
            },

            Visited::Impl(a, b) => match (a, b) {
                (Const(false), _) | (_, Const(true)) => Const(true),
                (Const(true), x) => x,
                (x, Const(false)) => x.negate(),
                (Lit(a), Lit(b)) => Lit(self.impl_gate(a, b)?),
            },

            Visited::Eq(a, b) => match (a, b) {
                (Const(true), x) | (x, Const(true)) => x,
                (Const(false), x) | (x, Const(false)) => x.negate(),
                (Lit(a), Lit(b)) => Lit(self.eq_gate(a, b)?),
            },

            Visited::Any(..) => Lit(self.fresh()),

            Visited::Call(..) => {
                let rendering = arena.render(id);
                match self.calls.get(&rendering) {
                    Some(atom) => Lit(*atom as IntLiteral),
                    None => {
                        let atom = self.formula.new_var();
                        self.calls.insert(rendering, atom);
                        Lit(atom as IntLiteral)
                    }
                }
            }
        };
        Ok(compiled)
    }
}

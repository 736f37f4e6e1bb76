/*!
Boolean expressions, stored in an arena.

An [Arena] owns every node of the expressions built in it, and a node is addressed by an [ExprId].
Nodes only refer to nodes allocated before them, so an arena is a DAG, topologically sorted by construction.
Every constructor call allocates a fresh node, and a sub-expression is only shared when its id is reused.
Nodes built separately from equal parts are told apart by id, and identified by [structural_eq](Arena::structural_eq).

The two constants are interned at fixed indices of every arena, [TRUE] and [FALSE], and so comparing ids is a valid equality check for constants.

# Constructors

Two families of constructors are provided:
- *Raw* constructors (`mk_and`, `mk_or`, …) allocate a node as given.
- *Folding* constructors ([and](Arena::and), [or](Arena::or), [not](Arena::not)) fold constant operands away, and are used when translating Kconfig symbols.

```rust
# use undertaker::expr::{Arena, TRUE, FALSE};
let mut arena = Arena::default();
let x = arena.var("x");

assert_eq!(arena.and(x, TRUE), x);
assert_eq!(arena.or(x, TRUE), TRUE);
assert_eq!(arena.not(FALSE), TRUE);

let raw = arena.mk_and(x, TRUE);
assert_eq!(arena.render(raw), "x && 1");
```

# Submodules

- [parse] reads expressions from text, in one of two [dialects](parse::Dialect).
- [display] prints expressions with a minimal number of parentheses.
- [visitor] provides memoized post-order traversal.
- [simplify] rewrites expressions algebraically.
*/

pub mod display;
pub mod parse;
pub mod simplify;
pub mod visitor;

use std::collections::HashMap;

use crate::structures::symbol::SymbolType;

use visitor::{Visited, Visitor};

/// A handle to a node of an [Arena].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    /// The index of the node in its arena.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ExprId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// The interned constant `true`.
pub const TRUE: ExprId = ExprId(0);

/// The interned constant `false`.
pub const FALSE: ExprId = ExprId(1);

/// How a variable relates to the Kconfig symbol it was derived from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The symbol has value `y`.
    #[default]
    Yes,

    /// The symbol has value `m`.
    Module,

    /// The symbol is present, for int, hex and string symbols.
    Present,

    /// A helper variable with no counterpart in Kconfig.
    Helper,

    /// Bookkeeping about the symbol.
    Meta,
}

impl Relation {
    /// The suffix of the name of a variable with the relation.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Yes | Self::Helper => "",
            Self::Module => "_MODULE",
            Self::Present => "_PRESENT",
            Self::Meta => "_META",
        }
    }
}

/// A variable.
///
/// The name is the full name of the variable, e.g. `CONFIG_USB_MODULE`, and the relation and symbol type are annotations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Var {
    pub name: String,
    pub relation: Relation,
    pub symbol_type: Option<SymbolType>,
}

/// A node of an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Const(bool),
    Var(Var),
    Not(ExprId),
    And(ExprId, ExprId),
    Or(ExprId, ExprId),
    /// Implication, `->`.
    Impl(ExprId, ExprId),
    /// Equivalence, `<->`.
    Eq(ExprId, ExprId),
    /// Some binary operator without boolean semantics, e.g. `==` or `+`.
    Any(String, ExprId, ExprId),
    Call(String, Vec<ExprId>),
}

/// An arena of expression nodes.
#[derive(Clone, Debug)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Default for Arena {
    fn default() -> Self {
        Arena {
            nodes: vec![Node::Const(true), Node::Const(false)],
        }
    }
}

impl Arena {
    /// The node addressed by `id`.
    ///
    /// # Panics
    /// If `id` was not allocated by the arena.
    pub fn node(&self, id: ExprId) -> &Node {
        &self.nodes[id.index()]
    }

    /// A count of all nodes in the arena, including the two constants.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds only the two constants.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 2
    }

    fn push(&mut self, node: Node) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn constant(&self, value: bool) -> ExprId {
        match value {
            true => TRUE,
            false => FALSE,
        }
    }

    /// The value of `id`, if it is a constant.
    pub fn as_constant(&self, id: ExprId) -> Option<bool> {
        match self.node(id) {
            Node::Const(value) => Some(*value),
            _ => None,
        }
    }

    /// A plain variable, with no Kconfig annotations.
    pub fn var(&mut self, name: impl Into<String>) -> ExprId {
        self.push(Node::Var(Var {
            name: name.into(),
            relation: Relation::Yes,
            symbol_type: None,
        }))
    }

    /// A variable for the Kconfig symbol `symbol`, named `CONFIG_<symbol><suffix>`.
    pub fn kconfig_var(
        &mut self,
        symbol: &str,
        relation: Relation,
        symbol_type: Option<SymbolType>,
    ) -> ExprId {
        self.push(Node::Var(Var {
            name: format!("CONFIG_{symbol}{}", relation.suffix()),
            relation,
            symbol_type,
        }))
    }

    pub fn mk_var(&mut self, var: Var) -> ExprId {
        self.push(Node::Var(var))
    }

    pub fn mk_not(&mut self, e: ExprId) -> ExprId {
        self.push(Node::Not(e))
    }

    pub fn mk_and(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.push(Node::And(l, r))
    }

    pub fn mk_or(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.push(Node::Or(l, r))
    }

    pub fn mk_impl(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.push(Node::Impl(l, r))
    }

    pub fn mk_eq(&mut self, l: ExprId, r: ExprId) -> ExprId {
        self.push(Node::Eq(l, r))
    }

    pub fn mk_any(&mut self, operator: impl Into<String>, l: ExprId, r: ExprId) -> ExprId {
        self.push(Node::Any(operator.into(), l, r))
    }

    pub fn mk_call(&mut self, name: impl Into<String>, parameters: Vec<ExprId>) -> ExprId {
        self.push(Node::Call(name.into(), parameters))
    }

    /// Negation, folding a constant operand.
    pub fn not(&mut self, e: ExprId) -> ExprId {
        match self.as_constant(e) {
            Some(value) => self.constant(!value),
            None => self.mk_not(e),
        }
    }

    /// Conjunction, folding constant operands.
    pub fn and(&mut self, l: ExprId, r: ExprId) -> ExprId {
        match (self.as_constant(l), self.as_constant(r)) {
            (Some(false), _) | (_, Some(false)) => FALSE,
            (Some(true), _) => r,
            (_, Some(true)) => l,
            _ => self.mk_and(l, r),
        }
    }

    /// Disjunction, folding constant operands.
    pub fn or(&mut self, l: ExprId, r: ExprId) -> ExprId {
        match (self.as_constant(l), self.as_constant(r)) {
            (Some(true), _) | (_, Some(true)) => TRUE,
            (Some(false), _) => r,
            (_, Some(false)) => l,
            _ => self.mk_or(l, r),
        }
    }

    /// The conjunction of all `operands`, and [TRUE] if there are none.
    pub fn and_all(&mut self, operands: impl IntoIterator<Item = ExprId>) -> ExprId {
        operands.into_iter().fold(TRUE, |acc, e| self.and(acc, e))
    }

    /// The disjunction of all `operands`, and [FALSE] if there are none.
    pub fn or_all(&mut self, operands: impl IntoIterator<Item = ExprId>) -> ExprId {
        operands.into_iter().fold(FALSE, |acc, e| self.or(acc, e))
    }

    /// Structural equality.
    ///
    /// Identical ids are equal, and otherwise nodes are equal if they are of the same variant with equal children.
    /// Variables compare name and relation, calls compare name and parameters pairwise, and [Any](Node::Any) compares operator.
    pub fn structural_eq(&self, a: ExprId, b: ExprId) -> bool {
        let mut pairs = vec![(a, b)];
        while let Some((a, b)) = pairs.pop() {
            if a == b {
                continue;
            }
            match (self.node(a), self.node(b)) {
                (Node::Const(x), Node::Const(y)) if x == y => {}

                (Node::Var(x), Node::Var(y)) if x.name == y.name && x.relation == y.relation => {}

                (Node::Not(x), Node::Not(y)) => pairs.push((*x, *y)),

                (Node::And(xl, xr), Node::And(yl, yr))
                | (Node::Or(xl, xr), Node::Or(yl, yr))
                | (Node::Impl(xl, xr), Node::Impl(yl, yr))
                | (Node::Eq(xl, xr), Node::Eq(yl, yr)) => {
                    pairs.push((*xr, *yr));
                    pairs.push((*xl, *yl));
                }

                (Node::Any(xo, xl, xr), Node::Any(yo, yl, yr)) if xo == yo => {
                    pairs.push((*xr, *yr));
                    pairs.push((*xl, *yl));
                }

                (Node::Call(xn, xp), Node::Call(yn, yp)) if xn == yn && xp.len() == yp.len() => {
                    pairs.extend(xp.iter().copied().zip(yp.iter().copied()));
                }

                _ => return false,
            }
        }
        true
    }

    /// The value of `id` on `assignment`.
    ///
    /// Variables without a value, calls, and [Any](Node::Any) nodes have no value.
    /// A missing value only propagates when it matters, e.g. `false && x` is false on any assignment.
    pub fn eval(&self, id: ExprId, assignment: &HashMap<String, bool>) -> Option<bool> {
        let mut evaluator = Evaluator { assignment };
        match self.accept(id, &mut evaluator) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// The names of all variables in `id`, in order of first occurrence.
    pub fn vars(&self, id: ExprId) -> Vec<String> {
        let mut names: Vec<String> = Vec::default();
        for node_id in self.post_order(id) {
            if let Node::Var(var) = self.node(node_id) {
                if !names.contains(&var.name) {
                    names.push(var.name.clone());
                }
            }
        }
        names
    }
}

struct Evaluator<'a> {
    assignment: &'a HashMap<String, bool>,
}

impl Visitor for Evaluator<'_> {
    type Output = Option<bool>;
    type Error = std::convert::Infallible;

    fn visit(
        &mut self,
        _arena: &Arena,
        _id: ExprId,
        node: Visited<'_, Self::Output>,
    ) -> Result<Self::Output, Self::Error> {
        let value = match node {
            Visited::Const(value) => Some(value),
            Visited::Var(var) => self.assignment.get(&var.name).copied(),
            Visited::Not(e) => e.map(|value| !value),
            Visited::And(l, r) => match (l, r) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Visited::Or(l, r) => match (l, r) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Visited::Impl(l, r) => match (l, r) {
                (Some(false), _) | (_, Some(true)) => Some(true),
                (Some(true), Some(false)) => Some(false),
                _ => None,
            },
            Visited::Eq(l, r) => match (l, r) {
                (Some(l), Some(r)) => Some(l == r),
                _ => None,
            },
            Visited::Any(..) | Visited::Call(..) => None,
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_interned() {
        let arena = Arena::default();
        assert_eq!(arena.constant(true), TRUE);
        assert_eq!(arena.constant(false), FALSE);
        assert!(arena.is_empty());
    }

    #[test]
    fn sharing_is_by_id() {
        let mut arena = Arena::default();
        let x = arena.var("x");
        let y = arena.var("x");
        assert_ne!(x, y);
        assert!(arena.structural_eq(x, y));

        let shared = arena.mk_and(x, x);
        assert_eq!(arena.post_order(shared), vec![x, shared]);

        let separate = arena.mk_and(x, y);
        assert_eq!(arena.post_order(separate), vec![x, y, separate]);
        assert!(arena.structural_eq(shared, separate));
    }

    #[test]
    fn children_precede_parents() {
        let mut arena = Arena::default();
        let x = arena.var("x");
        let y = arena.var("y");
        let xy = arena.mk_or(x, y);
        assert!(x < xy && y < xy);
    }

    #[test]
    fn structural_equality() {
        let mut arena = Arena::default();
        let a = arena.parse("f(x, y) && !z").unwrap();
        let b = arena.parse("f(x, y) && !z").unwrap();
        let c = arena.parse("f(y, x) && !z").unwrap();
        let d = arena.parse("x == y").unwrap();
        let e = arena.parse("x != y").unwrap();

        assert_ne!(a, b);
        assert!(arena.structural_eq(a, b));
        assert!(!arena.structural_eq(a, c));
        assert!(!arena.structural_eq(d, e));
    }

    #[test]
    fn relation_is_compared() {
        let mut arena = Arena::default();
        let a = arena.mk_var(Var {
            name: "CONFIG_A".to_string(),
            relation: Relation::Yes,
            symbol_type: None,
        });
        let b = arena.mk_var(Var {
            name: "CONFIG_A".to_string(),
            relation: Relation::Helper,
            symbol_type: None,
        });
        assert!(!arena.structural_eq(a, b));
    }

    #[test]
    fn kconfig_names() {
        let mut arena = Arena::default();
        let m = arena.kconfig_var("USB", Relation::Module, Some(SymbolType::Tristate));
        assert_eq!(arena.render(m), "CONFIG_USB_MODULE");
    }

    #[test]
    fn evaluation() {
        let mut arena = Arena::default();
        let e = arena.parse("x -> y").unwrap();

        let mut assignment = HashMap::default();
        for (x, y, value) in [
            (true, true, true),
            (true, false, false),
            (false, true, true),
            (false, false, true),
        ] {
            assignment.insert("x".to_string(), x);
            assignment.insert("y".to_string(), y);
            assert_eq!(arena.eval(e, &assignment), Some(value));
        }

        let opaque = arena.parse("x && (a == b)").unwrap();
        assignment.insert("x".to_string(), false);
        assert_eq!(arena.eval(opaque, &assignment), Some(false));
        assignment.insert("x".to_string(), true);
        assert_eq!(arena.eval(opaque, &assignment), None);
    }

    #[test]
    fn variable_order() {
        let mut arena = Arena::default();
        let e = arena.parse("(b || a) && !b && c").unwrap();
        assert_eq!(arena.vars(e), vec!["b", "a", "c"]);
    }
}

/*!
Algebraic simplification of expressions.

[Arena::simplify] rewrites an expression bottom-up, applying the first matching rule at each node:

- `!c` for a constant `c` folds, and `!!x` is `x`.
- In `x && y` a constant operand short-circuits, equal operands collapse to one, and complementary operands give `0`.
  Dually for `x || y`, with complementary operands giving `1`.
- `x -> 1` is `1`, `x -> 0` is the simplification of `!x`, `0 -> y` is `1` and `1 -> y` is `y`.
- `x <-> c` for a constant `c` is `x` or the simplification of `!x`.
- The `module` variable of a boolean symbol is `0`.
- Calls and other operators simplify their children only.

The input is never mutated.
Rewritten nodes are freshly allocated, and nodes whose children are unchanged are reused.

```rust
# use undertaker::expr::Arena;
let mut arena = Arena::default();
let e = arena.parse("(!X) -> (Y && 0)").unwrap();
let s = arena.simplify(e);
assert_eq!(arena.render(s), "X");
```
*/

use crate::{
    misc::log::targets::{self},
    structures::symbol::SymbolType,
};

use super::{Arena, ExprId, Node, Relation, FALSE, TRUE};

impl Arena {
    /// The simplification of `root`.
    pub fn simplify(&mut self, root: ExprId) -> ExprId {
        let order = self.post_order(root);
        let mut memo: Vec<Option<ExprId>> = vec![None; self.len()];

        for id in order {
            let simplified = |e: ExprId| memo[e.index()].unwrap_or(e);

            let result = match self.node(id).clone() {
                Node::Const(_) => id,

                Node::Var(var) => match (var.relation, var.symbol_type) {
                    (Relation::Module, Some(SymbolType::Boolean)) => FALSE,
                    _ => id,
                },

                Node::Not(e) => {
                    let e_s = simplified(e);
                    match e_s == e {
                        true => self.simplify_not(e_s, Some(id)),
                        false => self.simplify_not(e_s, None),
                    }
                }

                Node::And(l, r) => {
                    let (l_s, r_s) = (simplified(l), simplified(r));
                    let reuse = (l_s == l && r_s == r).then_some(id);
                    self.simplify_and(l_s, r_s, reuse)
                }

                Node::Or(l, r) => {
                    let (l_s, r_s) = (simplified(l), simplified(r));
                    let reuse = (l_s == l && r_s == r).then_some(id);
                    self.simplify_or(l_s, r_s, reuse)
                }

                Node::Impl(l, r) => {
                    let (l_s, r_s) = (simplified(l), simplified(r));
                    match (self.as_constant(l_s), self.as_constant(r_s)) {
                        (_, Some(true)) | (Some(false), _) => TRUE,
                        (_, Some(false)) => self.simplify_not(l_s, None),
                        (Some(true), _) => r_s,
                        _ if l_s == l && r_s == r => id,
                        _ => self.mk_impl(l_s, r_s),
                    }
                }

                Node::Eq(l, r) => {
                    let (l_s, r_s) = (simplified(l), simplified(r));
                    match (self.as_constant(l_s), self.as_constant(r_s)) {
                        (Some(true), _) => r_s,
                        (_, Some(true)) => l_s,
                        (Some(false), _) => self.simplify_not(r_s, None),
                        (_, Some(false)) => self.simplify_not(l_s, None),
                        _ if l_s == l && r_s == r => id,
                        _ => self.mk_eq(l_s, r_s),
                    }
                }

                Node::Any(operator, l, r) => {
                    let (l_s, r_s) = (simplified(l), simplified(r));
                    match l_s == l && r_s == r {
                        true => id,
                        false => self.mk_any(operator, l_s, r_s),
                    }
                }

                Node::Call(name, parameters) => {
                    let simplified_parameters: Vec<ExprId> =
                        parameters.iter().map(|p| simplified(*p)).collect();
                    match simplified_parameters == parameters {
                        true => id,
                        false => self.mk_call(name, simplified_parameters),
                    }
                }
            };

            memo[id.index()] = Some(result);
        }

        let result = memo[root.index()].unwrap_or(root);
        log::trace!(target: targets::EXPRESSION, "Simplified {root} to {result}");
        result
    }

    /// Whether `e` is the negation of `f`, or `f` the negation of `e`.
    fn complementary(&self, e: ExprId, f: ExprId) -> bool {
        match (self.node(e), self.node(f)) {
            (Node::Not(inner), _) if self.structural_eq(*inner, f) => true,
            (_, Node::Not(inner)) if self.structural_eq(e, *inner) => true,
            _ => false,
        }
    }

    /// The negation of a simplified expression `e`, with `reuse` an existing node for the negation.
    fn simplify_not(&mut self, e: ExprId, reuse: Option<ExprId>) -> ExprId {
        match self.node(e) {
            Node::Const(value) => self.constant(!*value),
            Node::Not(inner) => *inner,
            _ => reuse.unwrap_or_else(|| self.mk_not(e)),
        }
    }

    fn simplify_and(&mut self, l: ExprId, r: ExprId, reuse: Option<ExprId>) -> ExprId {
        match (self.as_constant(l), self.as_constant(r)) {
            (Some(false), _) | (_, Some(false)) => FALSE,
            (Some(true), _) => r,
            (_, Some(true)) => l,
            _ if self.structural_eq(l, r) => l,
            _ if self.complementary(l, r) => FALSE,
            _ => reuse.unwrap_or_else(|| self.mk_and(l, r)),
        }
    }

    fn simplify_or(&mut self, l: ExprId, r: ExprId, reuse: Option<ExprId>) -> ExprId {
        match (self.as_constant(l), self.as_constant(r)) {
            (Some(true), _) | (_, Some(true)) => TRUE,
            (Some(false), _) => r,
            (_, Some(false)) => l,
            _ if self.structural_eq(l, r) => l,
            _ if self.complementary(l, r) => TRUE,
            _ => reuse.unwrap_or_else(|| self.mk_or(l, r)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::expr::Var;

    fn simplified(text: &str) -> String {
        let mut arena = Arena::default();
        let e = arena.parse(text).unwrap();
        let s = arena.simplify(e);
        arena.render(s)
    }

    #[test]
    fn rules() {
        assert_eq!(simplified("X || 1"), "1");
        assert_eq!(simplified("X || 0"), "X");
        assert_eq!(simplified("X && 0"), "0");
        assert_eq!(simplified("X && 1"), "X");
        assert_eq!(simplified("X && X"), "X");
        assert_eq!(simplified("X && Y && 0"), "0");
        assert_eq!(simplified("X -> (Y && 0)"), "!X");
        assert_eq!(simplified("X -> (Y || 1)"), "1");
        assert_eq!(simplified("(!X) -> (Y && 0)"), "X");
        assert_eq!(simplified("!!!X"), "!X");
        assert_eq!(simplified("!X || X"), "1");
        assert_eq!(simplified("X && !X"), "0");
        assert_eq!(simplified("X || X"), "X");
    }

    #[test]
    fn equivalence_with_constants() {
        assert_eq!(simplified("X <-> 1"), "X");
        assert_eq!(simplified("0 <-> X"), "!X");
        assert_eq!(simplified("(A && B) <-> (C || 1)"), "A && B");
    }

    #[test]
    fn opaque_nodes_keep_their_shape() {
        assert_eq!(simplified("f(X && 1, Y) == (Z || 0)"), "f (X, Y) == Z");
        assert_eq!(simplified("f(A) && f(A)"), "f (A)");
    }

    #[test]
    fn boolean_module_variables() {
        let mut arena = Arena::default();
        let boolean = arena.kconfig_var("A", Relation::Module, Some(SymbolType::Boolean));
        let tristate = arena.kconfig_var("B", Relation::Module, Some(SymbolType::Tristate));
        let e = arena.mk_or(boolean, tristate);

        let s = arena.simplify(e);
        assert_eq!(arena.render(s), "CONFIG_B_MODULE");
    }

    #[test]
    fn input_is_unchanged() {
        let mut arena = Arena::default();
        let e = arena.parse("X && (Y || 1)").unwrap();
        let before = arena.render(e);
        let _ = arena.simplify(e);
        assert_eq!(arena.render(e), before);
    }

    #[test]
    fn unchanged_nodes_are_reused() {
        let mut arena = Arena::default();
        let e = arena.parse("(A || B) && !C").unwrap();
        assert_eq!(arena.simplify(e), e);
    }

    #[test]
    fn soundness_on_shared_nodes() {
        let mut arena = Arena::default();
        let x = arena.mk_var(Var {
            name: "x".to_string(),
            relation: Relation::Yes,
            symbol_type: None,
        });
        let not_x = arena.mk_not(x);
        let both = arena.mk_and(x, not_x);
        let root = arena.mk_or(both, not_x);
        let s = arena.simplify(root);

        for value in [true, false] {
            let assignment = HashMap::from([("x".to_string(), value)]);
            assert_eq!(arena.eval(root, &assignment), arena.eval(s, &assignment));
        }
    }

    /// A random expression over `a`, `b` and `c`, reusing earlier operands (or their negations) from `pool`.
    fn random_expression(arena: &mut Arena, rng: &mut StdRng, pool: &mut Vec<ExprId>, depth: usize) -> ExprId {
        const NAMES: [&str; 3] = ["a", "b", "c"];

        if !pool.is_empty() && rng.random_bool(0.3) {
            let shared = pool[rng.random_range(0..pool.len())];
            return match rng.random_bool(0.5) {
                true => shared,
                false => arena.mk_not(shared),
            };
        }

        let e = if depth == 0 || rng.random_bool(0.2) {
            match rng.random_range(0..8) {
                0 => arena.constant(rng.random_bool(0.5)),
                _ => arena.var(NAMES[rng.random_range(0..NAMES.len())]),
            }
        } else {
            let l = random_expression(arena, rng, pool, depth - 1);
            match rng.random_range(0..5) {
                0 => arena.mk_not(l),
                operator => {
                    let r = random_expression(arena, rng, pool, depth - 1);
                    match operator {
                        1 => arena.mk_and(l, r),
                        2 => arena.mk_or(l, r),
                        3 => arena.mk_impl(l, r),
                        _ => arena.mk_eq(l, r),
                    }
                }
            }
        };
        pool.push(e);
        e
    }

    #[test]
    fn soundness_on_random_expressions() {
        let mut rng = StdRng::seed_from_u64(0x51a1);

        for _ in 0..2000 {
            let mut arena = Arena::default();
            let mut pool = Vec::default();
            let root = random_expression(&mut arena, &mut rng, &mut pool, 6);
            let s = arena.simplify(root);

            for bits in 0..8_u32 {
                let assignment: HashMap<String, bool> = ["a", "b", "c"]
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.to_string(), bits & (1 << i) != 0))
                    .collect();
                assert_eq!(
                    arena.eval(root, &assignment),
                    arena.eval(s, &assignment),
                    "{} simplified to {} under {assignment:?}",
                    arena.render(root),
                    arena.render(s)
                );
            }
        }
    }
}

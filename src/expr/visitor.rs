/*!
Post-order traversal of expressions, with memoization.

A [Visitor] is called once for each node reachable from a root, children first, and is given the results of visiting the children of the node.
Results are cached by arena index for the duration of a traversal, so a node shared by many parents is visited once.

The order of visits is a depth-first, left-to-right post-order, and so deterministic.
In particular, the parameters of a call are visited in order, and then the call.

```rust
# use undertaker::expr::{Arena, ExprId, visitor::{Visited, Visitor}};
/// Counts the distinct nodes of an expression.
struct Count(usize);

impl Visitor for Count {
    type Output = ();
    type Error = ();

    fn visit(&mut self, _: &Arena, _: ExprId, _: Visited<'_, ()>) -> Result<(), ()> {
        self.0 += 1;
        Ok(())
    }
}

let mut arena = Arena::default();
let x = arena.var("x");
let shared = arena.mk_and(x, x);
let root = arena.mk_or(shared, shared);

let mut count = Count(0);
arena.accept(root, &mut count).unwrap();
assert_eq!(count.0, 3);
```
*/

use super::{Arena, ExprId, Node, Var};

/// A node, with the results of visiting its children in place of the children.
#[derive(Debug)]
pub enum Visited<'a, T> {
    Const(bool),
    Var(&'a Var),
    Not(T),
    And(T, T),
    Or(T, T),
    Impl(T, T),
    Eq(T, T),
    Any(&'a str, T, T),
    Call(&'a str, Vec<T>),
}

/// Something called on each node of an expression, after its children.
pub trait Visitor {
    /// The result of visiting a node, cloned for each parent of a shared node.
    type Output: Clone;

    type Error;

    fn visit(
        &mut self,
        arena: &Arena,
        id: ExprId,
        node: Visited<'_, Self::Output>,
    ) -> Result<Self::Output, Self::Error>;
}

impl Node {
    /// The children of the node, in order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Node::Const(_) | Node::Var(_) => Vec::default(),
            Node::Not(e) => vec![*e],
            Node::And(l, r)
            | Node::Or(l, r)
            | Node::Impl(l, r)
            | Node::Eq(l, r)
            | Node::Any(_, l, r) => vec![*l, *r],
            Node::Call(_, parameters) => parameters.clone(),
        }
    }
}

impl Arena {
    /// Every node reachable from `root`, each once, in post-order.
    pub fn post_order(&self, root: ExprId) -> Vec<ExprId> {
        let mut seen = vec![false; self.len()];
        let mut order = Vec::default();

        // Pairs of a node and whether its children have been pushed.
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            if seen[id.index()] {
                continue;
            }
            seen[id.index()] = true;
            stack.push((id, true));
            for child in self.node(id).children().into_iter().rev() {
                if !seen[child.index()] {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    /// Visits every node reachable from `root` and returns the result of visiting `root`.
    pub fn accept<V: Visitor>(&self, root: ExprId, visitor: &mut V) -> Result<V::Output, V::Error> {
        let mut memo: Vec<Option<V::Output>> = vec![None; self.len()];

        for id in self.post_order(root) {
            let result = |e: &ExprId| -> V::Output {
                match &memo[e.index()] {
                    Some(output) => output.clone(),
                    None => unreachable!("child {e} visited after its parent"),
                }
            };

            let visited = match self.node(id) {
                Node::Const(value) => Visited::Const(*value),
                Node::Var(var) => Visited::Var(var),
                Node::Not(e) => Visited::Not(result(e)),
                Node::And(l, r) => Visited::And(result(l), result(r)),
                Node::Or(l, r) => Visited::Or(result(l), result(r)),
                Node::Impl(l, r) => Visited::Impl(result(l), result(r)),
                Node::Eq(l, r) => Visited::Eq(result(l), result(r)),
                Node::Any(operator, l, r) => Visited::Any(operator, result(l), result(r)),
                Node::Call(name, parameters) => Visited::Call(name, parameters.iter().map(result).collect()),
            };

            let output = visitor.visit(self, id, visited)?;
            memo[id.index()] = Some(output);
        }

        match memo[root.index()].take() {
            Some(output) => Ok(output),
            None => unreachable!("root {root} not visited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order(Vec<String>);

    impl Visitor for Order {
        type Output = ();
        type Error = ();

        fn visit(&mut self, arena: &Arena, id: ExprId, _: Visited<'_, ()>) -> Result<(), ()> {
            self.0.push(arena.render(id));
            Ok(())
        }
    }

    #[test]
    fn calls_visit_parameters_first() {
        let mut arena = Arena::default();
        let root = arena.parse("f(a, b && c)").unwrap();

        let mut order = Order(Vec::default());
        arena.accept(root, &mut order).unwrap();
        assert_eq!(order.0, vec!["a", "b", "c", "b && c", "f (a, b && c)"]);
    }

    #[test]
    fn shared_nodes_are_visited_once() {
        let mut arena = Arena::default();
        let x = arena.var("x");
        let not_x = arena.mk_not(x);
        let root = arena.mk_eq(not_x, not_x);

        assert_eq!(arena.post_order(root), vec![x, not_x, root]);
    }

    #[test]
    fn errors_stop_the_traversal() {
        struct Refuse;
        impl Visitor for Refuse {
            type Output = ();
            type Error = ExprId;

            fn visit(&mut self, _: &Arena, id: ExprId, node: Visited<'_, ()>) -> Result<(), ExprId> {
                match node {
                    Visited::Any(..) => Err(id),
                    _ => Ok(()),
                }
            }
        }

        let mut arena = Arena::default();
        let root = arena.parse("a && (b + c)").unwrap();
        assert!(arena.accept(root, &mut Refuse).is_err());
    }
}

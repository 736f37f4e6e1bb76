/*!
Printing of expressions.

Each kind of node has a priority, and a child is parenthesised only if its priority is lower than the priority of its parent:

| node                | priority |
|---------------------|----------|
| `<->`               | 10       |
| `->`                | 20       |
| `\|\|`              | 30       |
| `&&`                | 50       |
| any other operator  | 60       |
| `!`                 | 70       |
| atoms and calls     | 90       |

Constants print as `1` and `0`, and calls as `name (a, b)`.

```rust
# use undertaker::expr::Arena;
let mut arena = Arena::default();
let e = arena.parse("CONFIG_NO_HZ -> (A && B)").unwrap();
assert_eq!(arena.render(e), "CONFIG_NO_HZ -> A && B");

let e = arena.parse("(X || Y) && Z").unwrap();
assert_eq!(arena.render(e), "(X || Y) && Z");
```
*/

use super::{
    visitor::{Visited, Visitor},
    Arena, ExprId, Node,
};

/// The priority of a node when printed.
pub fn priority(node: &Node) -> u8 {
    match node {
        Node::Eq(..) => 10,
        Node::Impl(..) => 20,
        Node::Or(..) => 30,
        Node::And(..) => 50,
        Node::Any(..) => 60,
        Node::Not(..) => 70,
        Node::Const(_) | Node::Var(_) | Node::Call(..) => 90,
    }
}

/// Builds the text of each node from the text of its children.
struct Printer;

/// A printed node, with its priority.
type Printed = (String, u8);

fn wrap(child: Printed, parent: u8) -> String {
    match child.1 < parent {
        true => format!("({})", child.0),
        false => child.0,
    }
}

fn infix(l: Printed, operator: &str, r: Printed, parent: u8) -> String {
    format!("{} {operator} {}", wrap(l, parent), wrap(r, parent))
}

impl Visitor for Printer {
    type Output = Printed;
    type Error = std::convert::Infallible;

    fn visit(
        &mut self,
        arena: &Arena,
        id: ExprId,
        node: Visited<'_, Printed>,
    ) -> Result<Printed, Self::Error> {
        let p = priority(arena.node(id));
        let text = match node {
            Visited::Const(true) => "1".to_string(),
            Visited::Const(false) => "0".to_string(),
            Visited::Var(var) => var.name.clone(),
            Visited::Not(e) => format!("!{}", wrap(e, p)),
            Visited::And(l, r) => infix(l, "&&", r, p),
            Visited::Or(l, r) => infix(l, "||", r, p),
            Visited::Impl(l, r) => infix(l, "->", r, p),
            Visited::Eq(l, r) => infix(l, "<->", r, p),
            Visited::Any(operator, l, r) => infix(l, operator, r, p),
            Visited::Call(name, parameters) => {
                let parameters = parameters.into_iter().map(|(text, _)| text).collect::<Vec<_>>();
                format!("{name} ({})", parameters.join(", "))
            }
        };
        Ok((text, p))
    }
}

impl Arena {
    /// The text of the expression `id`.
    pub fn render(&self, id: ExprId) -> String {
        match self.accept(id, &mut Printer) {
            Ok((text, _)) => text,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(text: &str) -> String {
        let mut arena = Arena::default();
        let e = arena.parse(text).unwrap();
        arena.render(e)
    }

    #[test]
    fn renderings() {
        assert_eq!(round("X || Y && Z"), "X || Y && Z");
        assert_eq!(round("(X || Y) && Z"), "(X || Y) && Z");
        assert_eq!(round("ExFalso->Quodlibet"), "ExFalso -> Quodlibet");
        assert_eq!(round("CONFIG_NO_HZ -> (A && B)"), "CONFIG_NO_HZ -> A && B");
        assert_eq!(round("0 || 1 || 'r'"), "0 || 1 || 1");
        assert_eq!(round("(A == B) && (C == D)"), "A == B && C == D");
        assert_eq!(round("A ? B : C"), "A ? B : C");
    }

    #[test]
    fn negation() {
        assert_eq!(round("!(A && B)"), "!(A && B)");
        assert_eq!(round("! A"), "!A");
        assert_eq!(round("!!A"), "!!A");
    }

    #[test]
    fn calls() {
        assert_eq!(round("foo()"), "foo ()");
        assert_eq!(round("foo(x,y)"), "foo (x, y)");
        assert_eq!(round("foo(bar(x), y || z)"), "foo (bar (x), y || z)");
    }
}

/*!
Atoms and literals.

An atom is a positive integer, and a literal is an atom paired with a polarity.
Throughout the library literals are signed integers, with the sign indicating polarity, as in the CNF file format.

```rust
# use undertaker::structures::literal::{IntLiteral, Literal};
let literal = IntLiteral::new(79, false);

assert_eq!(literal, -79);
assert_eq!(literal.atom(), 79);
assert!(!literal.polarity());
assert!(literal.negate().polarity());
```

The oracle indexes its internal structures by literal, for which [Literal::index] maps each literal of an atom to a distinct slot.
*/

/// An atom, aka. a 'variable'.
pub type Atom = u32;

/// The representation of a literal as a signed integer.
pub type IntLiteral = i32;

/// Something which has methods for returning an atom and a polarity.
pub trait Literal: Copy + Ord + std::hash::Hash {
    /// A fresh literal, specified by pairing an atom with a boolean.
    fn new(atom: Atom, polarity: bool) -> Self;

    /// The negation of the literal.
    fn negate(&self) -> Self;

    /// The atom of the literal.
    fn atom(&self) -> Atom;

    /// The polarity of the literal.
    fn polarity(&self) -> bool;

    /// A dense index for the literal, with the positive literal of atom `a` at `2a` and the negative at `2a + 1`.
    fn index(&self) -> usize {
        2 * self.atom() as usize + (!self.polarity()) as usize
    }
}

impl Literal for IntLiteral {
    fn new(atom: Atom, polarity: bool) -> Self {
        match polarity {
            true => atom as IntLiteral,
            false => -(atom as IntLiteral),
        }
    }

    fn negate(&self) -> Self {
        -self
    }

    fn atom(&self) -> Atom {
        self.unsigned_abs()
    }

    fn polarity(&self) -> bool {
        self.is_positive()
    }
}

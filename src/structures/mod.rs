//! Key structures shared by formulas, the oracle and the Kconfig translators.
//!
//! - [Atoms](literal::Atom) are the variables of a formula, numbered from one.
//! - [Literals](literal::Literal) pair an atom with a polarity, represented as signed integers as is usual for CNF files.
//! - [Symbol types](symbol::SymbolType) record the Kconfig type a variable was derived from.

pub mod literal;
pub mod symbol;

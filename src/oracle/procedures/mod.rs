//! Procedures of the [solver](crate::oracle::Solver), each an `impl` block on the solver.
//!
//! - [solve] manages the others, and decides satisfiability given some assumptions.
//! - [bcp] propagates assignments through the clauses.
//! - [analysis] derives a clause from a conflict.
//! - [backjump] undoes assignments made after some level.
//! - [decision] chooses an atom and a value for the atom.
//! - [assumptions] decides assumptions, and collects those responsible for unsatisfiability.

pub mod analysis;
pub mod assumptions;
pub mod backjump;
pub mod bcp;
pub mod decision;
pub mod solve;

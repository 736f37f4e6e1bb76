/*!
The decision procedure behind a formula.

An [Oracle] answers whether a set of clauses is satisfiable, given some assumptions, and after answering can be asked for a model or for the assumptions responsible for an unsatisfiable answer.

[Solver] is the built-in oracle, a conflict-driven clause-learning procedure:

- Clauses are watched by two literals, and propagation visits only the clauses watching a falsified literal ([bcp](procedures::bcp)).
- Conflicts are analysed to the first unique implication point, and the learnt clause decides where to jump back to ([analysis](procedures::analysis), [backjump](procedures::backjump)).
- Decisions take the most active atom without a value, with the saved phase of the atom ([decision](procedures::decision)).
- Restarts are scheduled by the [luby] sequence.
- Assumptions are decided before anything else, and when an assumption is found to be false the assumptions responsible are collected ([assumptions](procedures::assumptions)).

Clauses may be added between calls to [solve_given](Oracle::solve_given), so an oracle is incremental.

```rust
# use undertaker::oracle::{Oracle, Report, Solver};
# use undertaker::config::Config;
let mut oracle = Solver::from_config(&Config::default());
oracle.reserve(2);
oracle.add_clause(&[-1, 2]).unwrap();

assert_eq!(oracle.solve_given(&[1, -2], None), Ok(Report::Unsatisfiable));
assert!(!oracle.failed_assumptions().is_empty());

assert_eq!(oracle.solve_given(&[1], None), Ok(Report::Satisfiable));
assert_eq!(oracle.value_of(2), Some(true));
```
*/

pub mod index_heap;
pub mod luby;
pub mod procedures;
mod solver;

pub use solver::Solver;

use std::time::Duration;

use crate::{
    config::Config,
    structures::literal::{Atom, IntLiteral},
    types::err::{self},
};

/// The result of a call to an oracle.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Report {
    /// The clauses are satisfiable, together with the assumptions.
    Satisfiable,

    /// The clauses are unsatisfiable, together with the assumptions.
    Unsatisfiable,

    /// Satisfiability could not be determined within the time allowed.
    TimeUp,
}

/// Something which decides the satisfiability of clauses.
pub trait Oracle {
    /// A fresh oracle, configured by the relevant parts of `config`.
    fn from_config(config: &Config) -> Self;

    /// Ensures atoms `1..=atoms` are known to the oracle.
    fn reserve(&mut self, atoms: Atom);

    /// Adds a clause. Literals of atoms not [reserved](Oracle::reserve) are an error.
    fn add_clause(&mut self, clause: &[IntLiteral]) -> Result<(), err::OracleError>;

    /// Decides the satisfiability of the clauses added, together with `assumptions`.
    ///
    /// Assumptions only apply to the call.
    fn solve_given(
        &mut self,
        assumptions: &[IntLiteral],
        limit: Option<Duration>,
    ) -> Result<Report, err::OracleError>;

    /// The value of `atom` on the model found by the last satisfiable call.
    fn value_of(&self, atom: Atom) -> Option<bool>;

    /// After an unsatisfiable call, assumptions sufficient for unsatisfiability.
    fn failed_assumptions(&self) -> Vec<IntLiteral>;
}

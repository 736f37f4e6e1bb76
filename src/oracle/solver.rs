/*!
The built-in oracle.

The solver is made of a handful of parallel vectors indexed by atom (value, level, reason, phase) together with a clause store, watch lists indexed by [literal](crate::structures::literal::Literal::index) and a trail of assignments.

Procedures on the solver are split by purpose, see [procedures](crate::oracle::procedures).
*/

use std::time::Duration;

use crate::{
    config::Config,
    misc::log::targets::{self},
    structures::literal::{Atom, IntLiteral, Literal},
    types::err::{self},
};

use super::{index_heap::IndexHeap, luby::Luby, Oracle, Report};

/// The index of a clause in the clause store.
pub type ClauseKey = usize;

/// Counts of events during solves.
#[derive(Default, Debug)]
pub struct Counters {
    pub conflicts: usize,
    pub decisions: usize,
    pub restarts: usize,
    /// Conflicts since the last restart.
    pub fresh_conflicts: usize,
    pub luby: Luby,
}

pub struct Solver {
    /// Clauses, both added and learnt. Each clause is watched by its first two literals.
    pub(super) clauses: Vec<Vec<IntLiteral>>,

    /// For each literal, the clauses watching the literal.
    pub(super) watches: Vec<Vec<ClauseKey>>,

    pub(super) values: Vec<Option<bool>>,
    pub(super) levels: Vec<usize>,
    pub(super) reasons: Vec<Option<ClauseKey>>,
    pub(super) phases: Vec<bool>,
    pub(super) activity: IndexHeap<f64>,
    pub(super) bump: f64,

    /// Assignments in order, with the index of the first assignment of each level after zero.
    pub(super) trail: Vec<IntLiteral>,
    pub(super) trail_limits: Vec<usize>,

    /// The index of the next assignment on the trail to propagate.
    pub(super) q_head: usize,

    /// Whether the clauses are unsatisfiable regardless of assumptions.
    pub(super) inconsistent: bool,

    pub(super) model: Vec<Option<bool>>,
    pub(super) failed: Vec<IntLiteral>,

    pub(super) default_phase: bool,
    pub(super) restart: bool,
    pub(super) luby_u: u32,

    pub counters: Counters,
}

impl Solver {
    /// A count of atoms known to the solver.
    pub fn atom_count(&self) -> Atom {
        (self.values.len() - 1) as Atom
    }

    pub(super) fn value(&self, literal: IntLiteral) -> Option<bool> {
        self.values[literal.atom() as usize].map(|value| value == literal.polarity())
    }

    pub(super) fn level(&self) -> usize {
        self.trail_limits.len()
    }

    /// Records `literal` as true at the current level.
    pub(super) fn assign(&mut self, literal: IntLiteral, reason: Option<ClauseKey>) {
        let atom = literal.atom() as usize;
        self.values[atom] = Some(literal.polarity());
        self.levels[atom] = self.level();
        self.reasons[atom] = reason;
        self.trail.push(literal);
    }

    fn check_literal(&self, literal: IntLiteral) -> Result<(), err::OracleError> {
        match literal != 0 && literal.atom() <= self.atom_count() {
            true => Ok(()),
            false => Err(err::OracleError::UnknownVariable(literal)),
        }
    }

    /// Stores `clause` and watches its first two literals.
    pub(super) fn store(&mut self, clause: Vec<IntLiteral>) -> ClauseKey {
        let key = self.clauses.len();
        self.watches[clause[0].index()].push(key);
        self.watches[clause[1].index()].push(key);
        self.clauses.push(clause);
        key
    }
}

impl Oracle for Solver {
    fn from_config(config: &Config) -> Self {
        Solver {
            clauses: Vec::default(),
            watches: vec![Vec::default(); 2],
            values: vec![None],
            levels: vec![0],
            reasons: vec![None],
            phases: vec![config.default_phase.value],
            activity: IndexHeap::default(),
            bump: 1.0,
            trail: Vec::default(),
            trail_limits: Vec::default(),
            q_head: 0,
            inconsistent: false,
            model: Vec::default(),
            failed: Vec::default(),
            default_phase: config.default_phase.value,
            restart: config.restart.value,
            luby_u: config.luby_u.value,
            counters: Counters::default(),
        }
    }

    fn reserve(&mut self, atoms: Atom) {
        let required = atoms as usize + 1;
        if self.values.len() >= required {
            return;
        }
        self.values.resize(required, None);
        self.levels.resize(required, 0);
        self.reasons.resize(required, None);
        self.phases.resize(required, self.default_phase);
        self.watches.resize(2 * required, Vec::default());
        for atom in 1..required {
            if self.activity.add(atom, 0.0) {
                self.activity.activate(atom);
            }
        }
    }

    /// Adds a clause, between solves.
    ///
    /// Duplicate literals are removed and tautologies are skipped.
    /// Literals are ordered so that the watched literals are not false at level zero, where possible.
    fn add_clause(&mut self, clause: &[IntLiteral]) -> Result<(), err::OracleError> {
        for literal in clause {
            self.check_literal(*literal)?;
        }
        if self.inconsistent {
            return Ok(());
        }

        let mut clause = clause.to_vec();
        clause.sort_unstable_by_key(|literal| (literal.atom(), !literal.polarity()));
        clause.dedup();
        if clause.windows(2).any(|pair| pair[0] == -pair[1]) {
            return Ok(());
        }
        // Not false literals first, as values at level zero are permanent.
        clause.sort_by_key(|literal| self.value(*literal) == Some(false));

        match clause.first().map(|literal| self.value(*literal)) {
            None | Some(Some(false)) => {
                log::debug!(target: targets::ORACLE, "Clause is false at level zero");
                self.inconsistent = true;
            }

            Some(Some(true)) => {
                if clause.len() > 1 {
                    self.store(clause);
                }
            }

            Some(None) => {
                let unit = clause.len() == 1 || self.value(clause[1]) == Some(false);
                let literal = clause[0];
                let reason = match clause.len() {
                    1 => None,
                    _ => Some(self.store(clause)),
                };
                if unit {
                    self.assign(literal, reason);
                }
            }
        }
        Ok(())
    }

    fn solve_given(
        &mut self,
        assumptions: &[IntLiteral],
        limit: Option<Duration>,
    ) -> Result<Report, err::OracleError> {
        for literal in assumptions {
            self.check_literal(*literal)?;
        }
        Ok(self.solve(assumptions, limit))
    }

    fn value_of(&self, atom: Atom) -> Option<bool> {
        self.model.get(atom as usize).copied().flatten()
    }

    fn failed_assumptions(&self) -> Vec<IntLiteral> {
        self.failed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver(atoms: Atom) -> Solver {
        let mut solver = Solver::from_config(&Config::default());
        solver.reserve(atoms);
        solver
    }

    #[test]
    fn unknown_atoms() {
        let mut solver = solver(2);
        assert_eq!(solver.add_clause(&[1, 3]), Err(err::OracleError::UnknownVariable(3)));
        assert_eq!(solver.add_clause(&[0]), Err(err::OracleError::UnknownVariable(0)));
        assert_eq!(solver.solve_given(&[-4], None), Err(err::OracleError::UnknownVariable(-4)));
    }

    #[test]
    fn empty_clause() {
        let mut solver = solver(1);
        solver.add_clause(&[]).unwrap();
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn tautologies_are_skipped() {
        let mut solver = solver(1);
        solver.add_clause(&[1, -1]).unwrap();
        assert!(solver.clauses.is_empty());
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Satisfiable));
    }

    #[test]
    fn units_propagate_on_addition() {
        let mut solver = solver(3);
        solver.add_clause(&[1]).unwrap();
        solver.add_clause(&[-1, 2]).unwrap();
        assert_eq!(solver.value(2), None);
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(2), Some(true));

        solver.add_clause(&[-2]).unwrap();
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Unsatisfiable));
    }

    #[test]
    fn default_phase() {
        let mut solver = solver(3);
        solver.add_clause(&[1, 2, 3]).unwrap();
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Satisfiable));
        let trues = (1..=3).filter(|atom| solver.value_of(*atom) == Some(true)).count();
        assert_eq!(trues, 1);
    }
}

/*!
Boolean constraint propagation.

Propagates each assignment on the trail in turn.
For an assignment making literal *l* false, the clauses watching *l* are examined and either:
- The clause is satisfied by its other watched literal, and nothing happens.
- Some other literal of the clause is not false, and becomes watched in place of *l*.
- The other watched literal has no value, and is asserted by the clause.
- Every literal of the clause is false, and the clause is returned as a conflict.

Watched literals are kept at the first two positions of a clause, and an asserted literal is moved to the first position, so the first literal of the reason for an assignment is the assigned literal.
*/

use crate::{
    misc::log::targets::{self},
    oracle::{solver::ClauseKey, Solver},
    structures::literal::{IntLiteral, Literal},
};

impl Solver {
    /// Propagates the trail from the queue head, returning the key of a conflicting clause, if found.
    pub fn propagate(&mut self) -> Option<ClauseKey> {
        while let Some(literal) = self.trail.get(self.q_head).copied() {
            self.q_head += 1;
            if let Some(key) = self.bcp(literal) {
                return Some(key);
            }
        }
        None
    }

    /// Propagates `literal` being made true.
    fn bcp(&mut self, literal: IntLiteral) -> Option<ClauseKey> {
        let false_literal = literal.negate();

        // Taken to allow mutation of clauses and other watch lists.
        // No clause is moved to the watch list of the false literal, so the list is restored below.
        let mut watchers = std::mem::take(&mut self.watches[false_literal.index()]);
        let mut conflict = None;
        let mut index = 0;

        'watch_loop: while index < watchers.len() {
            let key = watchers[index];

            if self.clauses[key][0] == false_literal {
                self.clauses[key].swap(0, 1);
            }

            let other = self.clauses[key][0];
            if self.value(other) == Some(true) {
                index += 1;
                continue 'watch_loop;
            }

            for position in 2..self.clauses[key].len() {
                let candidate = self.clauses[key][position];
                if self.value(candidate) != Some(false) {
                    self.clauses[key].swap(1, position);
                    self.watches[candidate.index()].push(key);
                    watchers.swap_remove(index);
                    continue 'watch_loop;
                }
            }

            match self.value(other) {
                None => {
                    self.assign(other, Some(key));
                    index += 1;
                }

                _ => {
                    log::trace!(target: targets::ORACLE, "Conflict on clause {key} from {literal}");
                    conflict = Some(key);
                    break 'watch_loop;
                }
            }
        }

        self.watches[false_literal.index()] = watchers;
        conflict
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        oracle::{Oracle, Solver},
    };

    #[test]
    fn chain() {
        let mut solver = Solver::from_config(&Config::default());
        solver.reserve(4);
        solver.add_clause(&[-1, 2]).unwrap();
        solver.add_clause(&[-2, 3, 4]).unwrap();
        solver.add_clause(&[-2, -3]).unwrap();

        solver.trail_limits.push(solver.trail.len());
        solver.assign(1, None);
        assert_eq!(solver.propagate(), None);
        assert_eq!(solver.value(4), Some(true));
    }

    #[test]
    fn conflict() {
        let mut solver = Solver::from_config(&Config::default());
        solver.reserve(2);
        solver.add_clause(&[-1, 2]).unwrap();
        solver.add_clause(&[-1, -2]).unwrap();

        solver.trail_limits.push(solver.trail.len());
        solver.assign(1, None);
        assert!(solver.propagate().is_some());
    }
}

/*!
Analysis of a conflict.

Takes a clause which is false on the current valuation and resolves it with the reasons for assignments made at the current level, in reverse order of assignment, until a single literal of the current level remains (the first unique implication point).
The result is an asserting clause: after a backjump to the second highest level among its literals, the clause asserts the negation of the implication point.

Each atom met during analysis has its activity bumped.

```rust,ignore
let (clause, level) = self.conflict_analysis(key);
self.backjump(level);
```
*/

use crate::{
    misc::log::targets::{self},
    oracle::{solver::ClauseKey, Solver},
    structures::literal::{IntLiteral, Literal},
};

/// Activities are rescaled when any activity exceeds this value.
const ACTIVITY_LIMIT: f64 = 1e100;

/// The growth of the bump for each conflict.
const ACTIVITY_DECAY: f64 = 0.95;

impl Solver {
    /// The asserting clause derived from the conflict on `key`, with the asserted literal first, and the level to backjump to.
    ///
    /// Must be called above level zero.
    pub fn conflict_analysis(&mut self, key: ClauseKey) -> (Vec<IntLiteral>, usize) {
        let mut seen = vec![false; self.values.len()];
        let mut clause: Vec<IntLiteral> = vec![0];
        let mut unresolved = 0;
        let mut index = self.trail.len();
        let mut reason = key;
        let mut asserted: Option<IntLiteral> = None;

        loop {
            // The first literal of a reason is the literal it asserted, which is being resolved on.
            let skip = asserted.is_some() as usize;
            for position in skip..self.clauses[reason].len() {
                let literal = self.clauses[reason][position];
                let atom = literal.atom() as usize;
                if seen[atom] || self.levels[atom] == 0 {
                    continue;
                }
                seen[atom] = true;
                self.bump_activity(atom);
                match self.levels[atom] == self.level() {
                    true => unresolved += 1,
                    false => clause.push(literal),
                }
            }

            loop {
                index -= 1;
                if seen[self.trail[index].atom() as usize] {
                    break;
                }
            }
            let literal = self.trail[index];
            seen[literal.atom() as usize] = false;
            unresolved -= 1;
            asserted = Some(literal);

            if unresolved == 0 {
                break;
            }
            match self.reasons[literal.atom() as usize] {
                Some(key) => reason = key,
                None => break,
            }
        }

        if let Some(literal) = asserted {
            clause[0] = literal.negate();
        }

        // The highest level after the asserted literal is placed second, to be watched.
        let mut level = 0;
        for position in 1..clause.len() {
            let literal_level = self.levels[clause[position].atom() as usize];
            if literal_level > level {
                level = literal_level;
                clause.swap(1, position);
            }
        }

        self.decay_activity();
        log::trace!(target: targets::ORACLE, "Learnt {clause:?}, backjump to {level}");
        (clause, level)
    }

    pub(super) fn bump_activity(&mut self, atom: usize) {
        let bump = self.bump;
        self.activity.apply_to_index(atom, |activity| activity + bump);
        if *self.activity.value_at(atom) > ACTIVITY_LIMIT {
            self.activity.apply_to_all(|activity| activity * 1e-100);
            self.bump *= 1e-100;
        }
    }

    fn decay_activity(&mut self) {
        self.bump /= ACTIVITY_DECAY;
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        oracle::{Oracle, Solver},
    };

    #[test]
    fn first_uip() {
        let mut solver = Solver::from_config(&Config::default());
        solver.reserve(4);
        // 1 at level one, 2 at level two, which implies 3 and then a conflict through 4.
        solver.add_clause(&[-2, 3]).unwrap();
        solver.add_clause(&[-1, -3, 4]).unwrap();
        solver.add_clause(&[-3, -4]).unwrap();

        solver.trail_limits.push(solver.trail.len());
        solver.assign(1, None);
        assert_eq!(solver.propagate(), None);

        solver.trail_limits.push(solver.trail.len());
        solver.assign(2, None);
        let conflict = solver.propagate().unwrap();

        let (clause, level) = solver.conflict_analysis(conflict);
        assert_eq!(clause, vec![-3, -1]);
        assert_eq!(level, 1);
    }
}

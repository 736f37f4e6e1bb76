/*!
Determines satisfiability, given some assumptions.

Roughly, the loop is:

```none
loop {
    propagate
      ├─ conflict at level zero        → unsatisfiable
      ├─ other conflict                → analyse, backjump, assert the learnt clause
      └─ no conflict
           ├─ an assumption is false  → unsatisfiable, with failed assumptions
           ├─ an assumption to decide → decide it
           ├─ some atom has no value  → decide it
           └─ otherwise               → satisfiable
}
```

Between conflicts a restart (a backjump to level zero) is made when the count of fresh conflicts exceeds the current element of the [luby](crate::oracle::luby) sequence, scaled by `luby_u`.

On return the solver is at level zero, so clauses may be added before the next solve.
*/

use std::time::{Duration, Instant};

use crate::{
    misc::log::targets::{self},
    oracle::{
        procedures::{assumptions::AssumptionOk, decision::DecisionOk},
        Report, Solver,
    },
    structures::literal::IntLiteral,
};

impl Solver {
    pub fn solve(&mut self, assumptions: &[IntLiteral], limit: Option<Duration>) -> Report {
        let start = Instant::now();
        self.failed.clear();
        self.model.clear();
        self.counters.fresh_conflicts = 0;

        if self.inconsistent {
            return Report::Unsatisfiable;
        }

        let report = 'solve_loop: loop {
            if limit.is_some_and(|limit| start.elapsed() > limit) {
                break 'solve_loop Report::TimeUp;
            }

            if let Some(key) = self.propagate() {
                self.counters.conflicts += 1;
                self.counters.fresh_conflicts += 1;

                if self.level() == 0 {
                    self.inconsistent = true;
                    break 'solve_loop Report::Unsatisfiable;
                }

                let (clause, level) = self.conflict_analysis(key);
                self.backjump(level);
                let literal = clause[0];
                match clause.len() {
                    1 => self.assign(literal, None),
                    _ => {
                        let key = self.store(clause);
                        self.assign(literal, Some(key));
                    }
                }

                if self.restart && self.luby_interrupt() {
                    self.counters.luby.next();
                    self.counters.fresh_conflicts = 0;
                    self.counters.restarts += 1;
                    self.backjump(0);
                }
                continue 'solve_loop;
            }

            match self.decide_assumption(assumptions) {
                AssumptionOk::Decided => continue 'solve_loop,
                AssumptionOk::Failed => break 'solve_loop Report::Unsatisfiable,
                AssumptionOk::Exhausted => {}
            }

            match self.make_decision() {
                DecisionOk::Literal(literal) => self.decide(literal),
                DecisionOk::Exhausted => {
                    self.model = self.values.clone();
                    break 'solve_loop Report::Satisfiable;
                }
            }
        };

        log::debug!(target: targets::ORACLE,
            "{report:?} after {} conflicts, {} decisions, {} restarts",
            self.counters.conflicts, self.counters.decisions, self.counters.restarts);

        self.backjump(0);
        report
    }

    fn luby_interrupt(&self) -> bool {
        let scheduled = self.luby_u as usize * self.counters.luby.current() as usize;
        self.counters.fresh_conflicts >= scheduled
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        oracle::{Oracle, Report, Solver},
    };

    /// Pigeons into holes, with atom `p * holes + h + 1` for pigeon p in hole h.
    fn pigeonhole(solver: &mut Solver, pigeons: i32, holes: i32) {
        let atom = |p: i32, h: i32| p * holes + h + 1;
        solver.reserve((pigeons * holes) as u32);
        for p in 0..pigeons {
            let clause: Vec<i32> = (0..holes).map(|h| atom(p, h)).collect();
            solver.add_clause(&clause).unwrap();
        }
        for h in 0..holes {
            for p in 0..pigeons {
                for q in (p + 1)..pigeons {
                    solver.add_clause(&[-atom(p, h), -atom(q, h)]).unwrap();
                }
            }
        }
    }

    #[test]
    fn pigeons() {
        let mut solver = Solver::from_config(&Config::default());
        pigeonhole(&mut solver, 5, 4);
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Unsatisfiable));

        let mut solver = Solver::from_config(&Config::default());
        pigeonhole(&mut solver, 4, 4);
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Satisfiable));
    }

    #[test]
    fn failed_assumptions() {
        let mut solver = Solver::from_config(&Config::default());
        solver.reserve(4);
        solver.add_clause(&[-1, 2]).unwrap();
        solver.add_clause(&[-2, -3]).unwrap();

        assert_eq!(solver.solve_given(&[4, 1, 3], None), Ok(Report::Unsatisfiable));
        let mut failed = solver.failed_assumptions();
        failed.sort();
        assert_eq!(failed, vec![1, 3]);

        // Assumptions do not persist.
        assert_eq!(solver.solve_given(&[3], None), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(1), Some(false));
    }

    #[test]
    fn contradictory_assumptions() {
        let mut solver = Solver::from_config(&Config::default());
        solver.reserve(1);
        assert_eq!(solver.solve_given(&[1, -1], None), Ok(Report::Unsatisfiable));
        let mut failed = solver.failed_assumptions();
        failed.sort();
        assert_eq!(failed, vec![-1, 1]);
    }

    #[test]
    fn learnt_clauses_persist() {
        let mut solver = Solver::from_config(&Config::default());
        pigeonhole(&mut solver, 3, 3);
        assert_eq!(solver.solve_given(&[1, 5], None), Ok(Report::Satisfiable));
        assert_eq!(solver.value_of(9), Some(true));
        assert_eq!(solver.solve_given(&[1, 4], None), Ok(Report::Unsatisfiable));
        assert_eq!(solver.solve_given(&[], None), Ok(Report::Satisfiable));
    }

    #[test]
    fn time_up() {
        let mut solver = Solver::from_config(&Config::default());
        pigeonhole(&mut solver, 9, 8);
        let report = solver.solve_given(&[], Some(std::time::Duration::from_nanos(1)));
        assert_eq!(report, Ok(Report::TimeUp));
    }
}

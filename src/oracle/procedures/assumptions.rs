/*!
Assumptions.

The *i*th assumption is decided at level *i + 1*, before any other decision.
If an assumption already holds, an empty level is opened in its place, so the level of each assumption remains fixed.

If an assumption is false when it is to be decided, the solve is unsatisfiable given the assumptions.
The assumptions responsible are found by following reasons back from the false assumption through the trail, collecting each assumption met (that is, each assignment above level zero without a reason).
*/

use crate::{
    misc::log::targets::{self},
    oracle::Solver,
    structures::literal::{IntLiteral, Literal},
};

/// Possible results of deciding the next assumption.
pub enum AssumptionOk {
    /// An assumption was decided, or already held.
    Decided,

    /// An assumption is false, and the failed assumptions have been recorded.
    Failed,

    /// All assumptions have been decided.
    Exhausted,
}

impl Solver {
    pub fn decide_assumption(&mut self, assumptions: &[IntLiteral]) -> AssumptionOk {
        let Some(&assumption) = assumptions.get(self.level()) else {
            return AssumptionOk::Exhausted;
        };

        match self.value(assumption) {
            Some(true) => {
                self.trail_limits.push(self.trail.len());
                AssumptionOk::Decided
            }

            Some(false) => {
                self.failed = self.analyze_final(assumption);
                log::trace!(target: targets::ORACLE, "Failed assumptions {:?}", self.failed);
                AssumptionOk::Failed
            }

            None => {
                self.decide(assumption);
                AssumptionOk::Decided
            }
        }
    }

    /// The assumptions responsible for `assumption` being false, together with `assumption`.
    fn analyze_final(&mut self, assumption: IntLiteral) -> Vec<IntLiteral> {
        let mut failed = vec![assumption];
        let atom = assumption.atom() as usize;
        if self.levels[atom] == 0 {
            return failed;
        }

        let mut seen = vec![false; self.values.len()];
        seen[atom] = true;

        let start = self.trail_limits.first().copied().unwrap_or(self.trail.len());
        for index in (start..self.trail.len()).rev() {
            let literal = self.trail[index];
            let atom = literal.atom() as usize;
            if !seen[atom] {
                continue;
            }
            match self.reasons[atom] {
                None => {
                    if !failed.contains(&literal) {
                        failed.push(literal);
                    }
                }
                Some(key) => {
                    for antecedent in &self.clauses[key][1..] {
                        let antecedent_atom = antecedent.atom() as usize;
                        if self.levels[antecedent_atom] > 0 {
                            seen[antecedent_atom] = true;
                        }
                    }
                }
            }
            seen[atom] = false;
        }
        failed
    }
}

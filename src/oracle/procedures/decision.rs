/*!
Choosing the value of an atom.

The atom without a value of highest activity is chosen, and is valued by its saved phase.
Atoms are popped from the activity heap until an atom without a value is found, as atoms with a value are only removed lazily.
*/

use crate::{
    misc::log::targets::{self},
    oracle::Solver,
    structures::literal::{Atom, IntLiteral, Literal},
};

/// Possible results from choosing a truth value to assign an atom.
pub enum DecisionOk {
    /// Some truth value was assigned to some atom.
    Literal(IntLiteral),

    /// All atoms had already been assigned truth values, so no decision could be made.
    Exhausted,
}

impl Solver {
    pub fn make_decision(&mut self) -> DecisionOk {
        while let Some(atom) = self.activity.pop_max() {
            if self.values[atom].is_none() {
                self.counters.decisions += 1;
                let literal = IntLiteral::new(atom as Atom, self.previous_value_of(atom as Atom));
                log::trace!(target: targets::ORACLE, "Decision {literal}");
                return DecisionOk::Literal(literal);
            }
        }
        DecisionOk::Exhausted
    }

    /// Opens a new level with `literal` as its decision.
    pub(super) fn decide(&mut self, literal: IntLiteral) {
        self.trail_limits.push(self.trail.len());
        self.assign(literal, None);
    }
}

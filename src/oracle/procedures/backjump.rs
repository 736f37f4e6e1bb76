//! Recovery from a conflict.
//!
//! A backjump from level *l* to level *l - i* undoes every assignment made at levels above *l - i*.
//! The value of each unassigned atom is saved as its phase, and the atom returns to the activity heap.
//!
//! Passing a target level at or above the current level is safe, and does nothing.

use crate::{
    oracle::Solver,
    structures::literal::{Atom, Literal},
};

impl Solver {
    /// Backjumps to the given target level.
    pub fn backjump(&mut self, target: usize) {
        let Some(&limit) = self.trail_limits.get(target) else {
            return;
        };

        for literal in self.trail.drain(limit..) {
            let atom = literal.atom() as usize;
            self.values[atom] = None;
            self.reasons[atom] = None;
            self.phases[atom] = literal.polarity();
            self.activity.activate(atom);
        }
        self.trail_limits.truncate(target);
        self.q_head = self.q_head.min(self.trail.len());
    }

    /// The value of `atom` before it was last unassigned, or the default phase.
    pub fn previous_value_of(&self, atom: Atom) -> bool {
        self.phases[atom as usize]
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        oracle::{Oracle, Solver},
    };

    #[test]
    fn phases_are_saved() {
        let mut solver = Solver::from_config(&Config::default());
        solver.reserve(2);
        solver.trail_limits.push(solver.trail.len());
        solver.assign(1, None);
        solver.trail_limits.push(solver.trail.len());
        solver.assign(-2, None);

        solver.backjump(1);
        assert_eq!(solver.level(), 1);
        assert_eq!(solver.value(1), Some(true));
        assert_eq!(solver.value(2), None);

        solver.backjump(0);
        assert!(solver.previous_value_of(1));
        assert!(!solver.previous_value_of(2));
        assert!(solver.trail.is_empty());
    }
}

/*!
Configuration of an analysis.

The primary configuration structure is [Config], which is cloned into each worker of an analysis.
Some structures take a copy of the parts relevant to them, e.g. a [formula](crate::cnf::GenericFormula) takes the time limit and default phase of its oracle.
*/

use std::time::Duration;

mod config_option;
pub use config_option::ConfigOption;

use crate::cnf::builder::ConstantPolicy;

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// How constants are compiled to CNF.
    pub constant_policy: ConfigOption<ConstantPolicy>,

    /// Whether Referential defects are checked against all models before being reported.
    pub crosscheck: ConfigOption<bool>,

    /// The polarity an oracle assigns to a variable when deciding freely.
    pub default_phase: ConfigOption<bool>,

    /// The number of worker threads used to analyse files.
    pub jobs: ConfigOption<usize>,

    /// The `u` value to multiply the luby sequence by when scheduling oracle restarts.
    pub luby_u: ConfigOption<u32>,

    /// Permit (scheduled) restarts of an oracle.
    pub restart: ConfigOption<bool>,

    /// Simplify expressions before compiling them to CNF.
    pub simplify: ConfigOption<bool>,

    /// The time limit for a single satisfiability check, with zero for no limit.
    pub time_limit: ConfigOption<Duration>,
}

impl Default for Config {
    /// The default configuration checks each block with a single worker, without crosschecks or time limit.
    fn default() -> Self {
        Config {
            constant_policy: ConfigOption {
                name: "constant_policy",
                min: ConstantPolicy::Bound,
                max: ConstantPolicy::Free,
                value: ConstantPolicy::Free,
            },

            crosscheck: ConfigOption {
                name: "crosscheck",
                min: false,
                max: true,
                value: false,
            },

            default_phase: ConfigOption {
                name: "default_phase",
                min: false,
                max: true,
                value: false,
            },

            jobs: ConfigOption {
                name: "jobs",
                min: 1,
                max: 256,
                value: 1,
            },

            luby_u: ConfigOption {
                name: "luby",
                min: 1,
                max: u32::MAX,
                value: 128,
            },

            restart: ConfigOption {
                name: "restart",
                min: false,
                max: true,
                value: true,
            },

            simplify: ConfigOption {
                name: "simplify",
                min: false,
                max: true,
                value: true,
            },

            time_limit: ConfigOption {
                name: "time_limit",
                min: Duration::from_secs(0),
                max: Duration::MAX,
                value: Duration::from_secs(0),
            },
        }
    }
}

impl Config {
    /// The time limit of a check, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        match self.time_limit.value.is_zero() {
            true => None,
            false => Some(self.time_limit.value),
        }
    }
}

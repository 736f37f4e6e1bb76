/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library, most at the debug or trace level.
Warnings are used for input which is skipped rather than rejected (an unparsable assumption line, an invalid preset list entry, etc.).

Note, no log implementation is provided by the library.
The command line tool installs [env_logger](https://docs.rs/env_logger) when built with the `log` feature.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to [expressions](crate::expr), parsing and simplification.
    pub const EXPRESSION: &str = "expression";

    /// Logs related to [formulas](crate::cnf) and the CNF builder.
    pub const CNF: &str = "cnf";

    /// Logs related to the [oracle](crate::oracle).
    pub const ORACLE: &str = "oracle";

    /// Logs related to the [translation](crate::kconfig) of Kconfig symbols.
    pub const KCONFIG: &str = "kconfig";

    /// Logs related to [RSF](crate::rsf) input and the item database.
    pub const RSF: &str = "rsf";

    /// Logs related to [configuration models](crate::model).
    pub const MODEL: &str = "model";

    /// Logs related to [defect analysis](crate::defect).
    pub const DEFECT: &str = "defect";

    /// Logs related to [conditional blocks](crate::blocks).
    pub const BLOCKS: &str = "blocks";
}

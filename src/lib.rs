//! A library for finding dead and undead conditional blocks in C code bases whose configuration is governed by Kconfig.
//!
//! A conditional block (the text between `#if`/`#ifdef`/`#ifndef`/`#elif`/`#else` and the matching end) is *dead* if no valid configuration compiles it, and *undead* if every configuration which compiles the enclosing block also compiles the block.
//! Each question is reduced to the satisfiability of a propositional formula, and the defect is classified by the cheapest formula found to be unsatisfiable:
//!
//! - An *implementation* defect, if the preprocessor structure of the file alone is contradictory.
//! - A *configuration* defect, if the structure together with the (relevant slice of the) Kconfig model is contradictory.
//! - A *referential* defect, if a contradiction only appears after items the model does not know about are assumed to be off.
//!
//! # Orientation
//!
//! From the leaves to the root:
//!
//! - [Expressions](crate::expr) are stored in an arena, parsed from text, printed, [simplified](crate::expr::simplify) and traversed by [visitors](crate::expr::visitor).
//! - Expressions are compiled to conjunctive normal form by the [Tseitin builder](crate::cnf::builder), into a [formula](crate::cnf::GenericFormula) which owns an [oracle](crate::oracle) to decide satisfiability.
//! - Kconfig symbols are [translated](crate::kconfig) to pairs of boolean expressions and axiomatised as clauses of a formula.
//! - Kconfig dependency databases in RSF form are read into an [item database](crate::rsf), which supports backward slicing.
//! - [Configuration models](crate::model) (RSF or CNF, one per architecture) are collected in a [container](crate::model::ModelContainer).
//! - [Blocks](crate::blocks) of a source file provide the code constraints, and the [defect engine](crate::defect) classifies them.
//!
//! # Example
//!
//! ```rust
//! # use undertaker::cnf::{builder::{CnfBuilder, ConstantPolicy}, Formula};
//! # use undertaker::expr::Arena;
//! let mut arena = Arena::default();
//! let root = arena.parse("x && !x").unwrap();
//!
//! let mut formula = Formula::default();
//! let mut builder = CnfBuilder::new(&mut formula, ConstantPolicy::Bound);
//! builder.push_clause(&arena, root).unwrap();
//!
//! assert_eq!(formula.check_satisfiable(), Ok(false));
//! ```

pub mod blocks;
pub mod checker;
pub mod cnf;
pub mod config;
pub mod defect;
pub mod expr;
pub mod kconfig;
pub mod misc;
pub mod model;
pub mod oracle;
pub mod rsf;
pub mod structures;
pub mod types;

//! Error types used in the library.
//!
//! - Parse errors fail a single unit of input (an expression, a file) and carry the offending input.
//! - Translation errors are explicit refusals to approximate (ranges) or invariant violations (a choice which is neither boolean nor tristate).
//! - Model errors are fatal for a single architecture, and callers are expected to continue with others.
//! - Oracle errors are limited to an expired time limit and literals the oracle was never told about.
//!
//! Names of the error enums overlap with the modules they relate to.
//  As such, throughout the library err::{self} is often used to prefix use of the types with `err::`.

use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Block(BlockError),
    Cnf(CnfError),
    Model(ModelError),
    Oracle(OracleError),
    Parse(ParseError),
    Report(ReportError),
    Rsf(RsfError),
    Translation(TranslationError),

    /// An I/O error, kept as a message so errors remain comparable.
    Io(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(e) => write!(f, "block: {e}"),
            Self::Cnf(e) => write!(f, "cnf: {e}"),
            Self::Model(e) => write!(f, "model: {e}"),
            Self::Oracle(e) => write!(f, "oracle: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Report(e) => write!(f, "report: {e}"),
            Self::Rsf(e) => write!(f, "rsf: {e}"),
            Self::Translation(e) => write!(f, "translation: {e}"),
            Self::Io(message) => write!(f, "io: {message}"),
        }
    }
}

impl std::error::Error for ErrorKind {}

impl From<std::io::Error> for ErrorKind {
    fn from(e: std::io::Error) -> Self {
        ErrorKind::Io(e.to_string())
    }
}

/// Errors when reading the conditional blocks of a file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BlockError {
    /// An `#elif` or `#else` at the line without an open `#if`, or after an `#else`.
    UnexpectedBranch(usize),

    /// An `#endif` at the line without an open block.
    UnexpectedEnd(usize),

    /// The block opened at the line has no `#endif`.
    Unterminated(usize),
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedBranch(line) => write!(f, "branch without a matching #if at line {line}"),
            Self::UnexpectedEnd(line) => write!(f, "#endif without a matching #if at line {line}"),
            Self::Unterminated(line) => write!(f, "block opened at line {line} is not terminated"),
        }
    }
}

impl From<BlockError> for ErrorKind {
    fn from(e: BlockError) -> Self {
        ErrorKind::Block(e)
    }
}

/// Errors when reading or building a formula.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CnfError {
    /// Some unspecific problem at a specific line of a CNF file.
    Line(usize),

    /// Some issue with the problem specification (the `p cnf` line) of a CNF file.
    ProblemSpecification(usize),

    /// A literal refers to a variable the formula has not allocated.
    UnallocatedVariable(i32),

    /// Zero is not a literal.
    ZeroLiteral,
}

impl fmt::Display for CnfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, "unparsable line {line}"),
            Self::ProblemSpecification(line) => write!(f, "malformed problem line {line}"),
            Self::UnallocatedVariable(literal) => write!(f, "literal {literal} uses an unallocated variable"),
            Self::ZeroLiteral => write!(f, "0 is not a literal"),
        }
    }
}

impl From<CnfError> for ErrorKind {
    fn from(e: CnfError) -> Self {
        ErrorKind::Cnf(e)
    }
}

/// Errors related to configuration models and their containers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModelError {
    /// The model directory does not exist, or is not a directory.
    MissingDirectory(String),

    /// No model file was found in a directory.
    NoModels(String),

    /// No model is registered for the architecture.
    MissingArchitecture(String),

    /// A model file could not be read.
    Unreadable(String),

    /// A model file has an extension which does not identify a model type.
    UnknownFormat(String),

    /// The configuration space regex of a model is not a regular expression.
    InvalidRegex(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDirectory(dir) => write!(f, "model directory '{dir}' doesn't exist"),
            Self::NoModels(dir) => write!(f, "could not find any models in '{dir}'"),
            Self::MissingArchitecture(arch) => write!(f, "no model for architecture '{arch}'"),
            Self::Unreadable(path) => write!(f, "could not read model file '{path}'"),
            Self::UnknownFormat(path) => write!(f, "unknown model format of '{path}'"),
            Self::InvalidRegex(regex) => write!(f, "invalid configuration space regex '{regex}'"),
        }
    }
}

impl From<ModelError> for ErrorKind {
    fn from(e: ModelError) -> Self {
        ErrorKind::Model(e)
    }
}

/// Errors from a call to an oracle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OracleError {
    /// The time limit for a check was reached before an answer was found.
    TimeUp,

    /// An assumption refers to a variable the oracle has no record of.
    UnknownVariable(i32),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeUp => write!(f, "time limit reached"),
            Self::UnknownVariable(literal) => write!(f, "unknown variable in literal {literal}"),
        }
    }
}

impl From<OracleError> for ErrorKind {
    fn from(e: OracleError) -> Self {
        ErrorKind::Oracle(e)
    }
}

/// Errors during parsing of expressions and symbol tables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An empty string, where some expression was required.
    Empty,

    /// A character which does not begin any token.
    UnexpectedCharacter { input: String, position: usize },

    /// A token which may not appear at the given position.
    UnexpectedToken { input: String, position: usize },

    /// The input ended while some token was still required.
    UnexpectedEnd { input: String },

    /// A Kconfig symbol table dump could not be read.
    SymbolTable(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty expression"),
            Self::UnexpectedCharacter { input, position } => {
                write!(f, "unexpected character at {position} in '{input}'")
            }
            Self::UnexpectedToken { input, position } => {
                write!(f, "unexpected token at {position} in '{input}'")
            }
            Self::UnexpectedEnd { input } => write!(f, "unexpected end of '{input}'"),
            Self::SymbolTable(message) => write!(f, "symbol table: {message}"),
        }
    }
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

/// Errors when writing defect reports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReportError {
    /// The output directory could not be created.
    OutputDirectory(String),

    /// A report file could not be written.
    Unwritable(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutputDirectory(dir) => write!(f, "could not create output directory '{dir}'"),
            Self::Unwritable(path) => write!(f, "could not write report '{path}'"),
        }
    }
}

impl From<ReportError> for ErrorKind {
    fn from(e: ReportError) -> Self {
        ErrorKind::Report(e)
    }
}

/// Errors when reading RSF input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RsfError {
    /// A relation is missing a required field.
    MissingField { relation: String, line: usize },

    /// A quoted field was not closed before the end of the line.
    UnterminatedQuote(usize),
}

impl fmt::Display for RsfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { relation, line } => {
                write!(f, "relation '{relation}' on line {line} is missing a field")
            }
            Self::UnterminatedQuote(line) => write!(f, "unterminated quote on line {line}"),
        }
    }
}

impl From<RsfError> for ErrorKind {
    fn from(e: RsfError) -> Self {
        ErrorKind::Rsf(e)
    }
}

/// Errors when translating Kconfig symbols.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TranslationError {
    /// Some feature of Kconfig which is not approximated, e.g. ranges.
    UnsupportedFeature(&'static str),

    /// A choice whose type is neither boolean nor tristate.
    InvalidChoiceType(String),
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFeature(feature) => write!(f, "unsupported feature: {feature}"),
            Self::InvalidChoiceType(name) => write!(f, "invalid choice type of '{name}'"),
        }
    }
}

impl From<TranslationError> for ErrorKind {
    fn from(e: TranslationError) -> Self {
        ErrorKind::Translation(e)
    }
}

//! The Kconfig type of a symbol.
//!
//! Types are numbered as in the `sym` lines of a CNF file:
//!
//! | id | type     |
//! |----|----------|
//! | 0  | unknown  |
//! | 1  | boolean  |
//! | 2  | tristate |
//! | 3  | int      |
//! | 4  | hex      |
//! | 5  | string   |
//! | 6  | other    |

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The type of a Kconfig symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolType {
    #[default]
    Unknown = 0,
    Boolean,
    Tristate,
    Int,
    Hex,
    String,
    Other,
}

impl SymbolType {
    /// The numeric id of the type, as used in CNF files.
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// The type with the given numeric id, if any.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Unknown),
            1 => Some(Self::Boolean),
            2 => Some(Self::Tristate),
            3 => Some(Self::Int),
            4 => Some(Self::Hex),
            5 => Some(Self::String),
            6 => Some(Self::Other),
            _ => None,
        }
    }

    /// Whether the type is boolean or tristate, i.e. whether values of the type take part in the tristate algebra.
    pub fn is_logical(&self) -> bool {
        matches!(self, Self::Boolean | Self::Tristate)
    }

    /// Whether the type is int, hex or string.
    pub fn is_valued(&self) -> bool {
        matches!(self, Self::Int | Self::Hex | Self::String)
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Boolean => "boolean",
            Self::Tristate => "tristate",
            Self::Int => "integer",
            Self::Hex => "hex",
            Self::String => "string",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// Parses the type names used by RSF dumps and symbol tables.
///
/// Both `bool` and `boolean`, and `int` and `integer`, are accepted.
/// Anything else is [Other](SymbolType::Other), so parsing never fails.
impl FromStr for SymbolType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "bool" | "boolean" => Self::Boolean,
            "tristate" => Self::Tristate,
            "int" | "integer" => Self::Int,
            "hex" => Self::Hex,
            "string" => Self::String,
            "unknown" | "" => Self::Unknown,
            _ => Self::Other,
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids() {
        for id in 0..7 {
            assert_eq!(SymbolType::from_id(id).map(|t| t.id()), Some(id));
        }
        assert!(SymbolType::from_id(7).is_none());
    }

    #[test]
    fn names() {
        assert_eq!("bool".parse(), Ok(SymbolType::Boolean));
        assert_eq!("tristate".parse(), Ok(SymbolType::Tristate));
        assert_eq!("choice".parse(), Ok(SymbolType::Other));
    }
}

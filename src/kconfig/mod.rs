/*!
Kconfig symbol tables, and their translation to propositional logic.

A [SymbolTable] is a list of [symbols](Symbol), each with a type, prompts, dependencies, defaults, a reverse dependency (from `select`), and for choices the values of the choice.
Tables are read from a JSON dump, written by some Kconfig front end.

Expressions of a table ([KExpr]) refer to symbols by name.
The names `y`, `m` and `n` are the tristate constants, and names without a symbol in the table are literal values (e.g. the `5` of `A = 5`).

```json
{
  "symbols": [
    { "name": "A", "type": "tristate", "prompts": [{ "text": "Enable A" }] },
    { "name": "B", "type": "boolean", "dependencies": [{ "symbol": "A" }],
      "defaults": [{ "value": { "symbol": "y" } }] }
  ]
}
```

Translation is in two parts:
- [translate] maps a Kconfig expression to a pair of boolean expressions, capturing the tristate semantics of the expression.
- [symbols] axiomatises each symbol of a table as clauses of a [formula](crate::cnf::GenericFormula), using [tools] to derive the visibility, dependency, default and reverse dependency expressions of the symbol.
*/

pub mod symbols;
pub mod tools;
pub mod translate;

use std::{
    collections::{HashMap, HashSet},
    io::Read,
};

use serde::{Deserialize, Serialize};

use crate::{
    misc::log::targets::{self},
    structures::symbol::SymbolType,
    types::err::{self, ErrorKind},
};

/// The name given to the modules symbol, when the symbol has no name of its own.
pub const MODULES_MAGIC: &str = "___MODULES_MAGIC_INTERNAL_VAR___";

/// A Kconfig expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KExpr {
    Symbol(String),
    Not(Box<KExpr>),
    And(Box<KExpr>, Box<KExpr>),
    Or(Box<KExpr>, Box<KExpr>),
    /// `A = B`, where either operand may be a literal value.
    Equal(String, String),
    /// `A != B`.
    Unequal(String, String),
    /// The values of a choice.
    List(Vec<String>),
    Range(String, String),
}

impl KExpr {
    pub fn yes() -> Self {
        KExpr::Symbol("y".to_string())
    }

    pub fn no() -> Self {
        KExpr::Symbol("n".to_string())
    }

    pub fn not(e: KExpr) -> Self {
        KExpr::Not(Box::new(e))
    }

    pub fn and(l: KExpr, r: KExpr) -> Self {
        KExpr::And(Box::new(l), Box::new(r))
    }

    pub fn or(l: KExpr, r: KExpr) -> Self {
        KExpr::Or(Box::new(l), Box::new(r))
    }
}

/// A prompt, visible when `visible` holds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(default)]
    pub text: String,

    /// The condition of the prompt, with no condition the same as `y`.
    #[serde(default)]
    pub visible: Option<KExpr>,
}

/// A default value, which applies when `visible` holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultValue {
    pub value: KExpr,

    #[serde(default)]
    pub visible: Option<KExpr>,
}

/// A symbol of a Kconfig model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Symbol {
    /// The name of the symbol, absent for choices and (possibly) the modules symbol.
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub symbol_type: SymbolType,

    /// Prompts and menus of the symbol.
    pub prompts: Vec<Prompt>,

    /// Conditions of the definitions of the symbol.
    pub dependencies: Vec<KExpr>,

    pub defaults: Vec<DefaultValue>,

    pub reverse_dependency: Option<KExpr>,

    /// Whether the symbol is a choice.
    pub choice: bool,

    /// For a choice, the values of the choice.
    pub members: Vec<String>,

    /// Whether the symbol is a value of some choice.
    pub choice_value: bool,

    /// Whether the symbol is the modules symbol, whose value enables `m`.
    pub modules: bool,
}

/// The symbols of a Kconfig model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        let mut table = SymbolTable {
            symbols,
            index: HashMap::default(),
        };
        table.build_index();
        table
    }

    /// Reads a table from a JSON dump.
    pub fn from_json(reader: impl Read) -> Result<Self, ErrorKind> {
        let mut table: SymbolTable = match serde_json::from_reader(reader) {
            Ok(table) => table,
            Err(e) => return Err(err::ParseError::SymbolTable(e.to_string()).into()),
        };
        table.build_index();
        log::info!(target: targets::KCONFIG, "Read {} symbols", table.symbols.len());
        Ok(table)
    }

    fn build_index(&mut self) {
        self.index = self
            .symbols
            .iter()
            .enumerate()
            .filter_map(|(i, symbol)| symbol.name.clone().map(|name| (name, i)))
            .collect();
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|i| &self.symbols[*i])
    }

    /// The type of the symbol `name`, or unknown if there is no such symbol.
    pub fn type_of(&self, name: &str) -> SymbolType {
        self.get(name).map(|symbol| symbol.symbol_type).unwrap_or_default()
    }

    pub fn is_modules(&self, name: &str) -> bool {
        self.get(name).is_some_and(|symbol| symbol.modules)
    }

    /// Names of the symbols which are translated: named choices and named symbols of a logical or valued type.
    pub fn symbol_set(&self) -> HashSet<String> {
        self.symbols
            .iter()
            .filter(|symbol| {
                symbol.choice || symbol.symbol_type.is_logical() || symbol.symbol_type.is_valued()
            })
            .filter_map(|symbol| symbol.name.clone())
            .collect()
    }
}

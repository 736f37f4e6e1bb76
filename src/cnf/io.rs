/*!
Reading and writing formulas.

The format extends DIMACS with comment lines for meta values, symbol types and variable names, all before the problem line:

```none
c meta_value ALWAYS_ON CONFIG_A CONFIG_B
c sym A 2
c var CONFIG_A 1
c var CONFIG_A_MODULE 2
p cnf 2 1
-1 -2 0
```

On reading, `c sym` entries restore the symbol types (and so the associated symbols), `c var` entries the names, and `c meta_value` entries the meta values.
Any other comment is ignored.
After the problem line the remainder of the input is read as literals, with `0` ending each clause.
*/

use std::{
    io::{BufRead, Write},
    path::Path,
};

use crate::{
    cnf::GenericFormula,
    misc::log::targets::{self},
    oracle::Oracle,
    structures::{
        literal::{Atom, IntLiteral},
        symbol::SymbolType,
    },
    types::err::{self, ErrorKind},
};

const PREAMBLE: &str = "\
c File Format Version: 2.0
c Generated by undertaker
c Type info:
c c sym <symbolname> <typeid>
c with <typeid> being an integer out of:
c enum {S_UNKNOWN, S_BOOLEAN, S_TRISTATE, S_INT, S_HEX, S_STRING, S_OTHER}
c variable names:
c c var <variablename> <cnfvar>
";

impl<O: Oracle> GenericFormula<O> {
    /// Reads names, symbol types, meta values and clauses into the formula.
    ///
    /// ```rust
    /// # use undertaker::cnf::Formula;
    /// let text = "c sym A 2\nc var CONFIG_A 1\np cnf 2 1\n-1 2 0\n";
    /// let mut formula = Formula::default();
    /// formula.read(text.as_bytes()).unwrap();
    ///
    /// assert_eq!(formula.var_count(), 2);
    /// assert_eq!(formula.associated_symbol("CONFIG_A_MODULE"), Some("A"));
    /// ```
    pub fn read(&mut self, reader: impl BufRead) -> Result<(), ErrorKind> {
        let mut lines = reader.lines().enumerate();

        'preamble_loop: loop {
            let Some((index, line)) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            let line_number = index + 1;

            if let Some(rest) = line.strip_prefix("c var ") {
                let (name, id) = name_and_number(rest, line_number)?;
                self.set_var(name, id);
            } else if let Some(rest) = line.strip_prefix("c sym ") {
                let (name, id) = name_and_number(rest, line_number)?;
                let symbol_type = u8::try_from(id)
                    .ok()
                    .and_then(SymbolType::from_id)
                    .ok_or(err::CnfError::Line(line_number))?;
                self.set_symbol_type(name, symbol_type);
            } else if let Some(rest) = line.strip_prefix("c meta_value ") {
                let mut fields = rest.split_whitespace();
                let key = fields.next().ok_or(err::CnfError::Line(line_number))?;
                let mut some_value = false;
                for value in fields {
                    self.add_meta_value(key, value);
                    some_value = true;
                }
                if !some_value {
                    return Err(err::CnfError::Line(line_number).into());
                }
            } else if line.starts_with("c ") || line == "c" || line.trim().is_empty() {
                continue 'preamble_loop;
            } else if let Some(rest) = line.strip_prefix("p cnf ") {
                let mut fields = rest.split_whitespace().map(|field| field.parse::<Atom>());
                match (fields.next(), fields.next(), fields.next()) {
                    (Some(Ok(vars)), Some(Ok(_clauses)), None) => {
                        self.var_count = std::cmp::max(self.var_count, vars);
                        break 'preamble_loop;
                    }
                    _ => return Err(err::CnfError::ProblemSpecification(line_number).into()),
                }
            } else {
                log::error!(target: targets::CNF, "Failed to parse line {line_number}: '{line}'");
                return Err(err::CnfError::Line(line_number).into());
            }
        }

        // The clause being read, and the line of its latest literal.
        let mut clause: Vec<IntLiteral> = Vec::default();
        let mut clause_line = 0;
        for (index, line) in lines {
            let line = line?;
            for field in line.split_whitespace() {
                let literal = field
                    .parse::<IntLiteral>()
                    .map_err(|_| err::CnfError::Line(index + 1))?;
                match literal {
                    0 => {
                        let complete = std::mem::take(&mut clause);
                        self.add_clause(&complete)?;
                    }
                    _ => {
                        clause.push(literal);
                        clause_line = index + 1;
                    }
                }
            }
        }
        if !clause.is_empty() {
            log::error!(target: targets::CNF, "Clause ending on line {clause_line} is not terminated by 0");
            return Err(err::CnfError::Line(clause_line).into());
        }

        log::debug!(target: targets::CNF,
            "Read {} variables and {} clauses", self.var_count, self.clauses.len());
        Ok(())
    }

    /// Reads a formula from the file at `path`, decompressing `.xz` files if the `xz` feature is enabled.
    pub fn read_file(&mut self, path: &Path) -> Result<(), ErrorKind> {
        let file = std::fs::File::open(path)?;

        match path.extension() {
            #[cfg(feature = "xz")]
            Some(extension) if extension == "xz" => {
                self.read(std::io::BufReader::new(xz2::read::XzDecoder::new(&file)))
            }

            _ => self.read(std::io::BufReader::new(&file)),
        }
    }

    /// Writes the formula.
    pub fn write(&self, mut writer: impl Write) -> Result<(), ErrorKind> {
        writer.write_all(PREAMBLE.as_bytes())?;

        for (key, values) in &self.meta {
            writeln!(writer, "c meta_value {key} {}", values.join(" "))?;
        }

        for (symbol, symbol_type) in &self.symbol_types {
            writeln!(writer, "c sym {symbol} {}", symbol_type.id())?;
        }

        let mut names: Vec<(&String, &Atom)> = self.names.iter().collect();
        names.sort_unstable();
        for (name, id) in names {
            writeln!(writer, "c var {name} {id}")?;
        }

        writeln!(writer, "p cnf {} {}", self.var_count, self.clauses.len())?;
        for clause in &self.clauses {
            for literal in clause {
                write!(writer, "{literal} ")?;
            }
            writeln!(writer, "0")?;
        }
        Ok(())
    }

    pub fn write_file(&self, path: &Path) -> Result<(), ErrorKind> {
        let file = std::fs::File::create(path)?;
        self.write(std::io::BufWriter::new(file))
    }
}

/// The name and number of a `c var` or `c sym` entry, separated by the final space of `text`.
fn name_and_number(text: &str, line_number: usize) -> Result<(&str, Atom), err::CnfError> {
    let (name, number) = text.rsplit_once(' ').ok_or(err::CnfError::Line(line_number))?;
    match (name.is_empty(), number.parse::<Atom>()) {
        (false, Ok(number)) => Ok((name, number)),
        _ => Err(err::CnfError::Line(line_number)),
    }
}

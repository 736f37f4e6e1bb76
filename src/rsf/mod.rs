/*!
Reading of RSF (Rigi standard format) files, and the Kconfig [item database](item_db).

An RSF file is a list of relations, one per line.
Each relation is a name followed by fields separated by whitespace, and a field beginning with `"` extends to the next `"`, with the quotes removed.

```none
Item USB tristate
Depends USB "PCI && !EMBEDDED"
Choice CHOICE_0 required
ChoiceItem SLAB CHOICE_0
UNDERTAKER_SET ALWAYS_ON CONFIG_X86
```

Relations are grouped by name, keyed by their first field, in file order.
Relations named `UNDERTAKER_SET` are meta values: the first field is a key and the remaining fields are values of the key.
*/

pub mod item_db;

use std::{
    collections::{BTreeMap, HashMap},
    io::BufRead,
};

use crate::{
    misc::log::targets::{self},
    types::err::{self, ErrorKind},
};

/// The name of relations holding meta values.
pub const META_RELATION: &str = "UNDERTAKER_SET";

/// A relation of an RSF file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    /// The first field of the relation.
    pub key: String,

    /// The fields of the relation after the key.
    pub values: Vec<String>,

    /// The line of the relation, from 1.
    pub line: usize,
}

impl Relation {
    /// The first value of the relation, or the empty string.
    pub fn value(&self) -> &str {
        self.values.first().map_or("", |value| value.as_str())
    }
}

/// The relations of an RSF file.
#[derive(Clone, Debug, Default)]
pub struct Rsf {
    relations: HashMap<String, Vec<Relation>>,
    meta: BTreeMap<String, Vec<String>>,
}

impl Rsf {
    pub fn read(reader: impl BufRead) -> Result<Self, ErrorKind> {
        let mut rsf = Rsf::default();
        let mut count = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let mut fields = fields(&line, line_number)?.into_iter();

            let Some(name) = fields.next() else {
                continue;
            };
            let Some(key) = fields.next() else {
                return Err(err::RsfError::MissingField {
                    relation: name,
                    line: line_number,
                }
                .into());
            };
            let values: Vec<String> = fields.collect();

            if name == META_RELATION {
                for value in &values {
                    rsf.add_meta_value(&key, value);
                }
            } else {
                rsf.relations.entry(name).or_default().push(Relation {
                    key,
                    values,
                    line: line_number,
                });
            }
            count += 1;
        }

        log::debug!(target: targets::RSF, "Read {count} relations");
        Ok(rsf)
    }

    /// The relations named `name`, in file order.
    pub fn relations(&self, name: &str) -> &[Relation] {
        self.relations.get(name).map_or(&[], |relations| relations.as_slice())
    }

    /// The first relation named `name` with key `key`.
    pub fn lookup(&self, name: &str, key: &str) -> Option<&Relation> {
        self.relations(name).iter().find(|relation| relation.key == key)
    }

    pub fn add_meta_value(&mut self, key: &str, value: &str) {
        let values = self.meta.entry(key.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    pub fn meta_value(&self, key: &str) -> Option<&[String]> {
        self.meta.get(key).map(|values| values.as_slice())
    }

    /// Whether the file held no relations other than meta values.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// The fields of `line`.
fn fields(line: &str, line_number: usize) -> Result<Vec<String>, err::RsfError> {
    let mut fields = Vec::default();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        match rest.strip_prefix('"') {
            Some(quoted) => {
                let Some(end) = quoted.find('"') else {
                    return Err(err::RsfError::UnterminatedQuote(line_number));
                };
                fields.push(quoted[..end].to_string());
                rest = &quoted[end + 1..];
            }
            None => {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                fields.push(rest[..end].to_string());
                rest = &rest[end..];
            }
        }
        rest = rest.trim_start();
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields() {
        assert_eq!(
            fields(r#"Depends A "B && !C""#, 1).unwrap(),
            vec!["Depends", "A", "B && !C"]
        );
        assert_eq!(fields(r#"Depends A "B""#, 1).unwrap(), vec!["Depends", "A", "B"]);
        assert_eq!(fields(r#"Depends A """#, 1).unwrap(), vec!["Depends", "A", ""]);
        assert!(fields("   ", 1).unwrap().is_empty());
        assert_eq!(
            fields(r#"Depends A "B && C"#, 3),
            Err(err::RsfError::UnterminatedQuote(3))
        );
    }

    #[test]
    fn grouped_relations() {
        let input = r#"
Item A boolean
Item B tristate
Depends B "A"
UNDERTAKER_SET ALWAYS_ON CONFIG_A CONFIG_B
UNDERTAKER_SET ALWAYS_ON CONFIG_A
"#;
        let rsf = Rsf::read(input.as_bytes()).unwrap();

        let items = rsf.relations("Item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].key, "B");
        assert_eq!(items[1].value(), "tristate");
        assert_eq!(items[1].line, 3);

        assert_eq!(rsf.lookup("Depends", "B").map(|r| r.value()), Some("A"));
        assert!(rsf.relations("Choice").is_empty());
        assert_eq!(
            rsf.meta_value("ALWAYS_ON"),
            Some(["CONFIG_A".to_string(), "CONFIG_B".to_string()].as_slice())
        );
    }

    #[test]
    fn relations_without_a_key() {
        let result = Rsf::read("Item A boolean\nItem\n".as_bytes());
        assert_eq!(
            result.err(),
            Some(ErrorKind::Rsf(err::RsfError::MissingField {
                relation: "Item".to_string(),
                line: 2
            }))
        );
    }
}

/*!
Preset lists of features, forced on (whitelisted) or off (blacklisted) in every model.

A list holds whitelisted features by name and blacklisted features by their negation, and so may be read as a conjunction.

```rust
# use undertaker::model::preset::PresetList;
let mut list = PresetList::default();
for feature in ["CONFIG_A", "CONFIG_B", "", "CONFIG_C"] {
    list.add_to_whitelist(feature);
}
assert_eq!(list.to_sat_str(), "CONFIG_A && CONFIG_B && CONFIG_C");

list.add_to_blacklist("CONFIG_D");
assert!(list.is_blacklisted("CONFIG_D"));
assert_eq!(list.to_sat_str(), "CONFIG_A && CONFIG_B && CONFIG_C && !CONFIG_D");
```
*/

use std::io::BufRead;

use crate::{
    misc::log::targets::{self},
    types::err::ErrorKind,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresetList {
    entries: Vec<String>,
}

impl PresetList {
    /// Whether `entry` is a name, or a negated name, made of `[A-Za-z0-9_.]`.
    pub fn is_valid(entry: &str) -> bool {
        let name = entry.strip_prefix('!').unwrap_or(entry);
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid {
            log::warn!(target: targets::MODEL, "Preset list item '{entry}' is not valid, ignoring");
        }
        valid
    }

    /// The negation of `name`, with double negation cancelled.
    pub fn negated(name: &str) -> String {
        match name.strip_prefix('!') {
            Some(name) => name.to_string(),
            None => format!("!{name}"),
        }
    }

    pub fn is_listed(&self, entry: &str) -> bool {
        self.entries.iter().any(|listed| listed == entry)
    }

    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.is_listed(name)
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.is_listed(&Self::negated(name))
    }

    pub fn add_to_whitelist(&mut self, name: &str) {
        if Self::is_valid(name) && !self.is_whitelisted(name) {
            self.entries.push(name.to_string());
        }
    }

    pub fn add_to_blacklist(&mut self, name: &str) {
        if Self::is_valid(name) && !self.is_blacklisted(name) {
            self.entries.push(Self::negated(name));
        }
    }

    /// Adds each line of `reader` to the whitelist (if `white`) or the blacklist, skipping comments.
    ///
    /// Returns a count of the lines read, excluding comments.
    pub fn load(&mut self, reader: impl BufRead, white: bool) -> Result<usize, ErrorKind> {
        let mut count = 0;
        for line in reader.lines() {
            let line = line?;
            if line.trim_start().starts_with('#') {
                continue;
            }
            count += 1;
            match white {
                true => self.add_to_whitelist(line.trim()),
                false => self.add_to_blacklist(line.trim()),
            }
        }
        log::info!(target: targets::MODEL, "Loaded {count} items to the preset list");
        Ok(count)
    }

    /// The entries of the list, joined by `&&`.
    pub fn to_sat_str(&self) -> String {
        self.entries.join(" && ")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

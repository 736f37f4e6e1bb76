/*!
A database of Kconfig items, built from RSF relations, supporting backward slicing.

Items are named as the variables of code, i.e. `CONFIG_<name>`, and refer to each other by name only.
The relations used are:

| Relation                          | Effect                                                                                     |
|-----------------------------------|--------------------------------------------------------------------------------------------|
| `Item <name> <type>`              | An item `CONFIG_<name>`, and for a tristate item also `CONFIG_<name>_MODULE`, each excluding the other. |
| `Choice <name> <required>`        | A choice item `CONFIG_<name>`.                                                             |
| `Depends <name> "<expr>"`         | The (authoritative) dependency of `CONFIG_<name>`, with names prefixed by `CONFIG_`.      |
| `ChoiceItem <item> <choice>`      | `CONFIG_<item>` is an alternative of the choice `CONFIG_<choice>`.                         |

An item is *rendered* as the constraint `( NAME -> (DEP) )`, and a choice with alternatives also as `( NAME -> (A1 | A2) )`.

```rust
# use undertaker::rsf::{Rsf, item_db::ItemDb};
let rsf = Rsf::read("Item A boolean\nItem B boolean\nDepends B \"A && !C\"\n".as_bytes()).unwrap();
let db = ItemDb::from_rsf(&rsf);

assert_eq!(db.get("CONFIG_B").and_then(|item| item.render()).as_deref(),
           Some("( CONFIG_B -> (CONFIG_A & !CONFIG_C) )"));
```
*/

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::{
    misc::log::targets::{self},
    rsf::Rsf,
    structures::symbol::SymbolType,
};

/// Prefix of items whose constraints come from elsewhere, and so are never missing.
pub const COMPONENT_PREFIX: &str = "COMP_";

/// Prefix of free variables, which are never missing.
pub const FREE_PREFIX: &str = "__FREE__";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Item,
    Choice,
}

/// An item of the database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,

    /// For a choice, whether some alternative is required.
    pub required: bool,

    /// For a choice, the names of the alternatives.
    pub alternatives: Vec<String>,

    /// Dependencies, with the front authoritative.
    pub dependencies: VecDeque<String>,
}

impl Item {
    fn new(name: String, kind: ItemKind) -> Self {
        Item {
            name,
            kind,
            required: false,
            alternatives: Vec::default(),
            dependencies: VecDeque::default(),
        }
    }

    pub fn is_choice(&self) -> bool {
        self.kind == ItemKind::Choice
    }

    /// The constraints of the item, if any.
    pub fn render(&self) -> Option<String> {
        let dependency = self
            .dependencies
            .front()
            .map(|dependency| format!("( {} -> ({dependency}) )", self.name));

        let alternatives = match self.is_choice() && !self.alternatives.is_empty() {
            true => Some(format!("( {} -> ({}) )", self.name, self.alternatives.join(" | "))),
            false => None,
        };

        match (dependency, alternatives) {
            (Some(dependency), Some(alternatives)) => Some(format!("{dependency} & {alternatives}")),
            (Some(rendering), None) | (None, Some(rendering)) => Some(rendering),
            (None, None) => None,
        }
    }
}

/// Kconfig items, by name.
#[derive(Clone, Debug, Default)]
pub struct ItemDb {
    items: BTreeMap<String, Item>,

    /// Types of the items, by the name of the symbol.
    types: BTreeMap<String, SymbolType>,

    /// Names which count as known without any constraint.
    whitelist: HashSet<String>,
}

impl ItemDb {
    pub fn from_rsf(rsf: &Rsf) -> Self {
        let mut db = ItemDb::default();

        for relation in rsf.relations("Item") {
            let name = format!("CONFIG_{}", relation.key);
            let symbol_type = relation.value().parse::<SymbolType>().unwrap_or_default();
            db.types.insert(relation.key.clone(), symbol_type);
            db.items.insert(name.clone(), Item::new(name.clone(), ItemKind::Item));

            if symbol_type == SymbolType::Tristate {
                let module = format!("{name}_MODULE");
                let mut module_item = Item::new(module.clone(), ItemKind::Item);
                module_item.dependencies.push_front(format!("! {name}"));
                db.items.insert(module.clone(), module_item);

                if let Some(item) = db.items.get_mut(&name) {
                    item.dependencies.push_front(format!("! {module}"));
                }
            }
        }

        for relation in rsf.relations("Choice") {
            let name = format!("CONFIG_{}", relation.key);
            let mut choice = Item::new(name.clone(), ItemKind::Choice);
            choice.required = relation.value() == "required";
            db.items.insert(name, choice);
        }

        for relation in rsf.relations("Depends") {
            let name = format!("CONFIG_{}", relation.key);
            match db.items.get_mut(&name) {
                Some(item) => item.dependencies.push_front(rewrite_dependency(relation.value())),
                None => {
                    log::trace!(target: targets::RSF, "Dependency of unknown item {name} on line {}", relation.line);
                }
            }
        }

        for relation in rsf.relations("ChoiceItem") {
            let name = format!("CONFIG_{}", relation.key);
            let choice = format!("CONFIG_{}", relation.value());
            if !db.items.contains_key(&name) {
                continue;
            }
            if let Some(choice) = db.items.get_mut(&choice) {
                choice.alternatives.push(name);
            }
        }

        log::debug!(target: targets::RSF, "Item database with {} items", db.items.len());
        db
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The type of a symbol (without the `CONFIG_` prefix), if the symbol is an item.
    pub fn symbol_type(&self, symbol: &str) -> Option<SymbolType> {
        self.types.get(symbol).copied()
    }

    /// Counts `name` as known to the database.
    pub fn whitelist(&mut self, name: impl Into<String>) {
        self.whitelist.insert(name.into());
    }

    /// Whether `name` is an item, or counts as one.
    pub fn is_known(&self, name: &str) -> bool {
        self.items.contains_key(name)
            || self.whitelist.contains(name)
            || name.starts_with(COMPONENT_PREFIX)
    }

    /// The names reachable from `seeds` through the renderings of items, including the seeds.
    pub fn find_interesting_items(&self, seeds: impl IntoIterator<Item = String>) -> BTreeSet<String> {
        let mut interesting = BTreeSet::default();
        let mut stack = Vec::default();

        for seed in seeds {
            if interesting.insert(seed.clone()) {
                stack.push(seed);
            }
        }

        while let Some(name) = stack.pop() {
            let Some(rendering) = self.items.get(&name).and_then(|item| item.render()) else {
                continue;
            };
            for found in items_of_string(&rendering) {
                if interesting.insert(found.clone()) {
                    stack.push(found);
                }
            }
        }

        interesting
    }

    /// The constraints of the slice of `items`, joined by `\n&& `, and a count of rendered items.
    ///
    /// Names of the slice which are unknown are added to `missing`, if they are longer than a single character, in the configuration space, and not free variables.
    pub fn intersect(
        &self,
        items: impl IntoIterator<Item = String>,
        in_space: impl Fn(&str) -> bool,
        missing: &mut BTreeSet<String>,
    ) -> (String, usize) {
        let mut constraints = Vec::default();

        for name in self.find_interesting_items(items) {
            match self.items.get(&name) {
                Some(item) => {
                    if let Some(rendering) = item.render() {
                        constraints.push(rendering);
                    }
                }

                None if self.is_known(&name) => {}

                None => {
                    if name.len() > 1 && in_space(&name) && !name.starts_with(FREE_PREFIX) {
                        missing.insert(name);
                    }
                }
            }
        }

        let count = constraints.len();
        (constraints.join("\n&& "), count)
    }
}

/// A constraint forcing each of `missing` off, or the empty string if there are none.
///
/// ```rust
/// # use std::collections::BTreeSet;
/// # use undertaker::rsf::item_db::missing_constraints;
/// let missing = BTreeSet::from(["CONFIG_B".to_string(), "CONFIG_A".to_string()]);
/// assert_eq!(missing_constraints(&missing), "( ! ( CONFIG_A || CONFIG_B ) )");
/// ```
pub fn missing_constraints(missing: &BTreeSet<String>) -> String {
    if missing.is_empty() {
        return String::default();
    }
    let names: Vec<&str> = missing.iter().map(|name| name.as_str()).collect();
    format!("( ! ( {} ) )", names.join(" || "))
}

/// The names of `s`, in order of first occurrence.
///
/// Names are separated by whitespace, `( ) ! & = < > | -`, and `y` and `n` are constants rather than names.
pub fn items_of_string(s: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::default();

    let separator = |c: char| c.is_whitespace() || "()!&=<>|-".contains(c);
    for token in s.split(separator) {
        if token.is_empty() || token == "y" || token == "n" {
            continue;
        }
        if !items.iter().any(|item| item == token) {
            items.push(token.to_string());
        }
    }

    items
}

/// Normalises the connectives of a dependency to `&` and `|`, and prefixes each name with `CONFIG_`.
fn rewrite_dependency(dependency: &str) -> String {
    let normalised = dependency.replace("&&", "&").replace("||", "|");
    let mut rewritten = String::with_capacity(normalised.len() * 2);
    let mut word = String::default();

    let flush = |word: &mut String, rewritten: &mut String| {
        if word.is_empty() {
            return;
        }
        let constant = matches!(word.as_str(), "y" | "m" | "n");
        let number = word.chars().all(|c| c.is_ascii_digit());
        if !constant && !number && !word.starts_with("CONFIG_") {
            rewritten.push_str("CONFIG_");
        }
        rewritten.push_str(word);
        word.clear();
    };

    for c in normalised.chars() {
        match c.is_ascii_alphanumeric() || c == '_' {
            true => word.push(c),
            false => {
                flush(&mut word, &mut rewritten);
                rewritten.push(c);
            }
        }
    }
    flush(&mut word, &mut rewritten);

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db(input: &str) -> ItemDb {
        ItemDb::from_rsf(&Rsf::read(input.as_bytes()).unwrap())
    }

    fn in_config_space(name: &str) -> bool {
        name.starts_with("CONFIG_")
    }

    #[test]
    fn items_of_strings() {
        assert_eq!(
            items_of_string("( CONFIG_A -> (CONFIG_B & !CONFIG_A) ) | y"),
            vec!["CONFIG_A", "CONFIG_B"]
        );
        assert_eq!(items_of_string("CONFIG_ANY = n"), vec!["CONFIG_ANY"]);
        assert!(items_of_string("").is_empty());
    }

    #[test]
    fn dependencies_are_rewritten() {
        assert_eq!(rewrite_dependency("A && (B || !C)"), "CONFIG_A & (CONFIG_B | !CONFIG_C)");
        assert_eq!(rewrite_dependency("X = m || Y != 3"), "CONFIG_X = m | CONFIG_Y != 3");
    }

    #[test]
    fn tristate_items() {
        let db = db("Item T tristate\n");
        assert_eq!(db.len(), 2);
        assert_eq!(
            db.get("CONFIG_T").and_then(|item| item.render()).as_deref(),
            Some("( CONFIG_T -> (! CONFIG_T_MODULE) )")
        );
        assert_eq!(
            db.get("CONFIG_T_MODULE").and_then(|item| item.render()).as_deref(),
            Some("( CONFIG_T_MODULE -> (! CONFIG_T) )")
        );
        assert_eq!(db.symbol_type("T"), Some(SymbolType::Tristate));
    }

    #[test]
    fn choices() {
        let db = db(r#"
Item A boolean
Item B boolean
Choice C required
ChoiceItem A C
ChoiceItem B C
ChoiceItem Z C
Depends C "X"
"#);
        let choice = db.get("CONFIG_C").unwrap();
        assert!(choice.is_choice());
        assert!(choice.required);
        assert_eq!(
            choice.render().as_deref(),
            Some("( CONFIG_C -> (CONFIG_X) ) & ( CONFIG_C -> (CONFIG_A | CONFIG_B) )")
        );
        assert_eq!(db.get("CONFIG_A").unwrap().render(), None);
    }

    #[test]
    fn slicing() {
        let db = db(r#"
Item A boolean
Item B boolean
Item C boolean
Item D boolean
Depends A "B"
Depends B "C && !MISSING"
"#);
        let slice = db.find_interesting_items(["CONFIG_A".to_string()]);
        assert_eq!(
            slice.into_iter().collect::<Vec<_>>(),
            vec!["CONFIG_A", "CONFIG_B", "CONFIG_C", "CONFIG_MISSING"]
        );

        let mut missing = BTreeSet::default();
        let (constraints, count) = db.intersect(
            ["CONFIG_A".to_string(), "COMP_X".to_string(), "__FREE__EQ0".to_string()],
            in_config_space,
            &mut missing,
        );
        assert_eq!(count, 2);
        assert_eq!(
            constraints,
            "( CONFIG_A -> (CONFIG_B) )\n&& ( CONFIG_B -> (CONFIG_C & !CONFIG_MISSING) )"
        );
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["CONFIG_MISSING"]);
    }

    #[test]
    fn whitelisted_items_are_not_missing() {
        let mut db = db("Item A boolean\nDepends A \"W\"\n");
        db.whitelist("CONFIG_W");

        let mut missing = BTreeSet::default();
        let (_, count) = db.intersect(["CONFIG_A".to_string(), "X".to_string()], |_| true, &mut missing);
        assert_eq!(count, 1);
        assert!(missing.is_empty());
    }

    #[test]
    fn missing() {
        assert_eq!(missing_constraints(&BTreeSet::default()), "");
        let missing = BTreeSet::from(["CONFIG_Z".to_string()]);
        assert_eq!(missing_constraints(&missing), "( ! ( CONFIG_Z ) )");
    }
}

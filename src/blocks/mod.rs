/*!
The conditional blocks of a source file, and the constraints they place on each other.

Each branch of a conditional (`#if`, `#ifdef`, `#ifndef`, `#elif`, `#else`) is a block, numbered from zero in order of appearance and named `B<n>`.
The file itself is the implicit block [TOP_BLOCK], which is always selected.

The selection of block `Bn` is given by an equivalence:

```none
( Bn <-> [PARENT && ]CONDITION[ && ( ! (PREV1 || PREV2 ...) )] )
```

Where `PARENT` is the enclosing block (omitted at the top level), `CONDITION` is the condition of the directive, and `PREV1 ...` are the earlier branches of the same conditional, nearest first.
Occurrences of the `defined` operator are dropped from conditions, and `#ifndef X` has condition `! X`.

```rust
# use undertaker::blocks::{BlockKind, CppFile};
let mut file = CppFile::new("drivers/net/e1000.c");
let a = file.open(BlockKind::Ifdef, "A", 1).unwrap();
let b = file.open(BlockKind::Ifdef, "B", 2).unwrap();
file.close(3).unwrap();
let not_a = file.open(BlockKind::Else, "", 4).unwrap();
file.close(5).unwrap();

assert_eq!(file.equivalence(a), "( B0 <-> A )");
assert_eq!(file.equivalence(b), "( B1 <-> B0 && B )");
assert_eq!(file.equivalence(not_a), "( B2 <-> ( ! (B0) ) )");
assert_eq!(file.code_constraints(b), "( B1 <-> B0 && B )\n&& ( B0 <-> A )\n&& B00");
```
*/

pub mod scanner;

use crate::{
    misc::log::targets::{self},
    types::err::{self},
};

/// The name of the implicit block of a whole file.
pub const TOP_BLOCK: &str = "B00";

/// The directive which opens a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
}

impl BlockKind {
    /// Whether the directive starts a conditional, rather than continuing one.
    pub fn is_if_like(&self) -> bool {
        matches!(self, BlockKind::If | BlockKind::Ifdef | BlockKind::Ifndef)
    }
}

/// A branch of a conditional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionalBlock {
    /// The number of the block, in order of appearance.
    pub id: usize,

    pub kind: BlockKind,

    /// The text of the directive after the keyword, e.g. `X` for `#ifdef X`.
    pub expression: String,

    /// The line of the opening directive.
    pub line_start: usize,

    /// The line of the directive which ends the block, or zero if not yet closed.
    pub line_end: usize,

    /// The enclosing block, if any.
    pub parent: Option<usize>,

    /// The previous branch of the same conditional, for `#elif` and `#else` blocks.
    pub prev: Option<usize>,
}

impl ConditionalBlock {
    pub fn name(&self) -> String {
        format!("B{}", self.id)
    }

    /// The condition of the directive alone, empty for `#else`.
    pub fn condition(&self) -> String {
        let expression = strip_defined(&self.expression);
        let expression = expression.trim();
        match self.kind {
            BlockKind::Else => String::default(),
            BlockKind::Ifdef => expression.to_string(),
            BlockKind::Ifndef => format!("! {expression}"),
            BlockKind::If | BlockKind::Elif => match is_simple(expression) {
                true => expression.to_string(),
                false => format!("( {expression} )"),
            },
        }
    }
}

/// The conditional blocks of a file.
#[derive(Clone, Debug, Default)]
pub struct CppFile {
    filename: String,
    blocks: Vec<ConditionalBlock>,

    /// Blocks not yet closed, innermost last.
    open: Vec<usize>,
}

impl CppFile {
    pub fn new(filename: impl Into<String>) -> Self {
        CppFile {
            filename: filename.into(),
            blocks: Vec::default(),
            open: Vec::default(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn blocks(&self) -> &[ConditionalBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&ConditionalBlock> {
        self.blocks.get(id)
    }

    /// The block named `name`, e.g. `B3`.
    pub fn block(&self, name: &str) -> Option<&ConditionalBlock> {
        name.strip_prefix('B')
            .filter(|_| name != TOP_BLOCK)
            .and_then(|id| id.parse::<usize>().ok())
            .and_then(|id| self.get(id))
    }

    /// The name of the enclosing block of block `id`, if any.
    pub fn parent_name(&self, id: usize) -> Option<String> {
        self.get(id)
            .and_then(|block| block.parent)
            .and_then(|parent| self.get(parent))
            .map(|parent| parent.name())
    }

    /// The line of the opening directive of block `id`.
    pub fn line(&self, id: usize) -> Option<usize> {
        self.get(id).map(|block| block.line_start)
    }

    /// The name of the innermost block containing `line`, or [TOP_BLOCK].
    pub fn block_at_line(&self, line: usize) -> String {
        let mut found: Option<&ConditionalBlock> = None;
        for block in &self.blocks {
            if block.line_start < line && line < block.line_end {
                // Blocks are in order of opening, so a later containing block is nested.
                found = Some(block);
            }
        }
        match found {
            Some(block) => block.name(),
            None => TOP_BLOCK.to_string(),
        }
    }

    /// Opens a block of the given kind at `line`.
    ///
    /// An `#elif` or `#else` block ends the innermost open block, which must be a branch of the same conditional.
    pub fn open(&mut self, kind: BlockKind, expression: &str, line: usize) -> Result<usize, err::BlockError> {
        let id = self.blocks.len();

        let (parent, prev) = match kind.is_if_like() {
            true => (self.open.last().copied(), None),

            false => {
                let previous = match self.open.last() {
                    Some(&previous) if self.blocks[previous].kind != BlockKind::Else => previous,
                    _ => return Err(err::BlockError::UnexpectedBranch(line)),
                };
                self.open.pop();
                self.blocks[previous].line_end = line;
                (self.blocks[previous].parent, Some(previous))
            }
        };

        self.blocks.push(ConditionalBlock {
            id,
            kind,
            expression: expression.trim().to_string(),
            line_start: line,
            line_end: 0,
            parent,
            prev,
        });
        self.open.push(id);

        log::trace!(target: targets::BLOCKS, "{}:{line}: opened B{id}", self.filename);
        Ok(id)
    }

    /// Closes the innermost open block at `line`.
    pub fn close(&mut self, line: usize) -> Result<(), err::BlockError> {
        match self.open.pop() {
            Some(id) => {
                self.blocks[id].line_end = line;
                Ok(())
            }
            None => Err(err::BlockError::UnexpectedEnd(line)),
        }
    }

    /// Ok if every block has been closed, and otherwise the outermost open block.
    pub fn finish(&self) -> Result<(), err::BlockError> {
        match self.open.first() {
            Some(id) => Err(err::BlockError::Unterminated(self.blocks[*id].line_start)),
            None => Ok(()),
        }
    }

    /// The equivalence which defines the selection of block `id`.
    pub fn equivalence(&self, id: usize) -> String {
        let block = &self.blocks[id];
        let mut inner = Vec::default();

        if let Some(parent) = block.parent {
            inner.push(self.blocks[parent].name());
        }

        let condition = block.condition();
        if !condition.is_empty() {
            inner.push(condition);
        }

        let mut predecessors = Vec::default();
        let mut prev = block.prev;
        while let Some(previous) = prev {
            predecessors.push(self.blocks[previous].name());
            prev = self.blocks[previous].prev;
        }
        if !predecessors.is_empty() {
            inner.push(format!("( ! ({}) )", predecessors.join(" || ")));
        }

        if inner.is_empty() {
            inner.push("1".to_string());
        }

        format!("( {} <-> {} )", block.name(), inner.join(" && "))
    }

    /// The constraints of block `id`: its equivalence, those of each block it depends on, and [TOP_BLOCK].
    ///
    /// An `#if`-like block depends on its parent, and other blocks on the previous branch.
    /// Constraints are distinct, in order of discovery, and joined by `\n&& `.
    pub fn code_constraints(&self, id: usize) -> String {
        let mut constraints: Vec<String> = Vec::default();

        let mut next = Some(id);
        while let Some(current) = next {
            let equivalence = self.equivalence(current);
            if !constraints.contains(&equivalence) {
                constraints.push(equivalence);
            }
            let block = &self.blocks[current];
            next = match block.kind.is_if_like() {
                true => block.parent,
                false => block.prev,
            };
        }
        constraints.push(TOP_BLOCK.to_string());

        constraints.join("\n&& ")
    }

    /// The constraints of every block of the file, and [TOP_BLOCK].
    pub fn file_constraints(&self) -> String {
        let mut constraints: Vec<String> = (0..self.blocks.len()).map(|id| self.equivalence(id)).collect();
        constraints.push(TOP_BLOCK.to_string());
        constraints.join("\n&& ")
    }
}

/// `expression` without the `defined` operator.
fn strip_defined(expression: &str) -> String {
    let mut stripped = String::with_capacity(expression.len());
    let mut word = String::default();

    let is_word_char = |c: char| c.is_ascii_alphanumeric() || c == '_';
    for c in expression.chars() {
        if is_word_char(c) {
            word.push(c);
            continue;
        }
        if word != "defined" {
            stripped.push_str(&word);
        }
        word.clear();
        stripped.push(c);
    }
    if word != "defined" {
        stripped.push_str(&word);
    }

    stripped
}

/// Whether `expression` is a single name, possibly in parentheses.
fn is_simple(expression: &str) -> bool {
    let name = expression
        .trim()
        .trim_start_matches(['(', ' '])
        .trim_end_matches([')', ' ']);
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

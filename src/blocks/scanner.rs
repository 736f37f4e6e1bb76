/*!
A line based scanner for the conditional directives of a source file.

Lines ending in a backslash are joined with the next line, comments are removed, and the directives `#if`, `#ifdef`, `#ifndef`, `#elif`, `#elifdef`, `#elifndef`, `#else` and `#endif` are passed to a [CppFile].
Other directives, including `#define`, are ignored, and no macro is expanded.

```rust
# use undertaker::blocks::scanner::scan;
let source = "#ifdef CONFIG_A /* on */\nint a;\n#elif CONFIG_B > \\\n 2\n#endif\n";
let file = scan("a.c", source.as_bytes()).unwrap();
assert_eq!(file.len(), 2);
assert_eq!(file.blocks()[1].expression, "CONFIG_B >  2");
```
*/

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    blocks::{BlockKind, CppFile},
    misc::log::targets::{self},
    types::err::ErrorKind,
};

/// The blocks of the source read from `reader`.
pub fn scan(filename: &str, reader: impl BufRead) -> Result<CppFile, ErrorKind> {
    let mut file = CppFile::new(filename);
    let mut in_comment = false;

    let mut logical = String::default();
    let mut logical_start = 0;
    let mut continued = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if !continued {
            logical_start = index + 1;
        }

        match line.strip_suffix('\\') {
            Some(head) => {
                logical.push_str(head);
                continued = true;
                continue;
            }
            None => {
                logical.push_str(&line);
                continued = false;
            }
        }

        let code = strip_comments(&logical, &mut in_comment);
        logical.clear();
        directive(&mut file, &code, logical_start)?;
    }

    if !logical.is_empty() {
        let code = strip_comments(&logical, &mut in_comment);
        directive(&mut file, &code, logical_start)?;
    }

    file.finish()?;
    log::debug!(target: targets::BLOCKS, "Found {} blocks in {filename}", file.len());
    Ok(file)
}

/// The blocks of the file at `path`, with the path as the name of the file.
pub fn scan_file(path: &Path) -> Result<CppFile, ErrorKind> {
    let file = File::open(path)?;
    scan(&path.display().to_string(), BufReader::new(file))
}

/// Passes the directive of `code`, if any, to `file`.
fn directive(file: &mut CppFile, code: &str, line: usize) -> Result<(), ErrorKind> {
    let Some(rest) = code.trim_start().strip_prefix('#') else {
        return Ok(());
    };
    let rest = rest.trim_start();
    let keyword_end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (keyword, argument) = rest.split_at(keyword_end);
    let first_word = || argument.split_whitespace().next().unwrap_or_default();

    match keyword {
        "if" => file.open(BlockKind::If, argument, line).map(|_| ())?,
        "ifdef" => file.open(BlockKind::Ifdef, first_word(), line).map(|_| ())?,
        "ifndef" => file.open(BlockKind::Ifndef, first_word(), line).map(|_| ())?,
        "elif" => file.open(BlockKind::Elif, argument, line).map(|_| ())?,
        "elifdef" => file.open(BlockKind::Elif, first_word(), line).map(|_| ())?,
        "elifndef" => {
            let negated = format!("! {}", first_word());
            file.open(BlockKind::Elif, &negated, line).map(|_| ())?
        }
        "else" => file.open(BlockKind::Else, "", line).map(|_| ())?,
        "endif" => file.close(line)?,
        _ => {}
    }
    Ok(())
}

/// `line` without comments, with `in_comment` tracking block comments across lines.
///
/// A block comment is replaced by a space, and string and character literals are kept as is.
fn strip_comments(line: &str, in_comment: &mut bool) -> String {
    let mut code = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if *in_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                *in_comment = false;
                code.push(' ');
            }
            continue;
        }

        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                *in_comment = true;
            }

            '/' if chars.peek() == Some(&'/') => break,

            '"' | '\'' => {
                code.push(c);
                while let Some(l) = chars.next() {
                    code.push(l);
                    match l {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                code.push(escaped);
                            }
                        }
                        _ if l == c => break,
                        _ => {}
                    }
                }
            }

            _ => code.push(c),
        }
    }

    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives() {
        let source = "\
#include <linux/module.h>
#define X 1
#if defined(CONFIG_A) || CONFIG_B
# ifndef CONFIG_C
int c;
# endif
#elifdef CONFIG_D
#else
#endif
";
        let file = scan("d.c", source.as_bytes()).unwrap();
        let kinds: Vec<_> = file.blocks().iter().map(|block| block.kind).collect();
        assert_eq!(kinds, vec![BlockKind::If, BlockKind::Ifndef, BlockKind::Elif, BlockKind::Else]);
        assert_eq!(file.blocks()[0].expression, "defined(CONFIG_A) || CONFIG_B");
        assert_eq!(file.blocks()[1].parent, Some(0));
        assert_eq!(file.blocks()[1].line_start, 4);
        assert_eq!(file.blocks()[3].line_end, 9);
        assert_eq!(file.equivalence(2), "( B2 <-> CONFIG_D && ( ! (B0) ) )");
    }

    #[test]
    fn comments() {
        let source = "\
/* #ifdef CONFIG_IN_COMMENT
#endif */
#ifdef CONFIG_A // #endif
char *s = \"/* not a comment\";
#endif /* end
of comment */
";
        let file = scan("c.c", source.as_bytes()).unwrap();
        assert_eq!(file.len(), 1);
        assert_eq!(file.blocks()[0].expression, "CONFIG_A");
        assert_eq!(file.blocks()[0].line_end, 5);
    }

    #[test]
    fn continuation_keeps_the_first_line() {
        let source = "int x;\n#if CONFIG_A && \\\n    CONFIG_B\n#endif\n";
        let file = scan("l.c", source.as_bytes()).unwrap();
        assert_eq!(file.blocks()[0].line_start, 2);
        assert_eq!(file.blocks()[0].line_end, 4);
        assert!(file.blocks()[0].expression.ends_with("CONFIG_B"));
    }

    #[test]
    fn unterminated() {
        let source = "#ifdef CONFIG_A\n#ifdef CONFIG_B\n#endif\n";
        assert_eq!(
            scan("u.c", source.as_bytes()).err(),
            Some(ErrorKind::Block(crate::types::err::BlockError::Unterminated(1)))
        );
    }
}

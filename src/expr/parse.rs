/*!
Parsing of expressions from text.

The grammar, loosest binding first:

```none
equivalence := implication ("<->" implication)*
implication := disjunction ("->" implication)?
disjunction := conjunction ("||" conjunction)*
conjunction := operation ("&&" operation)*
operation   := unary (OPERATOR unary)*
unary       := "!" unary | atom
atom        := "(" equivalence ")" | NAME "(" [equivalence ("," equivalence)*] ")" | NAME | NUMBER | CHAR
```

- Names are made of `[A-Za-z0-9_.]`.
- Integers (decimal or hexadecimal, with optional `u`/`l` suffixes) are `0` when zero and `1` otherwise, and character constants such as `'c'` are `1`.
- The operators of C (`== != <= >= < > + - * / % << >> & | ^ ? :`) are all [Any](super::Node::Any) nodes of one priority, associating to the left.

In the [Model](Dialect::Model) dialect `&` and `|` are conjunction and disjunction, and `=` is a comparison, as used by dependency strings of RSF models.

```rust
# use undertaker::expr::{Arena, parse::Dialect};
let mut arena = Arena::default();
assert!(arena.parse("A ? B : C").is_ok());
assert!(arena.parse("A ? B = C").is_err());

let e = arena.parse_with("CONFIG_A & (CONFIG_B | !CONFIG_C)", Dialect::Model).unwrap();
assert_eq!(arena.render(e), "CONFIG_A && (CONFIG_B || !CONFIG_C)");
```
*/

use crate::{
    misc::log::targets::{self},
    types::err::{self},
};

use super::{Arena, ExprId};

/// The dialect of an expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Conditions of the C preprocessor.
    #[default]
    Cpp,

    /// Dependency strings of configuration models.
    Model,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Name(String),
    Const(bool),
    Not,
    And,
    Or,
    Implies,
    Equivalent,
    Operator(&'static str),
    Open,
    Close,
    Comma,
}

/// Operators of C, longest first so that prefixes are tried last.
const OPERATORS: &[&str] = &[
    "<<", ">>", "<=", ">=", "==", "!=", "<", ">", "+", "-", "*", "/", "%", "&", "|", "^", "?", ":",
];

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// The value of `word` if it is an integer literal.
fn integer_value(word: &str) -> Option<bool> {
    let digits = word.trim_end_matches(['u', 'U', 'l', 'L']);
    let value = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u128>().ok()?,
    };
    Some(value != 0)
}

fn tokenize(input: &str, dialect: Dialect) -> Result<Vec<(usize, Token)>, err::ParseError> {
    let mut tokens = Vec::default();
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut index = 0;

    let unexpected = |position: usize| err::ParseError::UnexpectedCharacter {
        input: input.to_string(),
        position,
    };

    while index < chars.len() {
        let (position, c) = chars[index];
        let rest = &input[position..];

        if c.is_whitespace() {
            index += 1;
            continue;
        }

        if is_name_char(c) {
            let mut end = index;
            while end < chars.len() && is_name_char(chars[end].1) {
                end += 1;
            }
            let stop = chars.get(end).map_or(input.len(), |(p, _)| *p);
            let word = &input[position..stop];
            let token = match integer_value(word) {
                Some(value) => Token::Const(value),
                None => Token::Name(word.to_string()),
            };
            tokens.push((position, token));
            index = end;
            continue;
        }

        if c == '\'' {
            let mut end = index + 1;
            while end < chars.len() && chars[end].1 != '\'' {
                if chars[end].1 == '\\' {
                    end += 1;
                }
                end += 1;
            }
            if end >= chars.len() {
                return Err(unexpected(position));
            }
            tokens.push((position, Token::Const(true)));
            index = end + 1;
            continue;
        }

        let (token, width) = if rest.starts_with("<->") {
            (Token::Equivalent, 3)
        } else if rest.starts_with("->") {
            (Token::Implies, 2)
        } else if rest.starts_with("&&") {
            (Token::And, 2)
        } else if rest.starts_with("||") {
            (Token::Or, 2)
        } else if rest.starts_with("!=") {
            (Token::Operator("!="), 2)
        } else if c == '!' {
            (Token::Not, 1)
        } else if c == '(' {
            (Token::Open, 1)
        } else if c == ')' {
            (Token::Close, 1)
        } else if c == ',' {
            (Token::Comma, 1)
        } else if dialect == Dialect::Model && c == '&' {
            (Token::And, 1)
        } else if dialect == Dialect::Model && c == '|' {
            (Token::Or, 1)
        } else if dialect == Dialect::Model && c == '=' && !rest.starts_with("==") {
            (Token::Operator("="), 1)
        } else {
            match OPERATORS.iter().find(|operator| rest.starts_with(**operator)) {
                Some(operator) => (Token::Operator(*operator), operator.len()),
                None => return Err(unexpected(position)),
            }
        };

        tokens.push((position, token));
        index += width;
    }

    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<(usize, Token)>,
    next: usize,
    arena: &'a mut Arena,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.next).map(|(_, token)| token)
    }

    fn unexpected(&self) -> err::ParseError {
        match self.tokens.get(self.next) {
            Some((position, _)) => err::ParseError::UnexpectedToken {
                input: self.input.to_string(),
                position: *position,
            },
            None => err::ParseError::UnexpectedEnd {
                input: self.input.to_string(),
            },
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.next += 1;
            true
        } else {
            false
        }
    }

    fn equivalence(&mut self) -> Result<ExprId, err::ParseError> {
        let mut l = self.implication()?;
        while self.eat(&Token::Equivalent) {
            let r = self.implication()?;
            l = self.arena.mk_eq(l, r);
        }
        Ok(l)
    }

    fn implication(&mut self) -> Result<ExprId, err::ParseError> {
        let l = self.disjunction()?;
        match self.eat(&Token::Implies) {
            true => {
                let r = self.implication()?;
                Ok(self.arena.mk_impl(l, r))
            }
            false => Ok(l),
        }
    }

    fn disjunction(&mut self) -> Result<ExprId, err::ParseError> {
        let mut l = self.conjunction()?;
        while self.eat(&Token::Or) {
            let r = self.conjunction()?;
            l = self.arena.mk_or(l, r);
        }
        Ok(l)
    }

    fn conjunction(&mut self) -> Result<ExprId, err::ParseError> {
        let mut l = self.operation()?;
        while self.eat(&Token::And) {
            let r = self.operation()?;
            l = self.arena.mk_and(l, r);
        }
        Ok(l)
    }

    fn operation(&mut self) -> Result<ExprId, err::ParseError> {
        let mut l = self.unary()?;
        while let Some(Token::Operator(operator)) = self.peek() {
            let operator = *operator;
            self.next += 1;
            let r = self.unary()?;
            l = self.arena.mk_any(operator, l, r);
        }
        Ok(l)
    }

    fn unary(&mut self) -> Result<ExprId, err::ParseError> {
        match self.eat(&Token::Not) {
            true => {
                let e = self.unary()?;
                Ok(self.arena.mk_not(e))
            }
            false => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<ExprId, err::ParseError> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.unexpected()),
        };

        match token {
            Token::Open => {
                self.next += 1;
                let e = self.equivalence()?;
                match self.eat(&Token::Close) {
                    true => Ok(e),
                    false => Err(self.unexpected()),
                }
            }

            Token::Const(value) => {
                self.next += 1;
                Ok(self.arena.constant(value))
            }

            Token::Name(name) => {
                self.next += 1;
                if !self.eat(&Token::Open) {
                    return Ok(self.arena.var(name));
                }

                let mut parameters = Vec::default();
                if !self.eat(&Token::Close) {
                    loop {
                        parameters.push(self.equivalence()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        match self.eat(&Token::Close) {
                            true => break,
                            false => return Err(self.unexpected()),
                        }
                    }
                }
                Ok(self.arena.mk_call(name, parameters))
            }

            _ => Err(self.unexpected()),
        }
    }
}

impl Arena {
    /// Parses `input` as a condition of the C preprocessor.
    pub fn parse(&mut self, input: &str) -> Result<ExprId, err::ParseError> {
        self.parse_with(input, Dialect::Cpp)
    }

    /// Parses `input` in the given dialect.
    ///
    /// On error, nodes allocated before the error remain in the arena, unreachable from any returned id.
    pub fn parse_with(&mut self, input: &str, dialect: Dialect) -> Result<ExprId, err::ParseError> {
        if input.trim().is_empty() {
            return Err(err::ParseError::Empty);
        }

        let tokens = tokenize(input, dialect)?;
        let mut parser = Parser {
            input,
            tokens,
            next: 0,
            arena: self,
        };

        let root = parser.equivalence()?;
        if parser.next < parser.tokens.len() {
            let error = parser.unexpected();
            log::debug!(target: targets::EXPRESSION, "Trailing input: {error}");
            return Err(error);
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted() {
        let mut arena = Arena::default();
        for input in [
            "foo()",
            "foo(x,y)",
            "foo(bar(x), baz())",
            "A ? B : C",
            "defined(A) || B",
            "0x10UL > CONFIG_X",
            "a.b && c_d",
            "'\\n' && A",
            "A <-> B <-> C",
        ] {
            assert!(arena.parse(input).is_ok(), "{input}");
        }
    }

    #[test]
    fn rejected() {
        let mut arena = Arena::default();
        assert_eq!(arena.parse(""), Err(err::ParseError::Empty));
        assert_eq!(arena.parse("  "), Err(err::ParseError::Empty));
        for input in ["--0--", "A &&", " -> B", "A ? B = C", "A + B = C", "(A", "A)", "f(a,", "'a"] {
            assert!(arena.parse(input).is_err(), "{input}");
        }
    }

    #[test]
    fn integers() {
        assert_eq!(integer_value("0"), Some(false));
        assert_eq!(integer_value("0l"), Some(false));
        assert_eq!(integer_value("0x0"), Some(false));
        assert_eq!(integer_value("12UL"), Some(true));
        assert_eq!(integer_value("CONFIG_0"), None);
    }

    #[test]
    fn implication_is_right_associative() {
        let mut arena = Arena::default();
        let e = arena.parse("a -> b -> c").unwrap();
        match arena.node(e) {
            crate::expr::Node::Impl(_, r) => assert_eq!(arena.render(*r), "b -> c"),
            _ => panic!("not an implication"),
        }
    }

    #[test]
    fn operators_are_left_associative() {
        let mut arena = Arena::default();
        let e = arena.parse("a + b * c").unwrap();
        match arena.node(e) {
            crate::expr::Node::Any(operator, l, _) => {
                assert_eq!(operator, "*");
                assert_eq!(arena.render(*l), "a + b");
            }
            _ => panic!("not an operator"),
        }
    }

    #[test]
    fn model_dialect() {
        let mut arena = Arena::default();
        let e = arena
            .parse_with("CONFIG_A & !CONFIG_B_MODULE | CONFIG_C=y", Dialect::Model)
            .unwrap();
        assert_eq!(arena.render(e), "CONFIG_A && !CONFIG_B_MODULE || CONFIG_C = y");

        let bitwise = arena.parse("A & B").unwrap();
        assert_eq!(arena.render(bitwise), "A & B");
    }
}

use super::lexer::{Lexer, Token, TokenKind};
use crate::{Error, Result};

/// One parsed value: scalars and flat arrays. Bare identifiers read as
/// strings so authors can write `type = integer`.
#[derive(Debug, Clone, PartialEq)]
pub enum BclValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<BclValue>),
}

impl BclValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Scalar rendered to text, used where any literal is acceptable
    /// (field defaults, seed values).
    pub fn render(&self) -> String {
        match self {
            Self::Str(value) => value.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Array(values) => values
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// `Keyword "label" { attributes and nested blocks }`.
#[derive(Debug, Clone, PartialEq)]
pub struct BclBlock {
    pub keyword: String,
    pub label: Option<String>,
    pub attrs: Vec<(String, BclValue)>,
    pub blocks: Vec<BclBlock>,
    pub line: usize,
}

impl BclBlock {
    /// Attribute lookup tolerant of casing and underscores, so
    /// `IsolationLevel` and `isolation_level` both resolve.
    pub fn attr(&self, key: &str) -> Option<&BclValue> {
        let wanted = normalize_key(key);
        self.attrs
            .iter()
            .find(|(name, _)| normalize_key(name) == wanted)
            .map(|(_, value)| value)
    }

    pub fn blocks_named(&self, keyword: &str) -> impl Iterator<Item = &BclBlock> {
        let wanted = normalize_key(keyword);
        self.blocks
            .iter()
            .filter(move |block| normalize_key(&block.keyword) == wanted)
    }
}

pub fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase().replace('_', "")
}

#[derive(Debug, Clone, PartialEq)]
pub struct BclDocument {
    pub blocks: Vec<BclBlock>,
}

pub fn parse_document(source: &str, file: &str) -> Result<BclDocument> {
    let tokens = Lexer::new(source, file).tokenize()?;
    let mut parser = Parser {
        file,
        tokens,
        pos: 0,
    };
    let mut blocks = Vec::new();
    while !parser.at_end() {
        blocks.push(parser.block()?);
    }
    Ok(BclDocument { blocks })
}

struct Parser<'a> {
    file: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn block(&mut self) -> Result<BclBlock> {
        let (keyword, line) = match self.next() {
            Some(Token {
                kind: TokenKind::Ident(keyword),
                line,
                ..
            }) => (keyword, line),
            Some(token) => {
                return Err(self.err_at(
                    &token,
                    format!("expected block keyword, found {}", token.kind.describe()),
                ));
            }
            None => return Err(self.err_eof("expected block keyword")),
        };

        let label = match self.peek() {
            Some(Token {
                kind: TokenKind::Str(_),
                ..
            }) => match self.next() {
                Some(Token {
                    kind: TokenKind::Str(label),
                    ..
                }) => Some(label),
                _ => None,
            },
            _ => None,
        };

        self.expect(&TokenKind::LBrace)?;

        let mut attrs = Vec::new();
        let mut blocks = Vec::new();
        loop {
            match self.peek() {
                Some(Token {
                    kind: TokenKind::RBrace,
                    ..
                }) => {
                    self.next();
                    break;
                }
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {
                    self.next();
                }
                Some(Token {
                    kind: TokenKind::Ident(_),
                    ..
                }) => {
                    let is_attr = matches!(
                        self.tokens.get(self.pos + 1),
                        Some(Token {
                            kind: TokenKind::Equals,
                            ..
                        })
                    );
                    if is_attr {
                        let (name, value) = self.attribute()?;
                        attrs.push((name, value));
                    } else {
                        blocks.push(self.block()?);
                    }
                }
                Some(token) => {
                    let token = token.clone();
                    return Err(self.err_at(
                        &token,
                        format!(
                            "expected attribute, nested block, or `}}`, found {}",
                            token.kind.describe()
                        ),
                    ));
                }
                None => return Err(self.err_eof("unclosed block")),
            }
        }

        Ok(BclBlock {
            keyword,
            label,
            attrs,
            blocks,
            line,
        })
    }

    fn attribute(&mut self) -> Result<(String, BclValue)> {
        let name = match self.next() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => name,
            _ => return Err(self.err_eof("expected attribute name")),
        };
        self.expect(&TokenKind::Equals)?;
        let value = self.value()?;
        Ok((name, value))
    }

    fn value(&mut self) -> Result<BclValue> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Str(value),
                ..
            }) => Ok(BclValue::Str(value)),
            Some(Token {
                kind: TokenKind::Ident(value),
                ..
            }) => Ok(BclValue::Str(value)),
            Some(Token {
                kind: TokenKind::Int(value),
                ..
            }) => Ok(BclValue::Int(value)),
            Some(Token {
                kind: TokenKind::Float(value),
                ..
            }) => Ok(BclValue::Float(value)),
            Some(Token {
                kind: TokenKind::Bool(value),
                ..
            }) => Ok(BclValue::Bool(value)),
            Some(Token {
                kind: TokenKind::LBracket,
                ..
            }) => {
                let mut values = Vec::new();
                loop {
                    match self.peek() {
                        Some(Token {
                            kind: TokenKind::RBracket,
                            ..
                        }) => {
                            self.next();
                            break;
                        }
                        Some(Token {
                            kind: TokenKind::Comma,
                            ..
                        }) => {
                            self.next();
                        }
                        Some(_) => values.push(self.value()?),
                        None => return Err(self.err_eof("unclosed array")),
                    }
                }
                Ok(BclValue::Array(values))
            }
            Some(token) => Err(self.err_at(
                &token,
                format!("expected value, found {}", token.kind.describe()),
            )),
            None => Err(self.err_eof("expected value")),
        }
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<Token> {
        match self.next() {
            Some(token) if &token.kind == expected => Ok(token),
            Some(token) => Err(self.err_at(
                &token,
                format!(
                    "expected {}, found {}",
                    expected.describe(),
                    token.kind.describe()
                ),
            )),
            None => Err(self.err_eof(format!("expected {}", expected.describe()))),
        }
    }

    fn err_at(&self, token: &Token, message: impl Into<String>) -> Error {
        Error::parse(self.file, token.line, token.column, message)
    }

    fn err_eof(&self, message: impl Into<String>) -> Error {
        let (line, column) = self
            .tokens
            .last()
            .map(|token| (token.line, token.column))
            .unwrap_or((1, 1));
        Error::parse(self.file, line, column, message)
    }
}

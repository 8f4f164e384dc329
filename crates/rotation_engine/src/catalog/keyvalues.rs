//! Minimal reader for Valve KeyValues text files.
//!
//! Only what the catalog needs: quoted and bare strings, nested blocks,
//! `//` comments and platform conditionals (`[$WIN32]`), which are skipped.

use crate::error::{Result, RotationError};

#[derive(Debug, Clone, PartialEq)]
pub enum KvValue {
    Text(String),
    Block(Vec<KvPair>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KvPair {
    pub key: String,
    pub value: KvValue,
    /// 1-based line the key appeared on
    pub line: usize,
}

impl KvPair {
    pub fn as_block(&self) -> Option<&[KvPair]> {
        match &self.value {
            KvValue::Block(children) => Some(children),
            KvValue::Text(_) => None,
        }
    }
}

/// Finds the first child whose key matches ignoring ASCII case.
pub fn find_child<'a>(pairs: &'a [KvPair], key: &str) -> Option<&'a KvPair> {
    pairs.iter().find(|p| p.key.eq_ignore_ascii_case(key))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '{' => tokens.push((Token::Open, line)),
            '}' => tokens.push((Token::Close, line)),
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        line += 1;
                        break;
                    }
                }
            }
            '"' => {
                let start = line;
                let mut text = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some(other) => text.push(other),
                            None => break,
                        },
                        '\n' => {
                            line += 1;
                            text.push('\n');
                        }
                        other => text.push(other),
                    }
                }
                if !closed {
                    return Err(RotationError::Catalog(format!(
                        "line {start}: unterminated string"
                    )));
                }
                tokens.push((Token::Text(text), start));
            }
            other => {
                let mut text = String::from(other);
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '"' || c == '{' || c == '}' {
                        break;
                    }
                    text.push(c);
                    chars.next();
                }
                // Platform conditionals carry no data for us
                if !(text.starts_with('[') && text.ends_with(']')) {
                    tokens.push((Token::Text(text), line));
                }
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_pairs(&mut self, nested: bool, opened_at: usize) -> Result<Vec<KvPair>> {
        let mut pairs = Vec::new();
        loop {
            let (key, line) = match self.advance() {
                Some((Token::Text(key), line)) => (key, line),
                Some((Token::Close, line)) => {
                    if nested {
                        return Ok(pairs);
                    }
                    return Err(RotationError::Catalog(format!("line {line}: unexpected '}}'")));
                }
                Some((Token::Open, line)) => {
                    return Err(RotationError::Catalog(format!(
                        "line {line}: expected a key, found '{{'"
                    )));
                }
                None => {
                    if nested {
                        return Err(RotationError::Catalog(format!(
                            "line {opened_at}: block is never closed"
                        )));
                    }
                    return Ok(pairs);
                }
            };

            let value = match self.advance() {
                Some((Token::Text(text), _)) => KvValue::Text(text),
                Some((Token::Open, open_line)) => KvValue::Block(self.parse_pairs(true, open_line)?),
                Some((Token::Close, _)) | None => {
                    return Err(RotationError::Catalog(format!(
                        "line {line}: key '{key}' has no value"
                    )));
                }
            };

            pairs.push(KvPair { key, value, line });
        }
    }
}

/// Parses KeyValues text into its top-level pairs.
pub fn parse(input: &str) -> Result<Vec<KvPair>> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_pairs(false, 0)
}

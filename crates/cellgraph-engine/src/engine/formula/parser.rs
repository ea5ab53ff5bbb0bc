//! Formula parser - converts expression text into an [`Expr`] tree.
//!
//! Supports numbers, cell references (`A1`), parentheses, unary `+`/`-` and
//! the binary operators `+ - * /` with the usual precedence.

use thiserror::Error;

use super::expr::{BinaryOp, Expr, UnaryOp};
use crate::engine::Position;

/// Deepest expression tree accepted. Evaluating, printing and dropping the
/// tree recurse once per level.
const MAX_TREE_DEPTH: usize = 1024;
/// Deepest parenthesis/unary nesting accepted by the recursive descent.
const MAX_NESTING: usize = 256;

/// Malformed formula text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty formula")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("formula is nested too deeply")]
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Cell(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Cell(label) => label.clone(),
            Token::Plus => "+".to_string(),
            Token::Minus => "-".to_string(),
            Token::Star => "*".to_string(),
            Token::Slash => "/".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

/// Parse expression text (without the leading `=`) into a tree.
pub(crate) fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        nesting: 0,
    };
    let (expr, _) = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some((token, offset)) => Err(ParseError::UnexpectedToken {
            found: token.describe(),
            offset: *offset,
        }),
    }
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => tokens.push((Token::Plus, start)),
            b'-' => tokens.push((Token::Minus, start)),
            b'*' => tokens.push((Token::Star, start)),
            b'/' => tokens.push((Token::Slash, start)),
            b'(' => tokens.push((Token::LParen, start)),
            b')' => tokens.push((Token::RParen, start)),
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, i);
                let text = &source[start..i];
                let value = text
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| ParseError::InvalidNumber {
                        text: text.to_string(),
                        offset: start,
                    })?;
                tokens.push((Token::Number(value), start));
                continue;
            }
            b'A'..=b'Z' => {
                while i < bytes.len() && bytes[i].is_ascii_uppercase() {
                    i += 1;
                }
                let letters_end = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                if i == letters_end {
                    return Err(unexpected_char(source, i));
                }
                tokens.push((Token::Cell(source[start..i].to_string()), start));
                continue;
            }
            _ => return Err(unexpected_char(source, i)),
        }
        i += 1;
    }

    Ok(tokens)
}

/// Advance past `digits [. digits] [(e|E) [+|-] digits]`.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

fn unexpected_char(source: &str, offset: usize) -> ParseError {
    match source[offset..].chars().next() {
        Some(ch) => ParseError::UnexpectedChar { ch, offset },
        None => ParseError::UnexpectedEnd,
    }
}

struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
    nesting: usize,
}

/// A parsed subtree and its depth.
type Parsed = (Expr, usize);

impl Parser<'_> {
    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&(Token, usize)> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(ParseError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn binary(op: BinaryOp, lhs: Parsed, rhs: Parsed) -> Result<Parsed, ParseError> {
        let depth = lhs.1.max(rhs.1) + 1;
        if depth > MAX_TREE_DEPTH {
            return Err(ParseError::TooDeep);
        }
        let expr = Expr::Binary {
            op,
            lhs: Box::new(lhs.0),
            rhs: Box::new(rhs.0),
        };
        Ok((expr, depth))
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Parsed, ParseError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some((Token::Plus, _)) => BinaryOp::Add,
                Some((Token::Minus, _)) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Self::binary(op, lhs, rhs)?;
        }
    }

    // term := unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<Parsed, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some((Token::Star, _)) => BinaryOp::Mul,
                Some((Token::Slash, _)) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Self::binary(op, lhs, rhs)?;
        }
    }

    // unary := ('+' | '-') unary | primary
    fn parse_unary(&mut self) -> Result<Parsed, ParseError> {
        let op = match self.peek() {
            Some((Token::Plus, _)) => UnaryOp::Plus,
            Some((Token::Minus, _)) => UnaryOp::Minus,
            _ => return self.parse_primary(),
        };
        self.pos += 1;

        self.enter()?;
        let (operand, depth) = self.parse_unary()?;
        self.leave();
        if depth + 1 > MAX_TREE_DEPTH {
            return Err(ParseError::TooDeep);
        }

        let expr = Expr::Unary {
            op,
            operand: Box::new(operand),
        };
        Ok((expr, depth + 1))
    }

    // primary := NUMBER | CELL | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Parsed, ParseError> {
        let (token, offset) = match self.next() {
            Some((token, offset)) => (token.clone(), *offset),
            None => return Err(ParseError::UnexpectedEnd),
        };

        match token {
            Token::Number(n) => Ok((Expr::Number(n), 1)),
            // Out-of-range labels stay in the tree as NONE so the caller can
            // reject them as invalid references.
            Token::Cell(label) => Ok((Expr::Cell(Position::from_label(&label)), 1)),
            Token::LParen => {
                self.enter()?;
                let inner = self.parse_expr()?;
                self.leave();
                match self.next() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((other, offset)) => Err(ParseError::UnexpectedToken {
                        found: other.describe(),
                        offset: *offset,
                    }),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            other => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                offset,
            }),
        }
    }
}

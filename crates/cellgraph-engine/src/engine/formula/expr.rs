//! Expression tree: printing and evaluation.

use std::collections::BTreeSet;
use std::fmt;

use super::CellLookup;
use crate::engine::value::format_number;
use crate::engine::{FormulaError, FormulaErrorKind, Position, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Cell(Position),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Node classes used to decide where the printer needs parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Add,
    Sub,
    Mul,
    Div,
    Unary,
    Atom,
}

impl Expr {
    fn class(&self) -> Class {
        match self {
            Expr::Number(_) | Expr::Cell(_) => Class::Atom,
            Expr::Unary { .. } => Class::Unary,
            Expr::Binary { op, .. } => match op {
                BinaryOp::Add => Class::Add,
                BinaryOp::Sub => Class::Sub,
                BinaryOp::Mul => Class::Mul,
                BinaryOp::Div => Class::Div,
            },
        }
    }

    /// Add every referenced position to `out`.
    pub(crate) fn collect_references(&self, out: &mut BTreeSet<Position>) {
        let mut pending = vec![self];
        while let Some(expr) = pending.pop() {
            match expr {
                Expr::Number(_) => {}
                Expr::Cell(pos) => {
                    out.insert(*pos);
                }
                Expr::Unary { operand, .. } => pending.push(operand),
                Expr::Binary { lhs, rhs, .. } => {
                    pending.push(rhs);
                    pending.push(lhs);
                }
            }
        }
    }

    /// Evaluate left to right; the first error wins.
    pub(crate) fn evaluate(&self, lookup: &dyn CellLookup) -> Result<f64, FormulaError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Cell(pos) => cell_operand(*pos, lookup),
            Expr::Unary { op, operand } => {
                let v = operand.evaluate(lookup)?;
                Ok(match op {
                    UnaryOp::Plus => v,
                    UnaryOp::Minus => -v,
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(lookup)?;
                let r = rhs.evaluate(lookup)?;
                let result = match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                };
                if result.is_finite() {
                    Ok(result)
                } else {
                    Err(FormulaError::new(FormulaErrorKind::Arithmetic))
                }
            }
        }
    }
}

/// Read a referenced cell's value as a number.
fn cell_operand(pos: Position, lookup: &dyn CellLookup) -> Result<f64, FormulaError> {
    if !pos.is_valid() {
        return Err(FormulaError::new(FormulaErrorKind::Ref));
    }
    match lookup.value_at(pos) {
        Value::Empty => Ok(0.0),
        Value::Number(n) => Ok(n),
        Value::Text(text) => text_as_number(&text),
        Value::Error(e) => Err(e),
    }
}

fn text_as_number(text: &str) -> Result<f64, FormulaError> {
    if text.is_empty() {
        return Ok(0.0);
    }
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(FormulaError::new(FormulaErrorKind::Value))
}

fn needs_parens(parent: Class, child: Class, right: bool) -> bool {
    let additive = matches!(child, Class::Add | Class::Sub);
    match parent {
        Class::Sub => right && additive,
        Class::Mul => additive || (right && child == Class::Div),
        Class::Div => additive || (right && matches!(child, Class::Mul | Class::Div)),
        Class::Unary => additive,
        Class::Add | Class::Atom => false,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, parent: Class, child: &Expr, right: bool) -> fmt::Result {
    if needs_parens(parent, child.class(), right) {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

/// Prints with the fewest parentheses that keep the tree's meaning.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => f.write_str(&format_number(*n)),
            Expr::Cell(pos) if pos.is_valid() => write!(f, "{}", pos),
            Expr::Cell(_) => f.write_str("#REF!"),
            Expr::Unary { op, operand } => {
                f.write_str(match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                })?;
                write_operand(f, Class::Unary, operand, false)
            }
            Expr::Binary { op, lhs, rhs } => {
                let class = self.class();
                write_operand(f, class, lhs, false)?;
                f.write_str(match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                })?;
                write_operand(f, class, rhs, true)
            }
        }
    }
}

//! Arithmetic formulas over cell references.
//!
//! A [`Formula`] is parsed once from expression text, then evaluated on
//! demand against a [`CellLookup`]. The formula never holds a handle to the
//! sheet; whoever evaluates it supplies the lookup.

mod expr;
mod parser;

use std::collections::BTreeSet;

use expr::Expr;
pub use parser::ParseError;

use super::{FormulaError, Position, Value};

/// Resolves the current value of another cell during evaluation.
pub trait CellLookup {
    fn value_at(&self, pos: Position) -> Value;
}

impl<F> CellLookup for F
where
    F: Fn(Position) -> Value,
{
    fn value_at(&self, pos: Position) -> Value {
        self(pos)
    }
}

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expr,
    references: Vec<Position>,
}

impl Formula {
    /// Parse expression text, without the leading `=`.
    pub fn parse(source: &str) -> Result<Formula, ParseError> {
        let expr = parser::parse(source)?;
        let mut references = BTreeSet::new();
        expr.collect_references(&mut references);
        Ok(Formula {
            expr,
            references: references.into_iter().collect(),
        })
    }

    /// Evaluate to a number, or to the first evaluation error encountered.
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> Result<f64, FormulaError> {
        self.expr.evaluate(lookup)
    }

    /// Canonical expression text, without the leading `=`.
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }

    /// Referenced positions, each once, in ascending order. Out-of-range
    /// references appear as [`Position::NONE`].
    pub fn referenced_cells(&self) -> &[Position] {
        &self.references
    }
}

/// Parse expression text into a [`Formula`].
pub fn parse_formula(source: &str) -> Result<Formula, ParseError> {
    Formula::parse(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FormulaErrorKind;
    use std::collections::HashMap;

    fn p(label: &str) -> Position {
        Position::from_label(label)
    }

    fn no_cells(_: Position) -> Value {
        Value::Empty
    }

    fn eval(source: &str) -> Result<f64, FormulaError> {
        parse_formula(source).unwrap().evaluate(&no_cells)
    }

    fn eval_with(source: &str, cells: &[(&str, Value)]) -> Result<f64, FormulaError> {
        let cells: HashMap<Position, Value> =
            cells.iter().map(|(l, v)| (p(l), v.clone())).collect();
        let lookup = move |pos: Position| cells.get(&pos).cloned().unwrap_or(Value::Empty);
        parse_formula(source).unwrap().evaluate(&lookup)
    }

    fn kind(result: Result<f64, FormulaError>) -> FormulaErrorKind {
        result.unwrap_err().kind()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1+2*3"), Ok(7.0));
        assert_eq!(eval("(1+2)*3"), Ok(9.0));
        assert_eq!(eval("8/4/2"), Ok(1.0));
        assert_eq!(eval("1-2-3"), Ok(-4.0));
        assert_eq!(eval("-3*-2"), Ok(6.0));
        assert_eq!(eval("+5"), Ok(5.0));
        assert_eq!(eval("1/2"), Ok(0.5));
    }

    #[test]
    fn test_division_by_zero_is_arithmetic_error() {
        assert_eq!(kind(eval("1/0")), FormulaErrorKind::Arithmetic);
        assert_eq!(kind(eval("0/0")), FormulaErrorKind::Arithmetic);
        assert_eq!(kind(eval("1/A1")), FormulaErrorKind::Arithmetic);
    }

    #[test]
    fn test_overflow_is_arithmetic_error() {
        assert_eq!(kind(eval("1e308*10")), FormulaErrorKind::Arithmetic);
    }

    #[test]
    fn test_cell_operands() {
        assert_eq!(eval_with("A1+1", &[("A1", Value::Number(5.0))]), Ok(6.0));
        assert_eq!(eval_with("A1+1", &[]), Ok(1.0));
        assert_eq!(eval_with("A1*2", &[("A1", Value::Text("2.5".into()))]), Ok(5.0));
        assert_eq!(eval_with("A1+1", &[("A1", Value::Text(String::new()))]), Ok(1.0));
        assert_eq!(
            kind(eval_with("A1+1", &[("A1", Value::Text("abc".into()))])),
            FormulaErrorKind::Value
        );
        assert_eq!(
            kind(eval_with("A1+1", &[("A1", Value::Text(" 3".into()))])),
            FormulaErrorKind::Value
        );
        assert_eq!(
            kind(eval_with("A1+1", &[("A1", Value::Text("inf".into()))])),
            FormulaErrorKind::Value
        );
    }

    #[test]
    fn test_errors_propagate_first_wins() {
        let value_err = Value::Error(FormulaError::new(FormulaErrorKind::Value));
        let arith_err = Value::Error(FormulaError::new(FormulaErrorKind::Arithmetic));
        assert_eq!(
            kind(eval_with("A1+B1", &[("A1", value_err.clone()), ("B1", arith_err.clone())])),
            FormulaErrorKind::Value
        );
        assert_eq!(
            kind(eval_with("B1+A1", &[("A1", value_err), ("B1", arith_err)])),
            FormulaErrorKind::Arithmetic
        );
    }

    #[test]
    fn test_out_of_range_reference_evaluates_to_ref_error() {
        assert_eq!(kind(eval("ZZZZZ1+1")), FormulaErrorKind::Ref);
    }

    #[test]
    fn test_referenced_cells_sorted_unique() {
        let formula = parse_formula("C1+A2+A1+C1*B1").unwrap();
        assert_eq!(
            formula.referenced_cells(),
            &[p("A1"), p("B1"), p("C1"), p("A2")]
        );
        assert!(parse_formula("1+2").unwrap().referenced_cells().is_empty());
    }

    #[test]
    fn test_referenced_cells_include_invalid() {
        let formula = parse_formula("A1+ZZZZZ1").unwrap();
        assert_eq!(formula.referenced_cells(), &[Position::NONE, p("A1")]);
    }

    #[test]
    fn test_expression_normalizes_whitespace() {
        assert_eq!(parse_formula(" A1  + 1 ").unwrap().expression(), "A1+1");
        assert_eq!(parse_formula("1.50").unwrap().expression(), "1.5");
    }

    #[test]
    fn test_expression_minimal_parens() {
        let cases = [
            ("(1+2)+3", "1+2+3"),
            ("1+(2+3)", "1+2+3"),
            ("1-(2+3)", "1-(2+3)"),
            ("(1-2)-3", "1-2-3"),
            ("(1+2)*3", "(1+2)*3"),
            ("3*(1-2)", "3*(1-2)"),
            ("(2*3)*4", "2*3*4"),
            ("2*(3*4)", "2*3*4"),
            ("2*(3/4)", "2*(3/4)"),
            ("(2/3)*4", "2/3*4"),
            ("2/(3*4)", "2/(3*4)"),
            ("2/(3/4)", "2/(3/4)"),
            ("(2/3)/4", "2/3/4"),
            ("-(1+2)", "-(1+2)"),
            ("-(2*3)", "-2*3"),
            ("-(-A1)", "--A1"),
            ("(((A1)))", "A1"),
            ("2*-3", "2*-3"),
        ];
        for (source, expected) in cases {
            assert_eq!(parse_formula(source).unwrap().expression(), expected, "source {}", source);
        }
    }

    #[test]
    fn test_printed_expression_reparses_to_same_tree() {
        for source in ["1-(2-3)", "(1+2)*(3-4)/5", "-(A1+B2)*C3", "A1/(B1/C1)"] {
            let formula = parse_formula(source).unwrap();
            let reparsed = parse_formula(&formula.expression()).unwrap();
            assert_eq!(formula, reparsed);
        }
    }
}

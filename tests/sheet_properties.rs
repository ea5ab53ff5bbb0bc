//! Integration tests for the sheet's edit protocol through the public API.

use cellgraph::{
    FormulaErrorKind, Position, Sheet, SheetConfig, SheetError, Size, Value, MAX_COLS, MAX_ROWS,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // Set RUST_LOG=cellgraph_core=trace to see edit and invalidation events.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn p(label: &str) -> Position {
    Position::from_label(label)
}

fn number(sheet: &Sheet, label: &str) -> f64 {
    sheet
        .value(p(label))
        .unwrap()
        .as_number()
        .unwrap_or_else(|| panic!("{} is not a number", label))
}

#[test]
fn test_position_round_trip() {
    for row in (0..MAX_ROWS).step_by(997) {
        for col in (0..MAX_COLS).step_by(331) {
            let pos = Position::new(row, col);
            assert_eq!(Position::from_label(&pos.to_string()), pos);
        }
    }
    assert_eq!(Position::NONE.to_string(), "");
}

#[test]
fn test_malformed_labels_are_none() {
    for label in ["a1", "A", "1", "1A", "A1B", "", "A-1", "ZZZZZZ1"] {
        assert_eq!(Position::from_label(label), Position::NONE, "label {:?}", label);
    }
}

#[test]
fn test_simple_formula() {
    init_tracing();
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "5").unwrap();
    sheet.set_cell(p("B1"), "=A1+1").unwrap();
    assert_eq!(sheet.value(p("B1")).unwrap(), Value::Number(6.0));
}

#[test]
fn test_circular_dependency_rejected_without_side_effects() {
    init_tracing();
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "=B1").unwrap();
    let a1_value = sheet.value(p("A1")).unwrap();
    let a1_text = sheet.text(p("A1")).unwrap();
    let b1_value = sheet.value(p("B1")).unwrap();
    let b1_text = sheet.text(p("B1")).unwrap();
    let len = sheet.len();

    let result = sheet.set_cell(p("B1"), "=A1");
    assert!(matches!(result, Err(SheetError::CircularDependency { .. })));

    assert_eq!(sheet.value(p("A1")).unwrap(), a1_value);
    assert_eq!(sheet.text(p("A1")).unwrap(), a1_text);
    assert_eq!(sheet.value(p("B1")).unwrap(), b1_value);
    assert_eq!(sheet.text(p("B1")).unwrap(), b1_text);
    assert_eq!(sheet.len(), len);
}

#[test]
fn test_chain_invalidation() {
    init_tracing();
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "1").unwrap();
    sheet.set_cell(p("B1"), "=A1").unwrap();
    sheet.set_cell(p("C1"), "=B1").unwrap();
    assert_eq!(number(&sheet, "C1"), 1.0);
    assert!(sheet.cell(p("C1")).unwrap().unwrap().has_cached_value());

    sheet.set_cell(p("A1"), "2").unwrap();
    assert!(!sheet.cell(p("C1")).unwrap().unwrap().has_cached_value());
    assert_eq!(number(&sheet, "C1"), 2.0);

    sheet.set_cell(p("A1"), "3").unwrap();
    assert_eq!(number(&sheet, "C1"), 3.0);
}

#[test]
fn test_clear_cell_placeholder_and_collection() {
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "1").unwrap();
    sheet.set_cell(p("B1"), "=A1").unwrap();
    assert_eq!(sheet.len(), 2);

    // Still referenced by B1: stays as a placeholder.
    sheet.clear_cell(p("A1")).unwrap();
    assert_eq!(sheet.len(), 2);
    assert_eq!(sheet.text(p("A1")).unwrap(), "");
    assert_eq!(
        sheet.cell(p("A1")).unwrap().unwrap().dependent_cells(),
        vec![p("B1")]
    );

    // Nothing references B1: removed.
    sheet.clear_cell(p("B1")).unwrap();
    assert!(sheet.cell(p("B1")).unwrap().is_none());
    assert!(sheet.is_empty());
}

#[test]
fn test_printable_size() {
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "a").unwrap();
    sheet.set_cell(p("C3"), "c").unwrap();
    assert_eq!(sheet.printable_size(), Size::new(3, 3));
}

#[test]
fn test_clearing_unreferenced_empty_cell_is_idempotent() {
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "a").unwrap();
    let len = sheet.len();
    let size = sheet.printable_size();

    for _ in 0..3 {
        sheet.clear_cell(p("D4")).unwrap();
        assert_eq!(sheet.len(), len);
        assert_eq!(sheet.printable_size(), size);
    }
}

#[test]
fn test_errors_reported_at_call_site() {
    let mut sheet = Sheet::new();
    assert!(matches!(
        sheet.set_cell(Position::NONE, "x"),
        Err(SheetError::InvalidPosition(_))
    ));
    assert!(matches!(
        sheet.set_cell(p("A1"), "=(1"),
        Err(SheetError::FormulaParse(_))
    ));
    assert!(matches!(
        sheet.set_cell(p("A1"), "=A1000000"),
        Err(SheetError::InvalidReference { .. })
    ));
    assert!(matches!(
        sheet.clear_cell(Position::new(MAX_ROWS, 0)),
        Err(SheetError::InvalidPosition(_))
    ));
    assert!(matches!(sheet.value(Position::NONE), Err(SheetError::InvalidPosition(_))));
    assert!(matches!(sheet.cell(Position::NONE), Err(SheetError::InvalidPosition(_))));
    assert!(sheet.is_empty());
}

#[test]
fn test_evaluation_errors_are_values() {
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "=1/0").unwrap();
    sheet.set_cell(p("A2"), "=A1+1").unwrap();
    sheet.set_cell(p("A3"), "hello").unwrap();
    sheet.set_cell(p("A4"), "=A3*2").unwrap();

    let kind = |label: &str| sheet.value(p(label)).unwrap().as_error().map(|e| e.kind());
    assert_eq!(kind("A1"), Some(FormulaErrorKind::Arithmetic));
    assert_eq!(kind("A2"), Some(FormulaErrorKind::Arithmetic));
    assert_eq!(kind("A4"), Some(FormulaErrorKind::Value));
    assert_eq!(sheet.values_table(), "#ARITHM!\n#ARITHM!\nhello\n#ARITHM!\n");
}

#[test]
fn test_configured_distinct_errors() {
    let config = SheetConfig::from_toml_str("error_style = \"distinct\"").unwrap();
    let mut sheet = Sheet::with_config(config);
    sheet.set_cell(p("A1"), "hello").unwrap();
    sheet.set_cell(p("B1"), "=A1*2").unwrap();
    sheet.set_cell(p("C1"), "=1/0").unwrap();
    assert_eq!(sheet.values_table(), "hello\t#VALUE!\t#ARITHM!\n");
}

#[test]
fn test_formula_text_round_trips_through_edit() {
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "=  (B1 + C1) * (2) ").unwrap();
    let text = sheet.text(p("A1")).unwrap();
    assert_eq!(text, "=(B1+C1)*2");

    sheet.set_cell(p("A2"), &text).unwrap();
    assert_eq!(sheet.text(p("A2")).unwrap(), text);
}

#[test]
fn test_escaped_formula_text() {
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "'=B1").unwrap();
    assert_eq!(sheet.text(p("A1")).unwrap(), "'=B1");
    assert_eq!(sheet.value(p("A1")).unwrap(), Value::Text("=B1".to_string()));
    assert!(sheet.cell(p("A1")).unwrap().unwrap().referenced_cells().is_empty());
    // No placeholder for B1: escaped text references nothing.
    assert_eq!(sheet.len(), 1);
}

#[test]
fn test_rejected_edit_after_reads_keeps_values() {
    let mut sheet = Sheet::new();
    sheet.set_cell(p("A1"), "2").unwrap();
    sheet.set_cell(p("B1"), "=A1*A1").unwrap();
    sheet.set_cell(p("C1"), "=B1+A1").unwrap();
    assert_eq!(number(&sheet, "C1"), 6.0);

    assert!(sheet.set_cell(p("A1"), "=C1").is_err());
    assert_eq!(sheet.text(p("A1")).unwrap(), "2");
    assert_eq!(number(&sheet, "C1"), 6.0);
    assert_eq!(
        sheet.cell(p("A1")).unwrap().unwrap().dependent_cells(),
        vec![p("B1"), p("C1")]
    );
}

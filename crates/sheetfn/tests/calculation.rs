use sheetfn::{BindError, CalcFn, CallArgs, FnDef, FunctionSignature, SheetFnError, SlotBinder};
use sheetfn_common::{CellValue, Datum, RangeAddress};
use sheetfn_testkit::TestWorkbook;
use std::collections::BTreeMap;

fn two_param_fn() -> impl CalcFn {
    FnDef::new(
        "my_func",
        FunctionSignature::builder()
            .param("a")
            .param("b")
            .build()
            .unwrap(),
        |_args| Ok(Datum::empty()),
    )
}

/// B1 and B2 feed B3 = B1 + B2.
fn adder_workbook() -> TestWorkbook {
    let wb = TestWorkbook::new();
    wb.add_formula(3, 2, |grid| {
        CellValue::Number(grid.num(1, 2) + grid.num(2, 2))
    });
    wb
}

#[test]
fn calculation_writes_inputs_and_reads_the_output() {
    let wb = adder_workbook();
    let mut func = SlotBinder::new(wb.cell_slot(3, 2))
        .slot(wb.cell_slot(1, 2))
        .slot(wb.cell_slot(2, 2))
        .wrap(two_param_fn())
        .expect("two slots for two parameters");

    let result = func
        .invoke(CallArgs::new().arg(1.1).arg(2.2))
        .expect("call succeeds");
    assert_eq!(wb.get(1, 2), CellValue::Number(1.1));
    assert_eq!(wb.get(2, 2), CellValue::Number(2.2));
    match result {
        Datum::Cell(CellValue::Number(n)) => assert!((n - 3.3).abs() < 1e-9),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn named_slots_bind_by_parameter_name() {
    let wb = adder_workbook();
    let mut func = SlotBinder::new(wb.cell_slot(3, 2))
        .named_slot("b", wb.cell_slot(2, 2))
        .named_slot("a", wb.cell_slot(1, 2))
        .wrap(two_param_fn())
        .expect("both parameters covered by name");

    func.invoke(CallArgs::new().arg(10i64).arg(20i64)).unwrap();
    assert_eq!(wb.get(1, 2), CellValue::Int(10));
    assert_eq!(wb.get(2, 2), CellValue::Int(20));
}

#[test]
fn slot_count_must_match_the_parameter_list() {
    let wb = TestWorkbook::new();

    let err = SlotBinder::new(wb.cell_slot(3, 2))
        .slot(wb.cell_slot(1, 2))
        .wrap(two_param_fn())
        .err()
        .expect("one slot for two parameters");
    match err {
        SheetFnError::Bind(BindError::MissingArgument { name }) => assert_eq!(name, "b"),
        other => panic!("unexpected error: {other:?}"),
    }

    let err = SlotBinder::new(wb.cell_slot(3, 2))
        .slot(wb.cell_slot(1, 2))
        .slot(wb.cell_slot(2, 2))
        .slot(wb.cell_slot(4, 2))
        .wrap(two_param_fn())
        .err()
        .expect("three slots for two parameters");
    match err {
        SheetFnError::Bind(BindError::TooManyPositional { expected, got }) => {
            assert_eq!((expected, got), (2, 3));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn variadic_signatures_are_rejected_regardless_of_slot_count() {
    let wb = TestWorkbook::new();
    let variadic = FnDef::new(
        "collect",
        FunctionSignature::builder()
            .param("a")
            .rest("rest")
            .build()
            .unwrap(),
        |_args| Ok(Datum::empty()),
    );

    let err = SlotBinder::new(wb.cell_slot(3, 2))
        .slot(wb.cell_slot(1, 2))
        .slot(wb.cell_slot(2, 2))
        .wrap(variadic)
        .err()
        .expect("variadic parameter is not bindable to slots");
    match err {
        SheetFnError::SignatureMismatch { param } => assert_eq!(param, "rest"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn scalar_round_trips_through_a_single_cell() {
    let wb = TestWorkbook::new();
    let mut func = SlotBinder::new(wb.cell_slot(1, 1))
        .slot(wb.cell_slot(1, 1))
        .wrap(FnDef::new(
            "echo",
            FunctionSignature::builder().param("a").build().unwrap(),
            |_args| Ok(Datum::empty()),
        ))
        .unwrap();

    let result = func.invoke(CallArgs::new().arg("hello")).unwrap();
    assert_eq!(result, Datum::from("hello"));
}

#[test]
fn list_arguments_follow_the_slot_orientation() {
    let wb = TestWorkbook::new();
    let column = wb.slot(RangeAddress::new("Sheet1", 1, 1, 3, 1).unwrap());
    let row = wb.slot(RangeAddress::new("Sheet1", 5, 1, 5, 3).unwrap());
    let out = wb.cell_slot(9, 9);

    let sig = FunctionSignature::builder()
        .param("col")
        .param("row")
        .build()
        .unwrap();
    let mut func = SlotBinder::new(out)
        .slot(column)
        .slot(row)
        .wrap(FnDef::new("orient", sig, |_args| Ok(Datum::empty())))
        .unwrap();

    let values = Datum::List(vec![1.into(), 2.into(), 3.into()]);
    func.invoke(
        CallArgs::new()
            .arg(values.clone())
            .arg(values.clone()),
    )
    .unwrap();

    // one element per row, top to bottom
    assert_eq!(wb.get(1, 1), CellValue::Int(1));
    assert_eq!(wb.get(2, 1), CellValue::Int(2));
    assert_eq!(wb.get(3, 1), CellValue::Int(3));
    // one row, left to right
    assert_eq!(wb.get(5, 1), CellValue::Int(1));
    assert_eq!(wb.get(5, 2), CellValue::Int(2));
    assert_eq!(wb.get(5, 3), CellValue::Int(3));
}

#[test]
fn multi_element_argument_cannot_target_a_single_cell() {
    let wb = TestWorkbook::new();
    let mut func = SlotBinder::new(wb.cell_slot(9, 9))
        .slot(wb.cell_slot(1, 1))
        .wrap(FnDef::new(
            "single",
            FunctionSignature::builder().param("a").build().unwrap(),
            |_args| Ok(Datum::empty()),
        ))
        .unwrap();

    let err = func
        .invoke(CallArgs::new().arg(Datum::List(vec![1.into(), 2.into()])))
        .unwrap_err();
    match err {
        SheetFnError::ShapeMismatch { address, .. } => assert_eq!(address, "Sheet1!A1"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn two_dimensional_slots_take_rows_of_cells_only() {
    let wb = TestWorkbook::new();
    let grid_range = || wb.slot(RangeAddress::new("Sheet1", 1, 1, 2, 2).unwrap());
    let sig = || FunctionSignature::builder().param("a").build().unwrap();

    let mut func = SlotBinder::new(wb.cell_slot(9, 9))
        .slot(grid_range())
        .wrap(FnDef::new("grid", sig(), |_args| Ok(Datum::empty())))
        .unwrap();

    // rows of strings are not rows of cells
    let err = func
        .invoke(CallArgs::new().arg(Datum::List(vec!["ab".into(), "cd".into()])))
        .unwrap_err();
    assert!(matches!(err, SheetFnError::ShapeMismatch { .. }));

    // neither are rows of mappings
    let map_row = Datum::Map(BTreeMap::from([("k".to_string(), Datum::from(1))]));
    let err = func
        .invoke(CallArgs::new().arg(Datum::List(vec![map_row.clone(), map_row])))
        .unwrap_err();
    assert!(matches!(err, SheetFnError::ShapeMismatch { .. }));

    // actual rows land row-major
    func.invoke(CallArgs::new().arg(Datum::rows(vec![
        vec![1.into(), 2.into()],
        vec![3.into(), 4.into()],
    ])))
    .unwrap();
    assert_eq!(wb.get(1, 1), CellValue::Int(1));
    assert_eq!(wb.get(1, 2), CellValue::Int(2));
    assert_eq!(wb.get(2, 1), CellValue::Int(3));
    assert_eq!(wb.get(2, 2), CellValue::Int(4));
}

#[test]
fn omitted_defaulted_argument_keeps_the_slot_contents() {
    let wb = TestWorkbook::new().with_cell(2, 2, 42i64);
    let sig = FunctionSignature::builder()
        .param("a")
        .param_with_default("b", 0)
        .build()
        .unwrap();
    let mut func = SlotBinder::new(wb.cell_slot(3, 2))
        .slot(wb.cell_slot(1, 2))
        .slot(wb.cell_slot(2, 2))
        .wrap(FnDef::new("keep", sig, |_args| Ok(Datum::empty())))
        .unwrap();

    func.invoke(CallArgs::new().arg(7i64)).unwrap();
    assert_eq!(wb.get(1, 2), CellValue::Int(7));
    // whatever was last in the workbook stays there
    assert_eq!(wb.get(2, 2), CellValue::Int(42));
}

#[test]
fn shape_mismatch_midway_leaves_earlier_writes_in_place() {
    let wb = TestWorkbook::new();
    let sig = FunctionSignature::builder()
        .param("a")
        .param("b")
        .build()
        .unwrap();
    let mut func = SlotBinder::new(wb.cell_slot(9, 9))
        .slot(wb.cell_slot(1, 2))
        .slot(wb.cell_slot(2, 2))
        .wrap(FnDef::new("partial", sig, |_args| Ok(Datum::empty())))
        .unwrap();

    let err = func
        .invoke(
            CallArgs::new()
                .arg(5i64)
                .arg(Datum::List(vec![1.into(), 2.into()])),
        )
        .unwrap_err();
    assert!(matches!(err, SheetFnError::ShapeMismatch { .. }));
    // the first slot was already written when the second failed
    assert_eq!(wb.get(1, 2), CellValue::Int(5));
}

#[test]
fn binding_failures_match_a_direct_call() {
    let wb = adder_workbook();
    let mut func = SlotBinder::new(wb.cell_slot(3, 2))
        .slot(wb.cell_slot(1, 2))
        .slot(wb.cell_slot(2, 2))
        .wrap(two_param_fn())
        .unwrap();

    let err = func
        .invoke(CallArgs::new().arg(1i64).named_arg("c", 2i64))
        .unwrap_err();
    match err {
        SheetFnError::Bind(BindError::UnexpectedKeyword { name }) => assert_eq!(name, "c"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn the_calculation_is_exposed_for_introspection() {
    let wb = adder_workbook();
    let func = SlotBinder::new(wb.cell_slot(3, 2))
        .slot(wb.cell_slot(1, 2))
        .slot(wb.cell_slot(2, 2))
        .wrap(two_param_fn())
        .unwrap();

    let calc = func.calculation();
    assert_eq!(calc.output().address(), "Sheet1!B3");
    assert_eq!(calc.input(0).unwrap().address(), "Sheet1!B1");
    assert_eq!(calc.input_by_name("b").unwrap().address(), "Sheet1!B2");
    assert_eq!(func.name(), "my_func");
}

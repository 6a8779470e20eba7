//! Lightweight in-memory workbook for exercising the sheetfn binding layer
//! without a spreadsheet application.
//!
//! A [`TestWorkbook`] is a single grid of 1-based `(row, col)` cells. It
//! hands out [`CellSlot`] range handles implementing [`SlotRange`], and
//! recomputes registered formulas before every slot read — a deterministic
//! stand-in for the application's recalculation between the write phase and
//! the read phase.

use sheetfn::{SheetFnError, SlotRange, SlotShape};
use sheetfn_common::{CellValue, Datum, RangeAddress};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type CellKey = (u32, u32); // 1-based (row, col)

/// Read-only view of the grid handed to formula closures.
pub struct CellReader<'a> {
    cells: &'a HashMap<CellKey, CellValue>,
}

impl CellReader<'_> {
    pub fn get(&self, row: u32, col: u32) -> CellValue {
        self.cells.get(&(row, col)).cloned().unwrap_or(CellValue::Empty)
    }

    /// Numeric view of a cell, `0.0` for anything non-numeric.
    pub fn num(&self, row: u32, col: u32) -> f64 {
        self.get(row, col).as_f64().unwrap_or(0.0)
    }
}

type Formula = Box<dyn Fn(&CellReader<'_>) -> CellValue>;

#[derive(Default)]
struct Grid {
    cells: HashMap<CellKey, CellValue>,
    formulas: Vec<(CellKey, Formula)>,
}

impl Grid {
    /// Evaluate formulas in registration order; each result is written back
    /// before the next formula runs, so later formulas observe earlier ones.
    fn recalc(&mut self) {
        for i in 0..self.formulas.len() {
            let (key, result) = {
                let (key, formula) = &self.formulas[i];
                (*key, formula(&CellReader { cells: &self.cells }))
            };
            self.cells.insert(key, result);
        }
    }
}

/// The in-memory backend. Cheap to clone; clones share the same grid.
#[derive(Default, Clone)]
pub struct TestWorkbook {
    grid: Rc<RefCell<Grid>>,
}

impl TestWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.grid.borrow_mut().cells.insert((row, col), value.into());
    }

    /// Raw cell read; does not trigger recalculation.
    pub fn get(&self, row: u32, col: u32) -> CellValue {
        self.grid
            .borrow()
            .cells
            .get(&(row, col))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }

    pub fn with_cell(self, row: u32, col: u32, value: impl Into<CellValue>) -> Self {
        self.set(row, col, value);
        self
    }

    /// Register a derived cell, recomputed from the grid before every slot
    /// read.
    pub fn add_formula(
        &self,
        row: u32,
        col: u32,
        formula: impl Fn(&CellReader<'_>) -> CellValue + 'static,
    ) {
        self.grid
            .borrow_mut()
            .formulas
            .push(((row, col), Box::new(formula)));
    }

    /// A range handle over this grid. The sheet name in `range` is carried
    /// for diagnostics only; the grid itself is a single sheet.
    pub fn slot(&self, range: RangeAddress) -> CellSlot {
        CellSlot {
            grid: Rc::clone(&self.grid),
            range,
        }
    }

    /// A single-cell handle on the default sheet name.
    pub fn cell_slot(&self, row: u32, col: u32) -> CellSlot {
        self.slot(RangeAddress::cell("Sheet1", row, col).expect("1-based cell"))
    }
}

/// A rectangular range handle into a [`TestWorkbook`].
///
/// Write policy: a scalar broadcasts to the whole range; a flat list is one
/// row; nested lists are row-major rows. Payloads that overflow the range,
/// and mapping payloads, are reported as backend errors.
pub struct CellSlot {
    grid: Rc<RefCell<Grid>>,
    range: RangeAddress,
}

impl CellSlot {
    fn backend_err(&self, message: impl Into<String>) -> SheetFnError {
        SheetFnError::Slot {
            address: self.address(),
            message: message.into(),
        }
    }

    fn write_row(
        &self,
        cells: &mut HashMap<CellKey, CellValue>,
        row: u32,
        items: &[Datum],
    ) -> Result<(), SheetFnError> {
        if items.len() as u32 > self.range.width() {
            return Err(self.backend_err(format!(
                "row of {} values does not fit in {} columns",
                items.len(),
                self.range.width()
            )));
        }
        for (offset, item) in items.iter().enumerate() {
            let Datum::Cell(value) = item else {
                return Err(self.backend_err(format!(
                    "nested {} cannot be stored in a single cell",
                    item.kind_name()
                )));
            };
            cells.insert(
                (row, self.range.start_col + offset as u32),
                value.clone(),
            );
        }
        Ok(())
    }
}

impl SlotRange for CellSlot {
    fn shape(&self) -> SlotShape {
        SlotShape::new(self.range.height() as usize, self.range.width() as usize)
    }

    fn value(&self) -> Result<Datum, SheetFnError> {
        let mut grid = self.grid.borrow_mut();
        grid.recalc();
        if self.range.is_single_cell() {
            let value = grid
                .cells
                .get(&(self.range.start_row, self.range.start_col))
                .cloned()
                .unwrap_or(CellValue::Empty);
            return Ok(Datum::Cell(value));
        }
        let rows = (self.range.start_row..=self.range.end_row)
            .map(|row| {
                (self.range.start_col..=self.range.end_col)
                    .map(|col| {
                        Datum::Cell(
                            grid.cells.get(&(row, col)).cloned().unwrap_or(CellValue::Empty),
                        )
                    })
                    .collect()
            })
            .collect();
        Ok(Datum::rows(rows))
    }

    fn set_value(&mut self, value: Datum) -> Result<(), SheetFnError> {
        let mut grid = self.grid.borrow_mut();
        let cells = &mut grid.cells;
        match value {
            Datum::Cell(scalar) => {
                for row in self.range.start_row..=self.range.end_row {
                    for col in self.range.start_col..=self.range.end_col {
                        cells.insert((row, col), scalar.clone());
                    }
                }
                Ok(())
            }
            Datum::List(items) if items.iter().all(|i| matches!(i, Datum::List(_))) => {
                if items.len() as u32 > self.range.height() {
                    return Err(self.backend_err(format!(
                        "{} rows do not fit in {} rows",
                        items.len(),
                        self.range.height()
                    )));
                }
                for (offset, row) in items.iter().enumerate() {
                    let Datum::List(row_items) = row else { unreachable!() };
                    self.write_row(cells, self.range.start_row + offset as u32, row_items)?;
                }
                Ok(())
            }
            Datum::List(items) => self.write_row(cells, self.range.start_row, &items),
            Datum::Map(_) => Err(self.backend_err("mapping payloads are not supported")),
        }
    }

    fn address(&self) -> String {
        self.range.to_string()
    }
}

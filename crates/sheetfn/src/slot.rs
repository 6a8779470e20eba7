use crate::error::SheetFnError;
use sheetfn_common::Datum;
use std::fmt::{self, Display};

/// Reported extent of a range: rows by columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotShape {
    pub rows: usize,
    pub cols: usize,
}

impl SlotShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    pub fn is_single_cell(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }

    /// A zero extent in either dimension; such a handle cannot hold values.
    pub fn is_degenerate(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

impl Display for SlotShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Capability interface for an externally backed, addressable, shaped range.
///
/// Implementations are *handles* into a backend that owns the data — a
/// spreadsheet application, an in-memory grid, anything that can read and
/// write a rectangle of cells. The binding layer holds these handles but
/// never manages the backing document itself.
pub trait SlotRange {
    /// Current extent of the range.
    fn shape(&self) -> SlotShape;

    /// Current contents: a scalar for a single cell, row-major rows
    /// otherwise.
    fn value(&self) -> Result<Datum, SheetFnError>;

    /// Write a scalar or row-major rows into the range. How a scalar fills a
    /// multi-cell range is the backend's policy.
    fn set_value(&mut self, value: Datum) -> Result<(), SheetFnError>;

    /// Human-readable locator, used in diagnostics only.
    fn address(&self) -> String;
}

/// Shape probe shared by construction-time validation and the pre-write pass.
pub(crate) fn probe_shape(slot: &dyn SlotRange) -> Result<SlotShape, SheetFnError> {
    let shape = slot.shape();
    if shape.is_degenerate() {
        return Err(SheetFnError::InvalidSlotShape {
            address: slot.address(),
            rows: shape.rows,
            cols: shape.cols,
        });
    }
    Ok(shape)
}

//! The slot binder: ties a fixed parameter list to workbook ranges and
//! drives write-then-read cycles against them.

use crate::error::{BindError, SheetFnError};
use crate::signature::{BoundValue, FunctionSignature};
use crate::slot::{SlotRange, SlotShape, probe_shape};
use crate::wrap::CallArgs;
use sheetfn_common::Datum;
use std::collections::BTreeMap;

/// A function's parameters bound one-to-one to input ranges, plus the single
/// output range the result is read from.
///
/// Built once when a function is wrapped and immutable for the wrapper's
/// lifetime: every call reuses the same handles, only their `value` moves.
pub struct Calculation {
    signature: FunctionSignature,
    output: Box<dyn SlotRange>,
    inputs: Vec<Box<dyn SlotRange>>,
}

impl std::fmt::Debug for Calculation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calculation")
            .field("signature", &self.signature)
            .field("output", &self.output.address())
            .field(
                "inputs",
                &self.inputs.iter().map(|s| s.address()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Calculation {
    /// Bind `slots`/`named_slots` against `signature` exactly as a direct
    /// call would bind arguments. Every declared parameter must receive
    /// exactly one range — parameters with defaults included. Signatures
    /// declaring a variadic parameter are rejected outright: a slot-backed
    /// calculation needs a fixed, fully named parameter list.
    ///
    /// Slot values are not touched here; only shapes are probed.
    pub fn new(
        signature: FunctionSignature,
        output: Box<dyn SlotRange>,
        slots: Vec<Box<dyn SlotRange>>,
        named_slots: BTreeMap<String, Box<dyn SlotRange>>,
    ) -> Result<Self, SheetFnError> {
        if let Some(param) = signature.variadic() {
            return Err(SheetFnError::SignatureMismatch {
                param: param.name().to_string(),
            });
        }

        probe_shape(output.as_ref())?;

        let params = signature.params();
        if slots.len() > params.len() {
            return Err(BindError::TooManyPositional {
                expected: params.len(),
                got: slots.len(),
            }
            .into());
        }

        let mut by_index: Vec<Option<Box<dyn SlotRange>>> =
            params.iter().map(|_| None).collect();
        for (idx, slot) in slots.into_iter().enumerate() {
            by_index[idx] = Some(slot);
        }
        for (name, slot) in named_slots {
            let Some(idx) = signature.index_of(&name) else {
                return Err(BindError::UnexpectedKeyword { name }.into());
            };
            if by_index[idx].is_some() {
                return Err(BindError::DuplicateArgument { name }.into());
            }
            by_index[idx] = Some(slot);
        }

        let mut inputs = Vec::with_capacity(params.len());
        for (param, slot) in params.iter().zip(by_index) {
            let slot = slot.ok_or_else(|| BindError::MissingArgument {
                name: param.name().to_string(),
            })?;
            probe_shape(slot.as_ref())?;
            inputs.push(slot);
        }

        Ok(Self {
            signature,
            output,
            inputs,
        })
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// The input range bound to the parameter at `index`, declaration order.
    pub fn input(&self, index: usize) -> Option<&dyn SlotRange> {
        self.inputs.get(index).map(|s| s.as_ref())
    }

    /// The input range bound to the named parameter.
    pub fn input_by_name(&self, name: &str) -> Option<&dyn SlotRange> {
        self.signature.index_of(name).and_then(|idx| self.input(idx))
    }

    pub fn output(&self) -> &dyn SlotRange {
        self.output.as_ref()
    }

    /// Write the call arguments into their bound input ranges.
    ///
    /// Arguments bind against the signature as in a direct call; defaults are
    /// *not* substituted, so a parameter the caller omitted keeps whatever its
    /// range already holds. All target shapes are probed before the first
    /// write; shape conflicts discovered while writing leave earlier writes in
    /// place (no rollback).
    pub fn apply(&mut self, args: CallArgs) -> Result<(), SheetFnError> {
        let bound = self.signature.bind(args.positional, args.named)?;

        let mut shapes: Vec<Option<SlotShape>> = Vec::with_capacity(self.inputs.len());
        for (idx, slot) in self.inputs.iter().enumerate() {
            shapes.push(if bound.is_bound(idx) {
                Some(probe_shape(slot.as_ref())?)
            } else {
                None
            });
        }

        for (idx, slot) in self.inputs.iter_mut().enumerate() {
            let Some(BoundValue::One(value)) = bound.get(idx) else {
                continue;
            };
            let shape = shapes[idx].expect("probed above");
            let payload = fit_to_shape(value, shape, &slot.address())?;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                param = self.signature.params()[idx].name(),
                address = %slot.address(),
                %shape,
                "write input"
            );
            slot.set_value(payload)?;
        }
        Ok(())
    }

    /// The output range's current contents, exactly as the backend reports
    /// them.
    pub fn retrieve(&self) -> Result<Datum, SheetFnError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(address = %self.output.address(), "read output");
        self.output.value()
    }

    /// `apply` then `retrieve`, non-atomically. Between the last write and
    /// the read, the backend is expected to have recomputed.
    pub fn call(&mut self, args: CallArgs) -> Result<Datum, SheetFnError> {
        self.apply(args)?;
        self.retrieve()
    }
}

/// Orient an argument to its target shape.
///
/// Scalars pass through untouched whatever the shape. A list becomes a
/// column for an n×1 range, a single row for a 1×n range, and must already
/// be a list of row-lists for an n×m range. Mappings have no cell order and
/// are never writable.
fn fit_to_shape(value: &Datum, shape: SlotShape, address: &str) -> Result<Datum, SheetFnError> {
    if !value.is_collection() {
        return Ok(value.clone());
    }
    if shape.is_single_cell() {
        return Err(SheetFnError::ShapeMismatch {
            address: address.to_string(),
            reason: format!(
                "a {} holds multiple values and cannot be written to a single cell",
                value.kind_name()
            ),
        });
    }
    let Datum::List(items) = value else {
        return Err(SheetFnError::ShapeMismatch {
            address: address.to_string(),
            reason: "a mapping has no cell order and cannot be written to a range".to_string(),
        });
    };
    if shape.cols == 1 {
        // one element per row, top to bottom
        Ok(Datum::List(
            items
                .iter()
                .map(|item| Datum::List(vec![item.clone()]))
                .collect(),
        ))
    } else if shape.rows == 1 {
        // a single row, left to right
        Ok(Datum::List(items.clone()))
    } else {
        let mut rows = Vec::with_capacity(items.len());
        for row in items {
            match row {
                Datum::List(cells) => rows.push(Datum::List(cells.clone())),
                other => {
                    return Err(SheetFnError::ShapeMismatch {
                        address: address.to_string(),
                        reason: format!(
                            "the {shape} range takes rows of cells, not {} elements",
                            other.kind_name()
                        ),
                    });
                }
            }
        }
        Ok(Datum::List(rows))
    }
}

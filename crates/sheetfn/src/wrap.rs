//! The wrapping surface: the `CalcFn` seam, the plain-function leaf, and the
//! two independent wrapper factories.
//!
//! Both wrappers forward the wrapped function's `name` and `signature`, so an
//! adapter wrapper around a slot-bound wrapper (or the reverse) always binds
//! against the innermost declared signature rather than an opaque
//! pass-through.

use crate::adapter::{Adapter, AdapterSet};
use crate::calculation::Calculation;
use crate::error::SheetFnError;
use crate::signature::FunctionSignature;
use crate::slot::SlotRange;
use sheetfn_common::Datum;
use std::collections::BTreeMap;

/// Call arguments: positionals in order, plus named arguments.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub positional: Vec<Datum>,
    pub named: BTreeMap<String, Datum>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Datum>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn named_arg(mut self, name: impl Into<String>, value: impl Into<Datum>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }
}

/// A callable with an introspectable signature.
///
/// Calls take `&mut self`: a slot-bound wrapper mutates external range state,
/// and serializing calls through a unique borrow is exactly the concurrency
/// contract of this crate.
pub trait CalcFn {
    fn name(&self) -> &str;
    fn signature(&self) -> &FunctionSignature;
    fn invoke(&mut self, args: CallArgs) -> Result<Datum, SheetFnError>;
}

/// A plain function: a name, a declared signature, and a body closure.
///
/// The body receives the raw call arguments; binding them is the wrappers'
/// concern. For slot-bound use the body is typically empty — the workbook is
/// the computation.
pub struct FnDef<B> {
    name: String,
    signature: FunctionSignature,
    body: B,
}

impl<B> FnDef<B>
where
    B: FnMut(CallArgs) -> Result<Datum, SheetFnError>,
{
    pub fn new(name: impl Into<String>, signature: FunctionSignature, body: B) -> Self {
        Self {
            name: name.into(),
            signature,
            body,
        }
    }
}

impl<B> CalcFn for FnDef<B>
where
    B: FnMut(CallArgs) -> Result<Datum, SheetFnError>,
{
    fn name(&self) -> &str {
        &self.name
    }
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }
    fn invoke(&mut self, args: CallArgs) -> Result<Datum, SheetFnError> {
        (self.body)(args)
    }
}

/// A function wrapped to delegate to a slot-bound [`Calculation`]. The inner
/// body is never called; calls write the arguments into the bound input
/// ranges and read the result back from the output range.
pub struct SlotBound<F> {
    inner: F,
    calculation: Calculation,
}

impl<F: CalcFn> SlotBound<F> {
    /// The underlying calculation, for introspection and tests.
    pub fn calculation(&self) -> &Calculation {
        &self.calculation
    }

    pub fn calculation_mut(&mut self) -> &mut Calculation {
        &mut self.calculation
    }

    pub fn into_parts(self) -> (F, Calculation) {
        (self.inner, self.calculation)
    }
}

impl<F: CalcFn> CalcFn for SlotBound<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }
    fn signature(&self) -> &FunctionSignature {
        self.inner.signature()
    }
    fn invoke(&mut self, args: CallArgs) -> Result<Datum, SheetFnError> {
        self.calculation.call(args)
    }
}

/// Factory for [`SlotBound`]: one output range, then input ranges given
/// positionally or by parameter name, exactly as a call would pass them.
pub struct SlotBinder {
    output: Box<dyn SlotRange>,
    positional: Vec<Box<dyn SlotRange>>,
    named: BTreeMap<String, Box<dyn SlotRange>>,
}

impl SlotBinder {
    pub fn new(output: impl SlotRange + 'static) -> Self {
        Self {
            output: Box::new(output),
            positional: Vec::new(),
            named: BTreeMap::new(),
        }
    }

    /// Bind the next parameter, in declaration order.
    pub fn slot(mut self, slot: impl SlotRange + 'static) -> Self {
        self.positional.push(Box::new(slot));
        self
    }

    /// Bind a parameter by name.
    pub fn named_slot(mut self, name: impl Into<String>, slot: impl SlotRange + 'static) -> Self {
        self.named.insert(name.into(), Box::new(slot));
        self
    }

    /// Validate the slots against `func`'s signature and wrap it.
    pub fn wrap<F: CalcFn>(self, func: F) -> Result<SlotBound<F>, SheetFnError> {
        let calculation = Calculation::new(
            func.signature().clone(),
            self.output,
            self.positional,
            self.named,
        )?;
        Ok(SlotBound {
            inner: func,
            calculation,
        })
    }
}

/// A function wrapped in an [`AdapterSet`] pipeline.
pub struct Adapted<F> {
    inner: F,
    adapters: AdapterSet,
}

impl<F: CalcFn> Adapted<F> {
    pub fn adapter_set(&self) -> &AdapterSet {
        &self.adapters
    }

    pub fn into_parts(self) -> (F, AdapterSet) {
        (self.inner, self.adapters)
    }
}

impl<F: CalcFn> CalcFn for Adapted<F> {
    fn name(&self) -> &str {
        self.inner.name()
    }
    fn signature(&self) -> &FunctionSignature {
        self.inner.signature()
    }
    fn invoke(&mut self, args: CallArgs) -> Result<Datum, SheetFnError> {
        self.adapters.invoke(&mut self.inner, args)
    }
}

/// Factory for [`Adapted`]: an optional result adapter, then per-parameter
/// adapters given positionally or by parameter name. Unnamed, unfilled
/// parameters keep their values untouched.
#[derive(Default)]
pub struct Adapters {
    output: Option<Adapter>,
    positional: Vec<Adapter>,
    named: BTreeMap<String, Adapter>,
}

impl Adapters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform applied to the wrapped function's result.
    pub fn output(mut self, f: impl Fn(Datum) -> Datum + 'static) -> Self {
        self.output = Some(Box::new(f));
        self
    }

    /// Adapter for the next parameter, in declaration order.
    pub fn adapter(mut self, f: impl Fn(Datum) -> Datum + 'static) -> Self {
        self.positional.push(Box::new(f));
        self
    }

    /// Adapter for a parameter by name.
    pub fn named_adapter(
        mut self,
        name: impl Into<String>,
        f: impl Fn(Datum) -> Datum + 'static,
    ) -> Self {
        self.named.insert(name.into(), Box::new(f));
        self
    }

    /// Merge the adapters against `func`'s signature and wrap it.
    pub fn wrap<F: CalcFn>(self, func: F) -> Result<Adapted<F>, SheetFnError> {
        let adapters = AdapterSet::new(
            func.signature().clone(),
            func.name(),
            self.output,
            self.positional,
            self.named,
        )?;
        Ok(Adapted {
            inner: func,
            adapters,
        })
    }
}

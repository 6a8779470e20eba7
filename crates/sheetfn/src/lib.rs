//! Call spreadsheet-resident calculations as ordinary functions.
//!
//! Two independent wrapping layers around an introspectable callable:
//!
//! - [`SlotBinder`] ties each declared parameter to an input range of an
//!   external workbook backend and designates one output range. Calling the
//!   wrapped function writes the arguments into the input ranges, lets the
//!   backend recompute, and reads the result back.
//! - [`Adapters`] composes per-parameter and per-result value transforms
//!   around any callable, variadic parameters included.
//!
//! Both wrappers implement [`CalcFn`] and forward the wrapped function's
//! declared signature, so they stack in either order. The workbook itself is
//! reached only through the [`SlotRange`] capability trait; this crate never
//! opens, saves, or manages the backing document.

mod adapter;
mod calculation;
mod error;
mod signature;
mod slot;
mod wrap;

pub use adapter::{Adapter, AdapterSet, identity};
pub use calculation::Calculation;
pub use error::{BindError, SheetFnError, SignatureError};
pub use signature::{
    BoundArguments, BoundValue, FunctionSignature, Param, ParamKind, SignatureBuilder,
};
pub use slot::{SlotRange, SlotShape};
pub use wrap::{Adapted, Adapters, CalcFn, CallArgs, FnDef, SlotBinder, SlotBound};

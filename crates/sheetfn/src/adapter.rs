//! Per-parameter and per-result value transforms composed around a call.

use crate::error::SheetFnError;
use crate::signature::{BoundValue, FunctionSignature};
use crate::wrap::{CalcFn, CallArgs};
use sheetfn_common::Datum;
use std::collections::BTreeMap;

/// A single value transform.
pub type Adapter = Box<dyn Fn(Datum) -> Datum>;

/// The default transform for anything left unspecified.
pub fn identity() -> Adapter {
    Box::new(|value| value)
}

/// One adapter per declared parameter plus one for the result, merged and
/// frozen at construction. Adapters on variadic parameters are applied
/// element-wise to each collected extra at call time.
pub struct AdapterSet {
    signature: FunctionSignature,
    params: Vec<Adapter>,
    output: Adapter,
}

impl AdapterSet {
    /// Merge the supplied adapters against the declared parameter list:
    /// positional adapters fill parameters left to right (a variadic
    /// parameter consumes exactly one), named adapters fill by parameter
    /// name, and anything unfilled defaults to identity. Any way the merge
    /// can fail to cover the list exactly is an `AdapterCountMismatch`.
    pub fn new(
        signature: FunctionSignature,
        function: &str,
        output: Option<Adapter>,
        positional: Vec<Adapter>,
        named: BTreeMap<String, Adapter>,
    ) -> Result<Self, SheetFnError> {
        let declared = signature.len();
        let supplied = positional.len() + named.len();
        let mismatch = |reason: String| SheetFnError::AdapterCountMismatch {
            function: function.to_string(),
            params: declared,
            adapters: supplied,
            reason,
        };

        if positional.len() > declared {
            return Err(mismatch(
                "more positional adapters than declared parameters".to_string(),
            ));
        }

        let mut merged: Vec<Option<Adapter>> = signature.params().iter().map(|_| None).collect();
        for (idx, adapter) in positional.into_iter().enumerate() {
            merged[idx] = Some(adapter);
        }
        for (name, adapter) in named {
            let Some(idx) = signature.index_of(&name) else {
                return Err(mismatch(format!("no parameter is named `{name}`")));
            };
            if merged[idx].is_some() {
                return Err(mismatch(format!("parameter `{name}` is covered twice")));
            }
            merged[idx] = Some(adapter);
        }

        let params = merged
            .into_iter()
            .map(|slot| slot.unwrap_or_else(identity))
            .collect();

        Ok(Self {
            signature,
            params,
            output: output.unwrap_or_else(identity),
        })
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// Bind, default, transform each bound value in parameter order, call the
    /// inner function with the transformed arguments, and transform its
    /// result. The inner function's raw result never reaches the caller.
    pub fn invoke<F: CalcFn + ?Sized>(
        &self,
        inner: &mut F,
        args: CallArgs,
    ) -> Result<Datum, SheetFnError> {
        let mut bound = self.signature.bind(args.positional, args.named)?;
        bound.apply_defaults(&self.signature);

        for (idx, adapter) in self.params.iter().enumerate() {
            bound.transform(idx, |value| apply_adapter(adapter, value));
        }

        let (positional, named) = bound.into_call_args(&self.signature);
        let result = inner.invoke(CallArgs { positional, named })?;
        Ok((self.output)(result))
    }
}

/// Element-wise lifting over the extras a variadic parameter collected;
/// plain application otherwise.
fn apply_adapter(adapter: &Adapter, value: BoundValue) -> BoundValue {
    match value {
        BoundValue::One(v) => BoundValue::One(adapter(v)),
        BoundValue::Rest(values) => {
            BoundValue::Rest(values.into_iter().map(|v| adapter(v)).collect())
        }
        BoundValue::RestMap(map) => {
            BoundValue::RestMap(map.into_iter().map(|(k, v)| (k, adapter(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{Param, ParamKind};

    #[test]
    fn variadic_adapters_lift_element_wise() {
        let sig = FunctionSignature::new(vec![
            Param::required("a"),
            Param::new("rest", ParamKind::Rest, None),
            Param::new("kw", ParamKind::RestMap, None),
        ])
        .unwrap();

        let double: Adapter = Box::new(|v| match v {
            Datum::Cell(sheetfn_common::CellValue::Int(i)) => Datum::from(i * 2),
            other => other,
        });
        let mut bound = sig
            .bind(
                vec![Datum::from(1), Datum::from(2), Datum::from(3)],
                [("x".to_string(), Datum::from(4))].into(),
            )
            .unwrap();
        bound.transform(1, |v| apply_adapter(&double, v));
        bound.transform(2, |v| apply_adapter(&double, v));

        assert_eq!(
            bound.get(1),
            Some(&BoundValue::Rest(vec![Datum::from(4), Datum::from(6)]))
        );
        assert_eq!(
            bound.get(2),
            Some(&BoundValue::RestMap(
                [("x".to_string(), Datum::from(8))].into()
            ))
        );
    }
}

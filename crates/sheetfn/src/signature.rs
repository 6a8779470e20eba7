//! Explicit function signatures and argument binding.
//!
//! Rust has no runtime introspection of `fn` items, so a wrappable function
//! carries its parameter list as a value: a [`FunctionSignature`] built once,
//! validated, and immutable thereafter. [`FunctionSignature::bind`] routes
//! call arguments to parameters with the same semantics a direct call would
//! have, including variadic collection.

use crate::error::{BindError, SignatureError};
use sheetfn_common::Datum;
use std::collections::BTreeMap;

/// How a parameter accepts arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A plain named parameter, bindable positionally or by name.
    Ordinary,
    /// Collects the extra positional arguments.
    Rest,
    /// Collects the extra named arguments.
    RestMap,
}

/// One declared parameter: name, kind, and an optional default value.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    kind: ParamKind,
    default: Option<Datum>,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamKind, default: Option<Datum>) -> Self {
        Self {
            name: name.into(),
            kind,
            default,
        }
    }

    /// An ordinary parameter without a default.
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Ordinary, None)
    }

    /// An ordinary parameter with a default value.
    pub fn with_default(name: impl Into<String>, default: impl Into<Datum>) -> Self {
        Self::new(name, ParamKind::Ordinary, Some(default.into()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> ParamKind {
        self.kind
    }
    pub fn default(&self) -> Option<&Datum> {
        self.default.as_ref()
    }
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
    pub fn is_variadic(&self) -> bool {
        matches!(self.kind, ParamKind::Rest | ParamKind::RestMap)
    }
}

/// The ordered, validated parameter list of a function. Derived once per
/// function and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    params: Vec<Param>,
}

impl FunctionSignature {
    /// Validate a parameter list: unique names, at most one `Rest` and one
    /// `RestMap`, `RestMap` last, no plain parameter after `Rest`, required
    /// parameters before defaulted ones, no defaults on variadics.
    pub fn new(params: Vec<Param>) -> Result<Self, SignatureError> {
        let mut rest: Option<&str> = None;
        let mut rest_map: Option<&str> = None;
        let mut defaulted: Option<&str> = None;
        for (idx, param) in params.iter().enumerate() {
            if params[..idx].iter().any(|p| p.name == param.name) {
                return Err(SignatureError::DuplicateParam {
                    name: param.name.clone(),
                });
            }
            if let Some(first) = rest_map {
                if param.kind == ParamKind::RestMap {
                    return Err(SignatureError::MultipleRestMap {
                        first: first.to_string(),
                        second: param.name.clone(),
                    });
                }
                return Err(SignatureError::ParamAfterRestMap {
                    name: param.name.clone(),
                });
            }
            if param.is_variadic() && param.default.is_some() {
                return Err(SignatureError::DefaultOnVariadic {
                    name: param.name.clone(),
                });
            }
            match param.kind {
                ParamKind::Ordinary => {
                    if rest.is_some() {
                        return Err(SignatureError::OrdinaryAfterRest {
                            name: param.name.clone(),
                        });
                    }
                    match (param.has_default(), defaulted) {
                        (true, _) => defaulted = Some(param.name.as_str()),
                        (false, Some(_)) => {
                            return Err(SignatureError::RequiredAfterDefault {
                                name: param.name.clone(),
                            });
                        }
                        (false, None) => {}
                    }
                }
                ParamKind::Rest => {
                    if let Some(first) = rest {
                        return Err(SignatureError::MultipleRest {
                            first: first.to_string(),
                            second: param.name.clone(),
                        });
                    }
                    rest = Some(param.name.as_str());
                }
                ParamKind::RestMap => rest_map = Some(param.name.as_str()),
            }
        }
        Ok(Self { params })
    }

    pub fn builder() -> SignatureBuilder {
        SignatureBuilder { params: Vec::new() }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Index of a parameter by name, any kind.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// The first variadic parameter, if the signature declares one.
    pub fn variadic(&self) -> Option<&Param> {
        self.params.iter().find(|p| p.is_variadic())
    }

    /// Bind call arguments as a direct call would; every required parameter
    /// must end up covered. Defaults are *not* substituted here.
    pub fn bind(
        &self,
        positional: Vec<Datum>,
        named: BTreeMap<String, Datum>,
    ) -> Result<BoundArguments, BindError> {
        self.bind_inner(positional, named, false)
    }

    /// Bind a prefix of the arguments; unfilled parameters are left unbound
    /// instead of raising `MissingArgument`.
    pub fn bind_partial(
        &self,
        positional: Vec<Datum>,
        named: BTreeMap<String, Datum>,
    ) -> Result<BoundArguments, BindError> {
        self.bind_inner(positional, named, true)
    }

    fn bind_inner(
        &self,
        positional: Vec<Datum>,
        named: BTreeMap<String, Datum>,
        partial: bool,
    ) -> Result<BoundArguments, BindError> {
        let mut slots: Vec<Option<BoundValue>> = self.params.iter().map(|_| None).collect();

        let ordinary_count = self
            .params
            .iter()
            .filter(|p| p.kind == ParamKind::Ordinary)
            .count();
        let rest_idx = self.params.iter().position(|p| p.kind == ParamKind::Rest);
        let rest_map_idx = self
            .params
            .iter()
            .position(|p| p.kind == ParamKind::RestMap);

        let got = positional.len();
        let mut extras: Vec<Datum> = Vec::new();
        for (i, value) in positional.into_iter().enumerate() {
            if i < ordinary_count {
                slots[i] = Some(BoundValue::One(value));
            } else if rest_idx.is_some() {
                extras.push(value);
            } else {
                return Err(BindError::TooManyPositional {
                    expected: ordinary_count,
                    got,
                });
            }
        }
        if let (Some(idx), false) = (rest_idx, extras.is_empty()) {
            slots[idx] = Some(BoundValue::Rest(extras));
        }

        let mut map_extras: BTreeMap<String, Datum> = BTreeMap::new();
        for (name, value) in named {
            match self
                .params
                .iter()
                .position(|p| p.kind == ParamKind::Ordinary && p.name == name)
            {
                Some(idx) => {
                    if slots[idx].is_some() {
                        return Err(BindError::DuplicateArgument { name });
                    }
                    slots[idx] = Some(BoundValue::One(value));
                }
                None => {
                    if rest_map_idx.is_some() {
                        map_extras.insert(name, value);
                    } else {
                        return Err(BindError::UnexpectedKeyword { name });
                    }
                }
            }
        }
        if let (Some(idx), false) = (rest_map_idx, map_extras.is_empty()) {
            slots[idx] = Some(BoundValue::RestMap(map_extras));
        }

        if !partial {
            for (param, slot) in self.params.iter().zip(&slots) {
                if slot.is_none() && param.kind == ParamKind::Ordinary && !param.has_default() {
                    return Err(BindError::MissingArgument {
                        name: param.name.clone(),
                    });
                }
            }
        }

        Ok(BoundArguments { slots })
    }
}

/// Incremental [`FunctionSignature`] construction.
#[derive(Debug, Default)]
pub struct SignatureBuilder {
    params: Vec<Param>,
}

impl SignatureBuilder {
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    pub fn param_with_default(
        mut self,
        name: impl Into<String>,
        default: impl Into<Datum>,
    ) -> Self {
        self.params.push(Param::with_default(name, default));
        self
    }

    /// Declare the variadic-positional parameter.
    pub fn rest(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::new(name, ParamKind::Rest, None));
        self
    }

    /// Declare the variadic-keyword parameter.
    pub fn rest_map(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::new(name, ParamKind::RestMap, None));
        self
    }

    pub fn build(self) -> Result<FunctionSignature, SignatureError> {
        FunctionSignature::new(self.params)
    }
}

/// The value bound to one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// An ordinary parameter's argument.
    One(Datum),
    /// The extra positional arguments collected by a `Rest` parameter.
    Rest(Vec<Datum>),
    /// The extra named arguments collected by a `RestMap` parameter.
    RestMap(BTreeMap<String, Datum>),
}

/// Parameter-indexed bindings, parallel to the signature's parameter list.
/// `None` means the caller omitted that parameter.
#[derive(Debug, Clone)]
pub struct BoundArguments {
    slots: Vec<Option<BoundValue>>,
}

impl BoundArguments {
    pub fn get(&self, index: usize) -> Option<&BoundValue> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Replace the binding at `index` through `f`, when one exists.
    pub fn transform(&mut self, index: usize, f: impl FnOnce(BoundValue) -> BoundValue) {
        if let Some(slot) = self.slots.get_mut(index)
            && let Some(value) = slot.take()
        {
            *slot = Some(f(value));
        }
    }

    /// Fill every unbound parameter: declared defaults for ordinary
    /// parameters, empty collections for variadics.
    pub fn apply_defaults(&mut self, signature: &FunctionSignature) {
        for (param, slot) in signature.params().iter().zip(self.slots.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            *slot = match param.kind() {
                ParamKind::Ordinary => param.default().cloned().map(BoundValue::One),
                ParamKind::Rest => Some(BoundValue::Rest(Vec::new())),
                ParamKind::RestMap => Some(BoundValue::RestMap(BTreeMap::new())),
            };
        }
    }

    /// Re-expand into call arguments, preserving parameter order. Variadic
    /// collections spread back into positional/named arguments.
    pub fn into_call_args(self, signature: &FunctionSignature) -> (Vec<Datum>, BTreeMap<String, Datum>) {
        let mut positional = Vec::new();
        let mut named = BTreeMap::new();
        for (param, slot) in signature.params().iter().zip(self.slots) {
            match slot {
                Some(BoundValue::One(value)) => positional.push(value),
                Some(BoundValue::Rest(values)) => positional.extend(values),
                Some(BoundValue::RestMap(map)) => named.extend(map),
                None => {}
            }
        }
        (positional, named)
    }
}

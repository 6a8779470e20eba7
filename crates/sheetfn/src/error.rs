use thiserror::Error;

/// Errors raised while declaring a [`crate::FunctionSignature`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("duplicate parameter `{name}`")]
    DuplicateParam { name: String },

    #[error("only one variadic-positional parameter is allowed (`{first}`, then `{second}`)")]
    MultipleRest { first: String, second: String },

    #[error("only one variadic-keyword parameter is allowed (`{first}`, then `{second}`)")]
    MultipleRestMap { first: String, second: String },

    #[error("parameter `{name}` declared after the variadic-keyword parameter")]
    ParamAfterRestMap { name: String },

    #[error("plain parameter `{name}` declared after the variadic-positional parameter")]
    OrdinaryAfterRest { name: String },

    #[error("required parameter `{name}` follows a parameter with a default")]
    RequiredAfterDefault { name: String },

    #[error("variadic parameter `{name}` cannot carry a default")]
    DefaultOnVariadic { name: String },
}

/// Argument-binding failures, surfaced exactly as a direct call to the
/// function would surface them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("too many positional arguments: expected at most {expected}, got {got}")]
    TooManyPositional { expected: usize, got: usize },

    #[error("missing required argument `{name}`")]
    MissingArgument { name: String },

    #[error("unexpected keyword argument `{name}`")]
    UnexpectedKeyword { name: String },

    #[error("got multiple values for argument `{name}`")]
    DuplicateArgument { name: String },
}

/// Everything the binding and adapter layers can fail with.
#[derive(Debug, Error)]
pub enum SheetFnError {
    /// Slot-backed calculations require a fixed, fully named parameter list.
    #[error("variadic parameter `{param}` is not allowed in a slot-bound function signature")]
    SignatureMismatch { param: String },

    /// A backend handle reported a zero extent in one of its dimensions.
    #[error("range {address} reports a degenerate shape of {rows}x{cols}")]
    InvalidSlotShape {
        address: String,
        rows: usize,
        cols: usize,
    },

    /// A collection-valued argument cannot be reconciled with the target
    /// range's shape.
    #[error("cannot write to {address}: {reason}")]
    ShapeMismatch { address: String, reason: String },

    /// The merged adapter list does not cover the declared parameter list
    /// exactly.
    #[error(
        "function `{function}` declares {params} parameter(s) but {adapters} adapter(s) were supplied: {reason}"
    )]
    AdapterCountMismatch {
        function: String,
        params: usize,
        adapters: usize,
        reason: String,
    },

    /// A read or write failure reported by the backend, passed through.
    #[error("range {address}: {message}")]
    Slot { address: String, message: String },

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Signature(#[from] SignatureError),
}

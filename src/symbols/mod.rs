//! Name translation between SaC source identifiers and the C symbols the
//! compiled binary exposes.

mod demangle;
mod locals;
mod mangle;
mod types;

pub use demangle::{demangle_function, demangle_variable};
pub use locals::{extract_locals, resolve_variable, LocalKind, LocalVariable};
pub use mangle::mangle;
pub use types::{ArgType, Dimension, FunctionSignature};

use thiserror::Error;

/// Failures while encoding a function signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("invalid array dimension `[{dimension}]` in `{arg}`")]
    BadDimension { arg: String, dimension: String },

    #[error("unbalanced or misplaced brackets in `{0}`")]
    UnbalancedBrackets(String),

    #[error("missing type name in `{0}`")]
    EmptyType(String),
}

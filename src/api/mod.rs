//! Purpose: Define the stable public Rust API boundary for funcson.
//! Exports: Codec operations, document snapshots, value types, compile seam.
//! Role: Public, additive-only surface; hides the pipeline internals.
//! Invariants: The CLI and integration tests go through this module only.
//! Invariants: Pipeline modules under `core` stay out of the supported surface.

mod codec;
mod document;

pub use crate::core::compile::{CompiledFunction, FunctionCompiler};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::scan::PLACEHOLDER_PREFIX;
pub use crate::core::value::{FunctionValue, Map, Value};
pub use codec::{
    ApiResult, Codec, ParseDiagnostic, ParseResult, format, parse, stringify, validate,
};
pub use document::Document;

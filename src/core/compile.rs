// Compile seam for function literals; the crate ships no evaluator of its own.
use std::sync::Arc;

use crate::core::error::Error;
use crate::core::value::Value;

/// Callable produced by a [`FunctionCompiler`].
///
/// Shared so a compiled handler can be cloned into every tree node that
/// refers to it.
pub type CompiledFunction = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// Turns function literal source text into a callable handler.
///
/// Implementations wrap whatever evaluation backend the embedder trusts.
/// Compile failures are reported per literal and never abort a parse; the
/// offending leaf is left as its raw placeholder string instead.
pub trait FunctionCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<CompiledFunction, Error>;
}

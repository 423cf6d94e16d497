//! Purpose: Define the codec surface for parsing and serializing extended JSON.
//! Exports: `Codec`, `ParseResult`, `ParseDiagnostic`, and free-function wrappers.
//! Role: Stable boundary for embedders; the CLI goes through this surface too.
//! Invariants: Parse failures carry the verbatim serde_json message, prefixed.
//! Invariants: Function compile failures never fail a parse; the leaf degrades.
#![allow(clippy::result_large_err)]

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::core::compile::FunctionCompiler;
use crate::core::emit;
use crate::core::error::{Error, ErrorKind};
use crate::core::restore;
use crate::core::scan;
use crate::core::value::Value;

pub type ApiResult<T> = Result<T, Error>;

/// Outcome of a successful parse.
#[derive(Debug)]
pub struct ParseResult {
    pub data: Value,
    /// True when the scanner extracted at least one function literal, even
    /// if a compiler later refused some of them.
    pub has_functions: bool,
    /// Access paths of restored function leaves, in document order.
    pub function_paths: Vec<String>,
}

impl ParseResult {
    fn empty() -> Self {
        Self {
            data: Value::Null,
            has_functions: false,
            function_paths: Vec::new(),
        }
    }
}

/// Structured description of a rejected document.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ParseDiagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ParseDiagnostic {
    pub(crate) fn from_error(err: &Error) -> Self {
        Self {
            message: err
                .message()
                .unwrap_or("invalid JSON structure")
                .to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Parser/serializer pair for JSON documents with inline function literals.
///
/// A codec without a compiler restores function literals structurally: they
/// come back as [`crate::core::value::FunctionValue`] leaves that carry
/// source text but cannot be called.
#[derive(Clone, Default)]
pub struct Codec {
    compiler: Option<Arc<dyn FunctionCompiler>>,
}

impl Codec {
    pub fn new() -> Self {
        Self { compiler: None }
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn FunctionCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Parses extended JSON text.
    ///
    /// Empty or whitespace-only input is not an error; it parses to a null
    /// document with no functions.
    pub fn parse(&self, text: &str) -> ApiResult<ParseResult> {
        if text.trim().is_empty() {
            return Ok(ParseResult::empty());
        }
        let extraction = scan::extract(text);
        if extraction.has_functions {
            tracing::debug!(
                functions = extraction.placeholders.len(),
                "extracted function literals"
            );
        }
        let raw: serde_json::Value = serde_json::from_str(&extraction.text).map_err(|err| {
            let line = err.line();
            let column = err.column();
            let mut parse_err = Error::new(ErrorKind::InvalidJsonStructure)
                .with_message(format!("invalid JSON structure: {err}"));
            if line > 0 {
                parse_err = parse_err.with_line(line);
            }
            if column > 0 {
                parse_err = parse_err.with_column(column);
            }
            parse_err.with_source(err)
        })?;
        let restored = restore::restore(raw, &extraction.placeholders, self.compiler.as_deref());
        Ok(ParseResult {
            data: restored.data,
            has_functions: extraction.has_functions,
            function_paths: restored.function_paths,
        })
    }

    /// Checks `text` without surfacing the parsed tree. `None` means the
    /// document is acceptable; this call itself never fails.
    pub fn validate(&self, text: &str) -> Option<ParseDiagnostic> {
        match self.parse(text) {
            Ok(_) => None,
            Err(err) => Some(ParseDiagnostic::from_error(&err)),
        }
    }

    /// Renders a value tree as extended JSON text. See [`emit::stringify`].
    pub fn stringify(&self, value: &Value, indent: Option<usize>) -> String {
        emit::stringify(value, indent)
    }

    /// Parses and re-serializes in one step. Malformed input propagates as
    /// an error rather than echoing back unformatted. Empty input formats
    /// to empty output.
    pub fn format(&self, text: &str, indent: usize) -> ApiResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let parsed = self.parse(text)?;
        Ok(emit::stringify(&parsed.data, Some(indent)))
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("has_compiler", &self.compiler.is_some())
            .finish()
    }
}

/// Parses with a default codec; no function compiler is installed.
pub fn parse(text: &str) -> ApiResult<ParseResult> {
    Codec::new().parse(text)
}

/// Validates with a default codec.
pub fn validate(text: &str) -> Option<ParseDiagnostic> {
    Codec::new().validate(text)
}

/// Serializes a value tree; equivalent to [`Codec::stringify`].
pub fn stringify(value: &Value, indent: Option<usize>) -> String {
    emit::stringify(value, indent)
}

/// Formats text with a default codec.
pub fn format(text: &str, indent: usize) -> ApiResult<String> {
    Codec::new().format(text, indent)
}

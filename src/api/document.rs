//! Purpose: Hold a single-owner document snapshot over codec operations.
//! Exports: `Document`.
//! Role: Convenience wrapper for embedders that poll state instead of
//! threading results through call sites.
//! Invariants: Snapshot fields always reflect the most recent `load`.
//! Invariants: A failed load clears the data and keeps the diagnostic.
#![allow(clippy::result_large_err)]

use crate::core::value::Value;

use super::codec::{ApiResult, Codec, ParseDiagnostic};

#[derive(Debug, Default)]
pub struct Document {
    codec: Codec,
    data: Value,
    diagnostic: Option<ParseDiagnostic>,
    has_functions: bool,
    function_paths: Vec<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: Codec) -> Self {
        Self {
            codec,
            ..Self::default()
        }
    }

    /// Parses `text` and replaces the snapshot.
    ///
    /// On failure the snapshot resets to an empty document with the
    /// diagnostic recorded; the error is also returned for callers that
    /// propagate instead of polling.
    pub fn load(&mut self, text: &str) -> ApiResult<()> {
        match self.codec.parse(text) {
            Ok(result) => {
                self.data = result.data;
                self.has_functions = result.has_functions;
                self.function_paths = result.function_paths;
                self.diagnostic = None;
                Ok(())
            }
            Err(err) => {
                self.data = Value::Null;
                self.has_functions = false;
                self.function_paths.clear();
                self.diagnostic = Some(ParseDiagnostic::from_error(&err));
                Err(err)
            }
        }
    }

    /// Serializes the current snapshot.
    pub fn text(&self, indent: Option<usize>) -> String {
        self.codec.stringify(&self.data, indent)
    }

    /// Loads `text` and returns it re-serialized at `indent`. Empty input
    /// clears the snapshot and formats to empty output.
    pub fn format(&mut self, text: &str, indent: usize) -> ApiResult<String> {
        if text.trim().is_empty() {
            self.clear();
            return Ok(String::new());
        }
        self.load(text)?;
        Ok(self.text(Some(indent)))
    }

    pub fn clear(&mut self) {
        self.data = Value::Null;
        self.diagnostic = None;
        self.has_functions = false;
        self.function_paths.clear();
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn diagnostic(&self) -> Option<&ParseDiagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn has_functions(&self) -> bool {
        self.has_functions
    }

    pub fn function_paths(&self) -> &[String] {
        &self.function_paths
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::core::value::Value;

    #[test]
    fn load_success_updates_snapshot() {
        let mut doc = Document::new();
        doc.load(r#"{"tooltip": {"formatter": (v) => v}, "n": 3}"#)
            .unwrap();
        assert!(doc.has_functions());
        assert_eq!(doc.function_paths(), ["tooltip.formatter"]);
        assert_eq!(doc.data().at_path("n").and_then(Value::as_i64), Some(3));
        assert!(doc.diagnostic().is_none());
    }

    #[test]
    fn load_failure_clears_data_and_records_diagnostic() {
        let mut doc = Document::new();
        doc.load(r#"{"ok": true}"#).unwrap();
        assert!(doc.load("{broken").is_err());
        assert_eq!(doc.data(), &Value::Null);
        assert!(!doc.has_functions());
        assert!(doc.function_paths().is_empty());
        let diagnostic = doc.diagnostic().unwrap();
        assert!(diagnostic.message.starts_with("invalid JSON structure: "));
    }

    #[test]
    fn format_round_trips_through_snapshot() {
        let mut doc = Document::new();
        let out = doc.format(r#"{"fmt": (x) => x + 1}"#, 2).unwrap();
        assert_eq!(out, "{\n  \"fmt\": (x) => x + 1\n}");
        assert!(doc.has_functions());
    }

    #[test]
    fn format_of_empty_input_clears_snapshot() {
        let mut doc = Document::new();
        doc.load(r#"{"a": 1}"#).unwrap();
        assert_eq!(doc.format("  ", 2).unwrap(), "");
        assert_eq!(doc.data(), &Value::Null);
    }
}

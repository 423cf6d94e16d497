// Extended JSON value tree: the standard JSON shapes plus function literals.
use std::fmt;

use indexmap::IndexMap;

use crate::core::compile::CompiledFunction;
use crate::core::error::{Error, ErrorKind};

/// Object container. Insertion order is preserved so serialized output keeps
/// the member order of the source document.
pub type Map = IndexMap<String, Value>;

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Function(FunctionValue),
}

impl Value {
    pub fn kind_desc(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionValue> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Looks up an object member by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Looks up an array element by index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Resolves an access path of the shape recorded in `function_paths`,
    /// e.g. `"tooltip.formatter"` or `"series[0].label.fmt"`.
    ///
    /// The empty path resolves to the value itself. Keys that themselves
    /// contain `.` or `[` cannot be addressed this way.
    pub fn at_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        let mut rest = path;
        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix('[') {
                let close = stripped.find(']')?;
                let index: usize = stripped[..close].parse().ok()?;
                current = current.get_index(index)?;
                rest = &stripped[close + 1..];
                rest = rest.strip_prefix('.').unwrap_or(rest);
            } else {
                let end = rest
                    .find(['.', '['])
                    .unwrap_or(rest.len());
                current = current.get(&rest[..end])?;
                rest = &rest[end..];
                rest = rest.strip_prefix('.').unwrap_or(rest);
            }
        }
        Some(current)
    }

    /// Converts a plain JSON value into a tree. No placeholder handling
    /// happens here; every string stays a string.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(serde_json::Number::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        match serde_json::Number::from_f64(value) {
            Some(n) => Self::Number(n),
            None => Self::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().collect())
    }
}

/// A function literal carried through the tree as data.
///
/// `source` is always the verbatim literal text from the document. A handler
/// is present only when a [`crate::core::compile::FunctionCompiler`] was
/// installed and compilation succeeded.
#[derive(Clone)]
pub struct FunctionValue {
    source: String,
    handler: Option<CompiledFunction>,
}

impl FunctionValue {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: CompiledFunction) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_compiled(&self) -> bool {
        self.handler.is_some()
    }

    /// Invokes the compiled handler.
    ///
    /// Returns `Unsupported` when no compiler was installed at parse time;
    /// the literal is still fully usable as data.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        match &self.handler {
            Some(handler) => handler(args),
            None => Err(Error::new(ErrorKind::Unsupported)
                .with_message("function literal has no compiled handler")
                .with_hint(
                    "Install a FunctionCompiler on the Codec before parsing to make \
                     function values callable.",
                )),
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("source", &self.source)
            .field("compiled", &self.handler.is_some())
            .finish()
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

// Rebuilds the value tree from parsed JSON, reviving placeholder leaves.
use std::collections::HashMap;

use crate::core::compile::FunctionCompiler;
use crate::core::scan::PLACEHOLDER_PREFIX;
use crate::core::value::{FunctionValue, Map, Value};

#[derive(Debug)]
pub struct Restored {
    pub data: Value,
    /// Access paths of restored function leaves, in document order. The
    /// root value itself has no path and is never listed.
    pub function_paths: Vec<String>,
}

/// Walks the parsed placeholder document and turns every known placeholder
/// leaf back into a [`FunctionValue`].
///
/// With a compiler installed, each literal is compiled as it is restored; a
/// literal that fails to compile is logged and left behind as its raw
/// placeholder string, and its path is not recorded. Without a compiler the
/// restore is purely structural and cannot fail.
pub fn restore(
    raw: serde_json::Value,
    placeholders: &HashMap<String, String>,
    compiler: Option<&dyn FunctionCompiler>,
) -> Restored {
    let mut ctx = Ctx {
        placeholders,
        compiler,
        paths: Vec::new(),
    };
    let data = walk(raw, "", &mut ctx);
    Restored {
        data,
        function_paths: ctx.paths,
    }
}

struct Ctx<'a> {
    placeholders: &'a HashMap<String, String>,
    compiler: Option<&'a dyn FunctionCompiler>,
    paths: Vec<String>,
}

fn walk(node: serde_json::Value, path: &str, ctx: &mut Ctx<'_>) -> Value {
    match node {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => restore_leaf(s, path, ctx),
        serde_json::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| walk(item, &format!("{path}[{index}]"), ctx))
                .collect(),
        ),
        serde_json::Value::Object(members) => {
            let mut out = Map::with_capacity(members.len());
            for (key, value) in members {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let child = walk(value, &child_path, ctx);
                out.insert(key, child);
            }
            Value::Object(out)
        }
    }
}

fn restore_leaf(leaf: String, path: &str, ctx: &mut Ctx<'_>) -> Value {
    if !leaf.starts_with(PLACEHOLDER_PREFIX) {
        return Value::String(leaf);
    }
    let quoted = format!("\"{leaf}\"");
    let Some(source) = ctx.placeholders.get(&quoted) else {
        // Reserved-prefix string that was never extracted; keep it as data.
        return Value::String(leaf);
    };
    match ctx.compiler {
        None => {
            record_path(ctx, path);
            Value::Function(FunctionValue::new(source.clone()))
        }
        Some(compiler) => match compiler.compile(source) {
            Ok(handler) => {
                record_path(ctx, path);
                Value::Function(FunctionValue::new(source.clone()).with_handler(handler))
            }
            Err(err) => {
                tracing::warn!(
                    path,
                    error = %err,
                    "function literal failed to compile; leaving placeholder"
                );
                Value::String(leaf)
            }
        },
    }
}

fn record_path(ctx: &mut Ctx<'_>, path: &str) {
    if !path.is_empty() {
        ctx.paths.push(path.to_string());
    }
}

// Serializes value trees back to text, re-inlining function literals.
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::core::value::Value;

const FUNCTION_TOKEN_PREFIX: &str = "__FUNCTION_";
const FUNCTION_TOKEN_SUFFIX: &str = "__";

/// Renders a value tree as extended JSON text.
///
/// Function leaves are serialized as quoted stand-in tokens, then the token
/// occurrences are replaced left to right with the verbatim literal sources.
/// Output containing function literals is not standard JSON; parse it back
/// with this crate.
///
/// `indent` of `None` or `Some(0)` produces compact output; any other width
/// pretty-prints with that many spaces per level.
pub fn stringify(value: &Value, indent: Option<usize>) -> String {
    let mut tokens = Vec::new();
    let mut counter = token_floor(value);
    let tree = to_token_tree(value, &mut tokens, &mut counter);
    let rendered = match indent {
        Some(width) if width > 0 => pretty(&tree, width),
        _ => compact(&tree),
    };
    if tokens.is_empty() {
        return rendered;
    }
    substitute(&rendered, &tokens)
}

fn compact(tree: &serde_json::Value) -> String {
    serde_json::to_string(tree).unwrap_or_else(|_| "null".to_string())
}

fn pretty(tree: &serde_json::Value, width: usize) -> String {
    let pad = vec![b' '; width];
    let formatter = PrettyFormatter::with_indent(&pad);
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if tree.serialize(&mut ser).is_err() {
        return compact(tree);
    }
    String::from_utf8(buf).unwrap_or_default()
}

/// First token number that no string leaf in the tree already spells out.
/// Keeps stand-in tokens distinct from document data, so substitution can
/// never target a user string.
fn token_floor(value: &Value) -> usize {
    match value {
        Value::String(s) => s
            .strip_prefix(FUNCTION_TOKEN_PREFIX)
            .and_then(|rest| rest.strip_suffix(FUNCTION_TOKEN_SUFFIX))
            .and_then(|digits| digits.parse::<usize>().ok())
            .map_or(0, |n| n + 1),
        Value::Array(items) => items.iter().map(token_floor).max().unwrap_or(0),
        Value::Object(members) => members.values().map(token_floor).max().unwrap_or(0),
        _ => 0,
    }
}

fn to_token_tree(
    value: &Value,
    tokens: &mut Vec<(String, String)>,
    counter: &mut usize,
) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| to_token_tree(item, tokens, counter))
                .collect(),
        ),
        Value::Object(members) => {
            let mut out = serde_json::Map::with_capacity(members.len());
            for (key, value) in members {
                out.insert(key.clone(), to_token_tree(value, tokens, counter));
            }
            serde_json::Value::Object(out)
        }
        Value::Function(f) => {
            let token = format!("{FUNCTION_TOKEN_PREFIX}{counter}{FUNCTION_TOKEN_SUFFIX}");
            *counter += 1;
            tokens.push((format!("\"{token}\""), f.source().to_string()));
            serde_json::Value::String(token)
        }
    }
}

/// Replaces each quoted token with its literal source. Tokens occur in the
/// rendered text in the same order they were issued, so the search window
/// only ever moves forward.
fn substitute(rendered: &str, tokens: &[(String, String)]) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut cursor = 0usize;
    for (quoted, source) in tokens {
        if let Some(rel) = rendered[cursor..].find(quoted.as_str()) {
            let at = cursor + rel;
            out.push_str(&rendered[cursor..at]);
            out.push_str(source);
            cursor = at + quoted.len();
        }
    }
    out.push_str(&rendered[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::stringify;
    use crate::core::value::{FunctionValue, Value};

    fn sample_tree() -> Value {
        let mut chart = crate::core::value::Map::new();
        chart.insert("title".to_string(), Value::from("demo"));
        chart.insert(
            "formatter".to_string(),
            Value::Function(FunctionValue::new("function (v) { return v + '%'; }")),
        );
        Value::Object(chart)
    }

    #[test]
    fn compact_round_trips_plain_json() {
        let raw = serde_json::json!({"b": 1, "a": [true, null, "x"], "n": 2.5});
        let tree = Value::from_json(raw.clone());
        assert_eq!(
            stringify(&tree, None),
            serde_json::to_string(&raw).unwrap()
        );
    }

    #[test]
    fn function_leaf_is_inlined_verbatim() {
        assert_eq!(
            stringify(&sample_tree(), None),
            r#"{"title":"demo","formatter":function (v) { return v + '%'; }}"#
        );
    }

    #[test]
    fn pretty_uses_requested_indent() {
        let tree = Value::from_json(serde_json::json!({"a": {"b": 1}}));
        assert_eq!(
            stringify(&tree, Some(4)),
            "{\n    \"a\": {\n        \"b\": 1\n    }\n}"
        );
    }

    #[test]
    fn indent_zero_matches_compact() {
        let tree = sample_tree();
        assert_eq!(stringify(&tree, Some(0)), stringify(&tree, None));
    }

    #[test]
    fn pretty_inlines_functions_per_level() {
        let out = stringify(&sample_tree(), Some(2));
        assert_eq!(
            out,
            "{\n  \"title\": \"demo\",\n  \"formatter\": function (v) { return v + '%'; }\n}"
        );
    }

    #[test]
    fn forged_token_strings_cannot_capture_replacement() {
        let mut members = crate::core::value::Map::new();
        members.insert("decoy".to_string(), Value::from("__FUNCTION_0__"));
        members.insert(
            "f".to_string(),
            Value::Function(FunctionValue::new("() => 1")),
        );
        let out = stringify(&Value::Object(members), None);
        assert_eq!(out, r#"{"decoy":"__FUNCTION_0__","f":() => 1}"#);
    }

    #[test]
    fn multiple_functions_substitute_in_order() {
        let mut members = crate::core::value::Map::new();
        members.insert(
            "first".to_string(),
            Value::Function(FunctionValue::new("(a) => a")),
        );
        members.insert(
            "second".to_string(),
            Value::Function(FunctionValue::new("(b) => b")),
        );
        let out = stringify(&Value::Object(members), None);
        assert_eq!(out, r#"{"first":(a) => a,"second":(b) => b}"#);
    }

    #[test]
    fn empty_containers_render_flat() {
        let tree = Value::from_json(serde_json::json!({"a": [], "b": {}}));
        assert_eq!(stringify(&tree, Some(2)), "{\n  \"a\": [],\n  \"b\": {}\n}");
    }
}

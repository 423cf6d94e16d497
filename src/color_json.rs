//! Purpose: Render pretty extended JSON with optional ANSI colorization.
//! Exports: `colorize_extended`, `colorize_json`.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals `api::stringify` at the
//! same indent. Callers route compact output through the plain serializer.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use funcson::api::{Map, Value};

// Conservative 8/16-color palette for broad terminal compatibility.
// Avoid bright variants that can lose contrast on themes like Solarized.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";
const COLOR_FUNCTION: &str = "34";

/// Pretty-prints an extended value tree with `indent` spaces per level.
/// Function literal sources are emitted verbatim, colorized as a unit.
pub fn colorize_extended(value: &Value, indent: usize, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, indent, use_color, &mut out);
    out
}

/// Convenience wrapper for plain `serde_json` values, used for envelopes.
pub fn colorize_json(value: &serde_json::Value, use_color: bool) -> String {
    colorize_extended(&Value::from_json(value.clone()), 2, use_color)
}

fn write_value(value: &Value, level: usize, indent: usize, use_color: bool, out: &mut String) {
    match value {
        Value::Null => push_colored("null", COLOR_NULL, use_color, out),
        Value::Bool(val) => {
            let text = if *val { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        Value::Number(num) => push_colored(&num.to_string(), COLOR_NUMBER, use_color, out),
        Value::String(text) => {
            let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
            push_colored(&encoded, COLOR_STRING, use_color, out);
        }
        Value::Array(items) => write_array(items, level, indent, use_color, out),
        Value::Object(members) => write_object(members, level, indent, use_color, out),
        Value::Function(f) => push_colored(f.source(), COLOR_FUNCTION, use_color, out),
    }
}

fn write_array(items: &[Value], level: usize, indent: usize, use_color: bool, out: &mut String) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(level + 1, indent, out);
        write_value(item, level + 1, indent, use_color, out);
        if idx + 1 < items.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(level, indent, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_object(members: &Map, level: usize, indent: usize, use_color: bool, out: &mut String) {
    if members.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    let len = members.len();
    for (idx, (key, value)) in members.iter().enumerate() {
        push_indent(level + 1, indent, out);
        let encoded = serde_json::to_string(key).unwrap_or_else(|_| "\"\"".to_string());
        push_colored(&encoded, COLOR_KEY, use_color, out);
        push_colored(":", COLOR_PUNCT, use_color, out);
        out.push(' ');
        write_value(value, level + 1, indent, use_color, out);
        if idx + 1 < len {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(level, indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn push_indent(level: usize, indent: usize, out: &mut String) {
    for _ in 0..level * indent {
        out.push(' ');
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use super::{colorize_extended, colorize_json};
    use funcson::api::{Codec, stringify};

    #[test]
    fn colorize_matches_stringify_when_disabled() {
        let parsed = Codec::new()
            .parse(r#"{"arr": [1, true, null], "fmt": (v) => v + 1, "nested": {"x": "y"}}"#)
            .unwrap();
        for indent in [2usize, 4] {
            let plain = colorize_extended(&parsed.data, indent, false);
            assert_eq!(plain, stringify(&parsed.data, Some(indent)));
        }
    }

    #[test]
    fn colorize_emits_ansi_when_enabled() {
        let parsed = Codec::new()
            .parse(r#"{"k": "v", "n": 1, "b": true, "z": null, "f": () => 0}"#)
            .unwrap();
        let colored = colorize_extended(&parsed.data, 2, true);
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[34m() => 0\u{1b}[0m"));
    }

    #[test]
    fn envelope_wrapper_matches_pretty_two_space() {
        let value = serde_json::json!({"check": {"input": "stdin", "valid": true}});
        let plain = colorize_json(&value, false);
        assert_eq!(plain, serde_json::to_string_pretty(&value).unwrap());
    }
}
